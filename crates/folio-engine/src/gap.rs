//! Gap & Utilization Aggregator.

use std::collections::BTreeMap;

use folio_core::{model::RoleId, month::Month};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{demand::DemandMatrix, round_fte, supply::SupplyMatrix};

/// One `(role, month)` cell of capacity against demand.
///
/// A negative `gap` means the role is over-demanded in that month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapRow {
  pub role:          RoleId,
  pub month:         Month,
  pub available_fte: Decimal,
  pub required_fte:  Decimal,
  pub gap:           Decimal,
}

impl GapRow {
  pub fn new(role: RoleId, month: Month, available: Decimal, required: Decimal) -> Self {
    Self {
      role,
      month,
      available_fte: available,
      required_fte: required,
      gap: available - required,
    }
  }

  pub fn utilization(&self) -> Decimal {
    utilization(self.required_fte, self.available_fte)
  }

  pub fn is_short(&self) -> bool { self.gap < Decimal::ZERO }
}

/// `required / available` as a percentage rounded to two places; zero when
/// nothing is available.
pub fn utilization(required: Decimal, available: Decimal) -> Decimal {
  (required * Decimal::ONE_HUNDRED)
    .checked_div(available)
    .map(round_fte)
    .unwrap_or_default()
}

/// One row per key in the union of supply and demand keys, ordered by role
/// then month.
pub fn gap_by_role_month(supply: &SupplyMatrix, demand: &DemandMatrix) -> Vec<GapRow> {
  let mut cells: BTreeMap<(RoleId, Month), (Decimal, Decimal)> = BTreeMap::new();
  for (role, month, available) in supply.iter() {
    cells.entry((role, month)).or_default().0 += available;
  }
  for (role, month, required) in demand.totals() {
    cells.entry((role, month)).or_default().1 += required;
  }

  cells
    .into_iter()
    .map(|((role, month), (available, required))| {
      GapRow::new(role, month, available, required)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use folio_core::{
    model::{Allocation, Employee, EmployeeId, ProjectId, Role, TeamId},
    month::TimeGrid,
  };

  use super::*;
  use crate::{
    demand::{ScenarioOverlay, demand_by_role_month},
    supply::{SupplyFilter, capacity_by_role_month},
  };

  fn m(s: &str) -> Month { s.parse().unwrap() }

  fn fte(s: &str) -> Decimal { s.parse().unwrap() }

  fn fixture() -> (SupplyMatrix, DemandMatrix) {
    let grid = TimeGrid::between(m("2026-01"), m("2026-02"));
    let employees = vec![Employee {
      id:           EmployeeId(1),
      name:         "Ada".into(),
      role:         RoleId(1),
      team:         TeamId(1),
      fte_capacity: fte("2.0"),
      active_from:  "2025-01-01".parse().unwrap(),
      active_to:    None,
    }];
    let roles = vec![Role { id: RoleId(1), name: "Backend Engineer".into() }];
    let allocations = vec![
      Allocation {
        project:      ProjectId(1),
        role:         RoleId(1),
        month:        m("2026-02"),
        required_fte: fte("3.0"),
      },
      // Demand for a role nobody holds.
      Allocation {
        project:      ProjectId(1),
        role:         RoleId(2),
        month:        m("2026-01"),
        required_fte: fte("0.5"),
      },
    ];
    let supply =
      capacity_by_role_month(&grid, &roles, &employees, &SupplyFilter::default());
    let demand =
      demand_by_role_month(&grid, &allocations, &ScenarioOverlay::baseline(), None);
    (supply, demand)
  }

  #[test]
  fn rows_cover_the_key_union() {
    let (supply, demand) = fixture();
    let rows = gap_by_role_month(&supply, &demand);
    let keys: Vec<(RoleId, Month)> = rows.iter().map(|r| (r.role, r.month)).collect();
    assert_eq!(keys, vec![
      (RoleId(1), m("2026-01")),
      (RoleId(1), m("2026-02")),
      (RoleId(2), m("2026-01")),
    ]);
    for row in &rows {
      assert_eq!(row.gap, row.available_fte - row.required_fte);
    }
  }

  #[test]
  fn shortage_and_utilization() {
    let (supply, demand) = fixture();
    let rows = gap_by_role_month(&supply, &demand);

    let feb = &rows[1];
    assert_eq!(feb.gap, fte("-1.0"));
    assert!(feb.is_short());
    assert_eq!(feb.utilization(), fte("150"));

    let idle = &rows[0];
    assert!(!idle.is_short());
    assert_eq!(idle.utilization(), Decimal::ZERO);

    let unstaffed = &rows[2];
    assert_eq!(unstaffed.available_fte, Decimal::ZERO);
    assert_eq!(unstaffed.utilization(), Decimal::ZERO);
  }

  #[test]
  fn utilization_rounds_half_away_from_zero() {
    assert_eq!(utilization(fte("1"), fte("3")), fte("33.33"));
    assert_eq!(utilization(fte("2"), fte("3")), fte("66.67"));
    assert_eq!(utilization(fte("0.00005"), fte("1")), fte("0.01"));
  }
}
