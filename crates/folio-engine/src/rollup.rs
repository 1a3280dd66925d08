//! Division Rollup Aggregator.

use std::collections::{BTreeMap, HashMap};

use folio_core::{
  Error, Result,
  model::{Employee, OrgUnitId, RoleId, Team, TeamId},
  month::Month,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{demand::DemandMatrix, hierarchy::OrgIndex, round_fte};

/// Per-division capacity for one month, with an estimated share of demand.
///
/// Capacity is exact: it is placed in the org tree through each employee's
/// team. Demand is not placed anywhere, so `apportioned_demand` is a
/// heuristic. Each role's total demand is split across divisions in
/// proportion to their share of that role's capacity. It is not a record of
/// which division actually works on what. Apportioned figures are rounded
/// to two decimals; each division's figure is the rounded exact sum of its
/// role shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollupReport {
  pub month:                Month,
  /// Ordered by capacity descending, then division id.
  pub divisions:            Vec<DivisionRollup>,
  /// Demand for roles that have no capacity in any division.
  pub unapportioned_demand: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DivisionRollup {
  pub division:           OrgUnitId,
  pub name:               String,
  pub capacity:           Decimal,
  pub apportioned_demand: Decimal,
  /// Roles with capacity in this division, ordered by role id.
  pub by_role:            Vec<RoleShare>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleShare {
  pub role:               RoleId,
  pub capacity:           Decimal,
  pub apportioned_demand: Decimal,
}

pub fn fte_by_division(
  month: Month,
  index: &OrgIndex,
  teams: &[Team],
  employees: &[Employee],
  demand: &DemandMatrix,
) -> Result<RollupReport> {
  let team_division = teams
    .iter()
    .map(|t| Ok((t.id, index.owning_division(t.org_unit)?)))
    .collect::<Result<HashMap<TeamId, OrgUnitId>>>()?;

  let mut by_division: BTreeMap<OrgUnitId, BTreeMap<RoleId, Decimal>> =
    BTreeMap::new();
  let mut role_totals: HashMap<RoleId, Decimal> = HashMap::new();
  for employee in employees.iter().filter(|e| e.is_active_in(month)) {
    let division = team_division
      .get(&employee.team)
      .ok_or(Error::UnknownTeam(employee.team))?;
    *by_division
      .entry(*division)
      .or_default()
      .entry(employee.role)
      .or_default() += employee.fte_capacity;
    *role_totals.entry(employee.role).or_default() += employee.fte_capacity;
  }

  let mut unapportioned_demand = Decimal::ZERO;
  for role in demand.roles_in(month) {
    if role_totals.get(&role).is_none_or(|c| c.is_zero()) {
      unapportioned_demand += demand.required(role, month);
    }
  }

  let mut divisions: Vec<DivisionRollup> = index
    .divisions()
    .into_iter()
    .map(|unit| {
      let mut exact_demand = Decimal::ZERO;
      let by_role: Vec<RoleShare> = by_division
        .get(&unit.id)
        .into_iter()
        .flatten()
        .map(|(&role, &capacity)| {
          let total = role_totals.get(&role).copied().unwrap_or_default();
          let share = (demand.required(role, month) * capacity)
            .checked_div(total)
            .unwrap_or_default();
          exact_demand += share;
          RoleShare { role, capacity, apportioned_demand: round_fte(share) }
        })
        .collect();
      DivisionRollup {
        division: unit.id,
        name: unit.name.clone(),
        capacity: by_role.iter().map(|r| r.capacity).sum(),
        apportioned_demand: round_fte(exact_demand),
        by_role,
      }
    })
    .collect();
  divisions.sort_by(|a, b| {
    b.capacity.cmp(&a.capacity).then(a.division.cmp(&b.division))
  });

  Ok(RollupReport { month, divisions, unapportioned_demand })
}
