//! Available FTE per role per month.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use folio_core::{
  model::{Employee, Role, RoleId, TeamId},
  month::{Month, TimeGrid},
};
use rust_decimal::Decimal;

/// Optional restrictions on which employees count towards supply.
#[derive(Debug, Clone, Default)]
pub struct SupplyFilter {
  pub role:   Option<RoleId>,
  pub team:   Option<TeamId>,
  /// Only employees in one of these teams, e.g. every team of an org subtree.
  pub within: Option<HashSet<TeamId>>,
}

impl SupplyFilter {
  pub fn matches(&self, employee: &Employee) -> bool {
    self.role.is_none_or(|r| employee.role == r)
      && self.team.is_none_or(|t| employee.team == t)
      && self.within.as_ref().is_none_or(|teams| teams.contains(&employee.team))
  }
}

/// `(role, month) -> available FTE`, with an explicit cell (possibly zero) for
/// every role in every month of the grid it was resolved over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyMatrix {
  cells: BTreeMap<(RoleId, Month), Decimal>,
}

impl SupplyMatrix {
  /// Available FTE for a cell; zero for cells outside the resolved grid.
  pub fn available(&self, role: RoleId, month: Month) -> Decimal {
    self.cells.get(&(role, month)).copied().unwrap_or_default()
  }

  pub fn contains(&self, role: RoleId, month: Month) -> bool {
    self.cells.contains_key(&(role, month))
  }

  /// Cells ordered by role, then month.
  pub fn iter(&self) -> impl Iterator<Item = (RoleId, Month, Decimal)> + '_ {
    self.cells.iter().map(|(&(role, month), &fte)| (role, month, fte))
  }

  pub fn roles(&self) -> BTreeSet<RoleId> {
    self.cells.keys().map(|&(role, _)| role).collect()
  }

  pub fn total_in(&self, month: Month) -> Decimal {
    self
      .cells
      .iter()
      .filter(|((_, m), _)| *m == month)
      .map(|(_, fte)| *fte)
      .sum()
  }

  pub fn len(&self) -> usize { self.cells.len() }

  pub fn is_empty(&self) -> bool { self.cells.is_empty() }
}

/// Resolves supply over one grid and one set of employees.
///
/// Which employees are active in which month is computed once on
/// construction and reused by every query against the resolver.
pub struct SupplyResolver<'a> {
  grid:      &'a TimeGrid,
  employees: &'a [Employee],
  /// Indices into `employees`, aligned with `grid.months()`.
  active:    Vec<Vec<usize>>,
}

impl<'a> SupplyResolver<'a> {
  pub fn new(grid: &'a TimeGrid, employees: &'a [Employee]) -> Self {
    let active = grid
      .iter()
      .map(|month| {
        employees
          .iter()
          .enumerate()
          .filter(|(_, e)| e.is_active_in(month))
          .map(|(i, _)| i)
          .collect()
      })
      .collect();
    Self { grid, employees, active }
  }

  pub fn grid(&self) -> &TimeGrid { self.grid }

  /// Employees whose active window covers `month`. Empty outside the grid.
  pub fn active_in(&self, month: Month) -> impl Iterator<Item = &'a Employee> + '_ {
    let employees = self.employees;
    self
      .grid
      .months()
      .iter()
      .position(|m| *m == month)
      .map(|pos| self.active[pos].as_slice())
      .unwrap_or_default()
      .iter()
      .map(move |&i| &employees[i])
  }

  /// Sum matching employees' FTE into `(role, month)` cells.
  ///
  /// Every role in `roles`, plus any role held by a matching employee, gets a
  /// cell for every month of the grid, so consumers never fill defaults.
  pub fn capacity_by_role_month(
    &self,
    roles: &[Role],
    filter: &SupplyFilter,
  ) -> SupplyMatrix {
    let role_ids: BTreeSet<RoleId> = roles
      .iter()
      .map(|r| r.id)
      .chain(
        self
          .employees
          .iter()
          .filter(|e| filter.matches(e))
          .map(|e| e.role),
      )
      .filter(|id| filter.role.is_none_or(|r| r == *id))
      .collect();

    let mut cells = BTreeMap::new();
    for &role in &role_ids {
      for month in self.grid.iter() {
        cells.insert((role, month), Decimal::ZERO);
      }
    }

    for (month, active) in self.grid.iter().zip(&self.active) {
      for employee in active.iter().map(|&i| &self.employees[i]) {
        if filter.matches(employee) {
          *cells.entry((employee.role, month)).or_default() +=
            employee.fte_capacity;
        }
      }
    }

    SupplyMatrix { cells }
  }
}

/// One-shot form of [`SupplyResolver::capacity_by_role_month`].
pub fn capacity_by_role_month(
  grid: &TimeGrid,
  roles: &[Role],
  employees: &[Employee],
  filter: &SupplyFilter,
) -> SupplyMatrix {
  SupplyResolver::new(grid, employees).capacity_by_role_month(roles, filter)
}
