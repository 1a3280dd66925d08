//! [`Snapshot`]: every row one query reads, loaded once.
//!
//! All computations of a query run against the same snapshot, so a query
//! never sees the store change halfway through.

use std::collections::HashSet;

use folio_core::{
  model::{
    Allocation, Employee, OrgUnit, OrgUnitId, Project, Role, RoleId, ScenarioId,
    Team, TeamId,
  },
  month::TimeGrid,
  store::{AllocationQuery, EmployeeQuery, EntityStore},
};
use tracing::{debug, warn};

use crate::{
  demand::{DemandMatrix, ScenarioOverlay, demand_by_role_month},
  error::{Error, Result},
  hierarchy::OrgIndex,
  supply::{SupplyFilter, SupplyMatrix, SupplyResolver},
};

#[derive(Debug, Clone)]
pub struct Snapshot {
  /// The months the query asked for.
  pub grid:        TimeGrid,
  /// `grid` widened to cover every date override of the scenario. Equal to
  /// `grid` for the baseline.
  pub window:      TimeGrid,
  pub org_units:   Vec<OrgUnit>,
  pub roles:       Vec<Role>,
  pub teams:       Vec<Team>,
  /// Employees active at some point of the window.
  pub employees:   Vec<Employee>,
  /// Every project, whatever its status.
  pub projects:    Vec<Project>,
  /// Allocations inside the grid, except that a date-overridden project
  /// contributes its rows inside its override span instead.
  pub allocations: Vec<Allocation>,
  pub overlay:     ScenarioOverlay,
}

impl Snapshot {
  /// Read everything a query over `grid` needs.
  ///
  /// The scenario is resolved first since its date overrides decide which
  /// months are read; the remaining reads run concurrently. A scenario that
  /// is missing or inactive is logged and replaced by the baseline; store
  /// failures are returned.
  pub async fn load<S: EntityStore>(
    store: &S,
    grid: TimeGrid,
    scenario: Option<ScenarioId>,
  ) -> Result<Self> {
    let overlay = match scenario {
      None => ScenarioOverlay::baseline(),
      Some(id) => {
        let (found, overrides) = tokio::try_join!(
          store.get_scenario(id),
          store.list_scenario_overrides(id),
        )
        .map_err(Error::store)?;
        ScenarioOverlay::resolve(id, found, overrides).unwrap_or_else(|e| {
          warn!(scenario = %id, error = %e, "using baseline instead");
          ScenarioOverlay::baseline()
        })
      }
    };

    let spans = overlay.date_spans(&grid);
    let window = spans
      .iter()
      .fold(grid.clone(), |window, &(_, (first, last))| {
        window.covering(first, last)
      });

    let employee_query = EmployeeQuery {
      active_between: window
        .first()
        .zip(window.last())
        .map(|(first, last)| (first.first_day(), last.last_day())),
      ..EmployeeQuery::default()
    };
    let allocation_query = AllocationQuery {
      months: grid.first().zip(grid.last()),
      ..AllocationQuery::default()
    };

    let (org_units, roles, teams, employees, projects, mut allocations) =
      tokio::try_join!(
        store.list_org_units(),
        store.list_roles(),
        store.list_teams(),
        store.list_employees(employee_query),
        store.list_projects(None),
        store.list_allocations(allocation_query),
      )
      .map_err(Error::store)?;

    if !spans.is_empty() {
      allocations.retain(|a| spans.iter().all(|&(project, _)| project != a.project));
      for &(project, months) in &spans {
        let rows = store
          .list_allocations(AllocationQuery {
            project: Some(project),
            months: Some(months),
            ..AllocationQuery::default()
          })
          .await
          .map_err(Error::store)?;
        allocations.extend(rows);
      }
      debug!(
        overridden = spans.len(),
        months = window.len(),
        "window widened by date overrides"
      );
    }

    Ok(Self {
      grid,
      window,
      org_units,
      roles,
      teams,
      employees,
      projects,
      allocations,
      overlay,
    })
  }

  /// Capacity over the window rather than the grid.
  pub fn supply(&self, filter: &SupplyFilter) -> SupplyMatrix {
    SupplyResolver::new(&self.window, &self.employees)
      .capacity_by_role_month(&self.roles, filter)
  }

  pub fn demand(&self, role: Option<RoleId>) -> DemandMatrix {
    demand_by_role_month(&self.grid, &self.allocations, &self.overlay, role)
  }

  pub fn org_index(&self) -> OrgIndex { OrgIndex::build(&self.org_units) }

  /// Teams placed anywhere in the subtree rooted at `unit`.
  pub fn teams_within(&self, unit: OrgUnitId) -> Result<HashSet<TeamId>> {
    let units = self.org_index().subtree(unit)?;
    Ok(
      self
        .teams
        .iter()
        .filter(|t| units.contains(&t.org_unit))
        .map(|t| t.id)
        .collect(),
    )
  }

  /// The role's name, or its id for a role the snapshot does not know.
  pub fn role_name(&self, role: RoleId) -> String {
    self
      .roles
      .iter()
      .find(|r| r.id == role)
      .map(|r| r.name.clone())
      .unwrap_or_else(|| role.to_string())
  }
}
