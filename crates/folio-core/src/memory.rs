//! [`MemoryStore`]: an [`EntityStore`] over an in-memory [`Dataset`].

use std::{convert::Infallible, sync::Arc};

use crate::{
  dataset::Dataset,
  model::{
    Allocation, Employee, OrgUnit, Project, ProjectStatus, Role, Scenario,
    ScenarioId, ScenarioOverride, Team,
  },
  store::{AllocationQuery, EmployeeQuery, EntityStore},
};

/// Serves reads from an immutable dataset.
///
/// Clones share the dataset.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  data: Arc<Dataset>,
}

impl MemoryStore {
  pub fn new(data: Dataset) -> Self { Self { data: Arc::new(data) } }

  pub fn dataset(&self) -> &Dataset { &self.data }
}

impl EntityStore for MemoryStore {
  type Error = Infallible;

  async fn list_org_units(&self) -> Result<Vec<OrgUnit>, Infallible> {
    Ok(self.data.org_units.clone())
  }

  async fn list_roles(&self) -> Result<Vec<Role>, Infallible> {
    Ok(self.data.roles.clone())
  }

  async fn list_teams(&self) -> Result<Vec<Team>, Infallible> {
    Ok(self.data.teams.clone())
  }

  async fn list_employees(
    &self,
    query: EmployeeQuery,
  ) -> Result<Vec<Employee>, Infallible> {
    Ok(
      self
        .data
        .employees
        .iter()
        .filter(|e| query.matches(e))
        .cloned()
        .collect(),
    )
  }

  async fn list_projects(
    &self,
    status: Option<ProjectStatus>,
  ) -> Result<Vec<Project>, Infallible> {
    Ok(
      self
        .data
        .projects
        .iter()
        .filter(|p| status.is_none_or(|s| p.status == s))
        .cloned()
        .collect(),
    )
  }

  async fn list_allocations(
    &self,
    query: AllocationQuery,
  ) -> Result<Vec<Allocation>, Infallible> {
    Ok(
      self
        .data
        .allocations
        .iter()
        .filter(|a| query.matches(a))
        .cloned()
        .collect(),
    )
  }

  async fn get_scenario(
    &self,
    id: ScenarioId,
  ) -> Result<Option<Scenario>, Infallible> {
    Ok(self.data.scenarios.iter().find(|s| s.id == id).cloned())
  }

  async fn list_scenario_overrides(
    &self,
    scenario: ScenarioId,
  ) -> Result<Vec<ScenarioOverride>, Infallible> {
    Ok(
      self
        .data
        .overrides
        .iter()
        .filter(|o| o.scenario == scenario)
        .cloned()
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use rust_decimal::Decimal;

  use super::*;
  use crate::model::{EmployeeId, ProjectId, RoleId, TeamId};

  fn employee(id: i64, role: i64, to: Option<&str>) -> Employee {
    Employee {
      id:           EmployeeId(id),
      name:         format!("e{id}"),
      role:         RoleId(role),
      team:         TeamId(1),
      fte_capacity: Decimal::ONE,
      active_from:  NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
      active_to:    to.map(|t| t.parse().unwrap()),
    }
  }

  #[tokio::test]
  async fn employee_query_filters_by_role_and_window() {
    let store = MemoryStore::new(Dataset {
      employees: vec![
        employee(1, 1, None),
        employee(2, 1, Some("2025-06-30")),
        employee(3, 2, None),
      ],
      ..Dataset::default()
    });

    let query = EmployeeQuery {
      role:           Some(RoleId(1)),
      active_between: Some((
        "2025-07-01".parse().unwrap(),
        "2025-07-31".parse().unwrap(),
      )),
      ..EmployeeQuery::default()
    };
    let found = store.list_employees(query).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, EmployeeId(1));
  }

  #[tokio::test]
  async fn active_projects_default_method_filters_status() {
    let project = |id: i64, status| Project {
      id: ProjectId(id),
      name: format!("p{id}"),
      priority: 3,
      planned_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
      planned_end: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
      status,
    };
    let store = MemoryStore::new(Dataset {
      projects: vec![
        project(1, ProjectStatus::Active),
        project(2, ProjectStatus::Paused),
      ],
      ..Dataset::default()
    });

    let active = store.list_active_projects().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, ProjectId(1));
  }
}
