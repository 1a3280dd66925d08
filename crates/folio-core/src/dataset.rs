//! A complete, self-contained set of rows.
//!
//! Used to seed a backend in one shot and as the backing data of
//! [`MemoryStore`](crate::memory::MemoryStore).

use serde::{Deserialize, Serialize};

use crate::model::{
  Allocation, Employee, OrgUnit, Project, Role, Scenario, ScenarioOverride,
  Team,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
  pub org_units:   Vec<OrgUnit>,
  pub roles:       Vec<Role>,
  pub teams:       Vec<Team>,
  pub employees:   Vec<Employee>,
  pub projects:    Vec<Project>,
  pub allocations: Vec<Allocation>,
  pub scenarios:   Vec<Scenario>,
  pub overrides:   Vec<ScenarioOverride>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_sections_default_to_empty() {
    let json = r#"{
      "roles": [{ "id": 1, "name": "Backend Engineer" }],
      "allocations": [{
        "project": 3, "role": 1, "month": "2026-02-15", "required_fte": "1.5"
      }]
    }"#;
    let ds: Dataset = serde_json::from_str(json).unwrap();
    assert_eq!(ds.roles.len(), 1);
    assert!(ds.employees.is_empty());
    assert_eq!(ds.allocations[0].month.to_string(), "2026-02-01");
    assert_eq!(ds.allocations[0].required_fte.to_string(), "1.5");
  }
}
