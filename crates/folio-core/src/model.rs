//! Entity rows consumed by the engine.
//!
//! Every type here is a read-only snapshot of a stored row. The lifecycle of
//! these rows (creation, edits, deletion) belongs to the editing workflows,
//! not to the engine.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::month::Month;

// ─── Identifiers ─────────────────────────────────────────────────────────────

macro_rules! id_type {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }

    impl From<i64> for $name {
      fn from(raw: i64) -> Self { Self(raw) }
    }
  };
}

id_type!(
  /// Identifies a node of the organisation tree.
  OrgUnitId
);
id_type!(
  /// Identifies a role; the join key between supply and demand.
  RoleId
);
id_type!(TeamId);
id_type!(EmployeeId);
id_type!(ProjectId);
id_type!(ScenarioId);

// ─── Organisation ────────────────────────────────────────────────────────────

/// The level an org unit occupies in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgUnitKind {
  Division,
  Function,
  Subfunction,
  Team,
}

/// A node of the organisation forest. Roots are divisions with no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnit {
  pub id:     OrgUnitId,
  pub name:   String,
  pub kind:   OrgUnitKind,
  pub parent: Option<OrgUnitId>,
}

/// A named role such as "Backend Engineer".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  pub id:   RoleId,
  pub name: String,
}

/// A capacity pool placed at one org unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
  pub id:       TeamId,
  pub name:     String,
  pub org_unit: OrgUnitId,
  pub lead:     Option<EmployeeId>,
}

// ─── Supply ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
  pub id:           EmployeeId,
  pub name:         String,
  pub role:         RoleId,
  pub team:         TeamId,
  /// Fraction of a full-time person; usually at most 1 but never capped.
  pub fte_capacity: Decimal,
  pub active_from:  NaiveDate,
  /// `None` means the employee is still active.
  pub active_to:    Option<NaiveDate>,
}

impl Employee {
  /// Whether any day of `month` falls inside the employee's active window.
  pub fn is_active_in(&self, month: Month) -> bool {
    self.active_from <= month.last_day()
      && self.active_to.is_none_or(|to| to >= month.first_day())
  }

  /// Whether the employee is active on a given day.
  pub fn is_active_on(&self, day: NaiveDate) -> bool {
    self.active_from <= day && self.active_to.is_none_or(|to| to >= day)
  }
}

// ─── Demand ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
  Planned,
  Active,
  Paused,
  Cancelled,
}

impl ProjectStatus {
  pub const ALL: [Self; 4] =
    [Self::Planned, Self::Active, Self::Paused, Self::Cancelled];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub id:            ProjectId,
  pub name:          String,
  /// 1 is the highest priority, 5 the lowest.
  pub priority:      u8,
  pub planned_start: NaiveDate,
  pub planned_end:   NaiveDate,
  pub status:        ProjectStatus,
}

/// One project needs `required_fte` of `role` during `month`.
///
/// Allocations never reference an employee; demand is role-abstract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
  pub project:      ProjectId,
  pub role:         RoleId,
  pub month:        Month,
  pub required_fte: Decimal,
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioKind {
  Baseline,
  WhatIf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
  pub id:        ScenarioId,
  pub name:      String,
  pub kind:      ScenarioKind,
  pub is_active: bool,
}

/// A non-destructive what-if change to one project within one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOverride {
  pub scenario:          ScenarioId,
  pub project:           ProjectId,
  /// `false` drops the project's demand from the scenario entirely.
  pub included:          bool,
  pub start_override:    Option<NaiveDate>,
  pub end_override:      Option<NaiveDate>,
  pub priority_override: Option<u8>,
}

impl ScenarioOverride {
  /// An override that changes nothing; useful as a starting point.
  pub fn new(scenario: ScenarioId, project: ProjectId) -> Self {
    Self {
      scenario,
      project,
      included: true,
      start_override: None,
      end_override: None,
      priority_override: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn employee(from: &str, to: Option<&str>) -> Employee {
    Employee {
      id:           EmployeeId(1),
      name:         "Ada".into(),
      role:         RoleId(1),
      team:         TeamId(1),
      fte_capacity: Decimal::ONE,
      active_from:  from.parse().unwrap(),
      active_to:    to.map(|t| t.parse().unwrap()),
    }
  }

  #[test]
  fn open_ended_employee_is_active_in_later_months() {
    let e = employee("2025-06-15", None);
    assert!(!e.is_active_in("2025-05".parse().unwrap()));
    assert!(e.is_active_in("2025-06".parse().unwrap()));
    assert!(e.is_active_in("2030-01".parse().unwrap()));
  }

  #[test]
  fn leaving_mid_month_still_counts_for_that_month() {
    let e = employee("2025-01-01", Some("2025-03-02"));
    assert!(e.is_active_in("2025-03".parse().unwrap()));
    assert!(!e.is_active_in("2025-04".parse().unwrap()));
  }

  #[test]
  fn joining_on_last_day_counts_for_that_month() {
    let e = employee("2026-02-28", None);
    assert!(e.is_active_in("2026-02".parse().unwrap()));
    assert!(!e.is_active_on("2026-02-27".parse().unwrap()));
  }

  #[test]
  fn ids_serialize_as_bare_integers() {
    let json = serde_json::to_string(&RoleId(7)).unwrap();
    assert_eq!(json, "7");
  }
}
