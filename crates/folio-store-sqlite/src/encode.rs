//! Encoding and decoding between domain types and SQLite column values.
//!
//! Dates are stored as ISO `YYYY-MM-DD` strings and FTE figures as decimal
//! strings, so no value ever passes through a float. Enums are stored as the
//! same lowercase (or, for scenario kinds, upper snake case) words they
//! serialise to.

use chrono::NaiveDate;
use folio_core::{
  model::{
    Allocation, Employee, EmployeeId, OrgUnit, OrgUnitId, OrgUnitKind, Project,
    ProjectId, ProjectStatus, RoleId, Scenario, ScenarioId, ScenarioKind,
    ScenarioOverride, TeamId,
  },
  month::Month,
};
use rust_decimal::Decimal;

use crate::{Error, Result};

// ─── Dates and decimals ──────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_month(month: Month) -> String { encode_date(month.first_day()) }

pub fn decode_month(s: &str) -> Result<Month> { Ok(s.parse()?) }

pub fn encode_fte(fte: Decimal) -> String { fte.to_string() }

pub fn decode_fte(s: &str) -> Result<Decimal> { Ok(s.parse()?) }

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_org_unit_kind(kind: OrgUnitKind) -> &'static str {
  match kind {
    OrgUnitKind::Division => "division",
    OrgUnitKind::Function => "function",
    OrgUnitKind::Subfunction => "subfunction",
    OrgUnitKind::Team => "team",
  }
}

pub fn decode_org_unit_kind(s: &str) -> Result<OrgUnitKind> {
  match s {
    "division" => Ok(OrgUnitKind::Division),
    "function" => Ok(OrgUnitKind::Function),
    "subfunction" => Ok(OrgUnitKind::Subfunction),
    "team" => Ok(OrgUnitKind::Team),
    other => Err(Error::unknown("org_units.kind", other)),
  }
}

pub fn encode_status(status: ProjectStatus) -> &'static str {
  match status {
    ProjectStatus::Planned => "planned",
    ProjectStatus::Active => "active",
    ProjectStatus::Paused => "paused",
    ProjectStatus::Cancelled => "cancelled",
  }
}

pub fn decode_status(s: &str) -> Result<ProjectStatus> {
  match s {
    "planned" => Ok(ProjectStatus::Planned),
    "active" => Ok(ProjectStatus::Active),
    "paused" => Ok(ProjectStatus::Paused),
    "cancelled" => Ok(ProjectStatus::Cancelled),
    other => Err(Error::unknown("projects.status", other)),
  }
}

pub fn encode_scenario_kind(kind: ScenarioKind) -> &'static str {
  match kind {
    ScenarioKind::Baseline => "BASELINE",
    ScenarioKind::WhatIf => "WHAT_IF",
  }
}

pub fn decode_scenario_kind(s: &str) -> Result<ScenarioKind> {
  match s {
    "BASELINE" => Ok(ScenarioKind::Baseline),
    "WHAT_IF" => Ok(ScenarioKind::WhatIf),
    other => Err(Error::unknown("scenarios.kind", other)),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────
//
// Raw values read directly from a row inside a connection call. Decoding
// happens afterwards, outside the database thread.

pub struct RawOrgUnit {
  pub id:        i64,
  pub name:      String,
  pub kind:      String,
  pub parent_id: Option<i64>,
}

impl RawOrgUnit {
  pub fn into_org_unit(self) -> Result<OrgUnit> {
    Ok(OrgUnit {
      id:     OrgUnitId(self.id),
      name:   self.name,
      kind:   decode_org_unit_kind(&self.kind)?,
      parent: self.parent_id.map(OrgUnitId),
    })
  }
}

pub struct RawEmployee {
  pub id:           i64,
  pub name:         String,
  pub role_id:      i64,
  pub team_id:      i64,
  pub fte_capacity: String,
  pub active_from:  String,
  pub active_to:    Option<String>,
}

impl RawEmployee {
  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      id:           EmployeeId(self.id),
      name:         self.name,
      role:         RoleId(self.role_id),
      team:         TeamId(self.team_id),
      fte_capacity: decode_fte(&self.fte_capacity)?,
      active_from:  decode_date(&self.active_from)?,
      active_to:    self.active_to.as_deref().map(decode_date).transpose()?,
    })
  }
}

pub struct RawProject {
  pub id:            i64,
  pub name:          String,
  pub priority:      u8,
  pub planned_start: String,
  pub planned_end:   String,
  pub status:        String,
}

impl RawProject {
  pub fn into_project(self) -> Result<Project> {
    Ok(Project {
      id:            ProjectId(self.id),
      name:          self.name,
      priority:      self.priority,
      planned_start: decode_date(&self.planned_start)?,
      planned_end:   decode_date(&self.planned_end)?,
      status:        decode_status(&self.status)?,
    })
  }
}

pub struct RawAllocation {
  pub project_id:   i64,
  pub role_id:      i64,
  pub month_date:   String,
  pub required_fte: String,
}

impl RawAllocation {
  pub fn into_allocation(self) -> Result<Allocation> {
    Ok(Allocation {
      project:      ProjectId(self.project_id),
      role:         RoleId(self.role_id),
      month:        decode_month(&self.month_date)?,
      required_fte: decode_fte(&self.required_fte)?,
    })
  }
}

pub struct RawScenario {
  pub id:        i64,
  pub name:      String,
  pub kind:      String,
  pub is_active: bool,
}

impl RawScenario {
  pub fn into_scenario(self) -> Result<Scenario> {
    Ok(Scenario {
      id:        ScenarioId(self.id),
      name:      self.name,
      kind:      decode_scenario_kind(&self.kind)?,
      is_active: self.is_active,
    })
  }
}

pub struct RawOverride {
  pub scenario_id:       i64,
  pub project_id:        i64,
  pub included:          bool,
  pub start_override:    Option<String>,
  pub end_override:      Option<String>,
  pub priority_override: Option<u8>,
}

impl RawOverride {
  pub fn into_override(self) -> Result<ScenarioOverride> {
    Ok(ScenarioOverride {
      scenario:          ScenarioId(self.scenario_id),
      project:           ProjectId(self.project_id),
      included:          self.included,
      start_override:    self.start_override.as_deref().map(decode_date).transpose()?,
      end_override:      self.end_override.as_deref().map(decode_date).transpose()?,
      priority_override: self.priority_override,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fte_text_keeps_precision() {
    let fte: Decimal = "0.333333333333".parse().unwrap();
    assert_eq!(decode_fte(&encode_fte(fte)).unwrap(), fte);
  }

  #[test]
  fn bad_values_are_reported_with_their_column() {
    let err = decode_status("archived").unwrap_err();
    assert!(matches!(
      err,
      Error::UnknownDiscriminant { column: "projects.status", .. }
    ));
    assert!(matches!(decode_date("2026-02-30"), Err(Error::DateParse(_))));
    assert!(matches!(decode_fte("lots"), Err(Error::DecimalParse(_))));
  }

  #[test]
  fn months_are_stored_as_first_of_month() {
    let month: Month = "2026-02".parse().unwrap();
    assert_eq!(encode_month(month), "2026-02-01");
    assert_eq!(decode_month("2026-02-01").unwrap(), month);
  }
}
