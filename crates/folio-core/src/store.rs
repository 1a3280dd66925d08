//! The `EntityStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `folio-store-sqlite`).
//! The engine depends on this abstraction, never on a concrete backend, and
//! only ever reads through it.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  model::{
    Allocation, Employee, OrgUnit, Project, ProjectId, ProjectStatus, Role,
    RoleId, Scenario, ScenarioId, ScenarioOverride, Team, TeamId,
  },
  month::Month,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`EntityStore::list_employees`].
#[derive(Debug, Clone, Default)]
pub struct EmployeeQuery {
  pub role:           Option<RoleId>,
  pub team:           Option<TeamId>,
  /// Keep employees whose active window overlaps `[from, to]`.
  pub active_between: Option<(NaiveDate, NaiveDate)>,
}

impl EmployeeQuery {
  pub fn matches(&self, employee: &Employee) -> bool {
    self.role.is_none_or(|r| employee.role == r)
      && self.team.is_none_or(|t| employee.team == t)
      && self.active_between.is_none_or(|(from, to)| {
        employee.active_from <= to
          && employee.active_to.is_none_or(|end| end >= from)
      })
  }
}

/// Parameters for [`EntityStore::list_allocations`].
#[derive(Debug, Clone, Default)]
pub struct AllocationQuery {
  pub project: Option<ProjectId>,
  pub role:    Option<RoleId>,
  /// Inclusive month bounds.
  pub months:  Option<(Month, Month)>,
}

impl AllocationQuery {
  pub fn matches(&self, allocation: &Allocation) -> bool {
    self.project.is_none_or(|p| allocation.project == p)
      && self.role.is_none_or(|r| allocation.role == r)
      && self.months.is_none_or(|(first, last)| {
        first <= allocation.month && allocation.month <= last
      })
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read access to the rows the engine consumes.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait EntityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Organisation ──────────────────────────────────────────────────────

  fn list_org_units(
    &self,
  ) -> impl Future<Output = Result<Vec<OrgUnit>, Self::Error>> + Send + '_;

  fn list_roles(
    &self,
  ) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + '_;

  fn list_teams(
    &self,
  ) -> impl Future<Output = Result<Vec<Team>, Self::Error>> + Send + '_;

  // ── Supply ────────────────────────────────────────────────────────────

  fn list_employees(
    &self,
    query: EmployeeQuery,
  ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + '_;

  // ── Demand ────────────────────────────────────────────────────────────

  /// List projects, optionally restricted to one status.
  fn list_projects(
    &self,
    status: Option<ProjectStatus>,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_;

  fn list_active_projects(
    &self,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_ {
    self.list_projects(Some(ProjectStatus::Active))
  }

  fn list_allocations(
    &self,
    query: AllocationQuery,
  ) -> impl Future<Output = Result<Vec<Allocation>, Self::Error>> + Send + '_;

  // ── Scenarios ─────────────────────────────────────────────────────────

  /// Retrieve a scenario by id. Returns `None` if not found.
  fn get_scenario(
    &self,
    id: ScenarioId,
  ) -> impl Future<Output = Result<Option<Scenario>, Self::Error>> + Send + '_;

  fn list_scenario_overrides(
    &self,
    scenario: ScenarioId,
  ) -> impl Future<Output = Result<Vec<ScenarioOverride>, Self::Error>> + Send + '_;
}
