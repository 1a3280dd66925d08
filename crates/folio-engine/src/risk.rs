//! Priority-ordered apportionment of scarce role capacity.
//!
//! For one month and one role, the available FTE is handed out greedily to
//! active projects in a fixed order: effective priority, then planned start,
//! then project id. Whatever a project cannot be served is its shortfall for
//! that role. A project is at risk when its shortfall across all roles is
//! positive.
//!
//! Capacity is never counted twice. Comparing each project's requirement
//! against the whole pool would report two projects that each need 1.5 FTE
//! of a 2.0 FTE pool as both healthy.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use folio_core::{
  model::{Project, ProjectId, ProjectStatus, Role, RoleId},
  month::Month,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
  demand::{DemandMatrix, ScenarioOverlay},
  round_fte,
  supply::SupplyMatrix,
};

/// A project competing for one role's capacity in one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contender {
  pub project:       ProjectId,
  pub priority:      u8,
  pub planned_start: NaiveDate,
  pub required:      Decimal,
}

/// What one contender received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
  pub project:   ProjectId,
  pub priority:  u8,
  pub required:  Decimal,
  pub served:    Decimal,
  pub shortfall: Decimal,
}

/// The full outcome for one role in one month.
///
/// `grants` is in service order; `remaining` is what was left unclaimed, so
/// the served amounts plus `remaining` always equal `available`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleApportionment {
  pub role:      RoleId,
  pub month:     Month,
  pub available: Decimal,
  pub remaining: Decimal,
  pub grants:    Vec<Grant>,
}

impl RoleApportionment {
  pub fn served(&self) -> Decimal { self.grants.iter().map(|g| g.served).sum() }

  pub fn shortfall(&self) -> Decimal {
    self.grants.iter().map(|g| g.shortfall).sum()
  }
}

/// Serve `contenders` from `available`, best priority first.
pub fn apportion(
  role: RoleId,
  month: Month,
  available: Decimal,
  mut contenders: Vec<Contender>,
) -> RoleApportionment {
  contenders
    .sort_by_key(|c| (c.priority, c.planned_start, c.project));

  // Negative capacity cannot be handed out.
  let mut remaining = available.max(Decimal::ZERO);
  let grants = contenders
    .into_iter()
    .map(|c| {
      let served = c.required.min(remaining);
      remaining -= served;
      Grant {
        project: c.project,
        priority: c.priority,
        required: c.required,
        served,
        shortfall: c.required - served,
      }
    })
    .collect();

  RoleApportionment { role, month, available, remaining, grants }
}

// ─── Month resolution ────────────────────────────────────────────────────────

/// Every role's apportionment for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationResolution {
  pub month: Month,
  /// Ordered by role id. Only roles with at least one contender appear.
  pub roles: Vec<RoleApportionment>,
}

impl AllocationResolution {
  /// Apportion `month` across the active projects among `projects`.
  ///
  /// Projects that are not active, and demand cells with no positive
  /// requirement, never contend.
  pub fn resolve(
    month: Month,
    supply: &SupplyMatrix,
    demand: &DemandMatrix,
    projects: &[Project],
    overlay: &ScenarioOverlay,
  ) -> Self {
    let active: HashMap<ProjectId, &Project> = projects
      .iter()
      .filter(|p| p.status == ProjectStatus::Active)
      .map(|p| (p.id, p))
      .collect();

    let roles = demand
      .roles_in(month)
      .into_iter()
      .filter_map(|role| {
        let contenders: Vec<Contender> = demand
          .projects_for(role, month)
          .filter(|(_, required)| *required > Decimal::ZERO)
          .filter_map(|(id, required)| {
            let project = active.get(&id)?;
            Some(Contender {
              project: id,
              priority: overlay.effective_priority(project),
              planned_start: project.planned_start,
              required,
            })
          })
          .collect();
        (!contenders.is_empty()).then(|| {
          apportion(role, month, supply.available(role, month), contenders)
        })
      })
      .collect();

    Self { month, roles }
  }

  pub fn role(&self, role: RoleId) -> Option<&RoleApportionment> {
    self.roles.iter().find(|r| r.role == role)
  }

  /// Projects with a positive total shortfall, worst first.
  ///
  /// Ties are broken by priority, then project id. Role names come from
  /// `roles`; a role missing from it is named by its id.
  pub fn at_risk(&self, projects: &[Project], roles: &[Role]) -> Vec<AtRiskProject> {
    let names: HashMap<RoleId, &str> =
      roles.iter().map(|r| (r.id, r.name.as_str())).collect();

    struct Tally {
      priority:  u8,
      shortfall: Decimal,
      roles:     BTreeSet<String>,
    }
    let mut tallies: BTreeMap<ProjectId, Tally> = BTreeMap::new();
    for apportionment in &self.roles {
      for grant in apportionment.grants.iter().filter(|g| g.shortfall > Decimal::ZERO) {
        let tally = tallies.entry(grant.project).or_insert_with(|| Tally {
          priority:  grant.priority,
          shortfall: Decimal::ZERO,
          roles:     BTreeSet::new(),
        });
        tally.shortfall += grant.shortfall;
        tally.roles.insert(
          names
            .get(&apportionment.role)
            .map(|n| n.to_string())
            .unwrap_or_else(|| apportionment.role.to_string()),
        );
      }
    }

    let by_id: HashMap<ProjectId, &Project> =
      projects.iter().map(|p| (p.id, p)).collect();
    let mut at_risk: Vec<(Decimal, AtRiskProject)> = tallies
      .into_iter()
      .filter_map(|(id, tally)| {
        let project = by_id.get(&id)?;
        Some((tally.shortfall, AtRiskProject {
          id,
          name: project.name.clone(),
          status: project.status,
          priority: tally.priority,
          shortfall: round_fte(tally.shortfall),
          roles: tally.roles.into_iter().collect(),
        }))
      })
      .collect();

    at_risk.sort_by(|(a_short, a), (b_short, b)| {
      b_short
        .cmp(a_short)
        .then(a.priority.cmp(&b.priority))
        .then(a.id.cmp(&b.id))
    });
    at_risk.into_iter().map(|(_, project)| project).collect()
  }
}

/// An active project that cannot be fully served in the evaluated month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtRiskProject {
  pub id:        ProjectId,
  pub name:      String,
  pub status:    ProjectStatus,
  /// The effective priority under the evaluated scenario.
  pub priority:  u8,
  /// Total shortfall across roles, rounded to two places.
  pub shortfall: Decimal,
  /// Names of the roles the project is short on, sorted.
  pub roles:     Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fte(s: &str) -> Decimal { s.parse().unwrap() }

  fn m(s: &str) -> Month { s.parse().unwrap() }

  fn contender(project: i64, priority: u8, start: &str, required: &str) -> Contender {
    Contender {
      project: ProjectId(project),
      priority,
      planned_start: start.parse().unwrap(),
      required: fte(required),
    }
  }

  #[test]
  fn higher_priority_is_served_first() {
    let result = apportion(RoleId(1), m("2026-02"), fte("2.0"), vec![
      contender(2, 2, "2026-01-01", "1.5"),
      contender(1, 1, "2026-01-01", "1.5"),
    ]);

    assert_eq!(result.grants[0].project, ProjectId(1));
    assert_eq!(result.grants[0].served, fte("1.5"));
    assert_eq!(result.grants[0].shortfall, Decimal::ZERO);
    assert_eq!(result.grants[1].served, fte("0.5"));
    assert_eq!(result.grants[1].shortfall, fte("1.0"));
    assert_eq!(result.remaining, Decimal::ZERO);
  }

  #[test]
  fn ties_break_on_start_then_id() {
    let result = apportion(RoleId(1), m("2026-02"), fte("1.0"), vec![
      contender(7, 3, "2026-02-01", "1.0"),
      contender(5, 3, "2026-03-01", "1.0"),
      contender(4, 3, "2026-02-01", "1.0"),
    ]);
    let order: Vec<ProjectId> = result.grants.iter().map(|g| g.project).collect();
    assert_eq!(order, vec![ProjectId(4), ProjectId(7), ProjectId(5)]);
    assert_eq!(result.grants[0].served, fte("1.0"));
    assert_eq!(result.grants[1].served, Decimal::ZERO);
  }

  #[test]
  fn served_plus_remaining_equals_available() {
    let result = apportion(RoleId(1), m("2026-02"), fte("3.25"), vec![
      contender(1, 1, "2026-01-01", "0.75"),
      contender(2, 4, "2026-01-01", "1.0"),
      contender(3, 2, "2026-01-01", "0.5"),
    ]);
    assert_eq!(result.served() + result.remaining, result.available);
    assert_eq!(result.remaining, fte("1.0"));
    assert_eq!(result.shortfall(), Decimal::ZERO);
    for grant in &result.grants {
      assert!(grant.served <= grant.required);
    }
  }

  #[test]
  fn zero_capacity_leaves_everyone_short() {
    let result = apportion(RoleId(1), m("2026-02"), Decimal::ZERO, vec![
      contender(1, 1, "2026-01-01", "0.4"),
    ]);
    assert_eq!(result.grants[0].shortfall, fte("0.4"));
    assert_eq!(result.remaining, Decimal::ZERO);
  }
}
