//! Required FTE per role, month and project.
//!
//! Demand is read from allocation rows and adjusted by a [`ScenarioOverlay`].
//! An overlay never mutates the rows it filters. It decides which of them a
//! scenario admits and which priority a project carries under it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use folio_core::{
  Error, Result,
  model::{
    Allocation, Project, ProjectId, RoleId, Scenario, ScenarioId,
    ScenarioOverride,
  },
  month::{Month, TimeGrid},
};
use rust_decimal::Decimal;

// ─── Scenario overlay ────────────────────────────────────────────────────────

/// The per-project overrides of one scenario, keyed for lookup.
///
/// Projects without an override behave exactly as in the baseline.
#[derive(Debug, Clone, Default)]
pub struct ScenarioOverlay {
  scenario:  Option<ScenarioId>,
  overrides: HashMap<ProjectId, ScenarioOverride>,
}

impl ScenarioOverlay {
  /// No scenario: every project with its stored dates and priority.
  pub fn baseline() -> Self { Self::default() }

  /// Build the overlay for scenario `id` from what the store returned.
  ///
  /// Fails with `UnknownScenario` when the scenario row is missing and with
  /// `InactiveScenario` when it exists but is switched off.
  pub fn resolve(
    id: ScenarioId,
    scenario: Option<Scenario>,
    overrides: Vec<ScenarioOverride>,
  ) -> Result<Self> {
    let scenario = scenario.ok_or(Error::UnknownScenario(id))?;
    if !scenario.is_active {
      return Err(Error::InactiveScenario(id));
    }
    Ok(Self::from_overrides(id, overrides))
  }

  /// Overrides belonging to other scenarios are ignored.
  pub fn from_overrides(
    id: ScenarioId,
    overrides: impl IntoIterator<Item = ScenarioOverride>,
  ) -> Self {
    Self {
      scenario:  Some(id),
      overrides: overrides
        .into_iter()
        .filter(|o| o.scenario == id)
        .map(|o| (o.project, o))
        .collect(),
    }
  }

  /// `None` for the baseline.
  pub fn scenario(&self) -> Option<ScenarioId> { self.scenario }

  pub fn override_for(&self, project: ProjectId) -> Option<&ScenarioOverride> {
    self.overrides.get(&project)
  }

  pub fn includes(&self, project: ProjectId) -> bool {
    self.override_for(project).is_none_or(|o| o.included)
  }

  pub fn effective_priority(&self, project: &Project) -> u8 {
    self
      .override_for(project.id)
      .and_then(|o| o.priority_override)
      .unwrap_or(project.priority)
  }

  /// The months a date-overridden project demands over `grid`, as an
  /// inclusive `(first, last)` pair.
  ///
  /// The span replaces the grid bounds for that project, so it may narrow or
  /// widen them. A one-sided override is completed with the grid bound on
  /// the other side. `None` when the project has no date override or the
  /// grid is empty.
  pub fn span_for(
    &self,
    project: ProjectId,
    grid: &TimeGrid,
  ) -> Option<(Month, Month)> {
    let o = self.override_for(project)?;
    if o.start_override.is_none() && o.end_override.is_none() {
      return None;
    }
    let (first, last) = grid.first().zip(grid.last())?;
    Some((
      o.start_override.map_or(first, Month::containing),
      o.end_override.map_or(last, Month::containing),
    ))
  }

  /// Included projects whose override span is non-empty, by project id.
  pub fn date_spans(&self, grid: &TimeGrid) -> Vec<(ProjectId, (Month, Month))> {
    let mut spans: Vec<_> = self
      .overrides
      .values()
      .filter(|o| o.included)
      .filter_map(|o| Some((o.project, self.span_for(o.project, grid)?)))
      .filter(|(_, (start, end))| start <= end)
      .collect();
    spans.sort_by_key(|&(project, _)| project);
    spans
  }

  /// Whether `allocation` counts as demand over `grid` under this overlay.
  pub fn admits(&self, allocation: &Allocation, grid: &TimeGrid) -> bool {
    let Some(o) = self.override_for(allocation.project) else {
      return grid.contains(allocation.month);
    };
    if !o.included {
      return false;
    }
    match self.span_for(allocation.project, grid) {
      Some((start, end)) => start <= allocation.month && allocation.month <= end,
      None => grid.contains(allocation.month),
    }
  }
}

// ─── Demand matrix ───────────────────────────────────────────────────────────

/// `(role, month, project) -> required FTE`, with a `(role, month)` rollup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemandMatrix {
  cells:  BTreeMap<(RoleId, Month, ProjectId), Decimal>,
  totals: BTreeMap<(RoleId, Month), Decimal>,
}

impl DemandMatrix {
  fn add(&mut self, allocation: &Allocation) {
    let fte = allocation.required_fte;
    *self
      .cells
      .entry((allocation.role, allocation.month, allocation.project))
      .or_default() += fte;
    *self
      .totals
      .entry((allocation.role, allocation.month))
      .or_default() += fte;
  }

  /// Total required FTE for a role in a month, over all projects.
  pub fn required(&self, role: RoleId, month: Month) -> Decimal {
    self.totals.get(&(role, month)).copied().unwrap_or_default()
  }

  pub fn required_by(
    &self,
    role: RoleId,
    month: Month,
    project: ProjectId,
  ) -> Decimal {
    self
      .cells
      .get(&(role, month, project))
      .copied()
      .unwrap_or_default()
  }

  /// Every project with demand for `role` in `month`, ordered by project id.
  pub fn projects_for(
    &self,
    role: RoleId,
    month: Month,
  ) -> impl Iterator<Item = (ProjectId, Decimal)> + '_ {
    self
      .cells
      .range((role, month, ProjectId(i64::MIN))..=(role, month, ProjectId(i64::MAX)))
      .map(|(&(_, _, project), &fte)| (project, fte))
  }

  /// Roles with any demand row in `month`.
  pub fn roles_in(&self, month: Month) -> BTreeSet<RoleId> {
    self
      .totals
      .keys()
      .filter(|(_, m)| *m == month)
      .map(|&(role, _)| role)
      .collect()
  }

  pub fn projects(&self) -> BTreeSet<ProjectId> {
    self.cells.keys().map(|&(_, _, project)| project).collect()
  }

  /// Per-project cells ordered by role, month, then project.
  pub fn iter(
    &self,
  ) -> impl Iterator<Item = (RoleId, Month, ProjectId, Decimal)> + '_ {
    self
      .cells
      .iter()
      .map(|(&(role, month, project), &fte)| (role, month, project, fte))
  }

  /// The `(role, month)` rollup ordered by role, then month.
  pub fn totals(&self) -> impl Iterator<Item = (RoleId, Month, Decimal)> + '_ {
    self
      .totals
      .iter()
      .map(|(&(role, month), &fte)| (role, month, fte))
  }

  pub fn total_in(&self, month: Month) -> Decimal {
    self
      .totals
      .iter()
      .filter(|((_, m), _)| *m == month)
      .map(|(_, fte)| *fte)
      .sum()
  }

  pub fn is_empty(&self) -> bool { self.cells.is_empty() }
}

/// Aggregate the allocation rows an overlay admits over `grid`.
///
/// Duplicate rows for the same `(project, role, month)` are summed.
pub fn demand_by_role_month(
  grid: &TimeGrid,
  allocations: &[Allocation],
  overlay: &ScenarioOverlay,
  role: Option<RoleId>,
) -> DemandMatrix {
  let mut matrix = DemandMatrix::default();
  for allocation in allocations {
    if role.is_none_or(|r| allocation.role == r)
      && overlay.admits(allocation, grid)
    {
      matrix.add(allocation);
    }
  }
  matrix
}

#[cfg(test)]
mod tests {
  use folio_core::model::{ProjectStatus, ScenarioKind};

  use super::*;

  fn m(s: &str) -> Month { s.parse().unwrap() }

  fn fte(s: &str) -> Decimal { s.parse().unwrap() }

  fn alloc(project: i64, role: i64, month: &str, required: &str) -> Allocation {
    Allocation {
      project:      ProjectId(project),
      role:         RoleId(role),
      month:        m(month),
      required_fte: fte(required),
    }
  }

  fn rows() -> Vec<Allocation> {
    vec![
      alloc(1, 1, "2026-01", "1.0"),
      alloc(1, 1, "2026-02", "1.5"),
      alloc(1, 1, "2026-03", "1.5"),
      alloc(1, 2, "2026-02", "0.5"),
      alloc(2, 1, "2026-02", "1.5"),
      alloc(2, 1, "2026-05", "2.0"),
    ]
  }

  fn what_if(active: bool) -> Scenario {
    Scenario {
      id:        ScenarioId(9),
      name:      "hiring freeze".into(),
      kind:      ScenarioKind::WhatIf,
      is_active: active,
    }
  }

  #[test]
  fn baseline_keeps_rows_inside_the_grid() {
    let grid = TimeGrid::between(m("2026-01"), m("2026-03"));
    let demand =
      demand_by_role_month(&grid, &rows(), &ScenarioOverlay::baseline(), None);

    assert_eq!(demand.required(RoleId(1), m("2026-02")), fte("3.0"));
    assert_eq!(demand.required(RoleId(1), m("2026-05")), Decimal::ZERO);
    assert_eq!(demand.required_by(RoleId(1), m("2026-02"), ProjectId(2)), fte("1.5"));
    assert_eq!(demand.total_in(m("2026-02")), fte("3.5"));
  }

  #[test]
  fn role_filter_restricts_rows() {
    let grid = TimeGrid::between(m("2026-01"), m("2026-03"));
    let demand = demand_by_role_month(
      &grid,
      &rows(),
      &ScenarioOverlay::baseline(),
      Some(RoleId(2)),
    );
    assert_eq!(demand.totals().count(), 1);
    assert_eq!(demand.roles_in(m("2026-02")), BTreeSet::from([RoleId(2)]));
  }

  #[test]
  fn excluded_project_contributes_nothing() {
    let grid = TimeGrid::between(m("2026-01"), m("2026-12"));
    let overlay = ScenarioOverlay::from_overrides(ScenarioId(9), [
      ScenarioOverride {
        included: false,
        ..ScenarioOverride::new(ScenarioId(9), ProjectId(2))
      },
    ]);
    let demand = demand_by_role_month(&grid, &rows(), &overlay, None);

    assert!(!demand.projects().contains(&ProjectId(2)));
    assert!(demand.iter().all(|(_, _, p, _)| p != ProjectId(2)));
    assert_eq!(demand.required(RoleId(1), m("2026-02")), fte("1.5"));
  }

  #[test]
  fn date_overrides_narrow_the_window() {
    let grid = TimeGrid::between(m("2026-01"), m("2026-12"));
    let overlay = ScenarioOverlay::from_overrides(ScenarioId(9), [
      ScenarioOverride {
        start_override: Some("2026-02-15".parse().unwrap()),
        end_override: Some("2026-02-20".parse().unwrap()),
        ..ScenarioOverride::new(ScenarioId(9), ProjectId(1))
      },
      ScenarioOverride {
        end_override: Some("2026-03-01".parse().unwrap()),
        ..ScenarioOverride::new(ScenarioId(9), ProjectId(2))
      },
    ]);
    let demand = demand_by_role_month(&grid, &rows(), &overlay, None);

    let project_one: Vec<Month> = demand
      .iter()
      .filter(|(_, _, p, _)| *p == ProjectId(1))
      .map(|(_, month, _, _)| month)
      .collect();
    assert_eq!(project_one, vec![m("2026-02"), m("2026-02")]);
    assert_eq!(demand.required(RoleId(1), m("2026-05")), Decimal::ZERO);
    assert_eq!(demand.required_by(RoleId(1), m("2026-02"), ProjectId(2)), fte("1.5"));
  }

  #[test]
  fn date_overrides_widen_the_window() {
    let grid = TimeGrid::between(m("2026-01"), m("2026-03"));
    let overlay = ScenarioOverlay::from_overrides(ScenarioId(9), [
      ScenarioOverride {
        start_override: Some("2026-01-01".parse().unwrap()),
        end_override: Some("2026-06-30".parse().unwrap()),
        ..ScenarioOverride::new(ScenarioId(9), ProjectId(2))
      },
    ]);
    let demand = demand_by_role_month(&grid, &rows(), &overlay, None);

    assert_eq!(demand.required_by(RoleId(1), m("2026-05"), ProjectId(2)), fte("2.0"));
    assert_eq!(demand.required_by(RoleId(1), m("2026-02"), ProjectId(2)), fte("1.5"));
    assert_eq!(
      overlay.date_spans(&grid),
      vec![(ProjectId(2), (m("2026-01"), m("2026-06")))]
    );
  }

  #[test]
  fn one_sided_override_takes_the_other_grid_bound() {
    let grid = TimeGrid::between(m("2026-02"), m("2026-03"));
    let overlay = ScenarioOverlay::from_overrides(ScenarioId(9), [
      ScenarioOverride {
        start_override: Some("2025-12-01".parse().unwrap()),
        ..ScenarioOverride::new(ScenarioId(9), ProjectId(1))
      },
      ScenarioOverride {
        included: false,
        start_override: Some("2025-12-01".parse().unwrap()),
        ..ScenarioOverride::new(ScenarioId(9), ProjectId(2))
      },
    ]);
    assert_eq!(
      overlay.span_for(ProjectId(1), &grid),
      Some((m("2025-12"), m("2026-03")))
    );
    assert_eq!(overlay.span_for(ProjectId(3), &grid), None);
    assert_eq!(overlay.date_spans(&grid).len(), 1);

    let demand = demand_by_role_month(&grid, &rows(), &overlay, None);
    assert_eq!(demand.required_by(RoleId(1), m("2026-01"), ProjectId(1)), fte("1.0"));
    assert_eq!(demand.required_by(RoleId(1), m("2026-02"), ProjectId(2)), Decimal::ZERO);
  }

  #[test]
  fn priority_override_changes_priority_only() {
    let project = Project {
      id:            ProjectId(1),
      name:          "Checkout".into(),
      priority:      3,
      planned_start: "2026-01-01".parse().unwrap(),
      planned_end:   "2026-06-30".parse().unwrap(),
      status:        ProjectStatus::Active,
    };
    let overlay = ScenarioOverlay::from_overrides(ScenarioId(9), [
      ScenarioOverride {
        priority_override: Some(1),
        ..ScenarioOverride::new(ScenarioId(9), ProjectId(1))
      },
    ]);
    assert_eq!(overlay.effective_priority(&project), 1);
    assert_eq!(ScenarioOverlay::baseline().effective_priority(&project), 3);

    let grid = TimeGrid::between(m("2026-01"), m("2026-03"));
    assert_eq!(
      demand_by_role_month(&grid, &rows(), &overlay, None),
      demand_by_role_month(&grid, &rows(), &ScenarioOverlay::baseline(), None),
    );
  }

  #[test]
  fn foreign_overrides_are_ignored() {
    let overlay = ScenarioOverlay::from_overrides(ScenarioId(9), [
      ScenarioOverride {
        included: false,
        ..ScenarioOverride::new(ScenarioId(4), ProjectId(1))
      },
    ]);
    assert!(overlay.includes(ProjectId(1)));
  }

  #[test]
  fn resolve_rejects_missing_and_inactive_scenarios() {
    let missing = ScenarioOverlay::resolve(ScenarioId(9), None, vec![]);
    assert!(matches!(missing, Err(Error::UnknownScenario(ScenarioId(9)))));

    let inactive =
      ScenarioOverlay::resolve(ScenarioId(9), Some(what_if(false)), vec![]);
    assert!(matches!(inactive, Err(Error::InactiveScenario(ScenarioId(9)))));

    let active =
      ScenarioOverlay::resolve(ScenarioId(9), Some(what_if(true)), vec![])
        .unwrap();
    assert_eq!(active.scenario(), Some(ScenarioId(9)));
  }

  #[test]
  fn duplicate_rows_are_summed() {
    let grid = TimeGrid::single(m("2026-02"));
    let demand = demand_by_role_month(
      &grid,
      &[alloc(1, 1, "2026-02", "0.5"), alloc(1, 1, "2026-02", "0.25")],
      &ScenarioOverlay::baseline(),
      None,
    );
    assert_eq!(demand.required_by(RoleId(1), m("2026-02"), ProjectId(1)), fte("0.75"));
    assert_eq!(demand.projects_for(RoleId(1), m("2026-02")).count(), 1);
  }
}
