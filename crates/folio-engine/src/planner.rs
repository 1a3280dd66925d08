//! [`Planner`], the query service over an [`EntityStore`].
//!
//! Each query loads one [`Snapshot`], runs the pure computations of this
//! crate against it, and labels the result with role names. The evaluation
//! month or window is always an argument; nothing here reads the clock.

use std::sync::Arc;

use chrono::NaiveDate;
use folio_core::{
  model::{OrgUnitId, ProjectId, RoleId, ScenarioId, TeamId},
  month::{Month, TimeGrid},
  store::EntityStore,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::{
  error::{Error, Result},
  gap::{GapRow, gap_by_role_month},
  risk::{AllocationResolution, AtRiskProject},
  rollup::{RollupReport, fte_by_division},
  snapshot::Snapshot,
  supply::SupplyFilter,
  trend::{
    MonthTotals, PortfolioStats, StatusCount, UtilizationPoint,
    capacity_demand_by_month, portfolio_stats, status_distribution,
    utilization_trend,
  },
};

// ─── Parameters and rows ─────────────────────────────────────────────────────

/// Restricts which employees count towards [`Planner::capacity`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityFilter {
  pub role:     Option<RoleId>,
  pub team:     Option<TeamId>,
  /// Only teams placed in this unit's subtree.
  pub org_unit: Option<OrgUnitId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityRow {
  pub role:          RoleId,
  pub role_name:     String,
  pub month:         Month,
  pub available_fte: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemandRow {
  pub role:         RoleId,
  pub role_name:    String,
  pub month:        Month,
  pub required_fte: Decimal,
  /// Contributing projects, ordered by id.
  pub projects:     Vec<ProjectDemand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDemand {
  pub project:      ProjectId,
  pub required_fte: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapReportRow {
  pub role:          RoleId,
  pub role_name:     String,
  pub month:         Month,
  pub available_fte: Decimal,
  pub required_fte:  Decimal,
  pub gap:           Decimal,
  pub utilization:   Decimal,
}

// ─── Planner ─────────────────────────────────────────────────────────────────

/// Answers capacity and demand questions against one store.
///
/// Cloning is cheap and clones share the store.
#[derive(Debug)]
pub struct Planner<S> {
  store: Arc<S>,
}

impl<S> Clone for Planner<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: EntityStore> Planner<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn snapshot(
    &self,
    grid: TimeGrid,
    scenario: Option<ScenarioId>,
  ) -> Result<Snapshot> {
    Snapshot::load(self.store.as_ref(), grid, scenario).await
  }

  /// Available FTE per role per month.
  pub async fn capacity(
    &self,
    grid: TimeGrid,
    filter: CapacityFilter,
  ) -> Result<Vec<CapacityRow>> {
    let snap = self.snapshot(grid, None).await?;
    let within = filter
      .org_unit
      .map(|unit| snap.teams_within(unit))
      .transpose()?;
    let supply = snap.supply(&SupplyFilter {
      role: filter.role,
      team: filter.team,
      within,
    });

    let rows: Vec<CapacityRow> = supply
      .iter()
      .map(|(role, month, available_fte)| CapacityRow {
        role,
        role_name: snap.role_name(role),
        month,
        available_fte,
      })
      .collect();
    debug!(months = snap.grid.len(), rows = rows.len(), "capacity resolved");
    Ok(rows)
  }

  /// Required FTE per role per month under `scenario`.
  pub async fn demand(
    &self,
    grid: TimeGrid,
    role: Option<RoleId>,
    scenario: Option<ScenarioId>,
  ) -> Result<Vec<DemandRow>> {
    let snap = self.snapshot(grid, scenario).await?;
    let demand = snap.demand(role);

    let rows: Vec<DemandRow> = demand
      .totals()
      .map(|(role, month, required_fte)| DemandRow {
        role,
        role_name: snap.role_name(role),
        month,
        required_fte,
        projects: demand
          .projects_for(role, month)
          .map(|(project, required_fte)| ProjectDemand { project, required_fte })
          .collect(),
      })
      .collect();
    debug!(
      months = snap.grid.len(),
      rows = rows.len(),
      scenario = ?snap.overlay.scenario(),
      "demand resolved"
    );
    Ok(rows)
  }

  /// Gap and utilization for every role and month with supply or demand.
  pub async fn capacity_vs_demand(
    &self,
    grid: TimeGrid,
    scenario: Option<ScenarioId>,
  ) -> Result<Vec<GapReportRow>> {
    let snap = self.snapshot(grid, scenario).await?;
    let supply = snap.supply(&SupplyFilter::default());
    let demand = snap.demand(None);

    let rows: Vec<GapReportRow> = gap_by_role_month(&supply, &demand)
      .into_iter()
      .map(|row| {
        let utilization = row.utilization();
        let GapRow { role, month, available_fte, required_fte, gap } = row;
        GapReportRow {
          role,
          role_name: snap.role_name(role),
          month,
          available_fte,
          required_fte,
          gap,
          utilization,
        }
      })
      .collect();
    debug!(
      rows = rows.len(),
      short = rows.iter().filter(|r| r.gap < Decimal::ZERO).count(),
      "gap resolved"
    );
    Ok(rows)
  }

  /// The full served/shortfall table of `month`.
  pub async fn allocation_resolution(
    &self,
    month: Month,
    scenario: Option<ScenarioId>,
  ) -> Result<AllocationResolution> {
    let snap = self.snapshot(TimeGrid::single(month), scenario).await?;
    Ok(resolve_month(&snap, month))
  }

  /// Active projects that cannot be fully served in `month`, worst first.
  pub async fn at_risk_projects(
    &self,
    month: Month,
    scenario: Option<ScenarioId>,
  ) -> Result<Vec<AtRiskProject>> {
    let snap = self.snapshot(TimeGrid::single(month), scenario).await?;
    let at_risk = resolve_month(&snap, month).at_risk(&snap.projects, &snap.roles);
    debug!(%month, at_risk = at_risk.len(), "risk resolved");
    Ok(at_risk)
  }

  /// Capacity per division in `month` with apportioned baseline demand.
  pub async fn fte_by_division(&self, month: Month) -> Result<RollupReport> {
    let snap = self.snapshot(TimeGrid::single(month), None).await?;
    let report = fte_by_division(
      month,
      &snap.org_index(),
      &snap.teams,
      &snap.employees,
      &snap.demand(None),
    )?;
    debug!(%month, divisions = report.divisions.len(), "division rollup resolved");
    Ok(report)
  }

  pub async fn capacity_demand_by_month(
    &self,
    grid: TimeGrid,
  ) -> Result<Vec<MonthTotals>> {
    let snap = self.snapshot(grid, None).await?;
    Ok(capacity_demand_by_month(
      &snap.grid,
      &snap.employees,
      &snap.allocations,
    ))
  }

  pub async fn utilization_trend(
    &self,
    grid: TimeGrid,
  ) -> Result<Vec<UtilizationPoint>> {
    let totals = self.capacity_demand_by_month(grid).await?;
    Ok(utilization_trend(&totals))
  }

  pub async fn portfolio_stats(&self, as_of: NaiveDate) -> Result<PortfolioStats> {
    let grid = TimeGrid::single(Month::containing(as_of));
    let snap = self.snapshot(grid, None).await?;
    Ok(portfolio_stats(as_of, &snap.employees, &snap.projects, &snap.teams))
  }

  pub async fn status_distribution(&self) -> Result<Vec<StatusCount>> {
    let projects = self.store.list_projects(None).await.map_err(Error::store)?;
    Ok(status_distribution(&projects))
  }
}

fn resolve_month(snap: &Snapshot, month: Month) -> AllocationResolution {
  AllocationResolution::resolve(
    month,
    &snap.supply(&SupplyFilter::default()),
    &snap.demand(None),
    &snap.projects,
    &snap.overlay,
  )
}
