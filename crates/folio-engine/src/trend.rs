//! Portfolio-wide series and headline numbers.

use chrono::NaiveDate;
use folio_core::{
  model::{Allocation, Employee, Project, ProjectStatus, Team},
  month::{Month, TimeGrid},
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{gap::utilization, supply::SupplyResolver};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
  pub month:    Month,
  pub capacity: Decimal,
  pub demand:   Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UtilizationPoint {
  pub month:       Month,
  pub capacity:    Decimal,
  pub demand:      Decimal,
  /// Percent, rounded to two places; zero when there is no capacity.
  pub utilization: Decimal,
}

/// Total capacity of every active employee and total demand of every
/// allocation, per grid month. Project status and scenarios play no part.
pub fn capacity_demand_by_month(
  grid: &TimeGrid,
  employees: &[Employee],
  allocations: &[Allocation],
) -> Vec<MonthTotals> {
  let resolver = SupplyResolver::new(grid, employees);
  grid
    .iter()
    .map(|month| MonthTotals {
      month,
      capacity: resolver.active_in(month).map(|e| e.fte_capacity).sum(),
      demand: allocations
        .iter()
        .filter(|a| a.month == month)
        .map(|a| a.required_fte)
        .sum(),
    })
    .collect()
}

pub fn utilization_trend(totals: &[MonthTotals]) -> Vec<UtilizationPoint> {
  totals
    .iter()
    .map(|t| UtilizationPoint {
      month:       t.month,
      capacity:    t.capacity,
      demand:      t.demand,
      utilization: utilization(t.demand, t.capacity),
    })
    .collect()
}

/// Headline counts as of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioStats {
  pub as_of:            NaiveDate,
  pub active_employees: usize,
  pub total_projects:   usize,
  pub active_projects:  usize,
  pub teams:            usize,
  /// Summed capacity of the employees active on `as_of`.
  pub total_fte:        Decimal,
}

pub fn portfolio_stats(
  as_of: NaiveDate,
  employees: &[Employee],
  projects: &[Project],
  teams: &[Team],
) -> PortfolioStats {
  let active = || employees.iter().filter(|e| e.is_active_on(as_of));
  PortfolioStats {
    as_of,
    active_employees: active().count(),
    total_projects: projects.len(),
    active_projects: projects
      .iter()
      .filter(|p| p.status == ProjectStatus::Active)
      .count(),
    teams: teams.len(),
    total_fte: active().map(|e| e.fte_capacity).sum(),
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
  pub status: ProjectStatus,
  pub count:  usize,
}

/// Project count per status. Every status is listed, in declaration order.
pub fn status_distribution(projects: &[Project]) -> Vec<StatusCount> {
  ProjectStatus::ALL
    .into_iter()
    .map(|status| StatusCount {
      status,
      count: projects.iter().filter(|p| p.status == status).count(),
    })
    .collect()
}
