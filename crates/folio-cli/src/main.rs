//! `folio` command-line front end.
//!
//! Opens the SQLite store named in `folio.toml` (or `--store`), runs one
//! planning query and prints the result as JSON on stdout. Logs go to
//! stderr so output can be piped.

mod settings;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use folio_core::{
  dataset::Dataset,
  model::{OrgUnitId, RoleId, ScenarioId, TeamId},
  month::{Month, TimeGrid},
};
use folio_engine::{CapacityFilter, Planner};
use folio_store_sqlite::SqliteStore;
use serde::Serialize;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Debug, Parser)]
#[command(author, version, about = "Folio capacity and demand planner")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "folio.toml")]
  config: PathBuf,

  /// SQLite database to use instead of the configured one.
  #[arg(long)]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Load a JSON dataset into the store.
  Import {
    file:    PathBuf,
    /// Clear existing rows first.
    #[arg(long)]
    replace: bool,
  },
  #[command(flatten)]
  Query(Query),
}

/// Read-only planning queries.
#[derive(Debug, Subcommand)]
enum Query {
  /// Available FTE per role and month.
  Capacity {
    #[command(flatten)]
    window:   Window,
    #[arg(long)]
    role:     Option<i64>,
    #[arg(long)]
    team:     Option<i64>,
    /// Restrict to teams in this org unit's subtree.
    #[arg(long)]
    org_unit: Option<i64>,
  },
  /// Required FTE per role and month, with contributing projects.
  Demand {
    #[command(flatten)]
    window:   Window,
    #[arg(long)]
    role:     Option<i64>,
    #[arg(long)]
    scenario: Option<i64>,
  },
  /// Capacity against demand with gap and utilisation.
  Gap {
    #[command(flatten)]
    window:   Window,
    #[arg(long)]
    scenario: Option<i64>,
  },
  /// Projects short of staff in a month.
  AtRisk {
    month:    Month,
    #[arg(long)]
    scenario: Option<i64>,
  },
  /// Full priority-ordered apportionment for a month.
  Resolution {
    month:    Month,
    #[arg(long)]
    scenario: Option<i64>,
  },
  /// Capacity and demand rolled up to divisions.
  Divisions { month: Month },
  /// Monthly totals and utilisation.
  Trend {
    /// First month; defaults to the current month.
    #[arg(long)]
    from:   Option<Month>,
    /// Number of months; defaults to `trend_months`.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    months: Option<u32>,
  },
  /// Headcount and portfolio counters.
  Stats {
    /// Reference date; defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,
  },
  /// Number of projects in each status.
  Status,
}

/// An inclusive month window. Missing bounds default to the current month
/// and `trend_months` after the start.
#[derive(Debug, Clone, Copy, Args)]
struct Window {
  #[arg(long)]
  from: Option<Month>,
  #[arg(long)]
  to:   Option<Month>,
}

impl Window {
  fn grid(self, today: NaiveDate, months: u32) -> anyhow::Result<TimeGrid> {
    let from = self.from.unwrap_or_else(|| Month::containing(today));
    let to = match self.to {
      Some(to) => to,
      None => from.plus(months.saturating_sub(1)).ok_or_else(|| {
        anyhow::anyhow!("{months} months from {from} runs past the calendar")
      })?,
    };
    Ok(TimeGrid::try_between(from, to)?)
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config)?;
  if let Some(path) = cli.store {
    settings.store_path = path;
  }

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {}", settings.store_path.display())
    })?;
  info!(path = %settings.store_path.display(), "store opened");

  match cli.command {
    Command::Import { file, replace } => import(&store, &file, replace).await,
    Command::Query(query) => {
      let planner = Planner::new(Arc::new(store));
      let today = Local::now().date_naive();
      run(&planner, query, today, settings.trend_months).await
    }
  }
}

async fn import(
  store: &SqliteStore,
  file: &Path,
  replace: bool,
) -> anyhow::Result<()> {
  let raw = std::fs::read_to_string(file)
    .with_context(|| format!("failed to read {}", file.display()))?;
  let data: Dataset =
    serde_json::from_str(&raw).context("failed to parse dataset")?;
  let summary = if replace {
    store.replace(&data).await?
  } else {
    store.import(&data).await?
  };
  print(&serde_json::json!({
    "org_units":   summary.org_units,
    "roles":       summary.roles,
    "teams":       summary.teams,
    "employees":   summary.employees,
    "projects":    summary.projects,
    "allocations": summary.allocations,
    "scenarios":   summary.scenarios,
    "overrides":   summary.overrides,
  }))
}

async fn run(
  planner: &Planner<SqliteStore>,
  query: Query,
  today: NaiveDate,
  trend_months: u32,
) -> anyhow::Result<()> {
  match query {
    Query::Capacity { window, role, team, org_unit } => {
      let filter = CapacityFilter {
        role:     role.map(RoleId),
        team:     team.map(TeamId),
        org_unit: org_unit.map(OrgUnitId),
      };
      let grid = window.grid(today, trend_months)?;
      print(&planner.capacity(grid, filter).await?)
    }
    Query::Demand { window, role, scenario } => {
      let grid = window.grid(today, trend_months)?;
      print(
        &planner
          .demand(grid, role.map(RoleId), scenario.map(ScenarioId))
          .await?,
      )
    }
    Query::Gap { window, scenario } => {
      let grid = window.grid(today, trend_months)?;
      print(
        &planner
          .capacity_vs_demand(grid, scenario.map(ScenarioId))
          .await?,
      )
    }
    Query::AtRisk { month, scenario } => print(
      &planner
        .at_risk_projects(month, scenario.map(ScenarioId))
        .await?,
    ),
    Query::Resolution { month, scenario } => print(
      &planner
        .allocation_resolution(month, scenario.map(ScenarioId))
        .await?,
    ),
    Query::Divisions { month } => {
      print(&planner.fte_by_division(month).await?)
    }
    Query::Trend { from, months } => {
      let window = Window { from, to: None };
      let grid = window.grid(today, months.unwrap_or(trend_months))?;
      print(&planner.utilization_trend(grid).await?)
    }
    Query::Stats { as_of } => {
      print(&planner.portfolio_stats(as_of.unwrap_or(today)).await?)
    }
    Query::Status => print(&planner.status_distribution().await?),
  }
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn m(s: &str) -> Month { s.parse().unwrap() }

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 19).unwrap() }

  #[test]
  fn parses_subcommands_with_filters() {
    let cli = Cli::try_parse_from([
      "folio", "capacity", "--from", "2026-02", "--to", "2026-04", "--role",
      "3", "--org-unit", "1",
    ])
    .unwrap();
    match cli.command {
      Command::Query(Query::Capacity { window, role, team, org_unit }) => {
        assert_eq!(window.from, Some(m("2026-02")));
        assert_eq!(window.to, Some(m("2026-04")));
        assert_eq!(role, Some(3));
        assert_eq!(team, None);
        assert_eq!(org_unit, Some(1));
      }
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[test]
  fn at_risk_takes_a_positional_month() {
    let cli = Cli::try_parse_from([
      "folio", "--store", "x.db", "at-risk", "2026-02", "--scenario", "4",
    ])
    .unwrap();
    assert_eq!(cli.store, Some(PathBuf::from("x.db")));
    assert!(matches!(
      cli.command,
      Command::Query(Query::AtRisk { scenario: Some(4), .. })
    ));
  }

  #[test]
  fn import_is_kept_apart_from_queries() {
    let cli =
      Cli::try_parse_from(["folio", "import", "data.json", "--replace"]).unwrap();
    assert!(matches!(
      cli.command,
      Command::Import { replace: true, ref file } if file == Path::new("data.json")
    ));
  }

  #[test]
  fn malformed_month_is_rejected() {
    assert!(Cli::try_parse_from(["folio", "divisions", "2026-13"]).is_err());
  }

  #[test]
  fn empty_trend_is_rejected() {
    assert!(Cli::try_parse_from(["folio", "trend", "--months", "0"]).is_err());
  }

  #[test]
  fn window_past_the_calendar_is_an_error() {
    let last = Month::containing(NaiveDate::MAX);
    let window = Window { from: Some(last), to: None };
    assert!(window.grid(today(), 4_000_000).is_err());
    assert_eq!(window.grid(today(), 1).unwrap().months(), &[last]);
  }

  #[test]
  fn open_window_spans_trend_months_from_today() {
    let window = Window { from: None, to: None };
    let grid = window.grid(today(), 6).unwrap();
    assert_eq!(grid.len(), 6);
    assert_eq!(grid.first(), Some(m("2026-10")));
    assert_eq!(grid.last(), Some(m("2027-03")));
  }

  #[test]
  fn inverted_window_is_an_error() {
    let window = Window { from: Some(m("2026-05")), to: Some(m("2026-02")) };
    assert!(window.grid(today(), 6).is_err());
  }
}
