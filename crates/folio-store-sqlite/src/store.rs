//! [`SqliteStore`], the SQLite implementation of [`EntityStore`].

use std::path::Path;

use folio_core::{
  dataset::Dataset,
  model::{
    Allocation, Employee, OrgUnit, Project, ProjectStatus, Role, RoleId,
    Scenario, ScenarioId, ScenarioOverride, Team, TeamId,
  },
  store::{AllocationQuery, EmployeeQuery, EntityStore},
};
use rusqlite::OptionalExtension as _;
use tracing::info;

use crate::{
  Result,
  encode::{
    RawAllocation, RawEmployee, RawOrgUnit, RawOverride, RawProject,
    RawScenario, encode_date, encode_fte, encode_month, encode_org_unit_kind,
    encode_scenario_kind, encode_status,
  },
  error::Error,
  schema::{SCHEMA, TABLES},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Folio entity store backed by a single SQLite file.
///
/// Clones share the underlying connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Row counts written by [`SqliteStore::import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
  pub org_units:   usize,
  pub roles:       usize,
  pub teams:       usize,
  pub employees:   usize,
  pub projects:    usize,
  pub allocations: usize,
  pub scenarios:   usize,
  pub overrides:   usize,
}

impl ImportSummary {
  fn of(data: &Dataset) -> Self {
    Self {
      org_units:   data.org_units.len(),
      roles:       data.roles.len(),
      teams:       data.teams.len(),
      employees:   data.employees.len(),
      projects:    data.projects.len(),
      allocations: data.allocations.len(),
      scenarios:   data.scenarios.len(),
      overrides:   data.overrides.len(),
    }
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory database.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert every row of `data` with its own ids, in one transaction.
  ///
  /// References are checked when the transaction commits, so rows may
  /// appear in any order. Any failure (a duplicate id, a dangling
  /// reference) rolls the whole import back.
  pub async fn import(&self, data: &Dataset) -> Result<ImportSummary> {
    self.write(data.clone(), false).await
  }

  /// Like [`SqliteStore::import`], but first deletes every existing row in
  /// the same transaction.
  pub async fn replace(&self, data: &Dataset) -> Result<ImportSummary> {
    self.write(data.clone(), true).await
  }

  async fn write(&self, data: Dataset, clear: bool) -> Result<ImportSummary> {
    let summary = ImportSummary::of(&data);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if clear {
          for table in TABLES {
            tx.execute(&format!("DELETE FROM {table}"), [])?;
          }
        }
        insert_dataset(&tx, &data)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    info!(?summary, replaced = clear, "dataset imported");
    Ok(summary)
  }
}

fn insert_dataset(
  tx: &rusqlite::Transaction<'_>,
  data: &Dataset,
) -> rusqlite::Result<()> {
  for unit in &data.org_units {
    tx.execute(
      "INSERT INTO org_units (id, name, kind, parent_id) VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![
        unit.id.0,
        unit.name,
        encode_org_unit_kind(unit.kind),
        unit.parent.map(|p| p.0),
      ],
    )?;
  }

  for role in &data.roles {
    tx.execute(
      "INSERT INTO roles (id, name) VALUES (?1, ?2)",
      rusqlite::params![role.id.0, role.name],
    )?;
  }

  for team in &data.teams {
    tx.execute(
      "INSERT INTO teams (id, name, org_unit_id, lead_employee_id)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![team.id.0, team.name, team.org_unit.0, team.lead.map(|l| l.0)],
    )?;
  }

  for e in &data.employees {
    tx.execute(
      "INSERT INTO employees (
         id, name, role_id, team_id, fte_capacity, active_from, active_to
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      rusqlite::params![
        e.id.0,
        e.name,
        e.role.0,
        e.team.0,
        encode_fte(e.fte_capacity),
        encode_date(e.active_from),
        e.active_to.map(encode_date),
      ],
    )?;
  }

  for p in &data.projects {
    tx.execute(
      "INSERT INTO projects (id, name, priority, planned_start, planned_end, status)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        p.id.0,
        p.name,
        p.priority,
        encode_date(p.planned_start),
        encode_date(p.planned_end),
        encode_status(p.status),
      ],
    )?;
  }

  for a in &data.allocations {
    tx.execute(
      "INSERT INTO allocations (project_id, role_id, month_date, required_fte)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![
        a.project.0,
        a.role.0,
        encode_month(a.month),
        encode_fte(a.required_fte),
      ],
    )?;
  }

  for s in &data.scenarios {
    tx.execute(
      "INSERT INTO scenarios (id, name, kind, is_active) VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![s.id.0, s.name, encode_scenario_kind(s.kind), s.is_active],
    )?;
  }

  for o in &data.overrides {
    tx.execute(
      "INSERT INTO scenario_overrides (
         scenario_id, project_id, included,
         start_override, end_override, priority_override
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        o.scenario.0,
        o.project.0,
        o.included,
        o.start_override.map(encode_date),
        o.end_override.map(encode_date),
        o.priority_override,
      ],
    )?;
  }

  Ok(())
}

// ─── EntityStore impl ────────────────────────────────────────────────────────

impl EntityStore for SqliteStore {
  type Error = Error;

  // ── Organisation ──────────────────────────────────────────────────────────

  async fn list_org_units(&self) -> Result<Vec<OrgUnit>> {
    let raws: Vec<RawOrgUnit> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT id, name, kind, parent_id FROM org_units ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawOrgUnit {
              id:        row.get(0)?,
              name:      row.get(1)?,
              kind:      row.get(2)?,
              parent_id: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOrgUnit::into_org_unit).collect()
  }

  async fn list_roles(&self) -> Result<Vec<Role>> {
    let roles = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM roles ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Role { id: RoleId(row.get(0)?), name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(roles)
  }

  async fn list_teams(&self) -> Result<Vec<Team>> {
    let teams = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, org_unit_id, lead_employee_id FROM teams ORDER BY id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Team {
              id:       TeamId(row.get(0)?),
              name:     row.get(1)?,
              org_unit: row.get::<_, i64>(2)?.into(),
              lead:     row.get::<_, Option<i64>>(3)?.map(Into::into),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(teams)
  }

  // ── Supply ────────────────────────────────────────────────────────────────

  async fn list_employees(&self, query: EmployeeQuery) -> Result<Vec<Employee>> {
    let role = query.role.map(|r| r.0);
    let team = query.team.map(|t| t.0);
    let (from, to) = match query.active_between {
      Some((from, to)) => (Some(encode_date(from)), Some(encode_date(to))),
      None => (None, None),
    };

    let raws: Vec<RawEmployee> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, role_id, team_id, fte_capacity, active_from, active_to
           FROM employees
           WHERE (?1 IS NULL OR role_id = ?1)
             AND (?2 IS NULL OR team_id = ?2)
             AND (?3 IS NULL OR active_from <= ?3)
             AND (?4 IS NULL OR active_to IS NULL OR active_to >= ?4)
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![role, team, to, from], |row| {
            Ok(RawEmployee {
              id:           row.get(0)?,
              name:         row.get(1)?,
              role_id:      row.get(2)?,
              team_id:      row.get(3)?,
              fte_capacity: row.get(4)?,
              active_from:  row.get(5)?,
              active_to:    row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEmployee::into_employee).collect()
  }

  // ── Demand ────────────────────────────────────────────────────────────────

  async fn list_projects(
    &self,
    status: Option<ProjectStatus>,
  ) -> Result<Vec<Project>> {
    let status = status.map(encode_status);

    let raws: Vec<RawProject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, priority, planned_start, planned_end, status
           FROM projects
           WHERE (?1 IS NULL OR status = ?1)
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![status], |row| {
            Ok(RawProject {
              id:            row.get(0)?,
              name:          row.get(1)?,
              priority:      row.get(2)?,
              planned_start: row.get(3)?,
              planned_end:   row.get(4)?,
              status:        row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProject::into_project).collect()
  }

  async fn list_allocations(
    &self,
    query: AllocationQuery,
  ) -> Result<Vec<Allocation>> {
    let project = query.project.map(|p| p.0);
    let role = query.role.map(|r| r.0);
    let (first, last) = match query.months {
      Some((first, last)) => (Some(encode_month(first)), Some(encode_month(last))),
      None => (None, None),
    };

    let raws: Vec<RawAllocation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT project_id, role_id, month_date, required_fte
           FROM allocations
           WHERE (?1 IS NULL OR project_id = ?1)
             AND (?2 IS NULL OR role_id = ?2)
             AND (?3 IS NULL OR month_date >= ?3)
             AND (?4 IS NULL OR month_date <= ?4)
           ORDER BY project_id, role_id, month_date",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![project, role, first, last], |row| {
            Ok(RawAllocation {
              project_id:   row.get(0)?,
              role_id:      row.get(1)?,
              month_date:   row.get(2)?,
              required_fte: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAllocation::into_allocation).collect()
  }

  // ── Scenarios ─────────────────────────────────────────────────────────────

  async fn get_scenario(&self, id: ScenarioId) -> Result<Option<Scenario>> {
    let raw: Option<RawScenario> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name, kind, is_active FROM scenarios WHERE id = ?1",
              rusqlite::params![id.0],
              |row| {
                Ok(RawScenario {
                  id:        row.get(0)?,
                  name:      row.get(1)?,
                  kind:      row.get(2)?,
                  is_active: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawScenario::into_scenario).transpose()
  }

  async fn list_scenario_overrides(
    &self,
    scenario: ScenarioId,
  ) -> Result<Vec<ScenarioOverride>> {
    let raws: Vec<RawOverride> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT scenario_id, project_id, included,
                  start_override, end_override, priority_override
           FROM scenario_overrides
           WHERE scenario_id = ?1
           ORDER BY project_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![scenario.0], |row| {
            Ok(RawOverride {
              scenario_id:       row.get(0)?,
              project_id:        row.get(1)?,
              included:          row.get(2)?,
              start_override:    row.get(3)?,
              end_override:      row.get(4)?,
              priority_override: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOverride::into_override).collect()
  }
}
