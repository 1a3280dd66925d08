//! SQL schema for the Folio SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Dates are ISO `YYYY-MM-DD` text, so string comparison orders them.
/// FTE figures are decimal text and are never summed in SQL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS org_units (
    id        INTEGER PRIMARY KEY,
    name      TEXT NOT NULL,
    kind      TEXT NOT NULL,     -- 'division' | 'function' | 'subfunction' | 'team'
    parent_id INTEGER REFERENCES org_units(id) DEFERRABLE INITIALLY DEFERRED
);

CREATE TABLE IF NOT EXISTS roles (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

-- The lead is not a foreign key: teams and employees reference each other.
CREATE TABLE IF NOT EXISTS teams (
    id               INTEGER PRIMARY KEY,
    name             TEXT NOT NULL,
    org_unit_id      INTEGER NOT NULL
                     REFERENCES org_units(id) DEFERRABLE INITIALLY DEFERRED,
    lead_employee_id INTEGER
);

CREATE TABLE IF NOT EXISTS employees (
    id           INTEGER PRIMARY KEY,
    name         TEXT NOT NULL,
    role_id      INTEGER NOT NULL REFERENCES roles(id) DEFERRABLE INITIALLY DEFERRED,
    team_id      INTEGER NOT NULL REFERENCES teams(id) DEFERRABLE INITIALLY DEFERRED,
    fte_capacity TEXT NOT NULL,
    active_from  TEXT NOT NULL,
    active_to    TEXT            -- NULL = still active
);

CREATE TABLE IF NOT EXISTS projects (
    id            INTEGER PRIMARY KEY,
    name          TEXT NOT NULL,
    priority      INTEGER NOT NULL CHECK (priority BETWEEN 1 AND 5),
    planned_start TEXT NOT NULL,
    planned_end   TEXT NOT NULL,
    status        TEXT NOT NULL  -- 'planned' | 'active' | 'paused' | 'cancelled'
);

CREATE TABLE IF NOT EXISTS allocations (
    project_id   INTEGER NOT NULL REFERENCES projects(id) DEFERRABLE INITIALLY DEFERRED,
    role_id      INTEGER NOT NULL REFERENCES roles(id) DEFERRABLE INITIALLY DEFERRED,
    month_date   TEXT NOT NULL,  -- always the first of the month
    required_fte TEXT NOT NULL,
    UNIQUE (project_id, role_id, month_date)
);

CREATE TABLE IF NOT EXISTS scenarios (
    id        INTEGER PRIMARY KEY,
    name      TEXT NOT NULL,
    kind      TEXT NOT NULL,     -- 'BASELINE' | 'WHAT_IF'
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS scenario_overrides (
    scenario_id       INTEGER NOT NULL
                      REFERENCES scenarios(id) DEFERRABLE INITIALLY DEFERRED,
    project_id        INTEGER NOT NULL
                      REFERENCES projects(id) DEFERRABLE INITIALLY DEFERRED,
    included          INTEGER NOT NULL DEFAULT 1,
    start_override    TEXT,
    end_override      TEXT,
    priority_override INTEGER CHECK (priority_override BETWEEN 1 AND 5),
    UNIQUE (scenario_id, project_id)
);

CREATE INDEX IF NOT EXISTS employees_role_idx   ON employees(role_id);
CREATE INDEX IF NOT EXISTS employees_team_idx   ON employees(team_id);
CREATE INDEX IF NOT EXISTS allocations_month_idx ON allocations(month_date);

PRAGMA user_version = 1;
";

/// Tables in an order that is safe to clear.
pub const TABLES: [&str; 8] = [
  "scenario_overrides",
  "scenarios",
  "allocations",
  "projects",
  "employees",
  "teams",
  "roles",
  "org_units",
];
