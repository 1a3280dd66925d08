//! Error types for `folio-core`.

use thiserror::Error;

use crate::{
  model::{OrgUnitId, ScenarioId, TeamId},
  month::Month,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid month range: {end} is before {start}")]
  InvalidRange { start: Month, end: Month },

  /// A unit's ancestor chain ends without reaching a division.
  #[error("org unit {0} has no owning division")]
  OrphanHierarchy(OrgUnitId),

  #[error("org hierarchy contains a cycle through unit {0}")]
  CyclicHierarchy(OrgUnitId),

  #[error("org unit not found: {0}")]
  UnknownOrgUnit(OrgUnitId),

  #[error("team not found: {0}")]
  UnknownTeam(TeamId),

  #[error("scenario not found: {0}")]
  UnknownScenario(ScenarioId),

  #[error("scenario {0} is not active")]
  InactiveScenario(ScenarioId),

  #[error("parse error: {0}")]
  Parse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
