//! Calendar months and the time grid a query is evaluated over.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Month ───────────────────────────────────────────────────────────────────

/// A calendar month, represented by its first day.
///
/// Any date converts into the month containing it, so a `Month` never holds a
/// day other than the 1st. Serialises as an ISO date (`2026-02-01`).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
#[serde(from = "NaiveDate", into = "NaiveDate")]
pub struct Month(NaiveDate);

impl Month {
  /// The month containing `date`.
  pub fn containing(date: NaiveDate) -> Self {
    Self(date - Days::new(u64::from(date.day0())))
  }

  pub fn first_day(self) -> NaiveDate { self.0 }

  pub fn last_day(self) -> NaiveDate {
    self
      .0
      .checked_add_months(Months::new(1))
      .and_then(|next| next.checked_sub_days(Days::new(1)))
      .unwrap_or(NaiveDate::MAX)
  }

  /// `None` past the last representable month.
  pub fn next(self) -> Option<Self> { self.plus(1) }

  /// The month `n` months after this one, if the calendar reaches it.
  pub fn plus(self, n: u32) -> Option<Self> {
    self.0.checked_add_months(Months::new(n)).map(Self)
  }
}

impl From<NaiveDate> for Month {
  fn from(date: NaiveDate) -> Self { Self::containing(date) }
}

impl From<Month> for NaiveDate {
  fn from(month: Month) -> Self { month.0 }
}

impl fmt::Display for Month {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.format("%Y-%m-%d"))
  }
}

/// Accepts `YYYY-MM` or any `YYYY-MM-DD` date.
impl FromStr for Month {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
      return Ok(Self::containing(date));
    }
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
      .map(Self)
      .map_err(|e| Error::Parse(format!("invalid month {s:?}: {e}")))
  }
}

// ─── TimeGrid ────────────────────────────────────────────────────────────────

/// The ordered, duplicate-free months a query covers, both ends inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeGrid {
  months: Vec<Month>,
}

impl TimeGrid {
  /// Every month from the month of `start` to the month of `end`.
  ///
  /// An inverted window yields an empty grid rather than an error.
  pub fn between(start: impl Into<Month>, end: impl Into<Month>) -> Self {
    let (start, end) = (start.into(), end.into());
    let mut months = Vec::new();
    let mut cursor = Some(start);
    while let Some(month) = cursor.filter(|m| *m <= end) {
      months.push(month);
      cursor = month.next();
    }
    Self { months }
  }

  /// Like [`TimeGrid::between`], but an inverted window is an
  /// [`Error::InvalidRange`]. For callers that need at least one month.
  pub fn try_between(
    start: impl Into<Month>,
    end: impl Into<Month>,
  ) -> Result<Self> {
    let (start, end) = (start.into(), end.into());
    if end < start {
      return Err(Error::InvalidRange { start, end });
    }
    Ok(Self::between(start, end))
  }

  /// `count` consecutive months beginning with the month of `from`,
  /// stopping early at the end of the calendar.
  pub fn starting(from: impl Into<Month>, count: u32) -> Self {
    let from = from.into();
    Self {
      months: (0..count).map_while(|i| from.plus(i)).collect(),
    }
  }

  pub fn single(month: Month) -> Self { Self { months: vec![month] } }

  /// The smallest grid spanning both this grid and `first..=last`.
  pub fn covering(&self, first: Month, last: Month) -> Self {
    match self.first().zip(self.last()) {
      Some((start, end)) => Self::between(start.min(first), end.max(last)),
      None => Self::between(first, last),
    }
  }

  pub fn months(&self) -> &[Month] { &self.months }

  pub fn first(&self) -> Option<Month> { self.months.first().copied() }

  pub fn last(&self) -> Option<Month> { self.months.last().copied() }

  pub fn len(&self) -> usize { self.months.len() }

  pub fn is_empty(&self) -> bool { self.months.is_empty() }

  /// Grids are contiguous, so membership is a bounds check.
  pub fn contains(&self, month: Month) -> bool {
    match (self.first(), self.last()) {
      (Some(first), Some(last)) => first <= month && month <= last,
      _ => false,
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = Month> + '_ {
    self.months.iter().copied()
  }
}
