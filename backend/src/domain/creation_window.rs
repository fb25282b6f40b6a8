//! Calendar windows over profile creation dates.
//!
//! Windows are half-open UTC intervals `[start, end)`. Stores use the
//! calendar constructors to answer the "this year/quarter/month" counts.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Errors raised when building a [`CreationWindow`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreationWindowError {
    /// `start` is not strictly before `end`.
    #[error("window start {start} must be before end {end}")]
    Inverted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// The calendar boundary falls outside the representable date range.
    #[error("calendar boundary {year}-{month:02} is out of range")]
    OutOfRange { year: i32, month: u32 },
}

/// Half-open interval of creation timestamps.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use profile_backend::domain::CreationWindow;
///
/// let instant = Utc.with_ymd_and_hms(2026, 2, 14, 12, 0, 0).unwrap();
/// let quarter = CreationWindow::quarter_containing(instant).unwrap();
/// assert_eq!(quarter.start(), Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
/// assert_eq!(quarter.end(), Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WindowBounds")]
pub struct CreationWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Unchecked wire shape of a [`CreationWindow`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WindowBounds {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<WindowBounds> for CreationWindow {
    type Error = CreationWindowError;

    fn try_from(bounds: WindowBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.start, bounds.end)
    }
}

fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>, CreationWindowError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or(CreationWindowError::OutOfRange { year, month })
}

/// Month `count` months after `(year, month)`, with `month` in `1..=12`.
fn shift_months(year: i32, month: u32, count: u32) -> (i32, u32) {
    let zero_based = month - 1 + count;
    let carry = i32::try_from(zero_based / 12).unwrap_or(i32::MAX);
    (year.saturating_add(carry), zero_based % 12 + 1)
}

impl CreationWindow {
    /// Build a window from explicit bounds.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, CreationWindowError> {
        if start >= end {
            return Err(CreationWindowError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    fn spanning_months(year: i32, month: u32, months: u32) -> Result<Self, CreationWindowError> {
        let (end_year, end_month) = shift_months(year, month, months);
        Self::new(month_start(year, month)?, month_start(end_year, end_month)?)
    }

    /// Calendar year containing `instant`.
    pub fn year_containing(instant: DateTime<Utc>) -> Result<Self, CreationWindowError> {
        Self::spanning_months(instant.year(), 1, 12)
    }

    /// Calendar quarter containing `instant`.
    pub fn quarter_containing(instant: DateTime<Utc>) -> Result<Self, CreationWindowError> {
        let first_month = instant.month0() / 3 * 3 + 1;
        Self::spanning_months(instant.year(), first_month, 3)
    }

    /// Calendar month containing `instant`.
    pub fn month_containing(instant: DateTime<Utc>) -> Result<Self, CreationWindowError> {
        Self::spanning_months(instant.year(), instant.month(), 1)
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `instant` lies inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}
