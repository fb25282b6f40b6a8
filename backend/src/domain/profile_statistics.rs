//! Aggregate profile counts keyed by display label.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Label attached to each aggregate count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatisticLabel {
    ThisYear,
    ThisQuarter,
    ThisMonth,
    Candidate,
    Consultant,
}

impl StatisticLabel {
    /// Every label, in reporting order.
    pub const ALL: [Self; 5] = [
        Self::ThisYear,
        Self::ThisQuarter,
        Self::ThisMonth,
        Self::Candidate,
        Self::Consultant,
    ];

    /// Display string used as the map key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThisYear => "This Year",
            Self::ThisQuarter => "This Quarter",
            Self::ThisMonth => "This Month",
            Self::Candidate => "Candidate",
            Self::Consultant => "Consultant",
        }
    }
}

impl fmt::Display for StatisticLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Five independent profile counts.
///
/// Serialises as a JSON object keyed by the [`StatisticLabel`] strings.
///
/// # Examples
/// ```
/// use profile_backend::domain::{ProfileStatistics, StatisticLabel};
///
/// let stats = ProfileStatistics {
///     this_year: 12,
///     candidates: 7,
///     ..ProfileStatistics::default()
/// };
/// assert_eq!(stats.get(StatisticLabel::ThisYear), 12);
/// assert_eq!(stats.to_map()["Candidate"], 7);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStatistics {
    /// Profiles created in the current calendar year.
    #[serde(rename = "This Year")]
    pub this_year: u64,
    /// Profiles created in the current calendar quarter.
    #[serde(rename = "This Quarter")]
    pub this_quarter: u64,
    /// Profiles created in the current calendar month.
    #[serde(rename = "This Month")]
    pub this_month: u64,
    /// Profiles in the candidate category.
    #[serde(rename = "Candidate")]
    pub candidates: u64,
    /// Profiles in the consultant category.
    #[serde(rename = "Consultant")]
    pub consultants: u64,
}

impl ProfileStatistics {
    /// Count recorded under `label`.
    pub fn get(&self, label: StatisticLabel) -> u64 {
        match label {
            StatisticLabel::ThisYear => self.this_year,
            StatisticLabel::ThisQuarter => self.this_quarter,
            StatisticLabel::ThisMonth => self.this_month,
            StatisticLabel::Candidate => self.candidates,
            StatisticLabel::Consultant => self.consultants,
        }
    }

    /// Label/count pairs as an owned map.
    pub fn to_map(&self) -> BTreeMap<String, u64> {
        StatisticLabel::ALL
            .into_iter()
            .map(|label| (label.as_str().to_owned(), self.get(label)))
            .collect()
    }
}
