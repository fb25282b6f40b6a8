//! Outcome of a free-text profile search.

use serde::{Serialize, Serializer};

use super::Profile;

/// Marker emitted in place of an empty result list.
pub const NO_RESULT_MESSAGE: &str = "No result found";

/// Search outcome.
///
/// An empty match set is reported as [`SearchResults::NoResult`], which
/// serialises as the single-element list `["No result found"]` that existing
/// clients expect. Rust callers should branch on [`SearchResults::found`].
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResults {
    /// At least one profile matched.
    Matches(Vec<Profile>),
    /// Nothing matched.
    NoResult,
}

impl SearchResults {
    /// Wrap store matches, turning an empty list into [`SearchResults::NoResult`].
    pub fn from_matches(profiles: Vec<Profile>) -> Self {
        if profiles.is_empty() {
            Self::NoResult
        } else {
            Self::Matches(profiles)
        }
    }

    /// Whether any profile matched.
    pub fn found(&self) -> bool {
        matches!(self, Self::Matches(_))
    }

    /// Matched profiles; empty for [`SearchResults::NoResult`].
    pub fn profiles(&self) -> &[Profile] {
        match self {
            Self::Matches(profiles) => profiles,
            Self::NoResult => &[],
        }
    }
}

impl Serialize for SearchResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Matches(profiles) => serializer.collect_seq(profiles),
            Self::NoResult => serializer.collect_seq([NO_RESULT_MESSAGE]),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::EmailAddress;
    use crate::test_support::fixture_timestamp;
    use rstest::rstest;

    #[rstest]
    fn empty_matches_serialise_as_marker_list() {
        let results = SearchResults::from_matches(Vec::new());

        assert!(!results.found());
        assert!(results.profiles().is_empty());
        assert_eq!(
            serde_json::to_string(&results).expect("serialise"),
            r#"["No result found"]"#
        );
    }

    #[rstest]
    fn matches_serialise_as_profile_list() {
        let email = EmailAddress::new("ada@example.com").expect("email");
        let profile = Profile::builder(email, fixture_timestamp()).build();
        let results = SearchResults::from_matches(vec![profile.clone()]);

        assert!(results.found());
        let value = serde_json::to_value(&results).expect("serialise");
        let expected = serde_json::to_value(vec![profile]).expect("serialise profiles");
        assert_eq!(value, expected);
    }
}
