//! Searchable text projection and free-text matching.
//!
//! Records are matched against a precomputed projection: the lower-cased,
//! whitespace-collapsed concatenation of their text fields. Matching is
//! case-insensitive substring per term (which makes it prefix-tolerant for
//! free), with AND semantics across terms. A whole-phrase substring match
//! ranks above a scattered all-terms match.

use serde::{Deserialize, Serialize};

/// Lower-case and collapse runs of whitespace to single spaces.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for token in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(token.chars().flat_map(char::to_lowercase));
    }
    out
}

/// Build the searchable projection of a record from its text fields.
#[must_use]
pub fn project<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for field in fields {
        let normalized = normalize(field);
        if normalized.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&normalized);
    }
    out
}

/// How well a projection matched the free text, phrase above scattered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchRank {
    /// Every term appears somewhere in the projection.
    Scattered,
    /// The whole normalized phrase appears contiguously.
    Phrase,
}

/// Rank `projection` against an already-normalized phrase and its terms.
///
/// Returns `None` when any term is absent.
#[must_use]
pub fn match_rank(projection: &str, phrase: &str, terms: &[String]) -> Option<MatchRank> {
    if phrase.is_empty() {
        return None;
    }
    if projection.contains(phrase) {
        return Some(MatchRank::Phrase);
    }
    terms
        .iter()
        .all(|term| projection.contains(term.as_str()))
        .then_some(MatchRank::Scattered)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn terms(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_owned).collect()
    }

    #[test]
    fn normalize_lowercases_and_collapses() {
        assert_eq!(normalize("  Project   Kickoff\tCall "), "project kickoff call");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn projection_skips_empty_fields() {
        let p = project(["Kickoff", "", "  ", "Berlin  Office"]);
        assert_eq!(p, "kickoff berlin office");
    }

    #[test]
    fn phrase_outranks_scattered() {
        let projection = "quarterly kickoff with the berlin team";

        let phrase = "kickoff with";
        assert_eq!(
            match_rank(projection, phrase, &terms(phrase)),
            Some(MatchRank::Phrase)
        );

        let phrase = "berlin kickoff";
        assert_eq!(
            match_rank(projection, phrase, &terms(phrase)),
            Some(MatchRank::Scattered)
        );
        assert!(MatchRank::Phrase > MatchRank::Scattered);
    }

    #[test]
    fn missing_term_fails_the_match() {
        let projection = "quarterly kickoff";
        assert_eq!(match_rank(projection, "kickoff paris", &terms("kickoff paris")), None);
    }

    #[test]
    fn substring_match_is_prefix_tolerant() {
        let projection = "kickoff meeting";
        assert_eq!(
            match_rank(projection, "kick", &terms("kick")),
            Some(MatchRank::Phrase)
        );
    }
}
