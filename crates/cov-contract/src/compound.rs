// compound.rs — compound-goal pre-screen.
//
// One contract, one outcome. Before the admission phases run, the outcome
// text is screened for conjunction patterns that declare several goals at
// once ("build X and also launch Y simultaneously"). A compound outcome
// short-circuits admission with its own dedicated rejection.

use regex::Regex;
use std::sync::LazyLock;

/// What the detector found, including the sub-outcomes it split out for the
/// human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundGoalReport {
    pub is_compound: bool,
    pub sub_outcomes: Vec<String>,
}

static CONJUNCTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\band\s+(?:then\s+)?.*(?:also|simultaneously|in parallel)",
        r"(?i)(?:both|also|plus|additionally|furthermore).*\band\b",
        r"(?i);\s*(?:also|meanwhile|additionally)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("conjunction pattern compiles"))
    .collect()
});

/// Screen an outcome text for multiple simultaneous goals.
pub fn detect_compound_goal(outcome_text: &str) -> CompoundGoalReport {
    let text = outcome_text.trim().to_lowercase();

    let has_conjunction = CONJUNCTION_PATTERNS.iter().any(|p| p.is_match(&text));

    // Semicolon-delimited lists: three or more clauses reads as a list of
    // goals even without a conjunction keyword.
    let clause_count = text.split(';').filter(|s| !s.trim().is_empty()).count();
    let has_clause_list = text.contains(';') && clause_count > 2;

    let is_compound = has_conjunction || has_clause_list;

    let sub_outcomes = if is_compound {
        text.split([';', ','])
            .map(str::trim)
            .filter(|s| s.len() > 10)
            .map(str::to_string)
            .collect()
    } else {
        vec![text]
    };

    CompoundGoalReport {
        is_compound,
        sub_outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_outcome_passes() {
        let report = detect_compound_goal("Release the EP on all platforms");
        assert!(!report.is_compound);
        assert_eq!(report.sub_outcomes.len(), 1);
    }

    #[test]
    fn and_also_simultaneously_is_compound() {
        let report = detect_compound_goal(
            "Build the app and also launch the marketing campaign simultaneously across all platforms",
        );
        assert!(report.is_compound);
    }

    #[test]
    fn both_and_is_compound() {
        let report = detect_compound_goal("Ship both the album and the tour announcement");
        assert!(report.is_compound);
    }

    #[test]
    fn semicolon_list_is_compound() {
        let report =
            detect_compound_goal("finish the book; also record the audiobook; plan the launch");
        assert!(report.is_compound);
        assert!(report.sub_outcomes.len() >= 2);
    }

    #[test]
    fn plain_and_between_nouns_is_not_compound() {
        // A single outcome may legitimately contain "and".
        let report = detect_compound_goal("Write and publish one novella");
        assert!(!report.is_compound);
    }

    #[test]
    fn sub_outcomes_drop_short_fragments() {
        let report = detect_compound_goal(
            "launch the product this quarter; also, hire two support engineers",
        );
        assert!(report.is_compound);
        assert!(report.sub_outcomes.iter().all(|s| s.len() > 10));
    }
}
