//! First-match-wins classification rule matching.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::normalize::fold;
use crate::models::ClassificationRule;

/// Category/beneficiary suggested by a matching rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category_id: Option<String>,
    pub beneficiary_id: Option<String>,
    /// Human-readable explanation, `term matched: <term>`.
    pub reason: String,
}

/// Return the suggestion of the first rule whose folded term occurs in the
/// corpus.
///
/// Rules are tried in the order given; there is no scoring, so a broader
/// term placed earlier shadows a more specific one placed later. Rules with
/// an empty (or diacritic-only) term never match. Terms are used as stored,
/// so surrounding spaces must occur in the corpus too.
pub fn match_rule(corpus: &str, rules: &[ClassificationRule]) -> Option<Suggestion> {
    for rule in rules {
        let term = fold(&rule.term);
        if term.is_empty() {
            trace!("Skipping rule {} with empty term", rule.id);
            continue;
        }
        if corpus.contains(&term) {
            debug!("Rule {} matched term {:?}", rule.id, rule.term);
            return Some(Suggestion {
                category_id: rule.category_id.clone(),
                beneficiary_id: rule.beneficiary_id.clone(),
                reason: format!("term matched: {}", rule.term),
            });
        }
    }
    None
}
