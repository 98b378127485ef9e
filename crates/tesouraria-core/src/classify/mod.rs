//! Comprovante classification: normalization, rule matching, beneficiary
//! matching and receiver-name heuristics combined into one suggestion.

mod beneficiary;
mod normalize;
mod receiver;
mod rules;

pub use beneficiary::match_beneficiary;
pub use normalize::{fold, normalize};
pub use receiver::extract_receiver_name;
pub use rules::{Suggestion, match_rule};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Beneficiary, ClassificationRule, RuleOrder};

/// Outcome of classifying one comprovante.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Rule-based suggestion, if a rule matched.
    pub suggestion: Option<Suggestion>,
    /// Best guess at who received the money.
    pub receiver_name: Option<String>,
    /// Beneficiary to preselect: a name match wins over the rule's.
    pub beneficiary_id: Option<String>,
}

/// Classifier over one owner's rules and beneficiaries.
pub struct ComprovanteClassifier {
    rules: Vec<ClassificationRule>,
    beneficiaries: Vec<Beneficiary>,
}

impl ComprovanteClassifier {
    /// Create a classifier. Rules are used in the order given.
    pub fn new(rules: Vec<ClassificationRule>, beneficiaries: Vec<Beneficiary>) -> Self {
        Self {
            rules,
            beneficiaries,
        }
    }

    /// Reorder the rules explicitly instead of relying on fetch order.
    pub fn with_order(mut self, order: RuleOrder) -> Self {
        order.sort(&mut self.rules);
        self
    }

    /// Classify extracted document text plus the user's own description.
    ///
    /// The receiver-line heuristic runs on the raw text; a beneficiary
    /// found by name then replaces that guess with the stored full name.
    pub fn classify(&self, text: &str, description: &str) -> ClassificationResult {
        let corpus = normalize(&[text, description]);

        let suggestion = match_rule(&corpus, &self.rules);

        let mut receiver_name = if text.is_empty() {
            None
        } else {
            extract_receiver_name(text)
        };

        let matched = match_beneficiary(&corpus, &self.beneficiaries);
        if let Some(b) = matched {
            receiver_name = Some(b.name.clone());
        }

        let beneficiary_id = matched
            .map(|b| b.id.clone())
            .or_else(|| suggestion.as_ref().and_then(|s| s.beneficiary_id.clone()));

        debug!(
            "Classification: rule={}, receiver={:?}, beneficiary={:?}",
            suggestion.is_some(),
            receiver_name,
            beneficiary_id
        );

        ClassificationResult {
            suggestion,
            receiver_name,
            beneficiary_id,
        }
    }
}
