//! Longest-name beneficiary matching.

use tracing::debug;

use super::normalize::fold;
use crate::models::Beneficiary;

/// Find the known beneficiary whose folded name occurs in the corpus,
/// preferring the longest name.
///
/// "Maria Silva Santos" beats "Maria" when both occur. Equal lengths keep
/// the first one in input order. Empty names are ignored.
pub fn match_beneficiary<'a>(corpus: &str, beneficiaries: &'a [Beneficiary]) -> Option<&'a Beneficiary> {
    let mut best: Option<(&Beneficiary, usize)> = None;

    for beneficiary in beneficiaries {
        let name = fold(&beneficiary.name);
        if name.is_empty() || !corpus.contains(&name) {
            continue;
        }
        let len = name.chars().count();
        if best.is_none_or(|(_, best_len)| len > best_len) {
            best = Some((beneficiary, len));
        }
    }

    if let Some((beneficiary, _)) = best {
        debug!("Beneficiary {} matched by name", beneficiary.id);
    }
    best.map(|(b, _)| b)
}
