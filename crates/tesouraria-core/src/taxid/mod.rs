//! Brazilian tax identifiers (CPF and CNPJ): normalization, formatting and
//! check-digit validation.

pub mod cnpj;
pub mod cpf;

pub use cnpj::{format_cnpj, validate_cnpj};
pub use cpf::{format_cpf, validate_cpf};

/// Strip every non-digit character.
pub fn only_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Kind of document inferred from its digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Individual taxpayer (11 digits).
    Cpf,
    /// Legal entity (14 digits).
    Cnpj,
}

impl DocumentKind {
    /// Detect the kind from a raw or formatted document.
    pub fn detect(value: &str) -> Option<Self> {
        match only_digits(value).len() {
            11 => Some(Self::Cpf),
            14 => Some(Self::Cnpj),
            _ => None,
        }
    }

    /// Short name printed before a formatted document.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cpf => "CPF",
            Self::Cnpj => "CNPJ",
        }
    }
}

/// Format a document with its kind in front, e.g. `CPF: 111.444.777-35`.
pub fn labeled_document(value: &str) -> String {
    match DocumentKind::detect(value) {
        Some(kind) => format!("{}: {}", kind.label(), format_document(value)),
        None => value.to_string(),
    }
}

/// Format a CPF or CNPJ for display; anything else is returned unchanged.
pub fn format_document(value: &str) -> String {
    match DocumentKind::detect(value) {
        Some(DocumentKind::Cpf) => format_cpf(value),
        Some(DocumentKind::Cnpj) => format_cnpj(value),
        None => value.to_string(),
    }
}

/// Validate a CPF or CNPJ, whichever the digit count indicates.
pub fn validate_document(value: &str) -> bool {
    match DocumentKind::detect(value) {
        Some(DocumentKind::Cpf) => validate_cpf(value),
        Some(DocumentKind::Cnpj) => validate_cnpj(value),
        None => false,
    }
}

/// Mod-11 check digit shared by CPF and CNPJ: remainders below 2 yield 0.
pub(crate) fn mod11_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 { 0 } else { 11 - remainder }
}

pub(crate) fn digit_vec(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

pub(crate) fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}
