//! Registries referenced by ledger entries: beneficiaries, church settings
//! and classification rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, ValidationErrors};
use crate::taxid::{format_document, only_digits, validate_cnpj, validate_cpf};

/// A payee or payer known to the owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Beneficiary {
    pub id: String,
    pub owner_id: String,
    pub name: String,

    /// CPF or CNPJ, stored digits-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Storage path of the beneficiary's own signature image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_path: Option<String>,
}

impl Beneficiary {
    /// Create a beneficiary with only the required fields.
    pub fn new(id: impl Into<String>, owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the document, normalized to digits for storage.
    pub fn with_document(mut self, document: &str) -> Self {
        let digits = only_digits(document);
        self.document = if digits.is_empty() { None } else { Some(digits) };
        self
    }

    /// Document formatted for display, if any.
    pub fn display_document(&self) -> Option<String> {
        self.document.as_deref().map(format_document)
    }
}

/// Per-owner church identity printed on every receipt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChurchSettings {
    pub owner_id: String,
    pub church_name: String,
    /// CNPJ, digits-only once normalized.
    pub church_tax_id: String,
    pub responsible_name: String,
    /// CPF, digits-only once normalized.
    pub responsible_tax_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_path: Option<String>,
}

impl ChurchSettings {
    /// Copy with tax ids reduced to digits and names trimmed.
    pub fn normalized(&self) -> Self {
        Self {
            owner_id: self.owner_id.clone(),
            church_name: self.church_name.trim().to_string(),
            church_tax_id: only_digits(&self.church_tax_id),
            responsible_name: self.responsible_name.trim().to_string(),
            responsible_tax_id: only_digits(&self.responsible_tax_id),
            signature_path: self
                .signature_path
                .clone()
                .filter(|p| !p.trim().is_empty()),
        }
    }

    /// Check every field, reporting all failures at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if self.church_name.trim().is_empty() {
            errors.push(FieldError::new("church_name", "required"));
        }
        if !validate_cnpj(&self.church_tax_id) {
            errors.push(FieldError::new("church_tax_id", "invalid CNPJ"));
        }
        if self.responsible_name.trim().is_empty() {
            errors.push(FieldError::new("responsible_name", "required"));
        }
        if !validate_cpf(&self.responsible_tax_id) {
            errors.push(FieldError::new("responsible_tax_id", "invalid CPF"));
        }

        ValidationErrors::into_result(errors)
    }

    /// Whether the settings carry everything a receipt needs.
    pub fn is_complete(&self) -> bool {
        !self.church_name.trim().is_empty()
            && !self.church_tax_id.trim().is_empty()
            && !self.responsible_name.trim().is_empty()
            && !self.responsible_tax_id.trim().is_empty()
    }
}

/// A term-to-classification rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub id: String,
    pub owner_id: String,
    pub term: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub beneficiary_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Which owners' rules a query covers. "All users" exists only as a query
/// filter for administrators and is never stored on a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleScope {
    User(String),
    AllUsers,
}

impl RuleScope {
    pub fn includes(&self, owner_id: &str) -> bool {
        match self {
            RuleScope::User(id) => id == owner_id,
            RuleScope::AllUsers => true,
        }
    }
}

/// Order in which rules are handed to the matcher. First match wins, so
/// this decides which rule applies when several terms match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOrder {
    /// Most recently created first.
    #[default]
    NewestFirst,
    OldestFirst,
}

impl RuleOrder {
    /// Sort rules in place. The sort is stable, equal timestamps keep their
    /// relative order.
    pub fn sort(&self, rules: &mut [ClassificationRule]) {
        match self {
            RuleOrder::NewestFirst => rules.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            RuleOrder::OldestFirst => rules.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
    }
}

/// A rule about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRule {
    pub owner_id: String,
    pub term: String,
    pub category_id: Option<String>,
    pub beneficiary_id: Option<String>,
}

impl NewRule {
    /// Build a rule for a single owner. The term is trimmed and must not
    /// be empty; an all-users scope cannot own a rule.
    pub fn new(
        scope: &RuleScope,
        term: &str,
        category_id: Option<String>,
        beneficiary_id: Option<String>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = Vec::new();
        let term = term.trim();

        if term.is_empty() {
            errors.push(FieldError::new("term", "required"));
        }
        let owner_id = match scope {
            RuleScope::User(id) => id.clone(),
            RuleScope::AllUsers => {
                errors.push(FieldError::new("owner_id", "select a specific user"));
                String::new()
            }
        };
        ValidationErrors::into_result(errors)?;

        Ok(Self {
            owner_id,
            term: term.to_string(),
            category_id: category_id.filter(|c| !c.is_empty()),
            beneficiary_id: beneficiary_id.filter(|b| !b.is_empty()),
        })
    }
}
