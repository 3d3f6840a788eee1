//! Pattern strategy: regex extraction over flat document text.

use regex::Regex;

use super::patterns;
use crate::models::record::{FieldKey, RawRecord};

/// Field extractor driven by one regex per field.
///
/// Patterns are evaluated independently against the full text; there is
/// no ordering or priority between fields.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    fields: Vec<(FieldKey, Regex)>,
}

impl PatternExtractor {
    /// Extractor with a custom field/pattern table.
    pub fn new(fields: Vec<(FieldKey, Regex)>) -> Self {
        Self { fields }
    }

    /// The pattern set for flat Compagás gas-bill text.
    pub fn gas_bill() -> Self {
        Self::new(vec![
            (FieldKey::TaxId, patterns::TAX_ID.clone()),
            (FieldKey::TotalAmount, patterns::TOTAL_AMOUNT.clone()),
            (FieldKey::TotalVolume, patterns::TOTAL_VOLUME.clone()),
            (FieldKey::IssueDate, patterns::ISSUE_DATE.clone()),
            (FieldKey::PeriodStart, patterns::PERIOD_START.clone()),
            (FieldKey::PeriodEnd, patterns::PERIOD_END.clone()),
            (FieldKey::DocumentNumber, patterns::DOCUMENT_NUMBER.clone()),
            (FieldKey::IcmsTaxAmount, patterns::ICMS_AMOUNT.clone()),
        ])
    }

    /// Run every pattern once against the text. For each field the first
    /// match wins: group 1 when the pattern captures, the whole match
    /// otherwise. A pattern that finds nothing leaves its field absent.
    pub fn extract(&self, text: &str) -> RawRecord {
        let mut record = RawRecord::new();
        for (key, pattern) in &self.fields {
            if let Some(value) = first_match(pattern, text) {
                record.set(*key, value);
            }
        }
        record
    }
}

fn first_match(pattern: &Regex, text: &str) -> Option<String> {
    let caps = pattern.captures(text)?;
    if caps.len() > 1 {
        caps.get(1).map(|m| m.as_str().to_string())
    } else {
        caps.get(0).map(|m| m.as_str().to_string())
    }
}
