//! Invoice record models shared by extraction, validation, and the ledger.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::numeric::parse_decimal_br;

/// Canonical invoice field keys.
///
/// Every extraction strategy reports its findings under these keys, so
/// validation and the ledger never see distributor-specific names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    /// Supplier tax identifier (CNPJ).
    TaxId,
    /// Total invoice amount.
    TotalAmount,
    /// Total billed volume in cubic meters.
    TotalVolume,
    /// Date the invoice was issued.
    IssueDate,
    /// First day of the billed consumption period.
    PeriodStart,
    /// Last day of the billed consumption period.
    PeriodEnd,
    /// Invoice/document number.
    DocumentNumber,
    /// ICMS tax amount.
    IcmsTaxAmount,
    /// PCS correction factor (gas bills only, optional).
    PcsCorrection,
}

impl FieldKey {
    /// Every key, in ledger column order.
    pub const ALL: [FieldKey; 9] = [
        FieldKey::TaxId,
        FieldKey::TotalAmount,
        FieldKey::TotalVolume,
        FieldKey::IssueDate,
        FieldKey::PeriodStart,
        FieldKey::PeriodEnd,
        FieldKey::DocumentNumber,
        FieldKey::IcmsTaxAmount,
        FieldKey::PcsCorrection,
    ];

    /// Keys a record must carry to be accepted into the ledger.
    pub const MANDATORY: [FieldKey; 8] = [
        FieldKey::TaxId,
        FieldKey::TotalAmount,
        FieldKey::TotalVolume,
        FieldKey::IssueDate,
        FieldKey::PeriodStart,
        FieldKey::PeriodEnd,
        FieldKey::DocumentNumber,
        FieldKey::IcmsTaxAmount,
    ];

    /// Stable snake_case name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::TaxId => "tax_id",
            FieldKey::TotalAmount => "total_amount",
            FieldKey::TotalVolume => "total_volume",
            FieldKey::IssueDate => "issue_date",
            FieldKey::PeriodStart => "period_start",
            FieldKey::PeriodEnd => "period_end",
            FieldKey::DocumentNumber => "document_number",
            FieldKey::IcmsTaxAmount => "icms_tax_amount",
            FieldKey::PcsCorrection => "pcs_correction",
        }
    }

    /// Whether the key must be present for a record to be accepted.
    pub fn is_mandatory(&self) -> bool {
        !matches!(self, FieldKey::PcsCorrection)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw extraction output: canonical keys mapped to untouched source strings.
///
/// One instance per source file. Values are exactly what the strategy found,
/// before any trimming or numeric normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<FieldKey, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value for a key, replacing any previous one.
    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        self.fields.insert(key, value.into());
    }

    /// Look up the raw value for a key.
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.fields.get(&key).map(String::as_str)
    }

    /// True when no field was extracted at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of extracted fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over extracted fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Mandatory keys that are absent or blank after trimming.
    pub fn missing_mandatory(&self) -> Vec<FieldKey> {
        FieldKey::MANDATORY
            .iter()
            .copied()
            .filter(|key| self.get(*key).is_none_or(|v| v.trim().is_empty()))
            .collect()
    }
}

impl FromIterator<(FieldKey, String)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (FieldKey, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A validated, normalized invoice row as persisted in the ledger.
///
/// Serde renames carry the ledger column headers, so CSV access is always
/// by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Supplier tax identifier, as printed on the bill.
    #[serde(rename = "CNPJ")]
    pub tax_id: String,

    /// Total invoice amount.
    #[serde(rename = "VALOR TOTAL")]
    pub total_amount: Decimal,

    /// Total billed volume in cubic meters.
    #[serde(rename = "VOLUME TOTAL")]
    pub total_volume: Decimal,

    /// Issue date, kept in the source's own date format.
    #[serde(rename = "DATA EMISSAO")]
    pub issue_date: String,

    /// First day of the billed period.
    #[serde(rename = "DATA INICIO")]
    pub period_start: String,

    /// Last day of the billed period.
    #[serde(rename = "DATA FIM")]
    pub period_end: String,

    /// Invoice/document number.
    #[serde(rename = "NUMERO FATURA")]
    pub document_number: String,

    /// ICMS tax amount.
    #[serde(rename = "VALOR ICMS")]
    pub icms_tax_amount: Decimal,

    /// PCS correction factor; empty when the source has none.
    #[serde(rename = "CORRECAO PCS", default)]
    pub pcs_correction: String,

    /// Distributor label configured for the extraction strategy.
    #[serde(rename = "DISTRIBUIDORA")]
    pub distributor: String,

    /// File name the record was extracted from.
    #[serde(rename = "NOME DO ARQUIVO")]
    pub source_filename: String,
}

impl InvoiceRecord {
    /// Validate a raw record and normalize its numeric fields.
    ///
    /// Validation runs strictly first: a record with missing mandatory
    /// fields is rejected before any value is parsed. Only the amount,
    /// volume, and ICMS fields go through pt-BR numeric normalization;
    /// dates and identifiers stay as extracted, trimmed.
    pub fn from_raw(
        raw: &RawRecord,
        distributor: &str,
        source_filename: &str,
    ) -> Result<Self, ExtractError> {
        if raw.is_empty() {
            return Err(ExtractError::NoData);
        }

        let missing = raw.missing_mandatory();
        if !missing.is_empty() {
            return Err(ExtractError::MissingFields(missing));
        }

        let text = |key: FieldKey| raw.get(key).unwrap_or("").trim().to_string();
        let number = |key: FieldKey| parse_decimal_br(key, raw.get(key).unwrap_or(""));

        Ok(Self {
            tax_id: text(FieldKey::TaxId),
            total_amount: number(FieldKey::TotalAmount)?,
            total_volume: number(FieldKey::TotalVolume)?,
            issue_date: text(FieldKey::IssueDate),
            period_start: text(FieldKey::PeriodStart),
            period_end: text(FieldKey::PeriodEnd),
            document_number: text(FieldKey::DocumentNumber),
            icms_tax_amount: number(FieldKey::IcmsTaxAmount)?,
            pcs_correction: text(FieldKey::PcsCorrection),
            distributor: distributor.to_string(),
            source_filename: source_filename.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_raw() -> RawRecord {
        let mut raw = RawRecord::new();
        raw.set(FieldKey::TaxId, "03.196.322/0001-49");
        raw.set(FieldKey::TotalAmount, "1.500,00");
        raw.set(FieldKey::TotalVolume, "120,000");
        raw.set(FieldKey::IssueDate, "2024-03-01");
        raw.set(FieldKey::PeriodStart, "01/02/2024");
        raw.set(FieldKey::PeriodEnd, "29/02/2024");
        raw.set(FieldKey::DocumentNumber, "123456");
        raw.set(FieldKey::IcmsTaxAmount, "270,00");
        raw
    }

    #[test]
    fn test_missing_mandatory_flags_absent_and_blank() {
        let mut raw = complete_raw();
        raw.set(FieldKey::TaxId, "   ");

        let missing = raw.missing_mandatory();
        assert_eq!(missing, vec![FieldKey::TaxId]);

        let empty = RawRecord::new();
        assert_eq!(empty.missing_mandatory().len(), 8);
    }

    #[test]
    fn test_pcs_is_not_mandatory() {
        let raw = complete_raw();
        assert!(raw.missing_mandatory().is_empty());
        assert!(!FieldKey::PcsCorrection.is_mandatory());
    }

    #[test]
    fn test_from_raw_normalizes_numbers() {
        let record = InvoiceRecord::from_raw(&complete_raw(), "COMPAGÁS", "fatura.pdf").unwrap();

        assert_eq!(record.total_amount, "1500.00".parse().unwrap());
        assert_eq!(record.total_volume, "120.000".parse().unwrap());
        assert_eq!(record.icms_tax_amount, "270.00".parse().unwrap());
        assert_eq!(record.issue_date, "2024-03-01");
        assert_eq!(record.pcs_correction, "");
        assert_eq!(record.distributor, "COMPAGÁS");
        assert_eq!(record.source_filename, "fatura.pdf");
    }

    #[test]
    fn test_from_raw_rejects_empty_map() {
        let err = InvoiceRecord::from_raw(&RawRecord::new(), "X", "f.xml").unwrap_err();
        assert!(matches!(err, ExtractError::NoData));
    }

    #[test]
    fn test_from_raw_rejects_missing_fields_before_parsing() {
        let mut raw = complete_raw();
        raw.set(FieldKey::TotalAmount, "not a number");
        raw.set(FieldKey::PeriodEnd, "");

        // The malformed amount must not be reported: validation runs first.
        let err = InvoiceRecord::from_raw(&raw, "X", "f.xml").unwrap_err();
        match err {
            ExtractError::MissingFields(missing) => {
                assert_eq!(missing, vec![FieldKey::PeriodEnd]);
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn test_from_raw_reports_malformed_number() {
        let mut raw = complete_raw();
        raw.set(FieldKey::IcmsTaxAmount, "12,34,56");

        let err = InvoiceRecord::from_raw(&raw, "X", "f.xml").unwrap_err();
        match err {
            ExtractError::MalformedNumber { field, value } => {
                assert_eq!(field, FieldKey::IcmsTaxAmount);
                assert_eq!(value, "12,34,56");
            }
            other => panic!("expected MalformedNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_from_raw_trims_string_fields() {
        let mut raw = complete_raw();
        raw.set(FieldKey::DocumentNumber, "  123456 ");

        let record = InvoiceRecord::from_raw(&raw, "Cegás", "nota.xml").unwrap();
        assert_eq!(record.document_number, "123456");
    }

    #[test]
    fn test_field_key_names() {
        assert_eq!(FieldKey::TaxId.as_str(), "tax_id");
        assert_eq!(FieldKey::PcsCorrection.to_string(), "pcs_correction");
        assert_eq!(FieldKey::ALL.len(), 9);
        assert_eq!(FieldKey::MANDATORY.len(), 8);
    }
}
