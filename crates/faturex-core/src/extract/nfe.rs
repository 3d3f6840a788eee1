//! Vendor strategy: fixed namespaced paths into NFe gas bills.

use super::NFE_NAMESPACE;
use crate::models::record::{FieldKey, RawRecord};
use crate::xml::{XmlDocument, XmlElement};

/// Extractor for NFe documents under the portalfiscal namespace.
#[derive(Debug, Clone, Default)]
pub struct NfeExtractor;

impl NfeExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Walk the fixed NFe paths and assemble a raw record. Paths that do
    /// not resolve, or resolve to empty text, leave their field absent.
    pub fn extract(&self, doc: &XmlDocument) -> RawRecord {
        let root = doc.root();
        let mut record = RawRecord::new();

        set_from_path(&mut record, root, FieldKey::TaxId, &["emit", "CNPJ"]);
        set_from_path(
            &mut record,
            root,
            FieldKey::TotalAmount,
            &["total", "ICMSTot", "vNF"],
        );
        set_from_path(
            &mut record,
            root,
            FieldKey::TotalVolume,
            &["det", "prod", "qCom"],
        );
        set_from_path(&mut record, root, FieldKey::DocumentNumber, &["ide", "nNF"]);
        set_from_path(
            &mut record,
            root,
            FieldKey::IcmsTaxAmount,
            &["total", "ICMSTot", "vICMS"],
        );

        // dhEmi carries a full timestamp; only the date part is kept.
        if let Some(el) = root.find_ns(NFE_NAMESPACE, &["ide", "dhEmi"]) {
            let date = el.text().split('T').next().unwrap_or("");
            if !date.is_empty() {
                record.set(FieldKey::IssueDate, date);
            }
        }

        if let Some(el) = root.find_ns(NFE_NAMESPACE, &["infAdic", "infCpl"]) {
            if let Some((start, end)) = period_from_info(el.text()) {
                record.set(FieldKey::PeriodStart, start);
                record.set(FieldKey::PeriodEnd, end);
            }
        }

        if let Some(pcs) = pcs_correction(root) {
            record.set(FieldKey::PcsCorrection, pcs);
        }

        record
    }
}

fn set_from_path(record: &mut RawRecord, root: &XmlElement, key: FieldKey, path: &[&str]) {
    if let Some(el) = root.find_ns(NFE_NAMESPACE, path) {
        let text = el.text();
        if !text.is_empty() {
            record.set(key, text);
        }
    }
}

/// Pull the consumption period out of the free-text additional-info node.
///
/// The text is split on whitespace and the dates are taken purely by
/// position from the tail: `... <start> a <end>`. Known extraction risk:
/// a wording change that alters the tail structure silently produces
/// wrong values, since no token is checked for looking like a date.
fn period_from_info(text: &str) -> Option<(String, String)> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }
    let start = tokens[tokens.len() - 3].to_string();
    let end = tokens[tokens.len() - 1].to_string();
    Some((start, end))
}

/// Locate the PCS correction value by marker scan instead of a fixed path.
///
/// The fuel subtree of the first line item is scanned first; when that
/// yields nothing non-empty, the whole line-item subtree is rescanned.
/// The value is the text of the first element whose tag name or text
/// contains "PCS".
fn pcs_correction(root: &XmlElement) -> Option<String> {
    let det = root.find_ns(NFE_NAMESPACE, &["det"])?;

    det.find_ns(NFE_NAMESPACE, &["prod", "comb"])
        .and_then(scan_for_marker)
        .or_else(|| scan_for_marker(det))
}

fn scan_for_marker(subtree: &XmlElement) -> Option<String> {
    subtree
        .descendants()
        .find(|el| el.name().contains("PCS") || el.text().contains("PCS"))
        .map(|el| el.text().trim().to_string())
        .filter(|text| !text.is_empty())
}
