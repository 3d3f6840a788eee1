//! Generic-path strategy: shallow tag lookup on plain XML documents.

use crate::models::record::{FieldKey, RawRecord};
use crate::xml::XmlDocument;

/// Extractor for XML documents whose root carries one child per field,
/// named exactly by the canonical field key.
#[derive(Debug, Clone, Default)]
pub struct GenericXmlExtractor;

impl GenericXmlExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Read each field from the matching direct child of the root. The
    /// child's text is taken untouched; an absent child leaves the field
    /// absent.
    pub fn extract(&self, doc: &XmlDocument) -> RawRecord {
        let mut record = RawRecord::new();
        for key in FieldKey::ALL {
            if let Some(child) = doc.root().child(key.as_str()) {
                record.set(key, child.text());
            }
        }
        record
    }
}
