//! Field extraction strategies.
//!
//! All strategies share one contract: given an acquired document, produce
//! a raw field map. Which strategy runs is decided by the source format
//! and, for XML, by the declared root namespace.

pub mod patterns;
mod nfe;
mod text;
mod xml_generic;

pub use nfe::NfeExtractor;
pub use text::PatternExtractor;
pub use xml_generic::GenericXmlExtractor;

use crate::models::record::RawRecord;
use crate::xml::XmlDocument;

/// Namespace URI declared by NFe electronic invoices.
pub const NFE_NAMESPACE: &str = "http://www.portalfiscal.inf.br/nfe";

/// An acquired source document, ready for extraction.
#[derive(Debug, Clone)]
pub enum SourceDocument {
    /// Flattened text of a PDF bill.
    Text(String),
    /// Parsed XML element tree.
    Tree(XmlDocument),
}

/// The extraction strategy variants.
#[derive(Debug, Clone)]
pub enum ExtractionStrategy {
    /// Regex patterns over flat text.
    Pattern(PatternExtractor),
    /// Shallow tag lookup on plain XML.
    GenericPath(GenericXmlExtractor),
    /// Fixed namespaced paths for NFe documents.
    Vendor(NfeExtractor),
}

impl ExtractionStrategy {
    /// Run the strategy against a document. A document kind the strategy
    /// does not understand yields an empty record, never an error.
    pub fn extract(&self, doc: &SourceDocument) -> RawRecord {
        match (self, doc) {
            (Self::Pattern(e), SourceDocument::Text(text)) => e.extract(text),
            (Self::GenericPath(e), SourceDocument::Tree(tree)) => e.extract(tree),
            (Self::Vendor(e), SourceDocument::Tree(tree)) => e.extract(tree),
            _ => RawRecord::new(),
        }
    }

    /// Short name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pattern(_) => "pattern",
            Self::GenericPath(_) => "generic-xml",
            Self::Vendor(_) => "nfe",
        }
    }
}

/// Pick the strategy for an acquired document: pattern for text, and for
/// XML the root namespace decides between the vendor schema and the
/// generic tag lookup.
pub fn strategy_for(doc: &SourceDocument) -> ExtractionStrategy {
    match doc {
        SourceDocument::Text(_) => ExtractionStrategy::Pattern(PatternExtractor::gas_bill()),
        SourceDocument::Tree(tree) => {
            if tree.root_namespace() == Some(NFE_NAMESPACE) {
                ExtractionStrategy::Vendor(NfeExtractor::new())
            } else {
                ExtractionStrategy::GenericPath(GenericXmlExtractor::new())
            }
        }
    }
}
