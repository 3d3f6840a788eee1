//! Regex patterns for flat gas-bill text extraction.
//!
//! The patterns assume PDF text flattened to a single line. Each one
//! anchors on nearby label text and captures the value in group 1.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // CNPJ digits right after the distributor name ("...Gás 03.196.322/0001-49")
    pub static ref TAX_ID: Regex = Regex::new(
        r"Gás\s?(\d+\.?\d+\.?\d+/?\d+-?\d+)\s?"
    ).unwrap();

    // Amount after the currency sign, decimal comma required
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"R\$\(?\)?\s?:?\s?(\d+?.?\d+.?\d+,\d{2})"
    ).unwrap();

    // Billed volume before the "total m3" label
    pub static ref TOTAL_VOLUME: Regex = Regex::new(
        r"\s?(\d+?\.?,?\d+,?\.?\d+,?.?\d+)\s?total\sm3?"
    ).unwrap();

    // Date after "emissão"
    pub static ref ISSUE_DATE: Regex = Regex::new(
        r"missão\s?(\d+/\d+/\d+)\s?"
    ).unwrap();

    // First date after the consumption-period label
    pub static ref PERIOD_START: Regex = Regex::new(
        r"consumo:?\s(\d+/\d+/\d+)"
    ).unwrap();

    // Date after a lone "a", the period connective ("01/02/2024 a 29/02/2024")
    pub static ref PERIOD_END: Regex = Regex::new(
        r"[Aa]\s(\d+/\d+/\d+)"
    ).unwrap();

    // Invoice number right before "Esta fatura..."
    pub static ref DOCUMENT_NUMBER: Regex = Regex::new(
        r"(\d+)\s[Ee]sta"
    ).unwrap();

    // ICMS amount glued to the "Tributos" label
    pub static ref ICMS_AMOUNT: Regex = Regex::new(
        r"\s(\d+?\.?,?\d+,?\.?\d+,?.?\d+)[Tt]ributo?"
    ).unwrap();
}
