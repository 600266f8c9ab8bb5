//! Example-problem extraction engine.
//!
//! The subject set is closed, so dispatch is an exhaustive match rather
//! than a runtime registry: zeimu and zaimu share the rule-driven page
//! scanner, kanri has its own two-pass reconciler, and unknown produces
//! nothing.

pub mod kanri;
pub mod rules;
pub mod scanner;

#[cfg(test)]
mod tests;

use tracing::warn;

use crate::document::{PageSource, PdfDocument};
use crate::model::{ExampleRecord, Subject};

/// Extract every example record from an already-open document, in
/// page-then-in-page order. Total: structural absence shows up as `None`
/// fields or fewer records, never as an error.
pub fn extract_examples(
    doc: &dyn PageSource,
    subject: Subject,
    source_document: &str,
) -> Vec<ExampleRecord> {
    match subject {
        Subject::Zeimu => scanner::scan(doc, subject, &rules::ZEIMU_RULES, source_document),
        Subject::Zaimu => scanner::scan(doc, subject, &rules::ZAIMU_RULES, source_document),
        Subject::Kanri => kanri::extract(doc, source_document),
        Subject::Unknown => Vec::new(),
    }
}

/// Extraction boundary over raw PDF bytes. Never fails: a document that
/// cannot be opened is reported once and yields zero records.
pub fn extract(bytes: &[u8], subject: Subject, source_document: &str) -> Vec<ExampleRecord> {
    match PdfDocument::open(bytes) {
        Ok(doc) => extract_examples(&doc, subject, source_document),
        Err(error) => {
            warn!(source = source_document, error = %error, "failed to open document, skipping");
            Vec::new()
        }
    }
}
