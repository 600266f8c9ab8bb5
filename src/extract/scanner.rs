//! Rule-driven page scanner for the subjects whose metadata is printed
//! inline (zeimu, zaimu). Walks pages in physical order, tracks the
//! carried-forward page reference, and assembles records against the
//! chapter/section tree.

use tracing::debug;

use crate::document::PageSource;
use crate::model::{ExampleRecord, Subject};
use crate::normalize::{collapse_whitespace, normalize_rank, normalize_text};
use crate::outline::{find_chapter_section, parse_outline};

use super::rules::{
    PageRefScope, RANK_ORAL_RE, RANK_WRITTEN_RE, SubjectRules, TITLE_RANK_ANNOTATION_RE,
    TITLE_RANK_SUFFIX_RE, format_page_ref,
};

/// How many trailing lines count as the page footer for
/// `PageRefScope::Footer` rules.
const FOOTER_LINE_COUNT: usize = 4;

/// One example-header hit on a page, before chapter/section association.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FoundExample {
    example_no: u32,
    title: String,
    rank_written: Option<String>,
    rank_oral: Option<String>,
}

pub fn scan(
    doc: &dyn PageSource,
    subject: Subject,
    rules: &SubjectRules,
    source_document: &str,
) -> Vec<ExampleRecord> {
    let chapters = parse_outline(doc.outline());

    let mut records = Vec::new();
    let mut carried_ref: Option<String> = None;

    for page in 1..=doc.page_count() {
        let text = normalize_text(&doc.page_text(page));

        // A page with its own citation updates the carry-forward state;
        // pages without one inherit the last citation seen.
        if let Some(found) = find_page_ref(rules, &text) {
            carried_ref = Some(found);
        }
        let page_ref = carried_ref.clone();

        let found = find_examples(rules, &text);
        if found.is_empty() {
            continue;
        }

        let (chapter, section) = find_chapter_section(&chapters, page);
        let Some(chapter) = chapter else {
            // headers in front matter have no enclosing chapter; dropped
            debug!(page, count = found.len(), "dropping headers before first chapter");
            continue;
        };

        for example in found {
            let rank = ExampleRecord::derive_compat_rank(
                example.rank_written.as_deref(),
                example.rank_oral.as_deref(),
            );

            records.push(ExampleRecord {
                subject,
                chapter_no: chapter.no,
                chapter_title: chapter.title.clone(),
                section_no: section.map(|s| s.no).unwrap_or(0),
                section_title: section.map(|s| s.title.clone()).unwrap_or_default(),
                example_no: example.example_no,
                title: example.title,
                rank,
                rank_written: example.rank_written,
                rank_oral: example.rank_oral,
                page_ref: page_ref.clone(),
                source_page: page,
                source_document: source_document.to_string(),
            });
        }
    }

    records
}

fn find_page_ref(rules: &SubjectRules, text: &str) -> Option<String> {
    for rule in &rules.page_refs {
        let formatted = match rule.scope {
            PageRefScope::FullPage => rule
                .pattern
                .captures(text)
                .and_then(|captures| format_page_ref(rule, &captures)),
            // citations are printed at the bottom of the page; the last
            // hit in the footer window is the one nearest the page edge
            PageRefScope::Footer => rule
                .pattern
                .captures_iter(footer_region(text))
                .filter_map(|captures| format_page_ref(rule, &captures))
                .last(),
        };
        if formatted.is_some() {
            return formatted;
        }
    }
    None
}

/// The last few non-empty lines of the page text.
fn footer_region(text: &str) -> &str {
    let trimmed = text.trim_end();
    let mut start = trimmed.len();
    let mut lines = 0;
    for line in trimmed.rsplit('\n') {
        if !line.trim().is_empty() {
            lines += 1;
        }
        start -= line.len();
        if lines == FOOTER_LINE_COUNT || start == 0 {
            break;
        }
        // step over the '\n' separator
        start -= 1;
    }
    &trimmed[start..]
}

/// Collect every non-overlapping header match on the page, in text order.
fn find_examples(rules: &SubjectRules, text: &str) -> Vec<FoundExample> {
    let mut found = Vec::new();

    for pattern in &rules.example_headers {
        let matches: Vec<regex::Captures<'_>> = pattern.captures_iter(text).collect();

        for (index, captures) in matches.iter().enumerate() {
            let Some(example_no) = captures
                .name("num")
                .and_then(|m| m.as_str().parse::<u32>().ok())
            else {
                continue;
            };

            let raw_title = captures.name("title").map(|m| m.as_str()).unwrap_or("");
            let title = clean_title(raw_title);

            let (rank_written, rank_oral) = if rules.block_ranks {
                // ranks live somewhere between this header and the next
                let start = captures.get(0).map(|m| m.start()).unwrap_or(0);
                let end = matches
                    .get(index + 1)
                    .and_then(|next| next.get(0))
                    .map(|m| m.start())
                    .unwrap_or(text.len());
                block_ranks(&text[start..end])
            } else {
                let inline = normalize_rank(captures.name("rank").map(|m| m.as_str()));
                // a lone inline rank counts as the oral track
                (None, inline)
            };

            found.push(FoundExample {
                example_no,
                title,
                rank_written,
                rank_oral,
            });
        }
    }

    found
}

fn block_ranks(block: &str) -> (Option<String>, Option<String>) {
    let written = RANK_WRITTEN_RE
        .captures(block)
        .and_then(|c| normalize_rank(c.name("rank").map(|m| m.as_str())));
    let oral = RANK_ORAL_RE
        .captures(block)
        .and_then(|c| normalize_rank(c.name("rank").map(|m| m.as_str())));
    (written, oral)
}

/// Strip rank annotations the header patterns may have swallowed into
/// the title capture, then collapse whitespace.
fn clean_title(raw: &str) -> String {
    let stripped = TITLE_RANK_SUFFIX_RE.replace_all(raw, "");
    let stripped = TITLE_RANK_ANNOTATION_RE.replace_all(&stripped, "");
    collapse_whitespace(&stripped)
}
