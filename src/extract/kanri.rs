//! 管理 (management accounting) extractor.
//!
//! This series prints a consolidated example index in the front matter —
//! ranks and page citations live there, keyed by `chapter-example`
//! number, while the body repeats only the number and title. Extraction
//! therefore runs in two passes: build the front-matter index, then
//! cross-reference body headers against it. Chapter titles also come
//! from the front matter; the bookmark tree of this series is not
//! reliable for them.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::document::PageSource;
use crate::model::{ExampleRecord, Subject};
use crate::normalize::{collapse_whitespace, normalize_rank, normalize_text};

/// Pages scanned for the front-matter index.
const INDEX_WINDOW_PAGES: u32 = 40;

/// Bracketed chapter header in the front matter, e.g. `【第3章 材料費】`.
static CHAPTER_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[【\[]\s*第\s*(?P<no>\d+)\s*章\s*(?P<title>[^】\]]+?)[】\]]")
        .expect("kanri chapter header regex")
});

/// Index line, e.g. `3-1 A-B 材料副費の処理 ③- 7`.
static INDEX_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<left>\d+)\s*-\s*(?P<right>\d+)\s+(?P<written>[A-C])\s*-\s*(?P<oral>[A-C])\s+(?P<title>.+?)\s+(?P<page_ref>[①-⑳]\s*-\s*\d+)",
    )
    .expect("kanri index line regex")
});

/// Body header, e.g. `例題3-1 材料副費の処理`.
static EXAMPLE_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"例題\s*(?P<left>\d+)\s*-\s*(?P<right>\d+)\s+(?P<title>.+?)(?:\s|$)")
        .expect("kanri body header regex")
});

/// Citation printed at the page bottom, e.g. `－ ③-7 －` (normalized).
static BOTTOM_PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-\s*(?P<page_ref>[①-⑳]\s*-\s*\d+)\s*-").expect("kanri bottom page regex")
});

static PAGE_REF_CORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<circ>[①-⑳])-?(?P<pageno>\d+)").expect("kanri page-ref regex"));

/// One front-matter index entry, keyed by the `"chapter-example"` string.
#[derive(Debug, Clone, Default)]
struct IndexEntry {
    rank_written: Option<String>,
    rank_oral: Option<String>,
    page_ref: Option<String>,
    title_hint: String,
}

struct FrontMatterIndex {
    entries: HashMap<String, IndexEntry>,
    chapter_titles: HashMap<u32, String>,
}

pub fn extract(doc: &dyn PageSource, source_document: &str) -> Vec<ExampleRecord> {
    let index = build_front_matter_index(doc);
    debug!(
        entries = index.entries.len(),
        chapters = index.chapter_titles.len(),
        "built front-matter index"
    );

    let mut records = Vec::new();

    for page in 1..=doc.page_count() {
        let text = normalize_text(&doc.page_text(page));
        if text.is_empty() {
            continue;
        }

        for line in text.lines() {
            let Some(captures) = EXAMPLE_HEADER_RE.captures(line) else {
                continue;
            };

            let (Some(chapter_no), Some(example_no)) = (
                captures
                    .name("left")
                    .and_then(|m| m.as_str().parse::<u32>().ok()),
                captures
                    .name("right")
                    .and_then(|m| m.as_str().parse::<u32>().ok()),
            ) else {
                continue;
            };

            let key = format!("{chapter_no}-{example_no}");
            let entry = index.entries.get(&key);

            let mut title = clean_title(captures.name("title").map(|m| m.as_str()).unwrap_or(""));
            if title.is_empty() {
                // headers occasionally wrap before the title; the index
                // carries a usable hint
                title = entry.map(|e| e.title_hint.clone()).unwrap_or_default();
            }
            let rank_written = entry.and_then(|e| e.rank_written.clone());
            let rank_oral = entry.and_then(|e| e.rank_oral.clone());

            // index citation first, the page's own footer as fallback
            let page_ref = entry
                .and_then(|e| e.page_ref.clone())
                .or_else(|| bottom_page_ref(&text));

            let chapter_title = index
                .chapter_titles
                .get(&chapter_no)
                .cloned()
                .unwrap_or_default();

            let rank =
                ExampleRecord::derive_compat_rank(rank_written.as_deref(), rank_oral.as_deref());

            records.push(ExampleRecord {
                subject: Subject::Kanri,
                chapter_no,
                chapter_title,
                // this series does not use sections
                section_no: 0,
                section_title: String::new(),
                example_no,
                title,
                rank,
                rank_written,
                rank_oral,
                page_ref,
                source_page: page,
                source_document: source_document.to_string(),
            });
        }
    }

    records
}

fn build_front_matter_index(doc: &dyn PageSource) -> FrontMatterIndex {
    let mut entries = HashMap::new();
    let mut chapter_titles = HashMap::new();

    let window = doc.page_count().min(INDEX_WINDOW_PAGES);
    for page in 1..=window {
        let text = normalize_text(&doc.page_text(page));
        if text.is_empty() {
            continue;
        }

        for line in text.lines() {
            // chapter headers win over anything else on the line
            if let Some(captures) = CHAPTER_HEADER_RE.captures(line) {
                if let Some(no) = captures
                    .name("no")
                    .and_then(|m| m.as_str().parse::<u32>().ok())
                {
                    let title =
                        collapse_whitespace(captures.name("title").map(|m| m.as_str()).unwrap_or(""));
                    if !title.is_empty() {
                        chapter_titles.insert(no, title);
                    }
                }
                continue;
            }

            let Some(captures) = INDEX_LINE_RE.captures(line) else {
                continue;
            };

            let (Some(left), Some(right)) = (
                captures
                    .name("left")
                    .and_then(|m| m.as_str().parse::<u32>().ok()),
                captures
                    .name("right")
                    .and_then(|m| m.as_str().parse::<u32>().ok()),
            ) else {
                continue;
            };

            entries.insert(
                format!("{left}-{right}"),
                IndexEntry {
                    rank_written: normalize_rank(captures.name("written").map(|m| m.as_str())),
                    rank_oral: normalize_rank(captures.name("oral").map(|m| m.as_str())),
                    page_ref: captures
                        .name("page_ref")
                        .and_then(|m| normalize_page_ref(m.as_str())),
                    title_hint: collapse_whitespace(
                        captures.name("title").map(|m| m.as_str()).unwrap_or(""),
                    ),
                },
            );
        }
    }

    FrontMatterIndex {
        entries,
        chapter_titles,
    }
}

fn bottom_page_ref(text: &str) -> Option<String> {
    BOTTOM_PAGE_RE
        .captures(text)
        .and_then(|captures| normalize_page_ref(captures.name("page_ref")?.as_str()))
}

/// Canonical `circled-digit - number` citation, whitespace removed.
fn normalize_page_ref(raw: &str) -> Option<String> {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    let captures = PAGE_REF_CORE_RE.captures(&compact)?;
    Some(format!(
        "{}-{}",
        captures.name("circ")?.as_str(),
        captures.name("pageno")?.as_str()
    ))
}

/// Strip a leaked `- 1` number fragment from the start of a body title.
fn clean_title(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    let stripped = collapsed
        .strip_prefix('-')
        .map(|rest| rest.trim_start_matches([' ', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9']))
        .unwrap_or(&collapsed);
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_page_refs() {
        assert_eq!(normalize_page_ref("③- 7"), Some("③-7".to_string()));
        assert_eq!(normalize_page_ref("⑳-123"), Some("⑳-123".to_string()));
        assert_eq!(normalize_page_ref("3-7"), None);
    }

    #[test]
    fn index_line_matches_normalized_toc_rows() {
        let line = normalize_text("３－１ Ａ-Ｂ 材料副費の処理 ③- 7");
        let captures = INDEX_LINE_RE.captures(&line).unwrap();
        assert_eq!(&captures["left"], "3");
        assert_eq!(&captures["right"], "1");
        assert_eq!(&captures["written"], "A");
        assert_eq!(&captures["oral"], "B");
    }

    #[test]
    fn chapter_header_takes_priority_over_index_lines() {
        let line = "【第3章 材料費】";
        assert!(CHAPTER_HEADER_RE.is_match(line));
    }

    #[test]
    fn cleans_leaked_number_prefix_from_title() {
        assert_eq!(clean_title("- 1 材料副費の処理"), "材料副費の処理");
        assert_eq!(clean_title("材料副費の処理"), "材料副費の処理");
    }

    #[test]
    fn bottom_page_ref_found_in_footer_text() {
        let text = normalize_text("本文のテキスト\n－ ③-8 －");
        assert_eq!(bottom_page_ref(&text), Some("③-8".to_string()));
    }
}
