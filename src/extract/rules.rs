//! Per-subject pattern sets for example headers and page-reference
//! footers. Compiled once into immutable statics; selection is by
//! subject, and subjects without a rule set here (kanri, unknown) are
//! handled elsewhere.
//!
//! All patterns run against normalized text (see `crate::normalize`), so
//! only ASCII dashes/digits/colons need to be spelled. Rank letters and
//! parentheses keep their full-width alternatives because normalization
//! leaves parentheses alone.

use std::sync::LazyLock;

use regex::Regex;

/// How a page-reference match is turned into the human-facing citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRefStyle {
    /// `head` + `section` + `-` + `pageno`, e.g. `法人-12`.
    HeadSectionPage,
    /// `section` + `-` + `pageno` with circled digits folded to numbers,
    /// e.g. `①-23` becomes `1-23`.
    SectionToDigit,
}

/// Where on the page a page-reference pattern is allowed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRefScope {
    /// Anywhere on the page. Safe only for patterns with a fixed lead
    /// token that cannot occur in body prose.
    FullPage,
    /// The trailing lines of the page only. Anchor-less patterns like
    /// `N-M` must use this so cross-references in running text do not
    /// get mistaken for the printed citation.
    Footer,
}

pub struct PageRefRule {
    pub pattern: Regex,
    pub style: PageRefStyle,
    pub scope: PageRefScope,
}

pub struct SubjectRules {
    pub example_headers: Vec<Regex>,
    pub page_refs: Vec<PageRefRule>,
    /// Ranks are printed near the header rather than inside it; recover
    /// them from the text block between consecutive headers.
    pub block_ranks: bool,
}

/// 租税: inline rank parenthetical on the header line, `法X-N` citations.
pub static ZEIMU_RULES: LazyLock<SubjectRules> = LazyLock::new(|| SubjectRules {
    example_headers: vec![
        Regex::new(
            r"(?m)例題\s*(?P<num>\d+)\s+(?P<title>[^\n]*?)(?:\s*[（(](?P<rank>[A-CＡ-Ｃ])[)）])?\s*$",
        )
        .expect("zeimu header regex"),
    ],
    page_refs: vec![PageRefRule {
        pattern: Regex::new(r"(?P<head>法)(?P<section>[^\s-]+)-(?P<pageno>\d+)")
            .expect("zeimu page-ref regex"),
        style: PageRefStyle::HeadSectionPage,
        scope: PageRefScope::FullPage,
    }],
    block_ranks: false,
});

/// 財務: bare headers with `短答:X 論文:Y` annotations printed in the
/// example block, circled-digit or plain `N-M` citations.
pub static ZAIMU_RULES: LazyLock<SubjectRules> = LazyLock::new(|| SubjectRules {
    example_headers: vec![
        Regex::new(r"(?m)^\s*例題\s*(?P<num>\d+)\s+(?P<title>[^\n]{1,80})")
            .expect("zaimu header regex"),
    ],
    page_refs: vec![PageRefRule {
        pattern: Regex::new(r"(?P<section>[①-⑩]|\d{1,3})\s*-\s*(?P<pageno>\d+)")
            .expect("zaimu page-ref regex"),
        style: PageRefStyle::SectionToDigit,
        scope: PageRefScope::Footer,
    }],
    block_ranks: true,
});

/// Written-track rank annotation, e.g. `短答:A` or `短 A`.
pub static RANK_WRITTEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:短答|短)\s*[: ]\s*(?P<rank>[A-CＡ-Ｃ])").expect("written rank regex")
});

/// Oral-track rank annotation, e.g. `論文:B`.
pub static RANK_ORAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:論文|論)\s*[: ]\s*(?P<rank>[A-CＡ-Ｃ])").expect("oral rank regex")
});

/// Trailing rank parenthetical swallowed into a captured title.
pub static TITLE_RANK_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[（(][A-CＡ-Ｃ][)）]\s*$").expect("title rank suffix regex"));

/// Rank annotations swallowed into a captured title (zaimu layout).
pub static TITLE_RANK_ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:短答|短|論文|論)\s*[: ]\s*[A-CＡ-Ｃ]").expect("title rank annotation regex")
});

pub fn circled_digit_value(ch: char) -> Option<u32> {
    // ① (U+2460) .. ⑳ (U+2473)
    let code = ch as u32;
    (0x2460..=0x2473).contains(&code).then(|| code - 0x2460 + 1)
}

/// Format a page-reference match according to the rule's style.
pub fn format_page_ref(rule: &PageRefRule, captures: &regex::Captures<'_>) -> Option<String> {
    let section = captures.name("section")?.as_str();
    let pageno = captures.name("pageno")?.as_str();

    match rule.style {
        PageRefStyle::HeadSectionPage => {
            let head = captures.name("head").map(|m| m.as_str()).unwrap_or("");
            Some(format!("{head}{section}-{pageno}"))
        }
        PageRefStyle::SectionToDigit => {
            let section = match section.chars().next().and_then(circled_digit_value) {
                Some(value) => value.to_string(),
                None => section.to_string(),
            };
            Some(format!("{section}-{pageno}"))
        }
    }
}
