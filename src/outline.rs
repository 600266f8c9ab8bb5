//! Chapter/section tree recovery from PDF bookmarks, and page-position
//! resolution against that tree.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::OutlineEntry;
use crate::model::{Chapter, Section};
use crate::normalize::{collapse_whitespace, normalize_text};

static CHAPTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"第\s*(?P<no>\d+)\s*章\s*(?P<title>.+)").expect("chapter regex"));

static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"第\s*(?P<no>\d+)\s*節\s*(?P<title>.+)").expect("section regex"));

/// Build the chapter tree from bookmark entries in document order.
///
/// Level-1 entries matching `第N章` open a chapter; level-2 entries
/// matching `第N節` append to the current chapter. A section with no
/// preceding chapter is dropped — malformed bookmark trees are expected,
/// not an error. Nothing is re-ordered: bookmark order is assumed to be
/// monotonic in page number.
pub fn parse_outline(entries: &[OutlineEntry]) -> Vec<Chapter> {
    let mut chapters = Vec::<Chapter>::new();

    for entry in entries {
        let title = normalize_text(&entry.title);

        match entry.level {
            1 => {
                let Some((no, title)) = match_numbered_heading(&CHAPTER_RE, &title) else {
                    continue;
                };
                chapters.push(Chapter {
                    no,
                    title,
                    start_page: entry.page,
                    sections: Vec::new(),
                });
            }
            2 => {
                let Some(current) = chapters.last_mut() else {
                    continue;
                };
                let Some((no, title)) = match_numbered_heading(&SECTION_RE, &title) else {
                    continue;
                };
                current.sections.push(Section {
                    no,
                    title,
                    start_page: entry.page,
                });
            }
            _ => {}
        }
    }

    chapters
}

fn match_numbered_heading(pattern: &Regex, title: &str) -> Option<(u32, String)> {
    let captures = pattern.captures(title)?;
    let no = captures.name("no")?.as_str().parse::<u32>().ok()?;
    let heading = collapse_whitespace(captures.name("title").map(|m| m.as_str()).unwrap_or(""));
    Some((no, heading))
}

/// Find the innermost chapter/section enclosing `page`: the last entries
/// in iteration order whose `start_page <= page`. Returns `(None, None)`
/// for pages before any chapter; the section alone may be `None` when the
/// page precedes every section header of its chapter.
pub fn find_chapter_section(chapters: &[Chapter], page: u32) -> (Option<&Chapter>, Option<&Section>) {
    let mut current_chapter = None;
    for chapter in chapters {
        if chapter.start_page <= page {
            current_chapter = Some(chapter);
        }
    }

    let Some(chapter) = current_chapter else {
        return (None, None);
    };

    let mut current_section = None;
    for section in &chapter.sections {
        if section.start_page <= page {
            current_section = Some(section);
        }
    }

    (Some(chapter), current_section)
}
