//! Keyword-weighted subject classification.
//!
//! Scores are a total function over the fixed subject set: every subject
//! gets a score (default 0), and the winner must clear an absolute
//! threshold and a margin over the runner-up, otherwise the document is
//! classified as unknown.

use crate::document::PageSource;
use crate::model::{Subject, SubjectScores};
use crate::normalize::normalize_text;

/// Body/outline keyword weights per subject.
const SUBJECT_KEYWORDS: [(Subject, &[(&str, i64)]); 3] = [
    (
        Subject::Zeimu,
        &[
            ("法人税", 6),
            ("法人税法", 6),
            ("租税", 5),
            ("租税公課", 6),
            ("税効果会計", 4),
            ("申告", 3),
            ("課税所得", 4),
            ("別表", 4),
            ("受取配当", 3),
            ("完全支配関係", 3),
            ("寄附金", 3),
            ("交際費", 3),
            ("減価償却", 3),
        ],
    ),
    (
        Subject::Zaimu,
        &[
            ("財務会計", 6),
            ("連結", 5),
            ("企業結合", 5),
            ("金融商品", 4),
            ("退職給付", 4),
            ("包括利益", 3),
            ("キャッシュ・フロー", 3),
            ("会計方針", 3),
            ("減損", 3),
            ("収益認識", 3),
            ("資産除去債務", 3),
            ("リース", 3),
        ],
    ),
    (
        Subject::Kanri,
        &[
            ("管理会計", 6),
            ("CVP", 6),
            ("標準原価", 5),
            ("差異分析", 5),
            ("直接原価", 5),
            ("予算", 4),
            ("意思決定", 4),
            ("設備投資", 4),
            ("原価計算", 4),
            ("原価企画", 4),
            ("部門別", 3),
            ("内部振替", 3),
        ],
    ),
];

/// Filename keyword weights. The filename is human-authored and usually
/// names the subject outright, so its score is tripled.
const FILENAME_HINTS: [(Subject, &[(&str, i64)]); 3] = [
    (
        Subject::Zeimu,
        &[
            ("租税", 6),
            ("税法", 6),
            ("法人税", 6),
            ("法人税法", 6),
            ("消費税", 6),
            ("所得税", 6),
        ],
    ),
    (
        Subject::Zaimu,
        &[
            ("財務", 6),
            ("財務会計", 6),
            ("会計基準", 4),
            ("連結", 4),
            ("企業結合", 4),
        ],
    ),
    (
        Subject::Kanri,
        &[
            ("管理", 6),
            ("管理会計", 6),
            ("原価", 4),
            ("CVP", 6),
            ("差異", 4),
            ("予算", 4),
        ],
    ),
];

const FILENAME_WEIGHT: i64 = 3;
const HEAD_PAGE_COUNT: u32 = 8;
const MIN_TOP_SCORE: i64 = 6;
const MIN_MARGIN: i64 = 2;

pub fn detect_subject(doc: &dyn PageSource, file_name: &str) -> (Subject, SubjectScores) {
    let outline_text = normalize_text(
        &doc.outline()
            .iter()
            .map(|entry| entry.title.as_str())
            .collect::<Vec<&str>>()
            .join(" "),
    );

    let mut head_text = String::new();
    for page in 1..=doc.page_count().min(HEAD_PAGE_COUNT) {
        head_text.push_str(&doc.page_text(page));
        head_text.push('\n');
    }
    let head_text = normalize_text(&head_text);
    let file_name = normalize_text(file_name);

    let mut scores = SubjectScores {
        zeimu: 0,
        zaimu: 0,
        kanri: 0,
    };
    for subject in Subject::KNOWN {
        let score = score_text(&outline_text, subject, &SUBJECT_KEYWORDS, 1)
            + score_text(&head_text, subject, &SUBJECT_KEYWORDS, 1)
            + score_text(&file_name, subject, &FILENAME_HINTS, FILENAME_WEIGHT);
        set_score(&mut scores, subject, score);
    }

    (classify(&scores), scores)
}

fn score_text(
    text: &str,
    subject: Subject,
    tables: &[(Subject, &[(&str, i64)])],
    factor: i64,
) -> i64 {
    let Some((_, weights)) = tables.iter().find(|(s, _)| *s == subject) else {
        return 0;
    };

    weights
        .iter()
        .filter(|(keyword, _)| text.contains(keyword))
        .map(|(_, weight)| weight * factor)
        .sum()
}

fn set_score(scores: &mut SubjectScores, subject: Subject, value: i64) {
    match subject {
        Subject::Zeimu => scores.zeimu = value,
        Subject::Zaimu => scores.zaimu = value,
        Subject::Kanri => scores.kanri = value,
        Subject::Unknown => {}
    }
}

fn classify(scores: &SubjectScores) -> Subject {
    let mut ranked = [
        (Subject::Zeimu, scores.zeimu),
        (Subject::Zaimu, scores.zaimu),
        (Subject::Kanri, scores.kanri),
    ];
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let (best, top_score) = ranked[0];
    let (_, second_score) = ranked[1];

    if top_score < MIN_TOP_SCORE || top_score - second_score < MIN_MARGIN {
        return Subject::Unknown;
    }
    best
}
