use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Subject domains of the three textbook series, plus a sentinel for
/// documents nothing matched. The set is closed: extraction dispatch
/// matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// 租税 (tax law)
    Zeimu,
    /// 財務 (financial accounting)
    Zaimu,
    /// 管理 (management accounting)
    Kanri,
    Unknown,
}

impl Subject {
    pub fn code(self) -> &'static str {
        match self {
            Self::Zeimu => "zeimu",
            Self::Zaimu => "zaimu",
            Self::Kanri => "kanri",
            Self::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Zeimu => "租税",
            Self::Zaimu => "財務",
            Self::Kanri => "管理",
            Self::Unknown => "不明",
        }
    }

    /// The subjects extraction can produce records for.
    pub const KNOWN: [Subject; 3] = [Self::Zeimu, Self::Zaimu, Self::Kanri];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub no: u32,
    pub title: String,
    pub start_page: u32,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub no: u32,
    pub title: String,
    pub start_page: u32,
}

/// One extracted example problem.
///
/// `rank` is a compatibility field derived from the two track ranks
/// (oral if present, else written); it is never authored independently.
/// `section_no` 0 with an empty `section_title` means the subject does
/// not use sections (kanri) or the page precedes any section header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleRecord {
    pub subject: Subject,
    pub chapter_no: u32,
    pub chapter_title: String,
    pub section_no: u32,
    pub section_title: String,
    pub example_no: u32,
    pub title: String,
    pub rank: Option<String>,
    pub rank_written: Option<String>,
    pub rank_oral: Option<String>,
    pub page_ref: Option<String>,
    pub source_page: u32,
    pub source_document: String,
}

impl ExampleRecord {
    pub fn derive_compat_rank(
        rank_written: Option<&str>,
        rank_oral: Option<&str>,
    ) -> Option<String> {
        rank_oral.or(rank_written).map(ToOwned::to_owned)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub filename: String,
    pub sha256: String,
    pub subject: Subject,
    pub subject_forced: bool,
    pub page_count: u32,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectCounts {
    pub subject: Subject,
    pub document_count: usize,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub out_directory: String,
    pub pdf_count: usize,
    pub skipped_pdf_count: usize,
    pub documents: Vec<DocumentResult>,
    pub subjects: Vec<SubjectCounts>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectScores {
    pub zeimu: i64,
    pub zaimu: i64,
    pub kanri: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectReportEntry {
    pub filename: String,
    pub subject: Subject,
    pub scores: SubjectScores,
}
