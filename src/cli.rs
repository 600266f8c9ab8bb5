use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::Subject;

#[derive(Parser, Debug)]
#[command(
    name = "reidai",
    version,
    about = "CPA textbook example-problem extraction tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract example-problem records from textbook PDFs and write
    /// per-subject JSON/CSV exports.
    Extract(ExtractArgs),
    /// Report subject-classification scores for textbook PDFs.
    Detect(DetectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Directory scanned for *.pdf files when no explicit inputs are given.
    #[arg(long, default_value = ".")]
    pub source_dir: PathBuf,

    /// Explicit PDF files to process instead of scanning --source-dir.
    #[arg(value_name = "PDF")]
    pub inputs: Vec<PathBuf>,

    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    /// Force a subject for every input instead of auto-detection.
    #[arg(long, value_enum)]
    pub subject: Option<Subject>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Skip the CSV exports and write JSON only.
    #[arg(long, default_value_t = false)]
    pub json_only: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    #[arg(long, default_value = ".")]
    pub source_dir: PathBuf,

    #[arg(value_name = "PDF")]
    pub inputs: Vec<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
