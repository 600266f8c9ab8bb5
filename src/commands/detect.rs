use std::fs;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::DetectArgs;
use crate::detect::detect_subject;
use crate::document::PdfDocument;
use crate::model::DetectReportEntry;

pub fn run(args: DetectArgs) -> Result<()> {
    let inputs = if args.inputs.is_empty() {
        super::extract::discover_pdfs(&args.source_dir)?
    } else {
        args.inputs.clone()
    };

    if inputs.is_empty() {
        bail!("no PDFs found in {}", args.source_dir.display());
    }

    let mut report = Vec::new();

    for path in &inputs {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(path = %path.display(), error = %error, "failed to read PDF, skipping");
                continue;
            }
        };

        let doc = match PdfDocument::open(&bytes) {
            Ok(doc) => doc,
            Err(error) => {
                warn!(path = %path.display(), error = %error, "failed to open PDF, skipping");
                continue;
            }
        };

        let (subject, scores) = detect_subject(&doc, &filename);
        info!(
            file = %filename,
            subject = subject.code(),
            label = subject.label(),
            zeimu = scores.zeimu,
            zaimu = scores.zaimu,
            kanri = scores.kanri,
            "detected subject"
        );

        report.push(DetectReportEntry {
            filename,
            subject,
            scores,
        });
    }

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&report).context("failed to serialize detect report")?;
        println!("{rendered}");
    }

    Ok(())
}
