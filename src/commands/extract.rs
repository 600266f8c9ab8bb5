use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::ExtractArgs;
use crate::detect::detect_subject;
use crate::document::{PageSource, PdfDocument};
use crate::extract::extract_examples;
use crate::model::{
    DocumentResult, ExampleRecord, ExtractManifest, Subject, SubjectCounts,
};
use crate::util::{ensure_directory, now_utc_string, sha256_bytes, write_json_pretty};

pub fn run(args: ExtractArgs) -> Result<()> {
    let inputs = if args.inputs.is_empty() {
        discover_pdfs(&args.source_dir)?
    } else {
        args.inputs.clone()
    };

    if inputs.is_empty() {
        bail!("no PDFs found in {}", args.source_dir.display());
    }

    ensure_directory(&args.out_dir)?;

    let mut documents = Vec::new();
    let mut warnings = Vec::new();
    let mut records_by_subject: Vec<(Subject, Vec<ExampleRecord>)> = Subject::KNOWN
        .iter()
        .map(|&subject| (subject, Vec::new()))
        .collect();
    let mut skipped = 0_usize;

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
                warnings.push(format!("failed to read {filename}: {error}"));
                skipped += 1;
                continue;
            }
        };

        // an unopenable document is one reported failure, not a run failure
        let doc = match PdfDocument::open(&bytes) {
            Ok(doc) => doc,
            Err(error) => {
                warn!(path = %path.display(), error = %error, "failed to open PDF, skipping");
                warnings.push(format!("failed to open {filename}: {error}"));
                skipped += 1;
                continue;
            }
        };

        let (subject, forced) = match args.subject {
            Some(subject) => (subject, true),
            None => (detect_subject(&doc, &filename).0, false),
        };

        let records = extract_examples(&doc, subject, &filename);
        info!(
            file = %filename,
            subject = subject.code(),
            records = records.len(),
            "extracted document"
        );

        if subject == Subject::Unknown {
            warnings.push(format!("subject not recognized for {filename}"));
        }

        // hash the bytes that were extracted, not a second disk read
        documents.push(DocumentResult {
            sha256: sha256_bytes(&bytes),
            filename,
            subject,
            subject_forced: forced,
            page_count: doc.page_count(),
            record_count: records.len(),
        });

        if let Some((_, bucket)) = records_by_subject
            .iter_mut()
            .find(|(bucket_subject, _)| *bucket_subject == subject)
        {
            bucket.extend(records);
        }
    }

    let mut subjects = Vec::new();
    for (subject, records) in &mut records_by_subject {
        sort_records(records);

        let document_count = documents
            .iter()
            .filter(|doc| doc.subject == *subject)
            .count();
        subjects.push(SubjectCounts {
            subject: *subject,
            document_count,
            record_count: records.len(),
        });

        if records.is_empty() {
            continue;
        }

        let json_path = args.out_dir.join(format!("{}.json", subject.code()));
        write_json_pretty(&json_path, records)?;
        info!(path = %json_path.display(), "wrote subject export");

        if !args.json_only {
            let csv_path = args.out_dir.join(format!("{}.csv", subject.code()));
            write_csv(&csv_path, records)?;
            info!(path = %csv_path.display(), "wrote subject export");
        }
    }

    let manifest = ExtractManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: args.source_dir.display().to_string(),
        out_directory: args.out_dir.display().to_string(),
        pdf_count: inputs.len(),
        skipped_pdf_count: skipped,
        documents,
        subjects,
        warnings,
    };

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| args.out_dir.join("extract_manifest.json"));
    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote extract manifest");

    Ok(())
}

pub fn discover_pdfs(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();

    let entries = fs::read_dir(source_dir)
        .with_context(|| format!("failed to read {}", source_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", source_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);

        if is_pdf {
            pdfs.push(path);
        }
    }

    pdfs.sort();
    Ok(pdfs)
}

/// Export ordering: chapter, section, physical page, example number.
/// Stable, so in-page match order survives for equal keys.
fn sort_records(records: &mut [ExampleRecord]) {
    records.sort_by(|a, b| {
        (a.chapter_no, a.section_no, a.source_page, a.example_no).cmp(&(
            b.chapter_no,
            b.section_no,
            b.source_page,
            b.example_no,
        ))
    });
}

const CSV_HEADER: &str = "subject,chapter_no,chapter_title,section_no,section_title,example_no,\
                          title,rank,rank_written,rank_oral,page_ref,source_page,source_document";

fn write_csv(path: &Path, records: &[ExampleRecord]) -> Result<()> {
    let mut file = fs::File::create(path)
        .with_context(|| format!("failed to create csv file: {}", path.display()))?;

    writeln!(file, "{CSV_HEADER}")
        .with_context(|| format!("failed to write csv file: {}", path.display()))?;

    for record in records {
        let fields = [
            record.subject.code().to_string(),
            record.chapter_no.to_string(),
            record.chapter_title.clone(),
            record.section_no.to_string(),
            record.section_title.clone(),
            record.example_no.to_string(),
            record.title.clone(),
            record.rank.clone().unwrap_or_default(),
            record.rank_written.clone().unwrap_or_default(),
            record.rank_oral.clone().unwrap_or_default(),
            record.page_ref.clone().unwrap_or_default(),
            record.source_page.to_string(),
            record.source_document.clone(),
        ];
        let line = fields
            .iter()
            .map(|field| csv_escape(field))
            .collect::<Vec<String>>()
            .join(",");
        writeln!(file, "{line}")
            .with_context(|| format!("failed to write csv file: {}", path.display()))?;
    }

    Ok(())
}

/// RFC 4180 quoting: wrap fields containing commas, quotes, or newlines
/// and double any embedded quotes.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(chapter: u32, section: u32, page: u32, example: u32) -> ExampleRecord {
        ExampleRecord {
            subject: Subject::Zeimu,
            chapter_no: chapter,
            chapter_title: String::new(),
            section_no: section,
            section_title: String::new(),
            example_no: example,
            title: String::new(),
            rank: None,
            rank_written: None,
            rank_oral: None,
            page_ref: None,
            source_page: page,
            source_document: "doc.pdf".to_string(),
        }
    }

    #[test]
    fn sorts_by_chapter_section_page_example() {
        let mut records = vec![
            record(2, 1, 30, 1),
            record(1, 2, 12, 4),
            record(1, 1, 8, 2),
            record(1, 1, 8, 1),
        ];
        sort_records(&mut records);

        let keys: Vec<(u32, u32, u32, u32)> = records
            .iter()
            .map(|r| (r.chapter_no, r.section_no, r.source_page, r.example_no))
            .collect();
        assert_eq!(
            keys,
            vec![(1, 1, 8, 1), (1, 1, 8, 2), (1, 2, 12, 4), (2, 1, 30, 1)]
        );
    }

    #[test]
    fn escapes_csv_fields() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }
}
