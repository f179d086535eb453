//! Result and test exports in JSON, TXT and CSV.
//!
//! Formatting is pure: the same inputs always give the same text. The only
//! wall-clock value is the one baked into the file name.

pub mod csv;
pub mod json;
pub mod txt;

use crate::errors::AppResult;
use crate::models::{Question, ResultSummary};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Txt,
    Csv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Json, ExportFormat::Txt, ExportFormat::Csv];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON файл",
            ExportFormat::Txt => "TXT файл",
            ExportFormat::Csv => "CSV файл",
        }
    }
}

/// Renders a finished attempt in `format`.
pub fn export_results(
    format: ExportFormat,
    summary: &ResultSummary,
    questions: &[Question],
    user_answers: &[Option<String>],
) -> AppResult<String> {
    match format {
        ExportFormat::Json => json::results_json(summary, questions, user_answers),
        ExportFormat::Txt => Ok(txt::results_txt(summary)),
        ExportFormat::Csv => Ok(csv::results_csv(summary)),
    }
}

/// Renders a test (no answers taken) in `format`.
pub fn export_test(
    format: ExportFormat,
    questions: &[Question],
    created_at: DateTime<Utc>,
) -> AppResult<String> {
    match format {
        ExportFormat::Json => json::test_json(questions, created_at),
        ExportFormat::Txt => txt::test_txt(questions),
        ExportFormat::Csv => Ok(csv::test_csv(questions)),
    }
}

/// `test_results_YYYY-MM-DDTHH-MM-SS.<ext>`
pub fn export_filename(format: ExportFormat, now: DateTime<Utc>) -> String {
    format!(
        "test_results_{}.{}",
        now.format("%Y-%m-%dT%H-%M-%S"),
        format.extension()
    )
}

/// `ICEQ-Test_YYYY-MM-DD.<ext>`
pub fn test_filename(format: ExportFormat, now: DateTime<Utc>) -> String {
    format!("ICEQ-Test_{}.{}", now.format("%Y-%m-%d"), format.extension())
}

/// Writes exported text to `path`, replacing any existing file.
pub fn write_export(path: &Path, contents: &str) -> AppResult<()> {
    write_export_bytes(path, contents.as_bytes())
}

/// Writes an export as-is. Server-rendered exports are not guaranteed to be UTF-8.
pub fn write_export_bytes(path: &Path, contents: &[u8]) -> AppResult<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    log::info!("Exported to {}", path.display());
    Ok(())
}
