//! Source documents for generation.
//!
//! Only plain text is read here. PDF and DOCX need text extraction, which the
//! client does not do, so those files are refused with a message saying so.

use crate::errors::{AppError, AppResult};
use crate::models::{TextType, Tier};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDocument {
    pub file_name: String,
    pub text: String,
    pub file_size: u64,
    pub text_type: TextType,
}

pub fn load_document(path: &Path, tier: Tier) -> AppResult<SourceDocument> {
    let text_type = TextType::from_path(path);
    match text_type {
        TextType::Txt => {}
        TextType::Pdf | TextType::Docx => {
            return Err(AppError::Validation(
                "Извлечение текста из PDF и DOCX не поддерживается. Сохраните документ как TXT"
                    .to_string(),
            ));
        }
        _ => {
            return Err(AppError::Validation(
                "Поддерживаются только файлы TXT".to_string(),
            ));
        }
    }

    let file_size = fs::metadata(path)?.len();
    if file_size > tier.max_document_bytes() {
        return Err(AppError::Validation(format!(
            "Файл слишком большой. Максимальный размер: {}",
            tier.max_document_label()
        )));
    }

    let text = fs::read_to_string(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    log::debug!("Read {} bytes of source text from {}", file_size, file_name);
    Ok(SourceDocument {
        file_name,
        text,
        file_size,
        text_type,
    })
}

/// `1536` → `1.5 KB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    let rounded = (size * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_txt_document() {
        let path = temp_file("iceq_doc_ok.txt", "Юпитер — газовый гигант.".as_bytes());

        let doc = load_document(&path, Tier::Free).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(doc.text_type, TextType::Txt);
        assert_eq!(doc.file_name, "iceq_doc_ok.txt");
        assert_eq!(doc.text, "Юпитер — газовый гигант.");
        assert_eq!(doc.file_size, doc.text.len() as u64);
    }

    #[test]
    fn test_free_tier_size_limit() {
        let path = temp_file("iceq_doc_big.txt", &vec![b'a'; 50 * 1024 + 1]);

        let free = load_document(&path, Tier::Free);
        let premium = load_document(&path, Tier::Premium);
        let _ = fs::remove_file(&path);

        assert!(matches!(free, Err(AppError::Validation(msg)) if msg.contains("50 КБ")));
        assert!(premium.is_ok());
    }

    #[test]
    fn test_pdf_and_docx_rejected() {
        for name in ["book.pdf", "notes.docx"] {
            let result = load_document(Path::new(name), Tier::Premium);
            assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("PDF")));
        }
        assert!(load_document(Path::new("image.png"), Tier::Premium).is_err());
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1 MB");
    }
}
