//! Request sent to the generation endpoint.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationModel {
    #[default]
    Iceq,
    Deepseek,
    Qwen,
}

impl GenerationModel {
    pub const ALL: [GenerationModel; 3] = [
        GenerationModel::Iceq,
        GenerationModel::Deepseek,
        GenerationModel::Qwen,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            GenerationModel::Iceq => "ICEQ",
            GenerationModel::Deepseek => "DeepSeek",
            GenerationModel::Qwen => "Qwen",
        }
    }
}

/// Where the source text came from; reported to the backend for statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextType {
    #[default]
    Text,
    Txt,
    Pdf,
    Docx,
    File,
}

impl TextType {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("txt") => TextType::Txt,
            Some("pdf") => TextType::Pdf,
            Some("docx") => TextType::Docx,
            _ => TextType::File,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub text: String,
    pub question_number: u32,
    pub model: GenerationModel,
    pub file_size: u64,
    pub text_type: TextType,
}
