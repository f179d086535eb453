pub mod document;
pub mod test_file;

pub use document::{SourceDocument, format_file_size, load_document};
pub use test_file::{TestFileKind, load_test_file, parse_test};
