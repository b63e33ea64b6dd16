//! Export of lecture notes to markdown and PDF

pub mod config;
pub mod exporter;
pub mod markdown;
pub mod pdf;


pub use config::{ExportConfig, BUNDLED_STYLESHEET, DEFAULT_WKHTMLTOPDF};
pub use exporter::NoteExporter;
pub use markdown::{build_html_document, export_markdown, markdown_to_html};
pub use pdf::{PdfEngine, WkhtmltopdfEngine};
