//! Note export in markdown or PDF

use tracing::{debug, info};

use lectern_core::{Error, Result};

use crate::config::ExportConfig;
use crate::markdown::{build_html_document, export_markdown, markdown_to_html};
use crate::pdf::{PdfEngine, WkhtmltopdfEngine};

pub struct NoteExporter<P: PdfEngine> {
    config: ExportConfig,
    engine: P,
}

impl NoteExporter<WkhtmltopdfEngine> {
    /// Exporter backed by the configured `wkhtmltopdf` binary
    pub fn from_config(config: ExportConfig) -> Self {
        let engine = WkhtmltopdfEngine::new(config.wkhtmltopdf_path.clone());
        Self { config, engine }
    }
}

impl<P: PdfEngine> NoteExporter<P> {
    pub fn new(config: ExportConfig, engine: P) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn export_markdown(&self, notes: &str) -> String {
        export_markdown(notes)
    }

    /// Render notes to PDF bytes
    ///
    /// The stylesheet is checked first; a missing one fails before the
    /// engine is ever invoked.
    pub async fn export_pdf(&self, notes: &str) -> Result<Vec<u8>> {
        let css_path = &self.config.stylesheet_path;
        let css = match tokio::fs::read_to_string(css_path).await {
            Ok(css) => css,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::StylesheetNotFound(css_path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let body = markdown_to_html(notes);
        let document = build_html_document(&body, &css);
        debug!(html_bytes = document.len(), engine = self.engine.name(), "Rendering notes");

        let pdf = self.engine.render(&document).await?;
        info!(pdf_bytes = pdf.len(), "Exported notes to PDF");

        Ok(pdf)
    }
}
