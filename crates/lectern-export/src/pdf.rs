//! PDF rendering engines

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use lectern_core::{Error, Result};

/// Turns a complete HTML document into PDF bytes
#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>>;

    fn name(&self) -> &str;
}

/// Renders through an external `wkhtmltopdf` process, stdin to stdout
#[derive(Debug, Clone)]
pub struct WkhtmltopdfEngine {
    program: String,
}

impl WkhtmltopdfEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl PdfEngine for WkhtmltopdfEngine {
    async fn render(&self, html: &str) -> Result<Vec<u8>> {
        debug!(program = %self.program, html_bytes = html.len(), "Starting PDF renderer");

        let mut child = Command::new(&self.program)
            .args(["--quiet", "--encoding", "utf-8", "-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Render(format!("Failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(html.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(Error::Render(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(Error::Render(format!("{} produced no output", self.program)));
        }

        Ok(output.stdout)
    }

    fn name(&self) -> &str {
        "wkhtmltopdf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_render_error() {
        let engine = WkhtmltopdfEngine::new("lectern-no-such-renderer");
        let err = engine.render("<p>x</p>").await.unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}
