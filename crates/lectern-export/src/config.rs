//! Export configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Stylesheet shipped with the crate
pub const BUNDLED_STYLESHEET: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/pdf_style.css");

pub const DEFAULT_WKHTMLTOPDF: &str = "wkhtmltopdf";

/// Where the PDF renderer and its stylesheet live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub stylesheet_path: PathBuf,
    pub wkhtmltopdf_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            stylesheet_path: PathBuf::from(BUNDLED_STYLESHEET),
            wkhtmltopdf_path: DEFAULT_WKHTMLTOPDF.to_string(),
        }
    }
}

impl ExportConfig {
    /// Read `LECTERN_PDF_STYLESHEET` and `WKHTMLTOPDF_PATH`
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        Self {
            stylesheet_path: non_blank("LECTERN_PDF_STYLESHEET")
                .map(PathBuf::from)
                .unwrap_or(defaults.stylesheet_path),
            wkhtmltopdf_path: non_blank("WKHTMLTOPDF_PATH").unwrap_or(defaults.wkhtmltopdf_path),
        }
    }

    pub fn with_stylesheet(mut self, path: impl AsRef<Path>) -> Self {
        self.stylesheet_path = path.as_ref().to_path_buf();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_bundled_stylesheet() {
        let config = ExportConfig::from_vars(|_| None);
        assert_eq!(config.stylesheet_path, PathBuf::from(BUNDLED_STYLESHEET));
        assert_eq!(config.wkhtmltopdf_path, "wkhtmltopdf");
        assert!(config.stylesheet_path.exists());
    }

    #[test]
    fn test_overrides() {
        let config = ExportConfig::from_vars(|key| match key {
            "LECTERN_PDF_STYLESHEET" => Some("/srv/notes.css".to_string()),
            "WKHTMLTOPDF_PATH" => Some("/opt/bin/wkhtmltopdf".to_string()),
            _ => None,
        });
        assert_eq!(config.stylesheet_path, PathBuf::from("/srv/notes.css"));
        assert_eq!(config.wkhtmltopdf_path, "/opt/bin/wkhtmltopdf");
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = ExportConfig::from_vars(|_| Some("  ".to_string()));
        assert_eq!(config.wkhtmltopdf_path, DEFAULT_WKHTMLTOPDF);
    }
}
