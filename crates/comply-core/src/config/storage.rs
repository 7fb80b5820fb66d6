//! Document storage configuration.

use serde::{Deserialize, Serialize};

/// Uploaded compliance document storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for stored uploads.
    #[serde(default = "default_root")]
    pub root_path: String,
    /// Maximum accepted upload size in bytes (10240 KiB).
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: u64,
    /// Lowercase file extensions accepted for upload.
    #[serde(default = "default_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root(),
            max_upload_bytes: default_max_upload(),
            allowed_extensions: default_extensions(),
        }
    }
}

impl StorageConfig {
    /// Whether the file name carries an accepted extension.
    pub fn accepts(&self, file_name: &str) -> bool {
        std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|a| *a == ext)
            })
            .unwrap_or(false)
    }
}

fn default_root() -> String {
    "./data/uploads".to_string()
}

fn default_max_upload() -> u64 {
    10_240 * 1024
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_pdf_case_insensitive() {
        let cfg = StorageConfig::default();
        assert!(cfg.accepts("permit.PDF"));
        assert!(cfg.accepts("a.b.pdf"));
        assert!(!cfg.accepts("permit.docx"));
        assert!(!cfg.accepts("pdf"));
    }
}
