//! Inference runtime configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, EmbeddingResult};

/// Configuration for the native inference runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Explicit path to the ONNX Runtime shared library.
    /// When unset, `ONNXRUNTIME_LIB_PATH` is consulted, then the loader's
    /// default search path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_path: Option<PathBuf>,

    /// Intra-op thread count for the session. 0 leaves the engine default.
    #[serde(default)]
    pub intra_threads: usize,
}

impl RuntimeConfig {
    /// Validate the configuration.
    ///
    /// Library existence is checked when the runtime is created, not here, so
    /// a config file can be validated on a machine without the runtime.
    ///
    /// # Errors
    /// - `EmbeddingError::ConfigError` if `library_path` is set but empty
    pub fn validate(&self) -> EmbeddingResult<()> {
        if let Some(path) = &self.library_path {
            if path.as_os_str().is_empty() {
                return Err(EmbeddingError::ConfigError {
                    message: "library_path cannot be empty; omit it to use discovery".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_engine_discovery() {
        let config = RuntimeConfig::default();
        assert!(config.library_path.is_none());
        assert_eq!(config.intra_threads, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_library_path_rejected() {
        let config = RuntimeConfig {
            library_path: Some(PathBuf::new()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EmbeddingError::ConfigError { .. })
        ));
    }
}
