//! Process-wide runtime environment.
//!
//! The native library is loaded once per process. Every model holds an
//! `Arc<RuntimeEnvironment>`; the handle is released when the last holder
//! drops it and re-acquired by the next model that needs one.
//!
//! The library location is pinned by the first load. Later requests naming a
//! different location reuse the pinned one and log a warning.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};

use once_cell::sync::Lazy;

use crate::config::RUNTIME_LIBRARY_ENV;
use crate::error::{EmbeddingError, EmbeddingResult};

struct Registry {
    live: Weak<RuntimeEnvironment>,
    pinned: Option<LibrarySource>,
}

static REGISTRY: Lazy<Mutex<Registry>> = Lazy::new(|| {
    Mutex::new(Registry {
        live: Weak::new(),
        pinned: None,
    })
});

/// Where the runtime library was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibrarySource {
    /// Path passed by the caller or set in `[runtime] library_path`.
    Explicit(PathBuf),
    /// Path taken from `ONNXRUNTIME_LIB_PATH`.
    Environment(PathBuf),
    /// No path given; the loader's default search applies.
    Default,
}

impl LibrarySource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            LibrarySource::Explicit(p) | LibrarySource::Environment(p) => Some(p),
            LibrarySource::Default => None,
        }
    }
}

/// Resolve the runtime library location.
///
/// Precedence: `explicit`, then `ONNXRUNTIME_LIB_PATH`, then default
/// discovery. A named path that does not exist is an error rather than a
/// fallthrough.
///
/// # Errors
/// - `EmbeddingError::EngineInitError` if the chosen path does not exist
pub fn resolve_library_path(explicit: Option<&Path>) -> EmbeddingResult<LibrarySource> {
    let source = match explicit {
        Some(path) => LibrarySource::Explicit(path.to_path_buf()),
        None => match std::env::var_os(RUNTIME_LIBRARY_ENV) {
            Some(val) if !val.is_empty() => LibrarySource::Environment(PathBuf::from(val)),
            _ => LibrarySource::Default,
        },
    };

    if let Some(path) = source.path() {
        if !path.exists() {
            return Err(EmbeddingError::EngineInitError {
                message: format!("Runtime library not found at {}", path.display()),
            });
        }
    }

    Ok(source)
}

/// Load ONNX Runtime and create its process environment.
///
/// `ort` panics when the shared library cannot be opened; the panic is
/// contained here and reported as an init error.
#[cfg(feature = "onnx")]
fn load_library(source: &LibrarySource) -> EmbeddingResult<()> {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let builder = match source.path() {
        Some(path) => ort::init_from(path.display().to_string()),
        None => ort::init(),
    };

    match catch_unwind(AssertUnwindSafe(move || builder.with_name("splade").commit())) {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(EmbeddingError::EngineInitError {
            message: format!("ONNX Runtime environment: {}", e),
        }),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<String>()
                .map(String::as_str)
                .or_else(|| payload.downcast_ref::<&str>().copied())
                .unwrap_or("unknown loader failure");
            Err(EmbeddingError::EngineInitError {
                message: format!("Failed to load runtime library ({:?}): {}", source, reason),
            })
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_library(_source: &LibrarySource) -> EmbeddingResult<()> {
    Ok(())
}

/// Shared handle to the loaded runtime library.
#[derive(Debug)]
pub struct RuntimeEnvironment {
    source: LibrarySource,
}

impl RuntimeEnvironment {
    /// Get the live environment or load the runtime library and create one.
    ///
    /// # Errors
    /// - `EmbeddingError::EngineInitError` if the library path is invalid or
    ///   the library cannot be loaded
    /// - `EmbeddingError::InternalError` if the registry lock is poisoned
    pub fn acquire(explicit: Option<&Path>) -> EmbeddingResult<Arc<Self>> {
        Self::acquire_with(explicit, load_library)
    }

    pub(crate) fn acquire_with<F>(explicit: Option<&Path>, load: F) -> EmbeddingResult<Arc<Self>>
    where
        F: FnOnce(&LibrarySource) -> EmbeddingResult<()>,
    {
        let requested = resolve_library_path(explicit)?;

        let mut registry = REGISTRY.lock().map_err(|_| EmbeddingError::InternalError {
            message: "runtime environment lock poisoned".to_string(),
        })?;

        if let Some(pinned) = &registry.pinned {
            if requested.path().is_some() && requested.path() != pinned.path() {
                tracing::warn!(
                    requested = ?requested,
                    active = ?pinned,
                    "Runtime library already chosen for this process; ignoring new location"
                );
            }
        }

        if let Some(env) = registry.live.upgrade() {
            return Ok(env);
        }

        let source = registry
            .pinned
            .get_or_insert_with(|| requested.clone())
            .clone();
        load(&source)?;
        tracing::info!(source = ?source, "Runtime environment acquired");

        let env = Arc::new(Self { source });
        registry.live = Arc::downgrade(&env);
        Ok(env)
    }

    pub fn source(&self) -> &LibrarySource {
        &self.source
    }
}

impl Drop for RuntimeEnvironment {
    fn drop(&mut self) {
        // The native library stays mapped; only the handle is released.
        tracing::debug!(source = ?self.source, "Runtime environment released");
    }
}

#[cfg(test)]
pub(crate) fn reset_registry() {
    if let Ok(mut registry) = REGISTRY.lock() {
        registry.live = Weak::new();
        registry.pinned = None;
    }
}
