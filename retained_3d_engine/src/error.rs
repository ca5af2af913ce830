//! Error types for the Retained3D engine
//!
//! This module defines the error types used throughout the engine,
//! including scene-graph mutation, rendering and resource management.

use std::fmt;

/// Result type for Retained3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Retained3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (software rasterizer, GPU backends)
    BackendError(String),

    /// Out of memory while allocating a surface or cache entry
    OutOfMemory,

    /// Invalid resource (texture, surface, mesh, etc.)
    InvalidResource(String),

    /// Initialization failed (renderer, viewport, plugin)
    InitializationFailed(String),

    /// Invalid parameters passed to a mutating call; the target is left unmodified
    InvalidParams(String),

    /// Element not found (detached child, unknown callback, unknown plugin)
    NotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidParams(msg) => write!(f, "Invalid parameters: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR (with file:line) and build an `Error::BackendError` from the same message
///
/// # Example
///
/// ```no_run
/// # use retained_3d_engine::engine_err;
/// let err = engine_err!("retained3d::Viewport", "No camera set");
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::retained3d::Error::BackendError(message)
    }};
}

/// Log an ERROR and return early with an `Error::BackendError`
///
/// # Example
///
/// ```no_run
/// # use retained_3d_engine::engine_bail;
/// # fn render(n: usize) -> retained_3d_engine::retained3d::Result<()> {
/// if n % 3 != 0 {
///     engine_bail!("retained3d::software::Renderer", "Vertex count {} is not a multiple of 3", n);
/// }
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

/// Log a WARN and build an `Error::InvalidParams` from the same message
#[macro_export]
macro_rules! engine_invalid_params {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_warn!($source, "{}", message);
        $crate::retained3d::Error::InvalidParams(message)
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
