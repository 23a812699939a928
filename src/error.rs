//! Error types for the conjunction-search core.
//!
//! Three kinds, matching the error-handling design: a fatal per-object
//! propagator initialization failure, a fatal configuration error, and a
//! fatal empty-catalog error. Per-sample propagator failures are not errors
//! at all — they are represented in-band as NaN tensor slots and filtered
//! downstream.

use thiserror::Error;

/// Errors that can abort the conjunction-search pipeline.
#[derive(Debug, Error)]
pub enum ConjunctionError {
    /// A propagator could not be initialized from an object's TLE lines.
    /// The object is dropped from the catalog rather than aborting the run;
    /// this variant exists so the drop reason is a typed, logged value
    /// instead of a bare `sgp4::Error`.
    #[error("failed to initialize propagator for object {object_id}: {source}")]
    CatalogInit {
        object_id: String,
        #[source]
        source: sgp4::Error,
    },

    /// A configuration value violates an invariant the pipeline depends on.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Every catalog entry was filtered (e.g. all `"UNKNOWN"`, or all
    /// failed propagator initialization) leaving nothing to propagate.
    #[error("catalog is empty after filtering")]
    EmptyCatalog,
}

pub type Result<T> = std::result::Result<T, ConjunctionError>;
