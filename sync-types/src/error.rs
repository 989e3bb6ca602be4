//! Error types for the gallery entity model.

use thiserror::Error;

/// Data-integrity errors raised while building entities from backend data.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// A persisted metadata field could not be interpreted. Never defaulted.
    #[error("invalid metadata for {owner}: field `{field}`: {reason}")]
    InvalidMetadata {
        /// Album (or `album/photo`) the metadata belongs to.
        owner: String,
        /// Name of the offending field.
        field: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// An id cannot be used as a single path component.
    #[error("invalid {kind} id: {id:?}")]
    InvalidId {
        /// Which kind of id (`album`, `photo`, `gallery`).
        kind: &'static str,
        /// The rejected id.
        id: String,
    },
}
