//! Error types for `elnodes-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A node identifier that is not exactly 32 hex-encoded bytes.
  #[error("invalid node id {value:?}: {reason}")]
  InvalidNodeId { value: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
