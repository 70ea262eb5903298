//! Node identity and record types.
//!
//! A node is keyed by its 32-byte discovery identifier. Everything else the
//! crawler learns about it (handshake details, capability list, the last
//! error it produced) lives in a single mutable [`NodeRecord`] row.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

// ─── NodeId ──────────────────────────────────────────────────────────────────

/// A 32-byte node identifier, rendered as 64 lowercase hex characters.
///
/// Construction validates length and character set, so a `NodeId` held by a
/// caller is always well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId([u8; 32]);

impl NodeId {
  pub const fn from_bytes(bytes: [u8; 32]) -> Self { Self(bytes) }

  pub fn as_bytes(&self) -> &[u8; 32] { &self.0 }
}

impl FromStr for NodeId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    if s.len() != 64 {
      return Err(Error::InvalidNodeId {
        value:  s.to_owned(),
        reason: format!("expected 64 hex characters, got {}", s.len()),
      });
    }

    let raw = hex::decode(s).map_err(|e| Error::InvalidNodeId {
      value:  s.to_owned(),
      reason: e.to_string(),
    })?;

    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&raw);
    Ok(Self(bytes))
  }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&hex::encode(self.0))
  }
}

impl Serialize for NodeId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for NodeId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse::<NodeId>().map_err(serde::de::Error::custom)
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// What a caller observed about a node during one connection attempt.
///
/// The same nine fields as [`NodeRecord`]; the store decides which of them
/// actually land, depending on whether the node is already known and whether
/// its recorded error is sticky.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeObservation {
  pub node_id:         NodeId,
  pub peer_id:         i64,
  pub first_connected: DateTime<Utc>,
  pub last_connected:  DateTime<Utc>,
  pub last_tried:      DateTime<Utc>,
  pub client_name:     String,
  /// Ordered protocol capability list, e.g. `["eth/67", "eth/68", "snap/1"]`.
  pub capabilities:    Vec<String>,
  pub software_info:   String,
  /// `None` (or an empty string, which the store normalises to `None`) means
  /// the connection succeeded without error.
  pub error:           Option<String>,
}

/// One persisted node row — the read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
  pub node_id:         NodeId,
  pub peer_id:         i64,
  /// Set when the node is first seen; immutable thereafter.
  pub first_connected: DateTime<Utc>,
  pub last_connected:  DateTime<Utc>,
  pub last_tried:      DateTime<Utc>,
  pub client_name:     String,
  pub capabilities:    Vec<String>,
  pub software_info:   String,
  pub error:           Option<String>,
}

impl NodeRecord {
  /// Whether the row carries a recorded (non-empty) error.
  pub fn has_error(&self) -> bool {
    self.error.as_deref().is_some_and(|e| !e.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const HEX_ID: &str =
    "f3d4165dd5e1902d4204516c76475f931079a5004df4250d9b2294f1f65b2537";

  #[test]
  fn node_id_roundtrips_through_hex() {
    let id: NodeId = HEX_ID.parse().unwrap();
    assert_eq!(id.to_string(), HEX_ID);
  }

  #[test]
  fn node_id_rejects_wrong_length() {
    let err = "abcd".parse::<NodeId>().unwrap_err();
    assert!(matches!(err, Error::InvalidNodeId { .. }));
  }

  #[test]
  fn node_id_rejects_non_hex() {
    let bad = "g".repeat(64);
    let err = bad.parse::<NodeId>().unwrap_err();
    assert!(matches!(err, Error::InvalidNodeId { .. }));
  }

  #[test]
  fn has_error_treats_empty_string_as_clear() {
    let mut record = NodeRecord {
      node_id:         HEX_ID.parse().unwrap(),
      peer_id:         0,
      first_connected: Utc::now(),
      last_connected:  Utc::now(),
      last_tried:      Utc::now(),
      client_name:     "geth".into(),
      capabilities:    vec![],
      software_info:   String::new(),
      error:           Some(String::new()),
    };
    assert!(!record.has_error());

    record.error = Some("too many peers".into());
    assert!(record.has_error());
  }
}
