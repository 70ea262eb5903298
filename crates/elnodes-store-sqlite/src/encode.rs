//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Node ids are stored as
//! 64-character lowercase hex. Capability lists are stored in the store's
//! array-literal textual form — double-quoted elements, comma-separated,
//! brace-delimited, e.g. `{"eth/67","eth/68","snap/1"}`.

use chrono::{DateTime, Utc};
use elnodes_core::node::{NodeId, NodeRecord};

use crate::{Error, Result};

// ─── NodeId ──────────────────────────────────────────────────────────────────

pub fn encode_node_id(id: NodeId) -> String { id.to_string() }

pub fn decode_node_id(s: &str) -> Result<NodeId> { Ok(s.parse::<NodeId>()?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Capabilities ────────────────────────────────────────────────────────────

/// Serialise an ordered capability list into the array-literal form bound as
/// the `capabilities` column value. `"` and `\` inside an element are
/// backslash-escaped; an empty list becomes `{}`.
pub fn encode_capabilities(caps: &[String]) -> String {
  let mut out = String::from("{");
  for (idx, cap) in caps.iter().enumerate() {
    if idx > 0 {
      out.push(',');
    }
    out.push('"');
    for ch in cap.chars() {
      if ch == '"' || ch == '\\' {
        out.push('\\');
      }
      out.push(ch);
    }
    out.push('"');
  }
  out.push('}');
  out
}

/// Parse an array literal back into the ordered capability list.
pub fn decode_capabilities(s: &str) -> Result<Vec<String>> {
  let inner = s
    .strip_prefix('{')
    .and_then(|rest| rest.strip_suffix('}'))
    .ok_or_else(|| Error::Capabilities(format!("missing braces in {s:?}")))?;

  if inner.is_empty() {
    return Ok(Vec::new());
  }

  let mut caps = Vec::new();
  let mut chars = inner.chars();

  loop {
    match chars.next() {
      Some('"') => {}
      other => {
        return Err(Error::Capabilities(format!(
          "expected opening quote, found {other:?} in {s:?}"
        )));
      }
    }

    let mut element = String::new();
    loop {
      match chars.next() {
        Some('\\') => match chars.next() {
          Some(escaped) => element.push(escaped),
          None => {
            return Err(Error::Capabilities(format!(
              "dangling escape in {s:?}"
            )));
          }
        },
        Some('"') => break,
        Some(ch) => element.push(ch),
        None => {
          return Err(Error::Capabilities(format!(
            "unterminated element in {s:?}"
          )));
        }
      }
    }
    caps.push(element);

    match chars.next() {
      Some(',') => continue,
      None => break,
      Some(other) => {
        return Err(Error::Capabilities(format!(
          "expected comma between elements, found {other:?} in {s:?}"
        )));
      }
    }
  }

  Ok(caps)
}

// ─── Error column ────────────────────────────────────────────────────────────

/// Normalise an observed error for storage: an empty string means "no error"
/// and is stored as NULL.
pub fn encode_error(error: &Option<String>) -> Option<String> {
  match error.as_deref() {
    None | Some("") => None,
    Some(e) => Some(e.to_owned()),
  }
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `t_node_info` row.
pub struct RawNodeRecord {
  pub node_id:         String,
  pub peer_id:         i64,
  pub first_connected: String,
  pub last_connected:  String,
  pub last_tried:      String,
  pub client_name:     String,
  pub capabilities:    String,
  pub software_info:   String,
  pub error:           Option<String>,
}

impl RawNodeRecord {
  pub fn into_record(self) -> Result<NodeRecord> {
    Ok(NodeRecord {
      node_id:         decode_node_id(&self.node_id)?,
      peer_id:         self.peer_id,
      first_connected: decode_dt(&self.first_connected)?,
      last_connected:  decode_dt(&self.last_connected)?,
      last_tried:      decode_dt(&self.last_tried)?,
      client_name:     self.client_name,
      capabilities:    decode_capabilities(&self.capabilities)?,
      software_info:   self.software_info,
      error:           self.error,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn capabilities_literal_form() {
    let caps = vec!["cap1".to_owned(), "cap2".to_owned(), "cap3".to_owned()];
    assert_eq!(encode_capabilities(&caps), r#"{"cap1","cap2","cap3"}"#);
    assert_eq!(decode_capabilities(r#"{"cap1","cap2","cap3"}"#).unwrap(), caps);
  }

  #[test]
  fn capabilities_empty_list() {
    assert_eq!(encode_capabilities(&[]), "{}");
    assert!(decode_capabilities("{}").unwrap().is_empty());
  }

  #[test]
  fn capabilities_escape_quotes_and_backslashes() {
    let caps = vec![r#"we"ird"#.to_owned(), r"back\slash".to_owned()];
    let literal = encode_capabilities(&caps);
    assert_eq!(literal, r#"{"we\"ird","back\\slash"}"#);
    assert_eq!(decode_capabilities(&literal).unwrap(), caps);
  }

  #[test]
  fn capabilities_reject_malformed_literals() {
    assert!(decode_capabilities("cap1,cap2").is_err());
    assert!(decode_capabilities(r#"{"unterminated}"#).is_err());
    assert!(decode_capabilities(r#"{"a" "b"}"#).is_err());
  }

  #[test]
  fn error_empty_string_becomes_null() {
    assert_eq!(encode_error(&Some(String::new())), None);
    assert_eq!(encode_error(&None), None);
    assert_eq!(
      encode_error(&Some("too many peers".into())),
      Some("too many peers".to_owned())
    );
  }
}
