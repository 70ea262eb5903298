//! [`SqliteStore`] — the SQLite implementation of [`NodeStore`].

use std::path::{Path, PathBuf};

use rusqlite::OptionalExtension as _;
use serde::Deserialize;

use elnodes_core::{
  node::{NodeId, NodeObservation, NodeRecord},
  store::{NodeStore, UpsertOutcome},
};

use crate::{
  encode::{
    encode_capabilities, encode_dt, encode_error, encode_node_id,
    RawNodeRecord,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Config ──────────────────────────────────────────────────────────────────

/// Where the store lives. The source's hardcoded connection target becomes
/// this explicit struct, supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Path of the SQLite database file; created if missing.
  pub path: PathBuf,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An elnodes record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and all
/// calls against it are serialised on a dedicated thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open the store described by `config`.
  pub async fn connect(config: &StoreConfig) -> Result<Self> {
    Self::open(&config.path).await
  }

  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "opened node store");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

const SELECT_COLUMNS: &str = "node_id, peer_id, first_connected, \
   last_connected, last_tried, client_name, capabilities, software_info, \
   error";

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawNodeRecord> {
  Ok(RawNodeRecord {
    node_id:         row.get(0)?,
    peer_id:         row.get(1)?,
    first_connected: row.get(2)?,
    last_connected:  row.get(3)?,
    last_tried:      row.get(4)?,
    client_name:     row.get(5)?,
    capabilities:    row.get(6)?,
    software_info:   row.get(7)?,
    error:           row.get(8)?,
  })
}

// ─── NodeStore impl ──────────────────────────────────────────────────────────

impl NodeStore for SqliteStore {
  type Error = Error;

  async fn upsert_node_info(
    &self,
    observation: &NodeObservation,
  ) -> Result<UpsertOutcome> {
    let node_id_str     = encode_node_id(observation.node_id);
    let peer_id         = observation.peer_id;
    let first_conn_str  = encode_dt(observation.first_connected);
    let last_conn_str   = encode_dt(observation.last_connected);
    let last_tried_str  = encode_dt(observation.last_tried);
    let client_name     = observation.client_name.clone();
    let capabilities    = encode_capabilities(&observation.capabilities);
    let software_info   = observation.software_info.clone();
    let error           = encode_error(&observation.error);

    // The existence probe and the upsert run inside one `call`, which the
    // connection executes as a single serialised unit. The guard itself is
    // enforced by the WHERE clause on the conflict action, so the statement
    // stays atomic even against other connections.
    let outcome = self
      .conn
      .call(move |conn| {
        let existed: bool = conn
          .query_row(
            "SELECT 1 FROM t_node_info WHERE node_id = ?1",
            rusqlite::params![node_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        let changed = conn.execute(
          "INSERT INTO t_node_info (
             node_id, peer_id, first_connected, last_connected, last_tried,
             client_name, capabilities, software_info, error
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
           ON CONFLICT (node_id) DO UPDATE SET
             peer_id        = excluded.peer_id,
             last_connected = excluded.last_connected,
             last_tried     = excluded.last_tried,
             client_name    = excluded.client_name,
             capabilities   = excluded.capabilities,
             software_info  = excluded.software_info,
             error          = excluded.error
           WHERE t_node_info.error IS NULL OR t_node_info.error = ''",
          rusqlite::params![
            node_id_str,
            peer_id,
            first_conn_str,
            last_conn_str,
            last_tried_str,
            client_name,
            capabilities,
            software_info,
            error,
          ],
        )?;

        let outcome = if !existed {
          UpsertOutcome::Inserted
        } else if changed > 0 {
          UpsertOutcome::Updated
        } else {
          UpsertOutcome::Unchanged
        };
        Ok(outcome)
      })
      .await?;

    tracing::debug!(node_id = %observation.node_id, ?outcome, "upserted node info");
    Ok(outcome)
  }

  async fn get_node_info(&self, node_id: NodeId) -> Result<Option<NodeRecord>> {
    let node_id_str = encode_node_id(node_id);

    let raw: Option<RawNodeRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SELECT_COLUMNS} FROM t_node_info WHERE node_id = ?1"
              ),
              rusqlite::params![node_id_str],
              row_to_raw,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNodeRecord::into_record).transpose()
  }

  async fn list_node_infos(&self) -> Result<Vec<NodeRecord>> {
    let raws: Vec<RawNodeRecord> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SELECT_COLUMNS} FROM t_node_info ORDER BY node_id"
        ))?;
        let rows = stmt
          .query_map([], row_to_raw)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNodeRecord::into_record).collect()
  }

  async fn count_nodes(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM t_node_info", [], |row| {
          row.get(0)
        })?)
      })
      .await?;

    Ok(count as u64)
  }
}
