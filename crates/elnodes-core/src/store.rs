//! The `NodeStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `elnodes-store-sqlite`).
//! Crawler components depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use crate::node::{NodeId, NodeObservation, NodeRecord};

// ─── Upsert outcome ──────────────────────────────────────────────────────────

/// What a call to [`NodeStore::upsert_node_info`] did to the row.
///
/// The write is a single atomic insert-or-update; the conditional update path
/// carries a guard predicate over the existing row — "apply iff the stored
/// error is null or empty". `Unchanged` reports that the guard held the write
/// off, so callers can see a sticky error without a follow-up read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
  /// No row existed for the node id; a new one was created.
  Inserted,
  /// An existing row was updated (its stored error was null or empty).
  Updated,
  /// An existing row carries a non-empty error; the update was suppressed
  /// and no field was touched.
  Unchanged,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an elnodes record store backend.
///
/// There is exactly one row per [`NodeId`]; writes go through a single atomic
/// upsert, so concurrent callers targeting the same node never produce a
/// duplicate row or clobber a sticky error. There is no deletion path.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait NodeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert a new node row, or conditionally update the existing one.
  ///
  /// On conflict the update excludes `first_connected` (immutable after the
  /// first write) and is applied only when the stored `error` column is null
  /// or empty. Either the whole write lands or none of it does.
  fn upsert_node_info<'a>(
    &'a self,
    observation: &'a NodeObservation,
  ) -> impl Future<Output = Result<UpsertOutcome, Self::Error>> + Send + 'a;

  /// Retrieve a node row by id. Returns `None` if the node was never seen.
  fn get_node_info(
    &self,
    node_id: NodeId,
  ) -> impl Future<Output = Result<Option<NodeRecord>, Self::Error>> + Send + '_;

  /// List all node rows, ordered by node id.
  fn list_node_infos(
    &self,
  ) -> impl Future<Output = Result<Vec<NodeRecord>, Self::Error>> + Send + '_;

  /// Number of rows in the store.
  fn count_nodes(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
