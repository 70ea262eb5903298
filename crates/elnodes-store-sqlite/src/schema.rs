//! SQL schema for the elnodes SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// There is exactly one row per node. `first_connected` is written once on
/// insert and is never part of an update clause. A non-empty `error` makes
/// the row read-only for the conditional update path (see the upsert in
/// `store.rs`).
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS t_node_info (
    node_id         TEXT PRIMARY KEY,  -- 64 lowercase hex chars
    peer_id         INTEGER NOT NULL,
    first_connected TEXT NOT NULL,     -- ISO 8601 UTC; immutable after insert
    last_connected  TEXT NOT NULL,
    last_tried      TEXT NOT NULL,
    client_name     TEXT NOT NULL,
    capabilities    TEXT NOT NULL,     -- array literal, e.g. '{\"eth/67\",\"eth/68\"}'
    software_info   TEXT NOT NULL,
    error           TEXT               -- NULL or '' = no recorded error
);

CREATE INDEX IF NOT EXISTS node_info_client_idx ON t_node_info(client_name);

PRAGMA user_version = 1;
";
