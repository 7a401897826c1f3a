//! SQL schema for the alarm event store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per recorded transition. Rows are overwritten only when the same
-- (id, resource_id) pair is written again; nothing is deleted.
CREATE TABLE IF NOT EXISTS alarm_states (
    id          TEXT NOT NULL,    -- 'ALARM_' || alarm name
    resource_id TEXT NOT NULL,    -- transition timestamp, verbatim
    app_name    TEXT NOT NULL,
    bookmarked  TEXT NOT NULL DEFAULT 'N',
    state       TEXT NOT NULL,    -- 'OK' | 'ALARM'
    value       INTEGER NOT NULL, -- -1 | 0 | 1
    PRIMARY KEY (id, resource_id)
);

PRAGMA user_version = 1;
";
