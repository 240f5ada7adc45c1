//! SQL schema for the food document store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per aggregate document. `body` is the whole JSON document and is
-- always replaced as a unit; `revision` is bumped on every write.
CREATE TABLE IF NOT EXISTS documents (
    id        TEXT PRIMARY KEY,
    doctype   TEXT NOT NULL,   -- 'FOOD'
    revision  INTEGER NOT NULL,
    body      TEXT NOT NULL
);

-- Reference rows (nutrients, derivations) keyed by their numeric code.
CREATE TABLE IF NOT EXISTS dictionary_entries (
    namespace TEXT NOT NULL,
    doctype   TEXT NOT NULL,   -- 'NUT' | 'DERV'
    code      INTEGER NOT NULL,
    body      TEXT NOT NULL,
    PRIMARY KEY (namespace, doctype, code)
);

CREATE INDEX IF NOT EXISTS documents_doctype_idx ON documents(doctype);

PRAGMA user_version = 1;
";
