//! [`SqliteStore`], the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use bfpd_core::{
  DocType,
  food::Food,
  store::{
    BrowseQuery, DictionaryEntry, DocumentStore, SearchField, SearchPage,
    SearchQuery, Versioned,
  },
};

use crate::{
  Error, Result,
  encode::{RawDocument, decode_count, decode_revision, encode_food, encode_revision},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A food document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
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

/// `WHERE` fragment matching `?1` against the given fields.
fn search_condition(field: Option<SearchField>) -> String {
  let fields: &[SearchField] = match &field {
    Some(f) => std::slice::from_ref(f),
    None => &SearchField::ALL,
  };
  let matches: Vec<String> = fields
    .iter()
    .map(|f| {
      format!(
        "instr(lower(ifnull(json_extract(body, '{}'), '')), lower(?1)) > 0",
        f.json_path()
      )
    })
    .collect();
  format!("({})", matches.join(" OR "))
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  // ── Foods ─────────────────────────────────────────────────────────────────

  async fn get(&self, id: &str) -> Result<Option<Versioned<Food>>> {
    let id = id.to_owned();

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT body, revision FROM documents WHERE id = ?1",
            rusqlite::params![id],
            |row| {
              Ok(RawDocument {
                body:     row.get(0)?,
                revision: row.get(1)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawDocument::into_versioned).transpose()
  }

  async fn update(&self, id: &str, food: &Food) -> Result<u64> {
    let id      = id.to_owned();
    let doctype = food.doc_type.as_str();
    let body    = encode_food(food)?;

    let revision: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO documents (id, doctype, revision, body) VALUES (?1, ?2, 1, ?3)
           ON CONFLICT(id) DO UPDATE SET
             doctype  = excluded.doctype,
             body     = excluded.body,
             revision = documents.revision + 1
           RETURNING revision",
          rusqlite::params![id, doctype, body],
          |row| row.get(0),
        )?)
      })
      .await?;

    decode_revision(revision)
  }

  async fn compare_and_swap(
    &self,
    id:       &str,
    food:     &Food,
    expected: Option<u64>,
  ) -> Result<Option<u64>> {
    let id       = id.to_owned();
    let doctype  = food.doc_type.as_str();
    let body     = encode_food(food)?;
    let expected = expected.map(encode_revision).transpose()?;

    let revision: Option<i64> = self
      .conn
      .call(move |conn| {
        let row = match expected {
          Some(rev) => conn
            .query_row(
              "UPDATE documents SET doctype = ?2, body = ?3, revision = revision + 1
               WHERE id = ?1 AND revision = ?4
               RETURNING revision",
              rusqlite::params![id, doctype, body, rev],
              |row| row.get(0),
            )
            .optional()?,
          None => conn
            .query_row(
              "INSERT INTO documents (id, doctype, revision, body) VALUES (?1, ?2, 1, ?3)
               ON CONFLICT(id) DO NOTHING
               RETURNING revision",
              rusqlite::params![id, doctype, body],
              |row| row.get(0),
            )
            .optional()?,
        };
        Ok(row)
      })
      .await?;

    revision.map(decode_revision).transpose()
  }

  // ── Dictionaries ──────────────────────────────────────────────────────────

  async fn get_dictionary(
    &self,
    namespace: &str,
    doctype:   DocType,
    offset:    usize,
    limit:     usize,
  ) -> Result<Vec<serde_json::Value>> {
    let ns         = namespace.to_owned();
    let dt         = doctype.as_str();
    let limit_val  = limit as i64;
    let offset_val = offset as i64;

    let (known, bodies): (bool, Vec<String>) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT body FROM dictionary_entries
           WHERE namespace = ?1 AND doctype = ?2
           ORDER BY code
           LIMIT ?3 OFFSET ?4",
        )?;
        let bodies = stmt
          .query_map(rusqlite::params![ns, dt, limit_val, offset_val], |row| {
            row.get(0)
          })?
          .collect::<rusqlite::Result<Vec<String>>>()?;

        if !bodies.is_empty() {
          return Ok((true, bodies));
        }

        // An empty page past the end is fine; an empty dictionary is not.
        let known: bool = conn.query_row(
          "SELECT EXISTS (
             SELECT 1 FROM dictionary_entries WHERE namespace = ?1 AND doctype = ?2
           )",
          rusqlite::params![ns, dt],
          |row| row.get(0),
        )?;
        Ok((known, bodies))
      })
      .await?;

    if !known {
      return Err(Error::UnknownDictionary {
        namespace: namespace.to_owned(),
        doctype,
      });
    }

    bodies
      .iter()
      .map(|b| serde_json::from_str(b).map_err(Error::from))
      .collect()
  }

  async fn put_dictionary(
    &self,
    namespace: &str,
    doctype:   DocType,
    entries:   Vec<DictionaryEntry>,
  ) -> Result<usize> {
    let ns = namespace.to_owned();
    let dt = doctype.as_str();
    let rows: Vec<(u32, String)> = entries
      .into_iter()
      .map(|e| -> Result<(u32, String)> {
        Ok((e.code, serde_json::to_string(&e.body)?))
      })
      .collect::<Result<_>>()?;

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM dictionary_entries WHERE namespace = ?1 AND doctype = ?2",
          rusqlite::params![ns, dt],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO dictionary_entries (namespace, doctype, code, body)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          for (code, body) in &rows {
            stmt.execute(rusqlite::params![ns, dt, code, body])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    tracing::debug!(namespace, %doctype, written, "dictionary replaced");
    Ok(written)
  }

  // ── Query API reads ───────────────────────────────────────────────────────

  async fn counts(&self, doctype: DocType) -> Result<u64> {
    let dt = doctype.as_str();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT (SELECT COUNT(*) FROM documents          WHERE doctype = ?1)
                + (SELECT COUNT(*) FROM dictionary_entries WHERE doctype = ?1)",
          rusqlite::params![dt],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(decode_count(count))
  }

  async fn browse(&self, query: &BrowseQuery) -> Result<Vec<Food>> {
    let sources_json = if query.sources.is_empty() {
      None
    } else {
      Some(serde_json::to_string(&query.sources)?)
    };
    let order_path = query.sort.json_path();
    let limit_val  = query.limit as i64;
    let offset_val = query.offset as i64;

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT body, revision FROM documents
           WHERE doctype = 'FOOD'
             AND (?1 IS NULL
                  OR json_extract(body, '$.dataSource') IN (SELECT value FROM json_each(?1)))
           ORDER BY json_extract(body, '{order_path}'), id
           LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![sources_json, limit_val, offset_val],
            |row| {
              Ok(RawDocument {
                body:     row.get(0)?,
                revision: row.get(1)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_food).collect()
  }

  async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
    let text       = query.text.clone();
    let condition  = search_condition(query.field);
    let limit_val  = query.limit as i64;
    let offset_val = query.offset as i64;

    let (total, raws): (i64, Vec<RawDocument>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!(
            "SELECT COUNT(*) FROM documents WHERE doctype = 'FOOD' AND {condition}"
          ),
          rusqlite::params![text],
          |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT body, revision FROM documents
           WHERE doctype = 'FOOD' AND {condition}
           ORDER BY id
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![text, limit_val, offset_val], |row| {
            Ok(RawDocument {
              body:     row.get(0)?,
              revision: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    Ok(SearchPage {
      total: decode_count(total),
      foods: raws
        .into_iter()
        .map(RawDocument::into_food)
        .collect::<Result<_>>()?,
    })
  }
}
