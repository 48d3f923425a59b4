//! Diary entry repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the persistence contract the write session drives.
//! - Persist entries, ordered entry photos, and per-date cover photos.
//!
//! # Invariants
//! - Photos of one entry are returned in `position ASC` order.
//! - `replace_photos` and `add_for_date` are atomic: all rows or none.
//! - Dates are stored as ISO `YYYY-MM-DD` text.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::entry::{DateCover, DiaryEntry, EntryId, EntryPhoto};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    entry_date,
    title,
    content,
    created_at,
    updated_at
FROM entries";

pub type RepoResult<T> = Result<T, RepoError>;

/// Recoverable persistence error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(EntryId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    /// Failure reported by a non-SQLite backend.
    Backend(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "entry not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted entry data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "diary schema is missing table `{table}`")
            }
            Self::Backend(message) => write!(f, "entry backend failure: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for diary entries and calendar covers.
pub trait EntryRepository {
    fn get_by_id(&self, id: EntryId) -> RepoResult<Option<DiaryEntry>>;
    /// Photos of one entry, in display order.
    fn get_photos(&self, id: EntryId) -> RepoResult<Vec<EntryPhoto>>;
    /// Creates an entry with photos and returns its new id.
    fn add_for_date(
        &self,
        date: NaiveDate,
        title: &str,
        content: &str,
        photo_uris: &[String],
    ) -> RepoResult<EntryId>;
    /// Replaces title/content. Returns `false` when no such entry exists.
    fn update(&self, id: EntryId, title: &str, content: &str) -> RepoResult<bool>;
    /// Replaces the full ordered photo list of one entry.
    fn replace_photos(&self, id: EntryId, photo_uris: &[String]) -> RepoResult<()>;
    /// Deletes an entry with its photos. Missing entries are ignored.
    fn delete(&self, id: EntryId) -> RepoResult<()>;
    /// Entries of one date in creation order.
    fn list_for_date(&self, date: NaiveDate) -> RepoResult<Vec<DiaryEntry>>;
    /// Sets (`Some`) or clears (`None`) the cover photo of a date.
    fn set_date_cover(&self, date: NaiveDate, uri: Option<&str>) -> RepoResult<()>;
    fn date_cover(&self, date: NaiveDate) -> RepoResult<Option<String>>;
    /// Covers within `from..=to`, ordered by date.
    fn list_date_covers(&self, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<DateCover>>;
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_entry_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn get_by_id(&self, id: EntryId) -> RepoResult<Option<DiaryEntry>> {
        let sql = format!("{ENTRY_SELECT_SQL} WHERE id = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_entry_row(row)?)),
            None => Ok(None),
        }
    }

    fn get_photos(&self, id: EntryId) -> RepoResult<Vec<EntryPhoto>> {
        let mut stmt = self.conn.prepare(
            "SELECT uri, position
             FROM entry_photos
             WHERE entry_id = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut photos = Vec::new();
        while let Some(row) = rows.next()? {
            photos.push(EntryPhoto {
                entry_id: id,
                uri: row.get("uri")?,
                position: row.get("position")?,
            });
        }
        Ok(photos)
    }

    fn add_for_date(
        &self,
        date: NaiveDate,
        title: &str,
        content: &str,
        photo_uris: &[String],
    ) -> RepoResult<EntryId> {
        let id = Uuid::new_v4();
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO entries (id, entry_date, title, content) VALUES (?1, ?2, ?3, ?4);",
            params![id_text, format_date(date), title, content],
        )?;
        insert_photos(&tx, id_text.as_str(), photo_uris)?;
        tx.commit()?;
        Ok(id)
    }

    fn update(&self, id: EntryId, title: &str, content: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE entries
             SET
                title = ?2,
                content = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), title, content],
        )?;
        Ok(changed > 0)
    }

    fn replace_photos(&self, id: EntryId, photo_uris: &[String]) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        if !entry_exists_in_tx(&tx, id_text.as_str())? {
            return Err(RepoError::NotFound(id));
        }

        tx.execute(
            "DELETE FROM entry_photos WHERE entry_id = ?1;",
            [id_text.as_str()],
        )?;
        insert_photos(&tx, id_text.as_str(), photo_uris)?;
        tx.execute(
            "UPDATE entries SET updated_at = (strftime('%s', 'now') * 1000) WHERE id = ?1;",
            [id_text.as_str()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, id: EntryId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM entries WHERE id = ?1;", [id.to_string()])?;
        Ok(())
    }

    fn list_for_date(&self, date: NaiveDate) -> RepoResult<Vec<DiaryEntry>> {
        let sql = format!(
            "{ENTRY_SELECT_SQL} WHERE entry_date = ?1 ORDER BY created_at ASC, rowid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([format_date(date)])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn set_date_cover(&self, date: NaiveDate, uri: Option<&str>) -> RepoResult<()> {
        match uri {
            Some(uri) => {
                self.conn.execute(
                    "INSERT INTO date_covers (cover_date, uri) VALUES (?1, ?2)
                     ON CONFLICT (cover_date) DO UPDATE SET
                        uri = excluded.uri,
                        updated_at = (strftime('%s', 'now') * 1000);",
                    params![format_date(date), uri],
                )?;
            }
            None => {
                self.conn.execute(
                    "DELETE FROM date_covers WHERE cover_date = ?1;",
                    [format_date(date)],
                )?;
            }
        }
        Ok(())
    }

    fn date_cover(&self, date: NaiveDate) -> RepoResult<Option<String>> {
        let uri = self
            .conn
            .query_row(
                "SELECT uri FROM date_covers WHERE cover_date = ?1;",
                [format_date(date)],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(uri)
    }

    fn list_date_covers(&self, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<DateCover>> {
        if from > to {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            "SELECT cover_date, uri
             FROM date_covers
             WHERE cover_date BETWEEN ?1 AND ?2
             ORDER BY cover_date ASC;",
        )?;
        let mut rows = stmt.query([format_date(from), format_date(to)])?;
        let mut covers = Vec::new();
        while let Some(row) = rows.next()? {
            let date_text: String = row.get("cover_date")?;
            covers.push(DateCover {
                date: parse_date(&date_text, "date_covers.cover_date")?,
                uri: row.get("uri")?,
            });
        }
        Ok(covers)
    }
}

fn insert_photos(tx: &Transaction<'_>, entry_id: &str, photo_uris: &[String]) -> RepoResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO entry_photos (entry_id, position, uri) VALUES (?1, ?2, ?3);",
    )?;
    for (position, uri) in photo_uris.iter().enumerate() {
        let position = u32::try_from(position)
            .map_err(|_| RepoError::InvalidData(format!("photo position {position} overflows")))?;
        stmt.execute(params![entry_id, position, uri])?;
    }
    Ok(())
}

fn entry_exists_in_tx(tx: &Transaction<'_>, entry_id: &str) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM entries WHERE id = ?1);",
        [entry_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<DiaryEntry> {
    let id_text: String = row.get("id")?;
    let date_text: String = row.get("entry_date")?;
    Ok(DiaryEntry {
        id: Uuid::parse_str(&id_text).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{id_text}` in entries.id"))
        })?,
        date: parse_date(&date_text, "entries.entry_date")?,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date value `{value}` in {column}")))
}

fn ensure_entry_connection_ready(conn: &Connection) -> RepoResult<()> {
    let version = current_user_version(conn)?;
    let latest = latest_version();
    if version > latest {
        return Err(RepoError::Db(DbError::UnsupportedSchemaVersion {
            db_version: version,
            latest_supported: latest,
        }));
    }

    for table in ["entries", "entry_photos", "date_covers"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{format_date, parse_date, RepoError};
    use chrono::NaiveDate;

    #[test]
    fn dates_use_iso_text() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).expect("valid date");
        assert_eq!(format_date(date), "2026-01-02");
        assert_eq!(parse_date("2026-01-02", "t.c").expect("parse"), date);
    }

    #[test]
    fn invalid_stored_date_is_reported_with_column() {
        let err = parse_date("02/01/2026", "entries.entry_date").expect_err("must reject");
        assert!(
            matches!(err, RepoError::InvalidData(ref message) if message.contains("entries.entry_date"))
        );
    }
}
