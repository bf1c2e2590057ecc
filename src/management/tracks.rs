use std::path::Path;

use rusqlite::{Connection, ErrorCode, params};

use crate::{
    error::PersistError,
    types::{PersistReport, TrackRecord},
};

const CREATE_SONG_TABLE: &str = "CREATE TABLE IF NOT EXISTS Song (
    songId TEXT PRIMARY KEY NOT NULL,
    songTitle TEXT NOT NULL,
    artistId INTEGER NOT NULL,
    genreId INTEGER NOT NULL
)";

/// Where fetched tracks end up.
pub trait TrackSink {
    fn insert(&self, record: &TrackRecord) -> Result<(), PersistError>;
}

/// Inserts every record, one at a time.
///
/// A failing insert is logged and recorded in the report, and the remaining
/// records are still attempted.
pub fn persist_all(records: &[TrackRecord], sink: &dyn TrackSink) -> PersistReport {
    let mut report = PersistReport::default();

    for record in records {
        match sink.insert(record) {
            Ok(()) => report.inserted += 1,
            Err(e) => {
                tracing::warn!(id = %record.external_id, title = %record.title, error = %e, "failed to insert track");
                report
                    .failures
                    .push(format!("{} ({}): {}", record.title, record.external_id, e));
            }
        }
    }

    report
}

/// `Song` table in a SQLite database.
pub struct SqliteTrackStore {
    conn: Connection,
}

impl SqliteTrackStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub fn open(path: &Path) -> Result<Self, PersistError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened track database");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, PersistError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, PersistError> {
        conn.execute(CREATE_SONG_TABLE, [])?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<usize, PersistError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Song", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn list(&self) -> Result<Vec<TrackRecord>, PersistError> {
        let mut stmt = self
            .conn
            .prepare("SELECT songId, songTitle, artistId, genreId FROM Song ORDER BY songTitle")?;
        let rows = stmt.query_map([], |row| {
            Ok(TrackRecord {
                external_id: row.get(0)?,
                title: row.get(1)?,
                artist_ref: row.get(2)?,
                genre_ref: row.get(3)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl TrackSink for SqliteTrackStore {
    fn insert(&self, record: &TrackRecord) -> Result<(), PersistError> {
        let result = self.conn.execute(
            "INSERT INTO Song (songId, songTitle, artistId, genreId) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.external_id,
                record.title,
                record.artist_ref,
                record.genre_ref
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(PersistError::Duplicate(record.external_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
