//! SQLite storage for saved forecasts.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params, types::Type};
use std::{fs, path::Path};

use crate::{
    error::HistoryError,
    model::{ForecastRecord, NewForecast, RecordId},
};

/// Blocking forecast store on a single SQLite connection.
#[derive(Debug)]
pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    /// Open (or create) the database at `path`, creating parent directories and the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HistoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let store = Self { conn: Connection::open(path)? };
        store.init_schema()?;
        Ok(store)
    }

    /// Throwaway store, used by tests and dry runs.
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let store = Self { conn: Connection::open_in_memory()? };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS forecasts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                city_name TEXT NOT NULL,
                temperature_c REAL NOT NULL,
                wind_speed_ms REAL NULL,
                saved_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_forecasts_saved_at ON forecasts(saved_at DESC);
            "#,
        )
    }

    /// Insert a new row and return it with its assigned id.
    ///
    /// Rejects forecasts that could not be read back unchanged; see [`NewForecast::validate`].
    pub fn insert(&self, new: NewForecast) -> Result<ForecastRecord, HistoryError> {
        new.validate()?;
        self.conn.execute(
            "INSERT INTO forecasts (city_name, temperature_c, wind_speed_ms, saved_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![new.city_name, new.temperature_c, new.wind_speed_ms, encode_time(&new.saved_at)],
        )?;

        let id = RecordId(self.conn.last_insert_rowid());
        Ok(new.into_record(id))
    }

    /// All rows, newest `saved_at` first.
    pub fn list_all(&self) -> rusqlite::Result<Vec<ForecastRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, city_name, temperature_c, wind_speed_ms, saved_at
             FROM forecasts
             ORDER BY saved_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], Self::row_to_record)?;
        rows.collect()
    }

    /// Delete a row. Returns `false` if it was already gone.
    pub fn remove(&self, id: RecordId) -> rusqlite::Result<bool> {
        let affected = self.conn.execute("DELETE FROM forecasts WHERE id = ?1", params![id.0])?;
        Ok(affected > 0)
    }

    pub fn count(&self) -> rusqlite::Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM forecasts", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ForecastRecord> {
        let saved_at_str: String = row.get(4)?;
        let saved_at = DateTime::parse_from_rfc3339(&saved_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

        Ok(ForecastRecord {
            id: RecordId(row.get(0)?),
            city_name: row.get(1)?,
            temperature_c: row.get(2)?,
            wind_speed_ms: row.get(3)?,
            saved_at,
        })
    }
}

/// Fixed-width UTC text for years 0000..=9999, so that string order matches time order.
fn encode_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();

        let a = store.insert(NewForecast::new("Rijeka", 11.0, None, at(1))).unwrap();
        let b = store.insert(NewForecast::new("Split", 19.0, Some(5.0), at(2))).unwrap();

        assert!(b.id > a.id);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn list_orders_by_saved_at_not_insertion() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        store.insert(NewForecast::new("Mid", 1.0, None, at(12))).unwrap();
        store.insert(NewForecast::new("Late", 2.0, None, at(23))).unwrap();
        store.insert(NewForecast::new("Early", 3.0, None, at(0))).unwrap();

        let names: Vec<String> = store.list_all().unwrap().into_iter().map(|r| r.city_name).collect();
        assert_eq!(names, ["Late", "Mid", "Early"]);
    }

    #[test]
    fn sub_second_times_survive_storage() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        let t = at(5) + Duration::nanoseconds(123_456_789);

        store.insert(NewForecast::new("Zagreb", 15.5, Some(3.2), t)).unwrap();

        assert_eq!(store.list_all().unwrap()[0].saved_at, t);
    }

    #[test]
    fn legacy_rows_without_wind_read_back_as_none() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        store.insert(NewForecast::new("Rijeka", 9.0, None, at(3))).unwrap();

        assert_eq!(store.list_all().unwrap()[0].wind_speed_ms, None);
    }

    #[test]
    fn remove_reports_whether_row_existed() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        let rec = store.insert(NewForecast::new("Split", 20.0, None, at(4))).unwrap();

        assert!(store.remove(rec.id).unwrap());
        assert!(!store.remove(rec.id).unwrap());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn insert_refuses_rows_it_could_not_read_back() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        store.insert(NewForecast::new("Zagreb", 15.5, None, at(6))).unwrap();

        let bc = Utc.with_ymd_and_hms(-1, 1, 1, 0, 0, 0).unwrap();
        let far = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();
        for new in [
            NewForecast::new("Split", 20.0, None, bc),
            NewForecast::new("Split", 20.0, None, far),
            NewForecast::new("Split", f64::NAN, None, at(7)),
            NewForecast::new("Split", 20.0, Some(f64::NAN), at(7)),
        ] {
            assert!(matches!(store.insert(new), Err(HistoryError::InvalidRecord(_))));
        }

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.list_all().unwrap()[0].city_name, "Zagreb");
    }

    #[test]
    fn encoded_times_sort_lexicographically() {
        let early = encode_time(&at(9));
        let late = encode_time(&(at(9) + Duration::milliseconds(1)));
        assert!(early < late);
        assert_eq!(early.len(), late.len());
    }
}
