use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use sentix_models::{AssetType, BulkAddResult, WatchlistEntry, WatchlistSymbol};

use crate::error::StoreError;
use crate::sqlite::{conversion_error, SentimentStore};

fn map_symbol(row: &Row<'_>) -> rusqlite::Result<WatchlistSymbol> {
    let asset_type: Option<String> = row.get(2)?;
    let asset_type = asset_type
        .map(|s| s.parse::<AssetType>())
        .transpose()
        .map_err(|e| conversion_error(2, e))?;
    Ok(WatchlistSymbol {
        id: row.get(0)?,
        symbol: row.get(1)?,
        asset_type,
        created_at: row.get(3)?,
    })
}

impl SentimentStore {
    /// Add a symbol to the watchlist. Returns `None` if it is already tracked.
    pub fn add_symbol(&self, entry: &WatchlistEntry) -> Result<Option<WatchlistSymbol>, StoreError> {
        let conn = self.conn()?;
        insert_symbol(&conn, entry)
    }

    /// Add many symbols in one transaction. Duplicates and blank symbols are
    /// reported as skipped rather than failing the batch.
    pub fn add_symbols(&self, entries: &[WatchlistEntry]) -> Result<BulkAddResult, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut result = BulkAddResult::default();
        for entry in entries {
            let symbol = entry.normalized_symbol();
            if symbol.is_empty() {
                continue;
            }
            match insert_symbol(&tx, entry)? {
                Some(added) => result.added.push(added),
                None => result.skipped.push(symbol),
            }
        }
        tx.commit()?;
        Ok(result)
    }

    /// Remove a symbol from the watchlist. Stored articles are left untouched.
    pub fn remove_symbol(&self, symbol: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM watchlist_symbols WHERE symbol = ?1",
            params![symbol.trim().to_uppercase()],
        )?;
        Ok(deleted > 0)
    }

    pub fn list_watchlist(&self) -> Result<Vec<WatchlistSymbol>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, symbol, asset_type, created_at FROM watchlist_symbols ORDER BY symbol",
        )?;
        let rows = stmt
            .query_map([], map_symbol)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn watchlist_symbol(&self, symbol: &str) -> Result<Option<WatchlistSymbol>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, symbol, asset_type, created_at FROM watchlist_symbols WHERE symbol = ?1",
        )?;
        Ok(stmt.query_row(params![symbol], map_symbol).optional()?)
    }

    /// Asset type recorded for a symbol, if it is on the watchlist and has one.
    pub fn asset_type_for(&self, symbol: &str) -> Result<Option<AssetType>, StoreError> {
        Ok(self
            .watchlist_symbol(symbol)?
            .and_then(|entry| entry.asset_type))
    }
}

fn insert_symbol(
    conn: &rusqlite::Connection,
    entry: &WatchlistEntry,
) -> Result<Option<WatchlistSymbol>, StoreError> {
    let now = Utc::now();
    let symbol = entry.normalized_symbol();
    if symbol.is_empty() {
        return Err(StoreError::InvalidData("symbol is required".to_string()));
    }
    let inserted = conn.execute(
        "INSERT INTO watchlist_symbols (symbol, asset_type, created_at) \
         VALUES (?1, ?2, ?3) ON CONFLICT(symbol) DO NOTHING",
        params![symbol, entry.asset_type.map(|t| t.as_str()), now],
    )?;
    if inserted == 0 {
        return Ok(None);
    }
    Ok(Some(WatchlistSymbol {
        id: conn.last_insert_rowid(),
        symbol,
        asset_type: entry.asset_type,
        created_at: now,
    }))
}
