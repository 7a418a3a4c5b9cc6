//! Ownership storage for the music shop, room decorations and imported tracks.
//!
//! Every purchase debits the wallet and records ownership inside one
//! transaction; a failed step leaves both untouched.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use super::Database;
use crate::catalog::{self, MusicTrack, RoomItem, RoomType};
use crate::error::{Result, ValidationError};
use crate::repository::WalletRepository;
use crate::stats::RoomsSummary;
use crate::timer::SessionType;

/// Most user files that may be imported at once.
pub const MAX_IMPORTED_MUSIC: u32 = 15;
/// Coins needed to unlock one imported file.
pub const IMPORT_MUSIC_PRICE: u32 = 150;

const IMPORT_DIR: &str = "imported_music";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "item", rename_all = "snake_case")]
pub enum PurchaseOutcome<T> {
    Success(T),
    InsufficientCoins,
    AlreadyOwned,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "music", rename_all = "snake_case")]
pub enum ImportOutcome {
    Success(ImportedMusic),
    LimitReached,
}

/// A user-supplied audio file copied into the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedMusic {
    pub id: i64,
    pub display_name: String,
    pub original_file_name: String,
    pub internal_path: PathBuf,
    pub session_type: SessionType,
    pub is_purchased: bool,
    /// Not probed; always 0.
    pub duration_secs: u32,
}

/// How far one room's decoration has progressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomProgress {
    pub room: RoomType,
    pub purchased_count: u32,
    pub total_count: u32,
    pub percentage: u32,
}

impl RoomProgress {
    pub fn is_complete(&self) -> bool {
        self.total_count > 0 && self.purchased_count == self.total_count
    }
}

fn row_to_imported(row: &Row) -> Result<ImportedMusic, rusqlite::Error> {
    let session: String = row.get(4)?;
    Ok(ImportedMusic {
        id: row.get(0)?,
        display_name: row.get(1)?,
        original_file_name: row.get(2)?,
        internal_path: PathBuf::from(row.get::<_, String>(3)?),
        session_type: SessionType::parse(&session).unwrap_or(SessionType::Work),
        is_purchased: row.get(5)?,
        duration_secs: row.get(6)?,
    })
}

const IMPORTED_COLUMNS: &str =
    "id, display_name, original_file_name, internal_path, session_type, is_purchased, duration_secs";

impl Database {
    // === Music shop ===

    /// Ids of owned catalog tracks. Free tracks are always included.
    pub fn unlocked_track_ids(&self) -> Result<Vec<u32>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT track_id FROM unlocked_music ORDER BY track_id")?;
        let mut ids = stmt
            .query_map([], |row| row.get::<_, u32>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        ids.extend(catalog::all_tracks().filter(|t| t.is_free()).map(|t| t.id));
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    pub fn is_track_unlocked(&self, track_id: u32) -> Result<bool> {
        Ok(self.unlocked_track_ids()?.contains(&track_id))
    }

    /// Owned tracks for one session type, in shop order.
    pub fn unlocked_tracks_by_type(&self, session: SessionType) -> Result<Vec<&'static MusicTrack>> {
        let owned = self.unlocked_track_ids()?;
        Ok(catalog::tracks_by_type(session)
            .iter()
            .filter(|t| owned.contains(&t.id))
            .collect())
    }

    pub fn purchase_track(&self, track_id: u32) -> Result<PurchaseOutcome<&'static MusicTrack>> {
        let Some(track) = catalog::track_by_id(track_id) else {
            return Ok(PurchaseOutcome::NotFound);
        };
        if self.is_track_unlocked(track_id)? {
            return Ok(PurchaseOutcome::AlreadyOwned);
        }
        let tx = self.conn().unchecked_transaction()?;
        if !self.debit(track.price)? {
            return Ok(PurchaseOutcome::InsufficientCoins);
        }
        tx.execute(
            "INSERT INTO unlocked_music (track_id) VALUES (?1)",
            params![track.id],
        )?;
        tx.commit()?;
        tracing::info!(track = track.name, price = track.price, "track purchased");
        Ok(PurchaseOutcome::Success(track))
    }

    // === Rooms ===

    pub fn purchased_item_ids(&self) -> Result<Vec<u32>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT item_id FROM purchased_room_items ORDER BY item_id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, u32>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    pub fn purchase_item(&self, item_id: u32) -> Result<PurchaseOutcome<&'static RoomItem>> {
        let Some(item) = catalog::item_by_id(item_id) else {
            return Ok(PurchaseOutcome::NotFound);
        };
        if self.purchased_item_ids()?.contains(&item_id) {
            return Ok(PurchaseOutcome::AlreadyOwned);
        }
        let tx = self.conn().unchecked_transaction()?;
        if !self.debit(item.price)? {
            return Ok(PurchaseOutcome::InsufficientCoins);
        }
        tx.execute(
            "INSERT INTO purchased_room_items (item_id) VALUES (?1)",
            params![item.id],
        )?;
        tx.commit()?;
        tracing::info!(item = item.name, room = item.room.label(), "room item purchased");
        Ok(PurchaseOutcome::Success(item))
    }

    pub fn room_progress(&self, room: RoomType) -> Result<RoomProgress> {
        let owned = self.purchased_item_ids()?;
        let items = catalog::items_by_room(room);
        let total_count = items.len() as u32;
        let purchased_count = items.iter().filter(|i| owned.contains(&i.id)).count() as u32;
        Ok(RoomProgress {
            room,
            purchased_count,
            total_count,
            percentage: if total_count > 0 {
                purchased_count * 100 / total_count
            } else {
                0
            },
        })
    }

    pub fn rooms_summary(&self) -> Result<RoomsSummary> {
        let mut summary = RoomsSummary::default();
        for room in RoomType::ALL {
            let progress = self.room_progress(room)?;
            summary.total_rooms += 1;
            summary.completed_rooms += u32::from(progress.is_complete());
            summary.purchased_items += progress.purchased_count;
            summary.total_items += progress.total_count;
        }
        if summary.total_items > 0 {
            summary.total_percentage = summary.purchased_items * 100 / summary.total_items;
        }
        Ok(summary)
    }

    // === Imported music ===

    /// Imported files, optionally restricted to one session type.
    pub fn imported_music(&self, session: Option<SessionType>) -> Result<Vec<ImportedMusic>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {IMPORTED_COLUMNS} FROM imported_music
             WHERE ?1 IS NULL OR session_type = ?1 ORDER BY id"
        ))?;
        let music = stmt
            .query_map(params![session.map(SessionType::as_str)], row_to_imported)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(music)
    }

    pub fn imported_by_id(&self, id: i64) -> Result<Option<ImportedMusic>> {
        let music = self
            .conn()
            .query_row(
                &format!("SELECT {IMPORTED_COLUMNS} FROM imported_music WHERE id = ?1"),
                params![id],
                row_to_imported,
            )
            .optional()?;
        Ok(music)
    }

    pub fn imported_count(&self) -> Result<u32> {
        Ok(self
            .conn()
            .query_row("SELECT COUNT(*) FROM imported_music", [], |row| row.get(0))?)
    }

    /// Copy `source` under `data_dir/imported_music/` and register it locked.
    ///
    /// A blank `display_name` falls back to the source file stem.
    pub fn import_music(
        &self,
        source: &Path,
        display_name: &str,
        session: SessionType,
        data_dir: &Path,
    ) -> Result<ImportOutcome> {
        if self.imported_count()? >= MAX_IMPORTED_MUSIC {
            return Ok(ImportOutcome::LimitReached);
        }
        let original_file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "source".into(),
                message: format!("{} is not a file path", source.display()),
            })?;
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "mp3".to_string());
        let display_name = match display_name.trim() {
            "" => source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| original_file_name.clone()),
            name => name.to_string(),
        };

        let dir = data_dir.join(IMPORT_DIR);
        std::fs::create_dir_all(&dir)?;
        let dest = unique_import_path(&dir, &extension);
        std::fs::copy(source, &dest)?;

        let inserted = self.conn().execute(
            "INSERT INTO imported_music
                 (display_name, original_file_name, internal_path, session_type, is_purchased, duration_secs)
             VALUES (?1, ?2, ?3, ?4, 0, 0)",
            params![
                display_name,
                original_file_name,
                dest.to_string_lossy(),
                session.as_str(),
            ],
        );
        if let Err(e) = inserted {
            let _ = std::fs::remove_file(&dest);
            return Err(e.into());
        }

        let music = ImportedMusic {
            id: self.conn().last_insert_rowid(),
            display_name,
            original_file_name,
            internal_path: dest,
            session_type: session,
            is_purchased: false,
            duration_secs: 0,
        };
        tracing::info!(id = music.id, name = %music.display_name, "music imported");
        Ok(ImportOutcome::Success(music))
    }

    pub fn purchase_imported(&self, id: i64) -> Result<PurchaseOutcome<ImportedMusic>> {
        let Some(mut music) = self.imported_by_id(id)? else {
            return Ok(PurchaseOutcome::NotFound);
        };
        if music.is_purchased {
            return Ok(PurchaseOutcome::AlreadyOwned);
        }
        let tx = self.conn().unchecked_transaction()?;
        if !self.debit(IMPORT_MUSIC_PRICE)? {
            return Ok(PurchaseOutcome::InsufficientCoins);
        }
        tx.execute(
            "UPDATE imported_music SET is_purchased = 1 WHERE id = ?1",
            params![id],
        )?;
        tx.commit()?;
        music.is_purchased = true;
        Ok(PurchaseOutcome::Success(music))
    }

    /// Remove an import and its file. Coins spent on it are not refunded.
    pub fn delete_imported(&self, id: i64) -> Result<bool> {
        let Some(music) = self.imported_by_id(id)? else {
            return Ok(false);
        };
        self.conn()
            .execute("DELETE FROM imported_music WHERE id = ?1", params![id])?;
        if let Err(e) = std::fs::remove_file(&music.internal_path) {
            tracing::warn!(path = %music.internal_path.display(), "could not remove imported file: {e}");
        }
        Ok(true)
    }

    /// Owned catalog tracks plus purchased imports.
    pub fn music_unlocked_count(&self) -> Result<u32> {
        let purchased_imports: u32 = self.conn().query_row(
            "SELECT COUNT(*) FROM imported_music WHERE is_purchased = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(self.unlocked_track_ids()?.len() as u32 + purchased_imports)
    }
}

fn unique_import_path(dir: &Path, extension: &str) -> PathBuf {
    let stamp = Utc::now().timestamp_millis();
    let mut candidate = dir.join(format!("imported_{stamp}.{extension}"));
    let mut n = 1;
    while candidate.exists() {
        candidate = dir.join(format!("imported_{stamp}_{n}.{extension}"));
        n += 1;
    }
    candidate
}
