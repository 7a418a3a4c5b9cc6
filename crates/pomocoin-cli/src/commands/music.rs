use std::path::PathBuf;

use clap::Subcommand;
use pomocoin_core::catalog::{all_tracks, track_by_id, tracks_by_type};
use pomocoin_core::storage::{data_dir, IMPORT_MUSIC_PRICE, MAX_IMPORTED_MUSIC};
use pomocoin_core::{Config, Database, ImportOutcome, PurchaseOutcome, SessionType};

use super::{print_json, CliResult};

fn parse_session(s: &str) -> Result<SessionType, String> {
    SessionType::parse(s).ok_or_else(|| format!("expected work, short_break or long_break, got {s}"))
}

#[derive(Subcommand)]
pub enum MusicAction {
    /// List built-in tracks with their lock state
    List {
        /// Only tracks for this session type
        #[arg(long, value_parser = parse_session)]
        session: Option<SessionType>,
        #[arg(long)]
        json: bool,
    },
    /// Buy a built-in track
    Buy {
        /// Track ID
        id: u32,
    },
    /// Play an unlocked track during its session type
    Select {
        /// Track ID
        id: u32,
    },
    /// Copy an audio file into the library (locked until bought)
    Import {
        /// Audio file to copy
        path: PathBuf,
        /// Display name (defaults to the file name)
        #[arg(long, default_value = "")]
        name: String,
        /// Session type the track is meant for
        #[arg(long, value_parser = parse_session, default_value = "work")]
        session: SessionType,
    },
    /// List imported tracks
    Imported {
        #[arg(long, value_parser = parse_session)]
        session: Option<SessionType>,
        #[arg(long)]
        json: bool,
    },
    /// Unlock an imported track
    BuyImport {
        /// Imported track ID
        id: i64,
    },
    /// Remove an imported track and its file
    DeleteImport {
        /// Imported track ID
        id: i64,
    },
}

pub fn run(action: MusicAction) -> CliResult {
    let db = Database::open()?;

    match action {
        MusicAction::List { session, json } => {
            let tracks: Vec<_> = match session {
                Some(session) => tracks_by_type(session).iter().collect(),
                None => all_tracks().collect(),
            };
            let unlocked = db.unlocked_track_ids()?;
            let selected = Config::load()?.music;
            if json {
                let rows: Vec<_> = tracks
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "track": t,
                            "unlocked": unlocked.contains(&t.id),
                            "selected": selected.track_for(t.session_type) == t.id,
                        })
                    })
                    .collect();
                return print_json(&rows);
            }
            for track in tracks {
                let state = if selected.track_for(track.session_type) == track.id {
                    "playing".to_string()
                } else if unlocked.contains(&track.id) {
                    "owned".to_string()
                } else {
                    format!("{} coins", track.price)
                };
                println!(
                    "#{:<3} {} {:<24} {:<12} {:>10}  {}",
                    track.id,
                    track.emoji,
                    track.name,
                    track.session_type.label(),
                    state,
                    track.description
                );
            }
        }
        MusicAction::Buy { id } => match db.purchase_track(id)? {
            PurchaseOutcome::Success(track) => println!("Unlocked {} {}", track.emoji, track.name),
            PurchaseOutcome::AlreadyOwned => println!("Track {id} is already unlocked"),
            PurchaseOutcome::InsufficientCoins => {
                return Err("not enough coins".into());
            }
            PurchaseOutcome::NotFound => return Err(format!("track {id} not found").into()),
        },
        MusicAction::Select { id } => {
            let track = track_by_id(id).ok_or_else(|| format!("track {id} not found"))?;
            if !db.is_track_unlocked(id)? {
                return Err(format!("track {id} is locked; buy it first").into());
            }
            let mut config = Config::load()?;
            config.music.select(track.session_type, id);
            config.save()?;
            println!("{} now plays {}", track.session_type.label(), track.name);
        }
        MusicAction::Import {
            path,
            name,
            session,
        } => match db.import_music(&path, &name, session, &data_dir()?)? {
            ImportOutcome::Success(music) => println!(
                "Imported #{} {} ({IMPORT_MUSIC_PRICE} coins to unlock)",
                music.id, music.display_name
            ),
            ImportOutcome::LimitReached => {
                return Err(format!("library full ({MAX_IMPORTED_MUSIC} imported tracks)").into());
            }
        },
        MusicAction::Imported { session, json } => {
            let music = db.imported_music(session)?;
            if json {
                return print_json(&music);
            }
            println!("{}/{MAX_IMPORTED_MUSIC} slots used", db.imported_count()?);
            for m in &music {
                let state = if m.is_purchased {
                    "owned".to_string()
                } else {
                    format!("{IMPORT_MUSIC_PRICE} coins")
                };
                println!(
                    "#{:<3} {:<24} {:<12} {:>10}  {}",
                    m.id,
                    m.display_name,
                    m.session_type.label(),
                    state,
                    m.original_file_name
                );
            }
        }
        MusicAction::BuyImport { id } => match db.purchase_imported(id)? {
            PurchaseOutcome::Success(music) => println!("Unlocked {}", music.display_name),
            PurchaseOutcome::AlreadyOwned => println!("Imported track {id} is already unlocked"),
            PurchaseOutcome::InsufficientCoins => return Err("not enough coins".into()),
            PurchaseOutcome::NotFound => {
                return Err(format!("imported track {id} not found").into())
            }
        },
        MusicAction::DeleteImport { id } => {
            if !db.delete_imported(id)? {
                return Err(format!("imported track {id} not found").into());
            }
            println!("Deleted imported track {id}");
        }
    }
    Ok(())
}
