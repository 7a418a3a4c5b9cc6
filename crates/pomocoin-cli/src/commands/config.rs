//! Settings stored in `config.toml` next to the database.
//!
//! Keys are dotted `section.field` paths. A running `timer run` session
//! picks up timer changes after `reload`.

use clap::Subcommand;
use pomocoin_core::Config;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dotted key such as `timer.short_break_minutes` or `music.work_track`
        key: String,
    },
    /// Change one setting; the value is parsed as the key's type
    Set {
        /// Dotted key
        key: String,
        /// Minutes, a track id, or `true`/`false`
        value: String,
    },
    /// Print every setting, sorted by key
    List {
        /// Print the whole file as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print where the settings file lives
    Path,
    /// Restore default durations and the free starter tracks
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List { json } => {
            let config = Config::load()?;
            if json {
                return print_json(&config);
            }
            for (key, value) in config.entries() {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Path => println!("{}", Config::path()?.display()),
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("timer durations and music selection restored to defaults");
        }
    }
    Ok(())
}
