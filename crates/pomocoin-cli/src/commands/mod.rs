pub mod achievements;
pub mod config;
pub mod music;
pub mod rooms;
pub mod stats;
pub mod task;
pub mod timer;
pub mod wallet;

use std::error::Error;

pub type CliResult = Result<(), Box<dyn Error>>;

/// Print `value` as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
