use pomocoin_core::{Database, WalletRepository};

use super::{print_json, CliResult};

pub fn run(json: bool) -> CliResult {
    let db = Database::open()?;
    let wallet = db.read()?.unwrap_or_default();
    if json {
        return print_json(&wallet);
    }
    println!("coins:     {}", wallet.coins);
    println!("pomodoros: {}", wallet.total_pomodoros);
    println!("tasks:     {}", wallet.total_tasks_completed);
    println!("notes:     {}", wallet.total_notes_written);
    Ok(())
}
