use chrono::Utc;
use pomocoin_core::Database;

use super::{print_json, CliResult};

pub fn run(json: bool) -> CliResult {
    let db = Database::open()?;
    let statuses = db.achievement_progress(Utc::now().date_naive())?.evaluate();
    if json {
        return print_json(&statuses);
    }

    let unlocked = statuses.iter().filter(|s| s.unlocked).count();
    println!("{unlocked}/{} unlocked", statuses.len());
    for status in &statuses {
        let a = &status.achievement;
        let mark = if status.unlocked { a.emoji } else { "  " };
        println!(
            "{mark} {:<22} {:>4}/{:<4} {} ({})",
            a.title,
            status.current,
            a.requirement,
            a.description,
            a.category.label()
        );
    }
    Ok(())
}
