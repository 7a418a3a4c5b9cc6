use chrono::Utc;
use clap::Subcommand;
use pomocoin_core::format::format_work_time;
use pomocoin_core::stats::{best_day, current_streak, weekly_comparison, DailyStats};
use pomocoin_core::storage::Database;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today {
        #[arg(long)]
        json: bool,
    },
    /// The last seven days compared
    Week {
        #[arg(long)]
        json: bool,
    },
    /// Day-by-day history, newest first
    History {
        /// Number of days to show
        #[arg(long, default_value = "30")]
        days: u32,
        #[arg(long)]
        json: bool,
    },
    /// All-time stats
    All {
        #[arg(long)]
        json: bool,
    },
}

fn print_day(day: &DailyStats) {
    println!(
        "{}  {:>3} pomodoros  {:>3} tasks  {:>3} notes  {}",
        day.date,
        day.pomodoros_completed,
        day.tasks_completed,
        day.notes_written,
        format_work_time(u64::from(day.time_worked_secs))
    );
}

pub fn run(action: StatsAction) -> CliResult {
    let db = Database::open()?;
    let today = Utc::now().date_naive();

    match action {
        StatsAction::Today { json } => {
            let stats = db.stats_for(today)?;
            if json {
                return print_json(&stats);
            }
            print_day(&stats);
        }
        StatsAction::Week { json } => {
            let days = db.recent_days(7)?;
            let Some(week) = weekly_comparison(&days) else {
                println!("no sessions recorded yet");
                return Ok(());
            };
            if json {
                return print_json(&week);
            }
            println!("pomodoros:   {}", week.this_week_pomodoros);
            println!("tasks:       {}", week.this_week_tasks);
            println!("time worked: {}", format_work_time(week.this_week_time_secs));
            println!("daily avg:   {} pomodoros", week.avg_pomodoros_per_day);
        }
        StatsAction::History { days, json } => {
            let rows = db.recent_days(days)?;
            if json {
                return print_json(&rows);
            }
            for row in &rows {
                print_day(row);
            }
        }
        StatsAction::All { json } => {
            let totals = db.totals()?;
            let streak = current_streak(&db.active_days()?, today);
            let week = db.recent_days(7)?;
            let best = best_day(&week);
            if json {
                return print_json(&serde_json::json!({
                    "totals": totals,
                    "current_streak": streak,
                    "best_day": best,
                }));
            }
            println!("pomodoros:   {}", totals.total_pomodoros);
            println!("tasks:       {}", totals.total_tasks);
            println!("notes:       {}", totals.total_notes);
            println!("time worked: {}", format_work_time(totals.total_time_worked_secs));
            println!("streak:      {streak} days");
            if let Some(best) = best {
                println!(
                    "best day:    {} ({} pomodoros, last 7 days)",
                    best.date, best.pomodoros_completed
                );
            }
        }
    }
    Ok(())
}
