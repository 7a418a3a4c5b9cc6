//! Interactive timer session.
//!
//! The controller runs on a tokio task and ticks once per second. Lines typed
//! on stdin become commands; every event the controller emits is printed.

use std::io::{BufRead, Write};

use clap::Subcommand;
use pomocoin_core::format::{format_clock, format_duration_short};
use pomocoin_core::timer::runtime;
use pomocoin_core::{
    completion_message, Config, Database, Event, LogNotifier, Notifier, SessionType, SystemClock,
    TaskRepository, TimerController, TimerHandle, TimerSnapshot,
};
use tokio::sync::mpsc;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the timer interactively (type `help` once it is running)
    Run {
        /// Task to accumulate work time and notes against
        #[arg(long)]
        task: Option<i64>,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Print the timer settings
    Settings,
}

const HELP: &str = "\
commands:
  start            start or resume the countdown
  pause            pause the countdown
  skip             end the current session now
  reset            restart the current session
  note <text>      write a progress note for the active task
  dismiss          continue without writing a note
  task <id>|none   switch the active task
  status           show the current state
  reload           re-read timer settings from the config file
  quit             save and exit (Ctrl-C does the same)";

/// Rings the terminal bell when a session ends.
struct BellNotifier {
    sound: bool,
}

impl Notifier for BellNotifier {
    fn session_completed(&mut self, session: SessionType) {
        let bell = if self.sound { "\x07" } else { "" };
        println!("{bell}{}", completion_message(session));
        LogNotifier.session_completed(session);
    }

    fn vibrate(&mut self) {
        LogNotifier.vibrate();
    }
}

enum Input {
    Start,
    Pause,
    Skip,
    Reset,
    Note(String),
    Dismiss,
    Task(Option<i64>),
    Status,
    Reload,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    match word {
        "start" | "s" => Ok(Input::Start),
        "pause" | "p" => Ok(Input::Pause),
        "skip" => Ok(Input::Skip),
        "reset" => Ok(Input::Reset),
        "note" | "n" => Ok(Input::Note(rest.to_string())),
        "dismiss" | "d" => Ok(Input::Dismiss),
        "task" | "t" => match rest {
            "" | "none" => Ok(Input::Task(None)),
            id => id
                .parse()
                .map(|id| Input::Task(Some(id)))
                .map_err(|_| format!("not a task id: {id}")),
        },
        "status" | "" => Ok(Input::Status),
        "reload" => Ok(Input::Reload),
        "help" | "?" => Ok(Input::Help),
        "quit" | "q" | "exit" => Ok(Input::Quit),
        other => Err(format!("unknown command: {other} (try `help`)")),
    }
}

pub fn run(action: TimerAction) -> CliResult {
    let config = Config::load()?;
    match action {
        TimerAction::Settings => print_json(&config.timer),
        TimerAction::Run { task, json } => {
            let db = Database::open()?;
            if let Some(id) = task {
                if db.get(id)?.is_none() {
                    return Err(format!("task {id} not found").into());
                }
            }
            let notifier = BellNotifier {
                sound: config.timer.sound_enabled,
            };
            let controller = TimerController::new(db, notifier, SystemClock, config.timer);
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            rt.block_on(interactive(controller, task, json))
        }
    }
}

async fn interactive(
    controller: TimerController<Database, BellNotifier, SystemClock>,
    task: Option<i64>,
    json: bool,
) -> CliResult {
    let (handle, mut events, join) = runtime::spawn(controller);
    if task.is_some() {
        handle.set_task(task).await?;
    }
    let mut lines = stdin_lines();
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    if !json {
        println!("{HELP}");
    }
    print_status(&handle.snapshot().await?, json)?;

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { break };
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => dispatch(&handle, input, json).await?,
                    Err(message) => eprintln!("{message}"),
                }
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                print_event(&event, json)?;
            }
            interrupted = &mut interrupt => {
                interrupted?;
                tracing::info!("interrupted, saving session");
                break;
            }
        }
    }

    handle.shutdown().await?;
    drop(handle);
    while let Some(event) = events.recv().await {
        print_event(&event, json)?;
    }
    join.await?;
    Ok(())
}

async fn dispatch(handle: &TimerHandle, input: Input, json: bool) -> CliResult {
    match input {
        Input::Start => handle.start().await?,
        Input::Pause => handle.pause().await?,
        Input::Skip => handle.skip().await?,
        Input::Reset => handle.reset().await?,
        Input::Note(text) => handle.submit_note(text).await?,
        Input::Dismiss => handle.dismiss_note().await?,
        Input::Task(id) => handle.set_task(id).await?,
        Input::Status => print_status(&handle.snapshot().await?, json)?,
        Input::Reload => handle.update_settings(Config::load()?.timer).await?,
        Input::Help => println!("{HELP}"),
        Input::Quit => {}
    }
    Ok(())
}

/// Blocking stdin reads live on their own thread.
fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn print_status(snapshot: &TimerSnapshot, json: bool) -> CliResult {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }
    let task = snapshot
        .current_task_id
        .map(|id| format!("task #{id}"))
        .unwrap_or_else(|| "no task".to_string());
    println!(
        "{} {} [{:?}] pomodoros in cycle: {}, {task}{}",
        snapshot.session_type.label(),
        format_clock(snapshot.seconds_remaining),
        snapshot.timer_state,
        snapshot.completed_work_sessions_in_cycle,
        if snapshot.awaiting_note {
            ", waiting for a note"
        } else {
            ""
        },
    );
    std::io::stdout().flush()?;
    Ok(())
}

fn print_event(event: &Event, json: bool) -> CliResult {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    let line = match event {
        Event::TimerStarted {
            session_type,
            seconds_remaining,
            ..
        } => format!(
            "{} started, {} left",
            session_type.label(),
            format_clock(*seconds_remaining)
        ),
        Event::TimerPaused {
            seconds_remaining, ..
        } => format!("paused at {}", format_clock(*seconds_remaining)),
        Event::TimerSkipped { session_type, .. } => format!("{} skipped", session_type.label()),
        Event::TimerReset {
            session_type,
            seconds_remaining,
            ..
        } => format!(
            "{} reset to {}",
            session_type.label(),
            format_clock(*seconds_remaining)
        ),
        // The notifier already announced it.
        Event::SessionCompleted { .. } => return Ok(()),
        Event::NoteRequested { task_id, .. } => format!(
            "What did you get done on task #{task_id}? Type `note <text>` or `dismiss`."
        ),
        Event::NoteSaved {
            bonus_secs: 0, ..
        } => "note saved".to_string(),
        Event::NoteSaved { bonus_secs, .. } => format!(
            "note saved, next break is {} longer",
            format_duration_short(u64::from(*bonus_secs))
        ),
        Event::SessionChanged {
            to,
            seconds_remaining,
            ..
        } => format!("next up: {} ({})", to.label(), format_clock(*seconds_remaining)),
        Event::RewardGranted { reward, .. } => {
            format!("+{} coins ({})", reward.amount, reward.kind.display_name())
        }
        Event::WorkTimeSaved { seconds, .. } => {
            tracing::debug!(seconds, "work time saved");
            return Ok(());
        }
        Event::TaskChanged {
            task_id: Some(id), ..
        } => format!("active task: #{id}"),
        Event::TaskChanged { task_id: None, .. } => "no active task".to_string(),
        Event::SettingsChanged {
            seconds_remaining, ..
        } => format!("settings updated, {} left", format_clock(*seconds_remaining)),
    };
    println!("{line}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_arguments() {
        assert!(matches!(parse_input("start"), Ok(Input::Start)));
        assert!(matches!(parse_input("  p "), Ok(Input::Pause)));
        assert!(matches!(parse_input("task 12"), Ok(Input::Task(Some(12)))));
        assert!(matches!(parse_input("task none"), Ok(Input::Task(None))));
        assert!(matches!(parse_input(""), Ok(Input::Status)));
        assert!(matches!(parse_input("reload"), Ok(Input::Reload)));
        match parse_input("note  drafted the intro ") {
            Ok(Input::Note(text)) => assert_eq!(text, "drafted the intro"),
            _ => panic!("expected a note"),
        }
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_input("dance").is_err());
        assert!(parse_input("task abc").is_err());
    }
}
