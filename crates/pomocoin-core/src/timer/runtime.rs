//! Async driver for [`TimerController`].
//!
//! One tokio task owns the controller. Commands arrive over an mpsc channel
//! and are applied strictly in arrival order; a one-second `Interval` exists
//! only while the timer is running. Events are forwarded on an unbounded
//! channel. Dropping every [`TimerHandle`] or sending `Shutdown` disposes the
//! controller before the task returns it.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval};

use super::clock::Clock;
use super::controller::TimerController;
use super::session::{TimerSettings, TimerSnapshot, TimerState};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::notify::Notifier;
use crate::repository::{StatsRepository, TaskRepository, WalletRepository};

const TICK: Duration = Duration::from_secs(1);
const COMMAND_BUFFER: usize = 32;

#[derive(Debug)]
pub enum Command {
    Start,
    Pause,
    Skip,
    Reset,
    SubmitNote(String),
    DismissNote,
    SetTask(Option<i64>),
    UpdateSettings(TimerSettings),
    Snapshot(oneshot::Sender<TimerSnapshot>),
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable sender side of a running timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<Command>,
}

fn stopped() -> CoreError {
    CoreError::Custom("timer is no longer running".into())
}

impl TimerHandle {
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).await.map_err(|_| stopped())
    }

    pub async fn start(&self) -> Result<()> {
        self.send(Command::Start).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(Command::Pause).await
    }

    pub async fn skip(&self) -> Result<()> {
        self.send(Command::Skip).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.send(Command::Reset).await
    }

    pub async fn submit_note(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::SubmitNote(text.into())).await
    }

    pub async fn dismiss_note(&self) -> Result<()> {
        self.send(Command::DismissNote).await
    }

    pub async fn set_task(&self, task_id: Option<i64>) -> Result<()> {
        self.send(Command::SetTask(task_id)).await
    }

    pub async fn update_settings(&self, settings: TimerSettings) -> Result<()> {
        self.send(Command::UpdateSettings(settings)).await
    }

    pub async fn snapshot(&self) -> Result<TimerSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx)).await?;
        rx.await.map_err(|_| stopped())
    }

    /// Dispose the controller and wait until it has flushed.
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Shutdown(tx)).await?;
        rx.await.map_err(|_| stopped())
    }
}

/// Spawn the driver task on the current tokio runtime.
///
/// The join handle yields the disposed controller so callers can inspect
/// its store afterwards.
pub fn spawn<S, N, C>(
    controller: TimerController<S, N, C>,
) -> (
    TimerHandle,
    mpsc::UnboundedReceiver<Event>,
    JoinHandle<TimerController<S, N, C>>,
)
where
    S: TaskRepository + WalletRepository + StatsRepository + Send + 'static,
    N: Notifier + Send + 'static,
    C: Clock + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(drive(controller, command_rx, event_tx));
    (TimerHandle { commands: command_tx }, event_rx, task)
}

async fn drive<S, N, C>(
    mut controller: TimerController<S, N, C>,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<Event>,
) -> TimerController<S, N, C>
where
    S: TaskRepository + WalletRepository + StatsRepository,
    N: Notifier,
    C: Clock,
{
    let emit = |batch: Vec<Event>| {
        for event in batch {
            // Nobody listening is fine.
            let _ = events.send(event);
        }
    };
    let mut ticker: Option<Interval> = None;

    loop {
        if controller.state() != TimerState::Running {
            ticker = None;
        } else if ticker.is_none() {
            ticker = Some(interval_at(Instant::now() + TICK, TICK));
        }

        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    emit(controller.shutdown());
                    break;
                };
                let stop = matches!(command, Command::Shutdown(_));
                let batch = apply(&mut controller, command);
                restart_if_started(&batch, &mut ticker);
                emit(batch);
                if stop {
                    break;
                }
            }
            _ = next_tick(&mut ticker) => {
                let batch = controller.tick();
                restart_if_started(&batch, &mut ticker);
                emit(batch);
            }
        }
    }

    tracing::debug!("timer runtime stopped");
    controller
}

fn apply<S, N, C>(controller: &mut TimerController<S, N, C>, command: Command) -> Vec<Event>
where
    S: TaskRepository + WalletRepository + StatsRepository,
    N: Notifier,
    C: Clock,
{
    match command {
        Command::Start => controller.start(),
        Command::Pause => controller.pause(),
        Command::Skip => controller.skip(),
        Command::Reset => controller.reset(),
        Command::SubmitNote(text) => controller.submit_note(&text),
        Command::DismissNote => controller.dismiss_note(),
        Command::SetTask(task_id) => controller.set_task(task_id),
        Command::UpdateSettings(settings) => controller.update_settings(settings),
        Command::Snapshot(reply) => {
            let _ = reply.send(controller.snapshot());
            Vec::new()
        }
        Command::Shutdown(done) => {
            let batch = controller.shutdown();
            let _ = done.send(());
            batch
        }
    }
}

/// Each started session counts whole seconds from its own start.
fn restart_if_started(batch: &[Event], ticker: &mut Option<Interval>) {
    if batch.iter().any(|e| matches!(e, Event::TimerStarted { .. })) {
        *ticker = None;
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
