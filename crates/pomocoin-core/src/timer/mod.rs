mod bonus;
mod clock;
mod controller;
pub mod runtime;
mod session;

pub use bonus::{bonus_secs_for_note, bonus_secs_for_text};
pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use controller::TimerController;
pub use runtime::{Command, TimerHandle};
pub use session::{SessionType, TimerSettings, TimerSnapshot, TimerState};
