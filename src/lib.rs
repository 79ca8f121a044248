//! A self-refreshing two-line retro clock.
//!
//! [`RetroClock`] formats a time line and a date line on a fixed cadence,
//! renders them as segment-display markup with a dim placeholder layer, and
//! tints the card with a color that follows the time of day.

pub mod clock;
pub mod color;
pub mod config;
pub mod format;
pub mod markup;
pub mod scheduler;
pub mod terminal;

pub use clock::{
    Changes, FixedClock, HostContext, RenderState, RetroClock, SystemClock, TimeSource, CARD_SIZE,
};
pub use color::{Anchor, KeyTimeTable, Rgb, TableError};
pub use config::{ClockConfig, ConfigError, ConfigIssue, ConfigWatcher};
pub use format::{ChronoFormatter, DateFormatter, DisplayOptions, FormatError, FormatSpec, Zone};
pub use scheduler::{ManualScheduler, Scheduler, ThreadScheduler, TimerHandle};
