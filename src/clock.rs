//! The clock controller.
//!
//! [`RetroClock`] owns one repeating timer and the current [`RenderState`].
//! Every tick formats both lines and the ambient color for the current instant;
//! a line is only replaced when its markup actually changed, and the returned
//! [`Changes`] tell the rendering side what to redraw.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Locale, Utc};

use crate::color::{KeyTimeTable, Rgb};
use crate::config::ClockConfig;
use crate::format::{
    parse_locale, system_locale, ChronoFormatter, DateFormatter, DisplayOptions, FormatSpec, Zone,
};
use crate::markup;
use crate::scheduler::{ManualScheduler, Scheduler, TimerHandle};

/// Grid rows the clock occupies in a host layout.
pub const CARD_SIZE: u32 = 3;

/// Where the current instant comes from.
pub trait TimeSource {
    fn now(&self) -> DateTime<Utc>;
}

impl<T: TimeSource + ?Sized> TimeSource for Rc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
        self.now.set(self.now.get() + by);
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Zone and locale the host runs in, used when the config names neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContext {
    pub time_zone: Option<String>,
    pub locale: Option<String>,
}

/// What the rendering layer displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    pub first_line: String,
    pub second_line: String,
    pub color: Rgb,
}

/// Which parts of [`RenderState`] a recompute pass replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub first_line: bool,
    pub second_line: bool,
    pub color: bool,
}

impl Changes {
    pub fn lines(&self) -> bool {
        self.first_line || self.second_line
    }

    pub fn any(&self) -> bool {
        self.lines() || self.color
    }
}

static DEFAULT_FIRST_LINE: FormatSpec = FormatSpec::Options(DisplayOptions::hour_minute());
static DEFAULT_SECOND_LINE: FormatSpec = FormatSpec::Options(DisplayOptions::weekday_day_month());

/// A self-refreshing two-line clock.
///
/// Stopped until [`start`](RetroClock::start); dropping the clock cancels its
/// timer.
pub struct RetroClock<S: Scheduler> {
    config: ClockConfig,
    host: HostContext,
    state: RenderState,
    scheduler: S,
    timer: Option<TimerHandle>,
    interval: Duration,
    formatter: Box<dyn DateFormatter>,
    time: Box<dyn TimeSource>,
    palette: KeyTimeTable,
}

impl<S: Scheduler> RetroClock<S> {
    pub fn new(scheduler: S) -> Self {
        let config = ClockConfig::default();
        let interval = config.interval();
        Self {
            config,
            host: HostContext::default(),
            state: RenderState::default(),
            scheduler,
            timer: None,
            interval,
            formatter: Box::new(ChronoFormatter),
            time: Box::new(SystemClock),
            palette: KeyTimeTable::daylight(),
        }
    }

    pub fn with_formatter(mut self, formatter: impl DateFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn with_time_source(mut self, time: impl TimeSource + 'static) -> Self {
        self.time = Box::new(time);
        self
    }

    pub fn with_palette(mut self, palette: KeyTimeTable) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_host_context(mut self, host: HostContext) -> Self {
        self.host = host;
        self
    }

    /// Replaces the host context. Takes effect on the next tick.
    pub fn set_host_context(&mut self, host: HostContext) {
        self.host = host;
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// The cadence the timer runs (or will run) at.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn size_hint(&self) -> u32 {
        CARD_SIZE
    }

    /// Replaces the configuration and recomputes right away. A new interval
    /// restarts a running timer at the new cadence.
    pub fn configure(&mut self, config: ClockConfig) -> Changes {
        let config = config.normalized();
        let interval = config.interval();
        self.config = config;

        if interval != self.interval {
            log::info!(
                "Refresh interval changed from {:?} to {:?}",
                self.interval,
                interval
            );
            self.interval = interval;
            if self.is_running() {
                self.stop();
                self.start();
            }
        }

        self.recompute()
    }

    /// Starts ticking. Returns `false` if a timer was already running.
    pub fn start(&mut self) -> bool {
        if self.timer.is_some() {
            return false;
        }
        let handle = self.scheduler.schedule_repeating(self.interval);
        log::debug!("Started timer {} every {:?}", handle.id(), self.interval);
        self.timer = Some(handle);
        true
    }

    /// Stops ticking. Returns `false` if nothing was running.
    pub fn stop(&mut self) -> bool {
        match self.timer.take() {
            Some(handle) => {
                self.scheduler.cancel(handle);
                log::debug!("Stopped timer {}", handle.id());
                true
            }
            None => false,
        }
    }

    /// Handles a tick from the scheduler. Ticks from timers this clock no
    /// longer owns are ignored and yield `None`.
    pub fn on_tick(&mut self, handle: TimerHandle) -> Option<Changes> {
        if self.timer != Some(handle) {
            log::trace!("Ignoring tick from stale timer {}", handle.id());
            return None;
        }
        Some(self.recompute())
    }

    /// Formats both lines and the ambient color for the current instant.
    ///
    /// A line that fails to format keeps its previous markup.
    pub fn recompute(&mut self) -> Changes {
        let zone = self.effective_zone();
        let locale = self.effective_locale();
        let now = self.time.now();

        let first_spec = self
            .config
            .first_line_format
            .as_ref()
            .unwrap_or(&DEFAULT_FIRST_LINE);
        let second_spec = self
            .config
            .second_line_format
            .as_ref()
            .unwrap_or(&DEFAULT_SECOND_LINE);

        let first = self.render_line(now, zone, locale, first_spec, self.config.blink_dividers);
        let second = self.render_line(now, zone, locale, second_spec, false);

        let mut changes = Changes {
            color: true,
            ..Changes::default()
        };
        if let Some(line) = first {
            if line != self.state.first_line {
                self.state.first_line = line;
                changes.first_line = true;
            }
        }
        if let Some(line) = second {
            if line != self.state.second_line {
                self.state.second_line = line;
                changes.second_line = true;
            }
        }
        self.state.color = self.palette.color_at(zone.seconds_from_midnight(now));

        log::trace!(
            "Recomputed at {} ({}, {}): {:?}",
            now,
            zone,
            locale,
            changes
        );
        changes
    }

    fn render_line(
        &self,
        now: DateTime<Utc>,
        zone: Zone,
        locale: Locale,
        spec: &FormatSpec,
        blink: bool,
    ) -> Option<String> {
        match self.formatter.format(now, zone, locale, spec) {
            Ok(text) => Some(markup::render_line(&text, blink)),
            Err(err) => {
                log::warn!("Failed to format clock line: {}", err);
                None
            }
        }
    }

    /// Config override, then host zone, then the system zone.
    pub fn effective_zone(&self) -> Zone {
        [self.config.time_zone.as_deref(), self.host.time_zone.as_deref()]
            .into_iter()
            .flatten()
            .find_map(Zone::parse)
            .unwrap_or_default()
    }

    /// Config override, then host locale, then the system locale.
    pub fn effective_locale(&self) -> Locale {
        [self.config.locale.as_deref(), self.host.locale.as_deref()]
            .into_iter()
            .flatten()
            .find_map(parse_locale)
            .unwrap_or_else(system_locale)
    }
}

impl RetroClock<ManualScheduler> {
    /// Advances virtual time, delivering every tick that falls due on the way.
    /// Returns the changes of each tick that was handled.
    pub fn run_for(&mut self, by: Duration) -> Vec<Changes> {
        let target = self.scheduler.now() + by;
        let mut handled = Vec::new();
        while let Some(handle) = self.scheduler.fire_next(target) {
            if let Some(changes) = self.on_tick(handle) {
                handled.push(changes);
            }
        }
        self.scheduler.set_now(target);
        handled
    }
}

impl<S: Scheduler> Drop for RetroClock<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
