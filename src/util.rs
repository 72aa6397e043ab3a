//! Timing helpers for generation runs.

use std::borrow::Cow;
use std::time::{Duration, Instant};

/// RAII timer that logs how long a named span took when dropped.
///
/// # Example
/// ```ignore
/// let _t = Timed::info("Generation");
/// generator.run_to_completion()?;
/// // logs "Generation: 1.234ms" when _t is dropped
/// ```
pub struct Timed {
    name: Cow<'static, str>,
    start: Instant,
    level: log::Level,
}

impl Timed {
    /// Time a span and report it at INFO level.
    pub fn info(name: impl Into<Cow<'static, str>>) -> Self {
        Self::at(name.into(), log::Level::Info)
    }

    /// Time a span and report it at DEBUG level.
    pub fn debug(name: impl Into<Cow<'static, str>>) -> Self {
        Self::at(name.into(), log::Level::Debug)
    }

    fn at(name: Cow<'static, str>, level: log::Level) -> Self {
        log::trace!("{}...", name);
        Self {
            name,
            start: Instant::now(),
            level,
        }
    }

    /// Time since the span started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::log!(self.level, "{}: {:.3?}", self.name, self.start.elapsed());
    }
}
