//! Shared log capture for tests asserting on link diagnostics.

use std::sync::{Mutex, MutexGuard, OnceLock};

use log::Level;
use logtest::Logger;
use rstest::fixture;

/// Exclusive handle to the process-wide [`logtest::Logger`].
///
/// `log` allows a single global logger, so every test capturing records
/// shares one instance. Holding the handle keeps other capturing tests out
/// until it is dropped; pair it with `#[serial]` for tests that only emit.
pub struct LoggerHandle {
    guard: MutexGuard<'static, Logger>,
}

impl LoggerHandle {
    /// Acquire the global logger and discard anything already captured.
    pub fn new() -> Self {
        static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

        let logger = LOGGER.get_or_init(|| Mutex::new(Logger::start()));
        let guard = logger
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut handle = Self { guard };
        handle.clear();
        handle
    }

    /// Drop every captured record.
    pub fn clear(&mut self) { while self.guard.pop().is_some() {} }

    /// Drain captured records, returning true if one at `level` contains
    /// `needle`.
    pub fn contains(&mut self, level: Level, needle: &str) -> bool {
        let mut found = false;
        while let Some(record) = self.guard.pop() {
            if record.level() == level && record.args().contains(needle) {
                found = true;
            }
        }
        found
    }
}

impl Default for LoggerHandle {
    fn default() -> Self { Self::new() }
}

impl std::ops::Deref for LoggerHandle {
    type Target = Logger;

    fn deref(&self) -> &Self::Target { &self.guard }
}

impl std::ops::DerefMut for LoggerHandle {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.guard }
}

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn logger() -> LoggerHandle { LoggerHandle::new() }
