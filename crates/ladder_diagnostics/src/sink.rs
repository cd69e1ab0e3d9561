//! Per-run record accumulator with cycle stamping and abort policy.

use crate::record::Record;
use crate::renderer::TextRenderer;
use crate::severity::Severity;
use std::io::Write;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Lowest severity that can abort a run. Debug and info records never do.
pub const ABORT_FLOOR: Severity = Severity::Warning;

/// What the writer of a record should do next.
#[must_use]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Disposition {
    /// Keep running.
    Continue,
    /// The record reached the abort threshold; the run should stop.
    Abort,
}

impl Disposition {
    /// Returns `true` for [`Disposition::Abort`].
    pub fn is_abort(self) -> bool {
        self == Disposition::Abort
    }
}

type EchoTarget = (Severity, Box<dyn Write + Send>);

/// The log of one test run.
///
/// Records are stamped with the current hardware cycle, which the drive loop
/// updates through [`set_cycle`](Self::set_cycle). Records at or above the
/// echo threshold are also rendered to the echo writer as they arrive.
pub struct Log {
    records: Mutex<Vec<Record>>,
    error_count: AtomicUsize,
    cycle: AtomicU64,
    abort_at: Severity,
    echo: Mutex<Option<EchoTarget>>,
}

impl Log {
    /// Creates an empty log that aborts only on [`Severity::Fatal`] and does
    /// not echo.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
            cycle: AtomicU64::new(0),
            abort_at: Severity::Fatal,
            echo: Mutex::new(None),
        }
    }

    /// Sets the lowest severity that yields [`Disposition::Abort`].
    ///
    /// Thresholds below [`ABORT_FLOOR`] are raised to it.
    pub fn with_abort_threshold(mut self, severity: Severity) -> Self {
        self.abort_at = severity.max(ABORT_FLOOR);
        self
    }

    /// Renders every record at or above `threshold` to `writer` as it arrives.
    pub fn with_echo(self, threshold: Severity, writer: Box<dyn Write + Send>) -> Self {
        *lock(&self.echo) = Some((threshold, writer));
        self
    }

    /// Echoes records at or above `threshold` to standard error.
    pub fn with_stderr_echo(self, threshold: Severity) -> Self {
        self.with_echo(threshold, Box::new(std::io::stderr()))
    }

    /// Updates the cycle stamp applied to subsequent records.
    pub fn set_cycle(&self, cycle: u64) {
        self.cycle.store(cycle, Ordering::Relaxed);
    }

    /// Returns the current cycle stamp.
    pub fn cycle(&self) -> u64 {
        self.cycle.load(Ordering::Relaxed)
    }

    /// Stamps and stores a record, returning whether the run should continue.
    pub fn write(&self, mut record: Record) -> Disposition {
        record.cycle = self.cycle();
        if record.severity.is_error() {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }

        if let Some((threshold, writer)) = lock(&self.echo).as_mut() {
            if record.severity >= *threshold {
                // A broken echo stream must not disturb the run.
                let _ = writer.write_all(TextRenderer.render(&record).as_bytes());
            }
        }

        let disposition = if record.severity >= self.abort_at {
            Disposition::Abort
        } else {
            Disposition::Continue
        };
        lock(&self.records).push(record);
        disposition
    }

    /// Returns `true` if any error or fatal records have been written.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Returns the number of error or fatal records written so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Takes all accumulated records, leaving the log empty.
    pub fn take_all(&self) -> Vec<Record> {
        std::mem::take(&mut *lock(&self.records))
    }

    /// Returns a snapshot of all accumulated records without draining.
    pub fn records(&self) -> Vec<Record> {
        lock(&self.records).clone()
    }
}

impl Default for Log {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_log() {
        let log = Log::new();
        assert!(!log.has_errors());
        assert_eq!(log.error_count(), 0);
        assert!(log.take_all().is_empty());
    }

    #[test]
    fn records_are_cycle_stamped() {
        let log = Log::new();
        log.set_cycle(42);
        let _ = log.write(Record::new(Severity::Info, "hello"));
        assert_eq!(log.records()[0].cycle, 42);
    }

    #[test]
    fn error_counts_but_continues_by_default() {
        let log = Log::new();
        assert_eq!(
            log.write(Record::new(Severity::Error, "mismatch")),
            Disposition::Continue
        );
        assert!(log.has_errors());
        assert_eq!(log.error_count(), 1);
    }

    #[test]
    fn fatal_aborts_by_default() {
        let log = Log::new();
        let d = log.write(Record::new(Severity::Fatal, "bad id"));
        assert!(d.is_abort());
        assert_eq!(log.error_count(), 1);
    }

    #[test]
    fn threshold_never_drops_below_warning() {
        let log = Log::new().with_abort_threshold(Severity::Debug);
        assert!(!log.write(Record::new(Severity::Debug, "d")).is_abort());
        assert!(!log.write(Record::new(Severity::Info, "i")).is_abort());
        assert!(log.write(Record::new(Severity::Warning, "w")).is_abort());
    }

    #[test]
    fn lowered_threshold_aborts_on_error() {
        let log = Log::new().with_abort_threshold(Severity::Error);
        assert!(log.write(Record::new(Severity::Error, "x")).is_abort());
        assert!(!log.write(Record::new(Severity::Warning, "y")).is_abort());
    }

    #[test]
    fn take_all_drains() {
        let log = Log::new();
        let _ = log.write(Record::new(Severity::Error, "a"));
        let _ = log.write(Record::new(Severity::Info, "b"));
        assert_eq!(log.take_all().len(), 2);
        assert!(log.take_all().is_empty());
        // Error count is NOT reset by take_all
        assert_eq!(log.error_count(), 1);
    }

    #[test]
    fn echo_respects_threshold() {
        let buf = SharedBuf::default();
        let log = Log::new().with_echo(Severity::Warning, Box::new(buf.clone()));
        log.set_cycle(7);
        let _ = log.write(Record::new(Severity::Debug, "quiet"));
        let _ = log.write(Record::new(Severity::Error, "loud"));
        let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(!out.contains("quiet"));
        assert!(out.contains("7: [] error: loud"));
    }
}
