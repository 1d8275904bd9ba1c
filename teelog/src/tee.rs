use crate::*;

use clocksource::precise::UnixInstant;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::sync::MutexGuard;

/// One destination registered with a [`Tee`]: an encoder, a severity
/// filter, and the output guarded by its own lock. The lock gives each
/// destination single-writer discipline without coupling it to any other
/// destination.
struct Sink {
    format: FormatFunction,
    filter: LevelHandle,
    output: Mutex<Box<dyn Output>>,
    failed: AtomicBool,
}

impl Sink {
    fn lock(&self) -> MutexGuard<'_, Box<dyn Output>> {
        // a panic mid-write leaves no partial state worth rejecting; keep
        // the remaining destinations alive
        match self.output.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn deliver(&self, now: UnixInstant, record: &Record) {
        if !self.filter.allows(record.level()) {
            return;
        }

        let mut buffer = LogBuffer::with_capacity(256);
        if (self.format)(&mut buffer, now, record).is_err() {
            return;
        }

        let result = self.lock().write(&buffer);
        self.report(result);
    }

    // a failing destination is reported once to stderr, not per record; the
    // latch resets when a write goes through again. never reports through
    // the logger itself.
    fn report(&self, result: Result<(), std::io::Error>) {
        match result {
            Ok(()) => self.failed.store(false, Ordering::Relaxed),
            Err(e) => {
                if !self.failed.swap(true, Ordering::Relaxed) {
                    eprintln!("log destination failed: {e}");
                }
            }
        }
    }
}

/// Fans each record out to every registered destination whose filter
/// allows it. Destinations are independent: each has its own encoder,
/// filter, and lock, so one destination failing or stalling cannot corrupt
/// or block delivery to another.
pub struct Tee {
    sinks: Vec<Sink>,
}

impl Log for Tee {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.sinks
            .iter()
            .any(|sink| sink.filter.allows(metadata.level()))
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = UnixInstant::now();
        for sink in &self.sinks {
            sink.deliver(now, record);
        }
    }

    fn flush(&self) {
        for sink in &self.sinks {
            let result = sink.lock().flush();
            sink.report(result);
        }
    }
}

/// A type to construct a `TeeLog` which fans records out to one or more
/// destinations behind a shared runtime-adjustable severity threshold.
pub struct TeeLogBuilder {
    level: LevelFilter,
    sinks: Vec<(FormatFunction, Box<dyn Output>, Option<LevelHandle>)>,
}

impl Default for TeeLogBuilder {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            sinks: Vec::new(),
        }
    }
}

impl TeeLogBuilder {
    /// Create a new log builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the severity threshold shared by every destination added with
    /// [`sink`](Self::sink).
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Adds a destination using the builder's shared threshold.
    pub fn sink(mut self, format: FormatFunction, output: Box<dyn Output>) -> Self {
        self.sinks.push((format, output, None));
        self
    }

    /// Adds a destination with its own independent severity filter.
    pub fn sink_with_filter(
        mut self,
        format: FormatFunction,
        output: Box<dyn Output>,
        filter: LevelHandle,
    ) -> Self {
        self.sinks.push((format, output, Some(filter)));
        self
    }

    /// Consumes the builder and returns a `TeeLog`.
    pub fn build(self) -> TeeLog {
        let level_handle = LevelHandle::new(self.level);

        let sinks = self
            .sinks
            .into_iter()
            .map(|(format, output, filter)| Sink {
                format,
                filter: filter.unwrap_or_else(|| level_handle.clone()),
                output: Mutex::new(output),
                failed: AtomicBool::new(false),
            })
            .collect();

        TeeLog {
            logger: Box::new(Tee { sinks }),
            level_handle,
        }
    }
}

// the tee is also usable as an explicitly passed logger without being
// installed globally
impl Log for TeeLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.logger.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        self.logger.log(record)
    }

    fn flush(&self) {
        self.logger.flush()
    }
}
