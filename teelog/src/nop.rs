use crate::*;

/// Implements a no-op logger which drops all log messages.
pub(crate) struct NopLogger {}

impl NopLogger {
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::Off
    }
}

impl Log for NopLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        false
    }

    fn log(&self, _record: &log::Record<'_>) {}

    fn flush(&self) {}
}

/// A type to construct a basic `TeeLog` which drops all log messages.
pub struct NopLogBuilder {}

impl Default for NopLogBuilder {
    fn default() -> Self {
        Self {}
    }
}

impl NopLogBuilder {
    /// Create a new log builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Consumes the builder and returns a `TeeLog`.
    pub fn build(self) -> TeeLog {
        let logger = NopLogger {};
        let level_filter = logger.level_filter();
        TeeLog {
            logger: Box::new(logger),
            level_handle: LevelHandle::new(level_filter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_everything() {
        let nop = NopLogBuilder::new().build();

        assert_eq!(nop.level_handle().get(), LevelFilter::Off);
        assert!(!nop.enabled(
            &log::MetadataBuilder::new().level(Level::Error).build()
        ));
        nop.log(
            &Record::builder()
                .args(format_args!("dropped"))
                .level(Level::Error)
                .build(),
        );
        nop.flush();
    }
}
