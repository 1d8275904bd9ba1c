#[macro_export]
/// Logs a fatal error, flushes every destination, and terminates the
/// program. Nothing is logged after this.
macro_rules! fatal {
    () => (
        error!();
        $crate::logger().flush();
        std::process::exit(1);
        );
    ($fmt:expr) => (
        error!($fmt);
        $crate::logger().flush();
        std::process::exit(1);
        );
    ($fmt:expr, $($arg:tt)*) => (
        error!($fmt, $($arg)*);
        $crate::logger().flush();
        std::process::exit(1);
        );
}
