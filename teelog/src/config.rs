use serde::Deserialize;

/// Logging configuration. `max_size` is in megabytes, `max_backups` is a
/// count of retained backups, and `max_age` is in days; a zero `max_backups`
/// or `max_age` disables that retention rule.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub filename: String,
    pub level: String,
    pub max_size: u64,
    pub max_backups: usize,
    pub max_age: u64,
    #[serde(default)]
    pub compress: bool,
    #[serde(default)]
    pub stdout: bool,
}

impl Config {
    /// Apply the command line level override, when one was given.
    pub fn with_level_override(mut self, level: Option<String>) -> Self {
        if let Some(level) = level {
            self.level = level;
        }
        self
    }
}

/// Extract the value of the single supported `-l <level>` command line
/// flag from an argument list, accepting both `-l info` and `-l=info`.
pub fn level_override<I>(args: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "-l" {
            return args.next();
        }
        if let Some(value) = arg.strip_prefix("-l=") {
            return Some(value.to_string());
        }
    }

    None
}
