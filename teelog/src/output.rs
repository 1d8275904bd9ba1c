use crate::ConfigError;

use clocksource::datetime::DateTime;
use clocksource::precise::UnixInstant;
use flate2::write::GzEncoder;
use flate2::Compression;

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Sender};
use std::time::Duration;

const MEGABYTE: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// A destination which accepts encoded log records. Each `write` call hands
/// over one complete record; implementations must write it without
/// interleaving.
pub trait Output: Send {
    fn write(&mut self, buf: &[u8]) -> Result<(), std::io::Error>;
    fn flush(&mut self) -> Result<(), std::io::Error>;
}

/// An output which sends log records to standard out.
pub struct Stdout {
    inner: std::io::Stdout,
}

impl Stdout {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for Stdout {
    fn default() -> Self {
        Self {
            inner: std::io::stdout(),
        }
    }
}

impl Output for Stdout {
    fn write(&mut self, buf: &[u8]) -> Result<(), std::io::Error> {
        self.inner.write_all(buf)
    }

    fn flush(&mut self) -> Result<(), std::io::Error> {
        self.inner.flush()
    }
}

/// Controls when the active log file is rotated and which rotated-out
/// backups are retained. `max_size` is in megabytes and must be non-zero;
/// `max_backups` (count) and `max_age` (days) each disable their retention
/// rule when zero; `compress` converts retained backups to gzip.
#[derive(Clone, Debug)]
pub struct RotationPolicy {
    pub max_size: u64,
    pub max_backups: usize,
    pub max_age: u64,
    pub compress: bool,
}

/// An output which owns a log file, rotating it to a timestamped backup
/// once appending would push it past the size threshold.
///
/// Backup retention (count pruning, age pruning, compression) runs on a
/// dedicated worker thread which is woken after each rotation, so a `write`
/// never waits on cleanup. A sweep that is skipped or fails is retried on
/// the next rotation; nothing on the write path depends on it.
pub struct RotatingFile {
    path: PathBuf,
    file: File,
    size: u64,
    max_size: u64,
    cleanup: Sender<()>,
}

impl RotatingFile {
    pub fn new<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self, ConfigError> {
        if policy.max_size == 0 {
            return Err(ConfigError::InvalidMaxSize);
        }

        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();

        let sweeper = Sweeper::for_path(&path, &policy);
        let (cleanup, wakeups) = channel();
        std::thread::Builder::new()
            .name("log-retention".to_string())
            .spawn(move || {
                while wakeups.recv().is_ok() {
                    // coalesce pending wakeups into a single sweep
                    while wakeups.try_recv().is_ok() {}
                    sweeper.sweep();
                }
            })?;

        // prune whatever a previous run left behind
        let _ = cleanup.send(());

        Ok(Self {
            path,
            file,
            size,
            max_size: policy.max_size * MEGABYTE,
            cleanup,
        })
    }

    fn rotate(&mut self) -> Result<(), std::io::Error> {
        self.file.flush()?;
        std::fs::rename(&self.path, self.backup_path())?;

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.size = 0;

        let _ = self.cleanup.send(());
        Ok(())
    }

    fn backup_path(&self) -> PathBuf {
        let stamp = DateTime::from(UnixInstant::now()).to_string();
        // make the stamp filesystem safe: drop the UTC offset, dash the colons
        let stamp = stamp.trim_end_matches("+00:00").replace(':', "-");

        let (stem, extension) = split_file_name(&self.path);
        let mut path = self.path.with_file_name(format!("{stem}-{stamp}{extension}"));

        // rotations within one millisecond must not overwrite each other
        let mut sequence = 1;
        while path.exists() {
            path = self
                .path
                .with_file_name(format!("{stem}-{stamp}.{sequence}{extension}"));
            sequence += 1;
        }

        path
    }
}

impl Output for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> Result<(), std::io::Error> {
        if self.size + buf.len() as u64 > self.max_size {
            self.rotate()?;
        }

        self.file.write_all(buf)?;
        self.size += buf.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), std::io::Error> {
        self.file.flush()
    }
}

fn split_file_name(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string());
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    (stem, extension)
}

/// Enumerates and prunes the rotated-out backups for one log file. Every
/// operation is idempotent and failures are left for the next sweep, so
/// running it concurrently with further rotations is harmless.
struct Sweeper {
    dir: PathBuf,
    prefix: String,
    extension: String,
    max_backups: usize,
    max_age: u64,
    compress: bool,
}

impl Sweeper {
    fn for_path(path: &Path, policy: &RotationPolicy) -> Self {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let (stem, extension) = split_file_name(path);

        Self {
            dir,
            prefix: format!("{stem}-"),
            extension,
            max_backups: policy.max_backups,
            max_age: policy.max_age,
            compress: policy.compress,
        }
    }

    fn sweep(&self) {
        let mut backups = self.backups();

        // newest first: the embedded timestamps sort lexicographically
        backups.sort();
        backups.reverse();

        if self.max_backups > 0 && backups.len() > self.max_backups {
            for path in backups.split_off(self.max_backups) {
                let _ = std::fs::remove_file(&path);
            }
        }

        if self.max_age > 0 {
            let max_age = DAY * self.max_age as u32;
            backups.retain(|path| {
                if age_of(path).map(|age| age > max_age).unwrap_or(false) {
                    let _ = std::fs::remove_file(path);
                    false
                } else {
                    true
                }
            });
        }

        if self.compress {
            for path in backups {
                if path.extension().map(|ext| ext == "gz").unwrap_or(false) {
                    continue;
                }
                let _ = compress(&path);
            }
        }
    }

    fn backups(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        entries
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .filter(|path| {
                let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                    return false;
                };
                let base = name.strip_suffix(".gz").unwrap_or(name);
                name.starts_with(&self.prefix) && base.ends_with(&self.extension)
            })
            .collect()
    }
}

fn age_of(path: &Path) -> Option<Duration> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    std::time::SystemTime::now().duration_since(modified).ok()
}

/// Replaces a backup with its gzip form. The original is removed only after
/// the compressed copy is fully on disk.
fn compress(path: &Path) -> Result<(), std::io::Error> {
    let mut target_name = path.as_os_str().to_owned();
    target_name.push(".gz");
    let target_path = PathBuf::from(target_name);

    let mut source = File::open(path)?;
    let target = File::create(&target_path)?;
    let mut encoder = GzEncoder::new(target, Compression::default());
    std::io::copy(&mut source, &mut encoder)?;
    encoder.finish()?.sync_all()?;

    std::fs::remove_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RotationPolicy {
        RotationPolicy {
            max_size: 1,
            max_backups: 0,
            max_age: 0,
            compress: false,
        }
    }

    fn write_backup(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn zero_max_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let result = RotatingFile::new(
            dir.path().join("app.log"),
            RotationPolicy {
                max_size: 0,
                ..policy()
            },
        );

        assert!(matches!(result, Err(ConfigError::InvalidMaxSize)));
    }

    #[test]
    fn rotation_preserves_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut output = RotatingFile::new(&path, policy()).unwrap();

        let filler = vec![b'a'; MEGABYTE as usize - 10];
        output.write(&filler).unwrap();
        output.write(b"over the line\n").unwrap();
        output.flush().unwrap();

        // the filler was rotated out to a backup, the new record starts a
        // fresh file at the original path
        assert_eq!(std::fs::read(&path).unwrap(), b"over the line\n");

        let backups: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("app-"))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(std::fs::read(backups[0].path()).unwrap(), filler);
    }

    #[test]
    fn one_rotation_per_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut output = RotatingFile::new(&path, policy()).unwrap();

        output.write(&vec![b'a'; MEGABYTE as usize]).unwrap();
        // exactly at the threshold: no rotation yet
        let backups = Sweeper::for_path(&path, &policy()).backups();
        assert_eq!(backups.len(), 0);

        output.write(b"x").unwrap();
        let backups = Sweeper::for_path(&path, &policy()).backups();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn sweep_prunes_by_count() {
        let dir = tempfile::tempdir().unwrap();
        for hour in 10..15 {
            write_backup(
                dir.path(),
                &format!("app-2024-01-01T{hour}-00-00.000.log"),
                b"old",
            );
        }

        let sweeper = Sweeper::for_path(
            &dir.path().join("app.log"),
            &RotationPolicy {
                max_backups: 2,
                ..policy()
            },
        );
        sweeper.sweep();

        let mut remaining = sweeper.backups();
        remaining.sort();
        let names: Vec<_> = remaining
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        // the two newest survive, the oldest were deleted first
        assert_eq!(
            names,
            vec![
                "app-2024-01-01T13-00-00.000.log",
                "app-2024-01-01T14-00-00.000.log"
            ]
        );
    }

    #[test]
    fn sweep_prunes_by_age() {
        let dir = tempfile::tempdir().unwrap();
        let stale = write_backup(dir.path(), "app-2024-01-01T10-00-00.000.log", b"stale");
        let fresh = write_backup(dir.path(), "app-2024-01-02T10-00-00.000.log", b"fresh");

        let two_weeks_ago = std::time::SystemTime::now() - DAY * 14;
        filetime::set_file_mtime(
            &stale,
            filetime::FileTime::from_system_time(two_weeks_ago),
        )
        .unwrap();

        let sweeper = Sweeper::for_path(
            &dir.path().join("app.log"),
            &RotationPolicy {
                max_age: 7,
                ..policy()
            },
        );
        sweeper.sweep();

        assert!(!stale.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn sweep_compresses_backups() {
        let dir = tempfile::tempdir().unwrap();
        let backup = write_backup(
            dir.path(),
            "app-2024-01-01T10-00-00.000.log",
            b"rotated out",
        );

        let sweeper = Sweeper::for_path(
            &dir.path().join("app.log"),
            &RotationPolicy {
                compress: true,
                ..policy()
            },
        );
        sweeper.sweep();

        assert!(!backup.exists());
        let compressed = dir.path().join("app-2024-01-01T10-00-00.000.log.gz");
        assert!(compressed.exists());

        let mut decoder =
            flate2::read::GzDecoder::new(File::open(&compressed).unwrap());
        let mut contents = String::new();
        std::io::Read::read_to_string(&mut decoder, &mut contents).unwrap();
        assert_eq!(contents, "rotated out");

        // a second sweep leaves the compressed backup alone
        sweeper.sweep();
        assert!(compressed.exists());
    }

    #[test]
    fn sweep_ignores_the_active_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"active").unwrap();

        let sweeper = Sweeper::for_path(
            &path,
            &RotationPolicy {
                max_backups: 1,
                compress: true,
                ..policy()
            },
        );
        sweeper.sweep();

        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"active");
    }
}
