use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const ROTATION_MARKER: &[u8] = b"--- Log rotated (older entries removed) ---\n";

/// Size limits for the on-disk log
#[derive(Debug, Clone, Copy)]
struct Rotation {
    /// Rotate once the file grows past this many bytes
    max_size: u64,
    /// Bytes of recent output kept after rotating
    keep_size: u64,
}

impl Rotation {
    const DEFAULT: Rotation = Rotation {
        max_size: 5 * 1024 * 1024,
        keep_size: 1024 * 1024,
    };

    /// Trim `path` to its most recent whole lines if it is over the limit.
    /// A missing file is left alone.
    fn apply(self, path: &Path) -> io::Result<()> {
        let size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        if size <= self.max_size {
            return Ok(());
        }

        let tail = read_tail(path, size.saturating_sub(self.keep_size))?;
        let mut rotated = ROTATION_MARKER.to_vec();
        rotated.extend_from_slice(whole_lines(&tail));
        fs::write(path, rotated)
    }
}

/// Everything in `path` from byte `offset` on
fn read_tail(path: &Path, offset: u64) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut tail = Vec::new();
    file.read_to_end(&mut tail)?;
    Ok(tail)
}

/// Drop the leading partial line, if any
fn whole_lines(tail: &[u8]) -> &[u8] {
    match tail.iter().position(|&b| b == b'\n') {
        Some(i) => &tail[i + 1..],
        None => tail,
    }
}

/// Initialize logging to stderr, and additionally to `log_file` if given.
///
/// The log file is appended to and trimmed to its last 1MB once it grows
/// past 5MB. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> color_eyre::Result<()> {
    let file_layer = match log_file {
        Some(log_path) => {
            if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            if let Err(e) = Rotation::DEFAULT.apply(log_path) {
                eprintln!("Warning: Failed to rotate log file: {}", e);
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false),
            )
        }
        None => None,
    };

    let default_filter = format!("blocksweep={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    if let Some(log_path) = log_file {
        tracing::debug!("Logging to {}", log_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rotation(max_size: u64, keep_size: u64) -> Rotation {
        Rotation {
            max_size,
            keep_size,
        }
    }

    #[test]
    fn test_small_log_left_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocksweep.log");
        fs::write(&path, "line one\nline two\n").unwrap();

        rotation(1024, 16).apply(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "line one\nline two\n");
    }

    #[test]
    fn test_rotation_keeps_recent_whole_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocksweep.log");
        let content: String = (0..100).map(|i| format!("entry {i:03}\n")).collect();
        fs::write(&path, &content).unwrap();

        // Each line is 10 bytes; keeping 25 bytes lands mid-line
        rotation(100, 25).apply(&path).unwrap();

        let rotated = fs::read_to_string(&path).unwrap();
        assert_eq!(
            rotated,
            "--- Log rotated (older entries removed) ---\nentry 098\nentry 099\n"
        );
    }

    #[test]
    fn test_tail_without_newline_is_kept() {
        assert_eq!(whole_lines(b"partial"), b"partial");
        assert_eq!(whole_lines(b"art\nnext\n"), b"next\n");
    }

    #[test]
    fn test_missing_log_is_fine() {
        let dir = tempdir().unwrap();
        rotation(10, 5).apply(&dir.path().join("none.log")).unwrap();
    }
}
