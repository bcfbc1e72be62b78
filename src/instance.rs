//! Single-instance control through an advisory lock on a PID file.
//!
//! The first invocation takes an exclusive `flock` on the lock file and
//! writes its PID there. A later invocation fails to take the lock, reads the
//! PID and sends it `SIGTERM`, which turns repeated launches into a toggle.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const LOCK_FILE_NAME: &str = "wlogoutbar.lock";
const TEMP_DIR_VARS: [&str; 4] = ["TMPDIR", "TEMP", "TMP", "XDG_RUNTIME_DIR"];

pub fn temp_dir() -> PathBuf {
    temp_dir_from(|var| std::env::var(var).ok())
}

/// First non-empty of `TMPDIR`, `TEMP`, `TMP`, `XDG_RUNTIME_DIR`, else `/tmp`.
pub fn temp_dir_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    TEMP_DIR_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

pub fn lock_path() -> PathBuf {
    temp_dir().join(LOCK_FILE_NAME)
}

/// Held for the lifetime of the process. Closing the file releases the lock,
/// so there is nothing to clean up on exit.
#[derive(Debug)]
pub struct InstanceLock {
    _file: File,
    path: PathBuf,
    pid: u32,
}

#[derive(Debug)]
pub enum Acquisition {
    Acquired(InstanceLock),
    /// Another instance holds the lock. Carries its PID when the file could
    /// be read.
    Running(Option<libc::pid_t>),
}

impl InstanceLock {
    pub fn acquire(path: &Path) -> Result<Acquisition> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        // SAFETY: the descriptor belongs to `file`, which outlives the call.
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if rc != 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
                let owner = read_owner(path);
                debug!("Lock {} is held by {:?}", path.display(), owner);
                return Ok(Acquisition::Running(owner));
            }
            return Err(err).with_context(|| format!("Failed to lock {}", path.display()));
        }

        let pid = std::process::id();
        file.set_len(0).context("Failed to truncate lock file")?;
        write!(file, "{}", pid).context("Failed to write PID to lock file")?;
        file.flush()?;

        info!("Acquired instance lock {} (pid {})", path.display(), pid);
        Ok(Acquisition::Acquired(InstanceLock { _file: file, path: path.to_path_buf(), pid }))
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_owner(path: &Path) -> Option<libc::pid_t> {
    let contents = fs::read_to_string(path).ok()?;
    contents.trim().parse::<libc::pid_t>().ok().filter(|pid| *pid > 0)
}

fn is_alive(pid: libc::pid_t) -> bool {
    // SAFETY: signal 0 only checks that the process exists.
    unsafe { libc::kill(pid, 0) == 0 }
}

/// Ask the running instance to close. Returns whether a signal was sent.
pub fn dismiss_running(owner: Option<libc::pid_t>) -> bool {
    let Some(pid) = owner else {
        warn!("Another instance holds the lock but its PID is unknown");
        return false;
    };

    if !is_alive(pid) {
        warn!("Lock owner {} is not running", pid);
        return false;
    }

    info!("Another instance is running (pid {}), sending SIGTERM", pid);
    // SAFETY: plain syscall on a PID we just checked.
    if unsafe { libc::kill(pid, libc::SIGTERM) } != 0 {
        warn!("Failed to signal {}: {}", pid, io::Error::last_os_error());
        return false;
    }
    true
}
