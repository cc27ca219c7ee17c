//! Probing the host system: privileges, package manager, free disk space and
//! CPU count, and scoped changes of the working directory.

use crate::catalog::PackageManager;

#[derive(Debug)]
pub enum Error {
    /// Contains the directory that could not be entered or returned to.
    ChangeDir((std::path::PathBuf, std::io::Error)),
    CurrentDir(std::io::Error),
    DiskStats((std::path::PathBuf, nix::errno::Errno)),
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ChangeDir((_, err)) => Some(err),
            Error::CurrentDir(err) => Some(err),
            Error::DiskStats((_, err)) => Some(err),
        }
    }
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ChangeDir((dir, _)) => {
                write!(f, "cannot change directory to {}", dir.to_string_lossy())
            }
            Error::CurrentDir(_) => write!(f, "cannot determine current directory"),
            Error::DiskStats((dir, _)) => {
                write!(f, "cannot read filesystem stats of {}", dir.to_string_lossy())
            }
        }
    }
}

/// Whether the process runs with root privileges.
pub fn is_privileged() -> bool {
    return nix::unistd::geteuid().is_root();
}

/// First known package manager whose executable is on `PATH`.
pub fn detect_package_manager() -> PackageManager {
    return detect_package_manager_with(|executable| which::which(executable).is_ok());
}

/// First package manager in priority order for which `is_installed` holds,
/// or [`PackageManager::Unknown`].
pub fn detect_package_manager_with<F: Fn(&str) -> bool>(is_installed: F) -> PackageManager {
    for manager in PackageManager::DETECTION_ORDER {
        if is_installed(manager.executable()) {
            log::debug!("Detected package manager: {manager}");
            return manager;
        }
    }
    log::warn!("Could not detect package manager");
    return PackageManager::Unknown;
}

/// Free space, in megabytes, available to unprivileged users on the
/// filesystem holding `path`.
pub fn free_disk_space_mb(path: &std::path::Path) -> Result<u64, Error> {
    let stats: nix::sys::statvfs::Statvfs = nix::sys::statvfs::statvfs(path)
        .map_err(|err| Error::DiskStats((path.to_path_buf(), err)))?;
    let free_bytes: u64 = (stats.blocks_available() as u64) * (stats.fragment_size() as u64);
    return Ok(free_bytes / (1024 * 1024));
}

pub fn cpu_count() -> usize {
    return num_cpus::get();
}

/// Whether `sudo` may be used without a password prompt, i.e. credentials
/// are cached or not required.
pub fn has_cached_elevation() -> bool {
    let argv: Vec<String> = vec![
        crate::constants::EXECUTABLE_SUDO.to_string(),
        "-n".to_string(),
        "true".to_string(),
    ];
    let outcome: crate::proc::Outcome = crate::proc::spawn_and_wait(
        &argv,
        crate::constants::SUDO_CACHED_CHECK_TIMEOUT,
        false,
    );
    return outcome.success;
}

/// Ask `sudo` to validate the user's credentials interactively. The
/// password prompt needs the terminal, so the standard streams are
/// inherited instead of captured.
pub fn request_elevation() -> bool {
    let mut child: std::process::Child =
        match std::process::Command::new(crate::constants::EXECUTABLE_SUDO)
            .arg("-v")
            .spawn()
        {
            Ok(n) => n,
            Err(err) => {
                log::warn!("Cannot run sudo: {err}");
                return false;
            }
        };
    match wait_timeout::ChildExt::wait_timeout(
        &mut child,
        crate::constants::SUDO_VALIDATE_TIMEOUT,
    ) {
        Ok(Some(status)) => return status.success(),
        Ok(None) => {
            log::warn!("sudo authentication timed out");
            let _ = child.kill();
            let _ = child.wait();
            return false;
        }
        Err(err) => {
            log::warn!("Cannot wait for sudo: {err}");
            return false;
        }
    }
}

/// Changes the process's working directory for as long as it is alive and
/// changes it back when dropped, on every exit path.
pub struct WorkingDir {
    restore_to: std::path::PathBuf,
}

impl WorkingDir {
    pub fn enter(dir: &std::path::Path) -> Result<Self, Error> {
        let restore_to: std::path::PathBuf = std::env::current_dir().map_err(Error::CurrentDir)?;
        std::env::set_current_dir(dir).map_err(|err| Error::ChangeDir((dir.to_path_buf(), err)))?;
        log::debug!("Entered directory {}", dir.to_string_lossy());
        return Ok(Self { restore_to });
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        match std::env::set_current_dir(&self.restore_to) {
            Ok(()) => log::debug!("Returned to directory {}", self.restore_to.to_string_lossy()),
            Err(err) => log::error!(
                "Cannot return to directory {}: {err}",
                self.restore_to.to_string_lossy()
            ),
        }
    }
}

/// Serializes tests that change the process's working directory.
#[cfg(test)]
pub static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
