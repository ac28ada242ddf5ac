//! File status queries and metadata mutation.
//!
//! Functions in this module inspect filesystem entries and, on supported
//! platforms, update file attributes:
//!
//! - [`is_reg_file`]   — true if a path refers to a regular file
//! - [`is_directory`]  — true if a path refers to a directory
//! - [`is_reg_fd`]     — true if a raw file descriptor refers to a regular
//!                       file (available on POSIX and Windows targets)
//! - [`set_file_stat`] — apply modification time, ownership (POSIX), and
//!                       permission bits to a regular file
//!
//! Ownership and permission operations use the [`filetime`] and [`nix`] crates
//! on POSIX targets and `libc` on Windows.

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use filetime::FileTime;

#[cfg(unix)]
use std::os::unix::io::RawFd;

#[cfg(windows)]
use libc;

/// Apply modification time, ownership, and permission bits to a regular file.
///
/// Returns `Err` if `path` is not a regular file. Attribute operations are
/// applied in order; the first failure is returned immediately.
///
/// # Parameters
/// * `mtime` — desired last-modification time
/// * `uid`   — desired owner UID (POSIX only; ignored on other targets)
/// * `gid`   — desired owner GID (POSIX only; ignored on other targets)
/// * `mode`  — permission bits; only the lower 12 bits are applied
///             (`mode & 0o7777`), i.e. rwxrwxrwx plus the setuid/setgid/sticky
///             bits. On Windows only the read-only bit is honoured.
pub fn set_file_stat(
    path: &Path,
    mtime: SystemTime,
    uid: u32,
    gid: u32,
    mode: u32,
) -> io::Result<()> {
    if !is_reg_file(path) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "set_file_stat: not a regular file",
        ));
    }

    // Set modification time; access time is updated to now (current wall-clock).
    // filetime handles the platform-specific syscall (utimensat on POSIX, SetFileTime on Windows).
    let atime = FileTime::from_system_time(SystemTime::now());
    let ft_mtime = FileTime::from_system_time(mtime);
    filetime::set_file_times(path, atime, ft_mtime)?;

    // Copy ownership — POSIX only (chown is absent on Windows).
    #[cfg(unix)]
    {
        use nix::unistd::{chown, Gid, Uid};
        chown(path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid))).map_err(io::Error::from)?;
    }

    // Suppress "unused variable" warnings on non-Unix targets.
    #[cfg(not(unix))]
    let _ = (uid, gid);

    // Apply the lower 12 permission bits (rwxrwxrwx + setuid/setgid/sticky).
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))?;
    }
    #[cfg(windows)]
    {
        // Windows does not support full POSIX mode bits; honour read-only bit only.
        let readonly = (mode & 0o200) == 0;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_readonly(readonly);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(any(unix, windows)))]
    let _ = mode;

    Ok(())
}

/// Returns `true` if the raw file descriptor `fd` refers to a regular file.
///
/// Uses `fstat(2)` to query the file type. Returns `false` if the `fstat`
/// call fails (e.g. the descriptor is invalid) or the entry is not a regular
/// file (pipes, sockets, terminals, etc.).
#[cfg(unix)]
pub fn is_reg_fd(fd: RawFd) -> bool {
    use nix::sys::stat::{fstat, SFlag};
    match fstat(fd) {
        Ok(stat) => {
            (stat.st_mode as u32) & (SFlag::S_IFMT.bits() as u32) == SFlag::S_IFREG.bits() as u32
        }
        Err(_) => false,
    }
}

/// Returns `true` if the file descriptor `fd` refers to a regular file.
///
/// Descriptors 0, 1, and 2 (stdin/stdout/stderr) always return `false`: the
/// Windows CRT opens them in text mode, making them unsuitable for binary I/O.
/// For all other descriptors, `fstat` is used to check the file type.
#[cfg(windows)]
pub fn is_reg_fd(fd: i32) -> bool {
    if fd < 3 {
        return false;
    }
    unsafe {
        let mut stat_buf = std::mem::zeroed::<libc::stat>();
        if libc::fstat(fd, &mut stat_buf) != 0 {
            return false;
        }
        (stat_buf.st_mode as u32) & (libc::S_IFMT as u32) == (libc::S_IFREG as u32)
    }
}

/// Returns `true` if `path` refers to a regular file.
///
/// Returns `false` for directories, symlinks, special files, and paths that
/// do not exist. Symlinks are not followed — the link itself is examined.
pub fn is_reg_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.file_type().is_file())
        .unwrap_or(false)
}

/// Returns `true` if `path` refers to a directory.
///
/// Returns `false` for regular files, symlinks, special files, and paths that
/// do not exist.
pub fn is_directory(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.file_type().is_dir())
        .unwrap_or(false)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
