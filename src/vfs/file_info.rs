use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::vfs::{Entry, FileMode};

/// Placeholder owner shown by the `Display` rendering.
pub const DEFAULT_USER: &str = "boot";
/// Placeholder group shown by the `Display` rendering.
pub const DEFAULT_GROUP: &str = "foot";

/// Read-only snapshot returned by `stat`, `lstat` and `read_dir`.
///
/// Built fresh on every call; the modification time is the wall clock at
/// construction because nothing is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    name: PathBuf,
    size: u64,
    mode: FileMode,
    modified: SystemTime,
    is_dir: bool,
}

impl FileInfo {
    /// Projection of a file; a directory bit in `mode` is dropped.
    pub fn for_file<P: AsRef<Path>>(name: P, size: u64, mode: FileMode) -> FileInfo {
        FileInfo {
            name: name.as_ref().to_path_buf(),
            size,
            mode: mode.without(FileMode::DIR),
            modified: SystemTime::now(),
            is_dir: false,
        }
    }

    /// Projection of a directory; the directory bit is always set.
    pub fn for_dir<P: AsRef<Path>>(name: P, size: u64, mode: FileMode) -> FileInfo {
        FileInfo {
            name: name.as_ref().to_path_buf(),
            size,
            mode: FileMode::DIR | mode,
            modified: SystemTime::now(),
            is_dir: true,
        }
    }

    /// Default projection used when no entry exists (silent mode).
    pub fn placeholder<P: AsRef<Path>>(name: P) -> FileInfo {
        FileInfo::for_file(name, 0, FileMode::ALL_PERMS)
    }

    pub fn from_entry<P: AsRef<Path>>(name: P, entry: &Entry) -> FileInfo {
        if entry.is_dir() {
            FileInfo::for_dir(name, entry.size(), entry.mode())
        } else {
            FileInfo::for_file(name, entry.size(), entry.mode())
        }
    }

    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn is_symlink(&self) -> bool {
        self.mode.is_symlink()
    }

    /// System specific data. There is none in a simulated filesystem.
    pub fn sys(&self) -> Option<&dyn Any> {
        None
    }
}

/// Renders the projection like a line of `ls -l`.
impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modified: DateTime<Local> = self.modified.into();
        write!(
            f,
            "{} {:>7} {:>7} {:>8} {} {}",
            self.mode,
            DEFAULT_USER,
            DEFAULT_GROUP,
            self.size,
            modified.format("%m %b %Y %H:%M"),
            self.name.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Capability;

    #[test]
    fn test_placeholder() {
        let info = FileInfo::placeholder("/tmp/x");
        assert_eq!(info.name(), Path::new("/tmp/x"));
        assert_eq!(info.size(), 0);
        assert_eq!(info.mode(), FileMode::ALL_PERMS);
        assert!(!info.is_dir());
        assert!(!info.is_symlink());
        assert!(info.sys().is_none());
    }

    #[test]
    fn test_file_projection_drops_dir_bit() {
        let info = FileInfo::for_file("/f", 3, FileMode::DIR | FileMode::ALL_RW_PERMS);
        assert!(!info.is_dir());
        assert_eq!(info.mode(), FileMode::ALL_RW_PERMS);
    }

    #[test]
    fn test_dir_projection_sets_dir_bit() {
        let info = FileInfo::for_dir("/d", 0, FileMode::from(0o755));
        assert!(info.is_dir());
        assert!(info.mode().is_dir());
    }

    #[test]
    fn test_from_entry() {
        let dir = Entry::directory(FileMode::from(0o700), Capability::Functional);
        let info = FileInfo::from_entry("/d", &dir);
        assert!(info.is_dir());
        assert_eq!(info.mode().perm(), FileMode::from(0o700));

        let file = Entry::file(FileMode::ALL_RW_PERMS, Capability::Functional).with_size(42);
        assert_eq!(FileInfo::from_entry("/f", &file).size(), 42);

        let link = dir.link_to("/d");
        let info = FileInfo::from_entry("/l", &link);
        assert!(!info.is_dir());
        assert!(info.is_symlink());
    }

    #[test]
    fn test_display_looks_like_ls() {
        let info = FileInfo::for_file("/tmp/report.pdf", 512, FileMode::ALL_RW_PERMS);
        let line = info.to_string();
        assert!(line.starts_with("-rw-rw-rw-    boot    foot      512 "));
        assert!(line.ends_with(" /tmp/report.pdf"));
    }
}
