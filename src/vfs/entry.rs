use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Capability;
use crate::vfs::FileMode;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// Metadata kept only by functional entries.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Meta {
    mode: FileMode,
    size: u64,
}

/// A single record of the simulated namespace: a file, a directory or a symbolic
/// link (a link is a file entry carrying a target path).
///
/// Depending on the [`Capability`] the entry was created with, it either remembers
/// permission bits and size (`Functional`) or only its flags (`Minimal`).
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    entry_type: EntryType,
    target: Option<PathBuf>,
    meta: Option<Meta>,
    resolved: Option<PathBuf>, // transient, set while dereferencing
}

impl Entry {
    pub fn new(entry_type: EntryType, perm: FileMode, capability: Capability) -> Entry {
        let meta = match capability {
            Capability::Minimal => None,
            Capability::Functional => Some(Meta {
                mode: perm.perm(),
                size: 0,
            }),
        };
        Entry {
            entry_type,
            target: None,
            meta,
            resolved: None,
        }
    }

    pub fn file(perm: FileMode, capability: Capability) -> Entry {
        Entry::new(EntryType::File, perm, capability)
    }

    pub fn directory(perm: FileMode, capability: Capability) -> Entry {
        Entry::new(EntryType::Directory, perm, capability)
    }

    /// Sets the size of a functional entry. Minimal entries keep reporting 0.
    pub fn with_size(mut self, size: u64) -> Entry {
        if let Some(meta) = self.meta.as_mut() {
            meta.size = size;
        }
        self
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn capability(&self) -> Capability {
        match self.meta {
            Some(_) => Capability::Functional,
            None => Capability::Minimal,
        }
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    pub fn is_link(&self) -> bool {
        self.target.is_some()
    }

    /// Path the link points to. `None` for anything but a link.
    pub fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    /// Always 0 for minimal entries.
    pub fn size(&self) -> u64 {
        self.meta.map_or(0, |meta| meta.size)
    }

    /// Permission bits; minimal entries report every bit as set.
    pub fn perm(&self) -> FileMode {
        self.meta.map_or(FileMode::ALL_PERMS, |meta| meta.mode)
    }

    /// Full mode: type bits plus permission bits.
    pub fn mode(&self) -> FileMode {
        let mut mode = self.perm();
        if self.is_dir() {
            mode = FileMode::DIR | mode;
        }
        if self.is_link() {
            mode = FileMode::SYMLINK | mode;
        }
        mode
    }

    /// Marks this entry as a link to `target`. An empty target is ignored.
    pub fn with_link<P: AsRef<Path>>(&mut self, target: P) -> &mut Self {
        let target = target.as_ref();
        if !target.as_os_str().is_empty() {
            self.target = Some(target.to_path_buf());
        }
        self
    }

    /// Derives a new link entry pointing at `target`, leaving `self` untouched.
    /// The link keeps the capability level of `self`; it is never a directory.
    pub fn link_to<P: AsRef<Path>>(&self, target: P) -> Entry {
        let mut link = Entry::file(FileMode::ALL_PERMS, self.capability());
        link.with_link(target);
        link
    }

    /// Remembers the path a link chain finally resolved to.
    pub fn set_resolved<P: AsRef<Path>>(&mut self, path: P) {
        self.resolved = Some(path.as_ref().to_path_buf());
    }

    pub fn resolved(&self) -> Option<&Path> {
        self.resolved.as_deref()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mode())?;
        if let Some(target) = &self.target {
            write!(f, " ->{}", target.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod functional {
        use super::*;

        #[test]
        fn test_directory_keeps_perm() {
            let entry = Entry::directory(FileMode::from(0o750), Capability::Functional);
            assert!(entry.is_dir());
            assert!(!entry.is_file());
            assert!(!entry.is_link());
            assert_eq!(entry.perm(), FileMode::from(0o750));
            assert_eq!(entry.mode(), FileMode::DIR | FileMode::from(0o750));
            assert_eq!(entry.size(), 0);
        }

        #[test]
        fn test_size_given_at_creation() {
            let entry = Entry::file(FileMode::ALL_RW_PERMS, Capability::Functional).with_size(4096);
            assert_eq!(entry.size(), 4096);
            assert_eq!(entry.perm(), FileMode::ALL_RW_PERMS);

            let minimal = Entry::file(FileMode::ALL_RW_PERMS, Capability::Minimal).with_size(4096);
            assert_eq!(minimal.size(), 0);
        }

        #[test]
        fn test_type_bits_are_masked_out_of_perm() {
            let entry = Entry::file(FileMode::DIR | FileMode::from(0o644), Capability::Functional);
            assert!(entry.is_file());
            assert_eq!(entry.mode(), FileMode::from(0o644));
        }

        #[test]
        fn test_link_to_creates_new_entry() {
            let dir = Entry::directory(FileMode::from(0o700), Capability::Functional);
            let link = dir.link_to("/tmp/dir");

            assert!(link.is_link());
            assert!(!link.is_dir());
            assert_eq!(link.target(), Some(Path::new("/tmp/dir")));
            assert_eq!(link.mode(), FileMode::SYMLINK | FileMode::ALL_PERMS);
            assert_eq!(link.capability(), Capability::Functional);

            // the target is untouched
            assert!(!dir.is_link());
            assert!(dir.target().is_none());
        }

        #[test]
        fn test_display() {
            let file = Entry::file(FileMode::ALL_RW_PERMS, Capability::Functional);
            assert_eq!(file.to_string(), "-rw-rw-rw-");

            let link = file.link_to("/x");
            assert_eq!(link.to_string(), "Lrwxrwxrwx ->/x");
        }
    }

    mod minimal {
        use super::*;

        #[test]
        fn test_reports_all_perms_and_zero_size() {
            let entry = Entry::directory(FileMode::from(0o700), Capability::Minimal);
            assert_eq!(entry.perm(), FileMode::ALL_PERMS);
            assert_eq!(entry.mode(), FileMode::DIR | FileMode::ALL_PERMS);
            assert_eq!(entry.size(), 0);
            assert_eq!(entry.capability(), Capability::Minimal);
        }

        #[test]
        fn test_link_keeps_minimal_level() {
            let file = Entry::file(FileMode::ALL_RW_PERMS, Capability::Minimal);
            let link = file.link_to("/a");
            assert_eq!(link.capability(), Capability::Minimal);
            assert_eq!(link.mode(), FileMode::SYMLINK | FileMode::ALL_PERMS);
        }
    }

    mod mutators {
        use super::*;

        #[test]
        fn test_with_link_ignores_empty_target() {
            let mut entry = Entry::file(FileMode::ALL_RW_PERMS, Capability::Functional);
            entry.with_link("");
            assert!(!entry.is_link());

            entry.with_link("/target");
            assert!(entry.is_link());
            assert!(entry.mode().is_symlink());
        }

        #[test]
        fn test_resolved_slot() {
            let mut entry = Entry::file(FileMode::ALL_RW_PERMS, Capability::Functional);
            assert!(entry.resolved().is_none());
            entry.set_resolved("/real/file");
            assert_eq!(entry.resolved(), Some(Path::new("/real/file")));
        }
    }
}
