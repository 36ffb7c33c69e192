use std::path::Path;

use crate::error::FsError;
use crate::vfs::{FileInfo, FileMode, OpenFlags, Whence};

pub mod utils;

pub type Result<T> = std::result::Result<T, FsError>;

/// Operations every filesystem of this family offers, whether it is backed by the
/// host, by memory or by nothing at all.
pub trait Filesystem {
    type File: File;

    fn path_separator(&self) -> u8;
    fn open<P: AsRef<Path>>(&self, path: P) -> Result<Self::File>;
    fn open_file<P: AsRef<Path>>(&self, path: P, flags: OpenFlags, perm: FileMode)
    -> Result<Self::File>;
    fn remove<P: AsRef<Path>>(&self, path: P) -> Result<()>;
    fn rename<P: AsRef<Path>, Q: AsRef<Path>>(&self, old: P, new: Q) -> Result<()>;
    fn symlink<P: AsRef<Path>, Q: AsRef<Path>>(&self, target: P, link: Q) -> Result<()>;
    fn mkdir<P: AsRef<Path>>(&self, path: P, perm: FileMode) -> Result<()>;
    fn stat<P: AsRef<Path>>(&self, path: P) -> Result<FileInfo>;
    fn lstat<P: AsRef<Path>>(&self, path: P) -> Result<FileInfo>;
    fn read_dir<P: AsRef<Path>>(&self, path: P) -> Result<Vec<FileInfo>>;

    /// Creates (or truncates) a file for reading and writing.
    fn create<P: AsRef<Path>>(&self, path: P) -> Result<Self::File> {
        self.open_file(
            path,
            OpenFlags::RDWR | OpenFlags::CREATE | OpenFlags::TRUNC,
            FileMode::ALL_RW_PERMS,
        )
    }
}

/// An open file descriptor.
pub trait File {
    fn name(&self) -> &Path;
    fn write(&mut self, buf: &[u8]) -> Result<usize>;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize>;
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64>;
    fn truncate(&mut self, size: u64) -> Result<()>;
    fn sync(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
