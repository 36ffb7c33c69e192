//! Descriptor returned by [`BitBucketFS`](crate::BitBucketFS) when a file is opened.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::{File, Result};
use crate::error::{ErrorKind, FsError, InjectedError};
use crate::vfs::{FileMode, OpenFlags};

/// Reference point of [`File::seek`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Whence {
    /// Offset is absolute.
    Start,
    /// Offset is relative to the cursor.
    Current,
    /// Offset is counted backwards from the end: `size - offset`.
    End,
}

/// A fake open file. It stores no bytes, only a synthetic size and cursor.
///
/// The descriptor is an exclusively owned handle: every call that moves the cursor
/// or changes the size takes `&mut self`, so no other holder can observe a stale
/// copy. Closing only resets the cursor, the handle stays usable afterwards.
///
/// ### Invariants
/// - `position < size`, or `position == 0` for an empty file;
/// - `size` grows only through `write` and shrinks only through `truncate`.
#[derive(Debug, Clone)]
pub struct BitBucketFile {
    name: PathBuf,
    size: u64,
    position: u64,
    flags: OpenFlags,
    perm: FileMode,
    injected: Option<InjectedError>,
    eof: bool, // end of data already reported through io::Read
}

impl BitBucketFile {
    pub(crate) fn new<P: AsRef<Path>>(
        name: P,
        flags: OpenFlags,
        perm: FileMode,
        injected: Option<InjectedError>,
    ) -> Self {
        Self {
            name: name.as_ref().to_path_buf(),
            size: 0,
            position: 0,
            flags,
            perm: perm.perm(),
            injected,
            eof: false,
        }
    }

    /// Synthetic size: the sum of all written lengths minus truncations.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn perm(&self) -> FileMode {
        self.perm
    }

    fn error(&self, kind: ErrorKind, read: usize) -> FsError {
        FsError::file(&self.name, kind, read, self.injected.clone())
    }
}

impl File for BitBucketFile {
    fn name(&self) -> &Path {
        &self.name
    }

    /// Grows the size by `buf.len()` without storing anything.
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.size += buf.len() as u64;
        self.eof = false;
        Ok(buf.len())
    }

    /// Pretends to read: the produced bytes are zeros.
    ///
    /// If `buf` is shorter than what remains it is filled completely and the cursor
    /// advances. Otherwise only the remaining bytes are produced and an
    /// [`ErrorKind::EndOfData`] error is returned, whose
    /// [`bytes_read`](FsError::bytes_read) tells how many.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let remains = self.size - self.position;
        if (buf.len() as u64) < remains {
            buf.fill(0);
            self.position += buf.len() as u64;
            Ok(buf.len())
        } else {
            let n = remains as usize;
            buf[..n].fill(0);
            self.position = self.size.saturating_sub(1);
            Err(self.error(ErrorKind::EndOfData, n))
        }
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if offset < self.size {
            self.eof = false;
            self.position = offset;
            self.read(buf)
        } else {
            Err(self.error(ErrorKind::EndOfData, 0))
        }
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let base = match whence {
            Whence::Start => 0,
            Whence::Current => self.position as i128,
            Whence::End => self.size as i128,
        };
        let new_offset = match whence {
            Whence::End => base - offset as i128,
            _ => base + offset as i128,
        };

        if new_offset < 0 || new_offset >= self.size as i128 {
            return Err(self.error(ErrorKind::SeekOutOfRange, 0));
        }

        self.position = new_offset as u64;
        self.eof = false;
        Ok(self.position)
    }

    /// Shrinks the synthetic size. Growing is ignored.
    fn truncate(&mut self, size: u64) -> Result<()> {
        if size < self.size {
            self.eof = false;
            self.size = size;
            if self.position >= self.size {
                self.position = self.size.saturating_sub(1);
            }
        }
        Ok(())
    }

    /// Nothing is ever persisted, so a hybrid filesystem always reports its
    /// injected error here. Descriptors of a silent filesystem succeed.
    fn sync(&mut self) -> Result<()> {
        match self.injected {
            Some(_) => Err(self.error(ErrorKind::NotPersisted, 0)),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.position = 0;
        self.eof = false;
        Ok(())
    }
}

/// Short reads instead of `EndOfData`, as `std::io::Read` expects. Once the end
/// was reached every further read returns `Ok(0)` until the cursor is moved again.
impl io::Read for BitBucketFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.eof {
            return Ok(0);
        }
        match File::read(self, buf) {
            Ok(n) => Ok(n),
            Err(err) if err.is(ErrorKind::EndOfData) => {
                self.eof = true;
                Ok(err.bytes_read())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl io::Write for BitBucketFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        File::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Display for BitBucketFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "::{} {}@{}", self.name.display(), self.size, self.position)
    }
}
