//! Error types of the bit bucket filesystem.
//!
//! Every failure produced in hybrid mode carries two things: a structural
//! [`ErrorKind`] describing what went wrong and the [`InjectedError`] supplied when
//! the filesystem was switched to hybrid mode. The injected error is reported as the
//! `source()` of the failure, so callers may match on either of them.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Structural classification of a failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The path is not present in the namespace.
    NotFound,
    /// `mkdir` target already exists as a file.
    FileExists,
    /// `mkdir` target already exists as a directory.
    DirExists,
    /// A file was required, a directory was found.
    IsDirectory,
    /// A directory was required, something else was found.
    NotDirectory,
    /// `rename`/`symlink` source missing or destination already present.
    LinkConflict,
    /// Computed seek offset is outside `[0, size)`.
    SeekOutOfRange,
    /// Read requested beyond the synthetic size.
    EndOfData,
    /// Too many symbolic links were followed while resolving a path.
    CycleDetected,
    /// Nothing is ever persisted; reported by `sync`.
    NotPersisted,
}

impl ErrorKind {
    fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "no such file or directory",
            ErrorKind::FileExists => "file exists",
            ErrorKind::DirExists => "directory exists",
            ErrorKind::IsDirectory => "is a directory",
            ErrorKind::NotDirectory => "not a directory",
            ErrorKind::LinkConflict => "link conflict",
            ErrorKind::SeekOutOfRange => "seek out of range",
            ErrorKind::EndOfData => "end of data",
            ErrorKind::CycleDetected => "too many levels of symbolic links",
            ErrorKind::NotPersisted => "nothing persisted",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a `rename` or `symlink` was refused.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LinkReason {
    SourceMissing,
    DestinationExists,
}

impl fmt::Display for LinkReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkReason::SourceMissing => f.write_str("source does not exist"),
            LinkReason::DestinationExists => f.write_str("destination exists"),
        }
    }
}

/// The user supplied error wrapped into every hybrid mode failure.
///
/// It is a cheap, clonable handle over an [`anyhow::Error`], so any error type (or a
/// plain message) can be injected and later recovered with [`InjectedError::downcast_ref`].
///
/// ```
/// use bitbucket_fs::InjectedError;
///
/// let injected = InjectedError::msg("bitbucket warning");
/// assert_eq!(injected.to_string(), "bitbucket warning");
/// ```
#[derive(Clone)]
pub struct InjectedError(Arc<anyhow::Error>);

impl InjectedError {
    /// Wraps an arbitrary error value.
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(anyhow::Error::new(error)))
    }

    /// Creates an injected error from a printable message.
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self(Arc::new(anyhow::Error::msg(message)))
    }

    /// Returns the injected value if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.0.downcast_ref::<E>()
    }

    /// Checks whether the injected value is of type `E`.
    pub fn is<E>(&self) -> bool
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.0.is::<E>()
    }

    /// Checks whether two handles refer to the very same injected value.
    pub fn same_as(&self, other: &InjectedError) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<anyhow::Error> for InjectedError {
    fn from(error: anyhow::Error) -> Self {
        Self(Arc::new(error))
    }
}

impl fmt::Debug for InjectedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for InjectedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl std::error::Error for InjectedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Error returned by filesystem and descriptor operations.
#[derive(thiserror::Error, Debug, Clone)]
pub enum FsError {
    /// A single-path operation failed.
    #[error("{op} {}: {kind}", .path.display())]
    Path {
        op: &'static str,
        path: PathBuf,
        kind: ErrorKind,
        #[source]
        cause: Option<InjectedError>,
    },
    /// A two-path operation (`rename`, `symlink`) failed.
    #[error("{op} {} {}: {reason}", .old.display(), .new.display())]
    Link {
        op: &'static str,
        old: PathBuf,
        new: PathBuf,
        kind: ErrorKind,
        reason: LinkReason,
        #[source]
        cause: Option<InjectedError>,
    },
    /// An operation on an open descriptor failed.
    #[error("{}: {kind}", .name.display())]
    File {
        name: PathBuf,
        kind: ErrorKind,
        read: usize,
        #[source]
        cause: Option<InjectedError>,
    },
}

impl FsError {
    pub(crate) fn path<P: AsRef<Path>>(
        op: &'static str,
        path: P,
        kind: ErrorKind,
        cause: Option<InjectedError>,
    ) -> Self {
        FsError::Path {
            op,
            path: path.as_ref().to_path_buf(),
            kind,
            cause,
        }
    }

    pub(crate) fn link<P: AsRef<Path>, Q: AsRef<Path>>(
        op: &'static str,
        old: P,
        new: Q,
        reason: LinkReason,
        cause: Option<InjectedError>,
    ) -> Self {
        FsError::Link {
            op,
            old: old.as_ref().to_path_buf(),
            new: new.as_ref().to_path_buf(),
            kind: ErrorKind::LinkConflict,
            reason,
            cause,
        }
    }

    pub(crate) fn file<P: AsRef<Path>>(
        name: P,
        kind: ErrorKind,
        read: usize,
        cause: Option<InjectedError>,
    ) -> Self {
        FsError::File {
            name: name.as_ref().to_path_buf(),
            kind,
            read,
            cause,
        }
    }

    /// Returns the structural kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::Path { kind, .. } | FsError::Link { kind, .. } | FsError::File { kind, .. } => {
                *kind
            }
        }
    }

    /// Returns the injected error wrapped into this failure, if any.
    pub fn injected(&self) -> Option<&InjectedError> {
        match self {
            FsError::Path { cause, .. }
            | FsError::Link { cause, .. }
            | FsError::File { cause, .. } => cause.as_ref(),
        }
    }

    /// Number of zero-filled bytes produced by a read that hit the end of data.
    /// Always 0 for other failures.
    pub fn bytes_read(&self) -> usize {
        match self {
            FsError::File { read, .. } => *read,
            _ => 0,
        }
    }

    /// Checks whether this failure is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }
}

impl From<FsError> for io::Error {
    fn from(error: FsError) -> Self {
        let kind = match error.kind() {
            ErrorKind::NotFound => io::ErrorKind::NotFound,
            ErrorKind::FileExists | ErrorKind::DirExists | ErrorKind::LinkConflict => {
                io::ErrorKind::AlreadyExists
            }
            ErrorKind::SeekOutOfRange => io::ErrorKind::InvalidInput,
            ErrorKind::EndOfData => io::ErrorKind::UnexpectedEof,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct DiskOnFire;

    #[test]
    fn test_injected_error_downcast() {
        let injected = InjectedError::new(DiskOnFire);
        assert!(injected.is::<DiskOnFire>());
        assert!(injected.downcast_ref::<DiskOnFire>().is_some());
        assert_eq!(injected.to_string(), "disk on fire");

        let other = injected.clone();
        assert!(other.same_as(&injected));
        assert!(!InjectedError::msg("x").same_as(&injected));
    }

    #[test]
    fn test_injected_error_from_anyhow() {
        let injected: InjectedError = anyhow::anyhow!("boom").into();
        assert_eq!(injected.to_string(), "boom");
    }

    #[test]
    fn test_path_error_source_is_injected() {
        let injected = InjectedError::new(DiskOnFire);
        let err = FsError::path("remove", "/tmp/x", ErrorKind::NotFound, Some(injected));

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.is(ErrorKind::NotFound));
        assert_eq!(err.to_string(), "remove /tmp/x: no such file or directory");

        let source = err.source().expect("source must be the injected error");
        assert_eq!(source.to_string(), "disk on fire");
        assert!(err.injected().unwrap().is::<DiskOnFire>());
    }

    #[test]
    fn test_link_error_display() {
        let err = FsError::link(
            "rename",
            "/a",
            "/b",
            LinkReason::DestinationExists,
            Some(InjectedError::msg("x")),
        );
        assert_eq!(err.kind(), ErrorKind::LinkConflict);
        assert_eq!(err.to_string(), "rename /a /b: destination exists");
    }

    #[test]
    fn test_file_error_bytes_read() {
        let err = FsError::file("/f", ErrorKind::EndOfData, 7, None);
        assert_eq!(err.bytes_read(), 7);
        assert!(err.injected().is_none());
        assert!(err.source().is_none());

        let err = FsError::path("stat", "/f", ErrorKind::NotFound, None);
        assert_eq!(err.bytes_read(), 0);
    }

    #[test]
    fn test_into_io_error() {
        let err = FsError::path("open", "/f", ErrorKind::NotFound, None);
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);

        let err = FsError::file("/f", ErrorKind::EndOfData, 0, None);
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
