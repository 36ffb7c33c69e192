//! A simulated filesystem that stores nothing.
//!
//! `bitbucket-fs` lets code exercise destructive or exploratory filesystem operations
//! (remove, rename, symlink, mkdir, open, stat, read_dir) without touching the disk.
//!
//! ### Overview
//!
//! [`BitBucketFS`] works in one of two modes:
//! - **Silent** (dry run): every operation succeeds and is only reported through a
//!   [`DiagnosticSink`] (stdout by default).
//! - **Hybrid**: a set of paths is declared to exist and an error is injected. Operations
//!   behave as on a real POSIX filesystem holding exactly those paths; every failure is
//!   an [`FsError`] that carries both a structural [`ErrorKind`] and the injected error.
//!
//! Opened files are [`BitBucketFile`] descriptors which track a synthetic size and
//! cursor but keep no content.
//!
//! **Key ideas**:
//! - **Safety**: nothing is ever read from or written to the host.
//! - **Testability**: failures are a pure function of the declared namespace.
//! - **Interchangeability**: [`Filesystem`] and [`File`] are the same contracts other
//!   filesystems of the family implement.
//!
//! ```
//! use bitbucket_fs::{BitBucketFS, Filesystem, FileMode, Options, Verbosity};
//!
//! // dry run, nothing printed
//! let fs = BitBucketFS::with_options(Options::default().verbosity(Verbosity::Off));
//! fs.remove("/etc/passwd").unwrap();
//! fs.mkdir("/no/such/parent", FileMode::from(0o755)).unwrap();
//! assert_eq!(fs.stat("/anything").unwrap().size(), 0);
//! ```

mod config;
mod core;
mod diag;
mod error;
mod vfs;

pub use config::{Capability, DEFAULT_MAX_LINK_HOPS, Options, Verbosity};
pub use crate::core::{File, Filesystem, Result, utils};
pub use diag::{ConsoleSink, DiagnosticSink, Event, Icon, NullSink, Op, RecordingSink, TracingSink};
pub use error::{ErrorKind, FsError, InjectedError, LinkReason};
pub use vfs::{
    BitBucketFS, BitBucketFile, DEFAULT_GROUP, DEFAULT_USER, Entry, EntryType, FileInfo, FileMode,
    OpenFlags, Whence,
};
