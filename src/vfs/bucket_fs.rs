//! This module provides a filesystem that stores nothing and only pretends to work.
//!
//! ### Modes of operation
//! - **Silent** (dry run): every operation succeeds and is reported to the diagnostic
//!   sink. The namespace is never read nor written.
//! - **Hybrid**: a user supplied error is injected and a set of paths is declared to
//!   exist. Operations on declared paths succeed and update the namespace the way a
//!   real filesystem would; everything else fails with an [`FsError`] wrapping the
//!   injected error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::config::{Capability, Options};
use crate::core::{Filesystem, Result, utils};
use crate::diag::{ConsoleSink, DiagnosticSink, Event, Icon, Op};
use crate::error::{ErrorKind, FsError, InjectedError, LinkReason};
use crate::vfs::{BitBucketFile, Entry, FileInfo, FileMode, OpenFlags};

enum Mode {
    Silent,
    Hybrid(InjectedError),
}

struct State {
    mode: Mode,
    entries: BTreeMap<PathBuf, Entry>, // cleaned paths
}

impl State {
    fn injected(&self) -> Option<InjectedError> {
        match &self.mode {
            Mode::Silent => None,
            Mode::Hybrid(err) => Some(err.clone()),
        }
    }
}

/// A fake filesystem with two modes of operation, silent and hybrid.
///
/// All paths are cleaned before use: surrounding whitespace is trimmed, `.`/`..`
/// are resolved lexically and a leading `~/` is expanded to the home directory.
/// One reader/writer lock guards the whole namespace; mutating operations take it
/// exclusively, lookups take it shared.
///
/// ### Example:
/// ```
/// use bitbucket_fs::{BitBucketFS, ErrorKind, File, FileMode, Filesystem, InjectedError, NullSink};
/// use std::sync::Arc;
///
/// let fs = BitBucketFS::hybrid(InjectedError::msg("bitbucket warning"))
///     .with_sink(Arc::new(NullSink))
///     .with_fake_directories(["/bitbucket"])
///     .with_fake_files(["/bitbucket/test.pdf"]);
///
/// let mut file = fs.open("/bitbucket/test.pdf").unwrap();
/// assert_eq!(file.write(b"hello").unwrap(), 5);
///
/// let err = fs.remove("/tmp/dummy.txt").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert_eq!(err.injected().unwrap().to_string(), "bitbucket warning");
///
/// fs.mkdir("/bitbucket/Dir1", FileMode::from(0o775)).unwrap();
/// assert!(fs.stat("/bitbucket/Dir1").unwrap().is_dir());
/// ```
pub struct BitBucketFS {
    state: RwLock<State>,
    options: Options,
    sink: Arc<dyn DiagnosticSink>,
}

impl BitBucketFS {
    /// Creates a filesystem in silent mode: nothing ever fails, every operation is
    /// only reported.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Creates a silent filesystem with the given options. The console sink honours
    /// `options.verbosity`.
    pub fn with_options(options: Options) -> Self {
        let sink = Arc::new(ConsoleSink::new(options.verbosity));
        Self {
            state: RwLock::new(State {
                mode: Mode::Silent,
                entries: BTreeMap::new(),
            }),
            options,
            sink,
        }
    }

    /// Creates a filesystem in hybrid mode, wrapping `error` into every failure.
    pub fn hybrid<E: Into<InjectedError>>(error: E) -> Self {
        Self::new().with_error(error)
    }

    /// Like [`hybrid`](Self::hybrid) for callers holding an optional error.
    ///
    /// # Panics
    ///
    /// Hybrid mode without an injected error is a programming error, so `None`
    /// aborts construction.
    pub fn hybrid_opt(error: Option<InjectedError>) -> Self {
        match error {
            Some(error) => Self::hybrid(error),
            None => panic!("BitBucketFS: hybrid mode needs an injected error"),
        }
    }

    /// Replaces the diagnostic sink (stdout by default).
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Switches to hybrid mode with `error` as the injected error.
    pub fn with_error<E: Into<InjectedError>>(mut self, error: E) -> Self {
        let error = error.into();
        trace!(error = %error, "bitbucket filesystem switched to hybrid mode");
        self.state.get_mut().mode = Mode::Hybrid(error);
        self
    }

    /// Declares files that exist. No-op in silent mode.
    pub fn with_fake_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let entry = Entry::file(FileMode::ALL_RW_PERMS, self.options.capability);
        self.declare(files, entry);
        self
    }

    /// Declares directories that exist. No-op in silent mode.
    pub fn with_fake_directories<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let entry = Entry::directory(FileMode::ALL_PERMS, self.options.capability);
        self.declare(dirs, entry);
        self
    }

    pub fn is_silent(&self) -> bool {
        matches!(self.state.read().mode, Mode::Silent)
    }

    pub fn capability(&self) -> Capability {
        self.options.capability
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    fn declare<I, P>(&mut self, paths: I, entry: Entry)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let state = self.state.get_mut();
        if let Mode::Silent = state.mode {
            return;
        }

        let mut paths: Vec<PathBuf> = paths.into_iter().map(utils::clean_path).collect();
        paths.sort();
        paths.dedup();

        trace!(count = paths.len(), dir = entry.is_dir(), "declaring fake entries");
        for path in paths {
            state.entries.insert(path, entry.clone());
        }
    }

    /// Hands one event to the sink. Never called while the namespace lock is held,
    /// so a sink may call back into the filesystem.
    fn report(&self, op: Op, icon: Option<Icon>, path: &Path, other: Option<&Path>) {
        self.sink.emit(&Event {
            op,
            icon,
            path,
            other,
        });
    }

    fn reject(&self, err: FsError) -> FsError {
        debug!(kind = ?err.kind(), "{err}");
        err
    }

    fn open_in(
        &self,
        state: &State,
        path: &Path,
        flags: OpenFlags,
        perm: FileMode,
    ) -> Result<BitBucketFile> {
        let injected = state.injected();
        if let Some(err) = &injected {
            let kind = match state.entries.get(path) {
                Some(entry) if entry.is_dir() => Some(ErrorKind::IsDirectory),
                Some(_) => None,
                // created silently, no entry is inserted
                None if flags.contains(OpenFlags::CREATE) => None,
                None => Some(ErrorKind::NotFound),
            };
            if let Some(kind) = kind {
                return Err(self.reject(FsError::path(Op::Open.name(), path, kind, Some(err.clone()))));
            }
        }
        Ok(BitBucketFile::new(path, flags, perm, injected))
    }

    fn remove_in(&self, state: &mut State, path: &Path) -> (Option<Icon>, Result<()>) {
        let Some(injected) = state.injected() else {
            return (None, Ok(()));
        };
        match state.entries.remove(path) {
            Some(entry) => (Some(Icon::of(entry.is_dir())), Ok(())),
            None => (
                None,
                Err(self.reject(FsError::path(
                    Op::Remove.name(),
                    path,
                    ErrorKind::NotFound,
                    Some(injected),
                ))),
            ),
        }
    }

    fn rename_in(&self, state: &mut State, old: &Path, new: &Path) -> (Option<Icon>, Result<()>) {
        let Some(injected) = state.injected() else {
            return (None, Ok(()));
        };

        let reason = if !state.entries.contains_key(old) {
            LinkReason::SourceMissing
        } else if state.entries.contains_key(new) {
            LinkReason::DestinationExists
        } else {
            return match state.entries.remove(old) {
                Some(entry) => {
                    let icon = Icon::of(entry.is_dir());
                    state.entries.insert(new.to_path_buf(), entry);
                    (Some(icon), Ok(()))
                }
                None => (None, Ok(())),
            };
        };
        let err = FsError::link(Op::Rename.name(), old, new, reason, Some(injected));
        (None, Err(self.reject(err)))
    }

    fn symlink_in(&self, state: &mut State, target: &Path, link: &Path) -> (Option<Icon>, Result<()>) {
        let Some(injected) = state.injected() else {
            return (None, Ok(()));
        };

        let node = match state.entries.get(target) {
            Some(node) if !state.entries.contains_key(link) => node,
            found => {
                let reason = match found {
                    None => LinkReason::SourceMissing,
                    Some(_) => LinkReason::DestinationExists,
                };
                let err = FsError::link(Op::Symlink.name(), target, link, reason, Some(injected));
                return (None, Err(self.reject(err)));
            }
        };

        let icon = Icon::of(node.is_dir());
        let alias = node.link_to(target);
        state.entries.insert(link.to_path_buf(), alias);
        (Some(icon), Ok(()))
    }

    fn mkdir_in(&self, state: &mut State, path: &Path, perm: FileMode) -> (Option<Icon>, Result<()>) {
        let Some(injected) = state.injected() else {
            return (None, Ok(()));
        };

        if let Some(entry) = state.entries.get(path) {
            let is_dir = entry.is_dir();
            let kind = if is_dir {
                ErrorKind::DirExists
            } else {
                ErrorKind::FileExists
            };
            let err = FsError::path(Op::Mkdir.name(), path, kind, Some(injected));
            return (Some(Icon::of(is_dir)), Err(self.reject(err)));
        }

        state
            .entries
            .insert(path.to_path_buf(), Entry::directory(perm, self.options.capability));
        (Some(Icon::Dir), Ok(()))
    }

    /// Follows the link chain starting at `entry` (found under `path`) until a
    /// non-link entry is found. Every visited target is pushed onto `hops`. The
    /// returned copy remembers where it was found.
    fn dereference(
        &self,
        state: &State,
        op: Op,
        path: &Path,
        entry: &Entry,
        injected: &InjectedError,
        hops: &mut Vec<PathBuf>,
    ) -> Result<Entry> {
        let mut current = path.to_path_buf();
        let mut entry = entry;

        while let Some(target) = entry.target() {
            let target = utils::clean_path(target);
            if hops.len() == self.options.max_link_hops {
                return Err(self.reject(FsError::path(
                    op.name(),
                    &target,
                    ErrorKind::CycleDetected,
                    Some(injected.clone()),
                )));
            }
            hops.push(target.clone());

            entry = match state.entries.get(&target) {
                Some(next) => next,
                None => {
                    return Err(self.reject(FsError::path(
                        op.name(),
                        &target,
                        ErrorKind::NotFound,
                        Some(injected.clone()),
                    )));
                }
            };
            current = target;
        }

        let mut resolved = entry.clone();
        resolved.set_resolved(&current);
        Ok(resolved)
    }

    fn stat_in(&self, state: &State, path: &Path, hops: &mut Vec<PathBuf>) -> Result<FileInfo> {
        let Some(injected) = state.injected() else {
            return Ok(FileInfo::placeholder(path));
        };
        let Some(entry) = state.entries.get(path) else {
            return Err(self.reject(FsError::path(
                Op::Stat.name(),
                path,
                ErrorKind::NotFound,
                Some(injected),
            )));
        };
        if !entry.is_link() {
            return Ok(FileInfo::from_entry(path, entry));
        }

        let resolved = self.dereference(state, Op::Stat, path, entry, &injected, hops)?;
        let name = resolved.resolved().unwrap_or(path);
        Ok(FileInfo::from_entry(name, &resolved))
    }

    fn lstat_in(&self, state: &State, path: &Path) -> Result<FileInfo> {
        let Some(injected) = state.injected() else {
            return Ok(FileInfo::placeholder(path));
        };
        match state.entries.get(path) {
            Some(entry) => Ok(FileInfo::from_entry(path, entry)),
            None => Err(self.reject(FsError::path(
                Op::Lstat.name(),
                path,
                ErrorKind::NotFound,
                Some(injected),
            ))),
        }
    }

    fn read_dir_in(&self, state: &State, path: &Path) -> Result<Vec<FileInfo>> {
        let Some(injected) = state.injected() else {
            return Ok(Vec::new());
        };
        let kind = match state.entries.get(path) {
            Some(entry) if entry.is_dir() => return Ok(Vec::new()),
            Some(_) => ErrorKind::NotDirectory,
            None => ErrorKind::NotFound,
        };
        Err(self.reject(FsError::path(Op::ReadDir.name(), path, kind, Some(injected))))
    }
}

impl Default for BitBucketFS {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for BitBucketFS {
    type File = BitBucketFile;

    fn path_separator(&self) -> u8 {
        b'/'
    }

    fn open<P: AsRef<Path>>(&self, path: P) -> Result<BitBucketFile> {
        self.open_file(path, OpenFlags::RDONLY, FileMode::default())
    }

    /// Opens a declared file, or an undeclared one when `CREATE` is given. Creation
    /// is silent: the descriptor is returned but nothing is added to the namespace.
    fn open_file<P: AsRef<Path>>(
        &self,
        path: P,
        flags: OpenFlags,
        perm: FileMode,
    ) -> Result<BitBucketFile> {
        let path = utils::clean_path(path);
        let result = if flags.contains(OpenFlags::CREATE) {
            self.open_in(&self.state.write(), &path, flags, perm)
        } else {
            self.open_in(&self.state.read(), &path, flags, perm)
        };
        self.report(Op::Open, None, &path, None);
        result
    }

    fn remove<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = utils::clean_path(path);
        let (icon, result) = self.remove_in(&mut self.state.write(), &path);
        self.report(Op::Remove, icon, &path, None);
        result
    }

    /// Moves the entry under `old` to `new`. Fails if `old` is missing or `new`
    /// already exists.
    fn rename<P: AsRef<Path>, Q: AsRef<Path>>(&self, old: P, new: Q) -> Result<()> {
        let old = utils::clean_path(old);
        let new = utils::clean_path(new);
        let (icon, result) = self.rename_in(&mut self.state.write(), &old, &new);
        self.report(Op::Rename, icon, &old, Some(&new));
        result
    }

    /// Creates `link` pointing at `target`. The target entry itself is untouched.
    fn symlink<P: AsRef<Path>, Q: AsRef<Path>>(&self, target: P, link: Q) -> Result<()> {
        let target = utils::clean_path(target);
        let link = utils::clean_path(link);
        let (icon, result) = self.symlink_in(&mut self.state.write(), &target, &link);
        self.report(Op::Symlink, icon, &link, Some(&target));
        result
    }

    fn mkdir<P: AsRef<Path>>(&self, path: P, perm: FileMode) -> Result<()> {
        let path = utils::clean_path(path);
        let (icon, result) = self.mkdir_in(&mut self.state.write(), &path, perm);
        self.report(Op::Mkdir, icon, &path, None);
        result
    }

    /// Returns information about `path`, following symbolic links. The projection
    /// of a link is the one of the entry at the end of the chain, named after it.
    fn stat<P: AsRef<Path>>(&self, path: P) -> Result<FileInfo> {
        let path = utils::clean_path(path);
        let mut hops = Vec::new();
        let (silent, result) = {
            let state = self.state.read();
            let silent = matches!(state.mode, Mode::Silent);
            (silent, self.stat_in(&state, &path, &mut hops))
        };

        for hop in &hops {
            self.report(Op::Follow, None, hop, None);
        }
        match &result {
            Ok(info) if !silent => {
                self.report(Op::Stat, Some(Icon::of(info.is_dir())), info.name(), None)
            }
            _ => self.report(Op::Stat, None, &path, None),
        }
        result
    }

    /// Same as [`stat`](Filesystem::stat) but a symbolic link is described itself.
    fn lstat<P: AsRef<Path>>(&self, path: P) -> Result<FileInfo> {
        let path = utils::clean_path(path);
        let result = self.lstat_in(&self.state.read(), &path);
        let icon = result.as_ref().ok().map(|info| Icon::of(info.is_dir()));
        self.report(Op::Lstat, icon, &path, None);
        result
    }

    /// Lists a declared directory. Listings are always empty: declared entries are
    /// not enumerated.
    fn read_dir<P: AsRef<Path>>(&self, path: P) -> Result<Vec<FileInfo>> {
        let path = utils::clean_path(path);
        let result = self.read_dir_in(&self.state.read(), &path);
        self.report(Op::ReadDir, None, &path, None);
        result
    }
}
