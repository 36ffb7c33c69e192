//! Construction-time configuration of a [`BitBucketFS`](crate::BitBucketFS).

/// How much information every namespace entry keeps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Capability {
    /// Only directory/link flags and the link target. Size is always 0 and every
    /// permission bit is reported as set.
    Minimal,
    /// Additionally keeps the permission bits given at creation time and a size.
    #[default]
    Functional,
}

/// Amount of console output produced by [`ConsoleSink`](crate::ConsoleSink).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Print nothing.
    Off,
    /// One line per filesystem operation.
    Operations,
    /// Operations plus every symbolic link hop.
    #[default]
    All,
}

/// Options used by [`BitBucketFS::with_options`](crate::BitBucketFS::with_options).
///
/// ### Example
/// ```
/// use bitbucket_fs::{Capability, Options, Verbosity};
///
/// let options = Options::default()
///     .capability(Capability::Minimal)
///     .max_link_hops(8)
///     .verbosity(Verbosity::Off);
/// assert_eq!(options.capability, Capability::Minimal);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub capability: Capability,
    /// Upper bound of links followed by `stat` before giving up.
    pub max_link_hops: usize,
    pub verbosity: Verbosity,
}

/// Same limit as Linux `MAXSYMLINKS`.
pub const DEFAULT_MAX_LINK_HOPS: usize = 40;

impl Default for Options {
    fn default() -> Self {
        Self {
            capability: Capability::default(),
            max_link_hops: DEFAULT_MAX_LINK_HOPS,
            verbosity: Verbosity::default(),
        }
    }
}

impl Options {
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capability = capability;
        self
    }

    pub fn max_link_hops(mut self, hops: usize) -> Self {
        self.max_link_hops = hops;
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}
