//! Diagnostic side channel.
//!
//! Every filesystem operation reports one [`Event`] to a [`DiagnosticSink`]. The
//! default sink prints the historic dry-run lines to stdout:
//!
//! ```text
//!     ⚡ Mkdir Ⅾ /tmp/faked/Dir1
//!     ⚡ Rename Ⅎ /tmp/a.txt ⇢ /tmp/b.txt
//!     ⛓ /tmp/target.txt
//! ```

use std::fmt;
use std::path::Path;

use parking_lot::Mutex;

use crate::config::Verbosity;

const DIR: char = 'Ⅾ';
const FILE: char = 'Ⅎ';
const DASHED_RIGHT_ARROW: char = '⇢';
const DOUBLE_RIGHT_ARROW: char = '⇉';
const LINK: char = '⛓';

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Op {
    Open,
    Remove,
    Rename,
    Symlink,
    Mkdir,
    Stat,
    Lstat,
    ReadDir,
    /// One hop while following a symbolic link.
    Follow,
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Open => "Open/OpenFile",
            Op::Remove => "Remove",
            Op::Rename => "Rename",
            Op::Symlink => "Symlink",
            Op::Mkdir => "Mkdir",
            Op::Stat => "Stat",
            Op::Lstat => "Lstat",
            Op::ReadDir => "ReadDir",
            Op::Follow => "Follow",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What kind of object an operation touched, when known.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Icon {
    File,
    Dir,
}

impl Icon {
    pub fn of(is_dir: bool) -> Icon {
        if is_dir { Icon::Dir } else { Icon::File }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Icon::File => write!(f, "{FILE}"),
            Icon::Dir => write!(f, "{DIR}"),
        }
    }
}

/// A single operation report.
///
/// For `Rename` the second path is the new name; for `Symlink` `path` is the link
/// and `other` the target it points to.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    pub op: Op,
    pub icon: Option<Icon>,
    pub path: &'a Path,
    pub other: Option<&'a Path>,
}

impl<'a> Event<'a> {
    pub fn new(op: Op, path: &'a Path) -> Self {
        Self {
            op,
            icon: None,
            path,
            other: None,
        }
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn other(mut self, other: &'a Path) -> Self {
        self.other = Some(other);
        self
    }
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op == Op::Follow {
            return write!(f, "\t{LINK} {}", self.path.display());
        }
        write!(f, "\t⚡ {}", self.op)?;
        if let Some(icon) = self.icon {
            write!(f, " {icon}")?;
        }
        write!(f, " {}", self.path.display())?;
        if let Some(other) = self.other {
            let arrow = match self.op {
                Op::Symlink => DOUBLE_RIGHT_ARROW,
                _ => DASHED_RIGHT_ARROW,
            };
            write!(f, " {arrow} {}", other.display())?;
        }
        Ok(())
    }
}

/// Receiver of operation reports.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: &Event<'_>);
}

/// Prints events to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink {
    verbosity: Verbosity,
}

impl ConsoleSink {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn wants(&self, event: &Event<'_>) -> bool {
        match event.op {
            Op::Follow => self.verbosity >= Verbosity::All,
            _ => self.verbosity >= Verbosity::Operations,
        }
    }
}

impl DiagnosticSink for ConsoleSink {
    fn emit(&self, event: &Event<'_>) {
        if self.wants(event) {
            println!("{event}");
        }
    }
}

/// Forwards events to `tracing` instead of printing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: &Event<'_>) {
        tracing::info!(
            op = event.op.name(),
            path = %event.path.display(),
            other = ?event.other,
            "{}",
            event.to_string().trim_start()
        );
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _event: &Event<'_>) {}
}

/// Keeps rendered events in memory, handy in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Returns and forgets every recorded line.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, event: &Event<'_>) {
        self.lines.lock().push(event.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_rendering() {
        let path = Path::new("/tmp/a");
        let other = Path::new("/tmp/b");

        assert_eq!(Event::new(Op::Mkdir, path).to_string(), "\t⚡ Mkdir /tmp/a");
        assert_eq!(
            Event::new(Op::Mkdir, path).icon(Icon::Dir).to_string(),
            "\t⚡ Mkdir Ⅾ /tmp/a"
        );
        assert_eq!(
            Event::new(Op::Rename, path).icon(Icon::File).other(other).to_string(),
            "\t⚡ Rename Ⅎ /tmp/a ⇢ /tmp/b"
        );
        assert_eq!(
            Event::new(Op::Symlink, path).other(other).to_string(),
            "\t⚡ Symlink /tmp/a ⇉ /tmp/b"
        );
        assert_eq!(Event::new(Op::Follow, path).to_string(), "\t⛓ /tmp/a");
        assert_eq!(Event::new(Op::Open, path).to_string(), "\t⚡ Open/OpenFile /tmp/a");
    }

    #[test]
    fn test_console_sink_verbosity() {
        let path = Path::new("/x");
        let op = Event::new(Op::Stat, path);
        let hop = Event::new(Op::Follow, path);

        let off = ConsoleSink::new(Verbosity::Off);
        assert!(!off.wants(&op));
        assert!(!off.wants(&hop));

        let ops = ConsoleSink::new(Verbosity::Operations);
        assert!(ops.wants(&op));
        assert!(!ops.wants(&hop));

        let all = ConsoleSink::new(Verbosity::All);
        assert!(all.wants(&op));
        assert!(all.wants(&hop));
    }

    mod tracing_sink {
        use super::*;
        use crate::{BitBucketFS, FileMode, Filesystem};
        use std::io;
        use std::sync::Arc;

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        #[test]
        fn test_one_info_event_per_operation() {
            let captured = Captured::default();
            let writer = captured.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .with_max_level(tracing::Level::INFO)
                .finish();

            tracing::subscriber::with_default(subscriber, || {
                let fs = BitBucketFS::new().with_sink(Arc::new(TracingSink));
                fs.mkdir("/a", FileMode::ALL_PERMS).unwrap();
                fs.remove("/b").unwrap();
                fs.rename("/c", "/d").unwrap();
            });

            let output = String::from_utf8(captured.0.lock().clone()).unwrap();
            let lines: Vec<&str> = output.lines().collect();
            assert_eq!(lines.len(), 3, "{output}");
            assert!(lines.iter().all(|line| line.contains("INFO")));
            assert!(lines[0].contains("Mkdir /a"));
            assert!(lines[1].contains("Remove /b"));
            assert!(lines[2].contains("Rename /c ⇢ /d"));
        }
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.emit(&Event::new(Op::Remove, Path::new("/a")));
        sink.emit(&Event::new(Op::ReadDir, Path::new("/b")));

        assert_eq!(sink.lines(), vec!["\t⚡ Remove /a", "\t⚡ ReadDir /b"]);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.lines().is_empty());
    }
}
