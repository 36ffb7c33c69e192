use std::fmt;
use std::ops::BitOr;

/// Entry type and permission bits, in the spirit of `st_mode`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct FileMode(u32);

impl FileMode {
    pub const DIR: FileMode = FileMode(1 << 31);
    pub const SYMLINK: FileMode = FileMode(1 << 27);
    /// Mask of the permission bits.
    pub const PERM: FileMode = FileMode(0o777);

    pub const ALL_PERMS: FileMode = FileMode(0o777);
    pub const ALL_RW_PERMS: FileMode = FileMode(0o666);

    pub const fn from_bits(bits: u32) -> FileMode {
        FileMode(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, flag: FileMode) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub const fn is_dir(self) -> bool {
        self.contains(Self::DIR)
    }

    pub const fn is_symlink(self) -> bool {
        self.contains(Self::SYMLINK)
    }

    /// Permission bits only.
    pub const fn perm(self) -> FileMode {
        FileMode(self.0 & Self::PERM.0)
    }

    pub const fn without(self, flag: FileMode) -> FileMode {
        FileMode(self.0 & !flag.0)
    }
}

impl BitOr for FileMode {
    type Output = FileMode;

    fn bitor(self, rhs: FileMode) -> FileMode {
        FileMode(self.0 | rhs.0)
    }
}

impl From<u32> for FileMode {
    fn from(bits: u32) -> Self {
        FileMode(bits)
    }
}

/// Renders like `ls -l`: `drwxr-xr-x`, `Lrwxrwxrwx`, `-rw-rw-rw-`.
impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(11);
        if self.is_dir() {
            out.push('d');
        }
        if self.is_symlink() {
            out.push('L');
        }
        if out.is_empty() {
            out.push('-');
        }
        const RWX: [char; 3] = ['r', 'w', 'x'];
        for bit in (0..9).rev() {
            if self.0 & (1 << bit) != 0 {
                out.push(RWX[2 - bit % 3]);
            } else {
                out.push('-');
            }
        }
        f.write_str(&out)
    }
}

/// Flags given to `open_file`, using the Linux `open(2)` values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct OpenFlags(i32);

impl OpenFlags {
    pub const RDONLY: OpenFlags = OpenFlags(0o0);
    pub const WRONLY: OpenFlags = OpenFlags(0o1);
    pub const RDWR: OpenFlags = OpenFlags(0o2);
    pub const CREATE: OpenFlags = OpenFlags(0o100);
    pub const EXCL: OpenFlags = OpenFlags(0o200);
    pub const TRUNC: OpenFlags = OpenFlags(0o1000);
    pub const APPEND: OpenFlags = OpenFlags(0o2000);
    pub const SYNC: OpenFlags = OpenFlags(0o4010000);

    const ACCESS_MASK: i32 = 0o3;

    pub const fn from_bits(bits: i32) -> OpenFlags {
        OpenFlags(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub const fn contains(self, flag: OpenFlags) -> bool {
        self.0 & flag.0 == flag.0
    }

    /// Access mode only: one of `RDONLY`, `WRONLY`, `RDWR`.
    pub const fn primary(self) -> OpenFlags {
        OpenFlags(self.0 & Self::ACCESS_MASK)
    }

    /// Everything except the access mode.
    pub const fn extra(self) -> OpenFlags {
        OpenFlags(self.0 & !Self::ACCESS_MASK)
    }
}

impl BitOr for OpenFlags {
    type Output = OpenFlags;

    fn bitor(self, rhs: OpenFlags) -> OpenFlags {
        OpenFlags(self.0 | rhs.0)
    }
}

/// Short form such as `rw-ct`: access mode followed by one letter per extra flag
/// (a=append, c=create, e=excl, s=sync, t=trunc).
impl fmt::Display for OpenFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let primary = match self.primary() {
            OpenFlags::RDWR => "rw-",
            OpenFlags::RDONLY => "r--",
            OpenFlags::WRONLY => "-w-",
            _ => "???",
        };
        f.write_str(primary)?;

        let extra = self.extra();
        for (flag, letter) in [
            (OpenFlags::APPEND, 'a'),
            (OpenFlags::CREATE, 'c'),
            (OpenFlags::EXCL, 'e'),
            (OpenFlags::SYNC, 's'),
            (OpenFlags::TRUNC, 't'),
        ] {
            if extra.contains(flag) {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod file_mode {
        use super::*;

        #[test]
        fn test_display_file_mode() {
            assert_eq!(FileMode::ALL_RW_PERMS.to_string(), "-rw-rw-rw-");
            assert_eq!((FileMode::DIR | FileMode::from(0o755)).to_string(), "drwxr-xr-x");
            assert_eq!((FileMode::SYMLINK | FileMode::ALL_PERMS).to_string(), "Lrwxrwxrwx");
            assert_eq!(FileMode::from(0o640).to_string(), "-rw-r-----");
        }

        #[test]
        fn test_type_bits() {
            let mode = FileMode::DIR | FileMode::from(0o700);
            assert!(mode.is_dir());
            assert!(!mode.is_symlink());
            assert_eq!(mode.perm(), FileMode::from(0o700));
            assert_eq!(mode.without(FileMode::DIR), FileMode::from(0o700));
        }
    }

    mod open_flags {
        use super::*;

        #[test]
        fn test_display_open_flags() {
            assert_eq!(OpenFlags::RDONLY.to_string(), "r--");
            assert_eq!(OpenFlags::WRONLY.to_string(), "-w-");
            assert_eq!(
                (OpenFlags::RDWR | OpenFlags::CREATE | OpenFlags::TRUNC).to_string(),
                "rw-ct"
            );
            assert_eq!((OpenFlags::WRONLY | OpenFlags::APPEND).to_string(), "-w-a");
            assert_eq!(
                (OpenFlags::RDWR | OpenFlags::CREATE | OpenFlags::EXCL | OpenFlags::SYNC).to_string(),
                "rw-ces"
            );
        }

        #[test]
        fn test_invalid_access_mode() {
            assert_eq!(OpenFlags::from_bits(0o3).to_string(), "???");
        }

        #[test]
        fn test_primary_and_extra() {
            let flags = OpenFlags::RDWR | OpenFlags::CREATE;
            assert_eq!(flags.primary(), OpenFlags::RDWR);
            assert_eq!(flags.extra(), OpenFlags::CREATE);
            assert!(flags.contains(OpenFlags::CREATE));
            assert!(!OpenFlags::RDONLY.contains(OpenFlags::CREATE));
        }
    }
}
