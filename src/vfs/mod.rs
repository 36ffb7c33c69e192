mod bucket_file;
mod bucket_fs;
mod entry;
mod file_info;
mod mode;

pub use bucket_file::{BitBucketFile, Whence};
pub use bucket_fs::BitBucketFS;
pub use entry::{Entry, EntryType};
pub use file_info::{DEFAULT_GROUP, DEFAULT_USER, FileInfo};
pub use mode::{FileMode, OpenFlags};
