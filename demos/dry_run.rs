use bitbucket_fs::{BitBucketFS, File, FileMode, Filesystem, InjectedError, OpenFlags};

fn main() {
    // silent mode: every operation succeeds and is printed to stdout,
    // nothing is read from or written to the host
    let fs = BitBucketFS::new();
    fs.remove("~/important.txt").unwrap();
    fs.rename("/etc/hosts", "/etc/hosts.bak").unwrap();
    fs.mkdir("/var/lib/demo", FileMode::from(0o755)).unwrap();
    println!("{}", fs.stat("/var/lib/demo").unwrap());

    // hybrid mode: only declared paths exist, every failure wraps the injected error
    let fs = BitBucketFS::hybrid(InjectedError::msg("bitbucket: operation refused"))
        .with_fake_directories(["/bitbucket", "/bitbucket/docs"])
        .with_fake_files(["/bitbucket/docs/report.pdf"]);

    // open a declared file and pretend to write into it
    let mut file = fs
        .open_file("/bitbucket/docs/report.pdf", OpenFlags::WRONLY, FileMode::ALL_RW_PERMS)
        .unwrap();
    file.write(b"nothing of this is kept").unwrap();
    println!("{file}");

    // syncing reports the injected error, nothing was persisted
    if let Err(err) = file.sync() {
        println!("sync: {err}");
    }

    // symbolic links are followed by `stat` and described by `lstat`
    fs.symlink("/bitbucket/docs/report.pdf", "/bitbucket/latest").unwrap();
    println!("{}", fs.stat("/bitbucket/latest").unwrap());
    println!("{}", fs.lstat("/bitbucket/latest").unwrap());

    // undeclared paths fail
    match fs.remove("/bitbucket/missing.txt") {
        Ok(()) => unreachable!(),
        Err(err) => println!("remove: {err} ({})", err.injected().unwrap()),
    }
}
