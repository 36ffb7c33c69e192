use std::path::{Component, Path, PathBuf};

/// Normalizes a caller supplied path before it is used as a store key.
///
/// * surrounding spaces and tabs are trimmed;
/// * the path is cleaned lexically (see [`normalize`]);
/// * a leading `~/` is expanded to the home directory of the current user.
pub fn clean_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let trimmed = match path.to_str() {
        Some(s) => PathBuf::from(s.trim_matches(&[' ', '\t'][..])),
        None => path.to_path_buf(), // not UTF-8, nothing to trim
    };
    expand_home(normalize(trimmed))
}

/// Lexically cleans `path`: `.` components are dropped, `..` removes the previous
/// component, repeated and trailing separators disappear.
/// `..` above the root of an absolute path is dropped, while leading `..` of a
/// relative path is kept. An empty result becomes `.`.
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();

    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

fn expand_home(path: PathBuf) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let rest = components.as_path();
            if rest.as_os_str().is_empty() {
                return path;
            }
            match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => path,
            }
        }
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize("/foo/bar"), Path::new("/foo/bar"));
        assert_eq!(normalize("/foo/././bar"), Path::new("/foo/bar"));
        assert_eq!(normalize("/foo/./../bar"), Path::new("/bar"));
        assert_eq!(normalize("/foo//bar/"), Path::new("/foo/bar"));
        assert_eq!(normalize("/../../etc"), Path::new("/etc"));
        assert_eq!(normalize("/.."), Path::new("/"));
        assert_eq!(normalize("foo/./../bar"), Path::new("bar"));
        assert_eq!(normalize("../foo"), Path::new("../foo"));
        assert_eq!(normalize("foo/../.."), Path::new(".."));
        assert_eq!(normalize(""), Path::new("."));
        assert_eq!(normalize("foo/.."), Path::new("."));
    }

    #[test]
    fn test_clean_path_trims_whitespace() {
        assert_eq!(clean_path("  /tmp/a.txt\t"), Path::new("/tmp/a.txt"));
        assert_eq!(clean_path("\t/tmp/dir/../b "), Path::new("/tmp/b"));
    }

    #[test]
    fn test_clean_path_expands_home() {
        let expanded = clean_path("~/docs/./note.txt");
        match dirs::home_dir() {
            Some(home) => assert_eq!(expanded, home.join("docs/note.txt")),
            None => assert_eq!(expanded, Path::new("~/docs/note.txt")),
        }
    }

    #[test]
    fn test_clean_path_lone_tilde_untouched() {
        assert_eq!(clean_path("~"), Path::new("~"));
        assert_eq!(clean_path("/~/x"), Path::new("/~/x"));
    }
}
