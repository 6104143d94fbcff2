use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Find files recursively in a directory that match a predicate
pub fn find_files<P, F>(path: P, predicate: &F) -> io::Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    F: Fn(&Path) -> bool + ?Sized,
{
    let mut result = Vec::new();

    if !path.as_ref().exists() {
        return Ok(result);
    }

    if path.as_ref().is_file() {
        if predicate(path.as_ref()) {
            result.push(path.as_ref().to_path_buf());
        }
        return Ok(result);
    }

    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();

        if entry_path.is_file() {
            if predicate(&entry_path) {
                result.push(entry_path);
            }
        } else if entry_path.is_dir() {
            result.append(&mut find_files(&entry_path, predicate)?);
        }
    }

    Ok(result)
}

/// Newest modification time among `paths`; `None` for an empty list.
///
/// Every path must exist: a vanished source file is reported, not skipped.
pub fn latest_modification<I, P>(paths: I) -> io::Result<Option<SystemTime>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut latest: Option<SystemTime> = None;
    for path in paths {
        let modified = fs::metadata(path.as_ref())?.modified()?;
        latest = Some(match latest {
            Some(current) if current >= modified => current,
            _ => modified,
        });
    }
    Ok(latest)
}
