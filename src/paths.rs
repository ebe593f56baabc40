/// POSIX path helpers for site URLs and repository-relative paths
///
/// Output locations and URLs always use `/` separators no matter which
/// platform the site is built on, so these helpers work on plain strings
/// rather than [`std::path::Path`].
use std::path::{Component, Path, PathBuf};

/// Join URL segments the way POSIX `join` does
///
/// An absolute segment discards everything before it and an empty segment
/// leaves a trailing separator behind.
pub fn posix_join<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if segment.starts_with('/') {
            joined = segment.to_string();
        } else if i == 0 || joined.is_empty() || joined.ends_with('/') {
            joined.push_str(segment);
        } else {
            joined.push('/');
            joined.push_str(segment);
        }
    }
    joined
}

/// Everything before the last `/`, trailing separators stripped
pub fn url_dirname(path: &str) -> &str {
    let head = match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => return "",
    };
    if head.chars().all(|c| c == '/') {
        head
    } else {
        head.trim_end_matches('/')
    }
}

/// Final component of a `/` separated path
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Split a file name into stem and extension (with its dot)
///
/// Leading dots belong to the stem, so `.htaccess` has no extension.
pub fn split_ext(filename: &str) -> (&str, &str) {
    let name_start = filename.rfind('/').map(|i| i + 1).unwrap_or(0);
    let name = &filename[name_start..];
    let first_non_dot = match name.find(|c| c != '.') {
        Some(i) => i,
        None => return (filename, ""),
    };
    match name.rfind('.') {
        Some(dot) if dot > first_non_dot => {
            let split = name_start + dot;
            (&filename[..split], &filename[split..])
        }
        _ => (filename, ""),
    }
}

/// Extension of a tracked path without its dot, used as the reader format
pub fn format_of(tracked_path: &str) -> &str {
    let (_, ext) = split_ext(basename(tracked_path));
    ext.strip_prefix('.').unwrap_or(ext)
}

/// Lexically normalise a path, resolving `.` and `..` without touching disk
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        let cwd = std::env::current_dir().unwrap_or_default();
        normalize(&cwd.join(path))
    }
}

/// Path of `file` relative to `working_dir` with `/` separators
///
/// Returns `None` when the file lies outside the working directory.
/// Symlinked prefixes (for example a temp dir under `/var` on macOS) are
/// retried after canonicalisation.
pub fn repository_file_path(working_dir: &Path, file: &Path) -> Option<String> {
    let root = absolute(working_dir);
    let file = absolute(file);

    let relative = match file.strip_prefix(&root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => {
            let root = root.canonicalize().ok()?;
            let parent = file.parent()?.canonicalize().ok()?;
            let resolved = parent.join(file.file_name()?);
            resolved.strip_prefix(&root).ok()?.to_path_buf()
        }
    };

    if relative.as_os_str().is_empty() {
        return None;
    }

    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().replace('\\', "/"))
        .collect();
    Some(parts.join("/"))
}
