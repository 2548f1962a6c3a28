use crate::domain::model::FileSummary;
use crate::utils::error::{Result, SysKitError};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Compiled exclusion patterns, matched against both the file name and the
/// full path of every candidate.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<regex::Regex>,
}

impl ExcludeSet {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| glob_to_regex(p.as_ref()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let full = path.to_string_lossy();
        let name = path.file_name().map(|n| n.to_string_lossy());
        self.patterns.iter().any(|re| {
            re.is_match(&full) || name.as_deref().map_or(false, |n| re.is_match(n))
        })
    }
}

/// Convert a glob pattern to an anchored, case-insensitive regex.
/// `*` stops at path separators, `**` crosses them, `?` matches one character.
pub fn glob_to_regex(pattern: &str) -> regex::Regex {
    let mut regex_str = String::from("(?i)");
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        regex_str.push_str("(.*/)?");
                    } else {
                        regex_str.push_str(".*");
                    }
                } else {
                    regex_str.push_str("[^/]*");
                }
            }
            '?' => regex_str.push('.'),
            '/' => regex_str.push('/'),
            c if "\\.+()[]{}^$|".contains(c) => {
                regex_str.push('\\');
                regex_str.push(c);
            }
            c => regex_str.push(c),
        }
    }

    regex::Regex::new(&format!("^{regex_str}$"))
        .unwrap_or_else(|_| regex::Regex::new("$^").expect("empty-match regex"))
}

/// Create a directory (and parents) if it does not exist.
pub fn ensure_directory(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Copy a file, or a directory tree recursively. Returns the number of files
/// copied (excluded entries are skipped, not errors).
pub fn copy_path(source: &Path, destination: &Path, exclude: &ExcludeSet) -> Result<u64> {
    if !source.exists() {
        return Err(SysKitError::InvalidPathError {
            path: source.display().to_string(),
            reason: "source does not exist".to_string(),
        });
    }

    if source.is_dir() {
        ensure_directory(destination)?;
        let mut copied = 0;
        copy_dir_recursive(source, destination, exclude, &mut copied)?;
        return Ok(copied);
    }

    if exclude.matches(source) {
        return Ok(0);
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, destination)?;
    Ok(1)
}

fn copy_dir_recursive(
    source: &Path,
    destination: &Path,
    exclude: &ExcludeSet,
    copied: &mut u64,
) -> Result<()> {
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        if exclude.matches(&path) {
            continue;
        }
        let target = destination.join(entry.file_name());
        if path.is_dir() {
            fs::create_dir_all(&target)?;
            copy_dir_recursive(&path, &target, exclude, copied)?;
        } else {
            fs::copy(&path, &target)?;
            *copied += 1;
        }
    }
    Ok(())
}

/// Copy then remove the source.
pub fn move_path(source: &Path, destination: &Path, exclude: &ExcludeSet) -> Result<u64> {
    let copied = copy_path(source, destination, exclude)?;
    delete_path(source)?;
    Ok(copied)
}

/// Remove a file, symlink or directory tree. Missing paths are Ok.
pub fn delete_path(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Non-recursive file listing, sorted, with an optional glob filter on the
/// file name.
pub fn list_files(dir: &Path, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let matcher = pattern.map(glob_to_regex);
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(re) = &matcher {
            let name = entry.file_name();
            if !re.is_match(&name.to_string_lossy()) {
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

#[derive(Debug, Clone, Default)]
pub struct CleanupOptions {
    pub recursive: bool,
    pub exclude: ExcludeSet,
    /// Count matching files without deleting them.
    pub dry_run: bool,
}

/// Delete files whose modification time is older than `days` days.
/// Returns the number of files deleted (or that would be, in dry-run mode).
pub fn delete_old_files(dir: &Path, days: u64, options: &CleanupOptions) -> Result<u64> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let cutoff = SystemTime::now() - Duration::from_secs(days * 86_400);
    let candidates = if options.recursive {
        walk_files(dir)
    } else {
        non_recursive_files(dir)?
    };

    let mut count = 0;
    for path in candidates {
        if options.exclude.matches(&path) {
            continue;
        }
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };
        let Ok(mtime) = meta.modified() else {
            continue;
        };
        if mtime < cutoff {
            if !options.dry_run {
                // Best effort: a file vanishing mid-scan is not an error.
                let _ = fs::remove_file(&path);
            }
            count += 1;
        }
    }
    Ok(count)
}

/// Keep only the `keep` newest files (by mtime) matching `pattern` in `dir`,
/// delete the rest. Returns the number removed.
pub fn keep_recent_files(dir: &Path, keep: usize, pattern: &str) -> Result<u64> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut files: Vec<(PathBuf, SystemTime)> = list_files(dir, Some(pattern))?
        .into_iter()
        .filter_map(|path| {
            let mtime = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            Some((path, mtime))
        })
        .collect();
    files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (path, _) in files.into_iter().skip(keep) {
        let _ = fs::remove_file(&path);
        removed += 1;
    }
    Ok(removed)
}

/// Copy `source` over `destination`, then remove top-level entries of the
/// destination that no longer exist in the source.
pub fn mirror(source: &Path, destination: &Path, exclude: &ExcludeSet) -> Result<()> {
    copy_path(source, destination, exclude)?;

    for entry in fs::read_dir(destination)? {
        let entry = entry?;
        if !source.join(entry.file_name()).exists() {
            delete_path(&entry.path())?;
        }
    }
    Ok(())
}

/// Total size in bytes of all files under a directory.
pub fn dir_size(path: &Path) -> Result<u64> {
    if !path.is_dir() {
        return Ok(0);
    }
    Ok(walk_files(path)
        .into_iter()
        .filter_map(|p| fs::metadata(&p).ok())
        .map(|m| m.len())
        .sum())
}

/// Human-readable size, e.g. `12.40 MB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Buffered copy for large files. Returns bytes written.
pub fn stream_copy(source: &Path, destination: &Path) -> Result<u64> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut reader = BufReader::new(fs::File::open(source)?);
    let mut writer = BufWriter::new(fs::File::create(destination)?);
    let bytes = std::io::copy(&mut reader, &mut writer)?;
    Ok(bytes)
}

/// SHA-256 integrity check against a lowercase/uppercase hex digest.
/// A missing file is reported as a mismatch, not an error.
pub fn verify_hash(file: &Path, expected_hex: &str) -> Result<bool> {
    if !file.exists() {
        return Ok(false);
    }
    let mut hasher = Sha256::new();
    let mut reader = BufReader::new(fs::File::open(file)?);
    std::io::copy(&mut reader, &mut hasher)?;
    let digest: String = hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    Ok(digest.eq_ignore_ascii_case(expected_hex.trim()))
}

/// Per-file summary of a directory, optionally recursive.
pub fn inspect(dir: &Path, recursive: bool) -> Result<Vec<FileSummary>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let files = if recursive {
        walk_files(dir)
    } else {
        non_recursive_files(dir)?
    };

    let mut summaries = Vec::new();
    for path in files {
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };
        let modified: DateTime<Utc> = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        summaries.push(FileSummary {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: human_size(meta.len()),
            size_bytes: meta.len(),
            modified,
            path,
        });
    }
    summaries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(summaries)
}

/// Recursive file walk. Unreadable directories are skipped.
pub fn walk_files(dir: &Path) -> Vec<PathBuf> {
    let mut result = Vec::new();
    walk_recursive(dir, &mut result);
    result
}

fn walk_recursive(dir: &Path, result: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk_recursive(&path, result);
        } else {
            result.push(path);
        }
    }
}

fn non_recursive_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(1024), "1.00 KB");
        assert_eq!(human_size(1024 * 1024 * 13 / 10), "1.30 MB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn test_glob_to_regex_single_star_stops_at_separator() {
        let re = glob_to_regex("*.log");
        assert!(re.is_match("today.log"));
        assert!(re.is_match("TODAY.LOG"));
        assert!(!re.is_match("nested/today.log"));
    }

    #[test]
    fn test_glob_to_regex_double_star() {
        let re = glob_to_regex("**/*.tmp");
        assert!(re.is_match("a/b/c.tmp"));
        assert!(re.is_match("c.tmp"));
        assert!(!re.is_match("c.txt"));
    }

    #[test]
    fn test_exclude_set_matches_name_and_path() {
        let exclude = ExcludeSet::new(["*.bak", "cache"]);
        assert!(exclude.matches(Path::new("/data/old.bak")));
        assert!(exclude.matches(Path::new("/data/cache")));
        assert!(!exclude.matches(Path::new("/data/keep.txt")));
    }

    #[test]
    fn test_empty_exclude_set_matches_nothing() {
        let exclude = ExcludeSet::default();
        assert!(!exclude.matches(Path::new("anything")));
    }
}
