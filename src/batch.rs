//! # Batch Mode
//!
//! Resource projects usually generate several `*_temp.rc` scripts next to each other.
//! This module finds them in one directory and converts each into its final name
//! (the same file name with `_temp` dropped).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use log::{debug, error, warn};
use walkdir::WalkDir;
use crate::converter::{self, Conversion, ConvertError};

const TEMP_SUFFIX: &str = "_temp.rc";

/// Outcome of converting a whole directory.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub converted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, ConvertError)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Lists every `*_temp.rc` file directly inside `dir` (depth 1), paired with its destination.
///
/// The suffix match ignores case and symlinks are followed. Results are sorted by
/// source path. Fails if `dir` itself cannot be read or is not a directory;
/// unreadable entries inside it are logged and skipped.
pub fn discover_sources(dir: &Path) -> Result<Vec<Conversion>, ConvertError> {
    debug!("Scanning directory: {:?}", dir);
    let mut found = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(ConvertError::Scan { path: dir.to_path_buf(), source });
            }
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.depth() == 0 {
            if !entry.file_type().is_dir() {
                return Err(ConvertError::NotADirectory { path: dir.to_path_buf() });
            }
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if let Some(final_name) = strip_temp_suffix(&name) {
            let source = entry.path().to_path_buf();
            let destination = source.with_file_name(final_name);
            found.push(Conversion { source, destination });
        }
    }

    found.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(found)
}

/// `Strings_temp.rc` -> `Strings.rc`. Returns `None` for anything else, including a bare `_temp.rc`.
fn strip_temp_suffix(name: &str) -> Option<String> {
    let split = name.len().checked_sub(TEMP_SUFFIX.len())?;
    if split == 0 || !name.is_char_boundary(split) {
        return None;
    }
    let (stem, suffix) = name.split_at(split);
    if !suffix.eq_ignore_ascii_case(TEMP_SUFFIX) {
        return None;
    }
    // Keep the extension's original casing.
    Some(format!("{}{}", stem, &suffix["_temp".len()..]))
}

/// Converts every file [`discover_sources`] finds, continuing past failures.
///
/// Destinations are compared case-insensitively, as the resource compiler runs on
/// Windows file systems. When two sources map to the same destination (`A_temp.rc`
/// and `A_TEMP.rc`), the first in sorted order is converted and the rest fail
/// instead of overwriting it.
pub fn convert_all(dir: &Path) -> Result<BatchSummary, ConvertError> {
    let mut summary = BatchSummary::default();
    let jobs = discover_sources(dir)?;

    if jobs.is_empty() {
        warn!("No *{} files found in {:?}", TEMP_SUFFIX, dir);
    }

    let mut claimed: HashMap<String, PathBuf> = HashMap::new();
    for job in jobs {
        let key = job.destination.to_string_lossy().to_lowercase();
        let result = match claimed.get(&key) {
            Some(earlier) => Err(ConvertError::DestinationClash {
                path: job.source.clone(),
                earlier: earlier.clone(),
                destination: job.destination.clone(),
            }),
            None => {
                claimed.insert(key, job.source.clone());
                converter::convert_file(&job)
            }
        };

        match result {
            Ok(_) => summary.converted.push(job.destination),
            Err(e) => {
                error!("{}", e);
                summary.failed.push((job.source, e));
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_only_the_temp_suffix() {
        assert_eq!(strip_temp_suffix("DriveSizeStrings_temp.rc").as_deref(), Some("DriveSizeStrings.rc"));
        assert_eq!(strip_temp_suffix("Menu_TEMP.RC").as_deref(), Some("Menu.RC"));
        assert_eq!(strip_temp_suffix("_temp.rc"), None);
        assert_eq!(strip_temp_suffix("Strings.rc"), None);
        assert_eq!(strip_temp_suffix("Strings_temp.rc.bak"), None);
        assert_eq!(strip_temp_suffix("rc"), None);
    }

    #[test]
    fn discovers_temp_scripts_only_at_top_level() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("B_temp.rc"), "b").unwrap();
        std::fs::write(dir.path().join("A_temp.rc"), "a").unwrap();
        std::fs::write(dir.path().join("Final.rc"), "x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("C_temp.rc"), "c").unwrap();

        let jobs = discover_sources(dir.path()).unwrap();

        assert_eq!(
            jobs,
            vec![
                Conversion::new(dir.path().join("A_temp.rc"), dir.path().join("A.rc")),
                Conversion::new(dir.path().join("B_temp.rc"), dir.path().join("B.rc")),
            ]
        );
    }

    #[test]
    fn keeps_going_after_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Good_temp.rc"), "ok").unwrap();
        std::fs::write(dir.path().join("Bad_temp.rc"), [0xFFu8, 0x00]).unwrap();

        let summary = convert_all(dir.path()).unwrap();

        assert_eq!(summary.total(), 2);
        assert!(!summary.is_success());
        assert_eq!(summary.converted, vec![dir.path().join("Good.rc")]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, dir.path().join("Bad_temp.rc"));
        assert!(!dir.path().join("Bad.rc").exists());
        assert_eq!(
            std::fs::read(dir.path().join("Good.rc")).unwrap(),
            vec![0xFF, 0xFE, b'o', 0x00, b'k', 0x00]
        );
    }

    #[test]
    fn empty_directory_is_a_success() {
        let dir = tempfile::tempdir().unwrap();
        let summary = convert_all(dir.path()).unwrap();
        assert_eq!(summary.total(), 0);
        assert!(summary.is_success());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-here");

        let err = convert_all(&missing).unwrap_err();

        assert!(matches!(err, ConvertError::Scan { .. }), "{:?}", err);
        assert!(err.to_string().contains("not-here"));
    }

    #[test]
    fn file_in_place_of_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Strings_temp.rc");
        std::fs::write(&file, "x").unwrap();

        let err = discover_sources(&file).unwrap_err();

        assert!(matches!(err, ConvertError::NotADirectory { .. }), "{:?}", err);
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinked_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("generated.txt");
        std::fs::write(&real, "linked").unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("Linked_temp.rc")).unwrap();

        let jobs = discover_sources(dir.path()).unwrap();

        assert_eq!(
            jobs,
            vec![Conversion::new(dir.path().join("Linked_temp.rc"), dir.path().join("Linked.rc"))]
        );
    }

    #[test]
    fn clashing_destinations_are_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A_TEMP.rc"), "upper").unwrap();
        std::fs::write(dir.path().join("A_temp.rc"), "lower").unwrap();
        if discover_sources(dir.path()).unwrap().len() < 2 {
            // Case-insensitive file system: the second write replaced the first.
            return;
        }

        let summary = convert_all(dir.path()).unwrap();

        assert_eq!(summary.converted, vec![dir.path().join("A.rc")]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, dir.path().join("A_temp.rc"));
        assert!(matches!(summary.failed[0].1, ConvertError::DestinationClash { .. }));
        assert_eq!(
            std::fs::read(dir.path().join("A.rc")).unwrap(),
            vec![0xFF, 0xFE, b'u', 0x00, b'p', 0x00, b'p', 0x00, b'e', 0x00, b'r', 0x00]
        );
    }
}
