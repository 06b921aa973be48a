use crate::error::TransferError;
use crate::types::{NamingPolicy, TransferKind, TransferTask};
use globset::{GlobBuilder, GlobMatcher};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Build one download task per listed key, preserving the listing order.
///
/// With `flatten`, path separators in the key are replaced with underscores
/// so every file lands in the working directory.
pub fn download_tasks(keys: &[String], flatten: bool) -> Vec<TransferTask> {
    info!("Creating download tasks for {} keys", keys.len());
    keys.iter()
        .map(|key| TransferTask {
            source: key.clone(),
            destination: if flatten {
                flatten_key(key)
            } else {
                key.clone()
            },
            kind: TransferKind::Download,
        })
        .collect()
}

/// Replace every `/` in an object key with `_`.
pub fn flatten_key(key: &str) -> String {
    key.replace('/', "_")
}

/// Build one upload task per file under `root` matching `pattern`.
///
/// Matches are sorted so enumeration order (and with it incremental naming)
/// is stable within a run. `*` does not cross `/`; patterns containing `/`
/// match files in subdirectories.
pub fn upload_tasks(
    pattern: &str,
    root: &Path,
    naming: NamingPolicy,
    kind: TransferKind,
) -> Result<Vec<TransferTask>, TransferError> {
    let matches = expand_pattern(pattern, root)?;
    info!("Pattern '{}' matched {} files", pattern, matches.len());
    Ok(matches
        .iter()
        .enumerate()
        .map(|(index, path)| TransferTask {
            source: path.to_string_lossy().into_owned(),
            destination: naming.destination(index, path),
            kind,
        })
        .collect())
}

fn expand_pattern(pattern: &str, root: &Path) -> Result<Vec<PathBuf>, TransferError> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher();

    let mut matches = Vec::new();
    collect_matches(root, root, &matcher, &mut matches)?;
    matches.sort();
    Ok(matches)
}

fn collect_matches(
    root: &Path,
    dir: &Path,
    matcher: &GlobMatcher,
    out: &mut Vec<PathBuf>,
) -> Result<(), TransferError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        // never follow symlinks; a cycle under the working directory must
        // not stall enumeration
        if file_type.is_symlink() {
            continue;
        }
        let path = entry.path();
        if file_type.is_dir() {
            collect_matches(root, &path, matcher, out)?;
        } else {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            if matcher.is_match(relative) {
                debug!("Matched {}", relative.display());
                out.push(relative.to_path_buf());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn keys(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn flattened_key_contains_no_separator() {
        let flat = flatten_key("ARPEGE/v2/2024-01-01/00.grib2");
        assert_eq!(flat, "ARPEGE_v2_2024-01-01_00.grib2");
        assert!(!flat.contains('/'));
    }

    #[test]
    fn one_task_per_key_in_listing_order() {
        let listed = keys(&[
            "ARPEGE/v2/2024-01-01/00.grib2",
            "ARPEGE/v2/2024-01-01/01.grib2",
        ]);
        let tasks = download_tasks(&listed, false);
        assert_eq!(tasks.len(), 2);
        for (task, key) in tasks.iter().zip(&listed) {
            assert_eq!(&task.source, key);
            assert_eq!(&task.destination, key);
            assert_eq!(task.kind, TransferKind::Download);
        }
    }

    #[test]
    fn flatten_applies_to_destinations_only() {
        let listed = keys(&["ARPEGE/v2/2024-01-01/00.grib2"]);
        let tasks = download_tasks(&listed, true);
        assert_eq!(tasks[0].source, "ARPEGE/v2/2024-01-01/00.grib2");
        assert_eq!(tasks[0].destination, "ARPEGE_v2_2024-01-01_00.grib2");
    }

    #[test]
    fn empty_listing_yields_no_tasks() {
        assert!(download_tasks(&[], true).is_empty());
    }

    #[test]
    fn glob_matches_only_top_level_by_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.grib2"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.grib2"), b"x").unwrap();

        let tasks = upload_tasks(
            "*.grib2",
            dir.path(),
            NamingPolicy::Original,
            TransferKind::UploadBucket,
        )
        .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].source, "a.grib2");
        assert_eq!(tasks[0].destination, "a.grib2");
    }

    #[test]
    fn glob_with_separator_matches_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.grib2"), b"x").unwrap();

        let tasks = upload_tasks(
            "sub/*.grib2",
            dir.path(),
            NamingPolicy::Original,
            TransferKind::UploadWebdav,
        )
        .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].source, "sub/b.grib2");
        assert_eq!(tasks[0].destination, "b.grib2");
        assert_eq!(tasks[0].kind, TransferKind::UploadWebdav);
    }

    #[test]
    fn incremental_names_follow_enumeration_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.grib2", "b.grib2", "c.grib2"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let tasks = upload_tasks(
            "*.grib2",
            dir.path(),
            NamingPolicy::Incremental,
            TransferKind::UploadBucket,
        )
        .unwrap();
        let destinations: Vec<_> = tasks.iter().map(|t| t.destination.as_str()).collect();
        assert_eq!(destinations, ["0.grib2", "1.grib2", "2.grib2"]);
        let sources: Vec<_> = tasks.iter().map(|t| t.source.as_str()).collect();
        assert_eq!(sources, ["a.grib2", "b.grib2", "c.grib2"]);
    }

    #[test]
    fn no_matches_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = upload_tasks(
            "*.grib2",
            dir.path(),
            NamingPolicy::Incremental,
            TransferKind::UploadBucket,
        )
        .unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn symlink_cycles_do_not_stall_enumeration() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.grib2"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let tasks = upload_tasks(
            "*.grib2",
            dir.path(),
            NamingPolicy::Original,
            TransferKind::UploadBucket,
        )
        .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].source, "a.grib2");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = upload_tasks(
            "[",
            dir.path(),
            NamingPolicy::Original,
            TransferKind::UploadBucket,
        );
        assert!(matches!(result, Err(TransferError::Pattern(_))));
    }
}
