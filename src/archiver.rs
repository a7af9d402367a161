//! Default model executor: copies every source of a model into
//! `<target>/<trigger>/`.

use crate::model::Model;
use crate::outcome::RunLog;
use crate::path::expand_path;
use crate::runner::Perform;
use crate::trigger::TriggerPattern;
use anyhow::{Context, anyhow, bail};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Default, Clone, Copy)]
pub struct Archiver;

impl Perform for Archiver {
    fn perform(&self, model: &Model, log: &mut RunLog) {
        if model.dsl.target.is_empty() {
            log.error(format!("Model {model} has no target"));
            return;
        }
        let dest = model.archive_dir();
        if dest.exists() && !dest.is_dir() {
            log.error(format!(
                "Cannot back up into '{}': it exists and is not a directory",
                dest.display()
            ));
            return;
        }
        if let Err(e) = fs::create_dir_all(&dest) {
            log.error(format!("Failed to create '{}': {e}", dest.display()));
            return;
        }

        let ignore: Vec<TriggerPattern> = model
            .dsl
            .ignore
            .iter()
            .flatten()
            .map(|p| TriggerPattern::parse(p))
            .collect();

        let mut copied = 0;
        for source in &model.dsl.sources {
            let src = expand_path(source);
            if !src.exists() {
                log.warn(format!("Source '{}' does not exist, skipped", src.display()));
                continue;
            }
            if let Err(e) = copy_source(&src, &dest, &ignore, &mut copied) {
                log.error(format!("Failed to back up '{}': {e:#}", src.display()));
            }
        }
        log.info(format!(
            "Model {model} finished: {copied} file(s) copied to '{}'",
            dest.display()
        ));
    }
}

fn is_ignored(path: &Path, ignore: &[TriggerPattern]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy();
    ignore.iter().any(|p| p.matches(&name))
}

/// Copies a file or a directory tree into `dest`, adding every file written
/// to `copied` even when a later entry fails.
///
/// A `dest` nested inside `src` is left out of the walk; a `src` nested inside
/// `dest` is refused.
fn copy_source(
    src: &Path,
    dest: &Path,
    ignore: &[TriggerPattern],
    copied: &mut usize,
) -> anyhow::Result<()> {
    if src.is_file() {
        if is_ignored(src, ignore) {
            tracing::debug!(path = %src.display(), "ignored");
            return Ok(());
        }
        let name = src
            .file_name()
            .ok_or_else(|| anyhow!("'{}' has no file name", src.display()))?;
        fs::copy(src, dest.join(name))
            .with_context(|| format!("Failed to copy '{}'", src.display()))?;
        *copied += 1;
        return Ok(());
    }

    let skip = nested_target(src, dest)?;
    let prefix = src.parent().unwrap_or_else(|| Path::new(""));
    let walker = WalkDir::new(src)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || (!is_ignored(entry.path(), ignore) && skip.as_deref() != Some(entry.path()))
        });
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        let relative = path.strip_prefix(prefix)?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create '{}'", target.display()))?;
        } else if entry.file_type().is_file() {
            fs::copy(path, &target)
                .with_context(|| format!("Failed to copy '{}'", path.display()))?;
            *copied += 1;
        }
    }
    Ok(())
}

/// Where `dest` sits inside the walk of `src`, if it does.
fn nested_target(src: &Path, dest: &Path) -> anyhow::Result<Option<PathBuf>> {
    let real_src = fs::canonicalize(src)
        .with_context(|| format!("Failed to resolve '{}'", src.display()))?;
    let real_dest = fs::canonicalize(dest)
        .with_context(|| format!("Failed to resolve '{}'", dest.display()))?;
    if real_src.starts_with(&real_dest) {
        bail!(
            "'{}' is inside the archive directory '{}'",
            src.display(),
            dest.display()
        );
    }
    Ok(real_dest
        .strip_prefix(&real_src)
        .ok()
        .map(|inner| src.join(inner)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelDsl;
    use tempfile::tempdir;

    fn model(sources: Vec<String>, target: &Path, ignore: Option<Vec<String>>) -> Model {
        Model::new("docs", "Documents").with_dsl(ModelDsl {
            sources,
            target: target.to_string_lossy().into_owned(),
            ignore,
        })
    }

    #[test]
    fn test_copies_file_and_directory() {
        let src = tempdir().unwrap();
        let file = src.path().join("notes.txt");
        fs::write(&file, "hello").unwrap();
        let dir = src.path().join("photos");
        fs::create_dir_all(dir.join("2024")).unwrap();
        fs::write(dir.join("2024").join("a.jpg"), "jpg").unwrap();
        fs::write(dir.join("b.tmp"), "tmp").unwrap();

        let target = tempdir().unwrap();
        let model = model(
            vec![
                file.to_string_lossy().into_owned(),
                dir.to_string_lossy().into_owned(),
            ],
            target.path(),
            Some(vec!["*.tmp".into()]),
        );

        let mut log = RunLog::new();
        Archiver.perform(&model, &mut log);
        let outcome = log.take_outcome();
        assert!(outcome.is_clean());

        let archive = target.path().join("docs");
        assert_eq!(fs::read_to_string(archive.join("notes.txt")).unwrap(), "hello");
        assert!(archive.join("photos").join("2024").join("a.jpg").exists());
        assert!(!archive.join("photos").join("b.tmp").exists());
    }

    #[test]
    fn test_missing_source_is_a_warning() {
        let src = tempdir().unwrap();
        let file = src.path().join("present.txt");
        fs::write(&file, "x").unwrap();
        let target = tempdir().unwrap();
        let model = model(
            vec![
                src.path().join("absent").to_string_lossy().into_owned(),
                file.to_string_lossy().into_owned(),
            ],
            target.path(),
            None,
        );

        let mut log = RunLog::new();
        Archiver.perform(&model, &mut log);
        assert!(log.has_warnings());
        assert!(!log.has_errors());
        assert!(target.path().join("docs").join("present.txt").exists());
    }

    #[test]
    fn test_target_is_a_file_is_an_error() {
        let target = tempdir().unwrap();
        fs::write(target.path().join("docs"), "not a dir").unwrap();
        let model = model(vec![], target.path(), None);

        let mut log = RunLog::new();
        Archiver.perform(&model, &mut log);
        assert!(log.has_errors());
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let model = Model::new("docs", "Documents");
        let mut log = RunLog::new();
        Archiver.perform(&model, &mut log);
        assert!(log.has_errors());
    }

    #[test]
    fn test_target_inside_source_is_skipped() {
        let root = tempdir().unwrap();
        let data = root.path().join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("f.txt"), "f").unwrap();
        let model = model(
            vec![data.to_string_lossy().into_owned()],
            &data.join("out"),
            None,
        );

        let mut log = RunLog::new();
        Archiver.perform(&model, &mut log);
        assert!(log.take_outcome().is_clean());

        let archive = data.join("out").join("docs").join("data");
        assert_eq!(fs::read_to_string(archive.join("f.txt")).unwrap(), "f");
        assert!(!archive.join("out").join("docs").exists());
    }

    #[test]
    fn test_source_inside_target_is_an_error() {
        let target = tempdir().unwrap();
        let inner = target.path().join("docs").join("inner");
        fs::create_dir_all(&inner).unwrap();
        let model = model(
            vec![inner.to_string_lossy().into_owned()],
            target.path(),
            None,
        );

        let mut log = RunLog::new();
        Archiver.perform(&model, &mut log);
        assert!(log.has_errors());
    }

    #[test]
    fn test_partial_failure_keeps_copied_count() {
        let src = tempdir().unwrap();
        let data = src.path().join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("a.txt"), "a").unwrap();
        fs::write(data.join("b.txt"), "b").unwrap();
        let target = tempdir().unwrap();
        // A directory where b.txt should be copied.
        fs::create_dir_all(target.path().join("docs").join("data").join("b.txt")).unwrap();
        let model = model(vec![data.to_string_lossy().into_owned()], target.path(), None);

        let mut log = RunLog::new();
        Archiver.perform(&model, &mut log);
        assert!(log.has_errors());
        let summary = log.entries().last().unwrap();
        assert!(summary.message.contains("1 file(s) copied"), "{summary}");
    }
}
