use crate::errors::MergeError;
use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Office lock files left next to an open workbook.
const LOCK_FILE_PREFIX: &str = "~$";

#[derive(Debug, Clone)]
pub struct TemplateCandidate {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid template pattern '{pattern}'"))?;
    Ok(glob.compile_matcher())
}

/// Files directly inside `dir` whose name matches `pattern`, newest first.
pub fn template_candidates(dir: &Path, pattern: &str) -> Result<Vec<TemplateCandidate>> {
    let matcher = compile_pattern(pattern)?;
    if !dir.is_dir() {
        return Err(MergeError::TemplateNotFound {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        }
        .into());
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("failed to scan '{}'", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with(LOCK_FILE_PREFIX) || !matcher.is_match(entry.file_name()) {
            continue;
        }
        out.push(TemplateCandidate {
            path: entry.path().to_path_buf(),
            modified: entry.metadata().ok().and_then(|meta| meta.modified().ok()),
        });
    }

    out.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
    });
    Ok(out)
}

/// Pick the template for a dataset from `dir` by file-name pattern.
pub fn locate_template(dir: &Path, pattern: &str) -> Result<PathBuf> {
    let candidates = template_candidates(dir, pattern)?;
    if candidates.len() > 1 {
        tracing::debug!(
            pattern,
            matches = candidates.len(),
            "several templates match; using the most recently modified"
        );
    }
    candidates
        .into_iter()
        .next()
        .map(|candidate| candidate.path)
        .ok_or_else(|| {
            MergeError::TemplateNotFound {
                dir: dir.to_path_buf(),
                pattern: pattern.to_string(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn matches_case_insensitively_and_ignores_lock_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "~$Profile Data Template.xlsx");
        let wanted = touch(dir.path(), "profile data TEMPLATE.xlsx");
        touch(dir.path(), "Audit Template.xlsx");

        let found = locate_template(dir.path(), "*Profile*Template*.xlsx").unwrap();
        assert_eq!(found, wanted);
    }

    #[test]
    fn does_not_descend_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("old")).unwrap();
        touch(&dir.path().join("old"), "Audit Template.xlsx");

        let err = locate_template(dir.path(), "*Audit*Template*.xlsx").unwrap_err();
        assert_matches!(
            err.downcast_ref::<MergeError>(),
            Some(MergeError::TemplateNotFound { .. })
        );
    }

    #[test]
    fn missing_directory_is_template_not_found() {
        let err = locate_template(Path::new("/nonexistent/templates"), "*.xlsx").unwrap_err();
        assert_matches!(
            err.downcast_ref::<MergeError>(),
            Some(MergeError::TemplateNotFound { .. })
        );
    }
}
