//! Builds catalog entries from a directory of exercise markdown files.
//!
//! Files are named `<position>_<id>.md` (for example `01_intro.md`); files
//! without a numeric prefix are appended after the numbered ones in name
//! order. The first `# ` heading names the exercise.

use std::fs;
use std::path::{Path, PathBuf};

use playground_core::model::{Exercise, ExerciseError, ExerciseId, MarkdownRef};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogDirError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid exercise file {file}: {source}")]
    Exercise {
        file: String,
        #[source]
        source: ExerciseError,
    },
}

/// Exercise discovered on disk together with its catalog position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub exercise: Exercise,
    pub position: u32,
}

/// Scan `dir` for `*.md` files and turn them into ordered catalog entries.
///
/// # Errors
///
/// Returns `CatalogDirError` if the directory or a file cannot be read, or if
/// a file yields an invalid exercise.
pub fn scan(dir: &Path) -> Result<Vec<CatalogEntry>, CatalogDirError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_err(dir))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort();

    let mut numbered = Vec::new();
    let mut unnumbered = Vec::new();
    for path in files {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
            continue;
        };
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let (prefix, id) = split_stem(stem);
        let text = fs::read_to_string(&path).map_err(io_err(path.as_path()))?;
        let name = title_from_markdown(&text).unwrap_or_else(|| id.replace(['_', '-'], " "));

        let exercise = Exercise::new(ExerciseId::new(id), name, MarkdownRef::new(&file_name))
            .map_err(|source| CatalogDirError::Exercise {
                file: file_name.clone(),
                source,
            })?;
        match prefix {
            Some(position) => numbered.push(CatalogEntry { exercise, position }),
            None => unnumbered.push(exercise),
        }
    }

    numbered.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.exercise.id().cmp(b.exercise.id()))
    });
    let mut next = numbered.last().map_or(0, |entry| entry.position.saturating_add(1));
    for exercise in unnumbered {
        numbered.push(CatalogEntry {
            exercise,
            position: next,
        });
        next = next.saturating_add(1);
    }

    Ok(numbered)
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> CatalogDirError {
    let path = path.to_path_buf();
    move |source| CatalogDirError::Io { path, source }
}

fn split_stem(stem: &str) -> (Option<u32>, &str) {
    if let Some((head, tail)) = stem.split_once('_') {
        if let Ok(position) = head.parse::<u32>() {
            if !tail.is_empty() {
                return (Some(position), tail);
            }
        }
    }
    (None, stem)
}

fn title_from_markdown(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_owned())
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_stem_reads_numeric_prefix() {
        assert_eq!(split_stem("01_intro"), (Some(1), "intro"));
        assert_eq!(split_stem("intro_basics"), (None, "intro_basics"));
        assert_eq!(split_stem("02_"), (None, "02_"));
    }

    #[test]
    fn title_uses_first_h1() {
        let text = "Some preface\n## Not this\n# Ownership\n# Later";
        assert_eq!(title_from_markdown(text).as_deref(), Some("Ownership"));
        assert_eq!(title_from_markdown("no headings"), None);
    }

    #[test]
    fn scan_orders_numbered_before_unnumbered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("02_traits.md"), "# Traits\n").unwrap();
        fs::write(dir.path().join("01_intro.md"), "# Intro\n").unwrap();
        fs::write(dir.path().join("bonus-round.md"), "no title").unwrap();
        fs::write(dir.path().join("notes.txt"), "# ignored").unwrap();

        let entries = scan(dir.path()).unwrap();
        let summary: Vec<(u32, &str, &str)> = entries
            .iter()
            .map(|e| (e.position, e.exercise.id().as_str(), e.exercise.name()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (1, "intro", "Intro"),
                (2, "traits", "Traits"),
                (3, "bonus-round", "bonus round"),
            ]
        );
        assert_eq!(entries[0].exercise.markdown().as_str(), "01_intro.md");
    }

    #[test]
    fn scan_missing_dir_is_io_error() {
        let err = scan(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, CatalogDirError::Io { .. }));
    }
}
