//! Input discovery.
//!
//! Stage 1 of a prepare run: turn the command line's mix of files and
//! directories into an ordered list of candidates.
//!
//! ## Selection rules
//!
//! - A **file argument** is always included, whatever its type. Non-image
//!   files ride the normalizer's pass-through and are copied to the output
//!   unchanged — the caller asked for them by name.
//! - A **directory argument** is walked recursively and contributes only
//!   files with a recognized image extension. This keeps sidecar files
//!   (notes, exports, `.DS_Store`) out of the upload set.
//!
//! ## Ordering
//!
//! Arguments keep their given order; within a walked directory, entries are
//! sorted by file name. The candidate list is therefore deterministic for a
//! given invocation, and the report manifest lists entries in this order.
//!
//! ## Collisions
//!
//! Output files are named after their source's final path component, so two
//! candidates with the same filename would silently overwrite each other.
//! That is detected here and reported as an error before any work starts.

use crate::blob::{FALLBACK_MIME, is_image_extension, mime_for_path};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("input not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(
        "output name '{name}' would be written twice (from {} and {})",
        first.display(),
        second.display()
    )]
    NameCollision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// A file selected for preparation.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Where the bytes come from.
    pub source: PathBuf,
    /// Output filename: the source's final path component.
    pub name: String,
    pub byte_size: u64,
    /// Media type guessed from the extension.
    pub mime: String,
}

/// Discover candidates from a list of file and directory arguments.
pub fn scan(inputs: &[PathBuf]) -> Result<Vec<Candidate>, ScanError> {
    let mut candidates = Vec::new();

    for input in inputs {
        if !input.exists() {
            return Err(ScanError::NotFound(input.clone()));
        }
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
            {
                if entry.file_type().is_file() && is_image_extension(entry.path()) {
                    candidates.push(candidate_for(entry.path())?);
                }
            }
        } else {
            candidates.push(candidate_for(input)?);
        }
    }

    check_collisions(&candidates)?;
    Ok(candidates)
}

fn candidate_for(path: &Path) -> Result<Candidate, ScanError> {
    let metadata = std::fs::metadata(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime = mime_for_path(path).unwrap_or(FALLBACK_MIME).to_string();

    Ok(Candidate {
        source: path.to_path_buf(),
        name,
        byte_size: metadata.len(),
        mime,
    })
}

fn check_collisions(candidates: &[Candidate]) -> Result<(), ScanError> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for candidate in candidates {
        if let Some(first) = seen.insert(&candidate.name, &candidate.source)
            && first != candidate.source
        {
            return Err(ScanError::NameCollision {
                name: candidate.name.clone(),
                first: first.to_path_buf(),
                second: candidate.source.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path, size: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; size]).unwrap();
    }

    #[test]
    fn directory_walk_selects_only_image_extensions() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("b.png"), 10);
        touch(&tmp.path().join("a.jpg"), 20);
        touch(&tmp.path().join("notes.txt"), 5);
        touch(&tmp.path().join("nested/c.webp"), 30);

        let candidates = scan(&[tmp.path().to_path_buf()]).unwrap();
        let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.webp"]);
    }

    #[test]
    fn explicit_file_is_included_whatever_its_type() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        touch(&path, 42);

        let candidates = scan(&[path.clone()]).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "notes.txt");
        assert_eq!(candidates[0].mime, FALLBACK_MIME);
        assert_eq!(candidates[0].byte_size, 42);
    }

    #[test]
    fn candidate_carries_guessed_mime_and_size() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.JPG");
        touch(&path, 1024);

        let candidates = scan(&[path]).unwrap();
        assert_eq!(candidates[0].mime, "image/jpeg");
        assert_eq!(candidates[0].byte_size, 1024);
    }

    #[test]
    fn arguments_keep_their_order() {
        let tmp = TempDir::new().unwrap();
        let second = tmp.path().join("z-first.jpg");
        let first = tmp.path().join("a-second.jpg");
        touch(&second, 1);
        touch(&first, 1);

        let candidates = scan(&[second.clone(), first.clone()]).unwrap();
        assert_eq!(candidates[0].source, second);
        assert_eq!(candidates[1].source, first);
    }

    #[test]
    fn missing_input_errors() {
        let tmp = TempDir::new().unwrap();
        let result = scan(&[tmp.path().join("nope.jpg")]);
        assert!(matches!(result, Err(ScanError::NotFound(_))));
    }

    #[test]
    fn name_collision_across_directories_errors() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("one/photo.jpg"), 1);
        touch(&tmp.path().join("two/photo.jpg"), 1);

        let result = scan(&[tmp.path().join("one"), tmp.path().join("two")]);
        assert!(matches!(
            result,
            Err(ScanError::NameCollision { name, .. }) if name == "photo.jpg"
        ));
    }

    #[test]
    fn same_file_listed_twice_is_not_a_collision() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        touch(&path, 1);

        let candidates = scan(&[path.clone(), path]).unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn empty_input_list_yields_no_candidates() {
        let candidates = scan(&[]).unwrap();
        assert!(candidates.is_empty());
    }
}
