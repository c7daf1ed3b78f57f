//! Inventory of an existing local mirror

use anyhow::Result;
use std::path::Path;
use walkdir::WalkDir;

use crate::materializer::PGN_FOLDER;
use crate::pgn::GAME_FILE_EXTENSION;

#[derive(Debug, Default)]
pub struct MirrorStatus {
    pub game_files: usize,
    /// Persisted months, sorted (`YYYY-MM`)
    pub months: Vec<String>,
}

pub fn scan_mirror(root: &Path) -> Result<MirrorStatus> {
    let mut status = MirrorStatus::default();
    if !root.exists() {
        return Ok(status);
    }

    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), GAME_FILE_EXTENSION) {
            status.game_files += 1;
        }
    }

    let pgn_dir = root.join(PGN_FOLDER);
    if pgn_dir.is_dir() {
        for entry in WalkDir::new(&pgn_dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file() && has_extension(entry.path(), "pgn") {
                if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                    status.months.push(stem.to_string());
                }
            }
        }
    }
    status.months.sort();

    Ok(status)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}
