use crate::{BpmError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// Audio extensions stripped during filename normalization.
const AUDIO_EXTENSIONS: [&str; 4] = [".mp3", ".wav", ".aiff", ".flac"];

/// Index of track titles already present on disk.
///
/// Built once at session start from one or more directories and treated as
/// immutable for the run; [`BpmClient::refresh_inventory`](crate::BpmClient::refresh_inventory)
/// is the only way to re-scan.
///
/// Filenames normalize to titles by stripping a trailing audio extension and
/// taking the segment after the last artist/title separator, so
/// `"Artist - Song Title.mp3"` indexes as `"Song Title"`. Files this tool
/// downloaded previously carry an edition suffix in the title
/// (`"Song Title (Intro Dirty)"`), which is kept verbatim; duplicate checks
/// compare edition-qualified display titles.
#[derive(Debug, Clone)]
pub struct Inventory {
    titles: HashSet<String>,
    separator: String,
}

impl Inventory {
    /// Build an index from the entries of `paths`.
    ///
    /// Fails with [`BpmError::InvalidPath`] if any path does not exist or is
    /// not a directory. Scanning is non-recursive; entries that do not parse
    /// as `artist SEPARATOR title` are indexed under their whole
    /// extension-stripped name.
    pub fn build(paths: &[PathBuf], separator: &str) -> Result<Self> {
        let mut inventory = Self {
            titles: HashSet::new(),
            separator: separator.to_string(),
        };
        inventory.extend_from(paths)?;
        Ok(inventory)
    }

    /// An index over pre-normalized titles. Useful for embedders that track
    /// ownership somewhere other than a local directory.
    pub fn from_titles(titles: impl IntoIterator<Item = String>, separator: &str) -> Self {
        Self {
            titles: titles.into_iter().collect(),
            separator: separator.to_string(),
        }
    }

    /// Scan additional directories into the existing index.
    pub fn extend_from(&mut self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            if !path.is_dir() {
                return Err(BpmError::InvalidPath(path.clone()));
            }
            for entry in fs::read_dir(path)? {
                let entry = entry?;
                let name = entry.file_name();
                let title = Self::normalize(&name.to_string_lossy(), &self.separator);
                self.titles.insert(title);
            }
        }
        Ok(())
    }

    /// Normalize one filename to a track title.
    ///
    /// Idempotent and case-preserving: a value that is already a title comes
    /// back unchanged.
    pub fn normalize(filename: &str, separator: &str) -> String {
        let stem = AUDIO_EXTENSIONS
            .iter()
            .find_map(|ext| filename.strip_suffix(*ext))
            .unwrap_or(filename);
        stem.rsplit(separator)
            .next()
            .unwrap_or(stem)
            .trim()
            .to_string()
    }

    /// Exact, case-sensitive membership check. No side effects.
    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
