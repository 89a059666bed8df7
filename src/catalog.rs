//! Format catalog: selector expressions offered to clients and their labels

use crate::types::FormatOption;
use std::collections::HashMap;

/// Marker that turns a selector into an audio-extraction job
///
/// Selectors containing it get `--extract-audio --audio-format <fmt>` appended.
pub const AUDIO_EXTRACT_MARKER: &str = "bestaudio[ext=mp3]";

const BUILTIN_FORMATS: &[(&str, &str)] = &[
    (
        "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
        "MP4 (Best quality)",
    ),
    (
        "bestvideo[height<=1080][ext=mp4]+bestaudio[ext=m4a]/best[height<=1080][ext=mp4]/best[height<=1080]",
        "MP4 1080p",
    ),
    (
        "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/best[height<=720][ext=mp4]/best[height<=720]",
        "MP4 720p",
    ),
    (
        "bestvideo[height<=480][ext=mp4]+bestaudio[ext=m4a]/best[height<=480][ext=mp4]/best[height<=480]",
        "MP4 480p",
    ),
    (
        "bestvideo[height<=360][ext=mp4]+bestaudio[ext=m4a]/best[height<=360][ext=mp4]/best[height<=360]",
        "MP4 360p",
    ),
    ("bestaudio[ext=m4a]/bestaudio/best", "M4A (audio only)"),
    ("bestaudio[ext=mp3]/bestaudio", "MP3 (audio only)"),
];

/// Ordered, read-only table of format options
///
/// Built once at startup. Listing preserves insertion order; label lookup is
/// a hash lookup.
#[derive(Debug, Clone)]
pub struct FormatCatalog {
    options: Vec<FormatOption>,
    index: HashMap<String, usize>,
}

impl FormatCatalog {
    /// Build a catalog from `(selector, label)` pairs
    ///
    /// When a selector appears twice the first label wins.
    pub fn new<I, S, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, L)>,
        S: Into<String>,
        L: Into<String>,
    {
        let mut options = Vec::new();
        let mut index = HashMap::new();
        for (selector, label) in entries {
            let selector = selector.into();
            if index.contains_key(&selector) {
                continue;
            }
            index.insert(selector.clone(), options.len());
            options.push(FormatOption {
                selector,
                label: label.into(),
            });
        }
        Self { options, index }
    }

    /// The stock catalog offered to clients
    pub fn builtin() -> Self {
        Self::new(BUILTIN_FORMATS.iter().copied())
    }

    /// Display label for a selector; unknown selectors are their own label
    pub fn label_for(&self, selector: &str) -> String {
        self.get(selector)
            .map(|option| option.label.clone())
            .unwrap_or_else(|| selector.to_string())
    }

    /// Look up a catalog entry
    pub fn get(&self, selector: &str) -> Option<&FormatOption> {
        self.index.get(selector).map(|&i| &self.options[i])
    }

    /// All entries in catalog order
    pub fn options(&self) -> &[FormatOption] {
        &self.options
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the catalog has no entries
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Whether a selector asks for audio extraction
pub fn requests_audio_extraction(selector: &str) -> bool {
    selector.contains(AUDIO_EXTRACT_MARKER)
}
