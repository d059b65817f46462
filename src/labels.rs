use std::collections::BTreeMap;

/// Built-in display labels for the attribute tags the Cinema City API emits.
const DEFAULT_ATTRIBUTE_LABELS: &[(&str, &str)] = &[
    ("2d", "2D"),
    ("3d", "3D"),
    ("4dx", "4DX"),
    ("imax", "IMAX"),
    ("screenx", "ScreenX"),
    ("vip", "VIP"),
    ("dolby-atmos", "Dolby Atmos"),
    ("dubbed", "Dubbed"),
    ("subbed", "Subtitled"),
    ("dub-pl", "Dubbing: Polish"),
    ("dub-en", "Dubbing: English"),
    ("sub-pl", "Subtitles: Polish"),
    ("sub-en", "Subtitles: English"),
    ("original-lang-en-us", "Original language: English"),
    ("original-lang-pl", "Original language: Polish"),
    ("first-screening", "Premiere"),
    ("for-kids", "For kids"),
];

/// Immutable key -> label lookup. Keys without an entry map to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    entries: BTreeMap<String, String>,
}

impl LabelTable {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// The attribute table with built-in defaults.
    pub fn attribute_defaults() -> Self {
        Self::new(
            DEFAULT_ATTRIBUTE_LABELS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    /// Returns a new table where `overrides` win over the current entries.
    pub fn with_overrides(&self, overrides: &BTreeMap<String, String>) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Label for `key`, or `key` itself when the table has no entry.
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
