use std::fmt;

const QUOTE_CHARS: &[char] = &[
    '"', '\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '\u{201E}', '\u{201F}',
    '\u{00AB}', '\u{00BB}', '\u{FF02}', '\u{FF07}',
];

pub fn normalize_key(label: &str) -> String {
    label
        .chars()
        .filter(|ch| !QUOTE_CHARS.contains(ch))
        .collect::<String>()
        .trim()
        .to_string()
}

/// A decision-store key. Only constructible through [`normalize_key`], so
/// every read and write goes through the same normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn from_label(label: &str) -> Self {
        Self(normalize_key(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
