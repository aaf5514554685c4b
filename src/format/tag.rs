#![forbid(unsafe_code)]

//! Source format registry

use std::fmt;

/// Source encoding selected with `--from`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    Tiny1,
    Tiny2,
    ProGuard,
    /// A directory of `*.mapping` files
    Enigma,
    /// A zip archive of `*.mapping` files
    EnigmaZip,
    /// A zip archive carrying `mappings/mappings.tiny`
    TinyZip,
    Autodetect,
}

impl FormatTag {
    pub const ALL: [FormatTag; 7] = [
        FormatTag::Tiny1,
        FormatTag::Tiny2,
        FormatTag::ProGuard,
        FormatTag::Enigma,
        FormatTag::EnigmaZip,
        FormatTag::TinyZip,
        FormatTag::Autodetect,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            FormatTag::Tiny1 => "tiny1",
            FormatTag::Tiny2 => "tiny2",
            FormatTag::ProGuard => "proguard",
            FormatTag::Enigma => "enigma",
            FormatTag::EnigmaZip => "enigma_zip",
            FormatTag::TinyZip => "tiny_zip",
            FormatTag::Autodetect => "autodetect",
        }
    }

    /// Whether the input for this format must be a directory
    pub const fn expects_directory(self) -> bool {
        matches!(self, FormatTag::Enigma)
    }

    /// Looks a tag up by id; unknown ids mean [`FormatTag::Autodetect`]
    pub fn by_id(id: &str) -> FormatTag {
        Self::ALL
            .into_iter()
            .find(|tag| tag.id() == id)
            .unwrap_or(FormatTag::Autodetect)
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_id_known() {
        assert_eq!(FormatTag::by_id("tiny2"), FormatTag::Tiny2);
        assert_eq!(FormatTag::by_id("enigma_zip"), FormatTag::EnigmaZip);
        assert_eq!(FormatTag::by_id("proguard"), FormatTag::ProGuard);
    }

    #[test]
    fn test_by_id_defaults_to_autodetect() {
        assert_eq!(FormatTag::by_id("nonsense"), FormatTag::Autodetect);
        assert_eq!(FormatTag::by_id(""), FormatTag::Autodetect);
        assert_eq!(FormatTag::by_id("TINY2"), FormatTag::Autodetect);
    }

    #[test]
    fn test_ids_round_trip() {
        for tag in FormatTag::ALL {
            assert_eq!(FormatTag::by_id(&tag.to_string()), tag);
        }
    }

    #[test]
    fn test_only_enigma_expects_directory() {
        let dirs: Vec<_> = FormatTag::ALL
            .into_iter()
            .filter(|t| t.expects_directory())
            .collect();
        assert_eq!(dirs, vec![FormatTag::Enigma]);
    }
}
