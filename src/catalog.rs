//! Fixed language catalog.
//!
//! The catalog is compiled in, ordered canonically by display name, and
//! read-only after startup, so pagination over it is deterministic and
//! needs no synchronization.

/// One selectable language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Stable ISO 639 code used in callback tokens and sessions
    pub code: &'static str,
    /// English display name, also used as the translation hint
    pub name: &'static str,
}

/// Pseudo-code for "detect the source language automatically"
pub const AUTO_DETECT: &str = "auto";

/// All selectable languages, sorted by display name.
///
/// The sort order is part of the pagination contract: a page index
/// always refers to the same slice of this list.
pub const LANGUAGES: &[CatalogEntry] = &[
    CatalogEntry { code: "af", name: "Afrikaans" },
    CatalogEntry { code: "sq", name: "Albanian" },
    CatalogEntry { code: "am", name: "Amharic" },
    CatalogEntry { code: "ar", name: "Arabic" },
    CatalogEntry { code: "hy", name: "Armenian" },
    CatalogEntry { code: "az", name: "Azerbaijani" },
    CatalogEntry { code: "eu", name: "Basque" },
    CatalogEntry { code: "be", name: "Belarusian" },
    CatalogEntry { code: "bn", name: "Bengali" },
    CatalogEntry { code: "bs", name: "Bosnian" },
    CatalogEntry { code: "bg", name: "Bulgarian" },
    CatalogEntry { code: "my", name: "Burmese" },
    CatalogEntry { code: "ca", name: "Catalan" },
    CatalogEntry { code: "zh", name: "Chinese" },
    CatalogEntry { code: "hr", name: "Croatian" },
    CatalogEntry { code: "cs", name: "Czech" },
    CatalogEntry { code: "da", name: "Danish" },
    CatalogEntry { code: "nl", name: "Dutch" },
    CatalogEntry { code: "en", name: "English" },
    CatalogEntry { code: "et", name: "Estonian" },
    CatalogEntry { code: "fi", name: "Finnish" },
    CatalogEntry { code: "fr", name: "French" },
    CatalogEntry { code: "ka", name: "Georgian" },
    CatalogEntry { code: "de", name: "German" },
    CatalogEntry { code: "el", name: "Greek" },
    CatalogEntry { code: "gu", name: "Gujarati" },
    CatalogEntry { code: "ha", name: "Hausa" },
    CatalogEntry { code: "he", name: "Hebrew" },
    CatalogEntry { code: "hi", name: "Hindi" },
    CatalogEntry { code: "hu", name: "Hungarian" },
    CatalogEntry { code: "is", name: "Icelandic" },
    CatalogEntry { code: "id", name: "Indonesian" },
    CatalogEntry { code: "it", name: "Italian" },
    CatalogEntry { code: "ja", name: "Japanese" },
    CatalogEntry { code: "kn", name: "Kannada" },
    CatalogEntry { code: "kk", name: "Kazakh" },
    CatalogEntry { code: "km", name: "Khmer" },
    CatalogEntry { code: "ko", name: "Korean" },
    CatalogEntry { code: "lo", name: "Lao" },
    CatalogEntry { code: "lv", name: "Latvian" },
    CatalogEntry { code: "lt", name: "Lithuanian" },
    CatalogEntry { code: "mk", name: "Macedonian" },
    CatalogEntry { code: "ms", name: "Malay" },
    CatalogEntry { code: "ml", name: "Malayalam" },
    CatalogEntry { code: "mr", name: "Marathi" },
    CatalogEntry { code: "mn", name: "Mongolian" },
    CatalogEntry { code: "ne", name: "Nepali" },
    CatalogEntry { code: "no", name: "Norwegian" },
    CatalogEntry { code: "ps", name: "Pashto" },
    CatalogEntry { code: "fa", name: "Persian" },
    CatalogEntry { code: "pl", name: "Polish" },
    CatalogEntry { code: "pt", name: "Portuguese" },
    CatalogEntry { code: "pa", name: "Punjabi" },
    CatalogEntry { code: "ro", name: "Romanian" },
    CatalogEntry { code: "ru", name: "Russian" },
    CatalogEntry { code: "sr", name: "Serbian" },
    CatalogEntry { code: "si", name: "Sinhala" },
    CatalogEntry { code: "sk", name: "Slovak" },
    CatalogEntry { code: "sl", name: "Slovenian" },
    CatalogEntry { code: "so", name: "Somali" },
    CatalogEntry { code: "es", name: "Spanish" },
    CatalogEntry { code: "sw", name: "Swahili" },
    CatalogEntry { code: "sv", name: "Swedish" },
    CatalogEntry { code: "ta", name: "Tamil" },
    CatalogEntry { code: "te", name: "Telugu" },
    CatalogEntry { code: "th", name: "Thai" },
    CatalogEntry { code: "tr", name: "Turkish" },
    CatalogEntry { code: "uk", name: "Ukrainian" },
    CatalogEntry { code: "ur", name: "Urdu" },
    CatalogEntry { code: "uz", name: "Uzbek" },
    CatalogEntry { code: "vi", name: "Vietnamese" },
    CatalogEntry { code: "cy", name: "Welsh" },
    CatalogEntry { code: "yo", name: "Yoruba" },
    CatalogEntry { code: "zu", name: "Zulu" },
];

/// Look up a catalog entry by its code.
///
/// Returns `None` for unknown codes, including [`AUTO_DETECT`]; callers
/// that accept auto-detection check for it explicitly.
#[must_use]
pub fn find(code: &str) -> Option<&'static CatalogEntry> {
    LANGUAGES.iter().find(|e| e.code == code)
}

/// Human-readable name for a language code.
///
/// Unknown codes fall back to the code itself so stale session values
/// stay displayable instead of breaking a reply.
#[must_use]
pub fn display_name(code: &str) -> &str {
    if code == AUTO_DETECT {
        return "Auto-detect";
    }
    find(code).map_or(code, |e| e.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_sorted_by_display_name() {
        let names: Vec<&str> = LANGUAGES.iter().map(|e| e.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted, "catalog must stay sorted by display name");
    }

    #[test]
    fn test_catalog_codes_unique() {
        let codes: HashSet<&str> = LANGUAGES.iter().map(|e| e.code).collect();
        assert_eq!(codes.len(), LANGUAGES.len());
        assert!(!codes.contains(AUTO_DETECT));
    }

    #[test]
    fn test_find_and_display_name() {
        assert_eq!(find("fr").map(|e| e.name), Some("French"));
        assert_eq!(find("xx"), None);
        assert_eq!(display_name("am"), "Amharic");
        assert_eq!(display_name(AUTO_DETECT), "Auto-detect");
        // Unknown codes stay displayable
        assert_eq!(display_name("xx"), "xx");
    }
}
