use std::collections::HashMap;

/// Preferred order for selecting a value in a language map (most preferred
/// language first)
pub const PREFERRED_LANGUAGES: &[&str] = &[
    "en", "de", "fr", "pl", "it", "nl", "pt", "sp", "ru", "sv", "no", "fi", "ca", "ro", "cs", "hu",
    "sk", "da", "sl", "bg", "et", "hr", "el", "ga", "lv", "lt", "mt",
];

/// Find the most preferred language in a map with single string values.
/// Languages with empty values are skipped. Returns `None` if no preferred
/// language has a value.
pub fn most_preferred_language(language_map: &HashMap<String, String>) -> Option<&'static str> {
    if language_map.is_empty() {
        return None;
    }
    PREFERRED_LANGUAGES
        .iter()
        .find(|lang| {
            language_map
                .get(**lang)
                .is_some_and(|value| !value.is_empty())
        })
        .copied()
}

/// Find the most preferred language in a map with list values.
/// Languages with empty lists are skipped.
pub fn most_preferred_language_list(
    language_map: &HashMap<String, Vec<String>>,
) -> Option<&'static str> {
    if language_map.is_empty() {
        return None;
    }
    PREFERRED_LANGUAGES
        .iter()
        .find(|lang| {
            language_map
                .get(**lang)
                .is_some_and(|values| !values.is_empty())
        })
        .copied()
}
