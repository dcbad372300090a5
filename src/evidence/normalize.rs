//! Text normalization for evidence and attribute-name matching.
//!
//! All keyword tests in the engine run over normalized text: lowercased,
//! accents folded to ASCII, whitespace collapsed. Matching stays hint-level
//! and approximate on purpose; transcripts are noisy and matrix authors
//! write attribute names with inconsistent accents.

/// Normalize text for matching: lowercase, fold accents, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lowered: String = text
        .chars()
        .flat_map(|c| c.to_lowercase())
        .map(fold_accent)
        .collect();

    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fold common Spanish accented characters to their ASCII base.
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        other => other,
    }
}

/// Key used to match attribute names case/accent-insensitively.
pub fn normalized_key(name: &str) -> String {
    normalize(name)
}

/// Check whether normalized `text` contains any of the (already normalized)
/// `phrases`. Empty phrases never match.
pub fn contains_any(text: &str, phrases: &[String]) -> bool {
    phrases
        .iter()
        .any(|p| !p.is_empty() && text.contains(p.as_str()))
}

/// True if the text contains any ASCII digit.
pub fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}
