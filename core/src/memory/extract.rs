//! Heuristic detection of "X is Y" style statements in user messages.
//!
//! Matching is ASCII case-insensitive so byte offsets in the lowered copy
//! line up with the original text. Only the key is normalized; the value is
//! stored as typed (trimmed), so "my name is Beau" stores `Beau`, not
//! `beau`. Names, tickers and passwords keep their meaning that way.

const SAVE_PREFIXES: &[&str] = &[
    "remember that ",
    "remember ",
    "keep in mind that ",
    "keep in mind ",
];

const SAVE_INTENT_PHRASES: &[&str] = &["remember", "keep in mind"];

const MIN_KEY_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFact {
    pub key: String,
    pub value: String,
}

impl ExtractedFact {
    /// The key as the user would say it.
    pub fn spoken_key(&self) -> String {
        self.key.replace('_', " ")
    }
}

/// True when the message explicitly asks the assistant to remember
/// something, anywhere in the text.
pub fn has_save_intent(message: &str) -> bool {
    let lowered = message.to_lowercase();
    SAVE_INTENT_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// Pulls a key/value pair out of `message`.
///
/// Only the first matching trigger prefix is removed. Delimiters are tried
/// in order `" is "`, `"="`, `"set … to …"`; the first kind present wins and
/// the text is split on its first occurrence only.
pub fn extract_fact(message: &str) -> Option<ExtractedFact> {
    let original = message.trim();
    let lowered = original.to_ascii_lowercase();

    let start = SAVE_PREFIXES
        .iter()
        .find(|prefix| lowered.starts_with(*prefix))
        .map_or(0, |prefix| prefix.len());
    let text = &original[start..];
    let lowered = &lowered[start..];

    let (key, value) = if let Some(idx) = lowered.find(" is ") {
        (&text[..idx], &text[idx + " is ".len()..])
    } else if let Some(idx) = lowered.find('=') {
        (&text[..idx], &text[idx + 1..])
    } else {
        split_set_to(text, lowered)?
    };

    Some(ExtractedFact {
        key: normalize_key(key)?,
        value: value.trim().to_string(),
    })
}

/// `set <key> to <value>`, with the verb either leading or mid-sentence.
/// The key is only the words between `set` and `to`: "please set my
/// timezone to UTC" keys on `my_timezone`, not `please_my_timezone`.
fn split_set_to<'a>(text: &'a str, lowered: &str) -> Option<(&'a str, &'a str)> {
    let key_start = if lowered.starts_with("set ") {
        "set ".len()
    } else {
        lowered.find(" set ")? + " set ".len()
    };
    let to = lowered[key_start..].find(" to ")? + key_start;
    Some((&text[key_start..to], &text[to + " to ".len()..]))
}

/// Trimmed, spaces to underscores, lowercased. `None` when the result is
/// shorter than two characters.
pub fn normalize_key(raw: &str) -> Option<String> {
    let key = raw.trim().replace(' ', "_").to_lowercase();
    (key.chars().count() >= MIN_KEY_CHARS).then_some(key)
}
