use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Single code points only: joiners and variation selectors never match,
    // so a ZWJ sequence counts each pictograph separately and a flag counts
    // as its two regional indicator letters.
    static ref EMOJI: Regex = Regex::new(
        r"[\p{Extended_Pictographic}\p{Emoji_Modifier}\p{Regional_Indicator}]"
    )
    .unwrap();
    static ref MENTION: Regex = Regex::new(r"@([a-zA-Z0-9_]+)").unwrap();
}

pub fn emojis(text: &str) -> impl Iterator<Item = char> + '_ {
    EMOJI
        .find_iter(text)
        .filter_map(|m| m.as_str().chars().next())
}

/// Mentioned handles, without the leading `@`.
pub fn mentions(text: &str) -> impl Iterator<Item = &str> + '_ {
    MENTION
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
}
