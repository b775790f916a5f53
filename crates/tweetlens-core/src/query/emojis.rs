//! q2: most used emojis.

use super::extract;
use super::keyed::KeyExtractor;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Emojis;

impl KeyExtractor for Emojis {
    type Key = char;
    const LABEL: &'static str = "emojis";

    fn keys<'a>(self, text: &'a str) -> impl Iterator<Item = char> + 'a {
        extract::emojis(text)
    }
}
