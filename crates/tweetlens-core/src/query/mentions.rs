//! q3: most mentioned users.

use super::extract;
use super::keyed::KeyExtractor;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Mentions;

impl KeyExtractor for Mentions {
    type Key = String;
    const LABEL: &'static str = "mentions";

    fn keys<'a>(self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        extract::mentions(text).map(str::to_owned)
    }
}
