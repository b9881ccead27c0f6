use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::model::CoverData;

/// Compose a text-only `mailto:` draft URL referencing the cover's title and
/// author. No attachment and no network call; opening the URL is the
/// platform's mail-compose handoff.
pub fn mailto_draft(cover: &CoverData) -> String {
    let title = if cover.title.text.trim().is_empty() {
        "Untitled"
    } else {
        cover.title.text.trim()
    };

    let subject = format!("Check out my book cover: {title}");
    let body = if cover.author.text.trim().is_empty() {
        format!("I designed a cover for \"{title}\" with Coverforge.")
    } else {
        format!(
            "I designed a cover for \"{title}\" by {author} with Coverforge.",
            author = cover.author.text.trim()
        )
    };

    format!(
        "mailto:?subject={}&body={}",
        utf8_percent_encode(&subject, NON_ALPHANUMERIC),
        utf8_percent_encode(&body, NON_ALPHANUMERIC)
    )
}
