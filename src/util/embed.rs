//! Embed size limits.
//!
//! Field names, values and the embed total are capped by the platform. Over-long text is cut
//! and ends with a visible placeholder so readers know content was dropped.

use crate::model::reply::Embed;

pub const NAME_LIMIT: usize = 256;
pub const VALUE_LIMIT: usize = 1024;
pub const TOTAL_LIMIT: usize = 6000;
pub const PLACEHOLDER: &str = "[...]";
/// Renders as an empty line; fields cannot have an empty value.
pub const EMPTY_VALUE: &str = "_ _";
pub const ZERO_WIDTH: &str = "\u{200b}";

/// Cuts `text` to at most `limit` characters, ending with the placeholder when cut.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let keep = limit.saturating_sub(PLACEHOLDER.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(PLACEHOLDER);
    out
}

/// Applies the per-field limits, then trims field values from the last field backwards until
/// the embed fits the total limit.
pub fn fit(mut embed: Embed) -> Embed {
    if let Some(title) = embed.title.take() {
        embed.title = Some(truncate(&title, NAME_LIMIT));
    }
    for field in &mut embed.fields {
        field.name = truncate(&field.name, NAME_LIMIT);
        field.value = truncate(&field.value, VALUE_LIMIT);
    }

    let mut index = embed.fields.len();
    while embed.char_len() > TOTAL_LIMIT && index > 0 {
        index -= 1;
        let excess = embed.char_len() - TOTAL_LIMIT;
        let field = &mut embed.fields[index];
        let current = field.value.chars().count();
        let target = current.saturating_sub(excess).max(PLACEHOLDER.len());
        field.value = truncate(&field.value, target);
    }

    embed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_short_text() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn cuts_long_text_with_placeholder() {
        let text = "a".repeat(30);
        let cut = truncate(&text, 10);

        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with(PLACEHOLDER));
    }

    #[test]
    fn fits_fields_to_value_limit() {
        let embed = Embed::new().field("Content:", "x".repeat(2000), false);
        let fitted = fit(embed);

        assert_eq!(fitted.fields[0].value.chars().count(), VALUE_LIMIT);
    }

    #[test]
    fn fits_total_limit() {
        let mut embed = Embed::new().title("Log: Message Edited");
        for i in 0..8 {
            embed = embed.field(format!("Field {}", i), "y".repeat(1024), false);
        }

        let fitted = fit(embed);

        assert!(fitted.char_len() <= TOTAL_LIMIT);
        assert!(fitted.fields.last().unwrap().value.ends_with(PLACEHOLDER));
    }
}
