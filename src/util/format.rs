use chrono::{DateTime, Utc};

/// Human-readable UTC timestamp used in embeds.
pub fn datetime(value: &DateTime<Utc>) -> String {
    value.format("%d %b %Y, %H:%M UTC").to_string()
}

/// Returns `"s"` unless `count` is exactly one.
pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Renders names as a dashed list, one per line.
pub fn dash_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
