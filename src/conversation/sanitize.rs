//! Markdown marker stripping for model replies

/// Markers removed from completions, in removal order
const MARKERS: [&str; 4] = ["**", "##", "`", "*"];

/// Remove every `**`, `##`, `` ` `` and `*` from `raw`, in that order.
///
/// Not a Markdown parser: literal asterisks and backticks in content go too.
/// Nothing else is touched, whitespace included.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    MARKERS
        .iter()
        .fold(raw.to_string(), |text, marker| text.replace(marker, ""))
}
