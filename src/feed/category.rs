use super::escape::Escaper;
use super::types::Category;

/// Renders `<category>` lines for an item, one per non-empty value.
///
/// Returns an empty string when there is nothing to render.
pub fn render_categories(category: Option<&Category>, escaper: &Escaper) -> String {
    let Some(category) = category else {
        return String::new();
    };

    category
        .values()
        .map(|value| format!("    <category>{}</category>", escaper.escape(value)))
        .collect::<Vec<_>>()
        .join("\n")
}
