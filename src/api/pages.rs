// =============================================================================
// HTML pages — dashboard shell plus the static About / Contact content
// =============================================================================

use crate::types::Indicator;

const INDEX_TEMPLATE: &str = include_str!("../../assets/index.html");
const ABOUT_BODY: &str = include_str!("../../assets/about.html");
const CONTACT_BODY: &str = include_str!("../../assets/contact.html");
const FOOTER: &str = include_str!("../../assets/footer.html");

const OPTIONS_SLOT: &str = "{{INDICATOR_OPTIONS}}";

/// Dashboard page with `defaults` preselected in the indicator list.
pub fn index(defaults: &[Indicator]) -> String {
    let options: Vec<String> = Indicator::ALL
        .iter()
        .map(|indicator| {
            let selected = if defaults.contains(indicator) { " selected" } else { "" };
            format!(r#"        <option value="{indicator}"{selected}>{indicator}</option>"#)
        })
        .collect();
    INDEX_TEMPLATE.replace(OPTIONS_SLOT, &options.join("\n"))
}

pub fn about() -> String {
    format!("{ABOUT_BODY}\n{FOOTER}")
}

pub fn contact() -> String {
    format!("{CONTACT_BODY}\n{FOOTER}")
}
