//! Fixed catalogs shared read-only by every session: the selectable societies,
//! the report question templates, and the predefined chat prompts.

/// Token replaced by the society name in every question template.
pub const PLACEHOLDER: &str = "society_name";

/// Header of the first report column.
pub const SOCIETY_COLUMN: &str = "Society Name";

/// Societies a report can be generated for, in dropdown order.
pub const SOCIETIES: [&str; 5] = [
    "FLASCO (Florida Society of Clinical Oncology)",
    "GASCO (Georgia Society of Clinical Oncology)",
    "ASCO (American Society of Clinical Oncology)",
    "ESMO (European Society for Medical Oncology)",
    "ASCOP (Asian Society for Clinical Oncology)",
];

/// Report questions in column order. Each contains [`PLACEHOLDER`] once.
pub const QUESTION_TEMPLATES: [&str; 10] = [
    "What is the membership count for society_name? Respond with count or number only.",
    "Does society_name encompasses community sites? Respond one word ('yes' or 'no') only.",
    "Is society_name influential on state or local policy? Respond one word ('yes' or 'no') only.",
    "Does society_name provide engagement opportunity with leadership? Respond one word ('yes' or 'no') only.",
    "Does society_name provide support for clinical trial recruitment? Respond one word ('yes' or 'no') only.",
    "Does society_name provide engagement opportunity with payors? Respond one word ('yes' or 'no') only.",
    "Does society_name include area experts on its board? Respond one word ('yes' or 'no') only.",
    "Is society_name involved in therapeutic research collaborations? Respond one word ('yes' or 'no') only.",
    "Does society_name include top therapeutic area experts on its board? Respond with one word ('yes' or 'no') only.",
    "Name the Region where the society_name is from? Just name the Region in word for the answer.",
];

/// One-click chat prompts offered above the chat input.
pub const PREDEFINED_PROMPTS: [&str; 6] = [
    "What are the top 5 or top 10 oncology societies in California actively supporting clinical trials and research initiatives?",
    "Which oncology society in California has the largest membership network and reach?",
    "Which Oncology Societies in California collaborate with pharmaceutical companies for drug development initiatives?",
    "List the Oncology Societies in California that offer leadership opportunities for healthcare professionals.",
    "Which Oncology Societies in California are most active in influencing state healthcare policies?",
    "Identify oncology societies in California that provide resources or support for community-based oncology practices.",
];

/// Substitute `society` for every placeholder occurrence in `template`.
pub fn render_question(template: &str, society: &str) -> String {
    template.replace(PLACEHOLDER, society)
}

/// Whether `name` is one of the selectable societies.
pub fn is_known_society(name: &str) -> bool {
    SOCIETIES.contains(&name)
}

/// Report column headers: the society column followed by the raw templates.
pub fn report_columns() -> Vec<String> {
    std::iter::once(SOCIETY_COLUMN)
        .chain(QUESTION_TEMPLATES)
        .map(str::to_string)
        .collect()
}
