//! The single-page interface.
//!
//! Sections, top to bottom: predefined prompt buttons, the chat transcript
//! with its input, the society dropdown, the report table with the download
//! link, and the email form. All state lives on the server; the page keeps
//! only its session id in `sessionStorage`.

/// The complete self-contained page HTML.
///
/// ```rust,ignore
/// use pharmaq_ui::page::PAGE_HTML;
///
/// async fn ui_handler() -> axum::response::Html<&'static str> {
///     axum::response::Html(PAGE_HTML)
/// }
/// ```
pub const PAGE_HTML: &str = include_str!("../assets/page.html");
