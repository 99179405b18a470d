//! HTML rendering of the report table and the email letter around it.
//! Output is deterministic: the same table renders to identical bytes.

use pharmaq_core::types::ReportTable;

const EMAIL_STYLE: &str = r#"
        .dataframe {
            font-family: Arial, sans-serif;
            border-collapse: collapse;
            width: 100%;
        }
        .dataframe td, .dataframe th {
            border: 1px solid #ddd;
            padding: 8px;
        }
        .dataframe tr:nth-child(even) {
            background-color: #f2f2f2;
        }
        .dataframe th {
            padding-top: 12px;
            padding-bottom: 12px;
            text-align: left;
            background-color: #4CAF50;
            color: white;
        }
"#;

/// Render `table` as a bordered HTML table with a centered header row.
pub fn render_table(table: &ReportTable) -> String {
    let mut w = Html::new();
    w.push("<table border=\"1\" class=\"dataframe\">\n");
    w.push("  <thead>\n    <tr style=\"text-align: center;\">\n");
    for column in table.columns() {
        w.push("      <th>");
        w.push(esc(column));
        w.push("</th>\n");
    }
    w.push("    </tr>\n  </thead>\n  <tbody>\n");
    for row in table.rows() {
        w.push("    <tr>\n");
        for cell in row.cells() {
            w.push("      <td>");
            w.push(esc(cell));
            w.push("</td>\n");
        }
        w.push("    </tr>\n");
    }
    w.push("  </tbody>\n</table>");
    w.finish()
}

/// Wrap the rendered table in the fixed email letter.
pub fn render_email_body(table: &ReportTable) -> String {
    let mut w = Html::new();
    w.push("<html>\n<head>\n<style>");
    w.push(EMAIL_STYLE);
    w.push("</style>\n</head>\n<body>\n");
    w.push("<p>Dear Recipient,</p>\n");
    w.push("<p>Find the attached consolidated report below:</p>\n");
    w.push(render_table(table));
    w.push("\n<p>Best regards,<br>Pharma Society Insights Team</p>\n");
    w.push("</body>\n</html>\n");
    w.finish()
}

struct Html {
    buf: String,
}

impl Html {
    fn new() -> Self {
        Self {
            buf: String::with_capacity(8 * 1024),
        }
    }

    fn push<S: AsRef<str>>(&mut self, s: S) {
        self.buf.push_str(s.as_ref());
    }

    fn finish(self) -> String {
        self.buf
    }
}

/// Escape text for element content and double-quoted attributes.
fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
