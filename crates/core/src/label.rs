//! Badge label template.
//!
//! Produces a self-contained HTML document sized for a 62mm × 90mm label
//! roll. Output is a pure function of the payload; every user-supplied
//! string is escaped before it is placed in the markup.

use crate::badge::BadgePayload;

/// Label width in millimetres.
pub const LABEL_WIDTH_MM: u32 = 62;

/// Label height in millimetres.
pub const LABEL_HEIGHT_MM: u32 = 90;

/// CUPS media name matching the label dimensions.
pub const LABEL_MEDIA: &str = "Custom.62x90mm";

/// Escape text for safe inclusion in HTML element content and attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Render the badge HTML for a validated payload.
pub fn render_label_html(payload: &BadgePayload) -> String {
    let (role, headline, lines): (&str, &str, Vec<&str>) = match payload {
        BadgePayload::Student(s) => (
            "Student",
            s.full_name.as_str(),
            std::iter::once(s.study_program.as_str())
                .chain(s.university.as_deref())
                .collect(),
        ),
        BadgePayload::Company(c) => (
            "Company",
            c.full_name.as_str(),
            c.position
                .as_deref()
                .into_iter()
                .chain(std::iter::once(c.company_name.as_str()))
                .collect(),
        ),
    };

    let details: String = lines
        .iter()
        .map(|line| format!("<p class=\"detail\">{}</p>", escape_html(line)))
        .collect::<Vec<_>>()
        .join("\n      ");

    format!(
        r#"<!DOCTYPE html>
<html lang="no">
<head>
  <meta charset="utf-8">
  <style>
    @page {{ size: {w}mm {h}mm; margin: 0; }}
    html, body {{ margin: 0; padding: 0; }}
    body {{
      width: {w}mm; height: {h}mm; overflow: hidden;
      font-family: "Helvetica Neue", Arial, sans-serif;
      display: flex; flex-direction: column; justify-content: center;
      align-items: center; text-align: center; box-sizing: border-box;
      padding: 4mm;
    }}
    .event {{ font-size: 9pt; letter-spacing: 0.08em; text-transform: uppercase; }}
    .name {{ font-size: 20pt; font-weight: 700; margin: 6mm 0 3mm; word-break: break-word; }}
    .detail {{ font-size: 11pt; margin: 1mm 0; }}
    .role {{ margin-top: 6mm; font-size: 10pt; font-weight: 700; text-transform: uppercase; }}
  </style>
</head>
<body class="{kind}">
  <div class="event">Oslo Student Hub</div>
  <div class="name">{name}</div>
      {details}
  <div class="role">{role}</div>
</body>
</html>
"#,
        w = LABEL_WIDTH_MM,
        h = LABEL_HEIGHT_MM,
        kind = payload.kind(),
        name = escape_html(headline),
        details = details,
        role = role,
    )
}
