//! HTML escaping and the small fragments shared by several page kinds.

use std::borrow::Cow;

use chrono::NaiveDate;

/// Escapes `&`, `<`, `>`, `"`, and `'`.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// `<time>` header of a day linking to its day page. `path` is the relative
/// path from the current page to the `archive` directory.
pub fn date_header(date: NaiveDate, date_format: &str, title: &str, path: &str) -> String {
    format!(
        "<time class=\"tl-date\" datetime=\"{}\"><a href=\"{}/{}\" title=\"{}\">{}</a></time>\n",
        date.format("%Y-%m-%d"),
        path,
        date.format("%Y/%m/%d.html"),
        escape(title),
        escape(&date.format(date_format).to_string()),
    )
}

/// The English names of the months, January first.
pub fn month_names() -> Vec<String> {
    (1..=12)
        .filter_map(|m| NaiveDate::from_ymd_opt(2019, m, 1))
        .map(|d| d.format("%B").to_string())
        .collect()
}
