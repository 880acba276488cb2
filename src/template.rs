//! The page template: raw text with `[% name %]` placeholders.
//!
//! Scalar placeholders are replaced with HTML-escaped values. `body` and
//! `archive` take pre-rendered HTML, together with one newline directly after
//! the placeholder; `body` is replaced at its first occurrence only,
//! `archive` at every occurrence. Substitution happens in a
//! single pass over the template, so placeholder-like text inside a
//! substituted value is never expanded. Unknown placeholders are left as is.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::html::escape;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(
            r"\[%\s*(title|year-range|label|css|name|author|description|version|page-url|rss-feed-url|json-feed-url|body|archive)\s*%\](\n?)",
        )
        .unwrap_or_else(|e| unreachable!("placeholder pattern is valid: {}", e))
    })
}

/// Site-wide placeholder values, identical for every page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Site<'a> {
    pub name: &'a str,
    pub author: &'a str,
    pub description: &'a str,
    pub version: &'a str,
    pub rss_feed_url: &'a str,
    pub json_feed_url: &'a str,
}

/// Placeholder values of a single page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Values<'a> {
    pub title: &'a str,
    pub label: &'a str,
    pub year_range: &'a str,
    pub css: &'a str,
    pub page_url: &'a str,
    pub body: &'a str,
    pub archive: &'a str,
}

#[derive(Clone, Debug)]
pub struct Template {
    text: String,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Template {
        Template { text: text.into() }
    }

    /// Substitutes every placeholder of the template.
    pub fn render(&self, site: &Site<'_>, values: &Values<'_>) -> String {
        let mut body_done = false;
        placeholder()
            .replace_all(&self.text, |caps: &Captures<'_>| {
                let scalar = match &caps[1] {
                    "title" => values.title,
                    "year-range" => values.year_range,
                    "label" => values.label,
                    "css" => values.css,
                    "name" => site.name,
                    "author" => site.author,
                    "description" => site.description,
                    "version" => site.version,
                    "page-url" => values.page_url,
                    "rss-feed-url" => site.rss_feed_url,
                    "json-feed-url" => site.json_feed_url,
                    "archive" => return values.archive.to_owned(),
                    "body" if !body_done => {
                        body_done = true;
                        return values.body.to_owned();
                    }
                    _ => return caps[0].to_owned(),
                };
                format!("{}{}", escape(scalar), &caps[2])
            })
            .into_owned()
    }
}

/// `"{min}"` if both years are equal, otherwise `"{min}–{max}"`.
pub fn year_range(min_year: i32, max_year: i32) -> String {
    match min_year == max_year {
        true => min_year.to_string(),
        false => format!("{}\u{2013}{}", min_year, max_year),
    }
}
