//! Turns raw article markdown into [`Article`]s.
//!
//! In plain mode an article is just its rendered HTML. In tag mode every
//! article of a [`Day`] must start with a metadata block followed by a
//! level-2 heading:
//!
//! ```text
//! ---
//! id: optional-explicit-identifier
//! tags: [rust, static sites]
//! ...
//! ## The title
//!
//! The body.
//! ```
//!
//! The heading becomes the article's title and, unless an `id` is given, its
//! identifier. Identifiers must be unique across the whole run, which the
//! [`Extractor`] enforces by remembering every identifier it has handed out.
//! [`Page`]s always take the plain path.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use pulldown_cmark::HeadingLevel;
use serde_yaml::Value;
use thiserror::Error;
use url::Url;

use crate::day::{absolute_url, day_path, tag_path, Article, Day, Page};
use crate::html::escape;
use crate::markdown::Document;
use crate::tag::is_valid_tag;

const METADATA_START: &str = "---";
const METADATA_END: &str = "...";

/// Extracts [`Article`]s, tracking identifiers across every call.
pub struct Extractor<'a> {
    /// Whether articles of days carry metadata, titles, and tags.
    tags: bool,

    /// The blog URL; heading self-links and tag links are absolute so the
    /// same article HTML works on every page and in the feeds.
    blog_url: &'a Url,

    /// Identifiers seen so far, with the day and 1-based index of the article
    /// that claimed them.
    seen: HashMap<String, (NaiveDate, usize)>,
}

impl<'a> Extractor<'a> {
    pub fn new(tags: bool, blog_url: &'a Url) -> Extractor<'a> {
        Extractor {
            tags,
            blog_url,
            seen: HashMap::new(),
        }
    }

    /// Extracts the articles of every day, in order. Stops at the first
    /// invalid article.
    pub fn extract_days(&mut self, days: Vec<Day<String>>) -> Result<Vec<Day<Article>>> {
        days.into_iter().map(|day| self.extract_day(day)).collect()
    }

    pub fn extract_day(&mut self, day: Day<String>) -> Result<Day<Article>> {
        match self.tags {
            true => day.try_map_articles(|date, index, raw| {
                self.extract_tagged(date, index, raw)
                    .map_err(|kind| Error { date, index, kind })
            }),
            false => day.try_map_articles(|_, _, raw| Ok(plain(raw))),
        }
    }

    pub fn extract_pages(&self, pages: Vec<Page<String>>) -> Vec<Page<Article>> {
        pages
            .into_iter()
            .map(|page| page.map_articles(plain))
            .collect()
    }

    fn extract_tagged(
        &mut self,
        date: NaiveDate,
        index: usize,
        raw: String,
    ) -> std::result::Result<Article, ErrorKind> {
        let (metadata, markdown) = split_metadata(&raw)?;
        let metadata = parse_metadata(metadata)?;

        let (title, id, body) = {
            let mut document = Document::parse(markdown);
            let title = heading_title(&document)?;
            let id = match &metadata.id {
                Some(id) => id.clone(),
                None => default_id(&title),
            };
            self.claim(&id, date, index)?;

            let permalink = format!("{}#{}", absolute_url(self.blog_url, &day_path(date)), id);
            if let Some(heading) = document.first_mut() {
                heading.anchor_heading(&id, &permalink);
            }
            document.rewrite_figures();
            (title, id, document.into_html())
        };

        let mut html = String::from("<article>\n");
        html.push_str(&body);
        html.push_str(&self.tag_list(&metadata.tags, date));
        html.push_str("</article>\n");

        Ok(Article {
            raw,
            html,
            title: Some(title),
            tags: metadata.tags,
            id: Some(id),
        })
    }

    /// Records `id` as used, failing if another article already has it.
    fn claim(&mut self, id: &str, date: NaiveDate, index: usize) -> std::result::Result<(), ErrorKind> {
        if let Some((first_date, first_index)) = self.seen.get(id) {
            return Err(ErrorKind::DuplicateIdentifier {
                id: id.to_owned(),
                first_date: *first_date,
                first_index: *first_index,
            });
        }
        self.seen.insert(id.to_owned(), (date, index));
        Ok(())
    }

    fn tag_list(&self, tags: &[String], date: NaiveDate) -> String {
        use chrono::Datelike;
        let mut html = String::from("<ul class=\"tl-tags\">\n");
        for tag in tags {
            html.push_str(&format!(
                "  <li><a href=\"{}\">{}</a></li>\n",
                escape(&absolute_url(self.blog_url, &tag_path(tag, date.year()))),
                escape(tag)
            ));
        }
        html.push_str("</ul>\n");
        html
    }
}

/// Renders an article without metadata; only the figure rewrite is applied.
fn plain(raw: String) -> Article {
    let html = format!("<article>\n{}</article>\n", crate::markdown::to_html(&raw));
    Article {
        raw,
        html,
        ..Article::default()
    }
}

/// Splits the metadata block (between a `---` line and a `...` line) off of
/// the front of `raw`.
fn split_metadata(raw: &str) -> std::result::Result<(&str, &str), ErrorKind> {
    let mut lines = raw.split_inclusive('\n');
    let start = match lines.next() {
        Some(line) if line.trim_end() == METADATA_START => line.len(),
        _ => return Err(ErrorKind::MissingMetadataBlock),
    };
    let mut offset = start;
    for line in lines {
        if line.trim_end() == METADATA_END {
            return Ok((&raw[start..offset], &raw[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(ErrorKind::UnterminatedMetadataBlock)
}

#[derive(Debug, Default, PartialEq)]
struct Metadata {
    id: Option<String>,
    tags: Vec<String>,
}

fn parse_metadata(yaml: &str) -> std::result::Result<Metadata, ErrorKind> {
    let value: Value =
        serde_yaml::from_str(yaml).map_err(|e| ErrorKind::InvalidMetadata(e.to_string()))?;
    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        _ => return Err(ErrorKind::MetadataNotAMapping),
    };

    let id = match mapping.get("id") {
        None => None,
        Some(Value::String(id)) if !id.is_empty() && !id.contains(char::is_whitespace) => {
            Some(id.clone())
        }
        Some(other) => return Err(ErrorKind::InvalidIdentifier(describe(other))),
    };

    let items = match mapping.get("tags") {
        None => return Err(ErrorKind::MissingTags),
        Some(Value::Sequence(items)) => items,
        Some(_) => return Err(ErrorKind::TagsNotAList),
    };
    if items.is_empty() {
        return Err(ErrorKind::EmptyTagList);
    }
    let mut seen = HashSet::new();
    let mut tags = Vec::with_capacity(items.len());
    for item in items {
        let tag = match item {
            Value::String(tag) if is_valid_tag(tag) => tag,
            other => return Err(ErrorKind::InvalidTagFormat(describe(other))),
        };
        if !seen.insert(tag.as_str()) {
            return Err(ErrorKind::DuplicateTag(tag.clone()));
        }
        tags.push(tag.clone());
    }

    Ok(Metadata { id, tags })
}

/// A short rendition of a metadata value for error messages.
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("`{}`", s),
        other => serde_yaml::to_string(other)
            .map(|s| format!("`{}`", s.trim_end()))
            .unwrap_or_else(|_| String::from("<unprintable>")),
    }
}

/// The title of the article, taken from its leading level-2 heading.
fn heading_title(document: &Document<'_>) -> std::result::Result<String, ErrorKind> {
    let heading = document.first().ok_or(ErrorKind::MissingHeading)?;
    match heading.heading_level() {
        None => return Err(ErrorKind::MissingHeading),
        Some(HeadingLevel::H2) => {}
        Some(level) => return Err(ErrorKind::WrongHeadingLevel(level as usize)),
    }
    let title = heading.text().split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        return Err(ErrorKind::EmptyHeadingText);
    }
    Ok(title)
}

/// The identifier derived from a title: whitespace runs become hyphens, and
/// everything is lowercased.
fn default_id(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase()
}

/// Represents the result of an extraction.
pub type Result<T> = std::result::Result<T, Error>;

/// An invalid article, identified by the date of its day and its 1-based
/// position within that day.
#[derive(Debug, Error, PartialEq)]
#[error("article {index} of {date}: {kind}")]
pub struct Error {
    pub date: NaiveDate,
    pub index: usize,
    pub kind: ErrorKind,
}

/// What is wrong with an article.
#[derive(Debug, Error, PartialEq)]
pub enum ErrorKind {
    #[error("missing metadata block; an article must start with a `---` line")]
    MissingMetadataBlock,

    #[error("metadata block isn't closed by a `...` line")]
    UnterminatedMetadataBlock,

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("metadata must be a mapping")]
    MetadataNotAMapping,

    #[error("an article must start with a level 2 heading")]
    MissingHeading,

    #[error("the first heading must be level 2, found level {0}")]
    WrongHeadingLevel(usize),

    #[error("the heading has no text")]
    EmptyHeadingText,

    #[error("an id must be a non-empty string without whitespace, found {0}")]
    InvalidIdentifier(String),

    #[error("id `{id}` is already used by article {first_index} of {first_date}")]
    DuplicateIdentifier {
        id: String,
        first_date: NaiveDate,
        first_index: usize,
    },

    #[error("metadata has no `tags`")]
    MissingTags,

    #[error("`tags` must be a list")]
    TagsNotAList,

    #[error("`tags` must not be empty")]
    EmptyTagList,

    #[error("invalid tag {0}; tags are lowercase letters and digits, words separated by single spaces")]
    InvalidTagFormat(String),

    #[error("tag `{0}` is listed more than once")]
    DuplicateTag(String),
}
