//! Defines the [`Day`], [`Page`], and [`Article`] types which make up the
//! in-memory document model, plus the date helpers shared by every stage
//! that needs to know where a [`Day`] lives in the output tree.
//!
//! [`Day`] and [`Page`] are generic over their article type. The
//! [`crate::entry`] parser produces `Day<String>` (raw markdown blocks) and
//! the [`crate::article`] extractor converts them into `Day<Article>`.

use chrono::{Datelike, NaiveDate};
use url::Url;

/// A dated content unit holding one or more articles.
#[derive(Clone, Debug, PartialEq)]
pub struct Day<A> {
    pub date: NaiveDate,
    pub title: String,
    pub articles: Vec<A>,
}

/// A standalone, non-chronological content unit (e.g., an "about" page).
#[derive(Clone, Debug, PartialEq)]
pub struct Page<A> {
    /// The slug used for the output file name (`{name}.html`).
    pub name: String,
    pub label: String,
    pub date: NaiveDate,
    /// Whether the page body starts with its (formatted) date.
    pub show_date: bool,
    pub title: String,
    pub articles: Vec<A>,
}

/// One rendered content block within a [`Day`] or [`Page`]. Outside of tag
/// mode only `raw` and `html` are populated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Article {
    pub raw: String,
    pub html: String,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub id: Option<String>,
}

impl<A> Day<A> {
    /// The ISO-8601 week-numbering `(year, week)` of the day.
    pub fn year_week(&self) -> (i32, u32) {
        year_week(self.date)
    }

    /// Path of the day page relative to the output root.
    pub fn path(&self) -> String {
        day_path(self.date)
    }

    /// Converts every article with `f`, short-circuiting on the first error.
    /// `f` also receives the day's date and the 1-based article index, which
    /// is how articles are identified in error messages.
    pub fn try_map_articles<B, E>(
        self,
        mut f: impl FnMut(NaiveDate, usize, A) -> Result<B, E>,
    ) -> Result<Day<B>, E> {
        let date = self.date;
        Ok(Day {
            date,
            title: self.title,
            articles: self
                .articles
                .into_iter()
                .enumerate()
                .map(|(i, a)| f(date, i + 1, a))
                .collect::<Result<Vec<B>, E>>()?,
        })
    }
}

impl<A> Page<A> {
    /// Path of the page relative to the output root.
    pub fn path(&self) -> String {
        format!("{}.html", self.name)
    }

    pub fn map_articles<B>(self, f: impl FnMut(A) -> B) -> Page<B> {
        Page {
            name: self.name,
            label: self.label,
            date: self.date,
            show_date: self.show_date,
            title: self.title,
            articles: self.articles.into_iter().map(f).collect(),
        }
    }
}

impl Day<Article> {
    /// All rendered article HTML of the day, concatenated.
    pub fn html(&self) -> String {
        self.articles.iter().map(|a| a.html.as_str()).collect()
    }
}

pub fn year_week(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

/// `archive/YYYY/MM/DD.html`
pub fn day_path(date: NaiveDate) -> String {
    format!("archive/{}", date.format("%Y/%m/%d.html"))
}

/// `archive/YYYY/week/WW.html`
pub fn week_path(year: i32, week: u32) -> String {
    format!("archive/{:04}/week/{:02}.html", year, week)
}

/// `tags/YYYY/<tag-slug>.html`
pub fn tag_path(tag: &str, year: i32) -> String {
    format!("tags/{:04}/{}.html", year, slug::slugify(tag))
}

/// Joins a path relative to the output root onto the blog URL. Falls back to
/// naive concatenation if the join fails, which can only happen for a
/// `cannot-be-a-base` blog URL that config validation already rejects.
pub fn absolute_url(blog_url: &Url, path: &str) -> String {
    match blog_url.join(path) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}{}", blog_url, path),
    }
}

/// Replaces `%Y` and `%V` in a week label format with the ISO year and the
/// zero-padded ISO week.
pub fn week_label(format: &str, year: i32, week: u32) -> String {
    format
        .replace("%Y", &format!("{:04}", year))
        .replace("%V", &format!("{:02}", week))
}
