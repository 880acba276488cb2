//! The page composer: turns days, pages, and tags into [`OutputPage`]s, one
//! per output file. Composition is pure; templating and writing happen in
//! [`crate::write`].
//!
//! Every page carries the archive navigation widget, rendered relative to
//! the page's own location so the output tree can be served from any
//! directory.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;

use crate::archive::Archive;
use crate::calendar;
use crate::config::Config;
use crate::day::{day_path, tag_path, week_label, week_path, Article, Day, Page};
use crate::html::{date_header, escape, month_names};
use crate::tag::{cloud_size, TagIndex, TagInfo};

const TOPBAR: &str = "<div class=\"tl-topbar\"></div>\n";

/// A fully composed page, ready for templating.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputPage {
    /// Location relative to the output root, e.g. `archive/2024/01/02.html`.
    pub path: String,
    pub title: String,
    pub label: String,
    /// Rendered HTML for the `body` placeholder.
    pub body: String,
    /// Rendered HTML for the `archive` placeholder.
    pub archive: String,
}

/// Composes pages. Borrowing the relevant [`Config`] fields (rather than the
/// whole config) keeps it constructible in tests.
pub struct Composer<'a> {
    pub archive: &'a Archive,
    pub date_format: &'a str,
    pub label_format: &'a str,
    /// Number of days on the index page.
    pub index_days: usize,
    pub tags_label: &'a str,
    pub tags_title: &'a str,
}

impl<'a> Composer<'a> {
    pub fn new(config: &'a Config, archive: &'a Archive) -> Composer<'a> {
        Composer {
            archive,
            date_format: &config.date_format,
            label_format: &config.label_format,
            index_days: config.days,
            tags_label: &config.tags_label,
            tags_title: &config.tags_title,
        }
    }

    fn archive_html(&self, current: Option<(i32, u32)>, path: &str) -> String {
        self.archive.to_html(current, path, self.label_format)
    }

    fn format_date(&self, day: &Day<Article>) -> String {
        day.date.format(self.date_format).to_string()
    }

    /// Date header followed by the day's articles. `path` leads from the
    /// page to the `archive` directory.
    fn day_body(&self, day: &Day<Article>, path: &str) -> String {
        let mut body = date_header(day.date, self.date_format, &day.title, path);
        body.push_str(&day.html());
        body
    }

    /// `index.html`: the most recent days.
    pub fn index(&self, days: &[Day<Article>]) -> OutputPage {
        OutputPage {
            path: String::from("index.html"),
            title: String::from("home"),
            label: String::from("home"),
            body: days
                .iter()
                .take(self.index_days)
                .map(|day| self.day_body(day, "archive"))
                .collect(),
            archive: self.archive_html(None, "archive"),
        }
    }

    /// One page per day, with links to the adjacent days.
    pub fn day_pages(&self, days: &[Day<Article>]) -> Vec<OutputPage> {
        let archive = self.archive_html(None, "../..");
        days.iter()
            .enumerate()
            .map(|(i, day)| {
                let mut body = self.day_body(day, "../..");
                body.push_str(&self.next_prev(days, i));
                OutputPage {
                    path: day.path(),
                    title: day.title.clone(),
                    label: self.format_date(day),
                    body,
                    archive: archive.clone(),
                }
            })
            .collect()
    }

    /// Navigation between a day page and its neighbours; `days` are sorted
    /// most recent first, so the newer day precedes `index`.
    fn next_prev(&self, days: &[Day<Article>], index: usize) -> String {
        if days.len() < 2 {
            return String::new();
        }
        let link = |day: &Day<Article>| {
            format!(
                "<a href=\"../../{}\" title=\"{}\">{}</a>",
                day.date.format("%Y/%m/%d.html"),
                escape(&self.format_date(day)),
                escape(&day.title)
            )
        };
        let mut html = String::from("<nav class=\"tl-next-prev\">\n");
        if let Some(next) = index.checked_sub(1).and_then(|i| days.get(i)) {
            html.push_str(&format!(
                "  <div class=\"next\">{}</div><div class=\"tl-right-arrow\">\u{2192}</div>\n",
                link(next)
            ));
        }
        if let Some(prev) = days.get(index + 1) {
            html.push_str(&format!(
                "  <div class=\"tl-left-arrow\">\u{2190}</div><div class=\"prev\">{}</div>\n",
                link(prev)
            ));
        }
        html.push_str("</nav>\n");
        html
    }

    /// One page per ISO week, holding the bodies of all its days.
    pub fn week_pages(&self, days: &[Day<Article>]) -> Vec<OutputPage> {
        let mut pages = Vec::new();
        let mut current: Option<((i32, u32), String)> = None;
        for day in days {
            let year_week = day.year_week();
            let body = self.day_body(day, "../..");
            if let Some((yw, week_body)) = &mut current {
                if *yw == year_week {
                    week_body.push_str(&body);
                    continue;
                }
            }
            if let Some((yw, week_body)) = current.replace((year_week, body)) {
                pages.push(self.week_page(yw, week_body));
            }
        }
        if let Some((yw, week_body)) = current {
            pages.push(self.week_page(yw, week_body));
        }
        pages
    }

    fn week_page(&self, (year, week): (i32, u32), body: String) -> OutputPage {
        let title = week_label(self.label_format, year, week);
        OutputPage {
            path: week_path(year, week),
            label: title.clone(),
            title,
            body,
            archive: self.archive_html(Some((year, week)), "../.."),
        }
    }

    /// One page per calendar month with content, listing its days in
    /// chronological order.
    pub fn month_pages(&self, days: &[Day<Article>]) -> Vec<OutputPage> {
        let mut years: BTreeMap<i32, BTreeMap<u32, Vec<&Day<Article>>>> = BTreeMap::new();
        for day in days.iter().rev() {
            years
                .entry(day.date.year())
                .or_default()
                .entry(day.date.month())
                .or_default()
                .push(day);
        }

        let names = month_names();
        let archive = self.archive_html(None, "../..");
        let mut pages = Vec::new();
        for (year, months) in &years {
            let active: BTreeSet<u32> = months.keys().copied().collect();
            for (month, days) in months {
                let first = match days.first() {
                    Some(day) => day.date,
                    None => continue,
                };
                let name = first.format("%B").to_string();
                let mut body = format!(
                    "{}<article>\n  <h2 class=\"tl-month-year\">{} <a href=\"../../{year}/\">{year}</a></h2>\n  \
                     <dl class=\"tl-days\">\n",
                    TOPBAR,
                    name,
                    year = year
                );
                for day in days {
                    body.push_str(&format!(
                        "    <dt>{0:02}</dt><dd><a href=\"{0:02}.html\">{1}</a></dd>\n",
                        day.date.day(),
                        escape(&day.title)
                    ));
                }
                body.push_str("  </dl>\n");
                body.push_str(&month_nav(&active, *month, &names));
                body.push_str("</article>\n");
                pages.push(OutputPage {
                    path: format!("archive/{:04}/{:02}/index.html", year, month),
                    title: format!("{}, {}", name, year),
                    label: first.format("%b, %Y").to_string(),
                    body,
                    archive: archive.clone(),
                });
            }
        }
        pages
    }

    /// One calendar page per year between the oldest and newest day.
    pub fn year_pages(&self, days: &[Day<Article>]) -> Vec<OutputPage> {
        let calendars = calendar::build(days);
        let (start_year, end_year) = match (calendars.first(), calendars.last()) {
            (Some(first), Some(last)) => (first.year, last.year),
            _ => return Vec::new(),
        };
        let archive = self.archive_html(None, "..");
        calendars
            .iter()
            .map(|calendar| OutputPage {
                path: format!("archive/{:04}/index.html", calendar.year),
                title: calendar.year.to_string(),
                label: calendar.year.to_string(),
                body: calendar.to_html(start_year, end_year),
                archive: archive.clone(),
            })
            .collect()
    }

    /// One page per standalone page.
    pub fn standalone_pages(&self, pages: &[Page<Article>]) -> Vec<OutputPage> {
        let archive = match self.archive.is_empty() {
            true => String::new(),
            false => self.archive_html(None, "archive"),
        };
        pages
            .iter()
            .map(|page| {
                let mut body = match page.show_date {
                    true => format!(
                        "<time class=\"tl-date\" datetime=\"{}\">{}</time>\n",
                        page.date.format("%Y-%m-%d"),
                        escape(&page.date.format(self.date_format).to_string())
                    ),
                    false => String::from(TOPBAR),
                };
                body.extend(page.articles.iter().map(|a| a.html.as_str()));
                OutputPage {
                    path: page.path(),
                    title: page.title.clone(),
                    label: page.label.clone(),
                    body,
                    archive: archive.clone(),
                }
            })
            .collect()
    }

    /// One page per tag and year, listing the tagged articles by month.
    pub fn tag_pages(&self, tags: &TagIndex) -> Vec<OutputPage> {
        let names = month_names();
        let archive = self.archive_html(None, "../../archive");
        let mut pages = Vec::new();
        for (tag, info) in &tags.tags {
            for (year, entries) in &info.years {
                let mut body = format!("{}<article>\n  <h2>{} {}</h2>\n", TOPBAR, escape(tag), year);
                let mut month = None;
                for entry in entries {
                    if month != Some(entry.date.month()) {
                        if month.is_some() {
                            body.push_str("  </ul>\n");
                        }
                        month = Some(entry.date.month());
                        let name = names.get(entry.date.month0() as usize).map_or("", String::as_str);
                        body.push_str(&format!("  <h3>{}</h3>\n  <ul class=\"tl-tag-entries\">\n", name));
                    }
                    body.push_str(&format!(
                        "    <li><a href=\"../../{}#{}\">{}</a></li>\n",
                        day_path(entry.date),
                        escape(&entry.id),
                        escape(&entry.title)
                    ));
                }
                if month.is_some() {
                    body.push_str("  </ul>\n");
                }
                body.push_str(&tag_year_nav(tag, info, *year));
                body.push_str("</article>\n");
                pages.push(OutputPage {
                    path: tag_path(tag, *year),
                    title: format!("{} {}", tag, year),
                    label: self.tags_label.to_owned(),
                    body,
                    archive: archive.clone(),
                });
            }
        }
        pages
    }

    /// `tags/index.html`: the tag cloud, or `None` without tags.
    pub fn tags_index(&self, tags: &TagIndex) -> Option<OutputPage> {
        let (min_count, max_count) = tags.count_range()?;
        let mut body = format!(
            "{}<article>\n  <h2>{}</h2>\n  <ul class=\"tl-tag-cloud\">\n",
            TOPBAR,
            escape(self.tags_title)
        );
        for (tag, info) in &tags.tags {
            let year = match info.last_year() {
                Some(year) => year,
                None => continue,
            };
            body.push_str(&format!(
                "    <li class=\"tl-tag-size-{}\"><a href=\"{}\">{}</a> <span>{}</span></li>\n",
                cloud_size(info.count, min_count, max_count),
                relative_tag_href(tag, year),
                escape(tag),
                info.count
            ));
        }
        body.push_str("  </ul>\n</article>\n");
        Some(OutputPage {
            path: String::from("tags/index.html"),
            title: self.tags_title.to_owned(),
            label: self.tags_label.to_owned(),
            body,
            archive: self.archive_html(None, "../archive"),
        })
    }

    /// Every page of the site, in writing order.
    pub fn all(&self, days: &[Day<Article>], pages: &[Page<Article>], tags: &TagIndex) -> Vec<OutputPage> {
        let mut out = Vec::new();
        if !days.is_empty() {
            out.push(self.index(days));
            out.extend(self.day_pages(days));
            out.extend(self.week_pages(days));
            out.extend(self.month_pages(days));
            out.extend(self.year_pages(days));
        }
        out.extend(self.tag_pages(tags));
        out.extend(self.tags_index(tags));
        out.extend(self.standalone_pages(pages));
        out
    }
}

/// Path of a tag page relative to the `tags` directory.
fn relative_tag_href(tag: &str, year: i32) -> String {
    let path = tag_path(tag, year);
    match path.strip_prefix("tags/") {
        Some(rest) => rest.to_owned(),
        None => path,
    }
}

fn month_nav(active: &BTreeSet<u32>, current: u32, names: &[String]) -> String {
    let mut html = String::from("  <nav>\n    <ul class=\"tl-month-navigation\">\n");
    for (month, name) in (1..=12).zip(names) {
        match (active.contains(&month), month == current) {
            (true, true) => html.push_str(&format!("      <li class=\"tl-self\">{}</li>\n", name)),
            (true, false) => html.push_str(&format!("      <li><a href=\"../{:02}/\">{}</a></li>\n", month, name)),
            (false, _) => html.push_str(&format!("      <li>{}</li>\n", name)),
        }
    }
    html.push_str("    </ul>\n  </nav>\n");
    html
}

/// Links a tag page to the same tag's pages of other years.
fn tag_year_nav(tag: &str, info: &TagInfo, current: i32) -> String {
    let mut html = String::from("  <nav>\n    <ul class=\"tl-tag-years\">\n");
    for year in info.years.keys() {
        match *year == current {
            true => html.push_str(&format!("      <li class=\"tl-self\">{}</li>\n", year)),
            false => html.push_str(&format!(
                "      <li><a href=\"../{}\">{}</a></li>\n",
                relative_tag_href(tag, *year),
                year
            )),
        }
    }
    html.push_str("    </ul>\n  </nav>\n");
    html
}
