//! The archive index: which ISO weeks of which ISO years have content. It
//! drives the week and year page enumeration as well as the archive
//! navigation widget rendered on every page.

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::day::{week_label, Day};
use crate::html::escape;

/// Maps ISO years to their distinct ISO weeks with content, most recent
/// first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Archive {
    years: BTreeMap<i32, VecDeque<u32>>,
}

impl Archive {
    /// Builds the archive from `days` (sorted most recent first). Each
    /// `(year, week)` pair is recorded once, appended to its year bucket, so
    /// every bucket ends up in descending week order.
    pub fn new<A>(days: &[Day<A>]) -> Archive {
        let mut seen: HashSet<(i32, u32)> = HashSet::new();
        let mut years: BTreeMap<i32, VecDeque<u32>> = BTreeMap::new();
        for day in days {
            let (year, week) = day.year_week();
            if seen.insert((year, week)) {
                years.entry(year).or_default().push_back(week);
            }
        }
        Archive { years }
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// ISO years with content, most recent first.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().rev().copied()
    }

    /// The weeks recorded for `year`, as stored.
    pub fn weeks(&self, year: i32) -> impl Iterator<Item = u32> + '_ {
        self.years.get(&year).into_iter().flatten().copied()
    }

    /// Renders the archive navigation widget. `path` is the relative path
    /// from the current page to the `archive` directory; the `current` week,
    /// if any, is rendered as plain text instead of a link.
    pub fn to_html(&self, current: Option<(i32, u32)>, path: &str, label_format: &str) -> String {
        let mut html = String::from("<dl>\n");
        for year in self.years() {
            html.push_str(&format!(
                "  <dt><a href=\"{path}/{year}/\">{year}</a></dt>\n  <dd>\n    <ul>\n",
                path = path,
                year = year
            ));
            for week in self.weeks(year) {
                if current == Some((year, week)) {
                    html.push_str(&format!("      <li class=\"tl-self\">{:02}</li>\n", week));
                } else {
                    html.push_str(&format!(
                        "      <li><a href=\"{path}/{year}/week/{week:02}.html\" \
                         title=\"{title}\">{week:02}</a></li>\n",
                        path = path,
                        year = year,
                        week = week,
                        title = escape(&week_label(label_format, year, week)),
                    ));
                }
            }
            html.push_str("    </ul>\n  </dd>\n");
        }
        html.push_str("</dl>\n");
        html
    }
}
