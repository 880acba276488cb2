//! Tag validation and aggregation. Tags aren't stored entities; the
//! [`TagIndex`] is derived from the articles of every [`Day`] and drives the
//! per-year tag pages and the tag cloud.

use std::collections::{BTreeMap, VecDeque};

use chrono::{Datelike, NaiveDate};

use crate::day::{Article, Day};

/// Reports whether `tag` is one or more words of lowercase ASCII letters and
/// digits separated by single spaces, i.e. `^[a-z0-9]+( [a-z0-9]+)*$`.
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag.split(' ').all(|word| {
            !word.is_empty()
                && word
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

/// One tagged article, as listed on a tag page.
#[derive(Clone, Debug, PartialEq)]
pub struct TagEntry {
    pub title: String,
    pub date: NaiveDate,
    pub id: String,
}

/// Everything known about a single tag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagInfo {
    /// The number of articles carrying the tag, across all years.
    pub count: usize,

    /// Tagged articles per calendar year, in chronological order.
    pub years: BTreeMap<i32, VecDeque<TagEntry>>,
}

impl TagInfo {
    /// The most recent year the tag was used in.
    pub fn last_year(&self) -> Option<i32> {
        self.years.keys().next_back().copied()
    }
}

/// Maps each tag to its [`TagInfo`], ordered by tag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagIndex {
    pub tags: BTreeMap<String, TagInfo>,
}

impl TagIndex {
    /// Aggregates the tags of all articles of `days`, which must be sorted
    /// most recent first. Every entry is front-inserted into its year bucket
    /// while walking backwards, so buckets end up chronological with the
    /// article order of each day preserved.
    pub fn new(days: &[Day<Article>]) -> TagIndex {
        let mut tags: BTreeMap<String, TagInfo> = BTreeMap::new();
        for day in days {
            for article in day.articles.iter().rev() {
                for tag in &article.tags {
                    let info = tags.entry(tag.clone()).or_default();
                    info.count += 1;
                    info.years
                        .entry(day.date.year())
                        .or_default()
                        .push_front(TagEntry {
                            title: article.title.clone().unwrap_or_default(),
                            date: day.date,
                            id: article.id.clone().unwrap_or_default(),
                        });
                }
            }
        }
        TagIndex { tags }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The smallest and largest tag counts, if there are any tags.
    pub fn count_range(&self) -> Option<(usize, usize)> {
        let counts = self.tags.values().map(|info| info.count);
        Some((counts.clone().min()?, counts.max()?))
    }
}

/// The tag-cloud size class of a tag used `count` times, given the smallest
/// and largest counts over all tags: `1` if they're equal, otherwise
/// `1 + floor(4 * ln(count / min) / ln(max / min))`. Always in `1..=5`.
pub fn cloud_size(count: usize, min_count: usize, max_count: usize) -> u8 {
    if min_count == max_count || min_count == 0 {
        return 1;
    }
    let ratio = (count as f64 / min_count as f64).ln() / (max_count as f64 / min_count as f64).ln();
    let size = 1.0 + (4.0 * ratio).floor();
    size.clamp(1.0, 5.0) as u8
}
