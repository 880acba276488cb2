//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the entries
//! ([`crate::entry`]), extracting articles ([`crate::article`]), composing
//! pages ([`crate::compose`]), writing them ([`crate::write`]), and generating
//! the feeds ([`crate::feed`]).

use crate::archive::Archive;
use crate::article::{Error as ArticleError, Extractor};
use crate::compose::Composer;
use crate::config::Config;
use crate::day::{Day, Page};
use crate::entry::{self, Error as EntryError};
use crate::feed::{self, Error as FeedError, FeedConfig};
use crate::tag::TagIndex;
use crate::template::{year_range, Site, Template};
use crate::write::{Error as WriteError, Writer};
use chrono::{Datelike, Local};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Builds the site from a [`Config`] object. Stops at the first error;
/// files written before it stay on disk.
pub fn build_site(config: &Config) -> Result<()> {
    let input = std::fs::read_to_string(&config.input).map_err(|err| Error::ReadInput {
        path: config.input.clone(),
        err,
    })?;
    let (days, pages) = entry::parse(&input)?;

    let mut extractor = Extractor::new(config.tags, &config.blog_url);
    let days = extractor.extract_days(days)?;
    let pages = extractor.extract_pages(pages);

    let archive = Archive::new(&days);
    let tags = match config.tags {
        true => TagIndex::new(&days),
        false => TagIndex::default(),
    };
    debug!(tags = tags.tags.len(), "indexed archive and tags");

    let (min_year, max_year) = year_bounds(config.min_year, Local::now().year(), &days, &pages);
    let year_range = year_range(min_year, max_year);

    let template = Template::new(config.template.as_str());
    let writer = Writer {
        template: &template,
        site: Site {
            name: &config.name,
            author: &config.author,
            description: &config.description,
            version: env!("CARGO_PKG_VERSION"),
            rss_feed_url: &config.rss_feed_url,
            json_feed_url: &config.json_feed_url,
        },
        year_range: &year_range,
        css: &config.css,
        blog_url: &config.blog_url,
        output_dir: &config.output_dir,
    };

    let composer = Composer::new(config, &archive);
    writer.write_pages(&composer.all(&days, &pages, &tags))?;

    if !days.is_empty() {
        let feed_config = FeedConfig::from(config);
        writer.write_file(&config.rss_path, &feed::rss_feed(&feed_config, &days, &Local)?)?;
        writer.write_file(&config.json_path, &feed::json_feed(&feed_config, &days, &Local)?)?;
    }
    Ok(())
}

/// The copyright year range: `min_year` if given, otherwise the oldest year
/// of any day or page, up to `current_year`.
pub fn year_bounds<A, B>(min_year: Option<i32>, current_year: i32, days: &[Day<A>], pages: &[Page<B>]) -> (i32, i32) {
    let min_year = match min_year {
        Some(year) => year,
        None => days
            .last()
            .map(|d| d.date.year())
            .into_iter()
            .chain(pages.last().map(|p| p.date.year()))
            .fold(current_year, i32::min),
    };
    (min_year, current_year)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the input file can't be read.
    #[error("Reading input file '{}': {err}", .path.display())]
    ReadInput { path: PathBuf, err: std::io::Error },

    /// Returned for errors splitting or parsing the entries.
    #[error(transparent)]
    Entry(#[from] EntryError),

    /// Returned for invalid articles.
    #[error(transparent)]
    Article(#[from] ArticleError),

    /// Returned for errors writing pages and feeds to disk.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Returned for errors generating the feeds.
    #[error(transparent)]
    Feed(#[from] FeedError),
}
