//! Command line options and the validated, immutable [`Config`] built from
//! them.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::format::{Item, StrftimeItems};
use clap::Parser;
use url::Url;

use crate::day::absolute_url;
use crate::util::read;

/// Creates a static tumblelog from a single text file.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Options {
    /// The HTML template for every page.
    #[arg(short = 't', long = "template-filename", value_name = "TEMPLATE")]
    pub template_filename: PathBuf,

    /// Directory the site is written to.
    #[arg(short, long, value_name = "HTDOCS")]
    pub output_dir: PathBuf,

    #[arg(short, long)]
    pub author: String,

    /// The name of the blog.
    #[arg(short, long, value_name = "BLOGNAME")]
    pub name: String,

    #[arg(long)]
    pub description: String,

    /// The URL the site is served from.
    #[arg(short, long, value_name = "URL")]
    pub blog_url: String,

    /// Number of days on the index page and in the feeds.
    #[arg(short, long, default_value_t = 14)]
    pub days: usize,

    /// Stylesheet, relative to the output root.
    #[arg(short, long, default_value = "styles.css")]
    pub css: String,

    #[arg(long, default_value = "%d %b %Y")]
    pub date_format: String,

    /// Title format of week pages; `%Y` is the ISO year, `%V` the ISO week.
    #[arg(long, default_value = "week %V, %Y")]
    pub label_format: String,

    /// First year of the copyright range.
    #[arg(long)]
    pub min_year: Option<i32>,

    /// Read article metadata and create tag pages.
    #[arg(long)]
    pub tags: bool,

    #[arg(long, default_value = "tags")]
    pub tags_label: String,

    #[arg(long, default_value = "Tags")]
    pub tags_title: String,

    /// Don't report created files.
    #[arg(short, long)]
    pub quiet: bool,

    /// The tumblelog source file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Everything a build needs to know, validated.
#[derive(Clone, Debug)]
pub struct Config {
    pub input: PathBuf,
    /// The template text.
    pub template: String,
    pub output_dir: PathBuf,
    pub name: String,
    pub author: String,
    pub description: String,
    pub blog_url: Url,
    pub css: String,
    pub date_format: String,
    pub label_format: String,
    pub days: usize,
    pub min_year: Option<i32>,
    pub tags: bool,
    pub tags_label: String,
    pub tags_title: String,
    pub quiet: bool,
    /// Path of the RSS feed, relative to the output directory.
    pub rss_path: String,
    /// Path of the JSON feed, relative to the output directory.
    pub json_path: String,
    pub rss_feed_url: String,
    pub json_feed_url: String,
}

impl Config {
    /// Validates the options and loads the template.
    pub fn from_options(options: Options) -> Result<Config> {
        let blog_url = parse_blog_url(&options.blog_url)?;
        validate_date_format(&options.date_format)?;
        if options.days < 1 {
            return Err(anyhow!("--days must be at least 1"));
        }
        let template = read(&options.template_filename, "template")?;

        let rss_path = String::from("feed.rss");
        let json_path = String::from("feed.json");
        Ok(Config {
            rss_feed_url: absolute_url(&blog_url, &rss_path),
            json_feed_url: absolute_url(&blog_url, &json_path),
            rss_path,
            json_path,
            input: options.file,
            template,
            output_dir: options.output_dir,
            name: options.name,
            author: options.author,
            description: options.description,
            blog_url,
            css: options.css,
            date_format: options.date_format,
            label_format: options.label_format,
            days: options.days,
            min_year: options.min_year,
            tags: options.tags,
            tags_label: options.tags_label,
            tags_title: options.tags_title,
            quiet: options.quiet,
        })
    }
}

/// Parses the blog URL, making sure it names a directory so relative paths
/// join beneath it.
fn parse_blog_url(s: &str) -> Result<Url> {
    let mut url = Url::parse(s).map_err(|e| anyhow!("Invalid blog URL `{}`: {}", s, e))?;
    if url.cannot_be_a_base() {
        return Err(anyhow!("Invalid blog URL `{}`: not a base URL", s));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn validate_date_format(format: &str) -> Result<()> {
    match StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        true => Err(anyhow!("Invalid date format `{}`", format)),
        false => Ok(()),
    }
}
