//! Support for creating RSS 2.0 and JSON feeds from a list of days.
//!
//! Both feeds list the most recent days, one item per day, with the day's
//! rendered articles as content. Items are dated at the end of their day
//! (`23:59:59`) in the given timezone.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone};
use rss::extension::atom::{AtomExtension, Link};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::day::{absolute_url, Article, Day};

const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1.1";

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub name: &'a str,
    pub author: &'a str,
    pub description: &'a str,
    pub blog_url: &'a Url,
    pub rss_feed_url: &'a str,
    pub json_feed_url: &'a str,
    /// The maximum number of items.
    pub items: usize,
}

impl<'a> From<&'a Config> for FeedConfig<'a> {
    fn from(config: &'a Config) -> FeedConfig<'a> {
        FeedConfig {
            name: &config.name,
            author: &config.author,
            description: &config.description,
            blog_url: &config.blog_url,
            rss_feed_url: &config.rss_feed_url,
            json_feed_url: &config.json_feed_url,
            items: config.days,
        }
    }
}

/// The parts of a feed item shared by both formats.
struct Item {
    url: String,
    title: String,
    content: String,
}

fn items<'d>(config: &FeedConfig<'_>, days: &'d [Day<Article>]) -> Vec<(&'d Day<Article>, Item)> {
    days.iter()
        .take(config.items)
        .map(|day| {
            let item = Item {
                url: absolute_url(config.blog_url, &day.path()),
                title: day.title.clone(),
                content: day.html(),
            };
            (day, item)
        })
        .collect()
}

fn end_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateTime<Tz>> {
    date.and_hms_opt(23, 59, 59)
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .ok_or(Error::NoLocalTime(date))
}

/// Renders the RSS 2.0 feed, including an Atom `self` link.
pub fn rss_feed<Tz>(config: &FeedConfig<'_>, days: &[Day<Article>], tz: &Tz) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut rss_items = Vec::new();
    for (day, item) in items(config, days) {
        let pub_date = end_of_day(day.date, tz)?.format("%a, %d %b %Y %H:%M:%S %z");
        rss_items.push(
            ItemBuilder::default()
                .title(Some(item.title))
                .link(Some(item.url.clone()))
                .guid(Some(GuidBuilder::default().permalink(true).value(item.url).build()))
                .pub_date(Some(pub_date.to_string()))
                .description(Some(item.content))
                .build(),
        );
    }

    let mut self_link = Link::default();
    self_link.set_href(config.rss_feed_url);
    self_link.set_rel("self");
    self_link.set_mime_type(Some(String::from("application/rss+xml")));
    let mut atom = AtomExtension::default();
    atom.set_links(vec![self_link]);

    let mut namespaces = BTreeMap::new();
    namespaces.insert(String::from("atom"), String::from(ATOM_NAMESPACE));

    let channel = ChannelBuilder::default()
        .title(config.name)
        .link(config.blog_url.as_str())
        .description(config.description)
        .namespaces(namespaces)
        .atom_ext(Some(atom))
        .items(rss_items)
        .build();
    Ok(channel.to_string())
}

#[derive(Serialize)]
struct JsonFeed<'a> {
    version: &'static str,
    title: &'a str,
    home_page_url: &'a str,
    feed_url: &'a str,
    description: &'a str,
    authors: Vec<JsonAuthor<'a>>,
    items: Vec<JsonItem>,
}

#[derive(Serialize)]
struct JsonAuthor<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct JsonItem {
    id: String,
    url: String,
    title: String,
    content_html: String,
    date_published: String,
}

/// Renders the JSON Feed (version 1.1).
pub fn json_feed<Tz>(config: &FeedConfig<'_>, days: &[Day<Article>], tz: &Tz) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut json_items = Vec::new();
    for (day, item) in items(config, days) {
        json_items.push(JsonItem {
            id: item.url.clone(),
            url: item.url,
            title: item.title,
            content_html: item.content,
            date_published: end_of_day(day.date, tz)?.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
        });
    }
    let feed = JsonFeed {
        version: JSON_FEED_VERSION,
        title: config.name,
        home_page_url: config.blog_url.as_str(),
        feed_url: config.json_feed_url,
        description: config.description,
        authors: vec![JsonAuthor { name: config.author }],
        items: json_items,
    };
    let mut json = serde_json::to_string_pretty(&feed)?;
    json.push('\n');
    Ok(json)
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug, Error)]
pub enum Error {
    /// The end of the day doesn't exist in the local timezone.
    #[error("no local time for the end of {0}")]
    NoLocalTime(NaiveDate),

    #[error("serializing JSON feed: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::FixedOffset;

    fn days() -> Vec<Day<Article>> {
        let day = |date: &str, title: &str, html: &str| Day {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            title: title.to_owned(),
            articles: vec![Article {
                html: html.to_owned(),
                ..Article::default()
            }],
        };
        vec![
            day("2024-01-03", "Third", "<article>\n<p>3</p>\n</article>\n"),
            day("2024-01-02", "Second", "<article>\n<p>2</p>\n</article>\n"),
            day("2024-01-01", "First", "<article>\n<p>1</p>\n</article>\n"),
        ]
    }

    fn with_config<T>(f: impl FnOnce(&FeedConfig<'_>) -> T) -> T {
        let blog_url = Url::parse("https://example.org/blog/").unwrap();
        f(&FeedConfig {
            name: "My Log",
            author: "Ann",
            description: "Things & stuff",
            blog_url: &blog_url,
            rss_feed_url: "https://example.org/blog/feed.rss",
            json_feed_url: "https://example.org/blog/feed.json",
            items: 2,
        })
    }

    #[test]
    fn test_rss_feed() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let xml = with_config(|config| rss_feed(config, &days(), &tz)).unwrap();
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        assert_eq!("My Log", channel.title());
        assert_eq!("Things & stuff", channel.description());
        assert_eq!(2, channel.items().len());

        let item = &channel.items()[0];
        assert_eq!(Some("Third"), item.title());
        assert_eq!(Some("https://example.org/blog/archive/2024/01/03.html"), item.link());
        assert_eq!(Some("Wed, 03 Jan 2024 23:59:59 +0100"), item.pub_date());
        assert_eq!(Some("<article>\n<p>3</p>\n</article>\n"), item.description());
        let guid = item.guid().unwrap();
        assert!(guid.is_permalink());
        assert_eq!("https://example.org/blog/archive/2024/01/03.html", guid.value());

        let atom = channel.atom_ext().unwrap();
        assert_eq!("https://example.org/blog/feed.rss", atom.links()[0].href());
        assert_eq!("self", atom.links()[0].rel());
    }

    #[test]
    fn test_json_feed() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let json = with_config(|config| json_feed(config, &days(), &tz)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!("https://jsonfeed.org/version/1.1", value["version"]);
        assert_eq!("https://example.org/blog/", value["home_page_url"]);
        assert_eq!("https://example.org/blog/feed.json", value["feed_url"]);
        assert_eq!("Ann", value["authors"][0]["name"]);
        let items = value["items"].as_array().unwrap();
        assert_eq!(2, items.len());
        assert_eq!("https://example.org/blog/archive/2024/01/02.html", items[1]["id"]);
        assert_eq!(items[1]["id"], items[1]["url"]);
        assert_eq!("Second", items[1]["title"]);
        assert_eq!("<article>\n<p>2</p>\n</article>\n", items[1]["content_html"]);
        assert_eq!("2024-01-02T23:59:59-05:00", items[1]["date_published"]);
        assert!(json.ends_with("}\n"));
    }
}
