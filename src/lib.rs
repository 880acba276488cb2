//! The library code for the `tumblelog` static site generator. A tumblelog is
//! written as a single text file of entries separated by `%` lines; every
//! entry starts a new day (`YYYY-MM-DD title`) or a standalone page
//! (`@name[label] YYYY-MM-DD title`), or continues the previous one with
//! another article. The build runs top to bottom in three steps:
//!
//! 1. Parsing the entries into days and pages ([`crate::entry`]) and
//!    rendering their markdown articles ([`crate::article`])
//! 2. Indexing the days by ISO week ([`crate::archive`]) and, in tag mode,
//!    by tag ([`crate::tag`])
//! 3. Composing every page ([`crate::compose`]), templating and writing it to
//!    disk ([`crate::write`]), and writing the feeds ([`crate::feed`])
//!
//! Each output page is one of: the index, a day, an ISO week, a month, a year
//! calendar ([`crate::calendar`]), a tag and year, the tag cloud, or a
//! standalone page. All of them share the same template and the archive
//! navigation widget.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod archive;
pub mod article;
pub mod build;
pub mod calendar;
pub mod compose;
pub mod config;
pub mod day;
pub mod entry;
pub mod feed;
pub mod html;
pub mod markdown;
pub mod tag;
pub mod template;
pub mod util;
pub mod write;
