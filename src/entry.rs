//! Splits the raw tumblelog text into entries and parses the entries into
//! [`Day`] and [`Page`] records.
//!
//! The input is a sequence of entries separated by lines consisting of a
//! single `%`. An entry either starts a new day:
//!
//! ```text
//! 2024-01-02 Title of the day
//! Markdown of the first article
//! ```
//!
//! starts a new standalone page:
//!
//! ```text
//! @about[About] 2024-01-02! About this site
//! Markdown of the first article
//! ```
//!
//! or, lacking either header, continues the most recent day or page with an
//! additional article.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::day::{Day, Page};

/// Splits `input` on separator lines (a `%` alone on its line). Empty
/// fragments are dropped; the remaining entries keep document order.
pub fn split_entries(input: &str) -> Result<Vec<&str>> {
    let mut entries = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in input.split_inclusive('\n') {
        let end = offset + line.len();
        if line.trim_end_matches(|c: char| c == '\n' || c == '\r') == "%" {
            if start < offset {
                entries.push(&input[start..offset]);
            }
            start = end;
        }
        offset = end;
    }
    if start < input.len() {
        entries.push(&input[start..]);
    }

    if entries.is_empty() {
        return Err(Error::NoEntries);
    }
    Ok(entries)
}

/// What the parser is currently appending continuation entries to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Unknown,
    InDay,
    InPage,
}

/// Parses entries into days and pages, each sorted by date, most recent
/// first. Records sharing a date keep their parse order and are never
/// merged.
pub fn parse_entries<'a>(
    entries: impl IntoIterator<Item = &'a str>,
) -> Result<(Vec<Day<String>>, Vec<Page<String>>)> {
    let mut days: Vec<Day<String>> = Vec::new();
    let mut pages: Vec<Page<String>> = Vec::new();
    let mut state = State::Unknown;

    for entry in entries {
        match parse_header(entry)? {
            Some(Header::Day(day)) => {
                days.push(day);
                state = State::InDay;
            }
            Some(Header::Page(page)) => {
                pages.push(page);
                state = State::InPage;
            }
            None => {
                let articles = match state {
                    State::InDay => days.last_mut().map(|d| &mut d.articles),
                    State::InPage => pages.last_mut().map(|p| &mut p.articles),
                    State::Unknown => None,
                };
                match articles {
                    Some(articles) => articles.push(entry.to_owned()),
                    None => return Err(Error::NoHeaderForFirstEntry),
                }
            }
        }
    }

    days.sort_by(|a, b| b.date.cmp(&a.date));
    pages.sort_by(|a, b| b.date.cmp(&a.date));
    debug!(days = days.len(), pages = pages.len(), "parsed entries");
    Ok((days, pages))
}

/// Convenience wrapper: [`split_entries`] followed by [`parse_entries`].
pub fn parse(input: &str) -> Result<(Vec<Day<String>>, Vec<Page<String>>)> {
    parse_entries(split_entries(input)?)
}

enum Header {
    Day(Day<String>),
    Page(Page<String>),
}

/// Classifies an entry by its first line. Returns `Ok(None)` for entries
/// matching neither header grammar (continuations) and an error for
/// entries that match a grammar but fail validation.
fn parse_header(entry: &str) -> Result<Option<Header>> {
    let (line, body) = match entry.find('\n') {
        Some(i) => (&entry[..i], &entry[i + 1..]),
        None => (entry, ""),
    };
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.starts_with('@') {
        return parse_page_header(&line[1..], body);
    }
    parse_day_header(line, body)
}

/// `YYYY-MM-DD[ \t]+<title>`
fn parse_day_header(line: &str, body: &str) -> Result<Option<Header>> {
    let (date, rest) = match split_date(line) {
        Some(split) => split,
        None => return Ok(None),
    };
    if !starts_blank_or_empty(rest) {
        return Ok(None);
    }
    let date = to_date(date)?;
    let title = rest.trim();
    if title.is_empty() {
        return Err(Error::MissingDayTitle(date));
    }
    Ok(Some(Header::Day(Day {
        date,
        title: title.to_owned(),
        articles: vec![body.to_owned()],
    })))
}

/// `<name>[<label>][ \t]+YYYY-MM-DD(!)?[ \t]+<title>`, the leading `@`
/// already stripped.
fn parse_page_header(line: &str, body: &str) -> Result<Option<Header>> {
    let name_len = line
        .bytes()
        .take_while(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-'))
        .count();
    let (name, rest) = line.split_at(name_len);
    if name.is_empty() {
        return Ok(None);
    }
    let rest = match rest.strip_prefix('[') {
        Some(rest) => rest,
        None => return Ok(None),
    };
    let (label, rest) = match rest.find(']') {
        Some(i) => (&rest[..i], &rest[i + 1..]),
        None => return Ok(None),
    };
    if !starts_blank(rest) {
        return Ok(None);
    }
    let (date, rest) = match split_date(trim_blank_start(rest)) {
        Some(split) => split,
        None => return Ok(None),
    };
    let (show_date, rest) = match rest.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };
    if !starts_blank_or_empty(rest) {
        return Ok(None);
    }

    let date = to_date(date)?;
    let label = label.trim();
    if label.is_empty() {
        return Err(Error::MissingPageLabel(name.to_owned()));
    }
    let title = rest.trim();
    if title.is_empty() {
        return Err(Error::MissingPageTitle(name.to_owned()));
    }
    Ok(Some(Header::Page(Page {
        name: name.to_owned(),
        label: label.to_owned(),
        date,
        show_date,
        title: title.to_owned(),
        articles: vec![body.to_owned()],
    })))
}

/// Splits a leading `\d{4}-\d{2}-\d{2}` off of `s`.
fn split_date(s: &str) -> Option<(&str, &str)> {
    const SHAPE: &[u8; 10] = b"dddd-dd-dd";
    let bytes = s.as_bytes();
    if bytes.len() < SHAPE.len() {
        return None;
    }
    let shaped = SHAPE.iter().zip(bytes).all(|(shape, b)| match shape {
        b'd' => b.is_ascii_digit(),
        _ => b == shape,
    });
    match shaped {
        true => Some(s.split_at(SHAPE.len())),
        false => None,
    }
}

fn to_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_owned()))
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn starts_blank(s: &str) -> bool {
    s.starts_with(is_blank)
}

fn starts_blank_or_empty(s: &str) -> bool {
    s.is_empty() || starts_blank(s)
}

fn trim_blank_start(s: &str) -> &str {
    s.trim_start_matches(is_blank)
}

/// Represents the result of an entry-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error splitting or parsing entries. All of them are fatal.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Returned when the input contains no entries at all.
    #[error("no blog entries found")]
    NoEntries,

    /// Returned when a day header has a date but no title.
    #[error("a day must have a title ({0})")]
    MissingDayTitle(NaiveDate),

    /// Returned when a page header has an empty label.
    #[error("a page must have a label (@{0})")]
    MissingPageLabel(String),

    /// Returned when a page header has no title.
    #[error("a page must have a title (@{0})")]
    MissingPageTitle(String),

    /// Returned when the first entry is neither a day nor a page.
    #[error("no date or page specified for first tumblelog entry")]
    NoHeaderForFirstEntry,

    /// Returned when a header date is shaped like `YYYY-MM-DD` but isn't a
    /// calendar date.
    #[error("invalid date `{0}`")]
    InvalidDate(String),
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_split_entries() -> Result<()> {
        let entries = split_entries("a\n%\nb\n%\n%\nc")?;
        assert_eq!(vec!["a\n", "b\n", "c"], entries);
        Ok(())
    }

    #[test]
    fn test_split_entries_separator_must_be_alone_on_its_line() -> Result<()> {
        let entries = split_entries("a\n 100%\n%x\n")?;
        assert_eq!(vec!["a\n 100%\n%x\n"], entries);
        Ok(())
    }

    #[test]
    fn test_split_entries_empty() {
        assert_eq!(Err(Error::NoEntries), split_entries(""));
        assert_eq!(Err(Error::NoEntries), split_entries("%\n%\n"));
    }

    #[test]
    fn test_parse_days_sorted_descending_with_continuations() -> Result<()> {
        let (days, pages) =
            parse("2024-01-01 First\none\n%\ntwo\n%\n2024-02-01 Second\nthree\n")?;
        assert!(pages.is_empty());
        assert_eq!(2, days.len());
        assert_eq!(date("2024-02-01"), days[0].date);
        assert_eq!("Second", days[0].title);
        assert_eq!(vec!["three\n"], days[0].articles);
        assert_eq!(vec!["one\n", "two\n"], days[1].articles);
        Ok(())
    }

    #[test]
    fn test_parse_duplicate_dates_are_not_merged() -> Result<()> {
        let (days, _) =
            parse("2024-01-02 New Year\nHello\n%\n2024-01-02 Same Day\nAgain\n")?;
        assert_eq!(2, days.len());
        // Stable sort: parse order is kept for equal dates.
        assert_eq!("New Year", days[0].title);
        assert_eq!("Same Day", days[1].title);
        Ok(())
    }

    #[test]
    fn test_parse_page() -> Result<()> {
        let (days, pages) = parse(
            "@about[ About ] 2023-05-06! About me\nhi\n%\nmore\n%\n\
             @now[Now] 2024-01-01 What now\nstuff\n",
        )?;
        assert!(days.is_empty());
        assert_eq!(2, pages.len());
        assert_eq!("now", pages[0].name);
        assert!(!pages[0].show_date);
        assert_eq!("about", pages[1].name);
        assert_eq!("About", pages[1].label);
        assert_eq!("About me", pages[1].title);
        assert!(pages[1].show_date);
        assert_eq!(vec!["hi\n", "more\n"], pages[1].articles);
        Ok(())
    }

    #[test]
    fn test_parse_header_without_newline() -> Result<()> {
        let (days, _) = parse("2024-01-02 Title only")?;
        assert_eq!("Title only", days[0].title);
        assert_eq!(vec![""], days[0].articles);
        Ok(())
    }

    #[test]
    fn test_parse_missing_day_title() {
        assert_eq!(
            Err(Error::MissingDayTitle(date("2024-01-02"))),
            parse("2024-01-02 \t\nbody\n")
        );
        assert_eq!(
            Err(Error::MissingDayTitle(date("2024-01-02"))),
            parse("2024-01-02\nbody\n")
        );
    }

    #[test]
    fn test_parse_missing_page_label_and_title() {
        assert_eq!(
            Err(Error::MissingPageLabel("about".to_owned())),
            parse("@about[ ] 2024-01-02 Title\nbody\n")
        );
        assert_eq!(
            Err(Error::MissingPageTitle("about".to_owned())),
            parse("@about[About] 2024-01-02!\nbody\n")
        );
    }

    #[test]
    fn test_parse_first_entry_without_header() {
        assert_eq!(
            Err(Error::NoHeaderForFirstEntry),
            parse("just text\n%\n2024-01-02 Title\nbody\n")
        );
        // A date glued to text isn't a header either.
        assert_eq!(
            Err(Error::NoHeaderForFirstEntry),
            parse("2024-01-02x\nbody\n")
        );
    }

    #[test]
    fn test_parse_invalid_date() {
        assert_eq!(
            Err(Error::InvalidDate("2024-02-30".to_owned())),
            parse("2024-02-30 Nope\nbody\n")
        );
    }
}
