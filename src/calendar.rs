//! Builds the month-grid calendars shown on the year pages.
//!
//! A single date cursor walks every day from January 1st of the oldest
//! day's year to December 31st of the newest day's year. Dates are laid out
//! in ISO week rows (Monday first); a row is emitted when the cursor passes
//! a Sunday and at the end of every month, so a week straddling two months
//! shows up as a partial row in both.

use chrono::{Datelike, NaiveDate};

use crate::day::{year_week, Day};
use crate::html::escape;

/// A single day in a [`WeekRow`].
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Outside of the month.
    Blank,
    /// A day without content.
    Plain(u32),
    /// A day with content, linking to its day page.
    Link { date: NaiveDate, title: String },
}

/// One table row: seven cells, Monday first.
#[derive(Clone, Debug, PartialEq)]
pub struct WeekRow {
    /// ISO year of the week.
    pub year: i32,
    /// ISO week number.
    pub week: u32,
    /// Whether any cell in the row links to a day.
    pub active: bool,
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonthTable {
    pub month: u32,
    pub name: String,
    /// Whether any day of the month links to a day page.
    pub active: bool,
    pub rows: Vec<WeekRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct YearCalendar {
    pub year: i32,
    pub months: Vec<MonthTable>,
}

/// Builds one [`YearCalendar`] for every calendar year between the oldest
/// and the newest of `days` (sorted most recent first), twelve months each.
/// When several days share a date, the cell links to the one parsed last.
pub fn build<A>(days: &[Day<A>]) -> Vec<YearCalendar> {
    let (first, last) = match (days.last(), days.first()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => return Vec::new(),
    };
    let (start_year, end_year) = (first.year(), last.year());
    let mut cursor = match NaiveDate::from_ymd_opt(start_year, 1, 1) {
        Some(date) => date,
        None => return Vec::new(),
    };

    let mut pending = days.iter().rev().peekable();
    let mut calendars = Vec::new();

    'years: for year in start_year..=end_year {
        let mut months = Vec::with_capacity(12);
        loop {
            let month = cursor.month();
            let name = cursor.format("%B").to_string();
            let mut rows = Vec::new();
            let mut row = blank_row();
            let mut week_active = false;
            let mut month_active = false;

            let last_in_month = loop {
                let weekday = cursor.weekday().num_days_from_monday() as usize;

                // Anything older than the cursor was already linked.
                while pending.next_if(|d| d.date < cursor).is_some() {}
                match pending.next_if(|d| d.date == cursor) {
                    Some(day) => {
                        while pending.next_if(|d| d.date == cursor).is_some() {}
                        row[weekday] = Cell::Link {
                            date: cursor,
                            title: day.title.clone(),
                        };
                        week_active = true;
                        month_active = true;
                    }
                    None => row[weekday] = Cell::Plain(cursor.day()),
                }

                if weekday == 6 {
                    rows.push(week_row(cursor, std::mem::replace(&mut row, blank_row()), week_active));
                    week_active = false;
                }

                let today = cursor;
                cursor = match cursor.succ_opt() {
                    Some(next) => next,
                    None => {
                        months.push(finish_month(month, name, month_active, rows, today, row, week_active));
                        calendars.push(YearCalendar { year, months });
                        break 'years;
                    }
                };
                if cursor.month() != month {
                    break today;
                }
            };

            months.push(finish_month(month, name, month_active, rows, last_in_month, row, week_active));
            if cursor.year() != year {
                break;
            }
        }
        calendars.push(YearCalendar { year, months });
    }
    calendars
}

fn blank_row() -> Vec<Cell> {
    vec![Cell::Blank; 7]
}

fn week_row(date: NaiveDate, cells: Vec<Cell>, active: bool) -> WeekRow {
    let (year, week) = year_week(date);
    WeekRow {
        year,
        week,
        active,
        cells,
    }
}

/// Flushes a trailing partial row (the month didn't end on a Sunday) and
/// assembles the month.
fn finish_month(
    month: u32,
    name: String,
    active: bool,
    mut rows: Vec<WeekRow>,
    last_day: NaiveDate,
    row: Vec<Cell>,
    week_active: bool,
) -> MonthTable {
    if last_day.weekday().num_days_from_monday() < 6 {
        rows.push(week_row(last_day, row, week_active));
    }
    MonthTable {
        month,
        name,
        active,
        rows,
    }
}

impl YearCalendar {
    /// Renders the body of the year page. `start_year` and `end_year` bound
    /// the year navigation.
    pub fn to_html(&self, start_year: i32, end_year: i32) -> String {
        let day_names = day_names_row();
        let mut html = String::from("<div class=\"tl-topbar\"></div>\n<article>\n");
        html.push_str(&year_nav(start_year, self.year, end_year));
        for month in &self.months {
            let caption = match month.active {
                true => format!("<a href=\"{:02}/\">{}</a>", month.month, month.name),
                false => month.name.clone(),
            };
            html.push_str("  <table class=\"tl-month\">\n");
            html.push_str(&format!("    <caption>{}</caption>\n", caption));
            html.push_str("    <thead>\n");
            html.push_str(&day_names);
            html.push_str("    </thead>\n    <tbody>\n");
            for row in &month.rows {
                html.push_str(&row.to_html(self.year));
            }
            html.push_str("    </tbody>\n  </table>\n");
        }
        html.push_str("</article>\n");
        html
    }
}

impl WeekRow {
    /// The link to the row's week page, relative to the page of
    /// `calendar_year`, if the row is active.
    pub fn week_href(&self, calendar_year: i32) -> Option<String> {
        match (self.active, self.year == calendar_year) {
            (false, _) => None,
            (true, true) => Some(format!("week/{:02}.html", self.week)),
            (true, false) => Some(format!("../{:04}/week/{:02}.html", self.year, self.week)),
        }
    }

    fn to_html(&self, calendar_year: i32) -> String {
        let week = match self.week_href(calendar_year) {
            Some(href) => format!("<a href=\"{}\">{}</a>", href, self.week),
            None => self.week.to_string(),
        };
        let mut html = format!("      <tr>\n        <th scope=\"row\">{}</th>\n", week);
        for cell in &self.cells {
            let content = match cell {
                Cell::Blank => String::new(),
                Cell::Plain(day) => day.to_string(),
                Cell::Link { date, title } => format!(
                    "<a href=\"../{}\" title=\"{}\">{}</a>",
                    date.format("%Y/%m/%d.html"),
                    escape(title),
                    date.day()
                ),
            };
            html.push_str(&format!("        <td>{}</td>\n", content));
        }
        html.push_str("      </tr>\n");
        html
    }
}

fn day_names_row() -> String {
    let mut html = String::from("      <tr>\n        <td></td>\n");
    // 2019-01-07 is a Monday.
    if let Some(monday) = NaiveDate::from_ymd_opt(2019, 1, 7) {
        for date in monday.iter_days().take(7) {
            html.push_str(&format!("        <th scope=\"col\">{}</th>\n", date.format("%a")));
        }
    }
    html.push_str("      </tr>\n");
    html
}

fn year_nav(start_year: i32, year: i32, end_year: i32) -> String {
    let mut nav = match year > start_year {
        true => format!("    <div>\u{2190} <a href=\"../{0}/\">{0}</a></div>\n", year - 1),
        false => String::from("    <div></div>\n"),
    };
    nav.push_str(&format!("    <h2>{}</h2>\n", year));
    match year < end_year {
        true => nav.push_str(&format!("    <div><a href=\"../{0}/\">{0}</a> \u{2192}</div>\n", year + 1)),
        false => nav.push_str("    <div></div>\n"),
    }
    format!("  <div class=\"tl-year\">\n{}  </div>\n", nav)
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn day(s: &str, title: &str) -> Day<String> {
        Day {
            date: date(s),
            title: title.to_owned(),
            articles: Vec::new(),
        }
    }

    #[test]
    fn test_build_spans_full_years() {
        let calendars = build(&[day("2024-03-31", "b"), day("2023-06-01", "a")]);
        assert_eq!(vec![2023, 2024], calendars.iter().map(|c| c.year).collect::<Vec<_>>());
        for calendar in &calendars {
            assert_eq!(12, calendar.months.len());
        }
        assert!(build::<String>(&[]).is_empty());
    }

    #[test]
    fn test_sunday_month_end_closes_active_week() {
        let calendars = build(&[day("2024-03-31", "Easter")]);
        let march = &calendars[0].months[2];
        assert!(march.active);
        let last = march.rows.last().unwrap();
        assert!(last.active);
        assert_eq!((2024, 13), (last.year, last.week));
        assert_eq!(Some("week/13.html".to_owned()), last.week_href(2024));
        assert_eq!(
            Cell::Link {
                date: date("2024-03-31"),
                title: "Easter".to_owned()
            },
            last.cells[6]
        );

        let april = &calendars[0].months[3];
        assert!(!april.active);
        let first = &april.rows[0];
        assert_eq!(Cell::Plain(1), first.cells[0]);
        assert_eq!((2024, 14), (first.year, first.week));
        assert!(!first.active);
        assert_eq!(None, first.week_href(2024));
    }

    #[test]
    fn test_partial_rows_at_month_boundaries() {
        let calendars = build(&[day("2024-01-31", "x")]);
        let january = &calendars[0].months[0];
        // 2024-01-31 is a Wednesday; the row is flushed at month end.
        let last = january.rows.last().unwrap();
        assert!(last.active);
        assert_eq!(5, last.week);
        assert_eq!(Cell::Blank, last.cells[3]);
        // February starts on Thursday in the same ISO week.
        let february = &calendars[0].months[1];
        assert_eq!(5, february.rows[0].week);
        assert_eq!(Cell::Blank, february.rows[0].cells[2]);
        assert_eq!(Cell::Plain(1), february.rows[0].cells[3]);
        assert!(!february.rows[0].active);
    }

    #[test]
    fn test_week_of_previous_iso_year_links_across_years() {
        // 2021-01-03 is the Sunday of ISO week 53 of 2020.
        let calendars = build(&[day("2021-01-03", "x")]);
        let row = &calendars[0].months[0].rows[0];
        assert_eq!((2020, 53), (row.year, row.week));
        assert_eq!(Some("../2020/week/53.html".to_owned()), row.week_href(2021));
    }

    #[test]
    fn test_duplicate_dates_link_once_and_keep_going() {
        let calendars = build(&[
            day("2024-01-10", "later"),
            day("2024-01-02", "first"),
            day("2024-01-02", "second"),
        ]);
        let january = &calendars[0].months[0];
        let cells: Vec<&Cell> = january.rows.iter().flat_map(|r| r.cells.iter()).collect();
        let links: Vec<&Cell> = cells.into_iter().filter(|c| matches!(c, Cell::Link { .. })).collect();
        assert_eq!(2, links.len());
        assert_eq!(
            &Cell::Link {
                date: date("2024-01-02"),
                title: "second".to_owned()
            },
            links[0]
        );
    }

    #[test]
    fn test_to_html() {
        let calendars = build(&[day("2024-03-31", "Easter & more")]);
        let html = calendars[0].to_html(2023, 2024);
        assert!(html.contains("<div>\u{2190} <a href=\"../2023/\">2023</a></div>"));
        assert!(!html.contains("\u{2192}"));
        assert!(html.contains("<caption><a href=\"03/\">March</a></caption>"));
        assert!(html.contains("<caption>April</caption>"));
        assert!(html.contains("<th scope=\"row\"><a href=\"week/13.html\">13</a></th>"));
        assert!(html.contains(
            "<td><a href=\"../2024/03/31.html\" title=\"Easter &amp; more\">31</a></td>"
        ));
        assert!(html.contains("<th scope=\"col\">Mon</th>"));
    }
}
