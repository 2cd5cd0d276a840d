//! Culture-aware date/time parsing and invariant formatting.

use crate::culture::{Culture, DateOrder};
use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use std::ops::RangeInclusive;

/// Invariant output layout, `MM/dd/yyyy HH:mm:ss`.
pub(crate) const INVARIANT_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Years written with two digits map into `1950..=2049`.
const TWO_DIGIT_YEAR_MAX: i32 = 2049;

/// Years a parsed date may fall in.
const YEARS: RangeInclusive<i32> = 1..=9999;

/// Time layouts on a 24-hour clock.
const CLOCK_24: [&str; 3] = ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"];

/// Time layouts with an AM/PM designator.
const CLOCK_12: [&str; 3] = ["%I:%M %p", "%I:%M:%S %p", "%I:%M:%S%.f %p"];

/// English month-name layouts, accepted under every culture.
///
/// `%B` matches full and abbreviated names in any case.
const MONTH_NAMES: [(&str, DateFill); 6] = [
    ("%B %d, %Y", DateFill::Complete),
    ("%B %d %Y", DateFill::Complete),
    ("%d %B %Y", DateFill::Complete),
    ("%B %d", DateFill::Year),
    ("%d %B", DateFill::Year),
    ("%B %Y", DateFill::Day),
];

/// Date components a layout leaves out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateFill {
    /// Day, month and year are all present
    Complete,
    /// Year comes from the reference date
    Year,
    /// Day is the first of the month
    Day,
    /// No date at all; the reference date is used
    Today,
}

/// One chrono format string and how to complete what it leaves out.
#[derive(Debug, Clone)]
struct Layout {
    format: String,
    fill: DateFill,
    two_digit_year: bool,
    has_time: bool,
    digit_fields: usize,
}

impl Layout {
    fn new(format: String, fill: DateFill, two_digit_year: bool, has_time: bool) -> Self {
        // every specifier in use reads digits except month names and AM/PM
        let digit_fields =
            format.matches('%').count() - format.matches("%B").count() - format.matches("%p").count();
        Self {
            format,
            fill,
            two_digit_year,
            has_time,
            digit_fields,
        }
    }

    /// `digit_runs` is the number of digit runs in `input`.
    fn apply(&self, input: &str, digit_runs: usize, today: NaiveDate) -> Option<NaiveDateTime> {
        // chrono splits a run by field width, so `2019` could read as `20` `19`
        if digit_runs != self.digit_fields {
            return None;
        }

        let mut parsed = Parsed::new();
        format::parse(&mut parsed, input, StrftimeItems::new(&self.format)).ok()?;

        let date = match self.fill {
            DateFill::Complete => parsed.to_naive_date().ok()?,
            DateFill::Year => {
                parsed.set_year(i64::from(today.year())).ok()?;
                parsed.to_naive_date().ok()?
            }
            DateFill::Day => {
                parsed.set_day(1).ok()?;
                parsed.to_naive_date().ok()?
            }
            DateFill::Today => today,
        };

        // chrono pivots `%y` at 1970
        let date = if self.two_digit_year && date.year() > TWO_DIGIT_YEAR_MAX {
            date.with_year(date.year() - 100)?
        } else {
            date
        };

        let time = if self.has_time {
            parsed.to_naive_time().ok()?
        } else {
            NaiveTime::MIN
        };

        Some(date.and_time(time)).filter(|dt| YEARS.contains(&dt.year()))
    }
}

/// Parses dates, dates with times, and bare times under one culture.
///
/// Holds the layouts of the culture in evaluation order and the reference
/// date that completes inputs without a year or without a date.
#[derive(Debug, Clone)]
pub(crate) struct DateParser {
    layouts: Vec<Layout>,
    designators: Option<(&'static str, &'static str)>,
    today: NaiveDate,
}

impl DateParser {
    pub(crate) fn new(culture: &Culture, today: NaiveDate) -> Self {
        Self {
            layouts: layouts(culture),
            // chrono only reads `AM`/`PM`
            designators: culture.designators().filter(|(am, _)| !am.is_ascii()),
            today,
        }
    }

    /// Returns the first interpretation of `input` as a point in time.
    ///
    /// RFC 3339 and RFC 2822 timestamps are tried first and keep the wall
    /// clock time they were written with.
    pub(crate) fn parse(&self, input: &str) -> Option<NaiveDateTime> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Some(dt) = DateTime::parse_from_rfc3339(input)
            .or_else(|_| DateTime::parse_from_rfc2822(input))
            .ok()
            .map(|dt| dt.naive_local())
        {
            return Some(dt).filter(|dt| YEARS.contains(&dt.year()));
        }

        let mut text = input.split_whitespace().collect::<Vec<_>>().join(" ");
        if let Some((am, pm)) = self.designators {
            text = text.replace(am, "AM").replace(pm, "PM");
        }

        let runs = digit_runs(&text);
        self.layouts
            .iter()
            .find_map(|layout| layout.apply(&text, runs, self.today))
    }
}

/// Formats a date/time in the invariant layout.
pub(crate) fn format_invariant(value: &NaiveDateTime) -> String {
    value.format(INVARIANT_FORMAT).to_string()
}

fn layouts(culture: &Culture) -> Vec<Layout> {
    let sep = culture.date_separator();
    let year_first = format!("%Y{sep}%m{sep}%d");

    let mut dates = match culture.date_order() {
        DateOrder::MonthDayYear => vec![
            (format!("%m{sep}%d{sep}%Y"), DateFill::Complete),
            (year_first, DateFill::Complete),
            (format!("%m{sep}%d"), DateFill::Year),
        ],
        DateOrder::DayMonthYear => vec![
            (format!("%d{sep}%m{sep}%Y"), DateFill::Complete),
            (year_first, DateFill::Complete),
            (format!("%d{sep}%m"), DateFill::Year),
        ],
        DateOrder::YearMonthDay => vec![
            (year_first, DateFill::Complete),
            (format!("%m{sep}%d"), DateFill::Year),
        ],
    };
    dates.push(("%Y-%m-%d".to_string(), DateFill::Complete));
    dates.extend(MONTH_NAMES.iter().map(|&(f, fill)| (f.to_string(), fill)));

    let mut clocks = CLOCK_24.to_vec();
    if culture.designators().is_some() {
        clocks.extend(CLOCK_12);
    }

    let mut layouts = Vec::new();
    for (date, fill) in dates {
        let iso = date.contains('-');
        for (date, two_digit_year) in year_variants(date) {
            let layout = |pattern, has_time| Layout::new(pattern, fill, two_digit_year, has_time);
            for clock in &clocks {
                layouts.push(layout(format!("{date} {clock}"), true));
            }
            if iso {
                for clock in CLOCK_24 {
                    layouts.push(layout(format!("{date}T{clock}"), true));
                }
            }
            layouts.push(layout(date, false));
        }
    }

    layouts.extend(
        clocks
            .iter()
            .map(|clock| Layout::new((*clock).to_string(), DateFill::Today, false, true)),
    );

    layouts
}

fn digit_runs(text: &str) -> usize {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .count()
}

/// Two-digit year form first, so `%Y` never reads `49` as the year 49.
fn year_variants(date: String) -> Vec<(String, bool)> {
    if date.contains("%Y") {
        vec![(date.replace("%Y", "%y"), true), (date, false)]
    } else {
        vec![(date, false)]
    }
}
