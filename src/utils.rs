use std::{cmp::Ordering, collections::HashSet};

use chrono::{Datelike, NaiveDate};

use crate::types::{MonthOfTheYear, Track};

/// Month names in calendar order; index + 1 is the month number.
pub const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn month_number(token: &str) -> Option<u32> {
    let token = token.to_lowercase();
    MONTHS
        .iter()
        .position(|name| *name == token || (token.len() == 3 && name.starts_with(&token)))
        .map(|idx| idx as u32 + 1)
}

/// Parses a `"<month> <year>"` bucket name such as `"October 2026"` or `"oct 2026"`.
pub fn parse_month_token(name: &str) -> Option<MonthOfTheYear> {
    let mut tokens = name.split_whitespace();
    let month = month_number(tokens.next()?)?;
    let year = tokens.next()?.parse::<i32>().ok()?;
    if tokens.next().is_some() || !(1..=9999).contains(&year) {
        return None;
    }
    Some(MonthOfTheYear { year, month })
}

pub fn build_month(date: NaiveDate) -> MonthOfTheYear {
    MonthOfTheYear {
        year: date.year(),
        month: date.month(),
    }
}

pub fn month_start(month: MonthOfTheYear) -> NaiveDate {
    NaiveDate::from_ymd_opt(month.year, month.month, 1).unwrap_or(NaiveDate::MIN)
}

pub fn previous_month(month: MonthOfTheYear) -> MonthOfTheYear {
    if month.month == 1 {
        MonthOfTheYear {
            year: month.year - 1,
            month: 12,
        }
    } else {
        MonthOfTheYear {
            year: month.year,
            month: month.month - 1,
        }
    }
}

/// Orders bucket names chronologically; names that are not buckets sort
/// after all buckets, alphabetically.
pub fn compare_month_tokens(a: &str, b: &str) -> Ordering {
    match (parse_month_token(a), parse_month_token(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Keeps the first occurrence of every track id.
pub fn remove_duplicate_tracks(tracks: &mut Vec<Track>) {
    let mut seen_ids = HashSet::new();
    tracks.retain(|track| seen_ids.insert(track.id.clone()));
}

/// Accepts `spotify:playlist:<id>`, an open.spotify.com link or a bare id.
pub fn playlist_id_from_uri(uri: &str) -> Option<String> {
    let uri = uri.trim();
    let id = if let Some(rest) = uri.strip_prefix("spotify:playlist:") {
        rest
    } else if let Some((_, rest)) = uri.split_once("/playlist/") {
        rest.split(['?', '/']).next().unwrap_or_default()
    } else {
        uri
    };

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        None
    } else {
        Some(id.to_string())
    }
}
