use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::{
    types::{MonthOfTheYear, Playlist},
    utils,
};

/// Month buckets covered by a window of `day_boundary` days ending `today`.
///
/// The current month is always part of the window. Earlier months are added
/// until the start of the earliest one lies at least `day_boundary` days back.
pub fn window_months(
    day_boundary: u32,
    add_last_month: bool,
    today: NaiveDate,
) -> BTreeSet<MonthOfTheYear> {
    let current = utils::build_month(today);
    let mut months = BTreeSet::from([current]);

    let mut earliest = current;
    while (today - utils::month_start(earliest)).num_days() < i64::from(day_boundary) {
        earliest = utils::previous_month(earliest);
        months.insert(earliest);
    }

    if add_last_month {
        months.insert(utils::previous_month(current));
    }
    months
}

/// References of `playlist` that take part in a run on `today`.
///
/// Non-recents playlists keep every reference. For recents playlists, month
/// buckets outside the window are dropped and anything that is not a bucket
/// name passes through.
pub fn included_references(playlist: &Playlist, today: NaiveDate) -> Vec<&str> {
    let references = playlist.playlist_references.iter().map(String::as_str);
    if !playlist.is_recents() {
        return references.collect();
    }

    let window = window_months(playlist.day_boundary, playlist.add_last_month, today);
    references
        .filter(|name| match utils::parse_month_token(name) {
            Some(month) => window.contains(&month),
            None => true,
        })
        .collect()
}
