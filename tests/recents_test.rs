mod common;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use common::playlist;
use spotmix::{
    engine::recents::{included_references, window_months},
    types::{MonthOfTheYear, PlaylistType},
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn months(list: &[(i32, u32)]) -> BTreeSet<MonthOfTheYear> {
    list.iter()
        .map(|&(year, month)| MonthOfTheYear { year, month })
        .collect()
}

#[test]
fn test_zero_boundary_is_current_month_only() {
    assert_eq!(
        window_months(0, false, date(2026, 10, 17)),
        months(&[(2026, 10)])
    );
    assert_eq!(
        window_months(0, false, date(2026, 10, 1)),
        months(&[(2026, 10)])
    );
}

#[test]
fn test_forty_days_spans_two_months() {
    assert_eq!(
        window_months(40, false, date(2026, 10, 17)),
        months(&[(2026, 9), (2026, 10)])
    );
}

#[test]
fn test_boundary_at_month_start_edge() {
    // 16 days have elapsed since October 1st
    assert_eq!(
        window_months(16, false, date(2026, 10, 17)),
        months(&[(2026, 10)])
    );
    assert_eq!(
        window_months(17, false, date(2026, 10, 17)),
        months(&[(2026, 9), (2026, 10)])
    );

    // on the first of the month any positive boundary reaches back
    assert_eq!(
        window_months(1, false, date(2026, 10, 1)),
        months(&[(2026, 9), (2026, 10)])
    );
}

#[test]
fn test_window_crosses_year() {
    assert_eq!(
        window_months(10, false, date(2026, 1, 5)),
        months(&[(2025, 12), (2026, 1)])
    );
}

#[test]
fn test_long_window_walks_several_months() {
    assert_eq!(
        window_months(70, false, date(2026, 10, 17)),
        months(&[(2026, 8), (2026, 9), (2026, 10)])
    );
}

#[test]
fn test_add_last_month_forces_previous_bucket() {
    assert_eq!(
        window_months(0, true, date(2026, 10, 17)),
        months(&[(2026, 9), (2026, 10)])
    );
}

#[test]
fn test_recents_filters_month_buckets() {
    let mut recents = playlist(
        "recents",
        &[],
        &["october 2026", "September 2026", "aug 2026", "chill"],
        None,
    );
    recents.playlist_type = PlaylistType::Recents;
    recents.day_boundary = 0;

    let included = included_references(&recents, date(2026, 10, 17));

    // stored sort order, out-of-window buckets dropped, other names kept
    assert_eq!(included, vec!["chill", "october 2026"]);
}

#[test]
fn test_recents_window_includes_previous_bucket() {
    let mut recents = playlist(
        "recents",
        &[],
        &["october 2026", "september 2026", "august 2026"],
        None,
    );
    recents.playlist_type = PlaylistType::Recents;
    recents.day_boundary = 40;

    let included = included_references(&recents, date(2026, 10, 17));
    assert_eq!(included, vec!["october 2026", "september 2026"]);

    // the definition itself is untouched
    assert_eq!(recents.playlist_references.len(), 3);
}

#[test]
fn test_default_playlist_keeps_every_reference() {
    let standard = playlist("standard", &[], &["october 2026", "march 2001"], None);

    let included = included_references(&standard, date(2026, 10, 17));
    assert_eq!(included, vec!["march 2001", "october 2026"]);
}
