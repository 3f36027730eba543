mod common;

use std::collections::BTreeSet;

use common::playlist;
use serde_json::json;
use spotmix::{
    error::{Error, ValidationError},
    types::{DEFAULT_DAY_BOUNDARY, DEFAULT_RECOMMENDATION_SAMPLE, Playlist, PlaylistType},
    update::{ListUpdate, PlaylistUpdate},
};

fn parse(value: serde_json::Value) -> PlaylistUpdate {
    serde_json::from_value(value).unwrap()
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_list_fields_have_three_states() {
    let absent = parse(json!({ "name": "mix" }));
    assert_eq!(absent.parts, ListUpdate::Absent);

    let sentinel = parse(json!({ "name": "mix", "parts": -1 }));
    assert_eq!(sentinel.parts, ListUpdate::Clear);

    let empty = parse(json!({ "name": "mix", "playlist_references": [] }));
    assert_eq!(empty.playlist_references, ListUpdate::Clear);

    let null = parse(json!({ "name": "mix", "parts": null }));
    assert_eq!(null.parts, ListUpdate::Absent);
}

#[test]
fn test_replacement_collapses_duplicates() {
    let update = parse(json!({ "name": "mix", "parts": ["b", "a", "b"] }));
    assert_eq!(update.parts, ListUpdate::Replace(names(&["a", "b"])));
}

#[test]
fn test_invalid_list_values_are_rejected() {
    for value in [json!(-2), json!("a"), json!([1, 2]), json!([""]), json!({})] {
        let result: Result<PlaylistUpdate, _> =
            serde_json::from_value(json!({ "name": "mix", "parts": value.clone() }));
        assert!(result.is_err(), "accepted parts = {value}");
    }
}

#[test]
fn test_standard_is_an_alias_for_default() {
    let update = parse(json!({ "name": "mix", "type": "standard" }));
    assert_eq!(update.playlist_type, Some(PlaylistType::Default));

    let update = parse(json!({ "name": "mix", "type": "recents" }));
    assert_eq!(update.playlist_type, Some(PlaylistType::Recents));
}

#[test]
fn test_apply_leaves_omitted_fields() {
    let mut stored = playlist("mix", &["p1"], &["other"], Some("spotify:playlist:dest"));
    stored.shuffle = true;

    let update = parse(json!({ "name": "mix", "parts": ["p2"] }));
    update.apply(&mut stored).unwrap();

    assert_eq!(stored.parts, names(&["p2"]));
    assert_eq!(stored.playlist_references, names(&["other"]));
    assert!(stored.shuffle);
    assert_eq!(stored.uri.as_deref(), Some("spotify:playlist:dest"));
}

#[test]
fn test_sentinel_clears_a_list() {
    let mut stored = playlist("mix", &["p1", "p2"], &["other"], None);

    let update = parse(json!({ "name": "mix", "parts": -1 }));
    update.apply(&mut stored).unwrap();

    assert!(stored.parts.is_empty());
    assert_eq!(stored.playlist_references, names(&["other"]));
}

#[test]
fn test_empty_strings_clear_optional_text() {
    let mut stored = playlist("mix", &[], &[], Some("spotify:playlist:dest"));
    stored.description_suffix = Some("(auto)".to_string());

    let update = parse(json!({ "name": "mix", "uri": "", "description_suffix": "" }));
    update.apply(&mut stored).unwrap();

    assert_eq!(stored.uri, None);
    assert_eq!(stored.description_suffix, None);
}

#[test]
fn test_update_without_changes_is_rejected() {
    let mut stored = playlist("mix", &["p1"], &[], None);
    let before = stored.clone();

    let err = PlaylistUpdate::named("mix").apply(&mut stored).unwrap_err();

    assert!(matches!(err, Error::InvalidInput(ref msg) if msg == "no changes to make"));
    assert_eq!(stored, before);
}

#[test]
fn test_self_reference_is_rejected() {
    let mut stored = playlist("mix", &[], &[], None);
    let before = stored.clone();

    let update = parse(json!({ "name": "mix", "playlist_references": ["mix", "other"] }));
    let err = update.apply(&mut stored).unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::SelfReference(ref name)) if name == "mix"
    ));
    assert_eq!(stored, before);

    let err = parse(json!({ "name": "loop", "playlist_references": ["loop"] }))
        .into_playlist()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::SelfReference(_))
    ));
}

#[test]
fn test_new_playlist_gets_defaults() {
    let created = PlaylistUpdate::named("mix").into_playlist().unwrap();

    assert_eq!(created, Playlist::new("mix", PlaylistType::Default));
    assert_eq!(created.recommendation_sample, DEFAULT_RECOMMENDATION_SAMPLE);
    assert_eq!(created.day_boundary, 0);
    assert!(!created.shuffle);
}

#[test]
fn test_new_recents_playlist_gets_window_default() {
    let created = parse(json!({ "name": "recents", "type": "recents" }))
        .into_playlist()
        .unwrap();
    assert_eq!(created.day_boundary, DEFAULT_DAY_BOUNDARY);

    let created = parse(json!({ "name": "recents", "type": "recents", "day_boundary": 60 }))
        .into_playlist()
        .unwrap();
    assert_eq!(created.day_boundary, 60);
}

#[test]
fn test_new_playlist_requires_name() {
    let err = parse(json!({ "parts": ["p1"] })).into_playlist().unwrap_err();
    assert!(matches!(err, Error::InvalidInput(ref msg) if msg == "no name provided"));

    let err = PlaylistUpdate::named("  ").into_playlist().unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}
