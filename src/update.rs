//! Partial updates of playlist definitions.
//!
//! Every attribute is optional. List attributes carry three states: absent
//! (leave unchanged), cleared, or replaced. On the wire a list is cleared with
//! either `[]` or the `-1` sentinel.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

use crate::{
    error::{Error, Result, ValidationError},
    types::{Playlist, PlaylistType},
};

/// Marker the front end sends when the last entry of a list was removed.
pub const CLEARED_LIST_SENTINEL: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListUpdate {
    #[default]
    Absent,
    Clear,
    Replace(BTreeSet<String>),
}

impl ListUpdate {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    fn apply_to(&self, target: &mut BTreeSet<String>) {
        match self {
            Self::Absent => {}
            Self::Clear => target.clear(),
            Self::Replace(entries) => *target = entries.clone(),
        }
    }
}

fn list_update<'de, D>(deserializer: D) -> std::result::Result<ListUpdate, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(ListUpdate::Absent),
        Value::Number(n) if n.as_i64() == Some(CLEARED_LIST_SENTINEL) => Ok(ListUpdate::Clear),
        Value::Array(items) if items.is_empty() => Ok(ListUpdate::Clear),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Ok(s),
                other => Err(de::Error::custom(format!(
                    "expected a non-empty playlist name, got {other}"
                ))),
            })
            .collect::<std::result::Result<BTreeSet<_>, _>>()
            .map(ListUpdate::Replace),
        other => Err(de::Error::custom(format!(
            "expected a list of names or {CLEARED_LIST_SENTINEL}, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistUpdate {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "list_update")]
    pub parts: ListUpdate,
    #[serde(default, deserialize_with = "list_update")]
    pub playlist_references: ListUpdate,
    #[serde(rename = "type", default)]
    pub playlist_type: Option<PlaylistType>,
    #[serde(default)]
    pub day_boundary: Option<u32>,
    #[serde(default)]
    pub recommendation_sample: Option<u32>,
    #[serde(default)]
    pub shuffle: Option<bool>,
    #[serde(default)]
    pub include_recommendations: Option<bool>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub add_last_month: Option<bool>,
    #[serde(default)]
    pub description_overwrite: Option<String>,
    #[serde(default)]
    pub description_suffix: Option<String>,
}

impl PlaylistUpdate {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// True when no attribute besides the name was supplied.
    pub fn is_empty(&self) -> bool {
        self.parts.is_absent()
            && self.playlist_references.is_absent()
            && self.playlist_type.is_none()
            && self.day_boundary.is_none()
            && self.recommendation_sample.is_none()
            && self.shuffle.is_none()
            && self.include_recommendations.is_none()
            && self.uri.is_none()
            && self.add_last_month.is_none()
            && self.description_overwrite.is_none()
            && self.description_suffix.is_none()
    }

    fn check_references(&self) -> Result<()> {
        if let ListUpdate::Replace(references) = &self.playlist_references {
            if references.contains(&self.name) {
                return Err(ValidationError::SelfReference(self.name.clone()).into());
            }
        }
        Ok(())
    }

    /// Applies the supplied fields to `playlist`, leaving the rest untouched.
    pub fn apply(&self, playlist: &mut Playlist) -> Result<()> {
        if self.name != playlist.name {
            return Err(Error::invalid_input(format!(
                "update for {} applied to {}",
                self.name, playlist.name
            )));
        }
        if self.is_empty() {
            return Err(Error::invalid_input("no changes to make"));
        }
        self.check_references()?;

        self.parts.apply_to(&mut playlist.parts);
        self.playlist_references
            .apply_to(&mut playlist.playlist_references);

        if let Some(playlist_type) = self.playlist_type {
            playlist.playlist_type = playlist_type;
        }
        if let Some(day_boundary) = self.day_boundary {
            playlist.day_boundary = day_boundary;
        }
        if let Some(sample) = self.recommendation_sample {
            playlist.recommendation_sample = sample;
        }
        if let Some(shuffle) = self.shuffle {
            playlist.shuffle = shuffle;
        }
        if let Some(include) = self.include_recommendations {
            playlist.include_recommendations = include;
        }
        if let Some(uri) = &self.uri {
            playlist.uri = Some(uri.clone()).filter(|u| !u.is_empty());
        }
        if let Some(add_last_month) = self.add_last_month {
            playlist.add_last_month = add_last_month;
        }
        if let Some(overwrite) = &self.description_overwrite {
            playlist.description_overwrite = Some(overwrite.clone()).filter(|d| !d.is_empty());
        }
        if let Some(suffix) = &self.description_suffix {
            playlist.description_suffix = Some(suffix.clone()).filter(|d| !d.is_empty());
        }
        Ok(())
    }

    /// Builds a new definition, filling defaults for anything not supplied.
    pub fn into_playlist(self) -> Result<Playlist> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_input("no name provided"));
        }
        self.check_references()?;

        let mut playlist = Playlist::new(self.name.clone(), self.playlist_type.unwrap_or_default());
        if !self.is_empty() {
            self.apply(&mut playlist)?;
        }
        Ok(playlist)
    }
}
