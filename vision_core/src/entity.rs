//! Entity records as delivered by the simulation feed.
//!
//! The feed is owned by an external simulation; this crate only reads it.
//! Records arrive as JSON objects whose optional fields may be missing or
//! `null`, and both cases are treated the same way.

use std::{
    collections::HashMap,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use bevy::math::DVec2;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier for an entity in the simulation feed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Alliance classification of an entity relative to the viewing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Alliance {
    Friendly,
    Hostile,
    Neutral,
    Unknown,
}

impl Alliance {
    /// Case-insensitive parse. Labels outside the known set classify as `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "friendly" => Self::Friendly,
            "hostile" => Self::Hostile,
            "neutral" => Self::Neutral,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Friendly => "friendly",
            Self::Hostile => "hostile",
            Self::Neutral => "neutral",
            Self::Unknown => "unknown",
        }
    }
}

impl From<String> for Alliance {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<Alliance> for String {
    fn from(value: Alliance) -> Self {
        value.as_str().to_string()
    }
}

/// Operational status reported by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityStatus {
    Active,
    Neutralized,
    Eliminated,
    Destroyed,
    /// Any other label, kept verbatim.
    Other(String),
}

impl EntityStatus {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "neutralized" => Self::Neutralized,
            "eliminated" => Self::Eliminated,
            "destroyed" => Self::Destroyed,
            _ => Self::Other(label.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Neutralized => "neutralized",
            Self::Eliminated => "eliminated",
            Self::Destroyed => "destroyed",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for EntityStatus {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<EntityStatus> for String {
    fn from(value: EntityStatus) -> Self {
        value.as_str().to_string()
    }
}

/// Nested `position` object. Either axis may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionFields {
    #[serde(default, deserialize_with = "lenient::number")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub y: Option<f64>,
}

/// One entity as seen in the simulation feed.
///
/// Fields of the wrong JSON type read as absent rather than failing the
/// record, so a bad override falls back to the table radius and a bad
/// coordinate excludes the entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: EntityId,
    #[serde(deserialize_with = "lenient::label")]
    pub alliance: Option<Alliance>,
    #[serde(deserialize_with = "lenient::label")]
    pub asset_type: Option<String>,
    #[serde(deserialize_with = "lenient::position")]
    pub position: Option<PositionFields>,
    /// Legacy top-level coordinates, consulted only when `position` is absent.
    #[serde(deserialize_with = "lenient::number")]
    pub x: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub y: Option<f64>,
    #[serde(deserialize_with = "lenient::label")]
    pub status: Option<EntityStatus>,
    #[serde(deserialize_with = "lenient::number")]
    pub vision_range: Option<f64>,
    /// Facing in degrees, counter-clockwise from +X. Only vision cones use it.
    #[serde(deserialize_with = "lenient::number")]
    pub heading_deg: Option<f64>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(id),
            ..Self::default()
        }
    }

    pub fn with_alliance(mut self, alliance: Alliance) -> Self {
        self.alliance = Some(alliance);
        self
    }

    pub fn with_asset_type(mut self, asset_type: impl Into<String>) -> Self {
        self.asset_type = Some(asset_type.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(PositionFields {
            x: Some(x),
            y: Some(y),
        });
        self
    }

    pub fn at_legacy(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_status(mut self, status: EntityStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_vision_range(mut self, range: f64) -> Self {
        self.vision_range = Some(range);
        self
    }

    pub fn with_heading(mut self, heading_deg: f64) -> Self {
        self.heading_deg = Some(heading_deg);
        self
    }

    /// Resolve the world position from exactly one source.
    ///
    /// A present `position` object wins over the legacy `x`/`y` fields even
    /// when it is incomplete; coordinates are never mixed across sources.
    pub fn resolved_position(&self) -> Option<DVec2> {
        let (x, y) = match self.position {
            Some(fields) => (fields.x, fields.y),
            None => (self.x, self.y),
        };
        Some(DVec2::new(x?, y?))
    }

    pub fn is_friendly(&self) -> bool {
        self.alliance == Some(Alliance::Friendly)
    }

    /// Absent status counts as active.
    pub fn is_active(&self) -> bool {
        matches!(self.status, None | Some(EntityStatus::Active))
    }

    /// Friendly, active and positioned: the entity contributes vision.
    pub fn observer_position(&self) -> Option<DVec2> {
        if !self.is_friendly() || !self.is_active() {
            return None;
        }
        self.resolved_position()
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{EntityId, PositionFields};

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(Value::deserialize(deserializer)?.as_f64())
    }

    pub fn label<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: From<String>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(label) => Some(T::from(label)),
            _ => None,
        })
    }

    /// Numeric ids are kept as their decimal text.
    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntityId, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(id) => EntityId(id),
            Value::Number(id) => EntityId(id.to_string()),
            _ => EntityId::default(),
        })
    }

    /// A present but non-object `position` still counts as the chosen source,
    /// leaving both axes unset.
    pub fn position<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<PositionFields>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => None,
            Value::Object(fields) => Some(PositionFields {
                x: fields.get("x").and_then(Value::as_f64),
                y: fields.get("y").and_then(Value::as_f64),
            }),
            _ => Some(PositionFields::default()),
        })
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to parse entity feed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read entity feed from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Accepted top-level shapes of a feed document.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeedDocument {
    List(Vec<serde_json::Value>),
    Keyed(serde_json::Map<String, serde_json::Value>),
}

/// Decode one feed entry, skipping entries that are not record objects.
fn decode_record(key: Option<&str>, value: serde_json::Value) -> Option<EntityRecord> {
    match serde_json::from_value::<EntityRecord>(value) {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::warn!(
                target: "tactical_map::vision",
                key = key.unwrap_or_default(),
                error = %err,
                "feed.record_skipped"
            );
            None
        }
    }
}

/// Keyed entity collection that iterates in insertion order.
#[derive(Resource, Debug, Clone, Default)]
pub struct EntityStore {
    records: Vec<EntityRecord>,
    index: HashMap<EntityId, usize>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record. Replacing keeps the existing slot.
    pub fn upsert(&mut self, record: EntityRecord) {
        match self.index.get(&record.id) {
            Some(&slot) => self.records[slot] = record,
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<EntityRecord> {
        let slot = self.index.remove(id)?;
        let removed = self.records.remove(slot);
        for record in &self.records[slot..] {
            if let Some(position) = self.index.get_mut(&record.id) {
                *position -= 1;
            }
        }
        Some(removed)
    }

    pub fn get(&self, id: &EntityId) -> Option<&EntityRecord> {
        self.index.get(id).map(|&slot| &self.records[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    /// Parse a feed document: either an array of records or an object keyed
    /// by entity id. Keys fill in records that omit their own `id`.
    ///
    /// Only a document that is not valid JSON, or not an array or object,
    /// fails. Entries that are not objects are skipped with a warning.
    pub fn from_json_str(json: &str) -> Result<Self, FeedError> {
        let mut store = Self::new();
        match serde_json::from_str::<FeedDocument>(json)? {
            FeedDocument::List(entries) => {
                for record in entries
                    .into_iter()
                    .filter_map(|value| decode_record(None, value))
                {
                    store.upsert(record);
                }
            }
            FeedDocument::Keyed(entries) => {
                for (key, value) in entries {
                    let Some(mut record) = decode_record(Some(&key), value) else {
                        continue;
                    };
                    if record.id.0.is_empty() {
                        record.id = EntityId(key);
                    }
                    store.upsert(record);
                }
            }
        }
        Ok(store)
    }

    pub fn from_file(path: &Path) -> Result<Self, FeedError> {
        let contents = fs::read_to_string(path).map_err(|source| FeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }
}

impl FromIterator<EntityRecord> for EntityStore {
    fn from_iter<T: IntoIterator<Item = EntityRecord>>(iter: T) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.upsert(record);
        }
        store
    }
}
