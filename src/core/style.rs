//! Style model for blocks
//!
//! Styles are presentation-only: the core never interprets a value. Keys the
//! editor knows about get their own variant; anything else passes through as
//! [`StyleKey::Custom`] under its original name.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Style property names
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleKey {
    Padding,
    Margin,
    BorderRadius,
    FontSize,
    Color,
    BackgroundColor,
    TextAlign,
    Border,
    MinHeight,
    /// Pass-through property the core does not recognize
    Custom(String),
}

impl StyleKey {
    /// The camelCase property name used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            StyleKey::Padding => "padding",
            StyleKey::Margin => "margin",
            StyleKey::BorderRadius => "borderRadius",
            StyleKey::FontSize => "fontSize",
            StyleKey::Color => "color",
            StyleKey::BackgroundColor => "backgroundColor",
            StyleKey::TextAlign => "textAlign",
            StyleKey::Border => "border",
            StyleKey::MinHeight => "minHeight",
            StyleKey::Custom(name) => name,
        }
    }

    /// Map a property name to its key. Never fails.
    pub fn from_name(name: &str) -> Self {
        match name {
            "padding" => StyleKey::Padding,
            "margin" => StyleKey::Margin,
            "borderRadius" => StyleKey::BorderRadius,
            "fontSize" => StyleKey::FontSize,
            "color" => StyleKey::Color,
            "backgroundColor" => StyleKey::BackgroundColor,
            "textAlign" => StyleKey::TextAlign,
            "border" => StyleKey::Border,
            "minHeight" => StyleKey::MinHeight,
            other => StyleKey::Custom(other.to_string()),
        }
    }

    /// Whether this key is one the editor recognizes.
    pub fn is_known(&self) -> bool {
        !matches!(self, StyleKey::Custom(_))
    }

    /// Fold a `Custom` key carrying a recognized name into its variant.
    pub fn canonical(self) -> Self {
        match self {
            StyleKey::Custom(name) => StyleKey::from_name(&name),
            known => known,
        }
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for StyleKey {
    fn from(name: &str) -> Self {
        StyleKey::from_name(name)
    }
}

impl Serialize for StyleKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StyleKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(StyleKey::from_name(&name))
    }
}

/// Mapping from style property to value
///
/// Keys are stored in canonical form, so one property name maps to at most
/// one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Styles(BTreeMap<StyleKey, String>);

impl Styles {
    /// Create an empty style map
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: StyleKey, value: impl Into<String>) -> Self {
        self.0.insert(key.canonical(), value.into());
        self
    }

    /// Set a property, returning the previous value
    pub fn set(&mut self, key: StyleKey, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.canonical(), value.into())
    }

    /// Remove a property, returning its value
    pub fn remove(&mut self, key: &StyleKey) -> Option<String> {
        match key {
            StyleKey::Custom(name) => self.0.remove(&StyleKey::from_name(name)),
            known => self.0.remove(known),
        }
    }

    pub fn get(&self, key: &StyleKey) -> Option<&str> {
        match key {
            StyleKey::Custom(name) => self.0.get(&StyleKey::from_name(name)),
            known => self.0.get(known),
        }
        .map(String::as_str)
    }

    pub fn contains(&self, key: &StyleKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StyleKey, &str)> {
        self.0.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Merge `other` on top of `self`; keys in `other` win.
    pub fn merge(mut self, other: Styles) -> Self {
        self.0.extend(other.0);
        self
    }
}

impl<K: Into<StyleKey>, V: Into<String>> FromIterator<(K, V)> for Styles {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (StyleKey::canonical(k.into()), v.into()))
                .collect(),
        )
    }
}
