//! XML shapes of the documents met along the directory chain.
//!
//! Each type maps only the tags one hop needs. Missing tags decode to empty
//! values and unknown tags are skipped, so a document that lacks the wanted
//! field still decodes; the hop reading it decides that is a `NotFound`.
//! The root element name is never checked. A scalar tag that repeats keeps
//! its last value, and stray text between elements is ignored.

use std::fmt;
use std::marker::PhantomData;

use serde::de::value::MapAccessDeserializer;
use serde::de::{self, DeserializeOwned, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use super::DirectoryError;

/// Label of the pagination soft key that links to the following page.
pub const NEXT_SOFT_KEY: &str = "Next";

/// Per-device bootstrap configuration (`<hostname>.cnf.xml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BootstrapPointer {
    /// Root of the phone's directory service.
    #[serde(rename = "directoryURL", default, deserialize_with = "last_text")]
    pub directory_url: String,
}

/// Root menu of phone services (`CiscoIPPhoneMenu`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MenuListing {
    /// Menu items in document order.
    #[serde(rename = "MenuItem", default, deserialize_with = "elements_only")]
    pub items: Vec<MenuItem>,
}

/// A single labeled service link in a [`MenuListing`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MenuItem {
    #[serde(rename = "Name", default, deserialize_with = "last_text")]
    pub name: String,
    #[serde(rename = "URL", default, deserialize_with = "last_text")]
    pub url: String,
}

impl MenuListing {
    /// Returns the first item whose label equals `label` exactly.
    #[must_use]
    pub fn find(&self, label: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.name == label)
    }
}

/// Indirection to the listing service (`CiscoIPPhoneInput`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DirectoryListPointer {
    #[serde(rename = "URL", default, deserialize_with = "last_text")]
    pub url: String,
}

/// Entry projection of a directory page (`CiscoIPPhoneDirectory`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryList {
    /// Entries in document order.
    #[serde(rename = "DirectoryEntry", default, deserialize_with = "elements_only")]
    pub entries: Vec<DirectoryEntry>,
}

/// One resolved directory record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DirectoryEntry {
    #[serde(
        rename(deserialize = "Name", serialize = "name"),
        default,
        deserialize_with = "last_text"
    )]
    pub name: String,
    #[serde(
        rename(deserialize = "Telephone", serialize = "telephone"),
        default,
        deserialize_with = "last_text"
    )]
    pub telephone: String,
}

impl DirectoryEntry {
    /// Creates an entry from a display name and telephone string.
    pub fn new(name: impl Into<String>, telephone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            telephone: telephone.into(),
        }
    }
}

/// Pagination projection of a directory page.
///
/// Decoded from the same body as [`EntryList`]; the two read disjoint tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaginationControl {
    /// Soft keys in document order.
    #[serde(rename = "SoftKeyItem", default, deserialize_with = "elements_only")]
    pub soft_keys: Vec<SoftKeyItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SoftKeyItem {
    #[serde(rename = "Name", default, deserialize_with = "last_text")]
    pub name: String,
    #[serde(rename = "URL", default, deserialize_with = "last_text")]
    pub url: String,
}

impl PaginationControl {
    /// Returns the link of the first "Next" soft key, if it carries one.
    #[must_use]
    pub fn next_url(&self) -> Option<&str> {
        self.soft_keys
            .iter()
            .find(|key| key.name == NEXT_SOFT_KEY)
            .map(|key| key.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

/// Text content of a scalar element such as `<URL>`.
#[derive(Deserialize)]
struct TextElement {
    #[serde(rename = "$text", default)]
    text: String,
}

/// A sequence item: an element decoded as `T`, or text read between them.
struct ElementSlot<T>(Option<T>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ElementSlot<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Elements answer with a map, bare text with a string.
        deserializer.deserialize_struct("", &[], SlotVisitor(PhantomData))
    }
}

struct SlotVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for SlotVisitor<T> {
    type Value = ElementSlot<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an element or text")
    }

    fn visit_str<E: de::Error>(self, _text: &str) -> Result<Self::Value, E> {
        Ok(ElementSlot(None))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        T::deserialize(MapAccessDeserializer::new(map)).map(|value| ElementSlot(Some(value)))
    }
}

/// Collects every occurrence of a repeated tag, skipping interleaved text.
fn elements_only<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let slots = Vec::<ElementSlot<T>>::deserialize(deserializer)?;
    Ok(slots.into_iter().filter_map(|slot| slot.0).collect())
}

/// Reads a scalar tag; when it repeats, the last occurrence wins.
fn last_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let elements: Vec<TextElement> = elements_only(deserializer)?;
    Ok(elements
        .into_iter()
        .next_back()
        .map(|element| element.text)
        .unwrap_or_default())
}

/// Decodes `body` into `T`, naming `target` in any error.
///
/// # Errors
///
/// Returns [`DirectoryError::Decode`] when the body is not well-formed XML.
pub fn decode<T: DeserializeOwned>(body: &[u8], target: &str) -> Result<T, DirectoryError> {
    let text = String::from_utf8_lossy(body);
    let text = text.trim_start_matches('\u{feff}');
    quick_xml::de::from_str(text).map_err(|source| DirectoryError::decode(target, source))
}
