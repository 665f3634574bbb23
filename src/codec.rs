//! XML envelope codec.

use std::collections::btree_map::{self, BTreeMap};

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::de::value::{Error as ValueError, MapDeserializer};
use serde::de::{DeserializeOwned, Error as _, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;

use crate::error::WxPayError;

const ROOT: &str = "xml";

/// Flat mapping of field name to value, ordered by key.
///
/// Empty values are never stored: inserting an empty value removes the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a field. An empty value removes the field instead.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            self.0.remove(&key);
        } else {
            self.0.insert(key, value);
        }
    }

    /// Insert a field only when a value is present.
    pub fn insert_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.insert(key, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in ascending byte order of key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl IntoIterator for Params {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Serialize `params` as an `<xml>` envelope, one text child per field.
pub fn encode(params: &Params) -> Result<String, WxPayError> {
    let mut writer = Writer::new(Vec::new());
    write(&mut writer, Event::Start(BytesStart::new(ROOT)))?;
    for (key, value) in params.iter() {
        if !is_valid_name(key) {
            return Err(WxPayError::Encode(format!("invalid field name: {key:?}")));
        }
        write(&mut writer, Event::Start(BytesStart::new(key)))?;
        write(&mut writer, Event::Text(BytesText::new(value)))?;
        write(&mut writer, Event::End(BytesEnd::new(key)))?;
    }
    write(&mut writer, Event::End(BytesEnd::new(ROOT)))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| WxPayError::Encode(format!("utf8 encode: {e}")))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), WxPayError> {
    writer
        .write_event(event)
        .map_err(|e| WxPayError::Encode(format!("write xml: {e}")))
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Parse an `<xml>` envelope into its direct child fields.
///
/// Unknown children and CDATA wrapping are accepted. Field text is kept exactly
/// as received; whitespace between elements is ignored. Elements with child
/// elements of their own are skipped.
pub fn decode(body: &str) -> Result<Params, WxPayError> {
    if body.trim().is_empty() {
        return Err(WxPayError::Decode("empty body".into()));
    }

    let mut reader = Reader::from_str(body);

    let mut params = Params::new();
    let mut depth = 0usize;
    let mut root_seen = false;
    let mut field: Option<String> = None;
    let mut nested = false;
    let mut value = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            WxPayError::Decode(format!(
                "malformed xml at position {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => {
                depth += 1;
                match depth {
                    1 => {
                        check_root(e.name().as_ref(), root_seen)?;
                        root_seen = true;
                    }
                    2 => {
                        field = Some(element_name(e.name().as_ref())?);
                        nested = false;
                        value.clear();
                    }
                    _ => nested = true,
                }
            }
            Event::Empty(e) => match depth {
                0 => {
                    check_root(e.name().as_ref(), root_seen)?;
                    root_seen = true;
                }
                2 => nested = true,
                _ => {}
            },
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| WxPayError::Decode(format!("unescape text: {e}")))?;
                match depth {
                    0 if !text.trim().is_empty() => {
                        return Err(WxPayError::Decode("text outside root element".into()))
                    }
                    2 => value.push_str(&text),
                    _ => {}
                }
            }
            Event::CData(c) => {
                if depth == 2 {
                    let text = std::str::from_utf8(&c)
                        .map_err(|e| WxPayError::Decode(format!("cdata utf8: {e}")))?;
                    value.push_str(text);
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some(name) = field.take() {
                        if params.contains_key(&name) {
                            return Err(WxPayError::Decode(format!("duplicate field: {name}")));
                        }
                        if !nested {
                            params.insert(name, std::mem::take(&mut value));
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(WxPayError::Decode("missing <xml> root element".into()));
    }
    if depth != 0 {
        return Err(WxPayError::Decode("unexpected end of document".into()));
    }

    Ok(params)
}

/// Build a typed record from decoded fields.
///
/// Integer fields are parsed from their text; fields absent from `params`
/// (including empty elements) fall back to the record's defaults.
pub(crate) fn decode_as<T: DeserializeOwned>(params: &Params) -> Result<T, WxPayError> {
    let fields = params.iter().map(|(k, v)| (k, FieldValue(v)));
    T::deserialize(MapDeserializer::<_, ValueError>::new(fields))
        .map_err(|e| WxPayError::Decode(format!("deserialize: {e}")))
}

struct FieldValue<'a>(&'a str);

impl FieldValue<'_> {
    fn parse<N: std::str::FromStr>(&self) -> Result<N, ValueError>
    where
        N::Err: std::fmt::Display,
    {
        self.0
            .parse()
            .map_err(|e| ValueError::custom(format!("invalid number {:?}: {e}", self.0)))
    }
}

impl<'de> IntoDeserializer<'de, ValueError> for FieldValue<'_> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de> serde::Deserializer<'de> for FieldValue<'_> {
    type Error = ValueError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_str(self.0)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_some(self)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_i32(self.parse()?)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_i64(self.parse()?)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_u32(self.parse()?)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_u64(self.parse()?)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i128 u8 u16 u128 f32 f64 char str string bytes byte_buf unit
        unit_struct newtype_struct seq tuple tuple_struct map struct enum
        identifier ignored_any
    }
}

fn check_root(name: &[u8], root_seen: bool) -> Result<(), WxPayError> {
    if root_seen {
        return Err(WxPayError::Decode("multiple root elements".into()));
    }
    if name != ROOT.as_bytes() {
        return Err(WxPayError::Decode(format!(
            "root element must be <xml>, got <{}>",
            String::from_utf8_lossy(name)
        )));
    }
    Ok(())
}

fn element_name(name: &[u8]) -> Result<String, WxPayError> {
    std::str::from_utf8(name)
        .map(str::to_string)
        .map_err(|e| WxPayError::Decode(format!("element name utf8: {e}")))
}
