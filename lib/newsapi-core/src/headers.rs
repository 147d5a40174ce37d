//! Ordered, multi-valued header fields.
//!
//! Unlike [`http::HeaderMap`], [`HeaderFields`] keeps every field exactly where
//! it was inserted, so a middleware that touches one field never reorders the
//! others.

use std::fmt;

use http::HeaderName;

use crate::{Error, Result};

/// An ordered list of header fields.
///
/// Names are normalized by [`HeaderName`], so lookups are case-insensitive.
/// Values are kept verbatim.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    fields: Vec<(HeaderName, String)>,
}

impl HeaderFields {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Number of fields, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` when there is no field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Appends a field after every existing one, keeping previous values.
    pub fn append(&mut self, name: HeaderName, value: impl Into<String>) {
        self.fields.push((name, value.into()));
    }

    /// Sets a field, overwriting any previous value.
    ///
    /// The first field with that name is updated in place and every later
    /// duplicate is dropped; if the name is missing the field is appended.
    pub fn set(&mut self, name: HeaderName, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter().position(|(n, _)| *n == name) {
            Some(first) => {
                let mut index = 0;
                self.fields.retain(|(n, _)| {
                    let keep = index <= first || *n != name;
                    index += 1;
                    keep
                });
                if let Some(field) = self.fields.get_mut(first) {
                    field.1 = value;
                }
            }
            None => self.fields.push((name, value)),
        }
    }

    /// Removes every field with that name, returning how many were removed.
    pub fn remove(&mut self, name: &HeaderName) -> usize {
        let before = self.fields.len();
        self.fields.retain(|(n, _)| n != name);
        before - self.fields.len()
    }

    /// First value for a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = HeaderName::try_from(name).ok()?;
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values for a name, in order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        let Ok(name) = HeaderName::try_from(name) else {
            return Vec::new();
        };
        self.fields
            .iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// `true` if at least one field has that name.
    #[must_use]
    pub fn contains(&self, name: &HeaderName) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &str)> {
        self.fields.iter().map(|(n, v)| (n, v.as_str()))
    }

    /// Builds a list from an [`http::HeaderMap`].
    ///
    /// Values that are not valid UTF-8 are decoded lossily.
    #[must_use]
    pub fn from_header_map(map: &http::HeaderMap) -> Self {
        let mut fields = Self::new();
        for (name, value) in map {
            fields.append(name.clone(), String::from_utf8_lossy(value.as_bytes()));
        }
        fields
    }

    /// Converts into an [`http::HeaderMap`], keeping duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] if a value cannot be sent on the wire.
    pub fn to_header_map(&self) -> Result<http::HeaderMap> {
        let mut map = http::HeaderMap::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            let value = http::HeaderValue::from_str(value)
                .map_err(|e| Error::invalid_header(format!("{name}: {e}")))?;
            map.append(name.clone(), value);
        }
        Ok(map)
    }
}

impl fmt::Debug for HeaderFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.fields.iter().map(|(n, v)| (n.as_str(), v)))
            .finish()
    }
}

impl FromIterator<(HeaderName, String)> for HeaderFields {
    fn from_iter<I: IntoIterator<Item = (HeaderName, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Extend<(HeaderName, String)> for HeaderFields {
    fn extend<I: IntoIterator<Item = (HeaderName, String)>>(&mut self, iter: I) {
        self.fields.extend(iter);
    }
}
