// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use smol_str::SmolStr;

/// Separator used by arc labels (`A->B`); node labels may not contain it.
pub const ARC_LABEL_SEPARATOR: &str = "->";

/// An opaque label used to identify graph nodes.
///
/// Labels are cheap to clone (`SmolStr` inlines short strings) and only need to be non-empty
/// and free of the arc label separator, since arcs are addressed as `<source>-><target>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: SmolStr,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl AsRef<str>) -> Result<Self, IdError> {
        let value = value.as_ref();
        validate_label(value)?;
        Ok(Self {
            value: SmolStr::new(value),
            _marker: PhantomData,
        })
    }

    /// Builds an id from a compile-time label that is known to be valid.
    pub(crate) fn from_static(value: &'static str) -> Self {
        debug_assert!(validate_label(value).is_ok(), "invalid static label {value:?}");
        Self {
            value: SmolStr::new_static(value),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value.into()
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty,
    ContainsSeparator,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("node label must not be empty"),
            Self::ContainsSeparator => {
                write!(f, "node label must not contain '{ARC_LABEL_SEPARATOR}'")
            }
        }
    }
}

impl std::error::Error for IdError {}

fn validate_label(value: &str) -> Result<(), IdError> {
    if value.trim().is_empty() {
        return Err(IdError::Empty);
    }
    if value.contains(ARC_LABEL_SEPARATOR) {
        return Err(IdError::ContainsSeparator);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeIdTag {}
pub type NodeId = Id<NodeIdTag>;

/// Stable position of an arc inside a snapshot's arc arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcIndex(usize);

impl ArcIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ArcIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{IdError, NodeId};

    #[test]
    fn node_id_rejects_empty() {
        assert_eq!(NodeId::new(""), Err(IdError::Empty));
        assert_eq!(NodeId::new("   "), Err(IdError::Empty));
    }

    #[test]
    fn node_id_rejects_arc_separator() {
        assert_eq!(NodeId::new("A->B"), Err(IdError::ContainsSeparator));
    }

    #[test]
    fn node_id_keeps_label_verbatim() {
        let id = NodeId::new("P 1").expect("node id");
        assert_eq!(id.as_str(), "P 1");
        assert_eq!(id.to_string(), "P 1");
    }
}
