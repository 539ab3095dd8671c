use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A place users can check in to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Human-readable name, e.g. `Mosbach`.
    pub name: String,
    /// Short code used on journal lines, e.g. `MOS`.
    pub code: String,
}

impl Location {
    /// Creates a location from code and name.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Lookup table of known locations, keyed by code.
///
/// The registry is populated by the caller (from whatever configuration
/// source the application uses) and injected into every operation that
/// resolves codes. It is read-only shared state once journal operations run.
#[derive(Debug, Clone, Default)]
pub struct LocationRegistry {
    locations: HashMap<String, Location>,
}

impl LocationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a location, replacing any previous entry with the same code.
    pub fn insert(&mut self, location: Location) {
        self.locations.insert(location.code.clone(), location);
    }

    /// Resolves a location code.
    pub fn resolve(&self, code: &str) -> Option<&Location> {
        self.locations.get(code)
    }

    /// Iterates over all registered locations, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    /// Number of registered locations.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl FromIterator<Location> for LocationRegistry {
    fn from_iter<I: IntoIterator<Item = Location>>(iter: I) -> Self {
        let mut registry = Self::new();
        for location in iter {
            registry.insert(location);
        }
        registry
    }
}
