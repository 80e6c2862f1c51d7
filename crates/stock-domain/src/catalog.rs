//! Catalog of tracked brand/size combinations.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// Brands seeded into a fresh shop book.
pub const DEFAULT_BRANDS: &[&str] = &[
    "IB",
    "Royal Stag",
    "MM Vodka",
    "Iconiq White",
    "MM Orange",
    "After Dark",
    "Mc Dowel",
    "Royal Challenge",
    "Mountain Oak",
    "8PMM",
    "Green Level",
    "Romano",
];

/// Bottle sizes seeded into a fresh shop book.
pub const DEFAULT_SIZES: &[&str] = &["720ML", "360ML", "180ML", "90ML"];

/// Identifies one catalog entry, and therefore one row of a day ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub brand: String,
    pub size: String,
}

impl StockKey {
    pub fn new(brand: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            size: size.into(),
        }
    }
}

impl fmt::Display for StockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.brand, self.size)
    }
}

/// A user-editable brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
}

impl Brand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

impl Identifiable for Brand {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Brand {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered, duplicate-free list of the keys a day ledger must contain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<StockKey>,
}

impl Catalog {
    /// Builds the brand-major grid `brands × sizes`. Repeated pairs are kept once.
    pub fn from_grid<B, S>(brands: B, sizes: S) -> Self
    where
        B: IntoIterator,
        B::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let sizes: Vec<String> = sizes
            .into_iter()
            .map(|size| size.as_ref().to_string())
            .collect();
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for brand in brands {
            for size in &sizes {
                let key = StockKey::new(brand.as_ref(), size.as_str());
                if seen.insert(key.clone()) {
                    entries.push(key);
                }
            }
        }
        Self { entries }
    }

    /// Builds a catalog from explicit pairs, rejecting duplicates.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = StockKey>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for key in pairs {
            if !seen.insert(key.clone()) {
                return Err(CatalogError::DuplicateEntry(key));
            }
            entries.push(key);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[StockKey] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &StockKey> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &StockKey) -> bool {
        self.entries.contains(key)
    }

    /// Resolves user input to a catalog key, ignoring case.
    pub fn find(&self, brand: &str, size: &str) -> Option<&StockKey> {
        self.entries
            .iter()
            .find(|key| same_name(&key.brand, brand) && same_name(&key.size, size))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors raised while assembling a [`Catalog`].
pub enum CatalogError {
    DuplicateEntry(StockKey),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::DuplicateEntry(key) => {
                write!(f, "catalog entry `{key}` is listed more than once")
            }
        }
    }
}

impl std::error::Error for CatalogError {}
