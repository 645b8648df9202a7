//! Triplet string: an ordered collection of facts keyed by (prefix, name)
//!
//! Adding a triplet whose key is already present replaces it in place;
//! a new key is appended at the end.

use crate::error::{CoreError, Result};
use crate::settings::{Field, Settings};
use crate::triplet::{Triplet, TripletKey};
use indexmap::IndexMap;
use std::fmt;
use std::ops::{Bound, Range, RangeBounds};
use std::sync::Arc;

/// Result of [`TripletString::satisfy_bid`]
#[derive(Debug, Clone, PartialEq)]
pub enum BidMatch {
    /// All triplets of the bid prefix
    Prefix(TripletString),
    /// The single triplet named by the bid
    Single(Triplet),
}

/// Ordered, key-deduplicated collection of triplets
#[derive(Clone)]
pub struct TripletString {
    triplets: IndexMap<TripletKey, Triplet>,
    settings: Arc<Settings>,
}

impl TripletString {
    pub fn new() -> Self {
        Self::with_settings(Settings::shared())
    }

    pub fn with_settings(settings: Arc<Settings>) -> Self {
        Self {
            triplets: IndexMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Values<'_, TripletKey, Triplet> {
        self.triplets.values()
    }

    /// Triplet with the given prefix and name
    pub fn get<'a>(&self, prefix: &str, name: impl Into<Option<&'a str>>) -> Result<&Triplet> {
        let key = self.lookup_key(prefix, name.into())?;
        self.triplets
            .get(&key)
            .ok_or_else(|| not_found_key(&key))
    }

    pub fn get_mut<'a>(
        &mut self,
        prefix: &str,
        name: impl Into<Option<&'a str>>,
    ) -> Result<&mut Triplet> {
        let key = self.lookup_key(prefix, name.into())?;
        self.triplets
            .get_mut(&key)
            .ok_or_else(|| not_found_key(&key))
    }

    /// Triplets with the given prefix.
    ///
    /// A non-strict lookup also takes numbered prefixes: `E` matches `E`,
    /// `E1`, `E2` and so on.
    pub fn getpr(&self, prefix: &str, strict: bool) -> Result<TripletString> {
        let prefix = self.lookup_prefix(prefix)?;
        let mut result = TripletString::with_settings(Arc::clone(&self.settings));
        result.triplets = self
            .triplets
            .iter()
            .filter(|(_, t)| prefix_matches(t.prefix(), &prefix, strict))
            .map(|(k, t)| (k.clone(), t.clone()))
            .collect();

        if result.is_empty() {
            return Err(CoreError::NotFound(format!(
                "no triplets with prefix '{}'",
                prefix
            )));
        }
        Ok(result)
    }

    /// Remove the triplet with the given prefix and name
    pub fn rem<'a>(&mut self, prefix: &str, name: impl Into<Option<&'a str>>) -> Result<Triplet> {
        let key = self.lookup_key(prefix, name.into())?;
        let removed = self
            .triplets
            .shift_remove(&key)
            .ok_or_else(|| not_found_key(&key))?;
        log::trace!("removed {}", removed);
        Ok(removed)
    }

    /// Remove all triplets with the given prefix, see [`TripletString::getpr`]
    pub fn rempr(&mut self, prefix: &str, strict: bool) -> Result<()> {
        let prefix = self.lookup_prefix(prefix)?;
        let before = self.triplets.len();
        self.triplets
            .retain(|_, t| !prefix_matches(t.prefix(), &prefix, strict));

        if self.triplets.len() == before {
            return Err(CoreError::NotFound(format!(
                "no triplets with prefix '{}'",
                prefix
            )));
        }
        log::trace!(
            "removed {} triplets with prefix {}",
            before - self.triplets.len(),
            prefix
        );
        Ok(())
    }

    /// Triplet at `index`; negative indices count from the end
    pub fn at(&self, index: isize) -> Result<&Triplet> {
        let pos = self.position(index)?;
        self.triplets
            .get_index(pos)
            .map(|(_, t)| t)
            .ok_or_else(|| self.index_error(index))
    }

    /// New collection of the triplets in `range`
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Result<TripletString> {
        let range = self.resolve_range(range)?;
        let mut result = TripletString::with_settings(Arc::clone(&self.settings));
        for pos in range {
            if let Some((k, t)) = self.triplets.get_index(pos) {
                result.triplets.insert(k.clone(), t.clone());
            }
        }
        Ok(result)
    }

    pub fn remove_at(&mut self, index: isize) -> Result<Triplet> {
        let pos = self.position(index)?;
        self.triplets
            .shift_remove_index(pos)
            .map(|(_, t)| t)
            .ok_or_else(|| self.index_error(index))
    }

    pub fn remove_slice(&mut self, range: impl RangeBounds<usize>) -> Result<()> {
        let range = self.resolve_range(range)?;
        self.triplets.drain(range);
        Ok(())
    }

    /// Whether any triplet has exactly this prefix
    pub fn contains_prefix(&self, prefix: &str) -> Result<bool> {
        let prefix = self.lookup_prefix(prefix)?;
        Ok(self.iter().any(|t| t.prefix() == prefix))
    }

    pub fn contains_key<'a>(&self, prefix: &str, name: impl Into<Option<&'a str>>) -> Result<bool> {
        let key = self.lookup_key(prefix, name.into())?;
        Ok(self.triplets.contains_key(&key))
    }

    /// Insert a triplet, replacing the one with the same key in place
    pub fn add(&mut self, triplet: Triplet) {
        log::trace!("add {}", triplet);
        self.triplets.insert(triplet.key(), triplet);
    }

    /// Add every triplet of `other`, in its order
    pub fn extend_from(&mut self, other: &TripletString) {
        self.extend(other.iter().cloned());
    }

    /// Sort lexicographically by (prefix, name)
    pub fn sort(&mut self) {
        self.triplets.sort_keys();
    }

    /// Position of the first triplet equal to `triplet`
    pub fn index(&self, triplet: &Triplet) -> Result<usize> {
        self.iter()
            .position(|t| t == triplet)
            .ok_or_else(|| CoreError::NotFound(format!("triplet {} not in triplet string", triplet)))
    }

    /// Equality that also requires the same order
    pub fn eq_with_order(&self, other: &TripletString) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }

    /// Answer a bid: a nameless bid takes the whole prefix, a named bid the
    /// single fact
    pub fn satisfy_bid(&self, bid: &Triplet) -> Result<BidMatch> {
        if !bid.is_bid() {
            return Err(CoreError::InvalidValue(format!("{} is not a bid", bid)));
        }
        match bid.name() {
            None => self.getpr(bid.prefix(), true).map(BidMatch::Prefix),
            Some(name) => self
                .get(bid.prefix(), name)
                .map(|t| BidMatch::Single(t.clone())),
        }
    }

    fn lookup_prefix(&self, prefix: &str) -> Result<String> {
        self.settings.validate(Field::Prefix, prefix)?;
        Ok(prefix.to_uppercase())
    }

    fn lookup_key(&self, prefix: &str, name: Option<&str>) -> Result<TripletKey> {
        let prefix = self.lookup_prefix(prefix)?;
        let name = match name {
            Some(name) => {
                self.settings.validate(Field::Name, name)?;
                Some(name.to_uppercase())
            }
            None => None,
        };
        Ok((prefix, name))
    }

    fn position(&self, index: isize) -> Result<usize> {
        let len = self.len() as isize;
        let pos = if index < 0 { len + index } else { index };
        if pos < 0 || pos >= len {
            return Err(self.index_error(index));
        }
        Ok(pos as usize)
    }

    fn resolve_range(&self, range: impl RangeBounds<usize>) -> Result<Range<usize>> {
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => self.len(),
        };
        if start > end || end > self.len() {
            return Err(CoreError::Index {
                index: format!("{}..{}", start, end),
                len: self.len(),
            });
        }
        Ok(start..end)
    }

    fn index_error(&self, index: isize) -> CoreError {
        CoreError::Index {
            index: index.to_string(),
            len: self.len(),
        }
    }
}

fn prefix_matches(candidate: &str, prefix: &str, strict: bool) -> bool {
    if strict {
        candidate == prefix
    } else {
        candidate.trim_end_matches(|c: char| c.is_ascii_digit()) == prefix
    }
}

fn not_found_key(key: &TripletKey) -> CoreError {
    CoreError::NotFound(format!(
        "no triplet with prefix '{}' and name '{}'",
        key.0,
        key.1.as_deref().unwrap_or("")
    ))
}

impl Default for TripletString {
    fn default() -> Self {
        Self::new()
    }
}

/// Same triplets regardless of order
impl PartialEq for TripletString {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .triplets
                .iter()
                .all(|(k, t)| other.triplets.get(k) == Some(t))
    }
}

impl fmt::Display for TripletString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .iter()
            .map(Triplet::to_text)
            .collect::<Vec<_>>()
            .join(&self.settings.triplets_separator);
        f.write_str(&text)
    }
}

impl fmt::Debug for TripletString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TripletString")?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Extend<Triplet> for TripletString {
    fn extend<I: IntoIterator<Item = Triplet>>(&mut self, iter: I) {
        for triplet in iter {
            self.add(triplet);
        }
    }
}

/// Duplicate keys keep the position of the first and the value of the last
impl FromIterator<Triplet> for TripletString {
    fn from_iter<I: IntoIterator<Item = Triplet>>(iter: I) -> Self {
        let mut iter = iter.into_iter().peekable();
        let settings = iter
            .peek()
            .map(|t| Arc::clone(t.settings()))
            .unwrap_or_else(Settings::shared);
        let mut result = TripletString::with_settings(settings);
        result.extend(iter);
        result
    }
}

impl IntoIterator for TripletString {
    type Item = Triplet;
    type IntoIter = indexmap::map::IntoValues<TripletKey, Triplet>;

    fn into_iter(self) -> Self::IntoIter {
        self.triplets.into_values()
    }
}

impl<'a> IntoIterator for &'a TripletString {
    type Item = &'a Triplet;
    type IntoIter = indexmap::map::Values<'a, TripletKey, Triplet>;

    fn into_iter(self) -> Self::IntoIter {
        self.triplets.values()
    }
}

impl std::ops::Add<Triplet> for TripletString {
    type Output = TripletString;

    fn add(mut self, rhs: Triplet) -> TripletString {
        TripletString::add(&mut self, rhs);
        self
    }
}

impl std::ops::Add for TripletString {
    type Output = TripletString;

    fn add(mut self, rhs: TripletString) -> TripletString {
        self.extend(rhs);
        self
    }
}
