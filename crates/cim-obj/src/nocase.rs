//! Insertion-ordered map with case-insensitive string keys.
//!
//! Keys keep the case they were last stored with; lookups, membership tests,
//! removal, equality and hashing go through the lower-cased form. Iteration
//! follows insertion order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::compat::{self, Deprecated};
use crate::config::Config;
use crate::error::{CimError, Result};

/// Items that carry their own name and can populate a [`NocaseDict`] without
/// an explicit key.
pub trait Named {
    /// Name used as the map key.
    fn name(&self) -> &str;
}

impl<T: Named> Named for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Case-insensitive, insertion-ordered map from names to values.
#[derive(Clone)]
pub struct NocaseDict<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

fn fold(key: &str) -> String {
    key.to_lowercase()
}

impl<V> Default for NocaseDict<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> NocaseDict<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        NocaseDict {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        NocaseDict {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Build a map from items keyed by their own name.
    pub fn from_named<I>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Named,
    {
        let mut map = NocaseDict::new();
        for item in items {
            let key = item.name().to_string();
            map.insert(key, item);
        }
        map
    }

    /// Build a map from items keyed by their own name, filling in
    /// `defaults` for names that have no item.
    pub fn from_named_with_defaults<I, K>(items: I, defaults: impl IntoIterator<Item = (K, V)>) -> Self
    where
        I: IntoIterator<Item = V>,
        K: Into<String>,
        V: Named,
    {
        let mut map = NocaseDict::from_named(items);
        for (key, value) in defaults {
            let key = key.into();
            if !map.contains_key(&key) {
                map.insert(key, value);
            }
        }
        map
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by key, ignoring case.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.position(key).map(|pos| &self.entries[pos].1)
    }

    /// Mutable lookup by key, ignoring case.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.position(key).map(move |pos| &mut self.entries[pos].1)
    }

    /// Look up the stored key (with its original case) and value.
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &V)> {
        self.position(key).map(|pos| {
            let (k, v) = &self.entries[pos];
            (k.as_str(), v)
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&fold(key))
    }

    /// Insertion position of `key`, if present.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(&fold(key)).copied()
    }

    /// Entry at insertion position `pos`.
    pub fn get_index(&self, pos: usize) -> Option<(&str, &V)> {
        self.entries.get(pos).map(|(k, v)| (k.as_str(), v))
    }

    /// Insert or replace a value.
    ///
    /// Replacing keeps the entry's position and takes over the case of the
    /// new key. Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let folded = fold(&key);
        match self.index.get(&folded) {
            Some(&pos) => {
                let slot = &mut self.entries[pos];
                slot.0 = key;
                Some(std::mem::replace(&mut slot.1, value))
            }
            None => {
                self.index.insert(folded, self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a value, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let pos = self.index.remove(&fold(key))?;
        let (_, value) = self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Merge entries, replacing values of keys already present.
    pub fn update<I, K>(&mut self, items: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        for (key, value) in items {
            self.insert(key, value);
        }
    }

    /// Keys in insertion order, with their stored case.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> + '_ {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries ordered by lower-cased key.
    pub fn sorted_by_folded_key(&self) -> Vec<(String, &str, &V)> {
        let mut items: Vec<(String, &str, &V)> = self
            .entries
            .iter()
            .map(|(k, v)| (fold(k), k.as_str(), v))
            .collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        items
    }

    /// Apply `f` to every value, keeping keys and order.
    pub fn map_values<W>(&self, mut f: impl FnMut(&V) -> W) -> NocaseDict<W> {
        NocaseDict {
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), f(v)))
                .collect(),
            index: self.index.clone(),
        }
    }

    /// Ordering comparison between two maps.
    ///
    /// Entries are compared pairwise in lower-cased key order, keys first.
    /// Fails with a type error when two values cannot be ordered.
    #[deprecated(note = "ordering comparisons of NocaseDict objects are deprecated")]
    #[track_caller]
    pub fn compare(&self, other: &NocaseDict<V>, config: &Config) -> Result<Ordering>
    where
        V: PartialOrd,
    {
        compat::deprecated(Deprecated::NocaseDictOrdering, config);
        self.partial_cmp_items(other).ok_or_else(|| {
            CimError::type_mismatch("NocaseDict values are not comparable")
        })
    }

    pub(crate) fn partial_cmp_items(&self, other: &NocaseDict<V>) -> Option<Ordering>
    where
        V: PartialOrd,
    {
        let lhs = self.sorted_by_folded_key();
        let rhs = other.sorted_by_folded_key();
        for ((lk, _, lv), (rk, _, rv)) in lhs.iter().zip(rhs.iter()) {
            match lk.cmp(rk) {
                Ordering::Equal => {}
                unequal => return Some(unequal),
            }
            match lv.partial_cmp(rv)? {
                Ordering::Equal => {}
                unequal => return Some(unequal),
            }
        }
        Some(lhs.len().cmp(&rhs.len()))
    }
}

impl<V: PartialEq> PartialEq for NocaseDict<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| ov == v))
    }
}

impl<V: Eq> Eq for NocaseDict<V> {}

impl<V: Hash> Hash for NocaseDict<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for (folded, _, value) in self.sorted_by_folded_key() {
            folded.hash(state);
            value.hash(state);
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for NocaseDict<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for NocaseDict<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = NocaseDict::new();
        map.update(iter);
        map
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for NocaseDict<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.update(iter);
    }
}

impl<K: Into<String>, V> From<Vec<(K, V)>> for NocaseDict<V> {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<V> From<BTreeMap<String, V>> for NocaseDict<V> {
    fn from(map: BTreeMap<String, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<V> IntoIterator for NocaseDict<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

pub(crate) fn name_eq(a: &str, b: &str) -> bool {
    a == b || fold(a) == fold(b)
}

pub(crate) fn opt_name_eq(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => name_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

pub(crate) fn hash_name<H: Hasher>(name: &str, state: &mut H) {
    fold(name).hash(state);
}

pub(crate) fn hash_opt_name<H: Hasher>(name: Option<&str>, state: &mut H) {
    match name {
        Some(name) => {
            state.write_u8(1);
            hash_name(name, state);
        }
        None => state.write_u8(0),
    }
}

pub(crate) fn cmp_opt_name(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => fold(a).cmp(&fold(b)),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    struct Item(&'static str, u32);

    impl Named for Item {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn lookup_ignores_case_and_keeps_original_key() {
        let mut map = NocaseDict::new();
        map.insert("InstanceID", 1);
        assert_eq!(map.get("instanceid"), Some(&1));
        assert!(map.contains_key("INSTANCEID"));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["InstanceID"]);
        map.insert("INSTANCEID", 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("InstanceId"), Some(&2));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["INSTANCEID"]);
    }

    #[test]
    fn preserves_insertion_order_across_removal() {
        let mut map: NocaseDict<u32> =
            vec![("b", 1), ("A", 2), ("c", 3), ("D", 4)].into();
        assert_eq!(map.remove("a"), Some(2));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "c", "D"]);
        assert_eq!(map.position("d"), Some(2));
        assert_eq!(map.get("D"), Some(&4));
        assert_eq!(map.remove("zz"), None);
    }

    #[test]
    fn equality_and_hash_ignore_case_and_order() {
        let a: NocaseDict<u32> = vec![("Name", 1), ("Other", 2)].into();
        let b: NocaseDict<u32> = vec![("OTHER", 2), ("name", 1)].into();
        let c: NocaseDict<u32> = vec![("Name", 1), ("Other", 3)].into();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn named_items_with_defaults() {
        let map = NocaseDict::from_named_with_defaults(
            vec![Item("p1", 1)],
            vec![("P1", Item("ignored", 9)), ("p2", Item("p2", 2))],
        );
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("p1").map(|i| i.1), Some(1));
        assert_eq!(map.get("P2").map(|i| i.1), Some(2));
    }

    #[test]
    #[allow(deprecated)]
    fn deprecated_ordering() {
        let cfg = Config::default();
        let a: NocaseDict<u32> = vec![("a", 1)].into();
        let b: NocaseDict<u32> = vec![("A", 2)].into();
        assert_eq!(a.compare(&b, &cfg).unwrap(), Ordering::Less);
        assert_eq!(a.compare(&a.clone(), &cfg).unwrap(), Ordering::Equal);
        let x: NocaseDict<f64> = vec![("a", f64::NAN)].into();
        let y: NocaseDict<f64> = vec![("a", 1.0)].into();
        assert!(matches!(x.compare(&y, &cfg), Err(CimError::Type(_))));
    }

    #[test]
    fn update_merges_values() {
        let mut map: NocaseDict<u32> = vec![("a", 1)].into();
        map.update(vec![("A", 5), ("b", 6)]);
        assert_eq!(map.get("a"), Some(&5));
        assert_eq!(map.len(), 2);
        let squared = map.map_values(|v| v * v);
        assert_eq!(squared.get("B"), Some(&36));
    }
}
