//! Two-table integer-keyed map
//!
//! [`TwoTableMap`] keeps two independent slot arrays. A key may live in slot
//! `key mod capacity` of either table. When both candidate slots are taken by
//! other keys the whole map doubles in size and every entry is reinserted;
//! entries are never evicted. Optimizers use it to keep per-layer scratch
//! state keyed by [`LayerId`](crate::layers::LayerId).

use tracing::debug;

/// Capacity used by [`TwoTableMap::new`].
pub const DEFAULT_CAPACITY: usize = 32;

/// Keys usable in a [`TwoTableMap`].
///
/// `slot` maps the key into `[0, capacity)`; `capacity` is always at least 1.
pub trait SlotKey: Copy + Eq {
    fn slot(&self, capacity: usize) -> usize;
}

macro_rules! impl_slot_key_unsigned {
    ($($t:ty),*) => {
        $(
            impl SlotKey for $t {
                fn slot(&self, capacity: usize) -> usize {
                    (*self as u128 % capacity as u128) as usize
                }
            }
        )*
    };
}

macro_rules! impl_slot_key_signed {
    ($($t:ty),*) => {
        $(
            impl SlotKey for $t {
                fn slot(&self, capacity: usize) -> usize {
                    (*self as i128).rem_euclid(capacity as i128) as usize
                }
            }
        )*
    };
}

impl_slot_key_unsigned!(u8, u16, u32, u64, usize);
impl_slot_key_signed!(i8, i16, i32, i64, isize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    First,
    Second,
}

/// Integer-keyed map backed by two equally sized tables.
///
/// Values are created with `V::default()` on first access, so looking up a
/// missing key never fails.
///
/// # Example
///
/// ```
/// use micro_nn::data_structures::TwoTableMap;
///
/// let mut map: TwoTableMap<u32, String> = TwoTableMap::with_capacity(1);
/// *map.entry_or_default(1) = "one".to_string();
/// *map.entry_or_default(2) = "two".to_string();
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get(&1).map(String::as_str), Some("one"));
/// assert_eq!(map.entry_or_default(3), "");
/// ```
#[derive(Debug, Clone)]
pub struct TwoTableMap<K, V> {
    first: Vec<Option<(K, V)>>,
    second: Vec<Option<(K, V)>>,
    len: usize,
}

impl<K: SlotKey, V: Default> Default for TwoTableMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SlotKey, V: Default> TwoTableMap<K, V> {
    /// Creates a map with [`DEFAULT_CAPACITY`] slots per table.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a map with `capacity` slots per table (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            first: empty_table(capacity),
            second: empty_table(capacity),
            len: 0,
        }
    }

    /// Returns the value stored for `key`, inserting `V::default()` first if
    /// the key is absent.
    ///
    /// Grows the map when both candidate slots hold other keys.
    pub fn entry_or_default(&mut self, key: K) -> &mut V {
        let (table, slot) = loop {
            match self.claim_slot(key) {
                Some(location) => break location,
                None => self.grow(),
            }
        };

        let entry = match table {
            Table::First => &mut self.first[slot],
            Table::Second => &mut self.second[slot],
        };
        let (_, value) = entry.get_or_insert_with(|| (key, V::default()));
        value
    }

    /// Looks `key` up without inserting.
    pub fn get(&self, key: &K) -> Option<&V> {
        let (table, slot) = self.find(key)?;
        let entry = match table {
            Table::First => &self.first[slot],
            Table::Second => &self.second[slot],
        };
        entry.as_ref().map(|(_, value)| value)
    }

    /// True if `key` has an entry.
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots per table.
    pub fn capacity(&self) -> usize {
        self.first.len()
    }

    /// Iterates over live entries, first table then second.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.first
            .iter()
            .chain(self.second.iter())
            .filter_map(|entry| entry.as_ref().map(|(key, value)| (key, value)))
    }

    /// Removes every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.first.iter_mut().for_each(|entry| *entry = None);
        self.second.iter_mut().for_each(|entry| *entry = None);
        self.len = 0;
    }

    fn find(&self, key: &K) -> Option<(Table, usize)> {
        let slot = key.slot(self.first.len());
        if matches!(&self.first[slot], Some((stored, _)) if stored == key) {
            return Some((Table::First, slot));
        }
        let slot = key.slot(self.second.len());
        if matches!(&self.second[slot], Some((stored, _)) if stored == key) {
            return Some((Table::Second, slot));
        }
        None
    }

    /// Two-probe protocol: returns the slot already holding `key`, or the
    /// first free candidate slot (counting it as a new entry), or `None` when
    /// both candidates belong to other keys.
    fn claim_slot(&mut self, key: K) -> Option<(Table, usize)> {
        for table in [Table::First, Table::Second] {
            let slots = match table {
                Table::First => &self.first,
                Table::Second => &self.second,
            };
            let slot = key.slot(slots.len());
            match &slots[slot] {
                None => {
                    self.len += 1;
                    return Some((table, slot));
                }
                Some((stored, _)) if *stored == key => return Some((table, slot)),
                Some(_) => {}
            }
        }
        None
    }

    fn insert(&mut self, key: K, value: V) {
        *self.entry_or_default(key) = value;
    }

    /// Doubles both tables and reinserts every entry.
    fn grow(&mut self) {
        let new_capacity = self.first.len() * 2;
        debug!(
            from = self.first.len(),
            to = new_capacity,
            entries = self.len,
            "growing two-table map"
        );

        let old_first = std::mem::replace(&mut self.first, empty_table(new_capacity));
        let old_second = std::mem::replace(&mut self.second, empty_table(new_capacity));
        self.len = 0;

        for (key, value) in old_first.into_iter().chain(old_second).flatten() {
            self.insert(key, value);
        }
    }
}

fn empty_table<K, V>(capacity: usize) -> Vec<Option<(K, V)>> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}
