//! Fixed-capacity open-addressing hash table.
//!
//! The table is sized once, up front, from the caller's knowledge of the
//! maximum item count (the frontier width during construction, the level
//! width during reduction). It never resizes: pushing the occupancy past
//! the 90% load ceiling is a provisioning error and fatal. There is no
//! deletion. Hashing and equality are delegated to the key's own
//! [`MyHash`]/[`Eq`].

use log::debug;

use crate::utils::MyHash;

/// Table sizes, each a prime slightly above double a power of two, so that
/// probe sequences stay short for any requested capacity.
const PRIMES: [u64; 30] = [
    2,
    5,
    (1 << 3) + 3,
    (1 << 4) + 3,
    (1 << 5) + 5,
    (1 << 6) + 3,
    (1 << 7) + 3,
    (1 << 8) + 7,
    (1 << 9) + 9,
    (1 << 10) + 7,
    (1 << 11) + 5,
    (1 << 12) + 3,
    (1 << 13) + 17,
    (1 << 14) + 27,
    (1 << 15) + 3,
    (1 << 16) + 3,
    (1 << 17) + 29,
    (1 << 18) + 3,
    (1 << 19) + 21,
    (1 << 20) + 7,
    (1 << 21) + 17,
    (1 << 22) + 15,
    (1 << 23) + 9,
    (1 << 24) + 43,
    (1 << 25) + 35,
    (1 << 26) + 15,
    (1 << 27) + 29,
    (1 << 28) + 3,
    (1 << 29) + 11,
    (1 << 30) + 3,
];

/// Smallest listed prime at least double `max_items`. Past the end of the
/// list the doubled request itself is used.
fn table_size(max_items: usize) -> usize {
    let want = (max_items as u64).saturating_mul(2);
    PRIMES.iter().copied().find(|&p| p >= want).unwrap_or(want + 1) as usize
}

/// Linear-probing insert-or-find table with explicit pre-sized capacity.
pub struct ProbeTable<K, V> {
    entries: Vec<Option<(K, V)>>,
    /// Active prefix of `entries`; always one of the listed primes.
    size: usize,
    items: usize,
    collisions: usize,
}

impl<K, V> ProbeTable<K, V>
where
    K: MyHash + Eq,
    V: Copy,
{
    /// Create an uninitialized table; call [`initialize`][Self::initialize]
    /// before the first `put`.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            size: 0,
            items: 0,
            collisions: 0,
        }
    }

    pub fn with_capacity(max_items: usize) -> Self {
        let mut table = Self::new();
        table.initialize(max_items);
        table
    }

    /// Empty the table and size it for at most `max_items` insertions.
    /// The backing allocation is reused when it is already large enough.
    pub fn initialize(&mut self, max_items: usize) {
        self.size = table_size(max_items);
        self.items = 0;
        self.collisions = 0;

        if self.size > self.entries.len() {
            debug!("table: growing to {} slots for {} items", self.size, max_items);
            self.entries.clear();
            self.entries.resize_with(self.size, || None);
        } else {
            for entry in &mut self.entries[..self.size] {
                *entry = None;
            }
        }
    }

    /// Insert-or-find: returns the incumbent value when the key is already
    /// present, otherwise stores `value` and returns it.
    ///
    /// # Panics
    ///
    /// Panics when storing a fresh key would push the occupancy beyond the
    /// 90% load ceiling; the message carries the size, item and collision
    /// counters. This signals an under-provisioned capacity estimate, not
    /// a recoverable condition.
    pub fn put(&mut self, key: K, value: V) -> V {
        assert_ne!(self.size, 0, "Table is not initialized");

        let mut i = (key.hash() % self.size as u64) as usize;
        loop {
            match &self.entries[i] {
                Some((k, v)) if *k == key => return *v,
                Some(_) => {
                    self.collisions += 1;
                    i += 1;
                    if i >= self.size {
                        i = 0;
                    }
                }
                None => break,
            }
        }

        if (self.items + 1) * 100 > self.size * 90 {
            panic!(
                "hash table overflow: size = {}, items = {}, collisions = {}",
                self.size, self.items, self.collisions
            );
        }

        self.items += 1;
        self.entries[i] = Some((key, value));
        value
    }

    /// Allocated capacity (may exceed the active size after re-initialization).
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Active table size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of stored keys.
    pub fn items(&self) -> usize {
        self.items
    }

    /// Probe steps taken past occupied slots so far.
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

impl<K, V> Default for ProbeTable<K, V>
where
    K: MyHash + Eq,
    V: Copy,
{
    fn default() -> Self {
        Self::new()
    }
}
