//! Global string table backing [`Symbol`].
//!
//! The table maps each distinct string to a dense `u32` index and keeps a
//! reverse index for O(1) lookup in [`StringTable::get`]. Interned strings
//! are leaked to obtain `'static` references; the table lives for the whole
//! process and entries are never removed, so this is a bounded, one-time
//! cost per distinct name.

use std::sync::{LazyLock, RwLock};

use dashmap::DashMap;

use super::Symbol;

/// The process-wide string table.
///
/// Keywords and `main` are interned first so the `KW_*`/`ID_MAIN` constants
/// in the parent module line up with their table indices.
pub static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(|| {
    let table = StringTable::new();
    for known in ["int", "return", "if", "else", "while", "main"] {
        table.intern(known);
    }
    table
});

/// Two-way interner: string to index via a concurrent map, index to string
/// via a plain vector behind a read-write lock.
pub struct StringTable {
    map: DashMap<&'static str, u32, ahash::RandomState>,
    strings: RwLock<Vec<&'static str>>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity_and_hasher(256, ahash::RandomState::new()),
            strings: RwLock::new(Vec::with_capacity(256)),
        }
    }

    /// Intern `string`, returning its symbol.
    pub fn intern(&self, string: &str) -> Symbol {
        if let Some(index) = self.map.get(string) {
            return Symbol { index: *index };
        }

        // Take the write lock before the map entry so a racing intern of the
        // same string cannot allocate two indices.
        let mut strings = self.strings.write().unwrap();
        match self.map.entry(Box::leak(string.to_owned().into_boxed_str())) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Symbol {
                index: *entry.get(),
            },
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let index = strings.len() as u32;
                strings.push(*entry.key());
                entry.insert(index);
                Symbol { index }
            }
        }
    }

    /// Resolve a symbol back to its string.
    ///
    /// Symbols are only produced by [`StringTable::intern`], so the index is
    /// always in bounds; an empty string is returned for a symbol forged out
    /// of thin air rather than panicking inside a `Display` impl.
    pub fn get(&self, symbol: Symbol) -> &'static str {
        self.strings
            .read()
            .unwrap()
            .get(symbol.index as usize)
            .copied()
            .unwrap_or("")
    }
}
