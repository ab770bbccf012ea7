// LuaTable - raw storage half of the table protocol
// - Single ahash-backed map; the sequence part is just the run of keys 1..n
// - Metamethod-mediated access lives in `metatable.rs`
use super::LuaValue;
use super::lua_value::float_to_integer;
use crate::lua_error::{LuaError, LuaResult};
use ahash::RandomState;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub type TableRef = Rc<RefCell<LuaTable>>;

/// Lua table (mutable associative array)
/// Nil is never stored: assigning nil removes the entry
#[derive(Default)]
pub struct LuaTable {
    hash: HashMap<LuaValue, LuaValue, RandomState>,

    /// Metatable - optional table that defines special behaviors
    metatable: Option<TableRef>,
}

/// Canonical key form: rejects nil/NaN and folds integral floats to integers
fn normalize_key(key: LuaValue) -> LuaResult<LuaValue> {
    match key {
        LuaValue::Nil => Err(LuaError::NilIndex),
        LuaValue::Float(f) if f.is_nan() => Err(LuaError::NaNIndex),
        LuaValue::Float(f) => Ok(float_to_integer(f).map_or(key, LuaValue::Integer)),
        _ => Ok(key),
    }
}

impl LuaTable {
    pub fn new() -> Self {
        LuaTable {
            hash: HashMap::with_hasher(RandomState::new()),
            metatable: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        LuaTable {
            hash: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            metatable: None,
        }
    }

    /// Build a sequence table `{v1, v2, ...}`; nil values leave holes
    pub fn from_sequence<I>(values: I) -> Self
    where
        I: IntoIterator<Item = LuaValue>,
    {
        let mut table = LuaTable::new();
        for (i, value) in values.into_iter().enumerate() {
            table.set_int(i as i64 + 1, value);
        }
        table
    }

    pub fn into_ref(self) -> TableRef {
        Rc::new(RefCell::new(self))
    }

    /// Get the metatable slot, ignoring `__metatable`
    pub fn get_metatable(&self) -> Option<TableRef> {
        self.metatable.clone()
    }

    /// Set the metatable slot without the protection check.
    /// Use `metatable::set_metatable` for Lua `setmetatable` semantics.
    pub fn set_metatable(&mut self, mt: Option<TableRef>) {
        self.metatable = mt;
    }

    #[inline]
    pub fn has_metatable(&self) -> bool {
        self.metatable.is_some()
    }

    /// Get value with raw access (no metamethods); absent keys read as nil
    pub fn raw_get(&self, key: &LuaValue) -> LuaValue {
        // PartialEq/Hash already fold integral floats, so no normalisation needed
        if key.is_nil() {
            return LuaValue::Nil;
        }
        self.hash.get(key).cloned().unwrap_or_default()
    }

    #[inline]
    pub fn get_int(&self, key: i64) -> LuaValue {
        self.raw_get(&LuaValue::Integer(key))
    }

    /// Get by string key, the common shape for metavalue lookups
    pub fn get_str(&self, key: &str) -> LuaValue {
        self.raw_get(&LuaValue::string(key))
    }

    /// Set value with raw access (no metamethods)
    pub fn raw_set(&mut self, key: LuaValue, value: LuaValue) -> LuaResult<()> {
        let key = normalize_key(key)?;
        if value.is_nil() {
            self.hash.remove(&key);
        } else {
            self.hash.insert(key, value);
        }
        Ok(())
    }

    /// Integer keys can never be nil or NaN, so this cannot fail
    pub fn set_int(&mut self, key: i64, value: LuaValue) {
        let key = LuaValue::Integer(key);
        if value.is_nil() {
            self.hash.remove(&key);
        } else {
            self.hash.insert(key, value);
        }
    }

    pub fn contains_key(&self, key: &LuaValue) -> bool {
        !key.is_nil() && self.hash.contains_key(key)
    }

    /// Number of stored entries (all keys, not just the sequence)
    pub fn raw_count(&self) -> usize {
        self.hash.len()
    }

    /// Sequence length: consecutive integer keys from 1, stopping at the first gap
    pub fn raw_len(&self) -> i64 {
        self.count_from(1)
    }

    /// Length of the run of present integer keys starting at `start`
    fn count_from(&self, start: i64) -> i64 {
        debug_assert!(start >= 1);
        let mut n = 0;
        while self.hash.contains_key(&LuaValue::Integer(start + n)) {
            n += 1;
        }
        n
    }

    /// Append at `raw_len() + 1`
    pub fn add(&mut self, value: LuaValue) {
        let index = self.raw_len() + 1;
        self.set_int(index, value);
    }

    /// Append several values, skipping over keys that are already occupied
    /// past the end of the current sequence
    pub fn add_range<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = LuaValue>,
    {
        let mut index = self.raw_len() + 1;
        for value in values {
            self.set_int(index, value);
            index += 1;
            while self.hash.contains_key(&LuaValue::Integer(index)) {
                index += 1;
            }
        }
    }

    /// `table.insert(t, pos, value)` against the raw sequence length
    pub fn insert(&mut self, pos: i64, value: LuaValue) -> LuaResult<()> {
        let len = self.raw_len();
        self.insert_with_len(pos, len, value)
    }

    /// `table.remove(t [, pos])` against the raw sequence length
    pub fn remove(&mut self, pos: Option<i64>) -> LuaResult<LuaValue> {
        let len = self.raw_len();
        self.remove_with_len(pos, len)
    }

    /// Shift `[pos, len]` up by one and store `value` at `pos`.
    /// `len` is supplied by the caller so `__len` can drive it.
    pub(crate) fn insert_with_len(&mut self, pos: i64, len: i64, value: LuaValue) -> LuaResult<()> {
        // The sequence cannot grow past `i64::MAX`
        let fits = len.checked_add(1).is_some_and(|end| (1..=end).contains(&pos));
        if !fits {
            return Err(LuaError::PositionOutOfBounds {
                function: "insert",
                arg: 2,
                position: pos,
            });
        }

        let mut i = len;
        while i >= pos {
            let moved = self.get_int(i);
            self.set_int(i + 1, moved);
            i -= 1;
        }
        self.set_int(pos, value);
        Ok(())
    }

    /// Remove `pos` (default `len`) and shift `(pos, len]` down by one
    pub(crate) fn remove_with_len(&mut self, pos: Option<i64>, len: i64) -> LuaResult<LuaValue> {
        let pos = match pos {
            Some(pos) => {
                if pos < 1 || pos > len {
                    return Err(LuaError::PositionOutOfBounds {
                        function: "remove",
                        arg: 2,
                        position: pos,
                    });
                }
                pos
            }
            // Removing from an empty sequence is a no-op that yields nil
            None if len <= 0 => return Ok(LuaValue::Nil),
            None => len,
        };

        let removed = self.get_int(pos);
        for i in pos..len {
            let moved = self.get_int(i + 1);
            self.set_int(i, moved);
        }
        self.set_int(len, LuaValue::Nil);
        Ok(removed)
    }

    /// `table.concat(t, sep, i, j)`; `i` defaults to 1, `j` to `#t`
    pub fn concat(&self, sep: &str, i: Option<i64>, j: Option<i64>) -> LuaResult<String> {
        let j = j.unwrap_or_else(|| self.raw_len());
        self.concat_range(sep, i.unwrap_or(1), j)
    }

    pub(crate) fn concat_range(&self, sep: &str, i: i64, j: i64) -> LuaResult<String> {
        let mut out = String::new();
        let mut index = i;
        while index <= j {
            match self.get_int(index) {
                v @ (LuaValue::String(_) | LuaValue::Integer(_) | LuaValue::Float(_)) => {
                    out.push_str(&v.to_string_repr());
                }
                _ => {
                    return Err(LuaError::RuntimeError(format!(
                        "invalid value (at index {}) in table for 'concat'",
                        index
                    )));
                }
            }
            if index == j {
                break;
            }
            out.push_str(sep);
            index += 1;
        }
        Ok(out)
    }

    /// Iterator for next() function - follows the map's enumeration order.
    /// `None` starts the traversal; an absent key ends it.
    pub fn next(&self, key: Option<&LuaValue>) -> Option<(LuaValue, LuaValue)> {
        let entry = match key {
            None | Some(LuaValue::Nil) => self.hash.iter().next(),
            Some(key) => self.hash.iter().skip_while(|(k, _)| *k != key).nth(1),
        };
        entry.map(|(k, v)| (k.clone(), v.clone()))
    }

    /// All key-value pairs in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (&LuaValue, &LuaValue)> + '_ {
        self.hash.iter()
    }

    /// Values at 1, 2, ... up to the first gap
    pub fn sequence(&self) -> SequenceIter<'_> {
        SequenceIter {
            table: self,
            index: 0,
        }
    }

    /// Drop the sequence part only; other keys stay
    pub fn clear_sequence(&mut self) {
        let mut index = 1;
        while self.hash.remove(&LuaValue::Integer(index)).is_some() {
            index += 1;
        }
    }
}

/// List-style view over the sequence part of a table
pub struct SequenceIter<'a> {
    table: &'a LuaTable,
    index: i64,
}

impl Iterator for SequenceIter<'_> {
    type Item = LuaValue;

    fn next(&mut self) -> Option<Self::Item> {
        self.index += 1;
        match self.table.get_int(self.index) {
            LuaValue::Nil => None,
            v => Some(v),
        }
    }
}

impl std::fmt::Debug for LuaTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.hash.iter()).finish()
    }
}
