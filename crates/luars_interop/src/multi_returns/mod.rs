// MultiReturns - Lua's "a call produces 0..n values"
// - One frozen Rc<[LuaValue]> buffer per call boundary
// - Views (offset, count) share that buffer; rest continuations never copy
// - Typed projections live in `typed.rs`, runtime shapes in `reconstruct.rs`
mod reconstruct;
mod slot;
mod typed;

use crate::lua_value::LuaValue;
use std::fmt;
use std::rc::Rc;

pub use reconstruct::{MultiReturnsShape, ShapedMultiReturns, create_instance, make_instance_type};
pub use slot::{LuaSlot, ValueCategory};
pub use typed::{
    MultiReturns1, MultiReturns2, MultiReturns3, MultiReturns4, MultiReturns5, MultiReturns6,
    MultiReturns7, MultiReturns8, MultiReturnsLike, StaticMultiReturns,
};

/// Untyped return values: a read-only view over a shared buffer
#[derive(Clone)]
pub struct MultiReturns {
    values: Rc<[LuaValue]>,
    offset: usize,
    /// Index after the last non-nil value inside the view
    count: usize,
}

/// Position after the last non-nil value of `values[start..end]`, relative to `start`
fn trimmed_count(values: &[LuaValue], start: usize, end: usize) -> usize {
    let end = end.min(values.len());
    if start >= end {
        return 0;
    }
    values[start..end]
        .iter()
        .rposition(|v| !v.is_nil())
        .map_or(0, |last| last + 1)
}

impl MultiReturns {
    /// Copy `values` into a fresh frozen buffer
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = LuaValue>,
    {
        let values: Rc<[LuaValue]> = values.into_iter().collect();
        let count = trimmed_count(&values, 0, values.len());
        MultiReturns {
            values,
            offset: 0,
            count,
        }
    }

    pub fn empty() -> Self {
        MultiReturns {
            values: Rc::from(Vec::new()),
            offset: 0,
            count: 0,
        }
    }

    /// Value at `index`; nil past the end
    #[inline]
    pub fn get(&self, index: usize) -> LuaValue {
        if index < self.count {
            self.values[self.offset + index].clone()
        } else {
            LuaValue::Nil
        }
    }

    #[inline]
    pub fn first(&self) -> LuaValue {
        self.get(0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The counted part of the view; interior nils included
    pub fn as_slice(&self) -> &[LuaValue] {
        &self.values[self.offset..self.offset + self.count]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LuaValue> {
        self.as_slice().iter()
    }

    pub fn to_vec(&self) -> Vec<LuaValue> {
        self.as_slice().to_vec()
    }

    /// Whether both views are backed by the same buffer
    pub fn shares_storage_with(&self, other: &MultiReturns) -> bool {
        Rc::ptr_eq(&self.values, &other.values)
    }

    /// The values from position `offset` on, sharing this buffer
    pub(crate) fn slice(&self, offset: usize) -> MultiReturns {
        let skip = offset.min(self.count);
        MultiReturns {
            values: self.values.clone(),
            offset: self.offset + skip,
            count: self.count - skip,
        }
    }

    /// The first `n` positions, sharing this buffer
    pub(crate) fn take(&self, n: usize) -> MultiReturns {
        let start = self.offset;
        MultiReturns {
            values: self.values.clone(),
            offset: start,
            count: trimmed_count(&self.values, start, start + n.min(self.count)),
        }
    }

    /// `self` limited to `at` positions followed by `tail`.
    /// Shares the buffer when `tail` already sits at position `at` of it.
    pub(crate) fn join(&self, at: usize, tail: &MultiReturns) -> MultiReturns {
        let head = self.take(at);
        if tail.is_empty() {
            return head;
        }
        if head.shares_storage_with(tail) && tail.offset == head.offset + at {
            return MultiReturns {
                values: head.values.clone(),
                offset: head.offset,
                count: at + tail.count,
            };
        }

        let mut values = Vec::with_capacity(at + tail.count);
        values.extend((0..at).map(|i| head.get(i)));
        values.extend(tail.iter().cloned());
        MultiReturns::new(values)
    }

    /// Split into a tuple, see [`Deconstruct`]
    pub fn deconstruct<T: Deconstruct>(&self) -> T {
        T::deconstruct(self)
    }

    /// Reconstruct the best-fit shape for `values`
    pub fn create_instance(values: &[LuaValue]) -> ShapedMultiReturns {
        reconstruct::create_inferred(values)
    }

    /// Adjust `values` to a static MultiReturns type
    pub fn create_instance_of<T: StaticMultiReturns>(values: &[LuaValue]) -> T {
        T::from_multi_returns(&MultiReturns::new(values.iter().cloned()))
    }
}

impl Default for MultiReturns {
    fn default() -> Self {
        MultiReturns::empty()
    }
}

impl From<Vec<LuaValue>> for MultiReturns {
    fn from(values: Vec<LuaValue>) -> Self {
        MultiReturns::new(values)
    }
}

impl FromIterator<LuaValue> for MultiReturns {
    fn from_iter<I: IntoIterator<Item = LuaValue>>(iter: I) -> Self {
        MultiReturns::new(iter)
    }
}

impl<'a> IntoIterator for &'a MultiReturns {
    type Item = &'a LuaValue;
    type IntoIter = std::slice::Iter<'a, LuaValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for MultiReturns {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for MultiReturns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Tuple forms a MultiReturns can be split into
pub trait Deconstruct: Sized {
    fn deconstruct(values: &MultiReturns) -> Self;
}

macro_rules! value_type {
    ($_idx:tt) => {
        LuaValue
    };
}

macro_rules! impl_deconstruct {
    ($($idx:tt)+) => {
        impl Deconstruct for ($(value_type!($idx),)+) {
            #[inline]
            fn deconstruct(values: &MultiReturns) -> Self {
                ($(values.get($idx),)+)
            }
        }
    };
}

impl_deconstruct!(0);
impl_deconstruct!(0 1);
impl_deconstruct!(0 1 2);
impl_deconstruct!(0 1 2 3);
impl_deconstruct!(0 1 2 3 4);
impl_deconstruct!(0 1 2 3 4 5);
impl_deconstruct!(0 1 2 3 4 5 6);

/// Seven values and the rest, which shares the buffer
impl Deconstruct
    for (
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        MultiReturns,
    )
{
    fn deconstruct(values: &MultiReturns) -> Self {
        (
            values.get(0),
            values.get(1),
            values.get(2),
            values.get(3),
            values.get(4),
            values.get(5),
            values.get(6),
            values.slice(7),
        )
    }
}
