// Typed MultiReturns family
//
// MultiReturns1..7 type the first N values; MultiReturns8 types seven and
// keeps everything after them in a `TRest` that is itself a member of the
// family, so any number of values stays typed seven at a time.
//
// Every projection owns one untyped view (the single source of truth) and
// converts on read. Conversions between arities follow Lua call-site
// adjustment: extra values are dropped and missing ones read as nil.
use super::reconstruct::conform;
use super::{LuaSlot, MultiReturns, MultiReturnsShape};
use crate::lua_value::LuaValue;
use std::fmt;
use std::marker::PhantomData;

mod private {
    pub trait Sealed {}
}

/// Read-only access shared by the untyped and the typed family
pub trait MultiReturnsLike {
    /// Number of counted positions (trailing nils excluded)
    fn count(&self) -> usize;

    /// Value at `index`; nil past the end
    fn get(&self, index: usize) -> LuaValue;

    fn to_multi_returns(&self) -> MultiReturns;

    /// Lua call-site adjustment to any member of the family
    fn adjust<T: StaticMultiReturns>(&self) -> T
    where
        Self: Sized,
    {
        T::from_multi_returns(&self.to_multi_returns())
    }
}

/// The closed set of MultiReturns types: the untyped core, MultiReturns1..7
/// and MultiReturns8 over any of them
pub trait StaticMultiReturns: MultiReturnsLike + Clone + Sized + private::Sealed {
    /// Runtime descriptor of this type
    fn shape() -> MultiReturnsShape;

    /// Build from untyped values; slots of another category read as nil
    fn from_multi_returns(values: &MultiReturns) -> Self;
}

impl private::Sealed for MultiReturns {}

impl MultiReturnsLike for MultiReturns {
    #[inline]
    fn count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn get(&self, index: usize) -> LuaValue {
        MultiReturns::get(self, index)
    }

    fn to_multi_returns(&self) -> MultiReturns {
        self.clone()
    }
}

impl StaticMultiReturns for MultiReturns {
    fn shape() -> MultiReturnsShape {
        MultiReturnsShape::Untyped
    }

    fn from_multi_returns(values: &MultiReturns) -> Self {
        values.clone()
    }
}

macro_rules! typed_multi_returns {
    ($(#[$meta:meta])* $name:ident, $arity:expr; $($T:ident => $value:ident [$idx:tt]),+) => {
        $(#[$meta])*
        pub struct $name<$($T),+> {
            inner: MultiReturns,
            _slots: PhantomData<fn() -> ($($T,)+)>,
        }

        impl<$($T: LuaSlot),+> $name<$($T),+> {
            pub const ARITY: usize = $arity;

            pub fn new($($value: Option<$T>),+) -> Self {
                Self::from_inner(MultiReturns::new([
                    $($value.map_or(LuaValue::Nil, <$T as LuaSlot>::into_value)),+
                ]))
            }

            $(
                #[inline]
                pub fn $value(&self) -> Option<$T> {
                    <$T as LuaSlot>::from_value(&self.inner.get($idx))
                }
            )+

            #[inline]
            pub fn get(&self, index: usize) -> LuaValue {
                self.inner.get(index)
            }

            #[inline]
            pub fn len(&self) -> usize {
                self.inner.len()
            }

            #[inline]
            pub fn is_empty(&self) -> bool {
                self.inner.is_empty()
            }

            /// All slots as a tuple
            pub fn values(&self) -> ($(Option<$T>,)+) {
                ($(self.$value(),)+)
            }
        }

        impl<$($T),+> $name<$($T),+> {
            fn from_inner(inner: MultiReturns) -> Self {
                $name {
                    inner,
                    _slots: PhantomData,
                }
            }

            pub fn empty() -> Self {
                Self::from_inner(MultiReturns::empty())
            }

            pub fn as_untyped(&self) -> &MultiReturns {
                &self.inner
            }
        }

        impl<$($T),+> Clone for $name<$($T),+> {
            fn clone(&self) -> Self {
                Self::from_inner(self.inner.clone())
            }
        }

        impl<$($T),+> Default for $name<$($T),+> {
            fn default() -> Self {
                Self::empty()
            }
        }

        impl<$($T),+> PartialEq for $name<$($T),+> {
            fn eq(&self, other: &Self) -> bool {
                self.inner == other.inner
            }
        }

        impl<$($T),+> fmt::Debug for $name<$($T),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.inner).finish()
            }
        }

        impl<$($T),+> private::Sealed for $name<$($T),+> {}

        impl<$($T: LuaSlot),+> MultiReturnsLike for $name<$($T),+> {
            fn count(&self) -> usize {
                self.inner.len()
            }

            fn get(&self, index: usize) -> LuaValue {
                self.inner.get(index)
            }

            fn to_multi_returns(&self) -> MultiReturns {
                self.inner.clone()
            }
        }

        impl<$($T: LuaSlot),+> StaticMultiReturns for $name<$($T),+> {
            fn shape() -> MultiReturnsShape {
                MultiReturnsShape::Fixed(vec![$(<$T as LuaSlot>::CATEGORY),+])
            }

            fn from_multi_returns(values: &MultiReturns) -> Self {
                Self::from_inner(conform(values, &[$(<$T as LuaSlot>::CATEGORY),+]))
            }
        }

        impl<$($T),+> From<$name<$($T),+>> for MultiReturns {
            fn from(values: $name<$($T),+>) -> Self {
                values.inner
            }
        }
    };
}

typed_multi_returns!(
    /// One typed return value
    MultiReturns1, 1;
    T1 => value1 [0]
);
typed_multi_returns!(
    MultiReturns2, 2;
    T1 => value1 [0], T2 => value2 [1]
);
typed_multi_returns!(
    MultiReturns3, 3;
    T1 => value1 [0], T2 => value2 [1], T3 => value3 [2]
);
typed_multi_returns!(
    MultiReturns4, 4;
    T1 => value1 [0], T2 => value2 [1], T3 => value3 [2], T4 => value4 [3]
);
typed_multi_returns!(
    MultiReturns5, 5;
    T1 => value1 [0], T2 => value2 [1], T3 => value3 [2], T4 => value4 [3],
    T5 => value5 [4]
);
typed_multi_returns!(
    MultiReturns6, 6;
    T1 => value1 [0], T2 => value2 [1], T3 => value3 [2], T4 => value4 [3],
    T5 => value5 [4], T6 => value6 [5]
);
typed_multi_returns!(
    /// Seven typed return values and nothing after them
    MultiReturns7, 7;
    T1 => value1 [0], T2 => value2 [1], T3 => value3 [2], T4 => value4 [3],
    T5 => value5 [4], T6 => value6 [5], T7 => value7 [6]
);

// K -> K + 1 pads with nil, K + 1 -> K drops the last slot
macro_rules! widen_narrow {
    ($small:ident => $big:ident, $arity:expr; $($T:ident),+; $U:ident) => {
        impl<$($T,)+ $U> From<$small<$($T),+>> for $big<$($T,)+ $U> {
            fn from(values: $small<$($T),+>) -> Self {
                $big::from_inner(values.inner)
            }
        }

        impl<$($T,)+ $U> $big<$($T,)+ $U> {
            pub fn narrow(self) -> $small<$($T),+> {
                $small::from_inner(self.inner.take($arity))
            }
        }
    };
}

widen_narrow!(MultiReturns1 => MultiReturns2, 1; T1; T2);
widen_narrow!(MultiReturns2 => MultiReturns3, 2; T1, T2; T3);
widen_narrow!(MultiReturns3 => MultiReturns4, 3; T1, T2, T3; T4);
widen_narrow!(MultiReturns4 => MultiReturns5, 4; T1, T2, T3, T4; T5);
widen_narrow!(MultiReturns5 => MultiReturns6, 5; T1, T2, T3, T4, T5; T6);
widen_narrow!(MultiReturns6 => MultiReturns7, 6; T1, T2, T3, T4, T5, T6; T7);

/// Seven typed return values followed by a typed continuation
pub struct MultiReturns8<T1, T2, T3, T4, T5, T6, T7, TRest> {
    /// First seven values, already conformed to their slots
    head: MultiReturns,
    rest: TRest,
    _slots: PhantomData<fn() -> (T1, T2, T3, T4, T5, T6, T7)>,
}

impl<T1, T2, T3, T4, T5, T6, T7, TRest> MultiReturns8<T1, T2, T3, T4, T5, T6, T7, TRest>
where
    T1: LuaSlot,
    T2: LuaSlot,
    T3: LuaSlot,
    T4: LuaSlot,
    T5: LuaSlot,
    T6: LuaSlot,
    T7: LuaSlot,
    TRest: StaticMultiReturns,
{
    pub const HEAD_ARITY: usize = 7;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        value1: Option<T1>,
        value2: Option<T2>,
        value3: Option<T3>,
        value4: Option<T4>,
        value5: Option<T5>,
        value6: Option<T6>,
        value7: Option<T7>,
        rest: TRest,
    ) -> Self {
        let head = MultiReturns::new([
            value1.map_or(LuaValue::Nil, T1::into_value),
            value2.map_or(LuaValue::Nil, T2::into_value),
            value3.map_or(LuaValue::Nil, T3::into_value),
            value4.map_or(LuaValue::Nil, T4::into_value),
            value5.map_or(LuaValue::Nil, T5::into_value),
            value6.map_or(LuaValue::Nil, T6::into_value),
            value7.map_or(LuaValue::Nil, T7::into_value),
        ]);
        MultiReturns8 {
            head,
            rest,
            _slots: PhantomData,
        }
    }

    /// Like [`new`](Self::new), with the continuation built from untyped values
    #[allow(clippy::too_many_arguments)]
    pub fn with_rest_values<I>(
        value1: Option<T1>,
        value2: Option<T2>,
        value3: Option<T3>,
        value4: Option<T4>,
        value5: Option<T5>,
        value6: Option<T6>,
        value7: Option<T7>,
        rest: I,
    ) -> Self
    where
        I: IntoIterator<Item = LuaValue>,
    {
        let rest = TRest::from_multi_returns(&rest.into_iter().collect::<MultiReturns>());
        Self::new(value1, value2, value3, value4, value5, value6, value7, rest)
    }

    pub fn value1(&self) -> Option<T1> {
        T1::from_value(&self.head.get(0))
    }

    pub fn value2(&self) -> Option<T2> {
        T2::from_value(&self.head.get(1))
    }

    pub fn value3(&self) -> Option<T3> {
        T3::from_value(&self.head.get(2))
    }

    pub fn value4(&self) -> Option<T4> {
        T4::from_value(&self.head.get(3))
    }

    pub fn value5(&self) -> Option<T5> {
        T5::from_value(&self.head.get(4))
    }

    pub fn value6(&self) -> Option<T6> {
        T6::from_value(&self.head.get(5))
    }

    pub fn value7(&self) -> Option<T7> {
        T7::from_value(&self.head.get(6))
    }

    /// Everything after the seventh value
    pub fn rest(&self) -> &TRest {
        &self.rest
    }

    pub fn get(&self, index: usize) -> LuaValue {
        if index < Self::HEAD_ARITY {
            self.head.get(index)
        } else {
            self.rest.get(index - Self::HEAD_ARITY)
        }
    }

    pub fn len(&self) -> usize {
        match self.rest.count() {
            0 => self.head.len(),
            tail => Self::HEAD_ARITY + tail,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[allow(clippy::type_complexity)]
    pub fn values(
        &self,
    ) -> (
        Option<T1>,
        Option<T2>,
        Option<T3>,
        Option<T4>,
        Option<T5>,
        Option<T6>,
        Option<T7>,
        TRest,
    ) {
        (
            self.value1(),
            self.value2(),
            self.value3(),
            self.value4(),
            self.value5(),
            self.value6(),
            self.value7(),
            self.rest.clone(),
        )
    }

    /// Drop the continuation
    pub fn narrow(self) -> MultiReturns7<T1, T2, T3, T4, T5, T6, T7> {
        MultiReturns7::from_inner(self.head)
    }
}

impl<T1, T2, T3, T4, T5, T6, T7, TRest: Clone> Clone
    for MultiReturns8<T1, T2, T3, T4, T5, T6, T7, TRest>
{
    fn clone(&self) -> Self {
        MultiReturns8 {
            head: self.head.clone(),
            rest: self.rest.clone(),
            _slots: PhantomData,
        }
    }
}

impl<T1, T2, T3, T4, T5, T6, T7, TRest: fmt::Debug> fmt::Debug
    for MultiReturns8<T1, T2, T3, T4, T5, T6, T7, TRest>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiReturns8")
            .field("head", &self.head)
            .field("rest", &self.rest)
            .finish()
    }
}

impl<T1, T2, T3, T4, T5, T6, T7, TRest> private::Sealed
    for MultiReturns8<T1, T2, T3, T4, T5, T6, T7, TRest>
{
}

impl<T1, T2, T3, T4, T5, T6, T7, TRest> MultiReturnsLike
    for MultiReturns8<T1, T2, T3, T4, T5, T6, T7, TRest>
where
    T1: LuaSlot,
    T2: LuaSlot,
    T3: LuaSlot,
    T4: LuaSlot,
    T5: LuaSlot,
    T6: LuaSlot,
    T7: LuaSlot,
    TRest: StaticMultiReturns,
{
    fn count(&self) -> usize {
        self.len()
    }

    fn get(&self, index: usize) -> LuaValue {
        MultiReturns8::get(self, index)
    }

    fn to_multi_returns(&self) -> MultiReturns {
        self.head.join(Self::HEAD_ARITY, &self.rest.to_multi_returns())
    }
}

impl<T1, T2, T3, T4, T5, T6, T7, TRest> StaticMultiReturns
    for MultiReturns8<T1, T2, T3, T4, T5, T6, T7, TRest>
where
    T1: LuaSlot,
    T2: LuaSlot,
    T3: LuaSlot,
    T4: LuaSlot,
    T5: LuaSlot,
    T6: LuaSlot,
    T7: LuaSlot,
    TRest: StaticMultiReturns,
{
    fn shape() -> MultiReturnsShape {
        MultiReturnsShape::Continued(
            vec![
                T1::CATEGORY,
                T2::CATEGORY,
                T3::CATEGORY,
                T4::CATEGORY,
                T5::CATEGORY,
                T6::CATEGORY,
                T7::CATEGORY,
            ],
            Box::new(TRest::shape()),
        )
    }

    fn from_multi_returns(values: &MultiReturns) -> Self {
        let head = conform(
            values,
            &[
                T1::CATEGORY,
                T2::CATEGORY,
                T3::CATEGORY,
                T4::CATEGORY,
                T5::CATEGORY,
                T6::CATEGORY,
                T7::CATEGORY,
            ],
        );
        MultiReturns8 {
            head,
            rest: TRest::from_multi_returns(&values.slice(Self::HEAD_ARITY)),
            _slots: PhantomData,
        }
    }
}

impl<T1, T2, T3, T4, T5, T6, T7, TRest> From<MultiReturns8<T1, T2, T3, T4, T5, T6, T7, TRest>>
    for MultiReturns
where
    T1: LuaSlot,
    T2: LuaSlot,
    T3: LuaSlot,
    T4: LuaSlot,
    T5: LuaSlot,
    T6: LuaSlot,
    T7: LuaSlot,
    TRest: StaticMultiReturns,
{
    fn from(values: MultiReturns8<T1, T2, T3, T4, T5, T6, T7, TRest>) -> Self {
        values.to_multi_returns()
    }
}

// Any fixed arity widens into MultiReturns8 with an empty continuation
macro_rules! widen_to_eight {
    ($small:ident; $($T:ident),+) => {
        impl<T1, T2, T3, T4, T5, T6, T7, TRest> From<$small<$($T),+>>
            for MultiReturns8<T1, T2, T3, T4, T5, T6, T7, TRest>
        where
            T1: LuaSlot,
            T2: LuaSlot,
            T3: LuaSlot,
            T4: LuaSlot,
            T5: LuaSlot,
            T6: LuaSlot,
            T7: LuaSlot,
            TRest: StaticMultiReturns,
        {
            fn from(values: $small<$($T),+>) -> Self {
                MultiReturns8 {
                    head: values.inner,
                    rest: TRest::from_multi_returns(&MultiReturns::empty()),
                    _slots: PhantomData,
                }
            }
        }
    };
}

widen_to_eight!(MultiReturns1; T1);
widen_to_eight!(MultiReturns2; T1, T2);
widen_to_eight!(MultiReturns3; T1, T2, T3);
widen_to_eight!(MultiReturns4; T1, T2, T3, T4);
widen_to_eight!(MultiReturns5; T1, T2, T3, T4, T5);
widen_to_eight!(MultiReturns6; T1, T2, T3, T4, T5, T6);
widen_to_eight!(MultiReturns7; T1, T2, T3, T4, T5, T6, T7);
