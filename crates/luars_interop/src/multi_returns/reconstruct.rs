/*----------------------------------------------------------------------
  Dynamic reconstruction

  When return arity is only known from the values themselves (an interop
  boundary, a variadic host call) the best-fit MultiReturns type is
  described at runtime by a `MultiReturnsShape` and instantiated as a
  `ShapedMultiReturns`.

  Shapes mirror the static family one to one:
    Untyped               MultiReturns
    Fixed([c1..cn])       MultiReturnsN<..>        1 <= n <= 7
    Continued([c1..c7], tail)
                          MultiReturns8<.., Tail>

  Slot filling is lossy: a value whose category does not fit
  its slot reads back as nil. Only an unsupported shape is an error.
----------------------------------------------------------------------*/

use super::{MultiReturns, MultiReturnsLike, StaticMultiReturns, ValueCategory};
use crate::lua_error::{LuaError, LuaResult};
use crate::lua_limits::MULTI_RETURNS_TYPED_ARITY;
use crate::lua_value::LuaValue;
use std::fmt;
use tracing::debug;

/// Runtime descriptor of a MultiReturns family type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MultiReturnsShape {
    Untyped,
    Fixed(Vec<ValueCategory>),
    /// Seven typed slots and the shape of everything after them
    Continued(Vec<ValueCategory>, Box<MultiReturnsShape>),
}

impl MultiReturnsShape {
    /// Whether a MultiReturns type with this shape exists
    pub fn is_supported(&self) -> bool {
        match self {
            MultiReturnsShape::Untyped => true,
            MultiReturnsShape::Fixed(slots) => {
                (1..=MULTI_RETURNS_TYPED_ARITY).contains(&slots.len())
            }
            MultiReturnsShape::Continued(slots, tail) => {
                slots.len() == MULTI_RETURNS_TYPED_ARITY && tail.is_supported()
            }
        }
    }

    /// Typed slots at this level; empty for `Untyped`
    pub fn slots(&self) -> &[ValueCategory] {
        match self {
            MultiReturnsShape::Untyped => &[],
            MultiReturnsShape::Fixed(slots) | MultiReturnsShape::Continued(slots, _) => slots,
        }
    }

    pub fn continuation(&self) -> Option<&MultiReturnsShape> {
        match self {
            MultiReturnsShape::Continued(_, tail) => Some(tail),
            _ => None,
        }
    }
}

fn write_slots(f: &mut fmt::Formatter<'_>, slots: &[ValueCategory]) -> fmt::Result {
    for (i, slot) in slots.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", slot)?;
    }
    Ok(())
}

/// Renders the equivalent Rust type, e.g. `MultiReturns2<LuaNumber, LuaValue>`
impl fmt::Display for MultiReturnsShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiReturnsShape::Untyped => f.write_str("MultiReturns"),
            MultiReturnsShape::Fixed(slots) => {
                write!(f, "MultiReturns{}<", slots.len())?;
                write_slots(f, slots)?;
                f.write_str(">")
            }
            MultiReturnsShape::Continued(slots, tail) => {
                f.write_str("MultiReturns8<")?;
                write_slots(f, slots)?;
                write!(f, ", {}>", tail)
            }
        }
    }
}

/// Best-fit shape for `values[offset..]`
pub fn make_instance_type(offset: usize, values: &[LuaValue]) -> MultiReturnsShape {
    let tail = values.get(offset..).unwrap_or(&[]);
    if tail.is_empty() {
        return MultiReturnsShape::Untyped;
    }

    if tail.len() <= MULTI_RETURNS_TYPED_ARITY {
        MultiReturnsShape::Fixed(tail.iter().map(ValueCategory::of).collect())
    } else {
        MultiReturnsShape::Continued(
            tail[..MULTI_RETURNS_TYPED_ARITY]
                .iter()
                .map(ValueCategory::of)
                .collect(),
            Box::new(make_instance_type(offset + MULTI_RETURNS_TYPED_ARITY, values)),
        )
    }
}

/// Instantiate `shape` over `values[offset..]`
pub fn create_instance(
    shape: &MultiReturnsShape,
    offset: usize,
    values: &[LuaValue],
) -> LuaResult<ShapedMultiReturns> {
    if !shape.is_supported() {
        return Err(LuaError::UnsupportedMultiReturnsShape {
            shape: shape.to_string(),
        });
    }

    let source = MultiReturns::new(values.iter().cloned()).slice(offset);
    Ok(ShapedMultiReturns::build(shape, &source))
}

/// `create_instance(make_instance_type(0, values), 0, values)`; inferred shapes
/// are always supported
pub(crate) fn create_inferred(values: &[LuaValue]) -> ShapedMultiReturns {
    let shape = make_instance_type(0, values);
    ShapedMultiReturns::build(&shape, &MultiReturns::new(values.iter().cloned()))
}

/// `values` limited to `slots.len()` positions; values that do not fit their
/// slot become nil. Shares the buffer when everything fits.
pub(crate) fn conform(values: &MultiReturns, slots: &[ValueCategory]) -> MultiReturns {
    let head = values.take(slots.len());
    let fits = slots
        .iter()
        .enumerate()
        .all(|(i, slot)| slot.accepts(&head.get(i)));
    if fits {
        return head;
    }

    slots
        .iter()
        .enumerate()
        .map(|(position, slot)| {
            let value = head.get(position);
            if slot.accepts(&value) {
                value
            } else {
                debug!(
                    target: "luars_interop::multi_returns",
                    position,
                    expected = %slot,
                    found = value.type_name(),
                    "value does not fit its slot, reading as nil"
                );
                LuaValue::Nil
            }
        })
        .collect()
}

/// A MultiReturns instance whose type was chosen at runtime
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedMultiReturns {
    shape: MultiReturnsShape,
    head: MultiReturns,
    rest: Option<Box<ShapedMultiReturns>>,
}

impl ShapedMultiReturns {
    fn build(shape: &MultiReturnsShape, values: &MultiReturns) -> Self {
        match shape {
            MultiReturnsShape::Untyped => ShapedMultiReturns {
                shape: MultiReturnsShape::Untyped,
                head: values.clone(),
                rest: None,
            },
            MultiReturnsShape::Fixed(slots) => ShapedMultiReturns {
                shape: shape.clone(),
                head: conform(values, slots),
                rest: None,
            },
            MultiReturnsShape::Continued(slots, tail) => ShapedMultiReturns {
                shape: shape.clone(),
                head: conform(values, slots),
                rest: Some(Box::new(ShapedMultiReturns::build(
                    tail,
                    &values.slice(MULTI_RETURNS_TYPED_ARITY),
                ))),
            },
        }
    }

    pub fn shape(&self) -> &MultiReturnsShape {
        &self.shape
    }

    /// The continuation of a `Continued` shape
    pub fn rest(&self) -> Option<&ShapedMultiReturns> {
        self.rest.as_deref()
    }

    pub fn get(&self, index: usize) -> LuaValue {
        match &self.rest {
            Some(rest) if index >= MULTI_RETURNS_TYPED_ARITY => {
                rest.get(index - MULTI_RETURNS_TYPED_ARITY)
            }
            _ => self.head.get(index),
        }
    }

    pub fn len(&self) -> usize {
        match &self.rest {
            Some(rest) if !rest.is_empty() => MULTI_RETURNS_TYPED_ARITY + rest.len(),
            _ => self.head.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The static type with exactly this shape, if `T` is it
    pub fn downcast<T: StaticMultiReturns>(&self) -> Option<T> {
        if T::shape() == self.shape {
            Some(T::from_multi_returns(&self.to_multi_returns()))
        } else {
            None
        }
    }
}

impl MultiReturnsLike for ShapedMultiReturns {
    fn count(&self) -> usize {
        self.len()
    }

    fn get(&self, index: usize) -> LuaValue {
        ShapedMultiReturns::get(self, index)
    }

    fn to_multi_returns(&self) -> MultiReturns {
        match &self.rest {
            Some(rest) => self
                .head
                .join(MULTI_RETURNS_TYPED_ARITY, &rest.to_multi_returns()),
            None => self.head.clone(),
        }
    }
}

impl From<ShapedMultiReturns> for MultiReturns {
    fn from(values: ShapedMultiReturns) -> Self {
        values.to_multi_returns()
    }
}
