/*----------------------------------------------------------------------
  Metatable protocol

  Metavalue lookup plus every operation whose behaviour a metatable can
  change: indexing, assignment, length, call, equality, iteration and
  the `setmetatable` / `getmetatable` pair.

  Raw storage lives in `lua_table.rs`; nothing here holds a RefCell
  borrow across a metamethod call, so metamethods may freely touch the
  table they were invoked on.
----------------------------------------------------------------------*/

use super::{LuaFunction, LuaTable, LuaValue, TableRef};
use crate::lua_error::{LuaError, LuaResult};
use crate::lua_limits::SafeOption;
use crate::multi_returns::{MultiReturns, MultiReturns2};
use tracing::{debug, trace};

/// Metavalue names understood by the protocol (subset of ltm.h TMS)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmKind {
    Index,
    NewIndex,
    Len,
    Eq,
    Call,
    Pairs,
    /// Not a metamethod: protects the metatable from `setmetatable`
    Metatable,
}

impl TmKind {
    pub const fn name(self) -> &'static str {
        match self {
            TmKind::Index => "__index",
            TmKind::NewIndex => "__newindex",
            TmKind::Len => "__len",
            TmKind::Eq => "__eq",
            TmKind::Call => "__call",
            TmKind::Pairs => "__pairs",
            TmKind::Metatable => "__metatable",
        }
    }
}

/// A metavalue resolved once per lookup
#[derive(Debug, Clone)]
pub enum Metavalue {
    /// A function: invoked with the operands
    Callable(LuaFunction),
    /// Any other non-nil value: the operation is repeated on it
    Indexable(LuaValue),
    Absent,
}

impl Metavalue {
    pub fn resolve(value: LuaValue) -> Self {
        match value {
            LuaValue::Nil => Metavalue::Absent,
            LuaValue::Function(f) => Metavalue::Callable(f),
            other => Metavalue::Indexable(other),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Metavalue::Absent)
    }

    pub fn into_value(self) -> LuaValue {
        match self {
            Metavalue::Callable(f) => LuaValue::Function(f),
            Metavalue::Indexable(v) => v,
            Metavalue::Absent => LuaValue::Nil,
        }
    }
}

/// Raw field `name` of the value's metatable, nil when there is none
pub fn get_metavalue(value: &LuaValue, name: &str) -> LuaValue {
    let Some(mt) = value.raw_metatable() else {
        return LuaValue::Nil;
    };
    mt.borrow().get_str(name)
}

#[inline]
pub fn metavalue(value: &LuaValue, tm: TmKind) -> Metavalue {
    Metavalue::resolve(get_metavalue(value, tm.name()))
}

/// `getmetatable(v)`: the `__metatable` field when present, else the metatable
pub fn get_metatable(value: &LuaValue) -> LuaValue {
    match value.raw_metatable() {
        Some(mt) => {
            let protected = mt.borrow().get_str(TmKind::Metatable.name());
            if protected.is_nil() {
                LuaValue::Table(mt)
            } else {
                protected
            }
        }
        None => LuaValue::Nil,
    }
}

/// `setmetatable(v, mt)` for tables and userdata.
/// Refused when the current metatable carries `__metatable`.
pub fn set_metatable(value: &LuaValue, metatable: Option<TableRef>) -> LuaResult<()> {
    if !get_metavalue(value, TmKind::Metatable.name()).is_nil() {
        debug!(
            target: "luars_interop::metatable",
            "refusing to replace protected metatable of a {}",
            value.type_name()
        );
        return Err(LuaError::ProtectedMetatable);
    }

    match value {
        LuaValue::Table(t) => t.borrow_mut().set_metatable(metatable),
        LuaValue::Userdata(u) => u.set_metatable(metatable),
        other => {
            return Err(LuaError::BadArgument {
                function: "setmetatable",
                arg: 1,
                message: format!("table expected, got {}", other.type_name()),
            });
        }
    }
    Ok(())
}

/// `v[key]` with `__index` fallback
pub fn index(value: &LuaValue, key: &LuaValue) -> LuaResult<LuaValue> {
    index_with_option(&SafeOption::default(), value, key)
}

pub fn index_with_option(
    option: &SafeOption,
    value: &LuaValue,
    key: &LuaValue,
) -> LuaResult<LuaValue> {
    let mut current = value.clone();
    for _ in 0..option.max_tag_loop {
        let tm = match &current {
            LuaValue::Table(t) => {
                let raw = t.borrow().raw_get(key);
                if !raw.is_nil() {
                    return Ok(raw);
                }
                match metavalue(&current, TmKind::Index) {
                    // Missing key, no fallback: Lua's plain nil
                    Metavalue::Absent => return Ok(LuaValue::Nil),
                    tm => tm,
                }
            }
            other => match metavalue(other, TmKind::Index) {
                Metavalue::Absent => {
                    return Err(LuaError::IndexNotSupported(other.type_name()));
                }
                tm => tm,
            },
        };

        match tm {
            Metavalue::Callable(f) => {
                trace!(target: "luars_interop::metatable", "calling __index for {:?}", key);
                let results = f.call(&[current, key.clone()])?;
                return Ok(results.first());
            }
            Metavalue::Indexable(next) => {
                trace!(target: "luars_interop::metatable", "following __index to a {}", next.type_name());
                current = next;
            }
            Metavalue::Absent => return Ok(LuaValue::Nil),
        }
    }

    Err(LuaError::MetamethodLoop(TmKind::Index.name()))
}

/// `v[key] = new_value` with `__newindex` fallback
pub fn new_index(value: &LuaValue, key: LuaValue, new_value: LuaValue) -> LuaResult<()> {
    new_index_with_option(&SafeOption::default(), value, key, new_value)
}

pub fn new_index_with_option(
    option: &SafeOption,
    value: &LuaValue,
    key: LuaValue,
    new_value: LuaValue,
) -> LuaResult<()> {
    let mut current = value.clone();
    for _ in 0..option.max_tag_loop {
        let tm = match &current {
            LuaValue::Table(t) => {
                // Existing keys are always assigned in place
                let exists = t.borrow().contains_key(&key);
                let tm = if exists {
                    Metavalue::Absent
                } else {
                    metavalue(&current, TmKind::NewIndex)
                };
                if tm.is_absent() {
                    return t.borrow_mut().raw_set(key, new_value);
                }
                tm
            }
            other => match metavalue(other, TmKind::NewIndex) {
                Metavalue::Absent => {
                    return Err(LuaError::IndexNotSupported(other.type_name()));
                }
                tm => tm,
            },
        };

        match tm {
            Metavalue::Callable(f) => {
                trace!(target: "luars_interop::metatable", "calling __newindex for {:?}", key);
                f.call(&[current, key, new_value])?;
                return Ok(());
            }
            Metavalue::Indexable(next) => {
                trace!(target: "luars_interop::metatable", "following __newindex to a {}", next.type_name());
                current = next;
            }
            Metavalue::Absent => return Ok(()),
        }
    }

    Err(LuaError::MetamethodLoop(TmKind::NewIndex.name()))
}

/// `#v`: byte length for strings, `__len` when present, else the sequence length
pub fn length(value: &LuaValue) -> LuaResult<LuaValue> {
    if let LuaValue::String(s) = value {
        return Ok(LuaValue::Integer(s.len() as i64));
    }

    match metavalue(value, TmKind::Len) {
        Metavalue::Absent => match value {
            LuaValue::Table(t) => Ok(LuaValue::Integer(t.borrow().raw_len())),
            other => Err(LuaError::LengthNotSupported(other.type_name())),
        },
        tm => {
            trace!(target: "luars_interop::metatable", "calling __len on a {}", value.type_name());
            let results = call(&tm.into_value(), &[value.clone()])?;
            Ok(results.first())
        }
    }
}

/// `#v` where an integer is required
pub fn length_integer(value: &LuaValue) -> LuaResult<i64> {
    length(value)?.as_integer().ok_or(LuaError::LengthNotInteger)
}

/// Call `value`: functions directly, other values through `__call`
pub fn call(value: &LuaValue, args: &[LuaValue]) -> LuaResult<MultiReturns> {
    if let LuaValue::Function(f) = value {
        return f.call(args);
    }

    match metavalue(value, TmKind::Call) {
        Metavalue::Callable(f) => {
            trace!(target: "luars_interop::metatable", "calling __call on a {}", value.type_name());
            let mut call_args = Vec::with_capacity(args.len() + 1);
            call_args.push(value.clone());
            call_args.extend_from_slice(args);
            f.call(&call_args)
        }
        _ => Err(LuaError::NotCallable(value.type_name())),
    }
}

pub fn is_callable(value: &LuaValue) -> bool {
    value.is_function() || matches!(metavalue(value, TmKind::Call), Metavalue::Callable(_))
}

/// `a == b`: raw equality, then `__eq` for two tables or two userdata
pub fn equals(a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
    if a.raw_equals(b) {
        return Ok(true);
    }

    let same_kind = matches!(
        (a, b),
        (LuaValue::Table(_), LuaValue::Table(_)) | (LuaValue::Userdata(_), LuaValue::Userdata(_))
    );
    if !same_kind {
        return Ok(false);
    }

    let tm = match metavalue(a, TmKind::Eq) {
        Metavalue::Absent => metavalue(b, TmKind::Eq),
        tm => tm,
    };
    match tm {
        Metavalue::Absent => Ok(false),
        tm => {
            trace!(target: "luars_interop::metatable", "calling __eq");
            let results = call(&tm.into_value(), &[a.clone(), b.clone()])?;
            Ok(results.first().is_truthy())
        }
    }
}

/// `next(t, key)` as a typed pair; both slots are nil at the end
pub fn next(table: &LuaTable, key: Option<&LuaValue>) -> MultiReturns2<LuaValue, LuaValue> {
    match table.next(key) {
        Some((k, v)) => MultiReturns2::new(Some(k), Some(v)),
        None => MultiReturns2::empty(),
    }
}

fn expect_table(function: &'static str, args: &[LuaValue]) -> LuaResult<TableRef> {
    let value = args.first().cloned().unwrap_or_default();
    value.as_table().ok_or_else(|| LuaError::BadArgument {
        function,
        arg: 1,
        message: format!("table expected, got {}", value.type_name()),
    })
}

/// The `next` builtin as a callable value
pub fn next_function() -> LuaFunction {
    LuaFunction::new(|args| {
        let table = expect_table("next", args)?;
        let key = args.get(1);
        let pair = next(&table.borrow(), key);
        if pair.len() == 0 {
            Ok(MultiReturns::new([LuaValue::Nil]))
        } else {
            Ok(pair.into())
        }
    })
}

/// `pairs(v)`: `__pairs` when present, else `next, v, nil`
pub fn pairs(value: &LuaValue) -> LuaResult<MultiReturns> {
    match metavalue(value, TmKind::Pairs) {
        Metavalue::Absent => {
            if !value.is_table() {
                return Err(LuaError::BadArgument {
                    function: "pairs",
                    arg: 1,
                    message: format!("table expected, got {}", value.type_name()),
                });
            }
            Ok(MultiReturns::new([
                LuaValue::Function(next_function()),
                value.clone(),
                LuaValue::Nil,
            ]))
        }
        tm => {
            let results = call(&tm.into_value(), &[value.clone()])?;
            Ok(results.take(3))
        }
    }
}

/// `ipairs(v)`: iterator yielding `i, v[i]` until the first nil
pub fn ipairs(value: &LuaValue) -> MultiReturns {
    let iterator = LuaFunction::new(|args| {
        let target = args.first().cloned().unwrap_or_default();
        let i = args.get(1).and_then(LuaValue::as_integer).unwrap_or(0) + 1;
        let v = index(&target, &LuaValue::Integer(i))?;
        if v.is_nil() {
            Ok(MultiReturns::new([LuaValue::Nil]))
        } else {
            Ok(MultiReturns::new([LuaValue::Integer(i), v]))
        }
    });

    MultiReturns::new([
        LuaValue::Function(iterator),
        value.clone(),
        LuaValue::Integer(0),
    ])
}

/// `t[key] = value` on a table handle, honouring `__newindex`
pub fn table_set(table: &TableRef, key: LuaValue, value: LuaValue) -> LuaResult<()> {
    new_index(&LuaValue::Table(table.clone()), key, value)
}

/// `t[key]` on a table handle, honouring `__index`
pub fn table_get(table: &TableRef, key: &LuaValue) -> LuaResult<LuaValue> {
    index(&LuaValue::Table(table.clone()), key)
}

/// `table.insert(t, [pos,] value)`; the sequence length honours `__len`
pub fn table_insert(table: &TableRef, pos: Option<i64>, value: LuaValue) -> LuaResult<()> {
    let len = length_integer(&LuaValue::Table(table.clone()))?;
    let pos = pos.unwrap_or_else(|| len.saturating_add(1));
    table.borrow_mut().insert_with_len(pos, len, value)
}

/// `table.remove(t [, pos])`; the sequence length honours `__len`
pub fn table_remove(table: &TableRef, pos: Option<i64>) -> LuaResult<LuaValue> {
    let len = length_integer(&LuaValue::Table(table.clone()))?;
    table.borrow_mut().remove_with_len(pos, len)
}

/// `table.concat(t, sep, i, j)` with 1-based defaults and `j = #t`
pub fn table_concat(
    table: &TableRef,
    sep: &str,
    i: Option<i64>,
    j: Option<i64>,
) -> LuaResult<String> {
    let j = match j {
        Some(j) => j,
        None => length_integer(&LuaValue::Table(table.clone()))?,
    };
    table.borrow().concat_range(sep, i.unwrap_or(1), j)
}
