// LuaValue - the boxed value every Lua-visible entity is carried in
//
// Integer and float stay distinct variants (Lua 5.4+ semantics) but compare
// and hash numerically, so `t[1]` and `t[1.0]` address the same slot.
use super::{LuaFunction, LuaString, LuaTable, LuaUserdata, TableRef, UserdataRef};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Basic type tag of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LuaValueKind {
    Nil,
    Boolean,
    Number,
    String,
    Table,
    Function,
    Userdata,
}

impl LuaValueKind {
    /// The name `type(v)` reports
    pub fn type_name(self) -> &'static str {
        match self {
            LuaValueKind::Nil => "nil",
            LuaValueKind::Boolean => "boolean",
            LuaValueKind::Number => "number",
            LuaValueKind::String => "string",
            LuaValueKind::Table => "table",
            LuaValueKind::Function => "function",
            LuaValueKind::Userdata => "userdata",
        }
    }
}

/// Lua number, either subtype
#[derive(Debug, Clone, Copy)]
pub enum LuaNumber {
    Integer(i64),
    Float(f64),
}

impl LuaNumber {
    pub fn as_f64(self) -> f64 {
        match self {
            LuaNumber::Integer(i) => i as f64,
            LuaNumber::Float(f) => f,
        }
    }

    /// Integer value, converting floats only when exact
    pub fn as_integer(self) -> Option<i64> {
        match self {
            LuaNumber::Integer(i) => Some(i),
            LuaNumber::Float(f) => float_to_integer(f),
        }
    }
}

impl PartialEq for LuaNumber {
    fn eq(&self, other: &Self) -> bool {
        LuaValue::from(*self) == LuaValue::from(*other)
    }
}

/// Lua value types (Lua 5.4 semantics)
#[derive(Clone, Default)]
pub enum LuaValue {
    #[default]
    Nil,
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Float(f64),
    String(LuaString),
    Table(TableRef),
    Function(LuaFunction),
    Userdata(UserdataRef),
}

/// Exact float -> integer conversion (Lua's `luaV_flttointns` with F2Ieq)
#[inline]
pub(crate) fn float_to_integer(f: f64) -> Option<i64> {
    // 2^63 is the first float outside i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

impl LuaValue {
    // Constructors
    pub const fn nil() -> Self {
        LuaValue::Nil
    }

    pub const fn boolean(b: bool) -> Self {
        LuaValue::Boolean(b)
    }

    pub const fn integer(i: i64) -> Self {
        LuaValue::Integer(i)
    }

    pub const fn number(n: f64) -> Self {
        LuaValue::Float(n)
    }

    pub fn string(s: impl AsRef<str>) -> Self {
        LuaValue::String(LuaString::new(s))
    }

    pub fn table(t: LuaTable) -> Self {
        LuaValue::Table(Rc::new(RefCell::new(t)))
    }

    pub fn new_table() -> Self {
        Self::table(LuaTable::new())
    }

    pub fn function(f: LuaFunction) -> Self {
        LuaValue::Function(f)
    }

    pub fn userdata(u: LuaUserdata) -> Self {
        LuaValue::Userdata(Rc::new(u))
    }

    // Type checks
    pub fn kind(&self) -> LuaValueKind {
        match self {
            LuaValue::Nil => LuaValueKind::Nil,
            LuaValue::Boolean(_) => LuaValueKind::Boolean,
            LuaValue::Integer(_) | LuaValue::Float(_) => LuaValueKind::Number,
            LuaValue::String(_) => LuaValueKind::String,
            LuaValue::Table(_) => LuaValueKind::Table,
            LuaValue::Function(_) => LuaValueKind::Function,
            LuaValue::Userdata(_) => LuaValueKind::Userdata,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, LuaValue::Nil)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, LuaValue::Boolean(_))
    }

    /// True only for the integer subtype
    pub fn is_integer(&self) -> bool {
        matches!(self, LuaValue::Integer(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, LuaValue::Float(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, LuaValue::Integer(_) | LuaValue::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, LuaValue::String(_))
    }

    pub fn is_table(&self) -> bool {
        matches!(self, LuaValue::Table(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, LuaValue::Function(_))
    }

    pub fn is_userdata(&self) -> bool {
        matches!(self, LuaValue::Userdata(_))
    }

    // Lua truthiness: only nil and false are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, LuaValue::Nil | LuaValue::Boolean(false))
    }

    // Value extractors
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            LuaValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer, with automatic conversion from float if exact
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            LuaValue::Integer(i) => Some(*i),
            LuaValue::Float(f) => float_to_integer(*f),
            _ => None,
        }
    }

    /// Get as float, with automatic conversion from integer
    pub fn as_float(&self) -> Option<f64> {
        match self {
            LuaValue::Integer(i) => Some(*i as f64),
            LuaValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<LuaNumber> {
        match self {
            LuaValue::Integer(i) => Some(LuaNumber::Integer(*i)),
            LuaValue::Float(f) => Some(LuaNumber::Float(*f)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LuaValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_lua_string(&self) -> Option<&LuaString> {
        match self {
            LuaValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<TableRef> {
        match self {
            LuaValue::Table(t) => Some(Rc::clone(t)),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&LuaFunction> {
        match self {
            LuaValue::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_userdata(&self) -> Option<UserdataRef> {
        match self {
            LuaValue::Userdata(u) => Some(Rc::clone(u)),
            _ => None,
        }
    }

    /// The metatable slot of this value, if the variant owns one
    pub fn raw_metatable(&self) -> Option<TableRef> {
        match self {
            LuaValue::Table(t) => t.borrow().get_metatable(),
            LuaValue::Userdata(u) => u.get_metatable(),
            _ => None,
        }
    }

    /// Raw equality (no `__eq`)
    pub fn raw_equals(&self, other: &LuaValue) -> bool {
        self == other
    }

    // Convert to Lua-style string representation for printing
    pub fn to_string_repr(&self) -> String {
        match self {
            LuaValue::Nil => "nil".to_string(),
            LuaValue::Boolean(b) => b.to_string(),
            LuaValue::Integer(i) => {
                let mut buffer = itoa::Buffer::new();
                buffer.format(*i).to_string()
            }
            LuaValue::Float(f) => format_float(*f),
            LuaValue::String(s) => s.as_str().to_string(),
            LuaValue::Table(t) => format!("table: {:p}", Rc::as_ptr(t)),
            LuaValue::Function(f) => format!("function: {:p}", f.as_ptr()),
            LuaValue::Userdata(u) => format!("userdata: {:p}", Rc::as_ptr(u)),
        }
    }
}

/// `%.14g`-like float output; integral floats keep a trailing `.0`
fn format_float(f: f64) -> String {
    if f.is_nan() {
        String::from(if f.is_sign_negative() { "-nan" } else { "nan" })
    } else if f.is_infinite() {
        String::from(if f > 0.0 { "inf" } else { "-inf" })
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

impl fmt::Debug for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaValue::Nil => write!(f, "nil"),
            LuaValue::Boolean(b) => write!(f, "{}", b),
            LuaValue::Integer(i) => write!(f, "{}", i),
            LuaValue::Float(n) => write!(f, "{}", format_float(*n)),
            LuaValue::String(s) => write!(f, "\"{}\"", s.as_str()),
            LuaValue::Table(t) => write!(f, "table: {:p}", Rc::as_ptr(t)),
            LuaValue::Function(func) => write!(f, "{:?}", func),
            LuaValue::Userdata(u) => write!(f, "userdata: {:p}", Rc::as_ptr(u)),
        }
    }
}

impl fmt::Display for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_repr())
    }
}

impl PartialEq for LuaValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LuaValue::Nil, LuaValue::Nil) => true,
            (LuaValue::Boolean(a), LuaValue::Boolean(b)) => a == b,
            (LuaValue::Integer(a), LuaValue::Integer(b)) => a == b,
            (LuaValue::Float(a), LuaValue::Float(b)) => a == b,
            // Mixed subtypes are equal only when the float is exactly that integer
            (LuaValue::Integer(a), LuaValue::Float(b))
            | (LuaValue::Float(b), LuaValue::Integer(a)) => float_to_integer(*b) == Some(*a),
            (LuaValue::String(a), LuaValue::String(b)) => a == b,
            // Reference types are compared by identity
            (LuaValue::Table(a), LuaValue::Table(b)) => Rc::ptr_eq(a, b),
            (LuaValue::Function(a), LuaValue::Function(b)) => a.ptr_eq(b),
            (LuaValue::Userdata(a), LuaValue::Userdata(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for LuaValue {}

impl Hash for LuaValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            LuaValue::Nil => {
                0u8.hash(state);
            }
            LuaValue::Boolean(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            LuaValue::Integer(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            LuaValue::Float(f) => match float_to_integer(*f) {
                // Must agree with Integer for keys that compare equal
                Some(i) => {
                    2u8.hash(state);
                    i.hash(state);
                }
                None => {
                    3u8.hash(state);
                    f.to_bits().hash(state);
                }
            },
            LuaValue::String(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            LuaValue::Table(t) => {
                5u8.hash(state);
                Rc::as_ptr(t).hash(state);
            }
            LuaValue::Function(f) => {
                6u8.hash(state);
                f.as_ptr().hash(state);
            }
            LuaValue::Userdata(u) => {
                7u8.hash(state);
                Rc::as_ptr(u).hash(state);
            }
        }
    }
}

impl From<bool> for LuaValue {
    fn from(b: bool) -> Self {
        LuaValue::Boolean(b)
    }
}

impl From<i64> for LuaValue {
    fn from(i: i64) -> Self {
        LuaValue::Integer(i)
    }
}

impl From<i32> for LuaValue {
    fn from(i: i32) -> Self {
        LuaValue::Integer(i as i64)
    }
}

impl From<f64> for LuaValue {
    fn from(n: f64) -> Self {
        LuaValue::Float(n)
    }
}

impl From<LuaNumber> for LuaValue {
    fn from(n: LuaNumber) -> Self {
        match n {
            LuaNumber::Integer(i) => LuaValue::Integer(i),
            LuaNumber::Float(f) => LuaValue::Float(f),
        }
    }
}

impl From<&str> for LuaValue {
    fn from(s: &str) -> Self {
        LuaValue::string(s)
    }
}

impl From<String> for LuaValue {
    fn from(s: String) -> Self {
        LuaValue::String(LuaString::from(s))
    }
}

impl From<LuaString> for LuaValue {
    fn from(s: LuaString) -> Self {
        LuaValue::String(s)
    }
}

impl From<TableRef> for LuaValue {
    fn from(t: TableRef) -> Self {
        LuaValue::Table(t)
    }
}

impl From<LuaFunction> for LuaValue {
    fn from(f: LuaFunction) -> Self {
        LuaValue::Function(f)
    }
}

impl From<UserdataRef> for LuaValue {
    fn from(u: UserdataRef) -> Self {
        LuaValue::Userdata(u)
    }
}

impl<T: Into<LuaValue>> From<Option<T>> for LuaValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(LuaValue::Nil, Into::into)
    }
}
