use crate::lua_value::{LuaFunction, LuaNumber, LuaString, LuaValue, TableRef, UserdataRef};
use std::fmt;

/// Static category of a typed MultiReturns slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueCategory {
    /// Untyped slot: accepts every value
    Any,
    Boolean,
    Number,
    String,
    Table,
    Function,
    Userdata,
}

impl ValueCategory {
    /// Most specific category of a runtime value; nil has none and maps to `Any`
    pub fn of(value: &LuaValue) -> Self {
        match value {
            LuaValue::Nil => ValueCategory::Any,
            LuaValue::Boolean(_) => ValueCategory::Boolean,
            LuaValue::Integer(_) | LuaValue::Float(_) => ValueCategory::Number,
            LuaValue::String(_) => ValueCategory::String,
            LuaValue::Table(_) => ValueCategory::Table,
            LuaValue::Function(_) => ValueCategory::Function,
            LuaValue::Userdata(_) => ValueCategory::Userdata,
        }
    }

    /// Whether a slot of this category can hold `value`. Nil fits everywhere.
    pub fn accepts(self, value: &LuaValue) -> bool {
        self == ValueCategory::Any || value.is_nil() || ValueCategory::of(value) == self
    }

    /// Rust type standing for the category in shape names
    pub fn type_name(self) -> &'static str {
        match self {
            ValueCategory::Any => "LuaValue",
            ValueCategory::Boolean => "bool",
            ValueCategory::Number => "LuaNumber",
            ValueCategory::String => "LuaString",
            ValueCategory::Table => "TableRef",
            ValueCategory::Function => "LuaFunction",
            ValueCategory::Userdata => "UserdataRef",
        }
    }
}

impl fmt::Display for ValueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A type usable as a typed MultiReturns slot
pub trait LuaSlot: Clone + 'static {
    const CATEGORY: ValueCategory;

    /// `None` for nil and for values of another category
    fn from_value(value: &LuaValue) -> Option<Self>;

    fn into_value(self) -> LuaValue;
}

impl LuaSlot for LuaValue {
    const CATEGORY: ValueCategory = ValueCategory::Any;

    fn from_value(value: &LuaValue) -> Option<Self> {
        match value {
            LuaValue::Nil => None,
            v => Some(v.clone()),
        }
    }

    #[inline]
    fn into_value(self) -> LuaValue {
        self
    }
}

impl LuaSlot for bool {
    const CATEGORY: ValueCategory = ValueCategory::Boolean;

    fn from_value(value: &LuaValue) -> Option<Self> {
        value.as_boolean()
    }

    fn into_value(self) -> LuaValue {
        LuaValue::Boolean(self)
    }
}

impl LuaSlot for LuaNumber {
    const CATEGORY: ValueCategory = ValueCategory::Number;

    fn from_value(value: &LuaValue) -> Option<Self> {
        value.as_number()
    }

    fn into_value(self) -> LuaValue {
        LuaValue::from(self)
    }
}

impl LuaSlot for LuaString {
    const CATEGORY: ValueCategory = ValueCategory::String;

    fn from_value(value: &LuaValue) -> Option<Self> {
        value.as_lua_string().cloned()
    }

    fn into_value(self) -> LuaValue {
        LuaValue::String(self)
    }
}

impl LuaSlot for TableRef {
    const CATEGORY: ValueCategory = ValueCategory::Table;

    fn from_value(value: &LuaValue) -> Option<Self> {
        value.as_table()
    }

    fn into_value(self) -> LuaValue {
        LuaValue::Table(self)
    }
}

impl LuaSlot for LuaFunction {
    const CATEGORY: ValueCategory = ValueCategory::Function;

    fn from_value(value: &LuaValue) -> Option<Self> {
        value.as_function().cloned()
    }

    fn into_value(self) -> LuaValue {
        LuaValue::Function(self)
    }
}

impl LuaSlot for UserdataRef {
    const CATEGORY: ValueCategory = ValueCategory::Userdata;

    fn from_value(value: &LuaValue) -> Option<Self> {
        value.as_userdata()
    }

    fn into_value(self) -> LuaValue {
        LuaValue::Userdata(self)
    }
}
