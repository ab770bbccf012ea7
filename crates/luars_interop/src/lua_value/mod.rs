// Lua value representation for static hosts
// Reference types are Rc-based; identity is pointer identity
mod lua_table;
mod lua_value;
pub mod metatable;

use crate::lua_error::LuaResult;
use crate::multi_returns::MultiReturns;
use smol_str::SmolStr;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use lua_table::{LuaTable, SequenceIter, TableRef};
pub use lua_value::{LuaNumber, LuaValue, LuaValueKind};
pub use metatable::Metavalue;

/// Lua string (immutable, small strings stored inline)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LuaString {
    data: SmolStr,
}

impl LuaString {
    pub fn new(s: impl AsRef<str>) -> Self {
        LuaString {
            data: SmolStr::new(s),
        }
    }

    /// Compile-time constant string, used for metavalue names
    pub const fn new_static(s: &'static str) -> Self {
        LuaString {
            data: SmolStr::new_static(s),
        }
    }

    pub fn as_str(&self) -> &str {
        self.data.as_str()
    }

    /// Length in bytes, which is what `#s` reports
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Display for LuaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for LuaString {
    fn from(s: &str) -> Self {
        LuaString::new(s)
    }
}

impl From<String> for LuaString {
    fn from(s: String) -> Self {
        LuaString {
            data: SmolStr::from(s),
        }
    }
}

/// Host function type - Rust closure callable from Lua
/// Receives the call arguments and produces every returned value
pub type RustFunction = dyn Fn(&[LuaValue]) -> LuaResult<MultiReturns>;

/// Lua function backed by a Rust closure
#[derive(Clone)]
pub struct LuaFunction {
    func: Rc<RustFunction>,
}

impl LuaFunction {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&[LuaValue]) -> LuaResult<MultiReturns> + 'static,
    {
        LuaFunction {
            func: Rc::new(func),
        }
    }

    #[inline]
    pub fn call(&self, args: &[LuaValue]) -> LuaResult<MultiReturns> {
        (self.func)(args)
    }

    pub fn ptr_eq(&self, other: &LuaFunction) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }

    /// Address used for identity hashing and `function: 0x...` output
    pub fn as_ptr(&self) -> *const u8 {
        Rc::as_ptr(&self.func) as *const u8
    }
}

impl fmt::Debug for LuaFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function: {:p}", self.as_ptr())
    }
}

pub type UserdataRef = Rc<LuaUserdata>;

/// Userdata - arbitrary Rust data with optional metatable
pub struct LuaUserdata {
    data: RefCell<Box<dyn Any>>,
    metatable: RefCell<Option<TableRef>>,
}

impl LuaUserdata {
    pub fn new<T: Any>(data: T) -> Self {
        LuaUserdata {
            data: RefCell::new(Box::new(data)),
            metatable: RefCell::new(None),
        }
    }

    pub fn with_metatable<T: Any>(data: T, metatable: TableRef) -> Self {
        LuaUserdata {
            data: RefCell::new(Box::new(data)),
            metatable: RefCell::new(Some(metatable)),
        }
    }

    pub fn is<T: Any>(&self) -> bool {
        self.data.borrow().is::<T>()
    }

    /// Run `f` against the wrapped data if it has type `T`
    pub fn with_data<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.data.borrow().downcast_ref::<T>().map(f)
    }

    pub fn with_data_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.data.borrow_mut().downcast_mut::<T>().map(f)
    }

    pub fn get_metatable(&self) -> Option<TableRef> {
        self.metatable.borrow().clone()
    }

    pub fn set_metatable(&self, metatable: Option<TableRef>) {
        *self.metatable.borrow_mut() = metatable;
    }
}

impl fmt::Debug for LuaUserdata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "userdata: {:p}", self as *const LuaUserdata)
    }
}
