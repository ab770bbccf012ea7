// Lua value model for static hosts
// Tables with metatables, boxed values and typed multiple returns

#[cfg(test)]
mod test;

pub mod lua_error;
pub mod lua_limits;
pub mod lua_value;
pub mod multi_returns;

#[cfg(feature = "serde")]
pub mod serde;

pub use lua_error::{LuaError, LuaResult};
pub use lua_limits::SafeOption;
pub use lua_value::metatable;
pub use lua_value::{
    LuaFunction, LuaNumber, LuaString, LuaTable, LuaUserdata, LuaValue, LuaValueKind, Metavalue,
    TableRef, UserdataRef,
};
pub use multi_returns::{
    Deconstruct, LuaSlot, MultiReturns, MultiReturns1, MultiReturns2, MultiReturns3, MultiReturns4,
    MultiReturns5, MultiReturns6, MultiReturns7, MultiReturns8, MultiReturnsLike,
    MultiReturnsShape, ShapedMultiReturns, StaticMultiReturns, ValueCategory, create_instance, make_instance_type,
};
