/// Serde support for Lua values
///
/// Conversion goes through `serde_json::Value` rather than implementing
/// Serialize/Deserialize on the Lua types, since tables may be cyclic and
/// functions or userdata have no JSON form.
mod deserializer;
mod serializer;

pub use deserializer::{from_str as deserialize_from_json_str, from_value as deserialize_from_json};
pub use serializer::{to_string as serialize_to_json_string, to_value as serialize_to_json};

use crate::lua_error::LuaResult;
use crate::lua_value::LuaValue;
use crate::multi_returns::MultiReturns;

/// Convert a Lua value to a serde_json::Value
pub fn lua_to_json(lua_value: &LuaValue) -> LuaResult<serde_json::Value> {
    serialize_to_json(lua_value)
}

/// Convert a Lua value to a JSON string
pub fn lua_to_json_string(lua_value: &LuaValue, pretty: bool) -> LuaResult<String> {
    serialize_to_json_string(lua_value, pretty)
}

/// Convert every returned value, as a JSON array of `len()` elements
pub fn multi_returns_to_json(values: &MultiReturns) -> LuaResult<serde_json::Value> {
    values
        .iter()
        .map(serialize_to_json)
        .collect::<LuaResult<Vec<_>>>()
        .map(serde_json::Value::Array)
}

/// Convert a serde_json::Value to a Lua value
pub fn json_to_lua(json_value: &serde_json::Value) -> LuaResult<LuaValue> {
    deserialize_from_json(json_value)
}

/// Convert a JSON string to a Lua value
pub fn json_string_to_lua(json_str: &str) -> LuaResult<LuaValue> {
    deserialize_from_json_str(json_str)
}
