/// Deserializer for converting serde_json::Value to Lua values
///
/// - JSON null -> Lua nil
/// - JSON boolean -> Lua boolean
/// - JSON number -> Lua integer when it fits, else float
/// - JSON string -> Lua string
/// - JSON array -> Lua sequence table (nulls leave holes)
/// - JSON object -> Lua table keyed by string
use crate::lua_error::{LuaError, LuaResult};
use crate::lua_value::{LuaTable, LuaValue};
use serde_json::Value as JsonValue;

/// Convert a serde_json::Value to a Lua value
pub fn from_value(json_value: &JsonValue) -> LuaResult<LuaValue> {
    match json_value {
        JsonValue::Null => Ok(LuaValue::nil()),

        JsonValue::Bool(b) => Ok(LuaValue::boolean(*b)),

        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(LuaValue::integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(LuaValue::number(f))
            } else {
                Err(LuaError::RuntimeError("Invalid JSON number".to_string()))
            }
        }

        JsonValue::String(s) => Ok(LuaValue::string(s)),

        JsonValue::Array(arr) => json_array_to_lua_table(arr),

        JsonValue::Object(obj) => json_object_to_lua_table(obj),
    }
}

/// Convert a JSON string to a Lua value
pub fn from_str(json_str: &str) -> LuaResult<LuaValue> {
    let json_value: JsonValue = serde_json::from_str(json_str)
        .map_err(|e| LuaError::RuntimeError(format!("Failed to parse JSON: {}", e)))?;

    from_value(&json_value)
}

fn json_array_to_lua_table(arr: &[JsonValue]) -> LuaResult<LuaValue> {
    let mut table = LuaTable::with_capacity(arr.len());

    // 1-indexed
    for (i, item) in arr.iter().enumerate() {
        let value = from_value(item)?;
        table.set_int(i as i64 + 1, value);
    }

    Ok(LuaValue::table(table))
}

fn json_object_to_lua_table(obj: &serde_json::Map<String, JsonValue>) -> LuaResult<LuaValue> {
    let mut table = LuaTable::with_capacity(obj.len());

    for (key_str, value_json) in obj {
        let value = from_value(value_json)?;
        table.raw_set(LuaValue::string(key_str), value)?;
    }

    Ok(LuaValue::table(table))
}
