/// Serializer for converting Lua values to serde_json::Value
///
/// - Lua nil -> JSON null
/// - Lua boolean -> JSON boolean
/// - Lua integer / float -> JSON number
/// - Lua string -> JSON string
/// - Lua table (pure sequence) -> JSON array
/// - Lua table (anything else) -> JSON object
/// - function / userdata -> error
use crate::lua_error::{LuaError, LuaResult};
use crate::lua_value::{LuaTable, LuaValue};
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::HashSet;
use std::rc::Rc;

/// Convert a Lua value to a serde_json::Value
pub fn to_value(lua_value: &LuaValue) -> LuaResult<JsonValue> {
    let mut visited = HashSet::new();
    to_value_internal(lua_value, &mut visited)
}

/// Convert a Lua value to a JSON string
pub fn to_string(lua_value: &LuaValue, pretty: bool) -> LuaResult<String> {
    let json_value = to_value(lua_value)?;

    let result = if pretty {
        serde_json::to_string_pretty(&json_value)
    } else {
        serde_json::to_string(&json_value)
    };
    result.map_err(|e| LuaError::RuntimeError(format!("Failed to serialize to JSON: {}", e)))
}

fn to_value_internal(lua_value: &LuaValue, visited: &mut HashSet<usize>) -> LuaResult<JsonValue> {
    match lua_value {
        LuaValue::Nil => Ok(JsonValue::Null),

        LuaValue::Boolean(b) => Ok(JsonValue::Bool(*b)),

        LuaValue::Integer(i) => Ok(JsonValue::Number(Number::from(*i))),

        LuaValue::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .ok_or_else(|| LuaError::RuntimeError(format!("Invalid number: {}", f))),

        LuaValue::String(s) => Ok(JsonValue::String(s.as_str().to_string())),

        LuaValue::Table(table) => {
            // Table address for cycle detection
            let ptr_addr = Rc::as_ptr(table) as usize;
            if !visited.insert(ptr_addr) {
                return Err(LuaError::RuntimeError(
                    "Circular reference detected in table".to_string(),
                ));
            }

            let result = {
                let table_ref = table.borrow();
                if is_array_like(&table_ref) {
                    table_to_json_array(&table_ref, visited)
                } else {
                    table_to_json_object(&table_ref, visited)
                }
            };

            visited.remove(&ptr_addr);
            result
        }

        LuaValue::Function(_) => Err(LuaError::RuntimeError(
            "Cannot serialize Lua function to JSON".to_string(),
        )),

        LuaValue::Userdata(_) => Err(LuaError::RuntimeError(
            "Cannot serialize Lua userdata to JSON".to_string(),
        )),
    }
}

/// Array-like: every key is part of the sequence 1..n.
/// The empty table counts as an array.
fn is_array_like(table: &LuaTable) -> bool {
    table.raw_len() as usize == table.raw_count()
}

fn table_to_json_array(table: &LuaTable, visited: &mut HashSet<usize>) -> LuaResult<JsonValue> {
    table
        .sequence()
        .map(|value| to_value_internal(&value, visited))
        .collect::<LuaResult<Vec<_>>>()
        .map(JsonValue::Array)
}

fn table_to_json_object(table: &LuaTable, visited: &mut HashSet<usize>) -> LuaResult<JsonValue> {
    let mut object = Map::new();

    for (key, value) in table.iter() {
        // Keys become strings; tables and functions as keys are skipped
        let key_str = match key {
            LuaValue::String(s) => s.as_str().to_string(),
            LuaValue::Integer(_) | LuaValue::Float(_) | LuaValue::Boolean(_) => {
                key.to_string_repr()
            }
            _ => continue,
        };

        let json_value = to_value_internal(value, visited)?;
        object.insert(key_str, json_value);
    }

    Ok(JsonValue::Object(object))
}
