use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Formats the Gemini schema dialect understands; anything else is dropped.
const SUPPORTED_FORMATS: [&str; 5] = ["int32", "int64", "float", "double", "date-time"];

/// Response schema for `T` in the subset accepted by `generationConfig.responseSchema`.
pub fn response_schema<T: JsonSchema>() -> serde_json::Result<Value> {
    clean_schema(schemars::schema_for!(T))
}

pub fn clean_schema<T: Serialize>(root: T) -> serde_json::Result<Value> {
    let mut root_val = serde_json::to_value(root)?;

    let definitions = root_val
        .get("definitions")
        .cloned()
        .or_else(|| root_val.get("$defs").cloned())
        .unwrap_or(json!({}))
        .as_object()
        .cloned()
        .unwrap_or_default();

    process_schema_node(&mut root_val, &definitions, 0);

    if let Value::Object(ref mut map) = root_val {
        map.remove("$schema");
        map.remove("title");
        map.remove("definitions");
        map.remove("$defs");
        map.remove("$id");
    }

    Ok(root_val)
}

fn process_schema_node(node: &mut Value, definitions: &Map<String, Value>, depth: usize) {
    // Recursion guard
    if depth > 20 {
        *node = json!({ "type": "object", "nullable": true });
        return;
    }

    // Resolve $ref chains before borrowing the node as a map.
    let mut resolve_attempts = 0;
    loop {
        let ref_target = if let Value::Object(map) = node {
            map.get("$ref").and_then(|v| v.as_str()).map(|s| s.to_string())
        } else {
            None
        };

        let Some(def_name_full) = ref_target else { break };
        resolve_attempts += 1;
        if resolve_attempts > 10 {
            break;
        }

        let def_name = def_name_full.split('/').next_back().unwrap_or_default();
        match definitions.get(def_name) {
            Some(def) => {
                // Keep sibling keys such as a field description.
                let siblings = match node {
                    Value::Object(map) => {
                        map.remove("$ref");
                        std::mem::take(map)
                    }
                    _ => Map::new(),
                };
                *node = def.clone();
                if let Value::Object(map) = node {
                    map.extend(siblings);
                }
            }
            None => {
                *node = json!({ "type": "object", "description": "Unresolvable reference" });
                break;
            }
        }
    }

    // schemars emits `{"description": .., "allOf": [{"$ref": ..}]}` for a
    // described struct field. Gemini has no allOf, so fold a single entry in.
    if let Value::Object(map) = node {
        if let Some(Value::Array(mut all_of)) = map.remove("allOf") {
            if all_of.len() == 1 {
                let mut inner = all_of.remove(0);
                process_schema_node(&mut inner, definitions, depth + 1);
                if let Value::Object(inner_map) = inner {
                    for (k, v) in inner_map {
                        map.entry(k).or_insert(v);
                    }
                }
            } else {
                map.insert("allOf".into(), Value::Array(all_of));
            }
        }
    }

    // Boolean schemas: `true` means "anything", which Gemini cannot express.
    if let Value::Bool(allow_all) = node {
        if *allow_all {
            *node = json!({ "type": "string", "nullable": true });
        } else {
            *node = json!({ "not": {} });
        }
    }

    match node {
        Value::Object(map) => {
            for key in [
                "$ref",
                "additionalProperties",
                "$schema",
                "$id",
                "title",
                "default",
                "examples",
                "minimum",
                "maximum",
                "exclusiveMinimum",
                "exclusiveMaximum",
            ] {
                map.remove(key);
            }

            let unsupported_format = map
                .get("format")
                .and_then(Value::as_str)
                .is_some_and(|f| !SUPPORTED_FORMATS.contains(&f));
            if unsupported_format {
                map.remove("format");
            }

            // ["T", "null"] -> "T" + nullable
            if let Some(Value::Array(types)) = map.get("type") {
                if types.len() == 2 && types.contains(&json!("null")) {
                    if let Some(real_type) = types.iter().find(|t| *t != &json!("null")) {
                        let real_type_clone = real_type.clone();
                        map.insert("type".to_string(), real_type_clone);
                        map.insert("nullable".to_string(), json!(true));
                    }
                } else if !types.is_empty() {
                    let first = types[0].clone();
                    map.insert("type".to_string(), first);
                }
            }

            if let Some(Value::Object(props)) = map.get_mut("properties") {
                for val in props.values_mut() {
                    process_schema_node(val, definitions, depth + 1);
                }
            }

            if let Some(val) = map.get_mut("items") {
                process_schema_node(val, definitions, depth + 1);
            }

            for key in ["allOf", "anyOf", "oneOf"] {
                if let Some(Value::Array(arr)) = map.get_mut(key) {
                    for item in arr.iter_mut() {
                        process_schema_node(item, definitions, depth + 1);
                    }
                }
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                process_schema_node(item, definitions, depth + 1);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::plans::{DietPlan, FitnessPlan, MealAnalysis};

    fn assert_clean(node: &Value) {
        match node {
            Value::Object(map) => {
                for key in ["$ref", "definitions", "allOf", "$schema", "minimum", "additionalProperties"] {
                    assert!(!map.contains_key(key), "found {key} in {node}");
                }
                if let Some(format) = map.get("format").and_then(Value::as_str) {
                    assert!(SUPPORTED_FORMATS.contains(&format), "format {format}");
                }
                map.values().for_each(assert_clean);
            }
            Value::Array(items) => items.iter().for_each(assert_clean),
            _ => {}
        }
    }

    #[test]
    fn fitness_schema_is_inlined() {
        let schema = response_schema::<FitnessPlan>().unwrap();
        assert_clean(&schema);
        assert_eq!(schema["type"], "object");
        let workouts = &schema["properties"]["workouts"];
        assert_eq!(workouts["type"], "array");
        let exercise = &workouts["items"]["properties"]["exercises"]["items"];
        assert_eq!(exercise["properties"]["sets"]["type"], "integer");
        assert_eq!(exercise["properties"]["tip"]["type"], "string");
        assert_eq!(exercise["properties"]["tip"]["nullable"], true);
    }

    #[test]
    fn diet_schema_keeps_weekly_average_object() {
        let schema = response_schema::<DietPlan>().unwrap();
        assert_clean(&schema);
        let average = &schema["properties"]["weeklyAverage"];
        assert_eq!(average["type"], "object");
        assert_eq!(average["properties"]["calories"]["type"], "integer");
        let day = &schema["properties"]["weeklyDiet"]["items"];
        assert_eq!(day["properties"]["dayOfWeek"]["type"], "string");
        assert!(day["properties"]["meals"]["description"].is_string());
    }

    #[test]
    fn meal_analysis_schema_is_flat() {
        let schema = response_schema::<MealAnalysis>().unwrap();
        assert_clean(&schema);
        assert_eq!(schema["properties"]["foodItems"]["items"]["type"], "string");
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        for field in ["foodItems", "calories", "protein", "carbs", "fats", "recommendation"] {
            assert!(required.contains(&field), "{field} not required");
        }
    }

    #[test]
    fn boolean_schema_becomes_typed() {
        let cleaned = clean_schema(json!({ "type": "object", "properties": { "any": true } })).unwrap();
        assert_eq!(cleaned["properties"]["any"]["type"], "string");
    }
}
