use crate::models::*;
use regex::Regex;
use serde_json::{Map, Value};

const FALLBACK_LIMIT: usize = 10;
const FALLBACK_REMARK: &str = "auto-detected, low confidence";

// Parse one query's raw text into component records. Never errors out of
// this module: a hard parse failure downgrades to the regex fallback, and
// an empty scan yields zero records.
pub fn normalize_response(raw: &str) -> Vec<ComponentRecord> {
    let stripped = strip_code_fences(raw);

    let candidate = match extract_json_array(&stripped) {
        Some(candidate) => candidate,
        None => {
            log::warn!("no JSON array found in response, using fallback scan");
            return fallback_scan(raw);
        }
    };

    let repaired = remove_trailing_commas(&candidate);

    match serde_json::from_str::<Vec<Value>>(&repaired) {
        Ok(items) => items.iter().map(normalize_item).collect(),
        Err(err) => {
            log::warn!(
                "response is not valid JSON (line {}, column {}): {}",
                err.line(),
                err.column(),
                err
            );
            fallback_scan(raw)
        }
    }
}

// Drop markdown code-fence markers, with or without a language tag.
pub fn strip_code_fences(text: &str) -> String {
    let re = Regex::new(r"```[a-zA-Z]*").unwrap();
    re.replace_all(text, "").to_string()
}

// The first non-greedy `[...]` substring. Component arrays nest objects,
// not arrays, so the first `]` is the terminator.
pub fn extract_json_array(text: &str) -> Option<String> {
    let re = Regex::new(r"(?s)\[.*?\]").unwrap();
    re.find(text).map(|m| m.as_str().to_string())
}

// Forgiving repair: remove trailing commas before `}` or `]`.
pub fn remove_trailing_commas(text: &str) -> String {
    let re = Regex::new(r",\s*([}\]])").unwrap();
    re.replace_all(text, "$1").to_string()
}

// The model returns several record shapes depending on the query and the
// drawing. Each recognized shape gets its own mapping function; anything
// else falls through to the default mapper.
enum RawShape<'a> {
    Structured(&'a Map<String, Value>),
    Typed(&'a Map<String, Value>),
    Bare(&'a str),
    Other,
}

fn classify_shape(value: &Value) -> RawShape<'_> {
    match value {
        Value::Object(map) => {
            if ["komponente", "component_name", "name"]
                .iter()
                .any(|k| map.contains_key(*k))
            {
                RawShape::Structured(map)
            } else if map.contains_key("type") {
                RawShape::Typed(map)
            } else {
                RawShape::Other
            }
        }
        Value::String(s) => RawShape::Bare(s),
        _ => RawShape::Other,
    }
}

fn normalize_item(value: &Value) -> ComponentRecord {
    match classify_shape(value) {
        RawShape::Structured(map) => from_structured(map),
        RawShape::Typed(map) => from_typed(map),
        RawShape::Bare(name) => from_bare(name),
        RawShape::Other => from_other(),
    }
}

fn from_structured(map: &Map<String, Value>) -> ComponentRecord {
    ComponentRecord {
        plant: string_field(map, &["anlage", "plant"])
            .unwrap_or_else(|| UNKNOWN_COMPONENT.to_string()),
        article_id: string_field(map, &["artikel", "article", "articleId"]).unwrap_or_default(),
        component_name: string_field(map, &["komponente", "component_name", "name"])
            .unwrap_or_else(|| UNKNOWN_COMPONENT.to_string()),
        description: string_field(map, &["beschreibung", "description"])
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        remark: string_field(map, &["bemerkung", "remark", "note"]).unwrap_or_default(),
        count: count_field(map, &["stueck", "count", "quantity", "menge"]),
        size: string_field(map, &["groesse", "size", "dn"]),
        signal: string_field(map, &["signal"]),
        rating: string_field(map, &["rating", "kvs"]),
        material: string_field(map, &["material"]),
    }
}

fn from_typed(map: &Map<String, Value>) -> ComponentRecord {
    let mut record = ComponentRecord::with_name(
        string_field(map, &["type"]).unwrap_or_else(|| UNKNOWN_COMPONENT.to_string()),
    );
    if let Some(description) = string_field(map, &["description", "beschreibung"]) {
        record.description = description;
    }
    record.count = count_field(map, &["count", "quantity", "stueck"]);
    record
}

fn from_bare(name: &str) -> ComponentRecord {
    let name = name.trim();
    ComponentRecord::with_name(if name.is_empty() {
        UNKNOWN_COMPONENT.to_string()
    } else {
        name.to_string()
    })
}

fn from_other() -> ComponentRecord {
    ComponentRecord::with_name(UNKNOWN_COMPONENT.to_string())
}

fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        match map.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => continue,
        }
    }
    None
}

fn count_field(map: &Map<String, Value>, keys: &[&str]) -> u32 {
    for key in keys {
        match map.get(*key) {
            Some(Value::Number(n)) => {
                if let Some(n) = n.as_u64() {
                    return (n as u32).max(1);
                }
            }
            Some(Value::String(s)) => {
                if let Ok(n) = s.trim().parse::<u32>() {
                    return n.max(1);
                }
            }
            _ => continue,
        }
    }
    1
}

// Last resort for unparseable output: scan for quoted component-name
// fields, capped, and tag every hit as low confidence.
fn fallback_scan(raw: &str) -> Vec<ComponentRecord> {
    let re = Regex::new(r#""(?:komponente|component_name|name)"\s*:\s*"([^"]+)""#).unwrap();
    re.captures_iter(raw)
        .take(FALLBACK_LIMIT)
        .map(|caps| {
            let mut record = ComponentRecord::with_name(caps[1].to_string());
            record.remark = FALLBACK_REMARK.to_string();
            record
        })
        .collect()
}
