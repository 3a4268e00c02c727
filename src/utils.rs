//! 通用工具：控制台日志、`data-*` 属性解析与 JSON 合并。

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// 输出调试日志（仅在 wasm 目标上写入浏览器控制台）。
pub fn debug(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::debug_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

/// 输出警告日志。
pub fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

/// `flip-axis` -> `flipAxis`
pub fn camel_case(kebab: &str) -> String {
    let mut out = String::with_capacity(kebab.len());
    let mut upper_next = false;
    for ch in kebab.chars() {
        if ch == '-' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// 解析属性值：能按 JSON 解析就解析，否则保留原始字符串。
pub fn parse_attribute_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// 收集元素上以 `data-<prefix>-` 开头的属性，转换为驼峰键的选项表。
///
/// ```
/// use std::collections::BTreeMap;
/// use cards_quiz::utils::data_options;
///
/// let mut attributes = BTreeMap::new();
/// attributes.insert("data-flip-axis".to_string(), "x".to_string());
/// attributes.insert("data-flip-speed".to_string(), "250".to_string());
/// attributes.insert("data-cq-question".to_string(), "q1".to_string());
///
/// let options = data_options(&attributes, "flip");
/// assert_eq!(options.len(), 2);
/// assert_eq!(options["axis"], "x");
/// assert_eq!(options["speed"], 250);
/// ```
pub fn data_options(attributes: &BTreeMap<String, String>, prefix: &str) -> Map<String, Value> {
    let marker = format!("data-{prefix}-");
    attributes
        .iter()
        .filter_map(|(name, raw)| {
            let rest = name.strip_prefix(&marker)?;
            let key = camel_case(rest);
            if key.is_empty() {
                return None;
            }
            Some((key, parse_attribute_value(raw)))
        })
        .collect()
}

/// 深度合并：`patch` 中的对象逐层合并进 `target`，其余值直接覆盖。
pub fn merge_json(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_json(existing, value)
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// 把任意配置值规整为对象；非对象（例如 `null`）视为空对象。
pub fn as_object(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}
