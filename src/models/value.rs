//! 文档字段值
//!
//! 种子 JSON、内存存储、Firestore REST 三者之间共用的字段值模型

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value as JsonValue};

use crate::error::ParseError;

/// 文档的字段集合，按字段名排序
pub type Fields = BTreeMap<String, FieldValue>;

/// 文档字段值
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    /// base64 编码的字节
    Bytes(String),
    /// 文档引用（完整资源名）
    Reference(String),
    GeoPoint { latitude: f64, longitude: f64 },
    Array(Vec<FieldValue>),
    Map(Fields),
}

impl FieldValue {
    /// 从普通 JSON 值转换；能放进 i64 的数字视为整数
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => FieldValue::Null,
            JsonValue::Bool(b) => FieldValue::Boolean(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => FieldValue::String(s.clone()),
            JsonValue::Array(items) => {
                FieldValue::Array(items.iter().map(FieldValue::from_json).collect())
            }
            JsonValue::Object(map) => FieldValue::Map(fields_from_json(map)),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// 编码为 Firestore REST 的 `Value` 表示
    pub fn to_rest(&self) -> JsonValue {
        match self {
            FieldValue::Null => json!({ "nullValue": null }),
            FieldValue::Boolean(b) => json!({ "booleanValue": b }),
            // REST 接口里 int64 以字符串传输
            FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
            FieldValue::Double(d) => {
                if d.is_finite() {
                    json!({ "doubleValue": d })
                } else if d.is_nan() {
                    json!({ "doubleValue": "NaN" })
                } else if *d > 0.0 {
                    json!({ "doubleValue": "Infinity" })
                } else {
                    json!({ "doubleValue": "-Infinity" })
                }
            }
            FieldValue::Timestamp(ts) => {
                json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::AutoSi, true) })
            }
            FieldValue::String(s) => json!({ "stringValue": s }),
            FieldValue::Bytes(b) => json!({ "bytesValue": b }),
            FieldValue::Reference(r) => json!({ "referenceValue": r }),
            FieldValue::GeoPoint {
                latitude,
                longitude,
            } => json!({ "geoPointValue": { "latitude": latitude, "longitude": longitude } }),
            FieldValue::Array(items) => {
                let values: Vec<JsonValue> = items.iter().map(FieldValue::to_rest).collect();
                json!({ "arrayValue": { "values": values } })
            }
            FieldValue::Map(fields) => json!({ "mapValue": { "fields": fields_to_rest(fields) } }),
        }
    }

    /// 从 Firestore REST 的 `Value` 表示解码
    pub fn from_rest(value: &JsonValue) -> Result<Self, ParseError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ParseError::UnknownFieldValue(value.to_string()))?;
        let (kind, inner) = obj
            .iter()
            .next()
            .ok_or_else(|| ParseError::UnknownFieldValue(value.to_string()))?;
        let unknown = || ParseError::UnknownFieldValue(value.to_string());

        let decoded = match kind.as_str() {
            "nullValue" => FieldValue::Null,
            "booleanValue" => FieldValue::Boolean(inner.as_bool().ok_or_else(unknown)?),
            "integerValue" => {
                let parsed = match inner {
                    JsonValue::String(s) => s.parse::<i64>().ok(),
                    other => other.as_i64(),
                };
                FieldValue::Integer(parsed.ok_or_else(unknown)?)
            }
            "doubleValue" => FieldValue::Double(match inner {
                JsonValue::String(s) => match s.as_str() {
                    "NaN" => f64::NAN,
                    "Infinity" => f64::INFINITY,
                    "-Infinity" => f64::NEG_INFINITY,
                    other => other.parse::<f64>().map_err(|_| unknown())?,
                },
                other => other.as_f64().ok_or_else(unknown)?,
            }),
            "timestampValue" => {
                let raw = inner.as_str().ok_or_else(unknown)?;
                let ts = DateTime::parse_from_rfc3339(raw).map_err(|_| unknown())?;
                FieldValue::Timestamp(ts.with_timezone(&Utc))
            }
            "stringValue" => FieldValue::String(inner.as_str().ok_or_else(unknown)?.to_string()),
            "bytesValue" => FieldValue::Bytes(inner.as_str().ok_or_else(unknown)?.to_string()),
            "referenceValue" => {
                FieldValue::Reference(inner.as_str().ok_or_else(unknown)?.to_string())
            }
            "geoPointValue" => FieldValue::GeoPoint {
                latitude: inner.get("latitude").and_then(JsonValue::as_f64).unwrap_or(0.0),
                longitude: inner.get("longitude").and_then(JsonValue::as_f64).unwrap_or(0.0),
            },
            "arrayValue" => {
                let items = match inner.get("values").and_then(JsonValue::as_array) {
                    Some(values) => values
                        .iter()
                        .map(FieldValue::from_rest)
                        .collect::<Result<Vec<_>, _>>()?,
                    None => Vec::new(),
                };
                FieldValue::Array(items)
            }
            "mapValue" => FieldValue::Map(match inner.get("fields") {
                Some(fields) => fields_from_rest(fields)?,
                None => Fields::new(),
            }),
            _ => return Err(unknown()),
        };

        Ok(decoded)
    }
}

/// 普通 JSON 对象 → 字段集合
pub fn fields_from_json(map: &Map<String, JsonValue>) -> Fields {
    map.iter()
        .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
        .collect()
}

/// 字段集合 → REST `fields` 对象
pub fn fields_to_rest(fields: &Fields) -> JsonValue {
    let map: Map<String, JsonValue> = fields
        .iter()
        .map(|(k, v)| (k.clone(), v.to_rest()))
        .collect();
    JsonValue::Object(map)
}

/// REST `fields` 对象 → 字段集合
pub fn fields_from_rest(value: &JsonValue) -> Result<Fields, ParseError> {
    let map = value
        .as_object()
        .ok_or_else(|| ParseError::shape("document fields", "object"))?;
    map.iter()
        .map(|(k, v)| Ok((k.clone(), FieldValue::from_rest(v)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_json_numbers_split_into_integer_and_double() {
        assert_eq!(FieldValue::from_json(&json!(3)), FieldValue::Integer(3));
        assert_eq!(FieldValue::from_json(&json!(2.5)), FieldValue::Double(2.5));
        assert_eq!(
            FieldValue::from_json(&json!({"a": [true, null]})),
            FieldValue::Map(Fields::from([(
                "a".to_string(),
                FieldValue::Array(vec![FieldValue::Boolean(true), FieldValue::Null])
            )]))
        );
    }

    #[test]
    fn test_fields_are_sorted_regardless_of_source_order() {
        let a: JsonValue = serde_json::from_str(r#"{"title": "x", "level": 1}"#).unwrap();
        let b: JsonValue = serde_json::from_str(r#"{"level": 1, "title": "x"}"#).unwrap();
        let fields = fields_from_json(a.as_object().unwrap());
        let reordered = fields_from_json(b.as_object().unwrap());

        assert_eq!(fields, reordered);
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["level", "title"]);
        assert_eq!(
            fields_to_rest(&fields).to_string(),
            fields_to_rest(&reordered).to_string()
        );
    }

    #[test]
    fn test_integer_is_sent_as_string() {
        assert_eq!(
            FieldValue::Integer(7).to_rest(),
            json!({ "integerValue": "7" })
        );
    }

    #[test]
    fn test_timestamp_rest_encoding() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(
            FieldValue::Timestamp(ts).to_rest(),
            json!({ "timestampValue": "2024-01-15T00:00:00Z" })
        );
    }

    #[test]
    fn test_decode_rest_document_fields() {
        let fields = fields_from_rest(&json!({
            "order": { "integerValue": "0" },
            "text": { "stringValue": "hi" },
            "when": { "timestampValue": "2024-01-15T10:30:00.123456Z" },
            "meta": { "mapValue": {} },
            "tags": { "arrayValue": {} },
            "ratio": { "doubleValue": "NaN" }
        }))
        .unwrap();

        assert_eq!(fields["order"], FieldValue::Integer(0));
        assert_eq!(fields["text"].as_str(), Some("hi"));
        assert!(matches!(fields["when"], FieldValue::Timestamp(_)));
        assert_eq!(fields["meta"], FieldValue::Map(Fields::new()));
        assert_eq!(fields["tags"], FieldValue::Array(vec![]));
        assert!(matches!(fields["ratio"], FieldValue::Double(d) if d.is_nan()));
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let err = FieldValue::from_rest(&json!({ "mysteryValue": 1 })).unwrap_err();
        assert!(matches!(err, ParseError::UnknownFieldValue(_)));
    }
}
