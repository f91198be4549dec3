use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value as JsonValue};

use crate::error::ParseError;
use crate::models::value::{fields_from_json, FieldValue, Fields};

/// 课程字段中嵌套的页面集合
pub const SCREENS_FIELD: &str = "screens";
/// 需要转换为时间戳的发布时间字段
pub const PUBLISHED_AT_FIELD: &str = "published_at";

/// 种子文件内容：按文件中的顺序保存的课程条目
#[derive(Debug, Clone, Default)]
pub struct LessonSeed {
    pub entries: Vec<(String, JsonValue)>,
}

impl LessonSeed {
    /// 从顶层 JSON 对象构建
    pub fn from_json(value: JsonValue) -> Result<Self, ParseError> {
        match value {
            JsonValue::Object(map) => Ok(Self {
                entries: map.into_iter().collect(),
            }),
            _ => Err(ParseError::shape("seed file", "object keyed by lesson id")),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 一节课程：课程文档字段 + 页面
#[derive(Debug, Clone, PartialEq)]
pub struct LessonRecord {
    pub id: String,
    /// 写入 `lessons/{id}` 的字段（不含 `screens`）
    pub fields: Fields,
    /// `None` 表示种子中没有 `screens` 字段或其值为空
    pub screens: Option<Vec<ScreenRecord>>,
}

/// 一个页面
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenRecord {
    pub id: String,
    pub fields: Fields,
}

impl LessonRecord {
    /// 拆分 `screens`，并把 `published_at` 转换为时间戳
    pub fn from_entry(id: &str, value: &JsonValue) -> Result<Self, ParseError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ParseError::shape(format!("lesson {}", id), "object"))?;

        let mut rest: Map<String, JsonValue> = obj.clone();
        let screens = match rest.remove(SCREENS_FIELD) {
            Some(raw) if !is_empty_value(&raw) => Some(parse_screens(id, &raw)?),
            _ => None,
        };

        let mut fields = fields_from_json(&rest);
        if let Some(raw) = rest.get(PUBLISHED_AT_FIELD) {
            fields.insert(PUBLISHED_AT_FIELD.to_string(), parse_published_at(raw)?);
        }

        Ok(Self {
            id: id.to_string(),
            fields,
            screens,
        })
    }
}

/// `null`、`false`、`0`、`""` 视为没有给出
fn is_empty_value(raw: &JsonValue) -> bool {
    match raw {
        JsonValue::Null | JsonValue::Bool(false) => true,
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn parse_screens(lesson_id: &str, raw: &JsonValue) -> Result<Vec<ScreenRecord>, ParseError> {
    let map = raw
        .as_object()
        .ok_or_else(|| ParseError::shape(format!("lesson {} screens", lesson_id), "object"))?;

    map.iter()
        .map(|(screen_id, screen)| {
            let fields = screen.as_object().ok_or_else(|| {
                ParseError::shape(format!("lesson {} screen {}", lesson_id, screen_id), "object")
            })?;
            Ok(ScreenRecord {
                id: screen_id.clone(),
                fields: fields_from_json(fields),
            })
        })
        .collect()
}

/// 转换 `published_at`
///
/// 空值（`null`、`""`、`0`、`false`）原样写入；字符串按日期时间解析；
/// 数字视为毫秒时间戳。
pub fn parse_published_at(raw: &JsonValue) -> Result<FieldValue, ParseError> {
    let invalid = || ParseError::InvalidTimestamp {
        field: PUBLISHED_AT_FIELD.to_string(),
        value: raw.to_string(),
    };

    if is_empty_value(raw) {
        return Ok(FieldValue::from_json(raw));
    }

    match raw {
        JsonValue::String(s) => parse_datetime(s).map(FieldValue::Timestamp).ok_or_else(invalid),
        JsonValue::Number(n) => n
            .as_f64()
            .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms.trunc() as i64))
            .map(FieldValue::Timestamp)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// 解析日期时间；没有时区的输入按 UTC 处理
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
