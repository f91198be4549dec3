//! 页面序号解析 - 业务能力层
//!
//! 只负责"根据一个页面的 ID 和现有字段决定是否需要补写 order"，
//! 不读写数据库

use regex::Regex;

use crate::error::ParseError;
use crate::models::value::{FieldValue, Fields};

/// 页面序号字段
pub const ORDER_FIELD: &str = "order";

/// 单个页面的处理结论
#[derive(Debug, Clone, PartialEq)]
pub enum OrderDecision {
    /// 需要写入该序号
    Assign(i64),
    /// 已有 order，保持不变
    AlreadyPresent(FieldValue),
    /// ID 末尾没有数字
    NoDigitSuffix,
    /// 末尾数字超出 i64 范围
    OutOfRange(String),
}

/// 页面序号解析器
#[derive(Debug, Clone)]
pub struct ScreenOrderParser {
    trailing_digits: Regex,
}

impl ScreenOrderParser {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            trailing_digits: Regex::new(r"([0-9]+)$")?,
        })
    }

    /// 取出 ID 末尾的连续数字
    pub fn trailing_digits<'a>(&self, screen_id: &'a str) -> Option<&'a str> {
        self.trailing_digits
            .captures(screen_id)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// 决定页面的 order 处理方式
    pub fn decide(&self, screen_id: &str, fields: &Fields) -> OrderDecision {
        let Some(digits) = self.trailing_digits(screen_id) else {
            return OrderDecision::NoDigitSuffix;
        };

        if let Some(existing) = fields.get(ORDER_FIELD) {
            return OrderDecision::AlreadyPresent(existing.clone());
        }

        match digits.parse::<i64>() {
            Ok(order) => OrderDecision::Assign(order),
            Err(_) => OrderDecision::OutOfRange(digits.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ScreenOrderParser {
        ScreenOrderParser::new().unwrap()
    }

    #[test]
    fn test_zero_padded_suffix() {
        assert_eq!(
            parser().decide("screen_007", &Fields::new()),
            OrderDecision::Assign(7)
        );
    }

    #[test]
    fn test_only_trailing_run_counts() {
        assert_eq!(
            parser().decide("s12ok03", &Fields::new()),
            OrderDecision::Assign(3)
        );
        assert_eq!(parser().trailing_digits("screen_0010"), Some("0010"));
    }

    #[test]
    fn test_letter_after_digits_has_no_suffix() {
        assert_eq!(
            parser().decide("screen_01b", &Fields::new()),
            OrderDecision::NoDigitSuffix
        );
        assert_eq!(
            parser().decide("intro", &Fields::new()),
            OrderDecision::NoDigitSuffix
        );
    }

    #[test]
    fn test_non_ascii_digits_are_not_a_suffix() {
        assert_eq!(
            parser().decide("screen_٣", &Fields::new()),
            OrderDecision::NoDigitSuffix
        );
    }

    #[test]
    fn test_existing_order_is_kept_even_when_zero() {
        let fields = Fields::from([(ORDER_FIELD.to_string(), FieldValue::Integer(0))]);
        assert_eq!(
            parser().decide("screen_005", &fields),
            OrderDecision::AlreadyPresent(FieldValue::Integer(0))
        );

        let fields = Fields::from([(ORDER_FIELD.to_string(), FieldValue::Null)]);
        assert_eq!(
            parser().decide("screen_005", &fields),
            OrderDecision::AlreadyPresent(FieldValue::Null)
        );
    }

    #[test]
    fn test_overflowing_suffix_is_out_of_range() {
        assert_eq!(
            parser().decide("screen_99999999999999999999", &Fields::new()),
            OrderDecision::OutOfRange("99999999999999999999".to_string())
        );
        assert_eq!(
            parser().decide("screen_9223372036854775807", &Fields::new()),
            OrderDecision::Assign(i64::MAX)
        );
    }
}
