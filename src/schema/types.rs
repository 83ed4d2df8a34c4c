use std::fmt;

use serde_json::Value;

/// 基础类型标签
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Number,
    Integer,
    Decimal,
    Boolean,
    Null,
    Array,
    Object,
}

impl TypeTag {
    pub const ALL: [TypeTag; 8] = [
        TypeTag::String,
        TypeTag::Number,
        TypeTag::Integer,
        TypeTag::Decimal,
        TypeTag::Boolean,
        TypeTag::Null,
        TypeTag::Array,
        TypeTag::Object,
    ];

    pub fn parse(tag: &str) -> Option<Self> {
        TypeTag::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Integer => "integer",
            TypeTag::Decimal => "decimal",
            TypeTag::Boolean => "boolean",
            TypeTag::Null => "null",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            TypeTag::String => value.is_string(),
            TypeTag::Number => value.is_number(),
            TypeTag::Integer => is_integer(value),
            TypeTag::Decimal => is_decimal(value),
            TypeTag::Boolean => value.is_boolean(),
            TypeTag::Null => value.is_null(),
            TypeTag::Array => value.is_array(),
            TypeTag::Object => value.is_object(),
        }
    }

    /// number、integer、decimal 共用数值范围检查
    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeTag::Number | TypeTag::Integer | TypeTag::Decimal)
    }

    /// 所有已知标签，逗号分隔
    pub fn allowed_list() -> String {
        TypeTag::ALL
            .iter()
            .map(TypeTag::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => true,
        Value::Number(number) => number
            .as_f64()
            .is_some_and(|n| n.is_finite() && n.fract() == 0.0),
        _ => false,
    }
}

/// 类型标签到谓词的映射；未知标签返回 `None`
pub fn predicate(tag: &str) -> Option<fn(&Value) -> bool> {
    let predicate: fn(&Value) -> bool = match TypeTag::parse(tag)? {
        TypeTag::String => Value::is_string,
        TypeTag::Number => Value::is_number,
        TypeTag::Integer => is_integer,
        TypeTag::Decimal => is_decimal,
        TypeTag::Boolean => Value::is_boolean,
        TypeTag::Null => Value::is_null,
        TypeTag::Array => Value::is_array,
        TypeTag::Object => Value::is_object,
    };
    Some(predicate)
}

fn is_decimal(value: &Value) -> bool {
    value.is_number() && !is_integer(value)
}

/// 按标签判断类型；未知标签返回 `None`，由调用方转成 schema 错误
pub fn is_typeof(tag: &str, value: &Value) -> Option<bool> {
    TypeTag::parse(tag).map(|t| t.matches(value))
}
