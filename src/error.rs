use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::path::PathExpr;

pub type Result<T> = std::result::Result<T, ValidationError>;

/// 错误类型代码，同时作为消息模板的键
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueCode {
    Typeof,
    RequireType,
    Properties,
    MaxLength,
    MinLength,
    MaxItems,
    MinItems,
    MinLengthMinimum,
    MinItemsMinimum,
    InvalidPath,
    NestedEnum,
    Pattern,
    Required,
    Enum,
    UnexpectedKey,
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
}

impl IssueCode {
    pub const ALL: [IssueCode; 19] = [
        IssueCode::Typeof,
        IssueCode::RequireType,
        IssueCode::Properties,
        IssueCode::MaxLength,
        IssueCode::MinLength,
        IssueCode::MaxItems,
        IssueCode::MinItems,
        IssueCode::MinLengthMinimum,
        IssueCode::MinItemsMinimum,
        IssueCode::InvalidPath,
        IssueCode::NestedEnum,
        IssueCode::Pattern,
        IssueCode::Required,
        IssueCode::Enum,
        IssueCode::UnexpectedKey,
        IssueCode::Minimum,
        IssueCode::Maximum,
        IssueCode::ExclusiveMinimum,
        IssueCode::ExclusiveMaximum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::Typeof => "typeof",
            IssueCode::RequireType => "requireType",
            IssueCode::Properties => "properties",
            IssueCode::MaxLength => "maxLength",
            IssueCode::MinLength => "minLength",
            IssueCode::MaxItems => "maxItems",
            IssueCode::MinItems => "minItems",
            IssueCode::MinLengthMinimum => "minLengthMinimum",
            IssueCode::MinItemsMinimum => "minItemsMinimum",
            IssueCode::InvalidPath => "invalidPath",
            IssueCode::NestedEnum => "nestedEnum",
            IssueCode::Pattern => "pattern",
            IssueCode::Required => "required",
            IssueCode::Enum => "enum",
            IssueCode::UnexpectedKey => "unexpectedKey",
            IssueCode::Minimum => "minimum",
            IssueCode::Maximum => "maximum",
            IssueCode::ExclusiveMinimum => "exclusiveMinimum",
            IssueCode::ExclusiveMaximum => "exclusiveMaximum",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown issue code `{0}`")]
pub struct UnknownIssueCode(pub String);

impl FromStr for IssueCode {
    type Err = UnknownIssueCode;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        IssueCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownIssueCode(s.to_string()))
    }
}

/// 单个校验问题：出错位置、渲染好的消息，以及从 schema 节点复制的元数据
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub code: IssueCode,
    pub path: PathExpr,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Issue {
    pub fn new(code: IssueCode, path: PathExpr, message: impl Into<String>) -> Self {
        Self {
            code,
            path,
            message: message.into(),
            title: None,
            description: None,
            examples: None,
            default: None,
        }
    }
}

/// 校验失败的两个域，互不混淆
///
/// `Schema` 表示 schema 本身有缺陷；`Data` 表示 schema 合法但输入不符合。
#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "lowercase")]
pub enum ValidationError {
    #[error("{}", .0.message)]
    Schema(Issue),
    #[error("{}", .0.message)]
    Data(Issue),
}

impl ValidationError {
    pub fn new(schema_issue: bool, issue: Issue) -> Self {
        if schema_issue {
            ValidationError::Schema(issue)
        } else {
            ValidationError::Data(issue)
        }
    }

    pub fn is_schema_issue(&self) -> bool {
        matches!(self, ValidationError::Schema(_))
    }

    pub fn is_data_issue(&self) -> bool {
        matches!(self, ValidationError::Data(_))
    }

    pub fn issue(&self) -> &Issue {
        match self {
            ValidationError::Schema(issue) | ValidationError::Data(issue) => issue,
        }
    }

    pub fn into_issue(self) -> Issue {
        match self {
            ValidationError::Schema(issue) | ValidationError::Data(issue) => issue,
        }
    }

    pub fn code(&self) -> IssueCode {
        self.issue().code
    }

    pub fn path(&self) -> &PathExpr {
        &self.issue().path
    }

    pub fn message(&self) -> &str {
        &self.issue().message
    }
}
