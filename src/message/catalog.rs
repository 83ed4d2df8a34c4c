use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::IssueCode;

/// 消息模板查询接口：`(code, 是否 schema 问题) -> 模板`
///
/// 返回 `None` 表示该域下不报告此类错误。
pub trait TemplateCatalog {
    fn template(&self, code: IssueCode, schema_issue: bool) -> Option<&str>;
}

/// 基于 JSON 的消息模板表
///
/// ```json
/// { "schema": { "requireType": "..." }, "data": { "required": "$path is required" } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageCatalog {
    #[serde(default)]
    schema: HashMap<String, String>,
    #[serde(default)]
    data: HashMap<String, String>,
}

const SCHEMA_TEMPLATES: &[(IssueCode, &str)] = &[
    (
        IssueCode::Typeof,
        "Invalid type `$type` at $path, allowed types: $allowedTypes",
    ),
    (IssueCode::RequireType, "Schema at $path requires a `type`"),
    (IssueCode::Properties, "`properties` at $path must be an object"),
    (IssueCode::MaxLength, "`$bound` at $path must be a number"),
    (IssueCode::MinLength, "`$bound` at $path must be a number"),
    (IssueCode::MaxItems, "`$bound` at $path must be a number"),
    (IssueCode::MinItems, "`$bound` at $path must be a number"),
    (
        IssueCode::MinLengthMinimum,
        "`$bound` at $path must be greater than 0",
    ),
    (
        IssueCode::MinItemsMinimum,
        "`$bound` at $path must be greater than 0",
    ),
    (
        IssueCode::InvalidPath,
        "Invalid path `$expression` in condition at $path: $reason",
    ),
    (IssueCode::NestedEnum, "Nested enum at $path is not allowed"),
    (IssueCode::Pattern, "Invalid pattern `$pattern` at $path"),
];

const DATA_TEMPLATES: &[(IssueCode, &str)] = &[
    (IssueCode::Required, "$path is required"),
    (IssueCode::Typeof, "$path must be of type $type"),
    (
        IssueCode::Enum,
        "Invalid value at $path, allowed values: $enums",
    ),
    (IssueCode::MaxItems, "$path must contain at most $maxItems items"),
    (IssueCode::MinItems, "$path must contain at least $minItems items"),
    (
        IssueCode::MaxLength,
        "$path must be at most $maxLength characters long",
    ),
    (
        IssueCode::MinLength,
        "$path must be at least $minLength characters long",
    ),
    (IssueCode::Pattern, "$path does not match the pattern $pattern"),
    (IssueCode::UnexpectedKey, "Unexpected key `$key` in $path"),
    (
        IssueCode::Minimum,
        "$path must be greater than or equal to $minimum",
    ),
    (
        IssueCode::Maximum,
        "$path must be less than or equal to $maximum",
    ),
    (
        IssueCode::ExclusiveMinimum,
        "$path must be greater than $exclusiveMinimum",
    ),
    (
        IssueCode::ExclusiveMaximum,
        "$path must be less than $exclusiveMaximum",
    ),
];

static BUILTIN: Lazy<MessageCatalog> = Lazy::new(|| {
    let mut catalog = MessageCatalog::empty();
    for (code, template) in SCHEMA_TEMPLATES {
        catalog = catalog.with_template(*code, true, *template);
    }
    for (code, template) in DATA_TEMPLATES {
        catalog = catalog.with_template(*code, false, *template);
    }
    catalog
});

impl MessageCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 内置英文模板
    pub fn builtin() -> &'static MessageCatalog {
        &BUILTIN
    }

    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn with_template(
        mut self,
        code: IssueCode,
        schema_issue: bool,
        template: impl Into<String>,
    ) -> Self {
        self.table_mut(schema_issue)
            .insert(code.as_str().to_string(), template.into());
        self
    }

    pub fn without_template(mut self, code: IssueCode, schema_issue: bool) -> Self {
        self.table_mut(schema_issue).remove(code.as_str());
        self
    }

    /// 用另一张表覆盖同名模板
    pub fn merge(mut self, overrides: &MessageCatalog) -> Self {
        self.schema
            .extend(overrides.schema.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.data
            .extend(overrides.data.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    fn table_mut(&mut self, schema_issue: bool) -> &mut HashMap<String, String> {
        if schema_issue {
            &mut self.schema
        } else {
            &mut self.data
        }
    }
}

impl TemplateCatalog for MessageCatalog {
    fn template(&self, code: IssueCode, schema_issue: bool) -> Option<&str> {
        let table = if schema_issue { &self.schema } else { &self.data };
        table.get(code.as_str()).map(String::as_str)
    }
}
