pub mod catalog;

use serde_json::Value;

use crate::error::{Issue, IssueCode, ValidationError};
use crate::path::{PathExpr, Segment};
use crate::schema::TypeSpec;

pub use catalog::{MessageCatalog, TemplateCatalog};

/// 替换模板中的 `$name` 占位符；未知占位符原样保留
pub fn render(template: &str, params: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let name = &after[..name_len];
        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) if !name.is_empty() => out.push_str(value),
            _ => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &after[name_len..];
    }
    out.push_str(rest);
    out
}

/// 约束值在消息中的显示形式
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 待渲染的校验问题
pub struct Diagnostic<'s> {
    schema_issue: bool,
    code: IssueCode,
    path: PathExpr,
    spec: Option<&'s TypeSpec>,
    params: Vec<(&'static str, String)>,
}

impl<'s> Diagnostic<'s> {
    pub fn schema(code: IssueCode, path: &PathExpr) -> Self {
        Self::new(true, code, path)
    }

    pub fn data(code: IssueCode, path: &PathExpr) -> Self {
        Self::new(false, code, path)
    }

    fn new(schema_issue: bool, code: IssueCode, path: &PathExpr) -> Self {
        Self {
            schema_issue,
            code,
            path: path.clone(),
            spec: None,
            params: Vec::new(),
        }
    }

    pub fn code(&self) -> IssueCode {
        self.code
    }

    pub fn path(&self) -> &PathExpr {
        &self.path
    }

    /// 复制 title、description、examples、default 到错误中
    pub fn with_spec(mut self, spec: &'s TypeSpec) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// 查找模板并渲染；目录中没有对应模板时返回 `None`
    pub fn render(self, catalog: &dyn TemplateCatalog) -> Option<ValidationError> {
        let template = catalog.template(self.code, self.schema_issue)?;

        let mut params = self.params;
        let display_path = match (self.code, self.path.last()) {
            (IssueCode::UnexpectedKey, Some(last)) => {
                let key = match last {
                    Segment::Key(key) => key.clone(),
                    Segment::Index(index) => index.to_string(),
                };
                params.push(("key", key));
                self.path.parent().unwrap_or_default()
            }
            _ => self.path.clone(),
        };
        params.push(("path", display_path.to_string()));

        let mut issue = Issue::new(self.code, self.path, render(template, &params));
        if let Some(spec) = self.spec {
            issue.title = spec.title.clone();
            issue.description = spec.description.clone();
            issue.examples = spec.examples.clone();
            issue.default = spec.default.clone();
        }
        Some(ValidationError::new(self.schema_issue, issue))
    }
}
