pub mod pattern;

use serde_json::{Map, Value};

use crate::conditions::Extender;
use crate::error::{IssueCode, Result};
use crate::message::{display_value, Diagnostic, MessageCatalog, TemplateCatalog};
use crate::path::PathExpr;
use crate::schema::{
    describe_members, EnumMember, Items, Properties, Schema, SchemaNode, TypeRef, TypeSpec,
    TypeTag,
};
use crate::utils::values_equal;

/// 长度类约束：字符串用 minLength/maxLength，数组用 minItems/maxItems
#[derive(Clone, Copy, Debug)]
enum BoundKind {
    Length,
    Items,
}

impl BoundKind {
    fn min_name(self) -> &'static str {
        match self {
            BoundKind::Length => "minLength",
            BoundKind::Items => "minItems",
        }
    }

    fn max_name(self) -> &'static str {
        match self {
            BoundKind::Length => "maxLength",
            BoundKind::Items => "maxItems",
        }
    }

    fn min_code(self) -> IssueCode {
        match self {
            BoundKind::Length => IssueCode::MinLength,
            BoundKind::Items => IssueCode::MinItems,
        }
    }

    fn max_code(self) -> IssueCode {
        match self {
            BoundKind::Length => IssueCode::MaxLength,
            BoundKind::Items => IssueCode::MaxItems,
        }
    }

    fn vacuous_min_code(self) -> IssueCode {
        match self {
            BoundKind::Length => IssueCode::MinLengthMinimum,
            BoundKind::Items => IssueCode::MinItemsMinimum,
        }
    }

    fn declared(self, spec: &TypeSpec) -> (Option<&Value>, Option<&Value>) {
        match self {
            BoundKind::Length => (spec.min_length.as_ref(), spec.max_length.as_ref()),
            BoundKind::Items => (spec.min_items.as_ref(), spec.max_items.as_ref()),
        }
    }
}

/// 递归校验引擎
///
/// 先执行条件扩展得到 schema 副本，再同时遍历 schema 与输入，
/// 遇到第一个问题立即返回。
pub struct Validator<'c> {
    catalog: &'c dyn TemplateCatalog,
}

impl Default for Validator<'static> {
    fn default() -> Self {
        Self::new(MessageCatalog::builtin())
    }
}

impl<'c> Validator<'c> {
    pub fn new(catalog: &'c dyn TemplateCatalog) -> Self {
        Self { catalog }
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub fn validate(&self, schema: &Schema, input: &Value) -> Result<()> {
        let extended = Extender::new(self.catalog).extend(schema, input)?;
        self.check_node(extended.root(), Some(input), &PathExpr::root(), false)
    }

    pub fn validate_value(&self, schema: &Value, input: &Value) -> Result<()> {
        self.validate(&Schema::from_value(schema), input)
    }

    /// 渲染并返回错误；目录中没有模板时忽略该问题继续校验
    fn raise(&self, diagnostic: Diagnostic<'_>) -> Result<()> {
        let code = diagnostic.code();
        let path = diagnostic.path().clone();
        match diagnostic.render(self.catalog) {
            Some(error) => {
                tracing::debug!(
                    %code,
                    %path,
                    schema_issue = error.is_schema_issue(),
                    "validation failed"
                );
                Err(error)
            }
            None => {
                tracing::debug!(%code, %path, "no message template, issue suppressed");
                Ok(())
            }
        }
    }

    fn check_node(
        &self,
        node: &SchemaNode,
        input: Option<&Value>,
        path: &PathExpr,
        in_enum: bool,
    ) -> Result<()> {
        match node {
            SchemaNode::TypeName(tag) => match input {
                Some(value) => self.check_type_name(tag, value, path),
                None => Ok(()),
            },
            SchemaNode::Enum(members) => self.check_enum(members, input, path, in_enum, None),
            SchemaNode::Spec(spec) => self.check_spec(spec, input, path, in_enum),
        }
    }

    fn check_type_name(&self, tag: &str, value: &Value, path: &PathExpr) -> Result<()> {
        self.check_tag(tag, value, path, None).map(|_| ())
    }

    /// 类型谓词检查；只有类型匹配时才返回标签
    fn check_tag(
        &self,
        tag: &str,
        value: &Value,
        path: &PathExpr,
        spec: Option<&TypeSpec>,
    ) -> Result<Option<TypeTag>> {
        let Some(type_tag) = TypeTag::parse(tag) else {
            self.raise(
                with_metadata(Diagnostic::schema(IssueCode::Typeof, path), spec)
                    .param("type", tag)
                    .param("allowedTypes", TypeTag::allowed_list()),
            )?;
            return Ok(None);
        };

        if type_tag.matches(value) {
            return Ok(Some(type_tag));
        }
        self.raise(
            with_metadata(Diagnostic::data(IssueCode::Typeof, path), spec).param("type", tag),
        )?;
        Ok(None)
    }

    fn check_enum(
        &self,
        members: &[EnumMember],
        input: Option<&Value>,
        path: &PathExpr,
        in_enum: bool,
        spec: Option<&TypeSpec>,
    ) -> Result<()> {
        if in_enum {
            self.raise(with_metadata(
                Diagnostic::schema(IssueCode::NestedEnum, path),
                spec,
            ))?;
        }

        if let Some(value) = input {
            let literal_hit = members.iter().any(|member| match member {
                EnumMember::Literal(literal) => values_equal(literal, value),
                _ => false,
            });
            if literal_hit {
                return Ok(());
            }
        }

        for (index, member) in members.iter().enumerate() {
            match member {
                EnumMember::Literal(_) => {}
                EnumMember::Nested(_) => {
                    self.raise(with_metadata(
                        Diagnostic::schema(IssueCode::NestedEnum, path),
                        spec,
                    ))?;
                }
                EnumMember::Alternative(alternative) => {
                    match self.check_spec(alternative, input, &path.child(index), true) {
                        Ok(()) => return Ok(()),
                        // 数据错误只说明这个备选不匹配；schema 错误不能被掩盖
                        Err(error) if error.is_data_issue() => {
                            tracing::trace!(%path, index, code = %error.code(), "enum alternative rejected");
                        }
                        Err(error) => return Err(error),
                    }
                }
            }
        }

        self.raise(
            with_metadata(Diagnostic::data(IssueCode::Enum, path), spec)
                .param("enums", describe_members(members)),
        )
    }

    fn check_spec(
        &self,
        spec: &TypeSpec,
        input: Option<&Value>,
        path: &PathExpr,
        in_enum: bool,
    ) -> Result<()> {
        if let Some(Properties::Malformed(_)) = &spec.properties {
            self.raise(Diagnostic::schema(IssueCode::Properties, path).with_spec(spec))?;
        }

        let Some(type_ref) = &spec.type_ref else {
            self.raise(Diagnostic::schema(IssueCode::RequireType, path).with_spec(spec))?;
            return Ok(());
        };

        if spec.required && input.is_none() && spec.default.is_none() {
            self.raise(Diagnostic::data(IssueCode::Required, path).with_spec(spec))?;
        }

        // 缺省的可选字段是合法的
        let Some(value) = input else {
            return Ok(());
        };

        let tag = match type_ref {
            TypeRef::Enum(members) => {
                return self.check_enum(members, Some(value), path, in_enum, Some(spec));
            }
            _ if spec.nullable && value.is_null() => return Ok(()),
            TypeRef::Tag(tag) => self.check_tag(tag, value, path, Some(spec))?,
            TypeRef::Invalid(raw) => {
                self.raise(
                    Diagnostic::schema(IssueCode::Typeof, path)
                        .with_spec(spec)
                        .param("type", display_value(raw))
                        .param("allowedTypes", TypeTag::allowed_list()),
                )?;
                None
            }
        };

        match (tag, value) {
            (Some(TypeTag::String), Value::String(text)) => self.check_string(spec, text, path),
            (Some(tag), Value::Number(_)) if tag.is_numeric() => {
                self.check_number(spec, value, path)
            }
            (Some(TypeTag::Array), Value::Array(items)) => self.check_array(spec, items, path),
            (Some(TypeTag::Object), Value::Object(map)) => self.check_object(spec, map, path),
            _ => Ok(()),
        }
    }

    fn check_string(&self, spec: &TypeSpec, text: &str, path: &PathExpr) -> Result<()> {
        if let Some(source) = &spec.pattern {
            match pattern::compile(source) {
                Ok(regex) if regex.is_match(text) => {}
                Ok(_) => {
                    self.raise(
                        Diagnostic::data(IssueCode::Pattern, path)
                            .with_spec(spec)
                            .param("pattern", source.clone()),
                    )?;
                }
                Err(reason) => {
                    tracing::debug!(pattern = %source, %reason, "pattern failed to compile");
                    self.raise(
                        Diagnostic::schema(IssueCode::Pattern, path)
                            .with_spec(spec)
                            .param("pattern", source.clone()),
                    )?;
                }
            }
        }

        self.check_bounds(spec, BoundKind::Length, text.chars().count(), path)
    }

    /// 四个范围约束相互独立
    fn check_number(&self, spec: &TypeSpec, value: &Value, path: &PathExpr) -> Result<()> {
        let Some(number) = value.as_f64() else {
            return Ok(());
        };

        let checks: [(&Option<Value>, IssueCode, &'static str, fn(f64, f64) -> bool); 4] = [
            (&spec.minimum, IssueCode::Minimum, "minimum", |n, b| n < b),
            (&spec.maximum, IssueCode::Maximum, "maximum", |n, b| n > b),
            (
                &spec.exclusive_minimum,
                IssueCode::ExclusiveMinimum,
                "exclusiveMinimum",
                |n, b| n <= b,
            ),
            (
                &spec.exclusive_maximum,
                IssueCode::ExclusiveMaximum,
                "exclusiveMaximum",
                |n, b| n >= b,
            ),
        ];

        for (declared, code, name, violates) in checks {
            let Some(bound) = declared else {
                continue;
            };
            let Some(limit) = bound.as_f64() else {
                continue;
            };
            if violates(number, limit) {
                self.raise(
                    Diagnostic::data(code, path)
                        .with_spec(spec)
                        .param(name, display_value(bound)),
                )?;
            }
        }
        Ok(())
    }

    /// 先检查约束声明本身（schema 错误），再检查输入长度（数据错误）
    fn check_bounds(
        &self,
        spec: &TypeSpec,
        kind: BoundKind,
        length: usize,
        path: &PathExpr,
    ) -> Result<()> {
        let (min, max) = kind.declared(spec);
        if min.is_none() && max.is_none() {
            return Ok(());
        }

        let max_limit = match max {
            Some(bound) => match bound.as_f64() {
                Some(limit) => Some((limit, bound)),
                None => {
                    self.raise(
                        Diagnostic::schema(kind.max_code(), path)
                            .with_spec(spec)
                            .param("bound", kind.max_name()),
                    )?;
                    None
                }
            },
            None => None,
        };

        let min_limit = match min {
            Some(bound) => match bound.as_f64() {
                Some(limit) => {
                    if limit <= 0.0 {
                        self.raise(
                            Diagnostic::schema(kind.vacuous_min_code(), path)
                                .with_spec(spec)
                                .param("bound", kind.min_name()),
                        )?;
                    }
                    Some((limit, bound))
                }
                None => {
                    self.raise(
                        Diagnostic::schema(kind.min_code(), path)
                            .with_spec(spec)
                            .param("bound", kind.min_name()),
                    )?;
                    None
                }
            },
            None => None,
        };

        let length = length as f64;
        if let Some((limit, bound)) = max_limit {
            if length > limit {
                self.raise(
                    Diagnostic::data(kind.max_code(), path)
                        .with_spec(spec)
                        .param(kind.max_name(), display_value(bound)),
                )?;
            }
        }
        if let Some((limit, bound)) = min_limit {
            if length < limit {
                self.raise(
                    Diagnostic::data(kind.min_code(), path)
                        .with_spec(spec)
                        .param(kind.min_name(), display_value(bound)),
                )?;
            }
        }
        Ok(())
    }

    fn check_array(&self, spec: &TypeSpec, items: &[Value], path: &PathExpr) -> Result<()> {
        self.check_bounds(spec, BoundKind::Items, items.len(), path)?;

        match &spec.items {
            Some(Items::Single(node)) => {
                for (index, item) in items.iter().enumerate() {
                    self.check_node(node, Some(item), &path.child(index), false)?;
                }
            }
            // 只检查声明了 schema 的位置
            Some(Items::Positional(nodes)) => {
                for (index, (node, item)) in nodes.iter().zip(items).enumerate() {
                    self.check_node(node, Some(item), &path.child(index), false)?;
                }
            }
            Some(Items::Tag(tag)) => {
                for (index, item) in items.iter().enumerate() {
                    self.check_type_name(tag, item, &path.child(index))?;
                }
            }
            None => {}
        }
        Ok(())
    }

    fn check_object(
        &self,
        spec: &TypeSpec,
        input: &Map<String, Value>,
        path: &PathExpr,
    ) -> Result<()> {
        let declared = spec.declared_properties();

        if let Some(properties) = declared {
            for (key, node) in properties.iter() {
                self.check_node(node, input.get(key), &path.child(key), false)?;
            }
        }

        // additionalProperties 只在没有声明 properties 时关闭键检查
        if spec.additional_properties && declared.is_none() {
            return Ok(());
        }

        for key in input.keys() {
            let known = declared.is_some_and(|properties| properties.contains_key(key));
            if !known {
                self.raise(
                    Diagnostic::data(IssueCode::UnexpectedKey, &path.child(key.as_str()))
                        .with_spec(spec),
                )?;
            }
        }
        Ok(())
    }
}

fn with_metadata<'s>(diagnostic: Diagnostic<'s>, spec: Option<&'s TypeSpec>) -> Diagnostic<'s> {
    match spec {
        Some(spec) => diagnostic.with_spec(spec),
        None => diagnostic,
    }
}

/// 使用内置消息模板校验原始 JSON schema
pub fn validate(schema: &Value, input: &Value) -> Result<()> {
    Validator::default().validate_value(schema, input)
}

/// 使用内置消息模板校验已编译的 schema
pub fn validate_with(schema: &Schema, input: &Value) -> Result<()> {
    Validator::default().validate(schema, input)
}
