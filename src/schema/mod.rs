pub mod registry;
pub mod types;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::conditions::ConditionBlock;

pub use registry::{
    register_schema, schemas_snapshot, validate_schema, RegistryError, SchemaRegistry,
};
pub use types::{is_typeof, predicate, TypeTag};

/// 编译后的 schema，不可变，可在线程间共享
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct Schema {
    root: SchemaNode,
}

impl Schema {
    pub fn from_value(value: &Value) -> Self {
        Self {
            root: SchemaNode::from_value(value),
        }
    }

    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    pub fn into_root(self) -> SchemaNode {
        self.root
    }
}

impl From<SchemaNode> for Schema {
    fn from(root: SchemaNode) -> Self {
        Self { root }
    }
}

impl From<Value> for Schema {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

/// schema 树中的一个节点
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaNode {
    /// 简写形式，如 `"string"`
    TypeName(String),
    Spec(Box<TypeSpec>),
    Enum(Vec<EnumMember>),
}

impl SchemaNode {
    /// 宽松编译：形状错误保留在树中，校验到该位置时再报告
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(tag) => SchemaNode::TypeName(tag.clone()),
            Value::Array(members) => SchemaNode::Enum(compile_members(members)),
            Value::Object(map) => SchemaNode::Spec(Box::new(TypeSpec::from_map(map))),
            _ => SchemaNode::Spec(Box::default()),
        }
    }

    pub fn as_spec(&self) -> Option<&TypeSpec> {
        match self {
            SchemaNode::Spec(spec) => Some(&**spec),
            _ => None,
        }
    }

    /// 用于错误消息的类型描述
    pub fn type_label(&self) -> String {
        match self {
            SchemaNode::TypeName(tag) => tag.clone(),
            SchemaNode::Spec(spec) => spec.type_label(),
            SchemaNode::Enum(members) => describe_members(members),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EnumMember {
    Literal(Value),
    Alternative(Box<TypeSpec>),
    /// 非法：枚举中嵌套枚举，校验时报告
    Nested(Vec<EnumMember>),
}

impl EnumMember {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(members) => EnumMember::Nested(compile_members(members)),
            Value::Object(map) => EnumMember::Alternative(Box::new(TypeSpec::from_map(map))),
            literal => EnumMember::Literal(literal.clone()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            EnumMember::Literal(Value::String(s)) => s.clone(),
            EnumMember::Literal(other) => other.to_string(),
            EnumMember::Alternative(spec) => spec.type_label(),
            EnumMember::Nested(members) => format!("[{}]", describe_members(members)),
        }
    }
}

fn compile_members(members: &[Value]) -> Vec<EnumMember> {
    members.iter().map(EnumMember::from_value).collect()
}

pub fn describe_members(members: &[EnumMember]) -> String {
    members
        .iter()
        .map(EnumMember::describe)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `type` 字段的取值
#[derive(Clone, Debug, PartialEq)]
pub enum TypeRef {
    Tag(String),
    Enum(Vec<EnumMember>),
    /// 既不是字符串也不是数组
    Invalid(Value),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Properties {
    Declared(PropertyMap),
    /// `properties` 存在但不是映射
    Malformed(Value),
}

impl Properties {
    pub fn declared(&self) -> Option<&PropertyMap> {
        match self {
            Properties::Declared(map) => Some(map),
            Properties::Malformed(_) => None,
        }
    }
}

/// 保持声明顺序的属性表；同名键覆盖原位置
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyMap {
    entries: Vec<(String, SchemaNode)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            entries: map
                .iter()
                .map(|(key, node)| (key.clone(), SchemaNode::from_value(node)))
                .collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, node: SchemaNode) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = node,
            None => self.entries.push((key, node)),
        }
    }

    /// 合并另一张表，后写入者优先
    pub fn merge(&mut self, other: &PropertyMap) {
        for (key, node) in &other.entries {
            self.insert(key.clone(), node.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, node)| node)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut SchemaNode)> {
        self.entries
            .iter_mut()
            .map(|(key, node)| (key.as_str(), node))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Items {
    Single(Box<SchemaNode>),
    Positional(Vec<SchemaNode>),
    Tag(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypeSpec {
    pub type_ref: Option<TypeRef>,
    pub properties: Option<Properties>,
    pub items: Option<Items>,
    pub required: bool,
    pub nullable: bool,
    pub default: Option<Value>,
    pub additional_properties: bool,
    pub minimum: Option<Value>,
    pub maximum: Option<Value>,
    pub exclusive_minimum: Option<Value>,
    pub exclusive_maximum: Option<Value>,
    pub min_length: Option<Value>,
    pub max_length: Option<Value>,
    pub min_items: Option<Value>,
    pub max_items: Option<Value>,
    pub pattern: Option<String>,
    pub title: Option<Value>,
    pub description: Option<Value>,
    pub examples: Option<Value>,
    pub conditions: Vec<ConditionBlock>,
}

impl TypeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            type_ref: Some(TypeRef::Tag(tag.into())),
            ..Self::default()
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        let type_ref = match (map.get("type"), map.get("enum")) {
            (Some(Value::String(tag)), _) => Some(TypeRef::Tag(tag.clone())),
            (Some(Value::Array(members)), _) => Some(TypeRef::Enum(compile_members(members))),
            (Some(other), _) => Some(TypeRef::Invalid(other.clone())),
            (None, Some(Value::Array(members))) => Some(TypeRef::Enum(compile_members(members))),
            (None, _) => None,
        };

        let properties = map.get("properties").map(|value| match value {
            Value::Object(props) => Properties::Declared(PropertyMap::from_map(props)),
            other => Properties::Malformed(other.clone()),
        });

        let items = map.get("items").and_then(|value| match value {
            Value::Object(_) => Some(Items::Single(Box::new(SchemaNode::from_value(value)))),
            Value::Array(nodes) => Some(Items::Positional(
                nodes.iter().map(SchemaNode::from_value).collect(),
            )),
            Value::String(tag) => Some(Items::Tag(tag.clone())),
            _ => None,
        });

        let conditions = match map.get("if") {
            Some(Value::Array(blocks)) => blocks
                .iter()
                .filter_map(ConditionBlock::from_value)
                .collect(),
            Some(block) => ConditionBlock::from_value(block).into_iter().collect(),
            None => Vec::new(),
        };

        Self {
            type_ref,
            properties,
            items,
            required: flag(map, "required") || flag(map, "require"),
            nullable: flag(map, "nullable"),
            default: map.get("default").cloned(),
            additional_properties: flag(map, "additionalProperties"),
            minimum: numeric(map, "minimum"),
            maximum: numeric(map, "maximum"),
            exclusive_minimum: numeric(map, "exclusiveMinimum"),
            exclusive_maximum: numeric(map, "exclusiveMaximum"),
            min_length: map.get("minLength").cloned(),
            max_length: map.get("maxLength").cloned(),
            min_items: map.get("minItems").cloned(),
            max_items: map.get("maxItems").cloned(),
            pattern: map
                .get("pattern")
                .and_then(Value::as_str)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            title: map.get("title").cloned(),
            description: map.get("description").cloned(),
            examples: map.get("examples").cloned(),
            conditions,
        }
    }

    /// 已知的类型标签；枚举或未知标签返回 `None`
    pub fn tag(&self) -> Option<TypeTag> {
        match &self.type_ref {
            Some(TypeRef::Tag(tag)) => TypeTag::parse(tag),
            _ => None,
        }
    }

    pub fn declared_properties(&self) -> Option<&PropertyMap> {
        self.properties.as_ref().and_then(Properties::declared)
    }

    /// 条件扩展注入属性；缺失或格式错误的 `properties` 被替换为新表
    pub fn merge_properties(&mut self, extra: &PropertyMap) {
        match &mut self.properties {
            Some(Properties::Declared(existing)) => existing.merge(extra),
            slot => *slot = Some(Properties::Declared(extra.clone())),
        }
    }

    pub fn type_label(&self) -> String {
        match &self.type_ref {
            Some(TypeRef::Tag(tag)) => tag.clone(),
            Some(TypeRef::Enum(members)) => describe_members(members),
            Some(TypeRef::Invalid(value)) => value.to_string(),
            None => "undefined".to_string(),
        }
    }
}

/// 与 JavaScript 真值规则一致的布尔标志
fn flag(map: &Map<String, Value>, key: &str) -> bool {
    match map.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// 非数值的范围约束被忽略
fn numeric(map: &Map<String, Value>, key: &str) -> Option<Value> {
    map.get(key).filter(|value| value.is_number()).cloned()
}
