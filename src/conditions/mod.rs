pub mod extend;

use std::cmp::Ordering;

use serde_json::Value;

use crate::schema::{is_typeof, PropertyMap};
use crate::utils::{compare_values, values_equal};

pub use extend::{extend, Extender};

/// 条件运算符
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    TypeOf,
    /// `in` 或任何无法识别的运算符：比较值为数组时做成员判断
    Membership,
}

impl Operator {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "=" => Operator::Eq,
            "!=" => Operator::Ne,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Ge,
            "<=" => Operator::Le,
            "typeof" => Operator::TypeOf,
            _ => Operator::Membership,
        }
    }

    /// `field` 为 `None` 表示输入中没有该字段
    pub fn evaluate(&self, field: Option<&Value>, compare: Option<&Value>) -> bool {
        match self {
            Operator::Eq => loosely_equal(field, compare),
            Operator::Ne => !loosely_equal(field, compare),
            Operator::Gt => ordering(field, compare) == Some(Ordering::Greater),
            Operator::Lt => ordering(field, compare) == Some(Ordering::Less),
            Operator::Ge => matches!(
                ordering(field, compare),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Le => matches!(
                ordering(field, compare),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::TypeOf => match (field, compare.and_then(Value::as_str)) {
                (Some(value), Some(tag)) => is_typeof(tag, value) == Some(true),
                _ => false,
            },
            Operator::Membership => match (field, compare) {
                (Some(value), Some(Value::Array(members))) => {
                    members.iter().any(|member| values_equal(member, value))
                }
                _ => false,
            },
        }
    }
}

fn loosely_equal(field: Option<&Value>, compare: Option<&Value>) -> bool {
    match (field, compare) {
        (None, None) => true,
        (Some(a), Some(b)) => values_equal(a, b),
        _ => false,
    }
}

fn ordering(field: Option<&Value>, compare: Option<&Value>) -> Option<Ordering> {
    compare_values(field?, compare?)
}

/// 一条条件规则及其 `elseIf` / `else` 备选链
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionRule {
    /// `None` 表示规则无效，不参与求值
    pub operator: Option<Operator>,
    pub compare: Option<Value>,
    pub add_properties: Option<PropertyMap>,
    pub else_if: Option<Box<ConditionRule>>,
    pub otherwise: Option<Box<ConditionRule>>,
}

impl ConditionRule {
    pub fn new(operator: Operator, compare: Value) -> Self {
        Self {
            operator: Some(operator),
            compare: Some(compare),
            add_properties: None,
            else_if: None,
            otherwise: None,
        }
    }

    /// `elseIf` 与 `else` 按同样的规则编译；没有 `operator` 的规则（包括 `else`）无效
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let operator = map
            .get("operator")
            .and_then(Value::as_str)
            .filter(|raw| !raw.is_empty())
            .map(Operator::parse);
        Some(Self {
            operator,
            compare: map.get("value").cloned(),
            add_properties: map
                .get("addProperties")
                .and_then(Value::as_object)
                .map(PropertyMap::from_map),
            else_if: map
                .get("elseIf")
                .and_then(Self::from_value)
                .map(Box::new),
            otherwise: map
                .get("else")
                .and_then(Self::from_value)
                .map(Box::new),
        })
    }

    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        self.add_properties = Some(properties);
        self
    }

    pub fn with_else_if(mut self, rule: ConditionRule) -> Self {
        self.else_if = Some(Box::new(rule));
        self
    }

    pub fn with_else(mut self, rule: ConditionRule) -> Self {
        self.otherwise = Some(Box::new(rule));
        self
    }

    /// 沿备选链找到第一条匹配的规则
    ///
    /// 无效规则（没有运算符）终止整条链。
    pub fn resolve(&self, field: Option<&Value>) -> Option<&ConditionRule> {
        let mut current = Some(self);
        while let Some(rule) = current {
            let operator = rule.operator.as_ref()?;
            let matched = operator.evaluate(field, rule.compare.as_ref());
            tracing::trace!(?operator, compare = ?rule.compare, matched, "condition rule evaluated");
            if matched {
                return Some(rule);
            }
            current = rule.else_if.as_deref().or(rule.otherwise.as_deref());
        }
        None
    }
}

/// `if` 块：按根输入上的某个字段值决定注入哪些属性
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionBlock {
    /// 未解析的路径文本，扩展时解析
    pub field: String,
    pub rules: Vec<ConditionRule>,
}

impl ConditionBlock {
    pub fn new(field: impl Into<String>, rules: Vec<ConditionRule>) -> Self {
        Self {
            field: field.into(),
            rules,
        }
    }

    /// `conditions` 可以是单条规则或规则数组，统一为数组
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let field = map
            .get("value")
            .and_then(Value::as_str)
            .filter(|field| !field.is_empty())?;
        let rules = match map.get("conditions")? {
            Value::Array(rules) => rules.iter().filter_map(ConditionRule::from_value).collect(),
            single => vec![ConditionRule::from_value(single)?],
        };
        Some(Self::new(field, rules))
    }
}
