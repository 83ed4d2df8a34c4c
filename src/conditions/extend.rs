use serde_json::Value;

use crate::error::{IssueCode, Result};
use crate::message::{Diagnostic, TemplateCatalog};
use crate::path::{self, PathExpr};
use crate::schema::{Properties, Schema, SchemaNode, TypeSpec};

use super::ConditionBlock;

/// 条件扩展：根据输入根节点上的字段值，为 schema 节点注入属性
///
/// 扩展作用于 schema 的私有副本，调用方传入的 schema 不会被修改，
/// 同一个 `Schema` 可以被多个线程同时用于校验。
pub struct Extender<'c> {
    catalog: &'c dyn TemplateCatalog,
}

impl<'c> Extender<'c> {
    pub fn new(catalog: &'c dyn TemplateCatalog) -> Self {
        Self { catalog }
    }

    pub fn extend(&self, schema: &Schema, root: &Value) -> Result<Schema> {
        let mut node = schema.root().clone();
        self.extend_node(&mut node, root, &PathExpr::root())?;
        Ok(Schema::from(node))
    }

    /// 深度优先、先序遍历所有 `properties`
    fn extend_node(&self, node: &mut SchemaNode, root: &Value, at: &PathExpr) -> Result<()> {
        let SchemaNode::Spec(spec) = node else {
            return Ok(());
        };

        for block in std::mem::take(&mut spec.conditions) {
            self.apply_block(spec, &block, root, at)?;
        }

        if let Some(Properties::Declared(properties)) = &mut spec.properties {
            for (key, child) in properties.iter_mut() {
                let child_path = at.child(key);
                self.extend_node(child, root, &child_path)?;
            }
        }
        Ok(())
    }

    fn apply_block(
        &self,
        spec: &mut TypeSpec,
        block: &ConditionBlock,
        root: &Value,
        at: &PathExpr,
    ) -> Result<()> {
        let field_path = match path::parse(&block.field) {
            Ok(field_path) => field_path,
            Err(err) => {
                let raised = Diagnostic::schema(IssueCode::InvalidPath, at)
                    .with_spec(spec)
                    .param("expression", block.field.clone())
                    .param("reason", err.reason)
                    .render(self.catalog);
                return match raised {
                    Some(error) => Err(error),
                    None => {
                        tracing::debug!(field = %block.field, "invalid condition path ignored");
                        Ok(())
                    }
                };
            }
        };

        let field_value = path::lookup(root, &field_path);
        tracing::trace!(
            node = %at,
            field = %field_path,
            present = field_value.is_some(),
            "evaluating condition block"
        );

        // 同级规则全部求值，不短路
        for rule in &block.rules {
            let Some(matched) = rule.resolve(field_value) else {
                continue;
            };
            if let Some(extra) = &matched.add_properties {
                tracing::debug!(
                    node = %at,
                    keys = ?extra.keys().collect::<Vec<_>>(),
                    "condition matched, injecting properties"
                );
                spec.merge_properties(extra);
            }
        }
        Ok(())
    }
}

/// 返回扩展后的 schema 副本
pub fn extend(schema: &Schema, root: &Value, catalog: &dyn TemplateCatalog) -> Result<Schema> {
    Extender::new(catalog).extend(schema, root)
}
