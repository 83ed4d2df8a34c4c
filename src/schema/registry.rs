use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

use crate::error::ValidationError;
use crate::validator::Validator;

use super::Schema;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("schema `{0}` not registered")]
    NotRegistered(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// 按名称保存已编译的 schema
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, schema: Schema) {
        let name = name.into();
        if self.schemas.insert(name.clone(), schema).is_some() {
            tracing::debug!(schema = %name, "schema replaced");
        }
    }

    pub fn snapshot(&self) -> Vec<(String, Schema)> {
        let mut entries: Vec<_> = self
            .schemas
            .iter()
            .map(|(name, schema)| (name.clone(), schema.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn get(&self, name: &str) -> Result<&Schema, RegistryError> {
        self.schemas
            .get(name)
            .ok_or_else(|| RegistryError::NotRegistered(name.to_string()))
    }

    pub fn validate(&self, name: &str, value: &Value) -> Result<(), RegistryError> {
        self.validate_with(&Validator::default(), name, value)
    }

    pub fn validate_with(
        &self,
        validator: &Validator<'_>,
        name: &str,
        value: &Value,
    ) -> Result<(), RegistryError> {
        let schema = self.get(name)?;
        validator.validate(schema, value)?;
        Ok(())
    }
}

static REGISTRY: Lazy<RwLock<SchemaRegistry>> = Lazy::new(|| RwLock::new(SchemaRegistry::new()));

pub fn registry() -> &'static RwLock<SchemaRegistry> {
    &REGISTRY
}

pub fn register_schema(name: impl Into<String>, schema: Schema) {
    registry().write().register(name, schema);
}

/// 校验只持有读锁；扩展作用于副本，多个线程可以同时校验同一个 schema
pub fn validate_schema(name: &str, value: &Value) -> Result<(), RegistryError> {
    registry().read().validate(name, value)
}

pub fn schemas_snapshot() -> Vec<(String, Schema)> {
    registry().read().snapshot()
}
