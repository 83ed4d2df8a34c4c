//! Schema 驱动的数据校验
//!
//! 给定声明式 schema 与输入值树，校验输入是否符合；不符合时返回唯一的一个错误，
//! 指明出错路径与原因。错误分为两个域：schema 本身有缺陷（[`ValidationError::Schema`]）
//! 和输入不符合 schema（[`ValidationError::Data`]）。
//!
//! ```
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": { "name": { "type": "string", "required": true } }
//! });
//! assert!(schemaguard::validate(&schema, &json!({ "name": "Ada" })).is_ok());
//!
//! let err = schemaguard::validate(&schema, &json!({})).unwrap_err();
//! assert!(err.is_data_issue());
//! assert_eq!(err.to_string(), "name is required");
//! ```

pub mod conditions;
pub mod config;
pub mod error;
pub mod message;
pub mod path;
pub mod schema;
pub mod utils;
pub mod validator;

pub use conditions::{extend, ConditionBlock, ConditionRule, Extender, Operator};
pub use error::{Issue, IssueCode, Result, ValidationError};
pub use message::{Diagnostic, MessageCatalog, TemplateCatalog};
pub use path::{PathExpr, PathSyntaxError, Segment};
pub use schema::{
    register_schema, schemas_snapshot, validate_schema, EnumMember, Items, Properties,
    PropertyMap, RegistryError, Schema, SchemaNode, SchemaRegistry, TypeRef, TypeSpec, TypeTag,
};
pub use utils::logging;
pub use validator::{validate, validate_with, Validator};
