use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::message::MessageCatalog;

pub const DEBUG_VAR: &str = "SCHEMAGUARD_DEBUG";
pub const MESSAGES_VAR: &str = "SCHEMAGUARD_MESSAGES";

/// 环境变量配置管理
pub struct EnvConfig;

impl EnvConfig {
    /// 从环境变量获取值
    pub fn get_env(key: &str) -> Result<String> {
        env::var(key).map_err(|_| anyhow!("environment variable `{}` is not set", key))
    }

    /// 获取可选的环境变量
    pub fn get_env_optional(key: &str) -> Option<String> {
        env::var(key).ok().filter(|value| !value.is_empty())
    }

    /// 检查是否启用调试模式
    pub fn is_debug_mode() -> bool {
        env::var(DEBUG_VAR).is_ok()
    }

    /// 自定义消息模板文件路径
    pub fn messages_path() -> Option<PathBuf> {
        Self::get_env_optional(MESSAGES_VAR).map(PathBuf::from)
    }

    /// 读取 JSON 模板文件并覆盖内置模板
    pub fn load_catalog(path: &Path) -> Result<MessageCatalog> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read message catalog `{}`", path.display()))?;
        let overrides = MessageCatalog::from_json_str(&text)
            .with_context(|| format!("invalid message catalog `{}`", path.display()))?;
        Ok(MessageCatalog::builtin().clone().merge(&overrides))
    }

    /// 显式路径优先，其次是 `SCHEMAGUARD_MESSAGES`，都没有时使用内置模板
    pub fn resolve_catalog(explicit: Option<&Path>) -> Result<MessageCatalog> {
        match explicit.map(Path::to_path_buf).or_else(Self::messages_path) {
            Some(path) => Self::load_catalog(&path),
            None => Ok(MessageCatalog::builtin().clone()),
        }
    }
}
