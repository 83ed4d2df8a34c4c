/// 工具模块 - 日志初始化与 JSON 值比较
pub mod logging;
pub mod value;

pub use logging::LoggingConfig;
pub use value::{compare_values, values_equal};
