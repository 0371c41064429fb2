//! 宿主配置文件.
//!
//! JSON 格式, 缺省的字段与整段均回落到默认值:
//! ```json
//! {
//!     "logging": { "level": "info", "directory": "logs" },
//!     "decoder": { "wrap_window": 2048, "output_bit_depth": "24" }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::logging::LoggingConfig;
use aacfeed_stream::DecoderSettings;

/// 宿主配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    pub logging: LoggingConfig,
    pub decoder: DecoderSettings,
}

impl FeedConfig {
    /// 从 JSON 文件加载并校验
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败, path={}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("配置文件无效, path={}", path.display()))
    }

    /// 从 JSON 文本解析并校验
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("解析 JSON 失败")?;
        config.decoder.validate()?;
        Ok(config)
    }
}
