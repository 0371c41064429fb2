//! 宿主侧的编解码器注册信息.

use log::info;

use aacfeed_codec::{EngineFactory, EngineRegistry};
use aacfeed_core::FeedResult;

use crate::settings::{DEFAULT_MIN_READ_BYTES, DEFAULT_MIN_SPACE};

/// 编解码器标识
pub const AAC_CODEC_ID: char = 'a';
/// 支持的流类型
pub const AAC_CODEC_TYPES: &str = "aac";

/// 注册结果, 宿主据此调度解码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecRegistration {
    pub id: char,
    pub types: &'static str,
    /// 输出缓冲区至少有这么多可写字节时才调度解码
    pub min_space: usize,
    /// 输入缓冲区至少有这么多字节时才调度解码
    pub min_read_bytes: usize,
    /// 探测到的引擎名称
    pub engine: String,
}

/// 注册 AAC 解码器
///
/// 先用工厂打开一次引擎以确认其可用, 不可用时返回 `EngineUnavailable`.
pub fn register_aac(factory: EngineFactory) -> FeedResult<CodecRegistration> {
    let engine = factory()?;
    let registration = CodecRegistration {
        id: AAC_CODEC_ID,
        types: AAC_CODEC_TYPES,
        min_space: DEFAULT_MIN_SPACE,
        min_read_bytes: DEFAULT_MIN_READ_BYTES,
        engine: engine.name().to_string(),
    };
    info!("已注册 AAC 解码器, 引擎: {}", registration.engine);
    Ok(registration)
}

/// 使用注册表中的默认引擎注册, 同时返回该引擎的工厂
pub fn register_default(registry: &EngineRegistry) -> FeedResult<(CodecRegistration, EngineFactory)> {
    let factory = registry.default_factory()?;
    Ok((register_aac(factory)?, factory))
}
