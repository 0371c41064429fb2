//! 解码引擎注册表.
//!
//! 引擎在编译期以工厂函数静态注册, 取代运行时按名称查找符号的方式.
//! 注册表为空或工厂失败时, 在构造阶段即报告 `EngineUnavailable`.

use aacfeed_core::{FeedError, FeedResult};

use crate::engine::{DecodeEngine, EngineFactory};

/// 引擎注册条目
struct EngineEntry {
    /// 引擎名称
    name: String,
    /// 工厂函数
    factory: EngineFactory,
}

/// 解码引擎注册表
pub struct EngineRegistry {
    entries: Vec<EngineEntry>,
}

impl EngineRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 注册一个引擎
    pub fn register_engine(&mut self, name: impl Into<String>, factory: EngineFactory) {
        self.entries.push(EngineEntry {
            name: name.into(),
            factory,
        });
    }

    /// 按名称查找工厂函数
    pub fn factory(&self, name: &str) -> FeedResult<EngineFactory> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.factory)
            .ok_or_else(|| FeedError::EngineUnavailable(format!("未注册引擎 {name}")))
    }

    /// 默认工厂 (最先注册的引擎优先级最高)
    pub fn default_factory(&self) -> FeedResult<EngineFactory> {
        self.entries
            .first()
            .map(|e| e.factory)
            .ok_or_else(|| FeedError::EngineUnavailable("未注册任何 AAC 解码引擎".into()))
    }

    /// 使用默认工厂创建引擎实例
    pub fn create_default(&self) -> FeedResult<Box<dyn DecodeEngine>> {
        (self.default_factory()?)()
    }

    /// 获取所有已注册的引擎名称
    pub fn list_engines(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
