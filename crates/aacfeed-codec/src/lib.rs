//! # aacfeed-codec
//!
//! AAC 解码侧的能力定义与辅助工具.
//!
//! - [`DecodeEngine`]: 外部 AAC 解码引擎的静态类型接口 (打开/配置/初始化/解码/关闭)
//! - [`EngineRegistry`]: 解码引擎工厂注册表
//! - [`adts`]: ADTS 同步字扫描与帧头解析
//! - [`asc`]: AudioSpecificConfig 解析与构造
//! - [`pcm`]: 解码输出到播放缓冲区格式的转换与写入
//!
//! ## 使用示例
//!
//! ```rust
//! use aacfeed_codec::EngineRegistry;
//!
//! let mut reg = EngineRegistry::new();
//! aacfeed_codec::register_all(&mut reg);
//! println!("可用引擎: {:?}", reg.list_engines());
//! ```

pub mod adts;
pub mod asc;
pub mod engine;
pub mod engines;
pub mod pcm;
pub mod registry;

// 重导出常用类型
pub use engine::{
    DecodeEngine, DownmixPolicy, EngineConfig, EngineFactory, FrameInfo, OutputBitDepth,
    StreamInfo,
};
pub use registry::EngineRegistry;

/// 注册所有内置解码引擎
pub fn register_all(registry: &mut EngineRegistry) {
    engines::register_all_engines(registry);
}
