//! # aacfeed
//!
//! 嵌入式实时播放器的 AAC 流式解封装与解码前端.
//!
//! 输入可以是裸 ADTS 帧, 也可以是 MP4 封装的 AAC. 驱动器从共享输入缓冲区
//! 增量解析头部, 逐帧驱动外部解码引擎, 并把 PCM 写入共享输出缓冲区.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use std::sync::{Arc, Mutex};
//! use aacfeed::core::{PlaybackBuffer, RingBuffer};
//! use aacfeed::format::ContainerKind;
//! use aacfeed::stream::{AacStreamDecoder, DecoderSettings};
//!
//! let registry = aacfeed::default_engine_registry();
//! let (registration, factory) = aacfeed::stream::register_default(&registry).unwrap();
//!
//! let input = Arc::new(Mutex::new(RingBuffer::new(256 * 1024).unwrap()));
//! let output = Arc::new(Mutex::new(PlaybackBuffer::new(registration.min_space * 8).unwrap()));
//! let mut decoder =
//!     AacStreamDecoder::new(input, output, factory, DecoderSettings::default()).unwrap();
//! decoder.open(ContainerKind::from_format_code(b'2')).unwrap();
//! let state = decoder.decode();
//! println!("状态: {state:?}");
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `aacfeed-core` | 错误类型, 环形游标与流缓冲区 |
//! | `aacfeed-codec` | 解码引擎接口, ADTS, PCM 转换 |
//! | `aacfeed-format` | MP4 头部解析与块表 |
//! | `aacfeed-stream` | 流式解码驱动 |

/// 错误类型与流缓冲区
pub use aacfeed_core as core;

/// 解码引擎接口与辅助工具
pub use aacfeed_codec as codec;

/// 容器层
pub use aacfeed_format as format;

/// 流式解码驱动
pub use aacfeed_stream as stream;

pub mod config;
pub mod logging;

pub use config::FeedConfig;

/// 获取 aacfeed 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建已注册所有内置解码引擎的注册表
pub fn default_engine_registry() -> aacfeed_codec::EngineRegistry {
    let mut registry = aacfeed_codec::EngineRegistry::new();
    aacfeed_codec::register_all(&mut registry);
    registry
}
