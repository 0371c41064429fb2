//! # aacfeed-stream
//!
//! 流式 AAC 解码驱动.
//!
//! [`AacStreamDecoder`] 持有共享的输入/输出缓冲区与引擎工厂, 由外部调度器
//! 反复调用 `decode()`. 每次调用完成一个有界步骤并返回当前 [`StreamState`].

pub mod context;
pub mod decoder;
pub mod registration;
pub mod settings;

// 重导出常用类型
pub use context::DecoderContext;
pub use decoder::{AacStreamDecoder, StreamState};
pub use registration::{CodecRegistration, register_aac, register_default};
pub use settings::DecoderSettings;
