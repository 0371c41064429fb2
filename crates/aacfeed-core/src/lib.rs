//! # aacfeed-core
//!
//! aacfeed 核心库, 提供统一错误类型与流缓冲区抽象.
//!
//! 输入/输出缓冲区由宿主的生产者/消费者线程共享, 本 crate 只定义驱动器
//! 需要的窄能力接口 ([`InputStream`], [`OutputStream`]), 并附带一个基于显式
//! 游标的环形缓冲区实现, 供宿主与测试使用.

pub mod buffer;
pub mod cursor;
pub mod error;

// 重导出常用类型
pub use buffer::{InputStream, OutputStream, PlaybackBuffer, RingBuffer, SharedBuffer, lock_shared};
pub use cursor::RingCursor;
pub use error::{FeedError, FeedResult};
