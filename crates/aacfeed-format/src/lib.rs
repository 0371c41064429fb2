//! # aacfeed-format
//!
//! AAC 码流的容器层.
//!
//! - [`ContainerKind`]: ADTS / MP4 封装方式
//! - [`mp4`]: 可恢复的增量 box 解析, esds 描述符, 块表与采样大小

pub mod format_id;
pub mod mp4;

// 重导出常用类型
pub use format_id::ContainerKind;
pub use mp4::{ChunkTable, ContainerCursor, Mp4HeaderParser, Mp4Stream, ParseStatus, SampleSizes};
