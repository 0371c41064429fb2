//! MP4 (ISO-BMFF) 头部解析.
//!
//! 只覆盖流式 AAC 播放需要的子集: 定位第一个可播放的 AAC 轨道,
//! 取出解码配置与块布局, 然后停在 mdat 的第一个块上.

pub mod boxes;
pub mod chunk_table;
pub mod descriptor;
pub mod parser;

pub use boxes::{BoxHeader, BoxType};
pub use chunk_table::{ChunkEntry, ChunkTable, SampleSizes, SampleToChunk};
pub use parser::{ContainerCursor, Mp4HeaderParser, Mp4Stream, ParseStatus};
