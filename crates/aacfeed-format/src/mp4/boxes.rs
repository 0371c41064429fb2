//! MP4 Box (Atom) 头部解析.
//!
//! ISO 14496-12 定义的 Box 结构:
//! ```text
//! Size:       4 bytes (big-endian, 含头部本身)
//! Type:       4 bytes (FourCC)
//! [ExtSize]:  8 bytes (仅当 Size==1 时存在, 64-bit 大小)
//! ```
//!
//! 调用方从输入缓冲区复制至多 16 字节 (可跨越回绕点) 交给 [`BoxHeader::parse`],
//! 数据不足时返回 `None` 等待下一轮.

use byteorder::{BigEndian, ByteOrder};

use aacfeed_core::{FeedError, FeedResult};

/// 基本头部长度
pub const BOX_HEADER_SIZE: usize = 8;
/// 带 64-bit 扩展大小的头部长度
pub const LARGE_BOX_HEADER_SIZE: usize = 16;
/// full box 的 version(1) + flags(3)
pub const FULL_BOX_PREFIX: usize = 4;

/// 解析器关心的 Box 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxType {
    /// moov - 影片元数据
    Moov,
    /// trak - 轨道
    Trak,
    /// mdia - 媒体
    Mdia,
    /// minf - 媒体信息
    Minf,
    /// stbl - 采样表
    Stbl,
    /// stsd - 采样描述
    Stsd,
    /// mp4a - AAC 音频采样条目
    Mp4a,
    /// esds - 基本流描述符
    Esds,
    /// stsc - 采样→块映射
    Stsc,
    /// stsz - 采样大小
    Stsz,
    /// stco - 块偏移 (32位)
    Stco,
    /// mdat - 媒体数据
    Mdat,
    /// 其他 box, 整体跳过
    Unknown([u8; 4]),
}

impl BoxType {
    /// 从 4 字节 FourCC 创建
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Self {
        match fourcc {
            b"moov" => Self::Moov,
            b"trak" => Self::Trak,
            b"mdia" => Self::Mdia,
            b"minf" => Self::Minf,
            b"stbl" => Self::Stbl,
            b"stsd" => Self::Stsd,
            b"mp4a" => Self::Mp4a,
            b"esds" => Self::Esds,
            b"stsc" => Self::Stsc,
            b"stsz" => Self::Stsz,
            b"stco" => Self::Stco,
            b"mdat" => Self::Mdat,
            _ => Self::Unknown(*fourcc),
        }
    }

    /// 仅含子 box 的容器
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Moov | Self::Trak | Self::Mdia | Self::Minf | Self::Stbl
        )
    }

    /// 必须完整缓冲后才能解析的 box, 不允许部分消耗
    ///
    /// stsz 不在其中: 它只在能放进输入缓冲区时才被完整缓冲, 否则按普通 box 跳过.
    pub fn needs_full_box(&self) -> bool {
        matches!(self, Self::Esds | Self::Stsc | Self::Stco)
    }
}

impl std::fmt::Display for BoxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cc: &[u8] = match self {
            Self::Moov => b"moov",
            Self::Trak => b"trak",
            Self::Mdia => b"mdia",
            Self::Minf => b"minf",
            Self::Stbl => b"stbl",
            Self::Stsd => b"stsd",
            Self::Mp4a => b"mp4a",
            Self::Esds => b"esds",
            Self::Stsc => b"stsc",
            Self::Stsz => b"stsz",
            Self::Stco => b"stco",
            Self::Mdat => b"mdat",
            Self::Unknown(cc) => cc,
        };
        write!(f, "{}", std::str::from_utf8(cc).unwrap_or("????"))
    }
}

/// 已解析的 Box 头部
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    /// Box 总大小 (含头部, 0 表示延伸到流末尾)
    pub size: u64,
    /// Box 类型
    pub box_type: BoxType,
    /// 头部大小 (8 或 16 字节)
    pub header_size: usize,
}

impl BoxHeader {
    /// 从连续字节解析头部
    ///
    /// # 返回
    /// - `Ok(None)`: 数据不足一个完整头部
    /// - `Err(_)`: 声明长度小于头部长度
    pub fn parse(data: &[u8]) -> FeedResult<Option<Self>> {
        if data.len() < BOX_HEADER_SIZE {
            return Ok(None);
        }
        let size32 = BigEndian::read_u32(&data[0..4]);
        let fourcc = [data[4], data[5], data[6], data[7]];
        let box_type = BoxType::from_fourcc(&fourcc);

        let (size, header_size) = if size32 == 1 {
            if data.len() < LARGE_BOX_HEADER_SIZE {
                return Ok(None);
            }
            (BigEndian::read_u64(&data[8..16]), LARGE_BOX_HEADER_SIZE)
        } else {
            (u64::from(size32), BOX_HEADER_SIZE)
        };

        if size != 0 && size < header_size as u64 {
            return Err(FeedError::Format(format!(
                "{box_type} box 声明长度 {size} 小于头部长度 {header_size}"
            )));
        }

        Ok(Some(Self {
            size,
            box_type,
            header_size,
        }))
    }

    /// 解析器处理该 box 时应消耗的字节数
    ///
    /// 容器只消耗头部以进入子 box; stsd/mp4a 跳过固定前缀后继续解析内部;
    /// 其余 box 整体消耗.
    pub fn consume_len(&self) -> u64 {
        let header = self.header_size as u64;
        match self.box_type {
            t if t.is_container() => header,
            // version/flags(4) + entry_count(4)
            BoxType::Stsd => header + 8,
            // reserved(6) + data_ref_index(2) + AudioSampleEntry 字段(20)
            BoxType::Mp4a => header + 28,
            _ => self.size,
        }
    }
}
