//! 容器类型标识.

use std::fmt;

/// AAC 码流的封装方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// 裸 ADTS 帧
    Adts,
    /// MP4 / ISO-BMFF
    Mp4,
}

impl ContainerKind {
    /// 由流的格式代码确定封装方式: `'2'` 为 ADTS, 其余均按 MP4 处理
    pub fn from_format_code(code: u8) -> Self {
        match code {
            b'2' => Self::Adts,
            _ => Self::Mp4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Adts => "adts",
            Self::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
