//! 解码引擎 trait 定义.
//!
//! AAC 熵解码本身不在本项目范围内, 由外部引擎完成. 驱动器只依赖
//! `DecodeEngine` 这一静态类型接口:
//! 1. 通过 [`EngineFactory`] 打开引擎实例 (引擎不可用时在此失败)
//! 2. 调用 `configure()` 设置输出位深与下混策略
//! 3. ADTS 流调用 `init_from_bitstream()`, MP4 流调用 `init_from_config()`
//! 4. 反复调用 `decode()`, 通过 `samples()` 取出交错 PCM
//! 5. 丢弃实例即关闭引擎

use serde::{Deserialize, Serialize};

use aacfeed_core::FeedResult;

/// 引擎输出位深
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputBitDepth {
    /// 16 位有效位, 存放在 i32 低位
    #[serde(rename = "16")]
    Bits16,
    /// 24 位有效位, 存放在 i32 低位
    #[serde(rename = "24")]
    Bits24,
    /// 32 位满幅
    #[serde(rename = "32")]
    Bits32,
}

impl OutputBitDepth {
    /// 有效位数
    pub const fn bits(&self) -> u32 {
        match self {
            Self::Bits16 => 16,
            Self::Bits24 => 24,
            Self::Bits32 => 32,
        }
    }
}

/// 多声道下混策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownmixPolicy {
    /// 保留原始声道
    None,
    /// 强制下混为立体声
    Stereo,
}

/// 引擎输出配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub output_bit_depth: OutputBitDepth,
    pub downmix: DownmixPolicy,
}

impl EngineConfig {
    /// 播放管线固定使用的配置: 最大输出位深 + 强制下混立体声
    pub const fn playback() -> Self {
        Self {
            output_bit_depth: OutputBitDepth::Bits24,
            downmix: DownmixPolicy::Stereo,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::playback()
    }
}

/// 引擎初始化结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道数
    pub channels: u8,
    /// 初始化过程消耗的输入字节数 (仅码流初始化有意义)
    pub bytes_consumed: usize,
}

/// 单次 `decode()` 调用的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    /// 产出的交错采样总数 (所有声道之和)
    pub samples: usize,
    /// 产出的声道数
    pub channels: u8,
    /// 消耗的输入字节数
    pub bytes_consumed: usize,
    /// 引擎错误码, 0 表示无错误
    pub error: u8,
}

impl FrameInfo {
    /// 每声道采样帧数
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples / usize::from(self.channels)
        }
    }
}

/// 解码引擎 trait
///
/// 所有具体引擎 (symphonia 适配器, 测试用脚本引擎等) 都实现此 trait.
pub trait DecodeEngine: Send {
    /// 引擎名称
    fn name(&self) -> &str;

    /// 设置输出配置
    fn configure(&mut self, config: &EngineConfig) -> FeedResult<()>;

    /// 从 ADTS 码流初始化, `data` 从同步字开始
    ///
    /// # 返回
    /// - `Ok(info)`: 初始化成功, `info.bytes_consumed` 为需要跳过的字节数
    /// - `Err(FeedError::NeedMoreData)`: 数据不足以完成初始化, 稍后重试
    /// - 其他错误: 码流无法初始化
    fn init_from_bitstream(&mut self, data: &[u8]) -> FeedResult<StreamInfo>;

    /// 从 MP4 esds 中的 DecoderSpecificInfo (AudioSpecificConfig) 初始化
    fn init_from_config(&mut self, config: &[u8]) -> FeedResult<StreamInfo>;

    /// 解码一帧
    ///
    /// 错误通过 `FrameInfo::error` 报告而非返回值, 调用方依据
    /// `bytes_consumed` 决定是否能继续前进.
    fn decode(&mut self, data: &[u8]) -> FrameInfo;

    /// 最近一次 `decode()` 产出的交错采样, 长度等于 `FrameInfo::samples`
    fn samples(&self) -> &[i32];

    /// 错误码对应的描述文本
    fn error_message(&self, code: u8) -> &'static str;
}

/// 引擎工厂函数类型 (打开一个新的引擎实例)
pub type EngineFactory = fn() -> FeedResult<Box<dyn DecodeEngine>>;
