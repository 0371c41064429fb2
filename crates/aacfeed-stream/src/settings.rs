//! 解码驱动配置.

use serde::{Deserialize, Serialize};

use aacfeed_codec::pcm::BYTES_PER_FRAME;
use aacfeed_codec::{DownmixPolicy, EngineConfig, OutputBitDepth};
use aacfeed_core::{FeedError, FeedResult};

/// 回绕拼接窗口默认大小
pub const DEFAULT_WRAP_WINDOW: usize = 2048;
/// 每次调度要求的最小输出空间
pub const DEFAULT_MIN_SPACE: usize = 20480;
/// 每次调度要求的最小输入字节数
pub const DEFAULT_MIN_READ_BYTES: usize = 2048;

/// 解码驱动配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderSettings {
    /// 连续可读数据不足此值且总量超过此值时, 拼接回绕两侧的数据
    pub wrap_window: usize,
    /// 调度器在输出空间达到此值时才调用解码
    pub min_space: usize,
    /// 调度器在输入数据达到此值时才调用解码
    pub min_read_bytes: usize,
    pub output_bit_depth: OutputBitDepth,
    pub downmix: DownmixPolicy,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        let engine = EngineConfig::playback();
        Self {
            wrap_window: DEFAULT_WRAP_WINDOW,
            min_space: DEFAULT_MIN_SPACE,
            min_read_bytes: DEFAULT_MIN_READ_BYTES,
            output_bit_depth: engine.output_bit_depth,
            downmix: engine.downmix,
        }
    }
}

impl DecoderSettings {
    /// 校验配置
    pub fn validate(&self) -> FeedResult<()> {
        if self.wrap_window == 0 {
            return Err(FeedError::InvalidArgument("wrap_window 不能为 0".into()));
        }
        if self.min_space < BYTES_PER_FRAME {
            return Err(FeedError::InvalidArgument(format!(
                "min_space ({}) 小于一个输出帧 ({BYTES_PER_FRAME} 字节)",
                self.min_space
            )));
        }
        Ok(())
    }

    /// 对应的引擎输出配置
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            output_bit_depth: self.output_bit_depth,
            downmix: self.downmix,
        }
    }
}
