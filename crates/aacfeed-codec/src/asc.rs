//! AudioSpecificConfig (ISO 14496-3 1.6.2.1) 的最小解析与构造.
//!
//! ```text
//! audioObjectType         5 bits (31 表示扩展, 再读 6 bits + 32)
//! samplingFrequencyIndex  4 bits (15 表示显式给出 24 bits 采样率)
//! channelConfiguration    4 bits
//! ```

use aacfeed_core::{FeedError, FeedResult};

/// AAC 采样率索引表 (ISO 14496-3)
const AAC_SAMPLE_RATES: [u32; 16] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350, 0, 0,
    0,
];

/// 采样率索引转采样率
pub fn sample_rate_from_index(index: u8) -> Option<u32> {
    AAC_SAMPLE_RATES
        .get(usize::from(index))
        .copied()
        .filter(|&rate| rate > 0)
}

/// 解析后的 AudioSpecificConfig 头部字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpecificConfig {
    /// 音频对象类型 (2 = AAC-LC)
    pub object_type: u8,
    /// 采样率索引 (15 表示显式采样率)
    pub sampling_frequency_index: u8,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道配置
    pub channel_configuration: u8,
}

/// 按位读取大端字节序列
struct BitCursor<'a> {
    data: &'a [u8],
    bit: usize,
}

impl<'a> BitCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, bit: 0 }
    }

    fn read(&mut self, n: u32) -> FeedResult<u32> {
        let mut value = 0u32;
        for _ in 0..n {
            let byte = self.data.get(self.bit / 8).ok_or_else(|| {
                FeedError::InvalidData("AudioSpecificConfig 数据截断".into())
            })?;
            let b = (byte >> (7 - (self.bit % 8))) & 1;
            value = (value << 1) | u32::from(b);
            self.bit += 1;
        }
        Ok(value)
    }
}

impl AudioSpecificConfig {
    /// 从 DecoderSpecificInfo 字节解析
    pub fn parse(data: &[u8]) -> FeedResult<Self> {
        let mut br = BitCursor::new(data);
        let mut object_type = br.read(5)?;
        if object_type == 31 {
            object_type = 32 + br.read(6)?;
        }
        let sampling_frequency_index = br.read(4)? as u8;
        let sample_rate = if sampling_frequency_index == 0x0F {
            br.read(24)?
        } else {
            sample_rate_from_index(sampling_frequency_index).ok_or_else(|| {
                FeedError::InvalidData(format!(
                    "无效的采样率索引 {sampling_frequency_index}"
                ))
            })?
        };
        let channel_configuration = br.read(4)? as u8;

        Ok(Self {
            object_type: u8::try_from(object_type).unwrap_or(u8::MAX),
            sampling_frequency_index,
            sample_rate,
            channel_configuration,
        })
    }

    /// 编码为 2 字节的 AudioSpecificConfig (仅适用于标准采样率索引)
    pub fn to_bytes(&self) -> [u8; 2] {
        let ot = self.object_type & 0x1F;
        let sfi = self.sampling_frequency_index & 0x0F;
        let ch = self.channel_configuration & 0x0F;
        [(ot << 3) | (sfi >> 1), ((sfi & 0x01) << 7) | (ch << 3)]
    }
}
