//! 基于 symphonia 的 AAC-LC 解码引擎.
//!
//! symphonia 的 AAC 解码器只接收原始访问单元 (不含 ADTS 头部), 且不报告消耗的
//! 字节数. 本适配器补齐这两点:
//! - ADTS 码流: 逐帧解析头部, 以 `frame_length` 作为消耗字节数, 只把载荷交给 symphonia
//! - MP4 码流: 输入即一个完整访问单元, 整体消耗
//!
//! symphonia 仅支持单声道与立体声, 因此下混策略对本引擎没有实际效果.

use log::{debug, warn};
use symphonia_codec_aac::AacDecoder as SymAacDecoder;
use symphonia_core::audio::SampleBuffer;
use symphonia_core::codecs::{
    CODEC_TYPE_AAC, CodecParameters as SymCodecParameters, Decoder as SymDecoderTrait,
    DecoderOptions as SymDecoderOptions,
};
use symphonia_core::formats::Packet as SymPacket;

use aacfeed_core::{FeedError, FeedResult};

use crate::adts::{ADTS_HEADER_SIZE, AdtsHeader, SyncScan, scan_sync};
use crate::asc::AudioSpecificConfig;
use crate::engine::{DecodeEngine, DownmixPolicy, EngineConfig, FrameInfo, StreamInfo};

/// 无错误
pub const ERR_NONE: u8 = 0;
/// 引擎尚未初始化
pub const ERR_NOT_INITIALIZED: u8 = 1;
/// 当前位置不是 ADTS 同步字
pub const ERR_LOST_SYNC: u8 = 2;
/// 输入不足一个完整帧
pub const ERR_INCOMPLETE_FRAME: u8 = 3;
/// symphonia 解码失败
pub const ERR_DECODE_FAILED: u8 = 4;

/// 输入的帧封装方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Adts,
    Raw,
}

/// symphonia AAC 解码引擎
pub struct SymphoniaAacEngine {
    decoder: Option<SymAacDecoder>,
    framing: Framing,
    config: EngineConfig,
    /// 复用的交错转换缓冲
    sample_buf: Option<SampleBuffer<i32>>,
    /// 最近一次解码的输出 (已按位深右移)
    samples: Vec<i32>,
}

impl SymphoniaAacEngine {
    pub fn new() -> Self {
        Self {
            decoder: None,
            framing: Framing::Raw,
            config: EngineConfig::default(),
            sample_buf: None,
            samples: Vec::new(),
        }
    }

    /// 工厂函数
    pub fn create() -> FeedResult<Box<dyn DecodeEngine>> {
        Ok(Box::new(Self::new()))
    }

    fn open_decoder(
        &mut self,
        extra_data: &[u8],
        asc: &AudioSpecificConfig,
        framing: Framing,
    ) -> FeedResult<()> {
        let params = SymCodecParameters {
            codec: CODEC_TYPE_AAC,
            sample_rate: Some(asc.sample_rate),
            extra_data: Some(extra_data.to_vec().into_boxed_slice()),
            ..Default::default()
        };
        let decoder = SymAacDecoder::try_new(&params, &SymDecoderOptions::default())
            .map_err(|e| FeedError::Codec(format!("symphonia AAC 解码器初始化失败: {e}")))?;

        self.decoder = Some(decoder);
        self.framing = framing;
        self.sample_buf = None;
        self.samples.clear();
        debug!(
            "symphonia AAC 引擎已初始化: object_type={}, {}Hz, 声道配置={}",
            asc.object_type, asc.sample_rate, asc.channel_configuration,
        );
        Ok(())
    }

    fn failed(error: u8, bytes_consumed: usize) -> FrameInfo {
        FrameInfo {
            bytes_consumed,
            error,
            ..Default::default()
        }
    }
}

impl Default for SymphoniaAacEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeEngine for SymphoniaAacEngine {
    fn name(&self) -> &str {
        "symphonia-aac"
    }

    fn configure(&mut self, config: &EngineConfig) -> FeedResult<()> {
        if config.downmix == DownmixPolicy::None {
            debug!("symphonia 仅支持单声道与立体声, 下混策略被忽略");
        }
        self.config = *config;
        Ok(())
    }

    fn init_from_bitstream(&mut self, data: &[u8]) -> FeedResult<StreamInfo> {
        if data.len() < ADTS_HEADER_SIZE {
            return Err(FeedError::NeedMoreData);
        }
        let header = AdtsHeader::parse(data)
            .ok_or_else(|| FeedError::InvalidData("无效的 ADTS 帧头".into()))?;
        let asc = header.audio_specific_config();
        self.open_decoder(&asc.to_bytes(), &asc, Framing::Adts)?;

        Ok(StreamInfo {
            sample_rate: asc.sample_rate,
            channels: header.channels(),
            bytes_consumed: 0,
        })
    }

    fn init_from_config(&mut self, config: &[u8]) -> FeedResult<StreamInfo> {
        let asc = AudioSpecificConfig::parse(config)?;
        self.open_decoder(config, &asc, Framing::Raw)?;

        Ok(StreamInfo {
            sample_rate: asc.sample_rate,
            channels: asc.channel_configuration,
            bytes_consumed: 0,
        })
    }

    fn decode(&mut self, data: &[u8]) -> FrameInfo {
        let Self {
            decoder,
            framing,
            config,
            sample_buf,
            samples,
        } = self;
        samples.clear();

        let Some(decoder) = decoder.as_mut() else {
            return Self::failed(ERR_NOT_INITIALIZED, 0);
        };

        let (payload, consumed) = match framing {
            Framing::Raw => (data, data.len()),
            Framing::Adts => {
                if data.len() < ADTS_HEADER_SIZE {
                    return Self::failed(ERR_INCOMPLETE_FRAME, 0);
                }
                match AdtsHeader::parse(data) {
                    Some(header) => {
                        let frame_length = usize::from(header.frame_length);
                        if data.len() < frame_length {
                            return Self::failed(ERR_INCOMPLETE_FRAME, 0);
                        }
                        (&data[header.payload_range()], frame_length)
                    }
                    None => {
                        // 跳到下一个候选同步字
                        let skip = match scan_sync(&data[1..]) {
                            SyncScan::Found(offset) => offset + 1,
                            SyncScan::Missing { discard } => discard + 1,
                        };
                        return Self::failed(ERR_LOST_SYNC, skip);
                    }
                }
            }
        };

        let packet = SymPacket::new_from_slice(0, 0, 0, payload);
        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channels = spec.channels.count();
                let needed = decoded.frames() * channels;
                if sample_buf.as_ref().is_none_or(|buf| buf.capacity() < needed) {
                    *sample_buf = Some(SampleBuffer::<i32>::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    let shift = 32 - config.output_bit_depth.bits();
                    samples.extend(buf.samples().iter().map(|&s| s >> shift));
                }
                FrameInfo {
                    samples: samples.len(),
                    channels: u8::try_from(channels).unwrap_or(u8::MAX),
                    bytes_consumed: consumed,
                    error: ERR_NONE,
                }
            }
            Err(e) => {
                warn!("symphonia AAC 解码失败: {e}");
                Self::failed(ERR_DECODE_FAILED, consumed)
            }
        }
    }

    fn samples(&self) -> &[i32] {
        &self.samples
    }

    fn error_message(&self, code: u8) -> &'static str {
        match code {
            ERR_NONE => "无错误",
            ERR_NOT_INITIALIZED => "引擎未初始化",
            ERR_LOST_SYNC => "ADTS 同步丢失",
            ERR_INCOMPLETE_FRAME => "帧数据不完整",
            ERR_DECODE_FAILED => "访问单元解码失败",
            _ => "未知错误",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lc_header(len: u16) -> [u8; 7] {
        [
            0xFF,
            0xF1,
            0x50,
            0x80 | ((len >> 11) as u8 & 0x03),
            (len >> 3) as u8,
            ((len & 0x07) as u8) << 5 | 0x1F,
            0xFC,
        ]
    }

    #[test]
    fn test_从配置初始化() {
        let mut engine = SymphoniaAacEngine::new();
        engine.configure(&EngineConfig::default()).unwrap();
        let info = engine.init_from_config(&[0x12, 0x10]).unwrap();
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.channels, 2);
        assert_eq!(info.bytes_consumed, 0);
    }

    #[test]
    fn test_从码流初始化() {
        let mut engine = SymphoniaAacEngine::new();
        let mut data = lc_header(64).to_vec();
        data.resize(64, 0);
        let info = engine.init_from_bitstream(&data).unwrap();
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.channels, 2);

        assert!(matches!(
            engine.init_from_bitstream(&data[..4]),
            Err(FeedError::NeedMoreData)
        ));
        assert!(matches!(
            engine.init_from_bitstream(&[0u8; 16]),
            Err(FeedError::InvalidData(_))
        ));
    }

    #[test]
    fn test_未初始化时解码报错() {
        let mut engine = SymphoniaAacEngine::new();
        let info = engine.decode(&[0u8; 32]);
        assert_eq!(info.error, ERR_NOT_INITIALIZED);
        assert_eq!(info.bytes_consumed, 0);
        assert!(engine.samples().is_empty());
    }

    #[test]
    fn test_失步时跳到下一个同步字() {
        let mut engine = SymphoniaAacEngine::new();
        engine.init_from_bitstream(&lc_header(64)).unwrap();

        let mut data = vec![0x00, 0x11, 0x22];
        data.extend_from_slice(&lc_header(64));
        let info = engine.decode(&data);
        assert_eq!(info.error, ERR_LOST_SYNC);
        assert_eq!(info.bytes_consumed, 3);
    }

    #[test]
    fn test_不完整帧不消耗() {
        let mut engine = SymphoniaAacEngine::new();
        engine.init_from_bitstream(&lc_header(64)).unwrap();

        let info = engine.decode(&lc_header(64));
        assert_eq!(info.error, ERR_INCOMPLETE_FRAME);
        assert_eq!(info.bytes_consumed, 0);
        assert_eq!(engine.error_message(info.error), "帧数据不完整");
    }
}
