//! 解码输出到播放缓冲区格式的转换.
//!
//! 播放缓冲区固定为交错 S32 立体声 (本机字节序). 引擎输出的有效位
//! (默认 24 位) 在写入前左移扩展为满幅 32 位:
//! - 单声道: 复制到左右两个声道
//! - 立体声: 原样透传
//! - 其他声道数: 不支持, 由调用方记录并丢弃本次输出

use aacfeed_core::{FeedError, FeedResult, OutputStream};

use crate::engine::OutputBitDepth;

/// 输出声道数
pub const OUTPUT_CHANNELS: usize = 2;
/// 输出单个采样的字节数
pub const BYTES_PER_SAMPLE: usize = 4;
/// 输出单帧 (所有声道) 的字节数
pub const BYTES_PER_FRAME: usize = OUTPUT_CHANNELS * BYTES_PER_SAMPLE;
/// 24 位引擎输出扩展到 32 位的左移量
pub const SAMPLE_SHIFT: u32 = 8;

/// 有效位数对应的左移量
pub fn widen_shift(depth: OutputBitDepth) -> u32 {
    32 - depth.bits()
}

/// 输入声道到输出立体声的映射
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMapping {
    /// 单声道复制到两个声道
    Duplicate,
    /// 立体声透传
    Passthrough,
}

impl ChannelMapping {
    /// 根据引擎输出声道数选择映射
    pub fn for_channels(channels: u8) -> FeedResult<Self> {
        match channels {
            1 => Ok(Self::Duplicate),
            2 => Ok(Self::Passthrough),
            n => Err(FeedError::Unsupported(format!("不支持的声道数: {n}"))),
        }
    }

    /// 每帧输入采样数
    pub const fn input_channels(&self) -> usize {
        match self {
            Self::Duplicate => 1,
            Self::Passthrough => 2,
        }
    }
}

/// 单次写入的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmWrite {
    /// 已写入的帧数
    pub written: usize,
    /// 因输出无空间而丢弃的帧数
    pub dropped: usize,
}

#[inline]
fn widen(sample: i32, shift: u32) -> [u8; BYTES_PER_SAMPLE] {
    (sample << shift).to_ne_bytes()
}

/// 将 `samples` 转换写入 `out`, 返回转换的帧数
///
/// 转换帧数取输入帧数与 `out` 可容纳帧数中的较小者.
pub fn convert_frames(
    samples: &[i32],
    mapping: ChannelMapping,
    shift: u32,
    out: &mut [u8],
) -> usize {
    let in_ch = mapping.input_channels();
    let frames = (samples.len() / in_ch).min(out.len() / BYTES_PER_FRAME);

    let dst_frames = out.chunks_exact_mut(BYTES_PER_FRAME).take(frames);
    let src_frames = samples.chunks_exact(in_ch);
    for (dst, src) in dst_frames.zip(src_frames) {
        let (left, right) = match mapping {
            ChannelMapping::Duplicate => (src[0], src[0]),
            ChannelMapping::Passthrough => (src[0], src[1]),
        };
        dst[..BYTES_PER_SAMPLE].copy_from_slice(&widen(left, shift));
        dst[BYTES_PER_SAMPLE..].copy_from_slice(&widen(right, shift));
    }
    frames
}

/// 将交错采样写入输出缓冲区
///
/// 每次最多写入输出端当前连续可写空间, 循环直到全部帧写完.
/// 输出端完全没有空间时停止, 剩余帧计入 `dropped`.
pub fn write_interleaved<O: OutputStream + ?Sized>(
    output: &mut O,
    samples: &[i32],
    channels: u8,
    shift: u32,
) -> FeedResult<PcmWrite> {
    let mapping = ChannelMapping::for_channels(channels)?;
    let in_ch = mapping.input_channels();
    let total = samples.len() / in_ch;

    let mut written = 0;
    while written < total {
        let room = output.cont_write() / BYTES_PER_FRAME;
        if room == 0 {
            break;
        }
        let frames = room.min(total - written);
        let src = &samples[written * in_ch..(written + frames) * in_ch];
        let dst = &mut output.writable()[..frames * BYTES_PER_FRAME];
        let converted = convert_frames(src, mapping, shift, dst);
        output.advance_write(converted * BYTES_PER_FRAME);
        written += converted;
    }

    Ok(PcmWrite {
        written,
        dropped: total - written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aacfeed_core::{PlaybackBuffer, RingBuffer};

    fn drain_samples(out: &mut PlaybackBuffer) -> Vec<i32> {
        let ring: &mut RingBuffer = out.ring_mut();
        let mut bytes = vec![0u8; 4096];
        let n = ring.read_into(&mut bytes);
        bytes[..n]
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|c| i32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_单声道复制到双声道() {
        let mut out = PlaybackBuffer::new(64).unwrap();
        let res = write_interleaved(&mut out, &[100, -3], 1, SAMPLE_SHIFT).unwrap();
        assert_eq!(res, PcmWrite { written: 2, dropped: 0 });
        assert_eq!(drain_samples(&mut out), vec![100 << 8, 100 << 8, -3 << 8, -3 << 8]);
    }

    #[test]
    fn test_立体声透传() {
        let mut out = PlaybackBuffer::new(64).unwrap();
        let res = write_interleaved(&mut out, &[1, 2, 3, 4], 2, SAMPLE_SHIFT).unwrap();
        assert_eq!(res.written, 2);
        assert_eq!(drain_samples(&mut out), vec![1 << 8, 2 << 8, 3 << 8, 4 << 8]);
    }

    #[test]
    fn test_六声道不写入() {
        let mut out = PlaybackBuffer::new(64).unwrap();
        let res = write_interleaved(&mut out, &[0; 12], 6, SAMPLE_SHIFT);
        assert!(matches!(res, Err(FeedError::Unsupported(_))));
        assert!(out.ring().is_empty());
    }

    #[test]
    fn test_跨回绕点分段写入() {
        // 容量 4 帧, 先占用 3 帧再读走, 写游标停在第 3 帧处
        let mut out = PlaybackBuffer::new(4 * BYTES_PER_FRAME).unwrap();
        out.advance_write(3 * BYTES_PER_FRAME);
        let mut sink = [0u8; 3 * BYTES_PER_FRAME];
        out.ring_mut().read_into(&mut sink);

        let res = write_interleaved(&mut out, &[1, 2, 3, 4, 5, 6], 2, SAMPLE_SHIFT).unwrap();
        assert_eq!(res, PcmWrite { written: 3, dropped: 0 });
        assert_eq!(
            drain_samples(&mut out),
            vec![1 << 8, 2 << 8, 3 << 8, 4 << 8, 5 << 8, 6 << 8]
        );
    }

    #[test]
    fn test_位深决定左移量() {
        assert_eq!(widen_shift(OutputBitDepth::Bits24), SAMPLE_SHIFT);
        assert_eq!(widen_shift(OutputBitDepth::Bits16), 16);
        assert_eq!(widen_shift(OutputBitDepth::Bits32), 0);
    }

    #[test]
    fn test_输出已满时丢弃剩余帧() {
        let mut out = PlaybackBuffer::new(BYTES_PER_FRAME).unwrap();
        let res = write_interleaved(&mut out, &[7, 8, 9], 1, SAMPLE_SHIFT).unwrap();
        assert_eq!(res, PcmWrite { written: 1, dropped: 2 });
    }
}
