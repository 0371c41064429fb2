//! ADTS 同步字扫描与帧头解析.
//!
//! # ADTS 帧结构 (7 或 9 字节头部)
//! ```text
//! 固定头部 (28 bits):
//!   sync word (12 bits = 0xFFF)
//!   ID (1 bit): 0=MPEG-4, 1=MPEG-2
//!   layer (2 bits): always 0
//!   protection_absent (1 bit): 1=no CRC, 0=CRC present
//!   profile (2 bits): 0=Main, 1=LC, 2=SSR, 3=LTP
//!   sampling_frequency_index (4 bits)
//!   private_bit (1 bit)
//!   channel_configuration (3 bits)
//!   ...
//! 可变头部 (28 bits):
//!   frame_length (13 bits): 含头部的完整帧大小
//!   adts_buffer_fullness (11 bits)
//!   number_of_raw_data_blocks (2 bits)
//! [CRC (16 bits)] 仅当 protection_absent=0
//! ```

use crate::asc::{AudioSpecificConfig, sample_rate_from_index};

/// ADTS 固定头部长度 (无 CRC)
pub const ADTS_HEADER_SIZE: usize = 7;

/// 同步字判定: 12 位 0xFFF 且 layer 为 0
pub fn is_sync(b0: u8, b1: u8) -> bool {
    b0 == 0xFF && (b1 & 0xF6) == 0xF0
}

/// 同步字扫描结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncScan {
    /// 同步字位于给定偏移
    Found(usize),
    /// 未找到, 前 `discard` 字节可以丢弃 (保留最后一个字节, 它可能是同步字的前半)
    Missing { discard: usize },
}

/// 在连续数据中查找第一个 ADTS 同步字, 容忍任意数量的前导垃圾字节
pub fn scan_sync(data: &[u8]) -> SyncScan {
    match data.windows(2).position(|w| is_sync(w[0], w[1])) {
        Some(offset) => SyncScan::Found(offset),
        None => SyncScan::Missing {
            discard: data.len().saturating_sub(1),
        },
    }
}

/// ADTS 帧头部信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdtsHeader {
    /// AAC Profile (0=Main, 1=LC, 2=SSR, 3=LTP)
    pub profile: u8,
    /// 采样率索引
    pub sampling_frequency_index: u8,
    /// 声道配置
    pub channel_configuration: u8,
    /// 帧总大小 (含头部)
    pub frame_length: u16,
    /// 头部大小 (7 或 9 字节)
    pub header_size: u8,
}

impl AdtsHeader {
    /// 从至少 7 字节的数据中解析 ADTS 帧头部
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < ADTS_HEADER_SIZE || !is_sync(data[0], data[1]) {
            return None;
        }

        let protection_absent = (data[1] & 0x01) != 0;
        let profile = (data[2] >> 6) & 0x03;
        let sampling_frequency_index = (data[2] >> 2) & 0x0F;
        let channel_configuration = ((data[2] & 0x01) << 2) | ((data[3] >> 6) & 0x03);

        // frame_length (13 bits): data[3]的低2位 + data[4]全部 + data[5]的高3位
        let frame_length =
            (u16::from(data[3] & 0x03) << 11) | (u16::from(data[4]) << 3) | (u16::from(data[5]) >> 5);

        if sampling_frequency_index >= 13 {
            return None;
        }

        let header_size = if protection_absent { 7 } else { 9 };
        if frame_length < u16::from(header_size) {
            return None;
        }

        Some(Self {
            profile,
            sampling_frequency_index,
            channel_configuration,
            frame_length,
            header_size,
        })
    }

    /// 采样率 (Hz)
    pub fn sample_rate(&self) -> u32 {
        sample_rate_from_index(self.sampling_frequency_index).unwrap_or(0)
    }

    /// 声道数 (配置 7 对应 7.1 共 8 声道)
    pub fn channels(&self) -> u8 {
        match self.channel_configuration {
            7 => 8,
            n => n,
        }
    }

    /// 帧载荷 (去掉头部与 CRC) 在帧内的字节范围
    pub fn payload_range(&self) -> std::ops::Range<usize> {
        usize::from(self.header_size)..usize::from(self.frame_length)
    }

    /// 等价的 AudioSpecificConfig
    pub fn audio_specific_config(&self) -> AudioSpecificConfig {
        AudioSpecificConfig {
            object_type: self.profile + 1,
            sampling_frequency_index: self.sampling_frequency_index,
            sample_rate: self.sample_rate(),
            channel_configuration: self.channel_configuration,
        }
    }
}
