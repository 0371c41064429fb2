//! 单个流的解码上下文.
//!
//! 打开流时创建, 关闭或重新打开时整体丢弃. 持有引擎实例, 容器游标,
//! 采样计数, 下一个块边界的索引, 以及 MP4 头部解析得到的块表与采样大小.

use log::{debug, info, warn};

use aacfeed_codec::adts::{SyncScan, scan_sync};
use aacfeed_codec::{DecodeEngine, FrameInfo, StreamInfo};
use aacfeed_core::{FeedError, FeedResult, InputStream};
use aacfeed_format::{
    ChunkTable, ContainerCursor, ContainerKind, Mp4HeaderParser, Mp4Stream, ParseStatus,
    SampleSizes,
};

/// 组装交给引擎的输入
///
/// - `bound` 为当前访问单元大小: 未完整缓冲时返回 `None`, 否则恰好返回该访问单元
/// - 无 `bound` 时: 连续区不足 `window` 而总量超过 `window`, 拼接出 `window` 字节;
///   否则直接返回连续区
fn assemble_input<'a, I: InputStream + ?Sized>(
    input: &'a I,
    scratch: &'a mut Vec<u8>,
    window: usize,
    bound: Option<usize>,
) -> FeedResult<Option<&'a [u8]>> {
    let (head, tail) = input.readable();
    let used = head.len() + tail.len();

    let len = match bound {
        Some(unit) if used < unit => return Ok(None),
        Some(unit) if head.len() >= unit => return Ok(Some(&head[..unit])),
        Some(unit) => unit,
        None if head.len() < window && used > window => window,
        None => return Ok(Some(head)),
    };

    scratch.clear();
    scratch.try_reserve(len)?;
    scratch.extend_from_slice(head);
    scratch.extend_from_slice(&tail[..len - head.len()]);
    Ok(Some(&scratch[..]))
}

/// 解码上下文
pub struct DecoderContext {
    engine: Box<dyn DecodeEngine>,
    kind: ContainerKind,
    cursor: ContainerCursor,
    parser: Mp4HeaderParser,
    /// 下一次解码的采样序号 (从 1 开始)
    sample: u32,
    /// 下一个块边界在块表中的索引
    next_chunk: usize,
    chunk_table: Option<ChunkTable>,
    sample_sizes: Option<SampleSizes>,
    stream_info: Option<StreamInfo>,
}

impl DecoderContext {
    pub fn new(engine: Box<dyn DecodeEngine>, kind: ContainerKind) -> Self {
        Self {
            engine,
            kind,
            cursor: ContainerCursor::new(),
            parser: Mp4HeaderParser::new(),
            sample: 0,
            next_chunk: 0,
            chunk_table: None,
            sample_sizes: None,
            stream_info: None,
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn cursor(&self) -> &ContainerCursor {
        &self.cursor
    }

    pub fn stream_info(&self) -> Option<StreamInfo> {
        self.stream_info
    }

    pub fn chunk_table(&self) -> Option<&ChunkTable> {
        self.chunk_table.as_ref()
    }

    pub fn engine(&self) -> &dyn DecodeEngine {
        self.engine.as_ref()
    }

    pub(crate) fn engine_mut(&mut self) -> &mut dyn DecodeEngine {
        self.engine.as_mut()
    }

    /// 消耗待跳过字节; 有待跳过字节时返回 true, 本轮不再做其他处理
    pub(crate) fn consume_pending<I: InputStream + ?Sized>(&mut self, input: &mut I) -> bool {
        if !self.cursor.has_pending() {
            return false;
        }
        let n = self.cursor.consume_pending(input);
        debug!("消耗待跳过字节 {n}, 剩余 {}", self.cursor.pending_skip());
        true
    }

    /// 头部探测, 完成时返回流信息
    pub(crate) fn detect_header<I: InputStream + ?Sized>(
        &mut self,
        input: &mut I,
        scratch: &mut Vec<u8>,
        window: usize,
    ) -> FeedResult<Option<StreamInfo>> {
        let info = match self.kind {
            ContainerKind::Adts => self.detect_adts(input, scratch, window)?,
            ContainerKind::Mp4 => {
                match self.parser.parse(input, &mut self.cursor, self.engine.as_mut())? {
                    ParseStatus::NeedMoreData => None,
                    ParseStatus::Complete(stream) => Some(self.begin_mp4(stream)),
                }
            }
        };
        if let Some(info) = info {
            info!(
                "{} 流头部解析完成: {}Hz, {} 声道",
                self.kind, info.sample_rate, info.channels
            );
            self.stream_info = Some(info);
        }
        Ok(info)
    }

    fn detect_adts<I: InputStream + ?Sized>(
        &mut self,
        input: &mut I,
        scratch: &mut Vec<u8>,
        window: usize,
    ) -> FeedResult<Option<StreamInfo>> {
        let (skip, init) = {
            let Some(data) = assemble_input(&*input, scratch, window, None)? else {
                return Ok(None);
            };
            if data.len() < 2 {
                return Ok(None);
            }
            match scan_sync(data) {
                SyncScan::Missing { discard } => (discard, None),
                SyncScan::Found(offset) => {
                    let frame = &data[offset..];
                    let init = self.engine.init_from_bitstream(frame).map(|info| StreamInfo {
                        bytes_consumed: info.bytes_consumed.min(frame.len()),
                        ..info
                    });
                    (offset, Some(init))
                }
            }
        };

        if skip > 0 {
            debug!("跳过 {skip} 字节, 查找 ADTS 同步字");
            self.cursor.consume(input, skip);
        }

        match init {
            None => Ok(None),
            Some(Err(e)) if e.is_transient() => Ok(None),
            Some(Err(e)) => Err(e),
            Some(Ok(info)) => {
                self.cursor.consume(input, info.bytes_consumed);
                Ok(Some(info))
            }
        }
    }

    fn begin_mp4(&mut self, stream: Mp4Stream) -> StreamInfo {
        self.chunk_table = stream.chunk_table;
        self.sample_sizes = stream.sample_sizes;
        self.sample = 1;
        self.next_chunk = 1;
        stream.info
    }

    /// 当前访问单元的大小 (仅 MP4 且有 stsz 时已知)
    fn access_unit_size(&self) -> Option<usize> {
        let index = self.sample.checked_sub(1)?;
        self.sample_sizes
            .as_ref()?
            .size_of(index)
            .filter(|&size| size > 0)
            .map(|size| size as usize)
    }

    /// 解码一帧并推进输入
    ///
    /// 返回本次产出的帧信息; 输入为空或访问单元尚未完整缓冲时返回 `None`.
    /// 返回错误表示流无法继续.
    pub(crate) fn decode_step<I: InputStream + ?Sized>(
        &mut self,
        input: &mut I,
        scratch: &mut Vec<u8>,
        window: usize,
    ) -> FeedResult<Option<FrameInfo>> {
        if input.used() == 0 {
            return Ok(None);
        }

        let bound = self.access_unit_size();
        let (frame, offered) = {
            let Some(data) = assemble_input(&*input, scratch, window, bound)? else {
                return Ok(None);
            };
            (self.engine.decode(data), data.len())
        };

        if frame.error != 0 {
            warn!(
                "解码错误 {}: {}",
                frame.error,
                self.engine.error_message(frame.error)
            );
        }

        self.reconcile(input, &frame, offered)?;
        Ok(Some(frame))
    }

    /// 对齐块边界或按引擎消耗量推进
    fn reconcile<I: InputStream + ?Sized>(
        &mut self,
        input: &mut I,
        frame: &FrameInfo,
        offered: usize,
    ) -> FeedResult<()> {
        let current = self.sample;
        self.sample = self.sample.wrapping_add(1);

        let boundary = self
            .chunk_table
            .as_ref()
            .and_then(|table| table.boundary(self.next_chunk))
            .copied();

        match boundary {
            Some(entry) if entry.first_sample == current => {
                let target = u64::from(entry.offset);
                let position = self.cursor.position();
                if target <= position {
                    return Err(FeedError::InvalidData(format!(
                        "块 {} 位于 {target}, 当前位置 {position}, 需要向后跳转",
                        self.next_chunk
                    )));
                }
                let skip = target - position;
                if skip != frame.bytes_consumed as u64 {
                    debug!(
                        "跳到下一个块: 位置 {position}, 消耗 {} != 跳过 {skip}",
                        frame.bytes_consumed
                    );
                }
                self.cursor.skip(input, skip);
                self.next_chunk += 1;
            }
            _ if frame.bytes_consumed > 0 => {
                self.cursor.consume(input, frame.bytes_consumed.min(offered));
            }
            _ => {
                return Err(FeedError::InvalidData(
                    "解码引擎未消耗任何输入, 无法继续".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aacfeed_core::RingBuffer;

    fn wrapped_ring(capacity: usize, prefill: usize, data: &[u8]) -> RingBuffer {
        let mut ring = RingBuffer::new(capacity).unwrap();
        ring.write_from(&vec![0u8; prefill]);
        let mut sink = vec![0u8; prefill];
        ring.read_into(&mut sink);
        ring.write_from(data);
        ring
    }

    #[test]
    fn test_连续区直接使用() {
        let ring = wrapped_ring(64, 0, &[1, 2, 3, 4]);
        let mut scratch = Vec::new();
        let data = assemble_input(&ring, &mut scratch, 8, None).unwrap().unwrap();
        assert_eq!(data, &[1, 2, 3, 4]);
        assert!(scratch.is_empty());
    }

    #[test]
    fn test_回绕处拼接窗口() {
        // 连续区 4 字节, 总量 12 字节, 窗口 8 字节
        let data: Vec<u8> = (1..=12).collect();
        let ring = wrapped_ring(16, 12, &data);
        assert_eq!(ring.cont_read(), 4);
        let mut scratch = Vec::new();
        let window = assemble_input(&ring, &mut scratch, 8, None).unwrap().unwrap();
        assert_eq!(window, &data[..8]);
    }

    #[test]
    fn test_总量不足窗口时不拼接() {
        let data: Vec<u8> = (1..=6).collect();
        let ring = wrapped_ring(16, 12, &data);
        let mut scratch = Vec::new();
        let window = assemble_input(&ring, &mut scratch, 8, None).unwrap().unwrap();
        assert_eq!(window, &data[..4]);
    }

    #[test]
    fn test_按访问单元截取() {
        let data: Vec<u8> = (1..=12).collect();
        let ring = wrapped_ring(16, 12, &data);
        let mut scratch = Vec::new();

        let unit = assemble_input(&ring, &mut scratch, 8, Some(3)).unwrap().unwrap();
        assert_eq!(unit, &[1, 2, 3]);
        let unit = assemble_input(&ring, &mut scratch, 8, Some(10)).unwrap().unwrap();
        assert_eq!(unit, &data[..10]);
        assert!(assemble_input(&ring, &mut scratch, 8, Some(13)).unwrap().is_none());
    }
}
