//! 增量 MP4 头部解析器.
//!
//! 每次调用从输入缓冲区当前读位置开始, 尽可能多地解析完整的 box, 直到:
//! - 数据不足: 返回 [`ParseStatus::NeedMoreData`], 下一轮从同一位置继续
//! - 遇到 mdat 且已选定可播放轨道: 返回 [`ParseStatus::Complete`]
//! - 格式错误或 mdat 之前没有可播放轨道: 返回错误
//!
//! 轨道选择: 自最近一个 moov 起对 trak 计数, 第一个 esds 成功初始化引擎的轨道
//! 被选中, 之后只接受该轨道的 stco/stsz.

use log::{debug, info, warn};

use aacfeed_codec::{DecodeEngine, StreamInfo};
use aacfeed_core::{FeedError, FeedResult, InputStream};

use super::boxes::{BoxHeader, BoxType, LARGE_BOX_HEADER_SIZE};
use super::chunk_table::{ChunkTable, SampleSizes, SampleToChunk, parse_stsc};
use super::descriptor::extract_decoder_config;

/// 容器字节位置与待跳过字节数
///
/// 待跳过字节会在后续 tick 中优先于其他处理被消耗.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerCursor {
    position: u64,
    pending_skip: u64,
}

impl ContainerCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已消耗的容器字节数
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn pending_skip(&self) -> u64 {
        self.pending_skip
    }

    pub fn has_pending(&self) -> bool {
        self.pending_skip > 0
    }

    /// 消耗输入 `n` 字节, 调用方保证这些字节已在缓冲区中
    pub fn consume<I: InputStream + ?Sized>(&mut self, input: &mut I, n: usize) {
        input.advance_read(n);
        self.position += n as u64;
    }

    /// 向前跳过 `n` 字节: 已全部缓冲则立即消耗, 否则记为待跳过
    pub fn skip<I: InputStream + ?Sized>(&mut self, input: &mut I, n: u64) {
        match usize::try_from(n) {
            Ok(n) if n <= input.used() => self.consume(input, n),
            _ => self.pending_skip = n,
        }
    }

    /// 记录尚未到达的待跳过字节
    pub fn defer(&mut self, n: u64) {
        self.pending_skip = n;
    }

    /// 消耗当前连续可读部分中的待跳过字节, 返回本次消耗量
    pub fn consume_pending<I: InputStream + ?Sized>(&mut self, input: &mut I) -> usize {
        let n = usize::try_from(self.pending_skip)
            .unwrap_or(usize::MAX)
            .min(input.cont_read());
        self.consume(input, n);
        self.pending_skip -= n as u64;
        n
    }
}

/// 头部解析完成后交给驱动器的流信息
#[derive(Debug)]
pub struct Mp4Stream {
    /// 引擎初始化结果
    pub info: StreamInfo,
    /// 选中轨道的块表 (缺少 stco 时为空)
    pub chunk_table: Option<ChunkTable>,
    /// 选中轨道的采样大小 (缺少 stsz 时为空)
    pub sample_sizes: Option<SampleSizes>,
}

/// 单次解析调用的结果
#[derive(Debug)]
pub enum ParseStatus {
    /// 数据不足, 稍后重试
    NeedMoreData,
    /// 已到达 mdat 的第一个块
    Complete(Mp4Stream),
}

/// 增量 MP4 头部解析器
#[derive(Debug, Default)]
pub struct Mp4HeaderParser {
    /// 自最近一个 moov 起遇到的 trak 数
    track_count: u32,
    /// 选中的可播放轨道 (从 1 开始)
    chosen_track: Option<u32>,
    stream_info: Option<StreamInfo>,
    /// 等待 stco 的 stsc 段
    stsc_runs: Option<Vec<SampleToChunk>>,
    chunk_table: Option<ChunkTable>,
    sample_sizes: Option<SampleSizes>,
}

/// 复制缓冲区开头至多 16 字节 (可跨越回绕点)
fn peek_header<I: InputStream + ?Sized>(input: &I) -> ([u8; LARGE_BOX_HEADER_SIZE], usize) {
    let mut buf = [0u8; LARGE_BOX_HEADER_SIZE];
    let (head, tail) = input.readable();
    let n = head.len().min(LARGE_BOX_HEADER_SIZE);
    buf[..n].copy_from_slice(&head[..n]);
    let m = tail.len().min(LARGE_BOX_HEADER_SIZE - n);
    buf[n..n + m].copy_from_slice(&tail[..m]);
    (buf, n + m)
}

impl Mp4HeaderParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前选中的轨道
    pub fn chosen_track(&self) -> Option<u32> {
        self.chosen_track
    }

    /// 推进解析
    pub fn parse<I: InputStream + ?Sized>(
        &mut self,
        input: &mut I,
        cursor: &mut ContainerCursor,
        engine: &mut dyn DecodeEngine,
    ) -> FeedResult<ParseStatus> {
        loop {
            let (buf, len) = peek_header(input);
            let Some(header) = BoxHeader::parse(&buf[..len])? else {
                return Ok(ParseStatus::NeedMoreData);
            };
            let box_type = header.box_type;

            match box_type {
                BoxType::Mdat => return self.enter_mdat(input, cursor, &header),
                _ if header.size == 0 => {
                    return Err(FeedError::Format(format!(
                        "{box_type} box 长度为 0, 无法在流中定位其结尾"
                    )));
                }
                BoxType::Moov => *self = Self::default(),
                BoxType::Trak => {
                    self.track_count += 1;
                    self.stsc_runs = None;
                }
                _ => {}
            }

            let available = input.used() as u64;
            let capacity = input.capacity() as u64;

            if box_type.needs_full_box() && header.size > capacity {
                return Err(FeedError::Format(format!(
                    "{box_type} box 长度 {} 超出输入缓冲区容量 {capacity}",
                    header.size
                )));
            }

            let buffered = box_type.needs_full_box()
                || (box_type == BoxType::Stsz && header.size <= capacity);
            if box_type == BoxType::Stsz && !buffered {
                warn!(
                    "stsz box 长度 {} 超出输入缓冲区容量 {capacity}, 不使用采样大小表",
                    header.size
                );
            }

            if buffered {
                if available < header.size {
                    return Ok(ParseStatus::NeedMoreData);
                }
                let size = usize::try_from(header.size)
                    .map_err(|_| FeedError::Format(format!("{box_type} box 过大")))?;
                self.parse_buffered_box(input, &header, size, engine)?;
                debug!("box {box_type}: 长度 {size}, 已解析");
                cursor.consume(input, size);
                continue;
            }

            let consume = header.consume_len();
            if available >= consume {
                debug!("box {box_type}: 长度 {}, 消耗 {consume}", header.size);
                cursor.consume(input, consume as usize);
                continue;
            }

            debug!(
                "box {box_type}: 长度 {}, 部分消耗 {available}, 待跳过 {}",
                header.size,
                consume - available
            );
            cursor.consume(input, available as usize);
            cursor.defer(consume - available);
            return Ok(ParseStatus::NeedMoreData);
        }
    }

    /// 解析已完整缓冲的 box, 跨越回绕点时先拼接
    fn parse_buffered_box<I: InputStream + ?Sized>(
        &mut self,
        input: &I,
        header: &BoxHeader,
        size: usize,
        engine: &mut dyn DecodeEngine,
    ) -> FeedResult<()> {
        let (head, tail) = input.readable();
        if head.len() >= size {
            return self.parse_box_body(header.box_type, &head[header.header_size..size], engine);
        }

        let mut joined = Vec::new();
        joined.try_reserve_exact(size)?;
        joined.extend_from_slice(head);
        joined.extend_from_slice(&tail[..size - head.len()]);
        self.parse_box_body(header.box_type, &joined[header.header_size..], engine)
    }

    fn is_chosen_track_open(&self) -> bool {
        self.chosen_track == Some(self.track_count)
    }

    fn parse_box_body(
        &mut self,
        box_type: BoxType,
        body: &[u8],
        engine: &mut dyn DecodeEngine,
    ) -> FeedResult<()> {
        match box_type {
            BoxType::Esds => {
                let config = extract_decoder_config(body)?;
                if let Some(chosen) = self.chosen_track {
                    debug!("已选定轨道 {chosen}, 忽略轨道 {} 的 esds", self.track_count);
                    return Ok(());
                }
                match engine.init_from_config(config) {
                    Ok(info) => {
                        info!(
                            "可播放的 AAC 轨道: {}, {}Hz, {} 声道",
                            self.track_count, info.sample_rate, info.channels
                        );
                        self.chosen_track = Some(self.track_count);
                        self.stream_info = Some(info);
                    }
                    Err(e) => warn!("轨道 {} 的解码配置无法初始化引擎: {e}", self.track_count),
                }
            }
            BoxType::Stsc => {
                let runs = parse_stsc(body)?;
                match self.chunk_table.as_mut() {
                    Some(table) if self.chosen_track == Some(self.track_count) => {
                        debug!("stsc 位于 stco 之后, 直接填充块表");
                        table.apply_runs(&runs);
                    }
                    Some(_) => {}
                    None => self.stsc_runs = Some(runs),
                }
            }
            BoxType::Stco => {
                if !self.is_chosen_track_open() || self.chunk_table.is_some() {
                    debug!("忽略轨道 {} 的 stco", self.track_count);
                    return Ok(());
                }
                let mut table = ChunkTable::parse_stco(body)?;
                if let Some(runs) = self.stsc_runs.take() {
                    table.apply_runs(&runs);
                }
                debug!("块表已建立: {} 个块", table.chunk_count());
                self.chunk_table = Some(table);
            }
            BoxType::Stsz => {
                if self.is_chosen_track_open() && self.sample_sizes.is_none() {
                    let sizes = SampleSizes::parse_stsz(body)?;
                    debug!("采样大小表: {} 个采样", sizes.sample_count());
                    self.sample_sizes = Some(sizes);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// 进入 mdat: 消耗头部并跳到第一个块
    fn enter_mdat<I: InputStream + ?Sized>(
        &mut self,
        input: &mut I,
        cursor: &mut ContainerCursor,
        header: &BoxHeader,
    ) -> FeedResult<ParseStatus> {
        cursor.consume(input, header.header_size);

        let Some(info) = self.stream_info else {
            debug!("mdat 位于 {}, 没有可播放的轨道", cursor.position());
            return Err(FeedError::Format("mdat 之前没有可播放的 AAC 轨道".into()));
        };

        if let Some(first) = self.chunk_table.as_ref().and_then(ChunkTable::first_offset) {
            let first = u64::from(first);
            if first > cursor.position() {
                let skip = first - cursor.position();
                debug!("mdat 位于 {}, 跳过 {skip} 字节到第一个块", cursor.position());
                cursor.skip(input, skip);
            }
        }

        Ok(ParseStatus::Complete(Mp4Stream {
            info,
            chunk_table: self.chunk_table.take(),
            sample_sizes: self.sample_sizes.take(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aacfeed_codec::{EngineConfig, FrameInfo};
    use aacfeed_core::RingBuffer;

    /// 只接受 AAC-LC 44100Hz 立体声配置的引擎
    #[derive(Default)]
    struct ConfigEngine {
        inits: usize,
    }

    impl DecodeEngine for ConfigEngine {
        fn name(&self) -> &str {
            "config"
        }
        fn configure(&mut self, _config: &EngineConfig) -> FeedResult<()> {
            Ok(())
        }
        fn init_from_bitstream(&mut self, _data: &[u8]) -> FeedResult<StreamInfo> {
            Err(FeedError::Unsupported("测试引擎".into()))
        }
        fn init_from_config(&mut self, config: &[u8]) -> FeedResult<StreamInfo> {
            self.inits += 1;
            if config == [0x12, 0x10] {
                Ok(StreamInfo {
                    sample_rate: 44100,
                    channels: 2,
                    bytes_consumed: 0,
                })
            } else {
                Err(FeedError::Codec("不支持的配置".into()))
            }
        }
        fn decode(&mut self, _data: &[u8]) -> FrameInfo {
            FrameInfo::default()
        }
        fn samples(&self) -> &[i32] {
            &[]
        }
        fn error_message(&self, _code: u8) -> &'static str {
            ""
        }
    }

    fn mp4_box(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = ((body.len() + 8) as u32).to_be_bytes().to_vec();
        out.extend_from_slice(tag);
        out.extend_from_slice(body);
        out
    }

    fn container(tag: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
        mp4_box(tag, &children.concat())
    }

    fn table_box(tag: &[u8; 4], count: u32, values: &[u32]) -> Vec<u8> {
        let mut body = vec![0, 0, 0, 0];
        body.extend_from_slice(&count.to_be_bytes());
        for v in values {
            body.extend_from_slice(&v.to_be_bytes());
        }
        mp4_box(tag, &body)
    }

    fn esds(config: &[u8]) -> Vec<u8> {
        let mut body = vec![0, 0, 0, 0, 0x03, 0x19, 0x00, 0x01, 0x00, 0x04, 0x11, 0x40, 0x15];
        body.extend_from_slice(&[0; 11]);
        body.push(0x05);
        body.push(config.len() as u8);
        body.extend_from_slice(config);
        body.extend_from_slice(&[0x06, 0x01, 0x02]);
        mp4_box(b"esds", &body)
    }

    fn stsd(config: &[u8]) -> Vec<u8> {
        let mut mp4a_body = vec![0u8; 28];
        mp4a_body.extend_from_slice(&esds(config));
        let mut body = vec![0, 0, 0, 0, 0, 0, 0, 1];
        body.extend_from_slice(&mp4_box(b"mp4a", &mp4a_body));
        mp4_box(b"stsd", &body)
    }

    fn stsc(runs: &[(u32, u32)]) -> Vec<u8> {
        let values: Vec<u32> = runs.iter().flat_map(|&(f, s)| [f, s, 1]).collect();
        table_box(b"stsc", runs.len() as u32, &values)
    }

    fn stco(offsets: &[u32]) -> Vec<u8> {
        table_box(b"stco", offsets.len() as u32, offsets)
    }

    fn track(stbl_children: Vec<Vec<u8>>) -> Vec<u8> {
        let stbl = container(b"stbl", &stbl_children);
        let minf = container(b"minf", &[stbl]);
        let mdia = container(b"mdia", &[minf]);
        container(b"trak", &[mdia])
    }

    fn audio_track(config: &[u8], offsets: &[u32]) -> Vec<u8> {
        track(vec![stsd(config), stsc(&[(1, 2)]), stco(offsets)])
    }

    fn mdat_header(len: u32) -> Vec<u8> {
        let mut out = len.to_be_bytes().to_vec();
        out.extend_from_slice(b"mdat");
        out
    }

    /// moov + mdat 头部, 第一个块位于 mdat 数据区起点之后 `gap` 字节
    fn movie(gap: u32, chunks: u32) -> (Vec<u8>, u32) {
        let probe = container(b"moov", &[audio_track(&[0x12, 0x10], &vec![0; chunks as usize])]);
        let first = probe.len() as u32 + 8 + gap;
        let offsets: Vec<u32> = (0..chunks).map(|i| first + i * 100).collect();
        let mut data = container(b"moov", &[audio_track(&[0x12, 0x10], &offsets)]);
        data.extend_from_slice(&mdat_header(8 + gap + chunks * 100));
        data.extend(std::iter::repeat_n(0xAA, gap as usize));
        (data, first)
    }

    fn ring_with(data: &[u8]) -> RingBuffer {
        let mut ring = RingBuffer::new(4096).unwrap();
        assert_eq!(ring.write_from(data), data.len());
        ring
    }

    #[test]
    fn test_完整头部一次解析() {
        let (data, first) = movie(16, 3);
        let mut input = ring_with(&data);
        let mut cursor = ContainerCursor::new();
        let mut parser = Mp4HeaderParser::new();
        let mut engine = ConfigEngine::default();

        let status = parser.parse(&mut input, &mut cursor, &mut engine).unwrap();
        let ParseStatus::Complete(stream) = status else {
            panic!("应当完成头部解析");
        };
        assert_eq!(stream.info.sample_rate, 44100);
        assert_eq!(stream.info.channels, 2);
        let table = stream.chunk_table.unwrap();
        assert_eq!(table.chunk_count(), 3);
        let firsts: Vec<u32> = table.chunks().iter().map(|e| e.first_sample).collect();
        assert_eq!(firsts, vec![0, 2, 4]);
        assert_eq!(cursor.position(), u64::from(first));
        assert!(!cursor.has_pending());
        assert_eq!(input.used(), 0);
        assert_eq!(parser.chosen_track(), Some(1));
    }

    #[test]
    fn test_分段到达的数据() {
        let (data, first) = movie(40, 2);
        let mut input = RingBuffer::new(4096).unwrap();
        let mut cursor = ContainerCursor::new();
        let mut parser = Mp4HeaderParser::new();
        let mut engine = ConfigEngine::default();

        let mut result = None;
        for piece in data.chunks(7) {
            input.write_from(piece);
            if cursor.has_pending() {
                cursor.consume_pending(&mut input);
                if cursor.has_pending() {
                    continue;
                }
            }
            match parser.parse(&mut input, &mut cursor, &mut engine).unwrap() {
                ParseStatus::NeedMoreData => {}
                ParseStatus::Complete(stream) => {
                    result = Some(stream);
                    break;
                }
            }
        }

        let stream = result.expect("应当完成头部解析");
        assert_eq!(stream.info.sample_rate, 44100);
        assert_eq!(cursor.position() + cursor.pending_skip(), u64::from(first));
        // esds 只在完整缓冲后解析一次
        assert_eq!(engine.inits, 1);
    }

    #[test]
    fn test_第一个可播放轨道胜出() {
        let bad = audio_track(&[0x00, 0x00], &[5000]);
        let good = audio_track(&[0x12, 0x10], &[6000, 6100]);
        let later = audio_track(&[0x12, 0x10], &[7000]);
        let mut data = container(b"moov", &[bad, good, later]);
        data.extend_from_slice(&mdat_header(8));

        let mut input = ring_with(&data);
        let mut cursor = ContainerCursor::new();
        let mut parser = Mp4HeaderParser::new();
        let mut engine = ConfigEngine::default();

        let ParseStatus::Complete(stream) =
            parser.parse(&mut input, &mut cursor, &mut engine).unwrap()
        else {
            panic!("应当完成头部解析");
        };
        assert_eq!(parser.chosen_track(), Some(2));
        let table = stream.chunk_table.unwrap();
        assert_eq!(table.first_offset(), Some(6000));
        assert_eq!(table.chunk_count(), 2);
        // 第三个轨道的 esds 不会再次初始化引擎
        assert_eq!(engine.inits, 2);
        // 第一个块尚未到达, 记为待跳过
        assert_eq!(cursor.position() + cursor.pending_skip(), 6000);
    }

    #[test]
    fn test_没有可播放轨道时失败() {
        let mut data = container(b"moov", &[audio_track(&[0x00, 0x00], &[100])]);
        data.extend_from_slice(&mdat_header(8));
        let mut input = ring_with(&data);
        let mut cursor = ContainerCursor::new();
        let mut parser = Mp4HeaderParser::new();

        let result = parser.parse(&mut input, &mut cursor, &mut ConfigEngine::default());
        assert!(matches!(result, Err(FeedError::Format(_))));
    }

    #[test]
    fn test_stsc_晚于_stco() {
        let trak = track(vec![stsd(&[0x12, 0x10]), stco(&[10, 20, 30]), stsc(&[(1, 3)])]);
        let mut data = container(b"moov", &[trak]);
        data.extend_from_slice(&mdat_header(8));
        let mut input = ring_with(&data);
        let mut cursor = ContainerCursor::new();
        let mut parser = Mp4HeaderParser::new();

        let ParseStatus::Complete(stream) = parser
            .parse(&mut input, &mut cursor, &mut ConfigEngine::default())
            .unwrap()
        else {
            panic!("应当完成头部解析");
        };
        let firsts: Vec<u32> = stream
            .chunk_table
            .unwrap()
            .chunks()
            .iter()
            .map(|e| e.first_sample)
            .collect();
        assert_eq!(firsts, vec![0, 3, 6]);
    }

    #[test]
    fn test_未知_box_部分消耗() {
        let mut data = 100u32.to_be_bytes().to_vec();
        data.extend_from_slice(b"free");
        data.resize(40, 0);
        let mut input = ring_with(&data);
        let mut cursor = ContainerCursor::new();
        let mut parser = Mp4HeaderParser::new();

        let status = parser
            .parse(&mut input, &mut cursor, &mut ConfigEngine::default())
            .unwrap();
        assert!(matches!(status, ParseStatus::NeedMoreData));
        assert_eq!(cursor.position(), 40);
        assert_eq!(cursor.pending_skip(), 60);

        input.write_from(&[0u8; 100]);
        assert_eq!(cursor.consume_pending(&mut input), 60);
        assert_eq!(cursor.position(), 100);
        assert!(!cursor.has_pending());
    }

    #[test]
    fn test_esds_不完整时不消耗() {
        let data = esds(&[0x12, 0x10]);
        let mut input = ring_with(&data[..data.len() - 1]);
        let mut cursor = ContainerCursor::new();
        let mut parser = Mp4HeaderParser::new();
        let mut engine = ConfigEngine::default();

        let status = parser.parse(&mut input, &mut cursor, &mut engine).unwrap();
        assert!(matches!(status, ParseStatus::NeedMoreData));
        assert_eq!(cursor.position(), 0);
        assert_eq!(engine.inits, 0);
    }

    fn stsz(sizes: &[u32]) -> Vec<u8> {
        let mut body = vec![0u8; 8];
        body.extend_from_slice(&(sizes.len() as u32).to_be_bytes());
        for v in sizes {
            body.extend_from_slice(&v.to_be_bytes());
        }
        mp4_box(b"stsz", &body)
    }

    /// 带 stsz 的 moov + mdat 头部, 第一个块紧跟 mdat 头部
    fn movie_with_stsz(samples: u32) -> (Vec<u8>, u32) {
        let sizes: Vec<u32> = (0..samples).map(|i| 200 + i).collect();
        let build = |first: u32| {
            let trak = track(vec![
                stsd(&[0x12, 0x10]),
                stsc(&[(1, samples)]),
                stsz(&sizes),
                stco(&[first]),
            ]);
            container(b"moov", &[trak])
        };
        let first = build(0).len() as u32 + 8;
        let mut data = build(first);
        data.extend_from_slice(&mdat_header(8 + 4096));
        (data, first)
    }

    /// 按缓冲区剩余空间分批写入, 直到头部解析完成
    fn parse_streaming(
        data: &[u8],
        input: &mut RingBuffer,
        cursor: &mut ContainerCursor,
        parser: &mut Mp4HeaderParser,
    ) -> Mp4Stream {
        let mut fed = 0;
        for _ in 0..1000 {
            fed += input.write_from(&data[fed..]);
            if cursor.has_pending() {
                cursor.consume_pending(input);
                if cursor.has_pending() {
                    continue;
                }
            }
            if let ParseStatus::Complete(stream) = parser
                .parse(input, cursor, &mut ConfigEngine::default())
                .unwrap()
            {
                return stream;
            }
        }
        panic!("头部解析停滞: 已写入 {fed}/{} 字节", data.len());
    }

    #[test]
    fn test_stsz_能放入缓冲区时保留采样大小() {
        let (data, first) = movie_with_stsz(200);
        let mut input = RingBuffer::new(4096).unwrap();
        let mut cursor = ContainerCursor::new();
        let mut parser = Mp4HeaderParser::new();

        let stream = parse_streaming(&data, &mut input, &mut cursor, &mut parser);
        assert_eq!(stream.sample_sizes.unwrap().sample_count(), 200);
        assert_eq!(stream.chunk_table.unwrap().first_offset(), Some(first));
        assert_eq!(cursor.position(), u64::from(first));
    }

    #[test]
    fn test_stsz_超出缓冲区容量时跳过() {
        let (data, first) = movie_with_stsz(200);
        let mut input = RingBuffer::new(512).unwrap();
        let mut cursor = ContainerCursor::new();
        let mut parser = Mp4HeaderParser::new();

        let stream = parse_streaming(&data, &mut input, &mut cursor, &mut parser);
        assert!(stream.sample_sizes.is_none());
        let table = stream.chunk_table.unwrap();
        assert_eq!(table.first_offset(), Some(first));
        assert_eq!(table.chunk_count(), 1);
        assert_eq!(stream.info.sample_rate, 44100);
        assert_eq!(cursor.position(), u64::from(first));
    }

    #[test]
    fn test_stco_超出缓冲区容量时失败() {
        let data = stco(&(0..20).map(|i| 1000 + i * 10).collect::<Vec<u32>>());
        let mut input = RingBuffer::new(64).unwrap();
        input.write_from(&data);
        let mut parser = Mp4HeaderParser::new();

        let result = parser.parse(
            &mut input,
            &mut ContainerCursor::new(),
            &mut ConfigEngine::default(),
        );
        assert!(matches!(result, Err(FeedError::Format(_))));
    }

    #[test]
    fn test_畸形_box_长度() {
        let mut input = ring_with(&[0, 0, 0, 4, b'f', b'r', b'e', b'e']);
        let mut parser = Mp4HeaderParser::new();
        let result = parser.parse(
            &mut input,
            &mut ContainerCursor::new(),
            &mut ConfigEngine::default(),
        );
        assert!(result.is_err());
    }
}
