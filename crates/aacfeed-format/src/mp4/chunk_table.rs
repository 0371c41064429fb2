//! 块表构建: 由 stsc 的采样→块映射与 stco 的块偏移生成每个块的首采样序号.
//!
//! 块表末尾带一个哨兵条目 (offset = 0), 它永远不是跳转目标.
//! stsz 的采样大小单独保存, 用于把原始访问单元逐个交给解码引擎.

use byteorder::{BigEndian, ByteOrder};

use aacfeed_core::{FeedError, FeedResult};

use super::boxes::FULL_BOX_PREFIX;

/// stsc 单条记录 (sample_description_index 不使用)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleToChunk {
    /// 本段起始块号 (从 1 开始)
    pub first_chunk: u32,
    /// 本段每块采样数
    pub samples_per_chunk: u32,
}

/// 读取 full box 的 entry_count, 并校验表体长度
fn table_entries<'a>(
    body: &'a [u8],
    entry_size: usize,
    name: &str,
) -> FeedResult<(usize, &'a [u8])> {
    let header = FULL_BOX_PREFIX + 4;
    if body.len() < header {
        return Err(FeedError::Format(format!("{name} 数据截断")));
    }
    let count = BigEndian::read_u32(&body[FULL_BOX_PREFIX..header]) as usize;
    let table = &body[header..];
    if count
        .checked_mul(entry_size)
        .is_none_or(|len| len > table.len())
    {
        return Err(FeedError::Format(format!(
            "{name} 声明 {count} 个条目, 超出 box 长度"
        )));
    }
    Ok((count, table))
}

/// 解析 stsc 内容 (不含 box 头部)
///
/// 要求 first_chunk 从 1 开始且严格递增.
pub fn parse_stsc(body: &[u8]) -> FeedResult<Vec<SampleToChunk>> {
    let (count, table) = table_entries(body, 12, "stsc")?;

    let mut runs = Vec::new();
    runs.try_reserve_exact(count)?;
    let mut last = 0u32;
    for entry in table.chunks_exact(12).take(count) {
        let first_chunk = BigEndian::read_u32(&entry[0..4]);
        let samples_per_chunk = BigEndian::read_u32(&entry[4..8]);
        if first_chunk <= last {
            return Err(FeedError::Format(format!(
                "stsc first_chunk 非递增: {first_chunk} (前一项 {last})"
            )));
        }
        last = first_chunk;
        runs.push(SampleToChunk {
            first_chunk,
            samples_per_chunk,
        });
    }
    Ok(runs)
}

/// 块表条目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkEntry {
    /// 块内第一个采样的序号
    pub first_sample: u32,
    /// 块在容器中的字节偏移
    pub offset: u32,
}

/// 块表 (末尾含哨兵)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkTable {
    entries: Vec<ChunkEntry>,
}

impl ChunkTable {
    /// 由块偏移构建, first_sample 全部为 0
    pub fn from_offsets(offsets: &[u32]) -> FeedResult<Self> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(offsets.len() + 1)?;
        entries.extend(offsets.iter().map(|&offset| ChunkEntry {
            first_sample: 0,
            offset,
        }));
        entries.push(ChunkEntry::default());
        Ok(Self { entries })
    }

    /// 解析 stco 内容 (不含 box 头部)
    pub fn parse_stco(body: &[u8]) -> FeedResult<Self> {
        let (count, table) = table_entries(body, 4, "stco")?;

        let mut entries = Vec::new();
        entries.try_reserve_exact(count + 1)?;
        entries.extend(table.chunks_exact(4).take(count).map(|b| ChunkEntry {
            first_sample: 0,
            offset: BigEndian::read_u32(b),
        }));
        entries.push(ChunkEntry::default());
        Ok(Self { entries })
    }

    /// 用 stsc 段填充每个块的首采样序号
    ///
    /// 除首段外, 每段到来时为上一段覆盖的块 `[prev.first_chunk-1, cur.first_chunk-1)`
    /// 赋值, 计数按上一段的每块采样数递增; 最后一段覆盖剩余全部块.
    /// 超出块数的索引被忽略, 哨兵不会被赋值.
    pub fn apply_runs(&mut self, runs: &[SampleToChunk]) {
        let chunks = self.chunk_count();
        let mut sample = 0u32;
        let mut prev: Option<&SampleToChunk> = None;

        for (i, run) in runs.iter().enumerate() {
            let start = run.first_chunk.saturating_sub(1) as usize;
            if let Some(prev) = prev {
                let lo = (prev.first_chunk.saturating_sub(1) as usize).min(chunks);
                let hi = start.min(chunks).max(lo);
                for entry in &mut self.entries[lo..hi] {
                    entry.first_sample = sample;
                    sample = sample.saturating_add(prev.samples_per_chunk);
                }
            }
            if i + 1 == runs.len() {
                for entry in &mut self.entries[start.min(chunks)..chunks] {
                    entry.first_sample = sample;
                    sample = sample.saturating_add(run.samples_per_chunk);
                }
            }
            prev = Some(run);
        }
    }

    /// 实际块数 (不含哨兵)
    pub fn chunk_count(&self) -> usize {
        self.entries.len() - 1
    }

    /// 获取条目 (含哨兵)
    pub fn entry(&self, index: usize) -> Option<&ChunkEntry> {
        self.entries.get(index)
    }

    /// 是否为哨兵或越界
    pub fn is_sentinel(&self, index: usize) -> bool {
        index >= self.chunk_count()
    }

    /// 可作为跳转目标的块边界 (哨兵与 offset 为 0 的条目除外)
    pub fn boundary(&self, index: usize) -> Option<&ChunkEntry> {
        if self.is_sentinel(index) {
            return None;
        }
        self.entries.get(index).filter(|e| e.offset != 0)
    }

    /// 第一个块的偏移
    pub fn first_offset(&self) -> Option<u32> {
        self.boundary(0).map(|e| e.offset)
    }

    /// 实际块条目 (不含哨兵)
    pub fn chunks(&self) -> &[ChunkEntry] {
        &self.entries[..self.chunk_count()]
    }
}

/// stsz 采样大小
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleSizes {
    /// 所有采样大小相同
    Uniform { size: u32, count: u32 },
    /// 逐个采样的大小
    Table(Vec<u32>),
}

impl SampleSizes {
    /// 解析 stsz 内容 (不含 box 头部)
    pub fn parse_stsz(body: &[u8]) -> FeedResult<Self> {
        if body.len() < FULL_BOX_PREFIX + 8 {
            return Err(FeedError::Format("stsz 数据截断".into()));
        }
        let size = BigEndian::read_u32(&body[FULL_BOX_PREFIX..FULL_BOX_PREFIX + 4]);
        if size != 0 {
            let count = BigEndian::read_u32(&body[FULL_BOX_PREFIX + 4..FULL_BOX_PREFIX + 8]);
            return Ok(Self::Uniform { size, count });
        }

        // sample_size 字段占位后与 stco 同构: entry_count + 表
        let (count, table) = table_entries(&body[4..], 4, "stsz")?;
        let mut sizes = Vec::new();
        sizes.try_reserve_exact(count)?;
        sizes.extend(table.chunks_exact(4).take(count).map(BigEndian::read_u32));
        Ok(Self::Table(sizes))
    }

    /// 第 `index` 个采样 (从 0 开始) 的大小
    pub fn size_of(&self, index: u32) -> Option<u32> {
        match self {
            Self::Uniform { size, count } => (index < *count).then_some(*size),
            Self::Table(sizes) => sizes.get(index as usize).copied(),
        }
    }

    /// 采样总数
    pub fn sample_count(&self) -> u32 {
        match self {
            Self::Uniform { count, .. } => *count,
            Self::Table(sizes) => u32::try_from(sizes.len()).unwrap_or(u32::MAX),
        }
    }
}
