//! 流缓冲区能力接口与环形缓冲区实现.
//!
//! 驱动器只通过 [`InputStream`] / [`OutputStream`] 访问缓冲区:
//! - 输入端: 容量, 已用字节数, 连续可读字节数, 可读视图, 推进读游标
//! - 输出端: 连续可写字节数, 可写视图, 推进写游标, 以及一次性的
//!   "下一采样率" 与 "流起点" 标记
//!
//! 缓冲区与外部生产者/消费者共享, 以 `Arc<Mutex<_>>` 形式传递.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cursor::RingCursor;
use crate::error::{FeedError, FeedResult};

/// 输入流缓冲区能力
pub trait InputStream {
    /// 缓冲区总容量, 大于该值的 box 永远无法完整缓冲
    fn capacity(&self) -> usize;

    /// 缓冲区中已有的字节总数 (含回绕部分)
    fn used(&self) -> usize;

    /// 从读游标起不回绕即可读取的字节数
    fn cont_read(&self) -> usize;

    /// 可读视图: (读游标起的连续区, 回绕到缓冲区起点后的部分)
    fn readable(&self) -> (&[u8], &[u8]);

    /// 推进读游标 `n` 字节 (可跨越回绕点)
    fn advance_read(&mut self, n: usize);
}

/// 输出流缓冲区能力
pub trait OutputStream {
    /// 从写游标起不回绕即可写入的字节数
    fn cont_write(&self) -> usize;

    /// 可写视图, 长度等于 [`cont_write`](Self::cont_write)
    fn writable(&mut self) -> &mut [u8];

    /// 推进写游标 `n` 字节
    fn advance_write(&mut self, n: usize);

    /// 当前写游标在缓冲区中的索引
    fn write_position(&self) -> usize;

    /// 设置下游即将切换到的采样率
    fn set_next_sample_rate(&mut self, sample_rate: u32);

    /// 将当前写位置记为新流的起点 (供下游检测无缝切换)
    fn mark_track_start(&mut self);
}

/// 共享缓冲区句柄
pub type SharedBuffer<T> = Arc<Mutex<T>>;

/// 获取共享缓冲区的互斥锁
///
/// 缓冲区状态是纯数据, 持锁方 panic 不会使其失去一致性, 因此直接恢复中毒的锁.
pub fn lock_shared<T: ?Sized>(buffer: &Mutex<T>) -> MutexGuard<'_, T> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 固定容量的字节环形缓冲区
pub struct RingBuffer {
    data: Box<[u8]>,
    read: RingCursor,
    write: RingCursor,
    used: usize,
}

impl RingBuffer {
    /// 创建容量为 `capacity` 字节的环形缓冲区
    pub fn new(capacity: usize) -> FeedResult<Self> {
        if capacity == 0 {
            return Err(FeedError::InvalidArgument("环形缓冲区容量不能为 0".into()));
        }
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)?;
        data.resize(capacity, 0);
        Ok(Self {
            data: data.into_boxed_slice(),
            read: RingCursor::new(capacity),
            write: RingCursor::new(capacity),
            used: 0,
        })
    }

    /// 缓冲区容量
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// 剩余可写空间
    pub fn space(&self) -> usize {
        self.capacity() - self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// 从生产者侧写入尽可能多的数据, 返回实际写入字节数
    pub fn write_from(&mut self, src: &[u8]) -> usize {
        let mut written = 0;
        while written < src.len() {
            let n = self.cont_write_len().min(src.len() - written);
            if n == 0 {
                break;
            }
            let start = self.write.index();
            self.data[start..start + n].copy_from_slice(&src[written..written + n]);
            self.commit_write(n);
            written += n;
        }
        written
    }

    /// 从消费者侧读出尽可能多的数据, 返回实际读出字节数
    pub fn read_into(&mut self, dst: &mut [u8]) -> usize {
        let mut copied = 0;
        while copied < dst.len() {
            let n = self.cont_read_len().min(dst.len() - copied);
            if n == 0 {
                break;
            }
            let start = self.read.index();
            dst[copied..copied + n].copy_from_slice(&self.data[start..start + n]);
            self.commit_read(n);
            copied += n;
        }
        copied
    }

    /// 清空缓冲区并将游标复位到起点
    pub fn clear(&mut self) {
        self.read.reset();
        self.write.reset();
        self.used = 0;
    }

    fn cont_read_len(&self) -> usize {
        self.used.min(self.read.until_wrap())
    }

    fn cont_write_len(&self) -> usize {
        self.space().min(self.write.until_wrap())
    }

    fn commit_read(&mut self, n: usize) {
        debug_assert!(n <= self.used, "读游标越过写游标");
        let n = n.min(self.used);
        self.read.advance(n);
        self.used -= n;
    }

    fn commit_write(&mut self, n: usize) {
        debug_assert!(n <= self.space(), "写游标越过读游标");
        let n = n.min(self.space());
        self.write.advance(n);
        self.used += n;
    }
}

impl InputStream for RingBuffer {
    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn used(&self) -> usize {
        self.used
    }

    fn cont_read(&self) -> usize {
        self.cont_read_len()
    }

    fn readable(&self) -> (&[u8], &[u8]) {
        let cont = self.cont_read_len();
        let start = self.read.index();
        (&self.data[start..start + cont], &self.data[..self.used - cont])
    }

    fn advance_read(&mut self, n: usize) {
        self.commit_read(n);
    }
}

/// 播放输出缓冲区
///
/// 在 PCM 环形缓冲区之外携带两个一次性槽位: 下一采样率与新流起点.
pub struct PlaybackBuffer {
    ring: RingBuffer,
    next_sample_rate: Option<u32>,
    track_start: Option<usize>,
}

impl PlaybackBuffer {
    /// 创建容量为 `capacity` 字节的输出缓冲区
    pub fn new(capacity: usize) -> FeedResult<Self> {
        Ok(Self {
            ring: RingBuffer::new(capacity)?,
            next_sample_rate: None,
            track_start: None,
        })
    }

    /// 底层 PCM 环形缓冲区 (消费者侧读取用)
    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    pub fn ring_mut(&mut self) -> &mut RingBuffer {
        &mut self.ring
    }

    /// 已公布但尚未被下游取走的采样率
    pub fn next_sample_rate(&self) -> Option<u32> {
        self.next_sample_rate
    }

    /// 取走待切换的采样率
    pub fn take_next_sample_rate(&mut self) -> Option<u32> {
        self.next_sample_rate.take()
    }

    /// 最近一次标记的流起点
    pub fn track_start(&self) -> Option<usize> {
        self.track_start
    }
}

impl OutputStream for PlaybackBuffer {
    fn cont_write(&self) -> usize {
        self.ring.cont_write_len()
    }

    fn writable(&mut self) -> &mut [u8] {
        let cont = self.ring.cont_write_len();
        let start = self.ring.write.index();
        &mut self.ring.data[start..start + cont]
    }

    fn advance_write(&mut self, n: usize) {
        self.ring.commit_write(n);
    }

    fn write_position(&self) -> usize {
        self.ring.write.index()
    }

    fn set_next_sample_rate(&mut self, sample_rate: u32) {
        self.next_sample_rate = Some(sample_rate);
    }

    fn mark_track_start(&mut self) {
        self.track_start = Some(self.ring.write.index());
    }
}
