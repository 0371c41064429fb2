//! 环形缓冲区游标.
//!
//! 用 "索引 + 容量" 表示回绕缓冲区中的读/写位置, 避免在调用方散落
//! 取模与指针运算.

/// 环形缓冲区中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingCursor {
    index: usize,
    capacity: usize,
}

impl RingCursor {
    /// 在容量为 `capacity` 的缓冲区起点创建游标
    pub const fn new(capacity: usize) -> Self {
        Self { index: 0, capacity }
    }

    /// 当前索引
    pub const fn index(&self) -> usize {
        self.index
    }

    /// 缓冲区容量
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// 到缓冲区物理末尾为止的字节数
    pub const fn until_wrap(&self) -> usize {
        self.capacity - self.index
    }

    /// 前进 `n` 字节, 越过末尾时回绕
    pub fn advance(&mut self, n: usize) {
        if self.capacity == 0 {
            return;
        }
        self.index = (self.index + n % self.capacity) % self.capacity;
    }

    /// 回到缓冲区起点
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_游标前进与回绕() {
        let mut cursor = RingCursor::new(10);
        cursor.advance(7);
        assert_eq!(cursor.index(), 7);
        assert_eq!(cursor.until_wrap(), 3);
        cursor.advance(5);
        assert_eq!(cursor.index(), 2);
        cursor.advance(10);
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn test_恰好到达末尾() {
        let mut cursor = RingCursor::new(8);
        cursor.advance(8);
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.until_wrap(), 8);
    }
}
