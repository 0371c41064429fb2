//! 统一错误类型定义.
//!
//! 所有 aacfeed crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// aacfeed 统一错误类型
#[derive(Debug, Error)]
pub enum FeedError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的操作
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// 解码引擎错误
    #[error("解码引擎错误: {0}")]
    Codec(String),

    /// 容器格式错误
    #[error("格式错误: {0}")]
    Format(String),

    /// 数据不足, 需要更多输入
    #[error("数据不足, 需要更多输入")]
    NeedMoreData,

    /// 内存分配失败
    #[error("内存分配失败: {0}")]
    OutOfMemory(String),

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 解码引擎不可用
    #[error("解码引擎不可用: {0}")]
    EngineUnavailable(String),
}

impl FeedError {
    /// 是否为可重试的暂态错误 (数据不足)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NeedMoreData)
    }
}

impl From<std::collections::TryReserveError> for FeedError {
    fn from(err: std::collections::TryReserveError) -> Self {
        Self::OutOfMemory(err.to_string())
    }
}

/// aacfeed 统一 Result 类型
pub type FeedResult<T> = Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_暂态错误判定() {
        assert!(FeedError::NeedMoreData.is_transient());
        assert!(!FeedError::Format("坏数据".into()).is_transient());
    }

    #[test]
    fn test_分配失败转换() {
        let mut v: Vec<u8> = Vec::new();
        let err = match v.try_reserve_exact(usize::MAX) {
            Ok(()) => panic!("不应分配成功"),
            Err(err) => FeedError::from(err),
        };
        assert!(matches!(err, FeedError::OutOfMemory(_)));
    }
}
