//! esds 描述符解析.
//!
//! esds 结构: version(1) + flags(3) + ES_Descriptor(tag=0x03)
//!   → DecoderConfigDescriptor(tag=0x04)
//!     → DecoderSpecificInfo(tag=0x05) = AudioSpecificConfig
//!
//! 描述符长度为可变长编码: 最多 4 字节, 每字节高位为续标志, 低 7 位为值.

use aacfeed_core::{FeedError, FeedResult};

use super::boxes::FULL_BOX_PREFIX;

/// ES_Descriptor
pub const ES_DESCRIPTOR_TAG: u8 = 0x03;
/// DecoderConfigDescriptor
pub const DECODER_CONFIG_TAG: u8 = 0x04;
/// DecoderSpecificInfo
pub const DECODER_SPECIFIC_INFO_TAG: u8 = 0x05;

/// DecoderConfigDescriptor 固定字段: objectType(1)+stream(1)+buf(3)+max(4)+avg(4)
const DECODER_CONFIG_FIXED: usize = 13;

/// 描述符字节流读取器
struct DescriptorReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DescriptorReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn truncated() -> FeedError {
        FeedError::Format("esds 描述符数据截断".into())
    }

    fn u8(&mut self) -> FeedResult<u8> {
        let b = *self.data.get(self.pos).ok_or_else(Self::truncated)?;
        self.pos += 1;
        Ok(b)
    }

    fn skip(&mut self, n: usize) -> FeedResult<()> {
        if self.data.len() - self.pos < n {
            return Err(Self::truncated());
        }
        self.pos += n;
        Ok(())
    }

    fn take(&mut self, n: usize) -> FeedResult<&'a [u8]> {
        let data = self.data;
        let out = data
            .get(self.pos..self.pos + n)
            .ok_or_else(Self::truncated)?;
        self.pos += n;
        Ok(out)
    }

    fn length(&mut self) -> FeedResult<usize> {
        read_descriptor_length(self.data, &mut self.pos)
    }

    fn expect_tag(&mut self, tag: u8) -> FeedResult<()> {
        let got = self.u8()?;
        if got != tag {
            return Err(FeedError::Format(format!(
                "esds 描述符标签错误: 期望 0x{tag:02X}, 实际 0x{got:02X}"
            )));
        }
        Ok(())
    }
}

/// 读取可变长描述符长度, `pos` 前进到长度字段之后
pub fn read_descriptor_length(data: &[u8], pos: &mut usize) -> FeedResult<usize> {
    let mut len = 0usize;
    for _ in 0..4 {
        let b = *data
            .get(*pos)
            .ok_or_else(|| FeedError::Format("esds 描述符长度截断".into()))?;
        *pos += 1;
        len = (len << 7) | usize::from(b & 0x7F);
        if b & 0x80 == 0 {
            break;
        }
    }
    Ok(len)
}

/// 从 esds box 内容 (不含 box 头部) 中提取 DecoderSpecificInfo
///
/// 缺少 tag 0x05 或数据截断均返回 `FeedError::Format`.
pub fn extract_decoder_config(esds_body: &[u8]) -> FeedResult<&[u8]> {
    let descriptors = esds_body
        .get(FULL_BOX_PREFIX..)
        .ok_or_else(DescriptorReader::truncated)?;
    let mut r = DescriptorReader::new(descriptors);

    let tag = r.u8()?;
    if tag == ES_DESCRIPTOR_TAG {
        r.length()?;
        // ES_ID(2) + flags(1) + 可选字段
        r.skip(2)?;
        let flags = r.u8()?;
        if flags & 0x80 != 0 {
            r.skip(2)?; // dependsOn_ES_ID
        }
        if flags & 0x40 != 0 {
            let url_len = r.u8()?;
            r.skip(usize::from(url_len))?;
        }
        if flags & 0x20 != 0 {
            r.skip(2)?; // OCR_ES_Id
        }
        r.expect_tag(DECODER_CONFIG_TAG)?;
    } else if tag != DECODER_CONFIG_TAG {
        return Err(FeedError::Format(format!(
            "esds 起始描述符标签无效: 0x{tag:02X}"
        )));
    }

    r.length()?;
    r.skip(DECODER_CONFIG_FIXED)?;
    if r.u8()? != DECODER_SPECIFIC_INFO_TAG {
        return Err(FeedError::Format("esds 缺少 DecoderSpecificInfo".into()));
    }
    let len = r.length()?;
    r.take(len)
}
