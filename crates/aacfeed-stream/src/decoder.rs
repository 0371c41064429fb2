//! 流式解码驱动.
//!
//! 由外部调度器反复调用 [`AacStreamDecoder::decode`], 每次 (tick) 只做一件有界的工作:
//! 1. 有待跳过字节时, 消耗当前连续可读部分后返回
//! 2. `New` 状态: 头部探测 (ADTS 同步字 / MP4 box 解析)
//! 3. `Streaming` 状态: 解码一帧, 对齐块边界, 写出 PCM
//!
//! 输入锁只在解析/消耗期间持有, 写 PCM 前释放后再获取输出锁, 两者从不同时持有.

use log::{debug, error, info, warn};

use aacfeed_codec::pcm::{widen_shift, write_interleaved};
use aacfeed_codec::{EngineFactory, FrameInfo, StreamInfo};
use aacfeed_core::{FeedResult, InputStream, OutputStream, SharedBuffer, lock_shared};
use aacfeed_format::ContainerKind;

use crate::context::DecoderContext;
use crate::settings::DecoderSettings;

/// 解码流状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// 等待头部探测完成
    New,
    /// 正在逐帧解码
    Streaming,
    /// 终止状态, 流无法继续
    Error,
}

/// AAC 流式解码驱动
pub struct AacStreamDecoder<I: InputStream, O: OutputStream> {
    input: SharedBuffer<I>,
    output: SharedBuffer<O>,
    factory: EngineFactory,
    settings: DecoderSettings,
    state: StreamState,
    context: Option<DecoderContext>,
    /// 回绕拼接用的临时窗口
    scratch: Vec<u8>,
}

impl<I: InputStream, O: OutputStream> AacStreamDecoder<I, O> {
    /// 创建驱动, 不打开任何流
    pub fn new(
        input: SharedBuffer<I>,
        output: SharedBuffer<O>,
        factory: EngineFactory,
        settings: DecoderSettings,
    ) -> FeedResult<Self> {
        settings.validate()?;
        let mut scratch = Vec::new();
        scratch.try_reserve_exact(settings.wrap_window)?;
        Ok(Self {
            input,
            output,
            factory,
            settings,
            state: StreamState::New,
            context: None,
            scratch,
        })
    }

    /// 打开新流
    ///
    /// 丢弃旧的上下文 (引擎, 块表), 从工厂获取新引擎并应用输出配置.
    /// 引擎不可用时返回 `EngineUnavailable`, 配置失败只记录日志.
    pub fn open(&mut self, kind: ContainerKind) -> FeedResult<()> {
        self.context = None;
        let mut engine = (self.factory)()?;
        if let Err(e) = engine.configure(&self.settings.engine_config()) {
            warn!("解码引擎 {} 配置失败: {e}", engine.name());
        }
        info!("打开 {kind} 流, 解码引擎: {}", engine.name());

        self.context = Some(DecoderContext::new(engine, kind));
        self.state = StreamState::New;
        Ok(())
    }

    /// 关闭当前流, 释放引擎与块表
    pub fn close(&mut self) {
        if self.context.take().is_some() {
            debug!("关闭解码流");
        }
    }

    /// 执行一次解码调度
    pub fn decode(&mut self) -> StreamState {
        if self.state == StreamState::Error {
            return self.state;
        }
        if let Err(e) = self.tick() {
            error!("无法继续解码: {e}");
            self.state = StreamState::Error;
        }
        self.state
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// 是否有打开的流
    pub fn is_open(&self) -> bool {
        self.context.is_some()
    }

    /// 头部探测得到的流信息
    pub fn stream_info(&self) -> Option<StreamInfo> {
        self.context.as_ref().and_then(DecoderContext::stream_info)
    }

    /// 当前容器字节位置
    pub fn position(&self) -> Option<u64> {
        self.context.as_ref().map(|ctx| ctx.cursor().position())
    }

    /// 当前待跳过字节数
    pub fn pending_skip(&self) -> Option<u64> {
        self.context.as_ref().map(|ctx| ctx.cursor().pending_skip())
    }

    pub fn context(&self) -> Option<&DecoderContext> {
        self.context.as_ref()
    }

    pub fn settings(&self) -> &DecoderSettings {
        &self.settings
    }

    fn tick(&mut self) -> FeedResult<()> {
        let Self {
            input,
            output,
            settings,
            state,
            context,
            scratch,
            ..
        } = self;
        let Some(ctx) = context.as_mut() else {
            return Ok(());
        };

        match *state {
            StreamState::New => {
                let found = {
                    let mut input = lock_shared(input);
                    if ctx.consume_pending(&mut *input) {
                        return Ok(());
                    }
                    ctx.detect_header(&mut *input, scratch, settings.wrap_window)?
                };
                if let Some(info) = found {
                    let mut output = lock_shared(output);
                    output.set_next_sample_rate(info.sample_rate);
                    output.mark_track_start();
                    info!("设置流起点: 写位置 {}", output.write_position());
                    *state = StreamState::Streaming;
                }
            }
            StreamState::Streaming => {
                let frame = {
                    let mut input = lock_shared(input);
                    if ctx.consume_pending(&mut *input) {
                        return Ok(());
                    }
                    ctx.decode_step(&mut *input, scratch, settings.wrap_window)?
                };
                if let Some(frame) = frame.filter(|f| f.samples > 0) {
                    write_pcm(ctx, output, &frame, settings);
                }
            }
            StreamState::Error => {}
        }
        Ok(())
    }
}

/// 将引擎输出写入输出缓冲区; 失败只记录日志
fn write_pcm<O: OutputStream>(
    ctx: &DecoderContext,
    output: &SharedBuffer<O>,
    frame: &FrameInfo,
    settings: &DecoderSettings,
) {
    let samples = ctx.engine().samples();
    let samples = &samples[..frame.samples.min(samples.len())];
    let shift = widen_shift(settings.output_bit_depth);

    let mut output = lock_shared(output);
    match write_interleaved(&mut *output, samples, frame.channels, shift) {
        Ok(written) if written.dropped > 0 => {
            warn!(
                "输出缓冲区无可写空间, 丢弃 {} 帧 (已写 {})",
                written.dropped, written.written
            );
        }
        Ok(_) => {}
        Err(e) => warn!("{e}, 丢弃 {} 个采样", frame.samples),
    }
}
