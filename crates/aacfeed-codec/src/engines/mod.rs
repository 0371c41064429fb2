//! 内置解码引擎实现.

#[cfg(feature = "symphonia-backend")]
pub mod symphonia;

use crate::registry::EngineRegistry;

/// 注册所有内置解码引擎
///
/// 未启用任何后端特性时注册表保持为空, 打开解码器会得到 `EngineUnavailable`.
pub fn register_all_engines(registry: &mut EngineRegistry) {
    #[cfg(feature = "symphonia-backend")]
    registry.register_engine("symphonia-aac", symphonia::SymphoniaAacEngine::create);

    #[cfg(not(feature = "symphonia-backend"))]
    let _ = registry;
}
