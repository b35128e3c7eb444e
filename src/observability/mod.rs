//! 可观测性

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 初始化全局日志订阅器（进程内只可调用一次）
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();
}

/// 与 init 相同，但已有订阅器时静默返回（测试用）
pub fn try_init() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .try_init();
}
