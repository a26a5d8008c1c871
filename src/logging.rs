// ==========================================
// 学校课表系统 - 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 过滤器优先取 RUST_LOG,否则使用各入口的默认指令
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// CLI 默认过滤器: 本 crate 输出 info,依赖库只输出 warn
pub const DEFAULT_FILTER: &str = "warn,school_timetable=info";

/// 测试默认过滤器: 本 crate 的 debug 日志 (冲突检测、快照收集)
pub const TEST_FILTER: &str = "school_timetable=debug";

/// RUST_LOG 未设置或无法解析时退回 `default_directives`
fn env_filter_or(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: `DEFAULT_FILTER`）
///   例如: RUST_LOG=school_timetable::engine=trace
///
/// 日志写到 stderr, stdout 只留给 CLI 的 JSON 输出
///
/// # 示例
/// ```no_run
/// use school_timetable::logging;
/// logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(env_filter_or(DEFAULT_FILTER))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 初始化测试环境的日志系统
///
/// 可重复调用,只有第一次生效; 输出经 test writer 捕获,
/// 仅在测试失败或 `--nocapture` 时显示
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(env_filter_or(TEST_FILTER))
        .with_test_writer()
        .try_init();
}
