pub mod cmd;
pub mod error;
pub mod store;

/// 记录错误日志, 返回None表示执行失败
pub fn log_error<T>(x: Result<T, anyhow::Error>) -> Option<T> {
    x.map_err(|e| {
        log::error!("{e:#}");
    })
    .ok()
}
