mod enqueue;
mod index;
mod scan;
pub mod server;
mod similar;
mod stats;
mod worker;

pub use enqueue::*;
pub use index::*;
pub use scan::*;
pub use server::*;
pub use similar::*;
pub use stats::*;
pub use worker::*;

use tokio::sync::watch;

use crate::config::Opts;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}

/// 收到 Ctrl-C 后将停止信号置为 true
fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("收到 Ctrl-C，等待当前消息处理完成");
        }
        tx.send_replace(true);
    });
    rx
}
