//! 后台任务管理
//!
//! 注册、启动和关闭后台任务。每个任务都包装了 panic 捕获，
//! 异常退出只记录日志，不会拖垮服务器。

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::orders::OrderLocks;

struct RegisteredTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

/// 后台任务管理器
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// let token = tasks.shutdown_token();
/// tasks.spawn("lock_prune", prune_idle_locks(locks, interval, token));
/// tasks.shutdown().await;
/// ```
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// 任务内部监听 shutdown 信号用
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 注册并启动一个后台任务
    pub fn spawn<F>(&mut self, name: &'static str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let wrapped = async move {
            if let Err(panic) = AssertUnwindSafe(future).catch_unwind().await {
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "Unknown panic".to_string());
                tracing::error!(task = %name, panic = %msg, "Background task panicked");
            }
        };

        let handle = tokio::spawn(wrapped);
        tracing::debug!(task = %name, "Registered background task");
        self.tasks.push(RegisteredTask { name, handle });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// 发送取消信号并等待所有任务结束
    pub async fn shutdown(self) {
        tracing::info!("Shutting down {} background tasks...", self.tasks.len());
        self.shutdown.cancel();

        for task in self.tasks {
            match task.handle.await {
                Ok(()) => tracing::debug!(task = %task.name, "Task stopped"),
                Err(e) => tracing::error!(task = %task.name, error = ?e, "Task failed"),
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

/// 定期清理空闲的客户/商品锁，直到收到取消信号
pub async fn prune_idle_locks(locks: Arc<OrderLocks>, every: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    // interval 的第一次 tick 立即完成
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let removed = locks.prune_idle();
                if removed > 0 {
                    tracing::debug!(removed, remaining_customers = locks.customers.len(), "Pruned idle locks");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prune_task_drops_idle_slots_and_stops_on_shutdown() {
        let locks = Arc::new(OrderLocks::new());
        drop(locks.customers.lock(&"a@example.com".to_string()).await);
        drop(locks.products.lock(&1).await);
        assert_eq!(locks.customers.len(), 1);

        let mut tasks = BackgroundTasks::new();
        tasks.spawn(
            "lock_prune",
            prune_idle_locks(locks.clone(), Duration::from_millis(10), tasks.shutdown_token()),
        );
        assert_eq!(tasks.len(), 1);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(locks.customers.is_empty());
        assert!(locks.products.is_empty());

        tokio::time::timeout(Duration::from_secs(1), tasks.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn panicking_task_is_contained() {
        let mut tasks = BackgroundTasks::new();
        tasks.spawn("boom", async { panic!("boom") });
        tokio::time::sleep(Duration::from_millis(10)).await;
        tasks.shutdown().await;
    }
}
