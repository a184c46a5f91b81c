//! A/B 测试完成 Worker
//!
//! 按固定间隔扫描在上一个轮询窗口内结束的 A/B 测试，选出胜出变体并更新链接。
//! 扫描游标 (test_completed_at, id) 保存在内存中，进程重启后从启动时刻往回一个间隔开始；
//! 单轮取满一批时，下一轮从最后处理的链接之后继续。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use link_management::models::TestCompletionCursor;
use link_management::service::{AbTestOutcome, AbTestService};
use linkhub_shared::config::AbTestConfig;
use linkhub_shared::observability::metrics;

/// A/B 测试完成 Worker
pub struct AbTestWorker {
    service: Arc<AbTestService>,
    /// 轮询间隔
    poll_interval: Duration,
    /// 每轮处理的最大链接数
    batch_size: i64,
}

impl AbTestWorker {
    pub fn new(service: Arc<AbTestService>, poll_interval_secs: u64, batch_size: i64) -> Self {
        Self {
            service,
            poll_interval: Duration::from_secs(poll_interval_secs),
            batch_size,
        }
    }

    pub fn from_config(service: Arc<AbTestService>, config: &AbTestConfig) -> Self {
        Self::new(service, config.poll_interval_seconds, config.batch_size)
    }

    /// 主循环：持续处理直到进程退出
    pub async fn run(&self) {
        info!(
            poll_interval = ?self.poll_interval,
            batch_size = self.batch_size,
            "AbTestWorker 已启动"
        );

        let mut cursor =
            TestCompletionCursor::after(Utc::now() - interval_as_chrono(self.poll_interval));

        loop {
            let until = Utc::now();
            match self
                .service
                .complete_window(cursor.clone(), until, self.batch_size)
                .await
            {
                Ok(report) => {
                    log_outcomes(&report.outcomes);
                    cursor = report.next;
                }
                Err(e) => error!(error = %e, "扫描已结束的 A/B 测试出错"),
            }

            // 记录 Worker 健康状态
            metrics::set_worker_last_run("ab_test_worker");

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn interval_as_chrono(interval: Duration) -> chrono::Duration {
    chrono::Duration::from_std(interval).unwrap_or_else(|_| chrono::Duration::seconds(60))
}

fn log_outcomes(outcomes: &[(String, AbTestOutcome)]) {
    let updated = outcomes
        .iter()
        .filter(|(_, o)| matches!(o, AbTestOutcome::Updated { .. }))
        .count();
    if !outcomes.is_empty() {
        info!(processed = outcomes.len(), updated, "A/B 测试处理完成");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_conversion() {
        assert_eq!(
            interval_as_chrono(Duration::from_secs(90)),
            chrono::Duration::seconds(90)
        );
    }
}
