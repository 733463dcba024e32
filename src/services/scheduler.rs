use crate::errors::Result;
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime};
use log::{error, info};
use std::future::Future;
use std::time::Duration;

/// 每天固定时刻（本地时间）触发一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
    poll_interval: Duration,
}

impl DailySchedule {
    pub fn new(at: NaiveTime) -> Self {
        Self {
            at,
            poll_interval: Duration::from_secs(30),
        }
    }

    pub fn at(&self) -> NaiveTime {
        self.at
    }

    /// now 之后（不含 now）的下一次触发时间
    pub fn next_run_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.at);
        if today > now {
            today
        } else {
            today + ChronoDuration::days(1)
        }
    }

    /// 按计划循环执行 job，单次失败只记录日志
    pub async fn run_forever<F, Fut, T>(&self, mut job: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        T: std::fmt::Debug,
    {
        let mut next_run = self.next_run_after(Local::now().naive_local());
        info!("Next run scheduled at {}", next_run);

        loop {
            tokio::time::sleep(self.poll_interval).await;

            let now = Local::now().naive_local();
            if now < next_run {
                continue;
            }

            match job().await {
                Ok(report) => info!("Scheduled run finished: {:?}", report),
                Err(e) => error!("Scheduled run failed ({}): {}", e.kind(), e),
            }

            next_run = self.next_run_after(Local::now().naive_local());
            info!("Next run scheduled at {}", next_run);
        }
    }
}
