//! Job Worker - 后台下载投递任务
//!
//! 每个任务一个 tokio task，提交后不等待、不重试、不回报结果

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::ports::{DeliveryJob, JobSchedulerPort, SchedulerError};
use crate::application::{Acquisition, AcquisitionPipeline, DeliveryAdapter, PipelineError};

/// 任务提交端（实现 JobSchedulerPort）
#[derive(Clone)]
pub struct JobDispatcher {
    sender: mpsc::UnboundedSender<DeliveryJob>,
}

impl JobDispatcher {
    pub fn new(sender: mpsc::UnboundedSender<DeliveryJob>) -> Self {
        Self { sender }
    }
}

impl JobSchedulerPort for JobDispatcher {
    fn submit(&self, job: DeliveryJob) -> Result<(), SchedulerError> {
        tracing::debug!(job_id = %job.job_id, "Job submitted");
        self.sender
            .send(job)
            .map_err(|_| SchedulerError::WorkerStopped)
    }
}

/// 任务执行端
pub struct JobWorker {
    queue_receiver: mpsc::UnboundedReceiver<DeliveryJob>,
    pipeline: Arc<AcquisitionPipeline>,
    delivery: Arc<DeliveryAdapter>,
}

impl JobWorker {
    pub fn new(
        queue_receiver: mpsc::UnboundedReceiver<DeliveryJob>,
        pipeline: Arc<AcquisitionPipeline>,
        delivery: Arc<DeliveryAdapter>,
    ) -> Self {
        Self {
            queue_receiver,
            pipeline,
            delivery,
        }
    }

    /// 启动 Worker，所有发送端关闭后退出
    pub async fn run(mut self) {
        tracing::info!("JobWorker started");

        while let Some(job) = self.queue_receiver.recv().await {
            let pipeline = self.pipeline.clone();
            let delivery = self.delivery.clone();

            tokio::spawn(async move {
                process_job(job, &pipeline, &delivery).await;
            });
        }

        tracing::info!("JobWorker stopped");
    }
}

/// 处理单个任务：下载 → 投递 → 释放草稿锁
pub async fn process_job(job: DeliveryJob, pipeline: &AcquisitionPipeline, delivery: &DeliveryAdapter) {
    tracing::info!(
        job_id = %job.job_id,
        url = %job.url,
        chat_id = %job.chat_id,
        "Job started"
    );

    let Acquisition { artifact, lease } = match pipeline.acquire(&job.url, job.chat_id).await {
        Ok(acquisition) => acquisition,
        Err(e) => {
            log_pipeline_error(&job, &e);
            return;
        }
    };

    tracing::info!(
        job_id = %job.job_id,
        video_id = %lease.video_id(),
        title = %artifact.title,
        duration = artifact.duration,
        "Audio ready"
    );

    // 失败已在 DeliveryAdapter 里记录
    let delivered = delivery.deliver(artifact).await.is_ok();
    drop(lease);

    tracing::info!(job_id = %job.job_id, delivered, "Job finished");
}

fn log_pipeline_error(job: &DeliveryJob, e: &PipelineError) {
    match e {
        PipelineError::Resolve { .. } => {
            tracing::error!(job_id = %job.job_id, kind = e.kind(), error = %e, "Failed to get video info");
        }
        PipelineError::NoAudioFormat { .. } => {
            tracing::warn!(job_id = %job.job_id, kind = e.kind(), error = %e, "Audio not found");
        }
        PipelineError::Download { .. } => {
            tracing::error!(job_id = %job.job_id, kind = e.kind(), error = %e, "Failed to download audio");
        }
    }
}
