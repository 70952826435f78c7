use docsync_core::SyncStatus;
use docsync_engine::{ProgressSink, Stage, SyncEvent};
use sync_logging::{sync_info, sync_trace, sync_warn};

/// Turns pipeline events into log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: SyncEvent) {
        match event {
            SyncEvent::Progress(progress) => match progress.stage {
                Stage::Cloning => sync_info!("cloning repository"),
                stage => sync_trace!(
                    "item {} {:?} {} bytes",
                    progress.item,
                    stage,
                    progress.bytes.unwrap_or(0)
                ),
            },
            SyncEvent::ItemCompleted(result) => match result.status {
                SyncStatus::Failed => sync_warn!(
                    "failed {}: {}",
                    result.output_path,
                    result.detail.as_deref().unwrap_or("unknown error")
                ),
                status => sync_info!(
                    "{} {} ({} bytes)",
                    status,
                    result.output_path,
                    result.size_bytes
                ),
            },
        }
    }
}
