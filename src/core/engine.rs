use crate::core::validator::UploadValidator;
use crate::core::Pipeline;
use crate::domain::model::{AnalysisResult, UploadRequest};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs one upload through validate → stage → extract → match.
///
/// The staged file is a drop guard, so it is removed on every path out of [`run`]:
/// success, early `?` return, or unwinding.
///
/// [`run`]: ScanEngine::run
pub struct ScanEngine<P: Pipeline> {
    pipeline: P,
    validator: UploadValidator,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ScanEngine<P> {
    pub fn new(pipeline: P, validator: UploadValidator) -> Self {
        Self::new_with_monitoring(pipeline, validator, false)
    }

    pub fn new_with_monitoring(
        pipeline: P,
        validator: UploadValidator,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            pipeline,
            validator,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn monitor(&self) -> &SystemMonitor {
        &self.monitor
    }

    pub async fn run(&self, request: UploadRequest) -> Result<AnalysisResult> {
        // 驗證失敗時不會寫任何檔案
        let file = self.validator.validate(&request)?;

        tracing::debug!(
            file_name = %file.file_name,
            size = file.data.len(),
            "Upload accepted"
        );

        let staged = self.pipeline.stage(file).await?;

        let outcome = self.pipeline.extract(&staged).await;
        let extraction_failed = outcome.is_failed();
        let text = outcome.into_text();

        let found_substances = self.pipeline.find_substances(&text);

        tracing::info!(
            staged = %staged.file_name(),
            chars = text.chars().count(),
            extraction_failed,
            found = found_substances.len(),
            "Scan finished"
        );

        drop(staged);
        self.monitor.log_stats("Scan");

        Ok(AnalysisResult {
            text,
            found_substances,
        })
    }
}
