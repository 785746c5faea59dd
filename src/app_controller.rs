use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::document::{self, Document, DocumentFormat};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::{self, Provider};
use crate::translation::{
    BackendPool, CancellationFlag, LogReporter, ProgressBarReporter, ProgressReporter, RunStats,
    TranslationClient, TranslationPipeline,
};

// @module: Application controller for document translation

/// What happened to a single input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Translation written to this path
    Written(PathBuf),
    /// Output already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// Counts from a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Provider override (tests, dry runs)
    provider: Option<Arc<dyn Provider>>,
    // @field: Shared with the Ctrl-C handler
    cancellation: CancellationFlag,
    // @field: Draw indicatif bars instead of log lines
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            config,
            provider: None,
            cancellation: CancellationFlag::new(),
            show_progress: true,
        })
    }

    /// Use `provider` instead of the one selected by the configuration
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Observe an externally owned cancellation flag
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Report progress as log lines instead of a terminal bar
    pub fn with_progress_bar(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    fn source_language(&self) -> Result<String, AppError> {
        language_utils::normalize_source_language(&self.config.source_language)
            .map_err(|e| AppError::Config(e.to_string()))
    }

    fn build_pipeline(&self, reporter: Arc<dyn ProgressReporter>) -> Result<TranslationPipeline, AppError> {
        let translation = &self.config.translation;
        let provider = match &self.provider {
            Some(provider) => Arc::clone(provider),
            None => providers::create_provider(translation),
        };
        let pool = BackendPool::from_urls(translation.active_endpoints())
            .map_err(|e| AppError::Config(e.to_string()))?;
        debug!(
            "Using {} with {} endpoint(s), starting at {}",
            provider.name(),
            pool.len(),
            pool.current()
        );

        let client = TranslationClient::new(provider, Arc::new(pool), translation.common.retry_policy());
        Ok(TranslationPipeline::new(client, translation.chunking.strategy())
            .with_reporter(reporter)
            .with_cancellation(self.cancellation.clone()))
    }

    /// Read and extract the text of a document
    pub fn extract(&self, input_file: &Path) -> Result<String, AppError> {
        // Unsupported extensions fail before the file is touched
        let format = DocumentFormat::from_path(input_file)?;
        if !FileManager::file_exists(input_file) {
            return Err(AppError::File(format!("Input file does not exist: {:?}", input_file)));
        }

        let document = Document::from_path(input_file)?;
        debug!("Read {} document ({} bytes)", format, document.len());

        let text = document::extract_text(&document)?;
        info!("Extracted {} characters from {}", text.chars().count(), input_file.display());
        Ok(text)
    }

    /// Translate already extracted text with the configured backend
    pub async fn translate_text(&self, text: &str) -> Result<(String, RunStats), AppError> {
        let source_language = self.source_language()?;
        let target_language = self.config.target_language.clone();

        if self.show_progress {
            let reporter = Arc::new(ProgressBarReporter::new());
            let pipeline = self.build_pipeline(reporter.clone())?;
            let result = pipeline
                .translate_document_with_stats(text, &source_language, &target_language)
                .await;
            // Finish and clear the progress bar before any error is logged
            reporter.finish();
            Ok(result?)
        } else {
            let pipeline = self.build_pipeline(Arc::new(LogReporter))?;
            Ok(pipeline
                .translate_document_with_stats(text, &source_language, &target_language)
                .await?)
        }
    }

    /// Extract and translate a document without writing anything
    pub async fn translate_file(&self, input_file: &Path) -> Result<String, AppError> {
        let text = self.extract(input_file)?;
        let (translated, _) = self.translate_text(&text).await?;
        Ok(translated)
    }

    /// Path the translation of `input_file` is written to
    pub fn output_path(&self, input_file: &Path, output_dir: &Path) -> PathBuf {
        FileManager::generate_output_path(
            input_file,
            output_dir,
            &self.config.target_language,
            self.config.output_format.extension(),
        )
    }

    /// Run the main workflow with input document and output directory
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<RunOutcome, AppError> {
        // Start timing the process
        let start_time = Instant::now();

        // Reject unsupported formats before any other work
        DocumentFormat::from_path(&input_file)?;

        let output_path = self.output_path(&input_file, &output_dir);
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite)");
            return Ok(RunOutcome::Skipped(output_path));
        }

        let text = self.extract(&input_file)?;
        let extraction_time = start_time.elapsed();

        let (translated, stats) = self.translate_text(&text).await?;

        let bytes = document::serialize(&translated, self.config.output_format)?;
        FileManager::ensure_dir(&output_dir).map_err(|e| AppError::File(e.to_string()))?;
        FileManager::write_bytes_atomic(&output_path, &bytes).map_err(|e| AppError::File(e.to_string()))?;
        info!("Success: {}", output_path.display());

        info!(
            "Translation complete. Extraction: {} - Translation: {} ({})",
            Self::format_duration(extraction_time),
            Self::format_duration(stats.duration),
            stats.summary()
        );
        info!("Translation completed in {}", Self::format_duration(start_time.elapsed()));

        Ok(RunOutcome::Written(output_path))
    }

    /// Run the workflow in folder mode, processing all supported documents
    /// Files that already have a translation will be skipped
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary, AppError> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(AppError::File(format!("Input directory does not exist: {:?}", input_dir)));
        }

        let documents = FileManager::find_documents(&input_dir, &self.config.target_language)
            .map_err(|e| AppError::File(e.to_string()))?;
        if documents.is_empty() {
            return Err(AppError::File(format!("No PDF, DOCX or TXT files found in directory: {:?}", input_dir)));
        }

        let folder_pb = if self.show_progress {
            let pb = ProgressBar::new(documents.len() as u64);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
                .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style.progress_chars("█▓▒░"));
            pb.set_message("Processing files");
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut summary = FolderSummary::default();

        for document_path in &documents {
            if self.cancellation.is_cancelled() {
                warn!("Folder processing cancelled");
                break;
            }

            let file_name = document_path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            // Outputs go next to their inputs
            let output_dir = document_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| input_dir.clone());

            match self.run(document_path.clone(), output_dir, force_overwrite).await {
                Ok(RunOutcome::Written(_)) => summary.processed += 1,
                Ok(RunOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {} ({} failed): {}", file_name, e.stage(), e);
                    summary.errors += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors in {}",
            summary.processed,
            summary.skipped,
            summary.errors,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:02}s", seconds, duration.subsec_millis() / 10)
        }
    }
}
