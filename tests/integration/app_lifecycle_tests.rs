/*!
 * Full app lifecycle tests: extract, translate, write
 */

use std::fs;
use std::sync::Arc;

use doctrans::app_config::{Config, OutputFormat};
use doctrans::app_controller::{Controller, FolderSummary, RunOutcome};
use doctrans::document::docx;
use doctrans::errors::AppError;
use doctrans::providers::mock::MockProvider;

use crate::common;

fn test_config() -> Config {
    let mut config = Config::default();
    config.translation.endpoints = vec![common::endpoint_url(0), common::endpoint_url(1)];
    config.translation.common.retry_backoff_ms = 0;
    config.translation.common.timeout_secs = 1;
    config
}

fn controller(config: Config, provider: MockProvider) -> Controller {
    Controller::with_config(config)
        .unwrap()
        .with_provider(Arc::new(provider))
        .with_progress_bar(false)
}

fn dictionary_provider() -> MockProvider {
    MockProvider::working().with_custom_response(common::dictionary_translate)
}

/// A text file is translated next to the requested output directory
#[tokio::test]
async fn test_run_should_write_translated_text_file() {
    common::init_logger();
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "saludo.txt", "Hola mundo\nComo estas").unwrap();
    let out_dir = dir.path().join("out");

    let controller = controller(test_config(), dictionary_provider());
    let outcome = controller.run(input, out_dir.clone(), false).await.unwrap();

    let expected_path = out_dir.join("saludo.en.txt");
    assert_eq!(outcome, RunOutcome::Written(expected_path.clone()));
    assert_eq!(fs::read_to_string(expected_path).unwrap(), "Hello world\nHow are you");
}

/// Existing outputs are kept unless overwriting is forced
#[test]
fn test_run_with_existing_output_should_skip_unless_forced() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "saludo.txt", "Adios").unwrap();
    let existing = common::create_test_file(dir.path(), "saludo.en.txt", "old").unwrap();

    let provider = dictionary_provider();
    let controller = controller(test_config(), provider.clone());

    let outcome = tokio_test::block_on(controller.run(input.clone(), dir.path().to_path_buf(), false)).unwrap();
    assert_eq!(outcome, RunOutcome::Skipped(existing.clone()));
    assert_eq!(fs::read_to_string(&existing).unwrap(), "old");
    assert_eq!(provider.call_count(), 0);

    let outcome = tokio_test::block_on(controller.run(input, dir.path().to_path_buf(), true)).unwrap();
    assert_eq!(outcome, RunOutcome::Written(existing.clone()));
    assert_eq!(fs::read_to_string(&existing).unwrap(), "Goodbye");
}

/// DOCX output holds one paragraph per translated line
#[tokio::test]
async fn test_run_with_docx_output_should_write_word_document() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "carta.txt", "Buenos dias\n\nAdios").unwrap();

    let mut config = test_config();
    config.output_format = OutputFormat::Docx;
    let controller = controller(config, dictionary_provider());

    let outcome = controller.run(input, dir.path().to_path_buf(), false).await.unwrap();

    let path = dir.path().join("carta.en.docx");
    assert_eq!(outcome, RunOutcome::Written(path.clone()));
    let text = docx::extract_text(&fs::read(path).unwrap()).unwrap();
    assert_eq!(text, "Good morning\nGoodbye\n");
}

/// Unsupported formats fail in the extraction stage without any backend call
#[tokio::test]
async fn test_run_with_unsupported_format_should_fail_before_translation() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "slides.pptx", "not really").unwrap();
    let provider = dictionary_provider();
    let controller = controller(test_config(), provider.clone());

    let err = controller.run(input, dir.path().to_path_buf(), false).await.unwrap_err();

    assert_eq!(err.stage(), "extraction");
    assert!(err.to_string().contains("Unsupported file format"));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_extract_with_missing_file_should_be_file_error() {
    let dir = common::create_temp_dir().unwrap();
    let controller = controller(test_config(), dictionary_provider());

    let err = controller.extract(&dir.path().join("missing.pdf")).unwrap_err();
    assert!(matches!(err, AppError::File(_)));
}

/// A failed translation leaves no output file behind
#[tokio::test]
async fn test_run_with_failing_backends_should_not_write_output() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "informe.txt", "Hola mundo").unwrap();
    let provider = MockProvider::failing();
    let controller = controller(test_config(), provider.clone());

    let err = controller.run(input, dir.path().to_path_buf(), false).await.unwrap_err();

    assert_eq!(err.stage(), "translation");
    assert!(!dir.path().join("informe.en.txt").exists());
    // Default budget: three attempts
    assert_eq!(provider.call_count(), 3);
}

/// Folder mode counts written, skipped and failed documents
#[tokio::test]
async fn test_run_folder_should_summarize_results() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "a.txt", "Hola mundo").unwrap();
    common::create_test_file(dir.path(), "b.txt", "Adios").unwrap();
    common::create_test_file(dir.path(), "b.en.txt", "already done").unwrap();
    // Not a real Word file, so extraction fails
    common::create_test_file(dir.path(), "c.docx", "garbage").unwrap();
    common::create_test_file(dir.path(), "ignored.md", "# nope").unwrap();

    let controller = controller(test_config(), dictionary_provider());
    let summary = controller.run_folder(dir.path().to_path_buf(), false).await.unwrap();

    assert_eq!(
        summary,
        FolderSummary {
            processed: 1,
            skipped: 1,
            errors: 1,
        }
    );
    assert_eq!(fs::read_to_string(dir.path().join("a.en.txt")).unwrap(), "Hello world");
    assert_eq!(fs::read_to_string(dir.path().join("b.en.txt")).unwrap(), "already done");
}

#[tokio::test]
async fn test_run_folder_without_documents_should_fail() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "notes.md", "nothing to do").unwrap();
    let controller = controller(test_config(), dictionary_provider());

    assert!(matches!(
        controller.run_folder(dir.path().to_path_buf(), false).await,
        Err(AppError::File(_))
    ));
}

/// A cancelled controller stops before dispatching anything
#[tokio::test]
async fn test_cancelled_run_should_report_translation_stage() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "a.txt", "Hola mundo").unwrap();
    let provider = dictionary_provider();
    let controller = controller(test_config(), provider.clone());
    controller.cancellation().cancel();

    let err = controller.run(input, dir.path().to_path_buf(), false).await.unwrap_err();

    assert_eq!(err.stage(), "translation");
    assert_eq!(provider.call_count(), 0);
}

/// Source names are normalized before reaching the backend
#[tokio::test]
async fn test_translate_text_should_normalize_source_language() {
    let mut config = test_config();
    config.source_language = "Chinese".to_string();
    let provider = MockProvider::working();
    let controller = controller(config, provider.clone());

    let (translated, stats) = controller.translate_text("你好").await.unwrap();

    assert_eq!(translated, "[EN] 你好");
    assert_eq!(stats.total_chunks, 1);
    assert_eq!(provider.calls()[0].source_language, "zh");
}
