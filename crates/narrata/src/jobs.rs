//! One-shot rendering of text files outside the HTTP surface.

use narrata_core::{BatchReport, ErrorPolicy, ProjectId, ProjectState};
use narrata_error::{NarrataResult, StorageError, StorageErrorKind};
use narrata_pipeline::{BatchController, PipelineRunner, RunOutcome};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Creates a project from a text file; the title defaults to the file stem.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn load_project(
    runner: &PipelineRunner,
    text_file: &Path,
    title: Option<String>,
) -> NarrataResult<ProjectId> {
    let text = tokio::fs::read_to_string(text_file).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            text_file.display(),
            e
        )))
    })?;
    let title = title.unwrap_or_else(|| {
        text_file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string())
    });

    let id = ProjectId::generate();
    let mut project = ProjectState::new(id.clone(), title);
    project.source_text = Some(text);
    runner.store().insert(project);
    Ok(id)
}

/// Runs one text file to completion and writes the artifact to `output`.
///
/// A failed run is returned as [`RunOutcome::Failed`] and writes nothing.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the project cannot start,
/// or the artifact cannot be copied out.
#[instrument(skip(runner, text_file, title, output), fields(input = %text_file.display(), output = %output.display()))]
pub async fn render_file(
    runner: &PipelineRunner,
    text_file: &Path,
    title: Option<String>,
    output: &Path,
) -> NarrataResult<RunOutcome> {
    let id = load_project(runner, text_file, title).await?;
    let outcome = runner.run(&id).await?;

    if let RunOutcome::Completed(artifact) = &outcome {
        let bytes = runner.storage().retrieve(artifact).await?;
        tokio::fs::write(output, &bytes).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                output.display(),
                e
            )))
        })?;
        info!(bytes = bytes.len(), "Artifact written");
    }
    Ok(outcome)
}

/// Runs several text files as one batch.
///
/// # Errors
///
/// Returns an error if any input cannot be read, the limit is zero, or a
/// fail-fast batch stops.
#[instrument(skip(runner, files), fields(files = files.len()))]
pub async fn batch_files(
    runner: &PipelineRunner,
    files: &[PathBuf],
    concurrency_limit: usize,
    error_policy: ErrorPolicy,
) -> NarrataResult<BatchReport> {
    let mut ids = Vec::with_capacity(files.len());
    for file in files {
        ids.push(load_project(runner, file, None).await?);
    }
    BatchController::new(runner.clone())
        .run_batch(ids, concurrency_limit, error_policy)
        .await
}
