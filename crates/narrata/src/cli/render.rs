//! `render` and `batch` command handlers.

use narrata::{
    ErrorPolicy, NarrataConfig, ProjectStore, RunOutcome, batch_files, build_runner, render_file,
};
use std::path::{Path, PathBuf};

/// Handle the `render` command
pub async fn handle_render(
    config: &NarrataConfig,
    text_file: &Path,
    output: &Path,
    title: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let runner = build_runner(config, ProjectStore::new())?;

    match render_file(&runner, text_file, title, output).await? {
        RunOutcome::Completed(artifact) => {
            println!(
                "Wrote {} ({:.1}s{})",
                output.display(),
                artifact.duration_seconds,
                if artifact.placeholder { ", placeholder" } else { "" }
            );
            let metrics = runner.metrics().snapshot();
            if metrics.fallback_substitutions > 0 {
                println!("{} scene media replaced by placeholders", metrics.fallback_substitutions);
            }
            Ok(())
        }
        RunOutcome::Failed(reason) => {
            tracing::error!(reason = %reason, "Render failed");
            Err(format!("Render failed: {}", reason).into())
        }
    }
}

/// Handle the `batch` command
pub async fn handle_batch(
    config: &NarrataConfig,
    text_files: &[PathBuf],
    concurrency: Option<usize>,
    fail_fast: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runner = build_runner(config, ProjectStore::new())?;
    let limit = concurrency.unwrap_or(*config.pipeline().default_batch_concurrency());
    let policy = if fail_fast {
        ErrorPolicy::FailFast
    } else {
        ErrorPolicy::SkipAndContinue
    };

    let report = batch_files(&runner, text_files, limit, policy).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    println!(
        "{} succeeded, {} failed",
        report.success_count(),
        report.failure_count()
    );
    Ok(())
}
