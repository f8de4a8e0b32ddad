//! The per-project state machine.

use crate::{PipelineConfig, PipelineMetrics, ProjectStore, SceneRecorder, SceneSupervisor};
use chrono::Utc;
use narrata_core::{
    ArtifactRef, AudioClip, FailureReason, GenerationParams, ImageAsset, MediaKind, ProjectId,
    ProjectSettings, ProjectStatus, Scene, SceneRecord, StepStatus, Visual,
};
use narrata_error::{NarrataResult, PipelineError, PipelineErrorKind};
use narrata_interface::SceneSegmenter;
use narrata_media::{OutputValidator, TimelineComposer, TrackBalancer};
use narrata_storage::{ArtifactMetadata, ArtifactStorage};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// How a pipeline execution ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The project reached `Completed`.
    Completed(ArtifactRef),
    /// The project reached `Failed`.
    Failed(FailureReason),
}

impl RunOutcome {
    /// Whether the project completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    /// The failure, if the project failed.
    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            RunOutcome::Completed(_) => None,
            RunOutcome::Failed(reason) => Some(reason),
        }
    }
}

/// The running execution of one project.
#[derive(Debug)]
pub struct PipelineHandle {
    project_id: ProjectId,
    store: ProjectStore,
    task: JoinHandle<RunOutcome>,
}

impl PipelineHandle {
    /// The project being run.
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Requests cooperative cancellation.
    ///
    /// The pipeline stops at its next checkpoint; an in-flight scene finishes.
    pub fn cancel(&self) -> bool {
        self.store.request_cancel(&self.project_id)
    }

    /// Whether the execution has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the execution to end.
    pub async fn wait(self) -> RunOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let reason = FailureReason::Stage {
                    stage: self
                        .store
                        .read(&self.project_id, |s| s.status)
                        .unwrap_or(ProjectStatus::Failed),
                    message: format!("pipeline task aborted: {}", e),
                };
                self.store
                    .update(&self.project_id, |s| s.fail(reason.clone()));
                RunOutcome::Failed(reason)
            }
        }
    }
}

/// Drives projects from source text to a stored video.
///
/// A project is owned by at most one execution at a time. Stages run in
/// order and every scene within a stage runs in ascending scene order;
/// the cancel flag is checked before each scene and between stages.
#[derive(Clone)]
pub struct PipelineRunner {
    store: ProjectStore,
    segmenter: Arc<dyn SceneSegmenter>,
    supervisor: Arc<SceneSupervisor>,
    balancer: TrackBalancer,
    composer: TimelineComposer,
    validator: OutputValidator,
    storage: Arc<dyn ArtifactStorage>,
    config: PipelineConfig,
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner")
            .field("segmenter", &self.segmenter.name())
            .field("supervisor", &self.supervisor)
            .field("composer", &self.composer)
            .field("validator", &self.validator)
            .field("config", &self.config)
            .finish()
    }
}

impl PipelineRunner {
    /// Runner over `store`.
    pub fn new(
        store: ProjectStore,
        segmenter: Arc<dyn SceneSegmenter>,
        supervisor: SceneSupervisor,
        composer: TimelineComposer,
        storage: Arc<dyn ArtifactStorage>,
        config: PipelineConfig,
    ) -> Self {
        let balancer = TrackBalancer::new(supervisor.fallback().clone());
        Self {
            store,
            segmenter,
            supervisor: Arc::new(supervisor),
            balancer,
            composer,
            validator: OutputValidator::default(),
            storage,
            config,
        }
    }

    /// Replaces the output validator.
    pub fn with_validator(mut self, validator: OutputValidator) -> Self {
        self.validator = validator;
        self
    }

    /// The scene segmenter.
    pub fn segmenter(&self) -> &Arc<dyn SceneSegmenter> {
        &self.segmenter
    }

    /// The project store.
    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    /// Artifact storage.
    pub fn storage(&self) -> &Arc<dyn ArtifactStorage> {
        &self.storage
    }

    /// Pipeline settings.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process-wide counters.
    pub fn metrics(&self) -> &PipelineMetrics {
        self.supervisor.metrics()
    }

    /// Starts an execution for the project.
    ///
    /// The single-flight check and the move to `TextAnalyzing` happen in
    /// one store update, so two concurrent starts cannot both succeed.
    /// Terminal projects are reset and run again.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound`, `AlreadyRunning` or `NoSourceText`; the project is
    /// left untouched in each case.
    #[instrument(skip(self, id), fields(project_id = %id))]
    pub fn start(&self, id: &ProjectId) -> NarrataResult<PipelineHandle> {
        let claimed = self
            .store
            .update(id, |state| {
                if state.status.is_running() {
                    return Err(PipelineErrorKind::AlreadyRunning(id.to_string()));
                }
                let text = state
                    .source_text
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| PipelineErrorKind::NoSourceText(id.to_string()))?;

                state.reset_for_run();
                state.stats.started_at = Some(Utc::now());
                state.transition(ProjectStatus::TextAnalyzing);
                Ok((text, state.settings.clone()))
            })
            .ok_or_else(|| PipelineError::new(PipelineErrorKind::ProjectNotFound(id.to_string())))?;

        let (text, settings) = claimed.map_err(PipelineError::new)?;
        info!("Pipeline started");
        self.metrics().record_started();

        let runner = self.clone();
        let project_id = id.clone();
        let task = tokio::spawn(async move { runner.execute(project_id, text, settings).await });

        Ok(PipelineHandle {
            project_id: id.clone(),
            store: self.store.clone(),
            task,
        })
    }

    /// Starts the project and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`start`](Self::start).
    pub async fn run(&self, id: &ProjectId) -> NarrataResult<RunOutcome> {
        Ok(self.start(id)?.wait().await)
    }

    #[instrument(skip(self, id, text, settings), fields(project_id = %id))]
    async fn execute(&self, id: ProjectId, text: String, settings: ProjectSettings) -> RunOutcome {
        let outcome = match self.stages(&id, &text, &settings).await {
            Ok(artifact) => RunOutcome::Completed(artifact),
            Err(reason) => {
                self.store.update(&id, |state| state.fail(reason.clone()));
                RunOutcome::Failed(reason)
            }
        };

        match &outcome {
            RunOutcome::Completed(artifact) => {
                info!(
                    hash = %artifact.content_hash,
                    duration = artifact.duration_seconds,
                    placeholder = artifact.placeholder,
                    "Pipeline completed"
                );
                self.metrics().record_completed();
            }
            RunOutcome::Failed(FailureReason::Cancelled) => {
                info!("Pipeline cancelled");
                self.metrics().record_cancelled();
            }
            RunOutcome::Failed(reason) => {
                warn!(reason = %reason, "Pipeline failed");
                self.metrics().record_failed();
            }
        }
        outcome
    }

    async fn stages(
        &self,
        id: &ProjectId,
        text: &str,
        settings: &ProjectSettings,
    ) -> Result<ArtifactRef, FailureReason> {
        let wants_video = settings.wants_video(*self.config.video_from_image());

        let scenes = self.segment(id, text, wants_video).await?;
        let params: Vec<GenerationParams> = scenes
            .iter()
            .map(|scene| GenerationParams::for_scene(scene, settings))
            .collect();

        self.enter(id, ProjectStatus::ImagesGenerating)?;
        let mut images: Vec<ImageAsset> = Vec::with_capacity(scenes.len());
        for (index, scene) in scenes.iter().enumerate() {
            self.checkpoint(id)?;
            let recorder = SceneRecorder::new(self.store.clone(), id.clone(), index);
            images.push(self.supervisor.resolve_image(scene, &params[index], &recorder).await);
        }
        self.enter(id, ProjectStatus::ImagesGenerated)?;

        self.enter(id, ProjectStatus::AudioGenerating)?;
        let mut audio: Vec<AudioClip> = Vec::with_capacity(scenes.len());
        for (index, scene) in scenes.iter().enumerate() {
            self.checkpoint(id)?;
            let recorder = SceneRecorder::new(self.store.clone(), id.clone(), index);
            audio.push(self.supervisor.resolve_audio(scene, &params[index], &recorder).await);
        }
        self.enter(id, ProjectStatus::AudioGenerated)?;

        let visuals: Vec<Visual> = if wants_video {
            self.enter(id, ProjectStatus::VideosGenerating)?;
            let mut visuals = Vec::with_capacity(scenes.len());
            for (index, (scene, image)) in scenes.iter().zip(images).enumerate() {
                self.checkpoint(id)?;
                let recorder = SceneRecorder::new(self.store.clone(), id.clone(), index);
                visuals.push(
                    self.supervisor
                        .resolve_video(image, scene, &params[index], &recorder)
                        .await,
                );
            }
            self.enter(id, ProjectStatus::VideosGenerated)?;
            visuals
        } else {
            images.into_iter().map(Visual::from).collect()
        };

        self.enter(id, ProjectStatus::Composing)?;
        let captions: Vec<String> = scenes.iter().map(|s| s.text().clone()).collect();
        let media_report = self.validator.check_media(&visuals, &audio);
        let tracks = self.balancer.balance(visuals, audio);
        let artifact = self
            .composer
            .with_frame(*settings.width(), *settings.height(), *settings.fps())
            .compose(tracks, &captions)
            .await;
        let validation = self.validator.check_video(media_report, &artifact);
        info!(
            project_id = %id,
            valid = validation.is_valid,
            score = validation.quality_score,
            issues = validation.issues.len(),
            warnings = validation.warnings.len(),
            "Output validated"
        );

        let metadata = ArtifactMetadata::new(MediaKind::Video, artifact.mime_type.clone())
            .with_duration(artifact.duration_seconds)
            .with_placeholder(artifact.placeholder);
        let stored = self
            .storage
            .store(&artifact.bytes, &metadata)
            .await
            .map_err(|e| stage_failure(ProjectStatus::Composing, e))?;

        let recorded = self.store.update(id, |state| {
            state.artifact = Some(stored.clone());
            state.validation = Some(validation);
            state.transition(ProjectStatus::Completed);
        });
        if recorded.is_none() {
            // Deleted while composing; nothing will ever reference the file.
            if let Err(e) = self.storage.delete(&stored).await {
                warn!(project_id = %id, error = %e, "Failed to remove orphaned artifact");
            }
            return Err(FailureReason::Cancelled);
        }
        Ok(stored)
    }

    async fn segment(
        &self,
        id: &ProjectId,
        text: &str,
        wants_video: bool,
    ) -> Result<Vec<Arc<Scene>>, FailureReason> {
        self.checkpoint(id)?;
        let mut scenes = self.segmenter.segment(text).await.map_err(|e| {
            stage_failure(
                ProjectStatus::TextAnalyzing,
                PipelineErrorKind::Segmentation(e.to_string()),
            )
        })?;
        if scenes.is_empty() {
            return Err(stage_failure(
                ProjectStatus::TextAnalyzing,
                PipelineErrorKind::NoScenes,
            ));
        }
        scenes.sort_by_key(|scene| *scene.order());
        let scenes: Vec<Arc<Scene>> = scenes.into_iter().map(Arc::new).collect();

        self.checkpoint(id)?;
        self.store
            .update(id, |state| {
                state.scenes = scenes
                    .iter()
                    .map(|scene| {
                        let mut record = SceneRecord::new(scene.clone());
                        if !wants_video {
                            record.video = StepStatus::Skipped;
                        }
                        record
                    })
                    .collect();
                state.stats.total_scenes = scenes.len();
                state.transition(ProjectStatus::TextAnalyzed);
            })
            .ok_or(FailureReason::Cancelled)?;
        info!(project_id = %id, scenes = scenes.len(), segmenter = self.segmenter.name(), "Text analyzed");
        Ok(scenes)
    }

    /// Fails with `Cancelled` if a stop was requested or the project was deleted.
    fn checkpoint(&self, id: &ProjectId) -> Result<(), FailureReason> {
        match self.store.read(id, |state| state.cancel_requested) {
            Some(false) => Ok(()),
            Some(true) | None => Err(FailureReason::Cancelled),
        }
    }

    fn enter(&self, id: &ProjectId, status: ProjectStatus) -> Result<(), FailureReason> {
        self.checkpoint(id)?;
        self.store
            .update(id, |state| state.transition(status))
            .ok_or(FailureReason::Cancelled)?;
        info!(project_id = %id, status = %status, "Stage entered");
        Ok(())
    }
}

fn stage_failure(stage: ProjectStatus, error: impl std::fmt::Display) -> FailureReason {
    FailureReason::Stage {
        stage,
        message: error.to_string(),
    }
}
