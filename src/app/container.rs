use std::path::Path;
use std::sync::Arc;

use crate::adapters::{FfmpegAdapter, FfprobeAdapter, FsLocalAdapter, JsonTimelineAdapter};
use crate::app::{
    import_interactor::ImportInteractor, inspect_interactor::InspectInteractor,
    verify_interactor::VerifyInteractor,
};
use crate::config::ImporterConfig;
use crate::domain::errors::DomainError;
use crate::engine::ExtractionSettings;
use crate::ports::{ConvertPort, FsPort, ProbePort, TimelinePort};
use crate::probe::MediaProber;

pub trait AppContainer: Send + Sync {
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;

    /// Import into the project at `project`, created if missing
    fn import_interactor(
        &self,
        project: &Path,
        fps_override: Option<f64>,
    ) -> Result<Arc<ImportInteractor>, DomainError>;

    /// Verify composites inside an existing project
    fn verify_interactor(&self, project: &Path) -> Result<Arc<VerifyInteractor>, DomainError>;
}

pub struct DefaultAppContainer {
    config: ImporterConfig,
    probe_port: Arc<dyn ProbePort>,
    convert_port: Arc<dyn ConvertPort>,
    fs_port: Arc<dyn FsPort>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: ImporterConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let probe_port: Arc<dyn ProbePort> =
            Arc::new(FfprobeAdapter::new(config.tools.ffprobe.clone()));
        let convert_port: Arc<dyn ConvertPort> = Arc::new(FfmpegAdapter::new(
            config.tools.ffmpeg.clone(),
            config.threads,
        ));
        let fs_port: Arc<dyn FsPort> = Arc::new(FsLocalAdapter::new(config.scratch.dir.clone()));

        let inspect_interactor = Arc::new(InspectInteractor::new(
            Arc::new(MediaProber::new(
                Arc::clone(&probe_port),
                config.timeouts.probe(),
            )),
            Arc::clone(&fs_port),
        ));

        Ok(Self {
            config,
            probe_port,
            convert_port,
            fs_port,
            inspect_interactor,
        })
    }

    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    fn prober(&self) -> MediaProber {
        MediaProber::new(Arc::clone(&self.probe_port), self.config.timeouts.probe())
    }

    fn timeline(
        &self,
        project: &Path,
        fps_override: Option<f64>,
    ) -> Result<Arc<dyn TimelinePort>, DomainError> {
        Ok(Arc::new(JsonTimelineAdapter::open(
            project,
            fps_override,
            self.prober(),
        )?))
    }
}

impl AppContainer for DefaultAppContainer {
    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }

    fn import_interactor(
        &self,
        project: &Path,
        fps_override: Option<f64>,
    ) -> Result<Arc<ImportInteractor>, DomainError> {
        Ok(Arc::new(ImportInteractor::new(
            Arc::new(self.prober()),
            Arc::clone(&self.convert_port),
            Arc::clone(&self.fs_port),
            self.timeline(project, fps_override)?,
            ExtractionSettings::from(&self.config),
        )))
    }

    fn verify_interactor(&self, project: &Path) -> Result<Arc<VerifyInteractor>, DomainError> {
        if !project.is_file() {
            return Err(DomainError::FsFail(format!(
                "Project not found: {}",
                project.display()
            )));
        }
        Ok(Arc::new(VerifyInteractor::new(self.timeline(project, None)?)))
    }
}
