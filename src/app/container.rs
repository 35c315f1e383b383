use std::sync::Arc;

use crate::adapters::{
    AppConfig, FFmpegAdapter, FFprobeAdapter, FalQueueAdapter, FsLocalAdapter,
    HttpDownloadAdapter,
};
use crate::app::edit_interactor::EditInteractor;
use crate::domain::errors::DomainError;
use crate::ports::{DownloadPort, FsPort, MediaPort, ProbePort, RemoteEditPort};

pub trait AppContainer: Send + Sync {
    fn edit_interactor(&self) -> Arc<EditInteractor>;
}

pub struct DefaultAppContainer {
    edit_interactor: Arc<EditInteractor>,
}

impl DefaultAppContainer {
    /// Wire the production adapters. The credential is checked first so a
    /// missing key fails before any tool lookup or media work.
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        let remote_port = Arc::new(FalQueueAdapter::new(config.fal_config()?)?);
        let probe_port = Arc::new(FFprobeAdapter::new()?);
        let media_port = Arc::new(FFmpegAdapter::new()?);
        let download_port = Arc::new(HttpDownloadAdapter::new()?);
        let fs_port = Arc::new(FsLocalAdapter::new());

        let edit_interactor = Arc::new(EditInteractor::new(
            probe_port as Arc<dyn ProbePort>,
            media_port as Arc<dyn MediaPort>,
            remote_port as Arc<dyn RemoteEditPort>,
            download_port as Arc<dyn DownloadPort>,
            fs_port as Arc<dyn FsPort>,
        ));

        Ok(Self { edit_interactor })
    }
}

impl AppContainer for DefaultAppContainer {
    fn edit_interactor(&self) -> Arc<EditInteractor> {
        Arc::clone(&self.edit_interactor)
    }
}
