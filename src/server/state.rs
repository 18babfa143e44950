use crate::{config::Settings, pipeline::TripPipeline};

/// Shared by every request; one pipeline serves them all.
#[derive(Debug)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub pipeline: TripPipeline,
}

impl AppState {
    pub fn new(settings: &Settings, pipeline: TripPipeline) -> Self {
        Self {
            app_name: settings.app_name.clone(),
            version: settings.app_version.clone(),
            pipeline,
        }
    }
}
