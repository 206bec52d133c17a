use std::sync::Arc;

use crate::cv::store::CvStore;
use crate::cv::CvPipeline;
use crate::profiles::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileStore>,
    pub cvs: Arc<dyn CvStore>,
    /// Writes through the same `CvStore` as `cvs`.
    pub pipeline: CvPipeline,
}
