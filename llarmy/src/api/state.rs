use std::sync::Arc;

use crate::config::Config;
use crate::ocr::OcrTools;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tools: OcrTools,
}

impl AppState {
    pub fn new(config: Config, tools: OcrTools) -> Self {
        Self {
            config: Arc::new(config),
            tools,
        }
    }
}
