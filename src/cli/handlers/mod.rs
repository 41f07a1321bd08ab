mod query;
mod sdl;

pub use query::handle_query;
pub use sdl::handle_sdl;

use crate::config::BocchiConfig;
use crate::demo::{DemoSchema, build_schema};

/// Common context passed to all command handlers
pub struct CommandContext {
    pub config: BocchiConfig,
}

impl CommandContext {
    pub fn new(config: BocchiConfig) -> Self {
        Self { config }
    }

    pub fn schema(&self) -> DemoSchema {
        build_schema(&self.config.server, &self.config.demo)
    }
}
