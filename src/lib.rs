pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::history::JsonlHistory;
pub use crate::adapters::openai::OpenAiInvoker;
pub use crate::config::{CliConfig, ModelConfig};
pub use crate::core::pipeline::GenerationPipeline;
pub use crate::domain::model::{
    GenerationReport, GenerationRequest, HistoryEntry, ImageInput, Lang, ListingBundle,
    Marketplace,
};
pub use crate::domain::ports::{ConfigProvider, HistoryStore, ModelInvoker};
pub use crate::utils::error::{GenError, Result};
