pub mod autofix;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod schema;

pub use crate::domain::model::{
    GenerationReport, GenerationRequest, ImageInput, Lang, ListingBundle, Marketplace,
};
pub use crate::domain::ports::{ConfigProvider, HistoryStore, ModelInvoker};
pub use crate::utils::error::Result;
