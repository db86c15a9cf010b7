//! House price ML - оценка стоимости жилья по пяти признакам района

pub mod api;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod types;

pub use error::{MlError, MlResult};
pub use models::*;
pub use pipeline::InferencePipeline;
pub use preprocessing::*;
pub use types::*;
