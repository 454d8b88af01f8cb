pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod transform;

pub use diagnostics::Diagnostics;
pub use error::{ConfigError, PipelineError};
pub use extract::{Cascade, MergedTable, RawTable};
pub use transform::CleanTable;
