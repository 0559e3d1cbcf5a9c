// src/config/mod.rs
pub mod consts;
pub mod options;
pub mod settings;

pub use options::{AnalysisOptions, ExportFormat, ExportOptions, Selection};
pub use settings::Settings;
