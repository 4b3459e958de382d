pub mod cli;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;

// Shared with the integration tests under tests/
pub mod test_support;

pub use domain::{
    GenerationBackend, Language, LanguageDetails, Selection, ServiceCatalog, ServiceSpec,
};
pub use error::{Error, ErrorKind, Result};
pub use infra::{Output, Preview, detect_language, load_catalog, preview_files, write_files};
pub use services::{Generator, compose, dockerfile, selection_warnings};
