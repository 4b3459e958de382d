pub mod catalog;
mod language;
mod selection;
mod service;
pub mod traits;

pub use catalog::ServiceCatalog;
pub use language::{Language, LanguageDetails};
pub use selection::Selection;
pub use service::{APP_PORT, APP_SERVICE_ID, ServiceSpec, container_port, host_port};
pub use traits::GenerationBackend;
