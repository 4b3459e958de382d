pub mod config;
pub mod detect;
pub mod preview;
pub mod version;
pub mod writer;

pub use config::{install_default_catalog, load_catalog};
pub use detect::detect_language;
pub use preview::{FilePreview, FileStatus, Preview, preview_files};
pub use writer::{Output, write_files};
