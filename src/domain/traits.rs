use super::{LanguageDetails, ServiceSpec};
use crate::error::Result;
use crate::infra::writer::Output;
use std::fmt::Debug;

/// Core operations the wizard drives, one call per step.
pub trait GenerationBackend: Debug {
    /// Services offered to the user, in display order
    fn selectable_services(&self) -> Vec<ServiceSpec>;

    /// Inspect the project root for marker files
    fn detect(&self) -> Result<LanguageDetails>;

    /// Non-fatal problems with a selection, sorted
    fn selection_warnings(&self, ids: &[String]) -> Result<Vec<String>>;

    /// Output files that already exist in the project root
    fn existing_outputs(&self) -> Vec<&'static str>;

    /// Render and write the compose file, Dockerfile and ignore file
    fn generate(&self, ids: &[String]) -> Result<Output>;
}
