use super::{compose::render_compose, dockerfile::dockerfile, validate::warnings_for};
use crate::domain::{GenerationBackend, LanguageDetails, Selection, ServiceCatalog, ServiceSpec};
use crate::error::{Error, Result};
use crate::infra::config::load_catalog;
use crate::infra::detect::detect_language;
use crate::infra::preview::{Preview, preview_files};
use crate::infra::writer::{
    COMPOSE_FILE_NAME, DOCKERFILE_FILE_NAME, Output, file_exists, write_files,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Both generated documents for one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub details: LanguageDetails,
    pub compose: String,
    pub dockerfile: String,
}

/// Runs the detect, validate, render and write pipeline for one project root.
#[derive(Debug, Clone)]
pub struct Generator {
    root: PathBuf,
    catalog: ServiceCatalog,
}

impl Generator {
    pub fn new(root: impl Into<PathBuf>, catalog: ServiceCatalog) -> Self {
        Self {
            root: root.into(),
            catalog,
        }
    }

    /// Loads the catalog that applies to `root`.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(Error::MissingRoot);
        }
        let catalog = load_catalog(&root)?;
        Ok(Self::new(root, catalog))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn detect(&self) -> Result<LanguageDetails> {
        detect_language(&self.root)
    }

    pub fn resolve(&self, ids: &[String]) -> Result<Selection> {
        Selection::resolve(&self.catalog, ids)
    }

    pub fn warnings(&self, ids: &[String]) -> Result<Vec<String>> {
        let selection = self.resolve(ids)?;
        Ok(warnings_for(&self.catalog, &selection))
    }

    /// Detects the project and renders both documents without touching disk.
    pub fn render(&self, ids: &[String]) -> Result<Rendered> {
        let selection = self.resolve(ids)?;
        let details = self.detect()?;
        debug!(
            "rendering {} with {} service(s)",
            details.label(),
            selection.len()
        );

        Ok(Rendered {
            compose: render_compose(&self.catalog, &selection),
            dockerfile: dockerfile(&details),
            details,
        })
    }

    pub fn preview(&self, ids: &[String]) -> Result<Preview> {
        let rendered = self.render(ids)?;
        preview_files(&self.root, &rendered.compose, &rendered.dockerfile)
    }

    pub fn generate(&self, ids: &[String]) -> Result<Output> {
        let rendered = self.render(ids)?;
        let output = write_files(&self.root, &rendered.compose, &rendered.dockerfile)?;
        info!("generated files for {}", rendered.details.label());
        Ok(output)
    }

    /// Output files already present in the root, in write order.
    pub fn existing_outputs(&self) -> Vec<&'static str> {
        [COMPOSE_FILE_NAME, DOCKERFILE_FILE_NAME]
            .into_iter()
            .filter(|name| file_exists(&self.root.join(name)))
            .collect()
    }
}

impl GenerationBackend for Generator {
    fn selectable_services(&self) -> Vec<ServiceSpec> {
        self.catalog.selectable().into_iter().cloned().collect()
    }

    fn detect(&self) -> Result<LanguageDetails> {
        Generator::detect(self)
    }

    fn selection_warnings(&self, ids: &[String]) -> Result<Vec<String>> {
        self.warnings(ids)
    }

    fn existing_outputs(&self) -> Vec<&'static str> {
        Generator::existing_outputs(self)
    }

    fn generate(&self, ids: &[String]) -> Result<Output> {
        Generator::generate(self, ids)
    }
}
