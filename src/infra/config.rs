use crate::domain::{ServiceCatalog, ServiceSpec};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Catalog location relative to the project root or the executable directory.
pub const CATALOG_RELATIVE_PATH: &str = "config/services.json";

/// Catalog shipped with the binary, installed by `init`.
pub const DEFAULT_CATALOG: &str = include_str!("../../config/services.json");

/// Places searched for the catalog, in order: project root, then executable directory.
pub fn catalog_search_paths(root: &Path) -> Vec<PathBuf> {
    let mut paths = vec![root.join(CATALOG_RELATIVE_PATH)];
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(exe_dir.join(CATALOG_RELATIVE_PATH));
    }
    paths
}

/// Loads and validates the service catalog for `root`.
pub fn load_catalog(root: &Path) -> Result<ServiceCatalog> {
    if root.as_os_str().is_empty() {
        return Err(Error::MissingRoot);
    }
    load_catalog_from(&catalog_search_paths(root))
}

/// Loads the first catalog found among `candidates`.
pub fn load_catalog_from(candidates: &[PathBuf]) -> Result<ServiceCatalog> {
    for path in candidates {
        match fs::read_to_string(path) {
            Ok(content) => {
                info!("loading service catalog from {:?}", path);
                return ServiceCatalog::from_json(&content, path);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no service catalog at {:?}", path);
            }
            Err(e) => return Err(Error::io("reading service catalog", path, e)),
        }
    }

    Err(Error::CatalogNotFound {
        searched: candidates.to_vec(),
    })
}

/// Selectable services of the catalog for `root`, in display order.
pub fn selectable_services(root: &Path) -> Result<Vec<ServiceSpec>> {
    let catalog = load_catalog(root)?;
    Ok(catalog.selectable().into_iter().cloned().collect())
}

/// Id lookup and full display-ordered list of the catalog for `root`.
pub fn catalog_map(root: &Path) -> Result<(HashMap<String, ServiceSpec>, Vec<ServiceSpec>)> {
    let catalog = load_catalog(root)?;
    let ordered = catalog.services().to_vec();
    let map = ordered
        .iter()
        .map(|svc| (svc.id.clone(), svc.clone()))
        .collect();
    Ok((map, ordered))
}

/// Writes the bundled catalog to `root/config/services.json` unless one exists.
///
/// Returns the path written, or `None` when a catalog was already present.
pub fn install_default_catalog(root: &Path) -> Result<Option<PathBuf>> {
    let target = root.join(CATALOG_RELATIVE_PATH);
    if target.exists() {
        return Ok(None);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io("creating", parent, e))?;
    }
    fs::write(&target, DEFAULT_CATALOG).map_err(|e| Error::io("writing", &target, e))?;

    Ok(Some(target))
}
