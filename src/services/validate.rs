use crate::domain::{APP_SERVICE_ID, Selection, ServiceCatalog, ServiceSpec, host_port};
use crate::error::Result;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Non-fatal problems with a selection, sorted lexicographically.
///
/// The selection is expanded with its required services before checking, so
/// only soft `dependsOn` links can be reported as missing.
pub fn selection_warnings<I, S>(catalog: &ServiceCatalog, ids: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let selection = Selection::resolve(catalog, ids)?;
    Ok(warnings_for(catalog, &selection))
}

pub fn warnings_for(catalog: &ServiceCatalog, selection: &Selection) -> Vec<String> {
    let mut warnings = dependency_warnings(catalog, selection);
    warnings.extend(port_collision_warnings(catalog, selection));
    warnings.sort();
    warnings.dedup();

    if !warnings.is_empty() {
        debug!("selection has {} warning(s)", warnings.len());
    }
    warnings
}

fn dependency_warnings(catalog: &ServiceCatalog, selection: &Selection) -> Vec<String> {
    let mut warnings = Vec::new();
    for svc in selection.iter().filter_map(|id| catalog.get(id)) {
        for dep in &svc.depends_on {
            if dep == APP_SERVICE_ID || selection.contains(dep) {
                continue;
            }
            let dep_label = catalog
                .get(dep)
                .map(ServiceSpec::display_name)
                .unwrap_or(dep.as_str());
            warnings.push(format!(
                "{} depends on {} but it is not selected",
                svc.display_name(),
                dep_label
            ));
        }
    }
    warnings
}

fn port_collision_warnings(catalog: &ServiceCatalog, selection: &Selection) -> Vec<String> {
    let app = ServiceSpec::app();
    let published = std::iter::once(&app)
        .chain(selection.iter().filter_map(|id| catalog.get(id)))
        .filter(|svc| svc.public);

    let mut owners: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for svc in published {
        for port in &svc.ports {
            let host = host_port(port);
            if host.is_empty() {
                continue;
            }
            owners.entry(host).or_default().insert(svc.display_name());
        }
    }

    owners
        .into_iter()
        .filter(|(_, labels)| labels.len() > 1)
        .map(|(port, labels)| {
            let labels: Vec<&str> = labels.into_iter().collect();
            format!("host port {} is published by {}", port, labels.join(", "))
        })
        .collect()
}
