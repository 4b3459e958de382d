use super::catalog::ServiceCatalog;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use tracing::debug;

/// Service ids chosen for one generation run, already expanded with every
/// transitively required service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    /// Validates `ids` against the catalog and expands the `requires` closure.
    ///
    /// Empty ids are ignored; unknown ids fail with [`Error::UnknownService`].
    pub fn resolve<I, S>(catalog: &ServiceCatalog, ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut requested = Vec::new();
        for id in ids {
            let id = id.as_ref().trim();
            if id.is_empty() {
                continue;
            }
            if !catalog.contains(id) {
                return Err(Error::UnknownService(id.to_string()));
            }
            requested.push(id.to_string());
        }

        let ids = required_closure(catalog, requested)?;
        debug!("selection resolved to {:?}", ids);
        Ok(Self { ids })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// Depth-first reachability over `requires` edges starting from `roots`.
fn required_closure(catalog: &ServiceCatalog, roots: Vec<String>) -> Result<BTreeSet<String>> {
    let mut visited = BTreeSet::new();
    let mut stack = roots;

    while let Some(id) = stack.pop() {
        if visited.contains(&id) {
            continue;
        }
        let svc = catalog
            .get(&id)
            .ok_or_else(|| Error::UnknownService(id.clone()))?;
        stack.extend(
            svc.requires
                .iter()
                .filter(|req| !visited.contains(*req))
                .cloned(),
        );
        visited.insert(id);
    }

    Ok(visited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServiceSpec;

    fn catalog() -> ServiceCatalog {
        let svc = |id: &str, requires: &[&str]| ServiceSpec {
            id: id.into(),
            requires: requires.iter().map(|r| r.to_string()).collect(),
            selectable: true,
            ..Default::default()
        };
        ServiceCatalog::from_services(vec![
            svc("kafka", &["zookeeper"]),
            svc("zookeeper", &[]),
            svc("connect", &["kafka", "schema-registry"]),
            svc("schema-registry", &["kafka"]),
            svc("redis", &[]),
        ])
        .unwrap()
    }

    #[test]
    fn expands_transitive_requirements() {
        let selection = Selection::resolve(&catalog(), ["connect"]).unwrap();
        let ids: Vec<&str> = selection.iter().collect();
        assert_eq!(ids, vec!["connect", "kafka", "schema-registry", "zookeeper"]);
    }

    #[test]
    fn closed_selection_is_unchanged() {
        let catalog = catalog();
        let first = Selection::resolve(&catalog, ["kafka", "redis"]).unwrap();
        let second = Selection::resolve(&catalog, first.iter()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn ignores_empty_and_duplicate_ids() {
        let selection = Selection::resolve(&catalog(), ["redis", "", "redis"]).unwrap();
        assert_eq!(selection.len(), 1);
        assert!(selection.contains("redis"));
    }

    #[test]
    fn rejects_unknown_ids() {
        let err = Selection::resolve(&catalog(), ["mongo"]).unwrap_err();
        assert_eq!(err.to_string(), "unknown service: mongo");
    }
}
