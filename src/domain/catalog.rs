use super::service::{APP_SERVICE_ID, ServiceSpec};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use tracing::debug;

/// Categories in the order the wizard walks through them.
pub const KNOWN_CATEGORIES: [&str; 5] = ["database", "message-queue", "cache", "analytics", "proxy"];

/// Category assigned to services that do not declare one.
pub const FALLBACK_CATEGORY: &str = "other";

#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    services: Vec<ServiceSpec>,
}

/// Immutable, validated set of service definitions.
///
/// Services are kept in display order: `order` ascending, ties broken by
/// `label`, stable with respect to the source document.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    services: Vec<ServiceSpec>,
    index: HashMap<String, usize>,
}

impl ServiceCatalog {
    /// Parses a `{"services": [...]}` document read from `source` and validates it.
    pub fn from_json(content: &str, source: &Path) -> Result<Self> {
        let doc: CatalogDocument =
            serde_json::from_str(content).map_err(|e| Error::CatalogParse {
                path: source.to_path_buf(),
                source: e,
            })?;
        Self::from_services(doc.services)
    }

    pub fn from_services(mut services: Vec<ServiceSpec>) -> Result<Self> {
        let mut ids = HashSet::with_capacity(services.len());
        for svc in services.iter_mut() {
            if svc.id.trim().is_empty() {
                return Err(Error::InvalidCatalog("service id is required".into()));
            }
            if !ids.insert(svc.id.clone()) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate service id: {}",
                    svc.id
                )));
            }
            svc.normalize();
        }

        for svc in &services {
            if let Some(dep) = svc.requires.iter().find(|dep| !ids.contains(*dep)) {
                return Err(Error::InvalidCatalog(format!(
                    "service {} requires missing {}",
                    svc.id, dep
                )));
            }
            if let Some(dep) = svc
                .depends_on
                .iter()
                .find(|dep| dep.as_str() != APP_SERVICE_ID && !ids.contains(*dep))
            {
                return Err(Error::InvalidCatalog(format!(
                    "service {} depends on missing {}",
                    svc.id, dep
                )));
            }
        }

        services.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.label.cmp(&b.label)));

        let index = services
            .iter()
            .enumerate()
            .map(|(i, svc)| (svc.id.clone(), i))
            .collect();

        let catalog = Self { services, index };
        catalog.check_acyclic()?;

        debug!("catalog holds {} service(s)", catalog.len());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ServiceSpec> {
        self.index.get(id).map(|&i| &self.services[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All services in display order.
    pub fn services(&self) -> &[ServiceSpec] {
        &self.services
    }

    /// Services offered to the user directly, in display order.
    pub fn selectable(&self) -> Vec<&ServiceSpec> {
        self.services.iter().filter(|svc| svc.selectable).collect()
    }

    /// The id lookup plus the full display-ordered list.
    pub fn catalog_map(&self) -> (HashMap<&str, &ServiceSpec>, &[ServiceSpec]) {
        let map = self
            .services
            .iter()
            .map(|svc| (svc.id.as_str(), svc))
            .collect();
        (map, &self.services)
    }

    /// Categories of selectable services: the known ones first, the rest alphabetically.
    pub fn categories(&self) -> Vec<String> {
        ordered_categories(self.selectable().into_iter().map(category_of))
    }

    /// Selectable services belonging to `category`, in display order.
    pub fn in_category(&self, category: &str) -> Vec<&ServiceSpec> {
        self.selectable()
            .into_iter()
            .filter(|svc| category_of(svc) == category)
            .collect()
    }

    fn check_acyclic(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(
            catalog: &ServiceCatalog,
            i: usize,
            marks: &mut [Mark],
            path: &mut Vec<usize>,
        ) -> Result<()> {
            match marks[i] {
                Mark::Done => return Ok(()),
                Mark::InProgress => {
                    let start = path.iter().position(|&p| p == i).unwrap_or(0);
                    let mut cycle: Vec<&str> = path[start..]
                        .iter()
                        .map(|&p| catalog.services[p].id.as_str())
                        .collect();
                    cycle.push(&catalog.services[i].id);
                    return Err(Error::InvalidCatalog(format!(
                        "requires cycle: {}",
                        cycle.join(" -> ")
                    )));
                }
                Mark::Unvisited => {}
            }

            marks[i] = Mark::InProgress;
            path.push(i);
            for dep in &catalog.services[i].requires {
                if let Some(&j) = catalog.index.get(dep) {
                    visit(catalog, j, marks, path)?;
                }
            }
            path.pop();
            marks[i] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; self.services.len()];
        let mut path = Vec::new();
        for i in 0..self.services.len() {
            visit(self, i, &mut marks, &mut path)?;
        }
        Ok(())
    }
}

/// Deduplicates `present` and orders it: known categories first in their
/// fixed order, then any other category alphabetically.
pub fn ordered_categories<'a>(present: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let present: BTreeSet<&str> = present.into_iter().collect();

    let mut categories: Vec<String> = KNOWN_CATEGORIES
        .iter()
        .filter(|c| present.contains(*c))
        .map(|c| c.to_string())
        .collect();

    categories.extend(
        present
            .into_iter()
            .filter(|c| !KNOWN_CATEGORIES.contains(c))
            .map(str::to_string),
    );

    categories
}

pub fn category_of(svc: &ServiceSpec) -> &str {
    if svc.category.trim().is_empty() {
        FALLBACK_CATEGORY
    } else {
        &svc.category
    }
}
