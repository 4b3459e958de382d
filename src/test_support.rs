use crate::domain::{GenerationBackend, Language, LanguageDetails, ServiceCatalog, ServiceSpec};
use crate::error::{Error, Result};
use crate::infra::writer::Output;
use std::path::PathBuf;
use std::sync::RwLock;

fn spec(id: &str, label: &str, category: &str, image: &str, ports: &[&str]) -> ServiceSpec {
    ServiceSpec {
        id: id.to_string(),
        label: label.to_string(),
        category: category.to_string(),
        image: image.to_string(),
        ports: ports.iter().map(|p| p.to_string()).collect(),
        selectable: true,
        ..Default::default()
    }
}

/// Small catalog covering every category, a required hidden service and two
/// proxies that collide on port 80.
pub fn fixture_services() -> Vec<ServiceSpec> {
    vec![
        ServiceSpec {
            env: vec!["POSTGRES_PASSWORD=example".into()],
            volume_mounts: vec!["postgres-data:/var/lib/postgresql/data".into()],
            named_volumes: vec!["postgres-data".into()],
            order: 10,
            ..spec("postgres", "PostgreSQL", "database", "postgres:16", &["5432:5432"])
        },
        ServiceSpec {
            selectable: false,
            order: 20,
            ..spec("zookeeper", "ZooKeeper", "message-queue", "bitnami/zookeeper:3.9", &["2181:2181"])
        },
        ServiceSpec {
            requires: vec!["zookeeper".into()],
            depends_on: vec!["zookeeper".into()],
            named_volumes: vec!["kafka-data".into()],
            volume_mounts: vec!["kafka-data:/bitnami/kafka".into()],
            order: 21,
            ..spec("kafka", "Kafka", "message-queue", "bitnami/kafka:3.7", &["9092:9092"])
        },
        ServiceSpec {
            order: 30,
            ..spec("redis", "Redis", "cache", "redis:7-alpine", &["6379:6379"])
        },
        ServiceSpec {
            public: true,
            order: 40,
            ..spec("metabase", "Metabase", "analytics", "metabase/metabase:latest", &["3000:3000"])
        },
        ServiceSpec {
            depends_on: vec!["app".into()],
            public: true,
            order: 50,
            ..spec("nginx", "Nginx", "proxy", "nginx:alpine", &["80:80"])
        },
        ServiceSpec {
            command: vec!["--api.insecure=true".into(), "--providers.docker=true".into()],
            public: true,
            order: 51,
            ..spec("traefik", "Traefik", "proxy", "traefik:v2.11", &["80:80", "8080:8080"])
        },
    ]
}

pub fn fixture_catalog() -> ServiceCatalog {
    ServiceCatalog::from_services(fixture_services()).expect("fixture catalog is valid")
}

/// Backend double for the wizard: answers from the fixture catalog and
/// records every call.
#[derive(Debug)]
pub struct MockBackend {
    catalog: ServiceCatalog,
    details: RwLock<LanguageDetails>,
    existing: RwLock<Vec<&'static str>>,
    calls: RwLock<Vec<String>>,
    fail_on: RwLock<Option<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            catalog: fixture_catalog(),
            details: RwLock::new(LanguageDetails {
                language: Language::Go,
                has_go_mod: true,
                go_version: "1.22".to_string(),
                ..Default::default()
            }),
            existing: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
            fail_on: RwLock::new(None),
        }
    }

    pub fn set_details(&self, details: LanguageDetails) {
        *self.details.write().unwrap() = details;
    }

    pub fn set_existing(&self, files: &[&'static str]) {
        *self.existing.write().unwrap() = files.to_vec();
    }

    /// Makes the named operation fail until [`MockBackend::clear_failure`].
    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    pub fn clear_failure(&self) {
        *self.fail_on.write().unwrap() = None;
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    fn record_call(&self, call: String) {
        self.calls.write().unwrap().push(call);
    }

    fn check_fail(&self, operation: &str) -> Result<()> {
        if self.fail_on.read().unwrap().as_deref() == Some(operation) {
            return Err(Error::io(
                "mocking",
                operation,
                std::io::Error::other(format!("mock failure on {operation}")),
            ));
        }
        Ok(())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationBackend for MockBackend {
    fn selectable_services(&self) -> Vec<ServiceSpec> {
        self.catalog.selectable().into_iter().cloned().collect()
    }

    fn detect(&self) -> Result<LanguageDetails> {
        self.record_call("detect".to_string());
        self.check_fail("detect")?;
        Ok(self.details.read().unwrap().clone())
    }

    fn selection_warnings(&self, ids: &[String]) -> Result<Vec<String>> {
        self.record_call(format!("warnings:{}", ids.join(",")));
        self.check_fail("warnings")?;
        crate::services::selection_warnings(&self.catalog, ids)
    }

    fn existing_outputs(&self) -> Vec<&'static str> {
        self.existing.read().unwrap().clone()
    }

    fn generate(&self, ids: &[String]) -> Result<Output> {
        self.record_call(format!("generate:{}", ids.join(",")));
        self.check_fail("generate")?;
        Ok(Output {
            compose_path: PathBuf::from("docker-compose.yml"),
            dockerfile_path: PathBuf::from("Dockerfile"),
            dockerignore_path: Some(PathBuf::from(".dockerignore")),
        })
    }
}
