use serde::Deserialize;

/// Id reserved for the user's own application in generated compose files.
pub const APP_SERVICE_ID: &str = "app";

/// Port the application entry publishes and the Dockerfiles expose.
pub const APP_PORT: &str = "8080";

/// One infrastructure component the wizard can add to a compose file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceSpec {
    pub id: String,
    /// Entry name in the compose `services:` map
    pub name: String,
    /// Human readable name used by the wizard and in warnings
    pub label: String,
    pub description: String,
    pub category: String,
    pub image: String,
    /// "host:container" or bare port strings
    pub ports: Vec<String>,
    /// Container-only ports used when the service is not public
    pub expose: Vec<String>,
    pub env: Vec<String>,
    pub volume_mounts: Vec<String>,
    pub named_volumes: Vec<String>,
    /// Soft links, only reported when the target is missing
    pub depends_on: Vec<String>,
    /// Hard links, pulled into the selection automatically
    pub requires: Vec<String>,
    pub command: Vec<String>,
    pub public: bool,
    pub selectable: bool,
    pub order: i32,
}

impl ServiceSpec {
    /// The synthetic entry for the application built from the local Dockerfile.
    pub fn app() -> Self {
        Self {
            id: APP_SERVICE_ID.to_string(),
            name: APP_SERVICE_ID.to_string(),
            label: APP_SERVICE_ID.to_string(),
            ports: vec![format!("{APP_PORT}:{APP_PORT}")],
            public: true,
            ..Default::default()
        }
    }

    pub fn is_app(&self) -> bool {
        self.id == APP_SERVICE_ID
    }

    pub fn display_name(&self) -> &str {
        if !self.label.is_empty() {
            &self.label
        } else if !self.name.is_empty() {
            &self.name
        } else if !self.id.is_empty() {
            &self.id
        } else {
            "service"
        }
    }

    /// Fills `name` and `label` from `id` when they were left empty.
    pub(crate) fn normalize(&mut self) {
        if self.name.is_empty() {
            self.name = self.id.clone();
        }
        if self.label.is_empty() {
            self.label = self.id.clone();
        }
    }
}

/// Host side of a port mapping: `80` for `"80"`, `"80:8080"` and `"127.0.0.1:80:8080"`.
pub fn host_port(port: &str) -> &str {
    let parts: Vec<&str> = port.split(':').collect();
    match parts.len() {
        0 => "",
        1 | 2 => parts[0],
        n => parts[n - 2],
    }
}

/// Container side of a port mapping, i.e. the last colon separated segment.
pub fn container_port(port: &str) -> &str {
    port.rsplit(':').next().unwrap_or(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_fields() {
        let json = r#"{
            "id": "postgres",
            "image": "postgres:16",
            "volumeMounts": ["postgres-data:/var/lib/postgresql/data"],
            "namedVolumes": ["postgres-data"],
            "dependsOn": ["app"],
            "public": true,
            "order": 2
        }"#;

        let spec: ServiceSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.id, "postgres");
        assert_eq!(spec.named_volumes, vec!["postgres-data"]);
        assert_eq!(spec.depends_on, vec!["app"]);
        assert!(spec.public);
        assert!(!spec.selectable);
        assert_eq!(spec.order, 2);
    }

    #[test]
    fn normalize_fills_name_and_label() {
        let mut spec = ServiceSpec {
            id: "redis".into(),
            label: "Redis".into(),
            ..Default::default()
        };
        spec.normalize();
        assert_eq!(spec.name, "redis");
        assert_eq!(spec.label, "Redis");
    }

    #[test]
    fn app_entry_is_public_on_8080() {
        let app = ServiceSpec::app();
        assert!(app.is_app());
        assert!(app.public);
        assert_eq!(app.ports, vec!["8080:8080"]);
    }

    #[test]
    fn splits_port_mappings() {
        assert_eq!(host_port("5432"), "5432");
        assert_eq!(host_port("80:8080"), "80");
        assert_eq!(host_port("127.0.0.1:80:8080"), "80");
        assert_eq!(container_port("80:8080"), "8080");
        assert_eq!(container_port("6379"), "6379");
    }
}
