use crate::domain::{APP_SERVICE_ID, Selection, ServiceCatalog, ServiceSpec, container_port};
use crate::error::Result;
use serde_yml::Value;
use std::collections::BTreeSet;

pub const COMPOSE_VERSION: &str = "3.9";
pub const NETWORK_NAME: &str = "app-net";

/// Renders the compose document for the requested service ids.
///
/// Ids are validated and expanded with their `requires` closure first.
pub fn compose<I, S>(catalog: &ServiceCatalog, ids: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let selection = Selection::resolve(catalog, ids)?;
    Ok(render_compose(catalog, &selection))
}

/// Renders an already resolved selection: the app entry first, then every
/// selected service in catalog display order.
pub fn render_compose(catalog: &ServiceCatalog, selection: &Selection) -> String {
    let services: Vec<&ServiceSpec> = catalog
        .services()
        .iter()
        .filter(|svc| selection.contains(&svc.id))
        .collect();

    let volumes: BTreeSet<&str> = services
        .iter()
        .flat_map(|svc| svc.named_volumes.iter())
        .map(String::as_str)
        .filter(|name| !name.is_empty())
        .collect();

    let mut out = String::new();
    out.push_str(&format!("version: \"{COMPOSE_VERSION}\"\n"));
    out.push_str("services:\n");

    write_service(&mut out, &ServiceSpec::app(), selection);
    for svc in services {
        write_service(&mut out, svc, selection);
    }

    if !volumes.is_empty() {
        out.push_str("volumes:\n");
        for name in volumes {
            out.push_str(&format!("  {}:\n", scalar(name)));
        }
    }

    out.push_str("networks:\n");
    out.push_str(&format!("  {NETWORK_NAME}:\n"));
    out
}

fn write_service(out: &mut String, svc: &ServiceSpec, selection: &Selection) {
    out.push_str(&format!("  {}:\n", scalar(&svc.name)));

    if svc.is_app() {
        out.push_str("    build:\n");
        out.push_str("      context: .\n");
        out.push_str("      dockerfile: Dockerfile\n");
    }
    if !svc.image.is_empty() {
        out.push_str(&format!("    image: {}\n", scalar(&svc.image)));
    }

    let mut ports = svc.ports.clone();
    ports.sort();
    if !ports.is_empty() {
        if svc.public {
            write_quoted_list(out, "ports", &ports);
        } else {
            let mut expose: Vec<String> = if svc.expose.is_empty() {
                ports
                    .iter()
                    .map(|p| container_port(p))
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            } else {
                svc.expose.clone()
            };
            expose.sort();
            if !expose.is_empty() {
                write_quoted_list(out, "expose", &expose);
            }
        }
    }

    write_list(out, "environment", &svc.env);
    write_list(out, "command", &svc.command);
    write_list(out, "volumes", &svc.volume_mounts);

    let mut depends: Vec<String> = svc
        .depends_on
        .iter()
        .filter(|dep| dep.as_str() == APP_SERVICE_ID || selection.contains(dep))
        .cloned()
        .collect();
    depends.sort();
    depends.dedup();
    write_list(out, "depends_on", &depends);

    out.push_str("    networks:\n");
    out.push_str(&format!("      - {NETWORK_NAME}\n"));
}

fn write_list(out: &mut String, key: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("    {key}:\n"));
    for item in items {
        out.push_str(&format!("      - {}\n", scalar(item)));
    }
}

fn write_quoted_list(out: &mut String, key: &str, items: &[String]) {
    out.push_str(&format!("    {key}:\n"));
    for item in items {
        out.push_str(&format!("      - {}\n", quoted(item)));
    }
}

/// Leaves a value plain only when a YAML parser reads it back as the same
/// string; anything else is double-quoted.
fn scalar(value: &str) -> String {
    // YAML 1.1 booleans still honoured by older compose parsers
    const KEYWORDS: &[&str] = &["yes", "no", "on", "off", "y", "n"];

    let plain = !KEYWORDS.contains(&value.to_ascii_lowercase().as_str())
        && matches!(
            serde_yml::from_str::<Value>(value),
            Ok(Value::String(parsed)) if parsed == value
        );

    if plain { value.to_string() } else { quoted(value) }
}

fn quoted(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
