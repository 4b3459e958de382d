//! Best-effort runtime version extraction from marker file contents.
//!
//! Every function returns an empty string when nothing usable is found;
//! defaults are applied later by the Dockerfile templates.

use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+){0,2}").expect("version regex is valid"));

static GRADLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"JavaLanguageVersion\.of\((\d+)\)",
        r#"sourceCompatibility\s*=\s*["']?(\d+)"#,
        r#"targetCompatibility\s*=\s*["']?(\d+)"#,
        r"JavaVersion\.VERSION_(\d+)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("gradle regex is valid"))
    .collect()
});

const POM_PROPERTIES: [&str; 3] = [
    "maven.compiler.release",
    "maven.compiler.source",
    "java.version",
];

/// First numeric dotted sequence in `value`.
pub fn extract_version(value: &str) -> &str {
    VERSION_PATTERN
        .find(value)
        .map(|m| m.as_str())
        .unwrap_or("")
}

/// `v20.11.1` -> `20`
pub fn normalize_major(value: &str) -> String {
    let version = extract_version(strip_v(value));
    version.split('.').next().unwrap_or("").to_string()
}

/// `3.12.1` -> `3.12`, `3` -> `3`
pub fn normalize_major_minor(value: &str) -> String {
    let version = extract_version(strip_v(value));
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}

fn strip_v(value: &str) -> &str {
    let value = value.trim();
    value.strip_prefix('v').unwrap_or(value).trim()
}

/// First whitespace separated token of a pin file such as `.nvmrc`.
pub fn first_token(content: &str) -> &str {
    content.split_whitespace().next().unwrap_or("")
}

/// `go 1.22.3` directive of a go.mod file.
pub fn go_from_mod(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("go "))
        .map(normalize_major_minor)
        .unwrap_or_default()
}

#[derive(Deserialize, Default)]
struct PackageJson {
    #[serde(default)]
    engines: HashMap<String, String>,
}

/// `engines.node` of a package.json manifest.
pub fn node_from_package_json(content: &str) -> String {
    serde_json::from_str::<PackageJson>(content)
        .ok()
        .and_then(|pkg| pkg.engines.get("node").map(|v| normalize_major(v)))
        .unwrap_or_default()
}

/// `python-3.11.4` line of a runtime.txt file.
pub fn python_from_runtime(content: &str) -> String {
    let content = content.trim();
    let content = content.strip_prefix("python-").unwrap_or(content);
    normalize_major_minor(extract_version(content))
}

/// `requires-python` of PEP 621 metadata or the poetry `python` dependency.
pub fn python_from_pyproject(content: &str) -> String {
    if let Ok(doc) = toml::from_str::<toml::Table>(content) {
        let declared = doc
            .get("project")
            .and_then(|p| p.get("requires-python"))
            .or_else(|| {
                doc.get("tool")
                    .and_then(|t| t.get("poetry"))
                    .and_then(|p| p.get("dependencies"))
                    .and_then(|d| d.get("python"))
            })
            .and_then(|v| v.as_str());
        if let Some(declared) = declared {
            return normalize_major_minor(declared);
        }
        return String::new();
    }

    content
        .lines()
        .find(|line| line.contains("requires-python"))
        .map(|line| normalize_major_minor(extract_version(line)))
        .unwrap_or_default()
}

#[derive(Deserialize, Default)]
struct ComposerJson {
    #[serde(default)]
    config: ComposerConfig,
}

#[derive(Deserialize, Default)]
struct ComposerConfig {
    #[serde(default)]
    platform: HashMap<String, String>,
}

/// `config.platform.php` of a composer.json manifest.
pub fn php_from_composer(content: &str) -> String {
    serde_json::from_str::<ComposerJson>(content)
        .ok()
        .and_then(|c| c.config.platform.get("php").map(|v| normalize_major_minor(v)))
        .unwrap_or_default()
}

/// Compiler level declared in pom.xml properties.
pub fn java_from_pom(content: &str) -> String {
    POM_PROPERTIES
        .iter()
        .map(|tag| between_tags(content, tag))
        .find(|v| !v.is_empty())
        .map(normalize_major)
        .unwrap_or_default()
}

/// Toolchain or compatibility level declared in a Gradle build script.
pub fn java_from_gradle(content: &str) -> String {
    GRADLE_PATTERNS
        .iter()
        .find_map(|re| re.captures(content))
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_major(m.as_str()))
        .unwrap_or_default()
}

#[derive(Deserialize, Default)]
struct GlobalJson {
    #[serde(default)]
    sdk: GlobalJsonSdk,
}

#[derive(Deserialize, Default)]
struct GlobalJsonSdk {
    #[serde(default)]
    version: String,
}

/// `sdk.version` of a global.json file.
pub fn dotnet_from_global_json(content: &str) -> String {
    serde_json::from_str::<GlobalJson>(content)
        .map(|g| normalize_major_minor(&g.sdk.version))
        .unwrap_or_default()
}

fn between_tags<'a>(content: &'a str, tag: &str) -> &'a str {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let Some(start) = content.find(&open).map(|i| i + open.len()) else {
        return "";
    };
    match content[start..].find(&close) {
        Some(end) => content[start..start + end].trim(),
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_versions() {
        assert_eq!(normalize_major("v20.11.1"), "20");
        assert_eq!(normalize_major(">=18"), "18");
        assert_eq!(normalize_major_minor("3.12.1"), "3.12");
        assert_eq!(normalize_major_minor("3"), "3");
        assert_eq!(normalize_major_minor(""), "");
        assert_eq!(normalize_major("lts/*"), "");
    }

    #[test]
    fn reads_go_directive() {
        let content = "module example.com/app\n\ngo 1.22.3\n\nrequire x v1.0.0\n";
        assert_eq!(go_from_mod(content), "1.22");
        assert_eq!(go_from_mod("module x\n"), "");
    }

    #[test]
    fn reads_node_engine() {
        assert_eq!(
            node_from_package_json(r#"{"engines": {"node": ">=18.17"}}"#),
            "18"
        );
        assert_eq!(node_from_package_json(r#"{"name": "x"}"#), "");
        assert_eq!(node_from_package_json("not json"), "");
    }

    #[test]
    fn reads_python_runtime_and_pyproject() {
        assert_eq!(python_from_runtime("python-3.11.4\n"), "3.11");

        let pep621 = "[project]\nname = \"x\"\nrequires-python = \">=3.10\"\n";
        assert_eq!(python_from_pyproject(pep621), "3.10");

        let poetry = "[tool.poetry.dependencies]\npython = \"^3.9\"\n";
        assert_eq!(python_from_pyproject(poetry), "3.9");

        let broken = "requires-python = \">=3.8\"\n[[[";
        assert_eq!(python_from_pyproject(broken), "3.8");
    }

    #[test]
    fn reads_php_platform() {
        let composer = r#"{"config": {"platform": {"php": "8.2.10"}}}"#;
        assert_eq!(php_from_composer(composer), "8.2");
        assert_eq!(php_from_composer(r#"{"require": {}}"#), "");
    }

    #[test]
    fn reads_java_from_pom_properties() {
        let pom = r#"<project>
  <properties>
    <maven.compiler.source>17</maven.compiler.source>
    <java.version>11</java.version>
  </properties>
</project>"#;
        assert_eq!(java_from_pom(pom), "17");

        let release = "<maven.compiler.release> 21 </maven.compiler.release>";
        assert_eq!(java_from_pom(release), "21");
    }

    #[test]
    fn reads_java_from_gradle() {
        let toolchain = "java {\n  toolchain {\n    languageVersion = JavaLanguageVersion.of(21)\n  }\n}";
        assert_eq!(java_from_gradle(toolchain), "21");
        assert_eq!(java_from_gradle("sourceCompatibility = '17'"), "17");
        assert_eq!(
            java_from_gradle("java { targetCompatibility = JavaVersion.VERSION_11 }"),
            "11"
        );
        assert_eq!(java_from_gradle("plugins { id 'java' }"), "");
    }

    #[test]
    fn reads_dotnet_sdk() {
        assert_eq!(
            dotnet_from_global_json(r#"{"sdk": {"version": "8.0.100"}}"#),
            "8.0"
        );
        assert_eq!(dotnet_from_global_json("{}"), "");
    }
}
