use super::version::{
    dotnet_from_global_json, first_token, go_from_mod, java_from_gradle, java_from_pom,
    node_from_package_json, normalize_major, normalize_major_minor, php_from_composer,
    python_from_pyproject, python_from_runtime,
};
use crate::domain::LanguageDetails;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Inspects `root` for ecosystem marker files and infers the primary language.
///
/// A missing marker is simply absent; only a malformed search pattern fails.
pub fn detect_language(root: &Path) -> Result<LanguageDetails> {
    if root.as_os_str().is_empty() {
        return Err(Error::MissingRoot);
    }

    let exists = |name: &str| is_file(&root.join(name));

    let mut details = LanguageDetails {
        has_go_mod: exists("go.mod"),
        has_go_sum: exists("go.sum"),

        has_package_json: exists("package.json"),
        has_package_lock: exists("package-lock.json"),
        has_yarn_lock: exists("yarn.lock"),
        has_pnpm_lock: exists("pnpm-lock.yaml"),
        has_nvmrc: exists(".nvmrc"),
        has_node_version: exists(".node-version"),

        has_requirements: exists("requirements.txt"),
        has_pyproject: exists("pyproject.toml"),
        has_poetry_lock: exists("poetry.lock"),
        has_pipfile: exists("Pipfile"),
        has_pipfile_lock: exists("Pipfile.lock"),
        has_python_version: exists(".python-version"),
        has_runtime_txt: exists("runtime.txt"),

        has_gemfile: exists("Gemfile"),
        has_gemfile_lock: exists("Gemfile.lock"),
        has_ruby_version: exists(".ruby-version"),

        has_composer_json: exists("composer.json"),
        has_composer_lock: exists("composer.lock"),
        has_php_version: exists(".php-version"),

        has_pom_xml: exists("pom.xml"),
        has_gradle: exists("build.gradle"),
        has_gradle_kts: exists("build.gradle.kts"),

        has_csproj: has_csproj(root)?,
        has_global_json: exists("global.json"),

        ..Default::default()
    };

    details.go_version = go_from_mod(&read(root, "go.mod"));
    details.node_version = detect_node_version(root);
    details.python_version = detect_python_version(root);
    details.ruby_version = normalize_major_minor(first_token(&read(root, ".ruby-version")));
    details.php_version = detect_php_version(root);
    details.java_version = detect_java_version(root);
    details.dotnet_version = dotnet_from_global_json(&read(root, "global.json"));

    details.language = details.infer_language();

    debug!("markers found in {:?}: {:?}", root, details.markers());
    info!("detected {} for {:?}", details.label(), root);

    Ok(details)
}

fn detect_node_version(root: &Path) -> String {
    for pin in [".nvmrc", ".node-version"] {
        let version = normalize_major(first_token(&read(root, pin)));
        if !version.is_empty() {
            return version;
        }
    }
    node_from_package_json(&read(root, "package.json"))
}

fn detect_python_version(root: &Path) -> String {
    let pinned = normalize_major_minor(first_token(&read(root, ".python-version")));
    if !pinned.is_empty() {
        return pinned;
    }
    let runtime = python_from_runtime(&read(root, "runtime.txt"));
    if !runtime.is_empty() {
        return runtime;
    }
    python_from_pyproject(&read(root, "pyproject.toml"))
}

fn detect_php_version(root: &Path) -> String {
    let pinned = normalize_major_minor(first_token(&read(root, ".php-version")));
    if !pinned.is_empty() {
        return pinned;
    }
    php_from_composer(&read(root, "composer.json"))
}

fn detect_java_version(root: &Path) -> String {
    let from_pom = java_from_pom(&read(root, "pom.xml"));
    if !from_pom.is_empty() {
        return from_pom;
    }
    ["build.gradle", "build.gradle.kts"]
        .into_iter()
        .map(|name| java_from_gradle(&read(root, name)))
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

fn has_csproj(root: &Path) -> Result<bool> {
    let pattern = format!(
        "{}/*.csproj",
        glob::Pattern::escape(&root.to_string_lossy())
    );
    let mut matches = glob::glob(&pattern).map_err(|source| Error::Pattern {
        pattern: pattern.clone(),
        source,
    })?;
    Ok(matches.any(|entry| entry.map(|p| p.is_file()).unwrap_or(false)))
}

fn is_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Contents of `root/name`, empty when missing or unreadable.
fn read(root: &Path, name: &str) -> String {
    fs::read_to_string(root.join(name)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Language;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(temp.path().join(name), content).unwrap();
        }
        temp
    }

    #[test]
    fn empty_root_is_unknown() {
        let temp = project(&[]);
        let details = detect_language(temp.path()).unwrap();
        assert_eq!(details.language, Language::Unknown);
        assert!(details.markers().is_empty());
    }

    #[test]
    fn detects_go_with_version() {
        let temp = project(&[("go.mod", "module example.com/app\n\ngo 1.22\n")]);
        let details = detect_language(temp.path()).unwrap();
        assert_eq!(details.language, Language::Go);
        assert_eq!(details.go_version, "1.22");
        assert!(!details.has_go_sum);
    }

    #[test]
    fn go_wins_over_node() {
        let temp = project(&[("go.mod", "module x\n"), ("package.json", "{}")]);
        let details = detect_language(temp.path()).unwrap();
        assert_eq!(details.language, Language::Go);
        assert!(details.has_package_json);
        assert_eq!(details.go_version, "");
    }

    #[test]
    fn node_version_prefers_nvmrc() {
        let temp = project(&[
            ("package.json", r#"{"engines": {"node": "18"}}"#),
            (".nvmrc", "v20.11.0\n"),
            (".node-version", "22\n"),
            ("yarn.lock", ""),
        ]);
        let details = detect_language(temp.path()).unwrap();
        assert_eq!(details.language, Language::Node);
        assert_eq!(details.node_version, "20");
        assert!(details.has_yarn_lock);
    }

    #[test]
    fn node_version_falls_back_to_engines() {
        let temp = project(&[("package.json", r#"{"engines": {"node": ">=18.0.0"}}"#)]);
        let details = detect_language(temp.path()).unwrap();
        assert_eq!(details.node_version, "18");
    }

    #[test]
    fn python_version_order() {
        let temp = project(&[
            ("requirements.txt", "flask\n"),
            ("runtime.txt", "python-3.11.2"),
        ]);
        let details = detect_language(temp.path()).unwrap();
        assert_eq!(details.language, Language::Python);
        assert_eq!(details.python_version, "3.11");

        fs::write(temp.path().join(".python-version"), "3.12.1\n").unwrap();
        let details = detect_language(temp.path()).unwrap();
        assert_eq!(details.python_version, "3.12");
    }

    #[test]
    fn detects_php_from_version_file_only() {
        let temp = project(&[(".php-version", "8.3.1")]);
        let details = detect_language(temp.path()).unwrap();
        assert_eq!(details.language, Language::Php);
        assert_eq!(details.php_version, "8.3");
    }

    #[test]
    fn detects_java_from_gradle_kts() {
        let temp = project(&[(
            "build.gradle.kts",
            "java { toolchain { languageVersion.set(JavaLanguageVersion.of(17)) } }",
        )]);
        let details = detect_language(temp.path()).unwrap();
        assert_eq!(details.language, Language::Java);
        assert_eq!(details.java_version, "17");
    }

    #[test]
    fn detects_dotnet_from_csproj() {
        let temp = project(&[
            ("Api.csproj", "<Project Sdk=\"Microsoft.NET.Sdk.Web\" />"),
            ("global.json", r#"{"sdk": {"version": "9.0.100"}}"#),
        ]);
        let details = detect_language(temp.path()).unwrap();
        assert_eq!(details.language, Language::DotNet);
        assert_eq!(details.dotnet_version, "9.0");
    }

    #[test]
    fn marker_directories_are_ignored() {
        let temp = project(&[]);
        fs::create_dir(temp.path().join("go.mod")).unwrap();
        let details = detect_language(temp.path()).unwrap();
        assert_eq!(details.language, Language::Unknown);
    }

    #[test]
    fn root_with_glob_characters_still_finds_csproj() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("app[1]");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("App.csproj"), "").unwrap();

        let details = detect_language(&root).unwrap();
        assert!(details.has_csproj);
    }

    #[test]
    fn empty_root_path_is_rejected() {
        assert!(matches!(
            detect_language(Path::new("")),
            Err(Error::MissingRoot)
        ));
    }
}
