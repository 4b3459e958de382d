use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Primary language family inferred for a project root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    Go,
    Node,
    Python,
    Ruby,
    Php,
    Java,
    DotNet,
    #[default]
    Unknown,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::Go,
        Language::Node,
        Language::Python,
        Language::Ruby,
        Language::Php,
        Language::Java,
        Language::DotNet,
        Language::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Node => "node",
            Self::Python => "python",
            Self::Ruby => "ruby",
            Self::Php => "php",
            Self::Java => "java",
            Self::DotNet => "dotnet",
            Self::Unknown => "unknown",
        }
    }

    /// Name shown to users
    pub fn label(&self) -> &'static str {
        match self {
            Self::Go => "Go",
            Self::Node => "Node",
            Self::Python => "Python",
            Self::Ruby => "Ruby",
            Self::Php => "PHP",
            Self::Java => "Java",
            Self::DotNet => ".NET",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str() == wanted)
            .ok_or_else(|| Error::UnsupportedLanguage(s.to_string()))
    }
}

/// Marker files found in a project root and the versions read from them.
///
/// Version strings are best effort and may be empty even when `language`
/// is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageDetails {
    pub language: Language,

    pub has_go_mod: bool,
    pub has_go_sum: bool,

    pub has_package_json: bool,
    pub has_package_lock: bool,
    pub has_yarn_lock: bool,
    pub has_pnpm_lock: bool,
    pub has_nvmrc: bool,
    pub has_node_version: bool,

    pub has_requirements: bool,
    pub has_pyproject: bool,
    pub has_poetry_lock: bool,
    pub has_pipfile: bool,
    pub has_pipfile_lock: bool,
    pub has_python_version: bool,
    pub has_runtime_txt: bool,

    pub has_gemfile: bool,
    pub has_gemfile_lock: bool,
    pub has_ruby_version: bool,

    pub has_composer_json: bool,
    pub has_composer_lock: bool,
    pub has_php_version: bool,

    pub has_pom_xml: bool,
    pub has_gradle: bool,
    pub has_gradle_kts: bool,

    pub has_csproj: bool,
    pub has_global_json: bool,

    pub go_version: String,
    pub node_version: String,
    pub python_version: String,
    pub ruby_version: String,
    pub php_version: String,
    pub java_version: String,
    pub dotnet_version: String,
}

impl LanguageDetails {
    /// Picks the language from the presence flags using the fixed priority
    /// go > node > python > ruby > php > java > dotnet.
    pub fn infer_language(&self) -> Language {
        if self.has_go_mod {
            Language::Go
        } else if self.has_package_json {
            Language::Node
        } else if self.has_requirements || self.has_pyproject || self.has_pipfile {
            Language::Python
        } else if self.has_gemfile {
            Language::Ruby
        } else if self.has_composer_json || self.has_php_version {
            Language::Php
        } else if self.has_pom_xml || self.has_gradle || self.has_gradle_kts {
            Language::Java
        } else if self.has_csproj {
            Language::DotNet
        } else {
            Language::Unknown
        }
    }

    /// Detected version for the chosen language, empty when unknown.
    pub fn version(&self) -> &str {
        match self.language {
            Language::Go => &self.go_version,
            Language::Node => &self.node_version,
            Language::Python => &self.python_version,
            Language::Ruby => &self.ruby_version,
            Language::Php => &self.php_version,
            Language::Java => &self.java_version,
            Language::DotNet => &self.dotnet_version,
            Language::Unknown => "",
        }
    }

    /// e.g. `Go 1.22`, or just `Go` when no version was found.
    pub fn label(&self) -> String {
        match self.version() {
            "" => self.language.label().to_string(),
            version => format!("{} {}", self.language.label(), version),
        }
    }

    /// Marker files that were found, for display.
    pub fn markers(&self) -> Vec<&'static str> {
        [
            (self.has_go_mod, "go.mod"),
            (self.has_go_sum, "go.sum"),
            (self.has_package_json, "package.json"),
            (self.has_package_lock, "package-lock.json"),
            (self.has_yarn_lock, "yarn.lock"),
            (self.has_pnpm_lock, "pnpm-lock.yaml"),
            (self.has_nvmrc, ".nvmrc"),
            (self.has_node_version, ".node-version"),
            (self.has_requirements, "requirements.txt"),
            (self.has_pyproject, "pyproject.toml"),
            (self.has_poetry_lock, "poetry.lock"),
            (self.has_pipfile, "Pipfile"),
            (self.has_pipfile_lock, "Pipfile.lock"),
            (self.has_python_version, ".python-version"),
            (self.has_runtime_txt, "runtime.txt"),
            (self.has_gemfile, "Gemfile"),
            (self.has_gemfile_lock, "Gemfile.lock"),
            (self.has_ruby_version, ".ruby-version"),
            (self.has_composer_json, "composer.json"),
            (self.has_composer_lock, "composer.lock"),
            (self.has_php_version, ".php-version"),
            (self.has_pom_xml, "pom.xml"),
            (self.has_gradle, "build.gradle"),
            (self.has_gradle_kts, "build.gradle.kts"),
            (self.has_csproj, "*.csproj"),
            (self.has_global_json, "global.json"),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect()
    }
}
