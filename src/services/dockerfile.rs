use crate::domain::{APP_PORT, Language, LanguageDetails};

/// Images and defaults for one language family.
///
/// Image references carry a `{version}` placeholder replaced by the detected
/// version, or by `default_version` when detection found nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toolchain {
    pub default_version: &'static str,
    /// Build stage image, `None` for single stage templates
    pub builder_image: Option<&'static str>,
    pub runtime_image: &'static str,
    pub command: &'static [&'static str],
}

impl Toolchain {
    /// The detected version, or the family default when none was found.
    pub fn version<'a>(&self, detected: &'a str) -> &'a str {
        if detected.is_empty() {
            self.default_version
        } else {
            detected
        }
    }
}

const GENERIC_IMAGE: &str = "alpine:3.20";

pub fn toolchain(language: Language) -> Toolchain {
    match language {
        Language::Go => Toolchain {
            default_version: "1.25",
            builder_image: Some("golang:{version}-alpine"),
            runtime_image: GENERIC_IMAGE,
            command: &["/app/app"],
        },
        Language::Node => Toolchain {
            default_version: "20",
            builder_image: None,
            runtime_image: "node:{version}-alpine",
            command: &["npm", "start"],
        },
        Language::Python => Toolchain {
            default_version: "3.12",
            builder_image: None,
            runtime_image: "python:{version}-slim",
            command: &["python", "main.py"],
        },
        Language::Ruby => Toolchain {
            default_version: "3.3",
            builder_image: None,
            runtime_image: "ruby:{version}-alpine",
            command: &["ruby", "app.rb"],
        },
        Language::Php => Toolchain {
            default_version: "8.3",
            builder_image: None,
            runtime_image: "php:{version}-cli",
            command: &["php", "-S", "0.0.0.0:8080", "-t", "public"],
        },
        Language::Java => Toolchain {
            default_version: "21",
            builder_image: Some("maven:3.9-eclipse-temurin-{version}"),
            runtime_image: "eclipse-temurin:{version}-jre",
            command: &["java", "-jar", "app.jar"],
        },
        Language::DotNet => Toolchain {
            default_version: "8.0",
            builder_image: Some("mcr.microsoft.com/dotnet/sdk:{version}"),
            runtime_image: "mcr.microsoft.com/dotnet/aspnet:{version}",
            command: &["dotnet", "app.dll"],
        },
        Language::Unknown => Toolchain {
            default_version: "",
            builder_image: None,
            runtime_image: GENERIC_IMAGE,
            command: &["sh"],
        },
    }
}

/// Dependency install strategy, picked from the lockfiles and manifests found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStep {
    None,
    GoModules { go_sum: bool },
    Yarn,
    Pnpm,
    Npm { lockfile: bool },
    Pip,
    Pipenv { lockfile: bool },
    PyProject,
    Bundler { lockfile: bool },
    Composer { lockfile: bool },
    Maven,
    Gradle,
    DotnetRestore,
}

/// Exactly one strategy per family, first match wins.
pub fn install_step(details: &LanguageDetails) -> InstallStep {
    match details.language {
        Language::Go => InstallStep::GoModules {
            go_sum: details.has_go_sum,
        },
        Language::Node => {
            if details.has_yarn_lock {
                InstallStep::Yarn
            } else if details.has_pnpm_lock {
                InstallStep::Pnpm
            } else {
                InstallStep::Npm {
                    lockfile: details.has_package_lock,
                }
            }
        }
        Language::Python => {
            if details.has_requirements {
                InstallStep::Pip
            } else if details.has_pipfile {
                InstallStep::Pipenv {
                    lockfile: details.has_pipfile_lock,
                }
            } else if details.has_pyproject {
                InstallStep::PyProject
            } else {
                InstallStep::None
            }
        }
        Language::Ruby => {
            if details.has_gemfile {
                InstallStep::Bundler {
                    lockfile: details.has_gemfile_lock,
                }
            } else {
                InstallStep::None
            }
        }
        Language::Php => {
            if details.has_composer_json {
                InstallStep::Composer {
                    lockfile: details.has_composer_lock,
                }
            } else {
                InstallStep::None
            }
        }
        Language::Java => {
            if !details.has_pom_xml && (details.has_gradle || details.has_gradle_kts) {
                InstallStep::Gradle
            } else {
                InstallStep::Maven
            }
        }
        Language::DotNet => InstallStep::DotnetRestore,
        Language::Unknown => InstallStep::None,
    }
}

/// Renders the container build recipe for the detected project.
///
/// Infallible: every variant of the closed [`Language`] enum, `Unknown`
/// included, maps to a template.
pub fn dockerfile(details: &LanguageDetails) -> String {
    let tc = toolchain(details.language);
    let version = tc.version(details.version());
    let step = install_step(details);
    let image = |template: &str| template.replace("{version}", version);

    let mut df = Dockerfile::default();
    match details.language {
        Language::Go => {
            let go_sum = matches!(step, InstallStep::GoModules { go_sum: true });
            df.from_stage(&image(tc.builder_image.unwrap_or_default()), "build")
                .line("WORKDIR /src")
                .line(if go_sum {
                    "COPY go.mod go.sum ./"
                } else {
                    "COPY go.mod ./"
                })
                .line("RUN go mod download")
                .line("COPY . .")
                .line("RUN CGO_ENABLED=0 GOOS=linux go build -o /out/app .")
                .blank()
                .from(&image(tc.runtime_image))
                .line("WORKDIR /app")
                .line("COPY --from=build /out/app /app/app")
                .expose()
                .cmd(tc.command);
        }
        Language::Node => {
            df.from(&image(tc.runtime_image))
                .line("WORKDIR /app")
                .line("COPY package.json ./");
            let command: &[&str] = match step {
                InstallStep::Yarn => {
                    df.line("COPY yarn.lock ./")
                        .line("RUN corepack enable")
                        .line("RUN yarn install --frozen-lockfile");
                    &["yarn", "start"]
                }
                InstallStep::Pnpm => {
                    df.line("COPY pnpm-lock.yaml ./")
                        .line("RUN corepack enable")
                        .line("RUN pnpm install --frozen-lockfile");
                    &["pnpm", "start"]
                }
                InstallStep::Npm { lockfile: true } => {
                    df.line("COPY package-lock.json ./").line("RUN npm install");
                    tc.command
                }
                _ => {
                    df.line("RUN npm install");
                    tc.command
                }
            };
            df.line("COPY . .").expose().cmd(command);
        }
        Language::Python => {
            df.from(&image(tc.runtime_image)).line("WORKDIR /app");
            match step {
                InstallStep::Pip => {
                    df.line("COPY requirements.txt ./")
                        .line("RUN pip install --no-cache-dir -r requirements.txt")
                        .line("COPY . .");
                }
                InstallStep::Pipenv { lockfile } => {
                    df.line(if lockfile {
                        "COPY Pipfile Pipfile.lock ./"
                    } else {
                        "COPY Pipfile ./"
                    })
                    .line("RUN pip install --no-cache-dir pipenv")
                    .line(if lockfile {
                        "RUN pipenv install --system --deploy"
                    } else {
                        "RUN pipenv install --system --skip-lock"
                    })
                    .line("COPY . .");
                }
                InstallStep::PyProject => {
                    df.line("COPY . .").line("RUN pip install --no-cache-dir .");
                }
                _ => {
                    df.line("COPY . .");
                }
            }
            df.expose().cmd(tc.command);
        }
        Language::Ruby => {
            df.from(&image(tc.runtime_image)).line("WORKDIR /app");
            if let InstallStep::Bundler { lockfile } = step {
                df.line("COPY Gemfile ./");
                if lockfile {
                    df.line("COPY Gemfile.lock ./");
                }
                df.line("RUN bundle install");
            }
            df.line("COPY . .").expose().cmd(tc.command);
        }
        Language::Php => {
            df.from(&image(tc.runtime_image)).line("WORKDIR /app");
            if let InstallStep::Composer { lockfile } = step {
                df.line("COPY --from=composer:2 /usr/bin/composer /usr/bin/composer")
                    .line("COPY composer.json ./");
                if lockfile {
                    df.line("COPY composer.lock ./");
                }
                df.line("RUN composer install --no-dev --no-interaction --no-scripts");
            }
            df.line("COPY . .").expose().cmd(tc.command);
        }
        Language::Java => {
            if step == InstallStep::Gradle {
                df.from_stage(&format!("gradle:8-jdk{version}"), "build")
                    .line("WORKDIR /src")
                    .line("COPY . .")
                    .line("RUN gradle build -x test --no-daemon")
                    .line("RUN mkdir -p /out && cp build/libs/*.jar /out/app.jar");
            } else {
                df.from_stage(&image(tc.builder_image.unwrap_or_default()), "build")
                    .line("WORKDIR /src")
                    .line("COPY pom.xml ./")
                    .line("RUN mvn -q dependency:go-offline")
                    .line("COPY . .")
                    .line("RUN mvn -q package -DskipTests")
                    .line("RUN mkdir -p /out && cp target/*.jar /out/app.jar");
            }
            df.blank()
                .from(&image(tc.runtime_image))
                .line("WORKDIR /app")
                .line("COPY --from=build /out/app.jar /app/app.jar")
                .expose()
                .cmd(tc.command);
        }
        Language::DotNet => {
            df.from_stage(&image(tc.builder_image.unwrap_or_default()), "build")
                .line("WORKDIR /src")
                .line("COPY *.csproj ./")
                .line("RUN dotnet restore")
                .line("COPY . .")
                .line("RUN dotnet publish -c Release -o /out")
                .blank()
                .from(&image(tc.runtime_image))
                .line("WORKDIR /app")
                .line("COPY --from=build /out ./")
                .line(&format!("ENV ASPNETCORE_URLS=http://+:{APP_PORT}"))
                .expose()
                .cmd(tc.command);
        }
        Language::Unknown => {
            df.from(tc.runtime_image)
                .line("WORKDIR /app")
                .line("COPY . .")
                .cmd(tc.command);
        }
    }

    df.finish()
}

#[derive(Default)]
struct Dockerfile {
    text: String,
}

impl Dockerfile {
    fn line(&mut self, line: &str) -> &mut Self {
        self.text.push_str(line);
        self.text.push('\n');
        self
    }

    fn blank(&mut self) -> &mut Self {
        self.text.push('\n');
        self
    }

    fn from(&mut self, image: &str) -> &mut Self {
        self.line(&format!("FROM {image}"))
    }

    fn from_stage(&mut self, image: &str, stage: &str) -> &mut Self {
        self.line(&format!("FROM {image} AS {stage}"))
    }

    fn expose(&mut self) -> &mut Self {
        self.line(&format!("EXPOSE {APP_PORT}"))
    }

    /// Exec form: `CMD ["npm", "start"]`
    fn cmd(&mut self, args: &[&str]) -> &mut Self {
        let quoted: Vec<String> = args
            .iter()
            .map(|arg| serde_json::Value::from(*arg).to_string())
            .collect();
        self.line(&format!("CMD [{}]", quoted.join(", ")))
    }

    fn finish(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(language: Language) -> LanguageDetails {
        LanguageDetails {
            language,
            ..Default::default()
        }
    }

    #[test]
    fn go_uses_detected_version_in_build_stage() {
        let mut d = details(Language::Go);
        d.has_go_mod = true;
        d.go_version = "1.22".into();

        let text = dockerfile(&d);
        assert!(text.starts_with("FROM golang:1.22-alpine AS build\n"));
        assert!(text.contains("COPY go.mod ./\n"));
        assert!(text.contains("\nFROM alpine:3.20\n"));
        assert!(text.ends_with("EXPOSE 8080\nCMD [\"/app/app\"]\n"));
    }

    #[test]
    fn go_copies_go_sum_when_present() {
        let mut d = details(Language::Go);
        d.has_go_sum = true;
        let text = dockerfile(&d);
        assert!(text.starts_with("FROM golang:1.25-alpine AS build\n"));
        assert!(text.contains("COPY go.mod go.sum ./\n"));
    }

    #[test]
    fn node_lockfile_precedence() {
        let mut d = details(Language::Node);
        d.has_yarn_lock = true;
        d.has_pnpm_lock = true;
        d.has_package_lock = true;
        assert_eq!(install_step(&d), InstallStep::Yarn);

        d.has_yarn_lock = false;
        assert_eq!(install_step(&d), InstallStep::Pnpm);

        d.has_pnpm_lock = false;
        assert_eq!(install_step(&d), InstallStep::Npm { lockfile: true });

        d.has_package_lock = false;
        assert_eq!(install_step(&d), InstallStep::Npm { lockfile: false });
    }

    #[test]
    fn node_yarn_template() {
        let mut d = details(Language::Node);
        d.has_yarn_lock = true;
        d.node_version = "18".into();

        let expected = "\
FROM node:18-alpine
WORKDIR /app
COPY package.json ./
COPY yarn.lock ./
RUN corepack enable
RUN yarn install --frozen-lockfile
COPY . .
EXPOSE 8080
CMD [\"yarn\", \"start\"]
";
        assert_eq!(dockerfile(&d), expected);
    }

    #[test]
    fn node_without_lock_skips_lock_copy() {
        let text = dockerfile(&details(Language::Node));
        assert!(text.starts_with("FROM node:20-alpine\n"));
        assert!(!text.contains("package-lock.json"));
        assert!(text.contains("RUN npm install\n"));
        assert!(text.contains("CMD [\"npm\", \"start\"]\n"));
    }

    #[test]
    fn python_requirements_template() {
        let mut d = details(Language::Python);
        d.has_requirements = true;
        d.python_version = "3.11".into();

        let text = dockerfile(&d);
        assert!(text.starts_with("FROM python:3.11-slim\n"));
        assert!(text.contains("RUN pip install --no-cache-dir -r requirements.txt\n"));
    }

    #[test]
    fn python_pyproject_installs_after_copy() {
        let mut d = details(Language::Python);
        d.has_pyproject = true;
        let text = dockerfile(&d);
        assert!(text.contains("COPY . .\nRUN pip install --no-cache-dir .\n"));
    }

    #[test]
    fn ruby_copies_lockfile() {
        let mut d = details(Language::Ruby);
        d.has_gemfile = true;
        d.has_gemfile_lock = true;
        let text = dockerfile(&d);
        assert!(text.starts_with("FROM ruby:3.3-alpine\n"));
        assert!(text.contains("COPY Gemfile ./\nCOPY Gemfile.lock ./\nRUN bundle install\n"));
    }

    #[test]
    fn php_template_uses_composer() {
        let mut d = details(Language::Php);
        d.has_composer_json = true;
        d.php_version = "8.2".into();
        let text = dockerfile(&d);
        assert!(text.starts_with("FROM php:8.2-cli\n"));
        assert!(text.contains("COPY composer.json ./\n"));
        assert!(!text.contains("composer.lock"));
        assert!(text.contains("EXPOSE 8080\n"));
    }

    #[test]
    fn java_picks_gradle_without_pom() {
        let mut d = details(Language::Java);
        d.has_gradle_kts = true;
        d.java_version = "17".into();
        let text = dockerfile(&d);
        assert!(text.starts_with("FROM gradle:8-jdk17 AS build\n"));
        assert!(text.contains("FROM eclipse-temurin:17-jre\n"));

        d.has_pom_xml = true;
        let text = dockerfile(&d);
        assert!(text.starts_with("FROM maven:3.9-eclipse-temurin-17 AS build\n"));
    }

    #[test]
    fn dotnet_template_is_two_stage() {
        let text = dockerfile(&details(Language::DotNet));
        assert!(text.starts_with("FROM mcr.microsoft.com/dotnet/sdk:8.0 AS build\n"));
        assert!(text.contains("FROM mcr.microsoft.com/dotnet/aspnet:8.0\n"));
        assert!(text.ends_with("CMD [\"dotnet\", \"app.dll\"]\n"));
    }

    #[test]
    fn unknown_is_generic_shell_image() {
        let expected = "FROM alpine:3.20\nWORKDIR /app\nCOPY . .\nCMD [\"sh\"]\n";
        assert_eq!(dockerfile(&details(Language::Unknown)), expected);
    }

    #[test]
    fn every_known_family_exposes_8080_once() {
        for language in Language::ALL {
            let text = dockerfile(&details(language));
            let exposes = text.matches("EXPOSE 8080").count();
            let expected = if language == Language::Unknown { 0 } else { 1 };
            assert_eq!(exposes, expected, "{language}");
        }
    }
}
