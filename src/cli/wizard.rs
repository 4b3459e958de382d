use crate::domain::catalog::{category_of, ordered_categories};
use crate::domain::{GenerationBackend, LanguageDetails, ServiceSpec};
use crate::infra::writer::{COMPOSE_FILE_NAME, DOCKERFILE_FILE_NAME, Output};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Welcome,
    Detect,
    /// Service selection for the category at this index
    Select(usize),
    Review,
    Generate,
    Result,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Back,
    Retry,
    /// 1-based position in the current category list
    Toggle(usize),
    Quit,
}

impl Command {
    /// Parses one input line: empty for next, `b`, `r`, `q` or a number.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "enter" | "n" | "next" => Some(Self::Next),
            "b" | "back" => Some(Self::Back),
            "r" | "retry" => Some(Self::Retry),
            "q" | "quit" | "exit" => Some(Self::Quit),
            other => other.parse::<usize>().ok().map(Self::Toggle),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Caller-side state machine over the wizard steps.
///
/// Backend calls happen synchronously while handling a command; any failure
/// moves the wizard to [`Step::Error`], remembering which step failed and
/// which step preceded it.
#[derive(Debug)]
pub struct Wizard<'a, B: GenerationBackend + ?Sized> {
    backend: &'a B,
    step: Step,
    failed: Step,
    before_failure: Step,
    categories: Vec<String>,
    services: Vec<ServiceSpec>,
    selected: BTreeSet<String>,
    details: Option<LanguageDetails>,
    warnings: Vec<String>,
    conflicts: Vec<String>,
    output: Option<Output>,
    error: Option<String>,
}

impl<'a, B: GenerationBackend + ?Sized> Wizard<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        let services = backend.selectable_services();
        let categories = ordered_categories(services.iter().map(category_of));
        Self {
            backend,
            step: Step::Welcome,
            failed: Step::Welcome,
            before_failure: Step::Welcome,
            categories,
            services,
            selected: BTreeSet::new(),
            details: None,
            warnings: Vec::new(),
            conflicts: Vec::new(),
            output: None,
            error: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn details(&self) -> Option<&LanguageDetails> {
        self.details.as_ref()
    }

    /// Selection warnings shown on review; they do not stop generation.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Output files already on disk; generation is refused until they are gone.
    pub fn conflicts(&self) -> &[String] {
        &self.conflicts
    }

    pub fn output(&self) -> Option<&Output> {
        self.output.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Chosen ids in catalog display order.
    pub fn selected_ids(&self) -> Vec<String> {
        self.services
            .iter()
            .filter(|svc| self.selected.contains(&svc.id))
            .map(|svc| svc.id.clone())
            .collect()
    }

    /// Selectable services of the category shown at `index`.
    pub fn services_in(&self, index: usize) -> Vec<&ServiceSpec> {
        match self.categories.get(index) {
            Some(category) => self
                .services
                .iter()
                .filter(|svc| category_of(svc) == category.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn handle(&mut self, command: Command) -> Flow {
        if command == Command::Quit {
            return Flow::Quit;
        }

        match (self.step, command) {
            (Step::Welcome, Command::Next) => self.run_detect(),
            (Step::Select(index), Command::Toggle(position)) => self.toggle(index, position),
            (Step::Select(index), Command::Next) => {
                if index + 1 < self.categories.len() {
                    self.step = Step::Select(index + 1);
                } else {
                    self.run_review();
                }
            }
            (Step::Select(index), Command::Back) => {
                self.step = if index == 0 {
                    Step::Welcome
                } else {
                    Step::Select(index - 1)
                };
            }
            (Step::Review, Command::Next) => {
                if self.conflicts.is_empty() {
                    self.run_generate();
                }
            }
            (Step::Review, Command::Retry) => self.run_review(),
            (Step::Review, Command::Back) => self.step = self.last_selection_step(),
            (Step::Result, Command::Next) => return Flow::Quit,
            (Step::Error, Command::Retry) => match self.failed {
                Step::Detect => self.run_detect(),
                Step::Review => self.run_review(),
                Step::Generate => self.run_generate(),
                _ => self.step = self.before_failure,
            },
            (Step::Error, Command::Back) => self.step = self.before_failure,
            _ => {}
        }
        Flow::Continue
    }

    fn toggle(&mut self, index: usize, position: usize) {
        let Some(id) = position
            .checked_sub(1)
            .and_then(|i| self.services_in(index).get(i).map(|svc| svc.id.clone()))
        else {
            return;
        };

        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    fn last_selection_step(&self) -> Step {
        match self.categories.len() {
            0 => Step::Welcome,
            n => Step::Select(n - 1),
        }
    }

    fn run_detect(&mut self) {
        self.step = Step::Detect;
        match self.backend.detect() {
            Ok(details) => {
                debug!("wizard detected {}", details.label());
                self.details = Some(details);
                if self.categories.is_empty() {
                    self.run_review();
                } else {
                    self.step = Step::Select(0);
                }
            }
            Err(e) => self.fail(Step::Detect, Step::Welcome, e.to_string()),
        }
    }

    fn run_review(&mut self) {
        self.step = Step::Review;
        match self.backend.selection_warnings(&self.selected_ids()) {
            Ok(warnings) => {
                self.warnings = warnings;
                self.conflicts = self
                    .backend
                    .existing_outputs()
                    .into_iter()
                    .map(|name| format!("{name} already exists"))
                    .collect();
            }
            Err(e) => {
                let before = self.last_selection_step();
                self.fail(Step::Review, before, e.to_string());
            }
        }
    }

    fn run_generate(&mut self) {
        self.step = Step::Generate;
        match self.backend.generate(&self.selected_ids()) {
            Ok(output) => {
                self.output = Some(output);
                self.step = Step::Result;
            }
            Err(e) => self.fail(Step::Generate, Step::Review, e.to_string()),
        }
    }

    fn fail(&mut self, failed: Step, before: Step, message: String) {
        debug!("wizard step {:?} failed: {}", failed, message);
        self.failed = failed;
        self.before_failure = before;
        self.error = Some(message);
        self.step = Step::Error;
    }

    fn step_number(&self) -> (usize, usize) {
        let n = self.categories.len();
        let total = n + 4;
        let current = match self.step {
            Step::Welcome => 1,
            Step::Detect => 2,
            Step::Select(i) => 3 + i,
            Step::Review => n + 3,
            Step::Generate | Step::Result | Step::Error => total,
        };
        (current, total)
    }

    pub fn footer(&self) -> &'static str {
        match self.step {
            Step::Welcome => "enter next | q quit",
            Step::Detect => "detecting language...",
            Step::Select(_) => "number toggle | enter next | b back | q quit",
            Step::Review if !self.conflicts.is_empty() => {
                "remove existing files to continue | r refresh | b back | q quit"
            }
            Step::Review if !self.warnings.is_empty() => {
                "enter generate anyway | r refresh | b back | q quit"
            }
            Step::Review => "enter generate | b back | q quit",
            Step::Generate => "generating...",
            Step::Result => "enter finish | q quit",
            Step::Error => "r retry | b back | q quit",
        }
    }

    /// Plain-text screen for the current step.
    pub fn render(&self) -> String {
        let (current, total) = self.step_number();
        let language = self
            .details
            .as_ref()
            .map(LanguageDetails::label)
            .unwrap_or_else(|| "detecting".to_string());

        let mut lines = vec![
            format!("[Step {current}/{total}] language: {language}"),
            String::new(),
        ];

        match self.step {
            Step::Welcome => lines.extend(
                [
                    "Welcome to docker-wizard.",
                    "This wizard will detect your project language,",
                    "generate a Dockerfile, and create a docker-compose.yml",
                    "with the services you choose.",
                ]
                .map(String::from),
            ),
            Step::Detect => lines.push("Detecting project language".to_string()),
            Step::Select(index) => {
                let title = self
                    .categories
                    .get(index)
                    .map(|c| category_title(c))
                    .unwrap_or("Services");
                lines.push(format!("== {title} =="));
                for (i, svc) in self.services_in(index).into_iter().enumerate() {
                    let check = if self.selected.contains(&svc.id) { "[x]" } else { "[ ]" };
                    let mut line = format!("{:>2}. {} {}", i + 1, check, svc.display_name());
                    if !svc.description.is_empty() {
                        line.push_str(&format!("  {}", svc.description));
                    }
                    lines.push(line);
                }
            }
            Step::Review => lines.extend(self.review_lines()),
            Step::Generate => {
                lines.push(format!(
                    "Generating {COMPOSE_FILE_NAME} and {DOCKERFILE_FILE_NAME}"
                ));
            }
            Step::Result => {
                lines.push("✅ All set.".to_string());
                lines.push(String::new());
                lines.push("Generated files:".to_string());
                if let Some(output) = &self.output {
                    lines.push(format!("- {}", output.compose_path.display()));
                    lines.push(format!("- {}", output.dockerfile_path.display()));
                    if let Some(ignore) = &output.dockerignore_path {
                        lines.push(format!("- {}", ignore.display()));
                    }
                }
                lines.push(String::new());
                lines.push("Next steps:".to_string());
                lines.push("- docker compose up".to_string());
            }
            Step::Error => {
                lines.push("❌ Something went wrong.".to_string());
                lines.push(String::new());
                lines.push(self.error.clone().unwrap_or_else(|| "Unknown error".into()));
            }
        }

        lines.push(String::new());
        lines.push(self.footer().to_string());
        lines.join("\n")
    }

    fn review_lines(&self) -> Vec<String> {
        let mut lines = vec!["Review your selections:".to_string(), String::new()];

        for (index, category) in self.categories.iter().enumerate() {
            let labels: Vec<&str> = self
                .services_in(index)
                .into_iter()
                .filter(|svc| self.selected.contains(&svc.id))
                .map(ServiceSpec::display_name)
                .collect();

            lines.push(format!("{}:", category_title(category)));
            if labels.is_empty() {
                lines.push("- none".to_string());
            }
            lines.extend(labels.iter().map(|label| format!("- {label}")));
            lines.push(String::new());
        }

        lines.push("Files to be generated:".to_string());
        lines.push(format!("- {COMPOSE_FILE_NAME}"));
        lines.push(format!("- {DOCKERFILE_FILE_NAME}"));

        if !self.warnings.is_empty() {
            lines.push(String::new());
            lines.push("⚠️  Warnings".to_string());
            lines.extend(self.warnings.iter().map(|w| format!("- {w}")));
        }
        if !self.conflicts.is_empty() {
            lines.push(String::new());
            lines.push("❌ Blocked".to_string());
            lines.extend(self.conflicts.iter().map(|c| format!("- {c}")));
        }
        lines
    }
}

fn category_title(category: &str) -> &str {
    match category {
        "database" => "Databases",
        "message-queue" => "Message Queues",
        "cache" => "Caching",
        "analytics" => "Analytics",
        "proxy" => "Webservers / Proxies",
        other => other,
    }
}

/// Drives the wizard from line input until it finishes, the user quits or
/// input runs out.
///
/// Returns the written files when generation completed.
pub fn run_wizard<B, R, W>(backend: &B, input: R, mut out: W) -> Result<Option<Output>>
where
    B: GenerationBackend + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut wizard = Wizard::new(backend);
    let mut lines = input.lines();

    loop {
        writeln!(out, "{}\n", wizard.render()).context("writing wizard screen")?;
        write!(out, "> ").context("writing wizard prompt")?;
        out.flush().context("flushing wizard output")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("reading wizard input")?;

        let Some(command) = Command::parse(&line) else {
            writeln!(out, "unrecognized input: {}", line.trim())?;
            continue;
        };

        if wizard.handle(command) == Flow::Quit {
            break;
        }
    }

    writeln!(out)?;
    Ok(wizard.output().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBackend;
    use std::io::Cursor;

    fn to_review(wizard: &mut Wizard<'_, MockBackend>) {
        wizard.handle(Command::Next);
        while matches!(wizard.step(), Step::Select(_)) {
            wizard.handle(Command::Next);
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(""), Some(Command::Next));
        assert_eq!(Command::parse(" B "), Some(Command::Back));
        assert_eq!(Command::parse("r"), Some(Command::Retry));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse("2"), Some(Command::Toggle(2)));
        assert_eq!(Command::parse("x"), None);
    }

    #[test]
    fn categories_follow_known_order() {
        let backend = MockBackend::new();
        let wizard = Wizard::new(&backend);
        assert_eq!(
            wizard.categories(),
            ["database", "message-queue", "cache", "analytics", "proxy"]
        );
    }

    #[test]
    fn walks_every_step_to_result() {
        let backend = MockBackend::new();
        let mut wizard = Wizard::new(&backend);

        assert_eq!(wizard.step(), Step::Welcome);
        wizard.handle(Command::Next);
        assert_eq!(wizard.step(), Step::Select(0));
        assert_eq!(wizard.details().unwrap().label(), "Go 1.22");

        wizard.handle(Command::Toggle(1));
        for _ in 0..5 {
            wizard.handle(Command::Next);
        }
        assert_eq!(wizard.step(), Step::Review);
        assert!(wizard.warnings().is_empty());
        assert!(wizard.conflicts().is_empty());

        wizard.handle(Command::Next);
        assert_eq!(wizard.step(), Step::Result);
        assert!(wizard.output().is_some());
        assert_eq!(wizard.handle(Command::Next), Flow::Quit);
        assert_eq!(
            backend.get_calls(),
            vec!["detect", "warnings:postgres", "generate:postgres"]
        );
    }

    #[test]
    fn toggling_twice_deselects() {
        let backend = MockBackend::new();
        let mut wizard = Wizard::new(&backend);
        wizard.handle(Command::Next);

        wizard.handle(Command::Toggle(1));
        assert_eq!(wizard.selected_ids(), vec!["postgres"]);
        wizard.handle(Command::Toggle(1));
        assert!(wizard.selected_ids().is_empty());

        wizard.handle(Command::Toggle(0));
        wizard.handle(Command::Toggle(9));
        assert!(wizard.selected_ids().is_empty());
    }

    #[test]
    fn existing_outputs_block_generation() {
        let backend = MockBackend::new();
        backend.set_existing(&[COMPOSE_FILE_NAME]);
        let mut wizard = Wizard::new(&backend);
        to_review(&mut wizard);

        assert_eq!(wizard.conflicts(), ["docker-compose.yml already exists"]);
        assert!(wizard.warnings().is_empty());
        wizard.handle(Command::Next);
        assert_eq!(wizard.step(), Step::Review);
        assert!(wizard.render().contains("remove existing files to continue"));

        backend.set_existing(&[]);
        wizard.handle(Command::Retry);
        assert!(wizard.conflicts().is_empty());
        wizard.handle(Command::Next);
        assert_eq!(wizard.step(), Step::Result);
    }

    #[test]
    fn port_collision_warns_without_blocking() {
        let backend = MockBackend::new();
        let mut wizard = Wizard::new(&backend);
        wizard.handle(Command::Next);
        for _ in 0..4 {
            wizard.handle(Command::Next);
        }
        assert_eq!(wizard.step(), Step::Select(4));
        wizard.handle(Command::Toggle(1));
        wizard.handle(Command::Toggle(2));
        wizard.handle(Command::Next);

        assert_eq!(
            wizard.warnings(),
            [
                "host port 80 is published by Nginx, Traefik",
                "host port 8080 is published by Traefik, app",
            ]
        );
        assert!(wizard.conflicts().is_empty());
        assert!(wizard.render().contains("enter generate anyway"));

        wizard.handle(Command::Back);
        assert_eq!(wizard.step(), Step::Select(4));

        wizard.handle(Command::Next);
        wizard.handle(Command::Next);
        assert_eq!(wizard.step(), Step::Result);
        assert_eq!(
            backend.get_calls().last().map(String::as_str),
            Some("generate:nginx,traefik")
        );
    }

    #[test]
    fn detect_failure_offers_retry_and_back() {
        let backend = MockBackend::new();
        backend.set_fail_on("detect");
        let mut wizard = Wizard::new(&backend);

        wizard.handle(Command::Next);
        assert_eq!(wizard.step(), Step::Error);
        assert!(wizard.error().unwrap().contains("mock failure on detect"));

        wizard.handle(Command::Back);
        assert_eq!(wizard.step(), Step::Welcome);

        wizard.handle(Command::Next);
        assert_eq!(wizard.step(), Step::Error);
        backend.clear_failure();
        wizard.handle(Command::Retry);
        assert_eq!(wizard.step(), Step::Select(0));
    }

    #[test]
    fn generate_failure_returns_to_review() {
        let backend = MockBackend::new();
        backend.set_fail_on("generate");
        let mut wizard = Wizard::new(&backend);
        to_review(&mut wizard);

        wizard.handle(Command::Next);
        assert_eq!(wizard.step(), Step::Error);
        wizard.handle(Command::Back);
        assert_eq!(wizard.step(), Step::Review);

        wizard.handle(Command::Next);
        backend.clear_failure();
        wizard.handle(Command::Retry);
        assert_eq!(wizard.step(), Step::Result);
    }

    #[test]
    fn quit_is_available_everywhere() {
        let backend = MockBackend::new();
        let mut wizard = Wizard::new(&backend);
        assert_eq!(wizard.handle(Command::Quit), Flow::Quit);
        to_review(&mut wizard);
        assert_eq!(wizard.handle(Command::Quit), Flow::Quit);
    }

    #[test]
    fn driver_runs_from_lines() {
        let backend = MockBackend::new();
        let input = Cursor::new("\n\n1\n\n\n\n\n\n\n");
        let mut screen = Vec::new();

        let output = run_wizard(&backend, input, &mut screen).unwrap();
        assert!(output.is_some());

        let screen = String::from_utf8(screen).unwrap();
        assert!(screen.contains("Welcome to docker-wizard."));
        assert!(screen.contains("== Message Queues =="));
        assert!(screen.contains(" 1. [x] Kafka"));
        assert!(screen.contains("All set."));
        assert!(backend.get_calls().contains(&"generate:kafka".to_string()));
    }

    #[test]
    fn driver_stops_at_end_of_input() {
        let backend = MockBackend::new();
        let output = run_wizard(&backend, Cursor::new("\nwhat\n"), Vec::new()).unwrap();
        assert!(output.is_none());
    }
}
