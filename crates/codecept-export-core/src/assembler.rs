//! Assembles emitted commands into a Codeception `Cest` class file.
//!
//! An export produces one class. For a single test the class is named after
//! the test and holds one test method; for a suite it is named after the
//! suite and holds one test method per suite entry, in suite order. Tests
//! reached through `run` commands become helper methods of the same class.
//!
//! The first line of every file is a generator marker comment, ahead of the
//! `<?php` tag. Callers that write or return the file drop it with
//! [`ExportedFile::without_marker`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::command::{find_test, Command, Suite, Test};
use crate::commands::wait_for_window_method;
use crate::emitter::{EmitContext, Registry};
use crate::error::ExportError;
use crate::fragment::{LevelTracker, Line};
use crate::hook::{HookKind, Hooks};
use crate::locator::{LocatorTranslator, WebDriverBy};
use crate::naming;

/// One level of indentation in generated code.
pub const INDENT: &str = "    ";

/// The marker comment that opens every generated file.
pub fn version_marker() -> String {
    format!("// Generated by codecept-export {}", env!("CARGO_PKG_VERSION"))
}

/// Per-export settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Prefix for relative `open` targets.
    pub base_url: String,
    /// Prefix every step with a `// N | command | target | value` comment.
    pub origin_tracing: bool,
    /// Render each command's description as a comment above it.
    pub description_comments: bool,
}

impl RenderOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// A generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub filename: String,
    pub body: String,
}

impl ExportedFile {
    /// Drops the first line of the body.
    pub fn without_marker(self) -> Self {
        let body = match self.body.find('\n') {
            Some(i) => self.body[i + 1..].to_string(),
            None => self.body,
        };
        Self {
            filename: self.filename,
            body,
        }
    }
}

/// Tracks what the class needs beyond its test methods.
#[derive(Default)]
struct ClassState<'t> {
    opens_window: bool,
    pending_helpers: VecDeque<&'t Test>,
    /// Helper method name to the test it was generated from.
    helpers: HashMap<String, &'t Test>,
}

impl<'t> ClassState<'t> {
    /// Queues `test` as a helper method unless it already is one. Two
    /// different tests sharing a helper name is an error.
    fn note_run(&mut self, test: &'t Test) -> Result<(), ExportError> {
        let name = naming::helper_method_name(&test.name);
        match self.helpers.get(&name) {
            Some(known) if std::ptr::eq(*known, test) => Ok(()),
            Some(_) => Err(ExportError::InvalidName(test.name.clone())),
            None => {
                self.helpers.insert(name, test);
                self.pending_helpers.push_back(test);
                Ok(())
            }
        }
    }
}

/// Records a method name, failing if the class already declares it.
fn declare(declared: &mut HashSet<String>, method: String, source: &str) -> Result<String, ExportError> {
    if declared.insert(method.clone()) {
        Ok(method)
    } else {
        Err(ExportError::InvalidName(source.to_string()))
    }
}

/// Turns tests and suites into class files.
#[derive(Clone)]
pub struct Assembler {
    registry: Registry,
    locators: Arc<dyn LocatorTranslator>,
    hooks: Hooks,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    /// Creates an assembler with the built-in emitters, `WebDriverBy`
    /// locators and default hooks.
    pub fn new() -> Self {
        Self {
            registry: Registry::with_builtins(),
            locators: Arc::new(WebDriverBy),
            hooks: Hooks::default(),
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_locators(mut self, locators: Arc<dyn LocatorTranslator>) -> Self {
        self.locators = locators;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Exports a single test as a class named after it.
    ///
    /// `tests` is the pool `run` commands are resolved against.
    pub async fn emit_test(
        &self,
        test: &Test,
        tests: &[Test],
        options: &RenderOptions,
    ) -> Result<ExportedFile, ExportError> {
        let span = info_span!("emit_test", test = %test.name);
        self.emit_class(&test.name, &[test], tests, options)
            .instrument(span)
            .await
    }

    /// Exports a suite as a class holding one method per suite test.
    ///
    /// # Errors
    ///
    /// [`ExportError::MissingTest`] if a suite entry is not in `tests`.
    pub async fn emit_suite(
        &self,
        suite: &Suite,
        tests: &[Test],
        options: &RenderOptions,
    ) -> Result<ExportedFile, ExportError> {
        let span = info_span!("emit_suite", suite = %suite.name);
        async {
            let members = suite
                .tests
                .iter()
                .map(|id| find_test(tests, id).ok_or_else(|| ExportError::MissingTest(id.clone())))
                .collect::<Result<Vec<_>, _>>()?;
            self.emit_class(&suite.name, &members, tests, options).await
        }
        .instrument(span)
        .await
    }

    async fn emit_class(
        &self,
        name: &str,
        members: &[&Test],
        tests: &[Test],
        options: &RenderOptions,
    ) -> Result<ExportedFile, ExportError> {
        if naming::sanitize_name(name).is_empty() {
            return Err(ExportError::InvalidName(name.to_string()));
        }
        let ctx = EmitContext::new(&options.base_url, self.locators.as_ref());
        let mut state = ClassState::default();
        let mut declared = HashSet::new();
        let mut methods = Vec::new();

        for test in members {
            if naming::sanitize_name(&test.name).is_empty() {
                return Err(ExportError::InvalidName(test.name.clone()));
            }
            let name = declare(&mut declared, naming::test_method_name(&test.name), &test.name)?;
            let body = self.emit_body(test, tests, &ctx, options, &mut state).await?;
            methods.push(method(
                format!("public function {}(AcceptanceTester $i) {{", name),
                body,
            ));
        }

        while let Some(helper) = state.pending_helpers.pop_front() {
            let name = declare(&mut declared, naming::helper_method_name(&helper.name), &helper.name)?;
            let body = self.emit_body(helper, tests, &ctx, options, &mut state).await?;
            methods.push(method(
                format!("public function {}(AcceptanceTester $i) {{", name),
                body,
            ));
        }
        if state.opens_window && declared.contains("waitForWindow") {
            return Err(ExportError::InvalidName("waitForWindow".to_string()));
        }

        let mut class_members: Vec<Vec<Line>> = Vec::new();
        for kind in [
            HookKind::DeclareVariables,
            HookKind::BeforeAll,
            HookKind::BeforeEach,
            HookKind::AfterEach,
            HookKind::AfterAll,
        ] {
            let hook = self.hooks.get(kind);
            if hook.is_rendered() {
                class_members.push(hook.render());
            }
        }
        let method_count = methods.len();
        class_members.extend(methods);
        if state.opens_window {
            class_members.push(wait_for_window_method());
        }
        let declared = self.hooks.get(HookKind::DeclareMethods);
        if declared.is_rendered() {
            class_members.push(declared.render());
        }

        let mut file = vec![Line::new(0, version_marker())];
        file.extend(self.hooks.get(HookKind::DeclareDependencies).render());
        file.push(Line::new(0, ""));
        file.push(Line::new(0, format!("class {} {{", naming::class_name(name))));
        for (i, member) in class_members.into_iter().enumerate() {
            if i > 0 {
                file.push(Line::new(0, ""));
            }
            file.extend(indent(member, 1));
        }
        file.push(Line::new(0, "}"));

        info!(class = %naming::class_name(name), methods = method_count, "class assembled");
        Ok(ExportedFile {
            filename: naming::file_name(name),
            body: render_lines(&file),
        })
    }

    /// Emits the body of one test method, commands in recorded order.
    ///
    /// `run` targets are resolved against `tests` first, so the call and the
    /// helper method are both named after the resolved test.
    async fn emit_body<'t>(
        &self,
        test: &Test,
        tests: &'t [Test],
        ctx: &EmitContext<'_>,
        options: &RenderOptions,
        state: &mut ClassState<'t>,
    ) -> Result<Vec<Line>, ExportError> {
        let mut lines = Vec::new();
        if options.origin_tracing {
            lines.push(Line::new(0, format!("// Test name: {}", test.name)));
            lines.push(Line::new(0, "// Step # | name | target | value"));
        }
        lines.extend(self.hooks.get(HookKind::InEachBegin).render());

        let mut tracker = LevelTracker::new();
        for (index, command) in test.commands.iter().enumerate() {
            let fragment = if command.command == "run" {
                let helper = find_test(tests, &command.target)
                    .ok_or_else(|| ExportError::MissingTest(command.target.clone()))?;
                state.note_run(helper)?;
                let call = Command {
                    target: helper.name.clone(),
                    ..command.clone()
                };
                self.registry.emit(&call, ctx).await?
            } else {
                self.registry.emit(command, ctx).await?
            };
            let level = tracker.peek(&fragment);
            if options.origin_tracing {
                lines.push(Line::new(
                    level,
                    one_line(&format!(
                        "// {} | {} | {} | {}",
                        index + 1,
                        command.command,
                        command.target,
                        command.value
                    )),
                ));
            }
            if options.description_comments && !command.comment.is_empty() {
                lines.push(Line::new(level, one_line(&format!("// {}", command.comment))));
            }
            lines.extend(tracker.apply(fragment));

            if command.opens_window {
                state.opens_window = true;
            }
        }
        if tracker.underflowed() || tracker.level() != 0 {
            warn!(
                test = %test.name,
                level = tracker.level(),
                underflowed = tracker.underflowed(),
                "unbalanced control flow"
            );
        }

        lines.extend(self.hooks.get(HookKind::InEachEnd).render());
        debug!(test = %test.name, commands = test.commands.len(), "test body emitted");
        Ok(lines)
    }
}

fn one_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

fn indent(lines: Vec<Line>, by: usize) -> impl Iterator<Item = Line> {
    lines
        .into_iter()
        .map(move |line| Line::new(line.level + by, line.statement))
}

fn method(declaration: String, body: Vec<Line>) -> Vec<Line> {
    let mut lines = vec![Line::new(0, declaration)];
    lines.extend(indent(body, 1));
    lines.push(Line::new(0, "}"));
    lines
}

/// Serialises lines with [`INDENT`] per level. Empty statements become
/// blank lines.
pub fn render_lines(lines: &[Line]) -> String {
    let mut out = String::new();
    for line in lines {
        if !line.statement.is_empty() {
            for _ in 0..line.level {
                out.push_str(INDENT);
            }
            out.push_str(&line.statement);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::emitter::EmitError;

    fn login() -> Test {
        Test::new(
            "log in",
            vec![
                Command::new("open", "/login", ""),
                Command::new("type", "id=user", "${username}"),
                Command::new("click", "css=button", ""),
            ],
        )
    }

    #[tokio::test]
    async fn single_test_class_layout() {
        let test = login();
        let file = Assembler::new()
            .emit_test(&test, &[test.clone()], &RenderOptions::new("https://app.test"))
            .await
            .unwrap();
        assert_eq!(file.filename, "LoginCest.php");

        let lines: Vec<&str> = file.body.lines().collect();
        assert_eq!(lines[0], version_marker());
        assert_eq!(lines[1], "<?php");
        assert!(file.body.contains("class LoginCest {\n    private array $vars = [];\n"));
        assert!(file.body.contains(
            "    public function testLogin(AcceptanceTester $i) {\n        $i->amOnUrl('https://app.test/login');\n"
        ));
        assert!(file.body.contains(
            "        $i->pressKey(WebDriverBy::id('user'), $this->vars['username']);\n"
        ));
        assert!(!file.body.contains("_initialize"));
        assert!(!file.body.contains("waitForWindow"));
        assert!(file.body.ends_with("    }\n}\n"));
    }

    #[tokio::test]
    async fn suite_methods_follow_suite_order() {
        let tests = vec![
            Test::new("first", vec![Command::new("click", "id=a", "")]),
            Test::new("second", vec![Command::new("click", "id=b", "")]),
        ];
        let suite = Suite {
            name: "Smoke".into(),
            tests: vec!["second".into(), "first".into()],
            ..Suite::default()
        };
        let file = Assembler::new()
            .emit_suite(&suite, &tests, &RenderOptions::default())
            .await
            .unwrap();
        assert_eq!(file.filename, "SmokeCest.php");
        let second = file.body.find("testSecond").unwrap();
        let first = file.body.find("testFirst").unwrap();
        assert!(second < first);
    }

    #[tokio::test]
    async fn suite_with_unknown_test_fails() {
        let suite = Suite {
            name: "Smoke".into(),
            tests: vec!["ghost".into()],
            ..Suite::default()
        };
        let err = Assembler::new()
            .emit_suite(&suite, &[], &RenderOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::MissingTest(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn run_adds_helper_methods_transitively() {
        let tests = vec![
            Test::new("main", vec![Command::new("run", "Setup", "")]),
            Test::new("Setup", vec![Command::new("run", "seed", "")]),
            Test::new("seed", vec![Command::new("store", "1", "seeded")]),
        ];
        let file = Assembler::new()
            .emit_test(&tests[0], &tests, &RenderOptions::default())
            .await
            .unwrap();
        assert!(file.body.contains("        $this->setup($i);\n"));
        assert!(file.body.contains("    public function setup(AcceptanceTester $i) {\n"));
        assert!(file.body.contains("    public function seed(AcceptanceTester $i) {\n"));
        assert_eq!(file.body.matches("public function seed(").count(), 1);
    }

    #[tokio::test]
    async fn run_by_id_names_call_after_resolved_test() {
        let setup = Test {
            id: "b7e2-setup".into(),
            name: "Prepare Cart".into(),
            commands: vec![Command::new("store", "1", "ready")],
        };
        let tests = vec![
            Test::new("main", vec![Command::new("run", "b7e2-setup", "")]),
            setup,
        ];
        let file = Assembler::new()
            .emit_test(&tests[0], &tests, &RenderOptions::default())
            .await
            .unwrap();
        assert!(file.body.contains("        $this->prepareCart($i);\n"));
        assert!(file.body.contains("    public function prepareCart(AcceptanceTester $i) {\n"));
        assert!(!file.body.contains("b7e2"));
    }

    #[tokio::test]
    async fn run_by_id_and_name_shares_one_helper() {
        let mut seed = Test::new("seed", vec![Command::new("store", "1", "seeded")]);
        seed.id = "s-1".into();
        let tests = vec![
            Test::new(
                "main",
                vec![Command::new("run", "s-1", ""), Command::new("run", "seed", "")],
            ),
            seed,
        ];
        let file = Assembler::new()
            .emit_test(&tests[0], &tests, &RenderOptions::default())
            .await
            .unwrap();
        assert_eq!(file.body.matches("$this->seed($i);").count(), 2);
        assert_eq!(file.body.matches("public function seed(").count(), 1);
    }

    #[tokio::test]
    async fn helpers_with_clashing_names_fail() {
        let mut first = Test::new("log-in", vec![]);
        first.id = "a".into();
        let mut second = Test::new("login", vec![]);
        second.id = "b".into();
        let tests = vec![
            Test::new("main", vec![Command::new("run", "a", ""), Command::new("run", "b", "")]),
            first,
            second,
        ];
        let err = Assembler::new()
            .emit_test(&tests[0], &tests, &RenderOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidName(name) if name == "login"));
    }

    #[tokio::test]
    async fn suite_tests_with_clashing_method_names_fail() {
        let mut first = Test::new("Check out", vec![]);
        first.id = "a".into();
        let mut second = Test::new("Check-out", vec![]);
        second.id = "b".into();
        let suite = Suite {
            name: "Orders".into(),
            tests: vec!["a".into(), "b".into()],
            ..Suite::default()
        };
        let err = Assembler::new()
            .emit_suite(&suite, &[first, second], &RenderOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidName(name) if name == "Check-out"));
    }

    #[tokio::test]
    async fn run_of_missing_test_fails() {
        let test = Test::new("main", vec![Command::new("run", "nowhere", "")]);
        let err = Assembler::new()
            .emit_test(&test, &[test.clone()], &RenderOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::MissingTest(_)));
    }

    #[tokio::test]
    async fn emit_errors_propagate_without_output() {
        let test = Test::new("t", vec![Command::new("fly", "", "")]);
        let err = Assembler::new()
            .emit_test(&test, &[], &RenderOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::Emit(EmitError::UnsupportedCommand(ref name)) if name == "fly"
        ));
        assert_eq!(err.to_string(), "Unknown command fly");
    }

    #[tokio::test]
    async fn unusable_name_is_rejected() {
        let test = Test::new("!!!", vec![]);
        let err = Assembler::new()
            .emit_test(&test, &[], &RenderOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidName(_)));
    }

    #[tokio::test]
    async fn origin_tracing_and_descriptions() {
        let mut click = Command::new("click", "id=a", "");
        click.comment = "press the button".into();
        let test = Test::new(
            "traced",
            vec![
                Command::new("if", "true", ""),
                click,
                Command::new("end", "", ""),
            ],
        );
        let options = RenderOptions {
            origin_tracing: true,
            description_comments: true,
            ..RenderOptions::default()
        };
        let file = Assembler::new().emit_test(&test, &[], &options).await.unwrap();
        let expected = [
            "        // Test name: traced",
            "        // Step # | name | target | value",
            "        // 1 | if | true | ",
            "        if ($i->executeJS('return (true)')) {",
            "            // 2 | click | id=a | ",
            "            // press the button",
            "            $i->click(WebDriverBy::id('a'));",
            "        // 3 | end |  | ",
            "        }",
        ]
        .join("\n");
        assert!(file.body.contains(&expected), "{}", file.body);
    }

    #[tokio::test]
    async fn window_opening_adds_wait_helper() {
        let test = Test::new(
            "popup",
            vec![Command::new("click", "id=open", "").opening_window("win")],
        );
        let file = Assembler::new()
            .emit_test(&test, &[], &RenderOptions::default())
            .await
            .unwrap();
        assert!(file
            .body
            .contains("        $this->vars['win'] = $this->waitForWindow($i, 2000);\n"));
        assert!(file
            .body
            .contains("    public function waitForWindow(AcceptanceTester $i, $timeout = 2000) {\n"));
    }

    #[tokio::test]
    async fn registered_hooks_are_rendered() {
        let mut assembler = Assembler::new();
        assembler.hooks_mut().register(HookKind::BeforeAll, "codecept_debug('start');");
        assembler.hooks_mut().register(HookKind::InEachBegin, "$i->maximizeWindow();");
        let test = Test::new("t", vec![]);
        let file = assembler
            .emit_test(&test, &[], &RenderOptions::default())
            .await
            .unwrap();
        assert!(file.body.contains(
            "    public function _initialize() {\n        codecept_debug('start');\n    }\n"
        ));
        assert!(file.body.contains("        $i->maximizeWindow();\n"));
    }

    #[test]
    fn render_lines_indents_with_four_spaces() {
        let out = render_lines(&[Line::new(0, "a"), Line::new(2, "b"), Line::new(3, "")]);
        assert_eq!(out, "a\n        b\n\n");
    }
}
