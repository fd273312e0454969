//! File and class boilerplate around generated tests.
//!
//! A [`Hook`] is a fixed opening and closing syntax plus any lines that
//! callers register into it. Registered lines render between the two at the
//! hook's registration level, so code added to `_before` lands inside the
//! method body.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fragment::Line;

/// Points in the generated file that accept boilerplate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookKind {
    AfterAll,
    AfterEach,
    BeforeAll,
    BeforeEach,
    DeclareDependencies,
    DeclareMethods,
    DeclareVariables,
    InEachBegin,
    InEachEnd,
}

impl HookKind {
    pub const ALL: [HookKind; 9] = [
        HookKind::AfterAll,
        HookKind::AfterEach,
        HookKind::BeforeAll,
        HookKind::BeforeEach,
        HookKind::DeclareDependencies,
        HookKind::DeclareMethods,
        HookKind::DeclareVariables,
        HookKind::InEachBegin,
        HookKind::InEachEnd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HookKind::AfterAll => "afterAll",
            HookKind::AfterEach => "afterEach",
            HookKind::BeforeAll => "beforeAll",
            HookKind::BeforeEach => "beforeEach",
            HookKind::DeclareDependencies => "declareDependencies",
            HookKind::DeclareMethods => "declareMethods",
            HookKind::DeclareVariables => "declareVariables",
            HookKind::InEachBegin => "inEachBegin",
            HookKind::InEachEnd => "inEachEnd",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub kind: HookKind,
    pub starting_syntax: Vec<Line>,
    pub ending_syntax: Vec<Line>,
    /// Level added to registered lines.
    pub registration_level: usize,
    registered: Vec<Line>,
}

impl Hook {
    fn new(kind: HookKind) -> Self {
        Self {
            kind,
            starting_syntax: Vec::new(),
            ending_syntax: Vec::new(),
            registration_level: 0,
            registered: Vec::new(),
        }
    }

    fn method(kind: HookKind, name: &str) -> Self {
        Self {
            starting_syntax: vec![Line::new(0, format!("public function {}() {{", name))],
            ending_syntax: vec![Line::new(0, "}")],
            registration_level: 1,
            ..Self::new(kind)
        }
    }

    /// Adds a statement to the hook body.
    pub fn register(&mut self, statement: impl Into<String>) {
        self.register_line(Line::new(0, statement));
    }

    /// Adds a line, keeping its relative level.
    pub fn register_line(&mut self, line: Line) {
        self.registered.push(line);
    }

    pub fn has_registrations(&self) -> bool {
        !self.registered.is_empty()
    }

    /// Opening syntax, registered lines, closing syntax.
    pub fn render(&self) -> Vec<Line> {
        let mut lines = self.starting_syntax.clone();
        lines.extend(
            self.registered
                .iter()
                .map(|l| Line::new(l.level + self.registration_level, l.statement.clone())),
        );
        lines.extend(self.ending_syntax.iter().cloned());
        lines
    }

    /// Whether the hook contributes anything to the file.
    ///
    /// Suite-wide hooks only appear once something is registered into them;
    /// the rest appear whenever they have syntax of their own.
    pub fn is_rendered(&self) -> bool {
        match self.kind {
            HookKind::BeforeAll | HookKind::AfterAll => self.has_registrations(),
            _ => self.has_registrations() || !self.starting_syntax.is_empty(),
        }
    }
}

/// Builds the default hook for `kind`.
pub fn generate(kind: HookKind) -> Hook {
    match kind {
        HookKind::AfterAll => Hook::method(kind, "_afterSuite"),
        HookKind::AfterEach => Hook::method(kind, "_after"),
        HookKind::BeforeAll => Hook::method(kind, "_initialize"),
        HookKind::BeforeEach => Hook::method(kind, "_before"),
        HookKind::DeclareDependencies => Hook {
            starting_syntax: [
                "<?php",
                "",
                "/** phpcs:ignoreFile */",
                "",
                "declare(strict_types=1);",
                "",
                "namespace App\\Tests\\acceptance;",
                "",
                "use App\\Tests\\AcceptanceTester;",
                "use Codeception\\Util\\Fixtures;",
                "use Facebook\\WebDriver\\Remote\\RemoteWebDriver;",
                "use Facebook\\WebDriver\\WebDriverKeys;",
                "use Facebook\\WebDriver\\WebDriverExpectedCondition;",
                "use Facebook\\WebDriver\\WebDriverBy;",
                "use InvalidArgumentException;",
                "use RuntimeException;",
            ]
            .into_iter()
            .map(|s| Line::new(0, s))
            .collect(),
            ..Hook::new(kind)
        },
        HookKind::DeclareVariables => Hook {
            starting_syntax: vec![Line::new(0, "private array $vars = [];")],
            ..Hook::new(kind)
        },
        HookKind::DeclareMethods | HookKind::InEachBegin | HookKind::InEachEnd => Hook::new(kind),
    }
}

/// Every hook, each in its default state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hooks {
    hooks: Vec<Hook>,
}

impl Hooks {
    pub fn get(&self, kind: HookKind) -> &Hook {
        // ALL covers every kind, so the lookup cannot miss.
        &self.hooks[Self::index(kind)]
    }

    pub fn get_mut(&mut self, kind: HookKind) -> &mut Hook {
        &mut self.hooks[Self::index(kind)]
    }

    pub fn register(&mut self, kind: HookKind, statement: impl Into<String>) {
        self.get_mut(kind).register(statement);
    }

    fn index(kind: HookKind) -> usize {
        HookKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default()
    }
}

impl Default for Hooks {
    fn default() -> Self {
        generate_hooks()
    }
}

/// Generates all hooks.
pub fn generate_hooks() -> Hooks {
    Hooks {
        hooks: HookKind::ALL.iter().map(|&kind| generate(kind)).collect(),
    }
}
