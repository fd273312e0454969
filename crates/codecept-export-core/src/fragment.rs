//! Emitter output and indentation bookkeeping.
//!
//! Every emitter produces a [`Fragment`]: either a single statement or a
//! [`Block`] of statements with relative levels. Blocks also carry level
//! adjustments that shift the ambient indentation before and after the block,
//! which is how control-flow constructs open and close their bodies.
//! [`LevelTracker`] applies those adjustments while rendering a test body.

use serde::{Deserialize, Serialize};

/// One statement inside a block, at a level relative to the block's base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub level: usize,
    pub statement: String,
}

impl Line {
    pub fn new(level: usize, statement: impl Into<String>) -> Self {
        Self {
            level,
            statement: statement.into(),
        }
    }
}

/// An ordered sequence of statements plus indentation adjustments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub lines: Vec<Line>,
    /// Applied to the ambient level before this block's lines render.
    pub starting_level_adjustment: i32,
    /// Applied to the ambient level after this block's lines render.
    pub ending_level_adjustment: i32,
}

impl Block {
    pub fn new(lines: Vec<Line>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    /// Appends a line at `level`. Empty statements are dropped.
    pub fn push(&mut self, level: usize, statement: impl Into<String>) {
        let statement = statement.into();
        if !statement.is_empty() {
            self.lines.push(Line::new(level, statement));
        }
    }

    pub fn starting(mut self, adjustment: i32) -> Self {
        self.starting_level_adjustment = adjustment;
        self
    }

    pub fn ending(mut self, adjustment: i32) -> Self {
        self.ending_level_adjustment = adjustment;
        self
    }
}

/// The result of emitting one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A single statement. The empty string is a deliberate no-op.
    Statement(String),
    /// A structured, indentation-aware block.
    Block(Block),
}

impl Fragment {
    /// The explicit no-op fragment.
    pub fn empty() -> Self {
        Fragment::Statement(String::new())
    }

    pub fn statement(text: impl Into<String>) -> Self {
        Fragment::Statement(text.into())
    }

    /// True when rendering this fragment produces no lines and no level change.
    pub fn is_empty(&self) -> bool {
        match self {
            Fragment::Statement(s) => s.is_empty(),
            Fragment::Block(b) => {
                b.lines.is_empty()
                    && b.starting_level_adjustment == 0
                    && b.ending_level_adjustment == 0
            }
        }
    }

    /// Net indentation change caused by this fragment.
    pub fn net_adjustment(&self) -> i32 {
        match self {
            Fragment::Statement(_) => 0,
            Fragment::Block(b) => b.starting_level_adjustment + b.ending_level_adjustment,
        }
    }

    pub fn starting_adjustment(&self) -> i32 {
        match self {
            Fragment::Statement(_) => 0,
            Fragment::Block(b) => b.starting_level_adjustment,
        }
    }

    /// Flattens the fragment into lines at relative level 0.
    pub fn into_lines(self) -> Vec<Line> {
        match self {
            Fragment::Statement(s) if s.is_empty() => Vec::new(),
            Fragment::Statement(s) => vec![Line::new(0, s)],
            Fragment::Block(b) => b.lines,
        }
    }
}

impl From<Block> for Fragment {
    fn from(block: Block) -> Self {
        Fragment::Block(block)
    }
}

/// Running indentation level across the fragments of one test body.
#[derive(Debug, Default)]
pub struct LevelTracker {
    level: i32,
    underflowed: bool,
}

impl LevelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current ambient level.
    pub fn level(&self) -> usize {
        self.level.max(0) as usize
    }

    /// True if an adjustment ever tried to go below level zero.
    pub fn underflowed(&self) -> bool {
        self.underflowed
    }

    /// The level `fragment`'s lines would start at, without applying it.
    pub fn peek(&self, fragment: &Fragment) -> usize {
        (self.level + fragment.starting_adjustment()).max(0) as usize
    }

    /// Renders `fragment` to lines at absolute levels and updates the level.
    pub fn apply(&mut self, fragment: Fragment) -> Vec<Line> {
        let (start, end) = match &fragment {
            Fragment::Statement(_) => (0, 0),
            Fragment::Block(b) => (b.starting_level_adjustment, b.ending_level_adjustment),
        };
        self.adjust(start);
        let base = self.level();
        let lines = fragment
            .into_lines()
            .into_iter()
            .map(|line| Line::new(base + line.level, line.statement))
            .collect();
        self.adjust(end);
        lines
    }

    fn adjust(&mut self, delta: i32) {
        self.level += delta;
        if self.level < 0 {
            self.level = 0;
            self.underflowed = true;
        }
    }
}
