//! Control flow. Openers raise the ambient level after themselves, closers
//! lower it before themselves; branch switches do both.

use super::script::script_arguments;
use crate::emitter::{variable_lookup, EmitError};
use crate::fragment::{Block, Fragment, Line};
use crate::preprocess::{escape, php_string, Script};

/// Browser-evaluated condition expression.
fn condition(script: &Script) -> String {
    format!(
        "$i->executeJS('return ({})'{})",
        escape(&script.script),
        script_arguments(&script.argv)
    )
}

fn single(statement: String, starting: i32, ending: i32) -> Fragment {
    Block::new(vec![Line::new(0, statement)])
        .starting(starting)
        .ending(ending)
        .into()
}

pub(super) fn if_branch(script: &Script) -> Fragment {
    single(format!("if ({}) {{", condition(script)), 0, 1)
}

pub(super) fn else_if(script: &Script) -> Fragment {
    single(format!("}} elseif ({}) {{", condition(script)), -1, 1)
}

pub(super) fn else_branch() -> Fragment {
    single("} else {".to_string(), -1, 1)
}

pub(super) fn end() -> Fragment {
    single("}".to_string(), -1, 0)
}

pub(super) fn while_loop(script: &Script) -> Fragment {
    single(format!("while ({}) {{", condition(script)), 0, 1)
}

pub(super) fn do_loop() -> Fragment {
    single("do {".to_string(), 0, 1)
}

pub(super) fn repeat_if(script: &Script) -> Fragment {
    single(format!("}} while ({});", condition(script)), -1, 0)
}

/// `times` takes a literal count or an interpolated expression.
pub(super) fn times(target: &str) -> Result<Fragment, EmitError> {
    let count = match target.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => (n.floor() as i64).to_string(),
        _ if target.trim().is_empty() => {
            return Err(EmitError::UnsupportedTarget(
                "times requires a repeat count".to_string(),
            ))
        }
        _ => format!("(int) {}", php_string(target)),
    };
    Ok(Block::new(vec![
        Line::new(0, format!("$times = {};", count)),
        Line::new(0, "for ($c = 0; $c < $times; $c++) {"),
    ])
    .ending(1)
    .into())
}

pub(super) fn for_each(collection: &str, iterator: &str) -> Fragment {
    Block::new(vec![
        Line::new(0, format!("$collection = {};", variable_lookup(collection))),
        Line::new(0, "for ($c = 0; $c < count($collection); $c++) {"),
        Line::new(1, format!("{} = $collection[$c];", variable_lookup(iterator))),
    ])
    .ending(1)
    .into()
}

#[cfg(test)]
mod tests {
    use crate::command::Command;
    use crate::emitter::{EmitContext, Registry};
    use crate::fragment::{Fragment, LevelTracker, Line};
    use crate::locator::WebDriverBy;

    async fn emit(name: &str, target: &str, value: &str) -> Fragment {
        let ctx = EmitContext::new("https://h/", &WebDriverBy);
        Registry::with_builtins()
            .emit(&Command::new(name, target, value), &ctx)
            .await
            .unwrap()
    }

    async fn render(commands: &[(&str, &str, &str)]) -> (Vec<Line>, i32) {
        let mut tracker = LevelTracker::new();
        let mut lines = Vec::new();
        let mut net = 0;
        for (name, target, value) in commands {
            let fragment = emit(name, target, value).await;
            net += fragment.net_adjustment();
            lines.extend(tracker.apply(fragment));
        }
        assert!(!tracker.underflowed());
        (lines, net)
    }

    #[tokio::test]
    async fn if_condition_runs_in_browser() {
        assert_eq!(
            emit("if", "${n} > 1", "").await.into_lines(),
            vec![Line::new(
                0,
                "if ($i->executeJS('return (arguments[0] > 1)', [$this->vars['n']])) {"
            )]
        );
    }

    #[tokio::test]
    async fn condition_quotes_are_escaped() {
        assert_eq!(
            emit("while", "document.title == 'x'", "").await.into_lines()[0].statement,
            r"while ($i->executeJS('return (document.title == \'x\')')) {"
        );
    }

    #[tokio::test]
    async fn if_else_if_else_end_is_balanced() {
        let (lines, net) = render(&[
            ("if", "true", ""),
            ("click", "id=a", ""),
            ("elseIf", "false", ""),
            ("click", "id=b", ""),
            ("else", "", ""),
            ("click", "id=c", ""),
            ("end", "", ""),
        ])
        .await;
        assert_eq!(net, 0);
        let levels: Vec<usize> = lines.iter().map(|l| l.level).collect();
        assert_eq!(levels, vec![0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(lines[4].statement, "} else {");
    }

    #[tokio::test]
    async fn do_repeat_if_is_balanced() {
        let (lines, net) = render(&[
            ("do", "", ""),
            ("click", "id=next", ""),
            ("repeatIf", "${more}", ""),
        ])
        .await;
        assert_eq!(net, 0);
        assert_eq!(lines[1].level, 1);
        assert_eq!(
            lines[2],
            Line::new(0, "} while ($i->executeJS('return (arguments[0])', [$this->vars['more']]));")
        );
    }

    #[tokio::test]
    async fn times_loop_counts() {
        let (lines, net) = render(&[("times", "3", ""), ("click", "id=a", ""), ("end", "", "")]).await;
        assert_eq!(net, 0);
        assert_eq!(lines[0].statement, "$times = 3;");
        assert_eq!(lines[1].statement, "for ($c = 0; $c < $times; $c++) {");
        assert_eq!(lines[2].level, 1);

        assert_eq!(
            emit("times", "${n}", "").await.into_lines()[0].statement,
            "$times = (int) $this->vars['n'];"
        );
    }

    #[tokio::test]
    async fn for_each_visits_every_element() {
        let (lines, net) = render(&[
            ("forEach", "items", "item"),
            ("echo", "${item}", ""),
            ("end", "", ""),
        ])
        .await;
        assert_eq!(net, 0);
        assert_eq!(
            lines,
            vec![
                Line::new(0, "$collection = $this->vars['items'];"),
                Line::new(0, "for ($c = 0; $c < count($collection); $c++) {"),
                Line::new(1, "$this->vars['item'] = $collection[$c];"),
                Line::new(1, "codecept_debug($this->vars['item']);"),
                Line::new(0, "}"),
            ]
        );
    }

    #[tokio::test]
    async fn nested_loops_indent_twice() {
        let (lines, net) = render(&[
            ("while", "true", ""),
            ("if", "false", ""),
            ("click", "id=a", ""),
            ("end", "", ""),
            ("end", "", ""),
        ])
        .await;
        assert_eq!(net, 0);
        assert_eq!(lines[2].level, 2);
        assert_eq!(lines[4].level, 0);
    }
}
