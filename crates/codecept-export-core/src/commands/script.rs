//! Embedded JavaScript.

use crate::emitter::{variable_lookup, variable_setter};
use crate::fragment::Fragment;
use crate::preprocess::{escape, Script};

/// `, [$this->vars['a'],$this->vars['b']]`, or nothing for an empty `argv`.
pub(super) fn script_arguments(argv: &[String]) -> String {
    if argv.is_empty() {
        return String::new();
    }
    let values: Vec<String> = argv.iter().map(|name| variable_lookup(name)).collect();
    format!(", [{}]", values.join(","))
}

fn call_or_store(call: String, var_name: &str) -> Fragment {
    if var_name.is_empty() {
        Fragment::statement(format!("{};", call))
    } else {
        Fragment::statement(variable_setter(var_name, &call))
    }
}

pub(super) fn execute_script(script: &Script, var_name: &str) -> Fragment {
    let call = format!(
        "$i->executeJS('{}'{})",
        escape(&script.script),
        script_arguments(&script.argv)
    );
    call_or_store(call, var_name)
}

/// The script body is spliced in without escaping, matching what recorded
/// async snippets have always produced.
pub(super) fn execute_async_script(script: &Script, var_name: &str) -> Fragment {
    let call = format!(
        "$i->executeAsyncJS('var callback = arguments[arguments.length - 1];{}.then(callback).catch(callback);'{})",
        script.script,
        script_arguments(&script.argv)
    );
    call_or_store(call, var_name)
}

pub(super) fn run_script(script: &Script) -> Fragment {
    Fragment::statement(format!(
        "$i->executeJS('{}'{});",
        escape(&script.script),
        script_arguments(&script.argv)
    ))
}

#[cfg(test)]
mod tests {
    use crate::command::Command;
    use crate::emitter::{EmitContext, Registry};
    use crate::fragment::Fragment;
    use crate::locator::WebDriverBy;

    async fn emit(name: &str, target: &str, value: &str) -> Fragment {
        let ctx = EmitContext::new("https://h/", &WebDriverBy);
        Registry::with_builtins()
            .emit(&Command::new(name, target, value), &ctx)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn execute_script_stores_result_with_arguments() {
        assert_eq!(
            emit("executeScript", "return ${a} + ${b}", "sum").await,
            Fragment::statement(
                "$this->vars['sum'] = $i->executeJS('return arguments[0] + arguments[1]', [$this->vars['a'],$this->vars['b']]);"
            )
        );
    }

    #[tokio::test]
    async fn execute_script_without_variable_still_runs() {
        assert_eq!(
            emit("executeScript", "window.scrollTo(0, 0)", "").await,
            Fragment::statement("$i->executeJS('window.scrollTo(0, 0)');")
        );
    }

    #[tokio::test]
    async fn sync_scripts_escape_quotes() {
        assert_eq!(
            emit("executeScript", "return 'a'", "x").await,
            Fragment::statement(r"$this->vars['x'] = $i->executeJS('return \'a\'');")
        );
        assert_eq!(
            emit("runScript", "alert('hi')", "").await,
            Fragment::statement(r"$i->executeJS('alert(\'hi\')');")
        );
    }

    #[tokio::test]
    async fn async_script_quotes_are_left_unescaped() {
        assert_eq!(
            emit("executeAsyncScript", "fetch('/api')", "res").await,
            Fragment::statement(
                "$this->vars['res'] = $i->executeAsyncJS('var callback = arguments[arguments.length - 1];fetch('/api').then(callback).catch(callback);');"
            )
        );
    }
}
