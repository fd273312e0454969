//! Window and frame switching.

use super::{floor_number, in_selenium};
use crate::command::DEFAULT_WINDOW_TIMEOUT_MS;
use crate::emitter::{EmitContext, EmitError};
use crate::fragment::{Block, Fragment, Line};
use crate::preprocess::php_string;

fn switch_to_nth_window(index: usize) -> Fragment {
    Block::new(in_selenium(
        None,
        [format!(
            "$driver->switchTo()->window($driver->getWindowHandles()[{}]);",
            index
        )],
    ))
    .into()
}

/// Accepts `handle=`, `name=`, `win_ser_local` and `win_ser_<n>`.
pub(super) fn select_window(target: &str) -> Result<Fragment, EmitError> {
    if let Some(handle) = target.strip_prefix("handle=") {
        return Ok(Fragment::statement(format!(
            "$i->switchToWindow({});",
            php_string(handle)
        )));
    }
    if let Some(name) = target.strip_prefix("name=") {
        return Ok(Fragment::statement(format!(
            "$i->switchToWindow({});",
            php_string(name)
        )));
    }
    match target.strip_prefix("win_ser_") {
        Some("local") => Ok(switch_to_nth_window(0)),
        Some(serial) => serial
            .parse::<usize>()
            .map(switch_to_nth_window)
            .map_err(|_| {
                EmitError::UnsupportedTarget(format!("Invalid window serial '{}'", target))
            }),
        None => Err(EmitError::UnsupportedTarget(
            "Can only emit 'select window' using handles".to_string(),
        )),
    }
}

pub(super) async fn select_frame(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    if target == "relative=top" || target == "relative=parent" {
        return Ok(Fragment::statement("$i->switchToFrame();"));
    }
    if let Some(index) = target.strip_prefix("index=") {
        let index = floor_number(index, 0, "frame index")?;
        return Ok(Block::new(in_selenium(
            None,
            [format!("$driver->switchTo()->frame({});", index)],
        ))
        .into());
    }
    let frame = ctx.locator(target).await?;
    Ok(Fragment::statement(format!("$i->switchToFrame({});", frame)))
}

/// The `waitForWindow` helper method added to classes whose tests open
/// windows. It compares the handles snapshotted before the opening command
/// with the current ones and returns the new handle.
pub fn wait_for_window_method() -> Vec<Line> {
    let mut lines = vec![Line::new(
        0,
        format!(
            "public function waitForWindow(AcceptanceTester $i, $timeout = {}) {{",
            DEFAULT_WINDOW_TIMEOUT_MS
        ),
    )];
    let mut body = vec![
        Line::new(0, "usleep($timeout * 1000);"),
        Line::new(0, "$handlesThen = $this->vars['windowHandles'];"),
        Line::new(0, "$handlesNow = null;"),
    ];
    body.extend(in_selenium(
        Some("handlesNow"),
        ["$handlesNow = $driver->getWindowHandles();".to_string()],
    ));
    body.extend([
        Line::new(0, "if (count($handlesNow) > count($handlesThen)) {"),
        Line::new(1, "return array_values(array_diff($handlesNow, $handlesThen))[0];"),
        Line::new(0, "}"),
        Line::new(
            0,
            "throw new RuntimeException('New window did not appear before timeout');",
        ),
    ]);
    lines.extend(
        body.into_iter()
            .map(|line| Line::new(line.level + 1, line.statement)),
    );
    lines.push(Line::new(0, "}"));
    lines
}
