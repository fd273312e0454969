//! Page interaction: clicks, typing, navigation, popups, mouse events.

use super::{floor_number, in_selenium};
use crate::emitter::{EmitContext, EmitError};
use crate::fragment::{Block, Fragment, Line};
use crate::naming;
use crate::preprocess::{escape, php_string, KeyPart};

fn located(action: &str, locator: String) -> Fragment {
    Fragment::statement(format!("$i->{}({});", action, locator))
}

pub(super) async fn click(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    Ok(located("click", ctx.locator(target).await?))
}

pub(super) async fn double_click(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    Ok(located("doubleClick", ctx.locator(target).await?))
}

pub(super) async fn check(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    Ok(located("checkOption", ctx.locator(target).await?))
}

pub(super) async fn uncheck(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    Ok(located("uncheckOption", ctx.locator(target).await?))
}

pub(super) async fn drag_and_drop(
    ctx: &EmitContext<'_>,
    dragged: &str,
    dropped: &str,
) -> Result<Fragment, EmitError> {
    let from = ctx.locator(dragged).await?;
    let to = ctx.locator(dropped).await?;
    Ok(Fragment::statement(format!("$i->dragAndDrop({}, {});", from, to)))
}

pub(super) fn close() -> Fragment {
    Fragment::statement("$i->closeTab();")
}

pub(super) async fn select(
    ctx: &EmitContext<'_>,
    target: &str,
    option: &str,
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    let option = ctx.option(option).await?;
    Ok(Fragment::statement(format!(
        "$i->selectOption({}, {});",
        element, option
    )))
}

fn key_arguments(parts: &[KeyPart]) -> String {
    if parts.is_empty() {
        return "''".to_string();
    }
    parts
        .iter()
        .map(|part| match part {
            KeyPart::Text(text) => format!("'{}'", text),
            KeyPart::Variable(lookup) => lookup.clone(),
            KeyPart::Key(key) => format!("WebDriverKeys::{}", key),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub(super) async fn send_keys(
    ctx: &EmitContext<'_>,
    target: &str,
    keys: &[KeyPart],
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Fragment::statement(format!(
        "$i->pressKey({}, {});",
        element,
        key_arguments(keys)
    )))
}

pub(super) fn submit() -> Fragment {
    Fragment::statement(
        "throw new InvalidArgumentException('`submit` is not a supported command in Selenium Webdriver. Please re-record the step in the IDE.');",
    )
}

pub(super) async fn edit_content(
    ctx: &EmitContext<'_>,
    target: &str,
    content: &str,
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    let mut lines = vec![Line::new(0, "$element = null;")];
    lines.extend(in_selenium(
        Some("element"),
        [format!("$element = $driver->findElement({});", element)],
    ));
    lines.push(Line::new(
        0,
        format!(
            "$i->executeJS('if (arguments[0].contentEditable === \\'true\\') {{ arguments[0].innerText = arguments[1]; }}', [$element, {}]);",
            php_string(content)
        ),
    ));
    Ok(Block::new(lines).into())
}

async fn mouse_action(
    ctx: &EmitContext<'_>,
    target: &str,
    chain: &str,
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Block::new(in_selenium(
        None,
        [
            format!("$element = $driver->findElement({});", element),
            format!("$driver->action()->moveToElement($element){}->perform();", chain),
        ],
    ))
    .into())
}

pub(super) async fn mouse_down(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    mouse_action(ctx, target, "->clickAndHold()").await
}

pub(super) async fn mouse_move(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    mouse_action(ctx, target, "").await
}

pub(super) async fn mouse_up(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    mouse_action(ctx, target, "->release()").await
}

pub(super) fn mouse_out() -> Fragment {
    Block::new(in_selenium(
        None,
        [
            "$element = $driver->findElement(WebDriverBy::cssSelector('body'));".to_string(),
            "$driver->action()->moveToElement($element)->perform();".to_string(),
        ],
    ))
    .into()
}

fn is_absolute_url(target: &str) -> bool {
    ["file://", "http://", "https://"]
        .iter()
        .any(|scheme| target.starts_with(scheme))
}

/// Navigates to `target`, prefixing relative targets with the run's base URL.
pub(super) fn open(ctx: &EmitContext<'_>, target: &str) -> Fragment {
    let url = if is_absolute_url(target) {
        target.to_string()
    } else {
        format!("{}{}", escape(ctx.base_url), target)
    };
    Fragment::statement(format!("$i->amOnUrl({});", php_string(&url)))
}

pub(super) fn echo(message: &str) -> Fragment {
    Fragment::statement(format!("codecept_debug({});", php_string(message)))
}

pub(super) fn pause(time: &str) -> Result<Fragment, EmitError> {
    let millis = floor_number(time, 0, "pause duration")?;
    Ok(Fragment::statement(format!("$i->wait({});", millis)))
}

pub(super) fn set_speed() -> Fragment {
    Fragment::statement(
        "codecept_debug('\"set speed\" is a no-op in code export, use \"pause\" instead');",
    )
}

pub(super) fn set_window_size(size: &str) -> Result<Fragment, EmitError> {
    let invalid = || EmitError::UnsupportedTarget(format!("Invalid window size '{}'", size));
    let (width, height) = size.split_once('x').ok_or_else(invalid)?;
    let width: u32 = width.trim().parse().map_err(|_| invalid())?;
    let height: u32 = height.trim().parse().map_err(|_| invalid())?;
    Ok(Fragment::statement(format!(
        "$i->resizeWindow({}, {});",
        width, height
    )))
}

/// Calls the helper method generated for the test named `test_name`.
pub(super) fn run(test_name: &str) -> Result<Fragment, EmitError> {
    let method = naming::helper_method_name(test_name);
    if method.is_empty() {
        return Err(EmitError::UnsupportedTarget(format!(
            "Cannot run test '{}'",
            test_name
        )));
    }
    Ok(Fragment::statement(format!("$this->{}($i);", method)))
}

pub(super) fn assert_alert(text: &str) -> Fragment {
    Fragment::statement(format!("$i->seeInPopup({});", php_string(text)))
}

pub(super) fn answer_on_visible_prompt(answer: &str) -> Fragment {
    Block::new(vec![
        Line::new(0, format!("$i->typeInPopup({});", php_string(answer))),
        Line::new(0, "$i->acceptPopup();"),
    ])
    .into()
}

pub(super) fn accept_popup() -> Fragment {
    Fragment::statement("$i->acceptPopup();")
}

pub(super) fn cancel_popup() -> Fragment {
    Fragment::statement("$i->cancelPopup();")
}
