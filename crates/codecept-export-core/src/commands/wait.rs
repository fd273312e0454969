//! Explicit waits. Timeouts are passed through floored; an empty timeout
//! falls back to [`DEFAULT_WAIT_TIMEOUT_MS`].

use super::{floor_number, in_selenium, DEFAULT_WAIT_TIMEOUT_MS};
use crate::emitter::{EmitContext, EmitError};
use crate::fragment::{Block, Fragment};
use crate::preprocess::php_string;

fn timeout(raw: &str) -> Result<i64, EmitError> {
    floor_number(raw, DEFAULT_WAIT_TIMEOUT_MS, "timeout")
}

async fn wait_call(
    ctx: &EmitContext<'_>,
    action: &str,
    target: &str,
    raw_timeout: &str,
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Fragment::statement(format!(
        "$i->{}({}, {});",
        action,
        element,
        timeout(raw_timeout)?
    )))
}

/// Finds the element, then blocks on `condition` through the raw driver.
async fn driver_wait(
    ctx: &EmitContext<'_>,
    target: &str,
    raw_timeout: &str,
    condition: &str,
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    let timeout = timeout(raw_timeout)?;
    Ok(Block::new(in_selenium(
        None,
        [
            format!("$element = $driver->findElement({});", element),
            format!("$driver->wait({})->until({});", timeout, condition),
        ],
    ))
    .into())
}

pub(super) async fn element_present(
    ctx: &EmitContext<'_>,
    target: &str,
    raw_timeout: &str,
) -> Result<Fragment, EmitError> {
    wait_call(ctx, "waitForElement", target, raw_timeout).await
}

pub(super) async fn element_visible(
    ctx: &EmitContext<'_>,
    target: &str,
    raw_timeout: &str,
) -> Result<Fragment, EmitError> {
    wait_call(ctx, "waitForElementVisible", target, raw_timeout).await
}

pub(super) async fn element_not_visible(
    ctx: &EmitContext<'_>,
    target: &str,
    raw_timeout: &str,
) -> Result<Fragment, EmitError> {
    wait_call(ctx, "waitForElementNotVisible", target, raw_timeout).await
}

pub(super) async fn element_not_present(
    ctx: &EmitContext<'_>,
    target: &str,
    raw_timeout: &str,
) -> Result<Fragment, EmitError> {
    driver_wait(
        ctx,
        target,
        raw_timeout,
        "WebDriverExpectedCondition::stalenessOf($element)",
    )
    .await
}

pub(super) async fn element_editable(
    ctx: &EmitContext<'_>,
    target: &str,
    raw_timeout: &str,
) -> Result<Fragment, EmitError> {
    driver_wait(
        ctx,
        target,
        raw_timeout,
        "function () use ($element) { return $element->isEnabled(); }",
    )
    .await
}

pub(super) async fn element_not_editable(
    ctx: &EmitContext<'_>,
    target: &str,
    raw_timeout: &str,
) -> Result<Fragment, EmitError> {
    driver_wait(
        ctx,
        target,
        raw_timeout,
        "function () use ($element) { return !$element->isEnabled(); }",
    )
    .await
}

pub(super) async fn text(ctx: &EmitContext<'_>, target: &str, text: &str) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Fragment::statement(format!(
        "$i->waitForText({}, {}, {});",
        php_string(text),
        DEFAULT_WAIT_TIMEOUT_MS,
        element
    )))
}
