//! Assertions. `assert*` and `verify*` commands both land here and render the
//! same hard assertion.

use super::in_selenium;
use crate::emitter::{variable_lookup, EmitContext, EmitError};
use crate::fragment::{Block, Fragment, Line};
use crate::preprocess::php_string;

/// Compares stored variable `var_name` with `expected`.
pub(super) fn assert(var_name: &str, expected: &str) -> Fragment {
    Fragment::statement(format!(
        "$i->assertEquals({}, {});",
        variable_lookup(var_name),
        php_string(expected)
    ))
}

pub(super) async fn checked(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Fragment::statement(format!("$i->seeCheckboxIsChecked({});", element)))
}

pub(super) async fn not_checked(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Fragment::statement(format!("$i->dontSeeCheckboxIsChecked({});", element)))
}

async fn enabled_state(
    ctx: &EmitContext<'_>,
    target: &str,
    assertion: &str,
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    let mut lines = vec![Line::new(0, "$element = null;")];
    lines.extend(in_selenium(
        Some("element"),
        [format!("$element = $driver->findElement({});", element)],
    ));
    lines.push(Line::new(0, format!("$i->{}($element->isEnabled());", assertion)));
    Ok(Block::new(lines).into())
}

pub(super) async fn editable(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    enabled_state(ctx, target, "assertTrue").await
}

pub(super) async fn not_editable(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    enabled_state(ctx, target, "assertFalse").await
}

pub(super) async fn element_present(ctx: &EmitContext<'_>, target: &str) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Fragment::statement(format!("$i->seeElementInDOM({});", element)))
}

pub(super) async fn element_not_present(
    ctx: &EmitContext<'_>,
    target: &str,
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Fragment::statement(format!("$i->dontSeeElementInDOM({});", element)))
}

pub(super) async fn not_selected_value(
    ctx: &EmitContext<'_>,
    target: &str,
    value: &str,
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Fragment::statement(format!(
        "$i->seeOptionIsNotSelected({}, {});",
        element,
        php_string(value)
    )))
}

pub(super) async fn selected_label(
    ctx: &EmitContext<'_>,
    target: &str,
    label: &str,
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Fragment::statement(format!(
        "$i->seeOptionIsSelected({}, {});",
        element,
        php_string(label)
    )))
}

pub(super) async fn text(ctx: &EmitContext<'_>, target: &str, text: &str) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Fragment::statement(format!(
        "$i->see({}, {});",
        php_string(text),
        element
    )))
}

pub(super) async fn not_text(
    ctx: &EmitContext<'_>,
    target: &str,
    text: &str,
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Fragment::statement(format!(
        "$i->dontSee({}, {});",
        php_string(text),
        element
    )))
}

pub(super) async fn value(ctx: &EmitContext<'_>, target: &str, value: &str) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(Fragment::statement(format!(
        "$i->seeElement({}, ['value' => {}]);",
        element,
        php_string(value)
    )))
}

pub(super) fn title(title: &str) -> Fragment {
    Fragment::statement(format!("$i->seeInTitle({});", php_string(title)))
}
