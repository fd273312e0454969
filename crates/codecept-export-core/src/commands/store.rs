//! Variable capture. Values read from the browser go through a temporary
//! captured by reference in an `executeInSelenium` closure.

use super::in_selenium;
use crate::emitter::{variable_setter, EmitContext, EmitError};
use crate::fragment::{Block, Fragment, Line};
use crate::preprocess::php_string;

/// `$tmp = null;`, the closure assigning `$tmp = <expression>`, then the
/// write into `var_name` unless it is empty.
fn capture(tmp: &str, expression: String, var_name: &str) -> Fragment {
    let mut block = Block::new(vec![Line::new(0, format!("${} = null;", tmp))]);
    block
        .lines
        .extend(in_selenium(Some(tmp), [format!("${} = {};", tmp, expression)]));
    block.push(0, variable_setter(var_name, &format!("${}", tmp)));
    block.into()
}

pub(super) fn store(value: &str, var_name: &str) -> Fragment {
    Fragment::statement(variable_setter(var_name, &php_string(value)))
}

pub(super) fn store_json(json: &str, var_name: &str) -> Fragment {
    Fragment::statement(variable_setter(
        var_name,
        &format!("json_decode({}, true)", php_string(json)),
    ))
}

pub(super) async fn store_attribute(
    ctx: &EmitContext<'_>,
    target: &str,
    var_name: &str,
) -> Result<Fragment, EmitError> {
    let (locator, attribute) = target.rsplit_once('@').ok_or_else(|| {
        EmitError::UnsupportedTarget(format!(
            "Attribute locator '{}' must have the form locator@attribute",
            target
        ))
    })?;
    let element = ctx.locator(locator).await?;
    Ok(capture(
        "attribute",
        format!(
            "$driver->findElement({})->getAttribute({})",
            element,
            php_string(attribute)
        ),
        var_name,
    ))
}

pub(super) async fn store_text(
    ctx: &EmitContext<'_>,
    target: &str,
    var_name: &str,
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(capture(
        "text",
        format!("$driver->findElement({})->getText()", element),
        var_name,
    ))
}

pub(super) fn store_title(var_name: &str) -> Fragment {
    capture("title", "$driver->getTitle()".to_string(), var_name)
}

pub(super) async fn store_value(
    ctx: &EmitContext<'_>,
    target: &str,
    var_name: &str,
) -> Result<Fragment, EmitError> {
    let element = ctx.locator(target).await?;
    Ok(capture(
        "value",
        format!("$driver->findElement({})->getAttribute('value')", element),
        var_name,
    ))
}

pub(super) fn store_window_handle(var_name: &str) -> Fragment {
    capture("handle", "$driver->getWindowHandle()".to_string(), var_name)
}

pub(super) async fn store_xpath_count(
    ctx: &EmitContext<'_>,
    target: &str,
    var_name: &str,
) -> Result<Fragment, EmitError> {
    let elements = ctx.locator(target).await?;
    Ok(capture(
        "count",
        format!("count($driver->findElements({}))", elements),
        var_name,
    ))
}
