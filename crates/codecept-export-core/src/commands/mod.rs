//! Built-in PHP Codeception command emitters.
//!
//! Every recorder command this crate supports maps to one [`Builtin`]
//! variant through [`Builtin::TABLE`]. Several names share a variant: the
//! `assert*`/`verify*` pairs, for instance, render identically (both become
//! hard assertions), and `clickAt` renders like `click`.
//!
//! Dispatch preprocesses the positional arguments according to what each
//! emitter expects (see [`crate::preprocess`]) and forwards them to the
//! emitter function in the submodule for that command family.

mod control_flow;
mod interaction;
mod script;
mod store;
mod verify;
mod wait;
mod window;

use async_trait::async_trait;

use crate::command::Command;
use crate::emitter::{CommandEmitter, EmitContext, EmitError};
use crate::fragment::{Fragment, Line};
use crate::preprocess;

pub use window::wait_for_window_method;

/// Default timeout for waits whose recorded timeout is empty, in milliseconds.
pub const DEFAULT_WAIT_TIMEOUT_MS: i64 = 30000;

/// A built-in emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    AcceptPopup,
    AnswerOnVisiblePrompt,
    Assert,
    AssertAlert,
    CancelPopup,
    Check,
    Click,
    Close,
    Do,
    DoubleClick,
    DragAndDrop,
    Echo,
    EditContent,
    Else,
    ElseIf,
    End,
    ExecuteAsyncScript,
    ExecuteScript,
    ForEach,
    If,
    MouseDown,
    MouseMove,
    MouseOut,
    MouseUp,
    Open,
    Pause,
    RepeatIf,
    Run,
    RunScript,
    Select,
    SelectFrame,
    SelectWindow,
    SendKeys,
    SetSpeed,
    SetWindowSize,
    Skip,
    Store,
    StoreAttribute,
    StoreJson,
    StoreText,
    StoreTitle,
    StoreValue,
    StoreWindowHandle,
    StoreXpathCount,
    Submit,
    Times,
    Uncheck,
    VerifyChecked,
    VerifyEditable,
    VerifyElementNotPresent,
    VerifyElementPresent,
    VerifyNotChecked,
    VerifyNotEditable,
    VerifyNotSelectedValue,
    VerifyNotText,
    VerifySelectedLabel,
    VerifyText,
    VerifyTitle,
    VerifyValue,
    WaitForElementEditable,
    WaitForElementNotEditable,
    WaitForElementNotPresent,
    WaitForElementNotVisible,
    WaitForElementPresent,
    WaitForElementVisible,
    WaitForText,
    While,
}

impl Builtin {
    /// Command name to emitter mapping.
    pub const TABLE: &'static [(&'static str, Builtin)] = &[
        ("addSelection", Builtin::Select),
        ("answerOnNextPrompt", Builtin::Skip),
        ("assert", Builtin::Assert),
        ("assertAlert", Builtin::AssertAlert),
        ("assertChecked", Builtin::VerifyChecked),
        ("assertConfirmation", Builtin::AssertAlert),
        ("assertEditable", Builtin::VerifyEditable),
        ("assertElementPresent", Builtin::VerifyElementPresent),
        ("assertElementNotPresent", Builtin::VerifyElementNotPresent),
        ("assertNotChecked", Builtin::VerifyNotChecked),
        ("assertNotEditable", Builtin::VerifyNotEditable),
        ("assertNotSelectedValue", Builtin::VerifyNotSelectedValue),
        ("assertNotText", Builtin::VerifyNotText),
        ("assertPrompt", Builtin::AssertAlert),
        ("assertSelectedLabel", Builtin::VerifySelectedLabel),
        ("assertSelectedValue", Builtin::VerifyValue),
        ("assertValue", Builtin::VerifyValue),
        ("assertText", Builtin::VerifyText),
        ("assertTitle", Builtin::VerifyTitle),
        ("check", Builtin::Check),
        ("chooseCancelOnNextConfirmation", Builtin::Skip),
        ("chooseCancelOnNextPrompt", Builtin::Skip),
        ("chooseOkOnNextConfirmation", Builtin::Skip),
        ("click", Builtin::Click),
        ("clickAt", Builtin::Click),
        ("close", Builtin::Close),
        ("debugger", Builtin::Skip),
        ("do", Builtin::Do),
        ("doubleClick", Builtin::DoubleClick),
        ("doubleClickAt", Builtin::DoubleClick),
        ("dragAndDropToObject", Builtin::DragAndDrop),
        ("echo", Builtin::Echo),
        ("editContent", Builtin::EditContent),
        ("else", Builtin::Else),
        ("elseIf", Builtin::ElseIf),
        ("end", Builtin::End),
        ("executeScript", Builtin::ExecuteScript),
        ("executeAsyncScript", Builtin::ExecuteAsyncScript),
        ("forEach", Builtin::ForEach),
        ("if", Builtin::If),
        ("mouseDown", Builtin::MouseDown),
        ("mouseDownAt", Builtin::MouseDown),
        ("mouseMove", Builtin::MouseMove),
        ("mouseMoveAt", Builtin::MouseMove),
        ("mouseOver", Builtin::MouseMove),
        ("mouseOut", Builtin::MouseOut),
        ("mouseUp", Builtin::MouseUp),
        ("mouseUpAt", Builtin::MouseUp),
        ("open", Builtin::Open),
        ("pause", Builtin::Pause),
        ("removeSelection", Builtin::Select),
        ("repeatIf", Builtin::RepeatIf),
        ("run", Builtin::Run),
        ("runScript", Builtin::RunScript),
        ("select", Builtin::Select),
        ("selectFrame", Builtin::SelectFrame),
        ("selectWindow", Builtin::SelectWindow),
        ("sendKeys", Builtin::SendKeys),
        ("setSpeed", Builtin::SetSpeed),
        ("setWindowSize", Builtin::SetWindowSize),
        ("store", Builtin::Store),
        ("storeAttribute", Builtin::StoreAttribute),
        ("storeJson", Builtin::StoreJson),
        ("storeText", Builtin::StoreText),
        ("storeTitle", Builtin::StoreTitle),
        ("storeValue", Builtin::StoreValue),
        ("storeWindowHandle", Builtin::StoreWindowHandle),
        ("storeXpathCount", Builtin::StoreXpathCount),
        ("submit", Builtin::Submit),
        ("times", Builtin::Times),
        ("type", Builtin::SendKeys),
        ("uncheck", Builtin::Uncheck),
        ("verify", Builtin::Assert),
        ("verifyChecked", Builtin::VerifyChecked),
        ("verifyEditable", Builtin::VerifyEditable),
        ("verifyElementPresent", Builtin::VerifyElementPresent),
        ("verifyElementNotPresent", Builtin::VerifyElementNotPresent),
        ("verifyNotChecked", Builtin::VerifyNotChecked),
        ("verifyNotEditable", Builtin::VerifyNotEditable),
        ("verifyNotSelectedValue", Builtin::VerifyNotSelectedValue),
        ("verifyNotText", Builtin::VerifyNotText),
        ("verifySelectedLabel", Builtin::VerifySelectedLabel),
        ("verifySelectedValue", Builtin::VerifyValue),
        ("verifyText", Builtin::VerifyText),
        ("verifyTitle", Builtin::VerifyTitle),
        ("verifyValue", Builtin::VerifyValue),
        ("waitForElementEditable", Builtin::WaitForElementEditable),
        ("waitForElementPresent", Builtin::WaitForElementPresent),
        ("waitForElementVisible", Builtin::WaitForElementVisible),
        ("waitForElementNotEditable", Builtin::WaitForElementNotEditable),
        ("waitForElementNotPresent", Builtin::WaitForElementNotPresent),
        ("waitForElementNotVisible", Builtin::WaitForElementNotVisible),
        ("waitForText", Builtin::WaitForText),
        ("webdriverAnswerOnVisiblePrompt", Builtin::AnswerOnVisiblePrompt),
        ("webdriverChooseCancelOnVisibleConfirmation", Builtin::CancelPopup),
        ("webdriverChooseCancelOnVisiblePrompt", Builtin::CancelPopup),
        ("webdriverChooseOkOnVisibleConfirmation", Builtin::AcceptPopup),
        ("while", Builtin::While),
    ];

    /// Looks up the built-in emitter for a command name.
    pub fn for_command(name: &str) -> Option<Builtin> {
        Self::TABLE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, builtin)| builtin)
    }

    /// True for the recorder-only commands that render nothing.
    pub fn is_noop(self) -> bool {
        self == Builtin::Skip
    }
}

#[async_trait]
impl CommandEmitter for Builtin {
    async fn emit(&self, command: &Command, ctx: &EmitContext<'_>) -> Result<Fragment, EmitError> {
        let raw_target = command.target.as_str();
        let raw_value = command.value.as_str();
        let target = preprocess::text(raw_target);
        let value = preprocess::text(raw_value);

        match self {
            Builtin::AcceptPopup => Ok(interaction::accept_popup()),
            Builtin::AnswerOnVisiblePrompt => Ok(interaction::answer_on_visible_prompt(&target)),
            Builtin::Assert => Ok(verify::assert(raw_target, &value)),
            Builtin::AssertAlert => Ok(interaction::assert_alert(&target)),
            Builtin::CancelPopup => Ok(interaction::cancel_popup()),
            Builtin::Check => interaction::check(ctx, &target).await,
            Builtin::Click => interaction::click(ctx, &target).await,
            Builtin::Close => Ok(interaction::close()),
            Builtin::Do => Ok(control_flow::do_loop()),
            Builtin::DoubleClick => interaction::double_click(ctx, &target).await,
            Builtin::DragAndDrop => interaction::drag_and_drop(ctx, &target, &value).await,
            Builtin::Echo => Ok(interaction::echo(&target)),
            Builtin::EditContent => interaction::edit_content(ctx, &target, &value).await,
            Builtin::Else => Ok(control_flow::else_branch()),
            Builtin::ElseIf => Ok(control_flow::else_if(&preprocess::script(raw_target))),
            Builtin::End => Ok(control_flow::end()),
            Builtin::ExecuteAsyncScript => Ok(script::execute_async_script(
                &preprocess::script(raw_target),
                raw_value,
            )),
            Builtin::ExecuteScript => Ok(script::execute_script(
                &preprocess::script(raw_target),
                raw_value,
            )),
            Builtin::ForEach => Ok(control_flow::for_each(raw_target, raw_value)),
            Builtin::If => Ok(control_flow::if_branch(&preprocess::script(raw_target))),
            Builtin::MouseDown => interaction::mouse_down(ctx, &target).await,
            Builtin::MouseMove => interaction::mouse_move(ctx, &target).await,
            Builtin::MouseOut => Ok(interaction::mouse_out()),
            Builtin::MouseUp => interaction::mouse_up(ctx, &target).await,
            Builtin::Open => Ok(interaction::open(ctx, &target)),
            Builtin::Pause => interaction::pause(raw_target),
            Builtin::RepeatIf => Ok(control_flow::repeat_if(&preprocess::script(raw_target))),
            Builtin::Run => interaction::run(raw_target),
            Builtin::RunScript => Ok(script::run_script(&preprocess::script(raw_target))),
            Builtin::Select => interaction::select(ctx, &target, &value).await,
            Builtin::SelectFrame => window::select_frame(ctx, &target).await,
            Builtin::SelectWindow => window::select_window(&target),
            Builtin::SendKeys => {
                interaction::send_keys(ctx, &target, &preprocess::keys(raw_value)).await
            }
            Builtin::SetSpeed => Ok(interaction::set_speed()),
            Builtin::SetWindowSize => interaction::set_window_size(raw_target),
            Builtin::Skip => Ok(Fragment::empty()),
            Builtin::Store => Ok(store::store(&target, raw_value)),
            Builtin::StoreAttribute => store::store_attribute(ctx, &target, raw_value).await,
            Builtin::StoreJson => Ok(store::store_json(&target, raw_value)),
            Builtin::StoreText => store::store_text(ctx, &target, raw_value).await,
            Builtin::StoreTitle => Ok(store::store_title(raw_value)),
            Builtin::StoreValue => store::store_value(ctx, &target, raw_value).await,
            Builtin::StoreWindowHandle => Ok(store::store_window_handle(raw_target)),
            Builtin::StoreXpathCount => store::store_xpath_count(ctx, &target, raw_value).await,
            Builtin::Submit => Ok(interaction::submit()),
            Builtin::Times => control_flow::times(&target),
            Builtin::Uncheck => interaction::uncheck(ctx, &target).await,
            Builtin::VerifyChecked => verify::checked(ctx, &target).await,
            Builtin::VerifyEditable => verify::editable(ctx, &target).await,
            Builtin::VerifyElementNotPresent => verify::element_not_present(ctx, &target).await,
            Builtin::VerifyElementPresent => verify::element_present(ctx, &target).await,
            Builtin::VerifyNotChecked => verify::not_checked(ctx, &target).await,
            Builtin::VerifyNotEditable => verify::not_editable(ctx, &target).await,
            Builtin::VerifyNotSelectedValue => {
                verify::not_selected_value(ctx, &target, &value).await
            }
            Builtin::VerifyNotText => verify::not_text(ctx, &target, &value).await,
            Builtin::VerifySelectedLabel => verify::selected_label(ctx, &target, &value).await,
            Builtin::VerifyText => verify::text(ctx, &target, &value).await,
            Builtin::VerifyTitle => Ok(verify::title(&target)),
            Builtin::VerifyValue => verify::value(ctx, &target, &value).await,
            Builtin::WaitForElementEditable => {
                wait::element_editable(ctx, &target, raw_value).await
            }
            Builtin::WaitForElementNotEditable => {
                wait::element_not_editable(ctx, &target, raw_value).await
            }
            Builtin::WaitForElementNotPresent => {
                wait::element_not_present(ctx, &target, raw_value).await
            }
            Builtin::WaitForElementNotVisible => {
                wait::element_not_visible(ctx, &target, raw_value).await
            }
            Builtin::WaitForElementPresent => {
                wait::element_present(ctx, &target, raw_value).await
            }
            Builtin::WaitForElementVisible => {
                wait::element_visible(ctx, &target, raw_value).await
            }
            Builtin::WaitForText => wait::text(ctx, &target, &value).await,
            Builtin::While => Ok(control_flow::while_loop(&preprocess::script(raw_target))),
        }
    }
}

/// Opening line of a raw-driver escape hatch, optionally capturing `var` by
/// reference.
fn selenium_open(capture: Option<&str>) -> String {
    match capture {
        Some(var) => format!(
            "$i->executeInSelenium(function (RemoteWebDriver $driver) use (&${}) {{",
            var
        ),
        None => "$i->executeInSelenium(function (RemoteWebDriver $driver) {".to_string(),
    }
}

/// An `executeInSelenium` closure around `body`.
fn in_selenium(capture: Option<&str>, body: impl IntoIterator<Item = String>) -> Vec<Line> {
    let mut lines = vec![Line::new(0, selenium_open(capture))];
    lines.extend(body.into_iter().map(|statement| Line::new(1, statement)));
    lines.push(Line::new(0, "});"));
    lines
}

/// Parses a recorded number and floors it. Empty input yields `default`.
fn floor_number(raw: &str, default: i64, what: &str) -> Result<i64, EmitError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n.floor() as i64)
        .ok_or_else(|| EmitError::UnsupportedTarget(format!("Invalid {} '{}'", what, raw)))
}
