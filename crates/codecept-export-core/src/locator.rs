//! Locator and option-selector translation.
//!
//! The recorder addresses elements with strings such as `css=#login`,
//! `xpath=//div` or `id=user`, and `<select>` options with `label=...` or
//! `value=...`. A [`LocatorTranslator`] turns those into PHP expressions. The
//! default [`WebDriverBy`] translator targets php-webdriver's `WebDriverBy`
//! factory, which both Codeception's `$i->...` actions and the raw
//! `$driver->findElement(...)` calls accept.
//!
//! Inputs arrive already escaped for a single-quoted PHP string (see
//! [`crate::preprocess`]), so translators wrap values in quotes as-is.

use async_trait::async_trait;

use crate::emitter::EmitError;
use crate::preprocess::php_string;

/// Translates recorded locators into target-syntax expressions.
#[async_trait]
pub trait LocatorTranslator: Send + Sync {
    /// Translates an element locator.
    async fn locator(&self, locator: &str) -> Result<String, EmitError>;

    /// Translates a `<select>` option selector.
    async fn option(&self, selector: &str) -> Result<String, EmitError>;
}

/// Translator producing `WebDriverBy::...(...)` expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebDriverBy;

impl WebDriverBy {
    fn strategy(prefix: &str) -> Option<&'static str> {
        match prefix {
            "id" => Some("id"),
            "name" => Some("name"),
            "css" => Some("cssSelector"),
            "xpath" => Some("xpath"),
            "link" | "linkText" => Some("linkText"),
            "partialLinkText" => Some("partialLinkText"),
            _ => None,
        }
    }

    /// Synchronous form of [`LocatorTranslator::locator`].
    pub fn translate_locator(locator: &str) -> Result<String, EmitError> {
        if locator.starts_with("//") {
            return Ok(format!("WebDriverBy::xpath({})", php_string(locator)));
        }
        let (prefix, value) = locator.split_once('=').ok_or_else(|| {
            EmitError::UnsupportedTarget(format!("Unknown locator {}", locator))
        })?;
        let method = Self::strategy(prefix).ok_or_else(|| {
            EmitError::UnsupportedTarget(format!("Unknown locator {}", prefix))
        })?;
        Ok(format!("WebDriverBy::{}({})", method, php_string(value)))
    }

    /// Synchronous form of [`LocatorTranslator::option`].
    pub fn translate_option(selector: &str) -> Result<String, EmitError> {
        match selector.split_once('=') {
            Some(("label", text)) => Ok(format!("['text' => {}]", php_string(text))),
            Some(("value", value)) => Ok(format!("['value' => {}]", php_string(value))),
            Some((kind @ ("id" | "index"), _)) => Err(EmitError::UnsupportedTarget(format!(
                "Option selection by {} is not supported",
                kind
            ))),
            _ => Ok(format!("['text' => {}]", php_string(selector))),
        }
    }
}

#[async_trait]
impl LocatorTranslator for WebDriverBy {
    async fn locator(&self, locator: &str) -> Result<String, EmitError> {
        Self::translate_locator(locator)
    }

    async fn option(&self, selector: &str) -> Result<String, EmitError> {
        Self::translate_option(selector)
    }
}
