//! Identifier helpers for generated class, method and file names.

/// Removes every character that cannot appear in a PHP identifier.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Upper-cases the first character.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-cases the first character.
pub fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Class name for a test or suite: `Login flow` -> `LoginflowCest`.
pub fn class_name(name: &str) -> String {
    format!("{}Cest", capitalize(&sanitize_name(name)))
}

/// Name of the helper method generated for a test invoked through `run`.
pub fn helper_method_name(test_name: &str) -> String {
    uncapitalize(&sanitize_name(test_name))
}

/// Name of the test method generated for a test.
pub fn test_method_name(test_name: &str) -> String {
    format!("test{}", capitalize(&sanitize_name(test_name)))
}

/// Output filename for a class.
pub fn file_name(name: &str) -> String {
    format!("{}.php", class_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_drops_punctuation_and_spaces() {
        assert_eq!(sanitize_name("log in / out (v2)"), "loginoutv2");
        assert_eq!(sanitize_name("snake_case"), "snake_case");
        assert_eq!(sanitize_name("!!"), "");
    }

    #[test]
    fn case_helpers() {
        assert_eq!(capitalize("login"), "Login");
        assert_eq!(uncapitalize("Login"), "login");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn derived_names() {
        assert_eq!(class_name("sign up"), "SignupCest");
        assert_eq!(file_name("sign up"), "SignupCest.php");
        assert_eq!(test_method_name("sign up"), "testSignup");
        assert_eq!(helper_method_name("Sign up"), "signup");
    }
}
