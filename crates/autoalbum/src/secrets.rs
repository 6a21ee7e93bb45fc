//! Credential resolution for the completion and vision services.
//!
//! A credential can come from three places, checked in order:
//!
//! 1. **Direct value** in the config file (`"api_key": "sk-..."`)
//! 2. **File reference** (`"api_key_file": "~/.secrets/openai"`)
//! 3. **Env var reference** (`"api_key_env_var": "OPENAI_API_KEY"`), which is
//!    also where values from a `.env` file end up.

use secrecy::SecretString;
use std::fs;

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },

    #[error("Secret from {origin} is empty")]
    Empty { origin: String },
}

/// Result type for secret resolution.
pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret from the first configured source.
///
/// Empty strings count as "not configured". A source that is configured but
/// yields nothing (missing file, unset variable, blank content) is an error,
/// not a fall-through to the next source.
///
/// ```ignore
/// use autoalbum::secrets::resolve_secret;
///
/// let key = resolve_secret(None, Some("~/.secrets/openai"), Some("OPENAI_API_KEY"))?;
/// ```
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    if let Some(value) = direct.filter(|v| !v.is_empty()) {
        return Ok(SecretString::from(value.to_string()));
    }

    if let Some(path) = file_path.filter(|p| !p.is_empty()) {
        let expanded = expand_home(path);
        let content = fs::read_to_string(&expanded).map_err(|e| SecretError::FileReadError {
            path: expanded.clone(),
            source: e,
        })?;
        return non_empty(content.trim(), format!("file '{}'", expanded));
    }

    if let Some(var_name) = env_var.filter(|n| !n.is_empty()) {
        return match std::env::var(var_name) {
            // Env vars (and .env files) often carry trailing newlines
            Ok(value) => non_empty(value.trim(), format!("environment variable '{}'", var_name)),
            Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                name: var_name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                name: var_name.to_string(),
            }),
        };
    }

    Err(SecretError::NoSourceProvided)
}

fn non_empty(value: &str, origin: String) -> Result<SecretString> {
    if value.is_empty() {
        return Err(SecretError::Empty { origin });
    }
    Ok(SecretString::from(value.to_string()))
}

/// Expands `~` to the user's home directory.
///
/// Handles both `~/path` and standalone `~`; `~user/path` is left untouched.
pub fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let home = home.to_string_lossy();
            if path == "~" {
                return home.into_owned();
            }
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Tests that modify environment variables must run serially
    #[test]
    #[serial]
    fn test_direct_value_takes_priority() {
        std::env::set_var("AUTOALBUM_TEST_SECRET_1", "env_value");
        let result =
            resolve_secret(Some("direct_value"), None, Some("AUTOALBUM_TEST_SECRET_1")).unwrap();
        assert_eq!(result.expose_secret(), "direct_value");
        std::env::remove_var("AUTOALBUM_TEST_SECRET_1");
    }

    #[test]
    #[serial]
    fn test_file_takes_priority_over_env() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "file_value").unwrap();

        std::env::set_var("AUTOALBUM_TEST_SECRET_2", "env_value");
        let result = resolve_secret(
            None,
            Some(temp_file.path().to_str().unwrap()),
            Some("AUTOALBUM_TEST_SECRET_2"),
        )
        .unwrap();
        assert_eq!(result.expose_secret(), "file_value");
        std::env::remove_var("AUTOALBUM_TEST_SECRET_2");
    }

    #[test]
    #[serial]
    fn test_env_var_fallback() {
        std::env::set_var("AUTOALBUM_TEST_SECRET_3", "  env_value\n");
        let result = resolve_secret(None, None, Some("AUTOALBUM_TEST_SECRET_3")).unwrap();
        assert_eq!(result.expose_secret(), "env_value");
        std::env::remove_var("AUTOALBUM_TEST_SECRET_3");
    }

    #[test]
    fn test_no_source_error() {
        let result = resolve_secret(None, None, None);
        assert!(matches!(result, Err(SecretError::NoSourceProvided)));
    }

    #[test]
    #[serial]
    fn test_empty_strings_ignored() {
        std::env::set_var("AUTOALBUM_TEST_SECRET_4", "env_value");
        let result = resolve_secret(Some(""), Some(""), Some("AUTOALBUM_TEST_SECRET_4")).unwrap();
        assert_eq!(result.expose_secret(), "env_value");
        std::env::remove_var("AUTOALBUM_TEST_SECRET_4");
    }

    #[test]
    #[serial]
    fn test_blank_env_var_is_error() {
        std::env::set_var("AUTOALBUM_TEST_SECRET_5", "   ");
        let result = resolve_secret(None, None, Some("AUTOALBUM_TEST_SECRET_5"));
        assert!(matches!(result, Err(SecretError::Empty { .. })));
        std::env::remove_var("AUTOALBUM_TEST_SECRET_5");
    }

    #[test]
    fn test_file_not_found_error() {
        let result = resolve_secret(None, Some("/nonexistent/path/to/secret"), None);
        assert!(matches!(result, Err(SecretError::FileReadError { .. })));
    }

    #[test]
    fn test_env_var_not_set_error() {
        let result = resolve_secret(None, None, Some("AUTOALBUM_DEFINITELY_NOT_SET_12345"));
        assert!(matches!(result, Err(SecretError::EnvVarNotSet { .. })));
    }

    #[test]
    fn test_file_content_trimmed() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "  secret_with_whitespace  ").unwrap();

        let result = resolve_secret(None, Some(temp_file.path().to_str().unwrap()), None).unwrap();
        assert_eq!(result.expose_secret(), "secret_with_whitespace");
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/absolute/path"), "/absolute/path");
        assert_eq!(expand_home("relative/path"), "relative/path");
        assert_eq!(expand_home("~alice/docs"), "~alice/docs");

        if let Some(home) = dirs::home_dir() {
            let home = home.to_string_lossy().into_owned();
            assert_eq!(expand_home("~/Pictures"), format!("{}/Pictures", home));
            assert_eq!(expand_home("~"), home);
        }
    }
}
