use crate::error::ConfigError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Environment variable manager that loads from the process and .env files.
///
/// Variables already set in the process win over the ones read from a file.
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
    sensitive_patterns: Vec<String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        Self {
            vars,
            sensitive_patterns: Self::default_sensitive_patterns(),
        }
    }

    /// Load variables from a .env file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::EnvFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let loaded = self.parse_env_content(&content)?;
        debug!(path = %path.display(), loaded, "Loaded env file");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    pub fn is_sensitive(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.sensitive_patterns.iter().any(|p| key.contains(p))
    }

    /// The value of `key` fit for logs: sensitive values are masked.
    pub fn display_value(&self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        if self.is_sensitive(key) {
            Some(mask(value))
        } else {
            Some(value.to_string())
        }
    }

    fn parse_env_content(&mut self, content: &str) -> Result<usize, ConfigError> {
        let mut loaded = 0;
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::MalformedLine(line_num + 1));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::EmptyKey(line_num + 1));
            }

            if !self.vars.contains_key(key) {
                self.vars.insert(key.to_string(), Self::unquote_value(value));
                loaded += 1;
            }
        }

        Ok(loaded)
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();

        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }

        value.to_string()
    }

    /// Default patterns for sensitive variable detection
    fn default_sensitive_patterns() -> Vec<String> {
        ["password", "passwd", "secret", "token", "api_key", "apikey", "credential"]
            .iter()
            .map(|p| p.to_string())
            .collect()
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn mask(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
