use crate::error::CliError;
use std::{collections::HashMap, fs, path::Path};
use tracing::debug;

/// Process environment merged with an optional `.env` file.
///
/// Variables already set in the process win over the file, so a deployment
/// can override a checked-in `.env` without editing it.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Loads `path` if given (it must exist), otherwise `.env` in the
    /// working directory when present.
    pub fn load(env_file: Option<&Path>) -> Result<Self, CliError> {
        let mut env = Self::from_process();
        match env_file {
            Some(path) => env.load_from_file(path)?,
            None if Path::new(".env").is_file() => env.load_from_file(".env")?,
            None => {}
        }
        Ok(env)
    }

    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        let added = self.merge_env_content(&content)?;
        debug!(path = %path.display(), added, "Loaded env file");
        Ok(())
    }

    pub fn all(&self) -> &HashMap<String, String> {
        &self.vars
    }

    /// Returns how many variables the content contributed.
    fn merge_env_content(&mut self, content: &str) -> Result<usize, CliError> {
        let mut added = 0;
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);

            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            if !self.vars.contains_key(key) {
                self.vars.insert(key.to_string(), Self::unquote_value(value));
                added += 1;
            }
        }
        Ok(added)
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }
        // unquoted values may carry a trailing comment
        match value.find(" #") {
            Some(pos) => value[..pos].trim_end().to_string(),
            None => value.to_string(),
        }
    }
}
