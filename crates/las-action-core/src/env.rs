use crate::error::{ActionError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Snapshot of the process environment as the Actions runner exposes it.
///
/// Components read inputs and variables from this value instead of the
/// ambient process environment, so a run can be reproduced from a fixed map.
#[derive(Clone, Default)]
pub struct ActionEnv {
    vars: HashMap<String, String>,
}

impl ActionEnv {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set a variable, returning the updated snapshot.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Set an action input, returning the updated snapshot.
    pub fn with_input(self, name: &str, value: impl Into<String>) -> Self {
        self.with_var(input_var_name(name), value)
    }

    /// A variable's value; unset and empty are both `None`.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn var_path(&self, name: &str) -> Option<PathBuf> {
        self.var(name).map(PathBuf::from)
    }

    pub fn required_var(&self, name: &str) -> Result<&str> {
        self.var(name).ok_or_else(|| ActionError::MissingEnv {
            name: name.to_string(),
        })
    }

    /// Trimmed input value, empty when the input was not provided.
    pub fn input(&self, name: &str) -> &str {
        self.vars
            .get(&input_var_name(name))
            .map(|v| v.trim())
            .unwrap_or("")
    }

    pub fn required_input(&self, name: &str) -> Result<String> {
        match self.input(name) {
            "" => Err(ActionError::MissingInput {
                key: name.to_string(),
            }),
            value => Ok(value.to_string()),
        }
    }

    /// Boolean input following the YAML 1.2 core schema spellings.
    pub fn boolean_input(&self, name: &str) -> Result<bool> {
        match self.input(name) {
            "true" | "True" | "TRUE" => Ok(true),
            "false" | "False" | "FALSE" => Ok(false),
            _ => Err(ActionError::InvalidBooleanInput {
                key: name.to_string(),
            }),
        }
    }
}

// Inputs carry secrets; only the variable count is printed.
impl fmt::Debug for ActionEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionEnv")
            .field("vars", &self.vars.len())
            .finish()
    }
}

/// Runner convention: `INPUT_` + upper-cased name with spaces as underscores.
pub fn input_var_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}
