//! Prompt template system.
//!
//! Built-in prompts are compiled into the binary via `include_str!`. A prompt
//! reference is either `builtin:<name>` or a filesystem path. File prompts may
//! have a sibling `_base.txt` which is prepended to the prompt body. Simple
//! `{{variable}}` interpolation is performed at render time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lintgraph_util::errors::LintError;

const BUILTIN_PREFIX: &str = "builtin:";
const BASE_FILE: &str = "_base.txt";

const BUILTIN_BASE: &str = include_str!("../prompts/_base.txt");

/// Names and bodies of every built-in prompt.
const BUILTINS: &[(&str, &str)] = &[
    ("summary", include_str!("../prompts/summary.txt")),
    ("security", include_str!("../prompts/security.txt")),
    ("errors", include_str!("../prompts/errors.txt")),
    ("concurrency", include_str!("../prompts/concurrency.txt")),
    ("performance", include_str!("../prompts/performance.txt")),
    ("resources", include_str!("../prompts/resources.txt")),
    ("validation", include_str!("../prompts/validation.txt")),
];

/// Variables available for `{{variable}}` interpolation in prompt content.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a variable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Replace all `{{key}}` placeholders in `input` with values from `ctx`.
///
/// Whitespace inside the braces is ignored. Unknown keys render as an empty
/// string; an unterminated `{{` is copied through verbatim.
pub fn interpolate(input: &str, ctx: &TemplateContext) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                out.push_str(ctx.get(key).unwrap_or_default());
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// A loaded prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// The reference the template was loaded from.
    pub source: String,
    /// Base content prepended to `body`, if any.
    pub base: Option<String>,
    pub body: String,
}

impl PromptTemplate {
    /// Load a built-in prompt by name.
    pub fn builtin(name: &str) -> miette::Result<Self> {
        let body = BUILTINS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, body)| (*body).to_string())
            .ok_or_else(|| LintError::Config {
                message: format!(
                    "Unknown built-in prompt '{name}' (available: {})",
                    builtin_names().join(", ")
                ),
            })?;
        Ok(Self {
            source: format!("{BUILTIN_PREFIX}{name}"),
            base: Some(BUILTIN_BASE.to_string()),
            body,
        })
    }

    /// Load a prompt from a file, prepending a sibling `_base.txt` if present.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let body = std::fs::read_to_string(path).map_err(|e| LintError::Config {
            message: format!("Failed to read prompt {}: {e}", path.display()),
        })?;
        let base_path = path
            .parent()
            .map(|p| p.join(BASE_FILE))
            .unwrap_or_else(|| PathBuf::from(BASE_FILE));
        let base = match std::fs::read_to_string(&base_path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(LintError::Config {
                    message: format!("Failed to read base prompt {}: {e}", base_path.display()),
                }
                .into())
            }
        };
        Ok(Self {
            source: path.display().to_string(),
            base,
            body,
        })
    }

    /// Resolve a prompt reference.
    ///
    /// `builtin:<name>` loads the embedded prompt, or `<prompts_dir>/<name>.txt`
    /// when an override directory is given. Anything else is a file path.
    pub fn load(reference: &str, prompts_dir: Option<&Path>) -> miette::Result<Self> {
        if reference.is_empty() {
            return Err(LintError::Config {
                message: "Prompt reference is empty".to_string(),
            }
            .into());
        }
        match reference.strip_prefix(BUILTIN_PREFIX) {
            Some(name) => match prompts_dir {
                Some(dir) => Self::from_path(&dir.join(format!("{name}.txt"))),
                None => Self::builtin(name),
            },
            None => Self::from_path(Path::new(reference)),
        }
    }

    /// Render the template with the given variables.
    pub fn render(&self, ctx: &TemplateContext) -> String {
        match &self.base {
            Some(base) => {
                let mut full = interpolate(base, ctx);
                full.push_str(&interpolate(&self.body, ctx));
                full
            }
            None => interpolate(&self.body, ctx),
        }
    }
}

/// Names of all built-in prompts, in declaration order.
pub fn builtin_names() -> Vec<&'static str> {
    BUILTINS.iter().map(|(n, _)| *n).collect()
}
