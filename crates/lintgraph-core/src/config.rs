use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use lintgraph_util::errors::LintError;

/// Name of the distinguished summary pass.
pub const SUMMARY_PASS: &str = "summary";

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "lintgraph.toml";

/// Run configuration loaded from `lintgraph.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default = "default_passes")]
    pub passes: Vec<PassConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oracle: OracleConfig::default(),
            cache: CacheConfig::default(),
            output: OutputConfig::default(),
            run: RunConfig::default(),
            passes: default_passes(),
        }
    }
}

/// Oracle connection and default model parameters from `[oracle]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OracleConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: None,
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OracleConfig {
    /// Read the API key from the configured environment variable, if any.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.is_empty())
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_model() -> String {
    "qwen2.5-coder".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    120
}

/// Cache settings from `[cache]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".lintgraph/cache")
}

/// Output settings from `[output]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Run-state file: checkpoint during the run, final result afterwards.
    #[serde(default = "default_state_path")]
    pub state: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            state: default_state_path(),
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("lintgraph-state.json")
}

/// Scheduling settings from `[run]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunConfig {
    /// Persist the run state after this many newly completed units.
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,
    /// Maximum concurrent units within one dependency layer. `1` runs strictly
    /// sequentially.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            checkpoint_every: default_checkpoint_every(),
            jobs: default_jobs(),
        }
    }
}

fn default_checkpoint_every() -> usize {
    10
}

fn default_jobs() -> usize {
    1
}

/// One configured analysis pass from `[[passes]]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassConfig {
    pub name: String,
    pub prompt: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Per-pass overrides of the `[oracle]` model parameters.
    #[serde(default)]
    pub oracle: Option<ModelOverride>,
}

impl PassConfig {
    /// A pass using the built-in prompt of the same name.
    pub fn builtin(name: &str) -> Self {
        Self {
            name: name.to_string(),
            prompt: format!("builtin:{name}"),
            enabled: true,
            oracle: None,
        }
    }

    pub fn is_summary(&self) -> bool {
        self.name == SUMMARY_PASS
    }
}

/// Partial model parameters that replace the `[oracle]` defaults for one pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModelOverride {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Effective model parameters for one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

fn default_passes() -> Vec<PassConfig> {
    [
        SUMMARY_PASS,
        "security",
        "errors",
        "concurrency",
        "performance",
        "resources",
        "validation",
    ]
    .iter()
    .map(|n| PassConfig::builtin(n))
    .collect()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from `path` (or `lintgraph.toml` in the working
    /// directory), apply `key=value` overrides, and validate the result.
    ///
    /// An explicitly given path must exist; the default path may be absent,
    /// in which case built-in defaults are used.
    pub fn load(path: Option<&Path>, overrides: &[String]) -> miette::Result<Self> {
        let mut table = match path {
            Some(p) => read_table(p)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    read_table(default)?
                } else {
                    toml::Table::new()
                }
            }
        };

        for ov in overrides {
            let fragment = parse_override(ov)?;
            merge_tables(&mut table, fragment);
        }

        let config: Config =
            toml::Value::Table(table)
                .try_into()
                .map_err(|e: toml::de::Error| LintError::Config {
                    message: format!("Invalid configuration: {e}"),
                })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml(content: &str) -> miette::Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| LintError::Config {
            message: format!("Failed to parse configuration: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> miette::Result<()> {
        let fail = |message: String| -> miette::Result<()> {
            Err(LintError::Config { message }.into())
        };

        if self.run.jobs == 0 {
            return fail("run.jobs must be at least 1".to_string());
        }
        if self.run.checkpoint_every == 0 {
            return fail("run.checkpoint-every must be at least 1".to_string());
        }
        if self.oracle.model.trim().is_empty() {
            return fail("oracle.model must not be empty".to_string());
        }

        let mut seen = HashSet::new();
        for pass in &self.passes {
            if !seen.insert(pass.name.as_str()) {
                return fail(format!("Duplicate pass name '{}'", pass.name));
            }
            if let Some(model) = pass.oracle.as_ref().and_then(|o| o.model.as_deref()) {
                if model.trim().is_empty() {
                    return fail(format!("Pass '{}' overrides model with an empty name", pass.name));
                }
            }
        }

        if !self.passes.iter().any(|p| p.is_summary() && p.enabled) {
            return fail(format!("An enabled '{SUMMARY_PASS}' pass is required"));
        }
        Ok(())
    }

    /// The enabled summary pass.
    pub fn summary_pass(&self) -> Option<&PassConfig> {
        self.passes.iter().find(|p| p.is_summary() && p.enabled)
    }

    /// Enabled finding passes, in configured order.
    pub fn finding_passes(&self) -> impl Iterator<Item = &PassConfig> {
        self.passes.iter().filter(|p| p.enabled && !p.is_summary())
    }

    /// Effective model parameters for a pass.
    pub fn params_for(&self, pass: &PassConfig) -> ModelParams {
        let ov = pass.oracle.clone().unwrap_or_default();
        ModelParams {
            model: ov.model.unwrap_or_else(|| self.oracle.model.clone()),
            max_tokens: ov.max_tokens.unwrap_or(self.oracle.max_tokens),
            temperature: ov.temperature.unwrap_or(self.oracle.temperature),
        }
    }
}

fn read_table(path: &Path) -> miette::Result<toml::Table> {
    let content = std::fs::read_to_string(path).map_err(|e| LintError::Config {
        message: format!("Failed to read config {}: {e}", path.display()),
    })?;
    content.parse::<toml::Table>().map_err(|e| {
        LintError::Config {
            message: format!("Failed to parse config {}: {e}", path.display()),
        }
        .into()
    })
}

/// Parse a `dotted.key=value` override into a nested table.
///
/// The value is read as a TOML value; if that fails it is taken as a bare
/// string, so `--set oracle.model=gpt-4o` works without quoting.
fn parse_override(raw: &str) -> miette::Result<toml::Table> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(LintError::Config {
            message: format!("Override '{raw}' is not of the form key=value"),
        }
        .into());
    };
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() {
        return Err(LintError::Config {
            message: format!("Override '{raw}' has an empty key"),
        }
        .into());
    }

    if let Ok(table) = format!("{key} = {value}").parse::<toml::Table>() {
        return Ok(table);
    }
    let quoted = toml::Value::String(value.to_string()).to_string();
    format!("{key} = {quoted}").parse::<toml::Table>().map_err(|e| {
        LintError::Config {
            message: format!("Invalid override '{raw}': {e}"),
        }
        .into()
    })
}

/// Deep-merge `overlay` into `base`; overlay values win.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
