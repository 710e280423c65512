//! Per-unit analysis: cache lookup, summary pass, finding passes.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use lintgraph_cache::{fingerprint, ContentCache, Fingerprint};
use lintgraph_core::config::{Config, ModelParams, PassConfig};
use lintgraph_core::function::{ExternalFunc, FunctionInfo, Position};
use lintgraph_core::result::{Attribution, Finding, MemberInfo, Summary, UnitResult};
use lintgraph_core::template::PromptTemplate;
use lintgraph_core::unit::AnalysisUnit;
use lintgraph_oracle::{ModelConfig, Oracle, Request};
use lintgraph_util::errors::{LintError, LintResult};
use lintgraph_util::hash::sha256_parts;

use crate::locate::locate_line;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::prompt::{build_context, PromptInput};
use crate::response::{decode_findings, decode_summary, IssueResponse, ParseError};
use crate::schema::ResponseKind;

/// A configured pass with its template loaded.
#[derive(Debug, Clone)]
struct PreparedPass {
    name: String,
    template: PromptTemplate,
    params: ModelParams,
}

impl PreparedPass {
    fn load(config: &Config, pass: &PassConfig, prompts_dir: Option<&Path>) -> LintResult<Self> {
        Ok(Self {
            name: pass.name.clone(),
            template: PromptTemplate::load(&pass.prompt, prompts_dir)?,
            params: config.params_for(pass),
        })
    }

    fn model_config(&self, kind: ResponseKind) -> ModelConfig {
        ModelConfig {
            model: self.params.model.clone(),
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            response_shape: Some(kind.shape()),
        }
    }
}

/// How a unit's result was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Served from the cache; no pass ran.
    Cached(UnitResult),
    /// Every pass ran against the oracle.
    Computed(UnitResult),
}

impl UnitOutcome {
    pub fn into_result(self) -> UnitResult {
        match self {
            UnitOutcome::Cached(r) | UnitOutcome::Computed(r) => r,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, UnitOutcome::Cached(_))
    }
}

/// Runs the configured passes for one unit at a time.
pub struct Analyzer {
    oracle: Arc<dyn Oracle>,
    cache: Option<Arc<dyn ContentCache>>,
    summary_pass: PreparedPass,
    finding_passes: Vec<PreparedPass>,
    externals: BTreeMap<String, ExternalFunc>,
    /// Hash of everything in the configuration that shapes a result.
    config_tag: String,
}

impl Analyzer {
    /// Load every enabled pass template. Fails on a missing summary pass or
    /// an unreadable prompt.
    pub fn new(
        config: &Config,
        oracle: Arc<dyn Oracle>,
        cache: Option<Arc<dyn ContentCache>>,
        externals: BTreeMap<String, ExternalFunc>,
        prompts_dir: Option<&Path>,
    ) -> LintResult<Self> {
        let summary = config.summary_pass().ok_or_else(|| LintError::Config {
            message: "No enabled summary pass".to_string(),
        })?;
        let summary_pass = PreparedPass::load(config, summary, prompts_dir)?;
        let finding_passes = config
            .finding_passes()
            .map(|p| PreparedPass::load(config, p, prompts_dir))
            .collect::<LintResult<Vec<_>>>()?;
        let config_tag = config_tag(&summary_pass, &finding_passes);

        Ok(Self {
            oracle,
            cache,
            summary_pass,
            finding_passes,
            externals,
            config_tag,
        })
    }

    /// Names of the passes run per unit, summary first.
    pub fn pass_names(&self) -> Vec<&str> {
        std::iter::once(&self.summary_pass)
            .chain(&self.finding_passes)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Cache key of `unit` given its dependency summaries.
    pub fn fingerprint(&self, unit: &AnalysisUnit, deps: &[(&str, &Summary)]) -> Fingerprint {
        fingerprint::compute(&self.config_tag, unit, &self.unit_externals(unit), deps)
    }

    /// Known metadata for the external callees of `unit`, in callee order.
    fn unit_externals<'u>(&'u self, unit: &'u AnalysisUnit) -> Vec<(&'u str, &'u ExternalFunc)> {
        unit.external_callees
            .iter()
            .filter_map(|id| self.externals.get(id).map(|e| (id.as_str(), e)))
            .collect()
    }

    /// Produce the result for `unit`, from the cache when possible.
    ///
    /// `deps` holds one `(unit id, summary)` per entry of `unit.dependencies`,
    /// in that order.
    pub async fn analyze(
        &self,
        unit: &AnalysisUnit,
        deps: &[(String, Summary)],
        progress: &dyn ProgressSink,
    ) -> LintResult<UnitOutcome> {
        let deps: Vec<(&str, &Summary)> = deps.iter().map(|(id, s)| (id.as_str(), s)).collect();
        let key = self.fingerprint(unit, &deps);

        if let Some(result) = self.cached(unit, &key) {
            tracing::debug!("Cache hit for {} ({key})", unit.id);
            progress.notify(ProgressEvent::UnitCached {
                unit: unit.id.clone(),
            });
            return Ok(UnitOutcome::Cached(result));
        }

        let result = self.run_passes(unit, &deps, progress).await?;
        self.store(unit, &key, &result);
        Ok(UnitOutcome::Computed(result))
    }

    /// Run the summary pass then every finding pass, bypassing the cache.
    pub async fn run_passes(
        &self,
        unit: &AnalysisUnit,
        deps: &[(&str, &Summary)],
        progress: &dyn ProgressSink,
    ) -> LintResult<UnitResult> {
        let externals = self.unit_externals(unit);
        let mut input = PromptInput {
            unit,
            dependencies: deps,
            externals: &externals,
            summary: None,
        };

        let summary: Summary = {
            let raw = self
                .complete(unit, &self.summary_pass, ResponseKind::Summary, &input, progress)
                .await?;
            decode_summary(&raw)
                .map_err(|e| parse_failure(unit, &self.summary_pass.name, e))?
                .into()
        };

        input.summary = Some(&summary);
        let mut findings = Vec::new();
        for pass in &self.finding_passes {
            let raw = self
                .complete(unit, pass, ResponseKind::Findings, &input, progress)
                .await?;
            let issues =
                decode_findings(&raw).map_err(|e| parse_failure(unit, &pass.name, e))?;
            tracing::debug!("{} pass for {}: {} issue(s)", pass.name, unit.id, issues.len());

            for issue in issues {
                let finding = to_finding(unit, &pass.name, issue)?;
                progress.notify(ProgressEvent::FindingReported {
                    unit: unit.id.clone(),
                    pass: pass.name.clone(),
                    category: finding.category.clone(),
                    severity: finding.severity,
                });
                findings.push(finding);
            }
        }

        Ok(UnitResult {
            members: unit.members.iter().map(MemberInfo::from).collect(),
            summary,
            findings,
        })
    }

    async fn complete(
        &self,
        unit: &AnalysisUnit,
        pass: &PreparedPass,
        kind: ResponseKind,
        input: &PromptInput<'_>,
        progress: &dyn ProgressSink,
    ) -> LintResult<String> {
        progress.notify(ProgressEvent::PassStarted {
            unit: unit.id.clone(),
            pass: pass.name.clone(),
        });
        let prompt = pass.template.render(&build_context(input));
        let request = Request::user(prompt, pass.model_config(kind));
        let response = self.oracle.complete(request).await.map_err(|e| {
            let cause = match e.downcast_ref::<LintError>() {
                Some(LintError::Oracle { message }) => message.clone(),
                _ => e.to_string(),
            };
            LintError::Oracle {
                message: format!("{} pass for {}: {cause}", pass.name, unit.id),
            }
        })?;
        Ok(response.content)
    }

    /// Read and decode a cached result. Any failure is a miss.
    fn cached(&self, unit: &AnalysisUnit, key: &Fingerprint) -> Option<UnitResult> {
        let cache = self.cache.as_ref()?;
        let bytes = match cache.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!("Cache read for {} failed, treating as miss: {e}", unit.id);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!("Ignoring corrupt cache entry {key} for {}: {e}", unit.id);
                None
            }
        }
    }

    /// Write a result to the cache. Failures are logged and otherwise ignored.
    fn store(&self, unit: &AnalysisUnit, key: &Fingerprint, result: &UnitResult) {
        let Some(cache) = &self.cache else {
            return;
        };
        let bytes = match serde_json::to_vec(result) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to serialize result of {} for the cache: {e}", unit.id);
                return;
            }
        };
        if let Err(e) = cache.set(key, &bytes) {
            tracing::warn!("Failed to cache result of {}: {e}", unit.id);
        }
    }
}

fn config_tag(summary: &PreparedPass, findings: &[PreparedPass]) -> String {
    let mut parts = Vec::new();
    for pass in std::iter::once(summary).chain(findings) {
        parts.push(format!(
            "pass:{}\nmodel:{}\nmax_tokens:{}\ntemperature:{}\n",
            pass.name, pass.params.model, pass.params.max_tokens, pass.params.temperature
        ));
        parts.push(pass.template.base.clone().unwrap_or_default());
        parts.push(pass.template.body.clone());
    }
    sha256_parts(&parts)
}

fn parse_failure(unit: &AnalysisUnit, pass: &str, e: ParseError) -> LintError {
    LintError::Parse {
        message: format!("{pass} pass for {}: {e}", unit.id),
        raw: e.raw,
        normalized: e.normalized,
    }
}

/// Attribute an issue to a unit member and resolve its position.
///
/// An issue naming no member, or a member not in the unit, falls back to the
/// first member and is marked [`Attribution::Fallback`].
fn to_finding(unit: &AnalysisUnit, pass: &str, issue: IssueResponse) -> LintResult<Finding> {
    let named = issue.function.as_deref().and_then(|name| unit.member(name));
    let (member, attribution) = match named {
        Some(m) => (m, Attribution::Member),
        None => {
            let first = unit.members.first().ok_or_else(|| LintError::Generic {
                message: format!("Unit {} has no members", unit.id),
            })?;
            (first, Attribution::Fallback)
        }
    };

    Ok(Finding {
        function: member.id.clone(),
        attribution,
        position: resolve_position(member, &issue),
        severity: issue.severity,
        category: pass.to_string(),
        message: issue.message,
        suggestion: issue.suggestion.filter(|s| !s.trim().is_empty()),
    })
}

/// The member position, moved down to the quoted code when it can be found.
///
/// Without quoted code, an in-range line hint is used instead.
fn resolve_position(member: &FunctionInfo, issue: &IssueResponse) -> Position {
    let mut pos = member.position.clone();
    let offset = match issue.code.as_deref() {
        Some(code) => locate_line(&member.body, code),
        None => issue
            .line
            .map(|l| l as usize)
            .filter(|l| (1..=member.body.lines().count()).contains(l)),
    };
    if let Some(line) = offset {
        pos.line += (line - 1) as u32;
    }
    pos
}
