//! Prompt rendering for one unit.
//!
//! Builds the [`TemplateContext`] a pass template is rendered with. Available
//! placeholders:
//!
//! - `{{unit_id}}`: the unit id
//! - `{{members}}`: comma-separated member ids
//! - `{{unit}}`: source of every member
//! - `{{callees}}`: summaries of the units this unit depends on
//! - `{{externals}}`: metadata for external callees
//! - `{{summary}}`: this unit's own summary (empty for the summary pass)

use std::fmt::Write;

use lintgraph_core::function::{ExternalFunc, FunctionInfo};
use lintgraph_core::result::Summary;
use lintgraph_core::template::TemplateContext;
use lintgraph_core::unit::AnalysisUnit;

/// Everything a pass prompt may reference about one unit.
pub struct PromptInput<'a> {
    pub unit: &'a AnalysisUnit,
    /// `(unit id, summary)` per dependency, in `unit.dependencies` order.
    pub dependencies: &'a [(&'a str, &'a Summary)],
    /// `(callee id, metadata)` per external callee.
    pub externals: &'a [(&'a str, &'a ExternalFunc)],
    /// The unit's own summary, once the summary pass has produced it.
    pub summary: Option<&'a Summary>,
}

pub fn build_context(input: &PromptInput<'_>) -> TemplateContext {
    let unit = input.unit;
    let mut ctx = TemplateContext::new();
    ctx.set("unit_id", unit.id.as_str());
    ctx.set(
        "members",
        unit.members
            .iter()
            .map(|m| m.id.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    );
    ctx.set("unit", render_members(&unit.members));
    ctx.set("callees", render_callees(input.dependencies));
    ctx.set("externals", render_externals(input.externals));
    ctx.set(
        "summary",
        input.summary.map(render_own_summary).unwrap_or_default(),
    );
    ctx
}

fn render_members(members: &[FunctionInfo]) -> String {
    let mut out = String::new();
    for m in members {
        let _ = writeln!(out, "### {}", m.name);
        if let Some(recv) = &m.receiver {
            let _ = writeln!(out, "Receiver: {recv}");
        }
        let _ = writeln!(out, "Signature: `{}`", m.signature.trim());
        if let Some(doc) = m.doc.as_deref().filter(|d| !d.trim().is_empty()) {
            for line in doc.trim().lines() {
                let _ = writeln!(out, "// {line}");
            }
        }
        let _ = writeln!(out, "```\n{}\n```\n", m.body.trim_end());
    }
    out
}

fn render_list(out: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "  {label}:");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}

fn render_callees(deps: &[(&str, &Summary)]) -> String {
    if deps.is_empty() {
        return String::new();
    }
    let mut out = String::from("## Callees\n\n");
    for (id, s) in deps {
        let _ = writeln!(out, "- {id}: {}", s.purpose);
        let _ = writeln!(out, "  Behavior: {}", s.behavior);
        render_list(&mut out, "Invariants", &s.invariants);
        render_list(&mut out, "Security", &s.security);
    }
    out.push('\n');
    out
}

fn render_externals(externals: &[(&str, &ExternalFunc)]) -> String {
    if externals.is_empty() {
        return String::new();
    }
    let mut out = String::from("## External functions\n\n");
    for (id, ext) in externals {
        let _ = writeln!(out, "- {id} `{}`", ext.signature.trim());
        if let Some(doc) = ext.doc.as_deref().filter(|d| !d.trim().is_empty()) {
            let _ = writeln!(out, "  {}", doc.trim().replace('\n', " "));
        }
        render_list(&mut out, "Invariants", &ext.invariants);
        render_list(&mut out, "Pitfalls", &ext.pitfalls);
    }
    out.push('\n');
    out
}

fn render_own_summary(s: &Summary) -> String {
    let mut out = String::from("## Summary\n\n");
    let _ = writeln!(out, "Purpose: {}", s.purpose);
    let _ = writeln!(out, "Behavior: {}", s.behavior);
    render_list(&mut out, "Invariants", &s.invariants);
    render_list(&mut out, "Security", &s.security);
    out.push('\n');
    out
}
