//! File-backed report generator

use super::{ReportDocument, ReportGenerator};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use shield_core::{
    InvestigationFindings, Order, ReportArtifact, ReportBundle, ReportFormat, ReportSection,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Renders reports from built-in templates into `<output_dir>/<order_id>/`
pub struct TemplateReportGenerator {
    output_dir: PathBuf,
}

impl TemplateReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn render(doc: &ReportDocument, format: ReportFormat) -> Result<String> {
        Ok(match format {
            ReportFormat::Json => serde_json::to_string_pretty(doc)?,
            ReportFormat::Html => render_html(doc),
            ReportFormat::Markdown => render_markdown(doc),
        })
    }
}

#[async_trait]
impl ReportGenerator for TemplateReportGenerator {
    async fn generate(
        &self,
        order: &Order,
        findings: &InvestigationFindings,
    ) -> Result<ReportBundle> {
        let doc = ReportDocument::build(order, findings);
        let dir = self.output_dir.join(&order.order_id);
        tokio::fs::create_dir_all(&dir).await?;

        let mut artifacts = Vec::new();
        for format in order.tier.profile().formats {
            let content = Self::render(&doc, *format)?;
            let path = dir.join(format!("report.{}", format.extension()));
            tokio::fs::write(&path, content.as_bytes()).await?;

            artifacts.push(ReportArtifact {
                format: *format,
                path: path.to_string_lossy().into_owned(),
                size_bytes: content.len() as u64,
            });
        }

        tracing::info!(
            order_id = %order.order_id,
            artifacts = artifacts.len(),
            "Report generated"
        );

        Ok(ReportBundle {
            artifacts,
            generated_at: Utc::now(),
        })
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_html(doc: &ReportDocument) -> String {
    let title = format!("ScamShield Report {}", escape_html(&doc.order_id));
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n\
         <h1>{title}</h1>\n<p>Target: <strong>{}</strong> ({}) &middot; Tier: {} &middot; Generated: {}</p>\n",
        escape_html(&doc.target),
        doc.target_kind,
        doc.tier.profile().display_name,
        doc.generated_at.to_rfc3339(),
    );

    for section in &doc.sections {
        let _ = writeln!(html, "<h2>{}</h2>", section.title());
        match section {
            ReportSection::ExecutiveSummary => {
                if let Some(summary) = &doc.executive_summary {
                    let _ = writeln!(html, "<p>{}</p>", escape_html(summary));
                }
            }
            ReportSection::RiskAssessment => {
                if let Some(risk) = &doc.risk {
                    let _ = writeln!(
                        html,
                        "<p class=\"risk risk-{level}\">Risk score: {}/100 ({level})</p>",
                        risk.score,
                        level = risk.level
                    );
                }
            }
            ReportSection::Findings => {
                html.push_str("<table>\n<tr><th>Severity</th><th>Category</th><th>Finding</th><th>Source</th></tr>\n");
                for f in doc.findings.iter().flatten() {
                    let _ = writeln!(
                        html,
                        "<tr><td>{:?}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        f.severity,
                        escape_html(&f.category),
                        escape_html(&f.summary),
                        escape_html(&f.source)
                    );
                }
                html.push_str("</table>\n");
            }
            ReportSection::Recommendations => {
                html.push_str("<ul>\n");
                for r in doc.recommendations.iter().flatten() {
                    let _ = writeln!(html, "<li>{}</li>", escape_html(r));
                }
                html.push_str("</ul>\n");
            }
            ReportSection::Methodology => {
                html.push_str("<ol>\n");
                for step in doc.methodology.iter().flatten() {
                    let _ = writeln!(html, "<li>{}</li>", escape_html(step));
                }
                html.push_str("</ol>\n");
            }
            ReportSection::EvidenceLog => {
                html.push_str("<ul>\n");
                for entry in doc.evidence_log.iter().flatten() {
                    let _ = writeln!(
                        html,
                        "<li>{} &middot; {} &middot; {}</li>",
                        entry.recorded_at.to_rfc3339(),
                        escape_html(&entry.source),
                        escape_html(&entry.category)
                    );
                }
                html.push_str("</ul>\n");
            }
        }
    }

    html.push_str("</body></html>\n");
    html
}

fn render_markdown(doc: &ReportDocument) -> String {
    use ReportSection::*;

    let mut md = String::new();
    let _ = writeln!(md, "# ScamShield Report {}\n", doc.order_id);
    let _ = writeln!(
        md,
        "**Target:** {} ({})  \n**Tier:** {}  \n**Generated:** {}\n",
        doc.target,
        doc.target_kind,
        doc.tier.profile().display_name,
        doc.generated_at.to_rfc3339()
    );

    for section in &doc.sections {
        let _ = writeln!(md, "## {}\n", section.title());
        match section {
            ExecutiveSummary => {
                if let Some(summary) = &doc.executive_summary {
                    let _ = writeln!(md, "{}\n", summary);
                }
            }
            RiskAssessment => {
                if let Some(risk) = &doc.risk {
                    let _ = writeln!(md, "Risk score: **{}/100** ({})\n", risk.score, risk.level);
                }
            }
            Findings => {
                md.push_str("| Severity | Category | Finding | Source |\n|---|---|---|---|\n");
                for f in doc.findings.iter().flatten() {
                    let _ = writeln!(
                        md,
                        "| {:?} | {} | {} | {} |",
                        f.severity,
                        f.category,
                        f.summary.replace('|', "\\|"),
                        f.source
                    );
                }
                md.push('\n');
            }
            Recommendations => {
                for r in doc.recommendations.iter().flatten() {
                    let _ = writeln!(md, "- {}", r);
                }
                md.push('\n');
            }
            Methodology => {
                for (i, step) in doc.methodology.iter().flatten().enumerate() {
                    let _ = writeln!(md, "{}. {}", i + 1, step);
                }
                md.push('\n');
            }
            EvidenceLog => {
                for entry in doc.evidence_log.iter().flatten() {
                    let _ = writeln!(
                        md,
                        "- `{}` {} ({})",
                        entry.recorded_at.to_rfc3339(),
                        entry.source,
                        entry.category
                    );
                }
                md.push('\n');
            }
        }
    }
    md
}
