use clauseguard_core::models::{ContractAnalysis, Level};
use std::fmt::Write;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn level_marker(level: Level) -> &'static str {
    match level {
        Level::High => "[!!!]",
        Level::Medium => "[!! ]",
        Level::Low => "[!  ]",
    }
}

/// One line per analysis for `list`.
pub fn summary_line(analysis: &ContractAnalysis) -> String {
    format!(
        "{}  {:>3}  {:<7}  {:<32}  {}",
        analysis.id,
        analysis.overall_score,
        analysis.score_rating().to_string(),
        truncate_string(&analysis.contract_type, 32),
        analysis.created_at.format("%Y-%m-%d %H:%M"),
    )
}

/// Human-readable report. Free users see the preview plus a note about what is hidden.
pub fn render_analysis(analysis: &ContractAnalysis, is_premium: bool) -> String {
    let total_risks = analysis.risks.len();
    let total_opportunities = analysis.opportunities.len();
    let shown = analysis.clone().preview(is_premium);

    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", shown.contract_type, shown.id);
    let _ = writeln!(
        out,
        "Overall score: {}/100 ({})",
        shown.overall_score,
        shown.score_rating()
    );
    if !shown.summary.is_empty() {
        let _ = writeln!(out, "\n{}", shown.summary);
    }

    let _ = writeln!(out, "\nRisks:");
    for item in &shown.risks {
        let _ = writeln!(out, "  {} {}: {}", level_marker(item.severity), item.risk, item.explanation);
    }

    let _ = writeln!(out, "\nOpportunities:");
    for item in &shown.opportunities {
        let _ = writeln!(
            out,
            "  {} {}: {}",
            level_marker(item.impact),
            item.opportunity,
            item.explanation
        );
    }

    let hidden = (total_risks - shown.risks.len()) + (total_opportunities - shown.opportunities.len());
    if hidden > 0 {
        let _ = writeln!(
            out,
            "\n{} more item(s) available with Premium. Run `clauseguard upgrade`.",
            hidden
        );
    }

    if is_premium {
        for (title, items) in [
            ("Key clauses", &shown.key_clauses),
            ("Recommendations", &shown.recommendations),
            ("Negotiation points", &shown.negotiation_points),
        ] {
            if items.is_empty() {
                continue;
            }
            let _ = writeln!(out, "\n{}:", title);
            for item in items {
                let _ = writeln!(out, "  - {}", item);
            }
        }
    }

    out
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
