//! Single-URL analysis command.

use anyhow::Context;
use console::style;

use crate::analyzer::{AnalyzeOptions, Analyzer};
use crate::config::Settings;
use crate::models::{AnalysisReport, DetectionMethod, ErrorReport};
use crate::utils::{normalize_url, validate_url};

/// Analyze one URL and print the result.
pub async fn cmd_check(
    settings: &Settings,
    raw_url: &str,
    json: bool,
    force_browser: bool,
) -> anyhow::Result<()> {
    let url = normalize_url(raw_url);
    if let Err(e) = validate_url(&url) {
        if json {
            print_json(&ErrorReport::invalid_url(raw_url))?;
        }
        anyhow::bail!("invalid URL {:?}: {}", raw_url, e);
    }

    let analyzer = Analyzer::from_settings(settings).context("failed to set up analyzer")?;
    let options = AnalyzeOptions { force_browser };

    if !json {
        println!("{} Analyzing {}", style("→").cyan(), url);
    }

    match analyzer.analyze_with(&url, options).await {
        Ok(report) => {
            if json {
                print_json(&report)?;
            } else {
                print!("{}", render_summary(&report));
            }
            Ok(())
        }
        Err(e) => {
            if json {
                print_json(&ErrorReport::from_scrape_error(&url, &e))?;
            }
            Err(anyhow::Error::new(e).context(format!("failed to analyze {}", url)))
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn mark(found: bool) -> console::StyledObject<&'static str> {
    if found {
        style("✓").green()
    } else {
        style("✗").red()
    }
}

/// Human-readable report.
fn render_summary(report: &AnalysisReport) -> String {
    let traditional = &report.components.traditional_form;
    let oauth = &report.components.oauth_buttons;
    let mut out = String::new();

    out.push_str(&format!(
        "\n{} {}\n",
        mark(report.auth_found),
        style(if report.auth_found {
            "Login surface found"
        } else {
            "No login surface found"
        })
        .bold()
    ));
    if let Some(title) = &report.metadata.page_title {
        out.push_str(&format!("  {:<18} {}\n", "Title:", title));
    }
    out.push_str(&format!(
        "  {:<18} {} ({}ms{})\n",
        "Retrieved:",
        report.scraping_method,
        report.metadata.scrape_time_ms,
        if report.metadata.redirect_detected {
            ", redirected"
        } else {
            ""
        }
    ));
    match report.detection_method {
        DetectionMethod::Structural => {
            out.push_str(&format!("  {:<18} structural\n", "Detection:"));
        }
        DetectionMethod::Llm => {
            out.push_str(&format!(
                "  {:<18} llm ({} confidence)\n",
                "Detection:",
                report.llm_confidence.as_deref().unwrap_or("medium")
            ));
        }
    }

    out.push_str(&format!(
        "\n  {} Password form",
        mark(traditional.found)
    ));
    if !traditional.indicators.is_empty() {
        out.push_str(&format!(
            "  {}",
            style(traditional.indicators.join(", ")).dim()
        ));
    }
    out.push('\n');

    out.push_str(&format!("  {} OAuth/SSO", mark(oauth.found)));
    if !oauth.providers.is_empty() {
        out.push_str(&format!("  {}", oauth.providers.join(", ")));
    }
    out.push('\n');
    out
}
