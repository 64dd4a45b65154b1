//! Terminal rendering of analysis results.

use anyhow::Result;
use climatech::{ArticleAnalysis, BatchReport, ExtractSummary, MatchOutcome, RelationJudgment};
use colored::Colorize;
use serde::Serialize;

/// Print `value` as pretty JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn banner() {
    println!("{}", "╔════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║        Climatech News Analyzer         ║".bright_cyan());
    println!("{}", "╚════════════════════════════════════════╝".bright_cyan());
    println!();
}

pub fn summary(result: &ExtractSummary) {
    println!("{}", result.title.bold());
    println!("{}", format!("{} chars", result.summary.total_chars).dimmed());
    println!();
    println!("{}", result.summary);
}

pub fn analysis(analysis: &ArticleAnalysis) {
    println!("{}", analysis.title.bold());
    let mut meta = Vec::new();
    if let Some(site) = &analysis.site_name {
        meta.push(site.clone());
    }
    if let Some(author) = &analysis.author {
        meta.push(author.clone());
    }
    if let Some(published) = analysis.published_at {
        meta.push(published.format("%Y-%m-%d").to_string());
    }
    if analysis.translated {
        meta.push(format!("translated from {}", analysis.language));
    }
    if !meta.is_empty() {
        println!("{}", meta.join(" · ").dimmed());
    }

    println!();
    println!("{}", "Summary".bright_blue().bold());
    println!("{}", analysis.summary);
    println!();

    if analysis.is_match {
        println!("{} {}", "✓ Climatech".bright_green().bold(), analysis.match_rationale.dimmed());
    } else {
        println!("{}", "✗ Not climatech".bright_red().bold());
        if let Some(topic) = &analysis.main_topic {
            println!("  {} {}", "Topic:".bright_yellow(), topic);
        }
    }

    related(&analysis.related_documents, analysis.no_match_reason.as_deref());
}

pub fn outcome(outcome: &MatchOutcome) {
    related(&outcome.judgments, outcome.no_match_reason.as_deref());
}

fn related(judgments: &[RelationJudgment], no_match_reason: Option<&str>) {
    if judgments.is_empty() {
        if let Some(reason) = no_match_reason {
            println!("  {} {}", "No related newsletters:".bright_yellow(), reason);
        }
        return;
    }

    println!();
    println!("{}", "Related newsletters".bright_blue().bold());
    for (i, judgment) in judgments.iter().enumerate() {
        let penalty = if judgment.penalty > 0 {
            format!(" (-{})", judgment.penalty)
        } else {
            String::new()
        };
        println!(
            "{}. {} {}",
            i + 1,
            judgment.document_title.bold(),
            format!("[{}{}]", judgment.score, penalty).bright_green()
        );
        if let Some(link) = &judgment.link {
            println!("   {}", link.underline());
        }
        for paragraph in judgment.rationale.split("\n\n") {
            println!("   {}", paragraph);
        }
        println!();
    }
}

pub fn batch(report: &BatchReport) {
    for entry in &report.entries {
        match (&entry.analysis, &entry.error) {
            (Some(analysis), _) => {
                let verdict = if analysis.is_match {
                    "climatech".bright_green()
                } else {
                    "other".dimmed()
                };
                println!(
                    "{} {} [{}] {} related",
                    "✓".bright_green(),
                    entry.url,
                    verdict,
                    analysis.related_documents.len()
                );
            }
            (None, Some(error)) => println!("{} {} {}", "✗".bright_red(), entry.url, error.red()),
            (None, None) => {}
        }
    }
    for duplicate in &report.duplicates {
        println!("{} {} {}", "-".dimmed(), duplicate, "(duplicate)".dimmed());
    }

    println!();
    println!(
        "{} succeeded, {} failed, {} duplicates",
        report.succeeded().to_string().bright_green(),
        report.failed().to_string().bright_red(),
        report.duplicates.len()
    );
}
