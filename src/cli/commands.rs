use std::path::Path;
use std::time::Duration;

use crate::cli::config::AppConfig;
use crate::embedding::backend::{EmbeddingBackend, HashedEmbedding, OllamaEmbedding};
use crate::engine::framework::EngineConfig;
use crate::engine::healer::ElementHealer;
use crate::engine::tracker::RacePolicy;
use crate::mapping::table::ElementMapping;
use crate::report::console::format_console_report;
use crate::runner::runner::StepRunner;
use crate::{SuiteOptions, run_suite};

// ============================================================================
// run subcommand
// ============================================================================

/// Run every mapped step and report; returns whether the run stayed green.
pub fn cmd_run(
    mapping: &str,
    screenshots_dir: Option<&str>,
    output: Option<&str>,
    format: &str,
    retry_attempts: Option<usize>,
    step_timeout_ms: Option<u64>,
    settle_ms: Option<u64>,
    policy: Option<&str>,
    embedder: Option<&str>,
    trace: Option<&str>,
    persist: bool,
    config: &AppConfig,
    verbose: u8,
    embed_endpoint: Option<&str>,
    embed_model: Option<&str>,
) -> Result<bool, Box<dyn std::error::Error>> {
    // Resolve each knob: CLI > config file > default
    let retry_attempts = retry_attempts.unwrap_or(config.run.retry_attempts);
    let step_timeout_ms = step_timeout_ms.unwrap_or(config.run.step_timeout_ms);
    let settle_ms = settle_ms.unwrap_or(config.run.settle_ms);
    let screenshots_dir = screenshots_dir.unwrap_or(&config.run.screenshots_dir);
    let policy_name = policy.unwrap_or(&config.run.policy);

    let race_policy = RacePolicy::parse(policy_name)
        .ok_or_else(|| format!("Unknown race policy: {}", policy_name))?;

    let backend = build_embedder(
        embedder.unwrap_or(&config.embedding.backend),
        embed_endpoint.or(config.embedding.endpoint.as_deref()),
        embed_model.or(config.embedding.model.as_deref()),
    )?;
    let healer = if config.embedding.blend_structural {
        ElementHealer::blended(backend)
    } else {
        ElementHealer::new(backend)
    };

    if verbose > 0 {
        eprintln!(
            "Running mapping {} (retry_attempts={}, timeout={}ms, policy={})...",
            mapping, retry_attempts, step_timeout_ms, policy_name
        );
    }

    let options = SuiteOptions {
        mapping_path: mapping.into(),
        healer,
        engine: EngineConfig {
            retry_attempts,
            backoff: Duration::from_millis(config.run.backoff_ms),
            screenshots_dir: screenshots_dir.into(),
            race_policy,
        },
        runner: StepRunner {
            step_timeout: Duration::from_millis(step_timeout_ms),
            settle_delay: Duration::from_millis(settle_ms),
            verbose: verbose > 0,
        },
        trace_path: trace.map(|t| t.to_string()),
        persist,
    };

    let (report, summary) = run_suite(options)?;

    if verbose > 0 {
        eprintln!(
            "Steps: {} total, {} passed, {} failed, {} skipped{}",
            summary.steps_total,
            summary.steps_passed,
            summary.steps_failed,
            summary.steps_skipped,
            if summary.cancelled { " (cancelled)" } else { "" }
        );
    }

    // Format report
    let output_content = match format {
        "json" => report.to_json()?,
        _ => format_console_report(&report),
    };

    // Write or print
    match output {
        Some(path) => std::fs::write(path, &output_content)?,
        None => print!("{}", output_content),
    }

    Ok(report.success)
}

// ============================================================================
// inspect subcommand
// ============================================================================

/// Parse a mapping table and print each step's derived strategy set.
pub fn cmd_inspect(mapping: &str) -> Result<(), Box<dyn std::error::Error>> {
    let table = ElementMapping::load_csv(Path::new(mapping))?;

    println!("{} recorded element(s)", table.len());
    for (step, entry) in table.iter() {
        println!("\n  {}", step);
        if !entry.row.page.is_empty() {
            println!("    page: {}", entry.row.page);
        }
        for (kind, value) in entry.strategies.iter() {
            println!("    {}: {}", kind, value);
        }
        if entry.strategies.is_empty() {
            println!("    (no usable strategies)");
        }
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Build the embedding backend by name.
fn build_embedder(
    name: &str,
    endpoint: Option<&str>,
    model: Option<&str>,
) -> Result<Box<dyn EmbeddingBackend>, Box<dyn std::error::Error>> {
    match name {
        "ollama" => {
            let endpoint = endpoint.unwrap_or("http://localhost:11434/api/embed");
            let model = model.unwrap_or("nomic-embed-text");
            Ok(Box::new(OllamaEmbedding::new(endpoint, model)))
        }
        "hashed" => Ok(Box::new(HashedEmbedding::default())),
        other => Err(format!("Unknown embedding backend: {}", other).into()),
    }
}
