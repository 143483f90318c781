use std::path::PathBuf;

use crate::browser::session::BrowserSession;
use crate::engine::framework::{EngineConfig, HealingEngine};
use crate::engine::healer::ElementHealer;
use crate::mapping::table::ElementMapping;
use crate::report::report_model::HealingReport;
use crate::runner::runner::{RunSummary, StepRunner};
use crate::trace::logger::TraceLogger;

pub mod browser;
pub mod cli;
pub mod embedding;
pub mod engine;
pub mod mapping;
pub mod report;
pub mod runner;
pub mod trace;

/// Everything one full suite run needs.
pub struct SuiteOptions {
    pub mapping_path: PathBuf,
    pub healer: ElementHealer,
    pub engine: EngineConfig,
    pub runner: StepRunner,
    pub trace_path: Option<String>,
    pub persist: bool,
}

/// Load a mapping table, launch a browser session, execute every mapped
/// step with self-healing resolution, and return the healing report plus
/// the run tally.
///
/// When `persist` is set, healed locators are written back to the mapping
/// CSV after the run; otherwise corrections live only in memory.
pub fn run_suite(
    options: SuiteOptions,
) -> Result<(HealingReport, RunSummary), Box<dyn std::error::Error>> {
    let mapping = ElementMapping::load_csv(&options.mapping_path)?;

    let mut engine = HealingEngine::new(mapping, options.healer, options.engine);
    if let Some(path) = &options.trace_path {
        engine = engine.with_tracer(TraceLogger::new(path));
    }

    let mut session = BrowserSession::launch()?;
    let summary = options.runner.run(&mut engine, &mut session);
    session.quit()?;

    let report = engine.report();

    if options.persist {
        engine.persist(&options.mapping_path)?;
    }

    Ok((report, summary))
}
