//! `ladder run` and `ladder list`.
//!
//! Selects cases from the registry, runs each against the behavioral model
//! through a fresh bench and run log, and reports per-case status plus a
//! summary line. With `--format json` a single JSON document is printed to
//! standard output instead.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use ladder_config::LadderConfig;
use ladder_diagnostics::{Log, Record, Scope, Severity, TextRenderer};
use ladder_sim::RunSummary;

use crate::registry::{self, Case, CaseContext, CASES, DEFAULT_SEED};
use crate::{GlobalArgs, ReportFormat, RunArgs};

/// Result of running a single case.
#[derive(Debug, Serialize)]
struct CaseResult {
    /// Name of the case.
    name: String,
    /// Whether the case passed.
    passed: bool,
    /// Summary of a completed run.
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<RunSummary>,
    /// Error message if the run stopped early.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Error and fatal records of the run.
    records: Vec<Record>,
}

/// The JSON report of `ladder run --format json`.
#[derive(Debug, Serialize)]
struct Report {
    passed: usize,
    failed: usize,
    cases: Vec<CaseResult>,
}

/// Runs the `ladder list` command.
pub fn list(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    match global.format {
        ReportFormat::Text => {
            for case in CASES {
                println!("{:<16} {}", case.name, case.description);
            }
        }
        ReportFormat::Json => {
            let names: Vec<_> = CASES
                .iter()
                .map(|c| serde_json::json!({ "name": c.name, "description": c.description }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&names)?);
        }
    }
    Ok(0)
}

/// Runs the `ladder run` command.
///
/// Returns exit code 0 if every selected case passed, 1 otherwise.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_settings(global)?;
    let cases = registry::select(&args.names, args.all, args.filter.as_deref())?;

    if cases.is_empty() {
        if !global.quiet {
            eprintln!("warning: no test cases selected (name one, or pass --all or --filter)");
        }
        return Ok(0);
    }

    let text = global.format == ReportFormat::Text;
    if text && !global.quiet {
        eprintln!(
            "   Running {} case(s) on {} contexts x {} entries",
            cases.len(),
            config.design.contexts,
            config.design.entries
        );
    }

    let ctx = CaseContext {
        params: config.design.clone(),
        seed: args.seed.unwrap_or(DEFAULT_SEED),
    };
    let out_dir = PathBuf::from(&config.bench.waveform_dir);
    if config.bench.waveform {
        std::fs::create_dir_all(&out_dir)?;
    }

    let mut results = Vec::new();
    for case in cases {
        let waveform = config
            .bench
            .waveform
            .then(|| out_dir.join(format!("{}.vcd", case.name)));
        let result = run_case(case, &ctx, &config, global, waveform.as_deref());
        if text && !global.quiet {
            print_case_result(&result);
        }
        results.push(result);
    }

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if text {
        if !global.quiet {
            eprintln!();
            eprintln!(
                "   Result: {passed} passed, {failed} failed out of {} case(s)",
                results.len()
            );
        }
    } else {
        let report = Report {
            passed,
            failed,
            cases: results,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(if failed > 0 { 1 } else { 0 })
}

/// Loads `ladder.toml` and applies command-line overrides.
///
/// `--config` may name a file or a directory; without it the current
/// directory is searched.
pub fn load_settings(global: &GlobalArgs) -> Result<LadderConfig, Box<dyn std::error::Error>> {
    let mut config = match global.config.as_deref().map(Path::new) {
        Some(p) if p.is_file() => ladder_config::load_config_file(p)?,
        Some(p) => ladder_config::load_config(p)?,
        None => ladder_config::load_config(&std::env::current_dir()?)?,
    };
    config.bench.waveform |= global.vcd;
    config.log.fail_fast |= global.fail_fast;
    config.log.verbose |= global.verbose;
    Ok(config)
}

/// Builds the run log for one case.
fn make_log(config: &LadderConfig, global: &GlobalArgs) -> Arc<Log> {
    let mut log = Log::new();
    if config.log.fail_fast {
        log = log.with_abort_threshold(Severity::Error);
    }
    if global.format == ReportFormat::Text && !global.quiet {
        let threshold = if config.log.verbose {
            Severity::Debug
        } else {
            Severity::Error
        };
        log = log.with_stderr_echo(threshold);
    }
    Arc::new(log)
}

/// Runs a single case and returns the result.
fn run_case(
    case: &Case,
    ctx: &CaseContext,
    config: &LadderConfig,
    global: &GlobalArgs,
    waveform: Option<&Path>,
) -> CaseResult {
    let log = make_log(config, global);
    let scope = Scope::root(Arc::clone(&log));
    let mut program = case.build(ctx);
    scope.info(format!("running {}", case.name));

    let outcome = ladder_sim::simulate(config, &mut program, scope, waveform);
    let records = log
        .take_all()
        .into_iter()
        .filter(|r| r.severity.is_error())
        .collect();
    match outcome {
        Ok(summary) => CaseResult {
            name: case.name.to_string(),
            passed: summary.passed,
            summary: Some(summary),
            error: None,
            records,
        },
        Err(e) => CaseResult {
            name: case.name.to_string(),
            passed: false,
            summary: None,
            error: Some(e.to_string()),
            records,
        },
    }
}

/// Prints the result of a single case.
fn print_case_result(result: &CaseResult) {
    match (&result.summary, &result.error) {
        (Some(s), _) if result.passed => eprintln!(
            "   PASS  {name} ({cycles} cycles, {notifies} notifies, {queries} queries)",
            name = result.name,
            cycles = s.cycles,
            notifies = s.notifies_expected,
            queries = s.queries_checked,
        ),
        (_, Some(err)) => eprintln!("   FAIL  {name}: {err}", name = result.name),
        (Some(s), None) => {
            eprintln!(
                "   FAIL  {name}: {count} mismatch(es)",
                name = result.name,
                count = s.mismatches,
            );
            if let Some(first) = result.records.first() {
                eprint!("{}", TextRenderer.render(first));
            }
        }
        (None, None) => eprintln!("   FAIL  {name}", name = result.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn global(config: Option<&Path>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: config.map(|p| p.to_str().unwrap().to_string()),
            vcd: false,
            fail_fast: false,
            format: ReportFormat::Text,
        }
    }

    fn args(names: &[&str]) -> RunArgs {
        RunArgs {
            names: names.iter().map(|s| s.to_string()).collect(),
            all: false,
            filter: None,
            seed: None,
        }
    }

    #[test]
    fn every_case_passes_on_default_design() {
        let tmp = TempDir::new().unwrap();
        let config = LadderConfig::default();
        let g = global(Some(tmp.path()));
        let ctx = CaseContext {
            params: config.design.clone(),
            seed: DEFAULT_SEED,
        };
        for case in CASES {
            let result = run_case(case, &ctx, &config, &g, None);
            assert!(result.passed, "{}: {:?}", case.name, result);
        }
    }

    #[test]
    fn every_case_passes_on_small_design() {
        let config = ladder_config::load_config_from_str(
            "[design]\ncontexts = 3\nentries = 2\nupdate_pipe_delay = 2\nquery_pipe_delay = 3\ninit_cycles = 0\n",
        )
        .unwrap();
        let g = global(None);
        let ctx = CaseContext {
            params: config.design.clone(),
            seed: 7,
        };
        for case in CASES {
            let result = run_case(case, &ctx, &config, &g, None);
            assert!(result.passed, "{}: {:?}", case.name, result);
        }
    }

    #[test]
    fn run_writes_waveforms() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("waves");
        std::fs::write(
            tmp.path().join("ladder.toml"),
            format!("[bench]\nwaveform_dir = {:?}\n", out.to_str().unwrap()),
        )
        .unwrap();
        let mut g = global(Some(tmp.path()));
        g.vcd = true;
        let code = run(&args(&["smoke"]), &g).unwrap();
        assert_eq!(code, 0);
        let vcd = std::fs::read_to_string(out.join("smoke.vcd")).unwrap();
        assert!(vcd.contains("$enddefinitions $end"));
    }

    #[test]
    fn unknown_case_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = run(&args(&["nope"]), &global(Some(tmp.path()))).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn empty_selection_succeeds() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(run(&args(&[]), &global(Some(tmp.path()))).unwrap(), 0);
    }

    #[test]
    fn overrides_apply() {
        let tmp = TempDir::new().unwrap();
        let mut g = global(Some(tmp.path()));
        g.vcd = true;
        g.fail_fast = true;
        let config = load_settings(&g).unwrap();
        assert!(config.bench.waveform);
        assert!(config.log.fail_fast);
        assert!(!config.log.verbose);
    }

    #[test]
    fn config_file_path_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        std::fs::write(&path, "[design]\ncontexts = 2\n").unwrap();
        let config = load_settings(&global(Some(&path))).unwrap();
        assert_eq!(config.design.contexts, 2);
    }

    #[test]
    fn case_result_serializes() {
        let result = CaseResult {
            name: "smoke".into(),
            passed: false,
            summary: None,
            error: Some("boom".into()),
            records: Vec::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["name"], "smoke");
        assert_eq!(json["error"], "boom");
        assert!(json.get("summary").is_none());
    }
}
