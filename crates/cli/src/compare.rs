//! `stagediff closing|contracts|run|validate`: Test-vs-Prod comparison commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stagediff_recon::config::OutputPaths;
use stagediff_recon::{
    prepare, CompareConfig, Comparison, IdentityProfile, Language, PreparedCache, PreparedTable,
    ReconError, RecordKind,
};

use crate::exit_codes::{
    EXIT_DIFFERENCES, EXIT_INPUT, EXIT_INVALID_CONFIG, EXIT_MALFORMED, EXIT_MISSING_COLUMNS,
    EXIT_OUTPUT,
};
use crate::CliError;

fn compare_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

/// `stagediff closing|contracts <TEST> <PROD>` with default output names.
pub fn cmd_compare(
    kind: RecordKind,
    test: PathBuf,
    prod: PathBuf,
    language: Language,
    out_dir: PathBuf,
    json_output: bool,
) -> Result<(), CliError> {
    let profile = IdentityProfile::new(kind, language);
    let outputs = OutputPaths::defaults(&out_dir, kind, language);
    execute(&profile, &test, &prod, &outputs, json_output)
}

/// `stagediff run <CONFIG>`: everything comes from the TOML file, paths
/// relative to its directory.
pub fn cmd_run(config_path: PathBuf, json_output: bool) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    if let Some(ref name) = config.name {
        eprintln!("run '{name}' ({}, {})", config.kind, config.language);
    }

    let (test, prod) = config.input_paths(base_dir);
    let outputs = config.output_paths(base_dir);
    execute(&config.profile(), &test, &prod, &outputs, json_output)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let outputs = config.output_paths(Path::new(""));
    eprintln!(
        "valid: {} comparison '{}' ({}), report -> {}",
        config.kind,
        config.name.as_deref().unwrap_or("unnamed"),
        config.language,
        outputs.report.display(),
    );
    Ok(())
}

fn load_config(path: &Path) -> Result<CompareConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        compare_err(EXIT_INVALID_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    CompareConfig::from_toml(&text).map_err(|e| compare_err(EXIT_INVALID_CONFIG, e.to_string()))
}

fn execute(
    profile: &IdentityProfile,
    test_path: &Path,
    prod_path: &Path,
    outputs: &OutputPaths,
    json_output: bool,
) -> Result<(), CliError> {
    let mut cache = PreparedCache::new();
    let test = load_side(&mut cache, profile, test_path)?;
    let prod = load_side(&mut cache, profile, prod_path)?;

    let comparison = stagediff_recon::run(test, prod, profile);
    report_warnings(&comparison);

    if comparison.is_unusable() {
        let hint = format!("expected identity columns: {}", profile.required().join(", "));
        return Err(compare_err(
            EXIT_MISSING_COLUMNS,
            "no usable data on either side; nothing written",
        )
        .with_hint(hint));
    }

    write_outputs(&comparison, outputs)?;

    let json_str = serde_json::to_string_pretty(&comparison.report)
        .map_err(|e| compare_err(EXIT_OUTPUT, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = outputs.json {
        std::fs::write(path, &json_str).map_err(|e| {
            compare_err(EXIT_OUTPUT, format!("cannot write {}: {e}", path.display()))
        })?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &comparison.report.summary;
    eprintln!(
        "{} comparison: {} test row(s), {} prod row(s), {} key(s): \
         {} unchanged, {} changed, {} only in test, {} only in prod",
        comparison.report.meta.kind,
        s.test_rows,
        s.prod_rows,
        s.keys_compared,
        s.unchanged,
        s.changed,
        s.only_in_test,
        s.only_in_prod,
    );

    if comparison.report.has_differences() {
        // Summary above says it all; exit code carries the verdict.
        return Err(compare_err(EXIT_DIFFERENCES, ""));
    }

    eprintln!("no differences found");
    Ok(())
}

/// Read, decode and key one input, reusing the cached result for identical bytes.
fn load_side(
    cache: &mut PreparedCache,
    profile: &IdentityProfile,
    path: &Path,
) -> Result<Arc<PreparedTable>, CliError> {
    let bytes = std::fs::read(path)
        .map_err(|e| compare_err(EXIT_INPUT, format!("cannot read {}: {e}", path.display())))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    cache.get_or_prepare(&bytes, &ext, profile, || {
        let grid = stagediff_io::load_grid_from_bytes(&bytes, &ext)
            .map_err(|e| compare_err(EXIT_INPUT, format!("{}: {e}", path.display())))?;
        prepare(grid, profile).map_err(|e| {
            let code = match e {
                ReconError::MalformedInput(_) => EXIT_MALFORMED,
                _ => EXIT_INPUT,
            };
            compare_err(code, format!("{}: {e}", path.display()))
        })
    })
}

fn report_warnings(comparison: &Comparison) {
    for (side, issue) in comparison.issues() {
        eprintln!("warning: {side}: {issue}");
    }

    let drift = &comparison.report.drift;
    for (side, columns) in [("test", &drift.only_in_test), ("prod", &drift.only_in_prod)] {
        if !columns.is_empty() {
            eprintln!("warning: columns only in {side} (not compared): {}", columns.join(", "));
        }
    }
}

fn write_outputs(comparison: &Comparison, outputs: &OutputPaths) -> Result<(), CliError> {
    let labels = comparison.report.labels();
    let artifacts = [
        (&outputs.test, comparison.test.table.to_raw_table(), labels.test_sheet),
        (&outputs.prod, comparison.prod.table.to_raw_table(), labels.prod_sheet),
        (&outputs.report, comparison.report.to_table(), labels.report_sheet),
    ];

    for (path, table, sheet) in &artifacts {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                compare_err(EXIT_OUTPUT, format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        stagediff_io::export_table(table, sheet, path).map_err(|e| compare_err(EXIT_OUTPUT, e))?;
        eprintln!("wrote {}", path.display());
    }

    Ok(())
}
