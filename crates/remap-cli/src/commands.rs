use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, info_span, warn};

use remap_cli::advisor::{ResponseFileAdvisor, block_on};
use remap_cli::logging::redact_value;
use remap_cli::pipeline::{TransformRequest, run_transformation};
use remap_cli::settings::{Settings, resolve_settings_path, save_settings};
use remap_ingest::{compute_unique_values, load_dataset, load_workbook, value_frequencies};
use remap_map::{
    MappingRequest, MappingRuleStore, RuleSetDocument, SourceCheck, SourceFingerprint,
    load_rule_set, request_proposals, save_rule_set,
};
use remap_model::TransformResponse;
use remap_transform::preview;

use crate::cli::{
    ConfigCommand, PreviewArgs, ProposeArgs, RuleCommand, SheetsArgs, TransformArgs, ValuesArgs,
};
use crate::summary::{
    print_batch_summary, print_preview, print_rules, print_sheets, print_transform_response,
    print_values,
};

pub fn run_sheets(args: &SheetsArgs) -> Result<()> {
    let sheets = load_workbook(&args.file)
        .with_context(|| format!("load {}", args.file.display()))?;
    print_sheets(&sheets);
    Ok(())
}

pub fn run_values(args: &ValuesArgs) -> Result<()> {
    let dataset = load_dataset(&args.source.file, args.source.sheet.as_deref())
        .with_context(|| format!("load {}", args.source.file.display()))?;
    let frequencies = value_frequencies(&dataset, &args.column)?;
    let store = match &args.rules {
        Some(path) => Some(open_rule_set(path, Some(&args.column))?.to_store()),
        None => None,
    };
    print_values(&args.column, &frequencies, store.as_ref());
    Ok(())
}

pub fn run_propose(args: &ProposeArgs, settings: &Settings) -> Result<()> {
    let span = info_span!("propose", column = %args.column);
    let _guard = span.enter();

    let source = &args.source.file;
    let dataset = load_dataset(source, args.source.sheet.as_deref())
        .with_context(|| format!("load {}", source.display()))?;
    let unique_values = compute_unique_values(&dataset, &args.column)?;
    if unique_values.is_empty() {
        bail!("column '{}' has no values to map", args.column);
    }

    let document = open_rule_set(&args.rules, Some(&args.column))?;
    if document.check_source(source)? == SourceCheck::Changed {
        warn!("rules were built against a different version of the source file");
    }
    let mut store = document.to_store();

    let advisor = ResponseFileAdvisor::new(&args.reply);
    let context = settings.advisor_context();
    let request = MappingRequest {
        unique_values,
        goal: args.goal.clone(),
    };
    let outcome = block_on(request_proposals(&mut store, &advisor, &context, &request))?
        .context("request mapping proposals")?;
    for proposal in &outcome.response.mappings {
        debug!(
            original = redact_value(&proposal.original),
            target = redact_value(&proposal.target),
            confidence = proposal.confidence,
            "proposal"
        );
    }

    let fingerprint = SourceFingerprint::compute(source)?;
    let updated = RuleSetDocument::from_store(&document.column, &store, Some(fingerprint));
    save_rule_set(&args.rules, &updated)?;

    print_batch_summary(&outcome);
    print_rules(&store);
    Ok(())
}

pub fn run_rule(command: &RuleCommand) -> Result<()> {
    match command {
        RuleCommand::Set {
            rules,
            source,
            target,
            column,
        } => {
            ensure_rule_text(source, target)?;
            let document = open_rule_set(rules, column.as_deref())?;
            let mut store = document.to_store();
            let replaced = store.upsert_manual(source.as_str(), target.as_str());
            info!(
                source = redact_value(source),
                replaced = replaced.is_some(),
                "set manual rule"
            );
            save_store(rules, &document, &store)?;
            print_rules(&store);
        }
        RuleCommand::Delete { rules, source } => {
            let document = open_rule_set(rules, None)?;
            let mut store = document.to_store();
            if store.delete(source).is_none() {
                warn!(source = redact_value(source), "no rule to delete");
            }
            save_store(rules, &document, &store)?;
            print_rules(&store);
        }
        RuleCommand::List { rules } => {
            let document = open_rule_set(rules, None)?;
            println!("Column: {}", document.column);
            print_rules(&document.to_store());
        }
    }
    Ok(())
}

/// A manual rule needs a non-blank source and target.
fn ensure_rule_text(source: &str, target: &str) -> Result<()> {
    if source.trim().is_empty() {
        bail!("rule source value must not be empty");
    }
    if target.trim().is_empty() {
        bail!("rule target value must not be empty");
    }
    Ok(())
}

pub fn run_preview(args: &PreviewArgs, settings: &Settings) -> Result<()> {
    let document = open_rule_set(&args.rules, args.column.as_deref())?;
    let dataset = load_dataset(&args.source.file, args.source.sheet.as_deref())
        .with_context(|| format!("load {}", args.source.file.display()))?;
    let limit = args.limit.unwrap_or(settings.display.preview_rows);
    let rows = preview(&dataset, &document.column, &document.to_store(), limit)?;
    print_preview(&document.column, &rows, dataset.row_count());
    Ok(())
}

pub fn run_transform(args: &TransformArgs, settings: &Settings) -> Result<TransformResponse> {
    let document = open_rule_set(&args.rules, args.column.as_deref())?;
    let store = document.to_store();
    if document.check_source(&args.source.file).ok() == Some(SourceCheck::Changed) {
        warn!("rules were built against a different version of the source file");
    }
    warn_uncovered(&args.source.file, args.source.sheet.as_deref(), &document.column, &store);

    let request = TransformRequest::new(&args.source.file, &document.column, store)
        .with_sheet(args.source.sheet.clone())
        .with_output(args.output.clone())
        .with_suffix(&settings.output.suffix);
    let response = run_transformation(&request);
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("serialize response")?
        );
    } else {
        print_transform_response(&response);
    }
    Ok(response)
}

pub fn run_config(
    command: &ConfigCommand,
    settings: &Settings,
    explicit: Option<&Path>,
) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let mut shown = settings.clone();
            if shown.advisor.credential.is_some() {
                shown.advisor.credential = Some("[REDACTED]".to_string());
            }
            print!("{}", toml::to_string_pretty(&shown).context("serialize settings")?);
        }
        ConfigCommand::Path => match resolve_settings_path(explicit) {
            Some(path) => println!("{}", path.display()),
            None => bail!("could not determine settings path"),
        },
        ConfigCommand::SetModel { model } => {
            if model.trim().is_empty() {
                bail!("model identifier must not be empty");
            }
            let mut updated = settings.clone();
            updated.advisor.model = model.trim().to_string();
            let path = save_settings(&updated, explicit)?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

/// Load a rule set, or start an empty one for `column` when the file does not exist.
fn open_rule_set(path: &Path, column: Option<&str>) -> Result<RuleSetDocument> {
    if !path.exists() {
        let Some(column) = column else {
            bail!(
                "rule set {} does not exist; pass --column to create it",
                path.display()
            );
        };
        debug!(path = %path.display(), "starting a new rule set");
        return Ok(RuleSetDocument::from_store(column, &MappingRuleStore::new(), None));
    }
    let document =
        load_rule_set(path).with_context(|| format!("load rule set {}", path.display()))?;
    if let Some(column) = column
        && column != document.column
    {
        bail!(
            "rule set {} applies to column '{}', not '{}'",
            path.display(),
            document.column,
            column
        );
    }
    Ok(document)
}

fn save_store(path: &Path, document: &RuleSetDocument, store: &MappingRuleStore) -> Result<()> {
    let updated = RuleSetDocument::from_store(&document.column, store, document.source.clone());
    save_rule_set(path, &updated).with_context(|| format!("save rule set {}", path.display()))
}

/// Log values of the target column that no rule covers. Load failures are left
/// for the transformation to report.
fn warn_uncovered(source: &Path, sheet: Option<&str>, column: &str, store: &MappingRuleStore) {
    let Ok(dataset) = load_dataset(source, sheet) else {
        return;
    };
    let Ok(values) = compute_unique_values(&dataset, column) else {
        return;
    };
    let coverage = store.coverage(&values);
    if !coverage.is_complete() {
        warn!(
            uncovered = coverage.uncovered.len(),
            total = coverage.total(),
            "some values have no rule and will be left unchanged"
        );
        for value in &coverage.uncovered {
            debug!(value = redact_value(value), "uncovered value");
        }
    }
}
