use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use qml_core::{FlowAnalysis, QuestionnaireSummary, SortKey, TransitionFilter};
use qml_ingest::{Diagnostics, ExtractOptions, parse_questionnaire};
use qml_model::{Page, Questionnaire};
use qml_report::{ExportFormat, render, write_export};

use crate::cli::{Command, ExportArgs, ExportFormatArg, SortKeyArg, TransitionArgs, VariableArgs};
use crate::config::{CliConfig, ReportConfig};
use crate::tables::{
    conditions_table, diagnostics_table, pages_table, shown_table, summary_table,
    transitions_table, unused_table, variables_table,
};

/// One or more extracted files merged into a single model.
#[derive(Debug)]
pub struct Loaded {
    pub questionnaire: Questionnaire,
    pub diagnostics: Diagnostics,
    pub files: Vec<PathBuf>,
}

/// Extract every file and merge them in order under the configured policy.
pub fn load(files: &[PathBuf], config: &CliConfig) -> Result<Loaded> {
    let mut merged: Option<Questionnaire> = None;
    let mut diagnostics = Diagnostics::new();
    for path in files {
        let span = info_span!("file", path = %path.display());
        let _guard = span.enter();
        let extraction = load_file(path, &config.extract)?;
        info!(
            pages = extraction.questionnaire.page_count(),
            warnings = extraction.diagnostics.warning_count(),
            "questionnaire extracted"
        );
        diagnostics.extend(extraction.diagnostics);
        merged = Some(match merged {
            None => extraction.questionnaire,
            Some(mut questionnaire) => {
                questionnaire
                    .append_other_questionnaire_with(extraction.questionnaire, config.merge)
                    .with_context(|| format!("merge {}", path.display()))?;
                questionnaire
            }
        });
    }
    let mut questionnaire = merged.unwrap_or_default();
    if files.len() > 1 {
        questionnaire.update_distances();
    }
    Ok(Loaded {
        questionnaire,
        diagnostics,
        files: files.to_vec(),
    })
}

fn load_file(path: &Path, options: &ExtractOptions) -> Result<qml_ingest::Extraction> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut extraction =
        parse_questionnaire(&text, options).with_context(|| format!("extract {}", path.display()))?;
    extraction.questionnaire.file = Some(path.display().to_string());
    Ok(extraction)
}

/// Run one subcommand, printing its output to stdout.
pub fn run_command(command: &Command, config: &CliConfig) -> Result<()> {
    match command {
        Command::Summary(args) => run_summary(&load(&args.files, config)?),
        Command::Pages(args) => run_pages(&load(&args.files, config)?),
        Command::Order(args) => run_order(&load(&args.files, config)?),
        Command::Transitions(args) => run_transitions(args, config),
        Command::Variables(args) => run_variables(args, config),
        Command::Conditions(args) => {
            let loaded = load(&args.files, config)?;
            println!("{}", conditions_table(&loaded.questionnaire));
            Ok(())
        }
        Command::Export(args) => run_export(args, config),
    }
}

pub fn run_summary(loaded: &Loaded) -> Result<()> {
    let summary = QuestionnaireSummary::from_questionnaire(&loaded.questionnaire);
    if let Some(title) = &summary.title {
        println!("Questionnaire: {title}");
    }
    for file in &loaded.files {
        println!("File: {}", file.display());
    }
    println!("{}", summary_table(&summary));
    if let Some(table) = diagnostics_table(&loaded.diagnostics) {
        println!();
        println!("Diagnostics:");
        println!("{table}");
    }
    Ok(())
}

pub fn run_pages(loaded: &Loaded) -> Result<()> {
    println!("{}", pages_table(ordered_pages(&loaded.questionnaire)));
    Ok(())
}

/// Pages in topological order when sortable, else in model order.
pub fn ordered_pages(questionnaire: &Questionnaire) -> Vec<&Page> {
    let order = questionnaire.topologically_sorted_pages();
    if order.is_empty() {
        return questionnaire.pages().iter().collect();
    }
    order
        .iter()
        .filter_map(|uid| questionnaire.page(uid))
        .collect()
}

pub fn run_order(loaded: &Loaded) -> Result<()> {
    let order = loaded.questionnaire.topologically_sorted_pages();
    if order.is_empty() && loaded.questionnaire.page_count() > 0 {
        eprintln!("page graph contains a cycle; no topological order exists");
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    for uid in order {
        writeln!(stdout, "{uid}")?;
    }
    Ok(())
}

/// Merge command line flags over the `[report]` defaults.
pub fn transition_filter(args: &TransitionArgs, report: &ReportConfig) -> TransitionFilter {
    let mut filter = report.transition_filter();
    if args.min_distance.is_some() {
        filter.min_distance = args.min_distance;
    }
    if args.max_distance.is_some() {
        filter.max_distance = args.max_distance;
    }
    if args.max_count.is_some() {
        filter.max_count = args.max_count;
    }
    if let Some(key) = args.sort {
        filter.sort = true;
        filter.sort_key = sort_key(key);
    }
    filter.descending |= args.descending;
    filter
}

fn sort_key(arg: SortKeyArg) -> SortKey {
    match arg {
        SortKeyArg::Index => SortKey::Index,
        SortKeyArg::Distance => SortKey::Distance,
        SortKeyArg::Source => SortKey::Source,
        SortKeyArg::Target => SortKey::Target,
    }
}

pub fn run_transitions(args: &TransitionArgs, config: &CliConfig) -> Result<()> {
    let loaded = load(&args.input.files, config)?;
    let filter = transition_filter(args, &config.report);
    let basis = loaded.questionnaire.page_positions().basis;
    let transitions = loaded.questionnaire.list_transitions(&filter);
    println!("{}", transitions_table(&transitions));
    println!(
        "{} of {} transitions (distances by {basis:?} order)",
        transitions.len(),
        loaded.questionnaire.transition_count()
    );
    Ok(())
}

pub fn run_variables(args: &VariableArgs, config: &CliConfig) -> Result<()> {
    let loaded = load(&args.input.files, config)?;
    let table = if args.unused {
        unused_table(&loaded.questionnaire)
    } else if args.shown {
        shown_table(&loaded.questionnaire)
    } else {
        variables_table(&loaded.questionnaire)
    };
    println!("{table}");
    Ok(())
}

pub fn export_format(arg: ExportFormatArg) -> ExportFormat {
    match arg {
        ExportFormatArg::Graphml => ExportFormat::Graphml,
        ExportFormatArg::Dot => ExportFormat::Dot,
        ExportFormatArg::Json => ExportFormat::Json,
    }
}

pub fn run_export(args: &ExportArgs, config: &CliConfig) -> Result<()> {
    let loaded = load(&args.input.files, config)?;
    let format = export_format(args.format);
    if loaded.diagnostics.warning_count() > 0 {
        warn!(
            warnings = loaded.diagnostics.warning_count(),
            "exporting a questionnaire with extraction warnings"
        );
    }
    match &args.output {
        Some(path) => write_export(path, &loaded.questionnaire, format)
            .with_context(|| format!("export {}", path.display()))?,
        None => {
            let rendered = render(&loaded.questionnaire, format)?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            if !rendered.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}
