// src/main.rs
use anyhow::Context;
use clap::Parser;
use cms_migrate_source::constants::LOG_FILE_NAME;
use cms_migrate_source::mapping::REFERENCE_FIELDS;
use cms_migrate_source::{
    extract_fields, Action, ApiClient, CommandLineInput, HookChain, InMemoryIdMap, MappingConfig,
    MigrateSource, ParentReferenceHook, ProjectId, ProjectSource, Row, RowDisposition,
    SourceConfig, TemplateId,
};
use chrono::{DateTime, Utc};
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// Sets up logging configuration.
///
/// Logs go to stderr so stdout stays machine-readable.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join(LOG_FILE_NAME);
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stderr_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Runs one operator command against the API.
struct Operator<'a> {
    client: ApiClient,
    out: &'a mut dyn Write,
}

impl Operator<'_> {
    fn run(&mut self, action: &Action) -> anyhow::Result<()> {
        match action {
            Action::Me => self.me(),
            Action::Projects => self.projects(),
            Action::Templates { project } => self.templates(project),
            Action::Fields { template, .. } => self.fields(template.as_ref()),
            Action::Rows {
                project,
                template,
                since,
                mapping,
                id_map,
            } => self.rows(
                project,
                template.as_ref(),
                *since,
                mapping.as_deref(),
                id_map.as_deref(),
            ),
        }
    }

    fn me(&mut self) -> anyhow::Result<()> {
        let user = self.client.get_me().ok_or_else(|| self.failure("user"))?;
        writeln!(self.out, "{}\t{}\t{}", user.id, user.display_name(), user.email)?;
        Ok(())
    }

    fn projects(&mut self) -> anyhow::Result<()> {
        let projects = self.client.get_projects().ok_or_else(|| self.failure("projects"))?;
        for project in projects.iter() {
            writeln!(self.out, "{}\t{}", project.id, project.name)?;
        }
        Ok(())
    }

    fn templates(&mut self, project: &ProjectId) -> anyhow::Result<()> {
        let templates = self
            .client
            .get_templates_by_project(project)
            .ok_or_else(|| self.failure("templates"))?;
        for template in templates.iter() {
            writeln!(self.out, "{}\t{}", template.id, template.name)?;
        }
        Ok(())
    }

    /// Only the template is fetched; the page metadata fields are fixed.
    fn fields(&mut self, template: Option<&TemplateId>) -> anyhow::Result<()> {
        let template = match template {
            Some(id) => Some(
                self.client
                    .get_template(id)
                    .ok_or_else(|| self.failure("template"))?,
            ),
            None => None,
        };
        for (name, label) in extract_fields(template.as_ref()) {
            writeln!(self.out, "{}\t{}", name, label)?;
        }
        Ok(())
    }

    fn rows(
        &mut self,
        project: &ProjectId,
        template: Option<&TemplateId>,
        since: Option<DateTime<Utc>>,
        mapping: Option<&Path>,
        id_map: Option<&Path>,
    ) -> anyhow::Result<()> {
        let mapping = match mapping {
            Some(path) => {
                let mapping = MappingConfig::load(path)?;
                mapping.ensure_project(project)?;
                let ids = match id_map {
                    Some(path) => InMemoryIdMap::load(path)?,
                    None => InMemoryIdMap::new(),
                };
                let hooks =
                    HookChain::new().with(ParentReferenceHook::new(&mapping, Arc::new(ids)));
                Some((mapping, hooks))
            }
            None => None,
        };

        let mut source = ProjectSource::new(&self.client, project, template);
        if source.snapshot().project().is_none() {
            return Err(self.failure("project"));
        }

        log::info!("Source: {}", source);
        eprintln!("{} ({} rows)", source, source.compute_count());

        source.perform_rewind();
        let (mut written, mut skipped) = (0usize, 0usize);
        while let Some(mut row) = source.next_row() {
            if !updated_since(&row, since) {
                continue;
            }
            let line = match &mapping {
                Some((mapping, hooks)) => {
                    if hooks.run(RowDisposition::Keep, &mut row) == RowDisposition::Skip {
                        skipped += 1;
                        continue;
                    }
                    mapped_line(mapping, &row)?
                }
                None => serde_json::to_string(&row)?,
            };
            writeln!(self.out, "{}", line)?;
            written += 1;
        }
        log::info!("Wrote {} rows, {} skipped by hooks", written, skipped);
        Ok(())
    }

    /// Turns the client's recorded failure into an error for the operator.
    fn failure(&self, what: &str) -> anyhow::Error {
        match self.client.last_error() {
            Some(failure) => anyhow::anyhow!("could not fetch {}: {}", what, failure),
            None => anyhow::anyhow!("could not fetch {}: no data returned", what),
        }
    }
}

/// Rows without a usable timestamp are always included.
fn updated_since(row: &Row, since: Option<DateTime<Utc>>) -> bool {
    match (since, row.last_updated()) {
        (Some(since), Some(updated)) => updated >= since,
        _ => true,
    }
}

fn mapped_line(mapping: &MappingConfig, row: &Row) -> anyhow::Result<String> {
    let template = row
        .get("template_id")
        .and_then(|v| v.as_text())
        .and_then(|id| TemplateId::parse(&id).ok())
        .and_then(|id| mapping.template(&id));
    let fields = template.map(|t| t.map_row(row)).unwrap_or_default();
    let references: serde_json::Map<String, serde_json::Value> = REFERENCE_FIELDS
        .iter()
        .filter_map(|&name| {
            let value = row.get(name)?;
            Some((name.to_string(), serde_json::to_value(value).ok()?))
        })
        .collect();

    Ok(serde_json::to_string(&serde_json::json!({
        "id": row.source_id(),
        "migration": template.map(|t| mapping.migration_key(t)),
        "fields": fields,
        "references": references,
    }))?)
}

fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))?;

    let config = SourceConfig::resolve(cli).context("invalid configuration")?;
    let client = ApiClient::new(config.credentials.clone())?.with_cache(config.open_cache());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut operator = Operator {
        client,
        out: &mut out,
    };
    operator.run(&config.action)?;
    out.flush()?;
    Ok(())
}
