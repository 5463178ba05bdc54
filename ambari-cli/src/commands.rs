// Command handlers. Output goes to the supplied writer; logs go to the subscriber.
use ambari_config::{
    CheckConfig, ComponentPlan, ComponentScope, ConfigEngine, ConfigStore, ConfigTemplate, ConfigWatcher,
    MetricSelection, SchemaDocument, ServicePlan, ServiceSelection,
};
use clap::CommandFactory;
use clap_complete::Shell;
use colored::Colorize;
use error_common::{codes, ErrorReporter, IntegrationError, Result};
use log_pipeline::LogRouter;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use std::sync::Arc;

use crate::cli::Cli;

/// Validates `file`; returns whether every instance is usable
pub fn validate(file: &Path, dump: bool, out: &mut impl Write) -> Result<bool> {
    let engine = ConfigEngine::for_file(file)?;
    let config = engine.build()?;

    writeln!(
        out,
        "{} {} ({} instances, {} log sources)",
        "Loaded".bold(),
        file.display(),
        config.instances.len(),
        config.logs.len()
    )?;

    for outcome in &config.instances {
        match &outcome.result {
            Ok(instance) => writeln!(
                out,
                "  instances[{}] {} {} ({})",
                outcome.index,
                "ok".green(),
                logger_redacted::redact(instance.url.as_str()),
                describe_selection(&instance.services)
            )?,
            Err(error) => writeln!(out, "  instances[{}] {} {}", outcome.index, "FAILED".red().bold(), error)?,
        }
    }

    if !config.diagnostics.is_empty() {
        writeln!(out, "{}", "Diagnostics:".bold())?;
        for diagnostic in &config.diagnostics {
            let line = logger_redacted::redact(&diagnostic.to_string());
            if diagnostic.is_error() {
                writeln!(out, "  {}", line.red())?;
            } else {
                writeln!(out, "  {}", line.yellow())?;
            }
        }
    }

    let summary = ErrorReporter::new("ambari-check").report_all(&config.diagnostics);
    let failed = config.failed_instances().count();
    writeln!(
        out,
        "Summary: {} valid, {} failed, {} warnings, {} errors",
        config.valid_instances().count(),
        failed,
        summary.warnings,
        summary.errors
    )?;

    if dump {
        let dumped = serde_yaml::to_string(&config.redacted_value(engine.schema()))
            .map_err(|e| IntegrationError::config(codes::system::INTERNAL, e.to_string()))?;
        writeln!(out, "---\n{}", dumped.trim_end())?;
    }

    Ok(failed == 0)
}

fn describe_selection(selection: &ServiceSelection) -> String {
    match selection {
        ServiceSelection::Unrestricted => "all services".to_string(),
        ServiceSelection::Whitelist(whitelist) => {
            let services: Vec<&str> = whitelist.services().collect();
            if services.is_empty() {
                "no services".to_string()
            } else {
                format!("services: {}", services.join(", "))
            }
        }
    }
}

pub fn plan(
    file: &Path,
    instance: usize,
    service: &str,
    component: Option<&str>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let config = ConfigEngine::for_file(file)?.build()?;
    let outcome = config.instance(instance).ok_or_else(|| {
        IntegrationError::config(
            codes::config::INVALID_VALUE,
            format!("no instance {} (document has {})", instance, config.instances.len()),
        )
    })?;
    let instance_config = match &outcome.result {
        Ok(instance_config) => instance_config,
        Err(error) => {
            return Err(IntegrationError::config(
                error.code(),
                format!("instances[{}] is invalid: {}", instance, error),
            ))
        }
    };

    let plan = config.plan_for(instance_config);
    match component {
        None => {
            let service_plan = plan.plan_service(service);
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&service_plan).map_err(std::io::Error::from)?)?;
            } else {
                write_service_plan(out, service, &service_plan)?;
            }
        }
        Some(component) => {
            let component_plan = plan.plan_component(service, component);
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&component_plan).map_err(std::io::Error::from)?)?;
            } else {
                write_component_plan(out, service, component, &component_plan)?;
            }
        }
    }
    Ok(())
}

fn checked(flag: bool) -> colored::ColoredString {
    if flag {
        "checked".green()
    } else {
        "skipped".dimmed()
    }
}

fn write_service_plan(out: &mut impl Write, service: &str, plan: &ServicePlan) -> Result<()> {
    let components = match &plan.components {
        ComponentScope::All => "all".to_string(),
        ComponentScope::Listed(components) => components.join(", "),
        ComponentScope::None => "none".to_string(),
    };
    writeln!(out, "{}", service.bold())?;
    writeln!(out, "  status:     {}", checked(plan.check_status))?;
    writeln!(out, "  components: {}", components)?;
    Ok(())
}

fn write_component_plan(out: &mut impl Write, service: &str, component: &str, plan: &ComponentPlan) -> Result<()> {
    let metrics = match &plan.metrics {
        MetricSelection::All => "all".to_string(),
        MetricSelection::Headers(headers) if !headers.is_empty() => headers
            .iter()
            .map(|header| header.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        MetricSelection::Headers(_) | MetricSelection::Nothing => "none".to_string(),
    };
    writeln!(out, "{}", format!("{}/{}", service, component).bold())?;
    writeln!(out, "  status:  {}", checked(plan.check_status))?;
    writeln!(out, "  metrics: {}", metrics)?;
    Ok(())
}

pub fn example(no_logs: bool, out: &mut impl Write) -> Result<()> {
    let template = if no_logs {
        ConfigTemplate::new().without_logs()
    } else {
        ConfigTemplate::new()
    };
    let rendered = template.render(&SchemaDocument::ambari()?)?;
    out.write_all(rendered.as_bytes())?;
    Ok(())
}

/// Prints the records produced from `logfile`; returns how many there were
pub fn coalesce(
    logfile: &Path,
    config: Option<&Path>,
    route_as: Option<&Path>,
    json: bool,
    out: &mut impl Write,
) -> Result<usize> {
    let sources = match config {
        Some(path) => ConfigEngine::for_file(path)?.with_default_logs(true).build()?.logs,
        None => SchemaDocument::ambari()?.default_logs(),
    };
    let router = LogRouter::new(&sources)?;
    let routed_path = route_as.unwrap_or(logfile);
    let mut processor = router.processor_for(routed_path)?;

    let reader = BufReader::new(File::open(logfile)?);
    let records = processor.process_reader(reader)?;

    for (index, record) in records.iter().enumerate() {
        if json {
            writeln!(out, "{}", serde_json::to_string(record).map_err(std::io::Error::from)?)?;
        } else {
            let mut header = format!("#{} ({} lines", index + 1, record.line_count);
            if record.truncated {
                header.push_str(", truncated");
            }
            header.push(')');
            writeln!(out, "{}", header.cyan())?;
            writeln!(out, "{}", record.content)?;
        }
    }

    tracing::info!(
        file = %logfile.display(),
        records = records.len(),
        dropped = processor.dropped(),
        "Log file coalesced"
    );
    Ok(records.len())
}

pub async fn watch(file: &Path) -> Result<()> {
    let store = Arc::new(ConfigStore::open(ConfigEngine::for_file(file)?)?);
    print_snapshot(&store.current());

    let mut updates = store.subscribe();
    let _watcher = ConfigWatcher::spawn(store.clone(), file)?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let config = updates.borrow_and_update().clone();
                print_snapshot(&config);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watch");
                break;
            }
        }
    }
    Ok(())
}

fn print_snapshot(config: &CheckConfig) {
    println!(
        "[{}] {} valid, {} failed, {} diagnostics",
        config.loaded_at.format("%Y-%m-%d %H:%M:%S"),
        config.valid_instances().count(),
        config.failed_instances().count(),
        config.diagnostics.len()
    );
}

pub fn completions(shell: Shell, out: &mut impl Write) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, out);
}
