use ambari_cli::{commands, Cli, Command};
use clap::Parser;
use std::io::Write;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let _guard = logger_redacted::init(cli.logger_config())?;

    match run(cli.command).await {
        Ok(code) => Ok(code),
        Err(error) => {
            error_common::log_error("ambari-check", &error);
            Err(error.into())
        }
    }
}

async fn run(command: Command) -> error_common::Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let code = match command {
        Command::Validate { file, dump } => {
            if commands::validate(&file, dump, &mut out)? {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Plan {
            file,
            instance,
            service,
            component,
            json,
        } => {
            commands::plan(&file, instance, &service, component.as_deref(), json, &mut out)?;
            ExitCode::SUCCESS
        }
        Command::Example { no_logs } => {
            commands::example(no_logs, &mut out)?;
            ExitCode::SUCCESS
        }
        Command::Coalesce {
            logfile,
            config,
            route_as,
            json,
        } => {
            commands::coalesce(&logfile, config.as_deref(), route_as.as_deref(), json, &mut out)?;
            ExitCode::SUCCESS
        }
        Command::Watch { file } => {
            drop(out);
            commands::watch(&file).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Completions { shell } => {
            commands::completions(shell, &mut out);
            ExitCode::SUCCESS
        }
    };

    out.flush()?;
    Ok(code)
}
