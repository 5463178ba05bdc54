use clap::{Parser, Subcommand};
use clap_complete::Shell;
use logger_redacted::{LogFormat, LoggerConfig};
use std::path::PathBuf;

/// Validate and exercise Ambari check configurations
#[derive(Parser, Debug)]
#[command(name = "ambari-check", version, about, long_about = None)]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Log output format: pretty or json
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Also write daily log files into this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn logger_config(&self) -> LoggerConfig {
        let config = LoggerConfig::default()
            .with_level(&self.log_level)
            .with_format(self.log_format);
        match &self.log_dir {
            Some(directory) => config.with_directory(directory),
            None => config,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a configuration file and report every problem found
    Validate {
        /// Path to conf.yaml
        file: PathBuf,

        /// Print the validated configuration, secrets masked
        #[arg(long)]
        dump: bool,
    },

    /// Show what an instance would check for a service or component
    Plan {
        /// Path to conf.yaml
        file: PathBuf,

        /// Index of the instance in `instances`
        #[arg(short, long, default_value_t = 0)]
        instance: usize,

        /// Service name, e.g. HDFS
        service: String,

        /// Component name, e.g. NAMENODE
        component: Option<String>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print an example conf.yaml generated from the schema
    Example {
        /// Leave out the commented logs section
        #[arg(long)]
        no_logs: bool,
    },

    /// Run a log file through the configured log sources and print the records
    Coalesce {
        /// Log file to read
        logfile: PathBuf,

        /// conf.yaml whose `logs` section is used; the built-in sources otherwise
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Route as if the file were located at this path
        #[arg(long, value_name = "PATH")]
        route_as: Option<PathBuf>,

        /// Print one JSON record per line
        #[arg(long)]
        json: bool,
    },

    /// Reload a configuration file whenever it changes, until Ctrl-C
    Watch {
        /// Path to conf.yaml
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}
