//! Operator CLI for the Ambari check
//!
//! ```bash
//! # Check a configuration before deploying it
//! ambari-check validate /etc/datadog-agent/conf.d/ambari.d/conf.yaml
//!
//! # What would instance 0 collect from the NameNode?
//! ambari-check plan conf.yaml HDFS NAMENODE
//!
//! # See how a server log is split into records
//! ambari-check coalesce /var/log/ambari-server/ambari-server.log
//! ```

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};
