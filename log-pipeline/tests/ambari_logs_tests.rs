/// Tests for the Ambari server log sources as they appear in `conf.yaml`
///
/// Tests cover:
/// - Deserializing `logs` entries and their processing rules
/// - Routing discovered files, including glob paths
/// - Coalescing Java stack traces and EclipseLink statements into records

use log_pipeline::{LogRouter, LogSource, LogSourceType};
use rstest::rstest;
use std::io::Cursor;
use std::path::Path;

const LOGS_YAML: &str = r#"
- type: file
  path: /var/log/ambari-server/ambari-server.log
  source: ambari
  service: ambari
  log_processing_rules:
    - type: multi_line
      name: new_log_start_with_date
      pattern: \d{4}\-\d{2}\-\d{2}
    - type: mask_sequences
      name: mask_passwords
      pattern: password=\S+
      replace_placeholder: password=[masked]

- type: file
  path: /var/log/ambari-server/ambari-eclipselink.log
  source: ambari
  service: ambari
  log_processing_rules:
    - type: multi_line
      name: new_log_start_with_bracket
      pattern: \[EL

- type: file
  path: /var/log/ambari-server/ambari-*.log
  source: ambari
  service: ambari
  tags:
    - role:catch-all
  log_processing_rules:
    - type: exclude_at_match
      name: drop_debug
      pattern: \bDEBUG\b

- type: tcp
  port: 10518
  source: ambari
"#;

fn sources() -> Vec<LogSource> {
    serde_yaml::from_str(LOGS_YAML).unwrap()
}

#[test]
fn test_sources_deserialize() {
    let sources = sources();
    assert_eq!(sources.len(), 4);
    assert_eq!(sources[3].source_type, LogSourceType::Tcp);
    assert_eq!(sources[3].port, Some(10518));
    assert!(sources.iter().all(|source| source.validate().is_ok()));
    assert_eq!(sources[0].log_processing_rules.len(), 2);
}

#[rstest]
#[case("/var/log/ambari-server/ambari-server.log", Some("ambari-server.log"))]
#[case("/var/log/ambari-server/ambari-eclipselink.log", Some("ambari-eclipselink.log"))]
#[case("/var/log/ambari-server/ambari-alerts.log", Some("ambari-*.log"))]
#[case("/var/log/hadoop/hdfs/hadoop-hdfs-namenode.log", None)]
fn test_first_matching_source_wins(#[case] file: &str, #[case] expected_suffix: Option<&str>) {
    let sources = sources();
    let router = LogRouter::new(&sources).unwrap();
    assert_eq!(router.len(), 3);

    let routed = router.route(Path::new(file)).and_then(|source| source.path.as_deref());
    match expected_suffix {
        Some(suffix) => assert!(routed.unwrap().ends_with(suffix)),
        None => assert!(routed.is_none()),
    }
}

#[test]
fn test_server_log_stack_trace_is_one_record() {
    let log = "\
2024-03-01 10:00:00,123  INFO [main] AmbariServer:1040 - Starting Ambari Server
2024-03-01 10:00:05,456 ERROR [qtp-ambari-client-25] ContainerResponse:537 - Mapped exception
java.lang.NullPointerException
\tat org.apache.ambari.server.api.services.BaseService.handleRequest(BaseService.java:135)
\tat org.apache.ambari.server.api.services.ClusterService.getClusters(ClusterService.java:98)
2024-03-01 10:00:06,000  INFO [main] Configuration:2210 - Login with password=hunter2 accepted
";
    let sources = sources();
    let router = LogRouter::new(&sources).unwrap();
    let mut processor = router
        .processor_for(Path::new("/var/log/ambari-server/ambari-server.log"))
        .unwrap();
    let records = processor.process_reader(Cursor::new(log)).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[1].line_count, 4);
    assert!(records[1].content.starts_with("2024-03-01 10:00:05,456 ERROR"));
    assert!(records[1].content.ends_with("(ClusterService.java:98)"));
    assert!(records[2].content.contains("password=[masked]"));
    assert!(!records[2].content.contains("hunter2"));
    assert!(records.iter().all(|record| record.source.as_deref() == Some("ambari")));
}

#[test]
fn test_eclipselink_statements_coalesce_on_bracket() {
    let log = "\
[EL Fine]: sql: 2024-03-01 10:00:00.1--ServerSession(1)--SELECT CLUSTER_ID
  FROM clusters
  WHERE cluster_name = ?
[EL Info]: connection: 2024-03-01 10:00:01.2--login successful
";
    let sources = sources();
    let router = LogRouter::new(&sources).unwrap();
    let mut processor = router
        .processor_for(Path::new("/var/log/ambari-server/ambari-eclipselink.log"))
        .unwrap();
    let records = processor.process_reader(Cursor::new(log)).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].line_count, 3);
    assert_eq!(records[1].line_count, 1);
}

#[test]
fn test_catch_all_source_excludes_debug_lines() {
    let sources = sources();
    let router = LogRouter::new(&sources).unwrap();
    let mut processor = router
        .processor_for(Path::new("/var/log/ambari-server/ambari-audit.log"))
        .unwrap();
    let records = processor.process(["2024-03-01 DEBUG noisy", "2024-03-01 INFO kept"]);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tags, vec!["role:catch-all".to_string()]);
    assert_eq!(processor.dropped(), 1);
}

#[test]
fn test_unrouted_file_is_passed_through() {
    let router = LogRouter::new(&sources()).unwrap();
    let mut processor = router.processor_for(Path::new("/tmp/other.log")).unwrap();
    let records = processor.process(["first", "  second"]);
    assert_eq!(records.len(), 2);
    assert!(records[0].source.is_none());
}
