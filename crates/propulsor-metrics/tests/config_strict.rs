#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use propulsor_metrics::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
measures:
  - group: "UserService"
    timerz: ["login"] # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert!(cfg.is_enabled());
    assert_eq!(cfg.instance_prefix(), "");
    assert!(cfg.measures.is_empty());
}

#[test]
fn disabled_with_prefix() {
    let ok = r#"
version: 1
metrics:
  enabled: false
  instance_prefix: "eu-west-1"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert!(!cfg.is_enabled());
    assert_eq!(cfg.instance_prefix(), "eu-west-1");
}

#[test]
fn rejects_unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_duplicate_measure_targets() {
    let bad = r#"
version: 1
measures:
  - group: "UserService"
    method: "login"
    timers: ["a"]
  - group: "UserService"
    method: "login"
    meters: ["b"]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code(), "BAD_CONFIG");
    assert!(err.to_string().contains("UserService.login"));
}

#[test]
fn rejects_blank_group() {
    let bad = r#"
version: 1
measures:
  - group: "  "
    meters: ["b"]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code(), "BAD_CONFIG");
}

#[test]
fn missing_file_is_internal() {
    let err = config::load_from_file("/nonexistent/propulsor.yaml").expect_err("must fail");
    assert_eq!(err.code(), "INTERNAL");
}
