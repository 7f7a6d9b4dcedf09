#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use korak_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
metrics:
  locale: ["en"] # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:3000");
    assert_eq!(cfg.email.api_key_env, "RESEND_API_KEY");
    assert_eq!(cfg.metrics.fallback_locale, "en");
    assert_eq!(cfg.metrics.locales, vec!["en", "sl", "ru", "it"]);
    assert_eq!(cfg.metrics.error_templates.len(), 2);
    assert!(cfg.metrics.process_metrics);
}

#[test]
fn full_config_overrides_defaults() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9000"
email:
  api_base: "http://localhost:4010"
  from: "Test <test@example.com>"
  welcome_subject: "Hello"
  timeout_ms: 2500
metrics:
  fallback_locale: "sl"
  locales: [sl]
  sent_templates: [welcome]
  process_metrics: false
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 9000);
    assert_eq!(cfg.email.timeout_ms, 2500);
    assert_eq!(cfg.metrics.locales, vec!["sl"]);
    assert_eq!(cfg.metrics.booking_types.len(), 4);
    assert!(!cfg.metrics.process_metrics);
}

#[test]
fn rejects_unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert!(err.to_string().contains("version"));
}

#[test]
fn rejects_out_of_range_values() {
    for bad in [
        "version: 1\nserver:\n  listen: \"not-an-addr\"\n",
        "version: 1\nemail:\n  timeout_ms: 5\n",
        "version: 1\nemail:\n  api_base: \"ftp://x\"\n",
        "version: 1\nemail:\n  from: \"\"\n",
        "version: 1\nmetrics:\n  fallback_locale: \" \"\n",
        "version: 1\nmetrics:\n  locales: [en, \"\"]\n",
    ] {
        let err = config::load_from_str(bad).expect_err(bad);
        assert_eq!(err.client_code().as_str(), "CONFIG", "{bad}");
    }
}
