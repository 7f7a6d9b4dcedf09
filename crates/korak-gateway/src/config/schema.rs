use std::net::SocketAddr;

use serde::Deserialize;
use korak_core::error::{KorakError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub email: EmailSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(KorakError::Config(format!(
                "unsupported config version {} (expected 1)",
                self.version
            )));
        }

        self.server.validate()?;
        self.email.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            email: EmailSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| KorakError::Config(format!("server.listen must be a valid SocketAddr: {e}")))
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailSection {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Name of the environment variable holding the provider API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_from")]
    pub from: String,

    #[serde(default = "default_welcome_subject")]
    pub welcome_subject: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for EmailSection {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            from: default_from(),
            welcome_subject: default_welcome_subject(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl EmailSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(KorakError::Config(
                "email.api_base must be an http(s) URL".into(),
            ));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(KorakError::Config("email.api_key_env must not be empty".into()));
        }
        if self.from.trim().is_empty() {
            return Err(KorakError::Config("email.from must not be empty".into()));
        }
        if self.welcome_subject.trim().is_empty() {
            return Err(KorakError::Config("email.welcome_subject must not be empty".into()));
        }
        if !(100..=60000).contains(&self.timeout_ms) {
            return Err(KorakError::Config(
                "email.timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_api_base() -> String {
    "https://api.resend.com".into()
}
fn default_api_key_env() -> String {
    "RESEND_API_KEY".into()
}
fn default_from() -> String {
    "Slovenščina Korak za Korakom <welcome@slovenscinakzk.com>".into()
}
fn default_welcome_subject() -> String {
    "Welcome to Slovenščina Korak za Korakom".into()
}
fn default_timeout_ms() -> u64 {
    10000
}

/// Label values seeded at startup so every expected series is scraped as 0
/// before its first real event. These lists are maintained by hand.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_fallback_locale")]
    pub fallback_locale: String,

    #[serde(default = "default_locales")]
    pub locales: Vec<String>,

    #[serde(default = "default_booking_statuses")]
    pub booking_statuses: Vec<String>,

    #[serde(default = "default_booking_types")]
    pub booking_types: Vec<String>,

    #[serde(default = "default_sent_templates")]
    pub sent_templates: Vec<String>,

    #[serde(default = "default_error_templates")]
    pub error_templates: Vec<String>,

    #[serde(default = "default_process_metrics")]
    pub process_metrics: bool,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            fallback_locale: default_fallback_locale(),
            locales: default_locales(),
            booking_statuses: default_booking_statuses(),
            booking_types: default_booking_types(),
            sent_templates: default_sent_templates(),
            error_templates: default_error_templates(),
            process_metrics: default_process_metrics(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if self.fallback_locale.trim().is_empty() {
            return Err(KorakError::Config("metrics.fallback_locale must not be empty".into()));
        }
        let lists = [
            ("locales", &self.locales),
            ("booking_statuses", &self.booking_statuses),
            ("booking_types", &self.booking_types),
            ("sent_templates", &self.sent_templates),
            ("error_templates", &self.error_templates),
        ];
        for (field, list) in lists {
            if list.iter().any(|v| v.trim().is_empty()) {
                return Err(KorakError::Config(format!(
                    "metrics.{field} must not contain empty values"
                )));
            }
        }
        Ok(())
    }
}

fn default_fallback_locale() -> String {
    "en".into()
}
fn default_locales() -> Vec<String> {
    to_strings(&["en", "sl", "ru", "it"])
}
fn default_booking_statuses() -> Vec<String> {
    to_strings(&["booked", "cancelled"])
}
fn default_booking_types() -> Vec<String> {
    to_strings(&["language_club", "individual", "group", "regular"])
}
fn default_sent_templates() -> Vec<String> {
    to_strings(&[
        "welcome",
        "lang_club_booking_confirmation",
        "booking_confirmation",
        "cancellation_confirmation",
        "reschedule_confirmation",
    ])
}
fn default_error_templates() -> Vec<String> {
    to_strings(&["tutor_booking_confirmation", "tutor_cancellation_confirmation"])
}
fn default_process_metrics() -> bool {
    true
}

fn to_strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}
