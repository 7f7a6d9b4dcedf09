use serde::Deserialize;
use serde_json::Value;

pub const USER_CREATED: &str = "user.created";

/// Webhook envelope: `{ "type": "...", "data": { ... } }`.
#[derive(Debug)]
pub struct WebhookEvent {
    pub event_type: Option<String>,
    pub data: Value,
}

impl WebhookEvent {
    /// Lift the envelope out of any JSON document. A body that is not an
    /// object, or whose `type` is not a string, has no event type.
    pub fn from_json(mut body: Value) -> Self {
        let event_type = body.get("type").and_then(Value::as_str).map(str::to_owned);
        let data = body.get_mut("data").map(Value::take).unwrap_or(Value::Null);
        Self { event_type, data }
    }
}

/// The parts of a `user.created` payload the welcome flow reads.
#[derive(Debug, Deserialize)]
pub struct UserCreated {
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailAddress {
    #[serde(default)]
    pub id: Option<String>,
    pub email_address: String,
}

impl UserCreated {
    /// Primary address if the payload names one, else the first listed.
    pub fn recipient(&self) -> Option<&str> {
        let primary = self.primary_email_address_id.as_deref().and_then(|pid| {
            self.email_addresses
                .iter()
                .find(|a| a.id.as_deref() == Some(pid))
        });
        primary
            .or_else(|| self.email_addresses.first())
            .map(|a| a.email_address.as_str())
    }
}

/// `data.unsafe_metadata.locale` when it is a non-empty string.
///
/// Read from the raw JSON so a malformed metadata object never blocks the
/// signup count.
pub fn locale_of(data: &Value) -> Option<&str> {
    data.get("unsafe_metadata")
        .and_then(|m| m.get("locale"))
        .and_then(Value::as_str)
        .filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn locale_lookup() {
        assert_eq!(locale_of(&json!({"unsafe_metadata": {"locale": "sl"}})), Some("sl"));
        assert_eq!(locale_of(&json!({"unsafe_metadata": {"locale": ""}})), None);
        assert_eq!(locale_of(&json!({"unsafe_metadata": {"locale": 7}})), None);
        assert_eq!(locale_of(&json!({})), None);
        assert_eq!(locale_of(&Value::Null), None);
    }

    #[test]
    fn recipient_prefers_primary_address() {
        let user: UserCreated = serde_json::from_value(json!({
            "primary_email_address_id": "idn_2",
            "email_addresses": [
                {"id": "idn_1", "email_address": "old@b.com"},
                {"id": "idn_2", "email_address": "main@b.com"}
            ]
        }))
        .unwrap();
        assert_eq!(user.recipient(), Some("main@b.com"));
    }

    #[test]
    fn recipient_falls_back_to_first() {
        let user: UserCreated = serde_json::from_value(json!({
            "email_addresses": [{"email_address": "a@b.com"}],
            "first_name": "Ana"
        }))
        .unwrap();
        assert_eq!(user.recipient(), Some("a@b.com"));

        let empty: UserCreated = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.recipient(), None);
    }

    #[test]
    fn envelope_tolerates_missing_fields() {
        let ev = WebhookEvent::from_json(json!({}));
        assert!(ev.event_type.is_none());
        assert!(ev.data.is_null());
    }

    #[test]
    fn envelope_ignores_non_string_type() {
        for body in [json!({"type": 5}), json!({"type": {"a": 1}}), json!("user.created"), json!([])] {
            assert!(WebhookEvent::from_json(body).event_type.is_none());
        }
        let ev = WebhookEvent::from_json(json!({"type": "user.created", "data": {"first_name": "Ana"}}));
        assert_eq!(ev.event_type.as_deref(), Some(USER_CREATED));
        assert_eq!(ev.data["first_name"], "Ana");
    }
}
