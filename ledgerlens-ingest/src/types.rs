use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound on messages pulled per import pass
pub const MAX_MESSAGE_LIMIT: usize = 1000;

/// One SMS as read from a device message store.
///
/// Deserialization accepts the field spellings different exporters use
/// (`address`/`originatingAddress` for the sender, `date`/`dateSent` for the
/// timestamp, ...). Missing or unusable timestamps become `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMessage")]
pub struct SmsMessage {
    pub sender: String,
    pub body: String,
    /// Epoch millis, `0` when unknown
    pub timestamp: i64,
}

impl SmsMessage {
    pub fn new(sender: impl Into<String>, body: impl Into<String>, timestamp: i64) -> Self {
        Self {
            sender: sender.into().trim().to_string(),
            body: body.into().trim().to_string(),
            timestamp: timestamp.max(0),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    address: Option<Value>,
    sender: Option<Value>,
    originating_address: Option<Value>,
    phone: Option<Value>,
    body: Option<Value>,
    message: Option<Value>,
    text: Option<Value>,
    content: Option<Value>,
    date: Option<Value>,
    timestamp: Option<Value>,
    date_sent: Option<Value>,
    received_at: Option<Value>,
    sent_at: Option<Value>,
    time: Option<Value>,
}

impl From<RawMessage> for SmsMessage {
    fn from(raw: RawMessage) -> Self {
        let sender = first_text([raw.address, raw.sender, raw.originating_address, raw.phone]);
        let body = first_text([raw.body, raw.message, raw.text, raw.content]);
        let timestamp = [
            raw.date,
            raw.timestamp,
            raw.date_sent,
            raw.received_at,
            raw.sent_at,
            raw.time,
        ]
        .into_iter()
        .flatten()
        .find(|v| !v.is_null())
        .map(|v| to_timestamp(&v))
        .unwrap_or(0);

        SmsMessage::new(sender, body, timestamp)
    }
}

fn first_text<const N: usize>(candidates: [Option<Value>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .filter_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .next()
        .unwrap_or_default()
}

fn to_timestamp(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0)
            .max(0),
        Value::String(s) if !s.trim().is_empty() => {
            let s = s.trim();
            if let Ok(n) = s.parse::<f64>() {
                return if n.is_finite() && n > 0.0 { n as i64 } else { 0 };
            }
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.timestamp_millis().max(0))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// A message export: either a bare array or an object wrapping one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageBatch {
    List(Vec<SmsMessage>),
    Wrapped(WrappedBatch),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WrappedBatch {
    #[serde(default, alias = "data", alias = "sms", alias = "list")]
    messages: Vec<SmsMessage>,
}

impl MessageBatch {
    pub fn into_messages(self) -> Vec<SmsMessage> {
        match self {
            MessageBatch::List(messages) => messages,
            MessageBatch::Wrapped(w) => w.messages,
        }
    }
}

/// Import window applied to a message store read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageQuery {
    /// Only messages at or after this epoch-millis cursor; `0` reads everything
    pub min_date: i64,
    pub limit: usize,
}

impl Default for MessageQuery {
    fn default() -> Self {
        Self {
            min_date: 0,
            limit: MAX_MESSAGE_LIMIT,
        }
    }
}

impl MessageQuery {
    pub fn since(min_date: i64) -> Self {
        Self {
            min_date: min_date.max(0),
            ..Self::default()
        }
    }

    pub fn with_limit(self, limit: usize) -> Self {
        Self { limit, ..self }
    }

    /// Limit clamped to `1..=MAX_MESSAGE_LIMIT`
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_MESSAGE_LIMIT)
    }
}
