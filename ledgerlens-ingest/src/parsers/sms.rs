//! SMS transaction-alert parser
//!
//! Typical alerts:
//!   VM-HDFCBK  Rs.500.00 debited from A/c XX1234 for Zomato order on 05/03/2024
//!   AX-SBIINB  Your A/c XX9876 is credited with INR 2,500.00 by NEFT

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use ledgerlens_core::time::local_date_from_millis;
use ledgerlens_core::{Category, RawTransaction, TransactionSource, extract_date_from_free_text};
use regex::Regex;
use tracing::{debug, trace};

use crate::types::{MessageQuery, SmsMessage};

pub const SENDER_KEYWORDS: &[&str] = &[
    "BANK", "BNK", "SBI", "ICICI", "HDFC", "AXIS", "IND", "CAN", "CB", "UPI", "PAYTM",
];
pub const DEBIT_KEYWORDS: &[&str] = &["DEBITED", "SPENT", "WITHDRAWN", "PURCHASE", "PAID", "TXN OF"];
pub const CREDIT_KEYWORDS: &[&str] = &["CREDITED", "DEPOSITED", "SALARY", "RECEIVED", "REFUND", "CASHBACK"];
/// Payment-rail tokens that also mark a message as transactional
pub const RAIL_KEYWORDS: &[&str] = &["TXN", "UPI", "POS", "IMPS", "NEFT", "RTGS"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnType {
    Debit,
    Credit,
}

impl TxnType {
    pub fn label(&self) -> &'static str {
        match self {
            TxnType::Debit => "Debit",
            TxnType::Credit => "Credit",
        }
    }
}

fn bank_reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(a/c|acct|account|bank)\b").expect("invalid bank reference regex"))
}

fn currency_amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:₹|\brs\.?|\binr)\s?(\d+(?:,\d{2,3})*(?:\.\d{1,2})?)")
            .expect("invalid currency amount regex")
    })
}

fn bare_amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(\d+(?:,\d{2,3})*(?:\.\d{1,2})?)\b").expect("invalid bare amount regex")
    })
}

fn description_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        ["for", "at", "to", "via"]
            .iter()
            .map(|kw| {
                Regex::new(&format!(r"(?i)\b{kw}\s+([a-zA-Z0-9&.\- ]{{2,48}})"))
                    .expect("invalid description regex")
            })
            .collect()
    })
}

fn account_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(a/c|acct|account|xx\d+)\b").expect("invalid account token regex"))
}

fn disallowed_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9&.\- ]").expect("invalid char class regex"))
}

fn ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("invalid ws regex"))
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let upper = text.to_uppercase();
    keywords.iter().any(|k| upper.contains(k))
}

/// Looks like a transaction alert from a financial institution
pub fn is_bank_message(message: &SmsMessage) -> bool {
    let transaction_like = contains_any(&message.body, DEBIT_KEYWORDS)
        || contains_any(&message.body, CREDIT_KEYWORDS)
        || contains_any(&message.body, RAIL_KEYWORDS);
    let bank_sender = contains_any(&message.sender, SENDER_KEYWORDS);
    let bank_content =
        contains_any(&message.body, SENDER_KEYWORDS) || bank_reference_re().is_match(&message.body);

    transaction_like && (bank_sender || bank_content)
}

pub fn filter_bank_messages(messages: &[SmsMessage]) -> Vec<&SmsMessage> {
    messages.iter().filter(|m| is_bank_message(m)).collect()
}

/// Earliest debit keyword vs earliest credit keyword; a tie goes to debit.
pub fn detect_type(body: &str) -> Option<TxnType> {
    let text = body.to_uppercase();
    let earliest = |keywords: &[&str]| keywords.iter().filter_map(|k| text.find(k)).min();

    match (earliest(DEBIT_KEYWORDS), earliest(CREDIT_KEYWORDS)) {
        (None, None) => None,
        (Some(_), None) => Some(TxnType::Debit),
        (None, Some(_)) => Some(TxnType::Credit),
        (Some(d), Some(c)) if d <= c => Some(TxnType::Debit),
        (Some(_), Some(_)) => Some(TxnType::Credit),
    }
}

/// First strictly positive amount. Currency-marked figures are searched before
/// bare numbers, so "Txn of 2 items ... Rs 500" yields 500, not the first
/// number in the text. Keep that order: bare-first lets counts, account digits
/// and dates win.
pub fn extract_amount(body: &str) -> Option<f64> {
    let first_positive = |re: &Regex| {
        re.captures_iter(body)
            .filter_map(|c| c[1].replace(',', "").parse::<f64>().ok())
            .find(|v| v.is_finite() && *v > 0.0)
    };
    first_positive(currency_amount_re()).or_else(|| first_positive(bare_amount_re()))
}

fn clean_fragment(value: &str) -> String {
    let s = account_token_re().replace_all(value, " ");
    let s = disallowed_chars_re().replace_all(&s, " ");
    ws_re().replace_all(&s, " ").trim().to_string()
}

fn description_fragment(body: &str) -> Option<String> {
    description_res()
        .iter()
        .filter_map(|re| re.captures(body))
        .map(|c| clean_fragment(&c[1]))
        .find(|f| !f.is_empty())
}

/// `SMS - <merchant>` when the body names a counterparty, else `SMS - <sender> <Debit|Credit>`.
pub fn extract_description(body: &str, sender: &str, ty: TxnType) -> String {
    if let Some(fragment) = description_fragment(body) {
        return format!("SMS - {fragment}");
    }
    let sender = clean_fragment(sender);
    let sender = if sender.is_empty() { "Bank" } else { sender.as_str() };
    format!("SMS - {sender} {}", ty.label())
}

/// Turns alert messages into transactions. The timezone decides which
/// calendar day a message timestamp falls on.
#[derive(Debug, Clone)]
pub struct MessageParser {
    tz: Tz,
    now: Option<DateTime<Utc>>,
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Kolkata)
    }
}

impl MessageParser {
    pub fn new(tz: Tz) -> Self {
        Self { tz, now: None }
    }

    /// Pin "now" for messages with neither a body date nor a timestamp.
    pub fn at(self, now: DateTime<Utc>) -> Self {
        Self {
            now: Some(now),
            ..self
        }
    }

    pub fn extract_transaction(&self, message: &SmsMessage) -> Option<RawTransaction> {
        let body = message.body.as_str();
        let ty = detect_type(body)?;
        let amount = extract_amount(body)?;

        let signed = match ty {
            TxnType::Debit => -amount.abs(),
            TxnType::Credit => amount.abs(),
        };

        let date = extract_date_from_free_text(body).unwrap_or_else(|| {
            local_date_from_millis(
                message.timestamp,
                self.tz,
                self.now.unwrap_or_else(Utc::now),
            )
        });
        let description = extract_description(body, &message.sender, ty);

        Some(
            RawTransaction::new(date, description, signed, Category::from_sign(signed))
                .with_source(TransactionSource::Sms)
                .with_source_timestamp(message.timestamp),
        )
    }

    /// Filter, extract, and drop repeats of the same alert within the batch.
    pub fn parse_messages(&self, messages: &[SmsMessage]) -> Vec<RawTransaction> {
        let bank_messages = filter_bank_messages(messages);
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for message in &bank_messages {
            let Some(txn) = self.extract_transaction(message) else {
                trace!(sender = %message.sender, "not a transaction alert");
                continue;
            };
            if seen.insert(txn.fingerprint()) {
                out.push(txn);
            }
        }

        debug!(
            messages = messages.len(),
            bank_messages = bank_messages.len(),
            transactions = out.len(),
            "parsed sms batch"
        );
        out
    }
}

pub fn extract_transaction(message: &SmsMessage) -> Option<RawTransaction> {
    MessageParser::default().extract_transaction(message)
}

pub fn parse_sms_messages(messages: &[SmsMessage]) -> Vec<RawTransaction> {
    MessageParser::default().parse_messages(messages)
}

/// Apply an import window: drop empty bodies and messages older than the
/// cursor (undated ones survive only a full read), newest first, capped.
pub fn select_messages(messages: Vec<SmsMessage>, query: &MessageQuery) -> Vec<SmsMessage> {
    let min_date = query.min_date.max(0);
    let mut selected: Vec<SmsMessage> = messages
        .into_iter()
        .filter(|m| !m.body.is_empty())
        .filter(|m| {
            if m.timestamp == 0 {
                min_date == 0
            } else {
                m.timestamp >= min_date
            }
        })
        .collect();

    selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    selected.truncate(query.effective_limit());
    selected
}
