//! ledgerlens-ingest: statement token-stream and SMS alert parsers.

pub mod parsers;
pub mod types;

pub use parsers::sms::{
    MessageParser, TxnType, extract_transaction, filter_bank_messages, parse_sms_messages,
    select_messages,
};
pub use parsers::token_stream::{
    RequireBalance, RowAcceptance, StatementRow, TokenStreamParser, parse_tokens, tokens_from_text,
};
pub use types::{MAX_MESSAGE_LIMIT, MessageBatch, MessageQuery, SmsMessage};
