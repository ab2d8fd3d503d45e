//! ledgerlens-core: transaction model, lexical helpers and the category classifier

pub mod categorizer;
pub mod lexical;
pub mod summary;
pub mod time;
pub mod transaction;

pub use categorizer::classify;
pub use lexical::{
    LexError, extract_date_from_free_text, format_dmy, is_date_token, is_money_token,
    parse_date_token, parse_money,
};
pub use summary::{CategoryTotal, Summary, summarize};
pub use transaction::{Category, EntryKind, RawTransaction, TransactionSource};
