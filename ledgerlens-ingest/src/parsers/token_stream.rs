//! Bank statement parser over a document's text-layer token stream.
//!
//! Expected token sequence (one fragment per token, page order):
//!   01/02/2024  Coffee  Shop  250.00  0.00  9,750.00
//!   DATE        DESCRIPTION...  DEBIT  CREDIT  BALANCE
//!
//! Token positions within a line are lost by the extractor, so rows are
//! rebuilt purely from sequence: a date starts a row, text runs until the
//! first money token, then debit and credit columns, then the balance.

use ledgerlens_core::{
    RawTransaction, TransactionSource, classify, is_date_token, is_money_token, parse_date_token,
    parse_money,
};
use chrono::NaiveDate;
use tracing::{debug, trace};

/// A positional row candidate, before acceptance and signing
#[derive(Debug, Clone, PartialEq)]
pub struct StatementRow {
    pub date: NaiveDate,
    pub description: String,
    pub debit: f64,
    pub credit: f64,
    pub balance: Option<f64>,
}

impl StatementRow {
    /// Credit column wins when nonzero, otherwise the debit is spent money.
    pub fn signed_amount(&self) -> f64 {
        if self.credit > 0.0 {
            self.credit
        } else {
            -self.debit
        }
    }
}

/// Decides whether a positional row is a real transaction or incidental numeric text.
pub trait RowAcceptance {
    fn accept(&self, row: &StatementRow) -> bool;
}

/// Accept only rows followed by a running balance.
///
/// Layout heuristic: in the supported statement format every transaction row
/// ends with a balance column, while summary blocks and footers do not.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireBalance;

impl RowAcceptance for RequireBalance {
    fn accept(&self, row: &StatementRow) -> bool {
        row.balance.is_some()
    }
}

impl<F> RowAcceptance for F
where
    F: Fn(&StatementRow) -> bool,
{
    fn accept(&self, row: &StatementRow) -> bool {
        self(row)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TokenStreamParser<A = RequireBalance> {
    acceptance: A,
}

impl TokenStreamParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A: RowAcceptance> TokenStreamParser<A> {
    pub fn with_acceptance(acceptance: A) -> Self {
        Self { acceptance }
    }

    /// Scan `tokens` left to right and return every accepted row.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<RawTransaction> {
        let n = tokens.len();
        let tok = |i: usize| tokens[i].as_ref();

        let mut out = Vec::new();
        let mut discarded = 0usize;
        let mut i = 0;

        while i < n {
            if !is_date_token(tok(i)) {
                i += 1;
                continue;
            }
            // Date-shaped but not a real day: not a row start
            let Some(date) = parse_date_token(tok(i)) else {
                i += 1;
                continue;
            };
            i += 1;

            let desc_start = i;
            while i < n && !is_money_token(tok(i)) {
                i += 1;
            }

            // Need both the debit and the credit column
            if i + 1 >= n {
                trace!(%date, "token stream ended mid-row");
                break;
            }

            let description = tokens[desc_start..i]
                .iter()
                .map(|t| t.as_ref())
                .collect::<Vec<_>>()
                .join(" ");
            let debit = money(tok(i));
            let credit = money(tok(i + 1));
            i += 2;

            let balance = if i < n && is_money_token(tok(i)) {
                let b = money(tok(i));
                i += 1;
                b
            } else {
                None
            };

            let (Some(debit), Some(credit)) = (debit, credit) else {
                trace!(%date, "debit/credit columns are not amounts");
                discarded += 1;
                continue;
            };

            let row = StatementRow {
                date,
                description: description.trim().to_string(),
                debit,
                credit,
                balance,
            };

            if !self.acceptance.accept(&row) {
                trace!(%date, description = %row.description, "row rejected");
                discarded += 1;
                continue;
            }

            let amount = row.signed_amount();
            if amount == 0.0 {
                discarded += 1;
                continue;
            }

            let category = classify(&row.description);
            let mut txn = RawTransaction::new(row.date, row.description, amount, category)
                .with_source(TransactionSource::Statement);
            if let Some(b) = row.balance {
                txn = txn.with_balance(b);
            }
            out.push(txn);
        }

        debug!(tokens = n, rows = out.len(), discarded, "parsed statement token stream");
        out
    }
}

fn money(token: &str) -> Option<f64> {
    if !is_money_token(token) {
        return None;
    }
    parse_money(token).ok()
}

/// Parse with the default balance-required row rule.
pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<RawTransaction> {
    TokenStreamParser::new().parse(tokens)
}

/// Split a text-layer dump (one extracted fragment per line) into the token stream.
pub fn tokens_from_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
