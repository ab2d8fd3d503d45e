//! Spending summary: income/expense totals and a per-category expense breakdown.

use serde::Serialize;
use std::collections::HashMap;

use crate::transaction::{Category, RawTransaction};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    /// Absolute expense amount
    pub total: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    pub total_income: f64,
    /// Absolute value of all debits
    pub total_expenses: f64,
    pub net_savings: f64,
    /// Percent of income kept; 0 when there is no income
    pub savings_rate: f64,
    /// Largest category first
    pub breakdown: Vec<CategoryTotal>,
}

pub fn summarize(txns: &[RawTransaction]) -> Summary {
    let total_income: f64 = txns.iter().filter(|t| t.is_income()).map(|t| t.amount).sum();
    let total_expenses: f64 = txns
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.abs_amount())
        .sum();
    let net_savings = total_income - total_expenses;
    let savings_rate = if total_income > 0.0 {
        net_savings / total_income * 100.0
    } else {
        0.0
    };

    let mut groups: HashMap<Category, (f64, usize)> = HashMap::new();
    for t in txns.iter().filter(|t| t.is_expense()) {
        let entry = groups.entry(t.category).or_insert((0.0, 0));
        entry.0 += t.abs_amount();
        entry.1 += 1;
    }

    let mut breakdown: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(category, (total, transaction_count))| CategoryTotal {
            category,
            total,
            transaction_count,
        })
        .collect();

    // Ties broken by taxonomy order so output is stable
    breakdown.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });

    Summary {
        total_income,
        total_expenses,
        net_savings,
        savings_rate,
        breakdown,
    }
}
