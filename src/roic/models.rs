// src/roic/models.rs
use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level page grouping on the site; one page load serves every category
/// of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FinancialType {
    Financials,
    Ratios,
}

impl FinancialType {
    pub const ALL: [FinancialType; 2] = [FinancialType::Financials, FinancialType::Ratios];

    /// Path segment used both in the site URL and the output layout.
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialType::Financials => "financials",
            FinancialType::Ratios => "ratios",
        }
    }

    pub fn categories(&self) -> &'static [Category] {
        match self {
            FinancialType::Financials => &[Category::Income, Category::BalanceSheet, Category::CashFlow],
            FinancialType::Ratios => &[
                Category::Profitability,
                Category::Credit,
                Category::Liquidity,
                Category::WorkingCapital,
                Category::EnterpriseValue,
                Category::Multiples,
                Category::PerShare,
            ],
        }
    }
}

impl fmt::Display for FinancialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported table on a group page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Income,
    BalanceSheet,
    CashFlow,
    Profitability,
    Credit,
    Liquidity,
    WorkingCapital,
    EnterpriseValue,
    Multiples,
    PerShare,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Income,
        Category::BalanceSheet,
        Category::CashFlow,
        Category::Profitability,
        Category::Credit,
        Category::Liquidity,
        Category::WorkingCapital,
        Category::EnterpriseValue,
        Category::Multiples,
        Category::PerShare,
    ];

    /// File stem of the category's CSV.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::BalanceSheet => "balance_sheet",
            Category::CashFlow => "cash_flow",
            Category::Profitability => "profitability",
            Category::Credit => "credit",
            Category::Liquidity => "liquidity",
            Category::WorkingCapital => "working_capital",
            Category::EnterpriseValue => "enterprise_value",
            Category::Multiples => "multiples",
            Category::PerShare => "per_share",
        }
    }

    pub fn financial_type(&self) -> FinancialType {
        match self {
            Category::Income | Category::BalanceSheet | Category::CashFlow => FinancialType::Financials,
            _ => FinancialType::Ratios,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting period, sent to the site as the `fs` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Annual,
    Quarterly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Annual => "annual",
            Period::Quarterly => "quarterly",
        }
    }
}

/// Year labels plus metric rows for one (ticker, category) table.
/// Built once, handed to storage, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDataset {
    pub years: Vec<String>,
    pub rows: Vec<MetricRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow {
    pub name: String,
    pub values: Vec<String>,
}
