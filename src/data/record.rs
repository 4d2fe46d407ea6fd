//! Monthly per-company record and its fixed feature grouping.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// One snapshot of a traded company for a given month. Produced by the
/// ingestion layer; the training engine reads it as three fixed feature
/// groups plus the price pair driving the reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    /// Month in `YYYYMM` form; lexicographic order is chronological order
    pub date: String,
    pub symbol: String,

    /// Adjusted close for the month; 0.0 means the value was missing
    pub price: f64,
    /// Next month's price for the same symbol, or `price` for the last
    /// record of a symbol. Filled in by the loader, never by the source.
    pub next_period_price: f64,

    // Macro group
    pub interest_rate: f64,
    pub unemployment_rate: f64,
    pub inflation: f64,
    pub growth_rate: f64,
    pub consumer_sentiment: f64,

    // Accounting group
    pub sales_figures: f64,
    pub gross_margin: f64,
    pub self_financing_capacity: f64,
    pub net_income: f64,
    pub profit_per_share: f64,
    pub free_cash_flow: f64,
    pub net_debt_to_equity: f64,
    pub roa: f64,
    pub ebitda: f64,

    // Market group
    pub sector_sentiment: f64,
    pub pricing_dcf: f64,
    pub sharpe_ratio: f64,
    pub cagr: f64,
    pub var: f64,
    pub cvar: f64,
    pub beta: f64,
    pub dividend_yield: f64,
}

/// Number of features in the macro group.
pub const MACRO_FEATURES: usize = 5;
/// Number of features in the accounting group.
pub const ACCOUNTING_FEATURES: usize = 9;
/// Number of features in the market group.
pub const MARKET_FEATURES: usize = 8;

impl FinancialRecord {
    /// Macroeconomic features, in fixed order.
    pub fn macro_features(&self) -> Array1<f64> {
        Array1::from_vec(vec![
            self.interest_rate,
            self.unemployment_rate,
            self.inflation,
            self.growth_rate,
            self.consumer_sentiment,
        ])
    }

    /// Company accounting features, in fixed order.
    pub fn accounting_features(&self) -> Array1<f64> {
        Array1::from_vec(vec![
            self.sales_figures,
            self.gross_margin,
            self.self_financing_capacity,
            self.net_income,
            self.profit_per_share,
            self.free_cash_flow,
            self.net_debt_to_equity,
            self.roa,
            self.ebitda,
        ])
    }

    /// Market and risk/performance features, in fixed order. The price
    /// itself belongs to no group; it only feeds the reward.
    pub fn market_features(&self) -> Array1<f64> {
        Array1::from_vec(vec![
            self.sector_sentiment,
            self.pricing_dcf,
            self.sharpe_ratio,
            self.cagr,
            self.var,
            self.cvar,
            self.beta,
            self.dividend_yield,
        ])
    }
}

/// Accessor/mutator pair for one numeric field, used by the
/// normalization pass to iterate the record without reflection.
pub struct FieldDescriptor {
    pub name: &'static str,
    pub get: fn(&FinancialRecord) -> f64,
    pub set: fn(&mut FinancialRecord, f64),
}

/// Every numeric field of the record, label included, in source-column
/// order. Standardization runs over this list.
pub const NUMERIC_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "price",
        get: |r| r.price,
        set: |r, v| r.price = v,
    },
    FieldDescriptor {
        name: "next_period_price",
        get: |r| r.next_period_price,
        set: |r, v| r.next_period_price = v,
    },
    FieldDescriptor {
        name: "interest_rate",
        get: |r| r.interest_rate,
        set: |r, v| r.interest_rate = v,
    },
    FieldDescriptor {
        name: "unemployment_rate",
        get: |r| r.unemployment_rate,
        set: |r, v| r.unemployment_rate = v,
    },
    FieldDescriptor {
        name: "inflation",
        get: |r| r.inflation,
        set: |r, v| r.inflation = v,
    },
    FieldDescriptor {
        name: "growth_rate",
        get: |r| r.growth_rate,
        set: |r, v| r.growth_rate = v,
    },
    FieldDescriptor {
        name: "consumer_sentiment",
        get: |r| r.consumer_sentiment,
        set: |r, v| r.consumer_sentiment = v,
    },
    FieldDescriptor {
        name: "sector_sentiment",
        get: |r| r.sector_sentiment,
        set: |r, v| r.sector_sentiment = v,
    },
    FieldDescriptor {
        name: "sales_figures",
        get: |r| r.sales_figures,
        set: |r, v| r.sales_figures = v,
    },
    FieldDescriptor {
        name: "gross_margin",
        get: |r| r.gross_margin,
        set: |r, v| r.gross_margin = v,
    },
    FieldDescriptor {
        name: "self_financing_capacity",
        get: |r| r.self_financing_capacity,
        set: |r, v| r.self_financing_capacity = v,
    },
    FieldDescriptor {
        name: "net_income",
        get: |r| r.net_income,
        set: |r, v| r.net_income = v,
    },
    FieldDescriptor {
        name: "profit_per_share",
        get: |r| r.profit_per_share,
        set: |r, v| r.profit_per_share = v,
    },
    FieldDescriptor {
        name: "free_cash_flow",
        get: |r| r.free_cash_flow,
        set: |r, v| r.free_cash_flow = v,
    },
    FieldDescriptor {
        name: "net_debt_to_equity",
        get: |r| r.net_debt_to_equity,
        set: |r, v| r.net_debt_to_equity = v,
    },
    FieldDescriptor {
        name: "roa",
        get: |r| r.roa,
        set: |r, v| r.roa = v,
    },
    FieldDescriptor {
        name: "ebitda",
        get: |r| r.ebitda,
        set: |r, v| r.ebitda = v,
    },
    FieldDescriptor {
        name: "pricing_dcf",
        get: |r| r.pricing_dcf,
        set: |r, v| r.pricing_dcf = v,
    },
    FieldDescriptor {
        name: "sharpe_ratio",
        get: |r| r.sharpe_ratio,
        set: |r, v| r.sharpe_ratio = v,
    },
    FieldDescriptor {
        name: "cagr",
        get: |r| r.cagr,
        set: |r, v| r.cagr = v,
    },
    FieldDescriptor {
        name: "var",
        get: |r| r.var,
        set: |r, v| r.var = v,
    },
    FieldDescriptor {
        name: "cvar",
        get: |r| r.cvar,
        set: |r, v| r.cvar = v,
    },
    FieldDescriptor {
        name: "beta",
        get: |r| r.beta,
        set: |r, v| r.beta = v,
    },
    FieldDescriptor {
        name: "dividend_yield",
        get: |r| r.dividend_yield,
        set: |r, v| r.dividend_yield = v,
    },
];
