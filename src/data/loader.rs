//! Record table ingestion: CSV parsing, per-symbol label chaining and a
//! synthetic generator for data-free runs.

use crate::data::record::FinancialRecord;
use crate::error::EngineError;
use csv::StringRecord;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use std::collections::BTreeMap;
use std::path::Path;

/// Columns expected in the source table, `Date` and `Symbol` included.
const COLUMNS: usize = 25;

/// Load the monthly record table from a CSV file.
///
/// Rows are grouped per symbol, sorted chronologically, and each
/// record's `next_period_price` is chained from its successor (the last
/// record of a symbol keeps its own price). Empty or `NA` numeric
/// fields become 0.0; anything else that fails to parse is an error.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<FinancialRecord>, EngineError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut by_symbol: BTreeMap<String, Vec<FinancialRecord>> = BTreeMap::new();

    for (index, row) in reader.records().enumerate() {
        let row = row?;
        // header occupies line 1
        let line = index + 2;
        let record = parse_row(&row, line)?;
        by_symbol.entry(record.symbol.clone()).or_default().push(record);
    }

    Ok(chain_labels(by_symbol))
}

fn parse_row(row: &StringRecord, line: usize) -> Result<FinancialRecord, EngineError> {
    if row.len() != COLUMNS {
        return Err(EngineError::MalformedRecord {
            line,
            reason: format!("expected {} columns, found {}", COLUMNS, row.len()),
        });
    }

    let numeric = |index: usize| -> Result<f64, EngineError> {
        let raw = row[index].trim();
        if raw.is_empty() || raw == "NA" {
            return Ok(0.0);
        }
        raw.parse().map_err(|_| EngineError::MalformedRecord {
            line,
            reason: format!("column {} is not a number: {:?}", index, raw),
        })
    };

    Ok(FinancialRecord {
        date: row[0].trim().to_string(),
        symbol: clean_symbol(row[1].trim()),
        price: numeric(2)?,
        // filled by chain_labels
        next_period_price: 0.0,
        interest_rate: numeric(3)?,
        unemployment_rate: numeric(4)?,
        inflation: numeric(5)?,
        growth_rate: numeric(6)?,
        consumer_sentiment: numeric(7)?,
        sector_sentiment: numeric(8)?,
        sales_figures: numeric(9)?,
        gross_margin: numeric(10)?,
        self_financing_capacity: numeric(11)?,
        net_income: numeric(12)?,
        profit_per_share: numeric(13)?,
        free_cash_flow: numeric(14)?,
        net_debt_to_equity: numeric(15)?,
        roa: numeric(16)?,
        ebitda: numeric(17)?,
        pricing_dcf: numeric(18)?,
        sharpe_ratio: numeric(19)?,
        cagr: numeric(20)?,
        var: numeric(21)?,
        cvar: numeric(22)?,
        beta: numeric(23)?,
        dividend_yield: numeric(24)?,
    })
}

/// Some exports prefix the ticker with a date (`202401_AAPL`); keep the
/// part after the underscore.
fn clean_symbol(raw: &str) -> String {
    match raw.find('_') {
        Some(pos) => raw[pos + 1..].to_string(),
        None => raw.to_string(),
    }
}

/// Sort each symbol's records by date and fill the next-period label.
fn chain_labels(by_symbol: BTreeMap<String, Vec<FinancialRecord>>) -> Vec<FinancialRecord> {
    let mut out = Vec::new();

    for (_, mut records) in by_symbol {
        records.sort_by(|a, b| a.date.cmp(&b.date));

        for i in 0..records.len() {
            records[i].next_period_price = if i + 1 < records.len() {
                records[i + 1].price
            } else {
                records[i].price
            };
        }
        out.extend(records);
    }
    out
}

/// Generate a synthetic record table: every feature uniform in [0, 1),
/// prices following a positive random walk. Labels are chained exactly
/// like loaded data.
pub fn synthetic_records(
    symbols: &[&str],
    months: usize,
    rng: &mut StdRng,
) -> Vec<FinancialRecord> {
    let feature = Uniform::new(0.0, 1.0);
    let mut by_symbol: BTreeMap<String, Vec<FinancialRecord>> = BTreeMap::new();

    for &symbol in symbols {
        let mut price = 100.0 * (1.0 + rng.gen::<f64>());
        let mut date = 202001;

        let mut records = Vec::with_capacity(months);
        for _ in 0..months {
            records.push(FinancialRecord {
                date: date.to_string(),
                symbol: symbol.to_string(),
                price,
                next_period_price: 0.0,
                interest_rate: feature.sample(rng),
                unemployment_rate: feature.sample(rng),
                inflation: feature.sample(rng),
                growth_rate: feature.sample(rng),
                consumer_sentiment: feature.sample(rng),
                sales_figures: feature.sample(rng),
                gross_margin: feature.sample(rng),
                self_financing_capacity: feature.sample(rng),
                net_income: feature.sample(rng),
                profit_per_share: feature.sample(rng),
                free_cash_flow: feature.sample(rng),
                net_debt_to_equity: feature.sample(rng),
                roa: feature.sample(rng),
                ebitda: feature.sample(rng),
                sector_sentiment: feature.sample(rng),
                pricing_dcf: feature.sample(rng),
                sharpe_ratio: feature.sample(rng),
                cagr: feature.sample(rng),
                var: feature.sample(rng),
                cvar: feature.sample(rng),
                beta: feature.sample(rng),
                dividend_yield: feature.sample(rng),
            });

            price *= 1.0 + (rng.gen::<f64>() - 0.5) * 0.2;
            date = next_month(date);
        }
        by_symbol.insert(symbol.to_string(), records);
    }

    chain_labels(by_symbol)
}

fn next_month(date: u32) -> u32 {
    let year = date / 100;
    let month = date % 100;
    if month == 12 {
        (year + 1) * 100 + 1
    } else {
        date + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::io::Write;

    const HEADER: &str = "Date,Symbol,Stock Price,Interest Rate,Unemployment Rate,Inflation,\
Growth Rate,Consumer Sentiment,Sector Sentiment,Sales Figures,Gross Margin,\
Self Financing Capacity,Net Income,Profit Per Share,Free Cash Flow,Net Debt to Equity,\
ROA,EBITDA,Pricing DCF,Sharpe Ratio,CAGR,VaR,CVaR,Beta,Dividend Yield";

    fn row(date: &str, symbol: &str, price: &str) -> String {
        let tail: Vec<&str> = std::iter::repeat("1.0").take(22).collect();
        format!("{},{},{},{}", date, symbol, price, tail.join(","))
    }

    fn write_csv(name: &str, lines: &[String]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn chains_labels_in_date_order() {
        let path = write_csv(
            "ltc_loader_chain.csv",
            &[
                // deliberately out of order
                row("202403", "AAPL", "120.0"),
                row("202401", "AAPL", "100.0"),
                row("202402", "AAPL", "110.0"),
            ],
        );
        let records = load_records(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].date, "202401");
        assert_eq!(records[0].next_period_price, 110.0);
        assert_eq!(records[1].next_period_price, 120.0);
        // last record keeps its own price
        assert_eq!(records[2].next_period_price, 120.0);
    }

    #[test]
    fn missing_values_become_zero() {
        let path = write_csv(
            "ltc_loader_missing.csv",
            &[format!(
                "202401,AAPL,NA,{}",
                std::iter::repeat("").take(22).collect::<Vec<_>>().join(",")
            )],
        );
        let records = load_records(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(records[0].price, 0.0);
        assert_eq!(records[0].interest_rate, 0.0);
        assert_eq!(records[0].dividend_yield, 0.0);
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        let path = write_csv("ltc_loader_bad.csv", &[row("202401", "AAPL", "abc")]);
        let result = load_records(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            result,
            Err(EngineError::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn prefixed_symbols_are_cleaned() {
        let path = write_csv("ltc_loader_symbol.csv", &[row("202401", "202401_MSFT", "10.0")]);
        let records = load_records(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(records[0].symbol, "MSFT");
    }

    #[test]
    fn synthetic_table_is_chained_and_finite() {
        let mut rng = StdRng::seed_from_u64(3);
        let records = synthetic_records(&["AAA", "BBB"], 6, &mut rng);

        assert_eq!(records.len(), 12);
        for pair in records.chunks(6) {
            for i in 0..pair.len() - 1 {
                assert_eq!(pair[i].symbol, pair[i + 1].symbol);
                assert_eq!(pair[i].next_period_price, pair[i + 1].price);
            }
        }
        assert!(records.iter().all(|r| r.price.is_finite() && r.price > 0.0));
    }

    #[test]
    fn month_rollover() {
        assert_eq!(next_month(202012), 202101);
        assert_eq!(next_month(202001), 202002);
    }
}
