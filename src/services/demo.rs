//! Demo Book
//!
//! Seed data for the server and tests: a mixed securities and futures book,
//! multi-currency cash, listed contracts and an opening set of quotes.

use chrono::NaiveDate;

use crate::types::{
    CashBalance, ContractPosition, EquityPosition, FuturesContract, FuturesPosition, Position,
    PositionDirection, SecurityType,
};

/// Everything needed to publish a first snapshot.
#[derive(Debug, Clone)]
pub struct DemoBook {
    pub positions: Vec<Position>,
    pub cash_balances: Vec<CashBalance>,
    pub contracts: Vec<FuturesContract>,
    pub contract_positions: Vec<ContractPosition>,
    /// Opening quotes for every traded symbol
    pub quotes: Vec<(&'static str, f64)>,
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn contracts() -> Vec<FuturesContract> {
    vec![
        FuturesContract::new("ES", "E-mini S&P 500", 50.0, 0.25, 12.5, 0.06, date(2026, 12, 18), 4200.0),
        FuturesContract::new("NQ", "E-mini Nasdaq-100", 20.0, 0.25, 5.0, 0.07, date(2026, 12, 18), 15_800.0),
        FuturesContract::new("CL", "Crude Oil", 1000.0, 0.01, 10.0, 0.08, date(2026, 11, 20), 78.50),
        FuturesContract::new("GC", "Gold", 100.0, 0.10, 10.0, 0.05, date(2026, 12, 29), 1950.0),
    ]
}

fn equity(
    symbol: &str,
    name: &str,
    security_type: SecurityType,
    quantity: f64,
    buy_price: f64,
    acquired: NaiveDate,
    sector: &str,
) -> Position {
    let mut position = EquityPosition::new(symbol, name, security_type, quantity, buy_price, acquired);
    position.common.sector = Some(sector.to_string());
    position.common.country = Some("US".to_string());
    position.into()
}

/// Build the demo book with holding periods measured to `as_of`.
pub fn demo_book(as_of: NaiveDate) -> DemoBook {
    let contracts = contracts();
    let [es, nq, cl, gc] = [0, 1, 2, 3].map(|i| contracts[i].clone());

    let mut positions = vec![
        equity("AAPL", "Apple Inc.", SecurityType::Stock, 150.0, 145.30, date(2023, 3, 15), "Technology"),
        equity("MSFT", "Microsoft Corp.", SecurityType::Stock, 80.0, 285.00, date(2023, 6, 1), "Technology"),
        equity("SPY", "SPDR S&P 500 ETF", SecurityType::Etf, 100.0, 410.00, date(2024, 1, 10), "Broad Market"),
        equity("XOM", "Exxon Mobil Corp.", SecurityType::Stock, 120.0, 98.40, date(2024, 8, 5), "Energy"),
        equity("UST10", "US Treasury 10Y", SecurityType::Bond, 50.0, 96.25, date(2025, 2, 14), "Government"),
        equity("VFIAX", "Vanguard 500 Index Admiral", SecurityType::MutualFund, 40.0, 380.00, date(2022, 11, 30), "Broad Market"),
        FuturesPosition::from_contract(&es, "E-mini S&P 500 Dec", PositionDirection::Long, 2.0, 4200.0, 25_200.0, date(2026, 8, 3)).into(),
        FuturesPosition::from_contract(&cl, "Crude Oil Nov", PositionDirection::Short, 3.0, 78.50, 18_840.0, date(2026, 9, 14)).into(),
        FuturesPosition::from_contract(&gc, "Gold Dec", PositionDirection::Long, 1.0, 1950.0, 9_750.0, date(2026, 7, 21)).into(),
    ];
    for position in &mut positions {
        position.common_mut().refresh_holding_period(as_of);
    }

    DemoBook {
        positions,
        cash_balances: vec![
            CashBalance::new("USD", 50_000.0, 1.0),
            CashBalance::new("JPY", 2_000_000.0, 0.00675),
            CashBalance::new("EUR", 5_000.0, 1.08),
            CashBalance::new("GBP", 600.0, 1.25),
        ],
        contract_positions: vec![
            ContractPosition::open(&nq, PositionDirection::Long, 1.0, 15_800.0, 22_120.0),
            ContractPosition::open(&es, PositionDirection::Short, 1.0, 4280.0, 12_840.0),
        ],
        contracts,
        quotes: vec![
            ("AAPL", 178.50),
            ("MSFT", 338.20),
            ("SPY", 445.80),
            ("XOM", 104.10),
            ("UST10", 94.80),
            ("VFIAX", 412.35),
            ("ES", 4250.0),
            ("NQ", 15_950.0),
            ("CL", 76.20),
            ("GC", 1985.0),
        ],
    }
}
