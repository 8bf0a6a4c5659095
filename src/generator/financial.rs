//! Financial module generator.
//!
//! Watchlist prices follow seeded random walks (stocks ~0.1% per 5-minute
//! step, crypto ~0.2%). A scripted transaction list anchored to meal and
//! commute times drives a sliding window of the three most recent completed
//! transactions; the balance decrements as they post and the
//! spend-versus-budget summary recomputes. Pending charges are static.
//! Markets keep walking through and after the crisis.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use super::schedule::PersonSchedule;
use super::util::round_to;
use super::GeneratorError;
use crate::scenario::types::{FinancialSnapshot, PendingCharge, TickerQuote, Transaction};

/// Stock watchlist symbols with their per-scenario starting price ranges.
const STOCKS: [(&str, f64, f64); 3] = [
    ("NVAX", 84.0, 96.0),
    ("HLCN", 212.0, 238.0),
    ("RIVT", 41.0, 49.0),
];

/// Crypto watchlist symbols with starting price ranges.
const CRYPTO: [(&str, f64, f64); 2] = [("BTC", 96_000.0, 118_000.0), ("ETH", 5_100.0, 6_400.0)];

/// Per-step volatility: 0.1% for stocks, 0.2% for crypto.
const STOCK_VOL: f64 = 0.001;
const CRYPTO_VOL: f64 = 0.002;

/// Weekly discretionary budget used by the summary string.
const WEEKLY_BUDGET: f64 = 320.0;

/// Stateful financial generator; one instance per scenario.
#[derive(Debug)]
pub struct FinancialGenerator {
    stock_prices: Vec<f64>,
    crypto_prices: Vec<f64>,
    opening_balance: f64,
    week_spent_before_today: f64,
    transactions: Vec<Transaction>,
    pending: Vec<PendingCharge>,
}

impl FinancialGenerator {
    /// Per-scenario setup: draws opening balance, prior-week spend, and one
    /// starting price per watchlist symbol.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidDate`] if a scripted transaction
    /// time cannot be represented.
    pub fn new(sched: &PersonSchedule, rng: &mut StdRng) -> Result<Self, GeneratorError> {
        let opening_balance = round_to(rng.gen_range(2_600.0..3_400.0), 2);
        let week_spent_before_today = round_to(rng.gen_range(96.0..170.0), 2);
        let stock_prices = STOCKS
            .iter()
            .map(|(_, lo, hi)| rng.gen_range(*lo..*hi))
            .collect();
        let crypto_prices = CRYPTO
            .iter()
            .map(|(_, lo, hi)| rng.gen_range(*lo..*hi))
            .collect();

        let date = sched.scenario_date();
        let at = |day_offset: i64, hour: u32, minute: u32| -> Result<DateTime<Utc>, GeneratorError> {
            let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
                GeneratorError::InvalidDate(format!(
                    "invalid transaction time {hour:02}:{minute:02}"
                ))
            })?;
            let base = Utc.from_utc_datetime(&date.and_time(time));
            base.checked_add_signed(Duration::days(day_offset))
                .ok_or_else(|| GeneratorError::InvalidDate("transaction date overflow".to_owned()))
        };

        let txn = |merchant: &str, amount: f64, time: DateTime<Utc>| Transaction {
            merchant: merchant.to_owned(),
            amount,
            time,
        };

        // Yesterday's tail plus today's meal- and commute-anchored card
        // activity. The window always has three completed transactions to
        // show.
        let transactions = vec![
            txn("Hartley's Grocery", 62.10, at(-1, 18, 20)?),
            txn("Cedar Pharmacy", 18.45, at(-1, 19, 5)?),
            txn("StreamBox", 11.99, at(-1, 21, 0)?),
            txn("Ridge Roasters", 5.40, at(0, 6, 55)?),
            txn("Metro Transit", 2.75, at(0, 7, 32)?),
            txn("Verdant Bowls", 14.20, at(0, 12, 38)?),
            txn("Metro Transit", 2.75, at(0, 17, 2)?),
        ];

        let pending = vec![
            PendingCharge {
                merchant: "Atlas Cloud".to_owned(),
                amount: 24.00,
            },
            PendingCharge {
                merchant: "Cascade Fitness".to_owned(),
                amount: 49.00,
            },
        ];

        Ok(Self {
            stock_prices,
            crypto_prices,
            opening_balance,
            week_spent_before_today,
            transactions,
            pending,
        })
    }

    /// Produce the financial view for one heartbeat. Consumes exactly one
    /// draw per watchlist symbol.
    pub fn generate(&mut self, timestamp: DateTime<Utc>, rng: &mut StdRng) -> FinancialSnapshot {
        for price in &mut self.stock_prices {
            let step: f64 = rng.gen_range(-1.0..1.0);
            *price *= 1.0 + step * STOCK_VOL;
        }
        for price in &mut self.crypto_prices {
            let step: f64 = rng.gen_range(-1.0..1.0);
            *price *= 1.0 + step * CRYPTO_VOL;
        }

        let posted: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|t| t.time <= timestamp)
            .collect();

        let mut recent: Vec<Transaction> = posted.iter().rev().take(3).map(|t| (*t).clone()).collect();
        recent.sort_by(|a, b| b.time.cmp(&a.time));

        let spent_today: f64 = posted
            .iter()
            .filter(|t| t.time >= day_start(timestamp))
            .map(|t| t.amount)
            .sum();

        let account_balance = round_to(self.opening_balance - spent_today, 2);
        let week_spent = round_to(self.week_spent_before_today + spent_today, 2);

        let stock_watchlist = STOCKS
            .iter()
            .zip(&self.stock_prices)
            .map(|((symbol, _, _), price)| TickerQuote {
                symbol: (*symbol).to_owned(),
                price: round_to(*price, 2),
            })
            .collect();
        let crypto_watchlist = CRYPTO
            .iter()
            .zip(&self.crypto_prices)
            .map(|((symbol, _, _), price)| TickerQuote {
                symbol: (*symbol).to_owned(),
                price: round_to(*price, 2),
            })
            .collect();

        FinancialSnapshot {
            recent_transactions: recent,
            account_balance,
            pending_charges: self.pending.clone(),
            stock_watchlist,
            crypto_watchlist,
            budget_summary: format!(
                "Discretionary spend this week: ${week_spent:.2} of ${WEEKLY_BUDGET:.2}"
            ),
        }
    }
}

/// Midnight at the start of the timestamp's day.
fn day_start(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&timestamp.date_naive().and_time(NaiveTime::MIN))
}
