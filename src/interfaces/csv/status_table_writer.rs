use crate::application::engine::PaymentStatusTable;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// One CSV row per participant of a competition.
#[derive(Debug, Serialize, PartialEq)]
pub struct StatusRow<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    pub paid_matchdays: u32,
    pub pending_matchdays: u32,
    pub paid_amount: String,
    pub total_amount: String,
    pub remaining_amount: String,
}

/// Writes a payment status table as CSV.
///
/// Wraps `csv::Writer`; the header row is derived from [`StatusRow`].
/// Amounts are written with exactly two decimals.
pub struct StatusTableWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> StatusTableWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes every participant in roster order and flushes.
    pub fn write_table(&mut self, table: &PaymentStatusTable) -> Result<()> {
        for p in &table.participants {
            self.writer.serialize(StatusRow {
                user_id: &p.user_id,
                name: &p.name,
                paid_matchdays: p.summary.paid_count,
                pending_matchdays: p.summary.pending_count,
                paid_amount: cents(p.summary.paid_amount.value()),
                total_amount: cents(p.summary.total_amount.value()),
                remaining_amount: cents(p.summary.remaining_amount.value()),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn cents(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}
