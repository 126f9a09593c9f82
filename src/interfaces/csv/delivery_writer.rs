use crate::domain::message::{HEADER_DESTINATION, HEADER_SOURCE};
use crate::error::Result;
use crate::infrastructure::channel::Delivery;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct DeliveryRecord<'a> {
    peer: &'a str,
    method: &'a str,
    path: String,
    source: Option<&'a str>,
    destination: Option<&'a str>,
    amount: Option<Decimal>,
    currency: Option<&'a str>,
}

impl<'a> From<&'a Delivery> for DeliveryRecord<'a> {
    fn from(delivery: &'a Delivery) -> Self {
        let request = &delivery.request;
        let money = request.body.amount();
        Self {
            peer: &delivery.peer_id,
            method: request.method(),
            path: request.path(),
            source: request.header(HEADER_SOURCE),
            destination: request.header(HEADER_DESTINATION),
            amount: money.map(|m| m.amount.normalize()),
            currency: money.map(|m| m.currency.as_str()),
        }
    }
}

/// Writes the requests the switch delivered to its peers as CSV, one row per
/// delivery in delivery order.
pub struct DeliveryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> DeliveryWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink),
        }
    }

    /// Writes the header row. Called once before any delivery so an empty
    /// report still names its columns.
    pub fn write_header(&mut self) -> Result<()> {
        self.writer.write_record([
            "peer",
            "method",
            "path",
            "source",
            "destination",
            "amount",
            "currency",
        ])?;
        Ok(())
    }

    pub fn write_delivery(&mut self, delivery: &Delivery) -> Result<()> {
        self.writer.serialize(DeliveryRecord::from(delivery))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
