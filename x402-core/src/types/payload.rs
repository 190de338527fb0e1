//! Upstream analytics payload.
//!
//! The proxy treats the upstream document as opaque JSON. The only structural
//! requirement is that the `data` field holds an array of rows; the body is
//! otherwise passed through untouched so clients see exactly what upstream sent.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::PAYLOAD_ROWS_FIELD;
use crate::error::{Result, X402Error};

/// A structurally validated upstream analytics document.
///
/// Every construction path, including deserialization of a blob read back
/// from a cache tier, goes through [`TryFrom<Value>`], so an instance always
/// carries an array-typed row collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct AnalyticsPayload {
    body: Value,
}

impl AnalyticsPayload {
    /// Parses raw bytes as JSON and validates the structure.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let body: Value = serde_json::from_slice(bytes)
            .map_err(|e| X402Error::InvalidPayload(format!("body is not JSON: {}", e)))?;
        Self::try_from(body)
    }

    /// Returns the document as received.
    pub fn as_value(&self) -> &Value {
        &self.body
    }

    /// Consumes the payload, returning the document.
    pub fn into_value(self) -> Value {
        self.body
    }

    /// Number of rows in the row collection.
    pub fn row_count(&self) -> usize {
        self.raw_rows().len()
    }

    /// Parses the rows into [`FacilitatorRow`]s.
    ///
    /// Structural validation does not look inside rows, so this can fail
    /// on a payload that was accepted and cached.
    pub fn rows(&self) -> Result<Vec<FacilitatorRow>> {
        self.raw_rows()
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                FacilitatorRow::deserialize(row)
                    .map_err(|e| X402Error::InvalidPayload(format!("row {}: {}", idx, e)))
            })
            .collect()
    }

    /// Aggregates rows per facilitator, largest volume first.
    pub fn totals_by_facilitator(&self) -> Result<Vec<FacilitatorTotals>> {
        let mut grouped: BTreeMap<String, FacilitatorTotals> = BTreeMap::new();

        for row in self.rows()? {
            let totals = grouped
                .entry(row.facilitator.clone())
                .or_insert_with(|| FacilitatorTotals::empty(&row.facilitator));
            totals.transactions += row.transactions;
            totals.volume += row.volume;
            totals.chains.insert(row.chain);
        }

        let mut totals: Vec<_> = grouped.into_values().collect();
        totals.sort_by(|a, b| {
            b.volume
                .total_cmp(&a.volume)
                .then_with(|| a.facilitator.cmp(&b.facilitator))
        });
        Ok(totals)
    }

    fn raw_rows(&self) -> &[Value] {
        self.body
            .get(PAYLOAD_ROWS_FIELD)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl TryFrom<Value> for AnalyticsPayload {
    type Error = X402Error;

    fn try_from(body: Value) -> Result<Self> {
        if !body.is_object() {
            return Err(X402Error::InvalidPayload("expected a JSON object".into()));
        }

        match body.get(PAYLOAD_ROWS_FIELD) {
            Some(Value::Array(_)) => Ok(Self { body }),
            Some(_) => Err(X402Error::InvalidPayload(format!(
                "`{}` is not an array",
                PAYLOAD_ROWS_FIELD
            ))),
            None => Err(X402Error::InvalidPayload(format!(
                "missing `{}` field",
                PAYLOAD_ROWS_FIELD
            ))),
        }
    }
}

impl From<AnalyticsPayload> for Value {
    fn from(payload: AnalyticsPayload) -> Self {
        payload.body
    }
}

/// One day of activity for one facilitator on one chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FacilitatorRow {
    /// Day bucket, as reported by upstream
    pub ts: String,
    /// Chain identifier (e.g. "base")
    pub chain: String,
    /// Facilitator identifier (e.g. "coinbase")
    pub facilitator: String,
    /// Settled transactions in the bucket
    pub transactions: u64,
    /// Settled volume in the bucket
    pub volume: f64,
}

/// Aggregated activity for one facilitator across all rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FacilitatorTotals {
    /// Facilitator identifier
    pub facilitator: String,
    /// Sum of transactions
    pub transactions: u64,
    /// Sum of volume
    pub volume: f64,
    /// Chains the facilitator settled on
    pub chains: BTreeSet<String>,
}

impl FacilitatorTotals {
    fn empty(facilitator: &str) -> Self {
        Self {
            facilitator: facilitator.to_string(),
            transactions: 0,
            volume: 0.0,
            chains: BTreeSet::new(),
        }
    }
}
