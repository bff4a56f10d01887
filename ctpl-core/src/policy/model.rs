//! Policy records: inbound payload, normalized fields and outbound rows.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::dates::{format_date, format_timestamp, validate_date};
use super::normalize::{normalize_text, parse_decimal, parse_money, parse_year};
use super::premium::{DEFAULT_AUTH_FEE, PremiumBreakdown};
use crate::store::{Row, StoreError};

/// Store-assigned policy identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(pub i64);

impl PolicyId {
    /// Parse a path segment as a policy id
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse().ok().map(Self)
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request body for create and update.
///
/// Every field is optional and loosely typed; [`PolicyFields`] does the
/// coercion. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyPayload {
    pub assured: Option<Value>,
    pub address: Option<Value>,
    pub coc_number: Option<Value>,
    pub or_number: Option<Value>,
    pub policy_number: Option<Value>,
    pub policy_type: Option<Value>,
    pub policy_year: Option<Value>,
    pub date_issued: Option<Value>,
    pub date_received: Option<Value>,
    pub insurance_from_date: Option<Value>,
    pub insurance_to_date: Option<Value>,
    pub model: Option<Value>,
    pub make: Option<Value>,
    pub body_type: Option<Value>,
    pub color: Option<Value>,
    pub mv_file_no: Option<Value>,
    pub plate_no: Option<Value>,
    pub chassis_no: Option<Value>,
    pub motor_no: Option<Value>,
    pub premium: Option<Value>,
    pub other_charges: Option<Value>,
    pub auth_fee: Option<Value>,
    pub doc_stamps: Option<Value>,
    pub e_vat: Option<Value>,
    pub lgt: Option<Value>,
    pub total_premium: Option<Value>,
}

/// Normalized column values written to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyFields {
    pub assured: String,
    pub address: String,
    pub coc_number: String,
    pub or_number: String,
    pub policy_number: String,
    pub policy_type: String,
    pub policy_year: i32,
    pub date_issued: Option<String>,
    pub date_received: Option<String>,
    pub insurance_from_date: Option<String>,
    pub insurance_to_date: Option<String>,
    pub model: String,
    pub make: String,
    pub body_type: String,
    pub color: String,
    pub mv_file_no: String,
    pub plate_no: String,
    pub chassis_no: String,
    pub motor_no: String,
    pub premium: f64,
    pub other_charges: f64,
    pub auth_fee: f64,
    pub doc_stamps: f64,
    pub e_vat: f64,
    pub lgt: f64,
    pub total_premium: f64,
}

impl PolicyFields {
    /// Shared normalization; derived amounts start at zero.
    fn base(p: &PolicyPayload) -> Self {
        Self {
            assured: normalize_text(p.assured.as_ref()),
            address: normalize_text(p.address.as_ref()),
            coc_number: normalize_text(p.coc_number.as_ref()),
            or_number: normalize_text(p.or_number.as_ref()),
            policy_number: normalize_text(p.policy_number.as_ref()),
            policy_type: normalize_text(p.policy_type.as_ref()),
            policy_year: parse_year(p.policy_year.as_ref()),
            date_issued: validate_date(p.date_issued.as_ref()),
            date_received: validate_date(p.date_received.as_ref()),
            insurance_from_date: validate_date(p.insurance_from_date.as_ref()),
            insurance_to_date: validate_date(p.insurance_to_date.as_ref()),
            model: normalize_text(p.model.as_ref()),
            make: normalize_text(p.make.as_ref()),
            body_type: normalize_text(p.body_type.as_ref()),
            color: normalize_text(p.color.as_ref()),
            mv_file_no: normalize_text(p.mv_file_no.as_ref()),
            plate_no: normalize_text(p.plate_no.as_ref()),
            chassis_no: normalize_text(p.chassis_no.as_ref()),
            motor_no: normalize_text(p.motor_no.as_ref()),
            premium: parse_money(p.premium.as_ref(), 0.0),
            other_charges: parse_money(p.other_charges.as_ref(), 0.0),
            auth_fee: parse_decimal(p.auth_fee.as_ref()).unwrap_or(DEFAULT_AUTH_FEE),
            doc_stamps: 0.0,
            e_vat: 0.0,
            lgt: 0.0,
            total_premium: 0.0,
        }
    }

    /// Fields for a new policy. Derived amounts are computed from the
    /// premium; any client-supplied values for them are ignored.
    pub fn for_create(payload: &PolicyPayload) -> Self {
        let mut fields = Self::base(payload);
        let breakdown =
            PremiumBreakdown::compute(fields.premium, fields.other_charges, fields.auth_fee);
        fields.doc_stamps = breakdown.doc_stamps;
        fields.e_vat = breakdown.e_vat;
        fields.lgt = breakdown.lgt;
        fields.total_premium = breakdown.total_premium;
        fields
    }

    /// Fields for overwriting an existing policy. Derived amounts are taken
    /// as sent, sign included, not recomputed, and default to zero.
    pub fn for_update(payload: &PolicyPayload) -> Self {
        let mut fields = Self::base(payload);
        fields.doc_stamps = parse_decimal(payload.doc_stamps.as_ref()).unwrap_or(0.0);
        fields.e_vat = parse_decimal(payload.e_vat.as_ref()).unwrap_or(0.0);
        fields.lgt = parse_decimal(payload.lgt.as_ref()).unwrap_or(0.0);
        fields.total_premium = parse_decimal(payload.total_premium.as_ref()).unwrap_or(0.0);
        fields
    }

    /// Whether any field required for an update is blank
    pub fn missing_required(&self) -> bool {
        self.assured.is_empty() || self.coc_number.is_empty() || self.or_number.is_empty()
    }

    /// Column map for the store
    pub fn to_row(&self) -> Result<Row, StoreError> {
        match serde_json::to_value(self)? {
            Value::Object(row) => Ok(row),
            other => Err(StoreError::InvalidData(format!(
                "policy fields serialized to {other}"
            ))),
        }
    }
}

/// A stored policy as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub assured: String,
    pub address: String,
    pub coc_number: String,
    pub or_number: String,
    pub policy_number: String,
    pub policy_type: String,
    pub policy_year: Option<i32>,
    pub date_issued: Option<String>,
    pub date_received: Option<String>,
    pub insurance_from_date: Option<String>,
    pub insurance_to_date: Option<String>,
    pub model: String,
    pub make: String,
    pub body_type: String,
    pub color: String,
    pub mv_file_no: String,
    pub plate_no: String,
    pub chassis_no: String,
    pub motor_no: String,
    pub premium: f64,
    pub other_charges: f64,
    pub auth_fee: f64,
    pub doc_stamps: f64,
    pub e_vat: f64,
    pub lgt: f64,
    pub total_premium: f64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub deleted_at: Option<String>,
}

impl Policy {
    /// Whether the policy has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Build a policy from a stored row, formatting dates and timestamps.
    pub fn from_row(row: &Row) -> Result<Self, StoreError> {
        let id = row
            .get("id")
            .and_then(Value::as_i64)
            .map(PolicyId)
            .ok_or_else(|| StoreError::InvalidData("policy row without integer id".into()))?;

        let text = |column: &str| -> String {
            match row.get(column) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            }
        };
        let amount = |column: &str| row.get(column).and_then(Value::as_f64).unwrap_or(0.0);
        let date = |column: &str| row.get(column).and_then(format_date);
        let timestamp = |column: &str| row.get(column).and_then(format_timestamp);

        Ok(Self {
            id,
            assured: text("assured"),
            address: text("address"),
            coc_number: text("coc_number"),
            or_number: text("or_number"),
            policy_number: text("policy_number"),
            policy_type: text("policy_type"),
            policy_year: row
                .get("policy_year")
                .and_then(Value::as_i64)
                .and_then(|y| i32::try_from(y).ok()),
            date_issued: date("date_issued"),
            date_received: date("date_received"),
            insurance_from_date: date("insurance_from_date"),
            insurance_to_date: date("insurance_to_date"),
            model: text("model"),
            make: text("make"),
            body_type: text("body_type"),
            color: text("color"),
            mv_file_no: text("mv_file_no"),
            plate_no: text("plate_no"),
            chassis_no: text("chassis_no"),
            motor_no: text("motor_no"),
            premium: amount("premium"),
            other_charges: amount("other_charges"),
            auth_fee: amount("auth_fee"),
            doc_stamps: amount("doc_stamps"),
            e_vat: amount("e_vat"),
            lgt: amount("lgt"),
            total_premium: amount("total_premium"),
            created_at: timestamp("created_at"),
            updated_at: timestamp("updated_at"),
            deleted_at: timestamp("deleted_at"),
        })
    }
}
