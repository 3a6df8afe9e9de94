//! Stored customer records and their normalization.
//!
//! Stored documents use camelCase keys and loose typing: numbers may be
//! missing, null or strings, `zoneId` may be a bare id or a populated object,
//! and month records may live in the `monthlyPayments` collection, the
//! legacy `payments` map keyed by month, or both. When both hold the same
//! month the collection wins; within the collection the first occurrence
//! wins. Records with an unusable month key are dropped.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use tracing::warn;

use crate::customer::{Customer, MonthlyPayment};
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::month::MonthKey;
use crate::types::{CustomerId, RecordLayout};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCustomer {
    #[serde(rename = "_id", default)]
    object_id: Value,
    #[serde(default)]
    id: Value,
    #[serde(default)]
    full_name: Value,
    #[serde(default)]
    monthly_fee: Value,
    #[serde(default)]
    zone_id: Value,
    #[serde(default)]
    village_id: Value,
    #[serde(default)]
    monthly_payments: Value,
    #[serde(default)]
    payments: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMonthlyPayment {
    #[serde(default)]
    month: Value,
    #[serde(default)]
    monthly_fee: Value,
    #[serde(default)]
    paid: Value,
    #[serde(default)]
    fully_paid: Value,
    #[serde(default)]
    paid_date: Value,
    #[serde(default)]
    date: Value,
    #[serde(default)]
    remaining: Value,
    #[serde(default)]
    total_due: Value,
}

impl RawMonthlyPayment {
    fn into_payment(self, month: MonthKey) -> MonthlyPayment {
        MonthlyPayment {
            month,
            monthly_fee: optional_money(&self.monthly_fee),
            paid: lenient_money(&self.paid),
            // only a literal true counts
            fully_paid: self.fully_paid == Value::Bool(true),
            paid_date: timestamp(&self.paid_date),
            date: calendar_date(&self.date),
            remaining: optional_money(&self.remaining),
            total_due: optional_money(&self.total_due),
        }
    }
}

/// month record as written back to the store
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMonthlyPayment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_fee: Option<Value>,
    pub paid: Value,
    pub fully_paid: bool,
    pub paid_date: Option<String>,
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_due: Option<Value>,
}

impl StoredMonthlyPayment {
    fn from_payment(payment: &MonthlyPayment, with_month: bool) -> Self {
        Self {
            month: with_month.then(|| payment.month.to_string()),
            monthly_fee: payment.monthly_fee.map(money_value),
            paid: money_value(payment.paid),
            fully_paid: payment.fully_paid,
            paid_date: payment.paid_date.map(|t| t.to_rfc3339()),
            date: payment.date.map(|d| d.format("%Y-%m-%d").to_string()),
            remaining: payment.remaining.map(money_value),
            total_due: payment.total_due.map(money_value),
        }
    }
}

/// normalize one stored customer document
pub fn customer_from_value(value: &Value) -> Result<Customer> {
    let raw: RawCustomer = serde_json::from_value(value.clone()).map_err(|e| LedgerError::MalformedRecords {
        message: e.to_string(),
    })?;

    let id = reference_id(&raw.object_id)
        .or_else(|| reference_id(&raw.id))
        .ok_or_else(|| LedgerError::MalformedRecords {
            message: "customer without _id or id".to_string(),
        })?;
    let id = CustomerId::new(id);

    let mut customer = Customer::new(id, lenient_money(&raw.monthly_fee));
    if let Value::String(name) = &raw.full_name {
        customer.full_name = name.clone();
    }
    customer.zone_id = reference_id(&raw.zone_id);
    customer.village_id = reference_id(&raw.village_id);

    for payment in normalize_ledger(&customer.id, &raw.monthly_payments, &raw.payments).into_values() {
        customer.upsert_payment(payment);
    }
    Ok(customer)
}

/// normalize a stored array of customer documents
pub fn customers_from_json(raw: &str) -> Result<Vec<Customer>> {
    let value: Value = serde_json::from_str(raw).map_err(|e| LedgerError::MalformedRecords {
        message: e.to_string(),
    })?;
    match value {
        Value::Array(items) => items.iter().map(customer_from_value).collect(),
        _ => Err(LedgerError::MalformedRecords {
            message: "expected an array of customers".to_string(),
        }),
    }
}

/// stored document for a customer in the chosen layout
pub fn customer_to_value(customer: &Customer, layout: RecordLayout) -> Value {
    let mut doc = Map::new();
    doc.insert("_id".to_string(), Value::String(customer.id.to_string()));
    doc.insert("fullName".to_string(), Value::String(customer.full_name.clone()));
    doc.insert("monthlyFee".to_string(), money_value(customer.monthly_fee));
    doc.insert("zoneId".to_string(), optional_string(&customer.zone_id));
    doc.insert("villageId".to_string(), optional_string(&customer.village_id));

    match layout {
        RecordLayout::Collection => {
            let records: Vec<Value> = customer
                .payments()
                .map(|p| to_value(&StoredMonthlyPayment::from_payment(p, true)))
                .collect();
            doc.insert("monthlyPayments".to_string(), Value::Array(records));
        }
        RecordLayout::LegacyMap => {
            let records: Map<String, Value> = customer
                .payments()
                .map(|p| (p.month.to_string(), to_value(&StoredMonthlyPayment::from_payment(p, false))))
                .collect();
            doc.insert("payments".to_string(), Value::Object(records));
        }
    }
    Value::Object(doc)
}

fn normalize_ledger(customer_id: &CustomerId, collection: &Value, legacy: &Value) -> BTreeMap<MonthKey, MonthlyPayment> {
    let mut ledger = BTreeMap::new();

    if let Value::Object(map) = legacy {
        for (key, record) in map {
            let Ok(month) = MonthKey::parse(key) else {
                warn!(customer = %customer_id, key = %key, "dropping legacy record with invalid month key");
                continue;
            };
            if let Some(raw) = raw_payment(customer_id, record) {
                ledger.insert(month, raw.into_payment(month));
            }
        }
    }

    if let Value::Array(items) = collection {
        let mut seen = HashSet::new();
        for record in items {
            let Some(raw) = raw_payment(customer_id, record) else {
                continue;
            };
            let month = match &raw.month {
                Value::String(key) => MonthKey::parse(key).ok(),
                _ => None,
            };
            let Some(month) = month else {
                warn!(customer = %customer_id, month = %raw.month, "dropping record with invalid month key");
                continue;
            };
            if seen.insert(month) {
                ledger.insert(month, raw.into_payment(month));
            } else {
                warn!(customer = %customer_id, %month, "ignoring duplicate month record");
            }
        }
    }

    ledger
}

fn raw_payment(customer_id: &CustomerId, value: &Value) -> Option<RawMonthlyPayment> {
    match serde_json::from_value(value.clone()) {
        Ok(raw) => Some(raw),
        Err(err) => {
            warn!(customer = %customer_id, error = %err, "dropping malformed month record");
            None
        }
    }
}

/// bare id, or the `_id` of a populated object
fn reference_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("_id").and_then(reference_id),
        _ => None,
    }
}

/// numeric amount, zero when missing or unreadable
fn lenient_money(value: &Value) -> Money {
    optional_money(value).unwrap_or(Money::ZERO)
}

fn optional_money(value: &Value) -> Option<Money> {
    match value {
        Value::Number(n) => n.as_f64().and_then(Money::from_f64_lossy),
        Value::String(s) => Money::from_str_exact(s).ok(),
        _ => None,
    }
}

fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc)),
        _ => None,
    }
}

/// `YYYY-MM-DD`, or the date part of a full timestamp
fn calendar_date(value: &Value) -> Option<NaiveDate> {
    let Value::String(s) = value else {
        return None;
    };
    let day = s.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn money_value(amount: Money) -> Value {
    Number::from_str(&amount.as_decimal().normalize().to_string())
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn optional_string(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

fn to_value(record: &StoredMonthlyPayment) -> Value {
    serde_json::to_value(record).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn month(raw: &str) -> MonthKey {
        MonthKey::parse(raw).unwrap()
    }

    #[test]
    fn test_collection_record() {
        let doc = json!({
            "_id": "c1",
            "fullName": "Amina",
            "monthlyFee": 50,
            "zoneId": { "_id": "z1", "name": "North" },
            "villageId": "v1",
            "monthlyPayments": [
                { "month": "2025-01", "paid": 20, "fullyPaid": false, "date": "2025-01-05T00:00:00.000Z" },
                { "month": "2025-02", "paid": "35.5", "fullyPaid": "true", "monthlyFee": 60 }
            ]
        });

        let customer = customer_from_value(&doc).unwrap();
        assert_eq!(customer.id, CustomerId::new("c1"));
        assert_eq!(customer.full_name, "Amina");
        assert_eq!(customer.zone_id.as_deref(), Some("z1"));
        assert_eq!(customer.village_id.as_deref(), Some("v1"));

        let jan = customer.payment(month("2025-01")).unwrap();
        assert_eq!(jan.paid, Money::from_major(20));
        assert_eq!(jan.date, NaiveDate::from_ymd_opt(2025, 1, 5));

        let feb = customer.payment(month("2025-02")).unwrap();
        assert_eq!(feb.paid, Money::from_cents(3550));
        // a string "true" is not a settled flag
        assert!(!feb.fully_paid);
        assert_eq!(feb.monthly_fee, Some(Money::from_major(60)));
    }

    #[test]
    fn test_collection_overrides_legacy_map() {
        let doc = json!({
            "id": "c2",
            "monthlyFee": 40,
            "payments": {
                "2025-01": { "paid": 40, "fullyPaid": true },
                "2025-02": { "paid": 10 }
            },
            "monthlyPayments": [
                { "month": "2025-02", "paid": 25 },
                { "month": "2025-02", "paid": 99 }
            ]
        });

        let customer = customer_from_value(&doc).unwrap();
        assert_eq!(customer.id, CustomerId::new("c2"));
        assert!(customer.payment(month("2025-01")).unwrap().fully_paid);
        assert_eq!(customer.payment(month("2025-02")).unwrap().paid, Money::from_major(25));
    }

    #[test]
    fn test_malformed_values_degrade() {
        let doc = json!({
            "_id": "c3",
            "monthlyFee": null,
            "monthlyPayments": [
                { "month": "2025-1", "paid": 10 },
                { "month": "2025-03", "paid": "lots", "remaining": -5 },
                "garbage"
            ]
        });

        let customer = customer_from_value(&doc).unwrap();
        assert_eq!(customer.monthly_fee, Money::ZERO);
        assert_eq!(customer.payments().count(), 1);
        let march = customer.payment(month("2025-03")).unwrap();
        assert_eq!(march.paid, Money::ZERO);
        assert_eq!(march.stored_remaining(), None);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let err = customer_from_value(&json!({ "fullName": "Nobody" })).unwrap_err();
        assert!(matches!(err, LedgerError::MalformedRecords { .. }));
        assert!(customers_from_json("{}").is_err());
    }

    #[test]
    fn test_export_layouts() {
        let mut record = MonthlyPayment::with_date(month("2025-02"), NaiveDate::from_ymd_opt(2025, 2, 3).unwrap());
        record.paid = Money::from_cents(1250);
        let customer = Customer::new(CustomerId::new("c4"), Money::from_major(50))
            .in_zone("z1")
            .with_payment(record);

        let collection = customer_to_value(&customer, RecordLayout::Collection);
        assert_eq!(collection["monthlyPayments"][0]["month"], json!("2025-02"));
        assert_eq!(collection["monthlyPayments"][0]["paid"], json!(12.5));
        assert_eq!(collection["monthlyPayments"][0]["date"], json!("2025-02-03"));
        assert!(collection.get("payments").is_none());

        let legacy = customer_to_value(&customer, RecordLayout::LegacyMap);
        assert_eq!(legacy["payments"]["2025-02"]["fullyPaid"], json!(false));
        assert!(legacy["payments"]["2025-02"].get("month").is_none());

        let reread = customer_from_value(&legacy).unwrap();
        assert_eq!(reread, customer);
    }
}
