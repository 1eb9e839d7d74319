//! # Invoice Module
//!
//! Invoice (sales transaction) composition: line totals, grand total and
//! invoice numbering.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  InvoiceRequest {transaction, items}       (client JSON, untrusted)     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  InvoiceDraft::from_request()                                           │
//! │        ├── validate every line (1..=9999, price >= 0)                   │
//! │        ├── line.total = price × quantity                                │
//! │        └── totals = subtotal − discount + tax   (must be >= 0)          │
//! │        │                                                                │
//! │        ├──► preview()           → InvoicePreview (nothing stored)       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  storage checks products, fills missing names, picks next INV-NNN       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  InvoiceDraft::into_records()  → Transaction + Vec<TransactionItem>     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Client-supplied totals are never trusted. They are kept only so the
//! caller can report a mismatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::input::{claimed_money, double_option, optional_money};
use crate::money::Money;
use crate::types::{Transaction, TransactionItem, TransactionStatus};
use crate::validation::{
    normalize_optional_id, normalize_optional_text, validate_amount, validate_name,
    validate_quantity, MAX_NAME_LEN,
};
use crate::{INVOICE_PREFIX, MAX_INVOICE_LINES};

// =============================================================================
// Request Shapes
// =============================================================================

/// Header half of an invoice request (`transaction` in the JSON body).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTransaction {
    pub customer_id: Option<String>,
    /// May be blank when `customer_id` is set; filled from the customer.
    pub customer_name: Option<String>,
    #[serde(deserialize_with = "optional_money")]
    pub discount: Option<Money>,
    #[serde(deserialize_with = "optional_money")]
    pub tax: Option<Money>,
    /// What the client computed. Compared, never stored.
    #[serde(deserialize_with = "claimed_money")]
    pub total: Option<Money>,
    pub status: Option<TransactionStatus>,
}

/// One line of an invoice request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTransactionItem {
    pub product_id: String,
    pub product_name: Option<String>,
    pub quantity: i64,
    #[serde(deserialize_with = "optional_money")]
    pub price: Option<Money>,
    #[serde(deserialize_with = "claimed_money")]
    pub total: Option<Money>,
}

/// Body of `POST /api/transactions` and `POST /api/transactions/preview`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvoiceRequest {
    pub transaction: NewTransaction,
    pub items: Vec<NewTransactionItem>,
}

// =============================================================================
// Totals
// =============================================================================

/// Derived money amounts of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    #[ts(type = "string")]
    pub subtotal: Money,
    #[ts(type = "string")]
    pub discount: Money,
    #[ts(type = "string")]
    pub tax: Money,
    #[ts(type = "string")]
    pub total: Money,
}

impl InvoiceTotals {
    /// `total = subtotal - discount + tax`.
    ///
    /// Discount and tax are absolute amounts, not rates.
    ///
    /// ```rust
    /// use stockroom_core::invoice::InvoiceTotals;
    /// use stockroom_core::money::Money;
    ///
    /// let t = InvoiceTotals::compute(
    ///     Money::from_cents(10_000),
    ///     Money::from_cents(1_500),
    ///     Money::from_cents(1_800),
    /// )
    /// .unwrap();
    /// assert_eq!(t.total.to_string(), "103.00");
    /// ```
    pub fn compute(subtotal: Money, discount: Money, tax: Money) -> CoreResult<Self> {
        validate_amount("discount", discount)?;
        validate_amount("tax", tax)?;

        let total = subtotal
            .cents()
            .checked_sub(discount.cents())
            .and_then(|c| c.checked_add(tax.cents()))
            .map(Money::from_cents)
            .ok_or(CoreError::AmountOverflow)?;

        if total.is_negative() {
            return Err(CoreError::NegativeTotal {
                subtotal: subtotal.to_string(),
                discount: discount.to_string(),
                tax: tax.to_string(),
            });
        }

        Ok(InvoiceTotals {
            subtotal,
            discount,
            tax,
            total,
        })
    }
}

// =============================================================================
// Draft
// =============================================================================

/// A validated invoice line with its computed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub product_id: String,
    pub product_name: Option<String>,
    pub quantity: i64,
    #[ts(type = "string")]
    pub price: Money,
    #[ts(type = "string")]
    pub total: Money,
}

/// A validated invoice, ready to be numbered and stored.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub status: TransactionStatus,
    pub lines: Vec<InvoiceLine>,
    pub totals: InvoiceTotals,
    claimed_total: Option<Money>,
}

/// Response of `POST /api/transactions/preview`.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePreview {
    #[serde(flatten)]
    #[ts(flatten)]
    pub totals: InvoiceTotals,
    pub items: Vec<InvoiceLine>,
}

impl InvoiceDraft {
    /// Validates a request and recomputes every amount.
    ///
    /// ## Errors
    /// - `EmptyInvoice` with no lines, `TooManyLines` above the cap
    /// - `Validation` for a bad line, discount or tax
    /// - `NegativeTotal` when the discount exceeds subtotal + tax
    pub fn from_request(request: InvoiceRequest) -> CoreResult<Self> {
        let InvoiceRequest { transaction, items } = request;

        if items.is_empty() {
            return Err(CoreError::EmptyInvoice);
        }
        if items.len() > MAX_INVOICE_LINES {
            return Err(CoreError::TooManyLines {
                max: MAX_INVOICE_LINES,
            });
        }

        let lines = items
            .into_iter()
            .map(InvoiceLine::from_item)
            .collect::<CoreResult<Vec<_>>>()?;

        let subtotal = lines
            .iter()
            .try_fold(0i64, |acc, line| acc.checked_add(line.total.cents()))
            .map(Money::from_cents)
            .ok_or(CoreError::AmountOverflow)?;

        let totals = InvoiceTotals::compute(
            subtotal,
            transaction.discount.unwrap_or_default(),
            transaction.tax.unwrap_or_default(),
        )?;

        Ok(InvoiceDraft {
            customer_id: normalize_optional_id("customerId", transaction.customer_id)?,
            customer_name: normalize_optional_text(
                "customerName",
                transaction.customer_name,
                MAX_NAME_LEN,
            )?,
            status: transaction.status.unwrap_or_default(),
            lines,
            totals,
            claimed_total: transaction.total,
        })
    }

    /// The client's total, when it disagrees with the computed one.
    pub fn claimed_total_mismatch(&self) -> Option<Money> {
        self.claimed_total.filter(|claimed| *claimed != self.totals.total)
    }

    /// Distinct product ids referenced by the lines.
    pub fn product_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .lines
            .iter()
            .map(|line| line.product_id.clone())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Fills every unnamed line referencing `product_id`.
    pub fn fill_product_name(&mut self, product_id: &str, name: &str) {
        for line in self
            .lines
            .iter_mut()
            .filter(|l| l.product_id == product_id && l.product_name.is_none())
        {
            line.product_name = Some(name.to_string());
        }
    }

    pub fn preview(&self) -> InvoicePreview {
        InvoicePreview {
            totals: self.totals,
            items: self.lines.clone(),
        }
    }

    /// Turns the draft into rows to insert.
    ///
    /// Every line must have a product name and the header a customer name
    /// by now; `new_id` is called once per line item.
    pub fn into_records(
        self,
        transaction_id: String,
        transaction_number: String,
        now: DateTime<Utc>,
        mut new_id: impl FnMut() -> String,
    ) -> CoreResult<(Transaction, Vec<TransactionItem>)> {
        let customer_name = validate_name(
            "customerName",
            self.customer_name.as_deref().unwrap_or_default(),
        )?;

        let items = self
            .lines
            .into_iter()
            .map(|line| -> CoreResult<TransactionItem> {
                let product_name = line
                    .product_name
                    .ok_or_else(|| ValidationError::required("productName"))?;
                Ok(TransactionItem {
                    id: new_id(),
                    transaction_id: transaction_id.clone(),
                    product_id: line.product_id,
                    product_name,
                    quantity: line.quantity,
                    price: line.price,
                    total: line.total,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let transaction = Transaction {
            id: transaction_id,
            transaction_number,
            customer_id: self.customer_id,
            customer_name,
            subtotal: self.totals.subtotal,
            discount: self.totals.discount,
            tax: self.totals.tax,
            total: self.totals.total,
            status: self.status,
            created_at: now,
            updated_at: now,
        };

        Ok((transaction, items))
    }
}

impl InvoiceLine {
    fn from_item(item: NewTransactionItem) -> CoreResult<Self> {
        let product_id = item.product_id.trim();
        if product_id.is_empty() {
            return Err(ValidationError::required("productId").into());
        }

        validate_quantity(item.quantity)?;

        let price = item.price.ok_or_else(|| ValidationError::required("price"))?;
        validate_amount("price", price)?;

        let total = price
            .checked_multiply_quantity(item.quantity)
            .ok_or(CoreError::AmountOverflow)?;

        Ok(InvoiceLine {
            product_id: product_id.to_string(),
            product_name: normalize_optional_text("productName", item.product_name, MAX_NAME_LEN)?,
            quantity: item.quantity,
            price,
            total,
        })
    }
}

// =============================================================================
// Transaction Patch
// =============================================================================

/// Body of `PUT /api/transactions/{id}`.
///
/// Line items are immutable once stored; only the header changes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionPatch {
    #[serde(deserialize_with = "double_option")]
    pub customer_id: Option<Option<String>>,
    pub customer_name: Option<String>,
    pub status: Option<TransactionStatus>,
    #[serde(deserialize_with = "optional_money")]
    pub discount: Option<Money>,
    #[serde(deserialize_with = "optional_money")]
    pub tax: Option<Money>,
}

impl TransactionPatch {
    /// Applies the patch and recomputes the grand total from the stored
    /// subtotal.
    pub fn apply(self, transaction: &mut Transaction, now: DateTime<Utc>) -> CoreResult<()> {
        if let Some(customer_id) = self.customer_id {
            transaction.customer_id = normalize_optional_id("customerId", customer_id)?;
        }
        if let Some(name) = self.customer_name {
            transaction.customer_name = validate_name("customerName", &name)?;
        }
        if let Some(status) = self.status {
            transaction.status = status;
        }

        let totals = InvoiceTotals::compute(
            transaction.subtotal,
            self.discount.unwrap_or(transaction.discount),
            self.tax.unwrap_or(transaction.tax),
        )?;
        transaction.discount = totals.discount;
        transaction.tax = totals.tax;
        transaction.total = totals.total;

        transaction.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// Invoice Numbering
// =============================================================================

/// Formats a sequence number: `1 → INV-001`, `1000 → INV-1000`.
pub fn format_invoice_number(sequence: u64) -> String {
    format!("{}{:03}", INVOICE_PREFIX, sequence)
}

/// The number following the highest sequence in use (`None` = no invoices).
///
/// ```rust
/// use stockroom_core::invoice::next_invoice_number;
///
/// assert_eq!(next_invoice_number(None), "INV-001");
/// assert_eq!(next_invoice_number(Some(41)), "INV-042");
/// assert_eq!(next_invoice_number(Some(999)), "INV-1000");
/// ```
pub fn next_invoice_number(last_sequence: Option<u64>) -> String {
    format_invoice_number(last_sequence.unwrap_or(0) + 1)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_A: &str = "11111111-1111-4111-8111-111111111111";
    const PRODUCT_B: &str = "22222222-2222-4222-8222-222222222222";

    fn request(json: serde_json::Value) -> InvoiceRequest {
        serde_json::from_value(json).unwrap()
    }

    fn sample() -> InvoiceRequest {
        request(serde_json::json!({
            "transaction": {
                "customerName": "Walk-in",
                "discount": "5.00",
                "tax": "18.00",
                "total": "999.99"
            },
            "items": [
                { "productId": PRODUCT_A, "productName": "Olive Oil 1L", "quantity": 3, "price": "89.90" },
                { "productId": PRODUCT_B, "quantity": 2, "price": 12.5 }
            ]
        }))
    }

    #[test]
    fn test_totals_are_recomputed() {
        let draft = InvoiceDraft::from_request(sample()).unwrap();

        assert_eq!(draft.lines[0].total, Money::from_cents(26_970));
        assert_eq!(draft.lines[1].total, Money::from_cents(2_500));
        assert_eq!(draft.totals.subtotal, Money::from_cents(29_470));
        // 294.70 - 5.00 + 18.00
        assert_eq!(draft.totals.total, Money::from_cents(30_770));
        assert_eq!(draft.status, TransactionStatus::Completed);
    }

    #[test]
    fn test_claimed_total_mismatch() {
        let draft = InvoiceDraft::from_request(sample()).unwrap();
        assert_eq!(draft.claimed_total_mismatch(), Some(Money::from_cents(99_999)));

        let mut req = sample();
        req.transaction.total = Some(Money::from_cents(30_770));
        let draft = InvoiceDraft::from_request(req).unwrap();
        assert_eq!(draft.claimed_total_mismatch(), None);
    }

    #[test]
    fn test_float_noise_in_client_totals() {
        let draft = InvoiceDraft::from_request(request(serde_json::json!({
            "transaction": { "customerName": "Walk-in", "total": 269.70000000000005 },
            "items": [{
                "productId": PRODUCT_A,
                "quantity": 3,
                "price": "89.90",
                "total": "269.70000000000005"
            }]
        })))
        .unwrap();
        assert_eq!(draft.totals.total, Money::from_cents(26_970));
        assert_eq!(draft.claimed_total_mismatch(), None);

        let req = request(serde_json::json!({
            "transaction": { "customerName": "Walk-in", "total": "NaN?" },
            "items": [{ "productId": PRODUCT_A, "quantity": 1, "price": "1.00", "total": {} }]
        }));
        assert_eq!(req.transaction.total, None);
        assert_eq!(req.items[0].total, None);

        // Prices stay strict.
        let bad: Result<InvoiceRequest, _> = serde_json::from_value(serde_json::json!({
            "items": [{ "productId": PRODUCT_A, "quantity": 1, "price": "1.999" }]
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_empty_invoice_rejected() {
        let req = request(serde_json::json!({
            "transaction": { "customerName": "Walk-in" },
            "items": []
        }));
        assert!(matches!(
            InvoiceDraft::from_request(req),
            Err(CoreError::EmptyInvoice)
        ));
    }

    #[test]
    fn test_line_validation() {
        for item in [
            serde_json::json!({ "productId": PRODUCT_A, "quantity": 0, "price": "1" }),
            serde_json::json!({ "productId": PRODUCT_A, "quantity": 10_000, "price": "1" }),
            serde_json::json!({ "productId": PRODUCT_A, "quantity": 1 }),
            serde_json::json!({ "productId": PRODUCT_A, "quantity": 1, "price": "-1" }),
            serde_json::json!({ "productId": "", "quantity": 1, "price": "1" }),
        ] {
            let req = request(serde_json::json!({
                "transaction": { "customerName": "Walk-in" },
                "items": [item]
            }));
            assert!(
                matches!(InvoiceDraft::from_request(req), Err(CoreError::Validation(_))),
                "expected validation error"
            );
        }
    }

    #[test]
    fn test_negative_total_rejected() {
        let req = request(serde_json::json!({
            "transaction": { "customerName": "Walk-in", "discount": "50.00" },
            "items": [{ "productId": PRODUCT_A, "quantity": 1, "price": "10.00" }]
        }));
        assert!(matches!(
            InvoiceDraft::from_request(req),
            Err(CoreError::NegativeTotal { .. })
        ));
    }

    #[test]
    fn test_discount_equal_to_subtotal_is_zero_total() {
        let totals = InvoiceTotals::compute(
            Money::from_cents(1000),
            Money::from_cents(1000),
            Money::zero(),
        )
        .unwrap();
        assert!(totals.total.is_zero());
    }

    #[test]
    fn test_negative_tax_rejected() {
        assert!(InvoiceTotals::compute(
            Money::from_cents(1000),
            Money::zero(),
            Money::from_cents(-1),
        )
        .is_err());
    }

    #[test]
    fn test_overflow_detected() {
        let req = request(serde_json::json!({
            "transaction": { "customerName": "Walk-in" },
            "items": [{ "productId": PRODUCT_A, "quantity": 9999, "price": "92233720368547758.07" }]
        }));
        assert!(matches!(
            InvoiceDraft::from_request(req),
            Err(CoreError::AmountOverflow)
        ));
    }

    #[test]
    fn test_name_filling_and_records() {
        let mut draft = InvoiceDraft::from_request(sample()).unwrap();
        assert_eq!(
            draft.product_ids(),
            vec![PRODUCT_A.to_string(), PRODUCT_B.to_string()]
        );

        // Named lines keep their snapshot.
        draft.fill_product_name(PRODUCT_A, "Renamed");
        draft.fill_product_name(PRODUCT_B, "Bread");
        assert_eq!(draft.lines[0].product_name.as_deref(), Some("Olive Oil 1L"));

        let mut n = 0;
        let (tx, items) = draft
            .into_records("t1".into(), "INV-007".into(), Utc::now(), || {
                n += 1;
                format!("item-{}", n)
            })
            .unwrap();

        assert_eq!(tx.transaction_number, "INV-007");
        assert_eq!(tx.total, Money::from_cents(30_770));
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].product_name, "Bread");
        assert_eq!(items[1].id, "item-2");
        assert!(items.iter().all(|i| i.transaction_id == "t1"));
    }

    #[test]
    fn test_records_require_names() {
        let draft = InvoiceDraft::from_request(sample()).unwrap();
        let result = draft.into_records("t1".into(), "INV-001".into(), Utc::now(), || "i".into());
        assert!(matches!(result, Err(CoreError::Validation(_))));

        let mut req = sample();
        req.transaction.customer_name = Some("  ".into());
        let mut draft = InvoiceDraft::from_request(req).unwrap();
        draft.fill_product_name(PRODUCT_B, "Bread");
        let result = draft.into_records("t1".into(), "INV-001".into(), Utc::now(), || "i".into());
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_preview_serializes_flat() {
        let draft = InvoiceDraft::from_request(sample()).unwrap();
        let json = serde_json::to_value(draft.preview()).unwrap();
        assert_eq!(json["subtotal"], "294.70");
        assert_eq!(json["total"], "307.70");
        assert_eq!(json["items"][0]["total"], "269.70");
    }

    #[test]
    fn test_patch_recomputes_total() {
        let mut draft = InvoiceDraft::from_request(sample()).unwrap();
        draft.fill_product_name(PRODUCT_B, "Bread");
        let (mut tx, _) = draft
            .into_records("t1".into(), "INV-001".into(), Utc::now(), || "i".into())
            .unwrap();

        let patch: TransactionPatch = serde_json::from_value(serde_json::json!({
            "discount": "0",
            "status": "cancelled"
        }))
        .unwrap();
        patch.apply(&mut tx, Utc::now()).unwrap();

        assert_eq!(tx.status, TransactionStatus::Cancelled);
        assert_eq!(tx.total, Money::from_cents(31_270));

        let patch: TransactionPatch =
            serde_json::from_value(serde_json::json!({ "discount": "1000.00" })).unwrap();
        assert!(matches!(
            patch.apply(&mut tx, Utc::now()),
            Err(CoreError::NegativeTotal { .. })
        ));
    }

    #[test]
    fn test_invoice_numbering() {
        assert_eq!(format_invoice_number(1), "INV-001");
        assert_eq!(format_invoice_number(42), "INV-042");
        assert_eq!(format_invoice_number(1000), "INV-1000");

        assert_eq!(next_invoice_number(None), "INV-001");
        assert_eq!(next_invoice_number(Some(999)), "INV-1000");
    }
}
