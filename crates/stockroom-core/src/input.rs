//! # Input Types
//!
//! Request shapes for creating and updating entities.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NewX    ── into_x(id, now) ──►  X        (create: every rule checked)  │
//! │  XPatch  ── apply(&mut X)   ──►  X'       (update: only sent fields)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Patch Semantics
//! For nullable columns a patch distinguishes three cases:
//!
//! | JSON                   | Rust               | Effect        |
//! |------------------------|--------------------|---------------|
//! | field absent           | `None`             | unchanged     |
//! | `"field": null` / `""` | `Some(None)`       | set to NULL   |
//! | `"field": "x"`         | `Some(Some("x"))`  | set to `"x"`  |

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Customer, Product, Supplier, User, UserRole};
use crate::validation::{
    normalize_optional_id, normalize_optional_text, validate_amount, validate_currency,
    validate_email, validate_name, validate_sku, validate_stock_level, ValidationResult,
    MAX_NAME_LEN, MAX_TEXT_LEN,
};
use crate::{DEFAULT_CURRENCY, DEFAULT_MIN_QUANTITY};

// =============================================================================
// Serde Helpers
// =============================================================================

/// Deserializes a present field (even `null`) as `Some(..)`.
///
/// Combined with `#[serde(default)]` an absent field stays `None`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Optional money where a blank string means "not set".
///
/// Web forms post untouched number inputs as `""`.
pub fn optional_money<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => Money::deserialize(value).map(Some).map_err(D::Error::custom),
    }
}

/// A money amount the client computed for display, rounded to cents.
///
/// Browsers build these with floating point (`89.9 * 3` is
/// `269.70000000000005`), so unlike [`optional_money`] extra decimals are
/// rounded instead of rejected. Anything unreadable counts as not sent.
pub fn claimed_money<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(value
        .map(|v| (v * 100.0).round())
        .filter(|cents| cents.is_finite() && cents.abs() < i64::MAX as f64)
        .map(|cents| Money::from_cents(cents as i64)))
}

/// [`optional_money`] for patch fields on nullable money columns.
pub fn double_optional_money<'de, D>(deserializer: D) -> Result<Option<Option<Money>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_money(deserializer).map(Some)
}

fn require_price(price: Option<Money>) -> ValidationResult<Money> {
    let price = price.ok_or_else(|| ValidationError::required("price"))?;
    validate_amount("price", price)?;
    Ok(price)
}

fn optional_cost(cost: Option<Money>) -> ValidationResult<Option<Money>> {
    if let Some(cost) = cost {
        validate_amount("cost", cost)?;
    }
    Ok(cost)
}

// =============================================================================
// Product
// =============================================================================

/// Body of `POST /api/products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub barcode: Option<String>,
    pub category: Option<String>,
    #[serde(deserialize_with = "optional_money")]
    pub price: Option<Money>,
    #[serde(deserialize_with = "optional_money")]
    pub cost: Option<Money>,
    pub currency: Option<String>,
    pub supplier_id: Option<String>,
    pub quantity: Option<i64>,
    pub min_quantity: Option<i64>,
    pub is_active: Option<bool>,
}

impl NewProduct {
    /// Validates the input and builds the row to insert.
    ///
    /// Defaults: currency `TRY`, quantity 0, min quantity 5, active.
    pub fn into_product(self, id: String, now: DateTime<Utc>) -> ValidationResult<Product> {
        let quantity = self.quantity.unwrap_or(0);
        validate_stock_level("quantity", quantity)?;
        let min_quantity = self.min_quantity.unwrap_or(DEFAULT_MIN_QUANTITY);
        validate_stock_level("minQuantity", min_quantity)?;

        let currency = match self.currency.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_CURRENCY.to_string(),
            Some(label) => validate_currency(label)?,
        };

        Ok(Product {
            id,
            name: validate_name("name", &self.name)?,
            description: normalize_optional_text("description", self.description, MAX_TEXT_LEN)?,
            sku: validate_sku(&self.sku)?,
            barcode: normalize_optional_text("barcode", self.barcode, 64)?,
            category: normalize_optional_text("category", self.category, MAX_NAME_LEN)?,
            price: require_price(self.price)?,
            cost: optional_cost(self.cost)?,
            currency,
            supplier_id: normalize_optional_id("supplierId", self.supplier_id)?,
            quantity,
            min_quantity,
            is_active: self.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Body of `PUT /api/products/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub sku: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub barcode: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    #[serde(deserialize_with = "optional_money")]
    pub price: Option<Money>,
    #[serde(deserialize_with = "double_optional_money")]
    pub cost: Option<Option<Money>>,
    pub currency: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub supplier_id: Option<Option<String>>,
    pub quantity: Option<i64>,
    pub min_quantity: Option<i64>,
    pub is_active: Option<bool>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) -> ValidationResult<()> {
        if let Some(name) = self.name {
            product.name = validate_name("name", &name)?;
        }
        if let Some(description) = self.description {
            product.description =
                normalize_optional_text("description", description, MAX_TEXT_LEN)?;
        }
        if let Some(sku) = self.sku {
            product.sku = validate_sku(&sku)?;
        }
        if let Some(barcode) = self.barcode {
            product.barcode = normalize_optional_text("barcode", barcode, 64)?;
        }
        if let Some(category) = self.category {
            product.category = normalize_optional_text("category", category, MAX_NAME_LEN)?;
        }
        if let Some(price) = self.price {
            validate_amount("price", price)?;
            product.price = price;
        }
        if let Some(cost) = self.cost {
            product.cost = optional_cost(cost)?;
        }
        if let Some(currency) = self.currency {
            product.currency = validate_currency(&currency)?;
        }
        if let Some(supplier_id) = self.supplier_id {
            product.supplier_id = normalize_optional_id("supplierId", supplier_id)?;
        }
        if let Some(quantity) = self.quantity {
            validate_stock_level("quantity", quantity)?;
            product.quantity = quantity;
        }
        if let Some(min_quantity) = self.min_quantity {
            validate_stock_level("minQuantity", min_quantity)?;
            product.min_quantity = min_quantity;
        }
        if let Some(is_active) = self.is_active {
            product.is_active = is_active;
        }

        product.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Body of `POST /api/customers`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

impl NewCustomer {
    pub fn into_customer(self, id: String, now: DateTime<Utc>) -> ValidationResult<Customer> {
        Ok(Customer {
            id,
            name: validate_name("name", &self.name)?,
            email: validate_email(self.email)?,
            phone: normalize_optional_text("phone", self.phone, 50)?,
            address: normalize_optional_text("address", self.address, MAX_TEXT_LEN)?,
            is_active: self.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Body of `PUT /api/customers/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl CustomerPatch {
    pub fn apply(self, customer: &mut Customer, now: DateTime<Utc>) -> ValidationResult<()> {
        if let Some(name) = self.name {
            customer.name = validate_name("name", &name)?;
        }
        if let Some(email) = self.email {
            customer.email = validate_email(email)?;
        }
        if let Some(phone) = self.phone {
            customer.phone = normalize_optional_text("phone", phone, 50)?;
        }
        if let Some(address) = self.address {
            customer.address = normalize_optional_text("address", address, MAX_TEXT_LEN)?;
        }
        if let Some(is_active) = self.is_active {
            customer.is_active = is_active;
        }

        customer.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// Body of `POST /api/suppliers`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSupplier {
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_number: Option<String>,
    pub payment_terms: Option<String>,
    pub is_active: Option<bool>,
}

impl NewSupplier {
    pub fn into_supplier(self, id: String, now: DateTime<Utc>) -> ValidationResult<Supplier> {
        Ok(Supplier {
            id,
            name: validate_name("name", &self.name)?,
            contact_person: normalize_optional_text(
                "contactPerson",
                self.contact_person,
                MAX_NAME_LEN,
            )?,
            email: validate_email(self.email)?,
            phone: normalize_optional_text("phone", self.phone, 50)?,
            address: normalize_optional_text("address", self.address, MAX_TEXT_LEN)?,
            tax_number: normalize_optional_text("taxNumber", self.tax_number, 50)?,
            payment_terms: normalize_optional_text(
                "paymentTerms",
                self.payment_terms,
                MAX_NAME_LEN,
            )?,
            is_active: self.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Body of `PUT /api/suppliers/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub contact_person: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub tax_number: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub payment_terms: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl SupplierPatch {
    pub fn apply(self, supplier: &mut Supplier, now: DateTime<Utc>) -> ValidationResult<()> {
        if let Some(name) = self.name {
            supplier.name = validate_name("name", &name)?;
        }
        if let Some(contact_person) = self.contact_person {
            supplier.contact_person =
                normalize_optional_text("contactPerson", contact_person, MAX_NAME_LEN)?;
        }
        if let Some(email) = self.email {
            supplier.email = validate_email(email)?;
        }
        if let Some(phone) = self.phone {
            supplier.phone = normalize_optional_text("phone", phone, 50)?;
        }
        if let Some(address) = self.address {
            supplier.address = normalize_optional_text("address", address, MAX_TEXT_LEN)?;
        }
        if let Some(tax_number) = self.tax_number {
            supplier.tax_number = normalize_optional_text("taxNumber", tax_number, 50)?;
        }
        if let Some(payment_terms) = self.payment_terms {
            supplier.payment_terms =
                normalize_optional_text("paymentTerms", payment_terms, MAX_NAME_LEN)?;
        }
        if let Some(is_active) = self.is_active {
            supplier.is_active = is_active;
        }

        supplier.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// User
// =============================================================================

/// Profile data pushed by the identity provider on login.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpsertUser {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: Option<UserRole>,
}

impl UpsertUser {
    /// Builds the full record; `created_at` is ignored by the upsert when the
    /// user already exists.
    pub fn into_user(self, now: DateTime<Utc>) -> ValidationResult<User> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(ValidationError::required("id"));
        }

        Ok(User {
            id: id.to_string(),
            username: normalize_optional_text("username", self.username, MAX_NAME_LEN)?,
            email: validate_email(self.email)?,
            first_name: normalize_optional_text("firstName", self.first_name, MAX_NAME_LEN)?,
            last_name: normalize_optional_text("lastName", self.last_name, MAX_NAME_LEN)?,
            profile_image_url: normalize_optional_text(
                "profileImageUrl",
                self.profile_image_url,
                MAX_TEXT_LEN,
            )?,
            role: self.role.unwrap_or_default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
