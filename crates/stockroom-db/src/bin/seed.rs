//! # Seed Data Generator
//!
//! Populates an empty database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockroom.db with 20 invoices (default)
//! cargo run -p stockroom-db --bin seed
//!
//! # Custom database and invoice count
//! cargo run -p stockroom-db --bin seed -- --db ./data/dev.db --invoices 50
//! ```
//!
//! ## Generated Data
//! - 3 suppliers
//! - Products per supplier, a few of them at or below their reorder level
//! - 5 customers
//! - 1 admin user
//! - N invoices spread across customers and walk-ins, some pending, some
//!   cancelled

use anyhow::Context;
use std::env;
use stockroom_core::{
    InvoiceDraft, InvoiceRequest, Money, NewCustomer, NewProduct, NewSupplier, NewTransaction,
    NewTransactionItem, Product, TransactionPatch, TransactionStatus, UpsertUser, UserRole,
};
use stockroom_db::{Database, DbConfig};
use tracing::{info, warn};

/// (supplier, contact, payment terms, products: (name, sku, barcode, price, cost, qty))
type Catalogue = (
    &'static str,
    &'static str,
    &'static str,
    &'static [(&'static str, &'static str, &'static str, i64, i64, i64)],
);

const CATALOGUE: &[Catalogue] = &[
    (
        "Anadolu Gıda A.Ş.",
        "Mehmet Demir",
        "Net 30",
        &[
            ("Olive Oil 1L", "OIL-1L", "8690000000011", 8990, 6200, 40),
            ("Olive Oil 5L", "OIL-5L", "8690000000028", 39990, 29000, 4),
            ("Baldo Rice 1kg", "RICE-1K", "8690000000035", 6450, 4100, 120),
            ("Red Lentils 1kg", "LENT-1K", "8690000000042", 5200, 3300, 2),
        ],
    ),
    (
        "Ege Süt Ürünleri",
        "Zeynep Kaya",
        "Net 15",
        &[
            ("White Cheese 500g", "CHS-500", "8690000000059", 11500, 8000, 25),
            ("Yogurt 1kg", "YOG-1K", "8690000000066", 4200, 2700, 5),
            ("Butter 250g", "BTR-250", "8690000000073", 9800, 7100, 18),
        ],
    ),
    (
        "Karadeniz Çay",
        "Ali Yıldız",
        "Cash on delivery",
        &[
            ("Black Tea 1kg", "TEA-1K", "8690000000080", 17500, 12500, 60),
            ("Green Tea 20 bags", "TEA-G20", "8690000000097", 4500, 2800, 0),
            ("Hazelnuts 500g", "HZL-500", "8690000000103", 21000, 16000, 9),
        ],
    ),
];

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Acme Market", "orders@acme-market.example", "+90 212 555 0101"),
    ("Boğaziçi Cafe", "cafe@bogazici.example", "+90 216 555 0102"),
    ("Corner Shop", "", "+90 232 555 0103"),
    ("Deniz Restaurant", "info@deniz.example", ""),
    ("Ela Catering", "hello@ela.example", "+90 312 555 0105"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stockroom_db=info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut invoices: usize = 20;
    let mut db_path = String::from("./stockroom.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--invoices" | "-n" => {
                if i + 1 < args.len() {
                    invoices = args[i + 1]
                        .parse()
                        .with_context(|| format!("invalid invoice count: {}", args[i + 1]))?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --invoices <N>  Number of invoices to generate (default: 20)");
                println!("  -d, --db <PATH>     Database file path (default: ./stockroom.db)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(database = %db_path, invoices, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("failed to open database")?;

    let existing = db.products().count_active().await?;
    if existing > 0 {
        warn!(
            existing,
            "Database already has products; skipping seed. Delete the file to regenerate."
        );
        return Ok(());
    }

    let admin = db
        .users()
        .upsert(UpsertUser {
            id: "admin".into(),
            username: Some("admin".into()),
            email: Some("admin@stockroom.example".into()),
            first_name: Some("Store".into()),
            last_name: Some("Admin".into()),
            role: Some(UserRole::Admin),
            ..Default::default()
        })
        .await?;
    info!(name = ?admin.display_name(), "Created admin user");

    let mut products: Vec<Product> = Vec::new();
    for (supplier_name, contact, terms, items) in CATALOGUE {
        let supplier = db
            .suppliers()
            .create(NewSupplier {
                name: supplier_name.to_string(),
                contact_person: Some(contact.to_string()),
                payment_terms: Some(terms.to_string()),
                ..Default::default()
            })
            .await?;

        for (name, sku, barcode, price, cost, quantity) in items.iter() {
            let product = db
                .products()
                .create(NewProduct {
                    name: name.to_string(),
                    sku: sku.to_string(),
                    barcode: Some(barcode.to_string()),
                    category: Some("Grocery".into()),
                    price: Some(Money::from_cents(*price)),
                    cost: Some(Money::from_cents(*cost)),
                    supplier_id: Some(supplier.id.clone()),
                    quantity: Some(*quantity),
                    ..Default::default()
                })
                .await
                .with_context(|| format!("failed to insert product {}", sku))?;
            products.push(product);
        }
    }
    info!(suppliers = CATALOGUE.len(), products = products.len(), "Created catalogue");

    let mut customers = Vec::new();
    for (name, email, phone) in CUSTOMERS {
        let customer = db
            .customers()
            .create(NewCustomer {
                name: name.to_string(),
                email: Some(email.to_string()),
                phone: Some(phone.to_string()),
                ..Default::default()
            })
            .await?;
        customers.push(customer);
    }
    info!(customers = customers.len(), "Created customers");

    for n in 0..invoices {
        // Every fourth invoice is a walk-in sale without a customer record.
        let customer = (n % 4 != 3).then(|| &customers[n % customers.len()]);

        let items = (0..1 + n % 3)
            .map(|k| {
                let product = &products[(n * 3 + k * 5) % products.len()];
                NewTransactionItem {
                    product_id: product.id.clone(),
                    quantity: 1 + ((n + k) % 4) as i64,
                    price: Some(product.price),
                    ..Default::default()
                }
            })
            .collect();

        let request = InvoiceRequest {
            transaction: NewTransaction {
                customer_id: customer.map(|c| c.id.clone()),
                customer_name: Some(
                    customer.map_or_else(|| "Walk-in".to_string(), |c| c.name.clone()),
                ),
                discount: Some(Money::from_cents(if n % 5 == 0 { 500 } else { 0 })),
                tax: Some(Money::zero()),
                status: Some(if n % 6 == 5 {
                    TransactionStatus::Pending
                } else {
                    TransactionStatus::Completed
                }),
                ..Default::default()
            },
            items,
        };

        let draft = InvoiceDraft::from_request(request)?;
        let created = db.transactions().create(draft).await?;

        if n % 9 == 8 {
            let cancel = TransactionPatch {
                status: Some(TransactionStatus::Cancelled),
                ..Default::default()
            };
            db.transactions()
                .update(&created.transaction.id, cancel)
                .await?;
        }
    }
    info!(invoices, "Created invoices");

    let low = db.products().low_stock().await?;
    info!(low_stock = low.len(), "Seed complete");

    db.close().await;
    Ok(())
}
