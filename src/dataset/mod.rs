mod money;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::logger::warn;

pub use money::Money;

const EMBEDDED: &str = include_str!("../../assets/dataset.yaml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Product {
    pub name: String,
    pub price: Money,
    pub category: String,
    /// 999 marks made-to-order items such as cocktails.
    pub stock_quantity: i32,
    pub sku: String,
    pub barcode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub loyalty_points: i32,
    pub total_spent: Money,
    pub visit_count: i32,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    Mobile,
    #[serde(rename = "Gift Card")]
    GiftCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Refunded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    DineIn,
    Takeout,
    Delivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
    Refunded,
}

/// A sample order. Amounts are literal and never recomputed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderTemplate {
    pub order_number: String,
    /// Slot in [`Dataset::customers`] this order belongs to.
    #[serde(default)]
    pub customer: Option<usize>,
    pub terminal: String,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub tip: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_type: OrderType,
    pub status: OrderStatus,
    #[serde(default)]
    pub table_number: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemTemplate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemTemplate {
    /// Slot in [`Dataset::products`].
    pub product: usize,
    pub quantity: u32,
    pub price: Money,
    pub discount: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub orders: Vec<OrderTemplate>,
}

impl Dataset {
    pub fn embedded() -> Result<Self> {
        Self::from_yaml(EMBEDDED).context("embedded dataset is invalid")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml(&data).with_context(|| format!("invalid dataset at {}", path.display()))
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        let dataset: Dataset =
            serde_yaml::from_str(data).context("failed to parse dataset YAML")?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn item_count(&self) -> usize {
        self.orders.iter().map(|o| o.items.len()).sum()
    }

    fn validate(&self) -> Result<()> {
        let mut skus = HashSet::new();
        let mut barcodes = HashSet::new();
        for product in &self.products {
            if !skus.insert(product.sku.as_str()) {
                warn(&format!("duplicate product SKU {}", product.sku));
            }
            if !barcodes.insert(product.barcode.as_str()) {
                warn(&format!("duplicate product barcode {}", product.barcode));
            }
        }

        for order in &self.orders {
            let computed = order
                .subtotal
                .checked_add(order.tax)
                .and_then(|m| m.checked_add(order.tip))
                .and_then(|m| m.checked_sub(order.discount))
                .with_context(|| format!("order {}: amounts overflow", order.order_number))?;
            if computed != order.total {
                bail!(
                    "order {}: subtotal + tax + tip - discount is {}, but total is {}",
                    order.order_number,
                    computed,
                    order.total
                );
            }
            if let Some(slot) = order.customer {
                if slot >= self.customers.len() {
                    bail!(
                        "order {}: customer slot {} is out of range ({} customers)",
                        order.order_number,
                        slot,
                        self.customers.len()
                    );
                }
            }
            for item in &order.items {
                if item.product >= self.products.len() {
                    bail!(
                        "order {}: product slot {} is out of range ({} products)",
                        order.order_number,
                        item.product,
                        self.products.len()
                    );
                }
                let computed = item
                    .price
                    .checked_mul(item.quantity)
                    .and_then(|m| m.checked_sub(item.discount))
                    .with_context(|| {
                        format!("order {}: item amounts overflow", order.order_number)
                    })?;
                if computed != item.total {
                    bail!(
                        "order {}: item {} x {} - {} is {}, but total is {}",
                        order.order_number,
                        item.quantity,
                        item.price,
                        item.discount,
                        computed,
                        item.total
                    );
                }
            }
        }
        Ok(())
    }
}
