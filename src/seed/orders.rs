use serde::Serialize;
use std::io::{self, Write};

use crate::dataset::{
    Dataset, Money, OrderStatus, OrderTemplate, OrderType, PaymentMethod, PaymentStatus,
};
use crate::logger::{error, info, warn};
use crate::store::{to_rows, DataStore, RowId, Table};

/// An `orders` row.
#[derive(Debug, Serialize)]
struct NewOrder<'a> {
    order_number: &'a str,
    customer_id: Option<&'a RowId>,
    user_id: &'a str,
    terminal_id: &'a str,
    subtotal: Money,
    tax: Money,
    discount: Money,
    tip: Money,
    total: Money,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    order_type: OrderType,
    table_number: Option<&'a str>,
    status: OrderStatus,
}

/// An `order_items` row. `product_name` is a snapshot of the product at
/// sale time.
#[derive(Debug, Serialize)]
struct NewOrderItem<'a> {
    order_id: &'a RowId,
    product_id: Option<&'a RowId>,
    product_name: &'a str,
    quantity: u32,
    price: Money,
    discount: Money,
    total: Money,
}

/// An order template bound to the customer row it was written for.
#[derive(Debug)]
pub struct OrderPlan<'a> {
    pub template: &'a OrderTemplate,
    pub customer_id: Option<&'a RowId>,
}

/// Pair every order template with the id of its customer slot. A slot
/// without an id (the customer insert returned fewer rows) leaves the
/// order without a customer.
pub fn plan_orders<'a>(dataset: &'a Dataset, customer_ids: &'a [RowId]) -> Vec<OrderPlan<'a>> {
    dataset
        .orders
        .iter()
        .map(|template| {
            let customer_id = template.customer.and_then(|slot| {
                let id = customer_ids.get(slot);
                if id.is_none() {
                    warn(&format!(
                        "order {}: no customer id for slot {}",
                        template.order_number, slot
                    ));
                }
                id
            });
            OrderPlan {
                template,
                customer_id,
            }
        })
        .collect()
}

fn order_row<'a>(plan: &OrderPlan<'a>, operator: &'a str) -> NewOrder<'a> {
    let t = plan.template;
    NewOrder {
        order_number: &t.order_number,
        customer_id: plan.customer_id,
        user_id: operator,
        terminal_id: &t.terminal,
        subtotal: t.subtotal,
        tax: t.tax,
        discount: t.discount,
        tip: t.tip,
        total: t.total,
        payment_method: t.payment_method,
        payment_status: t.payment_status,
        order_type: t.order_type,
        table_number: t.table_number.as_deref(),
        status: t.status,
    }
}

/// Line items for the orders that were created, each bound to the id
/// returned for its own order.
fn item_rows<'a>(
    plans: &[OrderPlan<'a>],
    order_ids: &'a [RowId],
    dataset: &'a Dataset,
    product_ids: &'a [RowId],
) -> Vec<NewOrderItem<'a>> {
    if order_ids.len() < plans.len() {
        warn(&format!(
            "orders: {} ids returned for {} orders, later orders get no items",
            order_ids.len(),
            plans.len()
        ));
    }
    let mut rows = Vec::new();
    for (plan, order_id) in plans.iter().zip(order_ids) {
        for item in &plan.template.items {
            let product_id = product_ids.get(item.product);
            if product_id.is_none() {
                warn(&format!(
                    "order {}: no product id for slot {}",
                    plan.template.order_number, item.product
                ));
            }
            rows.push(NewOrderItem {
                order_id,
                product_id,
                product_name: &dataset.products[item.product].name,
                quantity: item.quantity,
                price: item.price,
                discount: item.discount,
                total: item.total,
            });
        }
    }
    rows
}

/// Insert the sample orders, then their line items.
///
/// Failures are reported and end the step; orders already created stay.
pub fn seed_orders<S, W>(
    store: &S,
    dataset: &Dataset,
    customer_ids: &[RowId],
    product_ids: &[RowId],
    operator: &str,
    out: &mut W,
) -> io::Result<()>
where
    S: DataStore + ?Sized,
    W: Write,
{
    writeln!(out, "\n🧾 Creating Sample Orders...")?;
    if dataset.orders.is_empty() {
        writeln!(out, "  ⚠️  Skipping orders - the dataset has none")?;
        return Ok(());
    }

    let plans = plan_orders(dataset, customer_ids);
    let orders: Vec<NewOrder> = plans.iter().map(|p| order_row(p, operator)).collect();
    let order_ids = match to_rows(&orders).and_then(|rows| store.insert(Table::Orders, &rows)) {
        Ok(ids) => ids,
        Err(e) => {
            error(&format!("insert orders failed: {:#}", e));
            writeln!(out, "  ❌ Error creating sample orders: {:#}", e)?;
            return Ok(());
        }
    };
    info(&format!("inserted {} orders", orders.len()));
    writeln!(out, "  ✅ Inserted {} sample orders", orders.len())?;

    let items = item_rows(&plans, &order_ids, dataset, product_ids);
    if items.is_empty() {
        return Ok(());
    }
    match to_rows(&items).and_then(|rows| store.insert(Table::OrderItems, &rows)) {
        Ok(_) => {
            info(&format!("inserted {} order items", items.len()));
            writeln!(out, "  ✅ Inserted {} order items", items.len())?;
        }
        Err(e) => {
            error(&format!("insert order items failed: {:#}", e));
            writeln!(out, "  ❌ Error creating sample orders: {:#}", e)?;
        }
    }
    Ok(())
}
