//! The pricing engine.
//!
//! Pure computation: given a snapshot of the relevant catalog rows and the buyer's cart, it produces the immutable
//! line-item list with price snapshots, the subtotal and the grand total. There is no I/O here and no hidden state;
//! repeated invocations with identical input produce identical output, which is what makes order totals auditable.

use lp_common::Rupiah;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::NewOrderItem;

//--------------------------------------   Catalog snapshot   --------------------------------------------------------
/// A product row as handed to us by the catalog service. Catalog CRUD lives outside this core; we only ever see a
/// read-only snapshot of the rows the cart references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: Rupiah,
    /// Whole-percent discount, 0..=100.
    pub discount_percent: u8,
    /// Unit weight in grams, carried onto the line item for courier costing.
    pub weight: i64,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    pub value: String,
    /// When set, overrides the product base price for this variant.
    pub price: Option<Rupiah>,
}

/// One `(product, variant?, quantity)` tuple from the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub quantity: i64,
}

/// The fully materialized result of pricing a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub items: Vec<NewOrderItem>,
    pub subtotal: Rupiah,
    pub total: Rupiah,
}

#[derive(Debug, Clone, Error)]
pub enum PricingError {
    #[error("Invalid line item: {0}")]
    InvalidLineItem(String),
    #[error("Amount overflow while pricing the cart")]
    AmountOverflow,
}

//--------------------------------------    Pricing engine    --------------------------------------------------------
/// Computes the discounted unit price: `round_half_up(price * (1 - discount/100))`, never negative.
pub fn final_unit_price(base: Rupiah, discount_percent: u8) -> Result<Rupiah, PricingError> {
    if discount_percent > 100 {
        return Err(PricingError::InvalidLineItem(format!("discount of {discount_percent}% exceeds 100%")));
    }
    if base.value() < 0 {
        return Err(PricingError::InvalidLineItem(format!("negative base price {base}")));
    }
    // Round-half-up in integer arithmetic. i128 gives headroom for the intermediate product.
    let scaled = (base.value() as i128) * i128::from(100 - discount_percent);
    let rounded = (scaled + 50) / 100;
    i64::try_from(rounded).map(Rupiah::from).map_err(|_| PricingError::AmountOverflow)
}

/// Prices a cart against a catalog snapshot.
///
/// For each line, the effective unit price is the variant price when a variant is selected and carries one, otherwise
/// the product base price; the product's discount is then applied and the result rounded half-up. Fails with
/// [`PricingError::InvalidLineItem`] when a referenced product or variant is missing from the snapshot, or when a
/// quantity is not strictly positive.
pub fn price_cart(catalog: &[Product], cart: &[CartLine], shipping_cost: Rupiah) -> Result<PricedCart, PricingError> {
    if cart.is_empty() {
        return Err(PricingError::InvalidLineItem("the cart contains no items".into()));
    }
    if shipping_cost.value() < 0 {
        return Err(PricingError::InvalidLineItem(format!("negative shipping cost {shipping_cost}")));
    }
    let mut items = Vec::with_capacity(cart.len());
    let mut subtotal = Rupiah::from(0);
    for line in cart {
        let product = catalog
            .iter()
            .find(|p| p.id == line.product_id)
            .ok_or_else(|| PricingError::InvalidLineItem(format!("unknown product {}", line.product_id)))?;
        if line.quantity <= 0 {
            return Err(PricingError::InvalidLineItem(format!(
                "quantity {} for product {} must be positive",
                line.quantity, product.id
            )));
        }
        let variant = match line.variant_id {
            Some(vid) => Some(product.variants.iter().find(|v| v.id == vid).ok_or_else(|| {
                PricingError::InvalidLineItem(format!("unknown variant {vid} for product {}", product.id))
            })?),
            None => None,
        };
        let base = variant.and_then(|v| v.price).unwrap_or(product.price);
        let unit_price = final_unit_price(base, product.discount_percent)?;
        let line_total = unit_price.checked_mul(line.quantity).ok_or(PricingError::AmountOverflow)?;
        subtotal = subtotal.checked_add(line_total).ok_or(PricingError::AmountOverflow)?;
        items.push(NewOrderItem {
            product_id: product.id,
            variant_id: variant.map(|v| v.id),
            product_name: product.title.clone(),
            variant_name: variant.map(|v| v.value.clone()),
            price: unit_price,
            quantity: line.quantity,
            weight: product.weight,
        });
    }
    let total = subtotal.checked_add(shipping_cost).ok_or(PricingError::AmountOverflow)?;
    Ok(PricedCart { items, subtotal, total })
}
