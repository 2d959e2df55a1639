use lp_common::Rupiah;
use sqlx::{FromRow, QueryBuilder, SqliteConnection};

use crate::pricing::{Product, Variant};

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    title: String,
    price: Rupiah,
    discount_percent: i64,
    weight: i64,
}

#[derive(Debug, FromRow)]
struct VariantRow {
    id: i64,
    product_id: i64,
    value: String,
    price: Option<Rupiah>,
}

/// Fetches catalog snapshots for the given product ids, variants included. Ids with no matching row are simply
/// absent from the result.
pub async fn fetch_products_by_ids(ids: &[i64], conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT id, title, price, discount_percent, weight FROM products WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    builder.push(")");
    let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(&mut *conn).await?;

    let mut builder = QueryBuilder::new("SELECT id, product_id, value, price FROM product_variants WHERE product_id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    builder.push(")");
    let variant_rows: Vec<VariantRow> = builder.build_query_as().fetch_all(conn).await?;

    let products = rows
        .into_iter()
        .map(|row| {
            let variants = variant_rows
                .iter()
                .filter(|v| v.product_id == row.id)
                .map(|v| Variant { id: v.id, value: v.value.clone(), price: v.price })
                .collect();
            Product {
                id: row.id,
                title: row.title,
                price: row.price,
                discount_percent: row.discount_percent.clamp(0, 100) as u8,
                weight: row.weight,
                variants,
            }
        })
        .collect();
    Ok(products)
}
