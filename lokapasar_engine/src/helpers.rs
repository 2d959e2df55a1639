use chrono::Utc;
use rand::Rng;

use crate::db_types::OrderNumber;

/// The tag prefixing every generated order number.
pub const ORDER_NUMBER_TAG: &str = "INV";

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generates a candidate order number: `<TAG>/<YYYYMMDD>/<6-char base36 random>`.
///
/// Six base36 characters give ~2.2 billion suffixes per day, so collisions are rare but not impossible. Uniqueness is
/// guaranteed by the UNIQUE constraint on `orders.order_number` and an insert-retry loop in the store, not by this
/// function.
pub fn generate_order_number(tag: &str) -> OrderNumber {
    let date = Utc::now().format("%Y%m%d");
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6).map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char).collect();
    OrderNumber::from(format!("{tag}/{date}/{suffix}"))
}
