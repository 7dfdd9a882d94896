//! Purchase history and checkout handlers.

use crate::db::Database;
use crate::error::{AppError, Result};
use basket_engine::wire::{CheckoutRequest, OrderResponse, PurchaseHistory};
use serde::Deserialize;

/// Default page size for purchase history.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for purchase history.
const MAX_LIMIT: i64 = 200;

/// Query parameters for purchase history.
#[derive(Debug, Default, Deserialize)]
pub struct PurchaseQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Page through purchase history.
pub fn handle_purchase_history(
    db: &Database,
    user_id: &str,
    query: PurchaseQuery,
) -> Result<PurchaseHistory> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    let offset = query.offset.unwrap_or(0);
    if offset < 0 {
        return Err(AppError::BadRequest("offset must not be negative".to_string()));
    }

    Ok(db.purchase_history(user_id, limit as usize, offset as usize))
}

/// Check out the stored cart.
pub fn handle_checkout(db: &Database, user_id: &str, request: CheckoutRequest) -> Result<OrderResponse> {
    Ok(db.checkout(user_id, request.payment_method, request.payment_status)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_bounded() {
        let db = Database::new();
        for limit in [0, MAX_LIMIT + 1] {
            let query = PurchaseQuery {
                limit: Some(limit),
                offset: None,
            };
            assert!(matches!(
                handle_purchase_history(&db, "u1", query),
                Err(AppError::BadRequest(_))
            ));
        }

        let history = handle_purchase_history(&db, "u1", PurchaseQuery::default()).unwrap();
        assert!(history.items.is_empty());
    }

    #[test]
    fn negative_offset_is_rejected() {
        let query = PurchaseQuery {
            limit: None,
            offset: Some(-1),
        };
        assert!(handle_purchase_history(&Database::new(), "u1", query).is_err());
    }
}
