//! Mutations on a collection.
//!
//! Changes are expressed as mutation values rather than direct edits, so the
//! same value can be applied locally and then sent to the remote gateway.

use crate::{error::Result, Error, ProductId, ProductSnapshot};

/// A change to a cart or wishlist.
///
/// Constructors validate their input: product ids must be non-empty and
/// added quantities at least 1.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert the product, or bump its quantity when already present
    Add {
        product: ProductSnapshot,
        quantity: u32,
    },
    /// Delete the product if present
    Remove { product_id: ProductId },
    /// Set an absolute quantity (cart only)
    SetQuantity { product_id: ProductId, quantity: u32 },
}

fn check_product_id(product_id: &str) -> Result<()> {
    if product_id.trim().is_empty() {
        return Err(Error::InvalidProductId);
    }
    Ok(())
}

impl Mutation {
    /// Create an add mutation.
    pub fn add(product: ProductSnapshot, quantity: u32) -> Result<Self> {
        check_product_id(&product.product_id)?;
        if quantity == 0 {
            return Err(Error::InvalidQuantity(0));
        }
        Ok(Mutation::Add { product, quantity })
    }

    /// Create a remove mutation.
    pub fn remove(product_id: impl Into<ProductId>) -> Result<Self> {
        let product_id = product_id.into();
        check_product_id(&product_id)?;
        Ok(Mutation::Remove { product_id })
    }

    /// Create a quantity update. A quantity of zero or less removes the item.
    pub fn set_quantity(product_id: impl Into<ProductId>, quantity: i64) -> Result<Self> {
        let product_id = product_id.into();
        check_product_id(&product_id)?;
        if quantity <= 0 {
            return Ok(Mutation::Remove { product_id });
        }
        let quantity = u32::try_from(quantity).map_err(|_| Error::InvalidQuantity(quantity))?;
        Ok(Mutation::SetQuantity {
            product_id,
            quantity,
        })
    }

    /// The product this mutation targets.
    pub fn product_id(&self) -> &str {
        match self {
            Mutation::Add { product, .. } => &product.product_id,
            Mutation::Remove { product_id } => product_id,
            Mutation::SetQuantity { product_id, .. } => product_id,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Add { .. } => "add",
            Mutation::Remove { .. } => "remove",
            Mutation::SetQuantity { .. } => "set_quantity",
        }
    }
}
