//! Minimal product shelf entry.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ProductId, ProductStatus};

/// A product known to the shelf. Only its status is managed by the routine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub status: ProductStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
