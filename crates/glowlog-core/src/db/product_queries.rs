//! Product shelf queries.

use jiff::Timestamp;
use rusqlite::{params, types::Type, Row};

use crate::{
    error::{DatabaseResultExt, GlowError, Result},
    models::{Product, ProductId, ProductStatus},
};

const SELECT_PRODUCTS_SQL: &str =
    "SELECT id, name, status, created_at, updated_at FROM products ORDER BY name, id";
const INSERT_PRODUCT_SQL: &str =
    "INSERT INTO products (id, name, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)";
const ACTIVATE_PRODUCT_SQL: &str =
    "UPDATE products SET status = 'active', updated_at = ?1 WHERE id = ?2 AND status != 'active'";
const PRODUCT_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1)";
const DEACTIVATE_UNUSED_PRODUCT_SQL: &str = "UPDATE products SET status = 'shelf', updated_at = ?1 WHERE id = ?2 AND status = 'active' AND NOT EXISTS (SELECT 1 FROM routine_steps WHERE product_id = ?2)";

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

impl super::Database {
    fn build_product_from_row(row: &Row) -> rusqlite::Result<Product> {
        let status = row
            .get::<_, String>(2)?
            .parse::<ProductStatus>()
            .map_err(|e| conversion_error(2, e))?;
        let created_at = row
            .get::<_, String>(3)?
            .parse::<Timestamp>()
            .map_err(|e| conversion_error(3, e.to_string()))?;
        let updated_at = row
            .get::<_, String>(4)?
            .parse::<Timestamp>()
            .map_err(|e| conversion_error(4, e.to_string()))?;

        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            status,
            created_at,
            updated_at,
        })
    }

    pub fn list_products(&self) -> Result<Vec<Product>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_PRODUCTS_SQL)
            .db_context("Failed to prepare query")?;

        let products = stmt
            .query_map([], Self::build_product_from_row)
            .db_context("Failed to query products")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch products")?;

        Ok(products)
    }

    /// Registers a product on the shelf under a fresh id.
    pub fn add_product(&self, name: &str) -> Result<Product> {
        let now = Timestamp::now();
        let product = Product {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            status: ProductStatus::Shelf,
            created_at: now,
            updated_at: now,
        };

        self.connection
            .execute(
                INSERT_PRODUCT_SQL,
                params![
                    &product.id,
                    &product.name,
                    product.status.as_str(),
                    now.to_string(),
                    now.to_string()
                ],
            )
            .db_context("Failed to insert product")?;

        Ok(product)
    }

    /// Marks a product active. Fails for unknown products.
    pub fn activate_product(&self, product_id: &ProductId) -> Result<()> {
        let exists: bool = self
            .connection
            .query_row(PRODUCT_EXISTS_SQL, params![product_id], |row| row.get(0))
            .db_context("Failed to look up product")?;
        if !exists {
            return Err(GlowError::ProductNotFound {
                id: product_id.clone(),
            });
        }

        self.connection
            .execute(
                ACTIVATE_PRODUCT_SQL,
                params![Timestamp::now().to_string(), product_id],
            )
            .db_context("Failed to activate product")?;
        Ok(())
    }

    /// Moves a product back to the shelf when no step references it.
    /// Returns whether the status changed.
    pub fn deactivate_product_if_unused(&self, product_id: &ProductId) -> Result<bool> {
        let changed = self
            .connection
            .execute(
                DEACTIVATE_UNUSED_PRODUCT_SQL,
                params![Timestamp::now().to_string(), product_id],
            )
            .db_context("Failed to deactivate product")?;
        Ok(changed > 0)
    }
}
