use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::schema::products;

use super::models::{NewProductRow, ProductChangeset, ProductRow};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: product.name,
                description: product.description,
                category: product.category,
                price: product.price,
            })
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)?;
        Ok(row.into())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first::<ProductRow>(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::id.eq_any(ids))
            .select(ProductRow::as_select())
            .load::<ProductRow>(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = products::table.select(ProductRow::as_select()).into_boxed();
        if let Some(category) = &filter.category {
            query = query.filter(products::category.eq(category.clone()));
        }
        if let Some(search) = &filter.search {
            query = query.filter(products::name.ilike(format!("%{}%", search)));
        }
        if filter.active_only {
            query = query.filter(products::active.eq(true));
        }
        let rows = query
            .order((products::category.asc(), products::name.asc()))
            .load::<ProductRow>(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn update(&self, id: Uuid, changes: ProductUpdate) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(products::table.find(id))
            .set(&ProductChangeset::from(changes))
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::DieselProductRepository;
    use crate::domain::ports::ProductRepository;
    use crate::domain::product::{NewProduct, ProductFilter, ProductUpdate};
    use crate::infrastructure::test_db::setup_db;

    fn new_product(name: &str, category: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            category: category.to_string(),
            price: BigDecimal::from_str("2.50").unwrap(),
        }
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn list_applies_search_and_category() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        repo.create(new_product("Sourdough Loaf", "bread")).unwrap();
        repo.create(new_product("Rye Loaf", "bread")).unwrap();
        repo.create(new_product("Croissant", "pastry")).unwrap();

        let loaves = repo
            .list(&ProductFilter {
                search: Some("loaf".to_string()),
                ..ProductFilter::default()
            })
            .expect("list failed");
        assert_eq!(loaves.len(), 2);

        let pastry = repo
            .list(&ProductFilter {
                category: Some("pastry".to_string()),
                ..ProductFilter::default()
            })
            .expect("list failed");
        assert_eq!(pastry.len(), 1);
        assert_eq!(pastry[0].name, "Croissant");
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn update_and_delete() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        let product = repo.create(new_product("Brioche", "pastry")).unwrap();

        let updated = repo
            .update(
                product.id,
                ProductUpdate {
                    active: Some(false),
                    ..ProductUpdate::default()
                },
            )
            .expect("update failed")
            .expect("product should exist");
        assert!(!updated.active);

        assert!(repo.delete(product.id).unwrap());
        assert!(repo.find_by_id(product.id).unwrap().is_none());
        assert!(!repo.delete(product.id).unwrap());
    }
}
