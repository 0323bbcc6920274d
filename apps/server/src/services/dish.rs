//! Dish service: validation and error translation over a `DishStore`.

use std::sync::Arc;

use validator::Validate;

use crate::{
    db::DishStore,
    models::{Dish, DishFilter, DishPatch, NewDish},
    Error, Result,
};

pub struct DishService {
    store: Arc<dyn DishStore>,
}

impl DishService {
    pub fn new(store: Arc<dyn DishStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, dish: NewDish) -> Result<Dish> {
        dish.validate()?;
        let name = dish.name.clone();

        match self.store.create(dish).await {
            Ok(created) => {
                tracing::info!(dish_id = created.id, name = %created.name, "Dish created");
                Ok(created)
            }
            Err(e) if e.is_unique_violation() => Err(name_taken(&name)),
            Err(e) => Err(e),
        }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Dish> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Dish> {
        self.store
            .get_by_name(name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("dish '{name}' not found")))
    }

    pub async fn list(&self, filter: &DishFilter) -> Result<Vec<Dish>> {
        self.store.list(filter).await
    }

    /// The store reports absence before it attempts a write, so an unknown
    /// id is always `NotFound`, never a conflict.
    pub async fn update(&self, id: i64, patch: DishPatch) -> Result<Dish> {
        patch.validate()?;
        let name = patch.name.clone();

        match self.store.update(id, patch).await {
            Ok(Some(updated)) => {
                tracing::info!(dish_id = id, "Dish updated");
                Ok(updated)
            }
            Ok(None) => Err(not_found(id)),
            Err(e) if e.is_unique_violation() => {
                Err(name_taken(name.as_deref().unwrap_or_default()))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(dish_id = id, "Dish deleted");
        Ok(())
    }
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("dish {id} not found"))
}

fn name_taken(name: &str) -> Error {
    Error::AlreadyExists(format!("dish name '{name}' already exists"))
}
