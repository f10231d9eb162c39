use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::recipes::repo_types::{NewRecipe, Recipe, RecipeWithOwner};

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{0}")]
    Conflict(String),
    /// The row, or the row a foreign key points at, does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for users and their recipes.
///
/// Every write is atomic: it either fully commits or leaves nothing behind.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    /// Removes the user together with all of their recipes.
    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError>;

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, StoreError>;
    /// Recipes in creation order; `owner = None` lists everyone's.
    async fn list_recipes(&self, owner: Option<Uuid>) -> Result<Vec<RecipeWithOwner>, StoreError>;
}

pub mod memory {
    use super::*;
    use time::OffsetDateTime;
    use tokio::sync::RwLock;

    #[derive(Default)]
    struct Tables {
        users: Vec<User>,
        recipes: Vec<Recipe>,
    }

    /// Process-local store with the same constraints as the Postgres schema.
    #[derive(Default)]
    pub struct MemoryStore {
        tables: RwLock<Tables>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn user_count(&self) -> usize {
            self.tables.read().await.users.len()
        }

        pub async fn recipe_count(&self) -> usize {
            self.tables.read().await.recipes.len()
        }
    }

    fn with_owner(recipe: &Recipe, owner: &User) -> RecipeWithOwner {
        RecipeWithOwner {
            id: recipe.id,
            user_id: recipe.user_id,
            title: recipe.title.clone(),
            instructions: recipe.instructions.clone(),
            minutes_to_complete: recipe.minutes_to_complete,
            created_at: recipe.created_at,
            username: owner.username.clone(),
            image_url: owner.image_url.clone(),
            bio: owner.bio.clone(),
        }
    }

    #[async_trait]
    impl Store for MemoryStore {
        async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
            let mut tables = self.tables.write().await;
            if tables.users.iter().any(|u| u.username == user.username) {
                return Err(StoreError::Conflict("Username already exists".into()));
            }
            let user = User {
                id: Uuid::new_v4(),
                username: user.username,
                password_hash: user.password_hash,
                image_url: user.image_url,
                bio: user.bio,
                created_at: OffsetDateTime::now_utc(),
            };
            tables.users.push(user.clone());
            Ok(user)
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
            let tables = self.tables.read().await;
            Ok(tables.users.iter().find(|u| u.id == id).cloned())
        }

        async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
            let tables = self.tables.read().await;
            Ok(tables.users.iter().find(|u| u.username == username).cloned())
        }

        async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
            let mut tables = self.tables.write().await;
            let before = tables.users.len();
            tables.users.retain(|u| u.id != id);
            if tables.users.len() == before {
                return Err(StoreError::NotFound("user"));
            }
            tables.recipes.retain(|r| r.user_id != id);
            Ok(())
        }

        async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
            let mut tables = self.tables.write().await;
            if !tables.users.iter().any(|u| u.id == recipe.user_id) {
                return Err(StoreError::NotFound("user"));
            }
            let recipe = Recipe {
                id: Uuid::new_v4(),
                user_id: recipe.user_id,
                title: recipe.title,
                instructions: recipe.instructions,
                minutes_to_complete: recipe.minutes_to_complete,
                created_at: OffsetDateTime::now_utc(),
            };
            tables.recipes.push(recipe.clone());
            Ok(recipe)
        }

        async fn list_recipes(
            &self,
            owner: Option<Uuid>,
        ) -> Result<Vec<RecipeWithOwner>, StoreError> {
            let tables = self.tables.read().await;
            let rows = tables
                .recipes
                .iter()
                .filter(|r| owner.map_or(true, |id| r.user_id == id))
                .filter_map(|r| {
                    tables
                        .users
                        .iter()
                        .find(|u| u.id == r.user_id)
                        .map(|u| with_owner(r, u))
                })
                .collect();
            Ok(rows)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        const STEPS: &str =
            "Simmer the tomatoes with garlic and basil for at least thirty minutes, then blend.";

        fn new_user(name: &str) -> NewUser {
            NewUser {
                username: name.into(),
                password_hash: "$argon2id$fake".into(),
                image_url: None,
                bio: None,
            }
        }

        #[tokio::test]
        async fn duplicate_username_conflicts_and_keeps_original() {
            let store = MemoryStore::new();
            let first = store.create_user(new_user("ana")).await.unwrap();
            let err = store.create_user(new_user("ana")).await.unwrap_err();
            assert!(matches!(err, StoreError::Conflict(_)));
            assert_eq!(store.user_count().await, 1);
            let found = store.find_user_by_username("ana").await.unwrap().unwrap();
            assert_eq!(found.id, first.id);
        }

        #[tokio::test]
        async fn recipe_requires_existing_owner() {
            let store = MemoryStore::new();
            let recipe = NewRecipe::new(Uuid::new_v4(), "Sauce", STEPS, 30).unwrap();
            let err = store.create_recipe(recipe).await.unwrap_err();
            assert!(matches!(err, StoreError::NotFound("user")));
            assert_eq!(store.recipe_count().await, 0);
        }

        #[tokio::test]
        async fn list_filters_by_owner() {
            let store = MemoryStore::new();
            let ana = store.create_user(new_user("ana")).await.unwrap();
            let ben = store.create_user(new_user("ben")).await.unwrap();
            for (owner, title) in [(ana.id, "Sauce"), (ben.id, "Stew"), (ana.id, "Soup")] {
                let r = NewRecipe::new(owner, title, STEPS, 20).unwrap();
                store.create_recipe(r).await.unwrap();
            }

            let mine = store.list_recipes(Some(ana.id)).await.unwrap();
            let titles: Vec<_> = mine.iter().map(|r| r.title.as_str()).collect();
            assert_eq!(titles, ["Sauce", "Soup"]);
            assert!(mine.iter().all(|r| r.username == "ana"));

            assert_eq!(store.list_recipes(None).await.unwrap().len(), 3);
        }

        #[tokio::test]
        async fn delete_user_cascades_recipes() {
            let store = MemoryStore::new();
            let ana = store.create_user(new_user("ana")).await.unwrap();
            let ben = store.create_user(new_user("ben")).await.unwrap();
            store
                .create_recipe(NewRecipe::new(ana.id, "Sauce", STEPS, 20).unwrap())
                .await
                .unwrap();
            store
                .create_recipe(NewRecipe::new(ben.id, "Stew", STEPS, 90).unwrap())
                .await
                .unwrap();

            store.delete_user(ana.id).await.unwrap();

            assert!(store.find_user_by_id(ana.id).await.unwrap().is_none());
            let left = store.list_recipes(None).await.unwrap();
            assert_eq!(left.len(), 1);
            assert_eq!(left[0].user_id, ben.id);
            assert!(matches!(
                store.delete_user(ana.id).await,
                Err(StoreError::NotFound("user"))
            ));
        }
    }
}
