use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use mapper::{Mapper, MappingContext};
use shared::{User, UserDto, UserEditDto};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::resolvers::TODAY_ITEM;

/// Service for viewing and editing users
#[derive(Clone)]
pub struct UserService {
    mapper: Arc<Mapper>,
    users: Arc<RwLock<Vec<User>>>,
}

impl UserService {
    pub fn new(mapper: Arc<Mapper>, users: Vec<User>) -> Self {
        Self {
            mapper,
            users: Arc::new(RwLock::new(users)),
        }
    }

    /// All users as seen on `today`
    pub fn list_users(&self, today: NaiveDate) -> Result<Vec<UserDto>> {
        info!("Listing users as of {}", today);

        let users = self.users.read().map_err(|_| anyhow!("User store lock poisoned"))?;
        users
            .iter()
            .map(|user| self.to_view(user, today))
            .collect()
    }

    pub fn get_user(&self, id: Uuid, today: NaiveDate) -> Result<Option<UserDto>> {
        info!("Getting user: {}", id);

        let users = self.users.read().map_err(|_| anyhow!("User store lock poisoned"))?;
        users
            .iter()
            .find(|user| user.id == id)
            .map(|user| self.to_view(user, today))
            .transpose()
    }

    /// Apply an edit form to a stored user and return the refreshed view
    pub fn update_user(&self, id: Uuid, edit: &UserEditDto, today: NaiveDate) -> Result<UserDto> {
        info!("Updating user: {}", id);

        self.validate_edit(edit)?;

        let mut users = self.users.write().map_err(|_| anyhow!("User store lock poisoned"))?;
        let Some(user) = users.iter_mut().find(|user| user.id == id) else {
            warn!("User not found: {}", id);
            return Err(anyhow!("User not found: {}", id));
        };

        self.mapper
            .map_into(edit, user)
            .with_context(|| format!("Failed to apply edit to user {}", id))?;
        self.to_view(user, today)
    }

    fn to_view(&self, user: &User, today: NaiveDate) -> Result<UserDto> {
        let mut context =
            MappingContext::new().with_item(TODAY_ITEM, today.format("%Y-%m-%d").to_string());
        self.mapper
            .map_with_context(user, &mut context)
            .with_context(|| format!("Failed to build view for user {}", user.id))
    }

    fn validate_edit(&self, edit: &UserEditDto) -> Result<()> {
        if edit.first_name.trim().is_empty() || edit.last_name.trim().is_empty() {
            return Err(anyhow!("First and last name cannot be empty"));
        }

        if !edit.email.contains('@') {
            return Err(anyhow!("Invalid email address: {}", edit.email));
        }

        Ok(())
    }
}
