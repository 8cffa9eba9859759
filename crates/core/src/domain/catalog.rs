// Catalog Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Game ID (primary key)
pub type GameId = i64;

/// Category ID (primary key)
pub type CategoryId = i64;

/// User ID (primary key)
pub type UserId = i64;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Game Entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category_id: CategoryId,
    /// Filled by point lookups that join the category row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub image: String,
    pub developer_id: UserId,
    pub created_at: i64, // epoch ms
}

impl Game {
    /// Create a game with defaults for the optional columns
    pub fn new(id: GameId, name: impl Into<String>, price: f64, category_id: CategoryId) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            description: String::new(),
            category_id,
            category_name: None,
            image: String::new(),
            developer_id: 1,
            created_at: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    /// Check catalog invariants (the `validate` bulk action)
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::EmptyName);
        }
        let name_len = self.name.chars().count();
        if name_len > MAX_NAME_LEN {
            return Err(DomainError::NameTooLong(name_len));
        }
        if !self.price.is_finite() {
            return Err(DomainError::NonFinitePrice);
        }
        if self.price < 0.0 {
            return Err(DomainError::NegativePrice(self.price));
        }
        let description_len = self.description.chars().count();
        if description_len > MAX_DESCRIPTION_LEN {
            return Err(DomainError::DescriptionTooLong(description_len));
        }
        if self.category_id < 1 {
            return Err(DomainError::InvalidCategory(self.category_id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: UserId,
    pub game_id: GameId,
    pub rating: i32,
    pub comment: String,
    pub created_at: i64, // epoch ms
}

impl Review {
    pub fn new(id: i64, user_id: UserId, game_id: GameId, rating: i32) -> Result<Self> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::InvalidRating(rating));
        }
        Ok(Self {
            id,
            user_id,
            game_id,
            rating,
            comment: String::new(),
            created_at: 0,
        })
    }

    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Developer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Developer => "developer",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "developer" => Ok(Role::Developer),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_banned: bool,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            email: format!("{}@gamehub.local", name.to_lowercase()),
            name,
            role: Role::User,
            is_banned: false,
        }
    }

    pub fn banned(mut self) -> Self {
        self.is_banned = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnershipStatus {
    Owned,
    Wishlisted,
}

impl OwnershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnershipStatus::Owned => "owned",
            OwnershipStatus::Wishlisted => "wishlisted",
        }
    }
}

/// User-game link; every row counts as a sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    pub id: i64,
    pub user_id: UserId,
    pub game_id: GameId,
    pub status: OwnershipStatus,
}

impl Ownership {
    pub fn owned(id: i64, user_id: UserId, game_id: GameId) -> Self {
        Self {
            id,
            user_id,
            game_id,
            status: OwnershipStatus::Owned,
        }
    }

    pub fn wishlisted(id: i64, user_id: UserId, game_id: GameId) -> Self {
        Self {
            status: OwnershipStatus::Wishlisted,
            ..Self::owned(id, user_id, game_id)
        }
    }
}
