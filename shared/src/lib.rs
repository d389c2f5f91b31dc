//! Domain models and DTOs for the store demo.
//!
//! Domain models carry typed values (`Uuid`, `DateTime<Utc>`, `NaiveDate`);
//! DTOs carry what a view needs, mostly as display text. Every type is
//! described with `mappable!` so the mapper can fill one from the other.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mapper::{mappable, mappable_value};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().unwrap_or_default()
}

fn epoch_date() -> NaiveDate {
    epoch().date_naive()
}

// ============================================================================
// Domain models
// ============================================================================

/// Lifecycle state of an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub category: Option<Category>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub is_active: bool,
    pub address: Option<Address>,
    pub orders: Vec<Order>,
    /// Never exposed through a DTO
    pub password_hash: String,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            birth_date: epoch_date(),
            is_active: false,
            address: None,
            orders: Vec::new(),
            password_hash: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub hired_on: NaiveDate,
    pub salary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manager {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub hired_on: NaiveDate,
    pub salary: f64,
    pub team_size: u32,
    pub department: String,
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub price: f64,
    /// Price formatted with the request currency, e.g. "EUR 12.50"
    pub price_label: String,
    pub in_stock: bool,
    /// Flattened from `category.name`
    pub category_name: Option<String>,
    /// RFC 3339
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressDto {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderLineDto {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDto {
    pub id: String,
    /// RFC 3339
    pub placed_at: String,
    pub status: OrderStatus,
    pub lines: Vec<OrderLineDto>,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub full_name: String,
    /// Only shown for active users
    pub email: Option<String>,
    /// YYYY-MM-DD
    pub birth_date: String,
    pub age: u32,
    pub is_active: bool,
    pub address: Option<AddressDto>,
    /// Flattened from `address.city`
    pub address_city: Option<String>,
    pub orders: Vec<OrderDto>,
    pub order_count: usize,
}

/// Fields a user may change through the edit form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserEditDto {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDto {
    pub id: String,
    pub name: String,
    pub email: String,
    /// YYYY-MM-DD
    pub hired_on: String,
    pub years_of_service: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub hired_on: String,
    pub years_of_service: u32,
    pub team_size: u32,
    pub department: String,
    pub title: String,
}

mappable_value!(OrderStatus);

mappable!(Category {
    id: Uuid,
    name: String,
    description: String,
});
mappable!(Product {
    id: Uuid,
    name: String,
    price: f64,
    stock: u32,
    category: Option<Category>,
    created_at: DateTime<Utc>,
});
mappable!(Address {
    street: String,
    city: String,
    postal_code: String,
    country: String,
});
mappable!(OrderLine {
    product_name: String,
    quantity: u32,
    unit_price: f64,
});
mappable!(Order {
    id: Uuid,
    placed_at: DateTime<Utc>,
    status: OrderStatus,
    lines: Vec<OrderLine>,
});
mappable!(User {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    birth_date: NaiveDate,
    is_active: bool,
    address: Option<Address>,
    orders: Vec<Order>,
    #[write_only]
    password_hash: String,
});
mappable!(Employee {
    id: Uuid,
    name: String,
    email: String,
    hired_on: NaiveDate,
    salary: f64,
});
mappable!(Manager {
    id: Uuid,
    name: String,
    email: String,
    hired_on: NaiveDate,
    salary: f64,
    team_size: u32,
    department: String,
});

mappable!(CategoryDto {
    id: String,
    name: String,
    description: String,
});
mappable!(ProductDto {
    id: String,
    name: String,
    price: f64,
    price_label: String,
    in_stock: bool,
    category_name: Option<String>,
    created_at: String,
});
mappable!(AddressDto {
    street: String,
    city: String,
    postal_code: String,
    country: String,
});
mappable!(OrderLineDto {
    product_name: String,
    quantity: u32,
    unit_price: f64,
    line_total: f64,
});
mappable!(OrderDto {
    id: String,
    placed_at: String,
    status: OrderStatus,
    lines: Vec<OrderLineDto>,
    total: f64,
});
mappable!(UserDto {
    id: String,
    full_name: String,
    email: Option<String>,
    birth_date: String,
    age: u32,
    is_active: bool,
    address: Option<AddressDto>,
    address_city: Option<String>,
    orders: Vec<OrderDto>,
    order_count: usize,
});
mappable!(UserEditDto {
    first_name: String,
    last_name: String,
    email: String,
    is_active: bool,
});
mappable!(EmployeeDto {
    id: String,
    name: String,
    email: String,
    hired_on: String,
    years_of_service: u32,
});
mappable!(ManagerDto {
    id: String,
    name: String,
    email: String,
    hired_on: String,
    years_of_service: u32,
    team_size: u32,
    department: String,
    title: String,
});
