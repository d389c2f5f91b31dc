//! Fixture types shared by the unit tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::descriptor::{Mappable, MemberDescriptor, ObjectType, Semantic, SemanticType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub category: Option<Category>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub price: f64,
    pub category_name: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressDto {
    pub street: String,
    pub city: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Pending,
    Shipped,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub total: f64,
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDto {
    pub id: i64,
    pub total: f64,
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub address: Option<Address>,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub address: Option<AddressDto>,
    pub address_city: Option<String>,
    pub orders: Vec<OrderDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub salary: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDto {
    pub name: String,
    pub salary: f64,
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manager {
    pub name: String,
    pub salary: f64,
    pub team_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerDto {
    pub name: String,
    pub salary: f64,
    pub display_name: String,
    pub team_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub day: NaiveDate,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            at: Utc.timestamp_opt(0, 0).unwrap(),
            day: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDto {
    pub id: String,
    pub at: String,
    pub day: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub child: Option<Box<Node>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDto {
    pub name: String,
    pub child: Option<Box<NodeDto>>,
}

// Required members in both directions: no finite value exists, so these
// types are only ever compiled and validated, never instantiated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Left {
    pub right: Box<Right>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Right {
    pub left: Box<Left>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeftDto {
    pub right: Box<RightDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RightDto {
    pub left: Box<LeftDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wide {
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Narrow {
    pub count: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerAddress {
    pub street: String,
    pub city: Option<City>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub address: Option<CustomerAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub customer: Option<Customer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDto {
    pub id: i64,
    pub customer_name: Option<String>,
    pub customer_address_city_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentAddress {
    pub street: String,
    pub city: Option<City>,
    pub city_zip: String,
}

/// Both `address` and `address_city` start the same flattened names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub address: Option<ShipmentAddress>,
    pub address_city: Option<City>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentDto {
    pub address_city_name: Option<String>,
    pub address_city_zip: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Empty {}

/// Its only member is neither readable nor writable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Secretive {
    pub token: String,
}

impl Semantic for Secretive {
    fn semantic_type() -> SemanticType {
        SemanticType::Object(ObjectType::of::<Secretive>())
    }
}

impl Mappable for Secretive {
    fn members() -> Vec<MemberDescriptor> {
        vec![MemberDescriptor::new("token", SemanticType::Text)
            .read_only()
            .write_only()]
    }
}

crate::mappable_value!(Status);

crate::mappable!(Category { id: i64, name: String });
crate::mappable!(CategoryDto { id: i64, name: String });
crate::mappable!(Product {
    id: i64,
    name: String,
    price: f64,
    category: Option<Category>,
    tags: Vec<String>,
});
crate::mappable!(ProductDto {
    id: i64,
    name: String,
    title: String,
    price: f64,
    category_name: Option<String>,
    tags: Vec<String>,
});
crate::mappable!(Address { street: String, city: String });
crate::mappable!(AddressDto { street: String, city: String });
crate::mappable!(Order { id: i64, total: f64, status: Status });
crate::mappable!(OrderDto { id: i64, total: f64, status: Status });
crate::mappable!(User {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    is_active: bool,
    address: Option<Address>,
    orders: Vec<Order>,
});
crate::mappable!(UserDto {
    id: i64,
    first_name: String,
    last_name: String,
    full_name: String,
    email: Option<String>,
    is_active: bool,
    address: Option<AddressDto>,
    address_city: Option<String>,
    orders: Vec<OrderDto>,
});
crate::mappable!(Employee { name: String, salary: f64 });
crate::mappable!(EmployeeDto { name: String, salary: f64, display_name: String });
crate::mappable!(Manager { name: String, salary: f64, team_size: u32 });
crate::mappable!(ManagerDto {
    name: String,
    salary: f64,
    display_name: String,
    team_size: u32,
});
crate::mappable!(Event { id: Uuid, at: DateTime<Utc>, day: NaiveDate });
crate::mappable!(EventDto { id: String, at: String, day: String });
crate::mappable!(Node { name: String, child: Option<Box<Node>> });
crate::mappable!(NodeDto { name: String, child: Option<Box<NodeDto>> });
crate::mappable!(Left { right: Box<Right> });
crate::mappable!(Right { left: Box<Left> });
crate::mappable!(LeftDto { right: Box<RightDto> });
crate::mappable!(RightDto { left: Box<LeftDto> });
crate::mappable!(Wide { count: i64 });
crate::mappable!(Narrow { count: u8 });
crate::mappable!(City { name: String, country: String });
crate::mappable!(CustomerAddress { street: String, city: Option<City> });
crate::mappable!(Customer { name: String, address: Option<CustomerAddress> });
crate::mappable!(Invoice { id: i64, customer: Option<Customer> });
crate::mappable!(InvoiceDto {
    id: i64,
    customer_name: Option<String>,
    customer_address_city_name: Option<String>,
});
crate::mappable!(ShipmentAddress {
    street: String,
    city: Option<City>,
    city_zip: String,
});
crate::mappable!(Shipment {
    address: Option<ShipmentAddress>,
    address_city: Option<City>,
});
crate::mappable!(ShipmentDto {
    address_city_name: Option<String>,
    address_city_zip: Option<String>,
});
crate::mappable!(Empty {});
