//! # Mapping Profiles
//!
//! One profile per feature area of the store front. Profiles only register
//! rules; the mapper seals and validates them when it is built.
//!
//! ## Key Responsibilities
//!
//! - **ConvertersProfile**: text conversions for timestamps, dates and ids
//! - **UserProfile**: user views, addresses and the user edit form
//! - **ProductProfile**: product and category views
//! - **OrderProfile**: orders and order lines with computed totals
//! - **StaffProfile**: employee and manager views sharing one base mapping

use mapper::{ConfigurationStore, MappingContext, Profile, Result};
use shared::{
    Address, AddressDto, Category, CategoryDto, Employee, EmployeeDto, Manager, ManagerDto, Order,
    OrderDto, OrderLine, OrderLineDto, Product, ProductDto, User, UserDto, UserEditDto,
};

use crate::resolvers::{AgeResolver, YearsOfServiceResolver};

/// Context item naming the currency used in price labels
pub const CURRENCY_ITEM: &str = "currency";
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Default)]
pub struct ConvertersProfile;

impl Profile for ConvertersProfile {
    fn name(&self) -> &str {
        "converters"
    }

    fn configure(&self, store: &mut ConfigurationStore) -> Result<()> {
        store.add_standard_converters()
    }
}

#[derive(Debug, Default)]
pub struct UserProfile;

impl Profile for UserProfile {
    fn name(&self) -> &str {
        "users"
    }

    fn configure(&self, store: &mut ConfigurationStore) -> Result<()> {
        store
            .register_pair::<User, UserDto>()?
            .map_from("full_name", |u: &User| format!("{} {}", u.first_name, u.last_name))
            .resolve_using("age", AgeResolver)
            .condition("email", |u: &User| u.is_active)
            .map_from("order_count", |u: &User| u.orders.len());

        store.register_pair::<Address, AddressDto>()?.reverse();

        // Edits never touch identity, history or credentials
        store
            .register_pair::<UserEditDto, User>()?
            .ignore("id")
            .ignore("birth_date")
            .ignore("address")
            .ignore("orders")
            .ignore("password_hash");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ProductProfile;

impl Profile for ProductProfile {
    fn name(&self) -> &str {
        "products"
    }

    fn configure(&self, store: &mut ConfigurationStore) -> Result<()> {
        store.register_pair::<Category, CategoryDto>()?.reverse();

        store
            .register_pair::<Product, ProductDto>()?
            .map_from("in_stock", |p: &Product| p.stock > 0)
            .map_from_with(
                "price_label",
                |p: &Product, _dto: &ProductDto, context: &MappingContext| {
                    let currency = context
                        .item(CURRENCY_ITEM)
                        .and_then(|value| value.as_str())
                        .unwrap_or(DEFAULT_CURRENCY);
                    format!("{} {:.2}", currency, p.price)
                },
            );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct OrderProfile;

impl Profile for OrderProfile {
    fn name(&self) -> &str {
        "orders"
    }

    fn configure(&self, store: &mut ConfigurationStore) -> Result<()> {
        store
            .register_pair::<OrderLine, OrderLineDto>()?
            .map_from("line_total", line_total);

        store
            .register_pair::<Order, OrderDto>()?
            .map_from("total", |o: &Order| o.lines.iter().map(line_total).sum::<f64>());
        Ok(())
    }
}

fn line_total(line: &OrderLine) -> f64 {
    f64::from(line.quantity) * line.unit_price
}

#[derive(Debug, Default)]
pub struct StaffProfile;

impl Profile for StaffProfile {
    fn name(&self) -> &str {
        "staff"
    }

    fn configure(&self, store: &mut ConfigurationStore) -> Result<()> {
        // Registered before its base on purpose: bases resolve at seal time
        store
            .register_pair::<Manager, ManagerDto>()?
            .include_base::<Employee, EmployeeDto>()
            .map_from("title", |m: &Manager| format!("Head of {}", m.department));

        store
            .register_pair::<Employee, EmployeeDto>()?
            .resolve_using("years_of_service", YearsOfServiceResolver);
        Ok(())
    }
}
