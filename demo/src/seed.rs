//! Sample store data.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use shared::{Address, Category, Employee, Manager, Order, OrderLine, OrderStatus, Product, User};
use uuid::Uuid;

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("Invalid date {}-{}-{}", year, month, day))
}

fn timestamp(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .with_context(|| {
            format!("Invalid timestamp {}-{}-{} {}:{}", year, month, day, hour, minute)
        })
}

pub fn categories() -> Vec<Category> {
    vec![
        Category {
            id: Uuid::from_u128(0x1000),
            name: "Books".to_string(),
            description: "Paper and ebooks".to_string(),
        },
        Category {
            id: Uuid::from_u128(0x1001),
            name: "Stationery".to_string(),
            description: "Pens, notebooks and paper".to_string(),
        },
    ]
}

pub fn products() -> Result<Vec<Product>> {
    let categories = categories();
    Ok(vec![
        Product {
            id: Uuid::from_u128(0x2000),
            name: "Programming Rust".to_string(),
            price: 12.5,
            stock: 14,
            category: Some(categories[0].clone()),
            created_at: timestamp(2026, 1, 5, 9, 0)?,
        },
        Product {
            id: Uuid::from_u128(0x2001),
            name: "Dot grid notebook".to_string(),
            price: 7.25,
            stock: 40,
            category: Some(categories[1].clone()),
            created_at: timestamp(2026, 2, 17, 14, 45)?,
        },
        Product {
            id: Uuid::from_u128(0x2002),
            name: "Gel pen".to_string(),
            price: 3.0,
            stock: 0,
            category: None,
            created_at: timestamp(2026, 3, 1, 8, 15)?,
        },
    ])
}

pub fn users() -> Result<Vec<User>> {
    Ok(vec![
        User {
            id: Uuid::from_u128(0x3000),
            first_name: "Alice".to_string(),
            last_name: "Martin".to_string(),
            email: "alice@example.com".to_string(),
            birth_date: date(1990, 4, 12)?,
            is_active: true,
            address: Some(Address {
                street: "12 rue Mercière".to_string(),
                city: "Lyon".to_string(),
                postal_code: "69002".to_string(),
                country: "France".to_string(),
            }),
            orders: vec![
                Order {
                    id: Uuid::from_u128(0x4000),
                    placed_at: timestamp(2026, 9, 1, 10, 30)?,
                    status: OrderStatus::Delivered,
                    lines: vec![
                        OrderLine {
                            product_name: "Programming Rust".to_string(),
                            quantity: 2,
                            unit_price: 12.5,
                        },
                        OrderLine {
                            product_name: "Gel pen".to_string(),
                            quantity: 1,
                            unit_price: 3.0,
                        },
                    ],
                },
                Order {
                    id: Uuid::from_u128(0x4001),
                    placed_at: timestamp(2026, 10, 12, 16, 5)?,
                    status: OrderStatus::Shipped,
                    lines: vec![OrderLine {
                        product_name: "Dot grid notebook".to_string(),
                        quantity: 3,
                        unit_price: 7.25,
                    }],
                },
            ],
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$aGFzaA".to_string(),
        },
        User {
            id: Uuid::from_u128(0x3001),
            first_name: "Bob".to_string(),
            last_name: "Nguyen".to_string(),
            email: "bob@example.com".to_string(),
            birth_date: date(2001, 11, 30)?,
            is_active: false,
            address: None,
            orders: Vec::new(),
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$Ym9i".to_string(),
        },
    ])
}

pub fn employees() -> Result<Vec<Employee>> {
    Ok(vec![
        Employee {
            id: Uuid::from_u128(0x5000),
            name: "David Okafor".to_string(),
            email: "david@example.com".to_string(),
            hired_on: date(2021, 6, 14)?,
            salary: 42_000.0,
        },
        Employee {
            id: Uuid::from_u128(0x5001),
            name: "Emma Rossi".to_string(),
            email: "emma@example.com".to_string(),
            hired_on: date(2024, 11, 4)?,
            salary: 38_500.0,
        },
    ])
}

pub fn managers() -> Result<Vec<Manager>> {
    Ok(vec![Manager {
        id: Uuid::from_u128(0x6000),
        name: "Claire Dubois".to_string(),
        email: "claire@example.com".to_string(),
        hired_on: date(2015, 3, 2)?,
        salary: 61_000.0,
        team_size: 8,
        department: "Logistics".to_string(),
    }])
}
