//! # Domain Module
//!
//! Services for the store front. Each service owns its in-memory records and
//! hands out DTOs built by a shared [`mapper::Mapper`]; callers never see the
//! domain models directly.
//!
//! ## Module Organization
//!
//! - **user_service**: user views and profile edits
//! - **catalog_service**: product listings and category imports
//! - **staff_service**: employee and manager directories
//!
//! ## Key Responsibilities
//!
//! - **View Building**: Mapping domain records into DTOs per request
//! - **Request Context**: Passing the reference date and currency to the mapper
//! - **Edits**: Applying DTO edits onto stored records in place

pub mod catalog_service;
pub mod staff_service;
pub mod user_service;

pub use catalog_service::CatalogService;
pub use staff_service::StaffService;
pub use user_service::UserService;
