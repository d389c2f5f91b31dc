//! # Mapper Demo
//!
//! A small store front showing how an application wires its domain models
//! to DTOs through the mapper: profiles per feature area, resolvers for
//! computed members and services that hand out views.

pub mod domain;
pub mod profiles;
pub mod resolvers;
pub mod seed;

use mapper::{Mapper, MapperConfig, Profile};

use crate::profiles::{
    ConvertersProfile, OrderProfile, ProductProfile, StaffProfile, UserProfile,
};

/// Build the store front mapper from every profile.
pub fn build_mapper(config: MapperConfig) -> mapper::Result<Mapper> {
    let profiles: [&dyn Profile; 5] = [
        &ConvertersProfile,
        &UserProfile,
        &ProductProfile,
        &OrderProfile,
        &StaffProfile,
    ];
    Mapper::from_profiles(&profiles, config)
}
