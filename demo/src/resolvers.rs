//! Resolvers for DTO members that depend on the current date.
//!
//! Both resolvers read the reference date from the `today` context item
//! (a `YYYY-MM-DD` string) and fall back to the system clock when it is
//! absent, so tests can pin the date.

use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate, Utc};
use mapper::{MappingContext, ValueResolver};
use shared::{Employee, EmployeeDto, User, UserDto};

/// Context item holding the reference date
pub const TODAY_ITEM: &str = "today";

/// The reference date for a mapping call
pub fn today(context: &MappingContext) -> anyhow::Result<NaiveDate> {
    let pinned = context
        .item_as::<NaiveDate>(TODAY_ITEM)
        .context("Context item `today` must be a YYYY-MM-DD date")?;
    Ok(pinned.unwrap_or_else(|| Utc::now().date_naive()))
}

/// Whole years from `from` to `to`; zero when `to` is earlier
pub fn whole_years_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// Computes `UserDto::age` from the birth date
#[derive(Debug, Default)]
pub struct AgeResolver;

impl ValueResolver<User, UserDto> for AgeResolver {
    type Output = u32;

    fn resolve(
        &self,
        source: &User,
        _destination: &UserDto,
        _member: &str,
        context: &MappingContext,
    ) -> anyhow::Result<u32> {
        let today = today(context)?;
        if source.birth_date > today {
            bail!("birth date {} is after {}", source.birth_date, today);
        }
        Ok(whole_years_between(source.birth_date, today))
    }
}

/// Computes `EmployeeDto::years_of_service` from the hire date
#[derive(Debug, Default)]
pub struct YearsOfServiceResolver;

impl ValueResolver<Employee, EmployeeDto> for YearsOfServiceResolver {
    type Output = u32;

    fn resolve(
        &self,
        source: &Employee,
        _destination: &EmployeeDto,
        _member: &str,
        context: &MappingContext,
    ) -> anyhow::Result<u32> {
        Ok(whole_years_between(source.hired_on, today(context)?))
    }
}
