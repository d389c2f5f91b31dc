use anyhow::{Context, Result};
use chrono::NaiveDate;
use mapper::{Mapper, MappingContext};
use shared::{Employee, EmployeeDto, Manager, ManagerDto};
use std::sync::Arc;
use tracing::info;

use crate::resolvers::TODAY_ITEM;

/// Service for the staff directory
#[derive(Clone)]
pub struct StaffService {
    mapper: Arc<Mapper>,
    employees: Arc<Vec<Employee>>,
    managers: Arc<Vec<Manager>>,
}

impl StaffService {
    pub fn new(mapper: Arc<Mapper>, employees: Vec<Employee>, managers: Vec<Manager>) -> Self {
        Self {
            mapper,
            employees: Arc::new(employees),
            managers: Arc::new(managers),
        }
    }

    pub fn list_employees(&self, today: NaiveDate) -> Result<Vec<EmployeeDto>> {
        info!("Listing {} employees as of {}", self.employees.len(), today);

        let mut context = Self::context(today);
        self.employees
            .iter()
            .map(|employee| {
                self.mapper
                    .map_with_context(employee, &mut context)
                    .with_context(|| format!("Failed to build view for employee {}", employee.id))
            })
            .collect()
    }

    pub fn list_managers(&self, today: NaiveDate) -> Result<Vec<ManagerDto>> {
        info!("Listing {} managers as of {}", self.managers.len(), today);

        let mut context = Self::context(today);
        self.managers
            .iter()
            .map(|manager| {
                self.mapper
                    .map_with_context(manager, &mut context)
                    .with_context(|| format!("Failed to build view for manager {}", manager.id))
            })
            .collect()
    }

    /// Everyone with at least `years` of service, managers included
    pub fn veterans(&self, years: u32, today: NaiveDate) -> Result<Vec<String>> {
        info!("Listing staff with at least {} years of service", years);

        let employees = self.list_employees(today)?;
        let managers = self.list_managers(today)?;
        let names = employees
            .into_iter()
            .filter(|e| e.years_of_service >= years)
            .map(|e| e.name)
            .chain(
                managers
                    .into_iter()
                    .filter(|m| m.years_of_service >= years)
                    .map(|m| m.name),
            )
            .collect();
        Ok(names)
    }

    fn context(today: NaiveDate) -> MappingContext {
        MappingContext::new().with_item(TODAY_ITEM, today.format("%Y-%m-%d").to_string())
    }
}
