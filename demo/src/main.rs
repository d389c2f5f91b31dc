use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use mapper::MapperConfig;
use mapper_demo::domain::{CatalogService, StaffService, UserService};
use mapper_demo::{build_mapper, seed};
use shared::UserEditDto;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable naming an optional JSON mapper config file
const CONFIG_ENV: &str = "MAPPER_CONFIG";

fn load_config() -> Result<MapperConfig> {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return Ok(MapperConfig::strict());
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read mapper config {}", path))?;
    MapperConfig::from_json_str(&raw).with_context(|| format!("Invalid mapper config {}", path))
}

fn print_json<T: serde::Serialize>(title: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("== {} ==\n{}", title, json);
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config()?;
    info!("Building mapper: {:?}", config);
    let mapper = Arc::new(build_mapper(config).context("Failed to build mapper")?);

    let report = mapper.validate()?;
    for issue in report.issues() {
        info!("Mapping note: {}", issue);
    }

    let today = Utc::now().date_naive();
    let users = UserService::new(Arc::clone(&mapper), seed::users()?);
    let catalog = CatalogService::new(Arc::clone(&mapper), seed::products()?, seed::categories());
    let staff = StaffService::new(Arc::clone(&mapper), seed::employees()?, seed::managers()?);

    print_json("users", &users.list_users(today)?)?;
    print_json("products", &catalog.list_products("EUR")?)?;
    print_json("categories", &catalog.list_categories()?)?;
    print_json("employees", &staff.list_employees(today)?)?;
    print_json("managers", &staff.list_managers(today)?)?;

    let bob = seed::users()?
        .into_iter()
        .find(|user| user.first_name == "Bob")
        .context("Seed data is missing Bob")?;
    let edit = UserEditDto {
        first_name: bob.first_name,
        last_name: bob.last_name,
        email: "bob.nguyen@example.com".to_string(),
        is_active: true,
    };
    print_json("reactivated user", &users.update_user(bob.id, &edit, today)?)?;

    let plan = mapper.get_plan::<shared::User, shared::UserDto>()?;
    println!("== plan ==\n{}", plan);
    info!("Compiled {} plans", mapper.compiler().compiled_count());

    Ok(())
}
