//! # Mapper
//!
//! The typed entry point. A `Mapper` owns a sealed configuration store, the
//! type registry and the plan cache, and is shared by reference (or `Arc`)
//! across threads for the lifetime of the process.
//!
//! ## Key Responsibilities
//!
//! - **Construction**: seal the store and optionally validate it
//! - **Mapping**: encode typed sources, run the compiled plan, decode the
//!   typed destination
//! - **Diagnostics**: expose compiled plans and validation reports

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::config::MapperConfig;
use crate::context::MappingContext;
use crate::descriptor::{Mappable, TypeRegistry};
use crate::error::{MappingError, Result};
use crate::executor::Executor;
use crate::plan::{CompiledPlan, PlanCompiler};
use crate::profile::Profile;
use crate::store::validation::ValidationReport;
use crate::store::{ConfigurationStore, PairKey};

fn encode<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|source| MappingError::Serialization {
        type_name: std::any::type_name::<T>(),
        source,
    })
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| MappingError::Serialization {
        type_name: std::any::type_name::<T>(),
        source,
    })
}

#[derive(Debug)]
pub struct Mapper {
    store: Arc<ConfigurationStore>,
    registry: Arc<TypeRegistry>,
    compiler: PlanCompiler,
    config: MapperConfig,
}

impl Mapper {
    /// Seal `store` and build a mapper with the default configuration.
    pub fn new(store: ConfigurationStore) -> Result<Self> {
        Self::with_config(store, MapperConfig::default())
    }

    pub fn with_config(mut store: ConfigurationStore, config: MapperConfig) -> Result<Self> {
        store.seal()?;

        let store = Arc::new(store);
        let registry = Arc::new(TypeRegistry::new());
        let compiler = PlanCompiler::new(Arc::clone(&store), Arc::clone(&registry));
        let mapper = Self {
            store,
            registry,
            compiler,
            config,
        };

        if mapper.config.validate_on_build || mapper.config.strict_validation {
            let report = mapper.validate()?;
            if mapper.config.strict_validation {
                report.into_strict()?;
            }
        }

        info!(
            pairs = mapper.store.pairs().count(),
            strict = mapper.config.strict_validation,
            max_depth = mapper.config.max_depth,
            "Mapper ready"
        );
        Ok(mapper)
    }

    /// Build a store from profiles, in order, and seal it.
    pub fn from_profiles(profiles: &[&dyn Profile], config: MapperConfig) -> Result<Self> {
        let mut store = ConfigurationStore::new();
        for profile in profiles {
            store.add_profile(*profile)?;
        }
        Self::with_config(store, config)
    }

    /// Map `source` into a new `D`.
    pub fn map<S: Mappable, D: Mappable>(&self, source: &S) -> Result<D> {
        self.map_with_context(source, &mut MappingContext::new())
    }

    /// Like [`map`](Self::map), failing with `NullSource` for `None`.
    pub fn map_option<S: Mappable, D: Mappable>(&self, source: Option<&S>) -> Result<D> {
        match source {
            Some(source) => self.map(source),
            None => Err(MappingError::NullSource {
                pair: PairKey::of::<S, D>(),
            }),
        }
    }

    pub fn map_with_context<S: Mappable, D: Mappable>(
        &self,
        source: &S,
        context: &mut MappingContext,
    ) -> Result<D> {
        let plan = self.get_plan::<S, D>()?;
        let source = encode(source)?;
        let mapped = self.executor().map(&plan, &source, context)?;
        decode(mapped)
    }

    /// Update `destination` from `source`; members the plan does not fill
    /// keep their current values.
    pub fn map_into<S: Mappable, D: Mappable>(
        &self,
        source: &S,
        destination: &mut D,
    ) -> Result<()> {
        self.map_into_with_context(source, destination, &mut MappingContext::new())
    }

    pub fn map_into_with_context<S: Mappable, D: Mappable>(
        &self,
        source: &S,
        destination: &mut D,
        context: &mut MappingContext,
    ) -> Result<()> {
        let plan = self.get_plan::<S, D>()?;
        let source = encode(source)?;
        let mut target = encode(destination)?;
        self.executor().map_into(&plan, &source, &mut target, context)?;
        *destination = decode(target)?;
        Ok(())
    }

    /// Map every element, preserving order.
    pub fn map_all<S: Mappable, D: Mappable>(&self, sources: &[S]) -> Result<Vec<D>> {
        let plan = self.get_plan::<S, D>()?;
        let executor = self.executor();
        sources
            .iter()
            .map(|source| {
                let source = encode(source)?;
                let mapped = executor.map(&plan, &source, &mut MappingContext::new())?;
                decode(mapped)
            })
            .collect()
    }

    /// Map an untyped value through the plan registered for `key`.
    pub fn map_value(
        &self,
        key: &PairKey,
        source: &Value,
        context: &mut MappingContext,
    ) -> Result<Value> {
        let plan = self.plan(key)?;
        self.executor().map(&plan, source, context)
    }

    /// The compiled plan for `S -> D`, compiling it on first use.
    pub fn get_plan<S: Mappable, D: Mappable>(&self) -> Result<Arc<CompiledPlan>> {
        self.plan(&PairKey::of::<S, D>())
    }

    pub fn plan(&self, key: &PairKey) -> Result<Arc<CompiledPlan>> {
        self.compiler.compile(key)
    }

    pub fn validate(&self) -> Result<ValidationReport> {
        self.store.validate(&self.registry)
    }

    pub fn store(&self) -> &ConfigurationStore {
        &self.store
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn compiler(&self) -> &PlanCompiler {
        &self.compiler
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    fn executor(&self) -> Executor<'_> {
        Executor::new(&self.compiler, self.config.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ValueResolver;
    use crate::test_utils::*;
    use anyhow::anyhow;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: 7,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john@example.com".to_string(),
            is_active: true,
            address: Some(Address {
                street: "1 Main St".to_string(),
                city: "Springfield".to_string(),
            }),
            orders: vec![
                Order {
                    id: 1,
                    total: 19.5,
                    status: Status::Shipped,
                },
                Order {
                    id: 2,
                    total: 5.0,
                    status: Status::Pending,
                },
            ],
        }
    }

    fn user_store() -> ConfigurationStore {
        let mut store = ConfigurationStore::new();
        store
            .register_pair::<User, UserDto>()
            .unwrap()
            .map_from("full_name", |u: &User| format!("{} {}", u.first_name, u.last_name));
        store.register_pair::<Address, AddressDto>().unwrap();
        store.register_pair::<Order, OrderDto>().unwrap();
        store
    }

    #[test]
    fn test_round_trip_by_name() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Category, CategoryDto>().unwrap();
        let mapper = Mapper::new(store).unwrap();

        let category = Category {
            id: 4,
            name: "Electronics".to_string(),
        };
        let dto: CategoryDto = mapper.map(&category).unwrap();
        assert_eq!(dto.id, category.id);
        assert_eq!(dto.name, category.name);
    }

    #[test]
    fn test_full_name_expression_and_nested_members() {
        let mapper = Mapper::new(user_store()).unwrap();
        let dto: UserDto = mapper.map(&user()).unwrap();

        assert_eq!(dto.full_name, "John Doe");
        assert_eq!(dto.email.as_deref(), Some("john@example.com"));
        assert_eq!(dto.address_city.as_deref(), Some("Springfield"));
        assert_eq!(
            dto.address,
            Some(AddressDto {
                street: "1 Main St".to_string(),
                city: "Springfield".to_string(),
            })
        );
        assert_eq!(dto.orders.len(), 2);
        assert_eq!(dto.orders[0].id, 1);
        assert_eq!(dto.orders[0].status, Status::Shipped);
        assert_eq!(dto.orders[1].total, 5.0);
    }

    #[test]
    fn test_null_nested_object_maps_to_none() {
        let mapper = Mapper::new(user_store()).unwrap();
        let mut source = user();
        source.address = None;
        source.orders.clear();

        let dto: UserDto = mapper.map(&source).unwrap();
        assert_eq!(dto.address, None);
        assert_eq!(dto.address_city, None);
        assert!(dto.orders.is_empty());
    }

    #[test]
    fn test_sequence_preserves_length_and_order() {
        let mapper = Mapper::new(user_store()).unwrap();
        let mut source = user();
        source.orders = (0..25)
            .map(|id| Order {
                id,
                total: id as f64,
                status: Status::Pending,
            })
            .collect();

        let dto: UserDto = mapper.map(&source).unwrap();
        let ids: Vec<i64> = dto.orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_flattening_with_and_without_category() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Product, ProductDto>().unwrap();
        let mapper = Mapper::new(store).unwrap();

        let mut product = Product {
            id: 1,
            name: "Laptop".to_string(),
            price: 999.0,
            category: Some(Category {
                id: 2,
                name: "Electronics".to_string(),
            }),
            tags: vec!["new".to_string()],
        };
        let dto: ProductDto = mapper.map(&product).unwrap();
        assert_eq!(dto.category_name.as_deref(), Some("Electronics"));

        product.category = None;
        let dto: ProductDto = mapper.map(&product).unwrap();
        assert_eq!(dto.category_name, None);
    }

    #[test]
    fn test_flattening_through_several_levels() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Invoice, InvoiceDto>().unwrap();
        let mapper = Mapper::with_config(store, MapperConfig::strict()).unwrap();

        let mut invoice = Invoice {
            id: 3,
            customer: Some(Customer {
                name: "Ana".to_string(),
                address: Some(CustomerAddress {
                    street: "2 Quai".to_string(),
                    city: Some(City {
                        name: "Lyon".to_string(),
                        country: "France".to_string(),
                    }),
                }),
            }),
        };
        let dto: InvoiceDto = mapper.map(&invoice).unwrap();
        assert_eq!(dto.customer_name.as_deref(), Some("Ana"));
        assert_eq!(dto.customer_address_city_name.as_deref(), Some("Lyon"));

        // A null link partway down the chain leaves the member unset
        if let Some(customer) = invoice.customer.as_mut() {
            customer.address = None;
        }
        let dto: InvoiceDto = mapper.map(&invoice).unwrap();
        assert_eq!(dto.customer_name.as_deref(), Some("Ana"));
        assert_eq!(dto.customer_address_city_name, None);
    }

    #[test]
    fn test_flattening_with_overlapping_prefixes() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Shipment, ShipmentDto>().unwrap();
        let mapper = Mapper::new(store).unwrap();

        let shipment = Shipment {
            address: Some(ShipmentAddress {
                street: "5 Rue".to_string(),
                city: Some(City {
                    name: "Paris".to_string(),
                    country: "France".to_string(),
                }),
                city_zip: "69001".to_string(),
            }),
            address_city: Some(City {
                name: "Lyon".to_string(),
                country: "France".to_string(),
            }),
        };
        let dto: ShipmentDto = mapper.map(&shipment).unwrap();
        assert_eq!(dto.address_city_name.as_deref(), Some("Lyon"));
        assert_eq!(dto.address_city_zip.as_deref(), Some("69001"));
    }

    #[test]
    fn test_strict_mode_rejects_integer_narrowing() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Wide, Narrow>().unwrap();

        let err = Mapper::with_config(store, MapperConfig::strict()).unwrap_err();
        match err {
            MappingError::UnconvertibleMember {
                member,
                source_type,
                destination_type,
                ..
            } => {
                assert_eq!(member, "count");
                assert_eq!(source_type.to_string(), "i64");
                assert_eq!(destination_type.to_string(), "u8");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_integer_narrowing_uses_registered_converter() {
        let mut store = ConfigurationStore::new();
        store
            .add_converter_fn(|count: i64| Ok(u8::try_from(count)?))
            .unwrap();
        store.register_pair::<Wide, Narrow>().unwrap();
        store.register_pair::<Narrow, Wide>().unwrap();
        let mapper = Mapper::with_config(store, MapperConfig::strict()).unwrap();

        let narrow: Narrow = mapper.map(&Wide { count: 200 }).unwrap();
        assert_eq!(narrow.count, 200);

        let err = mapper.map::<Wide, Narrow>(&Wide { count: 300 }).unwrap_err();
        assert!(matches!(
            err,
            MappingError::ConverterExecution { ref member, .. } if member == "count"
        ));

        let wide: Wide = mapper.map(&Narrow { count: 255 }).unwrap();
        assert_eq!(wide.count, 255);
    }

    #[test]
    fn test_lenient_mode_leaves_narrowed_integer_unset() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Wide, Narrow>().unwrap();
        let mapper = Mapper::new(store).unwrap();

        let narrow: Narrow = mapper.map(&Wide { count: -1 }).unwrap();
        assert_eq!(narrow, Narrow::default());
    }

    #[test]
    fn test_condition_keeps_previous_value() {
        let mut store = user_store();
        store
            .register_pair::<User, UserDto>()
            .unwrap()
            .condition("email", |u: &User| u.is_active);
        let mapper = Mapper::new(store).unwrap();

        let mut inactive = user();
        inactive.is_active = false;
        let mut dto = UserDto {
            email: Some("previous@example.com".to_string()),
            ..UserDto::default()
        };
        mapper.map_into(&inactive, &mut dto).unwrap();
        assert_eq!(dto.email.as_deref(), Some("previous@example.com"));
        assert!(!dto.is_active);

        mapper.map_into(&user(), &mut dto).unwrap();
        assert_eq!(dto.email.as_deref(), Some("john@example.com"));
    }

    #[test]
    fn test_map_into_leaves_ignored_members_untouched() {
        let mut store = ConfigurationStore::new();
        store
            .register_pair::<Product, ProductDto>()
            .unwrap()
            .ignore("price");
        let mapper = Mapper::new(store).unwrap();

        let product = Product {
            id: 3,
            name: "Desk".to_string(),
            price: 150.0,
            category: None,
            tags: vec![],
        };
        let mut dto = ProductDto {
            id: 99,
            title: "Existing".to_string(),
            price: 120.0,
            ..ProductDto::default()
        };
        mapper.map_into(&product, &mut dto).unwrap();

        assert_eq!(dto.id, 3);
        assert_eq!(dto.name, "Desk");
        assert_eq!(dto.price, 120.0);
        assert_eq!(dto.title, "Existing");
    }

    #[test]
    fn test_include_base_manager_scenario() {
        let mut store = ConfigurationStore::new();
        store
            .register_pair::<Manager, ManagerDto>()
            .unwrap()
            .include_base::<Employee, EmployeeDto>();
        store
            .register_pair::<Employee, EmployeeDto>()
            .unwrap()
            .map_from("display_name", |e: &Employee| format!("Employee {}", e.name));
        let mapper = Mapper::new(store).unwrap();

        let manager = Manager {
            name: "Sarah".to_string(),
            salary: 0.0,
            team_size: 12,
        };
        let dto: ManagerDto = mapper.map(&manager).unwrap();
        assert_eq!(dto.name, "Sarah");
        assert_eq!(dto.team_size, 12);
        assert_eq!(dto.display_name, "Employee Sarah");
    }

    #[test]
    fn test_derived_rule_overrides_base_rule() {
        let mut store = ConfigurationStore::new();
        store
            .register_pair::<Employee, EmployeeDto>()
            .unwrap()
            .map_from("display_name", |e: &Employee| format!("Employee {}", e.name));
        store
            .register_pair::<Manager, ManagerDto>()
            .unwrap()
            .include_base::<Employee, EmployeeDto>()
            .map_from("display_name", |m: &Manager| format!("Manager of {}", m.team_size));
        let mapper = Mapper::new(store).unwrap();

        let manager = Manager {
            name: "Sarah".to_string(),
            salary: 0.0,
            team_size: 12,
        };
        let dto: ManagerDto = mapper.map(&manager).unwrap();
        assert_eq!(dto.display_name, "Manager of 12");
    }

    #[test]
    fn test_reverse_is_idempotent_for_convention_members() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Category, CategoryDto>().unwrap().reverse();
        let mapper = Mapper::new(store).unwrap();

        let dto = CategoryDto {
            id: 11,
            name: "Garden".to_string(),
        };
        let entity: Category = mapper.map(&dto).unwrap();
        let again: CategoryDto = mapper.map(&entity).unwrap();
        assert_eq!(again, dto);
    }

    #[test]
    fn test_null_source_option() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Category, CategoryDto>().unwrap();
        let mapper = Mapper::new(store).unwrap();

        let err = mapper.map_option::<Category, CategoryDto>(None).unwrap_err();
        assert!(matches!(err, MappingError::NullSource { .. }));
    }

    #[test]
    fn test_unregistered_pair_fails() {
        let mapper = Mapper::new(ConfigurationStore::new()).unwrap();
        let err = mapper
            .map::<Category, CategoryDto>(&Category::default())
            .unwrap_err();
        assert!(matches!(err, MappingError::MissingMapping { .. }));
    }

    struct FailingResolver;

    impl ValueResolver<User, UserDto> for FailingResolver {
        type Output = String;

        fn resolve(
            &self,
            source: &User,
            _destination: &UserDto,
            _member: &str,
            _context: &MappingContext,
        ) -> anyhow::Result<String> {
            Err(anyhow!("no display name for user {}", source.id))
        }
    }

    #[test]
    fn test_resolver_failure_is_surfaced() {
        let mut store = user_store();
        store
            .register_pair::<User, UserDto>()
            .unwrap()
            .resolve_using("full_name", FailingResolver);
        let mapper = Mapper::new(store).unwrap();

        match mapper.map::<User, UserDto>(&user()) {
            Err(MappingError::ResolverExecution { member, source, .. }) => {
                assert_eq!(member, "full_name");
                assert_eq!(source.to_string(), "no display name for user 7");
            }
            other => panic!("expected ResolverExecution, got {:?}", other),
        }
    }

    struct GreetingResolver;

    impl ValueResolver<User, UserDto> for GreetingResolver {
        type Output = String;

        fn resolve(
            &self,
            source: &User,
            destination: &UserDto,
            member: &str,
            context: &MappingContext,
        ) -> anyhow::Result<String> {
            let greeting: String = context
                .item_as("greeting")?
                .unwrap_or_else(|| "Hello".to_string());
            Ok(format!("{} {} ({} after {})", greeting, source.first_name, member, destination.id))
        }
    }

    #[test]
    fn test_resolver_sees_context_and_destination_so_far() {
        let mut store = user_store();
        store
            .register_pair::<User, UserDto>()
            .unwrap()
            .resolve_using("full_name", GreetingResolver);
        let mapper = Mapper::new(store).unwrap();

        let mut context = MappingContext::new().with_item("greeting", "Hi");
        let dto: UserDto = mapper.map_with_context(&user(), &mut context).unwrap();
        assert_eq!(dto.full_name, "Hi John (full_name after 7)");
    }

    #[test]
    fn test_converters_fill_text_members() {
        let mut store = ConfigurationStore::new();
        store.add_standard_converters().unwrap();
        store.register_pair::<Event, EventDto>().unwrap().reverse();
        let mapper = Mapper::with_config(store, MapperConfig::strict()).unwrap();

        let event = Event {
            id: Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap(),
            at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            day: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        };
        let dto: EventDto = mapper.map(&event).unwrap();
        assert_eq!(dto.id, "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert_eq!(dto.at, "2024-01-02T03:04:05+00:00");
        assert_eq!(dto.day, "2024-01-02");

        let back: Event = mapper.map(&dto).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_converter_failure_is_surfaced() {
        let mut store = ConfigurationStore::new();
        store.add_standard_converters().unwrap();
        store.register_pair::<EventDto, Event>().unwrap();
        let mapper = Mapper::new(store).unwrap();

        let dto = EventDto {
            id: "67e55044-10b1-426f-9247-bb680e5fe0c8".to_string(),
            at: "yesterday".to_string(),
            day: "2024-01-02".to_string(),
        };
        let err = mapper.map::<EventDto, Event>(&dto).unwrap_err();
        assert!(matches!(
            err,
            MappingError::ConverterExecution { ref member, .. } if member == "at"
        ));
    }

    #[test]
    fn test_strict_mode_rejects_unconvertible_members() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Event, EventDto>().unwrap();

        let err = Mapper::with_config(store, MapperConfig::strict()).unwrap_err();
        assert!(matches!(err, MappingError::UnconvertibleMember { .. }));
    }

    #[test]
    fn test_lenient_mode_skips_unconvertible_members() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Event, EventDto>().unwrap();
        let mapper = Mapper::new(store).unwrap();

        let dto: EventDto = mapper
            .map(&Event {
                id: Uuid::nil(),
                at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
                day: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            })
            .unwrap();
        assert_eq!(dto, EventDto::default());
    }

    #[test]
    fn test_nested_cycle_is_rejected_at_build() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Left, LeftDto>().unwrap();
        store.register_pair::<Right, RightDto>().unwrap();

        let err = Mapper::new(store).unwrap_err();
        assert!(matches!(err, MappingError::CyclicMapping { .. }));
    }

    #[test]
    fn test_hooks_run_around_steps() {
        let mut store = ConfigurationStore::new();
        store
            .register_pair::<Category, CategoryDto>()
            .unwrap()
            .before(|_: &Category, dto: &mut CategoryDto| dto.name = "before".to_string())
            .after(|source: &Category, dto: &mut CategoryDto| {
                dto.name = format!("{}!", source.name);
            });
        let mapper = Mapper::new(store).unwrap();

        let dto: CategoryDto = mapper
            .map(&Category {
                id: 1,
                name: "Toys".to_string(),
            })
            .unwrap();
        assert_eq!(dto.name, "Toys!");
    }

    #[test]
    fn test_constant_and_null_substitute() {
        let mut store = ConfigurationStore::new();
        store
            .register_pair::<Product, ProductDto>()
            .unwrap()
            .use_value("title", "Catalog item")
            .for_member("category_name", |opt| opt.null_substitute("Uncategorized"));
        let mapper = Mapper::new(store).unwrap();

        let dto: ProductDto = mapper.map(&Product::default()).unwrap();
        assert_eq!(dto.title, "Catalog item");
        assert_eq!(dto.category_name.as_deref(), Some("Uncategorized"));
    }

    #[test]
    fn test_map_all_and_plan_diagnostics() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Category, CategoryDto>().unwrap();
        let mapper = Mapper::new(store).unwrap();

        let categories: Vec<Category> = (1..=3)
            .map(|id| Category {
                id,
                name: format!("c{}", id),
            })
            .collect();
        let dtos: Vec<CategoryDto> = mapper.map_all(&categories).unwrap();
        assert_eq!(dtos.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let plan = mapper.get_plan::<Category, CategoryDto>().unwrap();
        assert_eq!(plan.steps().len(), 2);
        assert!(plan.to_string().contains("name <- copy name"));
    }

    #[test]
    fn test_concurrent_mapping_shares_one_plan() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Category, CategoryDto>().unwrap();
        let mapper = Mapper::new(store).unwrap();
        let mapped = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for id in 0..8 {
                let mapper = &mapper;
                let mapped = &mapped;
                scope.spawn(move || {
                    let dto: CategoryDto = mapper
                        .map(&Category {
                            id,
                            name: "x".to_string(),
                        })
                        .expect("mapping should succeed");
                    assert_eq!(dto.id, id);
                    mapped.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        assert_eq!(mapped.load(Ordering::SeqCst), 8);
        assert_eq!(mapper.compiler().compiled_count(), 1);
    }

    #[test]
    fn test_from_profiles_rejects_registration_after_seal() {
        struct CatalogProfile;

        impl Profile for CatalogProfile {
            fn name(&self) -> &str {
                "catalog"
            }

            fn configure(&self, store: &mut ConfigurationStore) -> Result<()> {
                store.register_pair::<Category, CategoryDto>()?.reverse();
                Ok(())
            }
        }

        let mapper = Mapper::from_profiles(&[&CatalogProfile], MapperConfig::default()).unwrap();
        assert!(mapper.store().is_sealed());
        assert!(mapper.get_plan::<CategoryDto, Category>().is_ok());

        let mut store = ConfigurationStore::new();
        store.seal().unwrap();
        let err = store.add_profile(&CatalogProfile).unwrap_err();
        assert!(matches!(err, MappingError::AlreadySealed { .. }));
    }

    #[test]
    fn test_reflection_error_for_empty_type() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Empty, CategoryDto>().unwrap();

        let err = Mapper::new(store).unwrap_err();
        assert!(matches!(err, MappingError::Reflection { .. }));
    }
}
