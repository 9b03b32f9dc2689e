pub mod config;
pub mod order;
pub mod reference;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    LookupSource, MenuConfig, SanitizedConfig, ServerConfig, TablesConfig,
};
pub use order::{
    CreateOrderRequest, Order, OrderError, OrderFilter, OrderScope, OrderState, OrderStore,
    SqliteOrderStore, TableNumber, Transition,
};
pub use reference::{
    create_menu_lookup, create_table_availability, dish_name, DiningTable, Inventory,
    LookupError, MenuItem, MenuLookup, TableAvailability,
};
