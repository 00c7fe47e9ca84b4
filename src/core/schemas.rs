//! Database schema definitions for the inventory store.
//!
//! All four record kinds live in a single SQLite database. Bag references are
//! plain TEXT columns without FOREIGN KEY clauses: referential integrity is
//! checked by presence only, and the delete gate is enforced by the handlers.

pub const INVENTORY_DB_NAME: &str = "inventory.db";
pub const INVENTORY_EVENTS_NAME: &str = "inventory.events.jsonl";

pub const INVENTORY_SCHEMA_VERSION: u32 = 1;

pub const INVENTORY_DB_SCHEMA_META: &str = "
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
";

pub const INVENTORY_DB_SCHEMA_CATEGORIES: &str = "
    CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        image TEXT NOT NULL
    )
";

pub const INVENTORY_DB_SCHEMA_FABRICS: &str = "
    CREATE TABLE IF NOT EXISTS fabrics (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        image TEXT NOT NULL
    )
";

pub const INVENTORY_DB_SCHEMA_COLORS: &str = "
    CREATE TABLE IF NOT EXISTS colors (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        image TEXT NOT NULL,
        display_order INTEGER NOT NULL DEFAULT 0
    )
";

pub const INVENTORY_DB_SCHEMA_BAGS: &str = "
    CREATE TABLE IF NOT EXISTS bags (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        price REAL NOT NULL,
        stock INTEGER NOT NULL,
        category_id TEXT NOT NULL,
        fabric_id TEXT NOT NULL,
        color_id TEXT NOT NULL
    )
";

pub const INVENTORY_DB_SCHEMA_INDEX_BAGS_CATEGORY: &str =
    "CREATE INDEX IF NOT EXISTS idx_bags_category ON bags(category_id)";
pub const INVENTORY_DB_SCHEMA_INDEX_BAGS_FABRIC: &str =
    "CREATE INDEX IF NOT EXISTS idx_bags_fabric ON bags(fabric_id)";
pub const INVENTORY_DB_SCHEMA_INDEX_BAGS_COLOR: &str =
    "CREATE INDEX IF NOT EXISTS idx_bags_color ON bags(color_id)";
pub const INVENTORY_DB_SCHEMA_INDEX_BAGS_PRICE: &str =
    "CREATE INDEX IF NOT EXISTS idx_bags_price ON bags(price)";
pub const INVENTORY_DB_SCHEMA_INDEX_COLORS_ORDER: &str =
    "CREATE INDEX IF NOT EXISTS idx_colors_display_order ON colors(display_order)";
