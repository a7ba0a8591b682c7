//! SQLite-backed component catalog and configuration store.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use crate::model::{CompatibilityStatus, Component, ComponentKind, Configuration, ModelError};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Lock error: {0}")]
    Lock(String),
    #[error("Invalid component: {0}")]
    Validation(#[from] ModelError),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("Component {id} is part of {configurations} configuration(s) and cannot be deleted")]
    ComponentInUse { id: i64, configurations: i64 },
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS components (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK (length(trim(type)) > 0),
        price REAL NOT NULL CHECK (price >= 0),
        quantity INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
        specifications TEXT,
        socket TEXT,
        memory_type TEXT,
        form_factor TEXT,
        power_watts INTEGER,
        max_memory_gb INTEGER
    );

    CREATE TABLE IF NOT EXISTS configurations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        total_price REAL NOT NULL,
        created_at TEXT NOT NULL,
        compatibility_status TEXT NOT NULL DEFAULT 'UNCHECKED'
    );

    CREATE TABLE IF NOT EXISTS configuration_items (
        configuration_id INTEGER NOT NULL REFERENCES configurations(id) ON DELETE CASCADE,
        component_id INTEGER NOT NULL REFERENCES components(id),
        quantity INTEGER NOT NULL DEFAULT 1,
        position INTEGER NOT NULL,
        PRIMARY KEY (configuration_id, position)
    );

    CREATE INDEX IF NOT EXISTS idx_configuration_items_component
        ON configuration_items(component_id);
";

const COMPONENT_COLUMNS: &str = "c.id, c.name, c.type, c.price, c.quantity, c.specifications, \
     c.socket, c.memory_type, c.form_factor, c.power_watts, c.max_memory_gb";

/// Stock summary for one component type.
#[derive(Debug, Clone, Serialize)]
pub struct KindInventory {
    pub kind: ComponentKind,
    pub components: i64,
    pub units: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub kinds: Vec<KindInventory>,
    pub total_components: i64,
    pub total_units: i64,
    pub total_value: f64,
    pub low_stock_threshold: u32,
    /// Components with fewer units in stock than the threshold.
    pub low_stock: Vec<Component>,
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.initialize()?;
        Ok(db)
    }

    fn get_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DatabaseError::Lock(e.to_string()))
    }

    pub fn initialize(&self) -> Result<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("schema ready");
        Ok(())
    }

    /// Loads the sample catalog into an empty component table. Returns the
    /// number of components inserted (zero when the catalog already has data).
    pub fn seed_sample_data(&self) -> Result<usize> {
        let mut conn = self.get_conn()?;
        let existing: i64 = conn.query_row("SELECT COUNT(*) FROM components", [], |row| row.get(0))?;
        if existing > 0 {
            tracing::debug!(existing, "catalog not empty, skipping seed data");
            return Ok(0);
        }

        let samples = sample_components();
        let tx = conn.transaction()?;
        for component in &samples {
            insert_component(&tx, component)?;
        }
        tx.commit()?;

        tracing::info!(count = samples.len(), "sample catalog loaded");
        Ok(samples.len())
    }

    // Component methods

    pub fn add_component(&self, component: &Component) -> Result<i64> {
        component.validate()?;
        let conn = self.get_conn()?;
        let id = insert_component(&conn, component)?;
        tracing::info!(id, name = %component.name, "component added");
        Ok(id)
    }

    pub fn get_component(&self, id: i64) -> Result<Option<Component>> {
        let conn = self.get_conn()?;
        fetch_component(&conn, id)
    }

    /// All components ordered by type, then name.
    pub fn list_components(&self) -> Result<Vec<Component>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM components c ORDER BY c.type, c.name",
            COMPONENT_COLUMNS
        ))?;
        let components = stmt
            .query_map([], component_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(components)
    }

    /// Case-insensitive substring match over name, type and specifications.
    pub fn search_components(&self, query: &str) -> Result<Vec<Component>> {
        let pattern = format!("%{}%", escape_like(query.trim()));
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM components c
             WHERE c.name LIKE ?1 ESCAPE '\\'
                OR c.type LIKE ?1 ESCAPE '\\'
                OR c.specifications LIKE ?1 ESCAPE '\\'
             ORDER BY c.type, c.name",
            COMPONENT_COLUMNS
        ))?;
        let components = stmt
            .query_map(params![pattern], component_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(components)
    }

    pub fn update_component(&self, component: &Component) -> Result<()> {
        let id = component.id.ok_or(ModelError::MissingId)?;
        component.validate()?;

        let conn = self.get_conn()?;
        let updated = conn.execute(
            "UPDATE components
             SET name = ?2, type = ?3, price = ?4, quantity = ?5, specifications = ?6,
                 socket = ?7, memory_type = ?8, form_factor = ?9, power_watts = ?10,
                 max_memory_gb = ?11
             WHERE id = ?1",
            params![
                id,
                component.name,
                component.kind.as_str(),
                component.price,
                component.quantity,
                component.specifications,
                component.socket,
                component.memory_type,
                component.form_factor,
                component.power_watts,
                component.max_memory_gb,
            ],
        )?;
        if updated == 0 {
            return Err(DatabaseError::NotFound {
                entity: "Component",
                id,
            });
        }
        tracing::info!(id, "component updated");
        Ok(())
    }

    /// Deletes a component. Components referenced by a configuration are kept
    /// and `ComponentInUse` is returned.
    pub fn delete_component(&self, id: i64) -> Result<()> {
        let conn = self.get_conn()?;
        let configurations: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT configuration_id) FROM configuration_items WHERE component_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if configurations > 0 {
            return Err(DatabaseError::ComponentInUse { id, configurations });
        }

        let deleted = conn.execute("DELETE FROM components WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DatabaseError::NotFound {
                entity: "Component",
                id,
            });
        }
        tracing::info!(id, "component deleted");
        Ok(())
    }

    pub fn inventory_report(&self, low_stock_threshold: u32) -> Result<InventoryReport> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT type, COUNT(*), COALESCE(SUM(quantity), 0), COALESCE(SUM(price * quantity), 0.0)
             FROM components
             GROUP BY type
             ORDER BY type",
        )?;
        let kinds = stmt
            .query_map([], |row| {
                Ok(KindInventory {
                    kind: ComponentKind::from(row.get::<_, String>(0)?),
                    components: row.get(1)?,
                    units: row.get(2)?,
                    value: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM components c WHERE c.quantity < ?1 ORDER BY c.quantity, c.name",
            COMPONENT_COLUMNS
        ))?;
        let low_stock = stmt
            .query_map(params![low_stock_threshold], component_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(InventoryReport {
            total_components: kinds.iter().map(|k| k.components).sum(),
            total_units: kinds.iter().map(|k| k.units).sum(),
            total_value: kinds.iter().map(|k| k.value).sum(),
            kinds,
            low_stock_threshold,
            low_stock,
        })
    }

    // Configuration methods

    /// Persists a configuration header and one membership row per resolved
    /// component id in a single transaction.
    ///
    /// Ids that do not resolve to a component are logged and skipped: they
    /// contribute nothing to the total price and no membership row is written
    /// for them. If any insert fails the whole transaction is rolled back and
    /// the store is left as it was.
    pub fn create_configuration(&self, name: &str, component_ids: &[i64]) -> Result<Configuration> {
        let mut conn = self.get_conn()?;

        let mut config = Configuration::new(name);
        for &id in component_ids {
            match fetch_component(&conn, id)? {
                Some(component) => config.add_component(component),
                None => tracing::warn!(component_id = id, "unknown component id skipped"),
            }
        }
        let total_price = config.total_price();

        let tx = conn.transaction()?;
        let id = match insert_configuration_rows(&tx, &config, total_price) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(name, error = %e, "configuration not created, rolling back");
                if let Err(rollback_err) = tx.rollback() {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                return Err(e);
            }
        };
        // A failed commit leaves the transaction open; dropping it rolls back.
        if let Err(e) = tx.commit() {
            tracing::error!(name, error = %e, "configuration not created, commit failed");
            return Err(e.into());
        }

        config.id = Some(id);
        config.recorded_total = Some(total_price);
        tracing::info!(
            id,
            name,
            components = config.components.len(),
            total_price,
            "configuration created"
        );
        Ok(config)
    }

    pub fn get_configuration(&self, id: i64) -> Result<Option<Configuration>> {
        let conn = self.get_conn()?;
        let header = conn
            .query_row(
                "SELECT id, name, total_price, created_at, compatibility_status
                 FROM configurations WHERE id = ?1",
                params![id],
                configuration_from_row,
            )
            .optional()?;

        match header {
            Some(mut config) => {
                config.components = fetch_members(&conn, id)?;
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }

    /// All configurations, newest first, with their components.
    pub fn list_configurations(&self) -> Result<Vec<Configuration>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, total_price, created_at, compatibility_status
             FROM configurations
             ORDER BY created_at DESC, id DESC",
        )?;
        let mut configs = stmt
            .query_map([], configuration_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for config in &mut configs {
            if let Some(id) = config.id {
                config.components = fetch_members(&conn, id)?;
            }
        }
        Ok(configs)
    }

    pub fn set_compatibility_status(&self, id: i64, status: CompatibilityStatus) -> Result<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            "UPDATE configurations SET compatibility_status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        if updated == 0 {
            return Err(DatabaseError::NotFound {
                entity: "Configuration",
                id,
            });
        }
        tracing::debug!(id, status = %status, "compatibility status stored");
        Ok(())
    }

    /// Deletes a configuration together with its membership rows.
    pub fn delete_configuration(&self, id: i64) -> Result<()> {
        let conn = self.get_conn()?;
        let deleted = conn.execute("DELETE FROM configurations WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DatabaseError::NotFound {
                entity: "Configuration",
                id,
            });
        }
        tracing::info!(id, "configuration deleted");
        Ok(())
    }
}

fn insert_component(conn: &Connection, component: &Component) -> Result<i64> {
    conn.execute(
        "INSERT INTO components (name, type, price, quantity, specifications,
                                 socket, memory_type, form_factor, power_watts, max_memory_gb)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            component.name,
            component.kind.as_str(),
            component.price,
            component.quantity,
            component.specifications,
            component.socket,
            component.memory_type,
            component.form_factor,
            component.power_watts,
            component.max_memory_gb,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn fetch_component(conn: &Connection, id: i64) -> Result<Option<Component>> {
    let component = conn
        .query_row(
            &format!("SELECT {} FROM components c WHERE c.id = ?1", COMPONENT_COLUMNS),
            params![id],
            component_from_row,
        )
        .optional()?;
    tracing::debug!(id, found = component.is_some(), "component lookup");
    Ok(component)
}

fn fetch_members(conn: &Connection, configuration_id: i64) -> Result<Vec<Component>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM configuration_items ci
         JOIN components c ON c.id = ci.component_id
         WHERE ci.configuration_id = ?1
         ORDER BY ci.position",
        COMPONENT_COLUMNS
    ))?;
    let members = stmt
        .query_map(params![configuration_id], component_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(members)
}

/// Header first, then one membership row per member in order.
fn insert_configuration_rows(tx: &Transaction<'_>, config: &Configuration, total_price: f64) -> Result<i64> {
    tx.execute(
        "INSERT INTO configurations (name, total_price, created_at, compatibility_status)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            config.name,
            total_price,
            config.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            config.status.as_str(),
        ],
    )?;
    let configuration_id = tx.last_insert_rowid();
    tracing::debug!(configuration_id, "configuration header inserted");

    let mut stmt = tx.prepare(
        "INSERT INTO configuration_items (configuration_id, component_id, quantity, position)
         VALUES (?1, ?2, 1, ?3)",
    )?;
    for (position, component_id) in config.component_ids().into_iter().enumerate() {
        stmt.execute(params![configuration_id, component_id, position as i64])?;
        tracing::debug!(configuration_id, component_id, "membership row inserted");
    }
    Ok(configuration_id)
}

fn component_from_row(row: &Row<'_>) -> rusqlite::Result<Component> {
    Ok(Component {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        kind: ComponentKind::from(row.get::<_, String>(2)?),
        price: row.get(3)?,
        quantity: row.get(4)?,
        specifications: row.get(5)?,
        socket: row.get(6)?,
        memory_type: row.get(7)?,
        form_factor: row.get(8)?,
        power_watts: row.get(9)?,
        max_memory_gb: row.get(10)?,
    })
}

fn configuration_from_row(row: &Row<'_>) -> rusqlite::Result<Configuration> {
    let created_at: String = row.get(3)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    let status: String = row.get(4)?;
    let status = status
        .parse::<CompatibilityStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Configuration {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        created_at,
        status,
        recorded_total: Some(row.get(2)?),
        components: Vec::new(),
    })
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn sample_components() -> Vec<Component> {
    vec![
        Component::new("Intel Core i7-13700K", ComponentKind::Processor, 35000.0)
            .with_quantity(10)
            .with_specifications("16 cores, 3.4 GHz")
            .with_socket("LGA1700")
            .with_memory_type("DDR5")
            .with_power_watts(125),
        Component::new("AMD Ryzen 7 7700X", ComponentKind::Processor, 29000.0)
            .with_quantity(8)
            .with_specifications("8 cores, 4.5 GHz")
            .with_socket("AM5")
            .with_memory_type("DDR5")
            .with_power_watts(105),
        Component::new("ASUS ROG Strix B650", ComponentKind::Motherboard, 25000.0)
            .with_quantity(15)
            .with_specifications("Socket AM5, DDR5")
            .with_socket("AM5")
            .with_memory_type("DDR5")
            .with_form_factor("ATX")
            .with_max_memory_gb(128),
        Component::new("MSI MAG B760M Mortar", ComponentKind::Motherboard, 18000.0)
            .with_quantity(4)
            .with_specifications("Socket LGA1700, DDR5")
            .with_socket("LGA1700")
            .with_memory_type("DDR5")
            .with_form_factor("Micro-ATX")
            .with_max_memory_gb(192),
        Component::new("Kingston Fury 32GB DDR5", ComponentKind::Memory, 12000.0)
            .with_quantity(20)
            .with_specifications("32GB, 5600MHz")
            .with_memory_type("DDR5"),
        Component::new("NVIDIA GeForce RTX 4070", ComponentKind::VideoCard, 60000.0)
            .with_quantity(3)
            .with_specifications("12GB GDDR6X")
            .with_power_watts(200),
        Component::new("Corsair RM750", ComponentKind::PowerSupply, 11000.0)
            .with_quantity(12)
            .with_specifications("750W, 80+ Gold")
            .with_power_watts(750),
        Component::new("NZXT H5 Flow", ComponentKind::Chassis, 9000.0)
            .with_quantity(6)
            .with_specifications("Mid tower")
            .with_form_factor("ATX"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(&db_path).unwrap();
        (db, temp_dir)
    }

    fn cpu() -> Component {
        Component::new("Ryzen 5 7600", ComponentKind::Processor, 200.0)
            .with_quantity(3)
            .with_socket("AM5")
            .with_power_watts(65)
    }

    #[test]
    fn test_component_add_and_get() {
        let (db, _temp) = create_test_db();

        let id = db.add_component(&cpu()).unwrap();
        assert!(id > 0);

        let found = db.get_component(id).unwrap().unwrap();
        assert_eq!(found.id, Some(id));
        assert_eq!(found.kind, ComponentKind::Processor);
        assert_eq!(found.socket.as_deref(), Some("AM5"));
        assert_eq!(found.power_watts, Some(65));
        assert_eq!(found.memory_type, None);

        assert!(db.get_component(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_add_component_rejects_empty_type() {
        let (db, _temp) = create_test_db();
        let bad = Component::new("Mystery", ComponentKind::from("  "), 10.0);
        let err = db.add_component(&bad).unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(ModelError::EmptyKind)));
        assert!(db.list_components().unwrap().is_empty());
    }

    #[test]
    fn test_update_component() {
        let (db, _temp) = create_test_db();
        let id = db.add_component(&cpu()).unwrap();

        let mut component = db.get_component(id).unwrap().unwrap();
        component.price = 180.0;
        component.quantity = 0;
        db.update_component(&component).unwrap();

        let updated = db.get_component(id).unwrap().unwrap();
        assert_eq!(updated.price, 180.0);
        assert_eq!(updated.quantity, 0);

        component.id = Some(id + 1);
        assert!(matches!(
            db.update_component(&component),
            Err(DatabaseError::NotFound { .. })
        ));

        component.id = None;
        assert!(matches!(
            db.update_component(&component),
            Err(DatabaseError::Validation(ModelError::MissingId))
        ));
    }

    #[test]
    fn test_list_orders_by_type_then_name() {
        let (db, _temp) = create_test_db();
        db.add_component(&Component::new("Zeta", ComponentKind::Processor, 1.0)).unwrap();
        db.add_component(&Component::new("Alpha", ComponentKind::Processor, 1.0)).unwrap();
        db.add_component(&Component::new("Case", ComponentKind::Chassis, 1.0)).unwrap();

        let names: Vec<String> = db
            .list_components()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Case", "Alpha", "Zeta"]);
    }

    #[test]
    fn test_search_components() {
        let (db, _temp) = create_test_db();
        db.seed_sample_data().unwrap();

        let results = db.search_components("ddr5").unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().any(|c| c.kind == ComponentKind::Memory));

        let results = db.search_components("power supply").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Corsair RM750");

        assert!(db.search_components("100%").unwrap().is_empty());
    }

    #[test]
    fn test_seed_only_into_empty_catalog() {
        let (db, _temp) = create_test_db();
        let inserted = db.seed_sample_data().unwrap();
        assert_eq!(inserted, sample_components().len());
        assert_eq!(db.seed_sample_data().unwrap(), 0);
        assert_eq!(db.list_components().unwrap().len(), inserted);
    }

    #[test]
    fn test_inventory_report() {
        let (db, _temp) = create_test_db();
        db.add_component(&cpu()).unwrap();
        db.add_component(
            &Component::new("Ryzen 9 7950X", ComponentKind::Processor, 500.0).with_quantity(10),
        )
        .unwrap();
        db.add_component(&Component::new("H5", ComponentKind::Chassis, 80.0).with_quantity(1))
            .unwrap();

        let report = db.inventory_report(5).unwrap();
        assert_eq!(report.total_components, 3);
        assert_eq!(report.total_units, 14);
        assert_eq!(report.total_value, 200.0 * 3.0 + 500.0 * 10.0 + 80.0);

        let processors = report
            .kinds
            .iter()
            .find(|k| k.kind == ComponentKind::Processor)
            .unwrap();
        assert_eq!(processors.components, 2);
        assert_eq!(processors.units, 13);

        let low: Vec<&str> = report.low_stock.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(low, vec!["H5", "Ryzen 5 7600"]);
    }

    #[test]
    fn test_delete_component() {
        let (db, _temp) = create_test_db();
        let id = db.add_component(&cpu()).unwrap();
        db.delete_component(id).unwrap();
        assert!(db.get_component(id).unwrap().is_none());
        assert!(matches!(
            db.delete_component(id),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.list_configurations().unwrap().is_empty());
    }
}
