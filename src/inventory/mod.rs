//! Inventory handlers: one module per record kind.
//!
//! Every kind follows the same shape: list, detail, create, update and a
//! two-phase delete. Handlers take a [`Store`], talk to SQLite through the
//! [`DbBroker`], and return plain data (or an outcome enum) for the HTTP
//! layer to render.
//!
//! Reads that do not depend on each other run on rayon via `rayon::join` and
//! are combined with `?`, so one failed branch fails the whole call.

pub mod bag;
pub mod category;
pub mod color;
pub mod fabric;
pub mod seed;

use crate::core::broker::DbBroker;
use crate::core::error::PlushyError;
use crate::core::store::Store;
use crate::core::validate::FieldError;
use bag::BagRef;
use rusqlite::{Connection, params};
use serde::Serialize;

pub const BASE_PATH: &str = "/inventory";
pub const IMAGE_PREFIX: &str = "/images/";

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;
/// Stored image paths carry [`IMAGE_PREFIX`] and are capped at 500 characters.
pub const IMAGE_FILE_MAX_LEN: usize = 500 - IMAGE_PREFIX.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Bag,
    Category,
    Fabric,
    Color,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Bag,
        EntityKind::Category,
        EntityKind::Fabric,
        EntityKind::Color,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            EntityKind::Bag => "bag",
            EntityKind::Category => "category",
            EntityKind::Fabric => "fabric",
            EntityKind::Color => "color",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Bag => "bags",
            EntityKind::Category => "categories",
            EntityKind::Fabric => "fabrics",
            EntityKind::Color => "colors",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Bag => "Bag",
            EntityKind::Category => "Category",
            EntityKind::Fabric => "Fabric",
            EntityKind::Color => "Color",
        }
    }

    fn table(self) -> &'static str {
        self.plural()
    }

    /// Canonical location of one record: `/inventory/{kind}/{id}`.
    pub fn record_url(self, id: &str) -> String {
        format!("{}/{}/{}", BASE_PATH, self.slug(), id)
    }

    pub fn list_url(self) -> String {
        format!("{}/{}", BASE_PATH, self.plural())
    }

    pub fn not_found(self) -> PlushyError {
        PlushyError::NotFound(format!("{} not found", self.label()))
    }
}

/// Image path for display: the stored `/images/` prefix stripped.
pub fn image_location(stored: &str) -> &str {
    stored.strip_prefix(IMAGE_PREFIX).unwrap_or(stored)
}

/// Stored form of a submitted image file name. Accepts input with or
/// without the prefix and never doubles it.
pub fn stored_image_path(file: &str) -> String {
    format!("{}{}", IMAGE_PREFIX, image_location(file.trim()))
}

/// Result of a create or update submission.
#[derive(Debug, Clone)]
pub enum Submission<F> {
    /// One record was written; redirect to it.
    Saved { location: String },
    /// An equivalent record already exists; redirect to it, nothing written.
    Duplicate { location: String },
    /// Validation failed; re-render the form with the sanitized values.
    Rejected { form: F, errors: Vec<FieldError> },
}

impl<F> Submission<F> {
    pub fn location(&self) -> Option<&str> {
        match self {
            Submission::Saved { location } | Submission::Duplicate { location } => {
                Some(location)
            }
            Submission::Rejected { .. } => None,
        }
    }
}

/// Result of a delete submission.
#[derive(Debug, Clone)]
pub enum Removal<P> {
    /// Deleted (or already gone); redirect to the kind's list.
    Removed { location: String },
    /// Dependents still exist; re-render the confirmation page.
    Blocked(P),
}

/// The name-and-price view of a bag used for related-item lists.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BagSummary {
    pub id: String,
    pub name: String,
    pub price: f64,
}

impl BagSummary {
    pub fn url(&self) -> String {
        EntityKind::Bag.record_url(&self.id)
    }
}

/// Load a record and the bags that point at it in parallel.
pub(crate) fn load_with_bags<T, F>(
    broker: &DbBroker,
    reference: BagRef,
    id: &str,
    find: F,
) -> Result<(Option<T>, Vec<BagSummary>), PlushyError>
where
    T: Send,
    F: FnOnce() -> Result<Option<T>, PlushyError> + Send,
{
    let (record, bags) = rayon::join(find, || bag::bags_referencing(broker, reference, id));
    Ok((record?, bags?))
}

/// Second phase of a delete for a kind that bags point at.
///
/// A missing record counts as removed. Dependents are counted outside the
/// write lock, so a bag filed under the record between the count and the
/// delete is not caught.
pub(crate) fn gated_delete<T, P>(
    broker: &DbBroker,
    kind: EntityKind,
    id: &str,
    confirmed_id: Option<&str>,
    loaded: (Option<T>, Vec<BagSummary>),
    page: impl FnOnce(T, Vec<BagSummary>) -> P,
) -> Result<Removal<P>, PlushyError> {
    let location = kind.list_url();
    let (Some(record), bags) = loaded else {
        return Ok(Removal::Removed { location });
    };
    if !bags.is_empty() || confirmed_id.is_some_and(|c| c != id) {
        return Ok(Removal::Blocked(page(record, bags)));
    }

    let op = format!("{}.delete", kind.slug());
    broker.write(&op, Some(id), |conn| {
        let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table());
        conn.execute(&sql, params![id])?;
        Ok(())
    })?;
    tracing::info!(id, kind = kind.slug(), "record deleted");

    Ok(Removal::Removed { location })
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub bags: u64,
    pub categories: u64,
    pub fabrics: u64,
    pub colors: u64,
}

impl Summary {
    pub fn total(&self) -> u64 {
        self.bags + self.categories + self.fabrics + self.colors
    }
}

pub(crate) fn count_rows(conn: &Connection, kind: EntityKind) -> Result<u64, PlushyError> {
    let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
    let n: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(n.max(0) as u64)
}

fn count_kind(broker: &DbBroker, kind: EntityKind) -> Result<u64, PlushyError> {
    broker.read("inventory.count", |conn| count_rows(conn, kind))
}

/// Record counts for the home page.
pub fn summary(store: &Store) -> Result<Summary, PlushyError> {
    let broker = DbBroker::new(store);
    let ((bags, categories), (fabrics, colors)) = rayon::join(
        || {
            rayon::join(
                || count_kind(&broker, EntityKind::Bag),
                || count_kind(&broker, EntityKind::Category),
            )
        },
        || {
            rayon::join(
                || count_kind(&broker, EntityKind::Fabric),
                || count_kind(&broker, EntityKind::Color),
            )
        },
    );
    Ok(Summary {
        bags: bags?,
        categories: categories?,
        fabrics: fabrics?,
        colors: colors?,
    })
}
