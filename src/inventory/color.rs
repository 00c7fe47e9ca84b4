use crate::core::broker::{AuditTarget, DbBroker};
use crate::core::error;
use crate::core::store::Store;
use crate::core::time;
use crate::core::validate::{FieldError, Validator};
use crate::inventory::bag::BagRef;
use crate::inventory::{
    self, BagSummary, EntityKind, IMAGE_FILE_MAX_LEN, NAME_MAX_LEN, Removal, Submission,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Color {
    pub id: String,
    pub name: String,
    pub image: String,
    /// Manual position on the color list; lower sorts first.
    pub display_order: i64,
}

impl Color {
    pub fn url(&self) -> String {
        EntityKind::Color.record_url(&self.id)
    }

    pub fn image_location(&self) -> &str {
        inventory::image_location(&self.image)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ColorForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
}

impl From<&Color> for ColorForm {
    fn from(color: &Color) -> Self {
        Self {
            name: color.name.clone(),
            image: color.image_location().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorWithBags {
    pub color: Color,
    pub bags: Vec<BagSummary>,
}

fn validate_form(form: &ColorForm) -> (ColorForm, Vec<FieldError>) {
    let mut v = Validator::new();
    let name = v
        .field("name", &form.name)
        .min_len(1, "Color must have a name.")
        .max_len(NAME_MAX_LEN, "Color name must be 100 characters or fewer.")
        .alphanumeric("Color name has non-alphanumeric characters.")
        .value();
    let image = v
        .field("image", inventory::image_location(form.image.trim()))
        .min_len(3, "Color image file name must contain at least 3 characters")
        .max_len(IMAGE_FILE_MAX_LEN, "Color image file name is too long.")
        .value();
    (ColorForm { name, image }, v.into_errors())
}

const COLOR_COLUMNS: &str = "id, name, image, display_order";

fn row_to_color(row: &Row<'_>) -> rusqlite::Result<Color> {
    Ok(Color {
        id: row.get(0)?,
        name: row.get(1)?,
        image: row.get(2)?,
        display_order: row.get(3)?,
    })
}

pub(crate) fn insert_color(conn: &Connection, color: &Color) -> Result<(), error::PlushyError> {
    conn.execute(
        "INSERT INTO colors(id, name, image, display_order) VALUES(?1, ?2, ?3, ?4)",
        params![color.id, color.name, color.image, color.display_order],
    )?;
    Ok(())
}

fn next_display_order(conn: &Connection) -> Result<i64, error::PlushyError> {
    let next: i64 = conn.query_row(
        "SELECT COALESCE(MAX(display_order) + 1, 0) FROM colors",
        [],
        |row| row.get(0),
    )?;
    Ok(next)
}

/// Earliest color with `name`, ignoring case, other than `except`.
fn find_color_by_name(
    conn: &Connection,
    name: &str,
    except: Option<&str>,
) -> Result<Option<Color>, error::PlushyError> {
    let sql = format!(
        "SELECT {} FROM colors WHERE name = ?1 COLLATE NOCASE AND id != ?2
         ORDER BY display_order LIMIT 1",
        COLOR_COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![name, except.unwrap_or("")], row_to_color)
        .optional()?)
}

pub(crate) fn find_color(broker: &DbBroker, id: &str) -> Result<Option<Color>, error::PlushyError> {
    broker.read("color.get", |conn| {
        let sql = format!("SELECT {} FROM colors WHERE id = ?1", COLOR_COLUMNS);
        Ok(conn.query_row(&sql, params![id], row_to_color).optional()?)
    })
}

pub fn get_color(store: &Store, id: &str) -> Result<Option<Color>, error::PlushyError> {
    find_color(&DbBroker::new(store), id)
}

pub(crate) fn all_colors(broker: &DbBroker) -> Result<Vec<Color>, error::PlushyError> {
    broker.read("color.list", |conn| {
        let sql = format!(
            "SELECT {} FROM colors ORDER BY display_order ASC, name ASC",
            COLOR_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_color)?;
        let mut colors = Vec::new();
        for r in rows {
            colors.push(r?);
        }
        Ok(colors)
    })
}

/// All colors in display order.
pub fn list_colors(store: &Store) -> Result<Vec<Color>, error::PlushyError> {
    all_colors(&DbBroker::new(store))
}

fn load_with_bags(
    broker: &DbBroker,
    id: &str,
) -> Result<(Option<Color>, Vec<BagSummary>), error::PlushyError> {
    inventory::load_with_bags(broker, BagRef::Color, id, || find_color(broker, id))
}

pub fn color_detail(store: &Store, id: &str) -> Result<ColorWithBags, error::PlushyError> {
    let broker = DbBroker::new(store);
    match load_with_bags(&broker, id)? {
        (Some(color), bags) => Ok(ColorWithBags { color, bags }),
        (None, _) => Err(EntityKind::Color.not_found()),
    }
}

pub fn color_for_update(store: &Store, id: &str) -> Result<ColorForm, error::PlushyError> {
    get_color(store, id)?
        .map(|c| ColorForm::from(&c))
        .ok_or_else(|| EntityKind::Color.not_found())
}

enum Created {
    New(Color),
    Existing(Color),
}

/// Create a color, or point at the existing one with the same name.
///
/// The name lookup and the insert share the write lock, so two concurrent
/// submissions of one name still store a single record. Names compare
/// case-insensitively.
pub fn create_color(
    store: &Store,
    form: &ColorForm,
) -> Result<Submission<ColorForm>, error::PlushyError> {
    let (form, errors) = validate_form(form);
    if !errors.is_empty() {
        return Ok(Submission::Rejected { form, errors });
    }

    let id = time::new_record_id();
    let broker = DbBroker::new(store);
    let created = broker.write_reporting("color.create", Some(&id), |conn| {
        if let Some(existing) = find_color_by_name(conn, &form.name, None)? {
            let target = AuditTarget::new("color.duplicate", Some(&existing.id));
            return Ok((Created::Existing(existing), target));
        }
        let color = Color {
            id: id.clone(),
            name: form.name.clone(),
            image: inventory::stored_image_path(&form.image),
            display_order: next_display_order(conn)?,
        };
        insert_color(conn, &color)?;
        Ok((Created::New(color), AuditTarget::new("color.create", Some(&id))))
    })?;

    match created {
        Created::New(color) => {
            tracing::info!(id = %color.id, name = %color.name, "color created");
            Ok(Submission::Saved {
                location: color.url(),
            })
        }
        Created::Existing(color) => {
            tracing::info!(id = %color.id, name = %color.name, "color already exists");
            Ok(Submission::Duplicate {
                location: color.url(),
            })
        }
    }
}

/// Full replace of name and image. The display position is kept.
///
/// Renaming onto another color's name (compared case-insensitively) is
/// rejected on the name field; the check shares the write lock with the
/// update.
pub fn update_color(
    store: &Store,
    id: &str,
    form: &ColorForm,
) -> Result<Submission<ColorForm>, error::PlushyError> {
    let broker = DbBroker::new(store);
    if find_color(&broker, id)?.is_none() {
        return Err(EntityKind::Color.not_found());
    }

    let (form, errors) = validate_form(form);
    if !errors.is_empty() {
        return Ok(Submission::Rejected { form, errors });
    }

    let image = inventory::stored_image_path(&form.image);
    let taken = broker.write_reporting("color.update", Some(id), |conn| {
        if let Some(other) = find_color_by_name(conn, &form.name, Some(id))? {
            let target = AuditTarget::new("color.update_refused", Some(id));
            return Ok((Some(other), target));
        }
        let changed = conn.execute(
            "UPDATE colors SET name = ?2, image = ?3 WHERE id = ?1",
            params![id, form.name, image],
        )?;
        if changed == 0 {
            return Err(EntityKind::Color.not_found());
        }
        Ok((None, AuditTarget::new("color.update", Some(id))))
    })?;

    if let Some(other) = taken {
        let errors = vec![FieldError {
            field: "name",
            message: format!("Color {} already exists.", other.name),
        }];
        return Ok(Submission::Rejected { form, errors });
    }

    Ok(Submission::Saved {
        location: EntityKind::Color.record_url(id),
    })
}

pub fn color_delete_page(
    store: &Store,
    id: &str,
) -> Result<Option<ColorWithBags>, error::PlushyError> {
    let broker = DbBroker::new(store);
    let (color, bags) = load_with_bags(&broker, id)?;
    Ok(color.map(|color| ColorWithBags { color, bags }))
}

/// Delete a color that no bag is dyed in.
pub fn delete_color(
    store: &Store,
    id: &str,
    confirmed_id: Option<&str>,
) -> Result<Removal<ColorWithBags>, error::PlushyError> {
    let broker = DbBroker::new(store);
    let loaded = load_with_bags(&broker, id)?;
    inventory::gated_delete(
        &broker,
        EntityKind::Color,
        id,
        confirmed_id,
        loaded,
        |color, bags| ColorWithBags { color, bags },
    )
}
