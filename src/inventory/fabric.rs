use crate::core::broker::DbBroker;
use crate::core::error;
use crate::core::store::Store;
use crate::core::time;
use crate::core::validate::{FieldError, Validator};
use crate::inventory::bag::BagRef;
use crate::inventory::{
    self, BagSummary, DESCRIPTION_MAX_LEN, EntityKind, IMAGE_FILE_MAX_LEN, NAME_MAX_LEN, Removal,
    Submission,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Fabric {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
}

impl Fabric {
    pub fn url(&self) -> String {
        EntityKind::Fabric.record_url(&self.id)
    }

    pub fn image_location(&self) -> &str {
        inventory::image_location(&self.image)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FabricForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl From<&Fabric> for FabricForm {
    fn from(fabric: &Fabric) -> Self {
        Self {
            name: fabric.name.clone(),
            description: fabric.description.clone(),
            image: fabric.image_location().to_string(),
        }
    }
}

/// A fabric with the bags made from it, cheapest first.
#[derive(Debug, Clone, Serialize)]
pub struct FabricWithBags {
    pub fabric: Fabric,
    pub bags: Vec<BagSummary>,
}

fn validate_form(form: &FabricForm) -> (FabricForm, Vec<FieldError>) {
    let mut v = Validator::new();
    let name = v
        .field("name", &form.name)
        .min_len(1, "Fabric must have a name.")
        .max_len(NAME_MAX_LEN, "Fabric name must be 100 characters or fewer.")
        .alphanumeric("Fabric name has non-alphanumeric characters.")
        .value();
    let description = v
        .field("description", &form.description)
        .min_len(3, "Fabric description must contain at least 3 characters")
        .max_len(
            DESCRIPTION_MAX_LEN,
            "Fabric description must be 500 characters or fewer.",
        )
        .value();
    let image = v
        .field("image", inventory::image_location(form.image.trim()))
        .min_len(3, "Fabric image file name must contain at least 3 characters")
        .max_len(IMAGE_FILE_MAX_LEN, "Fabric image file name is too long.")
        .value();
    (
        FabricForm {
            name,
            description,
            image,
        },
        v.into_errors(),
    )
}

fn row_to_fabric(row: &Row<'_>) -> rusqlite::Result<Fabric> {
    Ok(Fabric {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        image: row.get(3)?,
    })
}

pub(crate) fn insert_fabric(
    conn: &Connection,
    fabric: &Fabric,
) -> Result<(), error::PlushyError> {
    conn.execute(
        "INSERT INTO fabrics(id, name, description, image) VALUES(?1, ?2, ?3, ?4)",
        params![
            fabric.id,
            fabric.name,
            fabric.description,
            fabric.image
        ],
    )?;
    Ok(())
}

pub(crate) fn find_fabric(
    broker: &DbBroker,
    id: &str,
) -> Result<Option<Fabric>, error::PlushyError> {
    broker.read("fabric.get", |conn| {
        let fabric = conn
            .query_row(
                "SELECT id, name, description, image FROM fabrics WHERE id = ?1",
                params![id],
                row_to_fabric,
            )
            .optional()?;
        Ok(fabric)
    })
}

pub fn get_fabric(store: &Store, id: &str) -> Result<Option<Fabric>, error::PlushyError> {
    find_fabric(&DbBroker::new(store), id)
}

pub(crate) fn all_fabrics(broker: &DbBroker) -> Result<Vec<Fabric>, error::PlushyError> {
    broker.read("fabric.list", |conn| {
        let mut stmt =
            conn.prepare("SELECT id, name, description, image FROM fabrics ORDER BY name ASC")?;
        let rows = stmt.query_map([], row_to_fabric)?;
        let mut fabrics = Vec::new();
        for r in rows {
            fabrics.push(r?);
        }
        Ok(fabrics)
    })
}

/// All fabrics, name ascending.
pub fn list_fabrics(store: &Store) -> Result<Vec<Fabric>, error::PlushyError> {
    all_fabrics(&DbBroker::new(store))
}

fn load_with_bags(
    broker: &DbBroker,
    id: &str,
) -> Result<(Option<Fabric>, Vec<BagSummary>), error::PlushyError> {
    inventory::load_with_bags(broker, BagRef::Fabric, id, || find_fabric(broker, id))
}

pub fn fabric_detail(store: &Store, id: &str) -> Result<FabricWithBags, error::PlushyError> {
    let broker = DbBroker::new(store);
    match load_with_bags(&broker, id)? {
        (Some(fabric), bags) => Ok(FabricWithBags { fabric, bags }),
        (None, _) => Err(EntityKind::Fabric.not_found()),
    }
}

pub fn fabric_for_update(store: &Store, id: &str) -> Result<FabricForm, error::PlushyError> {
    get_fabric(store, id)?
        .map(|f| FabricForm::from(&f))
        .ok_or_else(|| EntityKind::Fabric.not_found())
}

pub fn create_fabric(
    store: &Store,
    form: &FabricForm,
) -> Result<Submission<FabricForm>, error::PlushyError> {
    let (form, errors) = validate_form(form);
    if !errors.is_empty() {
        return Ok(Submission::Rejected { form, errors });
    }

    let fabric = Fabric {
        id: time::new_record_id(),
        name: form.name,
        description: form.description,
        image: inventory::stored_image_path(&form.image),
    };

    let broker = DbBroker::new(store);
    broker.write("fabric.create", Some(&fabric.id), |conn| {
        insert_fabric(conn, &fabric)
    })?;
    tracing::info!(id = %fabric.id, name = %fabric.name, "fabric created");

    Ok(Submission::Saved {
        location: fabric.url(),
    })
}

/// Full replace of an existing fabric. Unknown ids are NotFound.
pub fn update_fabric(
    store: &Store,
    id: &str,
    form: &FabricForm,
) -> Result<Submission<FabricForm>, error::PlushyError> {
    let broker = DbBroker::new(store);
    if find_fabric(&broker, id)?.is_none() {
        return Err(EntityKind::Fabric.not_found());
    }

    let (form, errors) = validate_form(form);
    if !errors.is_empty() {
        return Ok(Submission::Rejected { form, errors });
    }

    let fabric = Fabric {
        id: id.to_string(),
        name: form.name,
        description: form.description,
        image: inventory::stored_image_path(&form.image),
    };

    broker.write("fabric.update", Some(id), |conn| {
        let changed = conn.execute(
            "UPDATE fabrics SET name = ?2, description = ?3, image = ?4 WHERE id = ?1",
            params![
                fabric.id,
                fabric.name,
                fabric.description,
                fabric.image
            ],
        )?;
        if changed == 0 {
            return Err(EntityKind::Fabric.not_found());
        }
        Ok(())
    })?;

    Ok(Submission::Saved {
        location: fabric.url(),
    })
}

/// Confirmation data for the delete page. `None` when the fabric is gone.
pub fn fabric_delete_page(
    store: &Store,
    id: &str,
) -> Result<Option<FabricWithBags>, error::PlushyError> {
    let broker = DbBroker::new(store);
    let (fabric, bags) = load_with_bags(&broker, id)?;
    Ok(fabric.map(|fabric| FabricWithBags { fabric, bags }))
}

/// Delete a fabric that no bag is made from.
pub fn delete_fabric(
    store: &Store,
    id: &str,
    confirmed_id: Option<&str>,
) -> Result<Removal<FabricWithBags>, error::PlushyError> {
    let broker = DbBroker::new(store);
    let loaded = load_with_bags(&broker, id)?;
    inventory::gated_delete(
        &broker,
        EntityKind::Fabric,
        id,
        confirmed_id,
        loaded,
        |fabric, bags| FabricWithBags { fabric, bags },
    )
}
