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
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
}

impl Category {
    pub fn url(&self) -> String {
        EntityKind::Category.record_url(&self.id)
    }

    pub fn image_location(&self) -> &str {
        inventory::image_location(&self.image)
    }
}

/// Raw category form fields as submitted.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
            image: category.image_location().to_string(),
        }
    }
}

/// A category with the bags filed under it, cheapest first.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithBags {
    pub category: Category,
    pub bags: Vec<BagSummary>,
}

fn validate_form(form: &CategoryForm) -> (CategoryForm, Vec<FieldError>) {
    let mut v = Validator::new();
    let name = v
        .field("name", &form.name)
        .min_len(1, "Category must have a name.")
        .max_len(NAME_MAX_LEN, "Category name must be 100 characters or fewer.")
        .alphanumeric("Category name has non-alphanumeric characters.")
        .value();
    let description = v
        .field("description", &form.description)
        .min_len(3, "Category description must contain at least 3 characters")
        .max_len(
            DESCRIPTION_MAX_LEN,
            "Category description must be 500 characters or fewer.",
        )
        .value();
    let image = v
        .field("image", inventory::image_location(form.image.trim()))
        .min_len(3, "Category image file name must contain at least 3 characters")
        .max_len(IMAGE_FILE_MAX_LEN, "Category image file name is too long.")
        .value();
    (
        CategoryForm {
            name,
            description,
            image,
        },
        v.into_errors(),
    )
}

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        image: row.get(3)?,
    })
}

pub(crate) fn insert_category(
    conn: &Connection,
    category: &Category,
) -> Result<(), error::PlushyError> {
    conn.execute(
        "INSERT INTO categories(id, name, description, image) VALUES(?1, ?2, ?3, ?4)",
        params![
            category.id,
            category.name,
            category.description,
            category.image
        ],
    )?;
    Ok(())
}

pub(crate) fn find_category(
    broker: &DbBroker,
    id: &str,
) -> Result<Option<Category>, error::PlushyError> {
    broker.read("category.get", |conn| {
        let category = conn
            .query_row(
                "SELECT id, name, description, image FROM categories WHERE id = ?1",
                params![id],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    })
}

pub fn get_category(store: &Store, id: &str) -> Result<Option<Category>, error::PlushyError> {
    find_category(&DbBroker::new(store), id)
}

pub(crate) fn all_categories(broker: &DbBroker) -> Result<Vec<Category>, error::PlushyError> {
    broker.read("category.list", |conn| {
        let mut stmt =
            conn.prepare("SELECT id, name, description, image FROM categories ORDER BY name ASC")?;
        let rows = stmt.query_map([], row_to_category)?;
        let mut categories = Vec::new();
        for r in rows {
            categories.push(r?);
        }
        Ok(categories)
    })
}

/// All categories, name ascending.
pub fn list_categories(store: &Store) -> Result<Vec<Category>, error::PlushyError> {
    all_categories(&DbBroker::new(store))
}

fn load_with_bags(
    broker: &DbBroker,
    id: &str,
) -> Result<(Option<Category>, Vec<BagSummary>), error::PlushyError> {
    inventory::load_with_bags(broker, BagRef::Category, id, || find_category(broker, id))
}

pub fn category_detail(store: &Store, id: &str) -> Result<CategoryWithBags, error::PlushyError> {
    let broker = DbBroker::new(store);
    match load_with_bags(&broker, id)? {
        (Some(category), bags) => Ok(CategoryWithBags { category, bags }),
        (None, _) => Err(EntityKind::Category.not_found()),
    }
}

/// Prefilled form for the update page.
pub fn category_for_update(store: &Store, id: &str) -> Result<CategoryForm, error::PlushyError> {
    get_category(store, id)?
        .map(|c| CategoryForm::from(&c))
        .ok_or_else(|| EntityKind::Category.not_found())
}

pub fn create_category(
    store: &Store,
    form: &CategoryForm,
) -> Result<Submission<CategoryForm>, error::PlushyError> {
    let (form, errors) = validate_form(form);
    if !errors.is_empty() {
        return Ok(Submission::Rejected { form, errors });
    }

    let category = Category {
        id: time::new_record_id(),
        name: form.name,
        description: form.description,
        image: inventory::stored_image_path(&form.image),
    };

    let broker = DbBroker::new(store);
    broker.write("category.create", Some(&category.id), |conn| {
        insert_category(conn, &category)
    })?;
    tracing::info!(id = %category.id, name = %category.name, "category created");

    Ok(Submission::Saved {
        location: category.url(),
    })
}

/// Full replace of an existing category. Unknown ids are NotFound.
pub fn update_category(
    store: &Store,
    id: &str,
    form: &CategoryForm,
) -> Result<Submission<CategoryForm>, error::PlushyError> {
    let broker = DbBroker::new(store);
    if find_category(&broker, id)?.is_none() {
        return Err(EntityKind::Category.not_found());
    }

    let (form, errors) = validate_form(form);
    if !errors.is_empty() {
        return Ok(Submission::Rejected { form, errors });
    }

    let category = Category {
        id: id.to_string(),
        name: form.name,
        description: form.description,
        image: inventory::stored_image_path(&form.image),
    };

    broker.write("category.update", Some(id), |conn| {
        let changed = conn.execute(
            "UPDATE categories SET name = ?2, description = ?3, image = ?4 WHERE id = ?1",
            params![
                category.id,
                category.name,
                category.description,
                category.image
            ],
        )?;
        if changed == 0 {
            return Err(EntityKind::Category.not_found());
        }
        Ok(())
    })?;

    Ok(Submission::Saved {
        location: category.url(),
    })
}

/// Confirmation data for the delete page. `None` when the category is gone.
pub fn category_delete_page(
    store: &Store,
    id: &str,
) -> Result<Option<CategoryWithBags>, error::PlushyError> {
    let broker = DbBroker::new(store);
    let (category, bags) = load_with_bags(&broker, id)?;
    Ok(category.map(|category| CategoryWithBags { category, bags }))
}

/// Delete a category that no bag references.
pub fn delete_category(
    store: &Store,
    id: &str,
    confirmed_id: Option<&str>,
) -> Result<Removal<CategoryWithBags>, error::PlushyError> {
    let broker = DbBroker::new(store);
    let loaded = load_with_bags(&broker, id)?;
    inventory::gated_delete(
        &broker,
        EntityKind::Category,
        id,
        confirmed_id,
        loaded,
        |category, bags| CategoryWithBags { category, bags },
    )
}
