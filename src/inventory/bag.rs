//! Bags: the products. Each one references exactly one category, fabric and
//! color by id. References are checked for presence only; a bag whose
//! referenced record has been removed out from under it still loads, with the
//! missing side populated as `None`.

use crate::core::broker::DbBroker;
use crate::core::error;
use crate::core::store::Store;
use crate::core::time;
use crate::core::validate::{FieldError, Validator};
use crate::inventory::category::{self, Category};
use crate::inventory::color::{self, Color};
use crate::inventory::fabric::{self, Fabric};
use crate::inventory::{BagSummary, EntityKind, NAME_MAX_LEN, Removal, Submission};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Bag {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category: String,
    pub fabric: String,
    pub color: String,
}

impl Bag {
    pub fn url(&self) -> String {
        EntityKind::Bag.record_url(&self.id)
    }

    pub fn display_price(&self) -> String {
        format_price(self.price)
    }
}

pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Which reference column a reverse lookup filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BagRef {
    Category,
    Fabric,
    Color,
}

impl BagRef {
    fn column(self) -> &'static str {
        match self {
            BagRef::Category => "category_id",
            BagRef::Fabric => "fabric_id",
            BagRef::Color => "color_id",
        }
    }
}

/// A bag with its references expanded to owned copies.
#[derive(Debug, Clone, Serialize)]
pub struct PopulatedBag {
    pub bag: Bag,
    pub category: Option<Category>,
    pub fabric: Option<Fabric>,
    pub color: Option<Color>,
}

/// One row of the bag list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BagListing {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category: Option<String>,
    pub fabric: Option<String>,
    pub color: Option<String>,
}

impl BagListing {
    pub fn url(&self) -> String {
        EntityKind::Bag.record_url(&self.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct BagForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub fabric: String,
    #[serde(default)]
    pub color: String,
}

impl From<&Bag> for BagForm {
    fn from(bag: &Bag) -> Self {
        Self {
            name: bag.name.clone(),
            price: bag.price.to_string(),
            stock: bag.stock.to_string(),
            category: bag.category.clone(),
            fabric: bag.fabric.clone(),
            color: bag.color.clone(),
        }
    }
}

/// Options for the three reference selects on the bag form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BagChoices {
    pub categories: Vec<Category>,
    pub fabrics: Vec<Fabric>,
    pub colors: Vec<Color>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BagFormPage {
    pub form: BagForm,
    pub choices: BagChoices,
}

struct ValidBag {
    name: String,
    price: f64,
    stock: i64,
    category: String,
    fabric: String,
    color: String,
}

fn validate_form(form: &BagForm) -> (BagForm, Result<ValidBag, Vec<FieldError>>) {
    let mut v = Validator::new();
    let name = v
        .field("name", &form.name)
        .required("Bag must have a name.")
        .max_len(NAME_MAX_LEN, "Bag name must be 100 characters or fewer.")
        .value();
    let (price_raw, price) = v
        .field("price", &form.price)
        .positive_number("Price must be a positive number.");
    let (stock_raw, stock) = v
        .field("stock", &form.stock)
        .non_negative_integer("Stock must be a whole number of zero or more.");
    let category = v
        .field("category", &form.category)
        .required("Bag must have a category.")
        .value();
    let fabric = v
        .field("fabric", &form.fabric)
        .required("Bag must have a fabric.")
        .value();
    let color = v
        .field("color", &form.color)
        .required("Bag must have a color.")
        .value();

    let sanitized = BagForm {
        name: name.clone(),
        price: price_raw,
        stock: stock_raw,
        category: category.clone(),
        fabric: fabric.clone(),
        color: color.clone(),
    };
    let outcome = match (price, stock) {
        (Some(price), Some(stock)) if v.is_valid() => Ok(ValidBag {
            name,
            price,
            stock,
            category,
            fabric,
            color,
        }),
        _ => Err(v.into_errors()),
    };
    (sanitized, outcome)
}

const BAG_COLUMNS: &str = "id, name, price, stock, category_id, fabric_id, color_id";

fn row_to_bag(row: &Row<'_>) -> rusqlite::Result<Bag> {
    Ok(Bag {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        stock: row.get(3)?,
        category: row.get(4)?,
        fabric: row.get(5)?,
        color: row.get(6)?,
    })
}

pub(crate) fn insert_bag(conn: &Connection, bag: &Bag) -> Result<(), error::PlushyError> {
    conn.execute(
        "INSERT INTO bags(id, name, price, stock, category_id, fabric_id, color_id)
         VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            bag.id,
            bag.name,
            bag.price,
            bag.stock,
            bag.category,
            bag.fabric,
            bag.color
        ],
    )?;
    Ok(())
}

fn find_bag(broker: &DbBroker, id: &str) -> Result<Option<Bag>, error::PlushyError> {
    broker.read("bag.get", |conn| {
        let sql = format!("SELECT {} FROM bags WHERE id = ?1", BAG_COLUMNS);
        Ok(conn.query_row(&sql, params![id], row_to_bag).optional()?)
    })
}

pub fn get_bag(store: &Store, id: &str) -> Result<Option<Bag>, error::PlushyError> {
    find_bag(&DbBroker::new(store), id)
}

/// Bags whose `reference` column equals `id`, cheapest first.
pub(crate) fn bags_referencing(
    broker: &DbBroker,
    reference: BagRef,
    id: &str,
) -> Result<Vec<BagSummary>, error::PlushyError> {
    broker.read("bag.by_reference", |conn| {
        let sql = format!(
            "SELECT id, name, price FROM bags WHERE {} = ?1 ORDER BY price ASC, name ASC",
            reference.column()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![id], |row| {
            Ok(BagSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                price: row.get(2)?,
            })
        })?;
        let mut bags = Vec::new();
        for r in rows {
            bags.push(r?);
        }
        Ok(bags)
    })
}

fn name_index<T>(items: Vec<T>, key: impl Fn(T) -> (String, String)) -> FxHashMap<String, String> {
    items.into_iter().map(key).collect()
}

/// Every bag, cheapest first, with reference names filled in.
pub fn list_bags(store: &Store) -> Result<Vec<BagListing>, error::PlushyError> {
    let broker = DbBroker::new(store);
    let (bags, (categories, (fabrics, colors))) = rayon::join(
        || {
            broker.read("bag.list", |conn| {
                let sql = format!(
                    "SELECT {} FROM bags ORDER BY price ASC, name ASC",
                    BAG_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], row_to_bag)?;
                let mut bags = Vec::new();
                for r in rows {
                    bags.push(r?);
                }
                Ok(bags)
            })
        },
        || {
            rayon::join(
                || category::all_categories(&broker),
                || rayon::join(|| fabric::all_fabrics(&broker), || color::all_colors(&broker)),
            )
        },
    );

    let categories = name_index(categories?, |c| (c.id, c.name));
    let fabrics = name_index(fabrics?, |f| (f.id, f.name));
    let colors = name_index(colors?, |c| (c.id, c.name));

    Ok(bags?
        .into_iter()
        .map(|bag| BagListing {
            category: categories.get(&bag.category).cloned(),
            fabric: fabrics.get(&bag.fabric).cloned(),
            color: colors.get(&bag.color).cloned(),
            id: bag.id,
            name: bag.name,
            price: bag.price,
            stock: bag.stock,
        })
        .collect())
}

pub fn bag_detail(store: &Store, id: &str) -> Result<PopulatedBag, error::PlushyError> {
    let broker = DbBroker::new(store);
    let bag = find_bag(&broker, id)?.ok_or_else(|| EntityKind::Bag.not_found())?;

    let (category, (fabric, color)) = rayon::join(
        || category::find_category(&broker, &bag.category),
        || {
            rayon::join(
                || fabric::find_fabric(&broker, &bag.fabric),
                || color::find_color(&broker, &bag.color),
            )
        },
    );

    Ok(PopulatedBag {
        category: category?,
        fabric: fabric?,
        color: color?,
        bag,
    })
}

fn load_choices(broker: &DbBroker) -> Result<BagChoices, error::PlushyError> {
    let (categories, (fabrics, colors)) = rayon::join(
        || category::all_categories(broker),
        || rayon::join(|| fabric::all_fabrics(broker), || color::all_colors(broker)),
    );
    Ok(BagChoices {
        categories: categories?,
        fabrics: fabrics?,
        colors: colors?,
    })
}

/// Select options for an empty create form.
pub fn bag_form_choices(store: &Store) -> Result<BagChoices, error::PlushyError> {
    load_choices(&DbBroker::new(store))
}

pub fn bag_for_update(store: &Store, id: &str) -> Result<BagFormPage, error::PlushyError> {
    let broker = DbBroker::new(store);
    let (bag, choices) = rayon::join(|| find_bag(&broker, id), || load_choices(&broker));
    let bag = bag?.ok_or_else(|| EntityKind::Bag.not_found())?;
    Ok(BagFormPage {
        form: BagForm::from(&bag),
        choices: choices?,
    })
}

fn rejected(
    broker: &DbBroker,
    form: BagForm,
    errors: Vec<FieldError>,
) -> Result<Submission<BagFormPage>, error::PlushyError> {
    Ok(Submission::Rejected {
        form: BagFormPage {
            form,
            choices: load_choices(broker)?,
        },
        errors,
    })
}

pub fn create_bag(
    store: &Store,
    form: &BagForm,
) -> Result<Submission<BagFormPage>, error::PlushyError> {
    let broker = DbBroker::new(store);
    let (form, valid) = validate_form(form);
    let valid = match valid {
        Ok(valid) => valid,
        Err(errors) => return rejected(&broker, form, errors),
    };

    let bag = Bag {
        id: time::new_record_id(),
        name: valid.name,
        price: valid.price,
        stock: valid.stock,
        category: valid.category,
        fabric: valid.fabric,
        color: valid.color,
    };
    broker.write("bag.create", Some(&bag.id), |conn| insert_bag(conn, &bag))?;
    tracing::info!(id = %bag.id, name = %bag.name, "bag created");

    Ok(Submission::Saved {
        location: bag.url(),
    })
}

pub fn update_bag(
    store: &Store,
    id: &str,
    form: &BagForm,
) -> Result<Submission<BagFormPage>, error::PlushyError> {
    let broker = DbBroker::new(store);
    if find_bag(&broker, id)?.is_none() {
        return Err(EntityKind::Bag.not_found());
    }

    let (form, valid) = validate_form(form);
    let valid = match valid {
        Ok(valid) => valid,
        Err(errors) => return rejected(&broker, form, errors),
    };

    let bag = Bag {
        id: id.to_string(),
        name: valid.name,
        price: valid.price,
        stock: valid.stock,
        category: valid.category,
        fabric: valid.fabric,
        color: valid.color,
    };
    broker.write("bag.update", Some(id), |conn| {
        let changed = conn.execute(
            "UPDATE bags SET name = ?2, price = ?3, stock = ?4, category_id = ?5,
                 fabric_id = ?6, color_id = ?7
             WHERE id = ?1",
            params![
                bag.id,
                bag.name,
                bag.price,
                bag.stock,
                bag.category,
                bag.fabric,
                bag.color
            ],
        )?;
        if changed == 0 {
            return Err(EntityKind::Bag.not_found());
        }
        Ok(())
    })?;

    Ok(Submission::Saved {
        location: bag.url(),
    })
}

pub fn bag_delete_page(store: &Store, id: &str) -> Result<Option<Bag>, error::PlushyError> {
    get_bag(store, id)
}

/// Bags have no dependents; only a mismatched confirmation id blocks.
pub fn delete_bag(
    store: &Store,
    id: &str,
    confirmed_id: Option<&str>,
) -> Result<Removal<Bag>, error::PlushyError> {
    let broker = DbBroker::new(store);
    let location = EntityKind::Bag.list_url();

    let Some(bag) = find_bag(&broker, id)? else {
        return Ok(Removal::Removed { location });
    };
    if confirmed_id.is_some_and(|c| c != id) {
        return Ok(Removal::Blocked(bag));
    }

    broker.write("bag.delete", Some(id), |conn| {
        conn.execute("DELETE FROM bags WHERE id = ?1", params![id])?;
        Ok(())
    })?;
    tracing::info!(id, "bag deleted");

    Ok(Removal::Removed { location })
}
