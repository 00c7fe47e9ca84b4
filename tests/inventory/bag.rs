use plushy::core::db::initialize_inventory_db;
use plushy::core::store::Store;
use plushy::inventory::bag::{
    BagForm, bag_delete_page, bag_detail, bag_for_update, bag_form_choices, create_bag,
    delete_bag, get_bag, list_bags, update_bag,
};
use plushy::inventory::category::{CategoryForm, create_category, delete_category};
use plushy::inventory::color::{ColorForm, create_color};
use plushy::inventory::fabric::{FabricForm, create_fabric};
use plushy::inventory::{Removal, Submission};
use rusqlite::Connection;
use std::fs;
use tempfile::{TempDir, tempdir};

struct Refs {
    category: String,
    fabric: String,
    color: String,
}

fn saved_id<F: std::fmt::Debug>(submission: Submission<F>) -> String {
    match submission {
        Submission::Saved { location } => location.rsplit('/').next().unwrap().to_string(),
        other => panic!("expected Saved, got {other:?}"),
    }
}

fn fresh_store() -> (TempDir, Store, Refs) {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path().join("data"));
    initialize_inventory_db(&store).unwrap();
    let category = saved_id(
        create_category(
            &store,
            &CategoryForm {
                name: "Jumbo".to_string(),
                description: "In this overstuffed chair you will sink into comfort".to_string(),
                image: "jumbo.jpg".to_string(),
            },
        )
        .unwrap(),
    );
    let fabric = saved_id(
        create_fabric(
            &store,
            &FabricForm {
                name: "Canvas".to_string(),
                description: "Tough, water and stain resistant".to_string(),
                image: "canvas.jpg".to_string(),
            },
        )
        .unwrap(),
    );
    let color = saved_id(
        create_color(
            &store,
            &ColorForm {
                name: "Purple".to_string(),
                image: "purple.jpg".to_string(),
            },
        )
        .unwrap(),
    );
    (
        tmp,
        store,
        Refs {
            category,
            fabric,
            color,
        },
    )
}

fn bag_form(refs: &Refs, name: &str, price: &str, stock: &str) -> BagForm {
    BagForm {
        name: name.to_string(),
        price: price.to_string(),
        stock: stock.to_string(),
        category: refs.category.clone(),
        fabric: refs.fabric.clone(),
        color: refs.color.clone(),
    }
}

fn bag_rows(store: &Store) -> i64 {
    let conn = Connection::open(store.db_path()).unwrap();
    conn.query_row("SELECT COUNT(*) FROM bags", [], |row| row.get(0))
        .unwrap()
}

fn audit_lines(store: &Store) -> usize {
    fs::read_to_string(store.events_path())
        .map(|text| text.lines().count())
        .unwrap_or(0)
}

#[test]
fn test_price_and_stock_are_stored_as_numbers() {
    let (_tmp, store, refs) = fresh_store();
    let id = saved_id(create_bag(&store, &bag_form(&refs, "Purple Jumbo", " 37.50 ", "08")).unwrap());

    let conn = Connection::open(store.db_path()).unwrap();
    let (price_type, stock_type): (String, String) = conn
        .query_row(
            "SELECT typeof(price), typeof(stock) FROM bags WHERE id = ?1",
            rusqlite::params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(price_type, "real");
    assert_eq!(stock_type, "integer");

    let bag = get_bag(&store, &id).unwrap().unwrap();
    assert_eq!(bag.price, 37.5);
    assert_eq!(bag.stock, 8);
    assert_eq!(bag.display_price(), "$37.50");
}

#[test]
fn test_invalid_submission_reports_each_field_and_writes_nothing() {
    let (_tmp, store, refs) = fresh_store();
    let mut form = bag_form(&refs, "", "0", "-2");
    form.color = "   ".to_string();
    match create_bag(&store, &form).unwrap() {
        Submission::Rejected { form, errors } => {
            let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
            assert_eq!(
                messages,
                vec![
                    "Bag must have a name.",
                    "Price must be a positive number.",
                    "Stock must be a whole number of zero or more.",
                    "Bag must have a color.",
                ]
            );
            assert_eq!(form.form.price, "0");
            assert_eq!(form.choices.categories.len(), 1);
            assert_eq!(form.choices.colors.len(), 1);
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(bag_rows(&store), 0);
}

#[test]
fn test_bag_names_may_contain_spaces() {
    let (_tmp, store, refs) = fresh_store();
    let id = saved_id(create_bag(&store, &bag_form(&refs, "Purple Jumbo Deluxe", "99", "0")).unwrap());
    assert_eq!(get_bag(&store, &id).unwrap().unwrap().name, "Purple Jumbo Deluxe");
}

#[test]
fn test_list_is_sorted_by_price_with_reference_names() {
    let (_tmp, store, refs) = fresh_store();
    create_bag(&store, &bag_form(&refs, "Mid", "50", "1")).unwrap();
    create_bag(&store, &bag_form(&refs, "Low", "5.25", "1")).unwrap();
    create_bag(&store, &bag_form(&refs, "High", "150", "1")).unwrap();

    let bags = list_bags(&store).unwrap();
    let names: Vec<_> = bags.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Low", "Mid", "High"]);
    assert_eq!(bags[0].category.as_deref(), Some("Jumbo"));
    assert_eq!(bags[0].fabric.as_deref(), Some("Canvas"));
    assert_eq!(bags[0].color.as_deref(), Some("Purple"));
}

#[test]
fn test_detail_populates_references_and_tolerates_dangling_ones() {
    let (_tmp, store, refs) = fresh_store();
    let mut form = bag_form(&refs, "Orphan", "12", "2");
    form.category = "01HNOSUCHCATEGORY000000000".to_string();
    let id = saved_id(create_bag(&store, &form).unwrap());

    let populated = bag_detail(&store, &id).unwrap();
    assert!(populated.category.is_none());
    assert_eq!(populated.fabric.unwrap().name, "Canvas");
    assert_eq!(populated.color.unwrap().name, "Purple");

    let listing = list_bags(&store).unwrap();
    assert_eq!(listing[0].category, None);
}

#[test]
fn test_fabricated_id_is_not_found() {
    let (_tmp, store, refs) = fresh_store();
    assert!(bag_detail(&store, "missing").unwrap_err().is_not_found());
    assert!(bag_for_update(&store, "missing").unwrap_err().is_not_found());
    let err = update_bag(&store, "missing", &bag_form(&refs, "X", "1", "1")).unwrap_err();
    assert_eq!(err.to_string(), "Bag not found");
    assert_eq!(bag_rows(&store), 0);
}

#[test]
fn test_update_form_round_trips_stored_values() {
    let (_tmp, store, refs) = fresh_store();
    let id = saved_id(create_bag(&store, &bag_form(&refs, "Purple Jumbo", "25.99", "15")).unwrap());

    let page = bag_for_update(&store, &id).unwrap();
    assert_eq!(page.form.price, "25.99");
    assert_eq!(page.form.stock, "15");
    assert_eq!(page.form.category, refs.category);
    assert_eq!(page.choices.fabrics.len(), 1);

    let mut edited = page.form.clone();
    edited.stock = "14".to_string();
    saved_id(update_bag(&store, &id, &edited).unwrap());
    assert_eq!(get_bag(&store, &id).unwrap().unwrap().stock, 14);
    assert_eq!(bag_rows(&store), 1);
}

#[test]
fn test_create_form_offers_every_reference() {
    let (_tmp, store, _refs) = fresh_store();
    let choices = bag_form_choices(&store).unwrap();
    assert_eq!(choices.categories[0].name, "Jumbo");
    assert_eq!(choices.fabrics[0].name, "Canvas");
    assert_eq!(choices.colors[0].name, "Purple");
}

#[test]
fn test_delete_has_no_dependent_gate_and_unblocks_category() {
    let (_tmp, store, refs) = fresh_store();
    let id = saved_id(create_bag(&store, &bag_form(&refs, "Only", "10", "1")).unwrap());

    assert!(matches!(
        delete_category(&store, &refs.category, None).unwrap(),
        Removal::Blocked(_)
    ));

    assert!(bag_delete_page(&store, &id).unwrap().is_some());
    match delete_bag(&store, &id, Some(&id)).unwrap() {
        Removal::Removed { location } => assert_eq!(location, "/inventory/bags"),
        other => panic!("expected Removed, got {other:?}"),
    }
    assert!(bag_delete_page(&store, &id).unwrap().is_none());

    assert!(matches!(
        delete_category(&store, &refs.category, None).unwrap(),
        Removal::Removed { .. }
    ));
}

#[test]
fn test_blank_update_name_leaves_record_and_audit_untouched() {
    let (_tmp, store, refs) = fresh_store();
    let id = saved_id(create_bag(&store, &bag_form(&refs, "Purple Jumbo", "25.99", "15")).unwrap());
    let before = get_bag(&store, &id).unwrap().unwrap();
    let lines = audit_lines(&store);

    for name in ["", "   "] {
        match update_bag(&store, &id, &bag_form(&refs, name, "30", "2")).unwrap() {
            Submission::Rejected { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].message, "Bag must have a name.");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }
    assert_eq!(get_bag(&store, &id).unwrap().unwrap(), before);
    assert_eq!(audit_lines(&store), lines);
}
