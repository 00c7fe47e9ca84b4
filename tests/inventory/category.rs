use plushy::core::db::initialize_inventory_db;
use plushy::core::store::Store;
use plushy::inventory::bag::{BagForm, create_bag, delete_bag, list_bags};
use plushy::inventory::category::{
    CategoryForm, category_delete_page, category_detail, category_for_update, create_category,
    delete_category, get_category, list_categories, update_category,
};
use plushy::inventory::color::{ColorForm, create_color};
use plushy::inventory::fabric::{FabricForm, create_fabric};
use plushy::inventory::{Removal, Submission};
use std::fs;
use tempfile::{TempDir, tempdir};

fn fresh_store() -> (TempDir, Store) {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path().join("data"));
    initialize_inventory_db(&store).unwrap();
    (tmp, store)
}

fn category_form(name: &str) -> CategoryForm {
    CategoryForm {
        name: name.to_string(),
        description: "A bean bag chair for all occasions".to_string(),
        image: "classic.png".to_string(),
    }
}

fn audit_lines(store: &Store) -> usize {
    fs::read_to_string(store.events_path())
        .map(|text| text.lines().count())
        .unwrap_or(0)
}

fn id_from(location: &str) -> String {
    location.rsplit('/').next().unwrap().to_string()
}

fn saved_id<F: std::fmt::Debug>(submission: Submission<F>) -> String {
    match submission {
        Submission::Saved { location } => id_from(&location),
        other => panic!("expected Saved, got {other:?}"),
    }
}

fn add_bag(store: &Store, category: &str, name: &str, price: &str) -> String {
    let fabric = saved_id(
        create_fabric(
            store,
            &FabricForm {
                name: format!("F{}", name.replace(' ', "")),
                description: "Tough canvas".to_string(),
                image: "canvas.jpg".to_string(),
            },
        )
        .unwrap(),
    );
    let color = match create_color(
        store,
        &ColorForm {
            name: "Red".to_string(),
            image: "red.jpg".to_string(),
        },
    )
    .unwrap()
    {
        Submission::Saved { location } | Submission::Duplicate { location } => id_from(&location),
        other => panic!("unexpected {other:?}"),
    };
    saved_id(
        create_bag(
            store,
            &BagForm {
                name: name.to_string(),
                price: price.to_string(),
                stock: "3".to_string(),
                category: category.to_string(),
                fabric,
                color,
            },
        )
        .unwrap(),
    )
}

#[test]
fn test_create_stores_trimmed_values_and_prefixed_image() {
    let (_tmp, store) = fresh_store();
    let mut form = category_form("  Classic  ");
    form.image = "/images/classic.png".to_string();
    let id = saved_id(create_category(&store, &form).unwrap());

    let stored = get_category(&store, &id).unwrap().unwrap();
    assert_eq!(stored.name, "Classic");
    assert_eq!(stored.image, "/images/classic.png");
    assert_eq!(stored.image_location(), "classic.png");
    assert_eq!(stored.url(), format!("/inventory/category/{id}"));

    let prefilled = category_for_update(&store, &id).unwrap();
    assert_eq!(prefilled.image, "classic.png");
}

#[test]
fn test_short_name_is_rejected_without_writing() {
    let (_tmp, store) = fresh_store();
    match create_category(&store, &category_form("   ")).unwrap() {
        Submission::Rejected { form, errors } => {
            assert_eq!(form.name, "");
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].message, "Category must have a name.");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert!(list_categories(&store).unwrap().is_empty());
}

#[test]
fn test_every_failing_field_is_reported() {
    let (_tmp, store) = fresh_store();
    let form = CategoryForm {
        name: "Big Chair".to_string(),
        description: "ok".to_string(),
        image: "x".to_string(),
    };
    match create_category(&store, &form).unwrap() {
        Submission::Rejected { errors, .. } => {
            let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
            assert_eq!(fields, vec!["name", "description", "image"]);
            assert_eq!(
                errors[0].message,
                "Category name has non-alphanumeric characters."
            );
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[test]
fn test_list_sorts_by_name() {
    let (_tmp, store) = fresh_store();
    for name in ["Kids", "Classic", "Jumbo"] {
        create_category(&store, &category_form(name)).unwrap();
    }
    let names: Vec<_> = list_categories(&store)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Classic", "Jumbo", "Kids"]);
}

#[test]
fn test_unknown_id_is_not_found() {
    let (_tmp, store) = fresh_store();
    let err = category_detail(&store, "01HZZZZZZZZZZZZZZZZZZZZZZZ").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Category not found");

    let err = update_category(&store, "nope", &category_form("Classic")).unwrap_err();
    assert!(err.is_not_found());
    assert!(list_categories(&store).unwrap().is_empty());
}

#[test]
fn test_update_replaces_fields_and_keeps_id() {
    let (_tmp, store) = fresh_store();
    let id = saved_id(create_category(&store, &category_form("Classic")).unwrap());
    let mut form = category_form("Jumbo");
    form.description = "You will sink into comfort".to_string();
    match update_category(&store, &id, &form).unwrap() {
        Submission::Saved { location } => assert_eq!(location, format!("/inventory/category/{id}")),
        other => panic!("expected Saved, got {other:?}"),
    }
    let stored = get_category(&store, &id).unwrap().unwrap();
    assert_eq!(stored.name, "Jumbo");
    assert_eq!(stored.description, "You will sink into comfort");
    assert_eq!(list_categories(&store).unwrap().len(), 1);
}

#[test]
fn test_detail_lists_dependent_bags_by_price() {
    let (_tmp, store) = fresh_store();
    let id = saved_id(create_category(&store, &category_form("Classic")).unwrap());
    add_bag(&store, &id, "Pricey", "90");
    add_bag(&store, &id, "Cheap", "10.5");

    let detail = category_detail(&store, &id).unwrap();
    let names: Vec<_> = detail.bags.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Cheap", "Pricey"]);
}

#[test]
fn test_delete_is_blocked_while_bags_reference_it() {
    let (_tmp, store) = fresh_store();
    let id = saved_id(create_category(&store, &category_form("Classic")).unwrap());
    let first = add_bag(&store, &id, "One", "20");
    let second = add_bag(&store, &id, "Two", "30");

    let page = category_delete_page(&store, &id).unwrap().unwrap();
    assert_eq!(page.bags.len(), 2);

    match delete_category(&store, &id, Some(&id)).unwrap() {
        Removal::Blocked(page) => assert_eq!(page.bags.len(), 2),
        other => panic!("expected Blocked, got {other:?}"),
    }
    assert!(get_category(&store, &id).unwrap().is_some());
    assert_eq!(list_bags(&store).unwrap().len(), 2);

    delete_bag(&store, &first, None).unwrap();
    delete_bag(&store, &second, None).unwrap();

    match delete_category(&store, &id, Some(&id)).unwrap() {
        Removal::Removed { location } => assert_eq!(location, "/inventory/categories"),
        other => panic!("expected Removed, got {other:?}"),
    }
    assert!(list_categories(&store).unwrap().is_empty());
}

#[test]
fn test_delete_with_mismatched_confirmation_is_refused() {
    let (_tmp, store) = fresh_store();
    let id = saved_id(create_category(&store, &category_form("Classic")).unwrap());
    assert!(matches!(
        delete_category(&store, &id, Some("someone-else")).unwrap(),
        Removal::Blocked(_)
    ));
    assert!(get_category(&store, &id).unwrap().is_some());
}

#[test]
fn test_delete_of_missing_record_redirects_to_list() {
    let (_tmp, store) = fresh_store();
    assert!(category_delete_page(&store, "gone").unwrap().is_none());
    match delete_category(&store, "gone", None).unwrap() {
        Removal::Removed { location } => assert_eq!(location, "/inventory/categories"),
        other => panic!("expected Removed, got {other:?}"),
    }
}

#[test]
fn test_blank_update_name_leaves_record_and_audit_untouched() {
    let (_tmp, store) = fresh_store();
    let id = saved_id(create_category(&store, &category_form("Classic")).unwrap());
    let before = get_category(&store, &id).unwrap().unwrap();
    let lines = audit_lines(&store);

    for name in ["", "   "] {
        match update_category(&store, &id, &category_form(name)).unwrap() {
            Submission::Rejected { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "name");
                assert_eq!(errors[0].message, "Category must have a name.");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }
    assert_eq!(get_category(&store, &id).unwrap().unwrap(), before);
    assert_eq!(audit_lines(&store), lines);
}

#[test]
fn test_unwritable_audit_log_stops_the_write_before_it_commits() {
    let (_tmp, store) = fresh_store();
    fs::create_dir_all(store.events_path()).unwrap();

    assert!(create_category(&store, &category_form("Classic")).is_err());
    assert!(list_categories(&store).unwrap().is_empty());
}
