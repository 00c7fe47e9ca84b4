use plushy::core::db::initialize_inventory_db;
use plushy::core::store::Store;
use plushy::inventory::bag::{BagForm, bag_detail, create_bag, update_bag};
use plushy::inventory::category::{CategoryForm, create_category};
use plushy::inventory::color::{ColorForm, create_color};
use plushy::inventory::fabric::{
    FabricForm, create_fabric, delete_fabric, fabric_detail, fabric_for_update, get_fabric,
    list_fabrics, update_fabric,
};
use plushy::inventory::{Removal, Submission};
use tempfile::{TempDir, tempdir};

fn fresh_store() -> (TempDir, Store) {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path().join("data"));
    initialize_inventory_db(&store).unwrap();
    (tmp, store)
}

fn fabric_form(name: &str) -> FabricForm {
    FabricForm {
        name: name.to_string(),
        description: "Soft, fun, and comfortable.".to_string(),
        image: "fluffy.jpg".to_string(),
    }
}

fn saved_id<F: std::fmt::Debug>(submission: Submission<F>) -> String {
    match submission {
        Submission::Saved { location } => location.rsplit('/').next().unwrap().to_string(),
        other => panic!("expected Saved, got {other:?}"),
    }
}

#[test]
fn test_fabric_lifecycle() {
    let (_tmp, store) = fresh_store();
    let id = saved_id(create_fabric(&store, &fabric_form("Fluffy")).unwrap());

    let listed = list_fabrics(&store).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Fluffy");
    assert_eq!(listed[0].image, "/images/fluffy.jpg");

    let form = fabric_for_update(&store, &id).unwrap();
    assert_eq!(form, fabric_form("Fluffy"));

    saved_id(update_fabric(&store, &id, &fabric_form("Leather")).unwrap());
    assert_eq!(get_fabric(&store, &id).unwrap().unwrap().name, "Leather");

    assert!(matches!(
        delete_fabric(&store, &id, Some(&id)).unwrap(),
        Removal::Removed { .. }
    ));
    assert!(get_fabric(&store, &id).unwrap().is_none());
}

#[test]
fn test_invalid_update_leaves_record_untouched() {
    let (_tmp, store) = fresh_store();
    let id = saved_id(create_fabric(&store, &fabric_form("Canvas")).unwrap());

    let mut bad = fabric_form("");
    bad.description = "  Still fine here  ".to_string();
    match update_fabric(&store, &id, &bad).unwrap() {
        Submission::Rejected { form, errors } => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].message, "Fabric must have a name.");
            assert_eq!(form.description, "Still fine here");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(get_fabric(&store, &id).unwrap().unwrap().name, "Canvas");
}

#[test]
fn test_overlong_image_is_rejected() {
    let (_tmp, store) = fresh_store();
    let mut form = fabric_form("Canvas");
    form.image = format!("{}.jpg", "a".repeat(500));
    assert!(matches!(
        create_fabric(&store, &form).unwrap(),
        Submission::Rejected { .. }
    ));
    assert!(list_fabrics(&store).unwrap().is_empty());
}

#[test]
fn test_moving_the_last_bag_away_unblocks_delete() {
    let (_tmp, store) = fresh_store();
    let canvas = saved_id(create_fabric(&store, &fabric_form("Canvas")).unwrap());
    let leather = saved_id(create_fabric(&store, &fabric_form("Leather")).unwrap());
    let category = saved_id(
        create_category(
            &store,
            &CategoryForm {
                name: "Classic".to_string(),
                description: "For all occasions".to_string(),
                image: "classic.png".to_string(),
            },
        )
        .unwrap(),
    );
    let color = saved_id(
        create_color(
            &store,
            &ColorForm {
                name: "Grey".to_string(),
                image: "grey.jpg".to_string(),
            },
        )
        .unwrap(),
    );
    let mut form = BagForm {
        name: "Grey Classic".to_string(),
        price: "42".to_string(),
        stock: "1".to_string(),
        category,
        fabric: canvas.clone(),
        color,
    };
    let bag = saved_id(create_bag(&store, &form).unwrap());

    assert_eq!(fabric_detail(&store, &canvas).unwrap().bags.len(), 1);
    assert!(matches!(
        delete_fabric(&store, &canvas, None).unwrap(),
        Removal::Blocked(_)
    ));

    form.fabric = leather.clone();
    saved_id(update_bag(&store, &bag, &form).unwrap());
    assert!(fabric_detail(&store, &canvas).unwrap().bags.is_empty());
    assert_eq!(
        bag_detail(&store, &bag).unwrap().fabric.unwrap().name,
        "Leather"
    );

    assert!(matches!(
        delete_fabric(&store, &canvas, None).unwrap(),
        Removal::Removed { .. }
    ));
    let names: Vec<_> = list_fabrics(&store)
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["Leather"]);
}
