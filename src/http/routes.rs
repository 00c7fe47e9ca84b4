//! Route table and request handlers for `/inventory`.
//!
//! Per kind: list, detail, create, update and two-phase delete. Literal
//! `create` routes are registered before the `{id}` routes.

use crate::core::error::PlushyError;
use crate::core::validate::FieldError;
use crate::http::{AppState, blocking, views};
use crate::inventory::bag::{self, BagForm};
use crate::inventory::category::{self, CategoryForm};
use crate::inventory::color::{self, ColorForm};
use crate::inventory::fabric::{self, FabricForm};
use crate::inventory::{self, BASE_PATH, EntityKind, Removal, Submission};
use axum::Form;
use axum::Router;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use std::collections::HashMap;

type HandlerResult = Result<Response, PlushyError>;

fn kind_path(kind: EntityKind, suffix: &str) -> String {
    format!("{}/{}{}", BASE_PATH, kind.slug(), suffix)
}

pub fn inventory_router() -> Router<AppState> {
    Router::new()
        .route(BASE_PATH, get(index))
        .route(&format!("{BASE_PATH}/"), get(index))
        // bags
        .route(
            &kind_path(EntityKind::Bag, "/create"),
            get(bag_create_get).post(bag_create_post),
        )
        .route(
            &kind_path(EntityKind::Bag, "/{id}/delete"),
            get(bag_delete_get).post(bag_delete_post),
        )
        .route(
            &kind_path(EntityKind::Bag, "/{id}/update"),
            get(bag_update_get).post(bag_update_post),
        )
        .route(&kind_path(EntityKind::Bag, "/{id}"), get(bag_detail))
        .route(&EntityKind::Bag.list_url(), get(bag_list))
        // categories
        .route(
            &kind_path(EntityKind::Category, "/create"),
            get(category_create_get).post(category_create_post),
        )
        .route(
            &kind_path(EntityKind::Category, "/{id}/delete"),
            get(category_delete_get).post(category_delete_post),
        )
        .route(
            &kind_path(EntityKind::Category, "/{id}/update"),
            get(category_update_get).post(category_update_post),
        )
        .route(
            &kind_path(EntityKind::Category, "/{id}"),
            get(category_detail),
        )
        .route(&EntityKind::Category.list_url(), get(category_list))
        // fabrics
        .route(
            &kind_path(EntityKind::Fabric, "/create"),
            get(fabric_create_get).post(fabric_create_post),
        )
        .route(
            &kind_path(EntityKind::Fabric, "/{id}/delete"),
            get(fabric_delete_get).post(fabric_delete_post),
        )
        .route(
            &kind_path(EntityKind::Fabric, "/{id}/update"),
            get(fabric_update_get).post(fabric_update_post),
        )
        .route(&kind_path(EntityKind::Fabric, "/{id}"), get(fabric_detail))
        .route(&EntityKind::Fabric.list_url(), get(fabric_list))
        // colors
        .route(
            &kind_path(EntityKind::Color, "/create"),
            get(color_create_get).post(color_create_post),
        )
        .route(
            &kind_path(EntityKind::Color, "/{id}/delete"),
            get(color_delete_get).post(color_delete_post),
        )
        .route(
            &kind_path(EntityKind::Color, "/{id}/update"),
            get(color_update_get).post(color_update_post),
        )
        .route(&kind_path(EntityKind::Color, "/{id}"), get(color_detail))
        .route(&EntityKind::Color.list_url(), get(color_list))
}

fn submission_response<F>(
    submission: Submission<F>,
    render: impl FnOnce(F, Vec<FieldError>) -> Html<String>,
) -> Response {
    match submission {
        Submission::Saved { location } | Submission::Duplicate { location } => {
            Redirect::to(&location).into_response()
        }
        Submission::Rejected { form, errors } => render(form, errors).into_response(),
    }
}

fn removal_response<P>(removal: Removal<P>, render: impl FnOnce(P) -> Html<String>) -> Response {
    match removal {
        Removal::Removed { location } => Redirect::to(&location).into_response(),
        Removal::Blocked(page) => render(page).into_response(),
    }
}

/// The `{kind}id` field posted by a delete confirmation form.
fn confirmed_id(kind: EntityKind, body: &HashMap<String, String>) -> Option<String> {
    body.get(&format!("{}id", kind.slug()))
        .map(|v| v.trim().to_string())
}

async fn index(State(state): State<AppState>) -> HandlerResult {
    let summary = blocking(move || inventory::summary(&state.store)).await?;
    Ok(views::index(&summary).into_response())
}

// Bag handlers

async fn bag_list(State(state): State<AppState>) -> HandlerResult {
    let bags = blocking(move || bag::list_bags(&state.store)).await?;
    Ok(views::bag_list(&bags).into_response())
}

async fn bag_detail(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let populated = blocking(move || bag::bag_detail(&state.store, &id)).await?;
    Ok(views::bag_detail(&populated).into_response())
}

async fn bag_create_get(State(state): State<AppState>) -> HandlerResult {
    let choices = blocking(move || bag::bag_form_choices(&state.store)).await?;
    Ok(views::bag_form("Create Bag", &BagForm::default(), &choices, &[]).into_response())
}

async fn bag_create_post(
    State(state): State<AppState>,
    Form(form): Form<BagForm>,
) -> HandlerResult {
    let submission = blocking(move || bag::create_bag(&state.store, &form)).await?;
    Ok(submission_response(submission, |page, errors| {
        views::bag_form("Create Bag", &page.form, &page.choices, &errors)
    }))
}

async fn bag_update_get(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let page = blocking(move || bag::bag_for_update(&state.store, &id)).await?;
    Ok(views::bag_form("Update Bag", &page.form, &page.choices, &[]).into_response())
}

async fn bag_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<BagForm>,
) -> HandlerResult {
    let submission = blocking(move || bag::update_bag(&state.store, &id, &form)).await?;
    Ok(submission_response(submission, |page, errors| {
        views::bag_form("Update Bag", &page.form, &page.choices, &errors)
    }))
}

async fn bag_delete_get(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    match blocking(move || bag::bag_delete_page(&state.store, &id)).await? {
        Some(found) => Ok(views::bag_delete(&found).into_response()),
        None => Ok(Redirect::to(&EntityKind::Bag.list_url()).into_response()),
    }
}

async fn bag_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(body): Form<HashMap<String, String>>,
) -> HandlerResult {
    let confirmed = confirmed_id(EntityKind::Bag, &body);
    let removal =
        blocking(move || bag::delete_bag(&state.store, &id, confirmed.as_deref())).await?;
    Ok(removal_response(removal, |found| views::bag_delete(&found)))
}

// Category handlers

async fn category_list(State(state): State<AppState>) -> HandlerResult {
    let categories = blocking(move || category::list_categories(&state.store)).await?;
    Ok(views::category_list(&categories).into_response())
}

async fn category_detail(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let detail = blocking(move || category::category_detail(&state.store, &id)).await?;
    Ok(views::category_detail(&detail).into_response())
}

async fn category_create_get() -> Response {
    views::category_form("Create Category", &CategoryForm::default(), &[]).into_response()
}

async fn category_create_post(
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> HandlerResult {
    let submission = blocking(move || category::create_category(&state.store, &form)).await?;
    Ok(submission_response(submission, |form, errors| {
        views::category_form("Create Category", &form, &errors)
    }))
}

async fn category_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    let form = blocking(move || category::category_for_update(&state.store, &id)).await?;
    Ok(views::category_form("Update Category", &form, &[]).into_response())
}

async fn category_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<CategoryForm>,
) -> HandlerResult {
    let submission =
        blocking(move || category::update_category(&state.store, &id, &form)).await?;
    Ok(submission_response(submission, |form, errors| {
        views::category_form("Update Category", &form, &errors)
    }))
}

async fn category_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    match blocking(move || category::category_delete_page(&state.store, &id)).await? {
        Some(detail) => Ok(views::category_delete(&detail).into_response()),
        None => Ok(Redirect::to(&EntityKind::Category.list_url()).into_response()),
    }
}

async fn category_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(body): Form<HashMap<String, String>>,
) -> HandlerResult {
    let confirmed = confirmed_id(EntityKind::Category, &body);
    let removal =
        blocking(move || category::delete_category(&state.store, &id, confirmed.as_deref()))
            .await?;
    Ok(removal_response(removal, |detail| {
        views::category_delete(&detail)
    }))
}

// Fabric handlers

async fn fabric_list(State(state): State<AppState>) -> HandlerResult {
    let fabrics = blocking(move || fabric::list_fabrics(&state.store)).await?;
    Ok(views::fabric_list(&fabrics).into_response())
}

async fn fabric_detail(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let detail = blocking(move || fabric::fabric_detail(&state.store, &id)).await?;
    Ok(views::fabric_detail(&detail).into_response())
}

async fn fabric_create_get() -> Response {
    views::fabric_form("Create Fabric", &FabricForm::default(), &[]).into_response()
}

async fn fabric_create_post(
    State(state): State<AppState>,
    Form(form): Form<FabricForm>,
) -> HandlerResult {
    let submission = blocking(move || fabric::create_fabric(&state.store, &form)).await?;
    Ok(submission_response(submission, |form, errors| {
        views::fabric_form("Create Fabric", &form, &errors)
    }))
}

async fn fabric_update_get(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let form = blocking(move || fabric::fabric_for_update(&state.store, &id)).await?;
    Ok(views::fabric_form("Update Fabric", &form, &[]).into_response())
}

async fn fabric_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<FabricForm>,
) -> HandlerResult {
    let submission = blocking(move || fabric::update_fabric(&state.store, &id, &form)).await?;
    Ok(submission_response(submission, |form, errors| {
        views::fabric_form("Update Fabric", &form, &errors)
    }))
}

async fn fabric_delete_get(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    match blocking(move || fabric::fabric_delete_page(&state.store, &id)).await? {
        Some(detail) => Ok(views::fabric_delete(&detail).into_response()),
        None => Ok(Redirect::to(&EntityKind::Fabric.list_url()).into_response()),
    }
}

async fn fabric_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(body): Form<HashMap<String, String>>,
) -> HandlerResult {
    let confirmed = confirmed_id(EntityKind::Fabric, &body);
    let removal =
        blocking(move || fabric::delete_fabric(&state.store, &id, confirmed.as_deref())).await?;
    Ok(removal_response(removal, |detail| views::fabric_delete(&detail)))
}

// Color handlers

async fn color_list(State(state): State<AppState>) -> HandlerResult {
    let colors = blocking(move || color::list_colors(&state.store)).await?;
    Ok(views::color_list(&colors).into_response())
}

async fn color_detail(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let detail = blocking(move || color::color_detail(&state.store, &id)).await?;
    Ok(views::color_detail(&detail).into_response())
}

async fn color_create_get() -> Response {
    views::color_form("Create Color", &ColorForm::default(), &[]).into_response()
}

async fn color_create_post(
    State(state): State<AppState>,
    Form(form): Form<ColorForm>,
) -> HandlerResult {
    let submission = blocking(move || color::create_color(&state.store, &form)).await?;
    Ok(submission_response(submission, |form, errors| {
        views::color_form("Create Color", &form, &errors)
    }))
}

async fn color_update_get(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let form = blocking(move || color::color_for_update(&state.store, &id)).await?;
    Ok(views::color_form("Update Color", &form, &[]).into_response())
}

async fn color_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ColorForm>,
) -> HandlerResult {
    let submission = blocking(move || color::update_color(&state.store, &id, &form)).await?;
    Ok(submission_response(submission, |form, errors| {
        views::color_form("Update Color", &form, &errors)
    }))
}

async fn color_delete_get(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    match blocking(move || color::color_delete_page(&state.store, &id)).await? {
        Some(detail) => Ok(views::color_delete(&detail).into_response()),
        None => Ok(Redirect::to(&EntityKind::Color.list_url()).into_response()),
    }
}

async fn color_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(body): Form<HashMap<String, String>>,
) -> HandlerResult {
    let confirmed = confirmed_id(EntityKind::Color, &body);
    let removal =
        blocking(move || color::delete_color(&state.store, &id, confirmed.as_deref())).await?;
    Ok(removal_response(removal, |detail| views::color_delete(&detail)))
}
