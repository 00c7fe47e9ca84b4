//! Server-rendered HTML pages.
//!
//! Every interpolated value goes through [`escape`]. Stored text is kept raw
//! so nothing is ever escaped twice.

use crate::core::validate::FieldError;
use crate::inventory::bag::{self, Bag, BagChoices, BagForm, BagListing, PopulatedBag};
use crate::inventory::category::{Category, CategoryForm, CategoryWithBags};
use crate::inventory::color::{Color, ColorForm, ColorWithBags};
use crate::inventory::fabric::{Fabric, FabricForm, FabricWithBags};
use crate::inventory::{BASE_PATH, BagSummary, EntityKind, Summary};
use axum::response::Html;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    let mut nav = String::new();
    nav.push_str(&format!("<li><a href=\"{BASE_PATH}\">Home</a></li>"));
    for kind in EntityKind::ALL {
        nav.push_str(&format!(
            "<li><a href=\"{}\">All {}</a></li>",
            kind.list_url(),
            kind.plural()
        ));
    }
    nav.push_str("<hr>");
    for kind in EntityKind::ALL {
        nav.push_str(&format!(
            "<li><a href=\"{}/{}/create\">Create new {}</a></li>",
            BASE_PATH,
            kind.slug(),
            kind.slug()
        ));
    }

    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"/stylesheets/style.css\">\n</head>\n<body>\n\
         <div class=\"layout\">\n<nav class=\"sidebar\"><ul>{nav}</ul></nav>\n\
         <main>\n<h1>{title}</h1>\n{body}\n</main>\n</div>\n</body>\n</html>\n",
        title = escape(title),
    ))
}

fn link(url: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape(url), escape(text))
}

fn swatch(stored: &str, display: &str) -> String {
    format!(
        "<img class=\"swatch\" src=\"{}\" alt=\"{}\">",
        escape(stored),
        escape(display)
    )
}

fn error_list(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", escape(&e.message)))
        .collect();
    format!("<ul class=\"errors\">{items}</ul>")
}

fn text_input(name: &str, label: &str, value: &str) -> String {
    format!(
        "<div class=\"field\"><label for=\"{name}\">{label}</label>\
         <input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{}\"></div>",
        escape(value)
    )
}

fn textarea(name: &str, label: &str, value: &str) -> String {
    format!(
        "<div class=\"field\"><label for=\"{name}\">{label}</label>\
         <textarea id=\"{name}\" name=\"{name}\" rows=\"3\">{}</textarea></div>",
        escape(value)
    )
}

fn select<'a>(
    name: &str,
    label: &str,
    selected: &str,
    options: impl Iterator<Item = (&'a str, &'a str)>,
) -> String {
    let mut out = format!(
        "<div class=\"field\"><label for=\"{name}\">{label}</label>\
         <select id=\"{name}\" name=\"{name}\"><option value=\"\">Select {label}</option>"
    );
    for (id, text) in options {
        let marker = if id == selected { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            escape(id),
            marker,
            escape(text)
        ));
    }
    out.push_str("</select></div>");
    out
}

fn form(fields: &str, errors: &[FieldError]) -> String {
    format!(
        "<form method=\"post\">{fields}<button type=\"submit\">Submit</button></form>{}",
        error_list(errors)
    )
}

fn bag_summaries(bags: &[BagSummary], empty: &str) -> String {
    if bags.is_empty() {
        return format!("<p>{}</p>", escape(empty));
    }
    let items: String = bags
        .iter()
        .map(|b| {
            format!(
                "<li>{} <span class=\"price\">{}</span></li>",
                link(&b.url(), &b.name),
                bag::format_price(b.price)
            )
        })
        .collect();
    format!("<ul class=\"dependents\">{items}</ul>")
}

fn record_actions(kind: EntityKind, url: &str) -> String {
    format!(
        "<hr><p>{} | {}</p>",
        link(&format!("{url}/delete"), &format!("Delete {}", kind.label())),
        link(&format!("{url}/update"), &format!("Update {}", kind.label()))
    )
}

/// Delete confirmation shared by the three kinds that bags reference.
fn guarded_delete(kind: EntityKind, id: &str, name: &str, bags: &[BagSummary]) -> String {
    let mut body = format!("<h2>{}</h2>", escape(name));
    if bags.is_empty() {
        body.push_str(&format!(
            "<p>Do you really want to delete this {}?</p>\
             <form method=\"post\"><input type=\"hidden\" name=\"{}id\" value=\"{}\">\
             <button type=\"submit\">Delete</button></form>",
            kind.slug(),
            kind.slug(),
            escape(id)
        ));
    } else {
        body.push_str(&format!(
            "<p><strong>Delete the following bags before attempting to delete this {}.</strong></p>",
            kind.slug()
        ));
        body.push_str(&bag_summaries(bags, ""));
    }
    body
}

pub fn index(summary: &Summary) -> Html<String> {
    let rows: String = [
        (EntityKind::Bag, summary.bags),
        (EntityKind::Category, summary.categories),
        (EntityKind::Fabric, summary.fabrics),
        (EntityKind::Color, summary.colors),
    ]
    .into_iter()
    .map(|(kind, n)| {
        format!(
            "<li><strong>{}:</strong> {}</li>",
            link(&kind.list_url(), kind.plural()),
            n
        )
    })
    .collect();
    layout(
        "Plushy Inventory",
        &format!(
            "<p>Welcome to the bean bag chair inventory.</p>\
             <h2>The catalog holds</h2><ul>{rows}</ul>"
        ),
    )
}

pub fn error_page(message: &str) -> Html<String> {
    layout("Error", &format!("<p>{}</p>", escape(message)))
}

// Categories

pub fn category_list(categories: &[Category]) -> Html<String> {
    let body = if categories.is_empty() {
        "<p>There are no categories.</p>".to_string()
    } else {
        let items: String = categories
            .iter()
            .map(|c| format!("<li>{}</li>", link(&c.url(), &c.name)))
            .collect();
        format!("<ul>{items}</ul>")
    };
    layout("Category List", &body)
}

pub fn category_detail(detail: &CategoryWithBags) -> Html<String> {
    let c = &detail.category;
    let body = format!(
        "<h2>{}</h2>{}<p>{}</p><h3>Bags</h3>{}{}",
        escape(&c.name),
        swatch(&c.image, c.image_location()),
        escape(&c.description),
        bag_summaries(&detail.bags, "This category has no bags."),
        record_actions(EntityKind::Category, &c.url())
    );
    layout(&format!("Category: {}", c.name), &body)
}

pub fn category_form(title: &str, values: &CategoryForm, errors: &[FieldError]) -> Html<String> {
    let fields = [
        text_input("name", "Name", &values.name),
        textarea("description", "Description", &values.description),
        text_input("image", "Image file", &values.image),
    ]
    .concat();
    layout(title, &form(&fields, errors))
}

pub fn category_delete(detail: &CategoryWithBags) -> Html<String> {
    let c = &detail.category;
    layout(
        "Delete Category",
        &guarded_delete(EntityKind::Category, &c.id, &c.name, &detail.bags),
    )
}

// Fabrics

pub fn fabric_list(fabrics: &[Fabric]) -> Html<String> {
    let body = if fabrics.is_empty() {
        "<p>There are no fabrics.</p>".to_string()
    } else {
        let items: String = fabrics
            .iter()
            .map(|f| {
                format!(
                    "<li>{}: {}</li>",
                    link(&f.url(), &f.name),
                    escape(&f.description)
                )
            })
            .collect();
        format!("<ul>{items}</ul>")
    };
    layout("Fabric List", &body)
}

pub fn fabric_detail(detail: &FabricWithBags) -> Html<String> {
    let f = &detail.fabric;
    let body = format!(
        "<h2>{}</h2>{}<p>{}</p><h3>Bags</h3>{}{}",
        escape(&f.name),
        swatch(&f.image, f.image_location()),
        escape(&f.description),
        bag_summaries(&detail.bags, "This fabric has no bags."),
        record_actions(EntityKind::Fabric, &f.url())
    );
    layout(&format!("Fabric: {}", f.name), &body)
}

pub fn fabric_form(title: &str, values: &FabricForm, errors: &[FieldError]) -> Html<String> {
    let fields = [
        text_input("name", "Name", &values.name),
        textarea("description", "Description", &values.description),
        text_input("image", "Image file", &values.image),
    ]
    .concat();
    layout(title, &form(&fields, errors))
}

pub fn fabric_delete(detail: &FabricWithBags) -> Html<String> {
    let f = &detail.fabric;
    layout(
        "Delete Fabric",
        &guarded_delete(EntityKind::Fabric, &f.id, &f.name, &detail.bags),
    )
}

// Colors

pub fn color_list(colors: &[Color]) -> Html<String> {
    let body = if colors.is_empty() {
        "<p>There are no colors.</p>".to_string()
    } else {
        let items: String = colors
            .iter()
            .map(|c| {
                format!(
                    "<li>{} <span class=\"image\">{}</span></li>",
                    link(&c.url(), &c.name),
                    escape(c.image_location())
                )
            })
            .collect();
        format!("<ul>{items}</ul>")
    };
    layout("Color List", &body)
}

pub fn color_detail(detail: &ColorWithBags) -> Html<String> {
    let c = &detail.color;
    let body = format!(
        "<h2>{}</h2>{}<h3>Bags</h3>{}{}",
        escape(&c.name),
        swatch(&c.image, c.image_location()),
        bag_summaries(&detail.bags, "This color has no bags."),
        record_actions(EntityKind::Color, &c.url())
    );
    layout(&format!("Color: {}", c.name), &body)
}

pub fn color_form(title: &str, values: &ColorForm, errors: &[FieldError]) -> Html<String> {
    let fields = [
        text_input("name", "Name", &values.name),
        text_input("image", "Image file", &values.image),
    ]
    .concat();
    layout(title, &form(&fields, errors))
}

pub fn color_delete(detail: &ColorWithBags) -> Html<String> {
    let c = &detail.color;
    layout(
        "Delete Color",
        &guarded_delete(EntityKind::Color, &c.id, &c.name, &detail.bags),
    )
}

// Bags

pub fn bag_list(bags: &[BagListing]) -> Html<String> {
    let body = if bags.is_empty() {
        "<p>There are no bags.</p>".to_string()
    } else {
        let items: String = bags
            .iter()
            .map(|b| {
                let traits: Vec<&str> = [&b.color, &b.fabric, &b.category]
                    .into_iter()
                    .map(|name| name.as_deref().unwrap_or("missing"))
                    .collect();
                format!(
                    "<li>{} <span class=\"price\">{}</span> ({})</li>",
                    link(&b.url(), &b.name),
                    bag::format_price(b.price),
                    escape(&traits.join(", "))
                )
            })
            .collect();
        format!("<ul>{items}</ul>")
    };
    layout("Bag List", &body)
}

fn reference_line(label: &str, target: Option<(String, &str)>) -> String {
    let value = match target {
        Some((url, name)) => link(&url, name),
        None => "<em>missing</em>".to_string(),
    };
    format!("<p><strong>{label}:</strong> {value}</p>")
}

pub fn bag_detail(populated: &PopulatedBag) -> Html<String> {
    let b = &populated.bag;
    let body = [
        format!("<h2>{}</h2>", escape(&b.name)),
        format!(
            "<p><strong>Price:</strong> <span class=\"price\">{}</span></p>",
            b.display_price()
        ),
        format!("<p><strong>In stock:</strong> {}</p>", b.stock),
        reference_line(
            "Category",
            populated.category.as_ref().map(|c| (c.url(), c.name.as_str())),
        ),
        reference_line(
            "Fabric",
            populated.fabric.as_ref().map(|f| (f.url(), f.name.as_str())),
        ),
        reference_line(
            "Color",
            populated.color.as_ref().map(|c| (c.url(), c.name.as_str())),
        ),
        record_actions(EntityKind::Bag, &b.url()),
    ]
    .concat();
    layout(&format!("Bag: {}", b.name), &body)
}

pub fn bag_form(
    title: &str,
    values: &BagForm,
    choices: &BagChoices,
    errors: &[FieldError],
) -> Html<String> {
    let fields = [
        text_input("name", "Name", &values.name),
        text_input("price", "Price", &values.price),
        text_input("stock", "Stock", &values.stock),
        select(
            "category",
            "category",
            &values.category,
            choices
                .categories
                .iter()
                .map(|c| (c.id.as_str(), c.name.as_str())),
        ),
        select(
            "fabric",
            "fabric",
            &values.fabric,
            choices.fabrics.iter().map(|f| (f.id.as_str(), f.name.as_str())),
        ),
        select(
            "color",
            "color",
            &values.color,
            choices.colors.iter().map(|c| (c.id.as_str(), c.name.as_str())),
        ),
    ]
    .concat();
    layout(title, &form(&fields, errors))
}

pub fn bag_delete(bag: &Bag) -> Html<String> {
    let body = format!(
        "<h2>{}</h2><p><span class=\"price\">{}</span></p>\
         <p>Do you really want to delete this bag?</p>\
         <form method=\"post\"><input type=\"hidden\" name=\"bagid\" value=\"{}\">\
         <button type=\"submit\">Delete</button></form>",
        escape(&bag.name),
        bag.display_price(),
        escape(&bag.id)
    );
    layout("Delete Bag", &body)
}
