//! Public catalogue pages.
//!
//! Each handler renders a [`Page`] and lets the htmx signals pick between the
//! full document and the bare fragment.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use catalog_core::{
    Breadcrumb, BrandRepository, Category, CategoryRepository, CollectionRepository, Product,
    ProductRepository,
};

use crate::error::{error_page, PageError};
use crate::htmx::HtmxSignals;
use crate::render::{html_escape, Page};
use crate::AppState;

/// Products per listing page.
pub const PAGE_SIZE: i64 = 24;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<i64>,
}

impl PageQuery {
    fn offset(&self) -> i64 {
        (self.page.unwrap_or(1).max(1) - 1) * PAGE_SIZE
    }
}

fn breadcrumb_nav(crumb: &Breadcrumb) -> String {
    let last = crumb.depth().saturating_sub(1);
    let items = crumb
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            if i == last {
                format!("<li aria-current=\"page\">{}</li>", html_escape(&entry.name))
            } else {
                format!(
                    "<li><a href=\"/categories/{}/\">{}</a></li>",
                    html_escape(&entry.slug),
                    html_escape(&entry.name)
                )
            }
        })
        .collect::<String>();
    format!("<nav class=\"breadcrumb\"><ol>{}</ol></nav>", items)
}

fn category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return String::new();
    }
    let items = categories
        .iter()
        .map(|c| {
            format!(
                "<li><a href=\"/categories/{}/\">{}</a></li>",
                html_escape(&c.slug),
                html_escape(&c.name)
            )
        })
        .collect::<String>();
    format!("<ul class=\"categories\">{}</ul>", items)
}

fn product_list(products: &[Product]) -> String {
    if products.is_empty() {
        return "<p>No hay productos.</p>".to_string();
    }
    let items = products
        .iter()
        .map(|p| {
            format!(
                "<li><a href=\"/products/{}/\">{}</a> <span class=\"sku\">{}</span><p>{}</p></li>",
                html_escape(&p.slug),
                html_escape(&p.name),
                html_escape(&p.sku),
                html_escape(&p.short_description)
            )
        })
        .collect::<String>();
    format!("<ul class=\"products\">{}</ul>", items)
}

pub async fn index(signals: HtmxSignals) -> Response {
    Page::new(
        "inicio",
        r#"<h1>Catálogo</h1>
<ul>
    <li><a href="/categories/">categorías</a></li>
    <li><a href="/collections/">colecciones</a></li>
    <li><a href="/brands/">marcas</a></li>
    <li><a href="/products/">productos</a></li>
</ul>"#,
    )
    .render(&signals)
}

pub async fn list_categories(
    State(state): State<AppState>,
    signals: HtmxSignals,
) -> Result<Response, PageError> {
    let roots = state.db.categories.list_roots().await?;
    let body = format!("<h1>categorías</h1>\n{}", category_list(&roots));
    Ok(Page::new("categorías", body).render(&signals))
}

pub async fn category_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    signals: HtmxSignals,
) -> Result<Response, PageError> {
    let detail = state
        .db
        .categories
        .detail_by_slug(&slug)
        .await?
        .ok_or_else(PageError::not_found)?;

    let body = format!(
        "{nav}\n<h1>{name}</h1>\n<p>{description}</p>\n{children}\n{products}",
        nav = breadcrumb_nav(&detail.breadcrumb),
        name = html_escape(&detail.category.name),
        description = html_escape(&detail.category.description),
        children = category_list(&detail.children),
        products = product_list(&detail.products),
    );
    Ok(Page::new(detail.breadcrumb.to_string(), body).render(&signals))
}

pub async fn list_collections(
    State(state): State<AppState>,
    signals: HtmxSignals,
) -> Result<Response, PageError> {
    let collections = state.db.collections.list().await?;
    let items = collections
        .iter()
        .map(|c| {
            format!(
                "<li><a href=\"/collections/{}/\">{}</a></li>",
                html_escape(&c.slug),
                html_escape(&c.name)
            )
        })
        .collect::<String>();
    let body = format!("<h1>colecciones</h1>\n<ul class=\"collections\">{}</ul>", items);
    Ok(Page::new("colecciones", body).render(&signals))
}

pub async fn collection_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    signals: HtmxSignals,
) -> Result<Response, PageError> {
    let collection = state
        .db
        .collections
        .get_by_slug(&slug)
        .await?
        .ok_or_else(PageError::not_found)?;
    let products = state.db.collections.list_products(collection.id).await?;

    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n{}",
        html_escape(&collection.name),
        html_escape(&collection.description),
        product_list(&products)
    );
    Ok(Page::new(collection.name, body).render(&signals))
}

pub async fn list_brands(
    State(state): State<AppState>,
    signals: HtmxSignals,
) -> Result<Response, PageError> {
    let brands = state.db.brands.list().await?;
    let items = brands
        .iter()
        .map(|b| {
            let name = if b.website_url.is_empty() {
                html_escape(&b.name)
            } else {
                format!(
                    "<a href=\"{}\" rel=\"noopener\">{}</a>",
                    html_escape(&b.website_url),
                    html_escape(&b.name)
                )
            };
            format!("<li>{}<p>{}</p></li>", name, html_escape(&b.description))
        })
        .collect::<String>();
    let body = format!("<h1>marcas</h1>\n<ul class=\"brands\">{}</ul>", items);
    Ok(Page::new("marcas", body).render(&signals))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    signals: HtmxSignals,
) -> Result<Response, PageError> {
    let products = state
        .db
        .products
        .list_published(PAGE_SIZE, query.offset())
        .await?;
    let body = format!("<h1>productos</h1>\n{}", product_list(&products));
    Ok(Page::new("productos", body).render(&signals))
}

pub async fn product_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    signals: HtmxSignals,
) -> Result<Response, PageError> {
    let detail = state
        .db
        .products
        .detail_by_slug(&slug)
        .await?
        .ok_or_else(PageError::not_found)?;
    let product = &detail.product;

    let images = detail
        .images
        .iter()
        .map(|img| {
            format!(
                "<figure><img src=\"{}\" alt=\"{}\"><figcaption>{}</figcaption></figure>",
                html_escape(&img.image),
                html_escape(&img.alt_text),
                html_escape(&img.caption)
            )
        })
        .collect::<String>();
    let attributes = detail
        .attributes
        .iter()
        .map(|a| {
            format!(
                "<dt>{}</dt><dd>{}</dd>",
                html_escape(&a.attribute_name),
                html_escape(&a.value)
            )
        })
        .collect::<String>();
    let collections = detail
        .collections
        .iter()
        .map(|c| {
            format!(
                "<li><a href=\"/collections/{}/\">{}</a></li>",
                html_escape(&c.slug),
                html_escape(&c.name)
            )
        })
        .collect::<String>();
    let brand = detail
        .brand
        .as_ref()
        .map(|b| format!("<p class=\"brand\">{}</p>", html_escape(&b.name)))
        .unwrap_or_default();

    let body = format!(
        "{nav}\n<h1>{name}</h1>\n{brand}<p class=\"sku\">{sku}</p>\n<div class=\"images\">{images}</div>\n<p>{description}</p>\n<dl class=\"attributes\">{attributes}</dl>\n<ul class=\"collections\">{collections}</ul>",
        nav = breadcrumb_nav(&detail.breadcrumb),
        name = html_escape(&product.name),
        brand = brand,
        sku = html_escape(&product.sku),
        images = images,
        description = html_escape(&product.description),
        attributes = attributes,
        collections = collections,
    );
    Ok(Page::new(product.name.clone(), body).render(&signals))
}

/// Fallback for paths no route matches.
pub async fn not_found(signals: HtmxSignals) -> Response {
    error_page(StatusCode::NOT_FOUND, "Not Found")
        .render_with_status(&signals, StatusCode::NOT_FOUND)
}
