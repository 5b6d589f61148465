//! Integration tests for products and the entities hanging off them.

use catalog_db::test_fixtures::{unique_name, unique_slug, TestDatabase};
use catalog_db::{
    AttributeRepository, BrandRepository, CollectionRepository, CreateAttributeRequest,
    CreateBrandRequest, CreateCollectionRequest, CreateProductAttributeRequest,
    CreateProductImageRequest, CreateProductRequest, Error, ProductAttributeRepository,
    ProductImageRepository, ProductRepository,
};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_product_detail_assembles_related_rows() {
    let t = TestDatabase::new().await;
    let clothing = t.category("Clothing", None).await;
    let shirts = t.category("Shirts", Some(clothing)).await;

    let brand = t
        .db
        .brands
        .create(CreateBrandRequest {
            name: unique_name("Acme"),
            website_url: "https://acme.example".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let summer = t
        .db
        .collections
        .create(CreateCollectionRequest {
            name: "Summer".to_string(),
            slug: Some(unique_slug("summer")),
            description: String::new(),
        })
        .await
        .unwrap();

    let slug = unique_slug("linen-shirt");
    let product = t
        .db
        .products
        .create(CreateProductRequest {
            name: "Linen Shirt".to_string(),
            sku: unique_slug("sku"),
            slug: Some(slug.clone()),
            is_published: true,
            category_id: shirts,
            brand_id: Some(brand),
            collection_ids: vec![summer],
            ..Default::default()
        })
        .await
        .unwrap();

    for (order, file) in [(2, "back.jpg"), (0, "front.jpg")] {
        t.db.product_images
            .add(
                product,
                CreateProductImageRequest {
                    image: file.to_string(),
                    alt_text: file.to_string(),
                    caption: String::new(),
                    display_order: order,
                },
            )
            .await
            .unwrap();
    }

    let color = t
        .db
        .attributes
        .create(CreateAttributeRequest {
            name: unique_name("Color"),
        })
        .await
        .unwrap();
    t.db.product_attributes
        .create(CreateProductAttributeRequest {
            attribute_id: color,
            value: "Red".to_string(),
            product_ids: vec![product],
        })
        .await
        .unwrap();

    let detail = t.db.products.detail_by_slug(&slug).await.unwrap().unwrap();
    assert_eq!(detail.product.id, product);
    assert_eq!(detail.breadcrumb.to_string(), "Clothing -> Shirts");
    assert_eq!(detail.brand.map(|b| b.id), Some(brand));
    assert_eq!(
        detail.collections.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![summer]
    );
    let files: Vec<_> = detail.images.iter().map(|i| i.image.as_str()).collect();
    assert_eq!(files, vec!["front.jpg", "back.jpg"]);
    assert_eq!(detail.attributes.len(), 1);
    assert_eq!(detail.attributes[0].value, "Red");
}

#[tokio::test]
async fn test_unpublished_product_has_no_detail() {
    let t = TestDatabase::new().await;
    let category = t.category("Drafts", None).await;
    let id = t.product("Draft", category, false).await;
    let slug = t.db.products.get(id).await.unwrap().unwrap().slug;

    assert!(t.db.products.detail_by_slug(&slug).await.unwrap().is_none());
}

#[tokio::test]
async fn test_product_with_unknown_category_is_invalid() {
    let t = TestDatabase::new().await;
    let err = t
        .db
        .products
        .create(CreateProductRequest {
            name: "Lost".to_string(),
            sku: unique_slug("sku"),
            category_id: uuid::Uuid::new_v4(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_set_collections_replaces_membership() {
    let t = TestDatabase::new().await;
    let category = t.category("Bags", None).await;
    let product = t.product("Tote", category, true).await;

    let mut collections = Vec::new();
    for name in ["Winter", "Spring"] {
        collections.push(
            t.db.collections
                .create(CreateCollectionRequest {
                    name: name.to_string(),
                    slug: Some(unique_slug(name)),
                    description: String::new(),
                })
                .await
                .unwrap(),
        );
    }

    t.db.products
        .set_collections(product, &collections)
        .await
        .unwrap();
    t.db.products
        .set_collections(product, &collections[1..])
        .await
        .unwrap();

    let stored = t.db.products.get(product).await.unwrap().unwrap();
    assert_eq!(stored.collection_ids, vec![collections[1]]);

    let in_spring = t.db.collections.list_products(collections[1]).await.unwrap();
    assert_eq!(in_spring.iter().map(|p| p.id).collect::<Vec<_>>(), vec![product]);
    assert!(t
        .db
        .collections
        .list_products(collections[0])
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_update_missing_product_is_not_found() {
    let t = TestDatabase::new().await;
    let category = t.category("Ghosts", None).await;
    let missing = uuid::Uuid::new_v4();

    let err = t
        .db
        .products
        .update(
            missing,
            CreateProductRequest {
                name: "Ghost".to_string(),
                sku: unique_slug("sku"),
                category_id: category,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ProductNotFound(id) if id == missing));
}

#[tokio::test]
async fn test_deleting_brand_keeps_products() {
    let t = TestDatabase::new().await;
    let category = t.category("Hats", None).await;
    let brand = t
        .db
        .brands
        .create(CreateBrandRequest {
            name: unique_name("Cap Co"),
            ..Default::default()
        })
        .await
        .unwrap();
    let product = t
        .db
        .products
        .create(CreateProductRequest {
            name: "Cap".to_string(),
            sku: unique_slug("sku"),
            category_id: category,
            brand_id: Some(brand),
            ..Default::default()
        })
        .await
        .unwrap();

    t.db.brands.delete(brand).await.unwrap();

    let stored = t.db.products.get(product).await.unwrap().unwrap();
    assert_eq!(stored.brand_id, None);
}

#[tokio::test]
async fn test_attribute_value_links() {
    let t = TestDatabase::new().await;
    let category = t.category("Socks", None).await;
    let a = t.product("Sock A", category, true).await;
    let b = t.product("Sock B", category, true).await;

    let size = t
        .db
        .attributes
        .create(CreateAttributeRequest {
            name: unique_name("Size"),
        })
        .await
        .unwrap();
    let large = t
        .db
        .product_attributes
        .create(CreateProductAttributeRequest {
            attribute_id: size,
            value: "L".to_string(),
            product_ids: vec![a],
        })
        .await
        .unwrap();

    t.db.product_attributes.link_product(large, b).await.unwrap();
    let value = t.db.product_attributes.get(large).await.unwrap().unwrap();
    assert_eq!(value.product_ids.len(), 2);
    assert_eq!(value.to_string(), format!("{} - L", value.attribute_name));

    t.db.product_attributes.unlink_product(large, a).await.unwrap();
    assert!(t
        .db
        .product_attributes
        .list_for_product(a)
        .await
        .unwrap()
        .is_empty());

    // Deleting the attribute type removes its values.
    t.db.attributes.delete(size).await.unwrap();
    assert!(t.db.product_attributes.get(large).await.unwrap().is_none());
}
