//! Integration tests for the category tree: breadcrumbs, re-parenting,
//! cycle rejection and deletion rules.

use catalog_db::test_fixtures::{unique_slug, TestDatabase};
use catalog_db::{
    CategoryRepository, CreateCategoryRequest, Error, ProductRepository, MAX_CATEGORY_DEPTH,
};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_breadcrumb_follows_parents_to_root() {
    let t = TestDatabase::new().await;
    let clothing = t.category("Clothing", None).await;
    let men = t.category("Men", Some(clothing)).await;
    let shirts = t.category("Shirts", Some(men)).await;

    let crumb = t.db.categories.breadcrumb(shirts).await.unwrap();
    assert_eq!(crumb.names(), vec!["Clothing", "Men", "Shirts"]);
    assert_eq!(crumb.to_string(), "Clothing -> Men -> Shirts");

    let root = t.db.categories.breadcrumb(clothing).await.unwrap();
    assert_eq!(root.to_string(), "Clothing");
}

#[tokio::test]
async fn test_breadcrumb_unknown_category() {
    let t = TestDatabase::new().await;
    let missing = uuid::Uuid::new_v4();

    let err = t.db.categories.breadcrumb(missing).await.unwrap_err();
    assert!(matches!(err, Error::CategoryNotFound(id) if id == missing));
}

#[tokio::test]
async fn test_reparent_into_own_subtree_is_rejected() {
    let t = TestDatabase::new().await;
    let a = t.category("A", None).await;
    let b = t.category("B", Some(a)).await;
    let c = t.category("C", Some(b)).await;

    let original = t.db.categories.get(a).await.unwrap().unwrap();
    let err = t
        .db
        .categories
        .update(
            a,
            CreateCategoryRequest {
                name: original.name.clone(),
                slug: Some(original.slug.clone()),
                description: String::new(),
                parent_id: Some(c),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CycleDetected { .. }));

    // Nothing was written.
    let after = t.db.categories.get(a).await.unwrap().unwrap();
    assert_eq!(after.parent_id, None);
}

#[tokio::test]
async fn test_reparent_to_self_is_rejected() {
    let t = TestDatabase::new().await;
    let a = t.category("Solo", None).await;
    let original = t.db.categories.get(a).await.unwrap().unwrap();

    let err = t
        .db
        .categories
        .update(
            a,
            CreateCategoryRequest {
                name: original.name,
                slug: Some(original.slug),
                description: String::new(),
                parent_id: Some(a),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CycleDetected { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_opposing_concurrent_reparents_cannot_both_commit() {
    let t = TestDatabase::new().await;
    let a = t.category("Left", None).await;
    let b = t.category("Right", None).await;
    let a_row = t.db.categories.get(a).await.unwrap().unwrap();
    let b_row = t.db.categories.get(b).await.unwrap().unwrap();

    let (a_under_b, b_under_a) = tokio::join!(
        t.db.categories.update(
            a,
            CreateCategoryRequest {
                name: a_row.name.clone(),
                slug: Some(a_row.slug.clone()),
                description: String::new(),
                parent_id: Some(b),
            },
        ),
        t.db.categories.update(
            b,
            CreateCategoryRequest {
                name: b_row.name.clone(),
                slug: Some(b_row.slug.clone()),
                description: String::new(),
                parent_id: Some(a),
            },
        ),
    );

    let committed = [&a_under_b, &b_under_a].iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);
    for result in [a_under_b, b_under_a] {
        if let Err(err) = result {
            assert!(matches!(err, Error::CycleDetected { .. }));
        }
    }

    // The tree stayed acyclic: both breadcrumbs resolve.
    let a_depth = t.db.categories.breadcrumb(a).await.unwrap().depth();
    let b_depth = t.db.categories.breadcrumb(b).await.unwrap().depth();
    assert_eq!(a_depth + b_depth, 3);
}

#[tokio::test]
async fn test_reparent_to_missing_parent_is_invalid() {
    let t = TestDatabase::new().await;
    let a = t.category("Orphan", None).await;

    let err = t
        .db
        .categories
        .update(
            a,
            CreateCategoryRequest {
                name: "Orphan".to_string(),
                slug: Some(unique_slug("orphan")),
                description: String::new(),
                parent_id: Some(uuid::Uuid::new_v4()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_cycle_written_behind_our_back_is_detected() {
    let t = TestDatabase::new().await;
    let a = t.category("Loop A", None).await;
    let b = t.category("Loop B", Some(a)).await;

    sqlx::query("UPDATE category SET parent_id = $1 WHERE id = $2")
        .bind(b)
        .bind(a)
        .execute(t.db.pool())
        .await
        .unwrap();

    let err = t.db.categories.breadcrumb(b).await.unwrap_err();
    assert!(matches!(err, Error::CycleDetected { .. }));

    // Break the loop so the rows stay harmless for other tests.
    sqlx::query("UPDATE category SET parent_id = NULL WHERE id = $1")
        .bind(a)
        .execute(t.db.pool())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_chain_at_depth_limit_resolves() {
    let t = TestDatabase::new().await;
    let mut parent = None;
    let mut leaf = None;
    for level in 0..MAX_CATEGORY_DEPTH {
        let id = t.category(&format!("Level {}", level), parent).await;
        parent = Some(id);
        leaf = Some(id);
    }

    let crumb = t.db.categories.breadcrumb(leaf.unwrap()).await.unwrap();
    assert_eq!(crumb.depth(), MAX_CATEGORY_DEPTH);
    assert_eq!(crumb.names()[0], "Level 0");
}

#[tokio::test]
async fn test_chain_past_depth_limit_fails() {
    let t = TestDatabase::new().await;
    let mut parent = None;
    for level in 0..=MAX_CATEGORY_DEPTH {
        parent = Some(t.category(&format!("Deep {}", level), parent).await);
    }

    let err = t.db.categories.breadcrumb(parent.unwrap()).await.unwrap_err();
    assert!(matches!(err, Error::CycleDetected { .. }));
}

#[tokio::test]
async fn test_delete_parent_promotes_children_to_roots() {
    let t = TestDatabase::new().await;
    let parent = t.category("Parent", None).await;
    let child = t.category("Child", Some(parent)).await;

    t.db.categories.delete(parent).await.unwrap();

    let child = t.db.categories.get(child).await.unwrap().unwrap();
    assert_eq!(child.parent_id, None);
}

#[tokio::test]
async fn test_delete_category_with_products_conflicts() {
    let t = TestDatabase::new().await;
    let category = t.category("Stocked", None).await;
    let product = t.product("Widget", category, true).await;

    let err = t.db.categories.delete(category).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    t.db.products.delete(product).await.unwrap();
    t.db.categories.delete(category).await.unwrap();
}

#[tokio::test]
async fn test_duplicate_slug_conflicts() {
    let t = TestDatabase::new().await;
    let slug = unique_slug("dup");
    let req = CreateCategoryRequest {
        name: "Dup".to_string(),
        slug: Some(slug),
        ..Default::default()
    };

    t.db.categories.create(req.clone()).await.unwrap();
    let err = t.db.categories.create(req).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_category_detail_lists_children_and_published_products() {
    let t = TestDatabase::new().await;
    let root = t.category("Shoes", None).await;
    let _boots = t.category("Boots", Some(root)).await;
    let _sandals = t.category("Sandals", Some(root)).await;
    let shown = t.product("Runner", root, true).await;
    let _hidden = t.product("Prototype", root, false).await;

    let slug = t.db.categories.get(root).await.unwrap().unwrap().slug;
    let detail = t
        .db
        .categories
        .detail_by_slug(&slug)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(detail.breadcrumb.to_string(), "Shoes");
    let children: Vec<_> = detail.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(children, vec!["Boots", "Sandals"]);
    let products: Vec<_> = detail.products.iter().map(|p| p.id).collect();
    assert_eq!(products, vec![shown]);
}
