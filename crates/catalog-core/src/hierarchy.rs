//! Category hierarchy: arena index, breadcrumb walk, and cycle checks.
//!
//! Categories form a tree through nullable `parent_id` references. Nodes are
//! never linked in memory; every hop resolves the parent id through a
//! [`ParentLookup`] (an in-memory [`CategoryTree`], or whatever a repository
//! loaded). Walks are bounded by [`MAX_CATEGORY_DEPTH`], so a corrupt parent
//! chain surfaces as [`Error::CycleDetected`] instead of looping forever.
//!
//! ```
//! use catalog_core::{breadcrumb, Category, CategoryTree};
//! use uuid::Uuid;
//!
//! let root = Category {
//!     id: Uuid::now_v7(),
//!     name: "Clothing".into(),
//!     slug: "clothing".into(),
//!     description: String::new(),
//!     parent_id: None,
//! };
//! let shirts = Category {
//!     id: Uuid::now_v7(),
//!     name: "Shirts".into(),
//!     slug: "shirts".into(),
//!     description: String::new(),
//!     parent_id: Some(root.id),
//! };
//! let tree = CategoryTree::from_categories(vec![root, shirts.clone()]);
//! let path = breadcrumb(&tree, shirts.id).unwrap();
//! assert_eq!(path.to_string(), "Clothing -> Shirts");
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Category;

/// Upper bound on the number of nodes in any root-to-leaf chain.
pub const MAX_CATEGORY_DEPTH: usize = 64;

/// Separator used when a breadcrumb is rendered as text.
pub const BREADCRUMB_SEPARATOR: &str = " -> ";

/// Resolves a category by id.
pub trait ParentLookup {
    fn category(&self, id: Uuid) -> Option<&Category>;
}

impl ParentLookup for HashMap<Uuid, Category> {
    fn category(&self, id: Uuid) -> Option<&Category> {
        self.get(&id)
    }
}

/// Arena of categories indexed by id.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: HashMap<Uuid, Category>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from any set of categories.
    pub fn from_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            nodes: categories.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// Insert or replace a node.
    pub fn insert(&mut self, category: Category) {
        self.nodes.insert(category.id, category);
    }

    pub fn get(&self, id: Uuid) -> Option<&Category> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Categories without a parent, ordered by name.
    pub fn roots(&self) -> Vec<&Category> {
        self.sorted(|c| c.parent_id.is_none())
    }

    /// Direct children of `id`, ordered by name.
    pub fn children(&self, id: Uuid) -> Vec<&Category> {
        self.sorted(|c| c.parent_id == Some(id))
    }

    fn sorted(&self, keep: impl Fn(&Category) -> bool) -> Vec<&Category> {
        let mut out: Vec<&Category> = self.nodes.values().filter(|c| keep(c)).collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        out
    }
}

impl ParentLookup for CategoryTree {
    fn category(&self, id: Uuid) -> Option<&Category> {
        self.nodes.get(&id)
    }
}

/// One step of a breadcrumb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbEntry {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for BreadcrumbEntry {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            slug: c.slug.clone(),
        }
    }
}

/// Ancestor path ordered from the root down to the requested node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub entries: Vec<BreadcrumbEntry>,
}

impl Breadcrumb {
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn root(&self) -> Option<&BreadcrumbEntry> {
        self.entries.first()
    }

    pub fn leaf(&self) -> Option<&BreadcrumbEntry> {
        self.entries.last()
    }
}

impl fmt::Display for Breadcrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(BREADCRUMB_SEPARATOR))
    }
}

/// Follow parent links from `start`, returning the chain leaf-first.
///
/// A parent id that the lookup cannot resolve ends the chain at the last
/// resolvable node.
fn walk_up<L: ParentLookup + ?Sized>(lookup: &L, start: Uuid) -> Result<Vec<&Category>> {
    let mut current = lookup
        .category(start)
        .ok_or(Error::CategoryNotFound(start))?;
    let mut chain = Vec::new();
    let mut seen = HashSet::new();

    loop {
        if !seen.insert(current.id) || chain.len() >= MAX_CATEGORY_DEPTH {
            warn!(
                subsystem = "hierarchy",
                op = "walk_up",
                category_id = %start,
                cycle_at = %current.id,
                depth = chain.len(),
                "Category parent chain does not terminate"
            );
            return Err(Error::CycleDetected {
                id: current.id,
                depth: chain.len(),
            });
        }
        chain.push(current);
        trace!(subsystem = "hierarchy", op = "walk_up", category_id = %current.id, depth = chain.len());

        let Some(parent_id) = current.parent_id else {
            break;
        };
        match lookup.category(parent_id) {
            Some(parent) => current = parent,
            None => {
                trace!(
                    subsystem = "hierarchy",
                    category_id = %current.id,
                    parent_id = %parent_id,
                    "Parent not resolvable; chain ends here"
                );
                break;
            }
        }
    }

    Ok(chain)
}

/// Names from the root ancestor down to `id` itself.
///
/// A category without a parent yields a single entry. A chain that revisits a
/// node or grows past [`MAX_CATEGORY_DEPTH`] fails with
/// [`Error::CycleDetected`].
pub fn breadcrumb<L: ParentLookup + ?Sized>(lookup: &L, id: Uuid) -> Result<Breadcrumb> {
    let mut entries: Vec<BreadcrumbEntry> = walk_up(lookup, id)?
        .into_iter()
        .map(BreadcrumbEntry::from)
        .collect();
    entries.reverse();
    Ok(Breadcrumb { entries })
}

/// Whether re-parenting `id` under `new_parent` would make it its own ancestor.
pub fn would_create_cycle<L: ParentLookup + ?Sized>(
    lookup: &L,
    id: Uuid,
    new_parent: Option<Uuid>,
) -> Result<bool> {
    let Some(parent) = new_parent else {
        return Ok(false);
    };
    if parent == id {
        return Ok(true);
    }
    let chain = walk_up(lookup, parent)?;
    Ok(chain.iter().any(|c| c.id == id))
}
