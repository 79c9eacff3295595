// ABOUTME: Integration tests for component edge mutations
// ABOUTME: Covers add/update/remove/set_components, cycle and duplicate rejection, sort order
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Sous-Chef

//! Component mutation tests:
//! - Acyclicity enforcement (self-loops and indirect cycles)
//! - Duplicate pair rejection
//! - `sort_order` assignment and monotonicity
//! - Bulk replace atomicity

use sous_chef::database::{test_utils::create_test_db, Database};
use sous_chef::errors::ErrorCode;
use sous_chef::models::{ComponentSpec, CreateRecipeRequest, Recipe, UpdateComponentRequest};
use sous_chef::services::ComponentService;
use uuid::Uuid;

// ============================================================================
// Test Setup
// ============================================================================

async fn create_recipe(db: &Database, title: &str, servings: Option<f64>) -> Recipe {
    db.recipes()
        .create(&CreateRecipeRequest {
            title: title.to_owned(),
            servings,
            ..Default::default()
        })
        .await
        .unwrap()
}

async fn setup() -> (Database, ComponentService) {
    let db = create_test_db().await.unwrap();
    let service = ComponentService::new(db.clone());
    (db, service)
}

// ============================================================================
// add_component
// ============================================================================

#[tokio::test]
async fn test_add_component_assigns_sequential_sort_order() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;

    let mut children = Vec::new();
    for i in 0..4 {
        children.push(create_recipe(&db, &format!("Component {i}"), Some(4.0)).await);
    }

    for (i, child) in children.iter().enumerate() {
        let added = service
            .add_component(parent.id, child.id, 1.0)
            .await
            .unwrap();
        assert_eq!(added.component.sort_order, i as i64);
        assert_eq!(added.recipe.id, child.id);
    }

    let edges = db.components().list_children_of(parent.id).await.unwrap();
    let orders: Vec<i64> = edges.iter().map(|e| e.sort_order).collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_add_component_missing_recipes() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;

    let err = service
        .add_component(parent.id, Uuid::new_v4(), 1.0)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let err = service
        .add_component(Uuid::new_v4(), parent.id, 1.0)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_add_component_rejects_self_reference() {
    let (db, service) = setup().await;
    let recipe = create_recipe(&db, "Marinara", Some(4.0)).await;

    assert!(db
        .components()
        .would_create_cycle(recipe.id, recipe.id)
        .await
        .unwrap());

    let err = service
        .add_component(recipe.id, recipe.id, 1.0)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CycleDetected);
}

#[tokio::test]
async fn test_add_component_rejects_indirect_cycle() {
    let (db, service) = setup().await;
    let a = create_recipe(&db, "A", Some(1.0)).await;
    let b = create_recipe(&db, "B", Some(1.0)).await;
    let c = create_recipe(&db, "C", Some(1.0)).await;

    service.add_component(a.id, b.id, 1.0).await.unwrap();
    service.add_component(b.id, c.id, 1.0).await.unwrap();

    // c -> a would close a three-node cycle
    assert!(db.components().would_create_cycle(c.id, a.id).await.unwrap());
    let err = service.add_component(c.id, a.id, 1.0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::CycleDetected);

    // The reverse direction (a is already an ancestor of c) stays legal
    // as a diamond, not a cycle
    assert!(!db.components().would_create_cycle(a.id, c.id).await.unwrap());
}

#[tokio::test]
async fn test_add_component_rejects_duplicate_pair() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;
    let child = create_recipe(&db, "Marinara", Some(4.0)).await;

    service.add_component(parent.id, child.id, 2.0).await.unwrap();

    // Same pair fails even with a different servings value
    let err = service
        .add_component(parent.id, child.id, 3.5)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);

    let edges = db.components().list_children_of(parent.id).await.unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].servings_needed, 2.0);

    let exact = db
        .components()
        .find_exact(parent.id, child.id)
        .await
        .unwrap();
    assert!(exact.is_some());
    let missing = db
        .components()
        .find_exact(child.id, parent.id)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_add_component_rejects_invalid_servings() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;
    let child = create_recipe(&db, "Marinara", Some(4.0)).await;

    for bad in [0.0, -1.0, 0.05] {
        let err = service
            .add_component(parent.id, child.id, bad)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    // Boundary value is accepted
    service.add_component(parent.id, child.id, 0.1).await.unwrap();
}

// ============================================================================
// update_component
// ============================================================================

#[tokio::test]
async fn test_update_component_partial_fields() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;
    let child = create_recipe(&db, "Marinara", Some(4.0)).await;
    let added = service.add_component(parent.id, child.id, 2.0).await.unwrap();

    // Servings only: sort_order untouched
    let updated = service
        .update_component(
            added.component.id,
            &UpdateComponentRequest {
                servings_needed: Some(3.0),
                sort_order: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.servings_needed, 3.0);
    assert_eq!(updated.sort_order, added.component.sort_order);

    // Sort order only: servings untouched
    let updated = service
        .update_component(
            added.component.id,
            &UpdateComponentRequest {
                servings_needed: None,
                sort_order: Some(5),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.servings_needed, 3.0);
    assert_eq!(updated.sort_order, 5);
}

#[tokio::test]
async fn test_update_component_requires_a_field() {
    let (_db, service) = setup().await;

    let err = service
        .update_component(Uuid::new_v4(), &UpdateComponentRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_update_component_missing_edge() {
    let (_db, service) = setup().await;

    let err = service
        .update_component(
            Uuid::new_v4(),
            &UpdateComponentRequest {
                servings_needed: Some(1.0),
                sort_order: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

// ============================================================================
// remove_component
// ============================================================================

#[tokio::test]
async fn test_remove_component_twice_fails_second_time() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;
    let child = create_recipe(&db, "Marinara", Some(4.0)).await;
    let added = service.add_component(parent.id, child.id, 1.0).await.unwrap();

    service.remove_component(added.component.id).await.unwrap();

    let err = service
        .remove_component(added.component.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

// ============================================================================
// set_components
// ============================================================================

#[tokio::test]
async fn test_set_components_replaces_with_list_order() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;
    let old_child = create_recipe(&db, "Old Sauce", Some(4.0)).await;
    let sauce = create_recipe(&db, "Marinara", Some(4.0)).await;
    let pasta = create_recipe(&db, "Fresh Pasta", Some(6.0)).await;

    service.add_component(parent.id, old_child.id, 1.0).await.unwrap();

    let replaced = service
        .set_components(
            parent.id,
            &[
                ComponentSpec {
                    child_recipe_id: sauce.id,
                    servings_needed: 2.0,
                },
                ComponentSpec {
                    child_recipe_id: pasta.id,
                    servings_needed: 3.0,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(replaced.len(), 2);
    assert_eq!(replaced[0].child_recipe_id, sauce.id);
    assert_eq!(replaced[0].sort_order, 0);
    assert_eq!(replaced[1].child_recipe_id, pasta.id);
    assert_eq!(replaced[1].sort_order, 1);

    let edges = db.components().list_children_of(parent.id).await.unwrap();
    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(|e| e.child_recipe_id != old_child.id));
}

#[tokio::test]
async fn test_set_components_empty_list_clears() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;
    let child = create_recipe(&db, "Marinara", Some(4.0)).await;
    service.add_component(parent.id, child.id, 1.0).await.unwrap();

    let replaced = service.set_components(parent.id, &[]).await.unwrap();
    assert!(replaced.is_empty());

    let edges = db.components().list_children_of(parent.id).await.unwrap();
    assert!(edges.is_empty());
}

#[tokio::test]
async fn test_set_components_atomic_on_cycle() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;
    let sauce = create_recipe(&db, "Marinara", Some(4.0)).await;
    let grandparent = create_recipe(&db, "Dinner Platter", Some(2.0)).await;

    service.add_component(grandparent.id, parent.id, 1.0).await.unwrap();
    service.add_component(parent.id, sauce.id, 2.0).await.unwrap();

    let before = db.components().list_children_of(parent.id).await.unwrap();

    // One valid candidate, one that would close a cycle: nothing may change
    let err = service
        .set_components(
            parent.id,
            &[
                ComponentSpec {
                    child_recipe_id: sauce.id,
                    servings_needed: 4.0,
                },
                ComponentSpec {
                    child_recipe_id: grandparent.id,
                    servings_needed: 1.0,
                },
            ],
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CycleDetected);

    let after = db.components().list_children_of(parent.id).await.unwrap();
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.id, a.id);
        assert_eq!(b.child_recipe_id, a.child_recipe_id);
        assert_eq!(b.servings_needed, a.servings_needed);
        assert_eq!(b.sort_order, a.sort_order);
    }
}

#[tokio::test]
async fn test_set_components_rejects_repeated_child() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;
    let sauce = create_recipe(&db, "Marinara", Some(4.0)).await;

    let err = service
        .set_components(
            parent.id,
            &[
                ComponentSpec {
                    child_recipe_id: sauce.id,
                    servings_needed: 1.0,
                },
                ComponentSpec {
                    child_recipe_id: sauce.id,
                    servings_needed: 2.0,
                },
            ],
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_set_components_rejects_missing_child() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;

    let err = service
        .set_components(
            parent.id,
            &[ComponentSpec {
                child_recipe_id: Uuid::new_v4(),
                servings_needed: 1.0,
            }],
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_delete_all_for_parent_clears_edges() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;
    let sauce = create_recipe(&db, "Marinara", Some(4.0)).await;
    let pasta = create_recipe(&db, "Fresh Pasta", Some(6.0)).await;
    service.add_component(parent.id, sauce.id, 1.0).await.unwrap();
    service.add_component(parent.id, pasta.id, 1.0).await.unwrap();

    db.components().delete_all_for_parent(parent.id).await.unwrap();

    let edges = db.components().list_children_of(parent.id).await.unwrap();
    assert!(edges.is_empty());
    // Clearing an already-empty parent is fine
    db.components().delete_all_for_parent(parent.id).await.unwrap();
}

// ============================================================================
// Cascade behavior
// ============================================================================

#[tokio::test]
async fn test_recipe_delete_cascades_component_edges() {
    let (db, service) = setup().await;
    let parent = create_recipe(&db, "Lasagna", Some(8.0)).await;
    let child = create_recipe(&db, "Marinara", Some(4.0)).await;
    service.add_component(parent.id, child.id, 1.0).await.unwrap();

    db.recipes().delete(child.id).await.unwrap();

    let edges = db.components().list_children_of(parent.id).await.unwrap();
    assert!(edges.is_empty());
}
