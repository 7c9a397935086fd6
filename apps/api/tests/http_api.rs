//! End-to-end tests of the HTTP surface against an in-memory database.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use pizzatrack_api::{build_app, cors_layer, AppState};
use pizzatrack_db::{Database, DbConfig};

async fn test_app() -> (Router, Database) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let app = build_app(AppState::new(db.clone()), cors_layer("*").unwrap());
    (app, db)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_ingredient(app: &Router, name: &str, stock: f64, unit: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/almacen",
        Some(json!({ "producto": name, "items": stock, "especificacion": unit, "precio": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

async fn create_recipe(app: &Router, name: &str, size: &str, price: f64, lines: Value) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/pizzas",
        Some(json!({ "nombre": name, "tamano": size, "precio": price, "ingredientes": lines })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id_receta"].as_i64().unwrap()
}

async fn stock_of(app: &Router, id: i64) -> f64 {
    let (_, body) = send(app, Method::GET, "/api/almacen", None).await;
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["id"] == id)
        .map(|row| row["items"].as_f64().unwrap())
        .unwrap()
}

/// Cheese 10 kg, sauce 20 l; Hawaiana Mediana uses 0.5 cheese + 0.25 sauce,
/// Grande uses 0.75 cheese + 0.25 sauce.
async fn seeded() -> (Router, i64, i64, i64, i64) {
    let (app, _db) = test_app().await;
    let cheese = create_ingredient(&app, "Queso", 10.0, "kg").await;
    let sauce = create_ingredient(&app, "Salsa", 20.0, "l").await;
    let mediana = create_recipe(
        &app,
        "Hawaiana",
        "Mediana",
        129.0,
        json!([
            { "id_producto": cheese, "cantidad_uso": 0.5 },
            { "id_producto": sauce, "cantidad_uso": 0.25 }
        ]),
    )
    .await;
    let grande = create_recipe(
        &app,
        "Hawaiana",
        "Grande",
        189.0,
        json!([
            { "id_producto": cheese, "cantidad_uso": 0.75 },
            { "id_producto": sauce, "cantidad_uso": 0.25 }
        ]),
    )
    .await;
    (app, cheese, sauce, mediana, grande)
}

// =============================================================================
// Health & routing
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _db) = test_app().await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let (app, _db) = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/nada", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, Method::GET, "/api/pizzas/ventas", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], "method_not_allowed");
}

// =============================================================================
// Almacén
// =============================================================================

#[tokio::test]
async fn test_almacen_crud() {
    let (app, _db) = test_app().await;
    let id = create_ingredient(&app, "Harina", 40.0, "kg").await;

    let (status, body) = send(&app, Method::GET, "/api/almacen", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["producto"], "Harina");
    assert_eq!(body["data"][0]["precio"], "$10.00");
    assert_eq!(body["data"][0]["estatus"], "verde");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/almacen/{id}"),
        Some(json!({ "producto": "Harina", "items": 2, "especificacion": "kg", "precio": "$12.50" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stock_of(&app, id).await, 2.0);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/almacen/9999",
        Some(json!({ "producto": "X", "items": 1, "especificacion": "kg", "precio": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/almacen/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/almacen/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_almacen_rejects_invalid_payloads() {
    let (app, _db) = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/almacen",
        Some(json!({ "producto": "", "items": 1, "especificacion": "kg", "precio": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, _) = send(&app, Method::DELETE, "/api/almacen/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ingredient_used_by_recipe_cannot_be_deleted() {
    let (app, cheese, _, _, _) = seeded().await;

    let (status, body) = send(&app, Method::DELETE, &format!("/api/almacen/{cheese}"), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "in_use");
}

// =============================================================================
// Recipes
// =============================================================================

#[tokio::test]
async fn test_recipes_list_mediana_before_grande() {
    let (app, cheese, _, mediana, grande) = seeded().await;
    create_recipe(&app, "Americana", "Grande", 179.0, json!([{ "id_producto": cheese, "cantidad_uso": 1 }])).await;

    let (status, body) = send(&app, Method::GET, "/api/pizzas", None).await;
    assert_eq!(status, StatusCode::OK);

    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["nombre"], "Americana");
    assert_eq!(rows[1]["id_receta"], mediana);
    assert_eq!(rows[2]["id_receta"], grande);
    assert_eq!(rows[1]["ingredientes"][0]["producto_nombre"], "Queso");
    assert_eq!(rows[1]["ingredientes"][0]["unidad_medida"], "kg");
    assert_eq!(rows[1]["ingredientes"][1]["cantidad_uso"], 0.25);
}

#[tokio::test]
async fn test_recipe_with_unknown_ingredient_is_rejected() {
    let (app, _db) = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/pizzas",
        Some(json!({
            "nombre": "Fantasma", "tamano": "Mediana", "precio": 100,
            "ingredientes": [{ "id_producto": 42, "cantidad_uso": 1 }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_duplicate_recipe_conflicts() {
    let (app, cheese, _, _, _) = seeded().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/pizzas",
        Some(json!({
            "nombre": "Hawaiana", "tamano": "mediana", "precio": 130,
            "ingredientes": [{ "id_producto": cheese, "cantidad_uso": 1 }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "duplicate");
}

#[tokio::test]
async fn test_recipe_update_and_delete() {
    let (app, _, sauce, mediana, _) = seeded().await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/pizzas/{mediana}"),
        Some(json!({
            "nombre": "Hawaiana", "tamano": "Mediana", "precio": 135,
            "ingredientes": [{ "id_producto": sauce, "cantidad_uso": 0.3 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id_receta"], mediana);

    let (_, body) = send(&app, Method::GET, "/api/pizzas", None).await;
    let updated = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["id_receta"] == mediana)
        .cloned()
        .unwrap();
    assert_eq!(updated["precio"], 135.0);
    assert_eq!(updated["ingredientes"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/pizzas/{mediana}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/pizzas/{mediana}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn test_sale_commits_and_decrements_stock() {
    let (app, cheese, sauce, mediana, grande) = seeded().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/pizzas/ventas",
        Some(json!({ "items": [
            { "id_receta": mediana, "quantity": 2, "price": 129 },
            { "id_receta": grande, "quantity": 4, "price": 189 }
        ]})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    assert!(body["id_venta"].as_i64().unwrap() > 0);
    assert_eq!(body["total"], 1014.0);

    // cheese: 2 * 0.5 + 4 * 0.75 = 4
    assert_eq!(stock_of(&app, cheese).await, 6.0);
    // sauce: 6 * 0.25 = 1.5
    assert_eq!(stock_of(&app, sauce).await, 18.5);
}

#[tokio::test]
async fn test_insufficient_shared_ingredient_changes_nothing() {
    let (app, cheese, sauce, mediana, grande) = seeded().await;

    // cheese: 8 * 0.5 + 9 * 0.75 = 10.75 > 10; sauce alone would fit
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/pizzas/ventas",
        Some(json!({ "items": [
            { "id_receta": mediana, "quantity": 8, "price": 129 },
            { "id_receta": grande, "quantity": 9, "price": 189 }
        ]})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "insufficient_stock");
    assert!(body["message"].as_str().unwrap().contains("Queso"));
    assert_eq!(stock_of(&app, cheese).await, 10.0);
    assert_eq!(stock_of(&app, sauce).await, 20.0);

    let (_, report) = send(&app, Method::GET, "/api/pizzas/reporte-diario?since=2000-01-01T00:00:00Z", None).await;
    assert_eq!(report["data"]["totalOrdenes"], 0);
}

#[tokio::test]
async fn test_sale_exactly_exhausting_stock_succeeds() {
    let (app, cheese, _, mediana, _) = seeded().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/pizzas/ventas",
        Some(json!({ "items": [{ "id_receta": mediana, "quantity": 20, "price": 129 }] })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(stock_of(&app, cheese).await, 0.0);
}

#[tokio::test]
async fn test_sale_with_unknown_recipe() {
    let (app, cheese, _, mediana, _) = seeded().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/pizzas/ventas",
        Some(json!({ "items": [
            { "id_receta": mediana, "quantity": 1, "price": 129 },
            { "id_receta": 999, "quantity": 1, "price": 100 }
        ]})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "recipe_not_found");
    assert_eq!(stock_of(&app, cheese).await, 10.0);
}

#[tokio::test]
async fn test_invalid_carts_are_rejected() {
    let (app, _, _, mediana, _) = seeded().await;

    let cases = [
        json!({ "items": [] }),
        json!({ "items": [{ "id_receta": mediana, "quantity": 0, "price": 129 }] }),
        json!({ "items": [{ "id_receta": mediana, "quantity": 1, "price": -5 }] }),
        json!({ "items": [
            { "id_receta": mediana, "quantity": 1, "price": 129 },
            { "id_receta": mediana, "quantity": 2, "price": 129 }
        ]}),
        json!({ "productos": [] }),
    ];

    for payload in cases {
        let (status, body) = send(&app, Method::POST, "/api/pizzas/ventas", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body["code"], "invalid_cart", "{payload}");
    }
}

#[tokio::test]
async fn test_malformed_json_body() {
    let (app, _db) = test_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/pizzas/ventas")
        .header("content-type", "application/json")
        .body(Body::from("{ items: "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Daily report
// =============================================================================

#[tokio::test]
async fn test_daily_report_groups_by_recipe() {
    let (app, _, _, mediana, grande) = seeded().await;

    for items in [
        json!([{ "id_receta": mediana, "quantity": 1, "price": 129 }]),
        json!([
            { "id_receta": mediana, "quantity": 2, "price": 129 },
            { "id_receta": grande, "quantity": 1, "price": 189 }
        ]),
    ] {
        let (status, _) = send(&app, Method::POST, "/api/pizzas/ventas", Some(json!({ "items": items }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/pizzas/reporte-diario?since=2000-01-01T00:00:00Z",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["totalVentas"], 576.0);
    assert_eq!(data["totalOrdenes"], 2);
    assert_eq!(data["detalle"][0]["id_receta"], mediana);
    assert_eq!(data["detalle"][0]["total_vendido"], 3);
    assert_eq!(data["detalle"][1]["tamano"], "Grande");

    let (status, _) = send(&app, Method::GET, "/api/pizzas/reporte-diario", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/pizzas/reporte-diario?since=ayer", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_query");
}
