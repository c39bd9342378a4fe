use crate::config::Config;
use crate::{app, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use foodgram_core::{IngredientId, MemoryStore, Store, TagId, User};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

const ALICE: &str = "alice-token";
const BOB: &str = "bob-token";

struct TestApp {
    router: Router,
    alice: User,
    bob: User,
    lunch: TagId,
    dinner: TagId,
    flour: IngredientId,
    egg: IngredientId,
    sugar: IngredientId,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response should be JSON")
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response should be UTF-8")
    }

    fn error(&self) -> String {
        self.json()["error"].as_str().unwrap_or_default().to_string()
    }
}

fn setup_with_base(public_base_url: Option<&str>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let alice = store.add_user("alice");
    let bob = store.add_user("bob");
    store.add_session(ALICE, alice.id);
    store.add_session(BOB, bob.id);
    let lunch = store.add_tag("Lunch", "lunch");
    let dinner = store.add_tag("Dinner", "dinner");
    let flour = store.add_ingredient("flour", "г");
    let egg = store.add_ingredient("egg", "шт");
    let sugar = store.add_ingredient("sugar", "г");

    let state = AppState {
        store: store as Arc<dyn Store>,
        config: Arc::new(Config {
            database_url: "postgres://unused".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            public_base_url: public_base_url.map(str::to_string),
        }),
    };

    TestApp {
        router: app(state),
        alice,
        bob,
        lunch,
        dinner,
        flour,
        egg,
        sugar,
    }
}

fn setup() -> TestApp {
    setup_with_base(None)
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::HOST, "foodgram.test");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }

    fn recipe_body(&self, name: &str, tags: &[TagId], lines: &[(IngredientId, i64)]) -> Value {
        json!({
            "name": name,
            "text": format!("How to make {}", name),
            "image": format!("recipes/images/{}.png", name),
            "cooking_time": 25,
            "tags": tags,
            "ingredients": lines
                .iter()
                .map(|(id, amount)| json!({"id": id, "amount": amount}))
                .collect::<Vec<_>>(),
        })
    }

    async fn publish(&self, token: &str, name: &str, tags: &[TagId], lines: &[(IngredientId, i64)]) -> String {
        let response = self
            .send(
                Method::POST,
                "/api/recipes",
                Some(token),
                Some(self.recipe_body(name, tags, lines)),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_create_and_get_recipe() {
    let app = setup();
    let response = app
        .send(
            Method::POST,
            "/api/recipes",
            Some(ALICE),
            Some(app.recipe_body("Pancakes", &[app.lunch], &[(app.flour, 200), (app.egg, 2)])),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let created = response.json();
    assert_eq!(created["name"], "Pancakes");
    assert_eq!(created["author"]["username"], "alice");
    assert_eq!(created["tags"][0]["slug"], "lunch");
    assert_eq!(created["ingredients"].as_array().unwrap().len(), 2);

    let id = created["id"].as_str().unwrap();
    let fetched = app
        .send(Method::GET, &format!("/api/recipes/{}", id), None, None)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json()["is_favorited"], false);
    assert_eq!(fetched.json()["is_in_shopping_cart"], false);
}

#[tokio::test]
async fn test_anonymous_create_is_unauthorized() {
    let app = setup();
    let response = app
        .send(
            Method::POST,
            "/api/recipes",
            None,
            Some(app.recipe_body("Soup", &[app.lunch], &[(app.egg, 1)])),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    let app = setup();
    let response = app
        .send(Method::GET, "/api/recipes", Some("forged"), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "Invalid or expired token");
}

#[tokio::test]
async fn test_validation_errors_are_bad_requests() {
    let app = setup();

    let response = app
        .send(
            Method::POST,
            "/api/recipes",
            Some(ALICE),
            Some(app.recipe_body("Air", &[], &[(app.egg, 1)])),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "At least one tag must be selected");

    let response = app
        .send(
            Method::POST,
            "/api/recipes",
            Some(ALICE),
            Some(app.recipe_body("Twice", &[app.lunch], &[(app.egg, 1), (app.egg, 2)])),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "The same ingredient cannot be added twice");

    let response = app
        .send(Method::GET, "/api/recipes", None, None)
        .await;
    assert_eq!(response.json()["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_mistyped_body_is_a_bad_request() {
    let app = setup();
    let mut body = app.recipe_body("Soup", &[app.lunch], &[(app.egg, 1)]);
    body["cooking_time"] = json!("ten");

    let response = app
        .send(Method::POST, "/api/recipes", Some(ALICE), Some(body))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.error().contains("cooking_time"), "{}", response.error());

    let id = app
        .publish(ALICE, "Stew", &[app.lunch], &[(app.egg, 1)])
        .await;
    let mut body = app.recipe_body("Stew", &[app.lunch], &[(app.egg, 1)]);
    body["ingredients"][0]["amount"] = json!(1.5);
    let response = app
        .send(
            Method::PATCH,
            &format!("/api/recipes/{}", id),
            Some(ALICE),
            Some(body),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.error().is_empty());
}

#[tokio::test]
async fn test_embedded_author_reports_subscription() {
    let app = setup();
    let id = app
        .publish(ALICE, "Soup", &[app.lunch], &[(app.egg, 1)])
        .await;
    let response = app
        .send(
            Method::POST,
            &format!("/api/users/{}/subscribe", app.alice.id),
            Some(BOB),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let uri = format!("/api/recipes/{}", id);
    let response = app.send(Method::GET, &uri, Some(BOB), None).await;
    assert_eq!(response.json()["author"]["username"], "alice");
    assert_eq!(response.json()["author"]["is_subscribed"], true);

    let response = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(response.json()["author"]["is_subscribed"], false);

    let response = app.send(Method::GET, "/api/recipes", Some(BOB), None).await;
    assert_eq!(response.json()["results"][0]["author"]["is_subscribed"], true);
}

#[tokio::test]
async fn test_only_author_can_update_or_delete() {
    let app = setup();
    let id = app
        .publish(ALICE, "Soup", &[app.lunch], &[(app.egg, 1)])
        .await;
    let uri = format!("/api/recipes/{}", id);

    let response = app
        .send(
            Method::PATCH,
            &uri,
            Some(BOB),
            Some(app.recipe_body("Stolen", &[app.lunch], &[(app.egg, 1)])),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.send(Method::DELETE, &uri, Some(BOB), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let mut body = app.recipe_body("Better soup", &[app.dinner], &[(app.sugar, 5)]);
    body.as_object_mut().unwrap().remove("image");
    let response = app.send(Method::PATCH, &uri, Some(ALICE), Some(body)).await;
    assert_eq!(response.status, StatusCode::OK);
    let updated = response.json();
    assert_eq!(updated["name"], "Better soup");
    assert_eq!(updated["image"], "recipes/images/Soup.png");
    assert_eq!(updated["tags"][0]["slug"], "dinner");

    let response = app.send(Method::DELETE, &uri, Some(ALICE), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorite_round_trip() {
    let app = setup();
    let id = app
        .publish(ALICE, "Soup", &[app.lunch], &[(app.egg, 1)])
        .await;
    let uri = format!("/api/recipes/{}/favorite", id);

    let response = app.send(Method::POST, &uri, Some(BOB), None).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["name"], "Soup");
    assert_eq!(response.json()["cooking_time"], 25);

    let response = app.send(Method::POST, &uri, Some(BOB), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Recipe already added");

    let response = app
        .send(Method::GET, "/api/recipes?is_favorited=1", Some(BOB), None)
        .await;
    let results = response.json()["results"].as_array().unwrap().clone();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["is_favorited"], true);

    let response = app.send(Method::DELETE, &uri, Some(BOB), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = app.send(Method::DELETE, &uri, Some(BOB), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.send(Method::POST, &uri, None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mark_on_missing_recipe_is_not_found() {
    let app = setup();
    let uri = format!("/api/recipes/{}/shopping_cart", uuid::Uuid::new_v4());
    let response = app.send(Method::POST, &uri, Some(BOB), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_shopping_cart() {
    let app = setup();
    let a = app
        .publish(ALICE, "A", &[app.lunch], &[(app.flour, 200), (app.egg, 2)])
        .await;
    let b = app
        .publish(ALICE, "B", &[app.lunch], &[(app.flour, 100), (app.sugar, 50)])
        .await;
    for id in [&a, &b] {
        let uri = format!("/api/recipes/{}/shopping_cart", id);
        let response = app.send(Method::POST, &uri, Some(BOB), None).await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let response = app
        .send(Method::GET, "/api/recipes/download_shopping_cart", Some(BOB), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"shopping_list.txt\""
    );
    assert!(response.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(
        response.text(),
        "Список покупок:\n\n1. egg(шт) - 2\n2. flour(г) - 300\n3. sugar(г) - 50\n"
    );

    let response = app
        .send(Method::GET, "/api/recipes/download_shopping_cart", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_short_link_issue_and_follow() {
    let app = setup();
    let id = app
        .publish(ALICE, "Soup", &[app.lunch], &[(app.egg, 1)])
        .await;
    let uri = format!("/api/recipes/{}/get-link", id);

    let first = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(first.status, StatusCode::OK);
    let link = first.json()["short-link"].as_str().unwrap().to_string();
    assert!(link.starts_with("http://foodgram.test/s/"));

    let second = app.send(Method::GET, &uri, Some(BOB), None).await;
    assert_eq!(second.json()["short-link"], link.as_str());

    let path = link.trim_start_matches("http://foodgram.test");
    let redirect = app.send(Method::GET, path, None, None).await;
    assert_eq!(redirect.status, StatusCode::FOUND);
    assert_eq!(
        redirect.headers[header::LOCATION],
        format!("/recipes/{}", id).as_str()
    );

    let missing = app.send(Method::GET, "/s/zzzzzzzz", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_short_link_uses_configured_base() {
    let app = setup_with_base(Some("https://foodgram.example"));
    let id = app
        .publish(ALICE, "Soup", &[app.lunch], &[(app.egg, 1)])
        .await;
    let response = app
        .send(Method::GET, &format!("/api/recipes/{}/get-link", id), None, None)
        .await;
    assert!(response.json()["short-link"]
        .as_str()
        .unwrap()
        .starts_with("https://foodgram.example/s/"));
}

#[tokio::test]
async fn test_list_filters_by_repeated_tags_and_author() {
    let app = setup();
    app.publish(ALICE, "Soup", &[app.lunch], &[(app.egg, 1)])
        .await;
    app.publish(BOB, "Roast", &[app.dinner], &[(app.flour, 10)])
        .await;

    let response = app
        .send(Method::GET, "/api/recipes?tags=lunch&tags=dinner", None, None)
        .await;
    assert_eq!(response.json()["results"].as_array().unwrap().len(), 2);

    let response = app
        .send(Method::GET, "/api/recipes?limit=1", None, None)
        .await;
    assert_eq!(response.json()["count"], 2);
    assert_eq!(response.json()["results"].as_array().unwrap().len(), 1);

    let response = app
        .send(
            Method::GET,
            &format!("/api/recipes?author={}", app.bob.id),
            None,
            None,
        )
        .await;
    let results = response.json()["results"].as_array().unwrap().clone();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "Roast");

    let response = app
        .send(Method::GET, "/api/recipes?limit=many", None, None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_subscriptions() {
    let app = setup();
    app.publish(ALICE, "Soup", &[app.lunch], &[(app.egg, 1)])
        .await;
    app.publish(ALICE, "Eggs", &[app.lunch], &[(app.egg, 3)])
        .await;
    let uri = format!("/api/users/{}/subscribe?recipes_limit=1", app.alice.id);

    let response = app.send(Method::POST, &uri, Some(BOB), None).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let author = response.json();
    assert_eq!(author["username"], "alice");
    assert_eq!(author["is_subscribed"], true);
    assert_eq!(author["recipes_count"], 2);
    assert_eq!(author["recipes"].as_array().unwrap().len(), 1);

    let response = app.send(Method::POST, &uri, Some(BOB), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .send(
            Method::POST,
            &format!("/api/users/{}/subscribe", app.bob.id),
            Some(BOB),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Cannot subscribe to yourself");

    let response = app
        .send(Method::GET, "/api/users/subscriptions", Some(BOB), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()[0]["username"], "alice");

    let response = app
        .send(
            Method::DELETE,
            &format!("/api/users/{}/subscribe", app.alice.id),
            Some(BOB),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = app
        .send(
            Method::DELETE,
            &format!("/api/users/{}/subscribe", app.alice.id),
            Some(BOB),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_reads() {
    let app = setup();

    let response = app.send(Method::GET, "/api/tags", None, None).await;
    let slugs: Vec<_> = response.json()
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["slug"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(slugs, vec!["dinner", "lunch"]);

    let response = app
        .send(Method::GET, &format!("/api/tags/{}", app.lunch), None, None)
        .await;
    assert_eq!(response.json()["name"], "Lunch");
    let response = app.send(Method::GET, "/api/tags/9999", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .send(Method::GET, "/api/ingredients?name=fl", None, None)
        .await;
    let found = response.json();
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["measurement_unit"], "г");

    let response = app
        .send(Method::GET, &format!("/api/ingredients/{}", app.egg), None, None)
        .await;
    assert_eq!(response.json()["name"], "egg");
}

#[test]
fn test_openapi_lists_every_route() {
    let spec = super::openapi();
    for path in [
        "/api/recipes",
        "/api/recipes/{id}",
        "/api/recipes/{id}/favorite",
        "/api/recipes/{id}/shopping_cart",
        "/api/recipes/{id}/get-link",
        "/api/recipes/download_shopping_cart",
        "/s/{token}",
        "/api/tags",
        "/api/ingredients",
        "/api/users/{id}/subscribe",
        "/api/users/subscriptions",
    ] {
        assert!(spec.paths.paths.contains_key(path), "missing {}", path);
    }
}
