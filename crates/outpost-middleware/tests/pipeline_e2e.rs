//! End-to-end tests for the dispatch-and-render pipeline.

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, ETAG, LINK, LOCATION, VARY};
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use outpost_core::{
    Action, AuthRequirement, Entity, FnAction, Link, Meta, OutpostError, RequestContext, RouteResource,
    Service, ServiceDef, VerifiedCredential,
};
use outpost_format::{FormatterRegistry, HalFormatter};
use outpost_middleware::{
    AbortHandle, Authorizer, BaseUriResolver, DispatchMiddleware, ErrorRenderer,
    ExtensionVerifier, MiddlewareContext, Pipeline, RenderMiddleware, Request, Response,
    ResponseExt,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn widget_action() -> impl Action {
    FnAction::new(|ctx: &RequestContext| {
        let id = ctx.params().get("id").unwrap_or_default().to_string();
        Box::pin(async move {
            Ok(Entity::typed("widget")
                .with_property("id", id.clone())
                .with_meta(Meta::new().with_etag("\"w1\"").with_location(format!("/widgets/{id}")))
                .with_link("self", Link::new(format!("/widgets/{id}")))
                .with_link("vendor", Link::new("https://vendor.example/w"))
                .with_link("cdn", Link::new("//cdn.example.com/w.png")))
        })
    })
}

fn whoami_action() -> impl Action {
    FnAction::new(|ctx: &RequestContext| {
        let auth = ctx.auth().clone();
        Box::pin(async move {
            let scope: Vec<String> = auth
                .scope()
                .map(|s| s.iter().map(ToString::to_string).collect())
                .unwrap_or_default();
            Ok(Entity::typed("whoami")
                .with_property("kind", auth.kind())
                .with_property("identity", json!(auth.identity()))
                .with_property("client", json!(auth.client()))
                .with_property("scope", json!(scope)))
        })
    })
    .with_auth(AuthRequirement::scope(Vec::<String>::new()))
}

fn services() -> Vec<Arc<dyn Service>> {
    let catalog = ServiceDef::new("catalog")
        // Matches /things/special but only binds POST, so GET falls through.
        .resource(
            RouteResource::new("thing-create", "/things/{name}")
                .unwrap()
                .post(FnAction::new(|_ctx: &RequestContext| {
                    Box::pin(async { Ok(Entity::typed("first")) })
                })),
        )
        .resource(
            RouteResource::new("thing-special", "/things/special")
                .unwrap()
                .get(FnAction::new(|_ctx: &RequestContext| {
                    Box::pin(async { Ok(Entity::typed("second")) })
                })),
        )
        .resource(RouteResource::new("widget", "/widgets/{id}").unwrap().get(widget_action()))
        .resource(
            RouteResource::new("gone", "/gone")
                .unwrap()
                .get(FnAction::new(|_ctx: &RequestContext| {
                    Box::pin(async { Err(OutpostError::not_found("not found")) })
                })),
        )
        .resource(
            RouteResource::new("slow", "/slow")
                .unwrap()
                .get(FnAction::new(|_ctx: &RequestContext| {
                    Box::pin(async {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        Ok(Entity::typed("late"))
                    })
                })),
        );

    let account = ServiceDef::new("account")
        .resource(RouteResource::new("whoami", "/whoami").unwrap().get(whoami_action()));

    vec![Arc::new(catalog) as Arc<dyn Service>, Arc::new(account)]
}

fn pipeline() -> Pipeline {
    let registry = Arc::new(FormatterRegistry::new().register("hal", HalFormatter));
    let errors = ErrorRenderer::new(Arc::clone(&registry));
    Pipeline::builder()
        .stage(DispatchMiddleware::new(
            services(),
            Authorizer::new(Arc::new(ExtensionVerifier)),
            errors,
        ))
        .stage(RenderMiddleware::new(registry, BaseUriResolver::default()))
        .build()
}

fn request(method: Method, uri: &str) -> http::request::Builder {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .header("host", "api.example.com")
        .header("x-forwarded-proto", "https")
}

fn empty(builder: http::request::Builder) -> Request {
    builder.body(Full::new(Bytes::new())).unwrap()
}

async fn send(pipeline: &Pipeline, request: Request, fallbacks: &Arc<AtomicUsize>) -> Response {
    send_with(pipeline, MiddlewareContext::new(), request, fallbacks).await
}

async fn send_with(
    pipeline: &Pipeline,
    ctx: MiddlewareContext,
    request: Request,
    fallbacks: &Arc<AtomicUsize>,
) -> Response {
    let fallbacks = Arc::clone(fallbacks);
    pipeline
        .process(ctx, request, move |_ctx, _req| {
            Box::pin(async move {
                fallbacks.fetch_add(1, Ordering::SeqCst);
                Response::empty(StatusCode::IM_A_TEAPOT)
            })
        })
        .await
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn unmatched_path_reaches_fallback_once() {
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let response = send(&pipeline(), empty(request(Method::GET, "/nothing/here")), &fallbacks).await;

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert!(response.headers().get(VARY).is_none());
    assert_eq!(fallbacks.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn second_overlapping_resource_wins_when_first_lacks_verb() {
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let response = send(&pipeline(), empty(request(Method::GET, "/things/special")), &fallbacks).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["_type"], "second");
    assert_eq!(fallbacks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn links_resolve_against_base_uri() {
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let response = send(&pipeline(), empty(request(Method::GET, "/widgets/1")), &fallbacks).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(response.headers()[VARY], "Authorization, Accept");

    let body = json_body(response).await;
    assert_eq!(body["_links"]["self"]["href"], "https://api.example.com/widgets/1");
    assert_eq!(body["_links"]["vendor"]["href"], "https://vendor.example/w");
    assert_eq!(body["_links"]["cdn"]["href"], "//cdn.example.com/w.png");
}

#[tokio::test]
async fn links_off_still_emits_link_header() {
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let response = send(
        &pipeline(),
        empty(request(Method::GET, "/widgets/1?_links=false")),
        &fallbacks,
    )
    .await;

    let link = response.headers()[LINK].to_str().unwrap().to_string();
    assert!(link.contains("<https://api.example.com/widgets/1>; rel=\"self\""));
    assert!(json_body(response).await.get("_links").is_none());
}

#[tokio::test]
async fn meta_override_values() {
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let pipeline = pipeline();

    for off in ["0", "false", "no", "NO"] {
        let uri = format!("/widgets/1?_meta={off}");
        let body = json_body(send(&pipeline, empty(request(Method::GET, &uri)), &fallbacks).await).await;
        assert!(body.get("_meta").is_none(), "_meta={off} should disable");
    }
    for on in ["1", "yes", "banana"] {
        let uri = format!("/widgets/1?_meta={on}");
        let body = json_body(send(&pipeline, empty(request(Method::GET, &uri)), &fallbacks).await).await;
        assert_eq!(body["_meta"]["etag"], "\"w1\"", "_meta={on} should keep meta");
    }
}

#[tokio::test]
async fn hal_propagates_access_token() {
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let response = send(
        &pipeline(),
        empty(request(Method::GET, "/widgets/1?access_token=abc").header(ACCEPT, "application/hal+json")),
        &fallbacks,
    )
    .await;

    assert_eq!(response.headers()[CONTENT_TYPE], "application/hal+json");
    let body = json_body(response).await;
    assert_eq!(
        body["_links"]["self"]["href"],
        "https://api.example.com/widgets/1?access_token=abc"
    );
    assert_eq!(body["_links"]["vendor"]["href"], "https://vendor.example/w");
}

#[tokio::test]
async fn head_returns_headers_without_body() {
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let response = send(&pipeline(), empty(request(Method::HEAD, "/widgets/7")), &fallbacks).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[ETAG], "\"w1\"");
    assert_eq!(response.headers()[LOCATION], "/widgets/7");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn action_failure_renders_envelope_in_every_format() {
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let pipeline = pipeline();

    for accept in ["application/json", "application/hal+json", "*/*"] {
        let response = send(
            &pipeline,
            empty(request(Method::GET, "/gone").header(ACCEPT, accept)),
            &fallbacks,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["_type"], "error");
        assert_eq!(body["status"], 404);
        assert_eq!(body["message"], "not found");
    }
}

#[tokio::test]
async fn delegated_credential_derivation() {
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let mut request = empty(request(Method::GET, "/whoami"));
    request.extensions_mut().insert(
        VerifiedCredential::user("alice")
            .via_client("mobile")
            .with_scope(["orders"]),
    );

    let body = json_body(send(&pipeline(), request, &fallbacks).await).await;
    assert_eq!(body["kind"], "delegated");
    assert_eq!(body["identity"], "alice");
    assert_eq!(body["client"], "mobile");
    assert_eq!(body["scope"], json!(["orders"]));
}

#[tokio::test]
async fn identity_credential_gets_default_scope() {
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let mut request = empty(request(Method::GET, "/whoami"));
    request.extensions_mut().insert(VerifiedCredential::user("bob"));

    let body = json_body(send(&pipeline(), request, &fallbacks).await).await;
    assert_eq!(body["kind"], "identity");
    assert_eq!(body["client"], Value::Null);
    assert_eq!(body["scope"], json!(["me"]));
}

#[tokio::test]
async fn missing_credential_is_401() {
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let response = send(&pipeline(), empty(request(Method::GET, "/whoami")), &fallbacks).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["status"], 401);
}

#[tokio::test(start_paused = true)]
async fn aborted_request_is_never_rendered() {
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let handle = AbortHandle::new();
    let ctx = MiddlewareContext::new().with_abort_signal(handle.signal());

    let aborter = handle.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        aborter.abort();
    });

    let response = send_with(&pipeline(), ctx, empty(request(Method::GET, "/slow")), &fallbacks).await;
    assert_eq!(response.status().as_u16(), 499);
    assert!(response.headers().get(CONTENT_TYPE).is_none());
    assert_eq!(fallbacks.load(Ordering::SeqCst), 0);
}
