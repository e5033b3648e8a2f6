//! End-to-end rendering through the registry.

use outpost_core::{Entity, Link, Meta, OutpostError, Value};
use outpost_format::{FormatterRegistry, HalFormatter, RenderOptions};
use serde_json::{json, Value as Json};

const BASE: &str = "https://api.example.com";

fn registry() -> FormatterRegistry {
    FormatterRegistry::new().register("hal", HalFormatter)
}

fn order() -> Entity {
    Entity::typed("order")
        .with_property("id", 42)
        .with_property("total", 19.5)
        .with_property("paid", false)
        .with_property("notes", Value::Scalar(Json::Null))
        .with_property("customer", Link::new("/customers/7").with_title("Ann"))
        .with_meta(
            Meta::new()
                .with_etag("\"abc\"")
                .with_last_modified("Tue, 15 Nov 1994 12:45:26 GMT"),
        )
        .with_link("self", Link::new("/orders/42"))
        .with_links(
            "invoices",
            vec![Link::new("/invoices/1"), Link::new("https://billing.example/i/2")],
        )
        .with_embedded_many(
            "items",
            vec![
                Entity::typed("item").with_property("sku", "A1"),
                Entity::typed("item").with_property("sku", "B2"),
            ],
        )
        .with_embedded("shipment", Entity::typed("shipment").with_property("carrier", "ups"))
        .with_action("cancel", json!({ "method": "POST", "href": "/orders/42/cancel" }))
}

#[test]
fn json_representation_preserves_structure() {
    let registry = registry();
    let chosen = registry.negotiate(Some("application/json"));
    let bytes = chosen
        .formatter
        .format_entity(&order(), &RenderOptions::new(BASE))
        .unwrap();
    let out: Json = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(
        out,
        json!({
            "_type": "order",
            "id": 42,
            "total": 19.5,
            "paid": false,
            "notes": null,
            "customer": { "href": "https://api.example.com/customers/7", "title": "Ann" },
            "_meta": {
                "etag": "\"abc\"",
                "lastModified": "Tue, 15 Nov 1994 12:45:26 GMT"
            },
            "_embedded": {
                "items": [
                    { "_type": "item", "sku": "A1" },
                    { "_type": "item", "sku": "B2" }
                ],
                "shipment": { "_type": "shipment", "carrier": "ups" }
            },
            "_links": {
                "self": { "href": "https://api.example.com/orders/42" },
                "invoices": [
                    { "href": "https://api.example.com/invoices/1" },
                    { "href": "https://billing.example/i/2" }
                ]
            },
            "_actions": {
                "cancel": { "method": "POST", "href": "/orders/42/cancel" }
            }
        })
    );
}

#[test]
fn hal_representation_propagates_token() {
    let registry = registry();
    let chosen = registry.negotiate(Some("application/hal+json, application/json;q=0.5"));
    assert_eq!(chosen.name, "hal");

    let pairs = vec![("access_token".to_string(), "tok".to_string())];
    let options = RenderOptions::new(BASE).with_query_overrides(&pairs, "access_token");
    let bytes = chosen.formatter.format_entity(&order(), &options).unwrap();
    let out: Json = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(
        out["_links"]["self"]["href"],
        "https://api.example.com/orders/42?access_token=tok"
    );
    assert_eq!(out["_links"]["invoices"][1]["href"], "https://billing.example/i/2");
    assert_eq!(
        out["customer"]["href"],
        "https://api.example.com/customers/7?access_token=tok"
    );
}

#[test]
fn section_overrides_from_query() {
    let pairs = vec![
        ("_meta".to_string(), "false".to_string()),
        ("_embedded".to_string(), "0".to_string()),
        ("_actions".to_string(), "NO".to_string()),
        ("_links".to_string(), "1".to_string()),
    ];
    let options = RenderOptions::new(BASE).with_query_overrides(&pairs, "access_token");
    let bytes = registry()
        .negotiate(None)
        .formatter
        .format_entity(&order(), &options)
        .unwrap();
    let out: Json = serde_json::from_slice(&bytes).unwrap();

    assert!(out.get("_meta").is_none());
    assert!(out.get("_embedded").is_none());
    assert!(out.get("_actions").is_none());
    assert!(out.get("_links").is_some());
}

#[test]
fn error_envelope_is_identical_across_formats() {
    let envelope = OutpostError::not_found("not found").to_envelope(None);
    let registry = registry();

    for accept in ["application/json", "application/hal+json"] {
        let bytes = registry
            .negotiate(Some(accept))
            .formatter
            .format_error(&envelope)
            .unwrap();
        let out: Json = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(out["_type"], "error");
        assert_eq!(out["status"], 404);
        assert_eq!(out["message"], "not found");
    }
}
