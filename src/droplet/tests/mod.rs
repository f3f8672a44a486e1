//! Unit tests for droplet lookup and power helpers.

use std::time::Duration;

use serde_json::Value;

use super::{Droplet, DropletId, ReconcileError, Reconciler};
use crate::test_support::{ManualClock, ScriptedClient, droplet_json};

fn reconciler(client: &ScriptedClient) -> Reconciler<ScriptedClient, ManualClock> {
    Reconciler::with_clock(client.clone(), ManualClock::new())
}

fn droplet(value: Value) -> Droplet {
    serde_json::from_value(value).unwrap_or_else(|err| panic!("droplet fixture: {err}"))
}

#[tokio::test]
async fn locate_by_id_uses_single_fetch() {
    let client = ScriptedClient::new();
    client.push_droplet(droplet_json(42, "web-1", "active"));

    let found = reconciler(&client)
        .locate(Some(DropletId::from(42)), Some("web-1"))
        .await
        .unwrap_or_else(|err| panic!("locate: {err}"));

    assert_eq!(found.map(|d| d.id), Some(DropletId::from(42)));
    assert_eq!(client.request_lines(), vec!["GET droplets/42"]);
}

#[tokio::test]
async fn locate_falls_back_to_name_when_id_unknown() {
    let client = ScriptedClient::new();
    client.push_not_found();
    client.push_droplet_page(
        vec![
            droplet_json(1, "db-1", "active"),
            droplet_json(2, "web-1", "off"),
            droplet_json(3, "web-1", "active"),
        ],
        None,
    );

    let found = reconciler(&client)
        .locate(Some(DropletId::from(99)), Some("web-1"))
        .await
        .unwrap_or_else(|err| panic!("locate: {err}"));

    assert_eq!(found.map(|d| d.id), Some(DropletId::from(2)));
    assert_eq!(
        client.request_lines(),
        vec!["GET droplets/99", "GET droplets?page=1&per_page=200"]
    );
}

#[tokio::test]
async fn locate_follows_pagination() {
    let client = ScriptedClient::new();
    client.push_droplet_page(
        vec![droplet_json(1, "db-1", "active")],
        Some("https://api.digitalocean.com/v2/droplets?page=2&per_page=200"),
    );
    client.push_droplet_page(vec![droplet_json(5, "web-1", "active")], None);

    let found = reconciler(&client)
        .locate(None, Some("web-1"))
        .await
        .unwrap_or_else(|err| panic!("locate: {err}"));

    assert_eq!(found.map(|d| d.id), Some(DropletId::from(5)));
    assert_eq!(
        client.request_lines(),
        vec![
            "GET droplets?page=1&per_page=200",
            "GET droplets?page=2&per_page=200"
        ]
    );
}

#[tokio::test]
async fn locate_returns_none_without_hints() {
    let client = ScriptedClient::new();
    let found = reconciler(&client)
        .locate(None, None)
        .await
        .unwrap_or_else(|err| panic!("locate: {err}"));

    assert!(found.is_none());
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn fetch_surfaces_non_404_errors() {
    let client = ScriptedClient::new();
    client.push_json(
        401,
        serde_json::json!({"id": "unauthorized", "message": "Unable to authenticate you."}),
    );

    let err = reconciler(&client)
        .fetch_droplet(DropletId::from(42))
        .await
        .expect_err("401 should be fatal");

    assert_eq!(
        err,
        ReconcileError::Provider {
            status: 401,
            message: String::from("Unable to authenticate you."),
        }
    );
}

#[tokio::test]
async fn fetch_rejects_success_without_droplet() {
    let client = ScriptedClient::new();
    client.push_empty(200);

    let err = reconciler(&client)
        .fetch_droplet(DropletId::from(42))
        .await
        .expect_err("missing body should be fatal");

    assert!(matches!(err, ReconcileError::Decode { .. }), "got {err:?}");
}

#[tokio::test]
async fn power_on_skipped_unless_off() {
    let client = ScriptedClient::new();
    let powered = reconciler(&client)
        .power_on_if_off(&droplet(droplet_json(42, "web-1", "new")))
        .await
        .unwrap_or_else(|err| panic!("power on: {err}"));

    assert!(!powered);
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn power_on_posts_action_for_off_droplet() {
    let client = ScriptedClient::new();
    client.push_json(201, serde_json::json!({"action": {"id": 1, "status": "in-progress"}}));

    let powered = reconciler(&client)
        .power_on_if_off(&droplet(droplet_json(42, "web-1", "off")))
        .await
        .unwrap_or_else(|err| panic!("power on: {err}"));

    assert!(powered);
    let requests = client.requests();
    assert_eq!(client.request_lines(), vec!["POST droplets/42/actions"]);
    assert_eq!(
        requests.first().and_then(|request| request.body.clone()),
        Some(serde_json::json!({"type": "power_on"}))
    );
}

#[tokio::test]
async fn delete_treats_404_as_gone() {
    let client = ScriptedClient::new();
    client.push_not_found();

    reconciler(&client)
        .delete(DropletId::from(42))
        .await
        .unwrap_or_else(|err| panic!("delete: {err}"));

    assert_eq!(client.request_lines(), vec!["DELETE droplets/42"]);
}

#[tokio::test]
async fn wait_until_active_returns_latest_snapshot() {
    let client = ScriptedClient::new();
    client.push_droplet(droplet_json(42, "web-1", "new"));
    client.push_droplet(crate::test_support::active_droplet_json(42, "web-1"));
    let clock = ManualClock::new();
    let engine = Reconciler::with_clock(client.clone(), clock.clone());

    let active = engine
        .wait_until_active(DropletId::from(42), Duration::from_secs(60))
        .await
        .unwrap_or_else(|err| panic!("wait: {err}"));

    assert!(active.status.is_active());
    assert!(active.public_ipv4().is_some());
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(20); 2]);
}

#[tokio::test]
async fn wait_until_active_times_out_with_droplet_id() {
    let client = ScriptedClient::new();
    for _ in 0..3 {
        client.push_droplet(droplet_json(42, "web-1", "new"));
    }
    let clock = ManualClock::new();
    let engine = Reconciler::with_clock(client.clone(), clock.clone());

    let err = engine
        .wait_until_active(DropletId::from(42), Duration::from_secs(45))
        .await
        .expect_err("should time out");

    assert_eq!(
        err,
        ReconcileError::Timeout {
            droplet_id: DropletId::from(42),
            timeout_secs: 45,
        }
    );
    assert_eq!(
        clock.sleeps(),
        vec![
            Duration::from_secs(20),
            Duration::from_secs(20),
            Duration::from_secs(5)
        ]
    );
    assert_eq!(client.remaining(), 0);
}

#[tokio::test]
async fn wait_until_active_fails_when_droplet_vanishes() {
    let client = ScriptedClient::new();
    client.push_not_found();
    let engine = reconciler(&client);

    let err = engine
        .wait_until_active(DropletId::from(42), Duration::from_secs(60))
        .await
        .expect_err("vanished droplet should fail");

    assert_eq!(
        err,
        ReconcileError::NotFound {
            id: DropletId::from(42)
        }
    );
}
