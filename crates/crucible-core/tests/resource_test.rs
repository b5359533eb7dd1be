#![allow(clippy::unwrap_used)]
// User, VM, and VLAN services against mocked Player, VM, and Caster APIs.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crucible_api::{ApiClient, ApiEndpoints, Credentials};
use crucible_core::{CoreError, ManagedResource, PlayerUser, Provider, Vlan, Vm};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Provider) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-1",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    let base = server.uri();
    let credentials = Credentials {
        username: "admin".into(),
        password: SecretString::from("secret".to_owned()),
        token_url: Url::parse(&format!("{base}/connect/token")).unwrap(),
        client_id: "crucible".into(),
        client_secret: None,
        scopes: Vec::new(),
    };
    let endpoints = ApiEndpoints::from_raw(
        Some(&format!("{base}/player")),
        Some(&format!("{base}/vm")),
        Some(&format!("{base}/caster/api/")),
    )
    .unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), credentials, endpoints);
    (server, Provider::from_client(client))
}

fn vm(id: Option<&str>, teams: &[&str]) -> Vm {
    Vm {
        id: id.map(Into::into),
        name: "kali".into(),
        url: None,
        default_url: false,
        team_ids: teams.iter().map(|t| (*t).to_owned()).collect(),
        user_id: None,
        embeddable: false,
        console_connection: None,
        proxmox: None,
    }
}

// ── Users ───────────────────────────────────────────────────────────

#[tokio::test]
async fn user_role_round_trips_through_role_id() {
    let (server, provider) = setup().await;
    Mock::given(method("GET"))
        .and(path("/player/api/roles/name/Content%20Developer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "r1", "name": "Content Developer" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/player/api/users"))
        .and(body_json(json!({ "id": "u1", "name": "Ann", "roleId": "r1" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/player/api/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1", "name": "Ann", "roleId": "r1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/player/api/roles/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "r1", "name": "Content Developer" })))
        .mount(&server)
        .await;

    let users = provider.users();
    let desired = PlayerUser {
        id: "u1".into(),
        name: "Ann".into(),
        role: Some("Content Developer".into()),
    };
    let created = users.create(&desired).await.unwrap();
    let read = users.read(&created).await.unwrap().unwrap();
    assert_eq!(read, desired);
}

#[tokio::test]
async fn unknown_user_role_is_reported_by_name() {
    let (server, provider) = setup().await;
    Mock::given(method("GET"))
        .and(path("/player/api/roles/name/Ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let desired = PlayerUser {
        id: "u1".into(),
        name: "Ann".into(),
        role: Some("Ghost".into()),
    };
    let err = provider.users().create(&desired).await.unwrap_err();
    assert_eq!(err.to_string(), "role 'Ghost' not found");
}

// ── VMs ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn vm_create_generates_id_and_applies_default_url() {
    let (server, provider) = setup().await;
    Mock::given(method("POST"))
        .and(path("/vm/api/vms"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "defaultUrl": true })))
        .expect(1)
        .mount(&server)
        .await;

    let created = provider.vms().create(&vm(None, &["t2", "t1"])).await.unwrap();
    assert!(created.default_url);
    assert!(uuid::Uuid::parse_str(created.id.as_deref().unwrap()).is_ok());
    assert_eq!(created.team_ids, vec!["t1".to_string(), "t2".to_string()]);
}

#[tokio::test]
async fn vm_update_moves_team_links_then_rewrites_record() {
    let (server, provider) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/vm/api/teams/t1/vms/vm1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vm/api/teams/t3/vms/vm1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/vm/api/vms/vm1"))
        .and(body_json(json!({
            "id": "vm1",
            "defaultUrl": true,
            "name": "kali",
            "teamIds": ["t2", "t3"],
            "embeddable": false
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut remembered = vm(Some("vm1"), &["t1", "t2"]);
    remembered.default_url = true;
    let updated = provider
        .vms()
        .update(&remembered, &vm(None, &["t3", "t2"]))
        .await
        .unwrap();
    assert!(updated.default_url);
    assert_eq!(updated.id.as_deref(), Some("vm1"));
}

// ── VLANs ───────────────────────────────────────────────────────────

#[tokio::test]
async fn vlan_acquire_sends_only_declared_selectors() {
    let (server, provider) = setup().await;
    Mock::given(method("POST"))
        .and(path("/caster/api/vlans/actions/acquire/"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "vl-1",
            "poolId": "pool-1",
            "partitionId": "part-1",
            "vlanId": 200,
            "inUse": true,
            "reserved": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let desired = Vlan {
        id: None,
        project_id: None,
        partition_id: None,
        vlan_id: None,
        tag: None,
        pool_id: None,
        in_use: false,
        reserved: false,
    };
    let acquired = provider.vlans().create(&desired).await.unwrap();
    assert_eq!(acquired.id.as_deref(), Some("vl-1"));
    assert_eq!(acquired.vlan_id, Some(200));
    assert!(acquired.in_use);
}

#[tokio::test]
async fn released_vlan_reads_as_gone() {
    let (server, provider) = setup().await;
    Mock::given(method("GET"))
        .and(path("/caster/api/vlans/vl-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "vl-1",
            "vlanId": 200,
            "inUse": false
        })))
        .mount(&server)
        .await;

    let remembered = Vlan {
        id: Some("vl-1".into()),
        project_id: None,
        partition_id: Some("part-1".into()),
        vlan_id: Some(200),
        tag: None,
        pool_id: Some("pool-1".into()),
        in_use: true,
        reserved: false,
    };
    let vlans = provider.vlans();
    assert!(vlans.read(&remembered).await.unwrap().is_none());
    assert!(!vlans.exists("vl-1").await.unwrap());
}

#[tokio::test]
async fn vlan_update_requires_replacement() {
    let (server, provider) = setup().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let remembered = Vlan {
        id: Some("vl-1".into()),
        project_id: None,
        partition_id: Some("part-1".into()),
        vlan_id: Some(200),
        tag: None,
        pool_id: None,
        in_use: true,
        reserved: false,
    };
    let desired = Vlan {
        vlan_id: Some(201),
        ..remembered.clone()
    };
    let err = provider.vlans().update(&remembered, &desired).await.unwrap_err();
    assert!(matches!(err, CoreError::RequiresReplacement { .. }), "{err:?}");
}
