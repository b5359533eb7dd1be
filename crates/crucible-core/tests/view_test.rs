#![allow(clippy::unwrap_used)]
// View reconciliation against a mocked Player API.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crucible_api::{ApiClient, ApiEndpoints, Credentials};
use crucible_core::{
    AppInstance, Application, CoreError, Provider, ReferenceKind, Team, TeamUser, View,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Provider) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-1",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    let credentials = Credentials {
        username: "admin".into(),
        password: SecretString::from("secret".to_owned()),
        token_url: Url::parse(&format!("{}/connect/token", server.uri())).unwrap(),
        client_id: "crucible".into(),
        client_secret: None,
        scopes: Vec::new(),
    };
    let endpoints =
        ApiEndpoints::from_raw(Some(&format!("{}/player", server.uri())), None, None).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), credentials, endpoints);
    (server, Provider::from_client(client))
}

fn api(suffix: &str) -> String {
    format!("/player/api/{suffix}")
}

async fn respond(server: &MockServer, verb: &str, route: &str, status: u16, body: serde_json::Value) {
    let template = if body.is_null() {
        ResponseTemplate::new(status)
    } else {
        ResponseTemplate::new(status).set_body_json(body)
    };
    Mock::given(method(verb))
        .and(path(api(route)))
        .respond_with(template)
        .expect(1)
        .mount(server)
        .await;
}

fn app(id: &str, name: &str) -> Application {
    let mut app = Application::new(name);
    app.id = Some(id.into());
    app
}

fn instance(id: Option<&str>, name: &str, order: f64) -> AppInstance {
    let mut i = AppInstance::new(name, order);
    i.id = id.map(Into::into);
    i
}

fn remembered_view() -> View {
    let mut view = View::new("Exercise");
    view.id = Some("v1".into());
    view.applications = vec![app("a1", "Wiki"), app("a2", "Chat")];
    view
}

// ── Idempotence ─────────────────────────────────────────────────────

#[tokio::test]
async fn identical_state_makes_no_remote_calls() {
    let (server, provider) = setup().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut view = remembered_view();
    let mut team = Team::new("Blue");
    team.id = Some("t1".into());
    team.users = vec![TeamUser::new("u2"), TeamUser::new("u1").with_role("Observer")];
    team.app_instances = vec![instance(Some("i1"), "Wiki", 1.0)];
    view.teams.push(team);

    let views = provider.views();
    let first = views.update(&view, &view).await.unwrap();
    let second = views.update(&first, &first).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.teams[0].users[0].user_id, "u1");
}

// ── Team creation ───────────────────────────────────────────────────

#[tokio::test]
async fn new_team_gets_users_roles_instances_and_permissions() {
    let (server, provider) = setup().await;

    respond(&server, "GET", "team-roles", 200, json!([{ "id": "tr1", "name": "View Member" }])).await;
    Mock::given(method("POST"))
        .and(path(api("views/v1/teams")))
        .and(body_json(json!({ "name": "Blue", "roleId": "tr1" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "t1" })))
        .expect(1)
        .mount(&server)
        .await;
    respond(&server, "POST", "teams/t1/users/u1", 200, json!({})).await;
    respond(&server, "POST", "teams/t1/users/u2", 200, json!({})).await;
    respond(&server, "GET", "roles/name/Observer", 200, json!({ "id": "r-obs", "name": "Observer" })).await;
    respond(
        &server,
        "GET",
        "users/u1/views/v1/team-memberships",
        200,
        json!([{ "id": "m0", "teamId": "t0" }, { "id": "m1", "teamId": "t1" }]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path(api("team-memberships/m1")))
        .and(body_json(json!({ "roleId": "r-obs" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    respond(
        &server,
        "GET",
        "views/v1/applications",
        200,
        json!([{ "id": "a1", "name": "Wiki" }, { "id": "a2", "name": "Chat" }]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(api("teams/t1/application-instances")))
        .and(body_json(json!({ "teamId": "t1", "applicationId": "a1", "displayOrder": 1.0 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "i1" })))
        .expect(1)
        .mount(&server)
        .await;
    respond(&server, "GET", "permissions/name/ViewAdmin", 200, json!({ "id": "p1", "name": "ViewAdmin" })).await;
    Mock::given(method("POST"))
        .and(path(api("team-permissions")))
        .and(body_json(json!({ "teamId": "t1", "permissionId": "p1" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut desired = remembered_view();
    desired.applications.iter_mut().for_each(|a| a.id = None);
    let mut team = Team::new("Blue");
    team.users = vec![TeamUser::new("u2"), TeamUser::new("u1").with_role("Observer")];
    team.app_instances = vec![AppInstance::new("Wiki", 1.0)];
    team.permissions = vec!["ViewAdmin".into()];
    desired.teams.push(team);

    let result = provider.views().update(&remembered_view(), &desired).await.unwrap();

    let blue = &result.teams[0];
    assert_eq!(blue.id.as_deref(), Some("t1"));
    assert_eq!(blue.app_instances[0].id.as_deref(), Some("i1"));
    assert_eq!(result.applications[0].name, "Chat");
    assert_eq!(result.applications[0].id.as_deref(), Some("a2"));
}

// ── Team updates ────────────────────────────────────────────────────

#[tokio::test]
async fn changed_team_touches_only_what_differs() {
    let (server, provider) = setup().await;

    let mut remembered = remembered_view();
    let mut blue = Team::new("Blue");
    blue.id = Some("t1".into());
    blue.permissions = vec!["ViewAdmin".into()];
    blue.users = vec![TeamUser::new("u1").with_role("Observer"), TeamUser::new("u2")];
    blue.app_instances = vec![instance(Some("i1"), "Wiki", 1.0)];
    remembered.teams.push(blue);

    let mut desired = remembered_view();
    let mut blue = Team::new("Blue");
    blue.permissions = vec!["EditView".into()];
    blue.users = vec![TeamUser::new("u1"), TeamUser::new("u3").with_role("Observer")];
    blue.app_instances = vec![AppInstance::new("Wiki", 2.0), AppInstance::new("Chat", 3.0)];
    desired.teams.push(blue);

    respond(&server, "GET", "permissions/name/ViewAdmin", 200, json!({ "id": "p1", "name": "ViewAdmin" })).await;
    respond(&server, "DELETE", "teams/t1/permissions/p1", 204, json!(null)).await;
    respond(&server, "GET", "permissions/name/EditView", 200, json!({ "id": "p2", "name": "EditView" })).await;
    respond(&server, "POST", "team-permissions", 201, json!(null)).await;

    respond(&server, "DELETE", "teams/t1/users/u2", 204, json!(null)).await;
    respond(&server, "GET", "users/u1/views/v1/team-memberships", 200, json!([{ "id": "m1", "teamId": "t1" }])).await;
    Mock::given(method("PUT"))
        .and(path(api("team-memberships/m1")))
        .and(body_json(json!({ "roleId": null })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    respond(&server, "POST", "teams/t1/users/u3", 200, json!({})).await;
    respond(&server, "GET", "roles/name/Observer", 200, json!({ "id": "r-obs", "name": "Observer" })).await;
    respond(&server, "GET", "users/u3/views/v1/team-memberships", 200, json!([{ "id": "m3", "teamId": "t1" }])).await;
    Mock::given(method("PUT"))
        .and(path(api("team-memberships/m3")))
        .and(body_json(json!({ "roleId": "r-obs" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    respond(
        &server,
        "GET",
        "views/v1/applications",
        200,
        json!([{ "id": "a1", "name": "Wiki" }, { "id": "a2", "name": "Chat" }]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path(api("application-instances/i1")))
        .and(body_json(json!({ "id": "i1", "teamId": "t1", "applicationId": "a1", "displayOrder": 2.0 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    respond(&server, "POST", "teams/t1/application-instances", 201, json!({ "id": "i2" })).await;

    // The team shell is unchanged.
    Mock::given(method("PUT"))
        .and(path(api("teams/t1")))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let result = provider.views().update(&remembered, &desired).await.unwrap();
    let blue = &result.teams[0];
    let instances: Vec<(&str, Option<&str>)> = blue
        .app_instances
        .iter()
        .map(|i| (i.name.as_str(), i.id.as_deref()))
        .collect();
    assert_eq!(instances, vec![("Chat", Some("i2")), ("Wiki", Some("i1"))]);
    assert_eq!(blue.permissions, vec!["EditView".to_string()]);
}

// ── Failure semantics ───────────────────────────────────────────────

#[tokio::test]
async fn failure_reports_how_many_teams_were_created() {
    let (server, provider) = setup().await;

    for (name, response) in [
        ("Alpha", ResponseTemplate::new(201).set_body_json(json!({ "id": "ta" }))),
        ("Bravo", ResponseTemplate::new(201).set_body_json(json!({ "id": "tb" }))),
        ("Charlie", ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" }))),
    ] {
        Mock::given(method("POST"))
            .and(path(api("views/v1/teams")))
            .and(body_json(json!({ "name": name })))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut desired = remembered_view();
    for name in ["Charlie", "Alpha", "Bravo"] {
        let mut team = Team::new(name);
        team.role = String::new();
        desired.teams.push(team);
    }

    let err = provider.views().update(&remembered_view(), &desired).await.unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("2 teams created before error"), "{message}");
    assert!(message.contains("creating team 'Charlie'"), "{message}");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn unknown_application_aborts_team_creation() {
    let (server, provider) = setup().await;
    respond(&server, "POST", "views/v1/teams", 201, json!({ "id": "t1" })).await;
    respond(&server, "GET", "views/v1/applications", 200, json!([])).await;

    let mut desired = remembered_view();
    let mut team = Team::new("Blue");
    team.role = String::new();
    team.app_instances = vec![AppInstance::new("Wiki", 1.0)];
    desired.teams.push(team);

    let err = provider.views().update(&remembered_view(), &desired).await.unwrap_err();
    match err.root() {
        CoreError::UnresolvedReference { kind, name, .. } => {
            assert_eq!(*kind, ReferenceKind::Application);
            assert_eq!(name, "Wiki");
        }
        other => panic!("expected unresolved application, got: {other:?}"),
    }
    assert!(err.to_string().contains("application 'Wiki' not found in view v1"));
}

// ── Create / read / delete ──────────────────────────────────────────

#[tokio::test]
async fn create_posts_view_then_contents() {
    let (server, provider) = setup().await;
    Mock::given(method("POST"))
        .and(path(api("views")))
        .and(body_json(json!({
            "name": "Exercise",
            "description": "Spring exercise",
            "status": "Active",
            "createAdminTeam": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "v9" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api("views/v9/applications")))
        .and(body_json(json!({ "name": "Wiki", "url": "https://wiki", "viewId": "v9" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "a1" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut desired = View::new("Exercise");
    desired.description = Some("Spring exercise".into());
    let mut wiki = Application::new("Wiki");
    wiki.url = Some("https://wiki".into());
    desired.applications.push(wiki);

    let created = provider.views().create(&desired).await.unwrap();
    assert_eq!(created.id.as_deref(), Some("v9"));
    assert_eq!(created.applications[0].id.as_deref(), Some("a1"));
}

#[tokio::test]
async fn read_sorts_teams_and_hides_admin() {
    let (server, provider) = setup().await;
    respond(&server, "GET", "views/v1", 200, json!({ "id": "v1", "name": "Exercise", "status": "Active" })).await;
    respond(&server, "GET", "views/v1/applications", 200, json!([{ "id": "a1", "name": "Wiki" }])).await;
    respond(
        &server,
        "GET",
        "views/v1/teams",
        200,
        json!([
            { "id": "tz", "name": "Zebra", "roleName": "View Member", "permissions": [] },
            { "id": "tad", "name": "Admin", "roleName": "View Admin", "permissions": [] },
            { "id": "ta", "name": "Alpha", "roleName": "View Member", "permissions": [{ "id": "p1" }] }
        ]),
    )
    .await;
    for team in ["tz", "tad"] {
        respond(&server, "GET", &format!("teams/{team}/users"), 200, json!([])).await;
        respond(&server, "GET", &format!("teams/{team}/application-instances"), 200, json!([])).await;
    }
    respond(&server, "GET", "permissions/p1", 200, json!({ "id": "p1", "name": "ViewAdmin" })).await;
    respond(&server, "GET", "teams/ta/users", 200, json!([{ "id": "u1" }])).await;
    respond(&server, "GET", "users/u1/views/v1/team-memberships", 200, json!([{ "id": "m1", "teamId": "ta" }])).await;
    respond(
        &server,
        "GET",
        "team-memberships/m1",
        200,
        json!({ "id": "m1", "teamId": "ta", "userId": "u1", "roleName": "Observer" }),
    )
    .await;
    respond(
        &server,
        "GET",
        "teams/ta/application-instances",
        200,
        json!([{ "id": "i1", "applicationId": "a1", "displayOrder": 1 }]),
    )
    .await;

    let view = provider.views().read("v1", None).await.unwrap().unwrap();
    let names: Vec<&str> = view.teams.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Zebra"]);
    let alpha = &view.teams[0];
    assert_eq!(alpha.permissions, vec!["ViewAdmin".to_string()]);
    assert_eq!(alpha.users, vec![TeamUser::new("u1").with_role("Observer")]);
    assert_eq!(alpha.app_instances, vec![instance(Some("i1"), "Wiki", 1.0)]);
    assert!(view.create_admin_team);
}

#[tokio::test]
async fn read_of_deleted_view_is_none() {
    let (server, provider) = setup().await;
    respond(&server, "GET", "views/v1", 404, json!({ "title": "Not Found" })).await;
    assert!(provider.views().read("v1", None).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_tolerates_missing_view() {
    let (server, provider) = setup().await;
    respond(&server, "DELETE", "views/v1", 404, json!({})).await;
    provider.views().delete("v1").await.unwrap();
}
