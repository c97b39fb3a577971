//! # Integration Tests for reslet-api
//!
//! Drives the assembled router end-to-end: the Google login round-trip
//! (against the stub identity provider), identity resolution, session and
//! role gating, application intake, mailbox invariants, payments, the
//! contact form, and the operational endpoints.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;

use reslet_api::state::{AppState, ApplicationStatus, PropertyRecord, UserRecord};
use reslet_core::{EmailAddress, PropertyId, Role, UserId};
use reslet_upstream::stub::{StubEmailSender, StubIdentityProvider, StubPaymentGateway};
use reslet_upstream::{CardPayment, GoogleProfile};

/// Test fixture: state with all three collaborators stubbed, plus handles
/// to the stubs for seeding and assertions.
struct Fixture {
    state: AppState,
    google: Arc<StubIdentityProvider>,
    payments: Arc<StubPaymentGateway>,
    email: Arc<StubEmailSender>,
}

fn fixture() -> Fixture {
    let mut state = AppState::new();
    state.config.contact_inbox = Some("inbox@reslet.example".to_string());

    let google = Arc::new(StubIdentityProvider::new());
    let payments = Arc::new(StubPaymentGateway::new());
    let email = Arc::new(StubEmailSender::new());

    state.google = Some(google.clone());
    state.payments = Some(payments.clone());
    state.email = Some(email.clone());

    Fixture {
        state,
        google,
        payments,
        email,
    }
}

fn app(fx: &Fixture) -> axum::Router {
    reslet_api::app(fx.state.clone())
}

/// Insert a user directly and mint a session cookie for it.
fn login_as(state: &AppState, name: &str, email: &str, role: Role) -> (UserRecord, String) {
    let user = UserRecord {
        id: UserId::new(),
        google_id: None,
        name: name.to_string(),
        email: EmailAddress::new(email).unwrap(),
        role,
        created_at: Utc::now(),
    };
    state.users.insert(user.clone());
    let token = state.sessions.create(user.id);
    (user, format!("reslet_session={token}"))
}

fn seed_property(state: &AppState) -> PropertyRecord {
    let record = PropertyRecord {
        id: PropertyId::new(),
        address: "14 Harcourt Terrace, Flat 2".to_string(),
        price: 95_000,
        bedrooms: 2,
        bathrooms: 1,
        image_url: None,
        created_at: Utc::now(),
    };
    state.properties.insert(record.id, record.clone());
    record
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &axum::http::Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect must carry Location")
        .to_str()
        .unwrap()
}

// -- Operational endpoints ----------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let fx = fixture();
    let response = app(&fx).oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_probe_memory_only() {
    let fx = fixture();
    let response = app(&fx).oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_spec_is_served() {
    let fx = fixture();
    let response = app(&fx).oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert!(spec["paths"]["/tenant-dashboard"].is_object());
}

#[tokio::test]
async fn test_metrics_endpoint_reports_domain_gauges() {
    let fx = fixture();
    seed_property(&fx.state);
    login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);

    let response = app(&fx).oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("reslet_properties_total 1"));
    assert!(text.contains("reslet_sessions_active 1"));
}

// -- Login flow ---------------------------------------------------------------

#[tokio::test]
async fn test_login_page_advertises_google_when_configured() {
    let fx = fixture();
    let response = app(&fx).oneshot(get("/resident-login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["google_login"], "/auth/google");
}

#[tokio::test]
async fn test_login_page_echoes_error_flag() {
    let fx = fixture();
    let response = app(&fx)
        .oneshot(get("/resident-login?error=forbidden"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_start_login_returns_503_without_provider() {
    let mut state = AppState::new();
    state.google = None;
    let response = reslet_api::app(state)
        .oneshot(get("/auth/google"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

/// Walk the full round-trip: /auth/google mints a state token, the
/// callback exchanges the code, and the session cookie opens the
/// role-appropriate dashboard.
async fn complete_login(fx: &Fixture, code: &str) -> (StatusCode, Option<String>, String) {
    let start = app(fx).oneshot(get("/auth/google")).await.unwrap();
    assert_eq!(start.status(), StatusCode::SEE_OTHER);
    let authorize_url = location(&start).to_string();
    let state_token = authorize_url
        .split("state=")
        .nth(1)
        .expect("authorize URL carries state")
        .to_string();

    let callback = app(fx)
        .oneshot(get(&format!(
            "/auth/google/callback?code={code}&state={state_token}"
        )))
        .await
        .unwrap();
    let status = callback.status();
    let target = location(&callback).to_string();
    let cookie = callback
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_string());
    (status, cookie, target)
}

#[tokio::test]
async fn test_first_login_creates_tenant_and_opens_dashboard() {
    let fx = fixture();
    fx.google.register_code(
        "code-1",
        GoogleProfile {
            subject: "sub-1".into(),
            email: EmailAddress::new("jane@example.com").unwrap(),
            name: "Jane Doe".into(),
        },
    );

    let (status, cookie, target) = complete_login(&fx, "code-1").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(target, "/tenant-dashboard");
    assert_eq!(fx.state.users.len(), 1, "exactly one user created");

    let cookie = cookie.expect("callback must set the session cookie");
    let response = app(&fx)
        .oneshot(get_with_cookie("/tenant-dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "jane@example.com");
    assert_eq!(body["user"]["role"], "tenant");
}

#[tokio::test]
async fn test_repeated_login_resolves_to_same_user() {
    let fx = fixture();
    let profile = GoogleProfile {
        subject: "sub-1".into(),
        email: EmailAddress::new("jane@example.com").unwrap(),
        name: "Jane Doe".into(),
    };
    fx.google.register_code("code-1", profile.clone());
    fx.google.register_code("code-2", profile);

    complete_login(&fx, "code-1").await;
    complete_login(&fx, "code-2").await;
    assert_eq!(fx.state.users.len(), 1, "repeat login must not duplicate");
}

#[tokio::test]
async fn test_login_with_matching_email_attaches_to_existing_account() {
    let fx = fixture();
    // Operator-provisioned landlord who has never used Google.
    let (landlord, _) = login_as(&fx.state, "Lana", "lana@example.com", Role::Landlord);
    fx.google.register_code(
        "code-1",
        GoogleProfile {
            subject: "sub-9".into(),
            email: EmailAddress::new("lana@example.com").unwrap(),
            name: "Lana G".into(),
        },
    );

    let (_, _, target) = complete_login(&fx, "code-1").await;
    // Attached to the landlord account, so the landlord dashboard.
    assert_eq!(target, "/landlord-dashboard");
    assert_eq!(fx.state.users.len(), 1, "no duplicate account");
    let resolved = fx.state.users.get(&landlord.id).unwrap();
    assert_eq!(resolved.google_id.as_deref(), Some("sub-9"));
}

#[tokio::test]
async fn test_callback_with_unknown_state_redirects_with_error() {
    let fx = fixture();
    let response = app(&fx)
        .oneshot(get("/auth/google/callback?code=x&state=forged"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/resident-login?error=oauth");
    assert_eq!(fx.state.sessions.active_count(), 0, "no session on failure");
}

#[tokio::test]
async fn test_callback_with_failed_exchange_redirects_with_error() {
    let fx = fixture();
    // Valid state token, but the stub does not know this code.
    let start = app(&fx).oneshot(get("/auth/google")).await.unwrap();
    let state_token = location(&start).split("state=").nth(1).unwrap().to_string();
    let response = app(&fx)
        .oneshot(get(&format!(
            "/auth/google/callback?code=wrong&state={state_token}"
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/resident-login?error=oauth");
    assert_eq!(fx.state.users.len(), 0);
}

#[tokio::test]
async fn test_callback_with_provider_denial_redirects_with_error() {
    let fx = fixture();
    let response = app(&fx)
        .oneshot(get("/auth/google/callback?error=access_denied"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/resident-login?error=oauth");
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let fx = fixture();
    let (_, cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);

    let response = app(&fx)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/resident-login");
    assert!(response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("Expires=Thu, 01 Jan 1970"));

    // The old cookie no longer opens the dashboard.
    let response = app(&fx)
        .oneshot(get_with_cookie("/tenant-dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/resident-login");
}

// -- Access control gate ------------------------------------------------------

#[tokio::test]
async fn test_protected_routes_redirect_anonymous_to_login() {
    let fx = fixture();
    for uri in ["/tenant-dashboard", "/landlord-dashboard", "/mailbox"] {
        let response = app(&fx).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "route {uri}");
        assert_eq!(location(&response), "/resident-login", "route {uri}");
    }
}

#[tokio::test]
async fn test_tenant_session_cannot_open_landlord_dashboard() {
    let fx = fixture();
    let (_, cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);
    let response = app(&fx)
        .oneshot(get_with_cookie("/landlord-dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/resident-login?error=forbidden");
}

#[tokio::test]
async fn test_landlord_session_cannot_open_tenant_dashboard() {
    let fx = fixture();
    let (_, cookie) = login_as(&fx.state, "Lana", "lana@example.com", Role::Landlord);
    let response = app(&fx)
        .oneshot(get_with_cookie("/tenant-dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/resident-login?error=forbidden");
}

#[tokio::test]
async fn test_garbage_cookie_is_anonymous() {
    let fx = fixture();
    let response = app(&fx)
        .oneshot(get_with_cookie("/mailbox", "reslet_session=deadbeef"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

// -- Properties ---------------------------------------------------------------

#[tokio::test]
async fn test_properties_list_and_get() {
    let fx = fixture();
    let property = seed_property(&fx.state);

    let response = app(&fx).oneshot(get("/properties")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = app(&fx)
        .oneshot(get(&format!("/properties/{}", property.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(&fx)
        .oneshot(get(&format!("/properties/{}", PropertyId::new())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Applications -------------------------------------------------------------

fn application_body(property_id: &PropertyId) -> serde_json::Value {
    serde_json::json!({
        "property_id": property_id.to_string(),
        "full_name": "Jane Doe",
        "contact_number": "07000000000",
        "email": "jane@example.com",
        "employer_name": "Acme Ltd",
        "job_title": "Engineer",
        "monthly_income": 320000,
        "length_of_stay": 12,
        "number_of_occupants": 2,
        "pets": false,
        "emergency_contact": "John Doe",
        "emergency_contact_number": "07111111111"
    })
}

#[tokio::test]
async fn test_application_submission_creates_pending_row() {
    let fx = fixture();
    let property = seed_property(&fx.state);
    let (tenant, cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);

    let response = app(&fx)
        .oneshot(post_json(
            "/tenant-dashboard/applications",
            Some(&cookie),
            application_body(&property.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["tenant_id"], tenant.id.to_string());

    let stored = fx.state.applications.list();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].tenant_id, tenant.id);
    assert_eq!(stored[0].status, ApplicationStatus::Pending);
}

#[tokio::test]
async fn test_application_for_missing_property_is_rejected() {
    let fx = fixture();
    let (_, cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);

    let response = app(&fx)
        .oneshot(post_json(
            "/tenant-dashboard/applications",
            Some(&cookie),
            application_body(&PropertyId::new()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(fx.state.applications.list().is_empty());
}

#[tokio::test]
async fn test_application_with_invalid_fields_is_rejected() {
    let fx = fixture();
    let property = seed_property(&fx.state);
    let (_, cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);

    let mut body = application_body(&property.id);
    body["length_of_stay"] = serde_json::json!(0);
    let response = app(&fx)
        .oneshot(post_json(
            "/tenant-dashboard/applications",
            Some(&cookie),
            body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(fx.state.applications.list().is_empty());
}

#[tokio::test]
async fn test_landlord_reviews_application() {
    let fx = fixture();
    let property = seed_property(&fx.state);
    let (_, tenant_cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);
    let (_, landlord_cookie) = login_as(&fx.state, "Lana", "lana@example.com", Role::Landlord);

    let response = app(&fx)
        .oneshot(post_json(
            "/tenant-dashboard/applications",
            Some(&tenant_cookie),
            application_body(&property.id),
        ))
        .await
        .unwrap();
    let application = body_json(response).await;
    let id = application["id"].as_str().unwrap();

    let response = app(&fx)
        .oneshot(post_json(
            &format!("/landlord-dashboard/applications/{id}/status"),
            Some(&landlord_cookie),
            serde_json::json!({"status": "Approved"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Approved");

    // Setting it back to Pending is not a verdict.
    let response = app(&fx)
        .oneshot(post_json(
            &format!("/landlord-dashboard/applications/{id}/status"),
            Some(&landlord_cookie),
            serde_json::json!({"status": "Pending"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Unknown application id.
    let response = app(&fx)
        .oneshot(post_json(
            &format!(
                "/landlord-dashboard/applications/{}/status",
                uuid::Uuid::new_v4()
            ),
            Some(&landlord_cookie),
            serde_json::json!({"status": "Declined"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Tenant linking -----------------------------------------------------------

#[tokio::test]
async fn test_landlord_links_tenant_by_email() {
    let fx = fixture();
    let (tenant, _) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);
    let (_, landlord_cookie) = login_as(&fx.state, "Lana", "lana@example.com", Role::Landlord);

    let response = app(&fx)
        .oneshot(post_json(
            "/landlord-dashboard/tenants",
            Some(&landlord_cookie),
            serde_json::json!({"email": "jane@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate pair conflicts.
    let response = app(&fx)
        .oneshot(post_json(
            "/landlord-dashboard/tenants",
            Some(&landlord_cookie),
            serde_json::json!({"email": "jane@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Unknown email.
    let response = app(&fx)
        .oneshot(post_json(
            "/landlord-dashboard/tenants",
            Some(&landlord_cookie),
            serde_json::json!({"email": "nobody@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The linked tenant appears on the dashboard.
    let response = app(&fx)
        .oneshot(get_with_cookie("/landlord-dashboard", &landlord_cookie))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["tenants"][0]["id"], tenant.id.to_string());
}

// -- Mailbox ------------------------------------------------------------------

#[tokio::test]
async fn test_mailbox_send_to_missing_receiver_inserts_nothing() {
    let fx = fixture();
    let (_, cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);

    let response = app(&fx)
        .oneshot(post_json(
            "/mailbox/send",
            Some(&cookie),
            serde_json::json!({
                "receiver_id": uuid::Uuid::new_v4().to_string(),
                "subject": "Hello",
                "body": "Anyone there?"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(fx.state.messages.len(), 0, "no row on rejected send");
}

#[tokio::test]
async fn test_mailbox_send_and_receive() {
    let fx = fixture();
    let (tenant, tenant_cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);
    let (landlord, landlord_cookie) =
        login_as(&fx.state, "Lana", "lana@example.com", Role::Landlord);

    let response = app(&fx)
        .oneshot(post_json(
            "/mailbox/send",
            Some(&tenant_cookie),
            serde_json::json!({
                "receiver_id": landlord.id.to_string(),
                "subject": "Boiler",
                "body": "The boiler is leaking."
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let sent = body_json(response).await;
    assert_eq!(sent["sender_id"], tenant.id.to_string());
    assert_eq!(fx.state.messages.len(), 1, "exactly one row inserted");

    // The landlord sees it in their inbox, with names resolved.
    let response = app(&fx)
        .oneshot(get_with_cookie("/mailbox", &landlord_cookie))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["inbox"][0]["subject"], "Boiler");
    assert_eq!(body["inbox"][0]["sender_name"], "Jane");
    assert_eq!(body["sent"].as_array().unwrap().len(), 0);

    // The tenant sees it under sent.
    let response = app(&fx)
        .oneshot(get_with_cookie("/mailbox", &tenant_cookie))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["sent"][0]["receiver_name"], "Lana");
}

#[tokio::test]
async fn test_mailbox_orders_newest_first() {
    let fx = fixture();
    let (_, tenant_cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);
    let (landlord, _) = login_as(&fx.state, "Lana", "lana@example.com", Role::Landlord);

    for subject in ["first", "second", "third"] {
        let response = app(&fx)
            .oneshot(post_json(
                "/mailbox/send",
                Some(&tenant_cookie),
                serde_json::json!({
                    "receiver_id": landlord.id.to_string(),
                    "subject": subject,
                    "body": "x"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        // Distinct timestamps for a deterministic order.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let response = app(&fx)
        .oneshot(get_with_cookie("/mailbox", &tenant_cookie))
        .await
        .unwrap();
    let body = body_json(response).await;
    let subjects: Vec<_> = body["sent"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["subject"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(subjects, vec!["third", "second", "first"]);
}

// -- Payments -----------------------------------------------------------------

#[tokio::test]
async fn test_payment_history_is_filtered_to_session_email() {
    let fx = fixture();
    let (_, cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);
    fx.payments.push_payment(CardPayment {
        customer_email: "jane@example.com".into(),
        amount: Some("950.00".into()),
        currency: Some("GBP".into()),
        extra: Default::default(),
    });
    fx.payments.push_payment(CardPayment {
        customer_email: "other@example.com".into(),
        amount: Some("1200.00".into()),
        currency: Some("GBP".into()),
        extra: Default::default(),
    });

    let response = app(&fx)
        .oneshot(get_with_cookie("/tenant-dashboard/payments", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let payments = body["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["customer_email"], "jane@example.com");
}

#[tokio::test]
async fn test_payment_submission_binds_session_email() {
    let fx = fixture();
    let (_, cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);

    let response = app(&fx)
        .oneshot(post_json(
            "/tenant-dashboard/payments",
            Some(&cookie),
            serde_json::json!({
                "card_number": "4242 4242 4242 4242",
                "card_holder_name": "Jane Doe",
                "expiry_date": "12/29",
                "cvv": "123",
                "amount": "950.00",
                "currency": "gbp"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let submissions = fx.payments.submissions();
    assert_eq!(submissions.len(), 1);
    // Email comes from the session, currency is normalized.
    assert_eq!(submissions[0].customer_email, "jane@example.com");
    assert_eq!(submissions[0].currency, "GBP");
}

#[tokio::test]
async fn test_payment_routes_503_when_unconfigured() {
    let fx = fixture();
    let mut state = fx.state.clone();
    state.payments = None;
    let (_, cookie) = login_as(&state, "Jane", "jane@example.com", Role::Tenant);
    let response = reslet_api::app(state)
        .oneshot(get_with_cookie("/tenant-dashboard/payments", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_payment_upstream_failure_is_502() {
    let fx = fixture();
    let (_, cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);
    fx.payments.set_failing(true);
    let response = app(&fx)
        .oneshot(get_with_cookie("/tenant-dashboard/payments", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// -- Contact form -------------------------------------------------------------

#[tokio::test]
async fn test_contact_form_relays_email() {
    let fx = fixture();
    let response = app(&fx)
        .oneshot(post_json(
            "/send-email",
            None,
            serde_json::json!({
                "name": "Visitor",
                "email": "visitor@example.com",
                "subject": "Viewing",
                "message": "Is the flat still available?"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // Delivery is fire-and-forget on a spawned task; give it a beat.
    for _ in 0..50 {
        if !fx.email.sent().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    let sent = fx.email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "inbox@reslet.example");
    assert_eq!(sent[0].reply_to, "visitor@example.com");
    assert!(sent[0].subject.contains("Viewing"));
}

#[tokio::test]
async fn test_contact_form_validates_input() {
    let fx = fixture();
    let response = app(&fx)
        .oneshot(post_json(
            "/send-email",
            None,
            serde_json::json!({
                "name": "",
                "email": "visitor@example.com",
                "subject": "x",
                "message": "y"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(fx.email.sent().is_empty());
}

#[tokio::test]
async fn test_contact_form_503_when_unconfigured() {
    let mut state = AppState::new();
    state.email = None;
    let response = reslet_api::app(state)
        .oneshot(post_json(
            "/send-email",
            None,
            serde_json::json!({
                "name": "Visitor",
                "email": "visitor@example.com",
                "subject": "Viewing",
                "message": "Hello"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// -- Dashboards ---------------------------------------------------------------

#[tokio::test]
async fn test_tenant_dashboard_aggregates_links_and_applications() {
    let fx = fixture();
    let property = seed_property(&fx.state);
    let (tenant, tenant_cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);
    let (landlord, landlord_cookie) =
        login_as(&fx.state, "Lana", "lana@example.com", Role::Landlord);

    // Landlord links the tenant; tenant applies for the property.
    app(&fx)
        .oneshot(post_json(
            "/landlord-dashboard/tenants",
            Some(&landlord_cookie),
            serde_json::json!({"email": "jane@example.com"}),
        ))
        .await
        .unwrap();
    app(&fx)
        .oneshot(post_json(
            "/tenant-dashboard/applications",
            Some(&tenant_cookie),
            application_body(&property.id),
        ))
        .await
        .unwrap();

    let response = app(&fx)
        .oneshot(get_with_cookie("/tenant-dashboard", &tenant_cookie))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["user"]["id"], tenant.id.to_string());
    assert_eq!(body["landlords"][0]["id"], landlord.id.to_string());
    assert_eq!(body["applications"][0]["status"], "Pending");
}

#[tokio::test]
async fn test_landlord_dashboard_lists_pending_first() {
    let fx = fixture();
    let property = seed_property(&fx.state);
    let (_, tenant_cookie) = login_as(&fx.state, "Jane", "jane@example.com", Role::Tenant);
    let (_, landlord_cookie) = login_as(&fx.state, "Lana", "lana@example.com", Role::Landlord);

    // Two applications; decline the first.
    let first = body_json(
        app(&fx)
            .oneshot(post_json(
                "/tenant-dashboard/applications",
                Some(&tenant_cookie),
                application_body(&property.id),
            ))
            .await
            .unwrap(),
    )
    .await;
    app(&fx)
        .oneshot(post_json(
            "/tenant-dashboard/applications",
            Some(&tenant_cookie),
            application_body(&property.id),
        ))
        .await
        .unwrap();
    app(&fx)
        .oneshot(post_json(
            &format!(
                "/landlord-dashboard/applications/{}/status",
                first["id"].as_str().unwrap()
            ),
            Some(&landlord_cookie),
            serde_json::json!({"status": "Declined"}),
        ))
        .await
        .unwrap();

    let response = app(&fx)
        .oneshot(get_with_cookie("/landlord-dashboard", &landlord_cookie))
        .await
        .unwrap();
    let body = body_json(response).await;
    let applications = body["applications"].as_array().unwrap();
    assert_eq!(applications.len(), 2);
    assert_eq!(applications[0]["status"], "Pending");
    assert_eq!(applications[1]["status"], "Declined");
}
