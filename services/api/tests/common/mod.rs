//! Shared test harness: an in-memory implementation of the `DatabaseService`
//! port, a fixed clock, and helpers for driving the router without a network
//! socket or a real Postgres.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing::Level;
use uuid::Uuid;

use api_lib::config::Config;
use api_lib::web::{self, state::AppState};
use foodshare_core::achievements::AchievementDef;
use foodshare_core::domain::{
    Achievement, AuthSession, Donation, DonationStatus, FoodItem, FoodStatus, User,
    UserCredentials,
};
use foodshare_core::expiry::{Clock, FixedClock};
use foodshare_core::lifecycle;
use foodshare_core::ports::{DatabaseService, PortError, PortResult};

//=========================================================================================
// In-Memory Database
//=========================================================================================

#[derive(Default)]
struct Inner {
    users: Vec<UserCredentials>,
    sessions: HashMap<String, AuthSession>,
    items: HashMap<Uuid, FoodItem>,
    donations: HashMap<Uuid, Donation>,
    achievements: Vec<Achievement>,
}

/// All operations run under one mutex, so conditional transitions behave
/// like the adapter's compare-and-set writes. Time comes from the same
/// injected clock the application runs on, never the wall clock.
pub struct InMemoryDb {
    inner: Mutex<Inner>,
    clock: Arc<FixedClock>,
    fail_awards: AtomicBool,
}

impl InMemoryDb {
    pub fn new(clock: Arc<FixedClock>) -> Self {
        Self {
            inner: Mutex::default(),
            clock,
            fail_awards: AtomicBool::new(false),
        }
    }

    /// Makes `award_achievement` fail, for exercising the award side-channel.
    pub fn fail_awards(&self, fail: bool) {
        self.fail_awards.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(PortError::Conflict("email is already registered".to_string()));
        }
        let creds = UserCredentials {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        inner.users.push(creds.clone());
        Ok(User {
            user_id: creds.user_id,
            email: creds.email,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User with email {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.insert(
            session_id.to_string(),
            AuthSession {
                id: session_id.to_string(),
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let inner = self.inner.lock().unwrap();
        inner
            .sessions
            .get(session_id)
            .filter(|s| s.expires_at > self.clock.now())
            .map(|s| s.user_id)
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.inner.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }

    async fn create_food_item(&self, item: FoodItem) -> PortResult<FoodItem> {
        let mut inner = self.inner.lock().unwrap();
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get_food_item(&self, item_id: Uuid) -> PortResult<FoodItem> {
        let inner = self.inner.lock().unwrap();
        inner
            .items
            .get(&item_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Food item {} not found", item_id)))
    }

    async fn list_food_items(&self, owner_id: Uuid) -> PortResult<Vec<FoodItem>> {
        let inner = self.inner.lock().unwrap();
        let mut items: Vec<FoodItem> = inner
            .items
            .values()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| (i.expiry_date, i.created_at));
        Ok(items)
    }

    async fn list_expiring_items(
        &self,
        owner_id: Uuid,
        cutoff: NaiveDate,
    ) -> PortResult<Vec<FoodItem>> {
        let inner = self.inner.lock().unwrap();
        let mut items: Vec<FoodItem> = inner
            .items
            .values()
            .filter(|i| {
                i.owner_id == owner_id
                    && i.status == FoodStatus::Active
                    && i.expiry_date <= cutoff
            })
            .cloned()
            .collect();
        items.sort_by_key(|i| i.expiry_date);
        Ok(items)
    }

    async fn set_food_status(
        &self,
        item_id: Uuid,
        owner_id: Uuid,
        new_status: FoodStatus,
        at: DateTime<Utc>,
    ) -> PortResult<FoodItem> {
        let mut inner = self.inner.lock().unwrap();
        let item = inner
            .items
            .get_mut(&item_id)
            .ok_or_else(|| PortError::NotFound(format!("Food item {} not found", item_id)))?;
        if item.owner_id != owner_id {
            return Err(PortError::Unauthorized);
        }
        lifecycle::validate_item_transition(item.status, new_status)
            .map_err(PortError::from)?;
        item.status = new_status;
        item.status_changed_at = Some(at);
        Ok(item.clone())
    }

    async fn list_terminal_items(&self, owner_id: Uuid) -> PortResult<Vec<FoodItem>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .items
            .values()
            .filter(|i| i.owner_id == owner_id && i.status.is_terminal())
            .cloned()
            .collect())
    }

    async fn count_items_with_status(
        &self,
        owner_id: Uuid,
        status: FoodStatus,
    ) -> PortResult<u32> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .items
            .values()
            .filter(|i| i.owner_id == owner_id && i.status == status)
            .count() as u32)
    }

    async fn create_donation(&self, donation: Donation) -> PortResult<Donation> {
        let mut inner = self.inner.lock().unwrap();
        inner.donations.insert(donation.id, donation.clone());
        Ok(donation)
    }

    async fn get_donation(&self, donation_id: Uuid) -> PortResult<Donation> {
        let inner = self.inner.lock().unwrap();
        inner
            .donations
            .get(&donation_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Donation {} not found", donation_id)))
    }

    async fn list_available_donations(&self) -> PortResult<Vec<Donation>> {
        let inner = self.inner.lock().unwrap();
        let mut donations: Vec<Donation> = inner
            .donations
            .values()
            .filter(|d| d.status == DonationStatus::Available)
            .cloned()
            .collect();
        donations.sort_by_key(|d| std::cmp::Reverse(d.created_at));
        Ok(donations)
    }

    async fn list_donations_by_donor(&self, donor_id: Uuid) -> PortResult<Vec<Donation>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .donations
            .values()
            .filter(|d| d.donor_id == donor_id)
            .cloned()
            .collect())
    }

    async fn list_donations_by_claimant(
        &self,
        claimant_id: Uuid,
    ) -> PortResult<Vec<Donation>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .donations
            .values()
            .filter(|d| d.claimant_id == Some(claimant_id))
            .cloned()
            .collect())
    }

    async fn count_donations_by_donor(&self, donor_id: Uuid) -> PortResult<u32> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .donations
            .values()
            .filter(|d| d.donor_id == donor_id)
            .count() as u32)
    }

    async fn claim_donation(
        &self,
        donation_id: Uuid,
        claimant_id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<Donation> {
        // Check and assign under one lock, like the adapter's conditional UPDATE.
        let mut inner = self.inner.lock().unwrap();
        let donation = inner
            .donations
            .get_mut(&donation_id)
            .ok_or_else(|| PortError::NotFound(format!("Donation {} not found", donation_id)))?;
        lifecycle::validate_claim(donation, claimant_id).map_err(PortError::from)?;
        donation.status = DonationStatus::Claimed;
        donation.claimant_id = Some(claimant_id);
        donation.claimed_at = Some(at);
        Ok(donation.clone())
    }

    async fn mark_delivered(
        &self,
        donation_id: Uuid,
        actor_id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<Donation> {
        let mut inner = self.inner.lock().unwrap();
        let donation = inner
            .donations
            .get_mut(&donation_id)
            .ok_or_else(|| PortError::NotFound(format!("Donation {} not found", donation_id)))?;
        lifecycle::validate_deliver(donation, actor_id).map_err(PortError::from)?;
        donation.status = DonationStatus::Delivered;
        donation.delivered_at = Some(at);
        Ok(donation.clone())
    }

    async fn award_achievement(
        &self,
        user_id: Uuid,
        def: &AchievementDef,
        at: DateTime<Utc>,
    ) -> PortResult<()> {
        if self.fail_awards.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("award store unavailable".to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        let already = inner
            .achievements
            .iter()
            .any(|a| a.user_id == user_id && a.name == def.name);
        if !already {
            inner.achievements.push(Achievement {
                id: Uuid::new_v4(),
                user_id,
                kind: def.kind.to_string(),
                name: def.name.to_string(),
                description: def.description.to_string(),
                earned_at: at,
            });
        }
        Ok(())
    }

    async fn list_achievements(&self, user_id: Uuid) -> PortResult<Vec<Achievement>> {
        let inner = self.inner.lock().unwrap();
        let mut earned: Vec<Achievement> = inner
            .achievements
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        earned.sort_by_key(|a| a.earned_at);
        Ok(earned)
    }
}

//=========================================================================================
// Test Application
//=========================================================================================

pub struct TestApp {
    pub router: Router,
    pub clock: Arc<FixedClock>,
    pub db: Arc<InMemoryDb>,
}

/// Builds the full router over the in-memory database and a clock fixed at
/// 2025-03-01 12:00 UTC.
pub fn test_app() -> TestApp {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
    ));
    let config = Arc::new(Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: String::new(),
        log_level: Level::INFO,
        cors_origin: "http://localhost:3000".to_string(),
        session_ttl_days: 30,
        trend_months: 6,
        expiring_window_days: 3,
    });
    let db = Arc::new(InMemoryDb::new(clock.clone()));
    let state = Arc::new(AppState {
        db: db.clone(),
        config,
        clock: clock.clone(),
    });
    TestApp {
        router: web::router(state),
        clock,
        db,
    }
}

//=========================================================================================
// Request Helpers
//=========================================================================================

async fn send(
    router: &Router,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn post_json(
    router: &Router,
    cookie: Option<&str>,
    path: &str,
    body: Value,
) -> (StatusCode, Value) {
    send(router, "POST", path, cookie, Some(body)).await
}

pub async fn post_empty(
    router: &Router,
    cookie: Option<&str>,
    path: &str,
) -> (StatusCode, Value) {
    send(router, "POST", path, cookie, None).await
}

pub async fn get_json(router: &Router, cookie: Option<&str>, path: &str) -> (StatusCode, Value) {
    send(router, "GET", path, cookie, None).await
}

/// Creates an account and returns the session cookie for it.
pub async fn signup(router: &Router, email: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/auth/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "email": email, "password": "correct-horse" }).to_string(),
        ))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "signup failed");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("signup must set a session cookie")
        .to_str()
        .unwrap();
    set_cookie
        .split(';')
        .next()
        .expect("cookie attribute")
        .to_string()
}
