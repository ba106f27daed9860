//! Session state for the e-Residency flow.
//!
//! [`Session`] is the single owner of the signed-in user, their application
//! and their business record for the lifetime of the program. Every change
//! is mirrored to a [`LocalStore`] so the next start can rehydrate it.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::domain::{
    derive_display_name, generate_token, Application, ApplicationDraft, ApplicationStatus, Business,
    BusinessDraft, User,
};
use crate::infrastructure::{LocalStore, StoreError, APPLICATION_KEY, BUSINESS_KEY, USER_KEY};

/// Minimum password length accepted by mock sign-in.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Identity returned by the federated sign-in stand-in.
pub const FEDERATED_EMAIL: &str = "user@gmail.com";
pub const FEDERATED_NAME: &str = "Tenzin Norbu";
pub const FEDERATED_ID_PREFIX: &str = "gmail_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig {
    /// Simulated network latency applied to both sign-in operations
    pub login_delay: Duration,
}

/// How far through the flow the current session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    NoUser,
    LoggedIn,
    HasApplication,
    HasBusiness,
}

/// An owned copy of everything the session holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub application: Option<Application>,
    pub business: Option<Business>,
}

/// Holds the session records and keeps them in sync with a store.
///
/// # Examples
///
/// ```
/// use eresidency::application::{Session, SessionConfig};
/// use eresidency::infrastructure::MemoryStore;
///
/// let runtime = tokio::runtime::Builder::new_current_thread()
///     .enable_time()
///     .build()
///     .unwrap();
/// let mut session = Session::new(MemoryStore::new(), SessionConfig::default());
///
/// assert!(runtime.block_on(session.login("ps@example.com", "secret1")));
/// assert_eq!(session.user().unwrap().name, "Ps");
///
/// session.logout();
/// assert!(session.user().is_none());
/// ```
#[derive(Debug)]
pub struct Session<S: LocalStore> {
    store: S,
    config: SessionConfig,
    user: Option<User>,
    application: Option<Application>,
    business: Option<Business>,
}

impl<S: LocalStore> Session<S> {
    /// Creates the session and rehydrates it from `store`.
    ///
    /// Values that are missing or do not parse into the expected record
    /// are treated as absent. An application without a user, or a business
    /// without its application, is dropped and removed from the store.
    pub fn new(store: S, config: SessionConfig) -> Self {
        let user = load::<User, _>(&store, USER_KEY);
        let mut application = load::<Application, _>(&store, APPLICATION_KEY);
        let mut business = load::<Business, _>(&store, BUSINESS_KEY);

        // Records are only kept when everything they depend on was restored.
        if user.is_none() && application.take().is_some() {
            discard(&store, APPLICATION_KEY, "no stored user");
        }
        let owner = application.as_ref().map(|app| app.id_number.as_str());
        if business
            .as_ref()
            .is_some_and(|business| owner != Some(business.id_number.as_str()))
        {
            business = None;
            discard(&store, BUSINESS_KEY, "no matching application");
        }

        debug!(
            has_user = user.is_some(),
            has_application = application.is_some(),
            has_business = business.is_some(),
            "Session rehydrated"
        );

        Self {
            store,
            config,
            user,
            application,
            business,
        }
    }

    /// Mock password sign-in.
    ///
    /// Succeeds when `email` is non-empty and `password` is at least
    /// [`MIN_PASSWORD_LENGTH`] UTF-16 code units long, the way a browser
    /// measures string length. Failure leaves the session untouched.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        self.simulate_latency().await;

        if email.is_empty() || password.encode_utf16().count() < MIN_PASSWORD_LENGTH {
            info!("Login rejected");
            return false;
        }

        let user = User {
            email: email.to_string(),
            name: derive_display_name(email),
            id: generate_token(),
        };
        info!(user_id = %user.id, "User logged in");
        self.set_user(user);
        true
    }

    /// Stand-in for a third-party identity provider. Always succeeds.
    pub async fn login_with_gmail(&mut self) -> bool {
        self.simulate_latency().await;

        let user = User {
            email: FEDERATED_EMAIL.to_string(),
            name: FEDERATED_NAME.to_string(),
            id: format!("{FEDERATED_ID_PREFIX}{}", generate_token()),
        };
        info!(user_id = %user.id, "User logged in with federated identity");
        self.set_user(user);
        true
    }

    /// Clears the user, application and business, in memory and in the store.
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!(user_id = %user.id, "User logged out");
        }
        self.application = None;
        self.business = None;

        for key in [USER_KEY, APPLICATION_KEY, BUSINESS_KEY] {
            if let Err(e) = self.store.remove(key) {
                error!(key, error = %e, "Failed to remove stored value");
            }
        }
    }

    /// Records an application. Submissions are always approved.
    pub fn submit_application(&mut self, draft: ApplicationDraft) {
        let application = Application::from_draft(draft, ApplicationStatus::Approved);
        self.persist(APPLICATION_KEY, &application);
        info!(id_number = %application.id_number, "Application approved");
        self.application = Some(application);
    }

    /// Records a business registration. Registrations are always approved.
    pub fn submit_business(&mut self, draft: BusinessDraft) {
        let business = Business::from_draft(draft, true);
        self.persist(BUSINESS_KEY, &business);
        info!(company_id = %business.company_id, "Business registered");
        self.business = Some(business);
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn application(&self) -> Option<&Application> {
        self.application.as_ref()
    }

    pub fn business(&self) -> Option<&Business> {
        self.business.as_ref()
    }

    pub fn stage(&self) -> SessionStage {
        match (&self.user, &self.application, &self.business) {
            (None, _, _) => SessionStage::NoUser,
            (Some(_), None, _) => SessionStage::LoggedIn,
            (Some(_), Some(_), None) => SessionStage::HasApplication,
            (Some(_), Some(_), Some(_)) => SessionStage::HasBusiness,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user.clone(),
            application: self.application.clone(),
            business: self.business.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn set_user(&mut self, user: User) {
        self.persist(USER_KEY, &user);
        self.user = Some(user);
    }

    async fn simulate_latency(&self) {
        if !self.config.login_delay.is_zero() {
            tokio::time::sleep(self.config.login_delay).await;
        }
    }

    // Store failures are logged, the in-memory state is still updated.
    fn persist<T: Serialize>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(StoreError::from)
            .and_then(|json| self.store.set(key, &json));
        if let Err(e) = result {
            error!(key, error = %e, "Failed to persist value");
        }
    }
}

fn discard<S: LocalStore>(store: &S, key: &str, reason: &str) {
    warn!(key, reason, "Discarding orphaned stored value");
    if let Err(e) = store.remove(key) {
        error!(key, error = %e, "Failed to remove stored value");
    }
}

fn load<T: DeserializeOwned, S: LocalStore>(store: &S, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored value");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Discarding malformed stored value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CompanyType, Purpose};
    use crate::infrastructure::{FileStore, MemoryStore, StoreResult};
    use tempfile::tempdir;

    fn session() -> Session<MemoryStore> {
        Session::new(MemoryStore::new(), SessionConfig::default())
    }

    fn application_draft() -> ApplicationDraft {
        ApplicationDraft {
            full_name: "Pema Sherpa".to_string(),
            date_of_birth: "1990-04-12".to_string(),
            phone_number: "1234567890".to_string(),
            purpose_of_application: Purpose::Investment,
            id_number: "BT-001".to_string(),
        }
    }

    fn business_draft() -> BusinessDraft {
        BusinessDraft {
            full_name: "Pema Sherpa".to_string(),
            company_id: "DRUK42".to_string(),
            company_investment: "25000".to_string(),
            company_goal: "Sustainable tourism".to_string(),
            company_type: CompanyType::Partnership,
            id_number: "BT-001".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_accepts_minimal_credentials() {
        let mut session = session();
        assert!(session.login("ps@example.com", "secret1").await);

        let user = session.user().unwrap();
        assert_eq!(user.email, "ps@example.com");
        assert_eq!(user.name, "Ps");
        assert_eq!(user.id.len(), 9);
        assert_eq!(session.stage(), SessionStage::LoggedIn);

        let stored = session.store().get(USER_KEY).unwrap().unwrap();
        let stored: User = serde_json::from_str(&stored).unwrap();
        assert_eq!(&stored, user);
    }

    #[tokio::test]
    async fn test_login_accepts_any_password_of_six_or_more() {
        for password in ["123456", "abcdefgh", "      ", "p@ss w0rd!"] {
            let mut session = session();
            assert!(session.login("a@b.c", password).await, "{password:?}");
            assert!(session.user().is_some());
        }
    }

    #[tokio::test]
    async fn test_login_rejects_short_password() {
        for password in ["", "a", "12345"] {
            let mut session = session();
            assert!(!session.login("ps@example.com", password).await);
            assert!(session.user().is_none());
            assert!(session.store().is_empty());
        }
    }

    #[tokio::test]
    async fn test_login_rejects_empty_email() {
        let mut session = session();
        assert!(!session.login("", "secret1").await);
        assert_eq!(session.stage(), SessionStage::NoUser);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_user() {
        let mut session = session();
        assert!(session.login("ps@example.com", "secret1").await);
        let before = session.snapshot();

        assert!(!session.login("other@example.com", "123").await);
        assert_eq!(session.snapshot(), before);
    }

    #[tokio::test]
    async fn test_login_overwrites_previous_user() {
        let mut session = session();
        assert!(session.login("first@example.com", "secret1").await);
        assert!(session.login("second@example.com", "secret2").await);

        assert_eq!(session.user().unwrap().name, "Second");
        let stored = session.store().get(USER_KEY).unwrap().unwrap();
        let stored: User = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored.email, "second@example.com");
    }

    #[tokio::test]
    async fn test_login_with_gmail() {
        let mut session = session();
        assert!(session.login_with_gmail().await);

        let user = session.user().unwrap();
        assert_eq!(user.email, FEDERATED_EMAIL);
        assert_eq!(user.name, FEDERATED_NAME);
        assert!(user.id.starts_with(FEDERATED_ID_PREFIX));
        assert_eq!(user.id.len(), FEDERATED_ID_PREFIX.len() + 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_waits_for_configured_delay() {
        let config = SessionConfig {
            login_delay: Duration::from_millis(1500),
        };
        let mut session = Session::new(MemoryStore::new(), config);

        let started = tokio::time::Instant::now();
        assert!(session.login("ps@example.com", "secret1").await);
        assert!(started.elapsed() >= Duration::from_millis(1500));

        let started = tokio::time::Instant::now();
        assert!(session.login_with_gmail().await);
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }

    #[test]
    fn test_submit_application_is_approved() {
        let mut session = session();
        session.submit_application(application_draft());

        let application = session.application().unwrap();
        assert_eq!(application.phone_number, "1234567890");
        assert_eq!(application.status, ApplicationStatus::Approved);
        assert_eq!(
            application,
            &Application::from_draft(application_draft(), ApplicationStatus::Approved)
        );
        assert!(session.store().contains(APPLICATION_KEY).unwrap());
    }

    #[test]
    fn test_submit_business_is_approved() {
        let mut session = session();
        session.submit_application(application_draft());
        session.submit_business(business_draft());

        let business = session.business().unwrap();
        assert!(business.approved);
        assert_eq!(business, &Business::from_draft(business_draft(), true));
        assert_eq!(business.id_number, session.application().unwrap().id_number);
    }

    #[test]
    fn test_resubmission_replaces_record() {
        let mut session = session();
        session.submit_application(application_draft());

        let mut second = application_draft();
        second.full_name = "Dorji Wangmo".to_string();
        session.submit_application(second);

        assert_eq!(session.application().unwrap().full_name, "Dorji Wangmo");
        let stored: Application =
            serde_json::from_str(&session.store().get(APPLICATION_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.full_name, "Dorji Wangmo");
    }

    #[tokio::test]
    async fn test_stage_progression() {
        let mut session = session();
        assert_eq!(session.stage(), SessionStage::NoUser);
        assert!(session.login("ps@example.com", "secret1").await);
        assert_eq!(session.stage(), SessionStage::LoggedIn);
        session.submit_application(application_draft());
        assert_eq!(session.stage(), SessionStage::HasApplication);
        session.submit_business(business_draft());
        assert_eq!(session.stage(), SessionStage::HasBusiness);
        session.logout();
        assert_eq!(session.stage(), SessionStage::NoUser);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let mut session = session();
        assert!(session.login("ps@example.com", "secret1").await);
        session.submit_application(application_draft());
        session.submit_business(business_draft());

        session.logout();

        assert_eq!(session.snapshot(), SessionSnapshot::default());
        for key in [USER_KEY, APPLICATION_KEY, BUSINESS_KEY] {
            assert!(!session.store().contains(key).unwrap(), "{key}");
        }

        session.logout();
        assert_eq!(session.snapshot(), SessionSnapshot::default());
    }

    #[tokio::test]
    async fn test_rehydration_reproduces_snapshot() {
        let mut session = session();
        assert!(session.login("ps@example.com", "secret1").await);
        session.submit_application(application_draft());
        session.submit_business(business_draft());
        let before = session.snapshot();

        let restored = Session::new(session.into_store(), SessionConfig::default());
        assert_eq!(restored.snapshot(), before);
        assert_eq!(restored.stage(), SessionStage::HasBusiness);
    }

    #[tokio::test]
    async fn test_rehydration_from_file_store() {
        let dir = tempdir().unwrap();
        let before = {
            let store = FileStore::open(dir.path()).unwrap();
            let mut session = Session::new(store, SessionConfig::default());
            assert!(session.login_with_gmail().await);
            session.submit_application(application_draft());
            session.snapshot()
        };

        let restored = Session::new(FileStore::open(dir.path()).unwrap(), SessionConfig::default());
        assert_eq!(restored.snapshot(), before);
    }

    #[test]
    fn test_malformed_values_rehydrate_as_absent() {
        let store = MemoryStore::new();
        store.set(USER_KEY, "{not json").unwrap();
        store
            .set(APPLICATION_KEY, r#"{"fullName":"Pema","status":"approved"}"#)
            .unwrap();
        store.set(BUSINESS_KEY, r#"{"approved":"yes"}"#).unwrap();

        let session = Session::new(store, SessionConfig::default());
        assert_eq!(session.snapshot(), SessionSnapshot::default());
        assert_eq!(session.stage(), SessionStage::NoUser);
    }

    #[test]
    fn test_partial_corruption_keeps_valid_records() {
        let store = MemoryStore::new();
        let user = User {
            email: "ps@example.com".to_string(),
            name: "Ps".to_string(),
            id: "abc123xyz".to_string(),
        };
        store.set(USER_KEY, &serde_json::to_string(&user).unwrap()).unwrap();
        store.set(APPLICATION_KEY, "[]").unwrap();

        let session = Session::new(store, SessionConfig::default());
        assert_eq!(session.user(), Some(&user));
        assert!(session.application().is_none());
        assert_eq!(session.stage(), SessionStage::LoggedIn);
    }

    #[test]
    fn test_records_without_a_user_are_discarded() {
        let store = MemoryStore::new();
        store.set(USER_KEY, "{corrupt").unwrap();
        let application = Application::from_draft(application_draft(), ApplicationStatus::Approved);
        store
            .set(APPLICATION_KEY, &serde_json::to_string(&application).unwrap())
            .unwrap();
        let business = Business::from_draft(business_draft(), true);
        store
            .set(BUSINESS_KEY, &serde_json::to_string(&business).unwrap())
            .unwrap();

        let session = Session::new(&store, SessionConfig::default());
        assert_eq!(session.snapshot(), SessionSnapshot::default());
        assert_eq!(session.stage(), SessionStage::NoUser);
        assert!(!store.contains(APPLICATION_KEY).unwrap());
        assert!(!store.contains(BUSINESS_KEY).unwrap());
    }

    #[tokio::test]
    async fn test_next_login_does_not_inherit_orphaned_records() {
        let store = MemoryStore::new();
        let application = Application::from_draft(application_draft(), ApplicationStatus::Approved);
        store
            .set(APPLICATION_KEY, &serde_json::to_string(&application).unwrap())
            .unwrap();

        let mut session = Session::new(store, SessionConfig::default());
        assert!(session.login("new@example.com", "secret1").await);
        assert!(session.application().is_none());
        assert_eq!(session.stage(), SessionStage::LoggedIn);
    }

    #[tokio::test]
    async fn test_business_for_another_application_is_discarded() {
        let mut session = session();
        assert!(session.login("ps@example.com", "secret1").await);
        session.submit_application(application_draft());
        let mut other = business_draft();
        other.id_number = "BT-999".to_string();
        session.submit_business(other);

        let restored = Session::new(session.into_store(), SessionConfig::default());
        assert!(restored.application().is_some());
        assert!(restored.business().is_none());
        assert_eq!(restored.stage(), SessionStage::HasApplication);
        assert!(!restored.store().contains(BUSINESS_KEY).unwrap());
    }

    #[tokio::test]
    async fn test_password_length_counts_utf16_units() {
        let mut accepted = session();
        assert!(accepted.login("a@b.c", "😀😀😀").await);
        assert!(accepted.user().is_some());

        let mut rejected = session();
        assert!(!rejected.login("a@b.c", "😀😀").await);
        assert!(rejected.user().is_none());
    }

    struct FailingStore;

    impl LocalStore for FailingStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::LockPoisoned)
        }

        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::LockPoisoned)
        }

        fn remove(&self, _key: &str) -> StoreResult<()> {
            Err(StoreError::LockPoisoned)
        }
    }

    #[tokio::test]
    async fn test_store_failures_do_not_fail_operations() {
        let mut session = Session::new(FailingStore, SessionConfig::default());
        assert_eq!(session.stage(), SessionStage::NoUser);

        assert!(session.login("ps@example.com", "secret1").await);
        session.submit_application(application_draft());
        session.submit_business(business_draft());
        assert_eq!(session.stage(), SessionStage::HasBusiness);

        session.logout();
        assert_eq!(session.snapshot(), SessionSnapshot::default());
    }
}
