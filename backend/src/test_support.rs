//! Test utilities for the carelink crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled only for tests or with the `test-support` feature.

pub mod clock {
    //! Deterministic clocks.

    use std::sync::Mutex;

    use chrono::{DateTime, Duration, Local, TimeZone, Utc};
    use mockable::Clock;

    /// Clock that reports a settable instant.
    #[derive(Debug)]
    pub struct FixtureClock(Mutex<DateTime<Utc>>);

    impl FixtureClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Move the clock forward.
        pub fn advance(&self, by: Duration) {
            let mut guard = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            *guard += by;
        }
    }

    impl Default for FixtureClock {
        fn default() -> Self {
            Self::new(fixture_timestamp())
        }
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    /// Fixed instant used across fixtures.
    pub fn fixture_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }
}

pub mod users {
    //! Builders for user records.

    use crate::domain::{CredentialHash, Email, Profile, Role, User, UserId};

    /// Build a user of `role` named `name` with a derived email address.
    ///
    /// # Panics
    /// Panics when `name` is blank or does not form a valid email local part.
    pub fn user(role: Role, name: &str) -> User {
        let email = Email::new(format!("{}@example.test", name.to_lowercase()))
            .unwrap_or_else(|err| panic!("fixture email for {name}: {err}"));
        let profile =
            Profile::named(name).unwrap_or_else(|err| panic!("fixture profile for {name}: {err}"));
        User::new(
            UserId::random(),
            email,
            CredentialHash::new("fixture$hash"),
            profile,
            role,
        )
    }

    pub fn doctor(name: &str) -> User {
        user(Role::Doctor, name)
    }

    pub fn patient(name: &str) -> User {
        user(Role::Patient, name)
    }

    pub fn admin(name: &str) -> User {
        user(Role::Admin, name)
    }
}

#[cfg(test)]
pub mod mock_users {
    //! A `MockUserRepository` backed by a shared map.
    //!
    //! Lets service tests run multi-record flows while still asserting on
    //! individual repository calls when needed.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use crate::domain::ports::{MockUserRepository, UserPersistenceError};
    use crate::domain::{User, UserId};

    /// Shared record map behind the mock.
    pub type UserTable = Arc<Mutex<HashMap<UserId, User>>>;

    fn lock(table: &UserTable) -> std::sync::MutexGuard<'_, HashMap<UserId, User>> {
        table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mock repository serving `users`, with revision-checked saves.
    pub fn mock_user_repository(users: impl IntoIterator<Item = User>) -> (MockUserRepository, UserTable) {
        let table: UserTable = Arc::new(Mutex::new(
            users
                .into_iter()
                .map(|user| (user.id(), user.with_revision(1)))
                .collect(),
        ));
        let mut repo = MockUserRepository::new();

        let t = Arc::clone(&table);
        repo.expect_find_by_id()
            .returning(move |id| Ok(lock(&t).get(id).cloned()));

        let t = Arc::clone(&table);
        repo.expect_find_by_email().returning(move |email| {
            Ok(lock(&t).values().find(|u| u.email() == email).cloned())
        });

        let t = Arc::clone(&table);
        repo.expect_find_patients_of().returning(move |doctor_id| {
            Ok(lock(&t)
                .values()
                .filter(|u| u.doctor_ref() == Some(*doctor_id))
                .cloned()
                .collect())
        });

        let t = Arc::clone(&table);
        repo.expect_find_doctors_listing().returning(move |patient_id| {
            Ok(lock(&t)
                .values()
                .filter(|u| u.patient_refs().contains(patient_id))
                .cloned()
                .collect())
        });

        let t = Arc::clone(&table);
        repo.expect_insert().returning(move |user| {
            let stored = user.clone().with_revision(1);
            lock(&t).insert(stored.id(), stored.clone());
            Ok(stored)
        });

        let t = Arc::clone(&table);
        repo.expect_save().returning(move |user| {
            let mut guard = lock(&t);
            let actual = guard.get(&user.id()).map_or(0, User::revision);
            if actual != user.revision() {
                return Err(UserPersistenceError::revision_mismatch(user.revision(), actual));
            }
            let stored = user.clone().with_revision(actual + 1);
            guard.insert(stored.id(), stored.clone());
            Ok(stored)
        });

        (repo, table)
    }

    /// Current stored copy of a user.
    ///
    /// # Panics
    /// Panics when the user is absent.
    pub fn stored(table: &UserTable, id: &UserId) -> User {
        lock(table)
            .get(id)
            .cloned()
            .unwrap_or_else(|| panic!("user {id} missing from table"))
    }
}

pub mod credentials {
    //! Credential verifiers tuned for test speed.

    use argon2::Params;

    use crate::outbound::credentials::Argon2CredentialVerifier;

    /// Argon2 verifier at the minimum memory and iteration cost.
    ///
    /// # Panics
    /// Panics when argon2 rejects the minimum parameters.
    pub fn cheap_verifier() -> Argon2CredentialVerifier {
        Argon2CredentialVerifier::with_cost(Params::MIN_M_COST, 1)
            .unwrap_or_else(|err| panic!("argon2 params: {err}"))
    }
}

pub mod documents {
    //! Document stores rooted in throwaway directories.

    use tempfile::TempDir;

    use crate::outbound::documents::CapStdDocumentStore;

    /// A [`CapStdDocumentStore`] over a fresh temporary directory.
    ///
    /// Keep the returned [`TempDir`] alive for as long as the store is used.
    ///
    /// # Panics
    /// Panics when the directory cannot be created or opened.
    pub fn temp_document_store() -> (TempDir, CapStdDocumentStore) {
        let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let store = CapStdDocumentStore::open(dir.path())
            .unwrap_or_else(|err| panic!("open document store: {err}"));
        (dir, store)
    }
}

pub mod notifications {
    //! Notification sender that records deliveries and can be told to fail.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::domain::Email;
    use crate::domain::ports::{NotificationError, NotificationSender};

    /// One recorded fall email: recipient, patient name, location.
    pub type SentEmail = (String, String, String);

    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        fail: AtomicBool,
        sent: Mutex<Vec<SentEmail>>,
    }

    impl RecordingNotifier {
        /// Make subsequent sends fail with a transport error.
        pub fn fail_sends(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        pub fn sent(&self) -> Vec<SentEmail> {
            self.sent
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone()
        }
    }

    #[async_trait]
    impl NotificationSender for RecordingNotifier {
        async fn send_fall_alert_email(
            &self,
            to: &Email,
            patient_name: &str,
            location: &str,
        ) -> Result<(), NotificationError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(NotificationError::transport("relay unreachable"));
            }
            self.sent
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push((to.as_str().to_owned(), patient_name.to_owned(), location.to_owned()));
            Ok(())
        }
    }
}

pub mod world {
    //! Every domain service wired over the in-memory adapters.

    use std::sync::Arc;

    use mockable::Clock;

    use super::clock::FixtureClock;
    use super::notifications::RecordingNotifier;
    use crate::domain::ports::{FixtureDocumentStore, UserRepository};
    use crate::domain::{
        AccountService, AlertService, CareGraphService, FallReportService, MedicalHistoryService,
        User, UserId,
    };
    use crate::inbound::http::state::HttpState;
    use crate::outbound::credentials::Argon2CredentialVerifier;
    use crate::outbound::persistence::{InMemoryFallEventRepository, InMemoryUserRepository};

    pub type Users = InMemoryUserRepository;

    /// Services and the adapters behind them, for end-to-end style tests.
    pub struct TestWorld {
        pub users: Arc<Users>,
        pub events: Arc<InMemoryFallEventRepository>,
        pub notifier: Arc<RecordingNotifier>,
        pub clock: Arc<FixtureClock>,
        pub accounts: AccountService<Users, Argon2CredentialVerifier>,
        pub care_graph: CareGraphService<Users>,
        pub history: MedicalHistoryService<Users, FixtureDocumentStore>,
        pub alerts: AlertService<Users>,
        pub falls: FallReportService<Users, InMemoryFallEventRepository, RecordingNotifier>,
    }

    impl Default for TestWorld {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestWorld {
        pub fn new() -> Self {
            let users = Arc::new(InMemoryUserRepository::new());
            let events = Arc::new(InMemoryFallEventRepository::new());
            let notifier = Arc::new(RecordingNotifier::default());
            let clock = Arc::new(FixtureClock::default());
            let dyn_clock: Arc<dyn Clock> = clock.clone();
            Self {
                accounts: AccountService::new(
                    Arc::clone(&users),
                    Arc::new(super::credentials::cheap_verifier()),
                ),
                care_graph: CareGraphService::new(Arc::clone(&users)),
                history: MedicalHistoryService::new(
                    Arc::clone(&users),
                    Arc::new(FixtureDocumentStore),
                    Arc::clone(&dyn_clock),
                ),
                alerts: AlertService::new(Arc::clone(&users), Arc::clone(&dyn_clock)),
                falls: FallReportService::new(
                    Arc::clone(&users),
                    Arc::clone(&events),
                    Arc::clone(&notifier),
                    dyn_clock,
                ),
                users,
                events,
                notifier,
                clock,
            }
        }

        /// Insert a user built with [`super::users`].
        ///
        /// # Panics
        /// Panics when the insert is rejected.
        pub async fn seed(&self, user: User) -> User {
            self.users
                .insert(&user)
                .await
                .unwrap_or_else(|err| panic!("seed {}: {err}", user.id()))
        }

        /// Seed a doctor and a patient already linked to each other.
        ///
        /// # Panics
        /// Panics when either insert is rejected.
        pub async fn linked_pair(&self, doctor: &str, patient: &str) -> (User, User) {
            let mut doctor = super::users::doctor(doctor);
            let mut patient = super::users::patient(patient);
            patient
                .set_doctor_ref(Some(doctor.id()))
                .unwrap_or_else(|err| panic!("link patient: {err}"));
            doctor
                .add_patient_ref(patient.id())
                .unwrap_or_else(|err| panic!("link doctor: {err}"));
            (self.seed(doctor).await, self.seed(patient).await)
        }

        /// Current stored copy of a user.
        ///
        /// # Panics
        /// Panics when the user is absent.
        pub async fn stored(&self, id: &UserId) -> User {
            self.users
                .find_by_id(id)
                .await
                .ok()
                .flatten()
                .unwrap_or_else(|| panic!("user {id} missing"))
        }

        /// HTTP state backed by this world's services.
        pub fn http_state(&self) -> HttpState {
            HttpState {
                login: Arc::new(self.accounts.clone()),
                profile: Arc::new(self.accounts.clone()),
                profile_query: Arc::new(self.accounts.clone()),
                care_graph: Arc::new(self.care_graph.clone()),
                history: Arc::new(self.history.clone()),
                history_query: Arc::new(self.history.clone()),
                alerts: Arc::new(self.alerts.clone()),
                alerts_query: Arc::new(self.alerts.clone()),
                falls: Arc::new(self.falls.clone()),
                fall_history: Arc::new(self.falls.clone()),
            }
        }
    }
}
