//! Local accounts: register, log in, log out.
//!
//! There is no security here. Passwords are stored and compared in plain
//! text and the "session" is just the current user id in the state document.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use questboard_domain::{Role, User, Username};

use crate::infrastructure::ports::ClockPort;
use crate::infrastructure::state_store::StateStore;

pub struct AuthUseCases {
    store: Arc<StateStore>,
    clock: Arc<dyn ClockPort>,
}

impl AuthUseCases {
    pub fn new(store: Arc<StateStore>, clock: Arc<dyn ClockPort>) -> Self {
        Self { store, clock }
    }

    /// Create an account and log it in.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let username = Username::new(username)?;
        let user = User::new(username, password, role, self.clock.now())?;

        let created = self
            .store
            .mutate(|state| {
                if state.user_by_name(user.username.as_str()).is_some() {
                    return Err(AuthError::UsernameTaken(user.username.to_string()));
                }
                state.users.push(user.clone());
                state.current_user = Some(user.id);
                Ok(user)
            })
            .await?;

        tracing::info!(user_id = %created.id, username = %created.username, role = %created.role, "User registered");
        Ok(created)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .store
            .mutate(|state| {
                let user = state
                    .user_by_name(username)
                    .filter(|u| u.check_password(password))
                    .cloned()
                    .ok_or(AuthError::InvalidCredentials)?;
                state.current_user = Some(user.id);
                Ok::<User, AuthError>(user)
            })
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.set_current_user(None).await?;
        tracing::info!("User logged out");
        Ok(())
    }

    pub async fn current_user(&self) -> Option<User> {
        super::signed_in(&self.store).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support;

    fn use_cases() -> (AuthUseCases, Arc<StateStore>) {
        let store = test_support::store();
        (
            AuthUseCases::new(store.clone(), test_support::clock()),
            store,
        )
    }

    #[tokio::test]
    async fn register_logs_the_user_in() {
        let (auth, _) = use_cases();
        let user = auth
            .register("mira", "hunter2", Role::Dm)
            .await
            .expect("register");
        let current = auth.current_user().await.expect("logged in");
        assert_eq!(current.id, user.id);
        assert!(current.is_dm());
    }

    #[tokio::test]
    async fn usernames_are_unique_ignoring_case() {
        let (auth, store) = use_cases();
        auth.register("Mira", "pw", Role::Dm).await.expect("first");
        let err = auth
            .register("mira", "pw", Role::Player)
            .await
            .expect_err("duplicate");
        assert!(matches!(err, AuthError::UsernameTaken(_)));
        assert_eq!(store.snapshot().await.users.len(), 1);
    }

    #[tokio::test]
    async fn empty_password_is_rejected() {
        let (auth, _) = use_cases();
        let err = auth.register("mira", "", Role::Player).await.expect_err("invalid");
        assert!(matches!(err, AuthError::Domain(_)));
    }

    #[tokio::test]
    async fn login_checks_password() {
        let (auth, _) = use_cases();
        auth.register("mira", "pw", Role::Player).await.expect("register");
        auth.logout().await.expect("logout");
        assert!(auth.current_user().await.is_none());

        let err = auth.login("mira", "wrong").await.expect_err("bad password");
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(auth.current_user().await.is_none());

        auth.login("MIRA", "pw").await.expect("login");
        assert!(auth.current_user().await.is_some());
    }

    #[tokio::test]
    async fn registration_is_stamped_by_the_clock() {
        use crate::infrastructure::ports::MockClockPort;
        use chrono::{TimeZone, Utc};

        let joined = Utc
            .with_ymd_and_hms(2026, 3, 14, 19, 30, 0)
            .single()
            .expect("valid timestamp");
        let mut clock = MockClockPort::new();
        clock.expect_now().times(1).return_const(joined);

        let auth = AuthUseCases::new(test_support::store(), Arc::new(clock));
        let user = auth
            .register("mira", "pw", Role::Dm)
            .await
            .expect("register");
        assert_eq!(user.created_at, joined);
    }
}
