//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.
//! Use cases read and mutate the shared [`StateStore`] and call out to the
//! reference-data and prompt ports where a story needs them.

pub mod auth;
pub mod campaign;
pub mod character;
pub mod dice;
pub mod items;
pub mod scheduling;

pub use auth::AuthUseCases;
pub use campaign::CampaignUseCases;
pub use character::CharacterUseCases;
pub use dice::DiceUseCases;
pub use items::ItemLibrary;
pub use scheduling::SchedulingUseCases;

use crate::infrastructure::state_store::StateStore;
use questboard_domain::User;

/// The logged-in user, if any.
pub(crate) async fn signed_in(store: &StateStore) -> Option<User> {
    store.current_user().await
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use questboard_domain::{Role, User, UserId, Username};

    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::ClockPort;
    use crate::infrastructure::state_store::{StateStore, StoreError};
    use crate::infrastructure::storage::MemoryStorageProvider;

    pub fn clock() -> Arc<dyn ClockPort> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
        ))
    }

    pub fn store() -> Arc<StateStore> {
        Arc::new(StateStore::load(Arc::new(MemoryStorageProvider::new())))
    }

    /// Insert a user directly, without logging in.
    pub async fn add_user(store: &StateStore, name: &str, role: Role) -> UserId {
        let user = User::new(
            Username::new(name).expect("valid username"),
            "secret",
            role,
            Utc::now(),
        )
        .expect("valid user");
        let id = user.id;
        store
            .mutate(|s| {
                s.users.push(user);
                Ok::<_, StoreError>(())
            })
            .await
            .expect("insert user");
        id
    }

    pub async fn login_as(store: &StateStore, user: UserId) {
        store
            .set_current_user(Some(user))
            .await
            .expect("set current user");
    }
}
