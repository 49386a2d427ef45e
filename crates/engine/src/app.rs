//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    cache::CachedReferenceData,
    ports::{AbilityChoicePort, ClockPort, RandomPort, ReferenceDataPort, StorageProvider},
    settings::AppConfig,
    state_store::StateStore,
};
use crate::use_cases;

/// Main application state.
///
/// Holds the state store, the (cached) reference data and all use cases.
/// Shared by the shell and the view renderers.
pub struct App {
    pub store: Arc<StateStore>,
    pub reference: Arc<dyn ReferenceDataPort>,
    pub clock: Arc<dyn ClockPort>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub auth: use_cases::AuthUseCases,
    pub campaign: use_cases::CampaignUseCases,
    pub scheduling: use_cases::SchedulingUseCases,
    pub character: use_cases::CharacterUseCases,
    pub dice: use_cases::DiceUseCases,
    pub items: use_cases::ItemLibrary,
}

impl App {
    /// Create a new App with all dependencies wired up.
    ///
    /// The reference port is wrapped in a TTL cache here.
    pub fn new(
        config: &AppConfig,
        storage: Arc<dyn StorageProvider>,
        reference: Arc<dyn ReferenceDataPort>,
        chooser: Arc<dyn AbilityChoicePort>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let store = Arc::new(StateStore::load(storage));
        let reference: Arc<dyn ReferenceDataPort> =
            Arc::new(CachedReferenceData::new(reference, config.cache_ttl));

        let use_cases = UseCases {
            auth: use_cases::AuthUseCases::new(store.clone(), clock.clone()),
            campaign: use_cases::CampaignUseCases::new(store.clone(), clock.clone()),
            scheduling: use_cases::SchedulingUseCases::new(store.clone(), clock.clone()),
            character: use_cases::CharacterUseCases::new(
                store.clone(),
                reference.clone(),
                chooser,
                clock.clone(),
            ),
            dice: use_cases::DiceUseCases::new(
                store.clone(),
                clock.clone(),
                random,
                config.dice_log_limit,
            ),
            items: use_cases::ItemLibrary::new(reference.clone()),
        };

        Self {
            store,
            reference,
            clock,
            use_cases,
        }
    }
}
