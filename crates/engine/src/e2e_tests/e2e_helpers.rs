//! Helpers for building the full application stack in tests.

use std::sync::Arc;

use questboard_domain::{CampaignId, CharacterId, ProposalId};

use crate::api::{Flow, Route, Shell};
use crate::app::App;
use crate::infrastructure::clock::SequenceRandom;
use crate::infrastructure::ports::{
    ApiReference, ClassDetails, EquipmentDetails, MockAbilityChoicePort, MockReferenceDataPort,
    StorageProvider,
};
use crate::infrastructure::settings::AppConfig;
use crate::infrastructure::storage::MemoryStorageProvider;
use crate::use_cases::test_support;

/// Reference data for a tiny 5e catalog: humans, half-elves and fighters.
pub fn reference_catalog() -> MockReferenceDataPort {
    let mut mock = MockReferenceDataPort::new();
    mock.expect_list_races().returning(|| {
        vec![
            ApiReference::new("human", "Human"),
            ApiReference::new("half-elf", "Half-Elf"),
        ]
    });
    mock.expect_list_classes()
        .returning(|| vec![ApiReference::new("fighter", "Fighter")]);
    mock.expect_list_subclasses()
        .returning(|_| vec![ApiReference::new("champion", "Champion")]);
    mock.expect_list_equipment().returning(|| {
        vec![
            ApiReference::new("longsword", "Longsword"),
            ApiReference::new("rope-hempen-50-feet", "Rope, hempen (50 feet)"),
        ]
    });
    mock.expect_class_details().returning(|index| {
        (index == "fighter").then(|| ClassDetails {
            index: "fighter".to_string(),
            name: "Fighter".to_string(),
            hit_die: 10,
        })
    });
    mock.expect_class_level_features()
        .returning(|_, level| match level {
            1 => vec!["Fighting Style".to_string(), "Second Wind".to_string()],
            2 => vec!["Action Surge".to_string()],
            3 => vec!["Martial Archetype".to_string()],
            4 => vec!["Ability Score Improvement".to_string()],
            _ => Vec::new(),
        });
    mock.expect_equipment_details().returning(|index| {
        (index == "rope-hempen-50-feet").then(|| EquipmentDetails {
            index: "rope-hempen-50-feet".to_string(),
            name: "Rope, hempen (50 feet)".to_string(),
            category: Some("Adventuring Gear".to_string()),
            cost: Some("1 gp".to_string()),
            weight: Some(10.0),
            description: Vec::new(),
        })
    });
    mock
}

/// A chooser that always gives the same answer.
pub fn chooser(answer: Option<&str>) -> MockAbilityChoicePort {
    let answer = answer.map(str::to_string);
    let mut mock = MockAbilityChoicePort::new();
    mock.expect_choose_increase()
        .returning(move |_| answer.clone());
    mock
}

pub fn build_app(
    storage: Arc<dyn StorageProvider>,
    chooser: MockAbilityChoicePort,
    rolls: Vec<i32>,
) -> Arc<App> {
    Arc::new(App::new(
        &AppConfig {
            dice_log_limit: 5,
            ..AppConfig::default()
        },
        storage,
        Arc::new(reference_catalog()),
        Arc::new(chooser),
        test_support::clock(),
        Arc::new(SequenceRandom::new(rolls)),
    ))
}

/// Shell over a fresh in-memory app.
pub fn new_shell() -> Shell {
    Shell::new(build_app(
        Arc::new(MemoryStorageProvider::new()),
        chooser(None),
        vec![10],
    ))
}

/// Run one line and return its output.
pub async fn run(shell: &mut Shell, line: &str) -> String {
    match shell.handle_line(line).await {
        Flow::Continue(output) => output,
        Flow::Quit(message) => panic!("unexpected quit after '{}': {}", line, message),
    }
}

/// Run one line that must not fail.
pub async fn ok(shell: &mut Shell, line: &str) -> String {
    let output = run(shell, line).await;
    assert!(!output.starts_with("! "), "'{}' failed: {}", line, output);
    output
}

pub fn campaign_of(shell: &Shell) -> CampaignId {
    match shell.route() {
        Route::Campaign(id) | Route::CampaignSchedule(id) => *id,
        other => panic!("expected a campaign page, got {}", other),
    }
}

pub fn proposal_of(shell: &Shell) -> ProposalId {
    match shell.route() {
        Route::Proposal(id) => *id,
        other => panic!("expected a proposal page, got {}", other),
    }
}

pub fn character_of(shell: &Shell) -> CharacterId {
    match shell.route() {
        Route::CharacterSheet(id) => *id,
        other => panic!("expected a character sheet, got {}", other),
    }
}
