//! Text views, one per route.
//!
//! Views only read: they go through the use cases (which enforce
//! visibility) and the state snapshot for display names.

use std::time::Instant;

use questboard_domain::{
    dnd5e, Ability, CampaignId, Character, CharacterId, ProposalId, ScheduledSession,
    SessionProposal, User, VoteChoice,
};

use crate::api::router::Route;
use crate::api::timer::{format_elapsed, SessionTimer};
use crate::app::App;
use crate::infrastructure::state_store::AppState;

/// Items shown per library page.
const LIBRARY_PAGE: usize = 40;
/// Dice log entries shown on the roller.
const DICE_HISTORY: usize = 15;
/// Chat lines shown on the campaign page.
const CHAT_LINES: usize = 10;

pub async fn render(app: &App, route: &Route, timer: &SessionTimer) -> String {
    let user = app.use_cases.auth.current_user().await;
    let mut lines = vec![header(route, user.as_ref())];

    let body = match (route, user) {
        (Route::Login, _) => login(),
        (Route::Register, _) => register(),
        (Route::NotFound(name), _) => not_found(name),
        (_, None) => login(),
        (Route::Dashboard, Some(user)) => dashboard(app, &user).await,
        (Route::Campaign(id), Some(user)) => campaign(app, &user, *id).await,
        (Route::CampaignSchedule(id), Some(user)) => schedule(app, &user, *id).await,
        (Route::Proposal(id), Some(user)) => proposal(app, &user, *id).await,
        (Route::CharacterCreator { campaign }, Some(_)) => creator(app, *campaign).await,
        (Route::CharacterSheet(id), Some(user)) => sheet(app, &user, *id).await,
        (Route::Timer, Some(_)) => timer_view(timer),
        (Route::Dice, Some(_)) => dice(app).await,
        (Route::Items { query }, Some(_)) => items(app, query.as_deref()).await,
    };
    lines.extend(body);
    lines.join("\n")
}

fn header(route: &Route, user: Option<&User>) -> String {
    match user {
        Some(user) => format!("[{}]  {} ({})", route, user.username, user.role),
        None => format!("[{}]  not logged in", route),
    }
}

fn login() -> Vec<String> {
    vec![
        "== Log in ==".to_string(),
        "  login <username> <password>".to_string(),
        "No account yet? Go to #register".to_string(),
    ]
}

fn register() -> Vec<String> {
    vec![
        "== Create an account ==".to_string(),
        "  register <username> <password> <dm|player>".to_string(),
        "DMs run campaigns; players join them. Already registered? #login".to_string(),
    ]
}

fn not_found(name: &str) -> Vec<String> {
    vec![
        format!("== Page not found: #{} ==", name),
        "Back to #dashboard".to_string(),
    ]
}

fn failure(message: impl std::fmt::Display) -> Vec<String> {
    vec![format!("! {}", message), "Back to #dashboard".to_string()]
}

fn session_line(state: &AppState, session: &ScheduledSession) -> String {
    let campaign = state
        .campaign(session.campaign_id)
        .map(|c| c.name().to_string())
        .unwrap_or_default();
    let title = if session.title.is_empty() {
        "Session"
    } else {
        session.title.as_str()
    };
    format!("  {}  {} [{}]", session.slot, title, campaign)
}

async fn dashboard(app: &App, user: &User) -> Vec<String> {
    let campaigns = app.use_cases.campaign.list_for_user(user.id).await;
    let now = app.use_cases.scheduling.local_now();
    let upcoming = app.use_cases.scheduling.upcoming_sessions(user.id, now).await;
    let characters = app.use_cases.character.list_for_user(user.id).await;
    let state = app.store.snapshot().await;

    let mut lines = vec!["== Dashboard ==".to_string(), "Campaigns:".to_string()];
    if campaigns.is_empty() {
        lines.push("  (none)".to_string());
    }
    for c in &campaigns {
        let role = if c.is_dm(user.id) { "DM" } else { "player" };
        lines.push(format!(
            "  {} ({}, {} players)  {}",
            c.name(),
            role,
            c.players().len(),
            Route::Campaign(c.id())
        ));
    }

    lines.push("Upcoming sessions:".to_string());
    if upcoming.is_empty() {
        lines.push("  (nothing scheduled)".to_string());
    }
    lines.extend(upcoming.iter().map(|s| session_line(&state, s)));

    lines.push("Characters:".to_string());
    if characters.is_empty() {
        lines.push("  (none yet, see #character-creator)".to_string());
    }
    for ch in &characters {
        lines.push(format!(
            "  {} - level {} {} {}  {}",
            ch.name(),
            ch.level(),
            ch.race().name,
            ch.class().name,
            Route::CharacterSheet(ch.id())
        ));
    }

    if user.is_dm() {
        lines.push("campaign new \"<name>\" to start a campaign".to_string());
    } else {
        lines.push("campaign join <id> to join a campaign".to_string());
    }
    lines.push("Also: #dice  #timer  #items  logout".to_string());
    lines
}

async fn campaign(app: &App, user: &User, id: CampaignId) -> Vec<String> {
    let campaign = match app.use_cases.campaign.get(id).await {
        Ok(c) => c,
        Err(e) => return failure(e),
    };
    let sessions = app
        .use_cases
        .scheduling
        .campaign_sessions(id)
        .await
        .unwrap_or_default();
    let proposals = app
        .use_cases
        .scheduling
        .open_proposals(id)
        .await
        .unwrap_or_default();
    let characters = app.use_cases.character.list_for_campaign(id).await;
    let state = app.store.snapshot().await;

    let mut lines = vec![
        format!("== {} ==", campaign.name()),
        format!("Campaign id: {}", campaign.id()),
        format!("DM: {}", state.username_of(campaign.owner_id())),
    ];
    let players: Vec<String> = campaign
        .players()
        .iter()
        .map(|p| state.username_of(*p))
        .collect();
    lines.push(format!(
        "Players: {}",
        if players.is_empty() {
            "(none)".to_string()
        } else {
            players.join(", ")
        }
    ));

    lines.push("Characters:".to_string());
    for ch in &characters {
        lines.push(format!(
            "  {} ({}) level {}  {}",
            ch.name(),
            state.username_of(ch.owner_id()),
            ch.level(),
            Route::CharacterSheet(ch.id())
        ));
    }
    lines.push(format!(
        "  create one: {}",
        Route::CharacterCreator { campaign: Some(id) }
    ));

    lines.push("Shared notes:".to_string());
    lines.push(indent_or(campaign.shared_notes(), "(empty)"));
    lines.push("Your private notes:".to_string());
    lines.push(indent_or(campaign.private_notes(user.id).unwrap_or(""), "(empty)"));

    lines.push("Sessions:".to_string());
    if sessions.is_empty() {
        lines.push("  (nothing scheduled)".to_string());
    }
    lines.extend(sessions.iter().map(|s| session_line(&state, s)));
    for p in &proposals {
        lines.push(format!(
            "  vote open: {} ({} options)  {}",
            p.title(),
            p.options().len(),
            Route::Proposal(p.id())
        ));
    }
    lines.push(format!("  scheduling: {}", Route::CampaignSchedule(id)));

    lines.push("Chat:".to_string());
    for m in campaign.recent_messages(CHAT_LINES) {
        lines.push(format!(
            "  [{}] {}: {}",
            m.sent_at.format("%m-%d %H:%M"),
            state.username_of(m.author_id),
            m.body
        ));
    }

    if campaign.is_dm(user.id) {
        lines.push(
            "DM: campaign add|remove <username>, campaign notes \"<text>\", session new, propose"
                .to_string(),
        );
    }
    lines.push("campaign private \"<text>\", campaign say \"<text>\"".to_string());
    lines
}

async fn schedule(app: &App, user: &User, id: CampaignId) -> Vec<String> {
    let campaign = match app.use_cases.campaign.get(id).await {
        Ok(c) => c,
        Err(e) => return failure(e),
    };
    let sessions = app
        .use_cases
        .scheduling
        .campaign_sessions(id)
        .await
        .unwrap_or_default();
    let proposals = app
        .use_cases
        .scheduling
        .open_proposals(id)
        .await
        .unwrap_or_default();
    let state = app.store.snapshot().await;

    let mut lines = vec![format!("== Scheduling: {} ==", campaign.name())];
    lines.push("Calendar:".to_string());
    if sessions.is_empty() {
        lines.push("  (nothing scheduled)".to_string());
    }
    lines.extend(sessions.iter().map(|s| session_line(&state, s)));

    lines.push("Open proposals:".to_string());
    if proposals.is_empty() {
        lines.push("  (none)".to_string());
    }
    for p in &proposals {
        let voted = p
            .options()
            .iter()
            .filter(|o| o.vote_of(user.id).is_some())
            .count();
        lines.push(format!(
            "  {} - {} options, you answered {}  {}",
            p.title(),
            p.options().len(),
            voted,
            Route::Proposal(p.id())
        ));
    }

    if campaign.is_dm(user.id) {
        lines.push("session new \"<title>\" <YYYY-MM-DD> <HH:MM[-HH:MM]> \"<location>\"".to_string());
        lines.push(
            "propose \"<title>\" <YYYY-MM-DD> <HH:MM[-HH:MM]> \"<location>\" [more options...]"
                .to_string(),
        );
    }
    lines.push(format!("Back to {}", Route::Campaign(id)));
    lines
}

fn voter_names(state: &AppState, proposal: &SessionProposal, index: usize, choice: VoteChoice) -> String {
    let names: Vec<String> = proposal
        .option(index)
        .map(|o| o.voters(choice))
        .unwrap_or_default()
        .into_iter()
        .map(|u| state.username_of(u))
        .collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

async fn proposal(app: &App, user: &User, id: ProposalId) -> Vec<String> {
    let proposal = match app.use_cases.scheduling.proposal(id).await {
        Ok(p) => p,
        Err(e) => return failure(e),
    };
    let state = app.store.snapshot().await;
    let is_dm = state
        .campaign(proposal.campaign_id())
        .is_some_and(|c| c.is_dm(user.id));

    let status = if proposal.is_finalized() {
        "finalized"
    } else {
        "voting open"
    };
    let mut lines = vec![format!("== {} ({}) ==", proposal.title(), status)];
    lines.push(format!(
        "Proposed by {}",
        state.username_of(proposal.proposer_id())
    ));

    for (i, option) in proposal.options().iter().enumerate() {
        let marker = if proposal.chosen_index() == Some(i) {
            " <== chosen"
        } else {
            ""
        };
        let tally = option.tally();
        let mine = option
            .vote_of(user.id)
            .map(|c| format!(" (you: {})", c))
            .unwrap_or_default();
        lines.push(format!(
            "{}. {}  yes {} / maybe {} / no {}{}{}",
            i + 1,
            option.slot(),
            tally.yes,
            tally.maybe,
            tally.no,
            mine,
            marker
        ));
        lines.push(format!("     yes: {}", voter_names(&state, &proposal, i, VoteChoice::Yes)));
        lines.push(format!("     maybe: {}", voter_names(&state, &proposal, i, VoteChoice::Maybe)));
        lines.push(format!("     no: {}", voter_names(&state, &proposal, i, VoteChoice::No)));
    }

    if !proposal.is_finalized() {
        if let Some(best) = proposal.best_option() {
            lines.push(format!("Most popular so far: option {}", best + 1));
        }
        lines.push("vote <option> <yes|maybe|no>, unvote <option>".to_string());
        if is_dm {
            lines.push("finalize <option> to lock the session in".to_string());
        }
    }
    lines.push(format!(
        "Back to {}",
        Route::CampaignSchedule(proposal.campaign_id())
    ));
    lines
}

async fn creator(app: &App, campaign: Option<CampaignId>) -> Vec<String> {
    let options = app.use_cases.character.reference_options().await;
    let mut lines = vec!["== Character creator ==".to_string()];
    if let Some(id) = campaign {
        let name = app
            .store
            .read(|s| s.campaign(id).map(|c| c.name().to_string()))
            .await;
        lines.push(format!(
            "For campaign: {}",
            name.unwrap_or_else(|| id.to_string())
        ));
    }

    if options.races.is_empty() && options.classes.is_empty() {
        lines.push("Reference data unavailable; type race and class indexes directly.".to_string());
    } else {
        let races: Vec<&str> = options.races.iter().map(|r| r.index.as_str()).collect();
        let classes: Vec<&str> = options.classes.iter().map(|c| c.index.as_str()).collect();
        lines.push(format!("Races: {}", races.join(", ")));
        lines.push(format!("Classes: {}", classes.join(", ")));
    }
    lines.push(
        "character new \"<name>\" <race> <class> <STR> <DEX> <CON> <INT> <WIS> <CHA> [subclass]"
            .to_string(),
    );
    lines.push("Scores range from 1 to 30.".to_string());
    lines
}

fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

fn sheet_lines(character: &Character) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", character.name())];
    let subclass = character
        .subclass()
        .map(|s| format!(" ({})", s.name))
        .unwrap_or_default();
    lines.push(format!(
        "Level {} {} {}{}",
        character.level(),
        character.race().name,
        character.class().name,
        subclass
    ));
    let next = match character.xp_to_next_level() {
        Some(missing) => format!(
            "{} to level {} (at {})",
            missing,
            character.level() + 1,
            dnd5e::xp_for_next_level(character.level())
        ),
        None => "max level".to_string(),
    };
    lines.push(format!("XP: {} ({})", character.xp(), next));
    lines.push(format!(
        "HP: {}   Hit die: d{}   Proficiency: {}",
        character.max_hp(),
        character.hit_die(),
        signed(character.proficiency_bonus())
    ));

    let scores: Vec<String> = Ability::ALL
        .iter()
        .map(|a| {
            format!(
                "{} {} ({})",
                a.short_name(),
                character.scores().get(*a),
                signed(character.scores().modifier(*a))
            )
        })
        .collect();
    lines.push(scores.join("  "));

    lines.push("Features:".to_string());
    if character.features().is_empty() {
        lines.push("  (none)".to_string());
    }
    lines.extend(character.features().iter().map(|f| format!("  - {}", f)));

    lines.push("Inventory:".to_string());
    if character.inventory().is_empty() {
        lines.push("  (empty)".to_string());
    }
    lines.extend(
        character
            .inventory()
            .iter()
            .map(|i| format!("  {} x{} [{}]", i.name, i.quantity, i.index)),
    );
    lines
}

async fn sheet(app: &App, user: &User, id: CharacterId) -> Vec<String> {
    let character = match app.use_cases.character.get(id).await {
        Ok(c) => c,
        Err(e) => return failure(e),
    };
    let mut lines = sheet_lines(&character);

    let dm_of_campaign = match character.campaign_id() {
        Some(campaign) => {
            app.store
                .read(|s| s.campaign(campaign).is_some_and(|c| c.is_dm(user.id)))
                .await
        }
        None => false,
    };
    if dm_of_campaign || (character.campaign_id().is_none() && character.is_owned_by(user.id)) {
        lines.push("xp <amount> to award experience".to_string());
    }
    if character.is_owned_by(user.id) {
        lines.push("asi <ABILITY[,ABILITY]>, item add <index> [qty], item remove <index> [qty]".to_string());
    }
    if let Some(campaign) = character.campaign_id() {
        lines.push(format!("Back to {}", Route::Campaign(campaign)));
    }
    lines
}

fn timer_view(timer: &SessionTimer) -> Vec<String> {
    let state = if timer.is_running() { "running" } else { "stopped" };
    vec![
        "== Session timer ==".to_string(),
        format!("{}  ({})", format_elapsed(timer.elapsed(Instant::now())), state),
        "timer start | timer stop | timer reset".to_string(),
    ]
}

async fn dice(app: &App) -> Vec<String> {
    let history = app.use_cases.dice.history(DICE_HISTORY).await;
    let state = app.store.snapshot().await;
    let mut lines = vec!["== Dice roller ==".to_string()];
    if history.is_empty() {
        lines.push("  (no rolls yet)".to_string());
    }
    for entry in &history {
        let crit = if entry.critical { "  CRITICAL!" } else { "" };
        let rolls: Vec<String> = entry.rolls.iter().map(|r| r.to_string()).collect();
        lines.push(format!(
            "  [{}] {}: {} -> [{}] = {}{}",
            entry.timestamp.format("%H:%M:%S"),
            state.username_of(entry.user_id),
            entry.expression,
            rolls.join(", "),
            entry.total,
            crit
        ));
    }
    lines.push("roll <expression>, e.g. roll 1d20+5".to_string());
    lines
}

async fn items(app: &App, query: Option<&str>) -> Vec<String> {
    let results = app.use_cases.items.library(query).await;
    let mut lines = vec![match query {
        Some(q) => format!("== Item library: \"{}\" ({} found) ==", q, results.len()),
        None => format!("== Item library ({} items) ==", results.len()),
    }];
    if results.is_empty() {
        lines.push("  (no items; the library may be offline)".to_string());
    }
    for item in results.iter().take(LIBRARY_PAGE) {
        lines.push(format!("  {} [{}]", item.name, item.index));
    }
    if results.len() > LIBRARY_PAGE {
        lines.push(format!(
            "  ... {} more, narrow with #items?q=<text>",
            results.len() - LIBRARY_PAGE
        ));
    }
    if let Some(first) = results.first().filter(|_| results.len() == 1) {
        if let Some(details) = app.use_cases.items.details(&first.index).await {
            if let Some(category) = details.category {
                lines.push(format!("  Category: {}", category));
            }
            if let Some(cost) = details.cost {
                lines.push(format!("  Cost: {}", cost));
            }
            if let Some(weight) = details.weight {
                lines.push(format!("  Weight: {} lb", weight));
            }
            lines.extend(details.description.iter().map(|d| format!("  {}", d)));
        }
    }
    lines.push("item add <index> [qty] on a character sheet to carry one".to_string());
    lines
}

fn indent_or(text: &str, empty: &str) -> String {
    if text.trim().is_empty() {
        format!("  {}", empty)
    } else {
        text.lines()
            .map(|l| format!("  {}", l))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use questboard_domain::{AbilityScores, CatalogRef, CharacterName, UserId};

    #[test]
    fn sheet_shows_derived_values() {
        let scores = AbilityScores::new([16, 8, 14, 10, 12, 10]).expect("valid");
        let mut character = Character::new(
            UserId::new(),
            CharacterName::new("Brannoc").expect("valid"),
            CatalogRef::new("human", "Human"),
            CatalogRef::new("fighter", "Fighter"),
            scores,
            10,
            Utc::now(),
        );
        character.add_item("rope-hempen-50-feet", "Rope, hempen (50 feet)", 1).expect("add");

        let text = sheet_lines(&character).join("\n");
        assert!(text.contains("Level 1 Human Fighter"));
        assert!(text.contains("XP: 0 (300 to level 2 (at 300))"));
        assert!(text.contains("HP: 12   Hit die: d10   Proficiency: +2"));
        assert!(text.contains("STR 16 (+3)"));
        assert!(text.contains("DEX 8 (-1)"));
        assert!(text.contains("Rope, hempen (50 feet) x1"));
    }

    #[test]
    fn notes_are_indented() {
        assert_eq!(indent_or("", "(empty)"), "  (empty)");
        assert_eq!(indent_or("a\nb", "(empty)"), "  a\n  b");
    }
}
