//! Campaign lifecycle: accounts, membership, notes, chat and scheduling votes.

use std::sync::Arc;

use crate::api::{Flow, Route, Shell};
use crate::infrastructure::storage::MemoryStorageProvider;

use super::*;

/// DM "mira" runs "Curse of Strahd"; players "ana" and "bo" are members.
async fn campaign_with_players(shell: &mut Shell) -> questboard_domain::CampaignId {
    ok(shell, "register ana pw player").await;
    ok(shell, "logout").await;
    ok(shell, "register bo pw player").await;
    ok(shell, "logout").await;
    ok(shell, "register mira pw dm").await;
    ok(shell, r#"campaign new "Curse of Strahd""#).await;
    let campaign = campaign_of(shell);
    ok(shell, "campaign add ana").await;
    ok(shell, "campaign add bo").await;
    campaign
}

async fn switch_user(shell: &mut Shell, username: &str) {
    ok(shell, "logout").await;
    ok(shell, &format!("login {} pw", username)).await;
}

#[tokio::test]
async fn test_pages_require_login() {
    let mut shell = new_shell();

    let output = run(&mut shell, "#dashboard").await;
    assert_eq!(shell.route(), &Route::Login);
    assert!(output.contains("== Log in =="));

    let output = run(&mut shell, "#register").await;
    assert!(output.contains("== Create an account =="));

    let output = run(&mut shell, "#tavern").await;
    assert!(output.contains("Page not found: #tavern"));

    let output = run(&mut shell, "login nobody pw").await;
    assert!(output.starts_with("! "));
}

#[tokio::test]
async fn test_register_login_logout() {
    let mut shell = new_shell();

    let output = ok(&mut shell, "register mira pw dm").await;
    assert!(output.contains("Welcome, mira!"));
    assert!(output.contains("== Dashboard =="));
    assert_eq!(shell.route(), &Route::Dashboard);

    // Logged-in users skip the login page.
    run(&mut shell, "#login").await;
    assert_eq!(shell.route(), &Route::Dashboard);

    ok(&mut shell, "logout").await;
    assert_eq!(shell.route(), &Route::Login);

    let output = run(&mut shell, "register mira other player").await;
    assert!(output.starts_with("! "), "duplicate username accepted: {}", output);

    let output = run(&mut shell, "login mira wrong").await;
    assert!(output.starts_with("! "));

    ok(&mut shell, "login mira pw").await;
    assert_eq!(shell.route(), &Route::Dashboard);
}

#[tokio::test]
async fn test_only_dms_create_campaigns() {
    let mut shell = new_shell();
    ok(&mut shell, "register ana pw player").await;

    let output = run(&mut shell, r#"campaign new "Lost Mine""#).await;
    assert_eq!(output, "! Only DM accounts can create campaigns");
}

#[tokio::test]
async fn test_campaign_membership_and_notes() {
    let mut shell = new_shell();
    let campaign = campaign_with_players(&mut shell).await;

    let output = ok(&mut shell, r#"campaign notes "Session zero on Friday""#).await;
    assert!(output.contains("Shared notes saved."));
    assert!(output.contains("Players: ana, bo"));
    assert!(output.contains("Session zero on Friday"));

    ok(&mut shell, "campaign remove bo").await;

    switch_user(&mut shell, "ana").await;
    let dashboard = run(&mut shell, "#dashboard").await;
    assert!(dashboard.contains("Curse of Strahd (player, 1 players)"));

    let page = run(&mut shell, &Route::Campaign(campaign).to_string()).await;
    assert!(page.contains("Session zero on Friday"));

    // Shared notes belong to the DM; private notes to each member.
    let output = run(&mut shell, r#"campaign notes "hijacked""#).await;
    assert_eq!(output, "! Only the campaign's DM can do that");
    let output = ok(&mut shell, r#"campaign private "Strahd is my uncle""#).await;
    assert!(output.contains("Strahd is my uncle"));
    let output = ok(&mut shell, r#"campaign say "Hello, table!""#).await;
    assert!(output.contains("ana: Hello, table!"));

    switch_user(&mut shell, "mira").await;
    let page = run(&mut shell, &Route::Campaign(campaign).to_string()).await;
    assert!(!page.contains("Strahd is my uncle"));
    assert!(page.contains("ana: Hello, table!"));

    // Removed players lose access; they can rejoin by id.
    switch_user(&mut shell, "bo").await;
    let page = run(&mut shell, &Route::Campaign(campaign).to_string()).await;
    assert!(page.contains("! You are not a member of this campaign"));
    let output = ok(&mut shell, &format!("campaign join {}", campaign)).await;
    assert!(output.contains("You joined 'Curse of Strahd'."));
    assert!(output.contains("Players: ana, bo"));
}

#[tokio::test]
async fn test_scheduling_vote_and_finalize() {
    let mut shell = new_shell();
    let campaign = campaign_with_players(&mut shell).await;

    let output = ok(
        &mut shell,
        r#"propose "Session 1" 2026-11-07 18:30 "Game Store" 2026-11-08 19:00-23:00 Online"#,
    )
    .await;
    assert!(output.contains("Proposal 'Session 1' opened with 2 options."));
    assert!(output.contains("voting open"));
    let proposal = proposal_of(&shell);
    let proposal_page = Route::Proposal(proposal).to_string();

    switch_user(&mut shell, "ana").await;
    run(&mut shell, &proposal_page).await;
    let output = ok(&mut shell, "vote 2 yes").await;
    assert!(output.contains("Voted yes on option 2."));
    let output = ok(&mut shell, "vote 2 maybe").await;
    assert!(output.contains("Changed option 2 from yes to maybe."));
    ok(&mut shell, "vote 1 no").await;
    let output = ok(&mut shell, "unvote 1").await;
    assert!(output.contains("Removed your no vote on option 1."));

    let output = run(&mut shell, "vote 3 yes").await;
    assert!(output.starts_with("! "), "out-of-range option accepted: {}", output);
    let output = run(&mut shell, "finalize 2").await;
    assert_eq!(output, "! Only the campaign's DM can do that");

    switch_user(&mut shell, "bo").await;
    run(&mut shell, &proposal_page).await;
    let output = ok(&mut shell, "vote 2 yes").await;
    assert!(output.contains("yes: bo"));
    assert!(output.contains("maybe: ana"));
    assert!(output.contains("Most popular so far: option 2"));

    switch_user(&mut shell, "mira").await;
    run(&mut shell, &proposal_page).await;
    let output = ok(&mut shell, "finalize 2").await;
    assert!(output.contains("Session locked in for 2026-11-08 19:00."));
    assert!(output.contains("<== chosen"));

    // Finalizing again changes nothing and schedules nothing twice.
    let output = ok(&mut shell, "finalize 2").await;
    assert!(output.contains("Option 2 was already chosen."));
    let output = run(&mut shell, "finalize 1").await;
    assert!(output.starts_with("! "));

    let schedule = run(&mut shell, &Route::CampaignSchedule(campaign).to_string()).await;
    assert_eq!(schedule.matches("Session 1 [Curse of Strahd]").count(), 1);

    switch_user(&mut shell, "ana").await;
    let dashboard = run(&mut shell, "#dashboard").await;
    assert!(dashboard.contains("Session 1 [Curse of Strahd]"));
}

#[tokio::test]
async fn test_direct_session_and_wrong_page_commands() {
    let mut shell = new_shell();
    campaign_with_players(&mut shell).await;

    let output = ok(
        &mut shell,
        r#"session new "One-shot" 2026-12-31 20:00-23:30 "Mira's place""#,
    )
    .await;
    assert!(output.contains("Scheduled:"));
    assert!(output.contains("One-shot [Curse of Strahd]"));

    let output = run(&mut shell, r#"session new "Bad" 2026-12-31 20:00-20:00 Home"#).await;
    assert!(output.starts_with("! "));

    let output = ok(&mut shell, r#"session new "Late" 2026-12-30 21:00-01:00 Home"#).await;
    assert!(output.contains("21:00-01:00 (+1 day)"));

    run(&mut shell, "#dashboard").await;
    let output = run(&mut shell, "vote 1 yes").await;
    assert_eq!(output, "! Open a proposal (#session?proposal=<id>) first");
    let output = run(&mut shell, "campaign add bo").await;
    assert_eq!(output, "! Open a campaign page first");
    let output = run(&mut shell, "dance").await;
    assert_eq!(output, "! Unknown command 'dance', type help");
}

#[tokio::test]
async fn test_state_survives_restart() {
    let storage = Arc::new(MemoryStorageProvider::new());
    let mut shell = Shell::new(build_app(storage.clone(), chooser(None), vec![10]));
    ok(&mut shell, "register mira pw dm").await;
    ok(&mut shell, r#"campaign new "Storm King's Thunder""#).await;
    let campaign = campaign_of(&shell);

    let mut restarted = Shell::new(build_app(storage, chooser(None), vec![10]));
    let dashboard = restarted.navigate("#dashboard").await;
    assert!(dashboard.contains("mira (DM)"));
    assert!(dashboard.contains("Storm King's Thunder"));
    let page = restarted
        .navigate(&Route::Campaign(campaign).to_string())
        .await;
    assert!(page.contains("== Storm King's Thunder =="));

    assert_eq!(
        restarted.handle_line("quit").await,
        Flow::Quit("Farewell, adventurer.".to_string())
    );
}
