//! Dice roller, session timer and item library.

use std::sync::Arc;

use crate::api::Shell;
use crate::infrastructure::storage::MemoryStorageProvider;

use super::*;

#[tokio::test]
async fn test_dice_rolls_are_logged() {
    let mut shell = Shell::new(build_app(
        Arc::new(MemoryStorageProvider::new()),
        chooser(None),
        vec![20, 5, 3],
    ));
    ok(&mut shell, "register ana pw player").await;
    run(&mut shell, "#dice").await;

    let output = ok(&mut shell, "roll 1d20+5").await;
    assert!(output.starts_with("1d20[20] + 5 = 25  CRITICAL!"));
    assert!(output.contains("ana: 1d20+5 -> [20] = 25  CRITICAL!"));

    let output = ok(&mut shell, "roll 2d6").await;
    assert!(output.starts_with("2d6[5, 3] = 8\n"));

    let output = run(&mut shell, "roll 1d0").await;
    assert!(output.starts_with("! "));
    let output = run(&mut shell, "roll 1d20+2147483647").await;
    assert_eq!(output, "! Modifier must be between -10000 and +10000");
    let output = run(&mut shell, "roll").await;
    assert_eq!(output, "! Usage: roll <expression>");
}

#[tokio::test]
async fn test_dice_log_keeps_newest_entries() {
    let mut shell = new_shell();
    ok(&mut shell, "register ana pw player").await;
    run(&mut shell, "#dice").await;

    for modifier in 1..=7 {
        ok(&mut shell, &format!("roll 1d4+{}", modifier)).await;
    }
    let view = run(&mut shell, "#dice").await;
    assert_eq!(view.matches(" -> [").count(), 5);
    assert!(view.contains("1d4+7"));
    assert!(!view.contains("1d4+2 "));
}

#[tokio::test]
async fn test_session_timer_commands() {
    let mut shell = new_shell();
    ok(&mut shell, "register mira pw dm").await;

    let view = run(&mut shell, "#timer").await;
    assert!(view.contains("00:00:00  (stopped)"));

    let output = ok(&mut shell, "timer start").await;
    assert!(output.starts_with("Timer started."));
    assert!(output.contains("(running)"));
    let output = ok(&mut shell, "timer start").await;
    assert!(output.starts_with("Timer is already running."));
    let output = ok(&mut shell, "timer stop").await;
    assert!(output.starts_with("Timer paused."));
    let output = ok(&mut shell, "timer reset").await;
    assert!(output.starts_with("Timer reset. 00:00:00"));
    assert!(output.contains("(stopped)"));

    let output = run(&mut shell, "timer lap").await;
    assert_eq!(output, "! Usage: timer start|stop|reset");
}

#[tokio::test]
async fn test_item_library_search() {
    let mut shell = new_shell();
    ok(&mut shell, "register ana pw player").await;

    let view = run(&mut shell, "#items").await;
    assert!(view.contains("== Item library (2 items) =="));
    assert!(view.contains("Longsword [longsword]"));

    let view = run(&mut shell, "#items?q=ROPE").await;
    assert!(view.contains("== Item library: \"ROPE\" (1 found) =="));
    assert!(view.contains("Category: Adventuring Gear"));
    assert!(view.contains("Cost: 1 gp"));
    assert!(view.contains("Weight: 10 lb"));

    let view = run(&mut shell, "#items?q=vorpal").await;
    assert!(view.contains("(0 found)"));
}

#[tokio::test]
async fn test_help_and_quit() {
    let mut shell = new_shell();
    let output = run(&mut shell, "help").await;
    assert!(output.starts_with("Navigation:"));
    assert!(output.contains("== Log in =="));

    assert_eq!(run(&mut shell, "   ").await, "");
    assert!(matches!(
        shell.handle_line("quit").await,
        crate::api::Flow::Quit(_)
    ));
}
