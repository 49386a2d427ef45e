//! Interactive shell: reads lines, navigates, runs commands, renders views.
//!
//! A line starting with `#` is a navigation. Anything else is a command
//! acting on the page currently shown (voting needs a proposal page, `xp`
//! needs a character sheet, and so on). After each successful command the
//! current page is rendered again; failures are shown as `! <message>`.

use std::io::Write;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use async_trait::async_trait;
use regex_lite::Regex;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use questboard_domain::{
    Ability, CampaignId, CharacterId, DomainError, FinalizeOutcome, ProposalId, Role, TimeSlot,
    VoteChoice, VoteOutcome,
};

use crate::api::router::Route;
use crate::api::timer::{format_elapsed, SessionTimer};
use crate::api::views;
use crate::app::App;
use crate::infrastructure::ports::{AbilityChoicePort, AbilityIncreasePrompt};
use crate::use_cases::auth::AuthError;
use crate::use_cases::campaign::CampaignError;
use crate::use_cases::character::{CharacterError, CreateCharacterInput, XpReport};
use crate::use_cases::dice::DiceError;
use crate::use_cases::scheduling::SchedulingError;

/// Words, or double-quoted phrases with the quotes removed.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)"|(\S+)"#).expect("valid regex"));

const HELP: &str = "\
Navigation: #login #register #dashboard #campaign?id=<id> #session?campaign=<id>
            #session?proposal=<id> #character-creator?campaign=<id>
            #character-sheet?id=<id> #timer #dice #items?q=<text>
Accounts:   register <username> <password> <dm|player> | login <username> <password> | logout
Campaigns:  campaign new \"<name>\" | campaign join <id>
            campaign add|remove <username> | campaign notes|private|say \"<text>\"
Sessions:   session new \"<title>\" <YYYY-MM-DD> <HH:MM[-HH:MM]> \"<location>\"
            propose \"<title>\" <YYYY-MM-DD> <HH:MM[-HH:MM]> \"<location>\" [...]
            vote <option> <yes|maybe|no> | unvote <option> | finalize <option>
Characters: character new \"<name>\" <race> <class> <STR> <DEX> <CON> <INT> <WIS> <CHA> [subclass]
            xp <amount> | asi <ABILITY[,ABILITY]> | item add|remove <index> [qty]
Table:      roll <expression> | timer start|stop|reset
Other:      help | quit";

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Open {0} first")]
    WrongPage(&'static str),

    #[error("Unknown command '{0}', type help")]
    UnknownCommand(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Campaign(#[from] CampaignError),

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error(transparent)]
    Character(#[from] CharacterError),

    #[error(transparent)]
    Dice(#[from] DiceError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// What the loop should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit(String),
}

enum Reply {
    Message(String),
    Quit,
}

pub struct Shell {
    app: Arc<App>,
    route: Route,
    timer: SessionTimer,
}

impl Shell {
    pub fn new(app: Arc<App>) -> Self {
        Self {
            app,
            route: Route::Dashboard,
            timer: SessionTimer::new(),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Switch to a fragment (guarded) and render it.
    pub async fn navigate(&mut self, fragment: &str) -> String {
        self.go(Route::parse(fragment)).await;
        self.render().await
    }

    pub async fn render(&self) -> String {
        views::render(&self.app, &self.route, &self.timer).await
    }

    async fn go(&mut self, route: Route) {
        let logged_in = self.app.use_cases.auth.current_user().await.is_some();
        self.route = route.guard(logged_in);
        tracing::debug!(route = %self.route, "Navigated");
    }

    pub async fn handle_line(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue(String::new());
        }
        if line.starts_with('#') {
            return Flow::Continue(self.navigate(line).await);
        }

        let tokens = tokenize(line);
        match self.execute(&tokens).await {
            Ok(Reply::Quit) => Flow::Quit("Farewell, adventurer.".to_string()),
            Ok(Reply::Message(message)) => {
                let view = self.render().await;
                if message.is_empty() {
                    Flow::Continue(view)
                } else {
                    Flow::Continue(format!("{}\n\n{}", message, view))
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, command = %line, "Command failed");
                Flow::Continue(format!("! {}", e))
            }
        }
    }

    async fn execute(&mut self, tokens: &[String]) -> Result<Reply, ShellError> {
        let Some((command, args)) = tokens.split_first() else {
            return Ok(Reply::Message(String::new()));
        };
        match command.to_lowercase().as_str() {
            "help" | "?" => Ok(Reply::Message(HELP.to_string())),
            "quit" | "exit" => Ok(Reply::Quit),
            "register" => self.register(args).await,
            "login" => self.login(args).await,
            "logout" => {
                self.app.use_cases.auth.logout().await?;
                self.go(Route::Login).await;
                Ok(Reply::Message("Logged out.".to_string()))
            }
            "campaign" => self.campaign(args).await,
            "session" => self.session(args).await,
            "propose" => self.propose(args).await,
            "vote" => self.vote(args).await,
            "unvote" => self.unvote(args).await,
            "finalize" => self.finalize(args).await,
            "character" => self.character(args).await,
            "xp" => self.award_xp(args).await,
            "asi" => self.ability_increase(args).await,
            "item" => self.item(args).await,
            "roll" => self.roll(args).await,
            "timer" => self.timer(args),
            other => Err(ShellError::UnknownCommand(other.to_string())),
        }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    async fn register(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let [username, password, role] = args else {
            return Err(ShellError::Usage("register <username> <password> <dm|player>"));
        };
        let role: Role = role.parse()?;
        let user = self
            .app
            .use_cases
            .auth
            .register(username, password, role)
            .await?;
        self.go(Route::Dashboard).await;
        Ok(Reply::Message(format!(
            "Welcome, {}! You are registered as {}.",
            user.username, user.role
        )))
    }

    async fn login(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let [username, password] = args else {
            return Err(ShellError::Usage("login <username> <password>"));
        };
        let user = self.app.use_cases.auth.login(username, password).await?;
        self.go(Route::Dashboard).await;
        Ok(Reply::Message(format!("Welcome back, {}.", user.username)))
    }

    // =========================================================================
    // Campaigns
    // =========================================================================

    fn campaign_context(&self) -> Result<CampaignId, ShellError> {
        match self.route {
            Route::Campaign(id) | Route::CampaignSchedule(id) => Ok(id),
            _ => Err(ShellError::WrongPage("a campaign page")),
        }
    }

    async fn campaign(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let app = self.app.clone();
        let campaigns = &app.use_cases.campaign;
        let (sub, rest) = args
            .split_first()
            .ok_or(ShellError::Usage("campaign new|join|add|remove|notes|private|say ..."))?;
        match sub.to_lowercase().as_str() {
            "new" => {
                let name = joined(rest).ok_or(ShellError::Usage("campaign new \"<name>\""))?;
                let campaign = campaigns.create(&name).await?;
                self.go(Route::Campaign(campaign.id())).await;
                Ok(Reply::Message(format!("Campaign '{}' created.", campaign.name())))
            }
            "join" => {
                let [id] = rest else {
                    return Err(ShellError::Usage("campaign join <id>"));
                };
                let id: CampaignId = id.parse()?;
                let campaign = campaigns.join(id).await?;
                self.go(Route::Campaign(id)).await;
                Ok(Reply::Message(format!("You joined '{}'.", campaign.name())))
            }
            "add" => {
                let [username] = rest else {
                    return Err(ShellError::Usage("campaign add <username>"));
                };
                campaigns.add_player(self.campaign_context()?, username).await?;
                Ok(Reply::Message(format!("{} added.", username)))
            }
            "remove" => {
                let [username] = rest else {
                    return Err(ShellError::Usage("campaign remove <username>"));
                };
                campaigns
                    .remove_player(self.campaign_context()?, username)
                    .await?;
                Ok(Reply::Message(format!("{} removed.", username)))
            }
            "notes" => {
                let text = rest.join(" ");
                campaigns
                    .update_shared_notes(self.campaign_context()?, &text)
                    .await?;
                Ok(Reply::Message("Shared notes saved.".to_string()))
            }
            "private" => {
                let text = rest.join(" ");
                campaigns
                    .update_private_notes(self.campaign_context()?, &text)
                    .await?;
                Ok(Reply::Message("Private notes saved.".to_string()))
            }
            "say" => {
                let text = joined(rest).ok_or(ShellError::Usage("campaign say \"<text>\""))?;
                campaigns.post_message(self.campaign_context()?, &text).await?;
                Ok(Reply::Message(String::new()))
            }
            _ => Err(ShellError::Usage(
                "campaign new|join|add|remove|notes|private|say ...",
            )),
        }
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    fn proposal_context(&self) -> Result<ProposalId, ShellError> {
        match self.route {
            Route::Proposal(id) => Ok(id),
            _ => Err(ShellError::WrongPage("a proposal (#session?proposal=<id>)")),
        }
    }

    async fn session(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let usage = "session new \"<title>\" <YYYY-MM-DD> <HH:MM[-HH:MM]> \"<location>\"";
        let [sub, title, date, time, location] = args else {
            return Err(ShellError::Usage(usage));
        };
        if !sub.eq_ignore_ascii_case("new") {
            return Err(ShellError::Usage(usage));
        }
        let campaign = self.campaign_context()?;
        let slot = parse_slot(date, time, location)?;
        let session = self
            .app
            .use_cases
            .scheduling
            .schedule_session(campaign, title, slot)
            .await?;
        Ok(Reply::Message(format!("Scheduled: {}", session.slot)))
    }

    async fn propose(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let usage = "propose \"<title>\" <YYYY-MM-DD> <HH:MM[-HH:MM]> \"<location>\" [...]";
        let (title, options) = args.split_first().ok_or(ShellError::Usage(usage))?;
        if options.is_empty() || options.len() % 3 != 0 {
            return Err(ShellError::Usage(usage));
        }
        let campaign = self.campaign_context()?;
        let slots = options
            .chunks(3)
            .map(|chunk| parse_slot(&chunk[0], &chunk[1], &chunk[2]))
            .collect::<Result<Vec<TimeSlot>, ShellError>>()?;

        let proposal = self
            .app
            .use_cases
            .scheduling
            .create_proposal(campaign, title, slots)
            .await?;
        self.go(Route::Proposal(proposal.id())).await;
        Ok(Reply::Message(format!(
            "Proposal '{}' opened with {} options.",
            proposal.title(),
            proposal.options().len()
        )))
    }

    async fn vote(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let [option, choice] = args else {
            return Err(ShellError::Usage("vote <option> <yes|maybe|no>"));
        };
        let proposal = self.proposal_context()?;
        let index = parse_option(option)?;
        let choice: VoteChoice = choice.parse()?;
        let outcome = self
            .app
            .use_cases
            .scheduling
            .vote(proposal, index, choice)
            .await?;
        let message = match outcome {
            VoteOutcome::Recorded(c) => format!("Voted {} on option {}.", c, index + 1),
            VoteOutcome::Changed { from, to } => {
                format!("Changed option {} from {} to {}.", index + 1, from, to)
            }
            VoteOutcome::Unchanged(c) => format!("Already voted {} on option {}.", c, index + 1),
        };
        Ok(Reply::Message(message))
    }

    async fn unvote(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let [option] = args else {
            return Err(ShellError::Usage("unvote <option>"));
        };
        let proposal = self.proposal_context()?;
        let index = parse_option(option)?;
        let removed = self
            .app
            .use_cases
            .scheduling
            .retract_vote(proposal, index)
            .await?;
        Ok(Reply::Message(match removed {
            Some(choice) => format!("Removed your {} vote on option {}.", choice, index + 1),
            None => format!("You had not voted on option {}.", index + 1),
        }))
    }

    async fn finalize(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let [option] = args else {
            return Err(ShellError::Usage("finalize <option>"));
        };
        let proposal = self.proposal_context()?;
        let index = parse_option(option)?;
        let outcome = self
            .app
            .use_cases
            .scheduling
            .finalize(proposal, index)
            .await?;
        Ok(Reply::Message(match outcome {
            FinalizeOutcome::Finalized { starts_at, .. } => {
                format!("Session locked in for {}.", starts_at.format("%Y-%m-%d %H:%M"))
            }
            FinalizeOutcome::AlreadyFinalized { option_index } => {
                format!("Option {} was already chosen.", option_index + 1)
            }
        }))
    }

    // =========================================================================
    // Characters
    // =========================================================================

    fn character_context(&self) -> Result<CharacterId, ShellError> {
        match self.route {
            Route::CharacterSheet(id) => Ok(id),
            _ => Err(ShellError::WrongPage("a character sheet")),
        }
    }

    async fn character(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let usage = "character new \"<name>\" <race> <class> <STR> <DEX> <CON> <INT> <WIS> <CHA> [subclass]";
        let Some((sub, rest)) = args.split_first() else {
            return Err(ShellError::Usage(usage));
        };
        if !sub.eq_ignore_ascii_case("new") || !(9..=10).contains(&rest.len()) {
            return Err(ShellError::Usage(usage));
        }
        let campaign_id = match self.route {
            Route::CharacterCreator { campaign } => campaign,
            Route::Campaign(id) => Some(id),
            _ => None,
        };

        let mut scores = [0i32; 6];
        for (slot, raw) in scores.iter_mut().zip(&rest[3..9]) {
            *slot = raw
                .parse()
                .map_err(|_| DomainError::parse(format!("'{}' is not an ability score", raw)))?;
        }
        let input = CreateCharacterInput {
            name: rest[0].clone(),
            race_index: rest[1].clone(),
            class_index: rest[2].clone(),
            subclass_index: rest.get(9).cloned(),
            scores,
            campaign_id,
        };
        let character = self.app.use_cases.character.create(input).await?;
        self.go(Route::CharacterSheet(character.id())).await;
        Ok(Reply::Message(format!(
            "{} the {} {} is ready.",
            character.name(),
            character.race().name,
            character.class().name
        )))
    }

    async fn award_xp(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let [amount] = args else {
            return Err(ShellError::Usage("xp <amount>"));
        };
        let character = self.character_context()?;
        let amount: i64 = amount
            .parse()
            .map_err(|_| DomainError::parse(format!("'{}' is not a number", amount)))?;
        let report = self
            .app
            .use_cases
            .character
            .award_xp(character, amount)
            .await?;
        Ok(Reply::Message(describe_xp(&report)))
    }

    async fn ability_increase(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let character = self.character_context()?;
        let input = args.join(" ");
        let applied = self
            .app
            .use_cases
            .character
            .apply_ability_increase(character, &input)
            .await?;
        Ok(Reply::Message(if applied {
            "Ability scores increased.".to_string()
        } else {
            "No change: pick one ability (+2) or two different abilities (+1 each).".to_string()
        }))
    }

    async fn item(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let usage = "item add|remove <index> [qty]";
        let (sub, index, quantity) = match args {
            [sub, index] => (sub, index, 1),
            [sub, index, qty] => {
                let qty: u32 = qty
                    .parse()
                    .map_err(|_| DomainError::parse(format!("'{}' is not a quantity", qty)))?;
                (sub, index, qty)
            }
            _ => return Err(ShellError::Usage(usage)),
        };
        let character = self.character_context()?;
        let characters = &self.app.use_cases.character;
        match sub.to_lowercase().as_str() {
            "add" => {
                let item = characters.add_item(character, index, quantity).await?;
                Ok(Reply::Message(format!("Now carrying {} x{}.", item.name, item.quantity)))
            }
            "remove" => {
                let left = characters.remove_item(character, index, quantity).await?;
                Ok(Reply::Message(format!("{} left: {}.", index, left)))
            }
            _ => Err(ShellError::Usage(usage)),
        }
    }

    // =========================================================================
    // Table tools
    // =========================================================================

    async fn roll(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let expression = joined(args).ok_or(ShellError::Usage("roll <expression>"))?;
        let (result, entry) = self.app.use_cases.dice.roll(&expression).await?;
        let crit = if entry.critical { "  CRITICAL!" } else { "" };
        Ok(Reply::Message(format!("{}{}", result.breakdown(), crit)))
    }

    fn timer(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let usage = "timer start|stop|reset";
        let [sub] = args else {
            return Err(ShellError::Usage(usage));
        };
        let now = Instant::now();
        let message = match sub.to_lowercase().as_str() {
            "start" if self.timer.start(now) => "Timer started.",
            "start" => "Timer is already running.",
            "stop" if self.timer.stop(now) => "Timer paused.",
            "stop" => "Timer is not running.",
            "reset" => {
                self.timer.reset();
                "Timer reset."
            }
            _ => return Err(ShellError::Usage(usage)),
        };
        Ok(Reply::Message(format!(
            "{} {}",
            message,
            format_elapsed(self.timer.elapsed(now))
        )))
    }
}

/// Split a command line into words and quoted phrases.
pub fn tokenize(line: &str) -> Vec<String> {
    TOKEN_RE
        .captures_iter(line)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn joined(args: &[String]) -> Option<String> {
    let text = args.join(" ");
    (!text.trim().is_empty()).then_some(text)
}

/// One-based option number from the user, zero-based index for the engine.
fn parse_option(raw: &str) -> Result<usize, ShellError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(DomainError::parse(format!("'{}' is not an option number", raw)).into()),
    }
}

/// `<date> <HH:MM[-HH:MM]> <location>`
fn parse_slot(date: &str, time: &str, location: &str) -> Result<TimeSlot, ShellError> {
    let (start, end) = match time.split_once('-') {
        Some((start, end)) => (start, Some(end)),
        None => (time, None),
    };
    Ok(TimeSlot::parse(date, start, end, location)?)
}

fn describe_xp(report: &XpReport) -> String {
    let mut lines = vec![format!(
        "+{} XP (total {}).",
        report.award.amount, report.award.total_xp
    )];
    for level in &report.levels {
        let mut line = format!(
            "Level {}! +{} HP (max {}).",
            level.level, level.hp_gained, level.new_max_hp
        );
        if !level.features_added.is_empty() {
            line.push_str(&format!(" New: {}.", level.features_added.join(", ")));
        }
        match (level.ability_increase_offered, level.ability_increase) {
            (_, Some(increase)) => line.push_str(&format!(" Ability scores: {}.", increase)),
            (true, None) => line.push_str(" Ability score improvement skipped."),
            (false, None) => {}
        }
        lines.push(line);
    }
    lines.join("\n")
}

// =============================================================================
// Console input
// =============================================================================

/// Line reader over stdin, shared by the shell loop and interactive prompts.
///
/// The lock is held only while one line is read.
pub struct ConsoleInput {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleInput {
    pub fn stdin() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Next line, `None` at end of input.
    pub async fn next_line(&self) -> std::io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }
}

/// Asks for ability score improvements on the console.
pub struct StdinAbilityChooser {
    input: Arc<ConsoleInput>,
}

impl StdinAbilityChooser {
    pub fn new(input: Arc<ConsoleInput>) -> Self {
        Self { input }
    }
}

#[async_trait]
impl AbilityChoicePort for StdinAbilityChooser {
    async fn choose_increase(&self, prompt: &AbilityIncreasePrompt) -> Option<String> {
        let scores: Vec<String> = Ability::ALL
            .iter()
            .map(|a| format!("{} {}", a.short_name(), prompt.scores.get(*a)))
            .collect();
        println!(
            "{} reached level {}: Ability Score Improvement!",
            prompt.character_name, prompt.level
        );
        println!("  {}", scores.join("  "));
        print!("  Raise one ability by 2 (STR) or two by 1 (DEX,CON); blank to skip: ");
        if let Err(e) = std::io::stdout().flush() {
            tracing::debug!(error = %e, "Failed to flush prompt");
        }

        match self.input.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read ability choice");
                None
            }
        }
    }
}

/// Run the interactive loop until `quit` or end of input.
pub async fn run(app: Arc<App>, input: Arc<ConsoleInput>) -> anyhow::Result<()> {
    let mut shell = Shell::new(app);
    println!("{}", shell.navigate("#dashboard").await);
    println!("Type help for commands.");

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = input.next_line().await? else {
            break;
        };
        match shell.handle_line(&line).await {
            Flow::Continue(output) => {
                if !output.is_empty() {
                    println!("{}", output);
                }
            }
            Flow::Quit(message) => {
                println!("{}", message);
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_keeps_quoted_phrases() {
        assert_eq!(
            tokenize(r#"propose "Session 12" 2026-11-07 18:30 "Game Store""#),
            vec!["propose", "Session 12", "2026-11-07", "18:30", "Game Store"]
        );
        assert_eq!(tokenize("  roll   1d20+5 "), vec!["roll", "1d20+5"]);
        assert_eq!(tokenize(r#"campaign notes """#), vec!["campaign", "notes", ""]);
    }

    #[test]
    fn option_numbers_are_one_based() {
        assert_eq!(parse_option("1").expect("valid"), 0);
        assert_eq!(parse_option("3").expect("valid"), 2);
        assert!(parse_option("0").is_err());
        assert!(parse_option("first").is_err());
    }

    #[test]
    fn slots_accept_optional_end_time() {
        let slot = parse_slot("2026-11-07", "18:30-22:00", "Game Store").expect("valid");
        assert_eq!(slot.location(), "Game Store");
        assert!(slot.end().is_some());
        assert!(parse_slot("2026-11-07", "18:30", "Online").expect("valid").end().is_none());
        assert!(parse_slot("2026-11-07", "22:00-01:00", "x").expect("overnight").is_overnight());
        assert!(parse_slot("2026-11-07", "22:00-22:00", "x").is_err());
        assert!(parse_slot("11/07/2026", "18:30", "x").is_err());
    }
}
