//! Fragment router.
//!
//! Maps `#name?key=value` fragments to [`Route`]s and applies the login
//! guard. Query strings are form-urlencoded.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use questboard_domain::{CampaignId, CharacterId, ProposalId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Campaign(CampaignId),
    /// Calendar and open proposals of one campaign
    CampaignSchedule(CampaignId),
    /// Voting view of one proposal
    Proposal(ProposalId),
    CharacterCreator {
        campaign: Option<CampaignId>,
    },
    CharacterSheet(CharacterId),
    Timer,
    Dice,
    Items {
        query: Option<String>,
    },
    NotFound(String),
}

impl Route {
    /// Parse a fragment such as `#campaign?id=...`.
    ///
    /// Missing or malformed ids fall back to the dashboard; unknown names
    /// become [`Route::NotFound`].
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.trim().trim_start_matches('#');
        let (name, query) = fragment.split_once('?').unwrap_or((fragment, ""));
        let params = parse_query(query);

        match name.trim().to_lowercase().as_str() {
            "" | "dashboard" => Self::Dashboard,
            "login" => Self::Login,
            "register" => Self::Register,
            "campaign" => id_param(&params, "id").map_or(Self::Dashboard, Self::Campaign),
            "session" => {
                if params.contains_key("proposal") {
                    id_param(&params, "proposal").map_or(Self::Dashboard, Self::Proposal)
                } else {
                    id_param(&params, "campaign").map_or(Self::Dashboard, Self::CampaignSchedule)
                }
            }
            "character-creator" => match params.get("campaign") {
                None => Self::CharacterCreator { campaign: None },
                Some(raw) if raw.trim().is_empty() => Self::CharacterCreator { campaign: None },
                Some(raw) => raw
                    .parse()
                    .map_or(Self::Dashboard, |id| Self::CharacterCreator { campaign: Some(id) }),
            },
            "character-sheet" => id_param(&params, "id").map_or(Self::Dashboard, Self::CharacterSheet),
            "timer" => Self::Timer,
            "dice" => Self::Dice,
            "items" => Self::Items {
                query: params
                    .get("q")
                    .map(|q| q.trim().to_string())
                    .filter(|q| !q.is_empty()),
            },
            other => Self::NotFound(other.to_string()),
        }
    }

    /// Whether the route needs a logged-in user.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::Login | Self::Register | Self::NotFound(_))
    }

    /// Apply the login guard.
    ///
    /// Protected routes send anonymous users to the login view; the login and
    /// register views send logged-in users to the dashboard.
    pub fn guard(self, logged_in: bool) -> Self {
        match self {
            Self::Login | Self::Register if logged_in => Self::Dashboard,
            route if route.is_protected() && !logged_in => Self::Login,
            route => route,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(f, "#login"),
            Self::Register => write!(f, "#register"),
            Self::Dashboard => write!(f, "#dashboard"),
            Self::Campaign(id) => write!(f, "#campaign?id={}", id),
            Self::CampaignSchedule(id) => write!(f, "#session?campaign={}", id),
            Self::Proposal(id) => write!(f, "#session?proposal={}", id),
            Self::CharacterCreator { campaign: None } => write!(f, "#character-creator"),
            Self::CharacterCreator { campaign: Some(id) } => {
                write!(f, "#character-creator?campaign={}", id)
            }
            Self::CharacterSheet(id) => write!(f, "#character-sheet?id={}", id),
            Self::Timer => write!(f, "#timer"),
            Self::Dice => write!(f, "#dice"),
            Self::Items { query: None } => write!(f, "#items"),
            Self::Items { query: Some(q) } => {
                let encoded: String = url::form_urlencoded::byte_serialize(q.as_bytes()).collect();
                write!(f, "#items?q={}", encoded)
            }
            Self::NotFound(name) => write!(f, "#{}", name),
        }
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn id_param<T: FromStr>(params: &HashMap<String, String>, key: &str) -> Option<T> {
    params.get(key).and_then(|raw| raw.parse().ok())
}
