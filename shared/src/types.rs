use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

// ============================================================================
// Profile & Nest Types
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub nickname: String,
    pub avatar_id: u32,
    pub user_email: String,
}

/// Household identity. An empty `nest_id` means no household has been joined
/// and the store runs in local mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nest {
    pub nest_name: String,
    pub nest_theme: i32,
    pub nest_id: String,
    pub invite_code: String,
    pub is_logged_in: bool,
}

impl Nest {
    pub fn is_joined(&self) -> bool {
        !self.nest_id.is_empty()
    }
}

// ============================================================================
// Member Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Human,
    Baby,
    Pet,
    Plant,
    Ai,
}

impl FromStr for MemberType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(MemberType::Human),
            "baby" => Ok(MemberType::Baby),
            "pet" => Ok(MemberType::Pet),
            "plant" => Ok(MemberType::Plant),
            "ai" => Ok(MemberType::Ai),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub nickname: String,
    pub avatar_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_type: Option<MemberType>,
}

/// A user waiting to be admitted into the nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub id: String,
    pub nickname: String,
    pub avatar_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub nickname: String,
    pub avatar_id: u32,
    pub member_type: MemberType,
}

// ============================================================================
// Todo Types
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for Repeat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(Repeat::None),
            "daily" => Ok(Repeat::Daily),
            "weekly" => Ok(Repeat::Weekly),
            "monthly" => Ok(Repeat::Monthly),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
    pub assignees: Vec<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub repeat: Repeat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    pub assignee_ids: Vec<String>,
    pub repeat: Repeat,
    pub image_url: Option<String>,
}

// ============================================================================
// Calendar Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Event,
    Vote,
}

/// Voters per candidate date.
pub type Votes = BTreeMap<NaiveDate, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub votes: Votes,
    pub creator_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl CalendarEvent {
    /// Adds `user_id` to the voters of `date`, or removes it if already present.
    /// A date left without voters is dropped from the map.
    pub fn toggle_vote(&mut self, date: NaiveDate, user_id: &str) {
        let voters = self.votes.entry(date).or_default();
        if let Some(pos) = voters.iter().position(|v| v == user_id) {
            voters.remove(pos);
            if voters.is_empty() {
                self.votes.remove(&date);
            }
        } else {
            voters.push(user_id.to_string());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub time: Option<String>,
    pub image_url: Option<String>,
}

impl NewEvent {
    pub fn on(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
            end_date: None,
            time: None,
            image_url: None,
        }
    }
}

// ============================================================================
// Budget Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Housing,
    Living,
    Transport,
    Etc,
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "food" => Ok(Category::Food),
            "housing" => Ok(Category::Housing),
            "living" => Ok(Category::Living),
            "transport" => Ok(Category::Transport),
            "etc" => Ok(Category::Etc),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetTransaction {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub category: Category,
    pub date: NaiveDate,
    pub payer_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub title: String,
    pub amount: f64,
    pub category: Category,
    pub date: NaiveDate,
    pub payer_id: String,
}

// ============================================================================
// Goal Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Vision,
    Year,
    Month,
    Week,
}

impl FromStr for GoalKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vision" => Ok(GoalKind::Vision),
            "year" => Ok(GoalKind::Year),
            "month" => Ok(GoalKind::Month),
            "week" => Ok(GoalKind::Week),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    pub title: String,
    pub current: i64,
    pub target: i64,
    pub unit: String,
}

impl Goal {
    /// Next value for an increment, or `None` once the target is reached.
    pub fn next_increment(&self) -> Option<i64> {
        (self.current < self.target).then_some(self.current + 1)
    }

    /// Next value for a decrement, or `None` at zero.
    pub fn next_decrement(&self) -> Option<i64> {
        (self.current > 0).then_some(self.current - 1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    #[serde(rename = "type")]
    pub kind: GoalKind,
    pub title: String,
    pub target: i64,
    pub unit: String,
}

// ============================================================================
// API Response Types
// ============================================================================

/// Result shape of the account actions that report failures to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AccountOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_member_type_from_str() {
        assert_eq!("human".parse(), Ok(MemberType::Human));
        assert_eq!("BABY".parse(), Ok(MemberType::Baby));
        assert_eq!("Pet".parse(), Ok(MemberType::Pet));
        assert_eq!("plant".parse(), Ok(MemberType::Plant));
        assert_eq!("ai".parse(), Ok(MemberType::Ai));
        assert!("robot".parse::<MemberType>().is_err());
    }

    #[test]
    fn test_repeat_from_str() {
        assert_eq!("none".parse(), Ok(Repeat::None));
        assert_eq!("".parse(), Ok(Repeat::None));
        assert_eq!("DAILY".parse(), Ok(Repeat::Daily));
        assert_eq!("weekly".parse(), Ok(Repeat::Weekly));
        assert_eq!("Monthly".parse(), Ok(Repeat::Monthly));
        assert!("yearly".parse::<Repeat>().is_err());
    }

    #[test]
    fn test_category_and_goal_kind_from_str() {
        assert_eq!("food".parse(), Ok(Category::Food));
        assert_eq!("TRANSPORT".parse(), Ok(Category::Transport));
        assert!("fun".parse::<Category>().is_err());

        assert_eq!("vision".parse(), Ok(GoalKind::Vision));
        assert_eq!("Week".parse(), Ok(GoalKind::Week));
        assert!("day".parse::<GoalKind>().is_err());
    }

    #[test]
    fn test_goal_progress_bounds() {
        let mut goal = Goal {
            id: "g1".to_string(),
            kind: GoalKind::Month,
            title: "Run".to_string(),
            current: 0,
            target: 2,
            unit: "km".to_string(),
        };

        assert_eq!(goal.next_decrement(), None);
        assert_eq!(goal.next_increment(), Some(1));

        goal.current = 2;
        assert_eq!(goal.next_increment(), None);
        assert_eq!(goal.next_decrement(), Some(1));
    }

    #[test]
    fn test_toggle_vote_has_period_two() {
        let day = date("2025-01-01");
        let mut event = CalendarEvent {
            id: "e1".to_string(),
            title: "Dinner".to_string(),
            date: day,
            kind: EventKind::Vote,
            votes: Votes::new(),
            creator_id: "1".to_string(),
            image_url: None,
            end_date: None,
            time: None,
        };

        event.toggle_vote(day, "user-1");
        assert_eq!(event.votes.get(&day), Some(&vec!["user-1".to_string()]));

        event.toggle_vote(day, "user-1");
        assert!(event.votes.get(&day).is_none());
    }

    #[test]
    fn test_domain_types_serialize_camel_case() {
        let goal = Goal {
            id: "g1".to_string(),
            kind: GoalKind::Vision,
            title: "Travel".to_string(),
            current: 1,
            target: 3,
            unit: "trips".to_string(),
        };
        let json = serde_json::to_value(&goal).unwrap();
        assert_eq!(json["type"], "vision");

        let member = Member {
            id: "4".to_string(),
            nickname: "Mochi".to_string(),
            avatar_id: 2,
            member_type: Some(MemberType::Pet),
        };
        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["avatarId"], 2);
        assert_eq!(json["memberType"], "pet");
    }

    #[test]
    fn test_account_outcome() {
        assert_eq!(
            AccountOutcome::ok(),
            AccountOutcome {
                success: true,
                error: None
            }
        );
        let failed = AccountOutcome::failed("nope");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("nope"));
    }
}
