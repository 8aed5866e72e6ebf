//! Server-side shapes of the nest API.
//!
//! Records mirror the snake_case JSON the server returns and convert into the
//! camelCase domain types with `to_shared()`. Ids arrive as JSON numbers (or
//! occasionally strings) and are always normalised to `String` here, so the
//! rest of the client only ever compares ids as strings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::types::{
    BudgetTransaction, CalendarEvent, Category, EventKind, Goal, GoalKind, JoinRequest, Member,
    MemberType, NewEvent, NewGoal, NewMember, NewTodo, NewTransaction, Repeat, Todo, Votes,
};

// ============================================================================
// Id Normalisation
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Int(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

/// Deserializes a numeric or string id into a `String`.
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    WireId::deserialize(deserializer).map(WireId::into_string)
}

/// Same as [`id_string`] for nullable ids.
pub fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<WireId>::deserialize(deserializer)?.map(WireId::into_string))
}

/// Accepts any JSON number for a counter and rounds it to a whole step.
pub fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(f64::deserialize(deserializer)?.round() as i64)
}

// ============================================================================
// Member Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub nickname: String,
    #[serde(default)]
    pub avatar_id: u32,
    #[serde(default)]
    pub member_type: Option<String>,
}

impl MemberRecord {
    pub fn to_shared(&self) -> Member {
        Member {
            id: self.id.clone(),
            nickname: self.nickname.clone(),
            avatar_id: self.avatar_id,
            member_type: self
                .member_type
                .as_deref()
                .and_then(|t| MemberType::from_str(t).ok()),
        }
    }
}

/// Member list responses come either bare or wrapped in `{"members": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MembersResponse {
    Wrapped { members: Vec<MemberRecord> },
    Bare(Vec<MemberRecord>),
}

impl MembersResponse {
    pub fn into_shared(self) -> Vec<Member> {
        let records = match self {
            MembersResponse::Wrapped { members } => members,
            MembersResponse::Bare(members) => members,
        };
        records.iter().map(MemberRecord::to_shared).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequestRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub nickname: String,
    #[serde(default)]
    pub avatar_id: u32,
}

impl JoinRequestRecord {
    pub fn to_shared(&self) -> JoinRequest {
        JoinRequest {
            id: self.id.clone(),
            nickname: self.nickname.clone(),
            avatar_id: self.avatar_id,
        }
    }
}

// ============================================================================
// Mission (Todo) Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub assignees: Vec<MemberRecord>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub completed_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub repeat: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl MissionRecord {
    pub fn to_shared(&self) -> Todo {
        Todo {
            id: self.id.clone(),
            title: self.title.clone(),
            is_completed: self.is_completed,
            assignees: self.assignees.iter().map(MemberRecord::to_shared).collect(),
            completed_by: self.completed_by.clone(),
            created_at: self.created_at.unwrap_or_else(Utc::now),
            repeat: self
                .repeat
                .as_deref()
                .and_then(|r| Repeat::from_str(r).ok())
                .unwrap_or_default(),
            image_url: self.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMission {
    pub title: String,
    pub assignee_ids: Vec<String>,
    pub repeat: Repeat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<&NewTodo> for CreateMission {
    fn from(todo: &NewTodo) -> Self {
        Self {
            title: todo.title.clone(),
            assignee_ids: todo.assignee_ids.clone(),
            repeat: todo.repeat,
            image_url: todo.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMission {
    pub is_completed: bool,
    pub completed_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionRequest<T> {
    pub mission: T,
}

// ============================================================================
// Calendar Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<String>,
}

impl CalendarEventRecord {
    /// Server events are plain events; votes are a client-only feature.
    pub fn to_shared(&self) -> CalendarEvent {
        CalendarEvent {
            id: self.id.clone(),
            title: self.title.clone(),
            date: self.date,
            kind: EventKind::Event,
            votes: Votes::new(),
            creator_id: self.creator_id.clone().unwrap_or_default(),
            image_url: self.image_url.clone(),
            end_date: self.end_date,
            time: self.time.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCalendarEvent {
    pub title: String,
    pub date: NaiveDate,
    pub creator_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CreateCalendarEvent {
    pub fn new(event: &NewEvent, creator_id: &str) -> Self {
        Self {
            title: event.title.clone(),
            date: event.date,
            creator_id: creator_id.to_string(),
            end_date: event.end_date,
            time: event.time.clone(),
            image_url: event.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventRequest<T> {
    pub calendar_event: T,
}

// ============================================================================
// Budget Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    #[serde(deserialize_with = "id_string")]
    pub payer_id: String,
}

impl TransactionRecord {
    pub fn to_shared(&self) -> BudgetTransaction {
        BudgetTransaction {
            id: self.id.clone(),
            title: self.title.clone(),
            amount: self.amount,
            category: Category::from_str(&self.category).unwrap_or(Category::Etc),
            date: self.date,
            payer_id: self.payer_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransaction {
    pub title: String,
    pub amount: f64,
    pub category: Category,
    pub date: NaiveDate,
    pub payer_id: String,
}

impl From<&NewTransaction> for CreateTransaction {
    fn from(tx: &NewTransaction) -> Self {
        Self {
            title: tx.title.clone(),
            amount: tx.amount,
            category: tx.category,
            date: tx.date,
            payer_id: tx.payer_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest<T> {
    pub transaction: T,
}

// ============================================================================
// Goal Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "type")]
    pub goal_type: String,
    pub title: String,
    #[serde(default, deserialize_with = "whole_number")]
    pub current: i64,
    #[serde(deserialize_with = "whole_number")]
    pub target: i64,
    #[serde(default)]
    pub unit: String,
}

impl GoalRecord {
    pub fn to_shared(&self) -> Goal {
        Goal {
            id: self.id.clone(),
            kind: GoalKind::from_str(&self.goal_type).unwrap_or(GoalKind::Vision),
            title: self.title.clone(),
            current: self.current.max(0),
            target: self.target,
            unit: self.unit.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGoal {
    pub goal_type: GoalKind,
    pub title: String,
    pub current: i64,
    pub target: i64,
    pub unit: String,
}

impl From<&NewGoal> for CreateGoal {
    fn from(goal: &NewGoal) -> Self {
        Self {
            goal_type: goal.kind,
            title: goal.title.clone(),
            current: 0,
            target: goal.target,
            unit: goal.unit.clone(),
        }
    }
}

/// Progress updates carry the full next value, not a delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateGoalProgress {
    pub current: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalRequest<T> {
    pub goal: T,
}

// ============================================================================
// Member Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMember {
    pub nickname: String,
    pub avatar_id: u32,
    pub member_type: MemberType,
}

impl From<&NewMember> for CreateMember {
    fn from(member: &NewMember) -> Self {
        Self {
            nickname: member.nickname.clone(),
            avatar_id: member.avatar_id,
            member_type: member.member_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRequest<T> {
    pub member: T,
}

// ============================================================================
// Account & Nest Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub avatar_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub theme: i32,
    #[serde(default)]
    pub invite_code: String,
}

/// Body of a successful login or signup.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRecord {
    pub user: UserRecord,
    #[serde(default)]
    pub nest: Option<NestRecord>,
    #[serde(default)]
    pub members: Vec<MemberRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub nickname: String,
    pub avatar_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub nickname: String,
    pub avatar_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDeletion {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRequest<T> {
    pub user: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNest {
    pub name: String,
    pub theme: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestRequest<T> {
    pub nest: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinNest {
    pub invite_code: String,
}

// ============================================================================
// Error Bodies
// ============================================================================

/// Error payload of a rejected request: `{"errors": [...]}` or `{"error": "..."}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Human-readable message, preferring the `errors` array.
    pub fn message(&self) -> Option<String> {
        if let Some(errors) = self.errors.as_ref().filter(|e| !e.is_empty()) {
            return Some(errors.join(", "));
        }
        self.error.clone().or_else(|| self.message.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
