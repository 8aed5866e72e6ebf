use async_trait::async_trait;
use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use shared::wire::{
    AccountDeletion, CalendarEventRecord, CalendarEventRequest, CreateCalendarEvent, CreateGoal,
    CreateMember, CreateMission, CreateNest, CreateTransaction, Credentials, GoalRecord,
    GoalRequest, JoinNest, JoinRequestRecord, MemberRequest, MembersResponse, MissionRecord,
    MissionRequest, NestRecord, NestRequest, PasswordChange, ProfileUpdate, Registration,
    SessionRecord, TransactionRecord, TransactionRequest, UpdateGoalProgress, UpdateMission,
    UserRequest,
};
use std::fmt;
use std::sync::Arc;

use crate::error::StoreError;

#[cfg(test)]
pub mod mock;
mod transport;

pub use transport::ReqwestTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and hands back the raw status and body. Non-2xx
/// statuses are not errors at this level.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, StoreError>;
}

fn nest_path(nest_id: &str, rest: &str) -> String {
    format!("/nests/{}/{}", nest_id, rest)
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<impl Serialize>,
    ) -> Result<ApiResponse, StoreError> {
        let body = body.map(|b| serde_json::to_value(&b)).transpose()?;

        debug!("{} {}", method, path);
        let response = self
            .transport
            .send(ApiRequest {
                method,
                path: path.to_string(),
                body,
            })
            .await?;

        if response.is_success() {
            Ok(response)
        } else {
            Err(StoreError::rejected(response.status, &response.body))
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<impl Serialize>,
    ) -> Result<T, StoreError> {
        let response = self.send(method, path, body).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Like `request`, for endpoints whose success body is not consumed.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<impl Serialize>,
    ) -> Result<(), StoreError> {
        self.send(method, path, body).await.map(|_| ())
    }

    // Account endpoints
    pub async fn login(&self, credentials: Credentials) -> Result<SessionRecord, StoreError> {
        self.request(Method::Post, "/login", Some(UserRequest { user: credentials }))
            .await
    }

    pub async fn signup(&self, registration: Registration) -> Result<SessionRecord, StoreError> {
        self.request(Method::Post, "/signup", Some(UserRequest { user: registration }))
            .await
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<(), StoreError> {
        self.execute(Method::Put, "/profile", Some(UserRequest { user: update }))
            .await
    }

    pub async fn update_password(&self, change: PasswordChange) -> Result<(), StoreError> {
        self.execute(Method::Put, "/users/password", Some(UserRequest { user: change }))
            .await
    }

    pub async fn delete_account(&self, deletion: AccountDeletion) -> Result<(), StoreError> {
        self.execute(Method::Delete, "/users", Some(UserRequest { user: deletion }))
            .await
    }

    // Nest endpoints
    pub async fn create_nest(&self, nest: CreateNest) -> Result<NestRecord, StoreError> {
        self.request(Method::Post, "/nests", Some(NestRequest { nest }))
            .await
    }

    pub async fn join_nest(&self, request: JoinNest) -> Result<(), StoreError> {
        self.execute(Method::Post, "/nests/join", Some(request)).await
    }

    // Member endpoints
    pub async fn list_members(&self, nest_id: &str) -> Result<MembersResponse, StoreError> {
        self.request(Method::Get, &nest_path(nest_id, "members"), None::<()>)
            .await
    }

    pub async fn create_member(
        &self,
        nest_id: &str,
        member: CreateMember,
    ) -> Result<MembersResponse, StoreError> {
        self.request(
            Method::Post,
            &nest_path(nest_id, "members"),
            Some(MemberRequest { member }),
        )
        .await
    }

    pub async fn list_join_requests(
        &self,
        nest_id: &str,
    ) -> Result<Vec<JoinRequestRecord>, StoreError> {
        self.request(Method::Get, &nest_path(nest_id, "requests"), None::<()>)
            .await
    }

    pub async fn approve_join_request(
        &self,
        nest_id: &str,
        user_id: &str,
    ) -> Result<MembersResponse, StoreError> {
        self.request(
            Method::Patch,
            &nest_path(nest_id, &format!("approve/{}", user_id)),
            None::<()>,
        )
        .await
    }

    // Mission endpoints
    pub async fn list_missions(&self, nest_id: &str) -> Result<Vec<MissionRecord>, StoreError> {
        self.request(Method::Get, &nest_path(nest_id, "missions"), None::<()>)
            .await
    }

    pub async fn create_mission(
        &self,
        nest_id: &str,
        mission: CreateMission,
    ) -> Result<MissionRecord, StoreError> {
        self.request(
            Method::Post,
            &nest_path(nest_id, "missions"),
            Some(MissionRequest { mission }),
        )
        .await
    }

    pub async fn update_mission(
        &self,
        nest_id: &str,
        mission_id: &str,
        mission: UpdateMission,
    ) -> Result<(), StoreError> {
        self.execute(
            Method::Patch,
            &nest_path(nest_id, &format!("missions/{}", mission_id)),
            Some(MissionRequest { mission }),
        )
        .await
    }

    pub async fn delete_mission(&self, nest_id: &str, mission_id: &str) -> Result<(), StoreError> {
        self.execute(
            Method::Delete,
            &nest_path(nest_id, &format!("missions/{}", mission_id)),
            None::<()>,
        )
        .await
    }

    // Calendar endpoints
    pub async fn list_calendar_events(
        &self,
        nest_id: &str,
    ) -> Result<Vec<CalendarEventRecord>, StoreError> {
        self.request(Method::Get, &nest_path(nest_id, "calendar_events"), None::<()>)
            .await
    }

    pub async fn create_calendar_event(
        &self,
        nest_id: &str,
        calendar_event: CreateCalendarEvent,
    ) -> Result<CalendarEventRecord, StoreError> {
        self.request(
            Method::Post,
            &nest_path(nest_id, "calendar_events"),
            Some(CalendarEventRequest { calendar_event }),
        )
        .await
    }

    pub async fn delete_calendar_event(
        &self,
        nest_id: &str,
        event_id: &str,
    ) -> Result<(), StoreError> {
        self.execute(
            Method::Delete,
            &nest_path(nest_id, &format!("calendar_events/{}", event_id)),
            None::<()>,
        )
        .await
    }

    // Transaction endpoints
    pub async fn list_transactions(
        &self,
        nest_id: &str,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        self.request(Method::Get, &nest_path(nest_id, "transactions"), None::<()>)
            .await
    }

    pub async fn create_transaction(
        &self,
        nest_id: &str,
        transaction: CreateTransaction,
    ) -> Result<TransactionRecord, StoreError> {
        self.request(
            Method::Post,
            &nest_path(nest_id, "transactions"),
            Some(TransactionRequest { transaction }),
        )
        .await
    }

    pub async fn delete_transaction(
        &self,
        nest_id: &str,
        transaction_id: &str,
    ) -> Result<(), StoreError> {
        self.execute(
            Method::Delete,
            &nest_path(nest_id, &format!("transactions/{}", transaction_id)),
            None::<()>,
        )
        .await
    }

    // Goal endpoints
    pub async fn list_goals(&self, nest_id: &str) -> Result<Vec<GoalRecord>, StoreError> {
        self.request(Method::Get, &nest_path(nest_id, "goals"), None::<()>)
            .await
    }

    pub async fn create_goal(&self, nest_id: &str, goal: CreateGoal) -> Result<GoalRecord, StoreError> {
        self.request(
            Method::Post,
            &nest_path(nest_id, "goals"),
            Some(GoalRequest { goal }),
        )
        .await
    }

    pub async fn update_goal_progress(
        &self,
        nest_id: &str,
        goal_id: &str,
        current: i64,
    ) -> Result<(), StoreError> {
        self.execute(
            Method::Patch,
            &nest_path(nest_id, &format!("goals/{}", goal_id)),
            Some(GoalRequest {
                goal: UpdateGoalProgress { current },
            }),
        )
        .await
    }

    pub async fn delete_goal(&self, nest_id: &str, goal_id: &str) -> Result<(), StoreError> {
        self.execute(
            Method::Delete,
            &nest_path(nest_id, &format!("goals/{}", goal_id)),
            None::<()>,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_request_paths_and_bodies() {
        let transport = MockTransport::new();
        transport.respond(200, json!([]));
        transport.respond(200, json!({ "id": 3, "type": "week", "title": "Read", "target": 5 }));
        transport.respond_empty(204);

        let api = ApiClient::new(transport.clone());
        api.list_missions("12").await.unwrap();
        let goal = api
            .create_goal(
                "12",
                CreateGoal {
                    goal_type: shared::GoalKind::Week,
                    title: "Read".to_string(),
                    current: 0,
                    target: 5,
                    unit: "books".to_string(),
                },
            )
            .await
            .unwrap();
        api.delete_goal("12", "3").await.unwrap();

        assert_eq!(goal.to_shared().id, "3");

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].path, "/nests/12/missions");
        assert!(requests[0].body.is_none());
        assert_eq!(requests[1].path, "/nests/12/goals");
        assert_eq!(requests[1].body.as_ref().unwrap()["goal"]["title"], "Read");
        assert_eq!(requests[2].method, Method::Delete);
        assert_eq!(requests[2].path, "/nests/12/goals/3");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let transport = MockTransport::new();
        transport.respond(404, json!({ "error": "Not found" }));

        let api = ApiClient::new(transport);
        let err = api.delete_mission("1", "2").await.unwrap_err();

        assert_eq!(err.user_message(), "Not found");
    }

    #[tokio::test]
    async fn test_approve_path() {
        let transport = MockTransport::new();
        transport.respond(200, json!({ "members": [] }));

        let api = ApiClient::new(transport.clone());
        api.approve_join_request("5", "9").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::Patch);
        assert_eq!(requests[0].path, "/nests/5/approve/9");
    }
}
