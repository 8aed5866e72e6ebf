use async_trait::async_trait;
use shared::wire::{
    CalendarEventRecord, CreateCalendarEvent, CreateGoal, CreateMember, CreateMission,
    CreateTransaction, GoalRecord, JoinRequestRecord, MissionRecord, ProfileUpdate,
    TransactionRecord, UpdateMission,
};
use shared::{
    BudgetTransaction, CalendarEvent, Goal, JoinRequest, Member, NewEvent, NewGoal, NewMember,
    NewTodo, NewTransaction, Profile, Todo,
};

use super::NestRepository;
use crate::api::ApiClient;
use crate::error::StoreError;

/// Repository scoped to one nest on the server.
pub struct RemoteRepository {
    api: ApiClient,
    nest_id: String,
}

impl RemoteRepository {
    pub fn new(api: ApiClient, nest_id: &str) -> Self {
        Self {
            api,
            nest_id: nest_id.to_string(),
        }
    }

    pub fn nest_id(&self) -> &str {
        &self.nest_id
    }

    pub async fn fetch_todos(&self) -> Result<Vec<Todo>, StoreError> {
        let records = self.api.list_missions(&self.nest_id).await?;
        Ok(records.iter().map(MissionRecord::to_shared).collect())
    }

    pub async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, StoreError> {
        let records = self.api.list_calendar_events(&self.nest_id).await?;
        Ok(records.iter().map(CalendarEventRecord::to_shared).collect())
    }

    pub async fn fetch_transactions(&self) -> Result<Vec<BudgetTransaction>, StoreError> {
        let records = self.api.list_transactions(&self.nest_id).await?;
        Ok(records.iter().map(TransactionRecord::to_shared).collect())
    }

    pub async fn fetch_goals(&self) -> Result<Vec<Goal>, StoreError> {
        let records = self.api.list_goals(&self.nest_id).await?;
        Ok(records.iter().map(GoalRecord::to_shared).collect())
    }

    pub async fn fetch_members(&self) -> Result<Vec<Member>, StoreError> {
        Ok(self.api.list_members(&self.nest_id).await?.into_shared())
    }

    pub async fn fetch_join_requests(&self) -> Result<Vec<JoinRequest>, StoreError> {
        let records = self.api.list_join_requests(&self.nest_id).await?;
        Ok(records.iter().map(JoinRequestRecord::to_shared).collect())
    }

    /// Admits `user_id` and returns the server's member list afterwards.
    pub async fn approve_join_request(&self, user_id: &str) -> Result<Vec<Member>, StoreError> {
        Ok(self
            .api
            .approve_join_request(&self.nest_id, user_id)
            .await?
            .into_shared())
    }
}

#[async_trait]
impl NestRepository for RemoteRepository {
    async fn create_todo(&self, todo: &NewTodo, _members: &[Member]) -> Result<Todo, StoreError> {
        let record = self
            .api
            .create_mission(&self.nest_id, CreateMission::from(todo))
            .await?;
        Ok(record.to_shared())
    }

    async fn set_todo_completed(
        &self,
        todo_id: &str,
        completed: bool,
        member_id: &str,
    ) -> Result<(), StoreError> {
        let update = UpdateMission {
            is_completed: completed,
            completed_by: completed.then(|| member_id.to_string()),
        };
        self.api.update_mission(&self.nest_id, todo_id, update).await
    }

    async fn delete_todo(&self, todo_id: &str) -> Result<(), StoreError> {
        self.api.delete_mission(&self.nest_id, todo_id).await
    }

    async fn create_event(
        &self,
        event: &NewEvent,
        profile: &Profile,
    ) -> Result<CalendarEvent, StoreError> {
        let record = self
            .api
            .create_calendar_event(&self.nest_id, CreateCalendarEvent::new(event, &profile.user_id))
            .await?;

        let mut created = record.to_shared();
        if created.creator_id.is_empty() {
            created.creator_id = profile.user_id.clone();
        }
        Ok(created)
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), StoreError> {
        self.api.delete_calendar_event(&self.nest_id, event_id).await
    }

    async fn create_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> Result<BudgetTransaction, StoreError> {
        let record = self
            .api
            .create_transaction(&self.nest_id, CreateTransaction::from(transaction))
            .await?;
        Ok(record.to_shared())
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<(), StoreError> {
        self.api
            .delete_transaction(&self.nest_id, transaction_id)
            .await
    }

    async fn create_goal(&self, goal: &NewGoal) -> Result<Goal, StoreError> {
        let record = self
            .api
            .create_goal(&self.nest_id, CreateGoal::from(goal))
            .await?;
        Ok(record.to_shared())
    }

    async fn set_goal_progress(&self, goal_id: &str, current: i64) -> Result<(), StoreError> {
        self.api
            .update_goal_progress(&self.nest_id, goal_id, current)
            .await
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<(), StoreError> {
        self.api.delete_goal(&self.nest_id, goal_id).await
    }

    async fn create_member(
        &self,
        member: &NewMember,
        _members: &[Member],
    ) -> Result<Vec<Member>, StoreError> {
        Ok(self
            .api
            .create_member(&self.nest_id, CreateMember::from(member))
            .await?
            .into_shared())
    }

    async fn update_profile(&self, nickname: &str, avatar_id: u32) -> Result<(), StoreError> {
        self.api
            .update_profile(ProfileUpdate {
                nickname: nickname.to_string(),
                avatar_id,
            })
            .await
    }
}
