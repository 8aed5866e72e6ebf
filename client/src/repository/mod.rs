//! Data access strategy for the store.
//!
//! Every mutation that exists in both modes goes through [`NestRepository`].
//! [`LocalRepository`] answers immediately with synthesized ids;
//! [`RemoteRepository`] answers only after the server accepted the write.
//! The store picks one per call from the current nest id, see [`Backend`].

use async_trait::async_trait;
use shared::{
    BudgetTransaction, CalendarEvent, Goal, Member, Nest, NewEvent, NewGoal, NewMember,
    NewTodo, NewTransaction, Profile, Todo,
};

use crate::api::ApiClient;
use crate::error::StoreError;

mod local;
mod remote;

pub use local::{local_id, LocalRepository};
pub use remote::RemoteRepository;

#[async_trait]
pub trait NestRepository: Send + Sync {
    async fn create_todo(&self, todo: &NewTodo, members: &[Member]) -> Result<Todo, StoreError>;

    async fn set_todo_completed(
        &self,
        todo_id: &str,
        completed: bool,
        member_id: &str,
    ) -> Result<(), StoreError>;

    async fn delete_todo(&self, todo_id: &str) -> Result<(), StoreError>;

    async fn create_event(
        &self,
        event: &NewEvent,
        profile: &Profile,
    ) -> Result<CalendarEvent, StoreError>;

    async fn delete_event(&self, event_id: &str) -> Result<(), StoreError>;

    async fn create_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> Result<BudgetTransaction, StoreError>;

    async fn delete_transaction(&self, transaction_id: &str) -> Result<(), StoreError>;

    async fn create_goal(&self, goal: &NewGoal) -> Result<Goal, StoreError>;

    /// Stores the full next `current` value.
    async fn set_goal_progress(&self, goal_id: &str, current: i64) -> Result<(), StoreError>;

    async fn delete_goal(&self, goal_id: &str) -> Result<(), StoreError>;

    /// Returns the complete member list after the addition.
    async fn create_member(
        &self,
        member: &NewMember,
        members: &[Member],
    ) -> Result<Vec<Member>, StoreError>;

    async fn update_profile(&self, nickname: &str, avatar_id: u32) -> Result<(), StoreError>;
}

/// The repository in effect for one action.
pub enum Backend {
    Local(LocalRepository),
    Remote(RemoteRepository),
}

impl Backend {
    /// Remote once the nest has an id, local otherwise.
    pub fn for_nest(nest: &Nest, api: &ApiClient) -> Self {
        if nest.is_joined() {
            Backend::Remote(RemoteRepository::new(api.clone(), &nest.nest_id))
        } else {
            Backend::Local(LocalRepository)
        }
    }

    pub fn repository(&self) -> &dyn NestRepository {
        match self {
            Backend::Local(local) => local as &dyn NestRepository,
            Backend::Remote(remote) => remote as &dyn NestRepository,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;

    #[test]
    fn test_backend_selection_follows_nest_id() {
        let api = ApiClient::new(MockTransport::new());

        let mut nest = Nest::default();
        assert!(matches!(
            Backend::for_nest(&nest, &api),
            Backend::Local(_)
        ));

        nest.nest_id = "nest-1".to_string();
        match Backend::for_nest(&nest, &api) {
            Backend::Remote(remote) => assert_eq!(remote.nest_id(), "nest-1"),
            Backend::Local(_) => panic!("expected remote backend"),
        }
    }
}
