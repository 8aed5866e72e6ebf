use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use shared::{
    BudgetTransaction, CalendarEvent, EventKind, Goal, Member, NewEvent, NewGoal, NewMember,
    NewTodo, NewTransaction, Profile, Todo, Votes,
};

use super::NestRepository;
use crate::error::StoreError;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// Random base-36 id for entities that never reach the server.
pub fn local_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// In-memory repository used while no nest is joined. Never fails.
pub struct LocalRepository;

#[async_trait]
impl NestRepository for LocalRepository {
    async fn create_todo(&self, todo: &NewTodo, members: &[Member]) -> Result<Todo, StoreError> {
        let assignees = members
            .iter()
            .filter(|m| todo.assignee_ids.iter().any(|id| *id == m.id))
            .cloned()
            .collect();

        Ok(Todo {
            id: local_id(),
            title: todo.title.clone(),
            is_completed: false,
            assignees,
            completed_by: None,
            created_at: Utc::now(),
            repeat: todo.repeat,
            image_url: todo.image_url.clone(),
        })
    }

    async fn set_todo_completed(
        &self,
        _todo_id: &str,
        _completed: bool,
        _member_id: &str,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    async fn delete_todo(&self, _todo_id: &str) -> Result<(), StoreError> {
        Ok(())
    }

    /// Local events open as a date vote seeded with the creator, who is
    /// identified by avatar id while no account backs the session.
    async fn create_event(
        &self,
        event: &NewEvent,
        profile: &Profile,
    ) -> Result<CalendarEvent, StoreError> {
        let creator_id = profile.avatar_id.to_string();
        let mut votes = Votes::new();
        votes.insert(event.date, vec![creator_id.clone()]);

        Ok(CalendarEvent {
            id: local_id(),
            title: event.title.clone(),
            date: event.date,
            kind: EventKind::Vote,
            votes,
            creator_id,
            image_url: event.image_url.clone(),
            end_date: event.end_date,
            time: event.time.clone(),
        })
    }

    async fn delete_event(&self, _event_id: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> Result<BudgetTransaction, StoreError> {
        Ok(BudgetTransaction {
            id: local_id(),
            title: transaction.title.clone(),
            amount: transaction.amount,
            category: transaction.category,
            date: transaction.date,
            payer_id: transaction.payer_id.clone(),
        })
    }

    async fn delete_transaction(&self, _transaction_id: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_goal(&self, goal: &NewGoal) -> Result<Goal, StoreError> {
        Ok(Goal {
            id: local_id(),
            kind: goal.kind,
            title: goal.title.clone(),
            current: 0,
            target: goal.target,
            unit: goal.unit.clone(),
        })
    }

    async fn set_goal_progress(&self, _goal_id: &str, _current: i64) -> Result<(), StoreError> {
        Ok(())
    }

    async fn delete_goal(&self, _goal_id: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_member(
        &self,
        member: &NewMember,
        members: &[Member],
    ) -> Result<Vec<Member>, StoreError> {
        let mut updated = members.to_vec();
        updated.push(Member {
            id: local_id(),
            nickname: member.nickname.clone(),
            avatar_id: member.avatar_id,
            member_type: Some(member.member_type),
        });
        Ok(updated)
    }

    async fn update_profile(&self, _nickname: &str, _avatar_id: u32) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::{MemberType, Repeat};

    fn member(id: &str, nickname: &str) -> Member {
        Member {
            id: id.to_string(),
            nickname: nickname.to_string(),
            avatar_id: 0,
            member_type: None,
        }
    }

    #[test]
    fn test_local_id_is_base36() {
        let id = local_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(local_id(), local_id());
    }

    #[tokio::test]
    async fn test_create_todo_resolves_assignees() {
        let members = vec![member("1", "Jin"), member("2", "Sora")];
        let todo = LocalRepository
            .create_todo(
                &NewTodo {
                    title: "Vacuum".to_string(),
                    assignee_ids: vec!["2".to_string(), "99".to_string()],
                    repeat: Repeat::Weekly,
                    image_url: None,
                },
                &members,
            )
            .await
            .unwrap();

        assert_eq!(todo.assignees, vec![member("2", "Sora")]);
        assert!(!todo.is_completed);
        assert_eq!(todo.repeat, Repeat::Weekly);
    }

    #[tokio::test]
    async fn test_create_event_seeds_creator_vote() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let profile = Profile {
            avatar_id: 7,
            ..Profile::default()
        };

        let event = LocalRepository
            .create_event(&NewEvent::on("Party", date), &profile)
            .await
            .unwrap();

        assert_eq!(event.kind, EventKind::Vote);
        assert_eq!(event.votes.get(&date), Some(&vec!["7".to_string()]));
        assert_eq!(event.creator_id, "7");
    }

    #[tokio::test]
    async fn test_create_member_appends() {
        let members = vec![member("1", "Jin")];
        let updated = LocalRepository
            .create_member(
                &NewMember {
                    nickname: "Basil".to_string(),
                    avatar_id: 4,
                    member_type: MemberType::Plant,
                },
                &members,
            )
            .await
            .unwrap();

        assert_eq!(updated.len(), 2);
        assert_eq!(updated[1].member_type, Some(MemberType::Plant));
    }
}
