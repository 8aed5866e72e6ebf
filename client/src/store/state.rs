use chrono::NaiveDate;
use serde::Serialize;
use shared::{
    BudgetTransaction, CalendarEvent, Goal, JoinRequest, Member, Nest, Profile, Todo,
};

pub const DEFAULT_LANGUAGE: &str = "en";

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NestState {
    pub profile: Profile,
    pub nest: Nest,
    pub members: Vec<Member>,
    pub todos: Vec<Todo>,
    pub events: Vec<CalendarEvent>,
    pub transactions: Vec<BudgetTransaction>,
    pub goals: Vec<Goal>,
    pub pending_requests: Vec<JoinRequest>,
    pub language: String,
    pub has_seen_tutorial: bool,
}

impl Default for NestState {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            nest: Nest::default(),
            members: Vec::new(),
            todos: Vec::new(),
            events: Vec::new(),
            transactions: Vec::new(),
            goals: Vec::new(),
            pending_requests: Vec::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            has_seen_tutorial: false,
        }
    }
}

impl NestState {
    /// Back to the initial state, except `members`.
    // TODO: decide whether logout should also clear `members`; stale members
    // remain visible until the next set_members or sync.
    pub fn reset_session(&mut self) {
        let members = std::mem::take(&mut self.members);
        *self = Self {
            members,
            ..Self::default()
        };
    }

    pub fn set_todo_completed(&mut self, todo_id: &str, completed: bool, member_id: &str) {
        if let Some(todo) = self.todos.iter_mut().find(|t| t.id == todo_id) {
            todo.is_completed = completed;
            todo.completed_by = completed.then(|| member_id.to_string());
        }
        sort_todos(&mut self.todos);
    }

    pub fn toggle_vote(&mut self, event_id: &str, date: NaiveDate, user_id: &str) -> bool {
        match self.events.iter_mut().find(|e| e.id == event_id) {
            Some(event) => {
                event.toggle_vote(date, user_id);
                true
            }
            None => false,
        }
    }

    pub fn set_goal_progress(&mut self, goal_id: &str, current: i64) {
        if let Some(goal) = self.goals.iter_mut().find(|g| g.id == goal_id) {
            goal.current = current;
        }
    }
}

/// Stable sort putting incomplete todos before completed ones.
pub fn sort_todos(todos: &mut [Todo]) {
    todos.sort_by_key(|t| t.is_completed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::Repeat;

    fn todo(id: &str, is_completed: bool) -> Todo {
        Todo {
            id: id.to_string(),
            title: format!("todo {}", id),
            is_completed,
            assignees: vec![],
            completed_by: None,
            created_at: Utc::now(),
            repeat: Repeat::None,
            image_url: None,
        }
    }

    fn ids(todos: &[Todo]) -> Vec<&str> {
        todos.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_sort_todos_is_stable() {
        let mut todos = vec![
            todo("a", true),
            todo("b", false),
            todo("c", true),
            todo("d", false),
        ];
        sort_todos(&mut todos);
        assert_eq!(ids(&todos), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_set_todo_completed_records_actor() {
        let mut state = NestState {
            todos: vec![todo("a", false), todo("b", false)],
            ..NestState::default()
        };

        state.set_todo_completed("a", true, "m1");
        assert_eq!(ids(&state.todos), vec!["b", "a"]);
        assert_eq!(state.todos[1].completed_by.as_deref(), Some("m1"));

        state.set_todo_completed("a", false, "m1");
        assert!(state.todos.iter().all(|t| t.completed_by.is_none()));
    }

    #[test]
    fn test_reset_session_keeps_members() {
        let mut state = NestState::default();
        state.profile.nickname = "Jin".to_string();
        state.profile.avatar_id = 3;
        state.nest.nest_id = "n1".to_string();
        state.nest.is_logged_in = true;
        state.language = "ko".to_string();
        state.has_seen_tutorial = true;
        state.todos.push(todo("a", false));
        state.members.push(Member {
            id: "1".to_string(),
            nickname: "Jin".to_string(),
            avatar_id: 3,
            member_type: None,
        });

        state.reset_session();

        assert_eq!(state.profile, Profile::default());
        assert_eq!(state.nest, Nest::default());
        assert!(state.todos.is_empty());
        assert_eq!(state.language, DEFAULT_LANGUAGE);
        assert!(!state.has_seen_tutorial);
        assert_eq!(state.members.len(), 1);
    }

    #[test]
    fn test_toggle_vote_unknown_event() {
        let mut state = NestState::default();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(!state.toggle_vote("missing", date, "u1"));
    }
}
