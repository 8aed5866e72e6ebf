//! The session/domain store.
//!
//! `NestStore` is built once at startup and shared with the UI. Every
//! mutating action reads the nest id when it is called: with a nest joined
//! the change goes to the server first and is applied only after a 2xx
//! response; without one it is applied locally right away. Failures are
//! logged and leave state untouched. Only the account actions report them
//! back, as an [`AccountOutcome`].

use chrono::NaiveDate;
use log::{debug, info, warn};
use shared::wire::{
    AccountDeletion, CreateNest, Credentials, JoinNest, MemberRecord, PasswordChange,
    Registration, SessionRecord,
};
use shared::{
    AccountOutcome, Goal, Member, MemberType, NewEvent, NewGoal, NewMember, NewTodo,
    NewTransaction,
};
use std::sync::Arc;
use tokio::sync::watch;

use crate::api::{ApiClient, HttpTransport, ReqwestTransport};
use crate::config::ClientConfig;
use crate::error::StoreError;
use crate::repository::{Backend, RemoteRepository};

mod state;

pub use state::{sort_todos, NestState, DEFAULT_LANGUAGE};

pub struct NestStore {
    state: watch::Sender<NestState>,
    api: ApiClient,
}

impl NestStore {
    pub fn new(config: &ClientConfig) -> Result<Self, StoreError> {
        let transport = ReqwestTransport::new(&config.api_url)?;
        info!("Nest API at {}", config.api_url);
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        let (state, _) = watch::channel(NestState::default());
        Self {
            state,
            api: ApiClient::new(transport),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> NestState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<NestState> {
        self.state.subscribe()
    }

    fn update(&self, apply: impl FnOnce(&mut NestState)) {
        self.state.send_modify(apply);
    }

    fn backend(&self) -> Backend {
        let nest = self.state.borrow().nest.clone();
        Backend::for_nest(&nest, &self.api)
    }

    fn remote(&self) -> Option<RemoteRepository> {
        match self.backend() {
            Backend::Remote(remote) => Some(remote),
            Backend::Local(_) => None,
        }
    }

    /// Applies a confirmed result, or logs the failure and leaves state alone.
    fn commit<T>(
        &self,
        action: &str,
        result: Result<T, StoreError>,
        apply: impl FnOnce(&mut NestState, T),
    ) {
        match result {
            Ok(value) => self.update(|state| apply(state, value)),
            Err(e) => warn!("{} failed: {}", action, e),
        }
    }

    // ------------------------------------------------------------------
    // Profile & session
    // ------------------------------------------------------------------

    pub fn set_profile(&self, nickname: &str, avatar_id: u32) {
        self.update(|s| {
            s.profile.nickname = nickname.to_string();
            s.profile.avatar_id = avatar_id;
        });
    }

    pub fn set_email(&self, email: &str) {
        self.update(|s| s.profile.user_email = email.to_string());
    }

    /// Sets the household and marks the session logged in. Passing a
    /// non-empty `nest_id` switches every later action to remote mode.
    pub fn set_nest(&self, name: &str, theme: i32, invite_code: Option<&str>, nest_id: Option<&str>) {
        self.update(|s| {
            s.nest.nest_name = name.to_string();
            s.nest.nest_theme = theme;
            s.nest.invite_code = invite_code.unwrap_or_default().to_string();
            s.nest.nest_id = nest_id.unwrap_or_default().to_string();
            s.nest.is_logged_in = true;
        });
        info!("Nest set: {:?}", nest_id);
    }

    pub fn set_members(&self, members: Vec<Member>) {
        self.update(|s| s.members = members);
    }

    pub fn set_language(&self, language: &str) {
        self.update(|s| s.language = language.to_string());
    }

    pub fn complete_tutorial(&self) {
        self.update(|s| s.has_seen_tutorial = true);
    }

    /// Resets the session. `members` is left as it is.
    pub fn logout(&self) {
        self.update(NestState::reset_session);
        info!("Logged out");
    }

    fn apply_session(&self, session: SessionRecord) {
        let members: Vec<Member> = session.members.iter().map(MemberRecord::to_shared).collect();
        self.update(|s| {
            s.profile.user_id = session.user.id;
            s.profile.nickname = session.user.nickname;
            s.profile.avatar_id = session.user.avatar_id;
            s.profile.user_email = session.user.email;

            if let Some(nest) = session.nest {
                s.nest.nest_name = nest.name;
                s.nest.nest_theme = nest.theme;
                s.nest.invite_code = nest.invite_code;
                s.nest.nest_id = nest.id;
                s.nest.is_logged_in = true;
                s.members = members;
            }
        });
    }

    // ------------------------------------------------------------------
    // Account
    // ------------------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> AccountOutcome {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.api.login(credentials).await {
            Ok(session) => {
                self.apply_session(session);
                info!("Logged in");
                AccountOutcome::ok()
            }
            Err(e) => {
                warn!("login failed: {}", e);
                AccountOutcome::failed(e.user_message())
            }
        }
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        nickname: &str,
        avatar_id: u32,
    ) -> AccountOutcome {
        let registration = Registration {
            email: email.to_string(),
            password: password.to_string(),
            nickname: nickname.to_string(),
            avatar_id,
        };
        match self.api.signup(registration).await {
            Ok(session) => {
                self.apply_session(session);
                info!("Signed up");
                AccountOutcome::ok()
            }
            Err(e) => {
                warn!("signup failed: {}", e);
                AccountOutcome::failed(e.user_message())
            }
        }
    }

    pub async fn update_profile(&self, nickname: &str, avatar_id: u32) {
        let result = self
            .backend()
            .repository()
            .update_profile(nickname, avatar_id)
            .await;
        self.commit("update profile", result, |s, ()| {
            s.profile.nickname = nickname.to_string();
            s.profile.avatar_id = avatar_id;
        });
    }

    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
        confirmation: &str,
    ) -> AccountOutcome {
        let change = PasswordChange {
            current_password: current_password.to_string(),
            password: new_password.to_string(),
            password_confirmation: confirmation.to_string(),
        };
        match self.api.update_password(change).await {
            Ok(()) => AccountOutcome::ok(),
            Err(e) => {
                warn!("update password failed: {}", e);
                AccountOutcome::failed(e.user_message())
            }
        }
    }

    /// Deletes the account and, on success, logs out.
    pub async fn delete_account(&self, password: &str) -> AccountOutcome {
        let deletion = AccountDeletion {
            password: password.to_string(),
        };
        match self.api.delete_account(deletion).await {
            Ok(()) => {
                self.logout();
                AccountOutcome::ok()
            }
            Err(e) => {
                warn!("delete account failed: {}", e);
                AccountOutcome::failed(e.user_message())
            }
        }
    }

    // ------------------------------------------------------------------
    // Nest & membership
    // ------------------------------------------------------------------

    /// Creates a household on the server and joins it.
    pub async fn create_nest(&self, name: &str, theme: i32) -> AccountOutcome {
        let nest = CreateNest {
            name: name.to_string(),
            theme,
        };
        match self.api.create_nest(nest).await {
            Ok(record) => {
                self.set_nest(&record.name, record.theme, Some(&record.invite_code), Some(&record.id));
                AccountOutcome::ok()
            }
            Err(e) => {
                warn!("create nest failed: {}", e);
                AccountOutcome::failed(e.user_message())
            }
        }
    }

    /// Asks to be admitted into the nest behind `invite_code`.
    pub async fn request_join(&self, invite_code: &str) -> AccountOutcome {
        let request = JoinNest {
            invite_code: invite_code.to_string(),
        };
        match self.api.join_nest(request).await {
            Ok(()) => AccountOutcome::ok(),
            Err(e) => {
                warn!("join request failed: {}", e);
                AccountOutcome::failed(e.user_message())
            }
        }
    }

    pub async fn fetch_join_requests(&self) {
        let Some(remote) = self.remote() else {
            return;
        };
        let result = remote.fetch_join_requests().await;
        self.commit("fetch join requests", result, |s, requests| {
            s.pending_requests = requests
        });
    }

    pub async fn approve_join_request(&self, user_id: &str) {
        let Some(remote) = self.remote() else {
            return;
        };
        let result = remote.approve_join_request(user_id).await;
        self.commit("approve join request", result, |s, members| {
            s.pending_requests.retain(|r| r.id != user_id);
            s.members = members;
        });
    }

    pub async fn add_managed_member(&self, nickname: &str, avatar_id: u32, member_type: MemberType) {
        let member = NewMember {
            nickname: nickname.to_string(),
            avatar_id,
            member_type,
        };
        let members = self.state.borrow().members.clone();
        let result = self
            .backend()
            .repository()
            .create_member(&member, &members)
            .await;
        self.commit("add member", result, |s, members| s.members = members);
    }

    pub async fn sync_members(&self) {
        let Some(remote) = self.remote() else {
            return;
        };
        debug!("syncing members of nest {}", remote.nest_id());
        let result = remote.fetch_members().await;
        self.commit("sync members", result, |s, members| s.members = members);
    }

    // ------------------------------------------------------------------
    // Todos
    // ------------------------------------------------------------------

    pub async fn add_todo(&self, todo: NewTodo) {
        let members = self.state.borrow().members.clone();
        let result = self
            .backend()
            .repository()
            .create_todo(&todo, &members)
            .await;
        self.commit("add todo", result, |s, created| s.todos.insert(0, created));
    }

    /// Flips completion of `todo_id`, crediting `member_id` when it becomes
    /// completed. Unknown ids are ignored without a request.
    pub async fn toggle_todo(&self, todo_id: &str, member_id: &str) {
        let completed = self
            .state
            .borrow()
            .todos
            .iter()
            .find(|t| t.id == todo_id)
            .map(|t| !t.is_completed);
        let Some(completed) = completed else {
            debug!("toggle_todo: no todo {}", todo_id);
            return;
        };

        let result = self
            .backend()
            .repository()
            .set_todo_completed(todo_id, completed, member_id)
            .await;
        self.commit("toggle todo", result, |s, ()| {
            s.set_todo_completed(todo_id, completed, member_id)
        });
    }

    pub async fn delete_todo(&self, todo_id: &str) {
        let result = self.backend().repository().delete_todo(todo_id).await;
        self.commit("delete todo", result, |s, ()| {
            s.todos.retain(|t| t.id != todo_id)
        });
    }

    pub async fn sync_missions(&self) {
        let Some(remote) = self.remote() else {
            return;
        };
        let result = remote.fetch_todos().await;
        self.commit("sync missions", result, |s, todos| s.todos = todos);
    }

    // ------------------------------------------------------------------
    // Calendar
    // ------------------------------------------------------------------

    pub async fn add_event(&self, event: NewEvent) {
        let profile = self.state.borrow().profile.clone();
        let result = self
            .backend()
            .repository()
            .create_event(&event, &profile)
            .await;
        self.commit("add event", result, |s, created| s.events.push(created));
    }

    /// Toggles `user_id`'s vote for `date`. Votes stay on this device.
    pub fn vote_event(&self, event_id: &str, date: NaiveDate, user_id: &str) {
        self.update(|s| {
            if !s.toggle_vote(event_id, date, user_id) {
                debug!("vote_event: no event {}", event_id);
            }
        });
    }

    pub async fn delete_event(&self, event_id: &str) {
        let result = self.backend().repository().delete_event(event_id).await;
        self.commit("delete event", result, |s, ()| {
            s.events.retain(|e| e.id != event_id)
        });
    }

    pub async fn sync_events(&self) {
        let Some(remote) = self.remote() else {
            return;
        };
        let result = remote.fetch_events().await;
        self.commit("sync events", result, |s, events| s.events = events);
    }

    // ------------------------------------------------------------------
    // Budget
    // ------------------------------------------------------------------

    pub async fn add_transaction(&self, transaction: NewTransaction) {
        let result = self
            .backend()
            .repository()
            .create_transaction(&transaction)
            .await;
        self.commit("add transaction", result, |s, created| {
            s.transactions.insert(0, created)
        });
    }

    pub async fn delete_transaction(&self, transaction_id: &str) {
        let result = self
            .backend()
            .repository()
            .delete_transaction(transaction_id)
            .await;
        self.commit("delete transaction", result, |s, ()| {
            s.transactions.retain(|t| t.id != transaction_id)
        });
    }

    pub async fn sync_transactions(&self) {
        let Some(remote) = self.remote() else {
            return;
        };
        let result = remote.fetch_transactions().await;
        self.commit("sync transactions", result, |s, transactions| {
            s.transactions = transactions
        });
    }

    // ------------------------------------------------------------------
    // Goals
    // ------------------------------------------------------------------

    pub async fn add_goal(&self, goal: NewGoal) {
        let result = self.backend().repository().create_goal(&goal).await;
        self.commit("add goal", result, |s, created| s.goals.push(created));
    }

    pub async fn increment_goal_progress(&self, goal_id: &str) {
        self.step_goal(goal_id, Goal::next_increment).await;
    }

    pub async fn decrement_goal_progress(&self, goal_id: &str) {
        self.step_goal(goal_id, Goal::next_decrement).await;
    }

    /// Sends the full next value; nothing happens when `next` refuses.
    async fn step_goal(&self, goal_id: &str, next: fn(&Goal) -> Option<i64>) {
        let current = self
            .state
            .borrow()
            .goals
            .iter()
            .find(|g| g.id == goal_id)
            .and_then(next);
        let Some(current) = current else {
            return;
        };

        let result = self
            .backend()
            .repository()
            .set_goal_progress(goal_id, current)
            .await;
        self.commit("update goal progress", result, |s, ()| {
            s.set_goal_progress(goal_id, current)
        });
    }

    pub async fn delete_goal(&self, goal_id: &str) {
        let result = self.backend().repository().delete_goal(goal_id).await;
        self.commit("delete goal", result, |s, ()| {
            s.goals.retain(|g| g.id != goal_id)
        });
    }

    pub async fn sync_goals(&self) {
        let Some(remote) = self.remote() else {
            return;
        };
        let result = remote.fetch_goals().await;
        self.commit("sync goals", result, |s, goals| s.goals = goals);
    }
}
