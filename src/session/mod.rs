//! The dashboard session: one owner for the variable set and every piece of
//! transient state around it.
//!
//! A [`DashboardSession`] is a single-threaded actor. User input arrives as
//! [`SessionCommand`]s through a [`SessionHandle`]; query completions and
//! debounce timers arrive as internal events. Both are processed one at a time
//! on the same task, so no locking is needed and every propagation step sees a
//! consistent variable set.
//!
//! # Propagation
//!
//! After every committed selection the session recomputes the cache key of
//! every query variable and requests those whose key changed. A request whose
//! key is already in flight is not executed again, and a key with a cached
//! result is answered from the cache. Completions for a key that is no longer
//! the variable's current key are stale and never applied.
//!
//! Each commit marks the direct dependents of the committed variable with it
//! as their cascade trigger. The trigger is consumed when the dependent's next
//! option list is applied, so siblings resolving in any order each see the
//! upstream change that caused their own fetch.
//!
//! A query variable is *locked* while any direct dependency is loading or is a
//! list variable with nothing selected. Locked variables are skipped and
//! retried as soon as their dependencies settle.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use dashvars::config::ResolverConfig;
//! use dashvars::executor::FixtureExecutor;
//! use dashvars::session::DashboardSession;
//! use dashvars::variable::{Variable, VariableSet};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let variables = VariableSet::from_variables([
//!     Variable::custom("region", "eu, us"),
//!     Variable::query("host", "hosts({{.region}})"),
//! ])?;
//! let executor = Arc::new(FixtureExecutor::default().with_values("hosts(eu)", ["h1", "h2"]));
//!
//! let (mut session, _handle) = DashboardSession::new(variables, executor, ResolverConfig::default())?;
//! session.run_until_idle().await;
//!
//! let host = session.view("host").unwrap();
//! assert_eq!(host.selected_value_string(), "h1");
//! # Ok(())
//! # }
//! ```

mod handle;
mod view;


pub use handle::{SessionCommand, SessionHandle};
pub use view::{VariableChange, VariableView};

use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use crate::cascade::{initial_selection, on_option_set_changed};
use crate::commit::{CommitAction, CommitGate, CommittedSelection, UserInput};
use crate::config::ResolverConfig;
use crate::core::DashvarError;
use crate::executor::{ExecutionFailure, QueryExecutor};
use crate::options::{OptionSet, Reconciliation, parse_custom_list, parse_payload, reconcile};
use crate::resolver::DependencyGraph;
use crate::templating::{QueryCache, QueryCacheKey, build_key};
use crate::variable::{SelectedValue, VariableKind, VariableSet};
use view::VariableState;

/// Work finished outside the command queue.
enum SessionEvent {
    QueryFinished {
        name: String,
        key: QueryCacheKey,
        result: Result<Vec<JsonValue>, ExecutionFailure>,
    },
    DebounceElapsed {
        name: String,
        generation: u64,
    },
}

/// Owns a [`VariableSet`] and resolves it against a [`QueryExecutor`].
pub struct DashboardSession<E> {
    variables: VariableSet,
    states: HashMap<String, VariableState>,
    /// Dependencies before dependents
    load_order: Vec<String>,
    executor: Arc<E>,
    config: ResolverConfig,
    cache: QueryCache,
    gate: CommitGate,
    in_flight: HashSet<QueryCacheKey>,
    /// Variable whose selection was committed most recently
    last_updated: Option<String>,
    tasks: FuturesUnordered<LocalBoxFuture<'static, SessionEvent>>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    changes: Option<mpsc::UnboundedSender<VariableChange>>,
    started: bool,
}

impl<E> DashboardSession<E>
where
    E: QueryExecutor + 'static,
{
    /// Creates a session and the handle that drives it.
    ///
    /// Nothing is loaded until the session is started, explicitly or by the
    /// first call to [`run`](Self::run) or [`run_until_idle`](Self::run_until_idle).
    ///
    /// # Errors
    ///
    /// Returns [`DashvarError::CircularDependency`] if the variables reference
    /// each other in a cycle, or [`DashvarError::ConfigError`] for an invalid
    /// configuration.
    pub fn new(
        variables: VariableSet,
        executor: Arc<E>,
        config: ResolverConfig,
    ) -> Result<(Self, SessionHandle), DashvarError> {
        config.validate()?;
        let load_order = DependencyGraph::from_variables(&variables).load_order()?;
        let states =
            variables.names().map(|name| (name.to_string(), VariableState::default())).collect();
        let (tx, rx) = mpsc::unbounded_channel();

        let session = Self {
            variables,
            states,
            load_order,
            executor,
            cache: QueryCache::new(config.max_cached_results),
            gate: CommitGate::new(config.debounce(), config.all_sentinel.clone()),
            config,
            in_flight: HashSet::new(),
            last_updated: None,
            tasks: FuturesUnordered::new(),
            commands: rx,
            changes: None,
            started: false,
        };
        Ok((session, SessionHandle::new(tx)))
    }

    /// Publishes every committed selection to `changes`.
    #[must_use]
    pub fn with_change_sender(mut self, changes: mpsc::UnboundedSender<VariableChange>) -> Self {
        self.changes = Some(changes);
        self
    }

    /// Loads custom lists and schedules every unlocked query. Idempotent.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(variables = self.variables.len(), "Starting dashboard session");

        for name in self.load_order.clone() {
            let is_custom = self.variables.get(&name).is_some_and(|variable| {
                matches!(
                    variable.kind,
                    VariableKind::Custom {
                        ..
                    }
                )
            });
            if is_custom {
                self.load_custom(&name);
            }
        }
        self.schedule_queries();
    }

    /// Processes commands and events until [`SessionHandle::shutdown`] is
    /// called or every handle is dropped.
    pub async fn run(&mut self) {
        self.start();
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(event) = self.tasks.next(), if !self.tasks.is_empty() => {
                    self.handle_event(event);
                }
            }
        }
        debug!(pending = self.tasks.len(), "Session stopped");
    }

    /// Processes queued commands and outstanding work until nothing is left.
    ///
    /// Debounce timers count as outstanding work, so under a paused test clock
    /// this also settles pending textbox edits.
    pub async fn run_until_idle(&mut self) {
        self.start();
        loop {
            loop {
                match self.commands.try_recv() {
                    Ok(SessionCommand::Shutdown) => return,
                    Ok(command) => self.handle_command(command),
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                }
            }
            match self.tasks.next().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
    }

    /// Applies a dropdown pick.
    ///
    /// # Errors
    ///
    /// Unknown variable, or a pick that does not fit the variable's options.
    pub fn select(&mut self, name: &str, value: SelectedValue) -> Result<(), DashvarError> {
        self.commit_input(name, UserInput::Pick(value))
    }

    /// Records a textbox edit behind the debounce window.
    ///
    /// # Errors
    ///
    /// Unknown variable, or free text for a list variable that is not one of
    /// its options.
    pub fn type_text(&mut self, name: &str, text: impl Into<String>) -> Result<(), DashvarError> {
        self.commit_input(name, UserInput::Text(text.into()))
    }

    /// Drops cached results for `name` and loads it again.
    ///
    /// # Errors
    ///
    /// Returns [`DashvarError::VariableNotFound`] for an unknown name.
    pub fn refresh(&mut self, name: &str) -> Result<(), DashvarError> {
        self.start();
        let kind = self.variables.require(name)?.kind.clone();
        match kind {
            VariableKind::Query {
                ..
            } => {
                self.cache.invalidate_variable(name);
                if let Some(state) = self.states.get_mut(name) {
                    state.current_key = None;
                }
                if !self.is_locked(name) {
                    self.request_query(name);
                }
            }
            VariableKind::Custom {
                ..
            } => self.load_custom(name),
            VariableKind::Textbox => {}
        }
        Ok(())
    }

    /// Views of every variable, dependencies first.
    pub fn snapshot(&self) -> Vec<VariableView> {
        self.load_order.iter().filter_map(|name| self.view(name)).collect()
    }

    pub fn view(&self, name: &str) -> Option<VariableView> {
        let variable = self.variables.get(name)?;
        let state = self.states.get(name)?;
        Some(VariableView {
            name: variable.name.clone(),
            kind: variable.kind.label(),
            option_set: state.options.clone(),
            selected_value: variable.selected_value.clone(),
            all_selected: variable.all_selected,
            show_all_option: variable.show_all_option,
            loading: state.loading,
            error_message: state.error_message.clone(),
            is_locked: self.is_locked(name),
        })
    }

    pub const fn variables(&self) -> &VariableSet {
        &self.variables
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    /// Result cache statistics as `(hits, misses)`.
    pub fn cache_stats(&self) -> (usize, usize) {
        self.cache.stats()
    }

    /// True while a query or debounce timer is outstanding.
    pub fn is_busy(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// A query variable is locked while a direct dependency is loading or is a
    /// list variable without a selection.
    pub fn is_locked(&self, name: &str) -> bool {
        let Some(variable) = self.variables.get(name) else {
            return false;
        };
        variable.dependencies().iter().any(|dependency| {
            let Some(upstream) = self.variables.get(dependency) else {
                return false;
            };
            let loading = self.states.get(dependency).is_some_and(|state| state.loading);
            loading || (upstream.produces_options() && !upstream.has_selection())
        })
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Select {
                name,
                value,
                reply,
            } => {
                let result = self.select(&name, value);
                if let Err(e) = &result {
                    warn!(variable = %name, "Rejected selection: {e}");
                }
                let _ = reply.send(result);
            }
            SessionCommand::Type {
                name,
                text,
                reply,
            } => {
                let _ = reply.send(self.type_text(&name, text));
            }
            SessionCommand::Refresh {
                name,
                reply,
            } => {
                let _ = reply.send(self.refresh(&name));
            }
            SessionCommand::Snapshot {
                reply,
            } => {
                let _ = reply.send(self.snapshot());
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::QueryFinished {
                name,
                key,
                result,
            } => self.on_query_finished(&name, key, result),
            SessionEvent::DebounceElapsed {
                name,
                generation,
            } => {
                if let Some(text) = self.gate.settle(&name, generation) {
                    debug!(variable = %name, "Debounce window elapsed, committing edit");
                    self.commit_selection(&name, CommittedSelection::text(text));
                }
            }
        }
    }

    fn commit_input(&mut self, name: &str, input: UserInput) -> Result<(), DashvarError> {
        self.start();
        let variable = self.variables.require(name)?;
        let options = self.states.get(name).map(|state| state.options.as_slice()).unwrap_or(&[]);

        match self.gate.commit(variable, input, options)? {
            CommitAction::Immediate(selection) => self.commit_selection(name, selection),
            CommitAction::Deferred {
                generation,
            } => {
                let window = self.gate.window();
                let name = name.to_string();
                self.tasks.push(
                    async move {
                        tokio::time::sleep(window).await;
                        SessionEvent::DebounceElapsed {
                            name,
                            generation,
                        }
                    }
                    .boxed_local(),
                );
            }
        }
        Ok(())
    }

    /// Writes a selection and propagates it. An unchanged selection stops here.
    fn commit_selection(&mut self, name: &str, selection: CommittedSelection) {
        match self.variables.apply_selection(
            name,
            selection.selected_value.clone(),
            selection.all_selected,
        ) {
            Ok(true) => {}
            Ok(false) => {
                debug!(variable = %name, "Selection unchanged");
                return;
            }
            Err(e) => {
                warn!(variable = %name, "Cannot commit selection: {e}");
                return;
            }
        }

        debug!(
            variable = %name,
            value = %self.variables.selected_value_string(name),
            all_selected = selection.all_selected,
            "Committed selection"
        );
        if let Some(changes) = &self.changes {
            let _ = changes.send(VariableChange {
                name: name.to_string(),
                selected_value: selection.selected_value,
                all_selected: selection.all_selected,
            });
        }
        self.last_updated = Some(name.to_string());
        let dependents: Vec<String> =
            self.variables.direct_dependents(name).map(|variable| variable.name.clone()).collect();
        for dependent in dependents {
            if let Some(state) = self.states.get_mut(&dependent) {
                state.cascade_trigger = Some(name.to_string());
            }
        }
        self.schedule_queries();
    }

    /// Requests every unlocked query variable whose key changed.
    fn schedule_queries(&mut self) {
        for name in self.load_order.clone() {
            let Some(variable) = self.variables.get(&name) else {
                continue;
            };
            if !variable.is_query() {
                continue;
            }
            if self.is_locked(&name) {
                debug!(variable = %name, "Locked until dependencies settle");
                continue;
            }
            let key = build_key(&self.config.cache_namespace, variable, &self.variables);
            let current = self.states.get(&name).and_then(|state| state.current_key.as_ref());
            if key.as_ref() != current {
                self.request_query(&name);
            }
        }
    }

    fn request_query(&mut self, name: &str) {
        let Some(variable) = self.variables.get(name) else {
            return;
        };
        let Some(template) = variable.query_template().map(str::to_string) else {
            return;
        };
        let Some(key) = build_key(&self.config.cache_namespace, variable, &self.variables) else {
            return;
        };
        let Some(state) = self.states.get_mut(name) else {
            return;
        };
        state.current_key = Some(key.clone());

        if let Some(options) = self.cache.get(&key).cloned() {
            debug!(variable = name, key = %key, "Serving options from cache");
            self.apply_options(name, options);
            return;
        }

        state.loading = true;
        if !self.in_flight.insert(key.clone()) {
            debug!(variable = name, key = %key, "Query already in flight");
            return;
        }

        debug!(variable = name, key = %key, "Executing query");
        let executor = Arc::clone(&self.executor);
        let bindings = self.variables.clone();
        let name = name.to_string();
        self.tasks.push(
            async move {
                let result = executor.execute(&template, &bindings).await;
                SessionEvent::QueryFinished {
                    name,
                    key,
                    result,
                }
            }
            .boxed_local(),
        );
    }

    fn on_query_finished(
        &mut self,
        name: &str,
        key: QueryCacheKey,
        result: Result<Vec<JsonValue>, ExecutionFailure>,
    ) {
        self.in_flight.remove(&key);
        let is_current = self
            .states
            .get(name)
            .and_then(|state| state.current_key.as_ref())
            .is_some_and(|current| *current == key);

        let parsed = result.map(|payload| parse_payload(&payload));
        if let Ok(Ok(options)) = &parsed {
            self.cache.insert(key.clone(), options.clone());
        }
        if !is_current {
            debug!(variable = name, key = %key, "Ignoring stale query result");
            return;
        }

        match parsed {
            Ok(Ok(options)) => self.apply_options(name, options),
            Ok(Err(failure)) => {
                warn!(variable = name, "Discarding unparseable query result: {failure}");
                if let Some(state) = self.states.get_mut(name) {
                    state.loading = false;
                }
            }
            Err(failure) => {
                debug!(variable = name, "Query failed: {failure}");
                let message = failure.user_message(&self.config.syntax_error_guidance);
                if let Some(state) = self.states.get_mut(name) {
                    state.loading = false;
                    state.error_message = Some(message);
                }
            }
        }

        // Dependents may have been waiting on this variable
        self.schedule_queries();
    }

    fn load_custom(&mut self, name: &str) {
        let Some(VariableKind::Custom {
            custom_values,
        }) = self.variables.get(name).map(|variable| &variable.kind)
        else {
            return;
        };

        match parse_custom_list(custom_values) {
            Ok(options) => self.apply_options(name, options),
            Err(failure) => warn!(variable = name, "Invalid custom value list: {failure}"),
        }
    }

    /// Stores a successfully produced option list and applies any default the
    /// cascade policy asks for.
    fn apply_options(&mut self, name: &str, options: OptionSet) {
        let (Some(variable), Some(state)) = (self.variables.get(name), self.states.get_mut(name))
        else {
            return;
        };
        state.loading = false;
        state.error_message = None;
        let trigger = state.cascade_trigger.take();

        let selection = match reconcile(options, &state.options, variable.sort_mode) {
            Reconciliation::Changed(options) => {
                debug!(variable = name, count = options.len(), "Options changed");
                let selection = on_option_set_changed(variable, &options, trigger.as_deref())
                    .or_else(|| initial_selection(variable, &options));
                state.options = options;
                selection
            }
            Reconciliation::Unchanged => initial_selection(variable, &state.options),
        };

        if let Some(selection) = selection {
            self.commit_selection(name, selection);
        }
    }
}
