//! Action logging with pattern-based filtering and in-memory storage
//!
//! Actions are traced with their name, lifecycle phase, and summary. Glob
//! patterns decide which actions are logged; an optional ring buffer keeps
//! the most recent entries for inspection (e.g. printed by the CLI after a
//! command when `--log-actions` is set).
//!
//! # Example
//!
//! ```ignore
//! use binaan_dispatch_core::logger::{ActionLoggerConfig, ActionLoggerMiddleware};
//!
//! // Only lifecycle results
//! let config = ActionLoggerConfig::new(Some("*Did*"), None);
//! let middleware = ActionLoggerMiddleware::with_log(config, 200);
//! let log = middleware.log().cloned();
//! store.add_middleware(middleware);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::action::ActionSummary;
use crate::lifecycle::Phase;
use crate::store::Middleware;

/// Include/exclude glob patterns for action names.
///
/// Patterns support `*` (any sequence) and `?` (any single character).
/// Examples: `List*`, `*DidError`, `CardToggle`.
#[derive(Debug, Clone)]
pub struct ActionLoggerConfig {
    /// If non-empty, only log actions matching these patterns
    pub include_patterns: Vec<String>,
    /// Exclude actions matching these patterns (applied after include)
    pub exclude_patterns: Vec<String>,
}

impl Default for ActionLoggerConfig {
    fn default() -> Self {
        Self {
            include_patterns: Vec::new(),
            // Expanding cards is pure UI chatter
            exclude_patterns: vec!["CardToggle".to_string()],
        }
    }
}

fn split_patterns(patterns: &str) -> Vec<String> {
    patterns
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

impl ActionLoggerConfig {
    /// Build from comma-separated pattern lists.
    ///
    /// `None` for `exclude` keeps the default excludes.
    ///
    /// ```
    /// use binaan_dispatch_core::logger::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("List*, Detail*"), Some("ListFetch"));
    /// assert!(config.should_log("ListDidLoad"));
    /// assert!(config.should_log("DetailFetch"));
    /// assert!(!config.should_log("ListFetch"));
    /// assert!(!config.should_log("FiltersSet"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude
                .map(split_patterns)
                .unwrap_or_else(|| Self::default().exclude_patterns),
        }
    }

    pub fn with_patterns(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include_patterns: include,
            exclude_patterns: exclude,
        }
    }

    /// Check if an action name passes the include/exclude patterns
    pub fn should_log(&self, action_name: &str) -> bool {
        if !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|p| glob_match(p, action_name))
        {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|p| glob_match(p, action_name))
    }
}

/// An entry in the action log
#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    pub name: &'static str,
    pub phase: Option<Phase>,
    pub summary: String,
    pub timestamp: Instant,
    pub sequence: u64,
    /// Set after the reducer ran
    pub state_changed: Option<bool>,
}

impl ActionLogEntry {
    pub fn new(name: &'static str, phase: Option<Phase>, summary: String, sequence: u64) -> Self {
        Self {
            name,
            phase,
            summary,
            timestamp: Instant::now(),
            sequence,
            state_changed: None,
        }
    }

    /// Elapsed time formatted as `2.3s` or `150ms`
    pub fn elapsed_display(&self) -> String {
        let elapsed = self.timestamp.elapsed();
        if elapsed.as_secs() >= 1 {
            format!("{:.1}s", elapsed.as_secs_f64())
        } else {
            format!("{}ms", elapsed.as_millis())
        }
    }
}

/// Bounded in-memory log of recent actions
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    capacity: usize,
    filter: ActionLoggerConfig,
    next_sequence: u64,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(100, ActionLoggerConfig::default())
    }
}

impl ActionLog {
    pub fn new(capacity: usize, filter: ActionLoggerConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            filter,
            next_sequence: 0,
        }
    }

    /// Record an action if it passes the filter
    pub fn log<A: ActionSummary>(&mut self, action: &A) -> Option<&ActionLogEntry> {
        let name = action.name();
        if !self.filter.should_log(name) {
            return None;
        }

        let entry = ActionLogEntry::new(name, action.phase(), action.summary(), self.next_sequence);
        self.next_sequence += 1;

        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.entries.back()
    }

    pub fn update_last_state_changed(&mut self, changed: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.state_changed = Some(changed);
        }
    }

    /// Oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// Most recent `count` entries, newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An [`ActionLog`] shared between the middleware that fills it and the
/// code that reads it
#[derive(Debug, Clone, Default)]
pub struct SharedActionLog(Arc<Mutex<ActionLog>>);

impl SharedActionLog {
    pub fn new(log: ActionLog) -> Self {
        Self(Arc::new(Mutex::new(log)))
    }

    pub fn lock(&self) -> MutexGuard<'_, ActionLog> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the most recent `count` entries, oldest first
    pub fn recent(&self, count: usize) -> Vec<ActionLogEntry> {
        let mut entries: Vec<_> = self.lock().recent(count).cloned().collect();
        entries.reverse();
        entries
    }
}

/// Middleware that traces actions and optionally keeps an [`ActionLog`].
#[derive(Debug, Clone)]
pub struct ActionLoggerMiddleware {
    config: ActionLoggerConfig,
    log: Option<SharedActionLog>,
    last_action_logged: bool,
}

impl ActionLoggerMiddleware {
    /// Tracing only
    pub fn new(config: ActionLoggerConfig) -> Self {
        Self {
            config,
            log: None,
            last_action_logged: false,
        }
    }

    /// Tracing plus an in-memory log of `capacity` entries
    pub fn with_log(config: ActionLoggerConfig, capacity: usize) -> Self {
        Self {
            log: Some(SharedActionLog::new(ActionLog::new(capacity, config.clone()))),
            ..Self::new(config)
        }
    }

    /// Handle to the in-memory log; stays valid after the middleware moved
    /// into a store
    pub fn log(&self) -> Option<&SharedActionLog> {
        self.log.as_ref()
    }
}

impl<A: ActionSummary> Middleware<A> for ActionLoggerMiddleware {
    fn before(&mut self, action: &A) {
        let name = action.name();
        if self.config.should_log(name) {
            tracing::debug!(
                action = %name,
                phase = action.phase().map(|p| p.as_str()).unwrap_or("-"),
                summary = %action.summary(),
                "action"
            );
        }

        self.last_action_logged = false;
        if let Some(log) = &self.log {
            self.last_action_logged = log.lock().log(action).is_some();
        }
    }

    fn after(&mut self, _action: &A, state_changed: bool) {
        if !self.last_action_logged {
            return;
        }
        if let Some(log) = &self.log {
            log.lock().update_last_state_changed(state_changed);
        }
    }
}

/// Simple glob pattern matching supporting `*` and `?`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < text.len() {
        match pattern.get(pi) {
            Some('*') => {
                star = Some((pi, ti));
                pi += 1;
            }
            Some(&c) if c == '?' || c == text[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match star {
                // Let the last star swallow one more character
                Some((star_pi, star_ti)) => {
                    pi = star_pi + 1;
                    ti = star_ti + 1;
                    star = Some((star_pi, star_ti + 1));
                }
                None => return false,
            },
        }
    }

    pattern[pi..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match_exact() {
        assert!(glob_match("FiltersSet", "FiltersSet"));
        assert!(!glob_match("FiltersSet", "FiltersReset"));
        assert!(!glob_match("ListFetch", "ListFetchMore"));
    }

    #[test]
    fn test_glob_match_star() {
        assert!(glob_match("List*", "ListDidLoad"));
        assert!(glob_match("List*", "List"));
        assert!(!glob_match("List*", "DetailList"));
        assert!(glob_match("*DidError", "DetailDidError"));
        assert!(glob_match("*Did*", "OptionsDidLoad"));
        assert!(glob_match("Kurikulum*Did*", "KurikulumListDidLoad"));
    }

    #[test]
    fn test_glob_match_question() {
        assert!(glob_match("List?", "Lists"));
        assert!(!glob_match("List?", "List"));
    }

    #[test]
    fn test_config_include_and_exclude() {
        let config = ActionLoggerConfig::new(Some("*Did*"), Some("*DidError"));
        assert!(config.should_log("ListDidLoad"));
        assert!(!config.should_log("ListDidError"));
        assert!(!config.should_log("ListFetch"));
    }

    #[test]
    fn test_config_default_excludes_card_toggle() {
        let config = ActionLoggerConfig::default();
        assert!(!config.should_log("CardToggle"));
        assert!(config.should_log("ListFetch"));
    }

    #[test]
    fn test_config_empty_segments_ignored() {
        let config = ActionLoggerConfig::new(Some(" , List*,"), Some(""));
        assert_eq!(config.include_patterns, vec!["List*"]);
        assert!(config.exclude_patterns.is_empty());
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        CardToggle(u32),
        ListDidLoad(usize),
    }

    impl crate::Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::CardToggle(_) => "CardToggle",
                TestAction::ListDidLoad(_) => "ListDidLoad",
            }
        }

        fn phase(&self) -> Option<Phase> {
            match self {
                TestAction::ListDidLoad(_) => Some(Phase::Fulfilled),
                _ => None,
            }
        }
    }

    impl crate::ActionSummary for TestAction {
        fn summary(&self) -> String {
            match self {
                TestAction::ListDidLoad(n) => format!("ListDidLoad({} items)", n),
                other => format!("{:?}", other),
            }
        }
    }

    #[test]
    fn test_action_log_records_phase_and_summary() {
        let mut log = ActionLog::default();
        log.log(&TestAction::CardToggle(1));
        log.log(&TestAction::ListDidLoad(3));

        assert_eq!(log.len(), 1);
        let entry = log.entries().next().unwrap();
        assert_eq!(entry.name, "ListDidLoad");
        assert_eq!(entry.phase, Some(Phase::Fulfilled));
        assert_eq!(entry.summary, "ListDidLoad(3 items)");
    }

    #[test]
    fn test_action_log_capacity() {
        let mut log = ActionLog::new(2, ActionLoggerConfig::with_patterns(vec![], vec![]));
        for n in 0..3 {
            log.log(&TestAction::ListDidLoad(n));
        }

        assert_eq!(log.len(), 2);
        let recent: Vec<_> = log.recent(2).map(|e| e.sequence).collect();
        assert_eq!(recent, vec![2, 1]);
    }

    #[test]
    fn test_middleware_filtered_action_keeps_previous_state_changed() {
        let mut middleware =
            ActionLoggerMiddleware::with_log(ActionLoggerConfig::default(), 10);

        middleware.before(&TestAction::ListDidLoad(1));
        middleware.after(&TestAction::ListDidLoad(1), true);
        middleware.before(&TestAction::CardToggle(4));
        middleware.after(&TestAction::CardToggle(4), false);

        let log = middleware.log().unwrap().lock();
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries().next().unwrap().state_changed, Some(true));
    }

    #[test]
    fn test_log_handle_sees_entries_after_middleware_moved() {
        let middleware = ActionLoggerMiddleware::with_log(
            ActionLoggerConfig::with_patterns(vec![], vec![]),
            10,
        );
        let handle = middleware.log().cloned().unwrap();

        let mut moved: Box<dyn Middleware<TestAction>> = Box::new(middleware);
        for n in 0..3 {
            moved.before(&TestAction::ListDidLoad(n));
            moved.after(&TestAction::ListDidLoad(n), n > 0);
        }

        let recent = handle.recent(2);
        let summaries: Vec<_> = recent.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, vec!["ListDidLoad(1 items)", "ListDidLoad(2 items)"]);
        assert_eq!(recent[0].state_changed, Some(true));
    }

    #[test]
    fn test_tracing_only_middleware_has_no_log() {
        let middleware = ActionLoggerMiddleware::new(ActionLoggerConfig::default());
        assert!(middleware.log().is_none());
    }
}
