//! Test utilities shared by the integration test suite

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use headless_search::status_events::{StatusEvent, StatusSink};
use headless_search::web_search::RawMatch;
use headless_search::{SearchConfig, SearchError, SearchSession, SessionProvider};

/// Config with short timeouts and inline release
#[allow(dead_code)]
pub fn test_config() -> SearchConfig {
    SearchConfig::builder()
        .navigation_timeout(Duration::from_millis(200))
        .marker_timeout(Duration::from_millis(50))
        .close_delay(Duration::ZERO)
        .build()
        .expect("test config is valid")
}

/// Counters and call log shared between a stub provider and its sessions
#[derive(Default)]
pub struct Recorder {
    acquired: AtomicUsize,
    closed: AtomicUsize,
    visited: Mutex<Vec<String>>,
    queried: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().expect("visited lock").clone()
    }

    /// Selectors evaluated, in call order
    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().expect("queried lock").clone()
    }
}

#[derive(Clone)]
enum Goto {
    Loads,
    Fails(String),
    Hangs,
}

/// Scriptable session provider recording every capability call
#[derive(Clone)]
pub struct StubProvider {
    recorder: Arc<Recorder>,
    launch_error: Option<String>,
    goto: Goto,
    marker_present: bool,
    query_error: Option<String>,
    matches: HashMap<String, Vec<RawMatch>>,
}

#[allow(dead_code)]
impl StubProvider {
    pub fn new() -> Self {
        Self {
            recorder: Arc::new(Recorder::default()),
            launch_error: None,
            goto: Goto::Loads,
            marker_present: true,
            query_error: None,
            matches: HashMap::new(),
        }
    }

    pub fn recorder(&self) -> Arc<Recorder> {
        Arc::clone(&self.recorder)
    }

    pub fn with_matches(mut self, selector: &str, matches: Vec<RawMatch>) -> Self {
        self.matches.insert(selector.to_string(), matches);
        self
    }

    pub fn failing_launch(mut self, message: &str) -> Self {
        self.launch_error = Some(message.to_string());
        self
    }

    pub fn failing_goto(mut self, message: &str) -> Self {
        self.goto = Goto::Fails(message.to_string());
        self
    }

    /// Navigation never completes
    pub fn hanging_goto(mut self) -> Self {
        self.goto = Goto::Hangs;
        self
    }

    /// Primary marker never appears
    pub fn without_marker(mut self) -> Self {
        self.marker_present = false;
        self
    }

    pub fn failing_query(mut self, message: &str) -> Self {
        self.query_error = Some(message.to_string());
        self
    }

    pub fn into_provider(self) -> Arc<dyn SessionProvider> {
        Arc::new(self)
    }
}

#[async_trait]
impl SessionProvider for StubProvider {
    async fn acquire(&self) -> Result<Box<dyn SearchSession>, SearchError> {
        if let Some(message) = &self.launch_error {
            return Err(SearchError::Launch(message.clone()));
        }
        let n = self.recorder.acquired.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Box::new(StubSession {
            id: format!("stub-{n}"),
            script: self.clone(),
        }))
    }
}

struct StubSession {
    id: String,
    script: StubProvider,
}

#[async_trait]
impl SearchSession for StubSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn goto(&mut self, url: &str) -> Result<(), SearchError> {
        self.script
            .recorder
            .visited
            .lock()
            .expect("visited lock")
            .push(url.to_string());
        match &self.script.goto {
            Goto::Loads => Ok(()),
            Goto::Fails(message) => Err(SearchError::Navigation(message.clone())),
            Goto::Hangs => std::future::pending().await,
        }
    }

    async fn wait_for_selector(&mut self, _selector: &str) -> Result<(), SearchError> {
        if self.script.marker_present {
            Ok(())
        } else {
            std::future::pending().await
        }
    }

    async fn query_matches(&mut self, selector: &str) -> Result<Vec<RawMatch>, SearchError> {
        self.script
            .recorder
            .queried
            .lock()
            .expect("queried lock")
            .push(selector.to_string());
        if let Some(message) = &self.script.query_error {
            return Err(SearchError::Evaluation(message.clone()));
        }
        Ok(self
            .script
            .matches
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), SearchError> {
        self.script.recorder.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Sink collecting every published event
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<StatusEvent>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn statuses(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("events lock")
            .iter()
            .map(|e| e.status.clone())
            .collect()
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().expect("events lock").clone()
    }
}

impl StatusSink for RecordingSink {
    fn publish(&self, event: StatusEvent) {
        self.events.lock().expect("events lock").push(event);
    }
}

/// Organic result as it appears under the primary strategy
#[allow(dead_code)]
pub fn organic(title: &str, url: &str) -> RawMatch {
    RawMatch::new(title, Some(url.to_string()))
}
