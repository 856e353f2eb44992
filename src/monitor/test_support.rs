//! Scripted page sources and recording channels for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::crawler::PageSource;
use crate::notifications::{Channel, ChannelResult, NotificationError};
use crate::utils::error::FetchError;

pub const AVAILABLE_PAGE: &str = r#"<html><head><title>Join the Acme Notes beta - TestFlight - Apple</title></head>
<body><h1 class="beta-status__app-title">Acme Notes</h1><button>Join the Beta</button></body></html>"#;

pub const FULL_PAGE: &str = r#"<html><head><title>Join the Acme Notes beta - TestFlight - Apple</title></head>
<body><h1 class="beta-status__app-title">Acme Notes</h1><p>This beta is full.</p></body></html>"#;

/// One scripted response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Available,
    Full,
    Fail,
}

/// Page source that replays a script; the last step repeats once exhausted
pub struct ScriptedSource {
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Step>,
    delay: Duration,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedSource {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            last: Mutex::new(Step::Full),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(step: Step) -> Self {
        Self::new([step])
    }

    /// Make every fetch take `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }

    fn next_step(&self) -> Step {
        let mut last = self.last.lock().unwrap();
        if let Some(step) = self.script.lock().unwrap().pop_front() {
            *last = step;
        }
        *last
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(&self, _url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(Instant::now());
        let step = self.next_step();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match step {
            Step::Available => Ok(AVAILABLE_PAGE.to_string()),
            Step::Full => Ok(FULL_PAGE.to_string()),
            Step::Fail => Err(FetchError::Timeout),
        }
    }
}

/// Channel that records every message it is asked to send
pub struct RecordingChannel {
    succeed: bool,
    sent: Mutex<Vec<String>>,
}

impl RecordingChannel {
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn escalations(&self) -> usize {
        self.sent().iter().filter(|m| m.starts_with("⚠️")).count()
    }

    pub fn availability_notices(&self) -> usize {
        self.sent().iter().filter(|m| m.starts_with("🎉")).count()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, text: &str) -> ChannelResult<()> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.succeed {
            Ok(())
        } else {
            Err(NotificationError::Rejected("test failure".to_string()))
        }
    }
}
