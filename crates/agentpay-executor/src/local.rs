//! Deterministic in-process executor.
//!
//! Mirrors the three stages of the hosted agent crew (research, summarize,
//! reply) with plain text heuristics. Useful for demos and local runs where no
//! agent service is available.

use std::time::Duration;

use async_trait::async_trait;
use agentpay_core::{Result, TaskInput, TaskKind, TaskOutput};

use crate::executor::TaskExecutor;

const MAX_KEY_POINTS: usize = 5;
const SUMMARY_CHARS: usize = 280;

/// Local text drafter.
#[derive(Debug, Clone, Default)]
pub struct LocalTaskExecutor {
    delay: Duration,
}

impl LocalTaskExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait this long before answering, to imitate a remote agent.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

fn sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn research(text: &str) -> String {
    let points: Vec<String> = sentences(text)
        .into_iter()
        .take(MAX_KEY_POINTS)
        .map(|s| format!("- {}", s))
        .collect();
    format!("Key points:\n{}", points.join("\n"))
}

fn summarize(text: &str) -> String {
    let mut summary = String::new();
    for sentence in sentences(text) {
        if !summary.is_empty() && summary.len() + sentence.len() + 2 > SUMMARY_CHARS {
            break;
        }
        if !summary.is_empty() {
            summary.push(' ');
        }
        summary.push_str(&sentence);
        summary.push('.');
    }
    if summary.chars().count() > SUMMARY_CHARS {
        summary = summary.chars().take(SUMMARY_CHARS).collect::<String>() + "...";
    }
    summary
}

fn reply(text: &str) -> String {
    format!(
        "Hi,\n\nThank you for your message. {}\n\nI will follow up shortly.\n\nBest regards,",
        summarize(text)
    )
}

#[async_trait]
impl TaskExecutor for LocalTaskExecutor {
    async fn execute(&self, input: &TaskInput) -> Result<TaskOutput> {
        input.validate()?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let content = match input.task_type {
            TaskKind::Research => research(&input.text),
            TaskKind::Summarize => summarize(&input.text),
            TaskKind::Reply => reply(&input.text),
        };

        Ok(TaskOutput {
            task_type: input.task_type,
            content,
        })
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
