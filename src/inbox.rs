//! In-memory inbox that feeds emails to the agent in fixed-size batches.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::agent::TriageAgent;
use crate::email::Email;

/// Emails processed per `continue_processing` call.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Admission filter for incoming emails.
///
/// Serialized as `{"type": "email" | "subject", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InboxFilter {
    /// Exact sender address, case-insensitive.
    #[serde(rename = "email")]
    Sender(String),
    /// Substring of the subject, case-insensitive.
    Subject(String),
}

impl InboxFilter {
    pub fn matches(&self, email: &Email) -> bool {
        match self {
            Self::Sender(address) => email
                .from
                .iter()
                .any(|m| m.address.eq_ignore_ascii_case(address)),
            Self::Subject(fragment) => email
                .subject
                .to_lowercase()
                .contains(&fragment.to_lowercase()),
        }
    }
}

/// Persistable filter set: `{"rules": [...]}`.
///
/// Rules of an unsupported type (e.g. `classification`) are skipped on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRules {
    #[serde(default, deserialize_with = "supported_rules")]
    pub rules: Vec<InboxFilter>,
}

fn supported_rules<'de, D>(deserializer: D) -> Result<Vec<InboxFilter>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|rule| match InboxFilter::deserialize(&rule) {
            Ok(filter) => Some(filter),
            Err(e) => {
                warn!(rule = %rule, error = %e, "Skipping unsupported filter rule");
                None
            }
        })
        .collect())
}

/// Whether a `continue_processing` call did any work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Processed,
    Done,
}

/// Result of one `continue_processing` call.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Snapshots of the emails processed in this batch.
    pub batch: Vec<Email>,
    pub state: BatchState,
}

pub struct Inbox {
    emails: Vec<Email>,
    index: HashMap<String, usize>,
    queue: VecDeque<String>,
    filters: Vec<InboxFilter>,
    batch_size: usize,
}

impl Inbox {
    pub fn new() -> Self {
        Self {
            emails: Vec::new(),
            index: HashMap::new(),
            queue: VecDeque::new(),
            filters: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_filters(mut self, filters: Vec<InboxFilter>) -> Self {
        self.filters = filters;
        self
    }

    /// Batch size is clamped to at least 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Add a filter unless an identical one is already present. Only affects
    /// emails added afterwards.
    pub fn add_filter(&mut self, filter: InboxFilter) {
        if !self.filters.contains(&filter) {
            self.filters.push(filter);
        }
    }

    /// Returns `false` if no such filter was set.
    pub fn remove_filter(&mut self, filter: &InboxFilter) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f != filter);
        self.filters.len() != before
    }

    pub fn filters(&self) -> &[InboxFilter] {
        &self.filters
    }

    pub fn filter_rules(&self) -> FilterRules {
        FilterRules {
            rules: self.filters.clone(),
        }
    }

    /// Replace the whole filter set.
    pub fn set_filter_rules(&mut self, rules: FilterRules) {
        debug!(count = rules.rules.len(), "Updating inbox filters");
        self.filters = rules.rules;
    }

    fn accepts(&self, email: &Email) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|f| f.matches(email))
    }

    /// Add an email. Returns `false` if it was filtered out or its id is
    /// already present.
    pub fn add(&mut self, email: Email) -> bool {
        if self.index.contains_key(&email.id) {
            debug!(email_id = %email.id, "Duplicate email ignored");
            return false;
        }
        if !self.accepts(&email) {
            debug!(email_id = %email.id, "Email rejected by filters");
            return false;
        }
        self.index.insert(email.id.clone(), self.emails.len());
        if !email.processed {
            self.queue.push_back(email.id.clone());
        }
        self.emails.push(email);
        true
    }

    /// Process the next batch of queued emails concurrently.
    ///
    /// Queued ids are only dequeued once the batch completes, so a dropped
    /// call leaves the queue intact.
    pub async fn continue_processing(&mut self, agent: &TriageAgent) -> BatchReport {
        let take = self.batch_size.min(self.queue.len());
        if take == 0 {
            return BatchReport {
                batch: Vec::new(),
                state: BatchState::Done,
            };
        }

        let positions: HashSet<usize> = self
            .queue
            .iter()
            .take(take)
            .filter_map(|id| self.index.get(id).copied())
            .collect();

        let selected: Vec<&mut Email> = self
            .emails
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| positions.contains(i))
            .map(|(_, email)| email)
            .collect();
        let outcomes = futures::future::join_all(
            selected.into_iter().map(|email| agent.process_email(email)),
        )
        .await;

        let ids: Vec<String> = self.queue.drain(..take).collect();
        let batch: Vec<Email> = ids
            .iter()
            .filter_map(|id| self.get(id).cloned())
            .collect();
        info!(
            processed = batch.len(),
            actions = outcomes.iter().map(|o| o.applied.len()).sum::<usize>(),
            remaining = self.queue.len(),
            "Batch complete"
        );

        BatchReport {
            batch,
            state: BatchState::Processed,
        }
    }

    /// Reset every email and queue them all for processing again.
    pub fn clear_all_processed(&mut self) {
        self.queue.clear();
        for email in &mut self.emails {
            email.reset();
            self.queue.push_back(email.id.clone());
        }
    }

    pub fn get(&self, id: &str) -> Option<&Email> {
        self.index.get(id).map(|&i| &self.emails[i])
    }

    /// All emails in insertion order.
    pub fn emails(&self) -> &[Email] {
        &self.emails
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// Number of emails waiting to be processed.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}
