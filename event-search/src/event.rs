//! Event records and builders
//!
//! The slice of a live event that semantic search reads and writes: its
//! text fields, schedule, and the stored embedding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vector::{EmbeddingVector, ModelIdentity};

/// Separator between fields of the canonical text
pub const CANONICAL_SEPARATOR: &str = " | ";

/// Unique identifier for events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new random EventId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EventId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A stored event with its embedding attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique identifier
    pub id: EventId,
    /// Short title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Category key (e.g. "music", "gaming")
    pub category: String,
    /// Comma-separated free-form tags
    #[serde(default)]
    pub tags: Option<String>,
    /// When the event takes place
    pub scheduled_at: DateTime<Utc>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// Stored embedding; empty until backfilled
    #[serde(default)]
    pub embedding: EmbeddingVector,
    /// Model that produced `embedding`
    #[serde(default)]
    pub embedding_model: Option<ModelIdentity>,
    /// When `embedding` was last computed
    #[serde(default)]
    pub embedding_updated_at: Option<DateTime<Utc>>,
}

impl EventRecord {
    /// Create a new builder for EventRecord
    pub fn builder() -> EventRecordBuilder {
        EventRecordBuilder::new()
    }

    /// Text fed to the embedding model.
    ///
    /// Title, description, category and tags, each trimmed, blanks
    /// skipped, joined with [`CANONICAL_SEPARATOR`].
    pub fn canonical_text(&self) -> String {
        [
            self.title.as_str(),
            self.description.as_str(),
            self.category.as_str(),
            self.tags.as_deref().unwrap_or(""),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(CANONICAL_SEPARATOR)
    }

    /// Tags split on commas
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn has_embedding(&self) -> bool {
        !self.embedding.is_empty()
    }

    /// True when an embedding exists but was produced by another model.
    /// Embeddings without a recorded model are not considered stale.
    pub fn has_stale_embedding(&self, model: &ModelIdentity) -> bool {
        self.has_embedding()
            && self
                .embedding_model
                .as_ref()
                .is_some_and(|recorded| recorded != model)
    }

    /// Whether the event starts strictly after `now`
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at > now
    }

    /// Replace the stored embedding attributes
    pub fn set_embedding(
        &mut self,
        vector: EmbeddingVector,
        model: ModelIdentity,
        updated_at: DateTime<Utc>,
    ) {
        self.embedding = vector;
        self.embedding_model = Some(model);
        self.embedding_updated_at = Some(updated_at);
    }

    pub fn clear_embedding(&mut self) {
        self.embedding = EmbeddingVector::empty();
        self.embedding_model = None;
        self.embedding_updated_at = None;
    }

    /// Carry over the embedding of the previously stored version.
    ///
    /// Only applies when this record has no embedding of its own and the
    /// canonical text is unchanged; edited text must be re-embedded.
    pub fn inherit_embedding(&mut self, previous: &EventRecord) {
        if self.has_embedding() || !previous.has_embedding() {
            return;
        }
        if self.canonical_text() == previous.canonical_text() {
            self.embedding = previous.embedding.clone();
            self.embedding_model = previous.embedding_model.clone();
            self.embedding_updated_at = previous.embedding_updated_at;
        }
    }

    /// Display projection without the vector
    pub fn summary(&self) -> EventSummary {
        EventSummary {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
            scheduled_at: self.scheduled_at,
        }
    }
}

/// Fields needed to render a search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    pub scheduled_at: DateTime<Utc>,
}

/// Search candidate: display projection plus the stored vector
#[derive(Debug, Clone)]
pub struct EventCandidate {
    pub summary: EventSummary,
    pub embedding: EmbeddingVector,
    pub embedding_model: Option<ModelIdentity>,
}

impl From<&EventRecord> for EventCandidate {
    fn from(record: &EventRecord) -> Self {
        Self {
            summary: record.summary(),
            embedding: record.embedding.clone(),
            embedding_model: record.embedding_model.clone(),
        }
    }
}

/// Builder for EventRecord with fluent API
#[derive(Debug, Default)]
pub struct EventRecordBuilder {
    id: Option<EventId>,
    title: Option<String>,
    description: String,
    category: String,
    tags: Option<String>,
    scheduled_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    embedding: Option<(EmbeddingVector, ModelIdentity, DateTime<Utc>)>,
}

impl EventRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the event ID (auto-generated if not set)
    pub fn id(mut self, id: EventId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the raw comma-separated tag string
    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Append one tag to the comma-separated list
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.tags = Some(match self.tags.take() {
            Some(existing) if !existing.trim().is_empty() => format!("{},{}", existing, tag),
            _ => tag,
        });
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    /// Set the creation time (defaults to now)
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Attach an already computed embedding
    pub fn embedding(mut self, vector: EmbeddingVector, model: ModelIdentity) -> Self {
        self.embedding = Some((vector, model, Utc::now()));
        self
    }

    /// Build the EventRecord
    pub fn build(self) -> Result<EventRecord, EventBuilderError> {
        let title = self.title.ok_or(EventBuilderError::MissingTitle)?;
        let scheduled_at = self
            .scheduled_at
            .ok_or(EventBuilderError::MissingScheduledAt)?;

        let mut record = EventRecord {
            id: self.id.unwrap_or_default(),
            title,
            description: self.description,
            category: self.category,
            tags: self.tags,
            scheduled_at,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            embedding: EmbeddingVector::empty(),
            embedding_model: None,
            embedding_updated_at: None,
        };
        if let Some((vector, model, at)) = self.embedding {
            record.set_embedding(vector, model, at);
        }
        Ok(record)
    }
}

/// Errors that can occur when building an EventRecord
#[derive(Debug, thiserror::Error)]
pub enum EventBuilderError {
    #[error("Missing required field: title")]
    MissingTitle,
    #[error("Missing required field: scheduled_at")]
    MissingScheduledAt,
}
