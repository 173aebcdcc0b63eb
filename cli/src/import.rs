//! JSON event import

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

use crate::error::{CliError, CliResult};
use event_search::{EventId, EventRecord};

/// Event as supplied in an import file
#[derive(Debug, Deserialize)]
pub struct NewEvent {
    #[serde(default)]
    pub id: Option<EventId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewEvent {
    fn into_record(self) -> Result<EventRecord, event_search::event::EventBuilderError> {
        let mut builder = EventRecord::builder()
            .title(self.title)
            .description(self.description)
            .category(self.category)
            .scheduled_at(self.scheduled_at);
        if let Some(id) = self.id {
            builder = builder.id(id);
        }
        if let Some(tags) = self.tags {
            builder = builder.tags(tags);
        }
        if let Some(created_at) = self.created_at {
            builder = builder.created_at(created_at);
        }
        builder.build()
    }
}

/// Read a JSON array of events
pub fn load_events(path: &Path) -> CliResult<Vec<EventRecord>> {
    let raw = std::fs::read_to_string(path)?;
    let events: Vec<NewEvent> = serde_json::from_str(&raw)?;
    events
        .into_iter()
        .map(|event| {
            event.into_record().map_err(|e| CliError::InvalidEvent {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })
        .collect()
}
