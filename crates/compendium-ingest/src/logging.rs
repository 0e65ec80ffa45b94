// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    Prepare,
    Scan,
    Load,
    Persist,
    Finalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestLevel {
    Debug,
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestEvent {
    pub stage: IngestStage,
    pub level: IngestLevel,
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

/// Structured run events. Every event is also forwarded to `tracing`.
#[derive(Debug, Default, Clone)]
pub struct IngestLog {
    events: Vec<IngestEvent>,
}

impl IngestLog {
    pub fn emit(
        &mut self,
        stage: IngestStage,
        level: IngestLevel,
        name: impl Into<String>,
        fields: BTreeMap<String, String>,
    ) {
        let name = name.into();
        match level {
            IngestLevel::Debug => tracing::debug!(?stage, event = %name, ?fields),
            IngestLevel::Info => tracing::info!(?stage, event = %name, ?fields),
            IngestLevel::Warn => tracing::warn!(?stage, event = %name, ?fields),
        }
        self.events.push(IngestEvent {
            stage,
            level,
            name,
            fields,
        });
    }

    pub fn info(&mut self, stage: IngestStage, name: &str, fields: BTreeMap<String, String>) {
        self.emit(stage, IngestLevel::Info, name, fields);
    }

    pub fn warn(&mut self, stage: IngestStage, name: &str, fields: BTreeMap<String, String>) {
        self.emit(stage, IngestLevel::Warn, name, fields);
    }

    pub fn debug(&mut self, stage: IngestStage, name: &str, fields: BTreeMap<String, String>) {
        self.emit(stage, IngestLevel::Debug, name, fields);
    }

    #[must_use]
    pub fn events(&self) -> &[IngestEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<IngestEvent> {
        self.events
    }
}

pub(crate) fn fields<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
