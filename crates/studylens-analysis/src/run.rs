//! Participant runs and the raw records they are built from.
//!
//! A run is one participant's session on one task. Each participant performs
//! two tasks: one with feature ratings shown and one without, in either order.
//!
//! # Session Names
//!
//! Log and notes files share a name of the form
//! `{participant}-{guidance}-{dataset}-{order}`:
//!
//! ```text
//! 01-no_ratings-bank-second
//! │  │          │    └─ first | second
//! │  │          └─ bank | rain
//! │  └─ ratings | no_ratings
//! └─ participant id
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{combo::FeatureCombo, dataset::Dataset};

const RATINGS_TOKEN: &str = "ratings";
const NO_RATINGS_TOKEN: &str = "no_ratings";

/// Position of a task within a participant's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskOrder {
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd")]
    Second,
}

impl TaskOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TaskOrder::First => "1st",
            TaskOrder::Second => "2nd",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "first" => Some(TaskOrder::First),
            "second" => Some(TaskOrder::Second),
            _ => None,
        }
    }
}

impl fmt::Display for TaskOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ParseSessionNameError {
    #[display("session name '{name}' must have 4 dash-separated fields, found {found}")]
    FieldCount { name: String, found: usize },
    #[display("session name '{name}' has an empty participant id")]
    EmptyParticipant { name: String },
    #[display("session name '{name}' has unknown guidance token '{token}'")]
    Guidance { name: String, token: String },
    #[display("session name '{name}' has unknown dataset token '{token}'")]
    Dataset {
        name: String,
        token: String,
        source: derive_more::FromStrError,
    },
    #[display("session name '{name}' has unknown order token '{token}'")]
    Order { name: String, token: String },
}

/// Identifying attributes parsed from a session file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionName {
    pub participant: String,
    pub ratings: bool,
    pub dataset: Dataset,
    pub order: TaskOrder,
}

impl FromStr for SessionName {
    type Err = ParseSessionNameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let fields = name.split('-').collect::<Vec<_>>();
        let [participant, guidance, dataset, order] = fields[..] else {
            return Err(ParseSessionNameError::FieldCount {
                name: name.to_owned(),
                found: fields.len(),
            });
        };

        if participant.is_empty() {
            return Err(ParseSessionNameError::EmptyParticipant {
                name: name.to_owned(),
            });
        }

        let ratings = match guidance {
            RATINGS_TOKEN => true,
            NO_RATINGS_TOKEN => false,
            _ => {
                return Err(ParseSessionNameError::Guidance {
                    name: name.to_owned(),
                    token: guidance.to_owned(),
                });
            }
        };

        let dataset = dataset
            .parse()
            .map_err(|source| ParseSessionNameError::Dataset {
                name: name.to_owned(),
                token: dataset.to_owned(),
                source,
            })?;

        let order = TaskOrder::from_token(order).ok_or_else(|| ParseSessionNameError::Order {
            name: name.to_owned(),
            token: order.to_owned(),
        })?;

        Ok(Self {
            participant: participant.to_owned(),
            ratings,
            dataset,
            order,
        })
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guidance = if self.ratings {
            RATINGS_TOKEN
        } else {
            NO_RATINGS_TOKEN
        };
        let order = match self.order {
            TaskOrder::First => "first",
            TaskOrder::Second => "second",
        };
        write!(f, "{}-{guidance}-{}-{order}", self.participant, self.dataset)
    }
}

/// One entry of an interaction log.
///
/// Only feature additions and removals change the selection. Every other
/// event kind is kept as [`LogEvent::Other`] with its remaining fields, so
/// a log can be written back without losing information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLogEvent", into = "RawLogEvent")]
pub enum LogEvent {
    /// A feature was added to the selection.
    FeatureAdd {
        feature: String,
        /// Selection immediately before the event
        selected: Vec<String>,
        time: f64,
    },
    /// A feature was removed from the selection.
    FeatureRemove {
        feature: String,
        /// Selection immediately before the event
        selected: Vec<String>,
        time: f64,
    },
    /// Any other interaction (e.g. editing a feature).
    Other {
        event: String,
        time: f64,
        extra: serde_json::Map<String, serde_json::Value>,
    },
}

const FEATURE_ADD: &str = "feature-add";
const FEATURE_REMOVE: &str = "feature-remove";

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("'{event}' event at time {time} is missing the '{field}' field")]
pub struct MissingFieldError {
    pub event: String,
    pub time: f64,
    pub field: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawLogEvent {
    event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected: Option<Vec<String>>,
    time: f64,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<RawLogEvent> for LogEvent {
    type Error = MissingFieldError;

    fn try_from(raw: RawLogEvent) -> Result<Self, Self::Error> {
        let is_add = raw.event == FEATURE_ADD;
        if !is_add && raw.event != FEATURE_REMOVE {
            let mut extra = raw.extra;
            if let Some(feature) = raw.feature {
                extra.insert("feature".to_owned(), feature.into());
            }
            if let Some(selected) = raw.selected {
                extra.insert("selected".to_owned(), selected.into());
            }
            return Ok(LogEvent::Other {
                event: raw.event,
                time: raw.time,
                extra,
            });
        }

        let missing = |field| MissingFieldError {
            event: raw.event.clone(),
            time: raw.time,
            field,
        };
        let feature = raw.feature.clone().ok_or_else(|| missing("feature"))?;
        let selected = raw.selected.clone().ok_or_else(|| missing("selected"))?;
        let time = raw.time;

        Ok(if is_add {
            LogEvent::FeatureAdd {
                feature,
                selected,
                time,
            }
        } else {
            LogEvent::FeatureRemove {
                feature,
                selected,
                time,
            }
        })
    }
}

impl From<LogEvent> for RawLogEvent {
    fn from(event: LogEvent) -> Self {
        match event {
            LogEvent::FeatureAdd {
                feature,
                selected,
                time,
            } => RawLogEvent {
                event: FEATURE_ADD.to_owned(),
                feature: Some(feature),
                selected: Some(selected),
                time,
                extra: serde_json::Map::new(),
            },
            LogEvent::FeatureRemove {
                feature,
                selected,
                time,
            } => RawLogEvent {
                event: FEATURE_REMOVE.to_owned(),
                feature: Some(feature),
                selected: Some(selected),
                time,
                extra: serde_json::Map::new(),
            },
            LogEvent::Other { event, time, extra } => RawLogEvent {
                event,
                feature: None,
                selected: None,
                time,
                extra,
            },
        }
    }
}

impl LogEvent {
    #[must_use]
    pub fn time(&self) -> f64 {
        match self {
            LogEvent::FeatureAdd { time, .. }
            | LogEvent::FeatureRemove { time, .. }
            | LogEvent::Other { time, .. } => *time,
        }
    }
}

/// A free-text annotation written during a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub body: String,
    pub state: NoteState,
}

/// Tool state captured when a note was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteState {
    #[serde(rename = "selectedFeatures")]
    pub selected_features: Vec<String>,
}

impl Note {
    /// Whether the note carries any text.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }

    #[must_use]
    pub fn combo(&self) -> FeatureCombo {
        FeatureCombo::new(self.state.selected_features.iter().map(String::as_str))
    }
}

/// One participant's session on one task, as loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub participant: String,
    /// Whether feature ratings were shown during the task
    pub ratings: bool,
    pub dataset: Dataset,
    pub order: TaskOrder,
    pub logs: Vec<LogEvent>,
    /// Notes with a non-empty body, in writing order
    pub notes: Vec<Note>,
}

impl Run {
    /// Builds a run, dropping notes whose body is blank.
    #[must_use]
    pub fn new(name: SessionName, logs: Vec<LogEvent>, notes: Vec<Note>) -> Self {
        let SessionName {
            participant,
            ratings,
            dataset,
            order,
        } = name;
        Self {
            participant,
            ratings,
            dataset,
            order,
            logs,
            notes: notes.into_iter().filter(Note::has_body).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_session_name() {
        let name: SessionName = "01-no_ratings-bank-second".parse().unwrap();
        assert_eq!(
            name,
            SessionName {
                participant: "01".to_owned(),
                ratings: false,
                dataset: Dataset::Bank,
                order: TaskOrder::Second,
            }
        );

        let name: SessionName = "02-ratings-rain-first".parse().unwrap();
        assert!(name.ratings);
        assert_eq!(name.dataset, Dataset::Rain);
        assert_eq!(name.order, TaskOrder::First);
    }

    #[test]
    fn test_session_name_display_roundtrip() {
        for text in ["01-no_ratings-bank-second", "12-ratings-rain-first"] {
            let name: SessionName = text.parse().unwrap();
            assert_eq!(name.to_string(), text);
        }
    }

    #[test]
    fn test_parse_session_name_errors() {
        assert!(matches!(
            "01-ratings-bank".parse::<SessionName>(),
            Err(ParseSessionNameError::FieldCount { found: 3, .. })
        ));
        assert!(matches!(
            "01-ratings-bank-first-extra".parse::<SessionName>(),
            Err(ParseSessionNameError::FieldCount { found: 5, .. })
        ));
        assert!(matches!(
            "-ratings-bank-first".parse::<SessionName>(),
            Err(ParseSessionNameError::EmptyParticipant { .. })
        ));
        assert!(matches!(
            "01-maybe-bank-first".parse::<SessionName>(),
            Err(ParseSessionNameError::Guidance { .. })
        ));
        assert!(matches!(
            "01-ratings-iris-first".parse::<SessionName>(),
            Err(ParseSessionNameError::Dataset { .. })
        ));
        assert!(matches!(
            "01-ratings-bank-third".parse::<SessionName>(),
            Err(ParseSessionNameError::Order { .. })
        ));
    }

    #[test]
    fn test_task_order_serializes_as_ordinal() {
        assert_eq!(serde_json::to_value(TaskOrder::First).unwrap(), json!("1st"));
        assert_eq!(serde_json::to_value(TaskOrder::Second).unwrap(), json!("2nd"));
    }

    #[test]
    fn test_deserialize_log_events() {
        let add: LogEvent = serde_json::from_value(
            json!({"event": "feature-add", "feature": "B", "selected": ["A"], "time": 1000}),
        )
        .unwrap();
        assert_eq!(
            add,
            LogEvent::FeatureAdd {
                feature: "B".to_owned(),
                selected: vec!["A".to_owned()],
                time: 1000.0,
            }
        );

        let edit: LogEvent =
            serde_json::from_value(json!({"event": "feature-edit", "feature": "A", "time": 500}))
                .unwrap();
        assert!(matches!(edit, LogEvent::Other { ref event, .. } if event == "feature-edit"));
        assert!((edit.time() - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_other_event_keeps_fields() {
        let value = json!({"event": "feature-edit", "feature": "A", "time": 500.0, "value": [1, 2]});
        let event: LogEvent = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&event).unwrap(), value);
    }

    #[test]
    fn test_feature_event_without_selection_is_rejected() {
        let result = serde_json::from_value::<LogEvent>(
            json!({"event": "feature-remove", "feature": "A", "time": 10}),
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("missing the 'selected' field"), "{err}");
    }

    #[test]
    fn test_run_drops_blank_notes() {
        let note = |body: &str| Note {
            body: body.to_owned(),
            state: NoteState {
                selected_features: vec!["A".to_owned()],
            },
        };
        let name = "01-ratings-bank-first".parse().unwrap();
        let run = Run::new(name, vec![], vec![note("kept"), note(""), note(" \n\t"), note(" x ")]);
        assert_eq!(run.notes.len(), 2);
        assert_eq!(run.notes[0].body, "kept");
        assert_eq!(run.notes[1].body, " x ");
    }

    #[test]
    fn test_note_combo_is_canonical() {
        let note: Note = serde_json::from_value(
            json!({"body": "4", "state": {"selectedFeatures": ["D", "H", "G", "F"]}}),
        )
        .unwrap();
        assert_eq!(note.combo(), FeatureCombo::new(["D", "F", "G", "H"]));
    }
}
