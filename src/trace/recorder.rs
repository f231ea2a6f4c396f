use super::step::{ArrayElement, ElementState, Step, StepAction, StepEvent};
use serde_json::{Map, Value as JsonValue};

/// Describes a step before it is frozen against the current array.
#[derive(Debug, Clone)]
pub struct StepBuilder {
    action: StepAction,
    description: String,
    highlights: Vec<(usize, ElementState)>,
    metadata: Map<String, JsonValue>,
}

impl StepBuilder {
    pub fn new(action: StepAction, event: StepEvent, description: impl Into<String>) -> Self {
        let mut metadata = Map::new();
        metadata.insert("event".to_string(), JsonValue::from(event.as_str()));
        Self {
            action,
            description: description.into(),
            highlights: Vec::new(),
            metadata,
        }
    }

    /// Marks an element with a display state. Out-of-range indices are
    /// ignored when the snapshot is taken.
    pub fn highlight(mut self, index: usize, state: ElementState) -> Self {
        if !self.highlights.iter().any(|(i, _)| *i == index) {
            self.highlights.push((index, state));
        }
        self
    }

    pub fn meta(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Flags the step as reporting a recovered or fatal error.
    pub fn error(self, message: impl Into<String>) -> Self {
        self.meta("error", true).meta("errorMessage", message.into())
    }

    pub fn extend_meta(mut self, entries: Map<String, JsonValue>) -> Self {
        self.metadata.extend(entries);
        self
    }

    fn snapshot(self, array: &[f64]) -> Step {
        let array_state = array
            .iter()
            .enumerate()
            .map(|(position, &value)| ArrayElement {
                value,
                state: self
                    .highlights
                    .iter()
                    .find(|(i, _)| *i == position)
                    .map(|(_, state)| *state)
                    .unwrap_or_default(),
                position,
            })
            .collect();
        let highlighted_indices = self
            .highlights
            .iter()
            .map(|(i, _)| *i)
            .filter(|i| *i < array.len())
            .collect();

        Step {
            array_state,
            highlighted_indices,
            description: self.description,
            action: self.action,
            metadata: self.metadata,
        }
    }
}

/// Append-only list of steps produced by one run.
#[derive(Debug, Default)]
pub struct StepRecorder {
    steps: Vec<Step>,
}

impl StepRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freezes `builder` against `array` and appends it.
    pub fn record(&mut self, array: &[f64], builder: StepBuilder) {
        self.steps.push(builder.snapshot(array));
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}
