//! Field Hydrator
//!
//! Turns one `FieldDescriptor` into a bound input: a plain text input or an
//! enumerated choice input, wired to a change-notification callback. Every
//! notification uses one normalized event shape so downstream code never
//! depends on a widget's own event type.

use crate::schema::{FieldDescriptor, FieldKind, FieldOption};

/// Normalized change notification: `{target: {name, value}}` plus a flag for
/// the synchronous default-selection emitted when an option field mounts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub name: String,
    pub value: String,
    pub initial_load: bool,
}

pub type ChangeHandler = Box<dyn FnMut(ChangeEvent) + Send>;

/// Which input behavior the field hydrated into.
#[derive(Debug, Clone, PartialEq)]
pub enum InputControl {
    Text { placeholder: Option<String> },
    Select { options: Vec<FieldOption> },
}

/// A field bound to a value and a change handler, ready for rendering.
pub struct HydratedInput {
    pub name: String,
    pub display_name: String,
    pub required: bool,
    control: InputControl,
    value: String,
    on_change: ChangeHandler,
}

/// Hydrate `field` with no caller-selected value. Option fields auto-select
/// their first option and notify immediately (see `hydrate_with_value`).
pub fn hydrate(field: &FieldDescriptor, on_change: ChangeHandler) -> HydratedInput {
    hydrate_with_value(field, None, on_change)
}

/// Hydrate `field`, optionally pre-selecting `value`.
///
/// For an option field with nothing pre-selected, the first option's value is
/// selected and `on_change` fires exactly once with `initial_load: true`, so
/// the aggregate form data holds a value for every option field before any
/// user interaction. A required option field with zero options is given a
/// single blank placeholder option: it renders and fails required-validation
/// instead of crashing.
pub fn hydrate_with_value(
    field: &FieldDescriptor,
    value: Option<String>,
    mut on_change: ChangeHandler,
) -> HydratedInput {
    match &field.kind {
        FieldKind::Text {
            placeholder,
            default_value,
        } => HydratedInput {
            name: field.name.clone(),
            display_name: field.display_name.clone(),
            required: field.required,
            control: InputControl::Text {
                placeholder: placeholder.clone(),
            },
            value: value
                .or_else(|| default_value.clone())
                .unwrap_or_default(),
            on_change,
        },
        FieldKind::Choice { options } => {
            let mut options = options.clone();
            if options.is_empty() && field.required {
                options.push(FieldOption {
                    display_name: String::new(),
                    string_value: String::new(),
                });
            }

            let selected = match value {
                Some(v) => v,
                None => {
                    let first = options
                        .first()
                        .map(|o| o.string_value.clone())
                        .unwrap_or_default();
                    if !options.is_empty() {
                        on_change(ChangeEvent {
                            name: field.name.clone(),
                            value: first.clone(),
                            initial_load: true,
                        });
                    }
                    first
                }
            };

            HydratedInput {
                name: field.name.clone(),
                display_name: field.display_name.clone(),
                required: field.required,
                control: InputControl::Select { options },
                value: selected,
                on_change,
            }
        }
    }
}

impl HydratedInput {
    pub fn control(&self) -> &InputControl {
        &self.control
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Update the bound value, notifying the change handler.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.notify();
    }

    /// Focus notification, same normalized shape as a keystroke.
    pub fn focus(&mut self) {
        self.notify();
    }

    /// Blur notification, same normalized shape as a keystroke.
    pub fn blur(&mut self) {
        self.notify();
    }

    fn notify(&mut self) {
        (self.on_change)(ChangeEvent {
            name: self.name.clone(),
            value: self.value.clone(),
            initial_load: false,
        });
    }

    /// Required-field validation at submit time.
    pub fn validate(&self) -> Result<(), String> {
        if self.required && self.value.trim().is_empty() {
            return Err(format!("'{}' is required", self.display_name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_handler() -> (Arc<Mutex<Vec<ChangeEvent>>>, ChangeHandler) {
        let events: Arc<Mutex<Vec<ChangeEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let handler: ChangeHandler = Box::new(move |e| sink.lock().unwrap().push(e));
        (events, handler)
    }

    fn choice_field(name: &str, options: Vec<(&str, &str)>, required: bool) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            display_name: name.to_string(),
            required,
            kind: FieldKind::Choice {
                options: options
                    .into_iter()
                    .map(|(d, v)| FieldOption {
                        display_name: d.to_string(),
                        string_value: v.to_string(),
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn option_field_auto_selects_first_option_once() {
        let field = choice_field("zone", vec![("A", "a"), ("B", "b")], false);
        let (events, handler) = recording_handler();

        let input = hydrate(&field, handler);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            *events,
            vec![ChangeEvent {
                name: "zone".to_string(),
                value: "a".to_string(),
                initial_load: true,
            }]
        );
        assert_eq!(input.value(), "a");
    }

    #[test]
    fn preselected_option_field_stays_quiet() {
        let field = choice_field("zone", vec![("A", "a"), ("B", "b")], false);
        let (events, handler) = recording_handler();

        let input = hydrate_with_value(&field, Some("b".to_string()), handler);

        assert!(events.lock().unwrap().is_empty());
        assert_eq!(input.value(), "b");
    }

    #[test]
    fn required_empty_option_field_gets_blank_placeholder() {
        let field = choice_field("zone", vec![], true);
        let (_, handler) = recording_handler();

        let input = hydrate(&field, handler);

        match input.control() {
            InputControl::Select { options } => {
                assert_eq!(options.len(), 1);
                assert_eq!(options[0].string_value, "");
            }
            other => panic!("expected select control, got {:?}", other),
        }
        assert!(input.validate().is_err());
    }

    #[test]
    fn text_field_events_use_normalized_shape() {
        let field = FieldDescriptor {
            name: "name".to_string(),
            display_name: "Name".to_string(),
            required: true,
            kind: FieldKind::Text {
                placeholder: Some("instance name".to_string()),
                default_value: None,
            },
        };
        let (events, handler) = recording_handler();

        let mut input = hydrate(&field, handler);
        input.set_value("i-1234");
        input.focus();
        input.blur();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.name == "name" && !e.initial_load));
        assert_eq!(events[0].value, "i-1234");
    }

    #[test]
    fn text_field_uses_schema_default_value() {
        let field = FieldDescriptor {
            name: "region".to_string(),
            display_name: "Region".to_string(),
            required: false,
            kind: FieldKind::Text {
                placeholder: None,
                default_value: Some("us-east1".to_string()),
            },
        };
        let (events, handler) = recording_handler();

        let input = hydrate(&field, handler);

        assert_eq!(input.value(), "us-east1");
        assert!(events.lock().unwrap().is_empty());
    }
}
