use crate::field::{raw_from_value, raw_native};
use crate::{Field, Scalar, State, WireBinding, WireMessage};

/// Accumulation scope deciding whether one externally observed state change
/// is echoed back to the control surface.
///
/// Registrations accumulate as a conjunction. Nothing is committed while the
/// scope is open: toggle cursors and field bookkeeping only move in
/// [`finish`](Fulfillment::finish), and only if every registration passed.
/// A non-match is the normal outcome of most observed changes and is
/// discarded silently.
pub struct Fulfillment<'a> {
    passed: bool,
    commits: Vec<Box<dyn FnOnce() + 'a>>,
    entries: Vec<TriggerEntry>,
}

impl<'a> Fulfillment<'a> {
    pub fn new() -> Fulfillment<'a> {
        Fulfillment {
            passed: true,
            commits: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Registers an additional condition that must hold for the scope to
    /// commit, e.g. "the value actually changed since the last observation".
    pub fn require(&mut self, condition: bool) {
        self.passed = self.passed && condition;
    }

    /// Checks the observed value against the field's state.
    ///
    /// Fixed needs exact equality, wire/range need the observed value inside
    /// their bounds, toggle needs the entry under the cursor, increment and
    /// ignore place no constraint. On a pass, everything but ignore
    /// contributes the observed value's wire encoding under `binding` to the
    /// eventual trigger.
    pub fn accept<T: Scalar>(
        &mut self,
        field: &'a mut Field<T>,
        binding: &WireBinding,
        observed: T,
    ) {
        if !self.passed {
            return;
        }
        let raw = match field.state() {
            State::Fixed { value } => {
                if observed != *value {
                    self.passed = false;
                    return;
                }
                Some(raw_native(observed, binding))
            }
            State::Wire { interval } => {
                if !interval.contains(observed) {
                    self.passed = false;
                    return;
                }
                Some(raw_from_value(observed, binding, interval))
            }
            State::Range { interval, .. } => {
                if !interval.contains(observed) {
                    self.passed = false;
                    return;
                }
                Some(raw_from_value(observed, binding, interval))
            }
            State::Toggle { items, cursor } => {
                if items.get(*cursor) != Some(&observed) {
                    self.passed = false;
                    return;
                }
                Some(raw_native(observed, binding))
            }
            State::Increment { .. } => Some(raw_native(observed, binding)),
            State::Ignore => None,
        };
        if let Some(raw) = raw {
            self.entries.push(TriggerEntry {
                binding: *binding,
                raw,
            });
            self.commits.push(Box::new(move || {
                field.advance_cursor();
                field.record(observed);
            }));
        }
    }

    /// Like [`accept`](Fulfillment::accept), but skipped entirely (counting
    /// as pass) if the precondition is false. Used to leave parameters
    /// irrelevant to the concrete sub-case unexamined.
    pub fn accept_if<T: Scalar>(
        &mut self,
        precondition: bool,
        field: &'a mut Field<T>,
        binding: &WireBinding,
        observed: T,
    ) {
        if precondition {
            self.accept(field, binding, observed);
        }
    }

    /// Ends the scope, exactly once: if every requirement and every evaluated
    /// registration passed, all deferred commits run (toggle cursors advance,
    /// last values are recorded) and the trigger comes out. Otherwise nothing
    /// happens at all.
    pub fn finish(self) -> Option<Trigger> {
        if !self.passed {
            return None;
        }
        for commit in self.commits {
            commit();
        }
        Some(Trigger {
            entries: self.entries,
        })
    }
}

impl<'a> Default for Fulfillment<'a> {
    fn default() -> Self {
        Fulfillment::new()
    }
}

/// Result of a committed fulfillment scope: the wire-encoded form of every
/// participating field's value, ready to be written into an outgoing message.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Trigger {
    entries: Vec<TriggerEntry>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TriggerEntry {
    pub binding: WireBinding,
    pub raw: u32,
}

impl Trigger {
    pub fn entries(&self) -> &[TriggerEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes every entry into the given message under construction.
    pub fn apply_to(&self, msg: &mut WireMessage) {
        for entry in &self.entries {
            msg.set(entry.binding.offset, entry.binding.width, entry.raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::range_field;
    use crate::{Interval, StatusCode};

    fn toggle_field(items: Vec<bool>) -> Field<bool> {
        Field::with_state("mute", State::Toggle { items, cursor: 0 })
    }

    #[test]
    fn fixed_exactness() {
        // Given
        let mut field: Field<u8> = Field::with_state("preset", State::Fixed { value: 9 });
        for (observed, expected) in [(8, false), (9, true), (10, false)] {
            let mut scope = Fulfillment::new();
            // When
            scope.accept(&mut field, &WireBinding::DATA_2, observed);
            // Then
            assert_eq!(scope.finish().is_some(), expected);
        }
    }

    #[test]
    fn range_bounds_and_encoding() {
        // Given
        let mut field = range_field("volume", 0u8, 100);
        let mut scope = Fulfillment::new();
        // When
        scope.accept(&mut field, &WireBinding::DATA_2, 50);
        let trigger = scope.finish().unwrap();
        // Then
        assert_eq!(
            trigger.entries(),
            &[TriggerEntry {
                binding: WireBinding::DATA_2,
                raw: 64,
            }]
        );
        assert_eq!(field.last_value(), Some(50));
    }

    #[test]
    fn out_of_bounds_observation_discards() {
        // Given
        let mut field = range_field("volume", 10u8, 90);
        let mut scope = Fulfillment::new();
        // When
        scope.accept(&mut field, &WireBinding::DATA_2, 95);
        // Then
        assert_eq!(scope.finish(), None);
        assert_eq!(field.last_value(), None);
    }

    #[test]
    fn toggle_scenario() {
        // Given a toggle over [true, false] with the cursor at `true`
        let mut field = toggle_field(vec![true, false]);
        // When the observation does not match the cursor entry
        let mut scope = Fulfillment::new();
        scope.accept(&mut field, &WireBinding::DATA_2, false);
        // Then the scope discards and the cursor stays put
        assert_eq!(scope.finish(), None);
        assert_eq!(field.cursor(), Some(0));
        // When the observation matches
        let mut scope = Fulfillment::new();
        scope.accept(&mut field, &WireBinding::DATA_2, true);
        // Then the scope commits and the cursor advances
        assert!(scope.finish().is_some());
        assert_eq!(field.cursor(), Some(1));
    }

    #[test]
    fn ignore_neutrality() {
        // Given
        let mut field: Field<u8> = Field::with_state("unused", State::Ignore);
        let mut scope = Fulfillment::new();
        scope.require(true);
        // When
        scope.accept(&mut field, &WireBinding::DATA_2, 123);
        let trigger = scope.finish().unwrap();
        // Then ignore contributed nothing
        assert!(trigger.is_empty());
    }

    #[test]
    fn require_failure_discards_everything() {
        // Given
        let mut toggle = toggle_field(vec![true, false]);
        let mut scope = Fulfillment::new();
        scope.accept(&mut toggle, &WireBinding::DATA_2, true);
        // When
        scope.require(false);
        // Then no cursor moved even though the accept itself matched
        assert_eq!(scope.finish(), None);
        assert_eq!(toggle.cursor(), Some(0));
    }

    #[test]
    fn skipped_registration_counts_as_pass() {
        // Given a field whose check would fail if evaluated
        let mut field: Field<u8> = Field::with_state("x", State::Fixed { value: 1 });
        let mut scope = Fulfillment::new();
        // When
        scope.accept_if(false, &mut field, &WireBinding::DATA_1, 99);
        // Then
        assert!(scope.finish().is_some());
    }

    #[test]
    fn one_failing_check_poisons_a_mixed_scope() {
        // Given
        let mut volume = range_field("volume", 0u8, 100);
        let mut toggle = toggle_field(vec![true, false]);
        let mut fixed: Field<u8> = Field::with_state("preset", State::Fixed { value: 3 });
        let mut scope = Fulfillment::new();
        // When
        scope.accept(&mut volume, &WireBinding::DATA_2, 50);
        scope.accept(&mut toggle, &WireBinding::DATA_1, true);
        scope.accept(&mut fixed, &WireBinding::DATA_1, 4);
        // Then
        assert_eq!(scope.finish(), None);
        assert_eq!(toggle.cursor(), Some(0));
        assert_eq!(volume.last_value(), None);
    }

    #[test]
    fn committed_scope_builds_an_outgoing_message() {
        // Given
        let mut volume = range_field("volume", 0u8, 100);
        let mut scope = Fulfillment::new();
        scope.require(true);
        scope.accept(&mut volume, &WireBinding::DATA_2, 100);
        // When
        let trigger = scope.finish().unwrap();
        let mut msg = WireMessage::legacy(StatusCode::ControlChange, 0, 7, 0);
        trigger.apply_to(&mut msg);
        // Then
        assert_eq!(msg.encode(), vec![0xB0, 0x07, 0x7F]);
    }

    #[test]
    fn increment_places_no_constraint() {
        // Given
        let mut field: Field<i32> = Field::with_state(
            "offset",
            State::Increment {
                step: 1.0,
                bound: None,
            },
        );
        let mut scope = Fulfillment::new();
        // When
        scope.accept(&mut field, &WireBinding::DATA_2, 42);
        let trigger = scope.finish().unwrap();
        // Then
        assert_eq!(trigger.entries()[0].raw, 42);
    }

    #[test]
    fn wire_state_inverts_the_scaling_law() {
        // Given
        let mut field: Field<f64> = Field::with_state(
            "level",
            State::Wire {
                interval: Interval::new(0.0, 1.0),
            },
        );
        let mut scope = Fulfillment::new();
        // When
        scope.accept(&mut field, &WireBinding::DATA_2, 0.5);
        let trigger = scope.finish().unwrap();
        // Then round(0.5 * 127)
        assert_eq!(trigger.entries()[0].raw, 64);
    }
}
