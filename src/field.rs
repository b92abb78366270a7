use crate::wire_message::{DATA_1_OFFSET, DATA_2_OFFSET, WORD_0_OFFSET, WORD_1_OFFSET};
use crate::{Interval, Scalar, TranslationMap, WireMessage};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Designates the sub-field of a [`WireMessage`] a field reads and writes.
///
/// Which binding applies is a property of the command owning the field, not
/// of the field's state, so callers pass it alongside the field.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct WireBinding {
    pub offset: u32,
    pub width: u32,
}

impl WireBinding {
    /// First legacy data byte (7 value bits).
    pub const DATA_1: WireBinding = WireBinding::new(DATA_1_OFFSET, 7);
    /// Second legacy data byte (7 value bits).
    pub const DATA_2: WireBinding = WireBinding::new(DATA_2_OFFSET, 7);
    /// Data portion of the first universal word.
    pub const WORD_0_DATA: WireBinding = WireBinding::new(WORD_0_OFFSET, 16);
    /// Second universal word.
    pub const WORD_1: WireBinding = WireBinding::new(WORD_1_OFFSET, 32);

    pub const fn new(offset: u32, width: u32) -> WireBinding {
        WireBinding { offset, width }
    }

    /// Highest raw value representable at this binding's width.
    pub fn max_raw(&self) -> u32 {
        let width = self.width.min(32);
        if width == 0 {
            0
        } else {
            ((1u64 << width) - 1) as u32
        }
    }

    /// Reads the bound sub-field of the given message.
    pub fn read(&self, msg: &WireMessage) -> u32 {
        msg.get(self.offset, self.width)
    }
}

/// Maps a raw sub-field reading into the given bounds per the scaling law:
/// `lo + (hi - lo) * r / (2^w - 1)`, rounded to the value kind's precision.
/// An optional step snaps the mapped value to the grid `lo + k * step` first.
pub(crate) fn value_from_raw<T: Scalar>(
    raw: u32,
    binding: &WireBinding,
    interval: &Interval<T>,
    step: Option<f64>,
) -> T {
    let max_raw = binding.max_raw();
    if max_raw == 0 {
        return interval.min_val();
    }
    let ratio = raw.min(max_raw) as f64 / max_raw as f64;
    let min = interval.min_val().to_continuous();
    let mapped = min + interval.span() * ratio;
    let snapped = match step {
        Some(step) if step > 0.0 => num::clamp(
            min + ((mapped - min) / step).round() * step,
            min,
            interval.max_val().to_continuous(),
        ),
        _ => mapped,
    };
    T::from_continuous(snapped)
}

/// Exact algebraic inverse of [`value_from_raw`], rounded to the nearest
/// representable raw integer so the two directions agree at representable
/// steps.
pub(crate) fn raw_from_value<T: Scalar>(
    value: T,
    binding: &WireBinding,
    interval: &Interval<T>,
) -> u32 {
    let max_raw = binding.max_raw();
    let span = interval.span();
    if max_raw == 0 || span <= 0.0 {
        return 0;
    }
    let ratio = (value.to_continuous() - interval.min_val().to_continuous()) / span;
    num::clamp((ratio * max_raw as f64).round(), 0.0, max_raw as f64) as u32
}

/// Embedding used when a state has no interval of its own: the value's
/// continuous form over the binding's native range.
pub(crate) fn raw_native<T: Scalar>(value: T, binding: &WireBinding) -> u32 {
    num::clamp(value.to_continuous().round(), 0.0, binding.max_raw() as f64) as u32
}

/// The behavior mode of a field. Exactly one is active at a time.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub enum State<T: Scalar> {
    /// Constant. Resolution returns it unconditionally, fulfillment accepts
    /// only an exact match.
    Fixed { value: T },
    /// Linearly derived from the bound wire sub-field, scaled into the
    /// protocol sub-range.
    Wire { interval: Interval<T> },
    /// Like `Wire` but with bounds of the field's own choosing, optionally
    /// snapped to a step grid.
    Range {
        interval: Interval<T>,
        step: Option<f64>,
    },
    /// Cycles through `items`, advancing one entry per successful use.
    Toggle { items: Vec<T>, cursor: usize },
    /// Relative "change by" semantics against the live external value.
    Increment { step: f64, bound: Option<f64> },
    /// No constraint in either direction.
    Ignore,
}

impl<T: Scalar> State<T> {
    pub fn kind(&self) -> StateKind {
        use State::*;
        match self {
            Fixed { .. } => StateKind::Fixed,
            Wire { .. } => StateKind::Wire,
            Range { .. } => StateKind::Range,
            Toggle { .. } => StateKind::Toggle,
            Increment { .. } => StateKind::Increment,
            Ignore => StateKind::Ignore,
        }
    }

    /// The single concrete value this state pins down right now, if any.
    fn concrete_value(&self) -> Option<T> {
        match self {
            State::Fixed { value } => Some(*value),
            State::Toggle { items, cursor } => items.get(*cursor).copied(),
            _ => None,
        }
    }
}

/// Fieldless mirror of the [`State`] variants, for editing surfaces that
/// offer the list of modes.
#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, EnumIter, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum StateKind {
    Fixed,
    Wire,
    Range,
    Toggle,
    Increment,
    Ignore,
}

/// A named, typed configuration slot holding one active [`State`].
///
/// The last concrete value the field produced or matched survives state
/// switches, so a new state can start from it.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct Field<T: Scalar> {
    name: String,
    state: State<T>,
    #[serde(default)]
    last_value: Option<T>,
    #[serde(default)]
    translation: Option<TranslationMap<T>>,
}

impl<T: Scalar> Field<T> {
    /// Creates a field in the default state (fixed at the neutral value).
    pub fn new(name: impl Into<String>) -> Field<T> {
        Field::with_state(
            name,
            State::Fixed {
                value: T::neutral(),
            },
        )
    }

    pub fn with_state(name: impl Into<String>, state: State<T>) -> Field<T> {
        Field {
            name: name.into(),
            state,
            last_value: None,
            translation: None,
        }
    }

    pub fn with_translation(mut self, translation: TranslationMap<T>) -> Field<T> {
        self.translation = Some(translation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &State<T> {
        &self.state
    }

    pub fn set_state(&mut self, state: State<T>) {
        self.state = state;
    }

    /// Last concrete value this field produced or matched.
    pub fn last_value(&self) -> Option<T> {
        self.last_value
    }

    /// Returns the display label of the given value, if a translation map is
    /// attached and knows it.
    pub fn label_of(&self, value: &T) -> Option<&str> {
        self.translation.as_ref()?.label_of(value)
    }

    /// Replaces the active state with the given kind's default.
    ///
    /// Prior variant parameters are discarded, but the last concrete value
    /// carries over into the new state where it has a value slot: it becomes
    /// the fixed value, or one bound of a fresh wire/range interval. An
    /// existing interval survives a switch between the two interval states.
    pub fn switch_state(&mut self, kind: StateKind) {
        let carried = self.carried_value();
        self.last_value = Some(carried);
        let interval = match &self.state {
            State::Wire { interval } => *interval,
            State::Range { interval, .. } => *interval,
            _ => Interval::new_auto(T::neutral(), carried),
        };
        self.state = match kind {
            StateKind::Fixed => State::Fixed { value: carried },
            StateKind::Wire => State::Wire { interval },
            StateKind::Range => State::Range {
                interval,
                step: None,
            },
            StateKind::Toggle => State::Toggle {
                items: Vec::new(),
                cursor: 0,
            },
            StateKind::Increment => State::Increment {
                step: 1.0,
                bound: None,
            },
            StateKind::Ignore => State::Ignore,
        };
    }

    fn carried_value(&self) -> T {
        self.last_value
            .or_else(|| self.state.concrete_value())
            .unwrap_or_else(T::neutral)
    }

    /// Current toggle cursor, if the field is in toggle state.
    pub fn cursor(&self) -> Option<usize> {
        match &self.state {
            State::Toggle { cursor, .. } => Some(*cursor),
            _ => None,
        }
    }

    pub(crate) fn record(&mut self, value: T) {
        self.last_value = Some(value);
    }

    /// Advances the toggle cursor by one, wrapping at the list end. No-op in
    /// any other state.
    pub(crate) fn advance_cursor(&mut self) {
        if let State::Toggle { items, cursor } = &mut self.state {
            if !items.is_empty() {
                *cursor = (*cursor + 1) % items.len();
            }
        }
    }
}
