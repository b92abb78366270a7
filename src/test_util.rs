use crate::{Field, Interval, Scalar, State, StatusCode, WireMessage};

/// Control-change record on the given channel, the way a fader or knob on a
/// legacy surface emits it.
pub fn cc(channel: u8, controller: u8, value: u8) -> WireMessage {
    WireMessage::legacy(StatusCode::ControlChange, channel, controller, value)
}

pub fn range_field<T: Scalar>(name: &str, lo: T, hi: T) -> Field<T> {
    Field::with_state(
        name,
        State::Range {
            interval: Interval::new(lo, hi),
            step: None,
        },
    )
}
