use crate::field::value_from_raw;
use crate::{Field, Scalar, State, WireBinding, WireMessage};
use thiserror::Error;

/// Everything inbound resolution may draw on besides the field itself.
///
/// "No originating message" is an explicit precondition, not something
/// inferred per state: contexts built for invocations without a triggering
/// frame (scheduled commands and the like) carry `None`, and message-derived
/// states fail on them.
#[derive(Copy, Clone, Debug, Default)]
pub struct ResolveContext<'a> {
    msg: Option<&'a WireMessage>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(msg: &'a WireMessage) -> ResolveContext<'a> {
        ResolveContext { msg: Some(msg) }
    }

    /// Context for an invocation that has no originating message.
    pub fn without_message() -> ResolveContext<'a> {
        ResolveContext { msg: None }
    }

    pub fn msg(&self) -> Option<&'a WireMessage> {
        self.msg
    }
}

/// Why a single field could not produce a value. Scoped to that field: the
/// owning command aborts just its own execution, other commands are
/// unaffected.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
pub enum Unresolvable {
    #[error("no originating wire message available")]
    NoMessage,
    #[error("toggle list is empty")]
    EmptyToggle,
    #[error("current external value unavailable")]
    NoCurrentValue,
    #[error("value kind has no relative arithmetic")]
    NoArithmetic,
}

impl<T: Scalar> Field<T> {
    /// Resolves this field to a concrete value per its active state.
    ///
    /// `current` is the live external value, fetched by the caller up front;
    /// only increment states consume it. `Ok(None)` means "no constraint":
    /// skip assigning this parameter, it is not a failure.
    ///
    /// On success a toggle cursor advances exactly once and the value is
    /// recorded as the field's last concrete value. A failed attempt leaves
    /// the field untouched.
    pub fn resolve(
        &mut self,
        cx: &ResolveContext,
        binding: &WireBinding,
        current: Option<T>,
    ) -> Result<Option<T>, Unresolvable> {
        match self.peek(cx, binding, current) {
            Ok(Some(value)) => {
                self.advance_cursor();
                self.record(value);
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                tracing::warn!(field = self.name(), error = %e, "field could not be resolved");
                Err(e)
            }
        }
    }

    /// Like [`resolve`](Field::resolve) but side-effect free: no cursor
    /// movement, no bookkeeping, no logging.
    pub fn peek(
        &self,
        cx: &ResolveContext,
        binding: &WireBinding,
        current: Option<T>,
    ) -> Result<Option<T>, Unresolvable> {
        match self.state() {
            State::Fixed { value } => Ok(Some(*value)),
            State::Wire { interval } => {
                let msg = cx.msg().ok_or(Unresolvable::NoMessage)?;
                Ok(Some(value_from_raw(binding.read(msg), binding, interval, None)))
            }
            State::Range { interval, step } => {
                let msg = cx.msg().ok_or(Unresolvable::NoMessage)?;
                Ok(Some(value_from_raw(
                    binding.read(msg),
                    binding,
                    interval,
                    *step,
                )))
            }
            State::Toggle { items, cursor } => items
                .get(*cursor)
                .copied()
                .map(Some)
                .ok_or(Unresolvable::EmptyToggle),
            State::Increment { step, bound } => {
                let current = current.ok_or(Unresolvable::NoCurrentValue)?;
                current
                    .offset_by(*step, *bound)
                    .map(Some)
                    .ok_or(Unresolvable::NoArithmetic)
            }
            State::Ignore => Ok(None),
        }
    }
}
