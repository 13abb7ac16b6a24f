#![cfg(feature = "ethernet")]

//! Best-effort notifications about rewritten frames.

use crate::eth::MAC_LEN;

/// Fixed 8 byte payload pushed to the event channel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteEvent {
    pub source_address: [u8; MAC_LEN],
    /// Network byte order.
    pub ether_type: [u8; 2],
}

impl RewriteEvent {
    pub const SIZE: usize = 8;

    #[inline(always)]
    pub fn ether_type(&self) -> u16 {
        u16::from_be_bytes(self.ether_type)
    }
}

/// Which address, if any, is reported for a rewritten frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitPoint {
    #[default]
    Disabled,
    /// The address the frame arrived with.
    BeforeRewrite,
    /// The address the frame leaves with.
    AfterRewrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitError {
    Full,
    Closed,
}

/// Lossy, non-blocking append target. Callers never retry.
pub trait EventSink {
    fn try_emit(&self, event: &RewriteEvent) -> Result<(), EmitError>;
}

/// Sink for builds that do not report anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl EventSink for NoEvents {
    #[inline(always)]
    fn try_emit(&self, _event: &RewriteEvent) -> Result<(), EmitError> {
        Ok(())
    }
}

/// `None` behaves like [`NoEvents`].
impl<S: EventSink> EventSink for Option<S> {
    #[inline(always)]
    fn try_emit(&self, event: &RewriteEvent) -> Result<(), EmitError> {
        match self {
            Some(sink) => sink.try_emit(event),
            None => Ok(()),
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for &S {
    #[inline(always)]
    fn try_emit(&self, event: &RewriteEvent) -> Result<(), EmitError> {
        (**self).try_emit(event)
    }
}
