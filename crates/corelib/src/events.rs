use crate::math::UVec2;

/// Events delivered by [`BackendImpl::poll_event`](crate::BackendImpl::poll_event)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Event {
    /// The user asked to close the window or the application
    Quit,
    /// The window's drawable size changed (physical pixels)
    Resized(UVec2),
    Focused(bool),
    /// Keyboard, mouse or touch activity
    Input,
    Other,
}

impl Event {
    #[inline]
    pub fn is_quit(&self) -> bool {
        matches!(self, Event::Quit)
    }
}
