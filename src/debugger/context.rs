use crate::executor::CommandQueue;

/// Scratch state of one pause. Nested pauses push their own context, so an
/// inner `resume()` never ends the outer pause.
#[derive(Debug)]
pub struct PauseContext<E> {
    pub resumed: bool,
    pub frame_index: u32,
    pub queue: CommandQueue<E>,
}

impl<E> PauseContext<E> {
    pub fn new() -> Self {
        Self {
            resumed: false,
            frame_index: 0,
            queue: CommandQueue::new(),
        }
    }

    /// State after a `resume()` or after the drain loop ends without one.
    pub fn mark_resumed(&mut self) {
        self.resumed = true;
        self.frame_index = 0;
    }
}

impl<E> Default for PauseContext<E> {
    fn default() -> Self {
        Self::new()
    }
}
