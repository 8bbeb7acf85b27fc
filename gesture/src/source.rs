use crate::landmarks::LandmarkSet;

/// What one poll of a landmark source produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The frame read failed; try again right away.
    NoFrame,
    NoHand,
    Hand(LandmarkSet),
    /// The source has ended and will not produce anything else.
    Exhausted,
}

/// Anything that yields hand landmarks, one frame per poll.
///
/// Polled from the tracker thread, so implementations may block on I/O.
pub trait LandmarkSource: Send {
    fn poll(&mut self) -> anyhow::Result<Observation>;
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    fn poll(&mut self) -> anyhow::Result<Observation> {
        (**self).poll()
    }
}
