//! Seams to the host application: where the observer is, and where visual
//! objects live.

use glam::Vec2;

/// Receives activation side effects for chunk visual objects.
///
/// `M` is the mesh type produced by the synthesizer. The streamer never reads
/// anything back from the sink.
pub trait RenderSink<M> {
    /// Opaque reference to one visual object
    type Handle;

    /// Create a hidden visual object for a newly registered chunk
    fn create_visual_object(&mut self) -> Self::Handle;

    /// Hand freshly synthesized geometry to a visual object
    fn attach_mesh(&mut self, handle: &Self::Handle, mesh: &M);

    /// Show or hide a visual object
    fn set_visible(&mut self, handle: &Self::Handle, visible: bool);
}

/// Supplies the observer's world position each tick.
///
/// The returned `Vec2` holds world x in `.x` and world z in `.y`.
pub trait ObserverSource {
    fn observer_position(&self) -> Vec2;
}

impl<F> ObserverSource for F
where
    F: Fn() -> Vec2,
{
    fn observer_position(&self) -> Vec2 {
        self()
    }
}

/// Observer that never moves
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedObserver(pub Vec2);

impl ObserverSource for FixedObserver {
    fn observer_position(&self) -> Vec2 {
        self.0
    }
}
