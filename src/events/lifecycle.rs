use crate::foundation::core::{LogicalTime, SurfaceId};

/// Inbound notification from the time source or the surface/shader/scene lifecycle.
///
/// Delivered synchronously and in order through
/// [`GeometryBackend::handle_event`](crate::GeometryBackend::handle_event). Every variant except
/// [`LifecycleEvent::Tick`] invalidates the currently bound geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// The time source advanced the logical clock.
    Tick(LogicalTime),
    /// A surface became the render target.
    SurfaceActivated(SurfaceId),
    /// The active surface stopped being the render target.
    SurfaceDeactivated,
    /// A shader program was made current.
    ShaderActivated,
    /// The current shader program was released.
    ShaderDeactivated,
    /// A scene started rendering.
    SceneActivated,
    /// A scene stopped rendering.
    SceneDeactivated,
    /// Tear down every cached resource.
    GlobalReset,
}

impl LifecycleEvent {
    /// Whether the event forces the next draw to re-export and rebind.
    pub fn invalidates_binding(self) -> bool {
        !matches!(self, LifecycleEvent::Tick(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/lifecycle.rs"]
mod tests;
