use crate::document::NodeId;

/// Pointer events with node targeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Pointer pressed over a node
    PointerDown { target: NodeId, button: MouseButton },
    /// Full click (press + release) on a node
    Click { target: NodeId, button: MouseButton },
}

impl Event {
    pub fn pointer_down(target: NodeId) -> Self {
        Self::PointerDown {
            target,
            button: MouseButton::Left,
        }
    }

    pub fn click(target: NodeId) -> Self {
        Self::Click {
            target,
            button: MouseButton::Left,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerDown { .. } => EventKind::PointerDown,
            Self::Click { .. } => EventKind::Click,
        }
    }

    pub fn target(&self) -> NodeId {
        match self {
            Self::PointerDown { target, .. } | Self::Click { target, .. } => *target,
        }
    }

    pub fn button(&self) -> MouseButton {
        match self {
            Self::PointerDown { button, .. } | Self::Click { button, .. } => *button,
        }
    }
}

/// Event discriminant used when registering listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerDown,
    Click,
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}
