pub mod document;
pub mod element;
pub mod event;

pub use document::{Document, ListenerId, Node, NodeId};
pub use element::{Content, Element};
pub use event::{Event, EventKind, MouseButton};
