//! The four stateful pieces of a portrait session
//!
//! Data flows strictly one way: [`InputCollector`] hands a copy of its input
//! to [`PromptGenerator`], whose result seeds the [`PromptEditor`] draft,
//! which in turn feeds [`PortraitGenerator`]. Generators never run their
//! remote calls themselves; they return a [`PendingCall`] for the session to
//! drive and later accept the outcome through `complete`.

pub mod editor;
pub mod input;
pub mod portrait;
pub mod prompt;

pub use editor::PromptEditor;
pub use input::InputCollector;
pub use portrait::PortraitGenerator;
pub use prompt::PromptGenerator;

use crate::ai::RemoteCall;
use crate::lifecycle::Ticket;

/// A remote call issued by a generator, tagged with the ticket its outcome
/// must be completed with.
pub struct PendingCall<T> {
    pub ticket: Ticket,
    pub call: RemoteCall<T>,
}
