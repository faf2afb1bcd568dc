pub mod actions;
pub mod bot;
pub mod registry;
pub mod table_actor;

pub use actions::{ActionError, ActionOutcome};
pub use registry::TableRegistry;
pub use table_actor::{GameAction, JoinInfo, TableCommand, TableHandle};
