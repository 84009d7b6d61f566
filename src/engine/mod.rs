// Container engine plumbing: probing, identity lookup, process hand-off.

pub mod identity;
pub mod probe;
pub mod run;
pub mod types;

pub use identity::{current_uid, current_user};
pub use probe::{CommandProbe, RuntimeProbe, needs_sudo};
pub use run::hand_off;
pub use types::ContainerCommand;
