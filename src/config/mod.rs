mod types;

pub use types::{IMAGE_REPOSITORY, LaunchConfig, Mount, Runtime};
