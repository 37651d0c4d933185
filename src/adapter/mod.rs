//! The dispatcher: registration, publishing, and fan-out.

mod builder;
mod in_memory;
mod publish;

pub use builder::AdapterBuilder;
pub use in_memory::InMemoryMessageBusAdapter;
pub use publish::{PublishOptions, PublishReport};
