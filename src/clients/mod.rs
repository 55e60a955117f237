mod chat;
pub mod hosted;
pub mod local;
pub mod resolver;
pub mod traits;

pub use hosted::HostedGenerator;
pub use local::LocalGenerator;
pub use resolver::{ProviderResolver, ResolvedProvider};
pub use traits::{GenerationError, Generator, Preference, ProviderKind, StructuredRequest};
