pub mod codec;
pub mod config;
pub mod entities;
pub mod factory;
pub mod session;
pub mod telemetry;

pub use codec::content::{DecodeError, CONTENT_TAG_KEY, CONTENT_VERSION};
pub use codec::identity::{
    ContainerIdentity, IdentityError, IDENTITY_TAG_KEY, MAX_UNITS, SLOT_UNIT,
};
pub use codec::preview::{CacheStats, ContentSummary, PreviewCache};
pub use config::{AppConfig, BackpackTemplate, TemplateConfig};
pub use entities::item::{ActorId, ItemHandle, ItemId, ItemInstance, Slot, StackEntry};
pub use entities::tags::TagStore;
pub use factory::{FactoryError, CONTAINER_TYPE_KEY};
pub use session::{CloseOutcome, SessionError, SessionRegistry};
