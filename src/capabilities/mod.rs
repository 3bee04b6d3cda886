//! External capability interfaces: stable seams to Persistence, Identity,
//! Policy, and Network Transport. Specified here, not implemented — a
//! production deployment supplies its own backends. `test_support` (a
//! separate workspace member) provides in-memory reference
//! implementations used by this crate's own tests.

pub mod identity;
pub mod persistence;
pub mod policy;
pub mod transport;

pub use identity::IdentityService;
pub use persistence::{ArticleLocator, ExistingArticle, ExistingFeed, ExistingNewsgroup,
    ExistingPeer, GroupRecord, PersistenceService};
pub use policy::PolicyService;
pub use transport::{NetworkTransport, ProtocolStreams, ServiceManager, TransportConfig};
