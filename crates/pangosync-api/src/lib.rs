// pangosync-api: Async Rust clients for the Pangolin control plane and Traefik router API

pub mod error;
pub mod models;
pub mod pangolin;
pub mod traefik;
pub mod transport;

pub use error::Error;
pub use models::{
    Domain, NewResource, NewTarget, Resource, ResourceId, Router, Site, SiteId, SiteRef, Target,
    TargetId,
};
pub use pangolin::PangolinClient;
pub use traefik::TraefikClient;
pub use transport::{TlsMode, TransportConfig};
