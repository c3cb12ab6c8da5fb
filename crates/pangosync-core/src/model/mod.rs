// ── Domain model ──
//
// Desired-state types. Remote records (resources, targets, sites, domains)
// are the `pangosync-api` wire types, used as-is.

pub mod forward;

pub use forward::{Forward, ForwardKey, HttpForward, HttpMethod, PortForward, Protocol};
