// uniprov-core: device resolution and provisioning workflows on top of
// uniprov-api.

pub mod config;
pub mod connect;
pub mod error;
pub mod identifier;
pub mod neighbor;
pub mod provision;
pub mod resolver;

pub use config::{ControllerConfig, TlsVerification};
pub use connect::{connect, connect_site};
pub use error::CoreError;
pub use identifier::DeviceIdentifier;
pub use neighbor::local_mac;
pub use provision::{force_provision_candidates, force_provision_device};
pub use resolver::{Candidates, find_mac, resolve_candidates, resolve_identifier, select_mac};

pub use uniprov_api::{Controller, Device, DeviceAddress, MacAddress, Site};
