// uniprov-api: Async client for the UniFi OS controller session and the
// site, device, and provisioning endpoints.

pub mod address;
pub mod controller;
pub mod csrf;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use address::{DeviceAddress, MacAddress, parse_address};
pub use controller::Controller;
pub use error::Error;
pub use models::{Device, Site};
pub use session::Session;
pub use transport::{TlsMode, TransportConfig};
