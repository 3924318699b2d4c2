//! # Environment Configuration
//!
//! Configuration file for environment variables.
//! Modify according to your environment settings.
//!
//! # TODO
//!
//! Update IP address, gateway, subnet mask, DNS servers, SSID, and password
//! for your network. A DNS server set to `0, 0, 0, 0` means "none".

pub const CONFIG: &str = r#"
IP_ADDRESS=192, 168, 1, 115
GATEWAY_ADDRESS=192, 168, 1, 1
SUBNET_MASK=255, 255, 255, 0
DNS_PRIMARY=192, 168, 1, 1
DNS_SECONDARY=0, 0, 0, 0
WIFI_NETWORK=YOUR_WIFI_SSID
WIFI_PASSWORD=YOUR_WIFI_PASSWORD
"#;
