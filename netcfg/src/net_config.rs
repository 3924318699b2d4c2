//! Typed network configuration.
//!
//! Parses the key=value text embedded by [`crate::configuration`] into an
//! immutable [`NetConfig`] record that the network bring-up consumes.
//! Parsing is strict: a missing mandatory key or a malformed address is an
//! error, never a silent fallback.

use core::fmt;
use core::net::Ipv4Addr;

/// 802.11 limit for the SSID, in bytes.
const MAX_SSID_LEN: usize = 32;

/// WPA2 limit for a passphrase, in bytes.
const MAX_PSK_LEN: usize = 63;

/// Immutable network parameters for static-IP bring-up.
///
/// Built once at startup from [`crate::configuration::CONFIG`] and passed
/// by reference to whatever consumes it; nothing mutates it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetConfig {
    /// Name of the WiFi network to join
    pub ssid: &'static str,
    /// Shared secret for the network
    pub password: &'static str,
    /// Static address to request for this device
    pub local_addr: Ipv4Addr,
    /// Router address on the local network
    pub gateway: Ipv4Addr,
    /// Network mask defining the local subnet
    pub subnet_mask: Ipv4Addr,
    /// Preferred DNS resolver, `None` when not configured
    pub primary_dns: Option<Ipv4Addr>,
    /// Fallback DNS resolver, `None` when not configured
    pub secondary_dns: Option<Ipv4Addr>,
}

/// Reasons a configuration text cannot be turned into a usable [`NetConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A mandatory key is absent from the configuration text.
    MissingKey(&'static str),
    /// An address value is not four comma-separated octets in 0-255.
    BadAddress(&'static str),
    /// SSID is empty.
    EmptySsid,
    /// SSID exceeds the 32-byte 802.11 limit.
    SsidTooLong,
    /// Password is empty.
    EmptyPassword,
    /// Password exceeds the 63-byte WPA2 passphrase limit.
    PasswordTooLong,
    /// The named address is the all-zero placeholder.
    UnsetAddress(&'static str),
    /// Subnet mask bits are not contiguous.
    NonContiguousMask,
    /// Subnet mask is all zero.
    ZeroMask,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey(key) => write!(f, "missing key {key}"),
            Self::BadAddress(key) => write!(f, "{key} is not a valid 4-octet address"),
            Self::EmptySsid => write!(f, "WIFI_NETWORK is empty"),
            Self::SsidTooLong => write!(f, "WIFI_NETWORK exceeds {MAX_SSID_LEN} bytes"),
            Self::EmptyPassword => write!(f, "WIFI_PASSWORD is empty"),
            Self::PasswordTooLong => write!(f, "WIFI_PASSWORD exceeds {MAX_PSK_LEN} bytes"),
            Self::UnsetAddress(key) => write!(f, "{key} is 0.0.0.0"),
            Self::NonContiguousMask => write!(f, "SUBNET_MASK bits are not contiguous"),
            Self::ZeroMask => write!(f, "SUBNET_MASK is all zero"),
        }
    }
}

impl NetConfig {
    /// Parses a configuration text into a record.
    ///
    /// The two DNS keys are optional; a DNS entry of `0, 0, 0, 0` is
    /// normalized to `None`, so consumers never see a zero-valued resolver.
    ///
    /// # Arguments
    /// * `text` - Configuration text in the `KEY=VALUE` line format
    ///
    /// # Returns
    /// * Result<NetConfig, ConfigError> - The parsed record
    pub fn parse(text: &'static str) -> Result<Self, ConfigError> {
        Ok(Self {
            ssid: lookup(text, "WIFI_NETWORK")?,
            password: lookup(text, "WIFI_PASSWORD")?,
            local_addr: parse_addr(lookup(text, "IP_ADDRESS")?, "IP_ADDRESS")?,
            gateway: parse_addr(lookup(text, "GATEWAY_ADDRESS")?, "GATEWAY_ADDRESS")?,
            subnet_mask: parse_addr(lookup(text, "SUBNET_MASK")?, "SUBNET_MASK")?,
            primary_dns: parse_dns(text, "DNS_PRIMARY")?,
            secondary_dns: parse_dns(text, "DNS_SECONDARY")?,
        })
    }

    /// Checks that the record can actually be used to join a network:
    /// non-empty credentials within the 802.11/WPA2 length limits, no
    /// all-zero placeholder addresses, and a contiguous non-zero mask.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        if self.ssid.len() > MAX_SSID_LEN {
            return Err(ConfigError::SsidTooLong);
        }
        if self.password.is_empty() {
            return Err(ConfigError::EmptyPassword);
        }
        if self.password.len() > MAX_PSK_LEN {
            return Err(ConfigError::PasswordTooLong);
        }
        if self.local_addr.is_unspecified() {
            return Err(ConfigError::UnsetAddress("IP_ADDRESS"));
        }
        if self.gateway.is_unspecified() {
            return Err(ConfigError::UnsetAddress("GATEWAY_ADDRESS"));
        }
        if self.subnet_mask.is_unspecified() {
            return Err(ConfigError::ZeroMask);
        }
        self.prefix_len()?;
        Ok(())
    }

    /// CIDR prefix length of the subnet mask, e.g. 24 for `255.255.255.0`.
    ///
    /// # Returns
    /// * Result<u8, ConfigError> - Error if the mask bits are not contiguous
    pub fn prefix_len(&self) -> Result<u8, ConfigError> {
        let bits = u32::from_be_bytes(self.subnet_mask.octets());
        if bits.count_ones() != bits.leading_ones() {
            return Err(ConfigError::NonContiguousMask);
        }
        Ok(bits.leading_ones() as u8)
    }

    /// Configured DNS resolvers in preference order, skipping unset entries.
    pub fn dns_servers(&self) -> impl Iterator<Item = Ipv4Addr> {
        [self.primary_dns, self.secondary_dns].into_iter().flatten()
    }
}

/// Finds the value of `key` in the configuration text. The first matching
/// line wins.
fn lookup(text: &'static str, key: &'static str) -> Result<&'static str, ConfigError> {
    text.lines()
        .filter_map(|line| line.strip_prefix(key)?.strip_prefix('='))
        .next()
        .ok_or(ConfigError::MissingKey(key))
}

/// Parses four comma-separated octets, e.g. `192, 168, 1, 115`.
fn parse_addr(value: &str, key: &'static str) -> Result<Ipv4Addr, ConfigError> {
    let mut octets = [0u8; 4];
    let mut parts = value.split(',');
    for octet in &mut octets {
        let part = parts.next().ok_or(ConfigError::BadAddress(key))?;
        *octet = part.trim().parse().map_err(|_| ConfigError::BadAddress(key))?;
    }
    if parts.next().is_some() {
        return Err(ConfigError::BadAddress(key));
    }
    Ok(Ipv4Addr::from(octets))
}

/// Parses an optional DNS entry. A missing key or the `0, 0, 0, 0`
/// placeholder both mean "no resolver configured".
fn parse_dns(text: &'static str, key: &'static str) -> Result<Option<Ipv4Addr>, ConfigError> {
    match lookup(text, key) {
        Ok(value) => {
            let addr = parse_addr(value, key)?;
            Ok((!addr.is_unspecified()).then_some(addr))
        }
        Err(ConfigError::MissingKey(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GOOD: &str = r#"
IP_ADDRESS=192, 168, 1, 115
GATEWAY_ADDRESS=192, 168, 1, 1
SUBNET_MASK=255, 255, 255, 0
DNS_PRIMARY=192, 168, 1, 1
DNS_SECONDARY=0, 0, 0, 0
WIFI_NETWORK=myap
WIFI_PASSWORD=secretpw
"#;

    fn good() -> NetConfig {
        NetConfig::parse(GOOD).unwrap()
    }

    #[test]
    fn parses_a_complete_config() {
        let config = good();
        assert_eq!(config.ssid, "myap");
        assert_eq!(config.password, "secretpw");
        assert_eq!(config.local_addr, Ipv4Addr::new(192, 168, 1, 115));
        assert_eq!(config.gateway, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(config.subnet_mask, Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn shipped_config_is_well_formed() {
        let config = NetConfig::parse(crate::configuration::CONFIG).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn missing_mandatory_key_is_an_error() {
        let text = "WIFI_NETWORK=ap\nWIFI_PASSWORD=pw\n";
        assert_eq!(
            NetConfig::parse(text),
            Err(ConfigError::MissingKey("IP_ADDRESS"))
        );
    }

    #[test]
    fn octet_out_of_range_is_an_error() {
        let text = r#"
IP_ADDRESS=192, 168, 1, 256
GATEWAY_ADDRESS=192, 168, 1, 1
SUBNET_MASK=255, 255, 255, 0
WIFI_NETWORK=myap
WIFI_PASSWORD=secretpw
"#;
        assert_eq!(
            NetConfig::parse(text),
            Err(ConfigError::BadAddress("IP_ADDRESS"))
        );
    }

    #[test]
    fn wrong_octet_count_is_an_error() {
        let three = r#"
IP_ADDRESS=192, 168, 1
GATEWAY_ADDRESS=192, 168, 1, 1
SUBNET_MASK=255, 255, 255, 0
WIFI_NETWORK=myap
WIFI_PASSWORD=secretpw
"#;
        let five = r#"
IP_ADDRESS=192, 168, 1, 115, 7
GATEWAY_ADDRESS=192, 168, 1, 1
SUBNET_MASK=255, 255, 255, 0
WIFI_NETWORK=myap
WIFI_PASSWORD=secretpw
"#;
        assert_eq!(
            NetConfig::parse(three),
            Err(ConfigError::BadAddress("IP_ADDRESS"))
        );
        assert_eq!(
            NetConfig::parse(five),
            Err(ConfigError::BadAddress("IP_ADDRESS"))
        );
    }

    #[test]
    fn zero_dns_entries_are_unset() {
        let config = good();
        assert_eq!(config.primary_dns, Some(Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(config.secondary_dns, None);
    }

    #[test]
    fn absent_dns_keys_are_unset() {
        let text = r#"
IP_ADDRESS=192, 168, 1, 115
GATEWAY_ADDRESS=192, 168, 1, 1
SUBNET_MASK=255, 255, 255, 0
WIFI_NETWORK=myap
WIFI_PASSWORD=secretpw
"#;
        let config = NetConfig::parse(text).unwrap();
        assert_eq!(config.primary_dns, None);
        assert_eq!(config.secondary_dns, None);
    }

    #[test]
    fn dns_servers_keeps_preference_order() {
        let config = good();
        let servers: Vec<Ipv4Addr> = config.dns_servers().collect();
        assert_eq!(servers, vec![Ipv4Addr::new(192, 168, 1, 1)]);

        let mut both = config;
        both.secondary_dns = Some(Ipv4Addr::new(8, 8, 8, 8));
        let servers: Vec<Ipv4Addr> = both.dns_servers().collect();
        assert_eq!(
            servers,
            vec![Ipv4Addr::new(192, 168, 1, 1), Ipv4Addr::new(8, 8, 8, 8)]
        );
    }

    #[test]
    fn mask_converts_to_prefix_length() {
        let mut config = good();
        assert_eq!(config.prefix_len(), Ok(24));

        config.subnet_mask = Ipv4Addr::new(255, 255, 0, 0);
        assert_eq!(config.prefix_len(), Ok(16));

        config.subnet_mask = Ipv4Addr::new(255, 255, 255, 255);
        assert_eq!(config.prefix_len(), Ok(32));
    }

    #[test]
    fn non_contiguous_mask_is_an_error() {
        let mut config = good();
        config.subnet_mask = Ipv4Addr::new(255, 0, 255, 0);
        assert_eq!(config.prefix_len(), Err(ConfigError::NonContiguousMask));
        assert_eq!(config.validate(), Err(ConfigError::NonContiguousMask));
    }

    #[test]
    fn zero_mask_fails_validation() {
        let mut config = good();
        config.subnet_mask = Ipv4Addr::new(0, 0, 0, 0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroMask));
    }

    #[test]
    fn empty_credentials_fail_validation() {
        let mut config = good();
        config.ssid = "";
        assert_eq!(config.validate(), Err(ConfigError::EmptySsid));

        let mut config = good();
        config.password = "";
        assert_eq!(config.validate(), Err(ConfigError::EmptyPassword));
    }

    #[test]
    fn oversized_credentials_fail_validation() {
        let mut config = good();
        config.ssid = "an-ssid-well-past-the-thirty-two-byte-limit";
        assert_eq!(config.validate(), Err(ConfigError::SsidTooLong));

        let mut config = good();
        config.password =
            "0123456789012345678901234567890123456789012345678901234567890123456789";
        assert_eq!(config.validate(), Err(ConfigError::PasswordTooLong));
    }

    #[test]
    fn placeholder_zero_addresses_fail_validation() {
        let mut config = good();
        config.local_addr = Ipv4Addr::new(0, 0, 0, 0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsetAddress("IP_ADDRESS"))
        );

        let mut config = good();
        config.gateway = Ipv4Addr::new(0, 0, 0, 0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsetAddress("GATEWAY_ADDRESS"))
        );
    }

    #[test]
    fn first_occurrence_of_a_key_wins() {
        let text = r#"
IP_ADDRESS=192, 168, 1, 115
IP_ADDRESS=10, 0, 0, 1
GATEWAY_ADDRESS=192, 168, 1, 1
SUBNET_MASK=255, 255, 255, 0
WIFI_NETWORK=myap
WIFI_PASSWORD=secretpw
"#;
        let config = NetConfig::parse(text).unwrap();
        assert_eq!(config.local_addr, Ipv4Addr::new(192, 168, 1, 115));
    }
}
