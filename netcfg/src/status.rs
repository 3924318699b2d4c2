//! Rendering of the HTTP status responses.
//!
//! Pure string building so it can be unit tested on the host; the firmware
//! wraps these into picoserve responses. The password is deliberately never
//! rendered.

use core::net::Ipv4Addr;

use heapless::format;

use crate::net_config::NetConfig;

const HTML_HEADER: &str =
    "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Network Status</title></head><body>";
const HTML_FOOTER: &str = "</body></html>";

/// Generates the HTML status page: one table row per network parameter,
/// plus the uptime.
///
/// # Arguments
/// * `config` - Network configuration the firmware was brought up with
/// * `uptime_secs` - Seconds since boot
///
/// # Returns
/// * heapless::String<1024> - Generated HTML page
pub fn status_html(config: &NetConfig, uptime_secs: u64) -> heapless::String<1024> {
    let prefix_len = config.prefix_len().unwrap_or(0);

    let mut html = heapless::String::<1024>::new();
    html.push_str(HTML_HEADER).unwrap_or_default();
    html.push_str("<h1>Network Status</h1><table border=\"1\">")
        .unwrap_or_default();

    push_row(&mut html, "SSID", config.ssid);
    let address: heapless::String<24> =
        format!("{}/{}", config.local_addr, prefix_len).unwrap_or_default();
    push_row(&mut html, "Address", &address);
    let gateway: heapless::String<16> = format!("{}", config.gateway).unwrap_or_default();
    push_row(&mut html, "Gateway", &gateway);
    let mask: heapless::String<16> = format!("{}", config.subnet_mask).unwrap_or_default();
    push_row(&mut html, "Subnet mask", &mask);
    push_row(&mut html, "Primary DNS", &dns_text(config.primary_dns));
    push_row(&mut html, "Secondary DNS", &dns_text(config.secondary_dns));
    let uptime: heapless::String<24> = format!("{uptime_secs} s").unwrap_or_default();
    push_row(&mut html, "Uptime", &uptime);

    html.push_str("</table>").unwrap_or_default();
    html.push_str(HTML_FOOTER).unwrap_or_default();
    html
}

/// Generates the JSON body served on `/config`. Unset DNS entries are
/// rendered as `null`.
///
/// # Arguments
/// * `config` - Network configuration the firmware was brought up with
/// * `uptime_secs` - Seconds since boot
///
/// # Returns
/// * heapless::String<512> - Generated JSON document
pub fn status_json(config: &NetConfig, uptime_secs: u64) -> heapless::String<512> {
    let prefix_len = config.prefix_len().unwrap_or(0);
    format!(
        "{{\"ssid\":\"{}\",\"address\":\"{}\",\"prefix_len\":{},\"gateway\":\"{}\",\"subnet_mask\":\"{}\",\"primary_dns\":{},\"secondary_dns\":{},\"uptime_secs\":{}}}",
        config.ssid,
        config.local_addr,
        prefix_len,
        config.gateway,
        config.subnet_mask,
        dns_json(config.primary_dns),
        dns_json(config.secondary_dns),
        uptime_secs
    )
    .unwrap_or_default()
}

fn push_row(html: &mut heapless::String<1024>, name: &str, value: &str) {
    let row: heapless::String<128> =
        format!("<tr><td>{name}</td><td>{value}</td></tr>").unwrap_or_default();
    html.push_str(row.as_str()).unwrap_or_default();
}

fn dns_text(server: Option<Ipv4Addr>) -> heapless::String<16> {
    match server {
        Some(addr) => format!("{addr}").unwrap_or_default(),
        None => format!("(unset)").unwrap_or_default(),
    }
}

fn dns_json(server: Option<Ipv4Addr>) -> heapless::String<20> {
    match server {
        Some(addr) => format!("\"{addr}\"").unwrap_or_default(),
        None => format!("null").unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net_config::NetConfig;
    use pretty_assertions::assert_eq;

    const CONFIG_TEXT: &str = r#"
IP_ADDRESS=192, 168, 1, 115
GATEWAY_ADDRESS=192, 168, 1, 1
SUBNET_MASK=255, 255, 255, 0
DNS_PRIMARY=1, 1, 1, 1
DNS_SECONDARY=0, 0, 0, 0
WIFI_NETWORK=myap
WIFI_PASSWORD=secretpw
"#;

    fn config() -> NetConfig {
        NetConfig::parse(CONFIG_TEXT).unwrap()
    }

    #[test]
    fn html_lists_every_parameter() {
        let html = status_html(&config(), 42);
        assert!(html.contains("myap"));
        assert!(html.contains("192.168.1.115/24"));
        assert!(html.contains("192.168.1.1"));
        assert!(html.contains("255.255.255.0"));
        assert!(html.contains("1.1.1.1"));
        assert!(html.contains("42 s"));
    }

    #[test]
    fn unset_dns_is_marked() {
        let html = status_html(&config(), 0);
        assert!(html.contains("(unset)"));

        let json = status_json(&config(), 0);
        assert!(json.contains("\"primary_dns\":\"1.1.1.1\""));
        assert!(json.contains("\"secondary_dns\":null"));
    }

    #[test]
    fn json_carries_the_address_and_uptime() {
        let json = status_json(&config(), 77);
        assert_eq!(
            json.as_str(),
            "{\"ssid\":\"myap\",\"address\":\"192.168.1.115\",\"prefix_len\":24,\
             \"gateway\":\"192.168.1.1\",\"subnet_mask\":\"255.255.255.0\",\
             \"primary_dns\":\"1.1.1.1\",\"secondary_dns\":null,\"uptime_secs\":77}"
        );
    }

    #[test]
    fn renderings_never_leak_the_password() {
        let html = status_html(&config(), 1);
        let json = status_json(&config(), 1);
        assert!(!html.contains("secretpw"));
        assert!(!json.contains("secretpw"));
    }
}
