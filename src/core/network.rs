//! Local network address lookup

use ruuvi_epaper_core::NO_NETWORK;
use std::net::{IpAddr, UdpSocket};

/// Any non-local address; nothing is sent, connecting only selects a route
const PROBE_TARGET: &str = "10.255.255.255:1";

/// The address of the interface used for outbound traffic
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(PROBE_TARGET).ok()?;
    let addr = socket.local_addr().ok()?.ip();
    if addr.is_unspecified() {
        None
    } else {
        Some(addr)
    }
}

/// Address text for the status screen
pub fn local_address() -> String {
    match local_ip() {
        Some(addr) => addr.to_string(),
        None => {
            log::debug!("No route to {}, showing '{}'", PROBE_TARGET, NO_NETWORK);
            NO_NETWORK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_address_is_displayable() {
        let address = local_address();
        assert!(!address.is_empty());
        assert!(address == NO_NETWORK || address.parse::<IpAddr>().is_ok());
    }
}
