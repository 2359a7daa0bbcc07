// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{ensure, Context, Result};

/// Checks the `host:port` shape and the port floor shared by the gRPC and
/// HTTP listeners.
pub fn validate_host(host: &str) -> Result<()> {
    ensure!(!host.is_empty(), "addr is not set");
    let (_, port) = host
        .rsplit_once(':')
        .context("invalid addr require <ip:port>")?;
    let port: u16 = port.parse().context("invalid open port: is not number")?;
    ensure!(port >= 1000, "invalid open port: require 'port >= 1000'");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_host;

    #[test]
    fn validates_shape_and_port_floor() {
        assert!(validate_host("127.0.0.1:5000").is_ok());
        assert!(validate_host("localhost:1000").is_ok());
        assert!(validate_host("").is_err());
        assert!(validate_host("nocolon").is_err());
        assert!(validate_host("host:notanumber").is_err());
        assert!(validate_host("host:999").is_err());
    }
}
