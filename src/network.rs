// src/network.rs
use std::net::{IpAddr, Ipv4Addr};

use tokio::net::UdpSocket;

/// Best guess at the address other machines on the network can reach us on.
/// Only used for the startup banner. Connecting a UDP socket sends nothing;
/// it just makes the OS pick the outbound interface.
pub async fn local_ip() -> IpAddr {
    async fn probe() -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).await?;
        Ok(socket.local_addr()?.ip())
    }

    match probe().await {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Err(e) => {
            tracing::debug!(error = %e, "could not resolve local address");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}
