// src/core/geoip.rs

//! GeoIP lookup at its interface.
//!
//! Country resolution is an external collaborator: the daemon only needs a
//! function from an IPv4 address to a country. Deployments wire in a real
//! database-backed resolver; the default resolves nothing.

use std::net::Ipv4Addr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub name: String,
    pub iso_code: String,
}

pub trait CountryResolver: Send + Sync {
    fn lookup(&self, ip: Ipv4Addr) -> Option<Country>;
}

/// Resolver used when no GeoIP database is configured.
pub struct NoGeoIp;

impl CountryResolver for NoGeoIp {
    fn lookup(&self, _ip: Ipv4Addr) -> Option<Country> {
        None
    }
}

/// Display form used in chat: the country name, or a neutral placeholder.
pub fn country_label(country: Option<&Country>) -> &str {
    country.map(|c| c.name.as_str()).unwrap_or("Unknown")
}
