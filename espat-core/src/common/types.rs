use alloc::string::String;
use core::fmt;
use core::net::Ipv4Addr;

use bit_field::BitField;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::error::ArgumentError;
use crate::constant::*;

/// Hardware (MAC) address
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Create a new MacAddress
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Get raw octets
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Group (multicast) address
    /// Bit 0 of byte 0. A SoftAP cannot use such an address as its own.
    pub fn is_group(&self) -> bool {
        self.0[0].get_bit(0)
    }

    /// Locally administered address (bit 1 of byte 0)
    pub fn is_local(&self) -> bool {
        self.0[0].get_bit(1)
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Encryption mode
///
/// | Value | Mode         |
/// | ----- | ------------ |
/// | 0     | OPEN         |
/// | 1     | WEP          |
/// | 2     | WPA_PSK      |
/// | 3     | WPA2_PSK     |
/// | 4     | WPA_WPA2_PSK |
#[derive(Copy, Clone, Eq, PartialEq, Debug, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Ecn {
    Open = 0,
    Wep = 1,
    WpaPsk = 2,
    Wpa2Psk = 3,
    WpaWpa2Psk = 4,
}

impl Ecn {
    /// Check if the mode can be used by the SoftAP
    /// The device refuses WEP for its own access point.
    pub fn is_ap_capable(&self) -> bool {
        !matches!(self, Self::Wep)
    }
}

/// IP configuration of the access point interface
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ApIpConfig {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ApIpConfig {
    fn format(&self, f: defmt::Formatter) {
        let (ip, gw, nm) = (self.ip.octets(), self.gateway.octets(), self.netmask.octets());
        defmt::write!(
            f,
            "ip={}.{}.{}.{} gw={}.{}.{}.{} nm={}.{}.{}.{}",
            ip[0], ip[1], ip[2], ip[3],
            gw[0], gw[1], gw[2], gw[3],
            nm[0], nm[1], nm[2], nm[3],
        )
    }
}

/// Station connected to the access point
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Station {
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
}

impl Station {
    /// Unused entry
    pub const EMPTY: Self = Self {
        ip: Ipv4Addr::UNSPECIFIED,
        mac: MacAddress([0; 6]),
    };

    /// Create a new Station
    pub const fn new(ip: Ipv4Addr, mac: MacAddress) -> Self {
        Self { ip, mac }
    }
}

impl Default for Station {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Station {
    fn format(&self, f: defmt::Formatter) {
        let ip = self.ip.octets();
        defmt::write!(f, "ip={}.{}.{}.{} mac={}", ip[0], ip[1], ip[2], ip[3], self.mac)
    }
}

/// SoftAP configuration (AT+CWSAP)
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ApConfiguration {
    /// Network name
    pub ssid: String,
    /// Shared secret. None for an open network
    pub password: Option<String>,
    /// RF channel
    pub channel: u8,
    /// Encryption mode
    pub ecn: Ecn,
    /// Maximum number of stations
    pub max_stations: u8,
    /// Hide the SSID from beacons
    pub hidden: bool,
}

impl ApConfiguration {
    /// Create a new ApConfiguration
    pub fn new(
        ssid: &str,
        password: Option<&str>,
        channel: u8,
        ecn: Ecn,
        max_stations: u8,
        hidden: bool,
    ) -> Self {
        Self {
            ssid: String::from(ssid),
            password: password.map(String::from),
            channel,
            ecn,
            max_stations,
            hidden,
        }
    }

    /// Check all fields against the device limits
    pub fn validate(&self) -> Result<(), ArgumentError> {
        if self.ssid.is_empty() {
            return Err(ArgumentError::EmptySsid);
        }
        if self.ssid.len() > AP_SSID_MAX_LEN {
            return Err(ArgumentError::SsidTooLong {
                len: self.ssid.len(),
            });
        }
        if let Some(password) = &self.password {
            let len = password.len();
            if len > AP_PASSWORD_MAX_LEN {
                return Err(ArgumentError::PasswordTooLong { len });
            }
        }
        if self.channel > AP_CHANNEL_MAX {
            return Err(ArgumentError::ChannelOutOfRange {
                channel: self.channel,
            });
        }
        if !self.ecn.is_ap_capable() {
            return Err(ArgumentError::UnsupportedEncryption { ecn: self.ecn });
        }
        if !(AP_MAX_STATIONS_MIN..=AP_MAX_STATIONS_MAX).contains(&self.max_stations) {
            return Err(ArgumentError::MaxStationsOutOfRange {
                max_stations: self.max_stations,
            });
        }
        Ok(())
    }
}
