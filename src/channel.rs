//! Channel identity: network, station, location, and component codes.
//!
//! Both decoders extract the same four-part identity from their headers,
//! though the header layouts differ (WIN carries only a channel number;
//! SEISAN interleaves the codes through fixed text columns).

use std::fmt;

/// Identity of a single recorded channel.
///
/// # Examples
///
/// ```
/// use seiswave::ChannelId;
///
/// let id = ChannelId::from_parts("NZ", "WIZ", "10", "HHZ");
/// assert_eq!(id.to_string(), "NZ.WIZ.10.HHZ");
/// assert_eq!(id.station(), "WIZ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId {
    network: String,
    station: String,
    location: String,
    component: String,
}

impl ChannelId {
    /// Build an identity from its four codes, trimming surrounding blanks.
    pub fn from_parts(network: &str, station: &str, location: &str, component: &str) -> Self {
        Self {
            network: network.trim().to_string(),
            station: station.trim().to_string(),
            location: location.trim().to_string(),
            component: component.trim().to_string(),
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.component
        )
    }
}
