#[cfg(feature = "swiss-ephemeris")]
pub mod adapter;
pub mod provider;
pub mod table;
pub mod types;

#[cfg(feature = "swiss-ephemeris")]
pub use adapter::SwissEphemerisAdapter;
pub use provider::{EphemerisProvider, EphemerisSource};
pub use table::TableEphemeris;
pub use types::{
    Atmosphere, AzAltMode, Body, BodyPosition, CalcFlags, EclipticPosition, GeoPosition, RawHouses,
};
