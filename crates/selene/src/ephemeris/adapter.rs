//! Swiss Ephemeris binding (feature `swiss-ephemeris`).
//!
//! The C library behind the `swisseph` crate keeps process-wide state, so a
//! session holds a global lock for its whole lifetime: opening a session
//! acquires it and points the library at the configured data directory,
//! dropping the session closes the library and releases it.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use libswisseph_sys::safe::swe_azalt;
use swisseph::swe::{calc_ut, close, houses_ex, set_ephe_path};
use swisseph::{AscMc, Cusp};

use super::provider::{EphemerisProvider, EphemerisSource};
use super::types::{AzAltMode, Atmosphere, Body, CalcFlags, EclipticPosition, GeoPosition, RawHouses};
use crate::config::EphemerisConfig;
use crate::error::{ChartError, Result};
use crate::time::JulianDay;

const DEFAULT_EPHEMERIS_PATH: &str = "/usr/local/share/swisseph";

lazy_static::lazy_static! {
    static ref SWISS_LOCK: Mutex<()> = Mutex::new(());
}

/// Swiss Ephemeris adapter implementation
pub struct SwissEphemerisAdapter {
    ephemeris_path: PathBuf,
    /// Same path as handed to `swe_set_ephe_path`
    path_arg: String,
}

impl SwissEphemerisAdapter {
    /// Create an adapter for the configured data directory.
    pub fn new(config: &EphemerisConfig) -> Result<Self> {
        let path = config
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EPHEMERIS_PATH));

        if !path.exists() {
            return Err(ChartError::config(format!(
                "Ephemeris path {} does not exist. Please ensure Swiss Ephemeris data files are installed.",
                path.display()
            )));
        }

        let path_arg = path
            .to_str()
            .filter(|p| !p.contains('\0'))
            .ok_or_else(|| {
                ChartError::config(format!(
                    "Ephemeris path {} is not valid UTF-8 without NUL bytes",
                    path.display()
                ))
            })?
            .to_string();

        Ok(Self {
            ephemeris_path: path,
            path_arg,
        })
    }

    pub fn ephemeris_path(&self) -> &PathBuf {
        &self.ephemeris_path
    }
}

impl EphemerisSource for SwissEphemerisAdapter {
    fn open(&self) -> Result<Box<dyn EphemerisProvider + '_>> {
        // A poisoned lock only means another request panicked mid-call
        let guard = SWISS_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        set_ephe_path(&self.path_arg);
        log::debug!(
            "opened Swiss Ephemeris session ({})",
            self.ephemeris_path.display()
        );
        Ok(Box::new(SwissSession {
            _guard: guard,
            adapter: self,
        }))
    }
}

/// One request's exclusive use of the library
pub struct SwissSession<'a> {
    _guard: MutexGuard<'static, ()>,
    adapter: &'a SwissEphemerisAdapter,
}

impl Drop for SwissSession<'_> {
    fn drop(&mut self) {
        // Runs before `_guard` is released
        close();
        log::debug!(
            "closed Swiss Ephemeris session ({})",
            self.adapter.ephemeris_path.display()
        );
    }
}

impl EphemerisProvider for SwissSession<'_> {
    fn calc_body(&self, jd: JulianDay, body: Body, flags: CalcFlags) -> Result<EclipticPosition> {
        let code = body.swe_code().ok_or_else(|| {
            ChartError::oracle(body.name(), jd.value(), "derived point has no Swiss body code")
        })?;

        let result = calc_ut(jd.value(), code as u32, flags.bits())
            .map_err(|e| ChartError::oracle(body.name(), jd.value(), format!("Swiss Ephemeris error: {}", e)))?;

        let out = result.out;
        Ok(EclipticPosition {
            longitude: out[0],
            latitude: out[1],
            distance: out[2],
            longitude_speed: out[3],
            latitude_speed: out[4],
            distance_speed: out[5],
        })
    }

    fn calc_houses(&self, jd: JulianDay, lat: f64, lon: f64, system_code: char) -> Result<RawHouses> {
        let (c, a) = houses_ex(jd.value(), 0, lat, lon, system_code as i32);
        let cusps = Cusp::from_array(c);
        let ascmc = AscMc::from_array(a);

        Ok(RawHouses {
            cusps: vec![
                cusps.first,
                cusps.second,
                cusps.third,
                cusps.fourth,
                cusps.fifth,
                cusps.sixth,
                cusps.seventh,
                cusps.eighth,
                cusps.ninth,
                cusps.tenth,
                cusps.eleventh,
                cusps.twelfth,
            ],
            ascendant: Some(ascmc.ascendant),
            midheaven: Some(ascmc.mc),
        })
    }

    fn az_alt(
        &self,
        jd: JulianDay,
        mode: AzAltMode,
        geo: &GeoPosition,
        atmosphere: &Atmosphere,
        coords: [f64; 3],
    ) -> Result<[f64; 3]> {
        let mut geopos = [geo.lon, geo.lat, geo.altitude];
        let mut xin = coords;
        let mut xaz = [f64::NAN; 3];
        swe_azalt(
            jd.value(),
            mode.swe_code(),
            geopos.as_mut_ptr(),
            atmosphere.pressure,
            atmosphere.temperature,
            xin.as_mut_ptr(),
            xaz.as_mut_ptr(),
        );

        if xaz.iter().any(|v| !v.is_finite()) {
            return Err(ChartError::oracle(
                "azalt",
                jd.value(),
                format!("Swiss Ephemeris returned non-finite horizontal coordinates {xaz:?}"),
            ));
        }
        Ok(xaz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> SwissEphemerisAdapter {
        let config = EphemerisConfig {
            path: Some(std::env::temp_dir()),
            ..EphemerisConfig::default()
        };
        SwissEphemerisAdapter::new(&config).unwrap()
    }

    #[test]
    fn rejects_missing_data_directory() {
        let config = EphemerisConfig {
            path: Some(PathBuf::from("/nonexistent/selene/ephe")),
            ..EphemerisConfig::default()
        };
        assert!(matches!(
            SwissEphemerisAdapter::new(&config),
            Err(ChartError::Config { .. })
        ));
    }

    #[test]
    fn session_is_scoped_to_the_configured_path() {
        let adapter = adapter();
        assert_eq!(adapter.path_arg, std::env::temp_dir().to_str().unwrap());
        // The lock is released on drop, so sessions can be reopened back to back
        for _ in 0..3 {
            let session = adapter.open().unwrap();
            drop(session);
        }
    }

    #[test]
    fn celestial_pole_stands_at_observer_latitude() {
        let adapter = adapter();
        let session = adapter.open().unwrap();
        let geo = GeoPosition::new(51.48, 0.0).unwrap();
        let [_, true_altitude, apparent_altitude] = session
            .az_alt(
                JulianDay(2_460_000.5),
                AzAltMode::EquatorialToHorizontal,
                &geo,
                &Atmosphere::default(),
                [0.0, 90.0, 1.0],
            )
            .unwrap();
        assert!((true_altitude - 51.48).abs() < 0.01, "{true_altitude}");
        assert!(apparent_altitude >= true_altitude);
    }
}
