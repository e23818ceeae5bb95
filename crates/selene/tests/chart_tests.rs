use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use selene::aspects::{AspectKind, AspectPolicy};
use selene::ephemeris::{
    Atmosphere, AzAltMode, Body, CalcFlags, EclipticPosition, EphemerisProvider, EphemerisSource,
    GeoPosition, RawHouses, TableEphemeris,
};
use selene::houses::HouseSystem;
use selene::moon::PhaseName;
use selene::time::{CivilDateTime, JulianDay, UtcOffset};
use selene::zodiac::Sign;
use selene::{ChartCalculator, ChartError, ChartReport, ChartRequest, EngineConfig};

const CUSPS: [f64; 12] = [
    15.0, 42.0, 71.0, 103.0, 137.0, 168.0, 195.0, 222.0, 251.0, 283.0, 317.0, 350.0,
];

fn request_jd() -> JulianDay {
    JulianDay::from_calendar(2024, 5, 22, 18.0 + 16.0 / 60.0)
}

fn sky(epoch: JulianDay) -> TableEphemeris {
    TableEphemeris::new(epoch)
        .with_body(Body::Sun, 61.5, 0.96)
        .with_body(Body::Moon, 181.0, 13.2)
        .with_body(Body::Mercury, 45.0, 1.4)
        .with_body(Body::Venus, 70.0, 1.2)
        .with_body(Body::Mars, 355.0, 0.7)
        .with_body(Body::Jupiter, 59.0, 0.23)
        .with_body(Body::Saturn, 348.0, 0.08)
        .with_body(Body::Uranus, 53.0, 0.05)
        .with_body(Body::Neptune, 359.5, 0.02)
        .with_body(Body::Pluto, 302.0, -0.01)
        .with_body(Body::NorthNode, 15.0, -0.05)
        .with_cusps(CUSPS)
}

fn la_request() -> ChartRequest {
    ChartRequest::parse("2024-05-22", "10:16", "UTC-08:00")
        .unwrap()
        .with_geo(GeoPosition::new(34.05, -118.24).unwrap())
}

#[test]
fn test_full_chart() {
    let calculator = ChartCalculator::default();
    let chart = calculator.compute(&sky(request_jd()), &la_request()).unwrap();

    assert!((chart.julian_day.value() - request_jd().value()).abs() < 1e-8);
    assert_eq!(chart.house_system, HouseSystem::Placidus);
    assert_eq!(chart.bodies.len(), 10);
    assert!(!chart.is_degraded());

    let sun = chart.body(Body::Sun).unwrap();
    assert_eq!(sun.placement.sign, Sign::Gemini);
    assert_eq!(sun.house.house, 2);

    assert_eq!(chart.body(Body::Moon).unwrap().house.house, 6);
    assert_eq!(chart.body(Body::Mars).unwrap().house.house, 12);
    let pluto = chart.body(Body::Pluto).unwrap();
    assert_eq!(pluto.house.house, 10);
    assert!(pluto.position.is_retrograde());

    let sun_moon = chart
        .aspects
        .iter()
        .find(|a| a.involves(Body::Sun, Body::Moon))
        .unwrap();
    assert_eq!(sun_moon.kind, AspectKind::Trine);
    assert_eq!(chart.moon_phase.unwrap().name, PhaseName::FirstQuarter);

    let houses = chart.houses.as_ref().unwrap();
    assert_eq!(houses.ascendant, 15.0);
    assert_eq!(houses.midheaven, 283.0);
}

#[test]
fn test_report_aspect_angle_is_measured_separation() {
    let table = TableEphemeris::new(request_jd())
        .with_body(Body::Sun, 10.0, 0.96)
        .with_body(Body::Moon, 133.456, 13.2)
        .with_cusps(CUSPS);
    let request = la_request().with_bodies(vec![Body::Sun, Body::Moon]);
    let chart = ChartCalculator::default().compute(&table, &request).unwrap();
    let report = ChartReport::from_chart(&chart, &EngineConfig::default().output);

    assert_eq!(report.aspects.len(), 1);
    let aspect = &report.aspects[0];
    assert_eq!(aspect.kind, "Trine");
    assert_eq!(aspect.angle, 123.46);
    assert_eq!(aspect.orb, 3.46);
}

#[test]
fn test_report_field_names_and_rounding() {
    let chart = ChartCalculator::default()
        .compute(&sky(request_jd()), &la_request())
        .unwrap();
    let report = ChartReport::from_chart(&chart, &EngineConfig::default().output);

    assert_eq!(report.planets[0].name, "Sun");
    assert_eq!(report.planets[0].position, 1.5);
    assert_eq!(report.planets[0].position_dms, "1°30′00″");
    assert_eq!(report.planets[0].longitude, 61.5);
    assert_eq!(report.houses.len(), 12);
    assert_eq!(report.houses[0].sign, "Aries");
    assert_eq!(report.houses[0].position, 15.0);
    assert_eq!(report.moon_phase.as_ref().unwrap().name, "First Quarter");
    assert!(!report.degraded);

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    let planet = &json["planets"][0];
    for key in ["name", "sign", "position", "positionDMS", "house", "longitude", "speed", "retrograde"] {
        assert!(planet.get(key).is_some(), "planet field {key}");
    }
    let aspect = &json["aspects"][0];
    for key in ["planet1", "planet2", "type", "angle", "orb", "symbol"] {
        assert!(aspect.get(key).is_some(), "aspect field {key}");
    }
    assert_eq!(json["ascendant"]["sign"], "Aries");
    assert_eq!(json["midheaven"]["sign"], "Capricorn");
    assert_eq!(json["moonPhase"]["name"], "First Quarter");
    assert_eq!(json["houseSystem"], "placidus");
}

#[test]
fn test_display_values_use_configured_decimals() {
    let table = TableEphemeris::new(request_jd())
        .with_body(Body::Sun, 61.123_456_789, 0.956_789_123)
        .with_body(Body::Moon, 181.987_654_321, 13.2);
    let request = la_request()
        .with_house_system(HouseSystem::Equal)
        .with_bodies([Body::Sun, Body::Moon]);
    let chart = ChartCalculator::default().compute(&table, &request).unwrap();
    let report = ChartReport::from_chart(&chart, &EngineConfig::default().output);

    assert_eq!(report.planets[0].position, 1.12);
    assert!((report.planets[0].longitude - 61.123_457).abs() < 1e-9);
    assert!((report.planets[0].speed - 0.956_789).abs() < 1e-9);
}

#[test]
fn test_missing_location_degrades_to_equal_signs() {
    let request = ChartRequest::parse("2024-05-22", "10:16", "UTC-08:00").unwrap();
    // No cusps tabulated: degraded mode must not ask for them
    let table = TableEphemeris::new(request_jd())
        .with_body(Body::Sun, 61.5, 0.96)
        .with_body(Body::Moon, 181.0, 13.2)
        .with_house_error("should not be called");
    let chart = ChartCalculator::default()
        .compute(&table, &request.with_bodies([Body::Sun, Body::Moon]))
        .unwrap();

    assert!(chart.is_degraded());
    assert!(chart.houses.is_none());
    assert_eq!(chart.body(Body::Sun).unwrap().house.house, 3);
    assert_eq!(chart.body(Body::Moon).unwrap().house.house, 7);

    let report = ChartReport::from_chart(&chart, &EngineConfig::default().output);
    assert!(report.degraded);
    assert!(report.houses.is_empty());
    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("ascendant").is_none());
    assert!(json.get("midheaven").is_none());
}

#[test]
fn test_equal_houses_with_location_skip_the_oracle() {
    let table = TableEphemeris::new(request_jd())
        .with_body(Body::Sun, 61.5, 0.96)
        .with_house_error("should not be called");
    let request = la_request()
        .with_house_system(HouseSystem::Equal)
        .with_bodies([Body::Sun]);
    let chart = ChartCalculator::default().compute(&table, &request).unwrap();
    let houses = chart.houses.unwrap();
    assert_eq!(houses.system, HouseSystem::Equal);
    assert_eq!(houses.cusp(1), Some(houses.ascendant));
    assert!(chart.moon_phase.is_none());
}

#[test]
fn test_oracle_failure_aborts_the_whole_chart() {
    let table = sky(request_jd()).with_body_error(Body::Mars, "body out of range");
    let err = ChartCalculator::default()
        .compute(&table, &la_request())
        .unwrap_err();
    match err {
        ChartError::Oracle { context, message, .. } => {
            assert_eq!(context, "Mars");
            assert_eq!(message, "body out of range");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_house_failure_aborts_the_whole_chart() {
    let table = sky(request_jd()).with_house_error("ephemeris file missing");
    assert!(matches!(
        ChartCalculator::default().compute(&table, &la_request()),
        Err(ChartError::HouseCalculation { .. })
    ));

    let table = sky(request_jd()).with_houses(RawHouses {
        cusps: CUSPS[..6].to_vec(),
        ascendant: Some(15.0),
        midheaven: Some(283.0),
    });
    assert!(matches!(
        ChartCalculator::default().compute(&table, &la_request()),
        Err(ChartError::HouseCalculation { .. })
    ));
}

#[test]
fn test_south_node_mirrors_north_node() {
    let request = la_request().with_bodies([Body::SouthNode, Body::NorthNode, Body::Sun]);
    let chart = ChartCalculator::default()
        .compute(&sky(request_jd()), &request)
        .unwrap();

    let north = chart.body(Body::NorthNode).unwrap();
    let south = chart.body(Body::SouthNode).unwrap();
    assert!((south.position.longitude - 195.0).abs() < 1e-6);
    assert_eq!(south.position.longitude_speed, north.position.longitude_speed);
    assert_eq!(south.placement.sign, Sign::Libra);

    let nodes = chart
        .aspects
        .iter()
        .find(|a| a.involves(Body::NorthNode, Body::SouthNode))
        .unwrap();
    assert_eq!(nodes.kind, AspectKind::Opposition);
    // Request order is kept
    assert_eq!(chart.bodies[0].position.body, Body::SouthNode);
}

#[test]
fn test_invalid_requests_are_rejected() {
    assert!(matches!(
        ChartRequest::parse("2024-04-31", "10:16", "UTC-08:00"),
        Err(ChartError::InvalidInput { .. })
    ));
    assert!(matches!(
        ChartRequest::parse("2024-05-22", "10:16", "Pacific"),
        Err(ChartError::InvalidInput { .. })
    ));

    let mut request = la_request();
    request.geo = Some(GeoPosition {
        lat: 12.0,
        lon: 200.0,
        altitude: 0.0,
    });
    assert!(matches!(
        ChartCalculator::default().compute(&sky(request_jd()), &request),
        Err(ChartError::InvalidInput { .. })
    ));
}

#[test]
fn test_configured_policy_and_defaults_apply() {
    let config = EngineConfig::from_toml_str(
        r#"
        [chart]
        house_system = "equal"
        bodies = ["sun", "mars"]
        aspect_policy = "tightest_orb"

        [chart.orbs]
        sextile = 28.0
        "#,
    )
    .unwrap();
    let calculator = ChartCalculator::new(config).unwrap();
    let table = TableEphemeris::new(request_jd())
        .with_body(Body::Sun, 0.0, 1.0)
        .with_body(Body::Mars, 32.5, 0.6);
    let chart = calculator.compute(&table, &la_request()).unwrap();

    assert_eq!(chart.house_system, HouseSystem::Equal);
    assert_eq!(chart.bodies.len(), 2);
    assert_eq!(chart.aspects[0].kind, AspectKind::SemiSextile);
    assert_eq!(calculator.config().chart.aspect_policy, AspectPolicy::TightestOrb);
}

#[test]
fn test_offset_forms_give_the_same_chart() {
    let table = sky(request_jd());
    let calculator = ChartCalculator::default();
    let pacific = calculator.compute(&table, &la_request()).unwrap();

    let utc_request = ChartRequest::new(CivilDateTime::new(2024, 5, 22, 18, 16, 0.0), UtcOffset::UTC)
        .with_geo(GeoPosition::new(34.05, -118.24).unwrap());
    let utc = calculator.compute(&table, &utc_request).unwrap();

    assert!((pacific.julian_day.value() - utc.julian_day.value()).abs() < 1e-8);
    assert_eq!(pacific.utc.date, utc.utc.date);
    assert_eq!(pacific.aspects.len(), utc.aspects.len());
}

#[test]
fn test_parallel_requests_share_nothing() {
    let calculator = ChartCalculator::default();
    let table = sky(request_jd());
    let requests: Vec<ChartRequest> = (0..8)
        .map(|hour| {
            ChartRequest::new(CivilDateTime::new(2024, 5, 22, hour * 3, 16, 0.0), UtcOffset::parse("UTC-08:00").unwrap())
                .with_geo(GeoPosition::new(34.05, -118.24).unwrap())
        })
        .collect();

    let sequential: Vec<_> = requests
        .iter()
        .map(|r| calculator.compute(&table, r).unwrap())
        .collect();

    let parallel: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = requests
            .iter()
            .map(|r| {
                let calculator = &calculator;
                let table = &table;
                scope.spawn(move || calculator.compute(table, r).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
}

/// Counts sessions so tests can check each chart opens exactly one and
/// always releases it.
struct CountingSource {
    table: TableEphemeris,
    opened: AtomicUsize,
    released: AtomicUsize,
    atmosphere: Mutex<Option<Atmosphere>>,
}

impl CountingSource {
    fn new(table: TableEphemeris) -> Self {
        Self {
            table,
            opened: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            atmosphere: Mutex::new(None),
        }
    }
}

struct CountingSession<'a> {
    table: &'a TableEphemeris,
    released: &'a AtomicUsize,
    atmosphere: &'a Mutex<Option<Atmosphere>>,
}

impl Drop for CountingSession<'_> {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl EphemerisProvider for CountingSession<'_> {
    fn calc_body(&self, jd: JulianDay, body: Body, flags: CalcFlags) -> selene::Result<EclipticPosition> {
        self.table.calc_body(jd, body, flags)
    }

    fn calc_houses(&self, jd: JulianDay, lat: f64, lon: f64, system_code: char) -> selene::Result<RawHouses> {
        self.table.calc_houses(jd, lat, lon, system_code)
    }

    fn az_alt(
        &self,
        jd: JulianDay,
        mode: AzAltMode,
        geo: &GeoPosition,
        atmosphere: &Atmosphere,
        coords: [f64; 3],
    ) -> selene::Result<[f64; 3]> {
        *self.atmosphere.lock().unwrap() = Some(*atmosphere);
        self.table.az_alt(jd, mode, geo, atmosphere, coords)
    }
}

impl EphemerisSource for CountingSource {
    fn open(&self) -> selene::Result<Box<dyn EphemerisProvider + '_>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingSession {
            table: &self.table,
            released: &self.released,
            atmosphere: &self.atmosphere,
        }))
    }
}

#[test]
fn test_one_session_per_chart_released_on_error() {
    let source = CountingSource::new(sky(request_jd()));
    let calculator = ChartCalculator::default();
    calculator.compute(&source, &la_request()).unwrap();
    assert_eq!(source.opened.load(Ordering::SeqCst), 1);
    assert_eq!(source.released.load(Ordering::SeqCst), 1);

    let failing = la_request().with_bodies([Body::Sun, Body::Chiron]);
    assert!(calculator.compute(&source, &failing).is_err());
    assert_eq!(source.opened.load(Ordering::SeqCst), 2);
    assert_eq!(source.released.load(Ordering::SeqCst), 2);
}

#[test]
fn test_moon_position_uses_configured_sky_and_flags() {
    let config = EngineConfig::from_toml_str("[sky]\npressure = 990.0\ntemperature = -5.0").unwrap();
    let calculator = ChartCalculator::new(config).unwrap();
    let source = CountingSource::new(sky(request_jd()).with_horizontal([200.0, 12.0, 12.1]));
    let geo = GeoPosition::new(34.05, -118.24).unwrap();

    let report = calculator
        .moon_position(&source, request_jd(), Some(&geo))
        .unwrap();
    assert_eq!(report.zodiac_sign.sign, Sign::Libra);
    assert_eq!(report.sky.unwrap().azimuth, 200.0);
    assert_eq!(
        *source.atmosphere.lock().unwrap(),
        Some(Atmosphere {
            pressure: 990.0,
            temperature: -5.0,
        })
    );
    assert_eq!(source.released.load(Ordering::SeqCst), 1);

    let report = calculator.moon_position(&source, request_jd(), None).unwrap();
    assert!(report.sky.is_none());
}
