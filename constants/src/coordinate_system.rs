/// WGS84 semi-major axis in metres.
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

/// WGS84 first eccentricity squared.
pub const WGS84_ECCENTRICITY_SQUARED: f64 = 6.694_379_990_141_316e-3;

/// Convert geodetic longitude/latitude (radians) and ellipsoidal height (metres)
/// into Earth-centred Earth-fixed cartesian coordinates.
pub fn geodetic_to_cartesian(longitude: f64, latitude: f64, height: f64) -> [f64; 3] {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_lon, cos_lon) = longitude.sin_cos();

    let prime_vertical =
        WGS84_SEMI_MAJOR_AXIS / (1.0 - WGS84_ECCENTRICITY_SQUARED * sin_lat * sin_lat).sqrt();

    [
        (prime_vertical + height) * cos_lat * cos_lon,
        (prime_vertical + height) * cos_lat * sin_lon,
        (prime_vertical * (1.0 - WGS84_ECCENTRICITY_SQUARED) + height) * sin_lat,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equator_prime_meridian_lies_on_x_axis() {
        let [x, y, z] = geodetic_to_cartesian(0.0, 0.0, 0.0);
        assert!((x - WGS84_SEMI_MAJOR_AXIS).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
        assert!(z.abs() < 1e-6);
    }

    #[test]
    fn north_pole_uses_polar_radius() {
        let [x, _, z] = geodetic_to_cartesian(0.0, std::f64::consts::FRAC_PI_2, 0.0);
        assert!(x.abs() < 1e-6);
        assert!((z - 6_356_752.314_245).abs() < 1e-3);
    }
}
