//! Ground distances and cell areas
//!
//! Patch areas are reported in hectares, so the size of one cell has to be
//! known in square metres. It is derived from ground distances measured along
//! the four edges of the full raster region: the east-west distances at the
//! north and south edges and the north-south distances at the east and west
//! edges are averaged and divided by the column and row counts.
//!
//! Geodesic distances use the Vincenty (1975) inverse solution, and the
//! great circle on the mean-radius sphere where that fails to converge.

use serde::{Deserialize, Serialize};

use crate::crs::Crs;
use crate::raster::Extent;

/// WGS84 semi-major axis (m)
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Reference ellipsoid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spheroid {
    /// Semi-major axis in metres
    pub semi_major: f64,
    pub flattening: f64,
}

impl Default for Spheroid {
    fn default() -> Self {
        Self {
            semi_major: WGS84_A,
            flattening: WGS84_F,
        }
    }
}

/// Distance in metres between two points in map coordinates.
pub trait GroundDistance {
    fn distance(&self, a: (f64, f64), b: (f64, f64)) -> f64;

    /// Area of one cell of `extent` in square metres
    fn cell_area_m2(&self, extent: &Extent) -> f64 {
        let (n, s, e, w) = (extent.north, extent.south, extent.east, extent.west);

        let ew_north = self.distance((e, n), (w, n));
        let ew_south = self.distance((e, s), (w, s));
        let ns_east = self.distance((e, n), (e, s));
        let ns_west = self.distance((w, n), (w, s));

        (((ew_north + ew_south) / 2.0) / extent.cols as f64)
            * (((ns_east + ns_west) / 2.0) / extent.rows as f64)
    }
}

/// How map coordinates translate into ground distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DistanceModel {
    /// Euclidean distance in projected units, scaled to metres
    Planimetric { meters_per_unit: f64 },
    /// Geodesic distance on the spheroid, coordinates as lon/lat degrees
    Geodesic(Spheroid),
}

impl DistanceModel {
    /// Geodesic on WGS84 for geographic CRSs, planimetric metres otherwise
    pub fn for_crs(crs: Option<&Crs>) -> Self {
        match crs {
            Some(crs) if crs.is_geographic() => DistanceModel::Geodesic(Spheroid::default()),
            _ => DistanceModel::default(),
        }
    }
}

impl Default for DistanceModel {
    fn default() -> Self {
        DistanceModel::Planimetric {
            meters_per_unit: 1.0,
        }
    }
}

impl Spheroid {
    fn semi_minor(&self) -> f64 {
        self.semi_major * (1.0 - self.flattening)
    }

    /// Great-circle distance on the sphere of mean radius `(2a + b) / 3`
    pub fn great_circle(&self, a: (f64, f64), b: (f64, f64)) -> f64 {
        let radius = (2.0 * self.semi_major + self.semi_minor()) / 3.0;
        let (lat1, lat2) = (a.1.to_radians(), b.1.to_radians());
        let half_dlat = (lat2 - lat1) / 2.0;
        let half_dlon = (b.0 - a.0).to_radians() / 2.0;

        let h = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
        2.0 * radius * h.sqrt().min(1.0).asin()
    }
}

impl GroundDistance for DistanceModel {
    fn distance(&self, a: (f64, f64), b: (f64, f64)) -> f64 {
        match self {
            DistanceModel::Planimetric { meters_per_unit } => {
                (a.0 - b.0).hypot(a.1 - b.1) * meters_per_unit
            }
            DistanceModel::Geodesic(spheroid) => {
                vincenty_distance(a, b, spheroid).unwrap_or_else(|| spheroid.great_circle(a, b))
            }
        }
    }
}

const MAX_ITERATIONS: usize = 200;

/// Geodesic distance in metres between two lon/lat points given in degrees,
/// by the Vincenty (1975) inverse solution.
///
/// Returns `None` when the longitude iteration does not settle, which happens
/// for nearly antipodal points.
pub fn vincenty_distance(a: (f64, f64), b: (f64, f64), spheroid: &Spheroid) -> Option<f64> {
    let f = spheroid.flattening;
    let (major, minor) = (spheroid.semi_major, spheroid.semi_minor());

    let reduced = |lat: f64| ((1.0 - f) * lat.to_radians().tan()).atan().sin_cos();
    let (sin_u1, cos_u1) = reduced(a.1);
    let (sin_u2, cos_u2) = reduced(b.1);
    let l = (b.0 - a.0).to_radians();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();

        let sin_sigma = (cos_u2 * sin_lambda).hypot(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
        if sin_sigma < 1e-15 {
            // coincident points
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos2_alpha = 1.0 - sin_alpha * sin_alpha;
        // zero along the equator
        let cos_2sm = if cos2_alpha > 1e-15 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos2_alpha
        } else {
            0.0
        };

        let c = f / 16.0 * cos2_alpha * (4.0 + f * (4.0 - 3.0 * cos2_alpha));
        let next = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma + c * sin_sigma * (cos_2sm + c * cos_sigma * (2.0 * cos_2sm * cos_2sm - 1.0)));

        if next.abs() > std::f64::consts::PI {
            return None;
        }
        if (next - lambda).abs() < 1e-12 {
            let u_sq = cos2_alpha * (major * major - minor * minor) / (minor * minor);
            return Some(minor * geodesic_arc(u_sq, sigma, sin_sigma, cos_sigma, cos_2sm));
        }
        lambda = next;
    }

    None
}

/// Ellipsoidal arc length on the unit auxiliary sphere
fn geodesic_arc(u_sq: f64, sigma: f64, sin_sigma: f64, cos_sigma: f64, cos_2sm: f64) -> f64 {
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));

    let cos2 = cos_2sm * cos_2sm;
    let delta_sigma = big_b
        * sin_sigma
        * (cos_2sm
            + big_b / 4.0
                * (cos_sigma * (2.0 * cos2 - 1.0)
                    - big_b / 6.0 * cos_2sm * (4.0 * sin_sigma * sin_sigma - 3.0) * (4.0 * cos2 - 3.0)));

    big_a * (sigma - delta_sigma)
}
