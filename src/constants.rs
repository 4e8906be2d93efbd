//! Physical constants in SI units, matching the LAL conventions the pipeline uses

/// Speed of light in vacuum, m/s
pub const C_SI: f64 = 299_792_458.0;

/// Nominal solar mass, kg
pub const MSUN_SI: f64 = 1.988_409_902_147_041_6e30;

/// Geometrized solar mass $G M_\odot / c^3$, s
pub const MTSUN_SI: f64 = 4.925_490_947_641_267e-6;

/// Parsec, m
pub const PC_SI: f64 = 3.085_677_581_491_367_3e16;

/// Megaparsec, m
pub const MPC_SI: f64 = 1e6 * PC_SI;

/// Converts a mass in kg into seconds
#[inline]
pub fn mass_in_seconds(mass_kg: f64) -> f64 {
    mass_kg / MSUN_SI * MTSUN_SI
}

/// Converts a distance in m into seconds
#[inline]
pub fn distance_in_seconds(dist_m: f64) -> f64 {
    dist_m / C_SI
}
