/// Binary used across tests and benchmarks
///
/// Masses are in solar masses and angles in radians, everything else takes the defaults of the
/// parameter point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FiducialBinary {
    pub name: &'static str,
    pub m1: f64,
    pub m2: f64,
    pub beta: f64,
    pub theta_jn: f64,
    pub phi_jl: f64,
}

pub const FIDUCIAL_BINARIES: [FiducialBinary; 3] = [
    FiducialBinary {
        name: "aligned",
        m1: 12.0,
        m2: 8.0,
        beta: 0.0,
        theta_jn: 0.5,
        phi_jl: 0.0,
    },
    FiducialBinary {
        name: "precessing",
        m1: 12.0,
        m2: 8.0,
        beta: 0.4,
        theta_jn: 0.7,
        phi_jl: 0.3,
    },
    FiducialBinary {
        name: "equal-mass",
        m1: 10.0,
        m2: 10.0,
        beta: 0.0,
        theta_jn: 0.5,
        phi_jl: 0.0,
    },
];

pub fn fiducial_binary(name: &str) -> Option<FiducialBinary> {
    FIDUCIAL_BINARIES.iter().find(|b| b.name == name).copied()
}
