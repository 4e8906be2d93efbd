pub use crate::config::FisherConfig;
pub use crate::noise::{NoiseCurve, TabulatedNoise};
pub use crate::param::{BinaryParams, Param};

pub use rift_fisher_test_util::{ALIGO_ZERO_DET_HIGH_POWER_PSD, FiducialBinary, fiducial_binary};

/// Asserts that an element function gives the same bits for both parameter orders
#[macro_export]
macro_rules! symmetric_element_test {
    (
        $name: ident,
        $element: expr_2021,
        $point: expr_2021,
        $p1: expr_2021,
        $p2: expr_2021 $(,)?
    ) => {
        #[test]
        fn $name() {
            let point = $point;
            let noise = NoiseCurve::aligo_zero_det_high_power();
            let element = $element;
            let a = element(&point, $p1, $p2, &noise).unwrap();
            let b = element(&point, $p2, $p1, &noise).unwrap();
            assert!(a.is_finite());
            assert_eq!(a.to_bits(), b.to_bits(), "{} vs {}", a, b);
        }
    };
}

pub fn binary_params(binary: FiducialBinary) -> BinaryParams {
    let mut point = BinaryParams::from_solar_masses(binary.m1, binary.m2);
    point.beta = binary.beta;
    point.theta_jn = binary.theta_jn;
    point.phi_jl = binary.phi_jl;
    point
}

fn named_point(name: &str) -> BinaryParams {
    binary_params(fiducial_binary(name).unwrap())
}

/// Unequal-mass binary with the total angular momentum along the orbital one
pub fn aligned_point() -> BinaryParams {
    named_point("aligned")
}

/// Unequal-mass binary with a precession cone of 0.4 rad
pub fn precessing_point() -> BinaryParams {
    named_point("precessing")
}

pub fn equal_mass_point() -> BinaryParams {
    named_point("equal-mass")
}

pub fn tabulated_aligo() -> NoiseCurve {
    let (freq, psd) = &*ALIGO_ZERO_DET_HIGH_POWER_PSD;
    TabulatedNoise::new(freq.to_vec(), psd.to_vec())
        .unwrap()
        .into()
}
