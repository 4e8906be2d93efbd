use csv_parser::pairs_from_reader;
use lazy_static::lazy_static;

mod csv_parser;
mod record;
mod types;

pub use types::PairArray;

lazy_static! {
    /// Advanced LIGO zero-detuning high-power design PSD tabulated at 1 Hz steps, 10-2048 Hz
    pub static ref ALIGO_ZERO_DET_HIGH_POWER_PSD: PairArray = {
        // Relative to the current file
        const CSV: &[u8] = include_bytes!("../../../test-data/psd/aligo_zero_det_high_power.csv");
        pairs_from_reader(CSV).unwrap()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_strictly_increasing() {
        let (freq, psd) = &*ALIGO_ZERO_DET_HIGH_POWER_PSD;
        assert_eq!(freq.len(), 2039);
        assert_eq!(freq.len(), psd.len());
        assert!(freq.windows(2).into_iter().all(|w| w[0] < w[1]));
        assert!(psd.iter().all(|&s| s > 0.0));
    }
}
