pub use binaries::{FIDUCIAL_BINARIES, FiducialBinary, fiducial_binary};
pub use psd_data::{ALIGO_ZERO_DET_HIGH_POWER_PSD, PairArray};

mod binaries;
mod psd_data;
