use serde::Deserialize;

#[derive(Deserialize)]
pub(super) struct PsdRecord {
    freq: f64,
    psd: f64,
}

impl PsdRecord {
    pub(super) fn into_pair(self) -> (f64, f64) {
        (self.freq, self.psd)
    }
}
