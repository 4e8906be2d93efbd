use crate::psd_data::record::PsdRecord;
use crate::psd_data::types::{Error, PairArray};

use itertools::{Itertools, process_results};
use std::io::Read;

pub(super) fn pairs_from_reader<R: Read>(reader: R) -> Result<PairArray, Error> {
    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
    let iter = csv_reader
        .deserialize()
        .map(|record: Result<PsdRecord, _>| -> Result<_, csv::Error> {
            Ok(record?.into_pair())
        });
    let (freq, psd): (Vec<_>, Vec<_>) = process_results(iter, |iter| iter.multiunzip())?;
    if freq.is_empty() {
        return Err(Error::Empty);
    }
    Ok((freq.into(), psd.into()))
}
