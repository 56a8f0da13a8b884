//! Peak extraction
//!
//! Single left-to-right scan that reports the loudest band of every maximal
//! run of bands whose amplitude reaches the threshold.

/// Write one peak per above-threshold run into `peaks`
///
/// Every other entry is set to `floor_db`. Within a run the first band that
/// reaches the run maximum wins; a band sitting exactly at the floor never
/// becomes a peak.
///
/// # Arguments
/// * `amplitude` - Band amplitudes (dB)
/// * `threshold` - Band thresholds (dB), same length
/// * `floor_db` - Floor value for non-peak bands
/// * `peaks` - Output, same length
pub fn extract_peaks(amplitude: &[f64], threshold: &[f64], floor_db: f64, peaks: &mut [f64]) {
    debug_assert_eq!(amplitude.len(), threshold.len());
    debug_assert_eq!(amplitude.len(), peaks.len());

    peaks.fill(floor_db);

    let mut running_max = floor_db;
    let mut running_idx: Option<usize> = None;

    for (band, (&amp, &th)) in amplitude.iter().zip(threshold).enumerate() {
        let mut amp = amp;

        if amp < th {
            if let Some(idx) = running_idx.take() {
                peaks[idx] = running_max;
            }
            running_max = floor_db;
            amp = floor_db;
        }

        if running_max < amp {
            running_max = amp;
            running_idx = Some(band);
        }
    }

    if let Some(idx) = running_idx {
        peaks[idx] = running_max;
    }
}

/// Indices of the non-floor entries in a peak array
pub fn peak_indices(peaks: &[f64], floor_db: f64) -> impl Iterator<Item = usize> + '_ {
    peaks
        .iter()
        .enumerate()
        .filter(move |&(_, &p)| p > floor_db)
        .map(|(i, _)| i)
}
