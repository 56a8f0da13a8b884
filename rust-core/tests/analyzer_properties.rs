//! Behavioural properties of the analyzer engine
//!
//! Runs complete engines through tones, noise and silence and checks the
//! output invariants for both estimation strategies.

use bandscope::spectrum::peak_indices;
use bandscope::{AnalyzerConfig, EstimatorKind, SpectrumAnalyzer};
use proptest::prelude::*;
use realfft::RealFftPlanner;
use std::f64::consts::PI;

const KINDS: [EstimatorKind; 2] = [EstimatorKind::Biquad, EstimatorKind::Correlator];

/// 8 kHz, 80-sample blocks, 72 bands at 12 per octave from 13.75 Hz
fn small_config(kind: EstimatorKind) -> AnalyzerConfig {
    AnalyzerConfig::new(8000, 80, 72, 12, kind)
}

/// Xorshift white noise in [-amplitude, amplitude]
struct Noise(u32);

impl Noise {
    fn fill(&mut self, amplitude: f64, out: &mut [f64]) {
        for sample in out {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 17;
            self.0 ^= self.0 << 5;
            *sample = amplitude * (self.0 as i32 as f64) / (i32::MAX as f64);
        }
    }
}

/// Feed `blocks` consecutive blocks of `signal(n)` where n is the absolute sample index
fn run<F: Fn(usize) -> f64>(analyzer: &mut SpectrumAnalyzer, blocks: usize, signal: F) {
    let len = analyzer.config().block_length;
    let mut block = vec![0.0; len];

    for b in 0..blocks {
        for (i, sample) in block.iter_mut().enumerate() {
            *sample = signal(b * len + i);
        }
        analyzer.process_block(&block).unwrap();
    }
}

fn tone(freq: f64, amplitude: f64, sample_rate: u32) -> impl Fn(usize) -> f64 {
    move |n| amplitude * (2.0 * PI * freq * n as f64 / sample_rate as f64).sin()
}

fn loudest_band(amplitude: &[f64]) -> usize {
    amplitude
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
        .map(|(i, _)| i)
        .unwrap()
}

fn assert_outputs_bounded(analyzer: &SpectrumAnalyzer) {
    let floor = analyzer.config().floor_db;
    for series in [analyzer.amplitude(), analyzer.threshold(), analyzer.peak()] {
        assert_eq!(series.len(), analyzer.band_count());
        for &v in series {
            assert!(v.is_finite(), "non-finite output {}", v);
            assert!(v >= floor, "output {} below floor {}", v, floor);
        }
    }
}

/// Every reported peak is the first maximum of an above-threshold run
fn assert_peak_invariant(analyzer: &SpectrumAnalyzer) {
    let floor = analyzer.config().floor_db;
    let amp = analyzer.amplitude();
    let th = analyzer.threshold();
    let peak = analyzer.peak();

    let above: Vec<bool> = amp.iter().zip(th).map(|(a, t)| a >= t).collect();
    let runs = above
        .iter()
        .enumerate()
        .filter(|&(i, &up)| up && (i == 0 || !above[i - 1]))
        .count();

    let peaks: Vec<usize> = peak_indices(peak, floor).collect();
    assert!(peaks.len() <= runs, "{} peaks for {} runs", peaks.len(), runs);

    for &i in &peaks {
        assert!(above[i], "peak at {} is below its threshold", i);
        assert_eq!(peak[i], amp[i]);

        let start = (0..i).rev().take_while(|&j| above[j]).last().unwrap_or(i);
        let end = (i..amp.len()).take_while(|&j| above[j]).last().unwrap_or(i);
        for j in start..=end {
            if j < i {
                assert!(amp[j] < amp[i], "earlier band {} ties or beats peak {}", j, i);
            } else {
                assert!(amp[j] <= amp[i], "band {} beats peak {}", j, i);
            }
        }
    }
}

#[test]
fn silence_keeps_everything_at_floor() {
    for kind in KINDS {
        let mut analyzer = SpectrumAnalyzer::new(small_config(kind)).unwrap();
        run(&mut analyzer, 10, |_| 0.0);

        assert_outputs_bounded(&analyzer);
        assert!(analyzer.amplitude().iter().all(|&a| (a + 40.0).abs() < 1e-9));
        assert_eq!(peak_indices(analyzer.peak(), -40.0).count(), 0);
    }
}

#[test]
fn noise_then_silence_decays_to_floor() {
    for kind in KINDS {
        let mut analyzer = SpectrumAnalyzer::new(small_config(kind)).unwrap();
        let mut noise = Noise(0x1234_5678);
        let mut block = vec![0.0; 80];

        for _ in 0..50 {
            noise.fill(0.5, &mut block);
            analyzer.process_block(&block).unwrap();
            assert_outputs_bounded(&analyzer);
        }
        assert!(analyzer.amplitude().iter().any(|&a| a > -30.0), "{:?}", kind);

        run(&mut analyzer, 300, |_| 0.0);

        assert_outputs_bounded(&analyzer);
        assert!(
            analyzer.amplitude().iter().all(|&a| (a + 40.0).abs() < 1e-9),
            "{:?} did not decay: {:?}",
            kind,
            analyzer.amplitude()
        );
        assert_eq!(peak_indices(analyzer.peak(), -40.0).count(), 0);
    }
}

#[test]
fn single_tone_peaks_at_its_band() {
    for kind in KINDS {
        let config = small_config(kind);
        let mut analyzer = SpectrumAnalyzer::new(config.clone()).unwrap();
        let freq = analyzer.band_frequency(60).unwrap();

        run(&mut analyzer, 200, tone(freq, 0.5, config.sample_rate));

        assert_outputs_bounded(&analyzer);
        assert_peak_invariant(&analyzer);
        assert_eq!(loudest_band(analyzer.amplitude()), 60, "{:?}", kind);

        let peaks: Vec<usize> = peak_indices(analyzer.peak(), config.floor_db).collect();
        assert!(peaks.contains(&60), "{:?}: {:?}", kind, peaks);
        assert!(peaks.len() <= 2, "{:?}: {:?}", kind, peaks);
    }
}

#[test]
fn default_config_tone() {
    for kind in KINDS {
        let config = AnalyzerConfig {
            estimator: kind,
            ..AnalyzerConfig::default()
        };
        let mut analyzer = SpectrumAnalyzer::new(config.clone()).unwrap();

        // 880 Hz is band 216 of the default bank
        assert!((analyzer.band_frequency(216).unwrap() - 880.0).abs() < 1e-9);
        run(&mut analyzer, 60, tone(880.0, 0.5, config.sample_rate));

        assert_outputs_bounded(&analyzer);
        assert_peak_invariant(&analyzer);
        assert_eq!(loudest_band(analyzer.amplitude()), 216);
        assert!(peak_indices(analyzer.peak(), config.floor_db).count() <= 2);
    }
}

#[test]
fn estimators_agree_on_a_sustained_tone() {
    let mut levels = Vec::new();

    for kind in KINDS {
        let config = small_config(kind);
        let mut analyzer = SpectrumAnalyzer::new(config.clone()).unwrap();
        run(&mut analyzer, 200, tone(220.0, 0.5, config.sample_rate));
        levels.push(analyzer.amplitude()[48]);
    }

    // Sine of amplitude 0.5 has RMS 0.354, about -9 dB
    for level in &levels {
        assert!((level + 9.0).abs() < 1.0, "level {}", level);
    }
    assert!((levels[0] - levels[1]).abs() < 1.0, "{:?}", levels);
}

#[test]
fn replay_is_deterministic() {
    for kind in KINDS {
        let mut first = SpectrumAnalyzer::new(small_config(kind)).unwrap();
        let mut second = SpectrumAnalyzer::new(small_config(kind)).unwrap();
        let mut noise_a = Noise(42);
        let mut noise_b = Noise(42);
        let mut block_a = vec![0.0; 80];
        let mut block_b = vec![0.0; 80];

        for _ in 0..40 {
            noise_a.fill(0.8, &mut block_a);
            noise_b.fill(0.8, &mut block_b);
            first.process_block(&block_a).unwrap();
            second.process_block(&block_b).unwrap();

            assert_eq!(first.amplitude(), second.amplitude());
            assert_eq!(first.threshold(), second.threshold());
            assert_eq!(first.peak(), second.peak());
        }
    }
}

#[test]
fn two_tones_match_fft_peaks() {
    let sample_rate = 8000u32;
    let low = 110.0;
    let high = 13.75 * 2f64.powf(67.0 / 12.0);
    let signal = |n: usize| {
        let t = n as f64 / sample_rate as f64;
        0.4 * (2.0 * PI * low * t).sin() + 0.4 * (2.0 * PI * high * t).sin()
    };

    // Reference: the two strongest FFT bins over one second
    let len = sample_rate as usize;
    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(len);
    let mut input: Vec<f64> = (0..len).map(signal).collect();
    let mut spectrum = fft.make_output_vec();
    fft.process(&mut input, &mut spectrum).unwrap();

    let mut bins: Vec<(usize, f64)> = spectrum.iter().map(|c| c.norm()).enumerate().collect();
    bins.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    let bin_hz = sample_rate as f64 / len as f64;
    let mut expected: Vec<usize> = bins
        .iter()
        .take(2)
        .map(|&(bin, _)| (12.0 * (bin as f64 * bin_hz / 13.75).log2()).round() as usize)
        .collect();
    expected.sort_unstable();
    assert_eq!(expected, vec![36, 67]);

    for kind in KINDS {
        let mut analyzer = SpectrumAnalyzer::new(small_config(kind)).unwrap();
        run(&mut analyzer, 200, signal);

        assert_peak_invariant(&analyzer);
        let peaks: Vec<usize> = peak_indices(analyzer.peak(), -40.0).collect();
        assert_eq!(peaks, expected, "{:?}", kind);
    }
}

#[test]
fn edge_window_uses_full_divisor() {
    use bandscope::spectrum::threshold::window_average;

    let powers = [1.0, 2.0, 3.0, 4.0, 5.0];
    // Band 0, half-width 3: taps 0,0,0,0,1,2,3 over 7
    let avg = window_average(&powers, 0, 3);
    assert!((avg - 14.0 / 7.0).abs() < 1e-12);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any finite input keeps outputs finite, floored and peak-consistent
    #[test]
    fn outputs_stay_bounded(
        samples in prop::collection::vec(-4.0f64..=4.0, 48 * 6),
        correlator in any::<bool>(),
    ) {
        let kind = if correlator { EstimatorKind::Correlator } else { EstimatorKind::Biquad };
        let config = AnalyzerConfig::new(8000, 48, 48, 8, kind);
        let mut analyzer = SpectrumAnalyzer::new(config).unwrap();

        for block in samples.chunks(48) {
            analyzer.process_block(block).unwrap();
            assert_outputs_bounded(&analyzer);
            assert_peak_invariant(&analyzer);
        }
    }
}

#[test]
fn single_band_engine() {
    for kind in KINDS {
        let config = AnalyzerConfig::new(8000, 80, 1, 12, kind);
        let mut analyzer = SpectrumAnalyzer::new(config).unwrap();
        assert_eq!(analyzer.band_frequency(0), Some(13.75));
        assert_eq!(analyzer.band_frequency(1), None);

        let mut noise = Noise(7);
        let mut block = vec![0.0; 80];
        for _ in 0..50 {
            noise.fill(0.9, &mut block);
            analyzer.process_block(&block).unwrap();
            assert_outputs_bounded(&analyzer);
            assert_peak_invariant(&analyzer);
        }

        run(&mut analyzer, 50, tone(13.75, 0.5, 8000));
        assert_outputs_bounded(&analyzer);
        assert_peak_invariant(&analyzer);
    }
}

#[test]
fn five_band_engine_clamps_threshold_window() {
    use bandscope::{ThresholdConfig, ThresholdShaping};

    // 3/12 octave at 12 bands per octave is a half-width of 3 bands
    let threshold = ThresholdConfig {
        low_width_octaves: 0.25,
        mid_width_octaves: 0.25,
        shaping: ThresholdShaping::None,
        ..ThresholdConfig::default()
    };

    for kind in KINDS {
        let config = AnalyzerConfig {
            threshold,
            ..AnalyzerConfig::new(8000, 80, 5, 12, kind)
        };
        let mut analyzer = SpectrumAnalyzer::new(config.clone()).unwrap();
        let freqs = analyzer.band_frequencies().to_vec();
        run(&mut analyzer, 100, |n| {
            freqs
                .iter()
                .map(|&f| 0.3 * (2.0 * PI * f * n as f64 / 8000.0).sin())
                .sum()
        });

        assert_outputs_bounded(&analyzer);
        let amp = analyzer.amplitude();
        assert!(amp.iter().all(|&a| a > config.floor_db), "{:?}: {:?}", kind, amp);

        // Recover linear powers and rebuild band 0's window: taps 0,0,0,0,1,2,3 over 7
        let power: Vec<f64> = amp.iter().map(|&a| 10f64.powf(a / 10.0)).collect();
        let avg = (4.0 * power[0] + power[1] + power[2] + power[3]) / 7.0;
        let expected = 10.0 * avg.log10();
        assert!((analyzer.threshold()[0] - expected).abs() < 1e-9, "{:?}", kind);

        // Band 4 mirrors it: taps 1,2,3,4,4,4,4
        let avg = (power[1] + power[2] + power[3] + 4.0 * power[4]) / 7.0;
        assert!((analyzer.threshold()[4] - 10.0 * avg.log10()).abs() < 1e-9, "{:?}", kind);
    }
}

#[test]
fn oversized_threshold_window_does_not_panic() {
    use bandscope::ThresholdConfig;

    let config = AnalyzerConfig {
        threshold: ThresholdConfig {
            low_width_octaves: 1e300,
            ..ThresholdConfig::default()
        },
        ..small_config(EstimatorKind::Biquad)
    };
    config.validate().unwrap();

    let mut analyzer = SpectrumAnalyzer::new(config).unwrap();
    analyzer.process_block(&[0.1; 80]).unwrap();
    assert_outputs_bounded(&analyzer);
}
