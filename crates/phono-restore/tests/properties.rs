//! Property-based tests for the restoration engines.

use proptest::prelude::*;
use phono_restore::{
    ClickDetector, ClickDetectorConfig, DeclickConfig, DeclickEngine, MIN_BLOCK_LEN, ProcessParams,
    StereoProcessor, autocorrelation, levinson_durbin, median,
};

fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0f32, |m, x| m.max(x.abs()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The median of an odd-length slice is its middle order statistic.
    #[test]
    fn median_matches_sorted_reference(mut values in prop::collection::vec(-1.0f32..1.0, 1..64)) {
        if values.len() % 2 == 0 {
            values.pop();
        }
        let mut reference = values.clone();
        reference.sort_by(f32::total_cmp);
        let expected = reference[reference.len() / 2];
        prop_assert_eq!(median(&mut values), expected);
    }

    /// A successful recursion never reports more error energy than the
    /// signal had, and never less than zero.
    #[test]
    fn levinson_error_bounded_by_energy(
        signal in prop::collection::vec(-1.0f32..1.0, 64..256),
        order in 1usize..12,
    ) {
        let mut r = vec![0.0; order + 1];
        autocorrelation(&signal, &mut r);
        let mut coeffs = vec![0.0; order];
        if let Ok(e) = levinson_durbin(&r, &mut coeffs) {
            prop_assert!(e > 0.0);
            prop_assert!(e <= r[0] * (1.0 + 1e-4), "e = {}, r0 = {}", e, r[0]);
            prop_assert!(coeffs.iter().all(|c| c.is_finite()));
        }
    }

    /// The detector cannot fire before its window is full.
    #[test]
    fn detector_silent_while_filling(signal in prop::collection::vec(-1.0f32..1.0, 73)) {
        let config = ClickDetectorConfig::for_sample_rate(48000);
        prop_assert_eq!(config.buffer_size(), 73);
        let mut detector = ClickDetector::new(config, 48000).unwrap();
        prop_assert_eq!(detector.count_clicks(&signal), 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Repairs are straight lines between existing samples, so the peak
    /// level can only fall.
    #[test]
    fn declick_never_raises_peak(
        noise in prop::collection::vec(-0.05f32..0.05, MIN_BLOCK_LEN..MIN_BLOCK_LEN + 2048),
        clicks in prop::collection::vec((1100usize..3000, -0.9f32..0.9), 0..6),
        threshold in 1.0f32..900.0,
        width_ms in 0.1f32..10.0,
    ) {
        let mut buffer = noise;
        for (position, amplitude) in clicks {
            buffer[position] += amplitude;
        }
        let before = peak(&buffer);

        let mut engine = DeclickEngine::new(buffer.len());
        let config = DeclickConfig { threshold, click_width_ms: width_ms };
        engine.process(&mut buffer, &config, 44100);

        prop_assert!(buffer.iter().all(|x| x.is_finite()));
        prop_assert!(peak(&buffer) <= before * (1.0 + 1e-6));
    }

    /// Short blocks pass through unchanged regardless of settings.
    #[test]
    fn declick_short_block_untouched(
        buffer in prop::collection::vec(-1.0f32..1.0, 0..MIN_BLOCK_LEN),
        threshold in 1.0f32..900.0,
    ) {
        let mut engine = DeclickEngine::new(MIN_BLOCK_LEN);
        let mut out = buffer.clone();
        let stats = engine.process(&mut out, &DeclickConfig { threshold, click_width_ms: 1.0 }, 48000);
        prop_assert!(stats.is_empty());
        prop_assert_eq!(out, buffer);
    }

    /// With every stage off the processor copies input to output.
    #[test]
    fn processor_bypass_is_identity(
        left in prop::collection::vec(-2.0f32..2.0, 1..512),
    ) {
        let right: Vec<f32> = left.iter().map(|x| x * 0.5).collect();
        let mut processor = StereoProcessor::new(48000, 512).unwrap();
        let params = ProcessParams { riaa_enabled: false, ..ProcessParams::default() };

        let mut out_l = vec![0.0; left.len()];
        let mut out_r = vec![0.0; left.len()];
        processor.process(&params, &left, &right, &mut out_l, &mut out_r).unwrap();
        prop_assert_eq!(&out_l, &left);
        prop_assert_eq!(&out_r, &right);

        let over = left.iter().filter(|x| x.abs() > 1.0).count() as u64;
        prop_assert_eq!(processor.meters().clipped_samples, over);
    }
}
