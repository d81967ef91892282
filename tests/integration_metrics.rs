use kadans::keystroke::KeystrokeEvent;
use kadans::metrics::{
    accuracy, duration_stats, error_rate, fatigue_analysis, tremor_score, words_per_minute,
    DurationStats, FatigueAnalysis, PerformanceMetrics,
};

fn event(pressed_at_ms: f64, duration_ms: Option<f64>, correct: bool) -> KeystrokeEvent {
    KeystrokeEvent {
        key: 'a',
        pressed_at_ms,
        released_at_ms: duration_ms.map(|d| pressed_at_ms + d),
        duration_ms,
        correct,
        index: 0,
    }
}

#[test]
fn wpm_is_zero_for_any_count_over_a_zero_window() {
    for count in [0, 1, 5, 500, 10_000] {
        assert_eq!(words_per_minute(count, 0.0), 0);
    }
}

#[test]
fn empty_typed_text_is_vacuously_perfect() {
    for reference in ["", "a", "hello", "the quick brown fox"] {
        assert_eq!(accuracy("", reference), 100);
        assert_eq!(error_rate("", reference), 0);
    }
}

#[test]
fn identical_texts_score_100() {
    for text in ["a", "hello", "the quick brown fox jumps"] {
        assert_eq!(accuracy(text, text), 100);
    }
}

#[test]
fn helo_against_hello_scores_75() {
    // typed[0..4] = h,e,l,o vs ref h,e,l,l: 3 of 4 typed positions match
    assert_eq!(accuracy("helo", "hello"), 75);
    assert_eq!(error_rate("helo", "hello"), 25);
}

#[test]
fn duration_stats_zeroed_without_valid_durations() {
    let unreleased: Vec<_> = (0..5).map(|i| event(i as f64 * 100.0, None, true)).collect();
    assert_eq!(duration_stats(&unreleased), DurationStats::default());
    assert_eq!(duration_stats(&[]), DurationStats::default());
}

#[test]
fn twelve_equal_durations_yield_zero_tremor() {
    let events: Vec<_> = (0..12)
        .map(|i| event(i as f64 * 250.0, Some(100.0), true))
        .collect();

    let stats = duration_stats(&events);
    assert_eq!(stats.mean_ms, 100);
    assert_eq!(stats.std_dev_ms, 0);
    assert_eq!(tremor_score(&events), 0);
}

#[test]
fn tremor_grows_with_variability_and_stays_bounded() {
    let spreads: [&[f64]; 4] = [
        &[100.0, 100.0],
        &[95.0, 105.0],
        &[80.0, 120.0],
        &[20.0, 180.0],
    ];

    let mut last = 0;
    for durations in spreads {
        let events: Vec<_> = durations
            .iter()
            .enumerate()
            .map(|(i, d)| event(i as f64 * 200.0, Some(*d), true))
            .collect();
        let score = tremor_score(&events);
        assert!(score >= last, "score must not decrease as spread widens");
        assert!(score <= 100);
        last = score;
    }
    assert_eq!(last, 100);
}

#[test]
fn fewer_than_ten_events_never_report_fatigue() {
    // timestamps chosen to otherwise produce a sharp decline
    let mut events: Vec<_> = (0..7).map(|i| event(i as f64 * 100.0, None, true)).collect();
    events.push(event(29_000.0, None, true));
    events.push(event(29_500.0, None, true));

    assert_eq!(
        fatigue_analysis(&events, 0.0, 30_000.0),
        FatigueAnalysis::default()
    );
}

#[test]
fn all_early_events_zero_the_fatigue_result() {
    // 12 events inside the first third: meets the count threshold but the
    // late group is empty
    let events: Vec<_> = (0..12).map(|i| event(i as f64 * 400.0, None, true)).collect();

    assert_eq!(
        fatigue_analysis(&events, 0.0, 30_000.0),
        FatigueAnalysis::default()
    );
}

#[test]
fn sharp_slowdown_is_detected_past_the_20_percent_threshold() {
    let mut events: Vec<_> = (0..8)
        .map(|i| event(500.0 + i as f64 * 1000.0, None, true))
        .collect();
    events.push(event(21_000.0, None, true));
    events.push(event(26_000.0, None, true));

    let fatigue = fatigue_analysis(&events, 0.0, 30_000.0);
    assert!(fatigue.detected);
    assert!(fatigue.score > 20);
    assert!(fatigue.early_wpm > fatigue.late_wpm);
}

#[test]
fn composed_metrics_keep_the_keystroke_invariant() {
    let events = vec![
        event(0.0, Some(90.0), true),
        event(300.0, Some(110.0), false),
        event(600.0, Some(95.0), true),
        event(900.0, None, true),
    ];
    let metrics = PerformanceMetrics::compute("helo", "hello", &events, 0.0, 1200.0);

    assert_eq!(metrics.total_keystrokes, events.len());
    assert_eq!(
        metrics.correct_keystrokes + metrics.incorrect_keystrokes,
        metrics.total_keystrokes
    );
    assert_eq!(metrics.correct_keystrokes, 3);
    assert_eq!(metrics.accuracy, 75);
    assert_eq!(metrics.error_rate, 25);
    assert!(metrics.accuracy <= 100);
    assert!(metrics.tremor_score <= 100);
}

#[test]
fn identical_inputs_produce_identical_outputs() {
    let events: Vec<_> = (0..12)
        .map(|i| event(i as f64 * 800.0, Some(80.0 + (i % 3) as f64 * 30.0), i % 4 != 0))
        .collect();

    let a = PerformanceMetrics::compute("abcdefghijkl", "abcdefghijkl", &events, 0.0, 10_000.0);
    let b = PerformanceMetrics::compute("abcdefghijkl", "abcdefghijkl", &events, 0.0, 10_000.0);
    assert_eq!(a, b);
}
