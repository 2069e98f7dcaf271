//! # Chain Property Tests
//!
//! Randomized checks of the timing, reset, debounce and polarity laws
//! across the builder, the gate and the trace.

use proptest::prelude::*;

use pulser_state::{SequenceBuilder, Stimulus, Trace};

fn durations_strategy() -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(1i64..10, 1..8)
}

proptest! {
    /// A chain triggered on tick `t` toggles on `t + d0`, `t + d0 + d1`, ...
    #[test]
    fn toggles_at_running_sums(durations in durations_strategy(), start in 0u64..10) {
        let mut chain = SequenceBuilder::new(durations.iter().copied()).build().unwrap();
        let total: u64 = durations.iter().map(|&d| d as u64).sum();
        let ticks = start + total + 3;
        let trace = chain.simulate(&Stimulus::once(start, ticks), ticks);

        let mut at = start;
        let expected: Vec<u64> = durations.iter().map(|&d| { at += d as u64; at }).collect();
        prop_assert_eq!(trace.toggles(), expected);
    }

    /// A gated chain produces the same train for any bounce pattern that
    /// stays inside the window.
    #[test]
    fn gate_absorbs_bounce(
        durations in durations_strategy(),
        bounce in proptest::collection::vec(any::<bool>(), 0..40),
    ) {
        let mut clean = SequenceBuilder::new(durations.iter().copied()).gated().build().unwrap();
        let mut noisy = clean.clone();
        let block = durations.iter().sum::<i64>() as usize + 12;

        let mut clean_in = vec![false, true];
        let mut noisy_in = vec![false, true];
        noisy_in.extend(bounce.iter().take(block));
        clean_in.resize(block + 8, false);
        noisy_in.resize(block + 8, false);

        let a = clean.run(clean_in);
        let b = noisy.run(noisy_in);
        prop_assert_eq!(a.levels(), b.levels());
        // An odd train toggles once more when the window closes.
        prop_assert_eq!(a.toggles().len(), durations.len() + durations.len() % 2);
    }

    /// Whatever the trigger does, the output equals the initial level on
    /// every tick the trigger is low.
    #[test]
    fn low_trigger_means_initial_level(
        durations in durations_strategy(),
        trigger in proptest::collection::vec(any::<bool>(), 1..80),
        initial in any::<bool>(),
    ) {
        let mut chain = SequenceBuilder::new(durations.iter().copied())
            .initial_level(initial)
            .build()
            .unwrap();
        let trace = chain.run(trigger.iter().copied());
        for sample in trace.samples() {
            if !sample.trigger {
                prop_assert_eq!(sample.level, initial);
            }
        }
    }

    /// Once a train completes, its level is the initial level flipped once
    /// per stage.
    #[test]
    fn parity_sets_final_level(durations in durations_strategy(), initial in any::<bool>()) {
        let mut chain = SequenceBuilder::new(durations.iter().copied())
            .initial_level(initial)
            .build()
            .unwrap();
        let total: u64 = durations.iter().map(|&d| d as u64).sum();
        let trace = chain.simulate(&Stimulus::once(0, total + 5), total + 5);
        prop_assert_eq!(trace.level_at(total + 4), Some(initial ^ (durations.len() % 2 == 1)));
    }

    /// Traces survive a JSON round trip unchanged.
    #[test]
    fn trace_json_preserved(durations in durations_strategy(), hold in 1u64..30) {
        let mut chain = SequenceBuilder::new(durations.iter().copied()).build().unwrap();
        let trace = chain.simulate(&Stimulus::once(1, hold), 40);
        let back = Trace::from_json(&trace.to_json().unwrap()).unwrap();
        prop_assert_eq!(back, trace);
    }
}
