// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::str::FromStr;
use std::time::Duration;

use criterion::Criterion;

use pprof::criterion::{Output, PProfProfiler};

fn env_or<T: FromStr + PartialOrd>(name: &str, default: T, min: T, max: T) -> T {
    let value = std::env::var(name).ok().and_then(|raw| raw.trim().parse::<T>().ok());
    match value {
        Some(v) if v < min => min,
        Some(v) if v > max => max,
        Some(v) => v,
        None => default,
    }
}

/// Criterion preset with a flamegraph profiler attached.
///
/// `ROUTE_PROFILE_FREQ`, `ROUTE_SAMPLE_SIZE`, `ROUTE_WARMUP_SECS` and
/// `ROUTE_MEASUREMENT_SECS` override the defaults.
pub fn criterion() -> Criterion {
    let frequency = env_or("ROUTE_PROFILE_FREQ", 100i32, 1, 1000);
    let sample_size = env_or("ROUTE_SAMPLE_SIZE", 40usize, 10, 200);
    let warmup = env_or("ROUTE_WARMUP_SECS", 2u64, 1, 60);
    let measurement = env_or("ROUTE_MEASUREMENT_SECS", 5u64, 1, 120);

    Criterion::default()
        .sample_size(sample_size)
        .warm_up_time(Duration::from_secs(warmup))
        .measurement_time(Duration::from_secs(measurement))
        .with_profiler(PProfProfiler::new(frequency, Output::Flamegraph(None)))
}
