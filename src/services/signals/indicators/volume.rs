//! Volume profile.

use crate::types::Candle;

/// Trailing window the current volume is compared against.
const VOLUME_WINDOW: usize = 10;

/// Ratio of the most recent volume to the mean volume of the trailing 10
/// candles (the current one included). Fewer than 10 candles, or a window
/// without any volume, reads 1.
pub fn volume_profile(candles: &[Candle]) -> f64 {
    if candles.len() < VOLUME_WINDOW {
        return 1.0;
    }

    let window = &candles[candles.len() - VOLUME_WINDOW..];
    let avg_volume = window.iter().map(|c| c.volume).sum::<f64>() / VOLUME_WINDOW as f64;
    if avg_volume <= 0.0 {
        return 1.0;
    }

    window[VOLUME_WINDOW - 1].volume / avg_volume
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles_with_volumes(volumes: &[f64]) -> Vec<Candle> {
        volumes
            .iter()
            .enumerate()
            .map(|(i, &v)| Candle::new(i as i64, 10.0, 11.0, 9.0, 10.5, v))
            .collect()
    }

    #[test]
    fn test_short_series_is_one() {
        assert_eq!(volume_profile(&candles_with_volumes(&[5.0; 9])), 1.0);
    }

    #[test]
    fn test_spike_on_last_candle() {
        let mut volumes = vec![100.0; 9];
        volumes.push(1000.0);
        let profile = volume_profile(&candles_with_volumes(&volumes));
        assert!((profile - 1000.0 / 190.0).abs() < 1e-9);
    }

    #[test]
    fn test_only_trailing_window_counts() {
        let mut volumes = vec![1_000_000.0; 20];
        volumes.extend(vec![50.0; 10]);
        assert!((volume_profile(&candles_with_volumes(&volumes)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_volume_window() {
        assert_eq!(volume_profile(&candles_with_volumes(&[0.0; 12])), 1.0);
    }
}
