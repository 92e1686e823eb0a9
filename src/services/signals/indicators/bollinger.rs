//! Bollinger Bands indicator.

use crate::types::BollingerValue;

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
///
/// StdDev is the population standard deviation of the window. With fewer
/// prices than the period the bands fall back to mean ± 2% of the mean.
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period: period.max(1),
            std_dev_multiplier,
        }
    }

    /// Calculate standard deviation.
    fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let variance: f64 =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }

    pub fn calculate(&self, prices: &[f64]) -> BollingerValue {
        if prices.is_empty() {
            return BollingerValue {
                upper: 0.0,
                middle: 0.0,
                lower: 0.0,
            };
        }

        if prices.len() < self.period {
            let mean = prices.iter().sum::<f64>() / prices.len() as f64;
            let deviation = (mean * 0.02).abs();
            return BollingerValue {
                upper: mean + deviation,
                middle: mean,
                lower: mean - deviation,
            };
        }

        let window = &prices[prices.len() - self.period..];
        let middle = window.iter().sum::<f64>() / self.period as f64;
        let std_dev = Self::std_dev(window, middle);

        BollingerValue {
            upper: middle + std_dev * self.std_dev_multiplier,
            middle,
            lower: middle - std_dev * self.std_dev_multiplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_ordering() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + ((i * 7) % 5) as f64).collect();
        let bands = BollingerBands::default().calculate(&prices);
        assert!(bands.upper >= bands.middle);
        assert!(bands.middle >= bands.lower);
    }

    #[test]
    fn test_flat_series_collapses_bands() {
        let bands = BollingerBands::default().calculate(&[50.0; 25]);
        assert_eq!(bands.upper, 50.0);
        assert_eq!(bands.middle, 50.0);
        assert_eq!(bands.lower, 50.0);
    }

    #[test]
    fn test_known_std_dev() {
        // Population std dev of [2, 4, 4, 4, 5, 5, 7, 9] is 2.
        let prices = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let bands = BollingerBands::new(8, 2.0).calculate(&prices);
        assert_eq!(bands.middle, 5.0);
        assert_eq!(bands.upper, 9.0);
        assert_eq!(bands.lower, 1.0);
    }

    #[test]
    fn test_short_series_uses_two_percent_bands() {
        let bands = BollingerBands::default().calculate(&[100.0, 100.0, 100.0]);
        assert_eq!(bands.middle, 100.0);
        assert!((bands.upper - 102.0).abs() < 1e-9);
        assert!((bands.lower - 98.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_price() {
        let bands = BollingerBands::default().calculate(&[10.0]);
        assert!(bands.upper >= bands.middle && bands.middle >= bands.lower);
    }
}
