//! Top hat filters generated from their names

// crate modules
use crate::error::{Error, Result};
use crate::filter::Filter;

// galtools crates
use galtools_utils::linspace;

/// Number of points in a generated transmission curve
pub const TOP_HAT_SIZE: usize = 1000;

/// Fraction of the width added beyond each edge of the curve
pub const TOP_HAT_BUFFER: f64 = 0.1;

/// Geometry of a top hat filter, parsed from its name
///
/// Names take one of two forms, with all values in Angstroms:
///
/// - `adaptiveResolutionTopHat_<center>_<width>`
/// - `fixedResolutionTopHat_<center>_<resolution>`
///
/// ```rust
/// # use galtools_filters::TopHat;
/// let top_hat = TopHat::parse("adaptiveResolutionTopHat_5000.0_100.0").unwrap();
/// assert_eq!(top_hat.center(), 5000.0);
/// assert_eq!(top_hat.width(), 100.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TopHat {
    /// Fixed width about the centre
    Adaptive { center: f64, width: f64 },
    /// Width set by a resolving power `λ/Δλ`
    Fixed { center: f64, resolution: f64 },
}

impl TopHat {
    /// True if the name would be generated rather than read from a file
    pub fn is_top_hat(name: &str) -> bool {
        name.contains("adaptiveResolutionTopHat") || name.contains("fixedResolutionTopHat")
    }

    /// Parse a top hat from a filter name
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = || Error::InvalidTopHat(name.to_string());

        if let Some((center, width)) = parameters(name, "adaptiveResolutionTopHat_") {
            Ok(Self::Adaptive { center, width })
        } else if let Some((center, resolution)) = parameters(name, "fixedResolutionTopHat_") {
            if resolution <= 0.0 {
                return Err(invalid());
            }
            Ok(Self::Fixed { center, resolution })
        } else {
            Err(invalid())
        }
    }

    /// Central wavelength
    pub fn center(&self) -> f64 {
        match self {
            Self::Adaptive { center, .. } | Self::Fixed { center, .. } => *center,
        }
    }

    /// Full width of the pass band
    pub fn width(&self) -> f64 {
        match *self {
            Self::Adaptive { width, .. } => width,
            Self::Fixed { center, resolution } => {
                let root = (4.0 * resolution.powi(2) + 1.0).sqrt();
                let ratio = (root + 1.0) / (root - 1.0);
                let minimum = center * (root - 1.0) / 2.0 / resolution / ratio;
                let maximum = center * (root + 1.0) / 2.0 / resolution / ratio;
                maximum - minimum
            }
        }
    }

    /// Build the filter with the default sampling
    ///
    /// No Vega offset is set.
    pub fn filter(&self, name: &str) -> Result<Filter> {
        let (wavelength, transmission) =
            top_hat_transmission(self.center(), self.width(), TOP_HAT_SIZE, TOP_HAT_BUFFER);

        let description = format!(
            "SED top hat filter centered on {} Angstroms with width {} Angstroms.",
            self.center(),
            self.width()
        );

        Ok(Filter::new(name, wavelength, transmission)?
            .with_description(&description)
            .with_origin("Galacticus source code")
            .with_url("None"))
    }
}

/// Transmission of a top hat, one inside `[center - width/2, center + width/2]`
///
/// The curve is sampled at `size` points and extends `buffer` widths beyond
/// each edge.
///
/// ```rust
/// # use galtools_filters::top_hat_transmission;
/// let (wavelength, transmission) = top_hat_transmission(5000.0, 100.0, 1000, 0.1);
/// assert_eq!(wavelength.len(), 1000);
/// assert_eq!(wavelength[0], 4940.0);
/// assert_eq!(transmission[0], 0.0);
/// assert_eq!(transmission[500], 1.0);
/// ```
pub fn top_hat_transmission(
    center: f64,
    width: f64,
    size: usize,
    buffer: f64,
) -> (Vec<f64>, Vec<f64>) {
    let fraction = 0.5 + buffer;
    let wavelength = linspace(center - width * fraction, center + width * fraction, size);

    let (lower, upper) = (center - width / 2.0, center + width / 2.0);
    let transmission = wavelength
        .iter()
        .map(|w| if *w >= lower && *w <= upper { 1.0 } else { 0.0 })
        .collect();

    (wavelength, transmission)
}

/// Two numbers following `marker`, separated by an underscore
fn parameters(name: &str, marker: &str) -> Option<(f64, f64)> {
    let (_, rest) = name.split_once(marker)?;
    let mut values = rest.splitn(2, '_');
    let first = number_prefix(values.next()?)?;
    let second = number_prefix(values.next()?)?;
    Some((first, second))
}

/// The leading run of digits and dots parsed as a float
fn number_prefix(text: &str) -> Option<f64> {
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fixed_resolution_width() {
        let top_hat = TopHat::parse("fixedResolutionTopHat_1000.0_100.0").unwrap();
        let root = (4.0e4_f64 + 1.0).sqrt();
        let expected = 1000.0 * 2.0 / 200.0 * (root - 1.0) / (root + 1.0);
        assert_relative_eq!(top_hat.width(), expected, max_relative = 1e-12);
        // roughly λ/R for large R
        assert_relative_eq!(top_hat.width(), 10.0, max_relative = 0.02);
    }

    #[test]
    fn trailing_text_is_ignored() {
        let top_hat = TopHat::parse("adaptiveResolutionTopHat_912_50:rest").unwrap();
        assert_eq!(top_hat, TopHat::Adaptive { center: 912.0, width: 50.0 });
    }

    #[test]
    fn invalid_names() {
        assert!(TopHat::parse("SDSS_r").is_err());
        assert!(TopHat::parse("adaptiveResolutionTopHat_abc_10").is_err());
        assert!(TopHat::parse("fixedResolutionTopHat_1000_0").is_err());
        assert!(!TopHat::is_top_hat("SDSS_r"));
    }

    #[test]
    fn generated_filter() {
        let filter = TopHat::parse("adaptiveResolutionTopHat_5000_100")
            .unwrap()
            .filter("adaptiveResolutionTopHat_5000_100")
            .unwrap();
        assert_relative_eq!(filter.effective_wavelength, 5000.0, max_relative = 1e-6);
        let (lo, hi) = filter.wavelength_range().unwrap();
        assert!(lo >= 4950.0 && hi <= 5050.0);
    }
}
