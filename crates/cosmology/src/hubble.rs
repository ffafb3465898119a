//! Conversions between Hubble parameters and simple redshift helpers

// crate modules
use crate::error::Error;

// galtools crates
use galtools_utils::constants::{CENTI, MEGA, PARSEC};

// external crates
use log::debug;

/// Kinds of quantity that scale with the Hubble parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Magnitudes shift by `-5 log10(h_out/h_in)`
    Magnitude,
    /// Luminosities scale as `h^2`
    Luminosity,
    /// Distances scale as `1/h`
    Distance,
    /// Volumes scale as `1/h^3`
    Volume,
    /// Masses scale as `1/h`
    Mass,
    /// Number densities scale as `h^3`
    Density,
}

impl std::str::FromStr for Quantity {
    type Err = Error;

    /// Parse from a name or any abbreviation sharing its leading letters
    ///
    /// ```rust
    /// # use galtools_cosmology::Quantity;
    /// assert_eq!("mags".parse::<Quantity>().unwrap(), Quantity::Magnitude);
    /// assert_eq!("Luminosities".parse::<Quantity>().unwrap(), Quantity::Luminosity);
    /// assert!("speed".parse::<Quantity>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        let quantity = [
            ("mag", Self::Magnitude),
            ("lum", Self::Luminosity),
            ("dis", Self::Distance),
            ("vol", Self::Volume),
            ("mass", Self::Mass),
            ("den", Self::Density),
        ]
        .into_iter()
        .find(|(prefix, _)| lower.starts_with(prefix))
        .map(|(_, q)| q);

        quantity.ok_or_else(|| Error::UnknownQuantity(s.to_string()))
    }
}

/// Rescale values computed with `h_in` to a Hubble parameter of `h_out`
///
/// ```rust
/// # use galtools_cosmology::{adjust_hubble, Quantity};
/// let masses = adjust_hubble(&[1.0e10], 1.0, 0.7, Quantity::Mass);
/// assert!((masses[0] - 1.0e10 / 0.7).abs() < 1.0);
/// ```
pub fn adjust_hubble(values: &[f64], h_in: f64, h_out: f64, quantity: Quantity) -> Vec<f64> {
    debug!("Converting {quantity:?} from h={h_in} to h={h_out}");
    let ratio = h_out / h_in;
    match quantity {
        Quantity::Magnitude => {
            let shift = 5.0 * ratio.log10();
            values.iter().map(|v| v - shift).collect()
        }
        _ => {
            let factor = match quantity {
                Quantity::Luminosity => ratio.powi(2),
                Quantity::Distance | Quantity::Mass => 1.0 / ratio,
                Quantity::Volume => ratio.powi(-3),
                Quantity::Density => ratio.powi(3),
                Quantity::Magnitude => 1.0,
            };
            values.iter().map(|v| v * factor).collect()
        }
    }
}

/// Redshift of a line emitted at `emitted` and observed at `observed`
pub fn wavelength_to_redshift(observed: f64, emitted: f64) -> f64 {
    observed / emitted - 1.0
}

/// Observed wavelength of a line emitted at `emitted` from redshift `z`
pub fn redshift_to_wavelength(z: f64, emitted: f64) -> f64 {
    (1.0 + z) * emitted
}

/// Megaparsecs to centimetres
pub fn mpc_to_cm(r: f64) -> f64 {
    r * PARSEC * MEGA / CENTI
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn conversions() {
        let (h_in, h_out) = (1.0, 0.5);
        assert_relative_eq!(adjust_hubble(&[10.0], h_in, h_out, Quantity::Luminosity)[0], 2.5);
        assert_relative_eq!(adjust_hubble(&[10.0], h_in, h_out, Quantity::Distance)[0], 20.0);
        assert_relative_eq!(adjust_hubble(&[10.0], h_in, h_out, Quantity::Volume)[0], 80.0);
        assert_relative_eq!(adjust_hubble(&[10.0], h_in, h_out, Quantity::Density)[0], 1.25);
        assert_relative_eq!(
            adjust_hubble(&[-20.0], h_in, h_out, Quantity::Magnitude)[0],
            -20.0 + 5.0 * 2f64.log10(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn wavelengths() {
        assert_relative_eq!(wavelength_to_redshift(13125.6, 6562.8), 1.0, epsilon = 1e-12);
        assert_relative_eq!(redshift_to_wavelength(1.0, 6562.8), 13125.6, max_relative = 1e-12);
        assert_relative_eq!(mpc_to_cm(1.0), 3.08567758e24, max_relative = 1e-12);
    }
}
