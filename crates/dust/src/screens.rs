//! Foreground dust screen extinction laws
//!
//! Every law is tabulated as the selective extinction `k(λ) = E(λ-V)/E(B-V)`
//! against wavelength in microns, and is used through the normalised curve
//! `(k + R_V) / R_V`, which is one in the V band.

// crate modules
use crate::error::{Error, Result};

// galtools crates
use galtools_data::ScreenSettings;
use galtools_utils::constants::{ANGSTROM, MICRON};
use galtools_utils::{arange, Bounds, Interp1d};

// standard library
use std::fmt;

/// Supported screen laws
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScreenLaw {
    /// Calzetti et al. (2000) starburst law
    Calzetti,
    /// Allen (1976) Milky Way table
    Allen,
    /// Prevot et al. (1984) SMC table
    Prevot,
    /// Fitzpatrick (1986) LMC colour ratio law
    Fitzpatrick,
    /// Seaton (1979) Milky Way colour ratio law
    Seaton,
}

impl ScreenLaw {
    /// Every law, in a fixed order
    pub const ALL: [ScreenLaw; 5] = [
        Self::Calzetti,
        Self::Allen,
        Self::Prevot,
        Self::Fitzpatrick,
        Self::Seaton,
    ];

    /// Name as it appears in dust suffixes, e.g. `dustCalzetti`
    pub fn name(&self) -> &'static str {
        match self {
            Self::Calzetti => "Calzetti",
            Self::Allen => "Allen",
            Self::Prevot => "Prevot",
            Self::Fitzpatrick => "Fitzpatrick",
            Self::Seaton => "Seaton",
        }
    }

    /// Configured `R_V` for this law
    pub fn rv(&self, settings: &ScreenSettings) -> f64 {
        match self {
            Self::Calzetti => settings.calzetti,
            Self::Allen => settings.allen,
            Self::Prevot => settings.prevot,
            Self::Fitzpatrick => settings.fitzpatrick,
            Self::Seaton => settings.seaton,
        }
    }

    /// Tabulated wavelengths (microns) and selective extinction `k(λ)`
    pub fn nodes(&self, rv: f64) -> Result<(Vec<f64>, Vec<f64>)> {
        let nodes = match self {
            Self::Calzetti => calzetti()?,
            Self::Allen => allen(rv),
            Self::Prevot => prevot(),
            Self::Fitzpatrick => colour_ratio_law(ColourRatio::LMC, 3330.0, rv)?,
            Self::Seaton => colour_ratio_law(ColourRatio::MW, 3650.0, rv)?,
        };
        Ok(nodes)
    }

    /// Normalised curve for a given `R_V`
    ///
    /// ```rust
    /// # use galtools_dust::ScreenLaw;
    /// let calzetti = ScreenLaw::Calzetti.curve(4.05).unwrap();
    ///
    /// // less extinction at longer wavelengths
    /// assert!(calzetti.curve(0.3) > calzetti.curve(0.55));
    /// assert!(calzetti.curve(0.55) > calzetti.curve(1.0));
    /// ```
    pub fn curve(&self, rv: f64) -> Result<ScreenCurve> {
        let (wavelength, k) = self.nodes(rv)?;
        let normalised = k.iter().map(|k| (k + rv) / rv).collect();
        Ok(ScreenCurve {
            law: *self,
            rv,
            curve: Interp1d::new(wavelength, normalised, Bounds::Extrapolate)?,
        })
    }
}

impl fmt::Display for ScreenLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScreenLaw {
    type Err = Error;

    /// Case insensitive match on the law name
    ///
    /// ```rust
    /// # use galtools_dust::ScreenLaw;
    /// assert_eq!("Calzetti".parse::<ScreenLaw>().unwrap(), ScreenLaw::Calzetti);
    /// assert_eq!("seaton".parse::<ScreenLaw>().unwrap(), ScreenLaw::Seaton);
    /// assert!("Cardelli".parse::<ScreenLaw>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|law| law.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownScreenLaw(s.to_string()))
    }
}

/// A screen law evaluated for one `R_V`
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenCurve {
    pub law: ScreenLaw,
    pub rv: f64,
    curve: Interp1d,
}

impl ScreenCurve {
    /// Normalised extinction `A_λ / A_V`, extrapolated linearly
    pub fn curve(&self, wavelength: f64) -> f64 {
        self.curve.eval(wavelength).unwrap_or(f64::NAN)
    }

    /// Tabulated wavelengths (microns) and normalised extinction
    pub fn table(&self) -> (&[f64], &[f64]) {
        (self.curve.x(), self.curve.y())
    }

    /// Fraction of light transmitted at `wavelength` microns
    ///
    /// `min(10^(-0.4 curve(λ) A_V), 1)`
    pub fn attenuation(&self, wavelength: f64, av: f64) -> f64 {
        10f64.powf(-0.4 * self.curve(wavelength) * av).min(1.0)
    }
}

fn microns(angstroms: f64) -> f64 {
    angstroms * ANGSTROM / MICRON
}

/// Closed form, 0.12 to 2.2 microns
fn calzetti() -> Result<(Vec<f64>, Vec<f64>)> {
    let step = microns(1.0);
    let wavelength = arange(0.12, 2.20 + step, step)?;
    let k = wavelength
        .iter()
        .map(|w| match *w >= 0.63 {
            true => 2.659 * (-1.857 + 1.040 / w),
            false => 2.659 * (-2.156 + 1.509 / w - 0.198 / w.powi(2) + 0.011 / w.powi(3)),
        })
        .collect();
    Ok((wavelength, k))
}

const ALLEN_WAVELENGTH: [f64; 20] = [
    1000., 1110., 1250., 1430., 1670., 2000., 2220., 2500., 2850., 3330., 3650., 4000., 4400.,
    5000., 5530., 6700., 9000., 10000., 20000., 100000.,
];

/// Already normalised to one at V
const ALLEN_CURVE: [f64; 20] = [
    4.20, 3.70, 3.30, 3.00, 2.70, 2.80, 2.90, 2.30, 1.97, 1.69, 1.58, 1.45, 1.32, 1.13, 1.00,
    0.74, 0.46, 0.38, 0.11, 0.00,
];

fn allen(rv: f64) -> (Vec<f64>, Vec<f64>) {
    ALLEN_WAVELENGTH
        .iter()
        .zip(ALLEN_CURVE)
        .map(|(w, c)| (microns(*w), (c - 1.0) * rv))
        .unzip()
}

const PREVOT_WAVELENGTH: [f64; 30] = [
    1275., 1330., 1385., 1435., 1490., 1545., 1595., 1647., 1700., 1755., 1810., 1860., 1910.,
    2000., 2115., 2220., 2335., 2445., 2550., 2665., 2778., 2890., 2995., 3105., 3704., 4255.,
    5291., 12500., 16500., 22000.,
];

const PREVOT_K: [f64; 30] = [
    13.54, 12.52, 11.51, 10.80, 9.84, 9.28, 9.06, 8.49, 8.01, 7.71, 7.17, 6.90, 6.76, 6.38, 5.85,
    5.30, 4.53, 4.24, 3.91, 3.49, 3.15, 3.00, 2.65, 2.29, 1.81, 1.00, 0.00, -2.02, -2.36, -2.47,
];

fn prevot() -> (Vec<f64>, Vec<f64>) {
    (
        PREVOT_WAVELENGTH.iter().map(|w| microns(*w)).collect(),
        PREVOT_K.to_vec(),
    )
}

/// Parameters of the colour ratio fits
#[derive(Debug, Clone, Copy)]
#[allow(clippy::upper_case_acronyms)]
enum ColourRatio {
    MW,
    LMC,
}

impl ColourRatio {
    /// `[1/λ0, γ, C1, C2, C3, C4]`
    fn parameters(&self) -> [f64; 6] {
        match self {
            Self::MW => [4.595, 1.051, -0.38, 0.74, 3.96, 0.26],
            Self::LMC => [4.608, 0.994, -0.69, 0.89, 2.55, 0.50],
        }
    }

    /// `E(λ-V)/E(B-V)` at `wavelength` microns
    fn ratio(&self, wavelength: f64) -> f64 {
        let [x0, gamma, c1, c2, c3, c4] = self.parameters();
        let x = 1.0 / wavelength;
        let c4 = if x < 5.9 { 0.0 } else { c4 };

        let bump = c3 / ((x - x0.powi(2) / x).powi(2) + gamma.powi(2));
        let far_uv = c4 * (0.539 * (x - 5.9).powi(2) + 0.0564 * (x - 5.9).powi(3));
        c1 + c2 * x + bump + far_uv
    }
}

/// Colour ratio law from 1200 Å to `upper` Å, then the Allen table
fn colour_ratio_law(galaxy: ColourRatio, upper: f64, rv: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    let step = microns(1.0);
    let mut wavelength = arange(microns(1200.0), microns(upper) + step, step)?;
    let mut k = wavelength.iter().map(|w| galaxy.ratio(*w)).collect::<Vec<_>>();

    let last = wavelength.last().copied().unwrap_or(f64::NEG_INFINITY);
    let (tail_wavelength, tail_k) = allen(rv);
    for (w, k_allen) in tail_wavelength.into_iter().zip(tail_k) {
        if w > last {
            wavelength.push(w);
            k.push(k_allen);
        }
    }
    Ok((wavelength, k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn curves_are_normalised_selective_extinction() {
        for law in ScreenLaw::ALL {
            let rv = law.rv(&ScreenSettings::default());
            let (wavelength, k) = law.nodes(rv).unwrap();
            let curve = law.curve(rv).unwrap();
            for (w, k) in wavelength.iter().zip(&k).step_by(97) {
                assert_relative_eq!(
                    curve.curve(*w),
                    (k + rv) / rv,
                    epsilon = 1e-12,
                    max_relative = 1e-9
                );
            }
        }
    }

    #[test]
    fn allen_is_unity_in_v() {
        let allen = ScreenLaw::Allen.curve(3.1).unwrap();
        assert_relative_eq!(allen.curve(0.553), 1.0, max_relative = 1e-12);
        assert_relative_eq!(allen.attenuation(0.553, 1.0), 10f64.powf(-0.4), max_relative = 1e-12);
    }

    #[test]
    fn attenuation_never_exceeds_one() {
        // negative curve values far in the infrared of the Prevot law
        let prevot = ScreenLaw::Prevot.curve(3.1).unwrap();
        assert!(prevot.curve(20.0) < 0.0);
        assert_eq!(prevot.attenuation(20.0, 1.0), 1.0);
    }

    #[test]
    fn colour_ratio_tails() {
        let (wavelength, _) = ScreenLaw::Seaton.nodes(3.1).unwrap();
        assert!(wavelength.windows(2).all(|w| w[0] < w[1]));
        assert_relative_eq!(*wavelength.last().unwrap(), 10.0, max_relative = 1e-12);

        let fitzpatrick = ScreenLaw::Fitzpatrick.curve(2.72).unwrap();
        assert_relative_eq!(fitzpatrick.curve(2.0), 0.11, max_relative = 1e-9);
    }
}
