//! Result and Error types for the cosmology module

/// Type alias for `Result<T, cosmology::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `galtools-cosmology`
pub enum Error {
    /// No closed form exists for the age in this regime
    #[error("no age of universe for Omega_M={omega0}, Omega_L={lambda0}")]
    UnsupportedCosmology { omega0: f64, lambda0: f64 },

    /// Only defined for flat or open universes
    #[error("angular separation requires Omega_k >= 0, found {0}")]
    NegativeCurvature(f64),

    /// WMAP parameter sets that are available
    #[error("WMAP year {0} not recognised, select one of 1, 7")]
    UnknownWmapYear(u32),

    /// Quantity names for Hubble parameter conversion
    #[error("\"{0}\" not recognised, available are magnitude, luminosity, distance, volume, mass, density")]
    UnknownQuantity(String),

    /// Missing or malformed model parameters
    #[error(transparent)]
    Data(#[from] galtools_data::Error),
}
