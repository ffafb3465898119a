//! Property name grammar
//!
//! Derived properties are requested with colon delimited names such as
//! `diskLuminositiesStellar:SDSS_r:rest:z1.000:recent:dustCompendium`. The
//! first segment names the component and kind of property, and later
//! segments carry qualifiers like filters, frames, redshift labels and
//! trailing modifiers.
//!
//! Every kind has its own parser and every parser sees the whole name. A
//! parser that recognises the leading part of a name commits to it, so
//! malformed qualifiers are reported rather than silently passed over.

// crate modules
use crate::error::{Error, Result};

// galtools crates
use galtools_dust::ScreenLaw;

// nom parser combinators
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_while1};
use nom::character::complete::char;
use nom::combinator::{all_consuming, cut, eof, map, map_opt, map_res, opt, peek, rest, value, verify};
use nom::error::ErrorKind;
use nom::multi::separated_list1;
use nom::number::complete::recognize_float;
use nom::sequence::{preceded, separated_pair, terminated, tuple};
use nom::IResult;

// standard library
use std::fmt;
use std::mem::discriminant;

/// Galaxy component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Component {
    Disk,
    Spheroid,
    /// Sum of disk and spheroid
    Total,
}

impl Component {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Disk => "disk",
            Self::Spheroid => "spheroid",
            Self::Total => "total",
        }
    }

    /// Component of the dust compendium tables
    pub fn dust(&self) -> Option<galtools_dust::Component> {
        match self {
            Self::Disk => Some(galtools_dust::Component::Disk),
            Self::Spheroid => Some(galtools_dust::Component::Spheroid),
            Self::Total => None,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Rest or observed frame of a luminosity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Rest,
    Observed,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => write!(f, "rest"),
            Self::Observed => write!(f, "observed"),
        }
    }
}

/// A number that remembers how it was written
///
/// ```rust
/// # use galtools_galaxies::PropertyName;
/// let name = PropertyName::parse("diskLuminositiesStellar:SDSS_r:rest:z1.000").unwrap();
/// let redshift = name.redshift().unwrap();
///
/// assert_eq!(redshift.value(), 1.0);
/// assert_eq!(redshift.text(), "1.000");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    text: String,
    value: f64,
}

impl Number {
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Source text of the number
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Dust attenuation model named by a `dust<Model>` suffix
#[derive(Debug, Clone, PartialEq)]
pub enum DustModel {
    /// Attenuations computed by Galacticus itself
    Atlas,
    /// Tabulated radiative transfer attenuations
    Compendium,
    /// Charlot & Fall (2000) birth cloud and ISM model
    CharlotFall,
    /// Foreground screen with an optional fixed `A_V`
    Screen { law: ScreenLaw, av: Option<Number> },
}

impl fmt::Display for DustModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atlas => write!(f, "dustAtlas"),
            Self::Compendium => write!(f, "dustCompendium"),
            Self::CharlotFall => write!(f, "dustCharlotFall2000"),
            Self::Screen { law, av: None } => write!(f, "dust{law}"),
            Self::Screen { law, av: Some(av) } => write!(f, "dust{law}_Av{av}"),
        }
    }
}

/// Trailing modifier of a name
#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    /// Only recently formed stars
    Recent,
    Dust(DustModel),
    /// Vega magnitudes
    Vega,
    /// AB magnitudes
    Ab,
    /// Fixed emission line width in km/s
    FixedWidth(Number),
    /// Signal to noise ratio of added noise
    Snr(Number),
    /// Continuum only
    NoLines,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recent => write!(f, "recent"),
            Self::Dust(dust) => write!(f, "{dust}"),
            Self::Vega => write!(f, "vega"),
            Self::Ab => write!(f, "AB"),
            Self::FixedWidth(width) => write!(f, "fixedWidth{width}"),
            Self::Snr(snr) => write!(f, "snr{snr}"),
            Self::NoLines => write!(f, "noLines"),
        }
    }
}

/// Trailing modifiers, in the order they were written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modifiers(Vec<Modifier>);

impl Modifiers {
    pub fn new(modifiers: Vec<Modifier>) -> Self {
        Self(modifiers)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Modifier> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn recent(&self) -> bool {
        self.0.contains(&Modifier::Recent)
    }

    pub fn vega(&self) -> bool {
        self.0.contains(&Modifier::Vega)
    }

    pub fn no_lines(&self) -> bool {
        self.0.contains(&Modifier::NoLines)
    }

    pub fn dust(&self) -> Option<&DustModel> {
        self.0.iter().find_map(|m| match m {
            Modifier::Dust(dust) => Some(dust),
            _ => None,
        })
    }

    pub fn fixed_width(&self) -> Option<&Number> {
        self.0.iter().find_map(|m| match m {
            Modifier::FixedWidth(width) => Some(width),
            _ => None,
        })
    }

    pub fn snr(&self) -> Option<&Number> {
        self.0.iter().find_map(|m| match m {
            Modifier::Snr(snr) => Some(snr),
            _ => None,
        })
    }

    /// Copy keeping only the modifiers that pass `keep`, order preserved
    pub fn filtered(&self, keep: impl Fn(&Modifier) -> bool) -> Self {
        Self(self.0.iter().filter(|m| keep(m)).cloned().collect())
    }

    /// Copy without the dust model
    pub fn without_dust(&self) -> Self {
        self.filtered(|m| !matches!(m, Modifier::Dust(_)))
    }

    /// Copy without the recent flag
    pub fn without_recent(&self) -> Self {
        self.filtered(|m| *m != Modifier::Recent)
    }

    /// Copy with the recent flag, placed before any dust model
    pub fn with_recent(&self) -> Self {
        if self.recent() {
            return self.clone();
        }
        let mut modifiers = self.0.clone();
        let position = modifiers
            .iter()
            .position(|m| matches!(m, Modifier::Dust(_)))
            .unwrap_or(modifiers.len());
        modifiers.insert(position, Modifier::Recent);
        Self(modifiers)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|m| write!(f, ":{m}"))
    }
}

/// Gas or stellar phase of a metallicity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Gas,
    Stellar,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gas => "Gas",
            Self::Stellar => "Stellar",
        }
    }
}

/// Species of an ionizing continuum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    Lyman,
    Helium,
    Oxygen,
}

impl Species {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lyman => "Lyman",
            Self::Helium => "Helium",
            Self::Oxygen => "Oxygen",
        }
    }

    /// Filter Galacticus integrates the continuum through
    pub fn filter(&self) -> &'static str {
        match self {
            Self::Lyman => "Lyc",
            Self::Helium => "HeliumContinuum",
            Self::Oxygen => "OxygenContinuum",
        }
    }
}

/// Stellar luminosity through a filter
#[derive(Debug, Clone, PartialEq)]
pub struct Luminosity {
    pub component: Component,
    pub filter: String,
    pub frame: Frame,
    pub redshift: Number,
    pub modifiers: Modifiers,
}

impl fmt::Display for Luminosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}LuminositiesStellar:{}:{}:z{}{}",
            self.component, self.filter, self.frame, self.redshift, self.modifiers
        )
    }
}

/// Emission line qualifiers, shared by luminosities and fluxes
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub component: Component,
    pub line: String,
    pub frame: Frame,
    /// Filter the line is observed through, if any
    pub filter: Option<String>,
    pub redshift: Number,
    pub modifiers: Modifiers,
}

impl Line {
    fn write(&self, f: &mut fmt::Formatter<'_>, kind: &str) -> fmt::Result {
        write!(f, "{}{kind}:{}:{}", self.component, self.line, self.frame)?;
        if let Some(filter) = &self.filter {
            write!(f, ":{filter}")?;
        }
        write!(f, ":z{}{}", self.redshift, self.modifiers)
    }
}

/// Width of an emission line
#[derive(Debug, Clone, PartialEq)]
pub enum Width {
    /// From the velocity dispersion of the galaxy
    Dispersion,
    /// Fixed velocity in km/s
    Fixed(Number),
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispersion => write!(f, "dispersionWidth"),
            Self::Fixed(width) => write!(f, "fixedWidth{width}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnitudeSystem {
    Apparent,
    Absolute,
}

impl fmt::Display for MagnitudeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apparent => write!(f, "Apparent"),
            Self::Absolute => write!(f, "Absolute"),
        }
    }
}

/// Magnitude through a filter
#[derive(Debug, Clone, PartialEq)]
pub struct Magnitude {
    pub component: Component,
    pub system: MagnitudeSystem,
    pub filter: String,
    pub frame: Frame,
    pub redshift: Number,
    pub modifiers: Modifiers,
}

impl Magnitude {
    /// Name of the luminosity the magnitude is computed from
    pub fn luminosity(&self) -> Luminosity {
        Luminosity {
            component: self.component,
            filter: self.filter.clone(),
            frame: self.frame,
            redshift: self.redshift.clone(),
            modifiers: self
                .modifiers
                .filtered(|m| !matches!(m, Modifier::Vega | Modifier::Ab)),
        }
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Magnitude{}:{}:{}:z{}{}",
            self.component, self.system, self.filter, self.frame, self.redshift, self.modifiers
        )
    }
}

/// Spectral energy distribution over a wavelength range
#[derive(Debug, Clone, PartialEq)]
pub struct Sed {
    pub component: Component,
    /// Lower wavelength, upper wavelength and resolution in Angstroms
    pub range: [Number; 3],
    pub frame: Frame,
    pub redshift: Number,
    pub modifiers: Modifiers,
}

impl fmt::Display for Sed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [lo, hi, resolution] = &self.range;
        write!(
            f,
            "{}SpectralEnergyDistribution:{lo}_{hi}_{resolution}:{}:z{}{}",
            self.component, self.frame, self.redshift, self.modifiers
        )
    }
}

/// Birth cloud or diffuse ISM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Clouds,
    Ism,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clouds => write!(f, "Clouds"),
            Self::Ism => write!(f, "ISM"),
        }
    }
}

/// Light attenuated by the Charlot & Fall model
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Stellar continuum through a filter
    Stellar { filter: String },
    /// An emission line, optionally through a filter
    Line { line: String, filter: Option<String> },
}

/// Optical depth of the Charlot & Fall model
#[derive(Debug, Clone, PartialEq)]
pub struct CharlotFallDepth {
    pub component: Component,
    pub source: Source,
    pub region: Region,
    pub redshift: Number,
}

impl fmt::Display for CharlotFallDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (component, region) = (self.component, self.region);
        match &self.source {
            Source::Stellar { filter } => {
                write!(f, "{component}StellarOpticalDepth{region}:{filter}")?
            }
            Source::Line { line, filter } => {
                write!(f, "{component}LineOpticalDepth{region}:{line}")?;
                if let Some(filter) = filter {
                    write!(f, ":{filter}")?;
                }
            }
        }
        write!(f, ":z{}:dustCharlotFall2000", self.redshift)
    }
}

/// Dust parameters inferred from V and B band attenuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DustParameter {
    /// V band attenuation
    Av,
    /// Ratio of total to selective extinction
    Rv,
}

impl fmt::Display for DustParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Av => write!(f, "A_V"),
            Self::Rv => write!(f, "R_V"),
        }
    }
}

/// Kinds of derived property, used to dispatch to a calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Totals,
    BulgeToTotal,
    Metallicity,
    PhaseMetallicity,
    HydrogenGasDensity,
    MetalsGasDensity,
    HostNode,
    IonizingContinuum,
    StellarLuminosity,
    LineLuminosity,
    LineFlux,
    LineWidth,
    Magnitude,
    Sed,
    DustOpticalDepth,
    CharlotFallOpticalDepth,
    DustParameter,
    Inclination,
    Redshift,
    SnapshotRedshift,
    ObservedRedshift,
    RightAscension,
    Declination,
    MergerTreeWeight,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A parsed property name
///
/// Parsing and printing are exact inverses, numbers and the order of
/// trailing modifiers are kept as written.
///
/// ```rust
/// # use galtools_galaxies::{Kind, PropertyName};
/// let text = "totalMagnitudeApparent:SDSS_r:observed:z0.100:vega:dustCalzetti_Av0.5";
/// let name = PropertyName::parse(text).unwrap();
///
/// assert_eq!(name.kind(), Kind::Magnitude);
/// assert_eq!(name.to_string(), text);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyName {
    /// `total<Quantity>`
    Totals { quantity: String },
    /// `bulgeToTotal<Quantity>`
    BulgeToTotal { quantity: String },
    /// `<component>Metallicity`
    Metallicity { component: Component },
    /// `<component>(Gas|Stellar)Metallicity`
    PhaseMetallicity { component: Component, phase: Phase },
    /// `<component>HydrogenGasDensity`
    HydrogenGasDensity { component: Component },
    /// `<component>MetalsGasDensity`
    MetalsGasDensity { component: Component },
    /// `<property>:host`
    HostNode { property: String },
    /// `<component><Species>ContinuumLuminosity:z<N>[:recent]`
    IonizingContinuum {
        component: Component,
        species: Species,
        redshift: Number,
        modifiers: Modifiers,
    },
    StellarLuminosity(Luminosity),
    LineLuminosity(Line),
    LineFlux(Line),
    /// `fullWidthHalfMaximum:<line>:<width>:z<N>[:recent]`
    LineWidth {
        line: String,
        width: Width,
        redshift: Number,
        modifiers: Modifiers,
    },
    Magnitude(Magnitude),
    Sed(Sed),
    /// `<component>DustOpticalDepthCentral:dust(Atlas|Compendium)`
    DustOpticalDepth { component: Component, model: DustModel },
    CharlotFallOpticalDepth(CharlotFallDepth),
    /// `<component>LuminositiesStellar:z<N>:dust<Model>:(A_V|R_V)`
    DustParameter {
        component: Component,
        redshift: Number,
        dust: DustModel,
        parameter: DustParameter,
    },
    Inclination,
    Redshift,
    SnapshotRedshift,
    ObservedRedshift,
    RightAscension,
    Declination,
    MergerTreeWeight,
}

impl PropertyName {
    /// Parse a name against every kind of property
    pub fn parse(name: &str) -> Result<Self> {
        resolve(name, &PARSERS)
    }

    /// Kind of property, for dispatch
    pub fn kind(&self) -> Kind {
        match self {
            Self::Totals { .. } => Kind::Totals,
            Self::BulgeToTotal { .. } => Kind::BulgeToTotal,
            Self::Metallicity { .. } => Kind::Metallicity,
            Self::PhaseMetallicity { .. } => Kind::PhaseMetallicity,
            Self::HydrogenGasDensity { .. } => Kind::HydrogenGasDensity,
            Self::MetalsGasDensity { .. } => Kind::MetalsGasDensity,
            Self::HostNode { .. } => Kind::HostNode,
            Self::IonizingContinuum { .. } => Kind::IonizingContinuum,
            Self::StellarLuminosity(_) => Kind::StellarLuminosity,
            Self::LineLuminosity(_) => Kind::LineLuminosity,
            Self::LineFlux(_) => Kind::LineFlux,
            Self::LineWidth { .. } => Kind::LineWidth,
            Self::Magnitude(_) => Kind::Magnitude,
            Self::Sed(_) => Kind::Sed,
            Self::DustOpticalDepth { .. } => Kind::DustOpticalDepth,
            Self::CharlotFallOpticalDepth(_) => Kind::CharlotFallOpticalDepth,
            Self::DustParameter { .. } => Kind::DustParameter,
            Self::Inclination => Kind::Inclination,
            Self::Redshift => Kind::Redshift,
            Self::SnapshotRedshift => Kind::SnapshotRedshift,
            Self::ObservedRedshift => Kind::ObservedRedshift,
            Self::RightAscension => Kind::RightAscension,
            Self::Declination => Kind::Declination,
            Self::MergerTreeWeight => Kind::MergerTreeWeight,
        }
    }

    /// Redshift label, for names that carry one
    pub fn redshift(&self) -> Option<&Number> {
        match self {
            Self::IonizingContinuum { redshift, .. }
            | Self::LineWidth { redshift, .. }
            | Self::DustParameter { redshift, .. } => Some(redshift),
            Self::StellarLuminosity(l) => Some(&l.redshift),
            Self::LineLuminosity(l) | Self::LineFlux(l) => Some(&l.redshift),
            Self::Magnitude(m) => Some(&m.redshift),
            Self::Sed(s) => Some(&s.redshift),
            Self::CharlotFallOpticalDepth(d) => Some(&d.redshift),
            _ => None,
        }
    }
}

impl std::str::FromStr for PropertyName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Totals { quantity } => write!(f, "total{quantity}"),
            Self::BulgeToTotal { quantity } => write!(f, "bulgeToTotal{quantity}"),
            Self::Metallicity { component } => write!(f, "{component}Metallicity"),
            Self::PhaseMetallicity { component, phase } => {
                write!(f, "{component}{}Metallicity", phase.name())
            }
            Self::HydrogenGasDensity { component } => write!(f, "{component}HydrogenGasDensity"),
            Self::MetalsGasDensity { component } => write!(f, "{component}MetalsGasDensity"),
            Self::HostNode { property } => write!(f, "{property}:host"),
            Self::IonizingContinuum {
                component,
                species,
                redshift,
                modifiers,
            } => write!(
                f,
                "{component}{}ContinuumLuminosity:z{redshift}{modifiers}",
                species.name()
            ),
            Self::StellarLuminosity(luminosity) => write!(f, "{luminosity}"),
            Self::LineLuminosity(line) => line.write(f, "LineLuminosity"),
            Self::LineFlux(line) => line.write(f, "LineFlux"),
            Self::LineWidth {
                line,
                width,
                redshift,
                modifiers,
            } => write!(f, "fullWidthHalfMaximum:{line}:{width}:z{redshift}{modifiers}"),
            Self::Magnitude(magnitude) => write!(f, "{magnitude}"),
            Self::Sed(sed) => write!(f, "{sed}"),
            Self::DustOpticalDepth { component, model } => {
                write!(f, "{component}DustOpticalDepthCentral:{model}")
            }
            Self::CharlotFallOpticalDepth(depth) => write!(f, "{depth}"),
            Self::DustParameter {
                component,
                redshift,
                dust,
                parameter,
            } => write!(f, "{component}LuminositiesStellar:z{redshift}:{dust}:{parameter}"),
            Self::Inclination => write!(f, "inclination"),
            Self::Redshift => write!(f, "redshift"),
            Self::SnapshotRedshift => write!(f, "snapshotRedshift"),
            Self::ObservedRedshift => write!(f, "observedRedshift"),
            Self::RightAscension => write!(f, "rightAscension"),
            Self::Declination => write!(f, "declination"),
            Self::MergerTreeWeight => write!(f, "mergerTreeWeight"),
        }
    }
}

/// Signature shared by the parsers of every kind
pub(crate) type Parser = fn(&str) -> IResult<&str, PropertyName>;

/// Parser of every kind of property
pub(crate) const PARSERS: [(Kind, Parser); 24] = [
    (Kind::Totals, totals),
    (Kind::BulgeToTotal, bulge_to_total),
    (Kind::Metallicity, metallicity),
    (Kind::PhaseMetallicity, phase_metallicity),
    (Kind::HydrogenGasDensity, hydrogen_gas_density),
    (Kind::MetalsGasDensity, metals_gas_density),
    (Kind::HostNode, host_node),
    (Kind::IonizingContinuum, ionizing_continuum),
    (Kind::StellarLuminosity, stellar_luminosity),
    (Kind::LineLuminosity, line_luminosity),
    (Kind::LineFlux, line_flux),
    (Kind::LineWidth, line_width),
    (Kind::Magnitude, magnitude),
    (Kind::Sed, sed),
    (Kind::DustOpticalDepth, dust_optical_depth),
    (Kind::CharlotFallOpticalDepth, charlot_fall_optical_depth),
    (Kind::DustParameter, dust_parameter),
    (Kind::Inclination, inclination),
    (Kind::Redshift, redshift_keyword),
    (Kind::SnapshotRedshift, snapshot_redshift),
    (Kind::ObservedRedshift, observed_redshift),
    (Kind::RightAscension, right_ascension),
    (Kind::Declination, declination),
    (Kind::MergerTreeWeight, merger_tree_weight),
];

/// Run every parser over a name and collect the claims
///
/// A single claim wins. Names claimed by several kinds are an error, as are
/// names no kind claims. When no kind claims a name but some kind
/// recognised its leading part, the name is reported as malformed.
pub(crate) fn resolve(name: &str, parsers: &[(Kind, Parser)]) -> Result<PropertyName> {
    if let Err(e) = segments(name) {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: reason(e),
        });
    }

    let mut claims = Vec::new();
    let mut malformed = None;
    for (kind, parser) in parsers {
        match parser(name) {
            Ok((_, parsed)) => claims.push((*kind, parsed)),
            Err(nom::Err::Failure(e)) => {
                malformed.get_or_insert(reason(nom::Err::Failure(e)));
            }
            Err(_) => (),
        }
    }

    match (claims.len(), malformed) {
        (0, Some(reason)) => Err(Error::InvalidName {
            name: name.to_string(),
            reason,
        }),
        (0, None) => Err(Error::UnknownProperty(name.to_string())),
        (1, _) => Ok(claims.remove(0).1),
        _ => Err(Error::AmbiguousName {
            name: name.to_string(),
            kinds: claims.iter().map(|(kind, _)| kind.to_string()).collect(),
        }),
    }
}

fn reason(e: nom::Err<nom::error::Error<&str>>) -> String {
    match e {
        nom::Err::Error(e) | nom::Err::Failure(e) if e.input.is_empty() => {
            "unexpected end of name".to_string()
        }
        nom::Err::Error(e) | nom::Err::Failure(e) => format!("unexpected \"{}\"", e.input),
        nom::Err::Incomplete(_) => "incomplete name".to_string(),
    }
}

/// Split into non-empty segments without whitespace
fn segments(i: &str) -> std::result::Result<Vec<&str>, nom::Err<nom::error::Error<&str>>> {
    let (_, segments) = all_consuming(separated_list1(char(':'), is_not(": \t\r\n")))(i)?;
    Ok(segments)
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// Zero-width check for the end of a segment
fn end_of_segment(i: &str) -> IResult<&str, ()> {
    value((), peek(alt((eof, tag(":")))))(i)
}

/// Any single segment
fn segment(i: &str) -> IResult<&str, String> {
    map(is_not(":"), str::to_string)(i)
}

fn identifier(i: &str) -> IResult<&str, String> {
    map(take_while1(|c: char| c.is_alphanumeric() || c == '_'), str::to_string)(i)
}

fn number(i: &str) -> IResult<&str, Number> {
    map_res(recognize_float, |text: &str| {
        text.parse::<f64>().map(|value| Number {
            text: text.to_string(),
            value,
        })
    })(i)
}

/// A whole `z<N>` segment
fn redshift(i: &str) -> IResult<&str, Number> {
    terminated(preceded(char('z'), number), end_of_segment)(i)
}

fn component(i: &str) -> IResult<&str, Component> {
    alt((
        value(Component::Disk, tag("disk")),
        value(Component::Spheroid, tag("spheroid")),
        value(Component::Total, tag("total")),
    ))(i)
}

fn disk_or_spheroid(i: &str) -> IResult<&str, Component> {
    alt((
        value(Component::Disk, tag("disk")),
        value(Component::Spheroid, tag("spheroid")),
    ))(i)
}

fn frame(i: &str) -> IResult<&str, Frame> {
    terminated(
        alt((
            value(Frame::Rest, tag("rest")),
            value(Frame::Observed, tag("observed")),
        )),
        end_of_segment,
    )(i)
}

fn screen_law(i: &str) -> IResult<&str, ScreenLaw> {
    ScreenLaw::ALL
        .into_iter()
        .find_map(|law| i.strip_prefix(law.name()).map(|rest| (rest, law)))
        .ok_or_else(|| nom::Err::Error(nom::error::Error::new(i, ErrorKind::Tag)))
}

fn dust_model(i: &str) -> IResult<&str, DustModel> {
    let screen = map(
        tuple((screen_law, opt(preceded(tag("_Av"), number)))),
        |(law, av)| DustModel::Screen { law, av },
    );
    terminated(
        preceded(
            tag("dust"),
            alt((
                value(DustModel::Compendium, tag("Compendium")),
                value(DustModel::Atlas, tag("Atlas")),
                value(DustModel::CharlotFall, tag("CharlotFall2000")),
                screen,
            )),
        ),
        end_of_segment,
    )(i)
}

fn modifier(i: &str) -> IResult<&str, Modifier> {
    terminated(
        alt((
            value(Modifier::Recent, tag("recent")),
            map(dust_model, Modifier::Dust),
            value(Modifier::Vega, tag("vega")),
            value(Modifier::Ab, tag("AB")),
            map(preceded(tag("fixedWidth"), number), Modifier::FixedWidth),
            map(preceded(tag("snr"), number), Modifier::Snr),
            value(Modifier::NoLines, tag("noLines")),
        )),
        end_of_segment,
    )(i)
}

/// Trailing `:<modifier>` segments in any order, each at most once
fn modifiers(mut i: &str, allowed: fn(&Modifier) -> bool) -> IResult<&str, Modifiers> {
    let mut found: Vec<Modifier> = Vec::new();
    while let Ok((remaining, m)) = preceded(char(':'), modifier)(i) {
        let repeated = found.iter().any(|f| discriminant(f) == discriminant(&m));
        if !allowed(&m) || repeated {
            return Err(nom::Err::Failure(nom::error::Error::new(i, ErrorKind::Verify)));
        }
        found.push(m);
        i = remaining;
    }
    Ok((i, Modifiers(found)))
}

fn recent_only(m: &Modifier) -> bool {
    *m == Modifier::Recent
}

fn recent_or_dust(m: &Modifier) -> bool {
    matches!(m, Modifier::Recent | Modifier::Dust(_))
}

/// Optional filter segment followed by the redshift label
fn filter_and_redshift(i: &str) -> IResult<&str, (Option<String>, Number)> {
    alt((
        map(redshift, |z| (None, z)),
        map(separated_pair(segment, char(':'), redshift), |(f, z)| (Some(f), z)),
    ))(i)
}

fn keyword<'a>(i: &'a str, word: &'static str, name: PropertyName) -> IResult<&'a str, PropertyName> {
    value(name, all_consuming(tag(word)))(i)
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

fn inclination(i: &str) -> IResult<&str, PropertyName> {
    keyword(i, "inclination", PropertyName::Inclination)
}

fn redshift_keyword(i: &str) -> IResult<&str, PropertyName> {
    keyword(i, "redshift", PropertyName::Redshift)
}

fn snapshot_redshift(i: &str) -> IResult<&str, PropertyName> {
    keyword(i, "snapshotRedshift", PropertyName::SnapshotRedshift)
}

fn observed_redshift(i: &str) -> IResult<&str, PropertyName> {
    keyword(i, "observedRedshift", PropertyName::ObservedRedshift)
}

fn right_ascension(i: &str) -> IResult<&str, PropertyName> {
    keyword(i, "rightAscension", PropertyName::RightAscension)
}

fn declination(i: &str) -> IResult<&str, PropertyName> {
    keyword(i, "declination", PropertyName::Declination)
}

fn merger_tree_weight(i: &str) -> IResult<&str, PropertyName> {
    keyword(i, "mergerTreeWeight", PropertyName::MergerTreeWeight)
}

fn totals(i: &str) -> IResult<&str, PropertyName> {
    let not_metallicity = |q: &String| {
        !matches!(q.as_str(), "Metallicity" | "GasMetallicity" | "StellarMetallicity")
    };
    map(
        all_consuming(preceded(tag("total"), verify(identifier, not_metallicity))),
        |quantity| PropertyName::Totals { quantity },
    )(i)
}

fn bulge_to_total(i: &str) -> IResult<&str, PropertyName> {
    map(all_consuming(preceded(tag("bulgeToTotal"), identifier)), |quantity| {
        PropertyName::BulgeToTotal { quantity }
    })(i)
}

fn metallicity(i: &str) -> IResult<&str, PropertyName> {
    map(all_consuming(terminated(component, tag("Metallicity"))), |component| {
        PropertyName::Metallicity { component }
    })(i)
}

fn phase_metallicity(i: &str) -> IResult<&str, PropertyName> {
    let phase = alt((value(Phase::Gas, tag("Gas")), value(Phase::Stellar, tag("Stellar"))));
    map(
        all_consuming(tuple((component, phase, tag("Metallicity")))),
        |(component, phase, _)| PropertyName::PhaseMetallicity { component, phase },
    )(i)
}

fn hydrogen_gas_density(i: &str) -> IResult<&str, PropertyName> {
    map(
        all_consuming(terminated(disk_or_spheroid, tag("HydrogenGasDensity"))),
        |component| PropertyName::HydrogenGasDensity { component },
    )(i)
}

fn metals_gas_density(i: &str) -> IResult<&str, PropertyName> {
    map(
        all_consuming(terminated(disk_or_spheroid, tag("MetalsGasDensity"))),
        |component| PropertyName::MetalsGasDensity { component },
    )(i)
}

fn host_node(i: &str) -> IResult<&str, PropertyName> {
    map_opt(rest, |name: &str| {
        name.strip_suffix(":host")
            .filter(|property| !property.is_empty())
            .map(|property| PropertyName::HostNode {
                property: property.to_string(),
            })
    })(i)
}

fn ionizing_continuum(i: &str) -> IResult<&str, PropertyName> {
    let species = alt((
        value(Species::Lyman, tag("Lyman")),
        value(Species::Helium, tag("Helium")),
        value(Species::Oxygen, tag("Oxygen")),
    ));
    let (i, (component, species, _)) =
        tuple((disk_or_spheroid, species, tag("ContinuumLuminosity:")))(i)?;
    let (i, (redshift, modifiers)) = cut(continuum_tail)(i)?;
    Ok((
        i,
        PropertyName::IonizingContinuum {
            component,
            species,
            redshift,
            modifiers,
        },
    ))
}

fn continuum_tail(i: &str) -> IResult<&str, (Number, Modifiers)> {
    let (i, redshift) = redshift(i)?;
    let (i, modifiers) = modifiers(i, recent_only)?;
    let (i, _) = eof(i)?;
    Ok((i, (redshift, modifiers)))
}

fn stellar_luminosity(i: &str) -> IResult<&str, PropertyName> {
    let (i, component) = terminated(component, tag("LuminositiesStellar:"))(i)?;
    let (i, (filter, frame, redshift, modifiers)) = cut(luminosity_tail)(i)?;
    Ok((
        i,
        PropertyName::StellarLuminosity(Luminosity {
            component,
            filter,
            frame,
            redshift,
            modifiers,
        }),
    ))
}

fn luminosity_tail(i: &str) -> IResult<&str, (String, Frame, Number, Modifiers)> {
    let (i, filter) = terminated(segment, char(':'))(i)?;
    let (i, frame) = terminated(frame, char(':'))(i)?;
    let (i, redshift) = redshift(i)?;
    let (i, modifiers) = modifiers(i, recent_or_dust)?;
    let (i, _) = eof(i)?;
    Ok((i, (filter, frame, redshift, modifiers)))
}

fn line_luminosity(i: &str) -> IResult<&str, PropertyName> {
    let (i, component) = terminated(component, tag("LineLuminosity:"))(i)?;
    let (i, line) = cut(line_tail)(i)?;
    Ok((i, PropertyName::LineLuminosity(Line { component, ..line })))
}

fn line_flux(i: &str) -> IResult<&str, PropertyName> {
    let (i, component) = terminated(component, tag("LineFlux:"))(i)?;
    let (i, line) = cut(line_tail)(i)?;
    Ok((i, PropertyName::LineFlux(Line { component, ..line })))
}

/// Line qualifiers, the component is filled in by the caller
fn line_tail(i: &str) -> IResult<&str, Line> {
    let (i, line) = terminated(segment, char(':'))(i)?;
    let (i, frame) = terminated(frame, char(':'))(i)?;
    let (i, (filter, redshift)) = filter_and_redshift(i)?;
    let (i, modifiers) = modifiers(i, recent_or_dust)?;
    let (i, _) = eof(i)?;
    Ok((
        i,
        Line {
            component: Component::Total,
            line,
            frame,
            filter,
            redshift,
            modifiers,
        },
    ))
}

fn line_width(i: &str) -> IResult<&str, PropertyName> {
    let (i, _) = tag("fullWidthHalfMaximum:")(i)?;
    let (i, (line, width, redshift, modifiers)) = cut(width_tail)(i)?;
    Ok((
        i,
        PropertyName::LineWidth {
            line,
            width,
            redshift,
            modifiers,
        },
    ))
}

fn width_tail(i: &str) -> IResult<&str, (String, Width, Number, Modifiers)> {
    let width = terminated(
        alt((
            value(Width::Dispersion, tag("dispersionWidth")),
            map(preceded(tag("fixedWidth"), number), Width::Fixed),
        )),
        end_of_segment,
    );
    let (i, line) = terminated(segment, char(':'))(i)?;
    let (i, width) = terminated(width, char(':'))(i)?;
    let (i, redshift) = redshift(i)?;
    let (i, modifiers) = modifiers(i, recent_only)?;
    let (i, _) = eof(i)?;
    Ok((i, (line, width, redshift, modifiers)))
}

fn magnitude(i: &str) -> IResult<&str, PropertyName> {
    let system = alt((
        value(MagnitudeSystem::Apparent, tag("Apparent")),
        value(MagnitudeSystem::Absolute, tag("Absolute")),
    ));
    let (i, (component, _, system, _)) = tuple((component, tag("Magnitude"), system, char(':')))(i)?;
    let (i, (filter, frame, redshift, modifiers)) = cut(magnitude_tail)(i)?;
    Ok((
        i,
        PropertyName::Magnitude(Magnitude {
            component,
            system,
            filter,
            frame,
            redshift,
            modifiers,
        }),
    ))
}

fn magnitude_tail(i: &str) -> IResult<&str, (String, Frame, Number, Modifiers)> {
    let (i, filter) = terminated(segment, char(':'))(i)?;
    let (i, frame) = terminated(frame, char(':'))(i)?;
    let (i, redshift) = redshift(i)?;
    let start = i;
    let (i, modifiers) = modifiers(i, |m| {
        matches!(m, Modifier::Vega | Modifier::Ab | Modifier::Recent | Modifier::Dust(_))
    })?;
    if modifiers.vega() && modifiers.iter().any(|m| *m == Modifier::Ab) {
        return Err(nom::Err::Failure(nom::error::Error::new(start, ErrorKind::Verify)));
    }
    let (i, _) = eof(i)?;
    Ok((i, (filter, frame, redshift, modifiers)))
}

fn sed(i: &str) -> IResult<&str, PropertyName> {
    let (i, component) = terminated(component, tag("SpectralEnergyDistribution:"))(i)?;
    let (i, (range, frame, redshift, modifiers)) = cut(sed_tail)(i)?;
    Ok((
        i,
        PropertyName::Sed(Sed {
            component,
            range,
            frame,
            redshift,
            modifiers,
        }),
    ))
}

fn sed_tail(i: &str) -> IResult<&str, ([Number; 3], Frame, Number, Modifiers)> {
    let (i, (lo, _, hi, _, resolution)) =
        terminated(tuple((number, char('_'), number, char('_'), number)), char(':'))(i)?;
    let (i, frame) = terminated(frame, char(':'))(i)?;
    let (i, redshift) = redshift(i)?;
    let (i, modifiers) = modifiers(i, |m| {
        matches!(
            m,
            Modifier::FixedWidth(_)
                | Modifier::Snr(_)
                | Modifier::Recent
                | Modifier::Dust(_)
                | Modifier::NoLines
        )
    })?;
    let (i, _) = eof(i)?;
    Ok((i, ([lo, hi, resolution], frame, redshift, modifiers)))
}

fn dust_optical_depth(i: &str) -> IResult<&str, PropertyName> {
    let model = alt((
        value(DustModel::Atlas, tag("Atlas")),
        value(DustModel::Compendium, tag("Compendium")),
    ));
    map(
        all_consuming(tuple((
            disk_or_spheroid,
            tag("DustOpticalDepthCentral:dust"),
            model,
        ))),
        |(component, _, model)| PropertyName::DustOpticalDepth { component, model },
    )(i)
}

fn charlot_fall_optical_depth(i: &str) -> IResult<&str, PropertyName> {
    let source = alt((value(false, tag("Stellar")), value(true, tag("Line"))));
    let region = alt((value(Region::Clouds, tag("Clouds")), value(Region::Ism, tag("ISM"))));
    let (i, (component, is_line, _, region, _)) =
        tuple((disk_or_spheroid, source, tag("OpticalDepth"), region, char(':')))(i)?;

    let (i, (source, redshift)) = match is_line {
        true => cut(line_depth_tail)(i)?,
        false => cut(stellar_depth_tail)(i)?,
    };
    Ok((
        i,
        PropertyName::CharlotFallOpticalDepth(CharlotFallDepth {
            component,
            source,
            region,
            redshift,
        }),
    ))
}

fn stellar_depth_tail(i: &str) -> IResult<&str, (Source, Number)> {
    let (i, filter) = terminated(segment, char(':'))(i)?;
    let (i, redshift) = redshift(i)?;
    let (i, _) = all_consuming(tag(":dustCharlotFall2000"))(i)?;
    Ok((i, (Source::Stellar { filter }, redshift)))
}

fn line_depth_tail(i: &str) -> IResult<&str, (Source, Number)> {
    let (i, line) = terminated(segment, char(':'))(i)?;
    let (i, (filter, redshift)) = filter_and_redshift(i)?;
    let (i, _) = all_consuming(tag(":dustCharlotFall2000"))(i)?;
    Ok((i, (Source::Line { line, filter }, redshift)))
}

fn dust_parameter(i: &str) -> IResult<&str, PropertyName> {
    let (i, (component, _, redshift)) =
        tuple((disk_or_spheroid, tag("LuminositiesStellar:"), redshift))(i)?;
    let (i, (dust, parameter)) = cut(dust_parameter_tail)(i)?;
    Ok((
        i,
        PropertyName::DustParameter {
            component,
            redshift,
            dust,
            parameter,
        },
    ))
}

fn dust_parameter_tail(i: &str) -> IResult<&str, (DustModel, DustParameter)> {
    let parameter = alt((
        value(DustParameter::Av, tag("A_V")),
        value(DustParameter::Rv, tag("R_V")),
    ));
    let (i, dust) = preceded(char(':'), dust_model)(i)?;
    let (i, parameter) = all_consuming(preceded(char(':'), parameter))(i)?;
    Ok((i, (dust, parameter)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_print_as_written() {
        let names = [
            "totalMassStellar",
            "bulgeToTotalMassStellar",
            "spheroidMetallicity",
            "totalGasMetallicity",
            "diskHydrogenGasDensity",
            "spheroidMetalsGasDensity",
            "diskMassStellar:host",
            "diskLymanContinuumLuminosity:z1.000:recent",
            "diskLuminositiesStellar:SDSS_r:rest:z1.000:recent:dustCompendium",
            "totalLuminositiesStellar:SDSS_r:observed:z1.0:dustCalzetti_Av1.5:recent",
            "diskLineLuminosity:balmerAlpha6565:rest:z1.000",
            "totalLineFlux:balmerAlpha6565:observed:SDSS_r:z1.000:dustCharlotFall2000",
            "fullWidthHalfMaximum:oxygenIII5008:fixedWidth200:z0.5",
            "fullWidthHalfMaximum:oxygenIII5008:dispersionWidth:z0.5:recent",
            "diskMagnitudeAbsolute:SDSS_r:rest:z0.000:AB",
            "totalSpectralEnergyDistribution:1000_10000_5:observed:z2.000:snr10:noLines",
            "diskDustOpticalDepthCentral:dustCompendium",
            "diskStellarOpticalDepthISM:SDSS_r:z1.000:dustCharlotFall2000",
            "spheroidLineOpticalDepthClouds:balmerAlpha6565:SDSS_r:z1.000:dustCharlotFall2000",
            "spheroidLineOpticalDepthClouds:balmerAlpha6565:z1.000:dustCharlotFall2000",
            "diskLuminositiesStellar:z1.000:dustCompendium:A_V",
            "inclination",
            "observedRedshift",
        ];
        for text in names {
            let name = PropertyName::parse(text).unwrap();
            assert_eq!(name.to_string(), text);
        }
    }

    #[test]
    fn kinds() {
        let kind = |text: &str| PropertyName::parse(text).unwrap().kind();
        assert_eq!(kind("totalMetallicity"), Kind::Metallicity);
        assert_eq!(kind("totalStellarMetallicity"), Kind::PhaseMetallicity);
        assert_eq!(kind("totalMassGas"), Kind::Totals);
        assert_eq!(
            kind("diskLuminositiesStellar:z1.000:dustCalzetti:R_V"),
            Kind::DustParameter
        );
        assert_eq!(
            kind("diskLuminositiesStellar:V:rest:z1.000"),
            Kind::StellarLuminosity
        );
    }

    #[test]
    fn fields_are_typed() {
        let name = PropertyName::parse(
            "spheroidLineLuminosity:balmerAlpha6565:observed:SDSS_r:z1.000:dustCalzetti_Av0.5",
        )
        .unwrap();
        let PropertyName::LineLuminosity(line) = name else {
            panic!("expected a line luminosity");
        };
        assert_eq!(line.component, Component::Spheroid);
        assert_eq!(line.frame, Frame::Observed);
        assert_eq!(line.filter.as_deref(), Some("SDSS_r"));
        assert_eq!(line.redshift.value(), 1.0);
        assert!(!line.modifiers.recent());
        let Some(DustModel::Screen { law, av }) = line.modifiers.dust() else {
            panic!("expected a screen");
        };
        assert_eq!(*law, ScreenLaw::Calzetti);
        assert_eq!(av.as_ref().map(Number::value), Some(0.5));
    }

    #[test]
    fn unknown_and_malformed_names() {
        assert!(matches!(
            PropertyName::parse("diskMassStellar"),
            Err(Error::UnknownProperty(_))
        ));
        assert!(matches!(
            PropertyName::parse("diskLuminositiesStellar:SDSS_r:sideways:z1.0"),
            Err(Error::InvalidName { .. })
        ));
        assert!(matches!(
            PropertyName::parse("diskLuminositiesStellar:SDSS_r:rest:z1.0:recent:recent"),
            Err(Error::InvalidName { .. })
        ));
        assert!(matches!(
            PropertyName::parse("diskMagnitudeApparent:SDSS_r:rest:z1.0:vega:AB"),
            Err(Error::InvalidName { .. })
        ));
        assert!(matches!(
            PropertyName::parse("diskLuminositiesStellar::rest"),
            Err(Error::InvalidName { .. })
        ));
        assert!(matches!(
            PropertyName::parse("diskLymanContinuumLuminosity:z1.0:dustAtlas"),
            Err(Error::InvalidName { .. })
        ));
    }

    #[test]
    fn overlapping_kinds_are_ambiguous() {
        fn anything_total(i: &str) -> IResult<&str, PropertyName> {
            map(all_consuming(preceded(tag("total"), rest)), |q: &str| {
                PropertyName::BulgeToTotal {
                    quantity: q.to_string(),
                }
            })(i)
        }
        let parsers: [(Kind, Parser); 2] =
            [(Kind::Totals, totals), (Kind::BulgeToTotal, anything_total)];

        match resolve("totalMassStellar", &parsers) {
            Err(Error::AmbiguousName { kinds, .. }) => {
                assert_eq!(kinds, vec!["Totals", "BulgeToTotal"])
            }
            other => panic!("expected an ambiguous name, found {other:?}"),
        }
        assert!(resolve("totalMassStellar", &parsers[..1]).is_ok());
    }

    #[test]
    fn recent_goes_before_dust() {
        let modifiers = Modifiers::new(vec![Modifier::Dust(DustModel::Atlas)]);
        assert_eq!(modifiers.with_recent().to_string(), ":recent:dustAtlas");
        assert_eq!(modifiers.without_dust().to_string(), "");
    }
}
