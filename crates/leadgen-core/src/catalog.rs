//! Location catalog used to expand a niche into searches.
//!
//! The built-in catalog is a compiled-in table of UK cities (by descending
//! prominence) and counties. A YAML file with the same shape can replace it
//! at startup; either way the catalog is immutable once loaded.

use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Number of leading cities treated as top-tier when ordering searches.
pub const DEFAULT_TOP_TIER: usize = 20;

const CITIES: &[&str] = &[
    "London",
    "Birmingham",
    "Manchester",
    "Leeds",
    "Glasgow",
    "Liverpool",
    "Newcastle",
    "Sheffield",
    "Bristol",
    "Edinburgh",
    "Leicester",
    "Nottingham",
    "Cardiff",
    "Belfast",
    "Coventry",
    "Bradford",
    "Stoke-on-Trent",
    "Southampton",
    "Portsmouth",
    "Brighton",
    "Plymouth",
    "Derby",
    "Wolverhampton",
    "Reading",
    "Hull",
    "Preston",
    "Aberdeen",
    "Swansea",
    "Milton Keynes",
    "Northampton",
    "Luton",
    "Norwich",
    "Sunderland",
    "York",
    "Oxford",
    "Cambridge",
    "Exeter",
    "Bath",
    "Ipswich",
    "Peterborough",
    "Gloucester",
    "Chester",
    "Worcester",
    "Lincoln",
    "Dundee",
    "Inverness",
    "Stirling",
    "Perth",
    "Wakefield",
    "Salisbury",
    "Canterbury",
    "Carlisle",
    "Lancaster",
    "Durham",
    "Winchester",
    "Chelmsford",
    "Colchester",
    "St Albans",
    "Hereford",
    "Truro",
    "Wells",
    "Ely",
    "Ripon",
    "Lichfield",
    "Newport",
    "Bangor",
    "Wrexham",
    "Armagh",
    "Lisburn",
    "Newry",
    "Bournemouth",
    "Blackpool",
    "Middlesbrough",
    "Huddersfield",
    "Bolton",
    "Stockport",
    "Warrington",
    "Swindon",
    "Slough",
    "Watford",
    "Crawley",
    "Basildon",
    "Southend-on-Sea",
    "Maidstone",
    "Cheltenham",
    "Harrogate",
    "Doncaster",
    "Rotherham",
    "Barnsley",
    "Telford",
    "Poole",
    "Eastbourne",
    "Hastings",
    "Guildford",
    "Woking",
    "Torquay",
    "King's Lynn",
];

const COUNTIES: &[&str] = &[
    "Greater London",
    "West Midlands",
    "Greater Manchester",
    "West Yorkshire",
    "Merseyside",
    "South Yorkshire",
    "Tyne and Wear",
    "Kent",
    "Essex",
    "Surrey",
    "Hampshire",
    "Lancashire",
    "Devon",
    "Cornwall",
    "Dorset",
    "Somerset",
    "Norfolk",
    "Suffolk",
    "Cambridgeshire",
    "Oxfordshire",
    "Berkshire",
    "Buckinghamshire",
    "Hertfordshire",
    "Bedfordshire",
    "Northamptonshire",
    "Leicestershire",
    "Nottinghamshire",
    "Derbyshire",
    "Lincolnshire",
    "Staffordshire",
    "Shropshire",
    "Cheshire",
    "Cumbria",
    "Northumberland",
    "County Durham",
    "North Yorkshire",
    "East Riding of Yorkshire",
    "Gloucestershire",
    "Wiltshire",
    "Worcestershire",
    "Warwickshire",
    "Herefordshire",
    "East Sussex",
    "West Sussex",
    "Isle of Wight",
    "Rutland",
    "Bristol",
    "Fife",
    "Lothian",
    "Highland",
    "Aberdeenshire",
    "Argyll and Bute",
    "Ayrshire",
    "Lanarkshire",
    "Gwynedd",
    "Powys",
    "Pembrokeshire",
    "Carmarthenshire",
    "Glamorgan",
    "Monmouthshire",
    "County Antrim",
    "County Down",
    "County Armagh",
    "County Tyrone",
    "County Fermanagh",
];

static BUILTIN: LazyLock<LocationCatalog> = LazyLock::new(|| LocationCatalog {
    cities: CITIES.iter().map(|c| (*c).to_string()).collect(),
    counties: COUNTIES.iter().map(|c| (*c).to_string()).collect(),
    top_tier: DEFAULT_TOP_TIER,
});

/// Ordered city and county names plus the size of the top tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCatalog {
    pub cities: Vec<String>,
    pub counties: Vec<String>,
    #[serde(default = "default_top_tier")]
    pub top_tier: usize,
}

fn default_top_tier() -> usize {
    DEFAULT_TOP_TIER
}

impl LocationCatalog {
    /// The compiled-in UK catalog.
    #[must_use]
    pub fn builtin() -> &'static LocationCatalog {
        &BUILTIN
    }

    /// Build a catalog from explicit lists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if either list is empty.
    pub fn new(
        cities: Vec<String>,
        counties: Vec<String>,
        top_tier: usize,
    ) -> Result<Self, ConfigError> {
        let catalog = Self {
            cities,
            counties,
            top_tier,
        };
        validate_catalog(&catalog)?;
        Ok(catalog)
    }

    /// Replace the top-tier size, keeping the lists.
    #[must_use]
    pub fn with_top_tier(mut self, top_tier: usize) -> Self {
        self.top_tier = top_tier;
        self
    }

    /// Lower-cased names of the leading `top_tier` cities.
    ///
    /// Shorter catalogs yield every city.
    #[must_use]
    pub fn top_tier_cities(&self) -> Vec<String> {
        self.cities
            .iter()
            .take(self.top_tier)
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

/// Load and validate a location catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<LocationCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog: LocationCatalog =
        serde_yaml::from_str(&content).map_err(ConfigError::CatalogFileParse)?;

    validate_catalog(&catalog)?;

    Ok(catalog)
}

fn validate_catalog(catalog: &LocationCatalog) -> Result<(), ConfigError> {
    if catalog.cities.is_empty() {
        return Err(ConfigError::Validation(
            "catalog must list at least one city".to_string(),
        ));
    }
    if catalog.counties.is_empty() {
        return Err(ConfigError::Validation(
            "catalog must list at least one county".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builtin_catalog_is_non_empty() {
        let catalog = LocationCatalog::builtin();
        assert!(!catalog.cities.is_empty());
        assert!(!catalog.counties.is_empty());
        assert_eq!(catalog.top_tier, DEFAULT_TOP_TIER);
        assert!(validate_catalog(catalog).is_ok());
    }

    #[test]
    fn builtin_top_tier_starts_with_london() {
        let top = LocationCatalog::builtin().top_tier_cities();
        assert_eq!(top.len(), DEFAULT_TOP_TIER);
        assert_eq!(top[0], "london");
        assert!(!top.contains(&"bath".to_string()));
    }

    #[test]
    fn top_tier_is_capped_by_city_count() {
        let catalog = LocationCatalog::new(
            vec!["Leeds".to_string(), "York".to_string()],
            vec!["Kent".to_string()],
            20,
        )
        .unwrap();
        assert_eq!(catalog.top_tier_cities(), vec!["leeds", "york"]);
    }

    #[test]
    fn with_top_tier_overrides_size() {
        let catalog = LocationCatalog::builtin().clone().with_top_tier(3);
        assert_eq!(
            catalog.top_tier_cities(),
            vec!["london", "birmingham", "manchester"]
        );
    }

    #[test]
    fn new_rejects_empty_cities() {
        let err = LocationCatalog::new(vec![], vec!["Kent".to_string()], 20).unwrap_err();
        assert!(err.to_string().contains("at least one city"));
    }

    #[test]
    fn new_rejects_empty_counties() {
        let err = LocationCatalog::new(vec!["Leeds".to_string()], vec![], 20).unwrap_err();
        assert!(err.to_string().contains("at least one county"));
    }

    #[test]
    fn load_catalog_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "cities:\n  - Leeds\n  - York\ncounties:\n  - North Yorkshire\ntop_tier: 1"
        )
        .unwrap();

        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.cities, vec!["Leeds", "York"]);
        assert_eq!(catalog.counties, vec!["North Yorkshire"]);
        assert_eq!(catalog.top_tier, 1);
    }

    #[test]
    fn load_catalog_defaults_top_tier() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cities: [Leeds]\ncounties: [Kent]").unwrap();

        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.top_tier, DEFAULT_TOP_TIER);
    }

    #[test]
    fn load_catalog_rejects_empty_counties() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cities: [Leeds]\ncounties: []").unwrap();

        let err = load_catalog(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn load_catalog_missing_file_is_io_error() {
        let err = load_catalog(Path::new("/nonexistent/catalog.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::CatalogFileIo { .. }));
    }

    #[test]
    fn load_catalog_malformed_yaml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cities: [Leeds\ncounties").unwrap();

        let err = load_catalog(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::CatalogFileParse(_)));
    }
}
