use std::collections::BTreeSet;

use serde::Deserialize;

use crate::form::{FormError, FormResult};

const BUILTIN_LOCATIONS: &str = include_str!("../../data/locations.toml");

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Region {
    pub code: String,
    pub name: String,
    pub cities: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Country {
    pub code: String,
    pub name: String,
    /// International calling code including the leading `+`.
    pub dial_code: String,
    /// Digits expected after the dial code.
    pub national_digits: usize,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl Country {
    pub fn region(&self, code: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.code == code)
    }
}

/// Enabled flags and option lists of the dependent selects, derived from the parents.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Cascade {
    pub state_enabled: bool,
    pub state_options: Vec<String>,
    pub city_enabled: bool,
    pub city_options: Vec<String>,
}

impl Cascade {
    pub fn offers_state(&self, state: &str) -> bool {
        self.state_enabled && self.state_options.iter().any(|option| option == state)
    }

    pub fn offers_city(&self, city: &str) -> bool {
        self.city_enabled && self.city_options.iter().any(|option| option == city)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct LocationDataset {
    countries: Vec<Country>,
}

impl LocationDataset {
    pub fn builtin() -> FormResult<Self> {
        Self::from_toml_str(BUILTIN_LOCATIONS)
    }

    pub fn from_toml_str(source: &str) -> FormResult<Self> {
        let dataset: Self =
            toml::from_str(source).map_err(|error| FormError::DatasetInvalid(error.to_string()))?;
        dataset.check()?;
        Ok(dataset)
    }

    fn check(&self) -> FormResult<()> {
        let mut country_codes = BTreeSet::new();
        for country in &self.countries {
            if country.code.is_empty() || !country_codes.insert(country.code.as_str()) {
                return Err(FormError::DatasetInvalid(format!(
                    "duplicate or empty country code {:?}",
                    country.code
                )));
            }
            let digits = country.dial_code.strip_prefix('+').unwrap_or_default();
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(FormError::DatasetInvalid(format!(
                    "country {} has malformed dial code {:?}",
                    country.code, country.dial_code
                )));
            }
            if country.national_digits == 0 {
                return Err(FormError::DatasetInvalid(format!(
                    "country {} must expect at least one national digit",
                    country.code
                )));
            }
            let mut region_codes = BTreeSet::new();
            for region in &country.regions {
                if region.code.is_empty() || !region_codes.insert(region.code.as_str()) {
                    return Err(FormError::DatasetInvalid(format!(
                        "duplicate or empty region code {:?} in {}",
                        region.code, country.code
                    )));
                }
                let mut city_names = BTreeSet::new();
                for city in &region.cities {
                    if city.is_empty() || !city_names.insert(city.as_str()) {
                        return Err(FormError::DatasetInvalid(format!(
                            "duplicate or empty city {:?} in {}/{}",
                            city, country.code, region.code
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn country_codes(&self) -> Vec<String> {
        self.countries
            .iter()
            .map(|country| country.code.clone())
            .collect()
    }

    pub fn country(&self, code: &str) -> Option<&Country> {
        self.countries.iter().find(|country| country.code == code)
    }

    pub fn region(&self, country: &str, region: &str) -> Option<&Region> {
        self.country(country)?.region(region)
    }

    pub fn region_codes(&self, country: &str) -> Vec<String> {
        self.country(country)
            .map(|country| {
                country
                    .regions
                    .iter()
                    .map(|region| region.code.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn city_names(&self, country: &str, region: &str) -> Vec<String> {
        self.region(country, region)
            .map(|region| region.cities.clone())
            .unwrap_or_default()
    }

    pub fn cascade(&self, country: &str, state: &str) -> Cascade {
        let state_enabled = !country.is_empty();
        let state_options = if state_enabled {
            self.region_codes(country)
        } else {
            Vec::new()
        };
        let city_enabled =
            state_enabled && !state.is_empty() && state_options.iter().any(|code| code == state);
        let city_options = if city_enabled {
            self.city_names(country, state)
        } else {
            Vec::new()
        };
        Cascade {
            state_enabled,
            state_options,
            city_enabled,
            city_options,
        }
    }
}
