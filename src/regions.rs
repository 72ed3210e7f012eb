/// GLOBE region registry.
///
/// Maps each GLOBE Program region to the country names used in the
/// `COUNTRY` column of the country-enriched ArcGIS layers. This is the single
/// source of truth for region filtering; callers should resolve regions here
/// rather than hardcoding country lists.

use crate::model::GoError;

// ---------------------------------------------------------------------------
// Region metadata
// ---------------------------------------------------------------------------

/// A GLOBE region and the countries it encloses.
pub struct Region {
    pub name: &'static str,
    pub countries: &'static [&'static str],
}

/// All GLOBE regions.
///
/// Country names follow the spelling of the ArcGIS `COUNTRY` attribute.
pub static REGION_REGISTRY: &[Region] = &[
    Region {
        name: "Africa",
        countries: &[
            "Benin",
            "Botswana",
            "Burkina Faso",
            "Cameroon",
            "Cape Verde",
            "Chad",
            "Congo",
            "Cote d'Ivoire",
            "Ethiopia",
            "Gabon",
            "Gambia",
            "Ghana",
            "Guinea",
            "Kenya",
            "Liberia",
            "Madagascar",
            "Mali",
            "Mauritius",
            "Namibia",
            "Niger",
            "Nigeria",
            "Rwanda",
            "Senegal",
            "Seychelles",
            "South Africa",
            "Tanzania",
            "Togo",
            "Uganda",
            "Zambia",
        ],
    },
    Region {
        name: "Asia and Pacific",
        countries: &[
            "Australia",
            "Bangladesh",
            "Fiji",
            "India",
            "Japan",
            "Marshall Islands",
            "Micronesia",
            "Mongolia",
            "Nepal",
            "New Zealand",
            "Palau",
            "Philippines",
            "South Korea",
            "Sri Lanka",
            "Taiwan",
            "Thailand",
            "Vietnam",
        ],
    },
    Region {
        name: "Europe and Eurasia",
        countries: &[
            "Armenia",
            "Austria",
            "Belgium",
            "Bulgaria",
            "Croatia",
            "Cyprus",
            "Czech Republic",
            "Denmark",
            "Estonia",
            "Finland",
            "France",
            "Georgia",
            "Germany",
            "Greece",
            "Hungary",
            "Ireland",
            "Italy",
            "Kazakhstan",
            "Kyrgyzstan",
            "Latvia",
            "Liechtenstein",
            "Lithuania",
            "Luxembourg",
            "Macedonia",
            "Malta",
            "Moldova",
            "Montenegro",
            "Netherlands",
            "Norway",
            "Poland",
            "Portugal",
            "Romania",
            "Russia",
            "Serbia",
            "Slovakia",
            "Slovenia",
            "Spain",
            "Sweden",
            "Switzerland",
            "Turkey",
            "Ukraine",
            "United Kingdom",
        ],
    },
    Region {
        name: "Latin America and Caribbean",
        countries: &[
            "Argentina",
            "Bahamas",
            "Belize",
            "Bolivia",
            "Brazil",
            "Chile",
            "Colombia",
            "Costa Rica",
            "Dominican Republic",
            "Ecuador",
            "El Salvador",
            "Guatemala",
            "Guyana",
            "Honduras",
            "Jamaica",
            "Mexico",
            "Nicaragua",
            "Panama",
            "Paraguay",
            "Peru",
            "Puerto Rico",
            "Suriname",
            "Trinidad and Tobago",
            "Uruguay",
        ],
    },
    Region {
        name: "Near East and North Africa",
        countries: &[
            "Bahrain",
            "Egypt",
            "Jordan",
            "Kuwait",
            "Lebanon",
            "Morocco",
            "Oman",
            "Pakistan",
            "Qatar",
            "Saudi Arabia",
            "Tunisia",
            "United Arab Emirates",
        ],
    },
    Region {
        name: "North America",
        countries: &["United States", "Canada"],
    },
];

/// Returns the names of all regions.
pub fn all_region_names() -> Vec<&'static str> {
    REGION_REGISTRY.iter().map(|r| r.name).collect()
}

/// Looks up a region by name (case-insensitive). Returns `None` if not found.
pub fn find_region(name: &str) -> Option<&'static Region> {
    let name = name.trim();
    REGION_REGISTRY
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(name))
}

/// Union of the countries of all named regions, in registry order.
/// Fails on the first unknown region name.
pub fn countries_in_regions<S: AsRef<str>>(regions: &[S]) -> Result<Vec<&'static str>, GoError> {
    let mut countries = Vec::new();
    for name in regions {
        let region = find_region(name.as_ref())
            .ok_or_else(|| GoError::UnknownRegion(name.as_ref().to_string()))?;
        for country in region.countries {
            if !countries.contains(country) {
                countries.push(*country);
            }
        }
    }
    Ok(countries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
