//! Location model for geocoded places

use serde::{Deserialize, Serialize};

/// A geocoded place candidate
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Place name (city, town, village, ...)
    pub name: String,
    /// Country name
    pub country: String,
    /// First-level administrative region (state, province, ...)
    pub admin_region: Option<String>,
    /// Country code (ISO 3166-1 alpha-2)
    pub country_code: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Location {
    /// Create a location without region or country details
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            name,
            country: String::new(),
            admin_region: None,
            country_code: String::new(),
            latitude,
            longitude,
        }
    }

    /// Flag emoji built from the country code, empty when the code is not two letters
    #[must_use]
    pub fn flag(&self) -> String {
        let code = self.country_code.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return String::new();
        }

        code.chars()
            .filter_map(|c| {
                let offset = u32::from(c.to_ascii_uppercase()) - u32::from('A');
                char::from_u32(0x1F1E6 + offset)
            })
            .collect()
    }

    /// Region shown next to the name: admin region, falling back to the country
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.admin_region
            .as_deref()
            .filter(|r| !r.is_empty())
            .or_else(|| Some(self.country.as_str()).filter(|c| !c.is_empty()))
    }

    /// One line of the suggestion list: `<flag> <name>, <region>`
    #[must_use]
    pub fn suggestion_label(&self) -> String {
        let flag = self.flag();
        let place = match self.region() {
            Some(region) => format!("{}, {}", self.name, region),
            None => self.name.clone(),
        };

        if flag.is_empty() {
            place
        } else {
            format!("{flag} {place}")
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
