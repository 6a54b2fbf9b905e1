use crate::model::Coordinate;

/// A preset location offered in the city list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn coordinate(&self) -> Coordinate {
        // Catalog values are in range.
        Coordinate::new_unchecked(self.latitude, self.longitude)
    }
}

pub const CITIES: &[City] = &[
    City { name: "Rijeka", latitude: 45.3271, longitude: 14.4422 },
    City { name: "Zagreb", latitude: 45.8150, longitude: 15.9819 },
    City { name: "Split", latitude: 43.5081, longitude: 16.4402 },
    City { name: "New York", latitude: 40.7128, longitude: -74.0060 },
];

/// Case-insensitive lookup in [`CITIES`].
pub fn find_city(name: &str) -> Option<&'static City> {
    let name = name.trim();
    CITIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_city_has_a_valid_coordinate() {
        for city in CITIES {
            let checked = Coordinate::new(city.latitude, city.longitude);
            assert_eq!(checked.ok(), Some(city.coordinate()), "{}", city.name);
        }
    }

    #[test]
    fn find_city_ignores_case_and_whitespace() {
        assert_eq!(find_city("zagreb").map(|c| c.name), Some("Zagreb"));
        assert_eq!(find_city("  NEW YORK ").map(|c| c.name), Some("New York"));
        assert!(find_city("Atlantis").is_none());
    }
}
