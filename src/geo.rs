use serde::Serialize;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Serialize, Debug, Clone)]
pub struct FoodBank {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub contact: &'static str,
}

#[derive(Serialize, Debug, Clone)]
pub struct NearbyFoodBank {
    #[serde(flatten)]
    pub bank: FoodBank,
    /// Great-circle distance from the query point, rounded to two decimals.
    pub distance_km: f64,
}

/// Static reference table; read-only for the lifetime of the process.
pub static FOOD_BANKS: &[FoodBank] = &[
    FoodBank {
        name: "Hyderabad Food Bank",
        lat: 17.385044,
        lng: 78.486671,
        contact: "123-456-7890",
    },
    FoodBank {
        name: "Telangana Charity Kitchen",
        lat: 17.450000,
        lng: 78.500000,
        contact: "987-654-3210",
    },
    FoodBank {
        name: "Sreyas Community Pantry",
        lat: 17.400000,
        lng: 78.490000,
        contact: "456-789-1234",
    },
];

/// Great-circle distance in kilometers between two (lat, lng) points,
/// computed with the haversine formula.
pub fn haversine(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Every food bank within `radius_km` of the query point, annotated with its
/// distance and sorted nearest first. Always total: a negative radius simply
/// matches nothing.
pub fn find_nearby(lat: f64, lng: f64, radius_km: f64) -> Vec<NearbyFoodBank> {
    let mut nearby: Vec<NearbyFoodBank> = FOOD_BANKS
        .iter()
        .filter_map(|bank| {
            let distance = haversine(lat, lng, bank.lat, bank.lng);
            (distance <= radius_km).then(|| NearbyFoodBank {
                bank: bank.clone(),
                distance_km: (distance * 100.0).round() / 100.0,
            })
        })
        .collect();
    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}
