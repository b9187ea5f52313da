use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::{Household, HouseholdId, SIM_ID_BASE};

const NAMES: &[&str] = &[
    "Johnson Family",
    "Garcia Residence",
    "Smart Home Hub",
    "Eco Cottage",
    "Maple Apartment Complex",
    "Riverside Duplex",
    "Corner Coffee Shop",
    "Patel Household",
    "Green Tech Villa",
    "Nguyen Family",
    "Downtown Office Suite",
    "Oak Street Condo",
];

const STREETS: &[&str] = &[
    "Maple Ave", "Oak St", "Pine Rd", "Cedar Ln", "Elm Dr", "Birch Way", "Willow Ct",
];

/// Generate `count` simulated households with ids from [`SIM_ID_BASE`].
pub fn seed_households(count: usize, seed: u64) -> Vec<Household> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let name = NAMES[i % NAMES.len()];
            let name = if i < NAMES.len() {
                name.to_string()
            } else {
                format!("{name} {}", i / NAMES.len() + 1)
            };
            let has_battery = rng.gen_bool(0.75);
            Household {
                id: SIM_ID_BASE + i as HouseholdId,
                name,
                address: format!(
                    "{} {}",
                    rng.gen_range(1..400),
                    STREETS[rng.gen_range(0..STREETS.len())]
                ),
                solar_capacity_kw: (rng.gen_range(2.0..10.0_f64) * 10.0).round() / 10.0,
                battery_capacity_kwh: if has_battery {
                    [5.0, 10.0, 13.5, 20.0][rng.gen_range(0..4)]
                } else {
                    0.0
                },
                current_battery_level_pct: if has_battery {
                    rng.gen_range(10.0..95.0_f64).round()
                } else {
                    0.0
                },
                is_online: true,
            }
        })
        .collect()
}
