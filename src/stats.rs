//! Statistics aggregation: a pure fold over trip rows.
//!
//! Snapshots are derived per request and never persisted. The fold is
//! commutative, so callers may hand trips over in any order.

use serde::Serialize;

use crate::trips::repo::Trip;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    #[serde(rename = "totalTrips")]
    pub total_trips: u64,
    #[serde(rename = "totalDistanceKm")]
    pub total_distance_km: f64,
    #[serde(rename = "totalDurationSeconds")]
    pub total_duration_seconds: f64,
    #[serde(rename = "totalEmissionsCO2eKg")]
    pub total_emissions_co2e_kg: f64,
    #[serde(rename = "totalEmissionsSavingsCO2eKg")]
    pub total_emissions_savings_co2e_kg: f64,
    #[serde(rename = "totalCostNOK")]
    pub total_cost_nok: f64,
    #[serde(rename = "totalSavingsNOK")]
    pub total_savings_nok: f64,
}

/// Sum every metric field across the given trips. An empty input yields the
/// all-zero snapshot.
pub fn summarize<'a, I>(trips: I) -> StatisticsSnapshot
where
    I: IntoIterator<Item = &'a Trip>,
{
    trips
        .into_iter()
        .fold(StatisticsSnapshot::default(), |mut acc, trip| {
            acc.total_trips += 1;
            acc.total_distance_km += trip.distance_km;
            acc.total_duration_seconds += trip.duration_seconds;
            acc.total_emissions_co2e_kg += trip.emissions_co2e_kg;
            acc.total_emissions_savings_co2e_kg += trip.saved_emissions_co2e_kg;
            acc.total_cost_nok += trip.cost_nok;
            acc.total_savings_nok += trip.saved_cost_nok;
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn trip(distance_km: f64, duration: f64, emissions: f64, saved: f64, cost: f64) -> Trip {
        Trip {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            origin: "A".into(),
            destination: "B".into(),
            travel_mode: "bike".into(),
            vehicle_id: None,
            distance_km,
            duration_seconds: duration,
            emissions_co2e_kg: emissions,
            saved_emissions_co2e_kg: saved,
            cost_nok: cost,
            saved_cost_nok: cost / 2.0,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn empty_input_yields_all_zero_snapshot() {
        let snapshot = summarize([]);
        assert_eq!(snapshot, StatisticsSnapshot::default());
        assert_eq!(snapshot.total_trips, 0);
        assert_eq!(snapshot.total_distance_km, 0.0);
    }

    #[test]
    fn totals_equal_per_field_sums() {
        let trips = vec![
            trip(10.0, 1800.0, 1.18, 0.0, 20.0),
            trip(2.5, 600.0, 0.0, 0.295, 0.0),
            trip(7.5, 2400.0, 0.6675, 0.2175, 9.0),
        ];
        let snapshot = summarize(&trips);
        assert_eq!(snapshot.total_trips, 3);
        assert!((snapshot.total_distance_km - 20.0).abs() < 1e-9);
        assert!((snapshot.total_duration_seconds - 4800.0).abs() < 1e-9);
        assert!((snapshot.total_emissions_co2e_kg - 1.8475).abs() < 1e-9);
        assert!((snapshot.total_emissions_savings_co2e_kg - 0.5125).abs() < 1e-9);
        assert!((snapshot.total_cost_nok - 29.0).abs() < 1e-9);
        assert!((snapshot.total_savings_nok - 14.5).abs() < 1e-9);
    }

    #[test]
    fn order_does_not_affect_the_result() {
        let mut trips: Vec<Trip> = (1..=20)
            .map(|i| {
                let km = f64::from(i);
                trip(km, km * 120.0, km * 0.089, km * 0.029, km * 1.2)
            })
            .collect();

        let sorted = summarize(&trips);
        trips.shuffle(&mut rand::thread_rng());
        let shuffled = summarize(&trips);

        assert_eq!(sorted.total_trips, shuffled.total_trips);
        assert!((sorted.total_distance_km - shuffled.total_distance_km).abs() < 1e-9);
        assert!((sorted.total_emissions_co2e_kg - shuffled.total_emissions_co2e_kg).abs() < 1e-9);
        assert!(
            (sorted.total_emissions_savings_co2e_kg - shuffled.total_emissions_savings_co2e_kg)
                .abs()
                < 1e-9
        );
        assert!((sorted.total_cost_nok - shuffled.total_cost_nok).abs() < 1e-9);
    }

    #[test]
    fn snapshot_serializes_with_camel_case_fields() {
        let json = serde_json::to_string(&summarize([])).unwrap();
        assert!(json.contains("totalTrips"));
        assert!(json.contains("totalEmissionsSavingsCO2eKg"));
        assert!(json.contains("totalSavingsNOK"));
    }
}
