use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::json;
use sweep_core::burnin::build_burnin_grid;
use sweep_core::contract::{ModificationUnit, SweepEntry, LARVAL_HABITAT_PARAM, RUN_NUMBER_PARAM};
use sweep_core::packages::InterventionPackages;
use sweep_core::sweep::combine;

fn tagged_unit(label: String) -> ModificationUnit {
    ModificationUnit::update_params([(label, json!(true))])
}

fn continuations(count: usize) -> Vec<SweepEntry> {
    (0..count)
        .map(|index| SweepEntry::new(vec![tagged_unit(format!("cont_{index}"))]))
        .collect()
}

fn packages(sizes: &[usize]) -> InterventionPackages {
    InterventionPackages::from_vec(
        sizes
            .iter()
            .enumerate()
            .map(|(package, &size)| {
                let units = (0..size)
                    .map(|unit| tagged_unit(format!("pkg_{package}_{unit}")))
                    .collect();
                (package.to_string(), units)
            })
            .collect(),
    )
}

proptest! {
    #[test]
    fn combine_size_is_product_of_inputs(
        continuation_count in 0usize..12,
        package_sizes in proptest::collection::vec(0usize..4, 0..8),
    ) {
        let continuations = continuations(continuation_count);
        let packages = packages(&package_sizes);

        let sweep = combine(&continuations, &packages).expect("sweep");
        prop_assert_eq!(sweep.len(), continuation_count * package_sizes.len());
    }

    #[test]
    fn every_entry_is_continuation_then_package(
        continuation_count in 1usize..8,
        package_sizes in proptest::collection::vec(0usize..4, 1..6),
    ) {
        let continuations = continuations(continuation_count);
        let packages = packages(&package_sizes);
        let package_units: Vec<&[ModificationUnit]> = packages.values().collect();

        let sweep = combine(&continuations, &packages).expect("sweep");
        for (index, entry) in sweep.iter().enumerate() {
            let continuation = &continuations[index / package_units.len()];
            let package = package_units[index % package_units.len()];

            let mut expected = continuation.units().to_vec();
            expected.extend_from_slice(package);
            prop_assert_eq!(entry.units(), expected.as_slice());
        }
    }

    #[test]
    fn burnin_grid_covers_each_pair_once(
        replicate_count in 0u32..6,
        exponent_steps in proptest::collection::hash_set(-30i32..30, 0..10),
    ) {
        let exponents: Vec<f64> = exponent_steps.iter().map(|&step| f64::from(step) / 10.0).collect();

        let grid = build_burnin_grid(replicate_count, &exponents, 3650).expect("grid");
        prop_assert_eq!(grid.len(), replicate_count as usize * exponents.len());

        let pairs: HashSet<String> = grid
            .iter()
            .map(|entry| {
                format!(
                    "{:?}/{:?}",
                    entry.param(RUN_NUMBER_PARAM),
                    entry.param(LARVAL_HABITAT_PARAM)
                )
            })
            .collect();
        prop_assert_eq!(pairs.len(), grid.len());
    }
}
