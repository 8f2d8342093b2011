mod common;

use common::{DenyList, POLICY, endpoints, ids, store};
use proptest::prelude::*;
use scadb::prelude::*;
use std::collections::BTreeSet;

const POOL: [&str; 5] = ["001", "002", "003", "009", "042"];
const KNOWN: [&str; 3] = ["001", "002", "003"];

// Checks and totals each known endpoint contributes for an unfiltered query.
fn expected_checks(endpoint: &str) -> (Vec<i64>, u64) {
    match endpoint {
        "001" => (vec![1, 2], 2),
        "002" => (vec![7], 1),
        _ => (Vec::new(), 0),
    }
}

fn endpoint_list() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(POOL.to_vec()), 0..8)
}

proptest! {
    #[test]
    fn check_batch_sums_known_totals_and_fails_unknown_endpoints(list in endpoint_list()) {
        let sca = Sca::new(store(), endpoints(&KNOWN), AllowAll);
        let batch: Vec<EndpointId> = list.iter().copied().map(EndpointId::from).collect();

        let envelope = sca
            .get_enriched_checks_batch(&PolicyId::new(POLICY), &batch, &QuerySpec::new())
            .unwrap();

        let mut items = Vec::new();
        let mut total = 0;
        for endpoint in list.iter().copied().filter(|e| KNOWN.contains(e)) {
            let (checks, count) = expected_checks(endpoint);
            items.extend(checks);
            total += count;
        }
        let unknown: BTreeSet<EndpointId> = list
            .iter()
            .copied()
            .filter(|e| !KNOWN.contains(e))
            .map(EndpointId::new)
            .collect();

        prop_assert_eq!(ids(envelope.affected_items()), items);
        prop_assert_eq!(envelope.total_affected_items(), total);
        prop_assert_eq!(
            envelope.failed_items().keys().cloned().collect::<BTreeSet<_>>(),
            unknown
        );
        prop_assert!(envelope.failed_items().values().all(FailedItem::is_resource_not_found));
    }

    #[test]
    fn denied_endpoints_never_reach_the_envelope(
        list in endpoint_list(),
        denied in prop::sample::subsequence(POOL.to_vec(), 0..=POOL.len()),
    ) {
        let sca = Sca::new(store(), endpoints(&KNOWN), DenyList::endpoints(&denied));
        let batch: Vec<EndpointId> = list.iter().copied().map(EndpointId::from).collect();

        let envelope = sca.get_policies_batch(&batch, &QuerySpec::new()).unwrap();

        let allowed: Vec<&str> = list.iter().copied().filter(|e| !denied.contains(e)).collect();
        let with_policy = allowed.iter().filter(|e| ["001", "002"].contains(*e)).count() as u64;

        prop_assert_eq!(envelope.total_affected_items(), with_policy);
        prop_assert_eq!(envelope.affected_items().len() as u64, with_policy);
        prop_assert!(
            envelope
                .failed_items()
                .keys()
                .all(|e| !denied.contains(&e.as_str()) && !KNOWN.contains(&e.as_str()))
        );
    }
}
