//! Bucket index invariants over generated distributions

use solid_ldes::bucketing::{Bucket, BucketIndex, Capacity, Member, Millis};

/// Small deterministic generator so failures are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

fn random_index(seed: u64) -> BucketIndex {
    let mut rng = Lcg(seed);
    let mut index = BucketIndex::new(0);
    for _ in 0..rng.next(5) {
        index.add_bucket(rng.next(10_000) as Millis + 1);
    }
    for n in 0..rng.next(60) {
        // clustered timestamps so some buckets overflow badly
        let ts = if rng.next(3) == 0 { 5_000 } else { rng.next(20_000) as Millis };
        index.add_member(Member::new(format!("m{}", n), ts)).unwrap();
    }
    index
}

fn assert_invariants(index: &BucketIndex) {
    assert!(index.boundaries().windows(2).all(|w| w[0] < w[1]), "{:?}", index.boundaries());
    for bucket in index.buckets() {
        assert!(bucket.members().iter().all(|m| m.timestamp >= bucket.boundary()));
        assert!(bucket.members().windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}

#[test]
fn test_rebalance_preserves_members_and_order() {
    for seed in 0..200 {
        let mut index = random_index(seed);
        let mut before: Vec<String> =
            index.buckets().iter().flat_map(Bucket::members).map(|m| m.id.clone()).collect();
        before.sort();

        let capacity = 1 + (seed % 7) as usize;
        index.rebalance(Capacity::Bounded(capacity));

        let mut after: Vec<String> =
            index.buckets().iter().flat_map(Bucket::members).map(|m| m.id.clone()).collect();
        after.sort();
        assert_eq!(before, after, "seed {}", seed);
        assert_invariants(&index);
    }
}

#[test]
fn test_overflowing_buckets_have_no_legal_neighbour() {
    for seed in 0..200 {
        let mut index = random_index(seed);
        let capacity = 1 + (seed % 5) as usize;
        index.rebalance(Capacity::Bounded(capacity));

        let buckets = index.buckets();
        for (j, bucket) in buckets.iter().enumerate() {
            if bucket.len() <= capacity {
                continue;
            }
            if j > 0 {
                assert!(buckets[j - 1].len() >= capacity, "seed {}: previous has room", seed);
            }
            if let Some(next) = buckets.get(j + 1) {
                let movable = bucket.members().iter().any(|m| m.timestamp >= next.boundary());
                assert!(next.len() >= capacity || !movable, "seed {}: next has room", seed);
            }
        }
    }
}

#[test]
fn test_rebalance_is_idempotent() {
    for seed in 0..50 {
        let mut index = random_index(seed);
        index.rebalance(Capacity::Bounded(3));
        let layout = index.boundaries();

        let second = index.rebalance(Capacity::Bounded(3));
        assert!(second.is_empty(), "seed {}: {:?}", seed, second);
        assert_eq!(index.boundaries(), layout);
    }
}

#[test]
fn test_assign_after_rebalance_uses_new_buckets() {
    let mut index = BucketIndex::new(0);
    for n in 0..6 {
        index.add_member(Member::new(format!("m{}", n), n * 10)).unwrap();
    }
    index.rebalance(Capacity::Bounded(2));

    assert_eq!(index.boundaries(), vec![0, 20, 40]);
    assert_eq!(index.assign(35).unwrap(), 20);
    assert_eq!(index.assign(1_000).unwrap(), 40);
}
