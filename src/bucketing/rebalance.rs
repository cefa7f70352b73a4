//! Capacity-driven redistribution of members across buckets.
//!
//! Overflow of a bucket goes, in order, to the previous bucket (oldest members first), to the
//! next bucket (only members that may legally live there, newest first), and finally into
//! new buckets split off after the source. Every move is recorded so the caller can replay
//! it against storage.

use super::bucket_index::{Bucket, BucketIndex, Capacity, Member, Millis};

/// One member moving between buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub member: Member,
    pub from: Millis,
    pub to: Millis,
}

/// Everything a rebalance did, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebalancePlan {
    /// Boundaries of buckets created by splits
    pub created: Vec<Millis>,
    pub transfers: Vec<Transfer>,
}

impl RebalancePlan {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.transfers.is_empty()
    }
}

fn spare(bucket: &Bucket, capacity: usize) -> usize {
    capacity.saturating_sub(bucket.len())
}

impl BucketIndex {
    /// Redistribute members so no bucket holds more than `capacity`, where possible.
    ///
    /// The total number of members never changes and boundaries stay strictly increasing.
    pub fn rebalance(&mut self, capacity: Capacity) -> RebalancePlan {
        let mut plan = RebalancePlan::default();
        let Some(capacity) = capacity.limit() else {
            return plan;
        };
        let before = self.total_members();

        let mut i = 0;
        while i < self.buckets.len() {
            if self.buckets[i].len() <= capacity {
                i += 1;
                continue;
            }

            if i > 0 {
                let overflow = self.buckets[i].len() - capacity;
                let count = spare(&self.buckets[i - 1], capacity).min(overflow);
                self.move_oldest(i, i - 1, count, &mut plan);
            }

            if i + 1 < self.buckets.len() && self.buckets[i].len() > capacity {
                let overflow = self.buckets[i].len() - capacity;
                let next_boundary = self.buckets[i + 1].boundary;
                let eligible = self.buckets[i]
                    .members
                    .iter()
                    .rev()
                    .take_while(|m| m.timestamp >= next_boundary)
                    .count();
                let count = spare(&self.buckets[i + 1], capacity).min(overflow).min(eligible);
                self.move_newest(i, i + 1, count, &mut plan);
            }

            if self.buckets[i].len() > capacity {
                self.split(i, capacity, &mut plan);
            }
            // split buckets come next and are checked like any other
            i += 1;
        }

        assert_eq!(before, self.total_members(), "rebalance changed the member count");
        self.assert_ordered();

        if !plan.is_empty() {
            tracing::info!(
                created = plan.created.len(),
                transfers = plan.transfers.len(),
                buckets = self.buckets.len(),
                "rebalanced buckets"
            );
        }
        plan
    }

    fn move_oldest(&mut self, from: usize, to: usize, count: usize, plan: &mut RebalancePlan) {
        assert!(count <= self.buckets[from].len(), "negative transfer");
        let moved: Vec<Member> = self.buckets[from].members.drain(..count).collect();
        self.receive(from, to, moved, plan);
    }

    fn move_newest(&mut self, from: usize, to: usize, count: usize, plan: &mut RebalancePlan) {
        let len = self.buckets[from].len();
        assert!(count <= len, "negative transfer");
        let moved: Vec<Member> = self.buckets[from].members.drain(len - count..).collect();
        self.receive(from, to, moved, plan);
    }

    fn receive(&mut self, from: usize, to: usize, moved: Vec<Member>, plan: &mut RebalancePlan) {
        let (from_boundary, to_boundary) = (self.buckets[from].boundary, self.buckets[to].boundary);
        for member in moved {
            plan.transfers.push(Transfer {
                member: member.clone(),
                from: from_boundary,
                to: to_boundary,
            });
            self.buckets[to].insert_sorted(member);
        }
    }

    /// Split the overflow of bucket `i` into new buckets inserted right after it.
    fn split(&mut self, i: usize, capacity: usize, plan: &mut RebalancePlan) {
        let source = &self.buckets[i];
        let next_boundary = self.buckets.get(i + 1).map(|b| b.boundary);

        // chunk boundaries and where each chunk starts within the source members
        let mut chunks: Vec<(Millis, usize)> = Vec::new();
        let mut previous = source.boundary;
        // members are sorted, so everything past `capacity` is overflow
        let mut start = capacity;
        let mut end_of_split = source.len();
        while start < source.len() {
            // a new boundary must be strictly newer than the one before it
            let Some(offset) = source.members[start..].iter().position(|m| m.timestamp > previous)
            else {
                break;
            };
            let first = start + offset;
            let boundary = source.members[first].timestamp;
            if next_boundary.is_some_and(|next| boundary >= next) {
                end_of_split = first;
                break;
            }
            let end = (first + capacity).min(source.len());
            if end - first < self.min_split_size {
                end_of_split = first;
                break;
            }
            chunks.push((boundary, first));
            previous = boundary;
            start = end;
        }

        let Some(&(_, split_at)) = chunks.first() else {
            tracing::warn!(
                boundary = source.boundary,
                members = source.len(),
                capacity,
                "bucket overflows but cannot be split"
            );
            return;
        };

        let from_boundary = source.boundary;
        let mut tail: Vec<Member> = self.buckets[i].members.drain(split_at..).collect();
        // members past the last usable split point stay where they are
        let kept = tail.split_off(end_of_split - split_at);
        self.buckets[i].members.extend(kept);

        let mut created = Vec::with_capacity(chunks.len());
        for (n, (boundary, first)) in chunks.iter().enumerate() {
            let last = chunks.get(n + 1).map_or(end_of_split, |(_, next)| *next);
            let mut bucket = Bucket::new(*boundary);
            for member in &tail[first - split_at..last - split_at] {
                plan.transfers.push(Transfer {
                    member: member.clone(),
                    from: from_boundary,
                    to: *boundary,
                });
                bucket.members.push(member.clone());
            }
            created.push(bucket);
        }

        for (offset, bucket) in created.into_iter().enumerate() {
            tracing::info!(boundary = bucket.boundary, members = bucket.len(), "split bucket");
            plan.created.push(bucket.boundary);
            self.buckets.insert(i + 1 + offset, bucket);
        }
        if self.buckets[i].len() > capacity {
            tracing::warn!(
                boundary = from_boundary,
                members = self.buckets[i].len(),
                capacity,
                "bucket still overflows after split"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(layout: &[(Millis, &[Millis])]) -> BucketIndex {
        let mut index = BucketIndex::new(layout[0].0);
        for (boundary, _) in &layout[1..] {
            index.add_bucket(*boundary);
        }
        let mut n = 0;
        for (boundary, timestamps) in layout {
            for ts in *timestamps {
                let assigned = index.add_member(Member::new(format!("m{}", n), *ts)).unwrap();
                assert_eq!(assigned, *boundary);
                n += 1;
            }
        }
        index
    }

    fn sizes(index: &BucketIndex) -> Vec<usize> {
        index.buckets().iter().map(Bucket::len).collect()
    }

    #[test]
    fn test_overflow_moves_backward_first() {
        let mut index = filled(&[(0, &[5]), (100, &[110, 120, 130]), (200, &[210])]);
        let plan = index.rebalance(Capacity::Bounded(2));

        assert_eq!(sizes(&index), vec![2, 2, 1]);
        assert_eq!(plan.transfers.len(), 1);
        assert_eq!(plan.transfers[0].member.timestamp, 110);
        assert_eq!((plan.transfers[0].from, plan.transfers[0].to), (100, 0));
        assert!(plan.created.is_empty());
    }

    #[test]
    fn test_split_creates_buckets_after_source() {
        let mut index = filled(&[(0, &[0, 10, 20, 30, 40, 50, 60])]);
        let plan = index.rebalance(Capacity::Bounded(2));

        assert_eq!(index.boundaries(), vec![0, 20, 40, 60]);
        assert_eq!(sizes(&index), vec![2, 2, 2, 1]);
        assert_eq!(plan.created, vec![20, 40, 60]);
        assert_eq!(plan.transfers.len(), 5);
    }

    #[test]
    fn test_forward_transfer_only_for_legal_members() {
        // m at 250 sits in bucket 100 because bucket 200 was opened later
        let mut index = filled(&[(0, &[1, 2]), (100, &[110, 120]), (200, &[])]);
        index.buckets[1].insert_sorted(Member::new("late", 250));
        let plan = index.rebalance(Capacity::Bounded(2));

        assert_eq!(sizes(&index), vec![2, 2, 1]);
        assert_eq!(plan.transfers[0].member.id, "late");
        assert_eq!(plan.transfers[0].to, 200);
    }

    #[test]
    fn test_identical_timestamps_cannot_split() {
        let mut index = filled(&[(0, &[0, 0, 0])]);
        let plan = index.rebalance(Capacity::Bounded(1));

        assert!(plan.is_empty());
        assert_eq!(sizes(&index), vec![3]);
    }

    #[test]
    fn test_min_split_size_leaves_small_overflow() {
        let mut index = filled(&[(0, &[0, 10, 20])]).with_min_split_size(2);
        let plan = index.rebalance(Capacity::Bounded(2));

        assert!(plan.is_empty());
        assert_eq!(sizes(&index), vec![3]);
    }

    #[test]
    fn test_unbounded_is_noop() {
        let mut index = filled(&[(0, &[0, 1, 2, 3])]);
        assert!(index.rebalance(Capacity::Unbounded).is_empty());
    }

    #[test]
    fn test_member_count_preserved() {
        let mut index = filled(&[
            (0, &[1, 2, 3, 4, 5]),
            (100, &[100, 150, 160, 170]),
            (1000, &[1000, 1001, 1002, 1003, 1004, 1005]),
        ]);
        let before = index.total_members();
        index.rebalance(Capacity::Bounded(3));

        assert_eq!(index.total_members(), before);
        assert!(index.buckets().iter().all(|b| b.len() <= 3));
        assert!(index.boundaries().windows(2).all(|w| w[0] < w[1]));
        for bucket in index.buckets() {
            assert!(bucket.members().iter().all(|m| m.timestamp >= bucket.boundary()));
        }
    }
}
