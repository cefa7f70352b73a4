//! Time buckets: assignment of members and capacity rebalancing

pub mod bucket_index;
pub mod rebalance;

pub use bucket_index::{
    millis_to_date_time, parse_date_time, read_timestamp, Bucket, BucketIndex, Capacity, Member,
    Millis,
};
pub use rebalance::{RebalancePlan, Transfer};
