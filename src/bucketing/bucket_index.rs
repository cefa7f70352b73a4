//! Ordered time buckets and member assignment.

use crate::core::{Resource, Term};
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Bucket boundaries and member timestamps, in milliseconds since epoch.
pub type Millis = i64;

/// Maximum number of members a bucket should hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capacity {
    Bounded(usize),
    Unbounded,
}

impl Capacity {
    pub fn limit(self) -> Option<usize> {
        match self {
            Capacity::Bounded(n) => Some(n),
            Capacity::Unbounded => None,
        }
    }
}

impl From<Option<usize>> for Capacity {
    fn from(value: Option<usize>) -> Self {
        value.map_or(Capacity::Unbounded, Capacity::Bounded)
    }
}

/// Membership record. `id` names the member document inside whichever bucket holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub timestamp: Millis,
}

impl Member {
    pub fn new(id: impl Into<String>, timestamp: Millis) -> Self {
        Self { id: id.into(), timestamp }
    }
}

/// A time window starting at `boundary`. Members are kept sorted by timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub(crate) boundary: Millis,
    pub(crate) members: Vec<Member>,
}

impl Bucket {
    pub(crate) fn new(boundary: Millis) -> Self {
        Self { boundary, members: Vec::new() }
    }

    pub fn boundary(&self) -> Millis {
        self.boundary
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn insert_sorted(&mut self, member: Member) {
        let at = self.members.partition_point(|m| m.timestamp <= member.timestamp);
        self.members.insert(at, member);
    }
}

/// The ordered bucket sequence of one stream. Never empty.
#[derive(Debug, Clone)]
pub struct BucketIndex {
    pub(crate) buckets: Vec<Bucket>,
    pub(crate) min_split_size: usize,
}

impl BucketIndex {
    /// Initialize with a single bucket at `initial_boundary`.
    pub fn new(initial_boundary: Millis) -> Self {
        Self { buckets: vec![Bucket::new(initial_boundary)], min_split_size: 1 }
    }

    /// Minimum number of members a freshly split bucket must receive.
    pub fn with_min_split_size(mut self, min_split_size: usize) -> Self {
        self.min_split_size = min_split_size.max(1);
        self
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn boundaries(&self) -> Vec<Millis> {
        self.buckets.iter().map(|b| b.boundary).collect()
    }

    pub fn bucket(&self, boundary: Millis) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.boundary == boundary)
    }

    pub fn oldest_boundary(&self) -> Millis {
        self.buckets[0].boundary
    }

    pub fn newest_boundary(&self) -> Millis {
        self.buckets[self.buckets.len() - 1].boundary
    }

    pub fn total_members(&self) -> usize {
        self.buckets.iter().map(Bucket::len).sum()
    }

    /// Boundary of the closest bucket at or before `timestamp`.
    pub fn assign(&self, timestamp: Millis) -> Result<Millis> {
        let mut chosen = None;
        for bucket in &self.buckets {
            if bucket.boundary <= timestamp {
                chosen = Some(bucket.boundary);
            } else {
                break;
            }
        }
        chosen.ok_or(Error::OutOfRange { timestamp, oldest: self.oldest_boundary() })
    }

    /// Read the resource's timestamp at `timestamp_path` and assign it.
    pub fn assign_resource(&self, resource: &Resource, timestamp_path: &str) -> Result<Millis> {
        let timestamp = read_timestamp(resource, timestamp_path)?;
        self.assign(timestamp.timestamp_millis())
    }

    /// Assign `member` and record it in its bucket. Returns the bucket boundary.
    pub fn add_member(&mut self, member: Member) -> Result<Millis> {
        let after = self.buckets.partition_point(|b| b.boundary <= member.timestamp);
        if after == 0 {
            return Err(Error::OutOfRange {
                timestamp: member.timestamp,
                oldest: self.oldest_boundary(),
            });
        }
        let bucket = &mut self.buckets[after - 1];
        bucket.insert_sorted(member);
        Ok(bucket.boundary)
    }

    /// Record `member` in the bucket at `boundary`. Returns false when there is no such bucket.
    pub fn insert_member(&mut self, boundary: Millis, member: Member) -> bool {
        match self.position(boundary) {
            Some(idx) => {
                self.buckets[idx].insert_sorted(member);
                true
            }
            None => false,
        }
    }

    /// Drop a membership record; returns the bucket it was in.
    pub fn remove_member(&mut self, id: &str) -> Option<(Millis, Member)> {
        for bucket in &mut self.buckets {
            if let Some(pos) = bucket.members.iter().position(|m| m.id == id) {
                return Some((bucket.boundary, bucket.members.remove(pos)));
            }
        }
        None
    }

    /// Open an empty bucket at `boundary`. Returns false when it already exists.
    pub fn add_bucket(&mut self, boundary: Millis) -> bool {
        match self.buckets.binary_search_by_key(&boundary, |b| b.boundary) {
            Ok(_) => false,
            Err(at) => {
                self.buckets.insert(at, Bucket::new(boundary));
                self.assert_ordered();
                true
            }
        }
    }

    pub(crate) fn position(&self, boundary: Millis) -> Option<usize> {
        self.buckets.iter().position(|b| b.boundary == boundary)
    }

    /// Boundaries must be strictly increasing; anything else is a bug.
    pub(crate) fn assert_ordered(&self) {
        assert!(
            self.buckets.windows(2).all(|w| w[0].boundary < w[1].boundary),
            "bucket boundaries out of order: {:?}",
            self.boundaries()
        );
    }
}

/// Parse an `xsd:dateTime` lexical form. A missing offset is read as UTC.
pub fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Timestamp of `resource`: the first literal at `timestamp_path` on its main subject.
pub fn read_timestamp(resource: &Resource, timestamp_path: &str) -> Result<DateTime<Utc>> {
    let literal = resource
        .values_of(timestamp_path)
        .find_map(|term| match term {
            Term::Literal { value, .. } => Some(value),
            _ => None,
        })
        .ok_or_else(|| {
            Error::MalformedInput(format!(
                "{} has no literal value for {}",
                resource.main_subject(),
                timestamp_path
            ))
        })?;

    parse_date_time(literal).ok_or_else(|| {
        Error::MalformedInput(format!(
            "{} has an unparseable timestamp '{}'",
            resource.main_subject(),
            literal
        ))
    })
}

/// Convert a boundary back into a UTC date-time.
pub fn millis_to_date_time(millis: Millis) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
}
