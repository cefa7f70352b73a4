//! The publishing orchestrator.
//!
//! [`Publisher`] holds configuration and strategies and can only be initialized. Initializing
//! writes the stream metadata and the first bucket and yields an [`ActivePublisher`], the
//! only handle that exposes data operations.

use super::layout::{insert_data, StreamLayout};
use super::strategies::{
    AssignmentPolicy, ClosestPastBoundary, CompactTurtle, PathTimestamp, ResourceSerializer,
    TimestampExtractor,
};
use crate::bucketing::{BucketIndex, Capacity, Member, Millis, RebalancePlan};
use crate::config::PublisherConfig;
use crate::core::{PrefixTable, Resource, Term, Triple};
use crate::error::{Error, PublishStep, Result};
use crate::extraction::extract;
use crate::parsing::parse_turtle_with_base;
use crate::serialization::serialize_triples;
use crate::shape::generate_shape;
use crate::storage::{ensure_success, Storage, TURTLE};
use uuid::Uuid;

/// A resource written to a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedMember {
    pub subject: Term,
    pub boundary: Millis,
    pub url: String,
}

/// A resource that was not admitted, and why.
#[derive(Debug)]
pub struct Rejection {
    pub subject: Term,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct AppendReport {
    pub admitted: Vec<AdmittedMember>,
    pub rejected: Vec<Rejection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeOutcome {
    Published,
    /// Shape document and metadata link were both in place already
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeState {
    Absent,
    DocumentWritten,
    Linked,
}

struct Strategies {
    timestamps: Box<dyn TimestampExtractor>,
    policy: Box<dyn AssignmentPolicy>,
    serializer: Box<dyn ResourceSerializer>,
}

/// Uninitialized stream publisher.
pub struct Publisher<S: Storage> {
    storage: S,
    config: PublisherConfig,
    prefixes: PrefixTable,
    strategies: Strategies,
}

impl<S: Storage> Publisher<S> {
    /// Validate `config` and set up the default strategies.
    pub fn new(storage: S, config: PublisherConfig) -> Result<Self> {
        config.validate()?;
        let prefixes = config.prefix_table()?;
        let strategies = Strategies {
            timestamps: Box::new(PathTimestamp::new(config.timestamp_path.as_str())),
            policy: Box::new(ClosestPastBoundary),
            serializer: Box::new(CompactTurtle::new(prefixes.clone())),
        };
        Ok(Self { storage, config, prefixes, strategies })
    }

    pub fn with_timestamp_extractor(mut self, extractor: impl TimestampExtractor + 'static) -> Self {
        self.strategies.timestamps = Box::new(extractor);
        self
    }

    pub fn with_assignment_policy(mut self, policy: impl AssignmentPolicy + 'static) -> Self {
        self.strategies.policy = Box::new(policy);
        self
    }

    pub fn with_serializer(mut self, serializer: impl ResourceSerializer + 'static) -> Self {
        self.strategies.serializer = Box::new(serializer);
        self
    }

    /// Create the stream with one bucket at `initial_boundary`.
    pub async fn initialize(self, initial_boundary: Millis) -> Result<ActivePublisher<S>> {
        let layout = StreamLayout::new(self.config.base_url.as_str());

        let bucket_url = layout.bucket_url(initial_boundary);
        let response = self.storage.put(&bucket_url, "", TURTLE).await?;
        ensure_success("create bucket", &bucket_url, response)?;

        let mut metadata = layout.stream_triples(&self.config.timestamp_path);
        metadata.extend(layout.relation_triples(initial_boundary, &self.config.timestamp_path));
        let body = serialize_triples(&metadata, &self.prefixes)?;
        let metadata_url = layout.metadata_url();
        let response = self.storage.put(&metadata_url, &body, TURTLE).await?;
        ensure_success("write metadata", &metadata_url, response)?;

        tracing::info!(
            stream = %layout.stream_id(),
            boundary = initial_boundary,
            "initialized event stream"
        );

        Ok(ActivePublisher {
            storage: self.storage,
            index: BucketIndex::new(initial_boundary)
                .with_min_split_size(self.config.min_split_size),
            layout,
            config: self.config,
            prefixes: self.prefixes,
            strategies: self.strategies,
            shape: ShapeState::Absent,
        })
    }
}

/// Initialized stream publisher. Not meant for concurrent use; one writer per stream.
pub struct ActivePublisher<S: Storage> {
    storage: S,
    layout: StreamLayout,
    config: PublisherConfig,
    prefixes: PrefixTable,
    strategies: Strategies,
    index: BucketIndex,
    shape: ShapeState,
}

impl<S: Storage> ActivePublisher<S> {
    pub fn index(&self) -> &BucketIndex {
        &self.index
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn layout(&self) -> &StreamLayout {
        &self.layout
    }

    pub fn bucket_url(&self, boundary: Millis) -> String {
        self.layout.bucket_url(boundary)
    }

    /// Split `triples` into stream members.
    pub fn extract(&self, triples: &[Triple]) -> Vec<Resource> {
        extract(triples, &self.config.member_predicate, &self.layout.stream_id())
    }

    /// Extract members from `triples` and write each one to its bucket.
    ///
    /// Resources with a bad timestamp or one before the oldest bucket are reported in
    /// [`AppendReport::rejected`]. Storage failures abort the append.
    pub async fn append(&mut self, triples: &[Triple]) -> Result<AppendReport> {
        let mut report = AppendReport::default();

        for resource in self.extract(triples) {
            match self.admit(&resource).await {
                Ok(admitted) => {
                    if self.config.publish_shape && self.shape != ShapeState::Linked {
                        self.publish_shape(&resource).await?;
                    }
                    report.admitted.push(admitted);
                }
                Err(error) if error.is_rejection() => {
                    tracing::warn!(subject = %resource.main_subject(), %error, "rejected resource");
                    report.rejected.push(Rejection {
                        subject: resource.main_subject().clone(),
                        error,
                    });
                }
                Err(error) => return Err(error),
            }
        }

        if self.config.auto_rebalance && !report.admitted.is_empty() {
            let capacity = self.config.capacity();
            self.rebalance(capacity).await?;
        }

        tracing::info!(
            admitted = report.admitted.len(),
            rejected = report.rejected.len(),
            "append finished"
        );
        Ok(report)
    }

    async fn admit(&mut self, resource: &Resource) -> Result<AdmittedMember> {
        let timestamp = self.strategies.timestamps.timestamp(resource)?;
        let boundary = self.strategies.policy.assign(&self.index, timestamp)?;
        if self.index.bucket(boundary).is_none() {
            return Err(Error::Config(format!(
                "assignment policy chose {} which is not a bucket boundary",
                boundary
            )));
        }
        let body = self.strategies.serializer.serialize(resource)?;

        let id = Uuid::new_v4().to_string();
        let url = self.layout.member_url(boundary, &id);
        let response = self
            .storage
            .put(&url, &body, self.strategies.serializer.content_type())
            .await?;
        ensure_success("write member", &url, response)?;

        self.index.insert_member(boundary, Member::new(id, timestamp));
        tracing::debug!(subject = %resource.main_subject(), boundary, %url, "admitted resource");

        Ok(AdmittedMember { subject: resource.main_subject().clone(), boundary, url })
    }

    /// Publish the shape inferred from `sample` and link it from the stream metadata.
    ///
    /// Either step may have been completed by an earlier call; only the missing one runs.
    /// On failure the error names the step that failed.
    pub async fn publish_shape(&mut self, sample: &Resource) -> Result<ShapeOutcome> {
        if self.shape == ShapeState::Linked {
            return Ok(ShapeOutcome::AlreadyPresent);
        }
        let mut wrote = false;

        if self.shape == ShapeState::Absent {
            wrote = self
                .write_shape_document(sample)
                .await
                .map_err(|e| shape_error(PublishStep::ShapeDocument, e))?;
            self.shape = ShapeState::DocumentWritten;
        }

        wrote |= self
            .link_shape()
            .await
            .map_err(|e| shape_error(PublishStep::MetadataPatch, e))?;
        self.shape = ShapeState::Linked;

        if wrote {
            tracing::info!(shape = %self.layout.shape_url(), "published shape");
            Ok(ShapeOutcome::Published)
        } else {
            Ok(ShapeOutcome::AlreadyPresent)
        }
    }

    /// Returns false when a shape document already exists.
    async fn write_shape_document(&self, sample: &Resource) -> Result<bool> {
        let url = self.layout.shape_url();
        if self.storage.get(&url).await?.is_success() {
            return Ok(false);
        }
        let shape = generate_shape(sample, &self.config.shape_namespace());
        let body = serialize_triples(shape.triples(), &self.prefixes)?;
        let response = self.storage.put(&url, &body, TURTLE).await?;
        ensure_success("write shape", &url, response)?;
        Ok(true)
    }

    /// Returns false when the metadata already links the shape.
    async fn link_shape(&self) -> Result<bool> {
        let url = self.layout.metadata_url();
        let link = self.layout.shape_link();
        let current = ensure_success("read metadata", &url, self.storage.get(&url).await?)?;
        if parse_turtle_with_base(&current.body, &url)?.contains(&link) {
            return Ok(false);
        }
        let response = self.storage.patch(&url, &insert_data(&[link])).await?;
        ensure_success("link shape", &url, response)?;
        Ok(true)
    }

    /// Open a bucket at `boundary` on storage and in the index. Returns false when it exists.
    pub async fn add_bucket(&mut self, boundary: Millis) -> Result<bool> {
        if self.index.bucket(boundary).is_some() {
            return Ok(false);
        }
        self.create_bucket(boundary).await?;
        self.index.add_bucket(boundary);
        Ok(true)
    }

    async fn create_bucket(&self, boundary: Millis) -> Result<()> {
        let url = self.layout.bucket_url(boundary);
        let response = self.storage.put(&url, "", TURTLE).await?;
        ensure_success("create bucket", &url, response)?;

        let metadata_url = self.layout.metadata_url();
        let relation = self.layout.relation_triples(boundary, &self.config.timestamp_path);
        let response = self.storage.patch(&metadata_url, &insert_data(&relation)).await?;
        ensure_success("add relation", &metadata_url, response)?;

        tracing::info!(boundary, %url, "created bucket");
        Ok(())
    }

    /// Rebalance the index under `capacity` and replay the moves on storage.
    ///
    /// New buckets are created first, then members are moved in plan order: read from the
    /// source bucket, write to the destination, delete the source document.
    pub async fn rebalance(&mut self, capacity: Capacity) -> Result<RebalancePlan> {
        let plan = self.index.rebalance(capacity);

        for boundary in &plan.created {
            self.create_bucket(*boundary).await?;
        }

        for transfer in &plan.transfers {
            let from = self.layout.member_url(transfer.from, &transfer.member.id);
            let to = self.layout.member_url(transfer.to, &transfer.member.id);

            let content = ensure_success("read member", &from, self.storage.get(&from).await?)?;
            let response = self.storage.put(&to, &content.body, TURTLE).await?;
            ensure_success("move member", &to, response)?;
            let response = self.storage.delete(&from).await?;
            ensure_success("delete moved member", &from, response)?;

            tracing::debug!(%from, %to, "moved member");
        }

        Ok(plan)
    }
}

fn shape_error(step: PublishStep, source: Error) -> Error {
    Error::ShapePublish { step, source: Box::new(source) }
}
