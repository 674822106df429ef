//! Command handling infrastructure.

use common::StreamId;
use event_store::{EventEnvelope, EventStore, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were generated and persisted.
    pub events: Vec<A::Event>,

    /// The new version of the stream after the command.
    pub new_version: Version,
}

/// An aggregate replayed from its stream, with the version it was read at.
#[derive(Debug, Clone)]
pub struct Loaded<A> {
    pub aggregate: A,
    pub version: Version,
}

/// Trait for commands that can be executed against an aggregate.
///
/// Commands represent an intention to perform an action. They may be rejected
/// if the aggregate's current state doesn't allow the action.
pub trait Command: Send + Sync {
    /// The type of aggregate this command targets.
    type Aggregate: Aggregate;

    /// Returns the stream of the aggregate this command targets.
    fn stream_id(&self) -> &StreamId;
}

/// How often a command is re-run after losing an append race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Allows `max_attempts` runs of the load-command-append cycle (at least one).
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Never retries.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Handler for executing commands against aggregates.
///
/// The handler is responsible for:
/// 1. Loading the stream and replaying it into a fresh aggregate
/// 2. Executing the command to produce events
/// 3. Appending the events, expecting the version that was loaded
/// 4. Starting over from 1 when another writer appended in between
pub struct CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    initial: A,
    retry: RetryPolicy,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
    DomainError: From<A::Error>,
{
    /// Creates a new command handler with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            initial: A::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Uses `initial` instead of `A::default()` as the starting point of every replay.
    pub fn with_initial(mut self, initial: A) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Replays a stream into an aggregate.
    ///
    /// An empty stream yields the initial aggregate at version 0.
    pub async fn load(&self, stream_id: &StreamId) -> Result<Loaded<A>, DomainError> {
        let envelopes = self.store.load(stream_id).await?;

        let mut aggregate = self.initial.clone();
        let mut version = Version::initial();
        for envelope in envelopes {
            let event: A::Event = envelope.decode()?;
            aggregate.apply(event)?;
            version = envelope.version;
        }

        Ok(Loaded { aggregate, version })
    }

    /// Loads an aggregate, returning None if its stream is empty.
    pub async fn load_existing(&self, stream_id: &StreamId) -> Result<Option<A>, DomainError> {
        let loaded = self.load(stream_id).await?;
        if loaded.version == Version::initial() {
            Ok(None)
        } else {
            Ok(Some(loaded.aggregate))
        }
    }

    /// Returns the decoded events of a stream, oldest first.
    pub async fn history(&self, stream_id: &StreamId) -> Result<Vec<A::Event>, DomainError> {
        let envelopes = self.store.load(stream_id).await?;
        envelopes
            .iter()
            .map(|envelope| envelope.decode().map_err(DomainError::EventStore))
            .collect()
    }

    /// Executes a command and persists the resulting events.
    ///
    /// The command function receives the freshly loaded aggregate and returns
    /// the events to append, or an error. On a concurrency conflict the whole
    /// cycle runs again against the reloaded stream, so `command_fn` may be
    /// called more than once.
    #[tracing::instrument(skip(self, command_fn), fields(aggregate = A::aggregate_type()))]
    pub async fn execute<F>(
        &self,
        stream_id: &StreamId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: Fn(&A) -> Result<Vec<A::Event>, A::Error> + Send + Sync,
    {
        let max_attempts = self.retry.max_attempts();

        for attempt in 1..=max_attempts {
            let Loaded {
                mut aggregate,
                version,
            } = self.load(stream_id).await?;

            metrics::counter!("user_commands_total", "aggregate" => A::aggregate_type())
                .increment(1);
            let events = match command_fn(&aggregate) {
                Ok(events) => events,
                Err(e) => {
                    metrics::counter!(
                        "user_command_rejections_total",
                        "aggregate" => A::aggregate_type()
                    )
                    .increment(1);
                    tracing::debug!(error = %e, "command rejected");
                    return Err(e.into());
                }
            };

            if events.is_empty() {
                return Ok(CommandResult {
                    aggregate,
                    events,
                    new_version: version,
                });
            }

            let envelopes = self.build_envelopes(stream_id, version, &events)?;

            match self.store.append(stream_id, version, envelopes).await {
                Ok(new_version) => {
                    aggregate.apply_events(events.iter().cloned())?;
                    tracing::debug!(%new_version, count = events.len(), "events appended");
                    return Ok(CommandResult {
                        aggregate,
                        events,
                        new_version,
                    });
                }
                Err(e) if e.is_conflict() => {
                    metrics::counter!(
                        "user_append_conflicts_total",
                        "aggregate" => A::aggregate_type()
                    )
                    .increment(1);
                    tracing::warn!(attempt, max_attempts, error = %e, "append lost the race, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::RetriesExhausted {
            stream_id: stream_id.clone(),
            attempts: max_attempts,
        })
    }

    /// Executes a command described by a [`Command`] value.
    pub async fn handle<C, F>(
        &self,
        command: &C,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        C: Command<Aggregate = A>,
        F: Fn(&A) -> Result<Vec<A::Event>, A::Error> + Send + Sync,
    {
        self.execute(command.stream_id(), command_fn).await
    }

    /// Executes a creation command.
    ///
    /// The command runs against the initial aggregate; the stream id is the
    /// identity the resulting events establish. The append expects an empty
    /// stream, so an identity clash fails with a concurrency conflict instead
    /// of being retried.
    #[tracing::instrument(skip(self, command_fn), fields(aggregate = A::aggregate_type()))]
    pub async fn execute_new<F>(&self, command_fn: F) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error> + Send,
    {
        metrics::counter!("user_commands_total", "aggregate" => A::aggregate_type()).increment(1);
        let events = command_fn(&self.initial)?;

        let mut aggregate = self.initial.clone();
        aggregate.apply_events(events.iter().cloned())?;
        let stream_id = aggregate.id().ok_or(DomainError::MissingIdentity {
            aggregate_type: A::aggregate_type(),
        })?;

        let envelopes = self.build_envelopes(&stream_id, Version::initial(), &events)?;
        let new_version = self
            .store
            .append(&stream_id, Version::initial(), envelopes)
            .await?;

        tracing::info!(%stream_id, "aggregate created");
        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }

    /// Wraps domain events into envelopes numbered after `current_version`.
    fn build_envelopes(
        &self,
        stream_id: &StreamId,
        current_version: Version,
        events: &[A::Event],
    ) -> Result<Vec<EventEnvelope>, DomainError> {
        let mut envelopes = Vec::with_capacity(events.len());
        let mut version = current_version;

        for event in events {
            version = version.next();
            let envelope = EventEnvelope::builder()
                .stream_id(stream_id.clone())
                .aggregate_type(A::aggregate_type())
                .event_type(event.event_type())
                .version(version)
                .payload(event)?
                .build()?;
            envelopes.push(envelope);
        }

        Ok(envelopes)
    }
}
