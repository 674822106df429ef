//! Demo harness for the user registration system.
//!
//! Drives a [`UserService`] through the registration scenario and through a
//! race between concurrent writers on one stream.

pub mod config;
pub mod error;
pub mod telemetry;

use std::sync::Arc;

use common::StreamId;
use domain::{
    AddPhoto, Aggregate, AgreeEthics, CommandResult, DomainError, DomainEvent, SetEmail, SetName,
    SetOriginCountry, UserAggregate, UserService,
};
use event_store::EventStore;
use serde::Serialize;
use tokio::sync::Barrier;

use error::DemoError;

/// Registers one user from creation to completion.
#[tracing::instrument(skip(service))]
pub async fn run_scenario<S: EventStore>(
    service: &UserService<S>,
) -> Result<UserAggregate, DemoError> {
    let created = service.create_user().await?;
    let user_id = stream_of(&created.aggregate)?;
    tracing::info!(%user_id, state = %created.aggregate.state(), "user created");

    let step = service
        .set_name(SetName::new(user_id.clone(), "tycho"))
        .await?;
    log_step(&step);
    let step = service
        .set_email(SetEmail::new(user_id.clone(), "tycho@toto.tech"))
        .await?;
    log_step(&step);
    let step = service
        .agree_ethics(AgreeEthics::new(user_id.clone()))
        .await?;
    log_step(&step);
    let step = service
        .set_origin_country(SetOriginCountry::new(user_id.clone(), "france"))
        .await?;
    log_step(&step);
    let step = service
        .add_photo(AddPhoto::new(user_id.clone(), "s3://photo"))
        .await?;
    log_step(&step);

    Ok(step.aggregate)
}

fn stream_of(user: &UserAggregate) -> Result<StreamId, DomainError> {
    user.id().ok_or(DomainError::MissingIdentity {
        aggregate_type: UserAggregate::aggregate_type(),
    })
}

fn log_step(step: &CommandResult<UserAggregate>) {
    for event in &step.events {
        tracing::info!(
            event = event.event_type(),
            version = %step.new_version,
            state = %step.aggregate.state(),
            "event recorded"
        );
    }
}

/// Outcome of [`race_writers`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceReport {
    pub user_id: String,
    pub writers: usize,
    pub landed: usize,
    pub rejected: usize,
    pub final_version: u64,
    pub final_name: Option<String>,
}

/// Registers a fresh user, then lets `writers` tasks rename it at once.
///
/// The writers are released together; the store lets one append per version
/// through and the losers retry against the newer stream.
#[tracing::instrument(skip(service))]
pub async fn race_writers<S: EventStore + 'static>(
    service: Arc<UserService<S>>,
    writers: usize,
) -> Result<RaceReport, DemoError> {
    let created = service.create_user().await?;
    let user_id = stream_of(&created.aggregate)?;

    let start = Arc::new(Barrier::new(writers));
    let mut handles = Vec::with_capacity(writers);
    for writer in 0..writers {
        let service = Arc::clone(&service);
        let start = Arc::clone(&start);
        let user_id = user_id.clone();
        handles.push(tokio::spawn(async move {
            start.wait().await;
            service
                .set_name(SetName::new(user_id, format!("writer-{writer}")))
                .await
        }));
    }

    let mut landed = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => landed += 1,
            Err(e) => {
                tracing::warn!(error = %e, "writer gave up");
                rejected += 1;
            }
        }
    }

    let loaded = service.handler().load(&user_id).await?;
    tracing::info!(%user_id, landed, rejected, version = %loaded.version, "race settled");

    Ok(RaceReport {
        user_id: user_id.to_string(),
        writers,
        landed,
        rejected,
        final_version: loaded.version.as_u64(),
        final_name: loaded.aggregate.name().map(str::to_string),
    })
}
