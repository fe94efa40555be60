//! NATS JetStream client for completion events
//!
//! Provides connection management and event publishing to NATS JetStream

use async_nats::jetstream;

use crate::nats::event::CompletionEvent;

#[derive(Debug, Clone)]
pub struct NatsConfig {
    pub url: String,
    pub stream_name: String,
    pub consumer_name: String,
    pub subject: String,
}

pub struct NatsClient {
    client: async_nats::Client,
    jetstream: jetstream::Context,
    subject: String,
}

impl NatsClient {
    /// Connect to NATS and declare the stream and durable consumer
    ///
    /// The stream captures `config.subject` and the consumer filters on it,
    /// so events published before any reader attaches are kept.
    pub async fn connect(config: NatsConfig) -> Result<Self, async_nats::Error> {
        let client = async_nats::connect(&config.url).await?;
        tracing::info!("Connected to NATS at {}", config.url);

        let jetstream = jetstream::new(client.clone());

        let stream = jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: config.stream_name.clone(),
                subjects: vec![config.subject.clone()],
                storage: jetstream::stream::StorageType::File,
                num_replicas: 1,
                ..Default::default()
            })
            .await?;

        stream
            .get_or_create_consumer(
                &config.consumer_name,
                jetstream::consumer::pull::Config {
                    durable_name: Some(config.consumer_name.clone()),
                    filter_subject: config.subject.clone(),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(
            "JetStream stream '{}' ready with consumer '{}' on '{}'",
            config.stream_name,
            config.consumer_name,
            config.subject
        );

        Ok(Self {
            client,
            jetstream,
            subject: config.subject,
        })
    }

    /// Publish a completion event and wait for JetStream to store it
    pub async fn publish_event(&self, event: &CompletionEvent) -> Result<(), async_nats::Error> {
        let payload = serde_json::to_vec(event)?;

        let ack = self
            .jetstream
            .publish(self.subject.clone(), payload.into())
            .await?;
        ack.await?;

        tracing::info!(
            "Published event {} -> {}",
            event.event_uuid,
            self.subject
        );

        Ok(())
    }

    /// Flush pending traffic and close the connection
    pub async fn close(self) {
        if let Err(e) = self.client.flush().await {
            tracing::warn!("Failed to flush NATS connection: {}", e);
        }

        drop(self.jetstream);
        drop(self.client);
        tracing::info!("NATS connection closed.");
    }
}
