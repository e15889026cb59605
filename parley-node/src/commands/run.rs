//! End-to-end run against the configured categorization endpoint.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use parley_core::ai_service::AiService;
use parley_core::categorize::ReqwestTransport;
use parley_core::clock::{ClockRef, SystemClock};
use parley_core::config::ParleyConfig;
use parley_core::messaging::MessagingService;
use parley_core::tasks::BackgroundQueue;
use parley_core::traits::{DocumentStoreRef, TracingNotifier};
use parley_core::types::{CategorizationRequest, RelationshipContext};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::{last_interaction, load_store, print_json, save_store};

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Store snapshot, created if missing and saved afterwards
    #[arg(long)]
    pub store: PathBuf,
    /// Creator the AI call is billed and rate limited to
    #[arg(long, default_value = "creator")]
    pub user: String,
    #[arg(long, default_value = "demo")]
    pub conversation: String,
    #[arg(long, default_value = "fan")]
    pub sender: String,
    #[arg(long)]
    pub text: String,
    #[arg(long)]
    pub vip: bool,
    /// Prior messages from this sender
    #[arg(long, default_value_t = 0)]
    pub message_count: u32,
    #[arg(long)]
    pub days_since: Option<i64>,
}

pub async fn run(config: &ParleyConfig, args: &RunArgs) -> Result<()> {
    let store = load_store(&args.store)?;
    let store_ref: DocumentStoreRef = Arc::new(store.clone());
    let clock: ClockRef = Arc::new(SystemClock);
    let queue = BackgroundQueue::start();

    let transport = ReqwestTransport::new(config.categorizer.timeout())?;
    let service = AiService::from_config(
        config,
        store_ref.clone(),
        clock.clone(),
        Arc::new(TracingNotifier),
        Arc::new(transport),
        queue.clone(),
    )?;
    let messaging = MessagingService::new(store_ref, clock);

    let last_interaction_at = last_interaction(Utc::now(), args.days_since)?;

    messaging
        .ensure_conversation(&args.conversation, vec![args.user.clone(), args.sender.clone()])
        .await
        .with_context(|| format!("cannot open conversation {}", args.conversation))?;
    let message = messaging
        .send_message(&args.conversation, &args.sender, &args.text)
        .await?;
    info!("sent message {}", message.id);

    let request = CategorizationRequest::new(
        message.id.clone(),
        message.text.clone(),
        args.conversation.clone(),
        args.sender.clone(),
    );
    let outcome = service.categorize_message(&args.user, &request).await;

    let report = match &outcome {
        Ok(result) => {
            let context = RelationshipContext {
                is_vip: args.vip,
                message_count: args.message_count,
                last_interaction_at,
            };
            let score = service.score_message(result, &context);
            messaging
                .apply_categorization(&args.conversation, &message.id, result, score.priority)
                .await?;
            Some(json!({
                "messageId": message.id,
                "categorization": result,
                "score": score,
            }))
        }
        Err(e) => {
            warn!("categorization failed ({}): {}", e.code(), e);
            None
        }
    };

    queue.flush().await;
    queue.close();
    save_store(&store, &args.store).await?;

    let stats = queue.stats();
    info!(
        "background jobs: {} completed, {} failed",
        stats.completed, stats.failed
    );

    match report {
        Some(report) => print_json(&report),
        None => outcome
            .map(|_| ())
            .context("message was stored but could not be categorized"),
    }
}
