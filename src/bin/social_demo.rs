//! End-to-end walkthrough against the in-memory backend: friend request
//! lifecycle, a gated group with an approval, and notification delivery
//! through the outbox worker.

use std::sync::Arc;
use studium::application_port::JoinOutcome;
use studium::engine::{Engine, LogNotifier};
use studium::infra_memory::MemoryUserDirectory;
use studium::logger::*;
use studium::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();
    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig {
        filter: project_settings.log.filter.clone(),
    })?;

    let directory = Arc::new(MemoryUserDirectory::new());
    let alice = directory.register("alice");
    let bob = directory.register("bob");
    let carol = directory.register("carol");

    let engine = Engine::try_new(&project_settings, directory, Arc::new(LogNotifier)).await?;

    // friend lifecycle
    engine.friend_graph.send_request(alice, bob).await?;
    engine.friend_graph.accept(bob, alice).await?;
    for edge in engine.friend_graph.list_friends(alice).await? {
        info!(object = %edge.object, status = %edge.status, "edge of alice");
    }

    // gated group with one approval
    let group = engine
        .group_membership
        .create_group(alice, "Compiler Reading Circle", "weekly rustc deep dives", true)
        .await?;
    let outcome = engine.group_membership.request_join(group, carol).await?;
    info!(?outcome, "carol requested to join");
    assert_eq!(outcome, JoinOutcome::Requested);

    let pending = engine
        .group_membership
        .list_pending_requests(group, alice)
        .await?;
    for request in &pending {
        engine
            .group_membership
            .process_join_request(request.request_id, true, alice)
            .await?;
    }
    for member in engine.group_membership.list_members(group).await? {
        info!(user = %member.user_id, role = %member.role, "group member");
    }

    // let the worker drain the outbox before shutting down
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    engine.shutdown().await;

    Ok(())
}
