//! Classroom feed demo
//!
//! Run with: cargo run --example classroom_feed
//!
//! Opens three subscriptions (two students in the same project and one in
//! another), posts a few messages and prints every event each session
//! receives as JSON. Heartbeats run every second and the alert source fires
//! often, so grade alerts show up between messages.
//!
//! ```text
//!   alice (p-math) ──┐
//!   bob   (p-math) ──┼──  NotificationHub  ◄── submit_message / heartbeats
//!   carol (p-art)  ──┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use notify_rs::heartbeat::RandomAlertSource;
use notify_rs::{
    HubConfig, MessageKind, NewMessage, NotificationHub, ProjectScope, Scope, Subscription,
};

fn spawn_printer(name: &'static str, sub: Subscription) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let (_, mut rx) = sub.into_parts();
        while let Some(frame) = rx.recv().await {
            println!("[{:>5}] {}", name, String::from_utf8_lossy(&frame));
        }
        println!("[{:>5}] stream closed", name);
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("notify_rs=debug".parse()?)
                .add_directive("classroom_feed=debug".parse()?),
        )
        .init();

    let config = HubConfig::default()
        .heartbeat_interval(Duration::from_secs(1))
        .backfill_on_connect(true);
    let hub = NotificationHub::new(config, Arc::new(RandomAlertSource::new(0.3)))?;

    let alice = hub.open_subscription("alice", Some("p-math")).await?;
    let bob = hub.open_subscription("bob", Some("p-math")).await?;

    let mut printers = vec![spawn_printer("alice", alice), spawn_printer("bob", bob)];

    let quiz = NewMessage::new(
        ProjectScope::from_option(Some("p-math")),
        "instructor-1",
        "Ms. Rivera",
        "instructor",
        "Quiz on chapter 4 tomorrow",
    )
    .kind(MessageKind::Announcement);
    let quiz = hub.submit_message(quiz).await?;

    tokio::time::sleep(Duration::from_millis(1500)).await;

    hub.submit_message(NewMessage::new(
        ProjectScope::from_option(Some("p-math")),
        "bob",
        "Bob",
        "student",
        "Does it cover section 4.3?",
    ))
    .await?;

    // Carol joins late in another project; backfill replays only her scopes
    let carol = hub.open_subscription("carol", Some("p-art")).await?;
    printers.push(spawn_printer("carol", carol));

    tokio::time::sleep(Duration::from_secs(3)).await;

    let history = hub.history(&Scope::project("p-math")).await?;
    println!("p-math history: {} events", history.len());

    hub.mark_read("alice", &quiz.id).await?;
    println!("alice read {}: {}", quiz.id, hub.is_read("alice", &quiz.id).await?);
    println!("stats: {:?}", hub.stats());

    hub.shutdown().await;
    for printer in printers {
        printer.await?;
    }

    Ok(())
}
