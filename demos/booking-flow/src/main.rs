//! End-to-end walkthrough of the Courtside stores.
//!
//! Wires the full stack the way an application root would: one shared
//! environment, file-backed snapshots, the venue wizard, the booking desk
//! with its public board, and the event manager with its catalog. Run it
//! twice to watch the persisted stores come back after a "restart".

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};

use courtside_core::environment::StoreEnvironment;
use courtside_domain::{
    AddressPatch, EventManager, GuestDetails, PartnerBookingDesk, RequestBook, VenueDirectory,
};
use courtside_persistence::FileSnapshotStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Courtside Booking Flow ===\n");

    let env = StoreEnvironment::production();
    let backend = Arc::new(FileSnapshotStore::new(
        std::env::temp_dir().join("courtside-demo"),
    ));

    // Venue wizard: stage across "screens", then submit.
    let directory = VenueDirectory::hydrated(env.clone(), backend.clone()).await;
    println!("Venues on startup: {}", directory.venues().len().await);

    directory
        .stage(|d| {
            d.name = Some("Center Court Club".to_string());
            d.sports = vec!["tennis".to_string(), "padel".to_string()];
            d.hourly_fee = Some(1200);
        })
        .await;
    directory
        .stage_address(AddressPatch {
            line_one: Some("14 Stadium Road".to_string()),
            city: Some("Delhi".to_string()),
            state: Some("DL".to_string()),
            postal_code: Some("110001".to_string()),
            ..AddressPatch::default()
        })
        .await;
    directory.stage_photo("court-front.jpg").await;

    let venue = directory.submit_draft().await;
    println!("Committed venue '{}' ({})", venue.name, venue.id);

    // Booking desk: every mutation lands on the public board too.
    let desk = PartnerBookingDesk::hydrated(env.clone(), backend).await;
    let start = Utc::now() + TimeDelta::days(1);
    let booking = desk
        .book(
            venue.id.clone(),
            "Court 2",
            start,
            start + TimeDelta::hours(1),
            1200,
            GuestDetails {
                name: "Ravi".to_string(),
                phone: "+91 98765 43210".to_string(),
            },
        )
        .await;
    println!(
        "Booked {} for {} (board shows {} bookings)",
        booking.court,
        booking.guest.name,
        desk.board().len().await
    );

    // Events: published by the manager, browsed through the catalog.
    let manager = EventManager::new(env.clone());
    let book = RequestBook::new(env);

    let event = manager
        .publish_event(
            "Summer Open",
            Some(venue.id.clone()),
            Utc::now() + TimeDelta::days(14),
            500,
        )
        .await;
    book.submit(event.id.clone(), "Priya").await;
    book.submit(event.id.clone(), "Asha").await;
    println!(
        "Published '{}'; catalog size {}, pending requests {}",
        event.name,
        manager.catalog().len().await,
        book.pending_for_event(&event.id).await.len()
    );

    // Cancelling cascades nothing; the call site clears requests first.
    let removed = book.remove_for_event(&event.id).await;
    let _ = manager.cancel_event(&event.id).await;
    println!(
        "Cancelled '{}', dropping {} requests with it",
        event.name,
        removed.len()
    );

    println!(
        "\nPersistence: venues store is {}",
        directory.venues().health().status
    );

    // Snapshot writes are fire-and-forget; give them a beat before exit.
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("Done. Run again to see hydration pick these collections up.");
}
