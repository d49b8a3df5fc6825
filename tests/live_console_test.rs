//! Live console tests
//!
//! These drive a real browser against the real vendor console and need
//! CIN7_* credentials in the environment, so they are ignored by
//! default: `cargo test -- --ignored`.

use anyhow::Result;

use cin7_bridge::utils::logging;
use cin7_bridge::{Cin7, Cin7Config};

#[tokio::test]
#[ignore]
async fn login_establishes_a_reusable_session() -> Result<()> {
    logging::init();

    let config = Cin7Config::from_env();
    let client = Cin7::new(config)?;

    let first = client.get_console_page().await?;
    let second = client.get_console_page().await?;

    // same page handle, no second login sequence
    assert_eq!(first.target_id(), second.target_id());

    client.close_browser().await;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn voiding_an_unknown_document_reports_a_failed_outcome() -> Result<()> {
    logging::init();

    let config = Cin7Config::from_env();
    let client = Cin7::new(config)?;

    let outcomes = client.credit_notes.void(&["0".to_string()]).await?;

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].success);
    Ok(())
}
