//! Basic example of sending text to a Quote/0 display.
//!
//! Run with:
//! ```sh
//! QUOTE0_TOKEN=dot_app_xxx QUOTE0_DEVICE=ABC123 cargo run --example basic
//! ```

use quote0::{Client, TextRequest};

#[tokio::main]
async fn main() -> Result<(), quote0::Error> {
    let token = std::env::var("QUOTE0_TOKEN").expect("QUOTE0_TOKEN must be set");
    let device = std::env::var("QUOTE0_DEVICE").expect("QUOTE0_DEVICE must be set");

    let client = Client::new(token)?.with_default_device(device);

    let resp = client
        .send_text(
            TextRequest::new()
                .with_title("Hello Quote/0!")
                .with_message("Sent from Rust")
                .with_signature("quote0-rs")
                .with_refresh_now(true),
        )
        .await?;

    println!("Sent (code={} message={})", resp.code, resp.message);
    Ok(())
}
