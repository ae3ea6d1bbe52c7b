//! Example of sending a full-screen image to a Quote/0 display.
//!
//! Run with:
//! ```sh
//! QUOTE0_TOKEN=dot_app_xxx QUOTE0_DEVICE=ABC123 \
//!     cargo run --example image -- path/to/296x152.png
//! ```

use quote0::{Client, DitherKernel, DitherType, ImageRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let token = std::env::var("QUOTE0_TOKEN").expect("QUOTE0_TOKEN must be set");
    let device = std::env::var("QUOTE0_DEVICE").expect("QUOTE0_DEVICE must be set");
    let path = std::env::args().nth(1).expect("usage: image <path-to-png>");

    let client = Client::new(token)?.with_default_device(device);

    let resp = client
        .send_image(
            ImageRequest::new()
                .with_image_path(path)
                .with_dither_type(DitherType::Diffusion)
                .with_dither_kernel(DitherKernel::Atkinson)
                .with_refresh_now(true),
        )
        .await?;

    println!("Sent (code={} message={})", resp.code, resp.message);
    Ok(())
}
