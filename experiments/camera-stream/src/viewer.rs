use camera_stream::FrameMeter;
use camstream_base::log;
use camstream_com::FrameReceiver;
use std::time::{Duration, Instant};

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    camstream_base::init_stdout_logger();

    // Parse address from args or use default
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    log::info!("Camera Viewer");
    let mut receiver = FrameReceiver::bind(&addr).await?;
    log::info!("Listening on {}", receiver.local_addr());

    let mut meter = FrameMeter::new(Duration::from_secs(1), Instant::now());
    let mut size = None;

    loop {
        let jpeg = receiver.recv().await?;

        match image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg) {
            Ok(decoded) => {
                let dims = (decoded.width(), decoded.height());
                if size != Some(dims) {
                    log::info!("Receiving {}x{} frames", dims.0, dims.1);
                    size = Some(dims);
                }
                log::debug!("frame: {} bytes", jpeg.len());
            }
            Err(e) => log::warn!("undecodable frame ({} bytes): {}", jpeg.len(), e),
        }

        if let Some(rate) = meter.record(jpeg.len(), Instant::now()) {
            log::info!("{:.1} fps, {:.0} KiB/s", rate.fps, rate.kbytes_per_sec);
        }
    }
}
