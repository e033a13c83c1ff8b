use camera_stream::CameraArgs;
use camstream::{StreamConfig, Streamer};
use camstream_base::log;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    camstream_base::init_stdout_logger();

    let args = CameraArgs::parse(std::env::args().skip(1))?;
    let config = args.apply(StreamConfig::default());

    log::info!("Camera Streamer");
    log::info!("Streaming to: {}", config.endpoint());

    let streamer = start(config)?;

    tokio::signal::ctrl_c().await?;
    log::info!("Exiting...");
    streamer.stop().await;
    Ok(())
}

#[cfg(feature = "v4l2")]
fn start(config: StreamConfig) -> Result<Streamer, Box<dyn std::error::Error>> {
    let camera = camstream::V4l2Camera::open(
        config.device(),
        config.width(),
        config.height(),
        config.fps(),
        config.buffer_count(),
    )?;
    Ok(Streamer::start(config, camera)?)
}

#[cfg(not(feature = "v4l2"))]
fn start(config: StreamConfig) -> Result<Streamer, Box<dyn std::error::Error>> {
    log::warn!("built without the v4l2 feature, streaming a test pattern");
    let pattern = camstream::TestPattern::new(
        config.width() as usize,
        config.height() as usize,
        config.fps(),
        config.buffer_count() as usize,
    )?;
    Ok(Streamer::start(config, pattern)?)
}
