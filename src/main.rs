use anyhow::Result;
use image::{DynamicImage, Rgb, RgbImage};
use scopelog::{Artifact, LoggerConfig, Mapping, Naming, Scope, Table, Value};
use tracing_subscriber::EnvFilter;

// Demo driver: minimises f(x) = (x - 3)^2 by gradient descent and records
// every phase through a nested scope tree.

const LEARNING_RATE: f64 = 0.2;
const EPOCHS: usize = 3;
const STEPS_PER_EPOCH: usize = 4;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let output_dir = std::env::args().nth(1).unwrap_or_else(|| "logs".to_string());
    tracing::info!("Recording demo run into {}", output_dir);

    let config = LoggerConfig::new(&output_dir).with_clear_dir(true).with_timing(true);
    let root = Scope::root(config)?;
    root.add_entries([
        ("objective", Value::from("(x - 3)^2")),
        ("learning_rate", Value::from(LEARNING_RATE)),
    ])?;

    let mut x = -4.0_f64;
    let mut history = Table::new(["epoch", "step", "x", "loss"]);
    let mut frames = Vec::new();

    for epoch in 0..EPOCHS {
        let scope = root.child(&format!("epoch_{epoch}"))?;
        for step in 0..STEPS_PER_EPOCH {
            let args: Mapping = [("x".to_string(), Value::from(x))].into_iter().collect();
            x = scope.log_call("descend", args, descend)?;
            history.push_row([
                Value::from(epoch),
                Value::from(step),
                Value::from(x),
                Value::from(loss(x)),
            ]);
        }

        let frame = render_position(x);
        scope.save_artifact("position", &Artifact::image(&frame), Naming::StepPrefixed)?;
        scope.add_entry("x", x)?;
        frames.push(frame);
        scope.close()?;
    }

    root.save_artifact("history", &Artifact::table(&history), Naming::Plain)?;
    root.save_artifact("trajectory", &Artifact::animation(&frames), Naming::Plain)?;
    root.add_entry("result", x)?;

    let document = root.document_path();
    root.close()?;
    tracing::info!("Done. Telemetry in {}", document.display());
    Ok(())
}

fn loss(x: f64) -> f64 {
    (x - 3.0).powi(2)
}

fn descend(args: &Mapping) -> Result<f64> {
    let x = args
        .get("x")
        .and_then(Value::as_f64)
        .ok_or_else(|| anyhow::anyhow!("descend needs a numeric `x`"))?;
    let gradient = 2.0 * (x - 3.0);
    Ok(x - LEARNING_RATE * gradient)
}

// A 64x16 strip with a marker at x mapped onto [-5, 5].
fn render_position(x: f64) -> DynamicImage {
    let (width, height) = (64u32, 16u32);
    let column = (((x + 5.0) / 10.0).clamp(0.0, 1.0) * f64::from(width - 1)).round() as u32;
    let image = RgbImage::from_fn(width, height, |px, _| {
        if px == column {
            Rgb([220, 40, 40])
        } else {
            Rgb([240, 240, 240])
        }
    });
    DynamicImage::ImageRgb8(image)
}
