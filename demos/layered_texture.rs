/**
 * Example: Generate a layered noise texture
 *
 * Builds a small texture from three octaves, saves every octave plus the
 * combined result, and prints a histogram summary of the output.
 *
 * Run with:
 *   cargo run --example layered_texture --release
 */

use layered_noise::{NoiseSynthesizer, SynthesisConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Generating layered noise texture...\n");

    let config = SynthesisConfig {
        width: 256,
        height: 256,
        radii: vec![4.0, 8.0, 16.0],
        output_dir: "demo-output".into(),
        verbose: true,
        ..Default::default()
    };

    let report = NoiseSynthesizer::new(config)?.run(&mut ())?;

    let mut histogram = [0usize; 256];
    for pixel in report.combined.pixels() {
        histogram[pixel.r as usize] += 1;
    }
    let used: Vec<usize> = (0..256).filter(|&v| histogram[v] > 0).collect();

    println!("\nOctaves: {}", report.layers.len());
    println!("Files written: {}", report.saved.len());
    if let (Some(min), Some(max)) = (used.first(), used.last()) {
        println!("Output range: {}..={}", min, max);
    }

    Ok(())
}
