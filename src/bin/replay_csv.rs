use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use temblometro::classifier::{classify, Classification};
use temblometro::csv_loader::load_samples_from_csv;
use temblometro::estimator::{EstimatorError, PlaceholderEstimator};

struct ReplayOptions {
    stand_in: Option<f32>,
}

fn parse_args() -> Result<(PathBuf, ReplayOptions)> {
    let mut stand_in = None;
    let mut csv_path: Option<PathBuf> = None;
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--stand-in" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("--stand-in requiere un valor en Hz"))?;
                stand_in = Some(value.parse()?);
            }
            _ => {
                if csv_path.is_some() {
                    bail!("Uso: replay_csv [--stand-in <hz>] <archivo.csv>");
                }
                csv_path = Some(PathBuf::from(arg));
            }
        }
    }

    let csv_path = csv_path.ok_or_else(|| anyhow!("Debes especificar un archivo CSV"))?;
    Ok((csv_path, ReplayOptions { stand_in }))
}

fn main() -> Result<()> {
    let (csv_path, opts) = parse_args()?;
    println!("🎞️  Reproduciendo sesión desde {:?}", csv_path);

    let samples = load_samples_from_csv(&csv_path)?;
    let duration = samples
        .last()
        .map(|s| s.elapsed.as_secs_f32())
        .unwrap_or(0.0);
    let mean_magnitude: f32 =
        samples.iter().map(|s| s.accel_magnitude()).sum::<f32>() / samples.len() as f32;

    println!("📈 Muestras: {} ({:.1} s)", samples.len(), duration);
    println!("   Magnitud media de aceleración: {:.4} g", mean_magnitude);

    let estimator = match opts.stand_in {
        Some(hz) => PlaceholderEstimator::with_stand_in(hz),
        None => PlaceholderEstimator::new(),
    };

    let frequency = match estimator.estimate(&samples) {
        Ok(f) => f,
        Err(EstimatorError::EstimationUnavailable) => {
            println!(
                "ℹ️  Estimador no implementado: se clasifica la frecuencia por \
                 defecto 0.0 Hz (usa --stand-in <hz> para inyectar un valor)"
            );
            0.0
        }
    };

    let result = classify(frequency)?;

    println!("\n📊 Movement Frequency: {} Hz", frequency);
    println!("   Your Classification:\n");
    for option in Classification::all() {
        if option == result.classification {
            println!("   → {}", option.label());
        } else {
            println!("     {}", option.label());
        }
    }
    println!("\n💬 {}", result.message);
    println!("🏋️  Recomendación: {}", result.weights);

    Ok(())
}
