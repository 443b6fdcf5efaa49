/*
Temblómetro - Medición de temblor de mano y recomendación de contrapesos

Sistema que:
1. Abre una ventana de muestreo de 60 segundos sobre los sensores de
   movimiento (simulados cuando no hay hardware)
2. Acumula muestras de aceleración a 10 Hz con la última rotación y
   actitud conocidas
3. Reduce el buffer a una frecuencia de movimiento (estimador placeholder)
4. Clasifica la frecuencia y recomienda cuántos contrapesos añadir al
   guante anti-temblor

Para compilar y ejecutar:
    ./target/release/temblometro                 sesión simulada en vivo
    ./target/release/temblometro --manual 7.5    entrada manual de frecuencia
*/

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use temblometro::classifier::{classify, classify_manual_entry, Classification, ClassificationResult};
use temblometro::sensor::SimulatedSensor;
use temblometro::session::{SamplingSession, SessionParams};
use temblometro::types::{SESSION_DURATION_SECS, STAND_IN_FREQUENCY};
use temblometro::view_model::SessionViewModel;

/// Frecuencia del temblor que genera el sensor simulado (Hz)
const SIMULATED_TREMOR_HZ: f32 = 4.0;

/// Resumen serializado junto al CSV de la sesión
#[derive(Serialize)]
struct SessionSummary {
    frequency_hz: f32,
    classification: Classification,
    label: &'static str,
    weights: &'static str,
    message: &'static str,
    samples: usize,
}

fn main() -> Result<()> {
    println!("🧤 Temblómetro - Anti-Tremor Glove\n");

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        None => live_session(),
        Some("--manual") => {
            let input = args
                .get(2)
                .context("Uso: temblometro --manual <frecuencia_hz>")?;
            manual_entry(input)
        }
        Some(other) => {
            bail!(
                "Argumento no reconocido: {} (usa sin argumentos o --manual <hz>)",
                other
            );
        }
    }
}

/// Ruta "usar datos de la app": sesión de muestreo en vivo
fn live_session() -> Result<()> {
    // Aviso de preparación antes de medir
    println!("🖐  Please extend your arm.");
    println!(
        "   If you are operating from your phone, firmly grip your phone so as \
         not to drop it while the tremor is being measured."
    );
    println!("   The measurement will take one minute.\n");

    let view_model = Arc::new(SessionViewModel::new());
    let out_dir = PathBuf::from("sesiones_auto");

    // Conteo regresivo por consola, uno por cada 10 s cumplidos
    let last_printed = Arc::new(AtomicU64::new(u64::MAX));
    let last = Arc::clone(&last_printed);
    view_model.subscribe(move |snapshot| {
        let secs = snapshot.elapsed.as_secs();
        if secs % 10 == 0 && last.swap(secs, Ordering::Relaxed) != secs {
            let left = (SESSION_DURATION_SECS as u64).saturating_sub(secs);
            println!("⏱  Quedan {} segundos", left);
        }
    });

    let sensor = SimulatedSensor::new(SIMULATED_TREMOR_HZ);
    let mut session = SamplingSession::with_params(
        Box::new(sensor),
        Arc::clone(&view_model),
        SessionParams {
            // Valor sustituto de la ruta "usar datos de la app": el
            // estimador real no existe todavía
            stand_in_frequency: Some(STAND_IN_FREQUENCY),
            out_dir: Some(out_dir.clone()),
            ..SessionParams::default()
        },
    );

    println!("🎬 Iniciando sesión de muestreo ({} s)...\n", SESSION_DURATION_SECS);
    session.run_to_completion()?;

    let snapshot = view_model.snapshot();
    println!("\n✅ Motion tracking has completed.");
    println!("📈 Muestras recolectadas: {}", session.samples().len());
    println!("   Último giroscopio: {}", snapshot.gyroscope_readout);
    println!("   Última actitud: {}", snapshot.attitude_readout);

    let frequency = snapshot.final_frequency;
    let result = classify(frequency)
        .with_context(|| format!("La sesión publicó una frecuencia inválida: {}", frequency))?;

    print_classification(frequency, &result);
    write_summary(&out_dir, frequency, &result, session.samples().len())?;
    Ok(())
}

/// Ruta "insertar datos": el usuario teclea la frecuencia
fn manual_entry(input: &str) -> Result<()> {
    let (frequency, result) = classify_manual_entry(input)
        .with_context(|| format!("Entrada manual rechazada: {:?}", input))?;

    print_classification(frequency, &result);
    Ok(())
}

/// Pantalla de clasificación: las cinco burbujas con la asignada resaltada
fn print_classification(frequency: f32, result: &ClassificationResult) {
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
    println!("🏋️  Recomendación: {}\n", result.weights);
}

fn write_summary(
    out_dir: &PathBuf,
    frequency: f32,
    result: &ClassificationResult,
    samples: usize,
) -> Result<()> {
    let summary = SessionSummary {
        frequency_hz: frequency,
        classification: result.classification,
        label: result.classification.label(),
        weights: result.weights,
        message: result.message,
        samples,
    };

    let path = out_dir.join("resumen_sesion.json");
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(&path, json)
        .with_context(|| format!("No se pudo escribir el resumen {:?}", path))?;

    println!("💾 Resumen guardado en {:?}", path);
    Ok(())
}
