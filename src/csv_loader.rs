use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;

use crate::types::MotionSample;
use std::time::Duration;

/// Carga una secuencia de MotionSample desde un CSV en el formato
/// sample,t_ms,ax,ay,az,rx,ry,rz,pitch,roll,yaw (rotación y actitud
/// pueden ir vacías cuando el giroscopio/actitud aún no habían entregado).
pub fn load_samples_from_csv(path: impl AsRef<Path>) -> Result<Vec<MotionSample>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut samples = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("Fila {} inválida en {:?}", row_idx + 1, path))?;
        if record.len() < 5 {
            bail!("La fila {} no tiene al menos 5 columnas", row_idx + 1);
        }

        let t_ms: u64 = record[1]
            .parse()
            .with_context(|| format!("t_ms inválido en fila {}", row_idx + 1))?;
        let ax: f32 = record[2].parse()?;
        let ay: f32 = record[3].parse()?;
        let az: f32 = record[4].parse()?;

        let mut sample = MotionSample::new(Duration::from_millis(t_ms), [ax, ay, az]);
        sample.rotation_rate = parse_triplet(&record, 5)?;
        sample.attitude = parse_triplet(&record, 8)?;

        samples.push(sample);
    }

    if samples.is_empty() {
        return Err(anyhow!("El CSV {:?} no contiene muestras", path));
    }

    // El buffer debe preservar el orden de llegada
    for pair in samples.windows(2) {
        if pair[1].elapsed < pair[0].elapsed {
            bail!("El CSV {:?} no está ordenado por t_ms", path);
        }
    }

    Ok(samples)
}

/// Lee tres columnas contiguas como Option<[f32;3]>: las tres presentes y
/// no vacías, o ninguna
fn parse_triplet(record: &csv::StringRecord, base: usize) -> Result<Option<[f32; 3]>> {
    let fields: Vec<&str> = (base..base + 3)
        .filter_map(|i| record.get(i))
        .filter(|s| !s.is_empty())
        .collect();

    match fields.len() {
        0 => Ok(None),
        3 => Ok(Some([
            fields[0].parse()?,
            fields[1].parse()?,
            fields[2].parse()?,
        ])),
        n => bail!("Triplete incompleto en columna {}: {} de 3 valores", base, n),
    }
}

/// Escribe el buffer de una sesión al CSV de archivo (mismo formato que
/// lee `load_samples_from_csv`)
pub fn write_samples_to_csv(path: impl AsRef<Path>, samples: &[MotionSample]) -> Result<()> {
    let path = path.as_ref();
    let mut file = File::create(path)
        .with_context(|| format!("No se pudo crear el CSV {:?}", path))?;

    writeln!(file, "sample,t_ms,ax,ay,az,rx,ry,rz,pitch,roll,yaw")?;

    for (idx, sample) in samples.iter().enumerate() {
        let rot = triplet_fields(sample.rotation_rate);
        let att = triplet_fields(sample.attitude);
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            idx,
            sample.elapsed.as_millis(),
            sample.accel[0],
            sample.accel[1],
            sample.accel[2],
            rot,
            att,
        )?;
    }

    Ok(())
}

fn triplet_fields(values: Option<[f32; 3]>) -> String {
    match values {
        Some([a, b, c]) => format!("{},{},{}", a, b, c),
        None => ",,".to_string(),
    }
}
