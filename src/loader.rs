use crate::error::WfResult;
use crate::types::{ControllerId, RotationSample};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Reads a recording with columns `id,timestamp_ms,x_delta,y_delta[,abs_x,abs_y]`.
///
/// Rows that fail to parse, carry non-finite deltas, or go back in time for
/// their controller are skipped.
pub fn load_recording<R: Read>(reader: R) -> WfResult<Vec<RotationSample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    let mut last_ts: HashMap<ControllerId, u64> = HashMap::new();
    let mut skipped = 0;

    for (row_idx, result) in rdr.records().enumerate() {
        let rec = match result {
            Ok(rec) => rec,
            Err(e) => {
                warn!("[Row {}] CSV parse error: {}", row_idx + 1, e);
                skipped += 1;
                continue;
            }
        };
        if rec.len() < 4 || rec[0].is_empty() {
            warn!("[Row {}] missing controller id or fields", row_idx + 1);
            skipped += 1;
            continue;
        }

        let parsed = (
            rec[1].parse::<u64>(),
            rec[2].parse::<f32>(),
            rec[3].parse::<f32>(),
        );
        let (timestamp_ms, x_delta, y_delta) = match parsed {
            (Ok(t), Ok(x), Ok(y)) => (t, x, y),
            _ => {
                warn!("[Row {}] unparsable timestamp or delta", row_idx + 1);
                skipped += 1;
                continue;
            }
        };
        if !(x_delta.is_finite() && y_delta.is_finite()) {
            warn!("[Row {}] non-finite delta ({}, {})", row_idx + 1, x_delta, y_delta);
            skipped += 1;
            continue;
        }

        let abs_position = match (rec.get(4), rec.get(5)) {
            (Some(ax), Some(ay)) => ax
                .parse::<f32>()
                .ok()
                .zip(ay.parse::<f32>().ok())
                .filter(|(x, y)| x.is_finite() && y.is_finite()),
            _ => None,
        };

        let id = rec[0].to_string();
        if let Some(&prev) = last_ts.get(&id) {
            if timestamp_ms < prev {
                warn!(
                    "[Row {}] timestamp {} goes back in time for '{}'",
                    row_idx + 1,
                    timestamp_ms,
                    id
                );
                skipped += 1;
                continue;
            }
        }
        last_ts.insert(id.clone(), timestamp_ms);

        samples.push(RotationSample {
            id,
            timestamp_ms,
            x_delta,
            y_delta,
            abs_position,
        });
    }

    if skipped > 0 {
        warn!("Skipped {} invalid rows in recording.", skipped);
    }
    debug!("Loaded {} samples.", samples.len());

    Ok(samples)
}

pub fn load_recording_from_file<P: AsRef<Path>>(path: P) -> WfResult<Vec<RotationSample>> {
    let file = File::open(path)?;
    load_recording(file)
}

/// Splits an interleaved recording into per-controller streams, in first-seen order.
pub fn split_by_controller(samples: Vec<RotationSample>) -> Vec<(ControllerId, Vec<RotationSample>)> {
    let mut order: Vec<ControllerId> = Vec::new();
    let mut streams: HashMap<ControllerId, Vec<RotationSample>> = HashMap::new();

    for sample in samples {
        if !streams.contains_key(&sample.id) {
            order.push(sample.id.clone());
        }
        streams.entry(sample.id.clone()).or_default().push(sample);
    }

    order
        .into_iter()
        .filter_map(|id| streams.remove(&id).map(|s| (id, s)))
        .collect()
}
