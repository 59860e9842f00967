use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use churn_model::inference::PredictionResult;

/// Write predictions as CSV or TSV (by extension), or CSV to stdout when no
/// path is given. Rows keep the order of the input records.
pub fn write_predictions(results: &[PredictionResult], output_path: Option<&str>) -> Result<()> {
    match output_path {
        Some(path) => {
            let path = Path::new(path);
            let delimiter = match path.extension().and_then(|ext| ext.to_str()) {
                Some("tsv") => b'\t',
                _ => b',',
            };
            let file = File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
            write_rows(results, BufWriter::new(file), delimiter)
        }
        None => write_rows(results, io::stdout().lock(), b','),
    }
}

fn write_rows<W: Write>(results: &[PredictionResult], sink: W, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(sink);

    writer.write_record(["record", "probability", "label", "risk_tier"])?;
    for (i, result) in results.iter().enumerate() {
        writer.write_record([
            i.to_string(),
            format!("{:.6}", result.probability),
            result.label.to_string(),
            result.risk_tier.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
