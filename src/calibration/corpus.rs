//! Labeled corpus loading for offline calibration (§4.5).
//!
//! Expects `<root>/organic/*.wav` (label=real) and `<root>/synthetic/*.wav`
//! (label=fake), mirroring the layout the steel-capture tooling uses for its
//! own calibration fixtures.

use std::path::{Path, PathBuf};

use log::warn;

pub struct CorpusFile {
    pub path: PathBuf,
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

pub struct Corpus {
    pub organic: Vec<CorpusFile>,
    pub synthetic: Vec<CorpusFile>,
}

impl Corpus {
    pub fn load(root: &Path) -> Result<Self, String> {
        let organic = load_subset(&root.join("organic"))?;
        let synthetic = load_subset(&root.join("synthetic"))?;
        Ok(Self { organic, synthetic })
    }

    /// Deterministic dataset fingerprint: sha1 over the sorted, relative
    /// file-path list plus per-file byte length (§4.5 "Persistence").
    pub fn fingerprint(&self) -> String {
        let mut entries: Vec<String> = self
            .organic
            .iter()
            .chain(self.synthetic.iter())
            .map(|f| format!("{}:{}", f.path.display(), f.samples.len() * 4))
            .collect();
        entries.sort();

        let mut hasher = sha1_smol::Sha1::new();
        for entry in &entries {
            hasher.update(entry.as_bytes());
            hasher.update(b"\n");
        }
        hasher.digest().to_string()
    }

    pub fn file_count(&self) -> usize {
        self.organic.len() + self.synthetic.len()
    }
}

fn load_subset(dir: &Path) -> Result<Vec<CorpusFile>, String> {
    let entries = std::fs::read_dir(dir).map_err(|e| format!("cannot read corpus directory {}: {e}", dir.display()))?;

    let mut files = Vec::new();
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("wav"))
        .collect();
    paths.sort();

    for path in paths {
        match load_wav(&path) {
            Ok(file) => files.push(file),
            Err(e) => warn!("skipping corpus file {}: {e}", path.display()),
        }
    }
    Ok(files)
}

fn load_wav(path: &Path) -> Result<CorpusFile, String> {
    let mut reader = hound::WavReader::open(path).map_err(|e| e.to_string())?;
    let spec = reader.spec();
    let sample_rate = spec.sample_rate;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().filter_map(Result::ok).collect(),
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .filter_map(Result::ok)
                .map(|s| s as f32 / max_value)
                .collect()
        }
    };

    if spec.channels > 1 {
        let channels = spec.channels as usize;
        let mono: Vec<f32> = samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();
        return Ok(CorpusFile { path: path.to_path_buf(), samples: mono, sample_rate });
    }

    Ok(CorpusFile { path: path.to_path_buf(), samples, sample_rate })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let corpus_a = Corpus { organic: vec![], synthetic: vec![] };
        let corpus_b = Corpus { organic: vec![], synthetic: vec![] };
        assert_eq!(corpus_a.fingerprint(), corpus_b.fingerprint());
    }

    #[test]
    fn test_load_missing_directory_errors() {
        let result = Corpus::load(Path::new("/nonexistent/corpus/root"));
        assert!(result.is_err());
    }
}
