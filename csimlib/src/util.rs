use std::error::Error;
use std::fs;
use regex::Regex;

pub const SAMPLE_CONFIGS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/samples/configs");
pub const SAMPLE_OUTPUTS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/samples/outputs");
pub const TRACE_FILES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/samples/traces");

pub struct TestCasePaths {
    pub config: String,
    pub trace: String,
    pub output: String,
}

/// Finds every sample case, named `output-<trace>-<config>.json`, sorted by file name
pub fn get_configs() -> Result<Vec<TestCasePaths>, Box<dyn Error>> {
    let mut out = Vec::new();
    let output_pattern = Regex::new(r"^output-(?P<trace>[0-9a-zA-Z_]+)-(?P<config>[0-9a-zA-Z_]+)\.json$")?;
    let mut file_names = Vec::new();
    for entry in fs::read_dir(SAMPLE_OUTPUTS_PATH)? {
        let file_name = entry?
            .file_name()
            .into_string()
            .map_err(|e| format!("Can't convert OS string ({e:?}) to standard string"))?;
        if output_pattern.is_match(&file_name) {
            file_names.push(file_name);
        }
    }
    file_names.sort();
    for file_name in file_names {
        // Get components of name
        let tokens = output_pattern.captures(&file_name).ok_or("Couldn't parse the file name".to_string())?;
        let trace_file_path = tokens.name("trace").ok_or("Couldn't get the trace file from the output file name".to_string())?.as_str();
        let config_file_path = tokens.name("config").ok_or("Couldn't get the config file from the output file name".to_string())?.as_str();
        out.push(TestCasePaths {
            config: format!("{SAMPLE_CONFIGS_PATH}/{config_file_path}.json"),
            trace: format!("{TRACE_FILES_PATH}/{trace_file_path}.trace"),
            output: format!("{SAMPLE_OUTPUTS_PATH}/{file_name}"),
        });
    }
    Ok(out)
}
