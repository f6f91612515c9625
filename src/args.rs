use std::path::PathBuf;

use clap::Parser;

use gaze_words::config::{AppConfig, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (JSON)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Face-mesh command line printing landmark frames as JSON lines
    #[arg(long, value_name = "CMD", conflicts_with = "replay")]
    pub source_cmd: Option<String>,

    /// Replay landmark frames from a JSON-lines file
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Replay speed in frames per second (0 = as fast as possible)
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Completion endpoint, overrides the configuration
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Answer every completion with this text instead of calling the model
    #[arg(long, value_name = "TEXT")]
    pub canned: Option<String>,

    /// Do not speak the completion
    #[arg(long)]
    pub no_speech: bool,

    /// Write the effective configuration to --config and continue
    #[arg(long)]
    pub write_config: bool,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn source_command(&self) -> Option<Vec<String>> {
        self.source_cmd
            .as_ref()
            .map(|line| line.split_whitespace().map(str::to_string).collect())
    }

    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.completion.endpoint = endpoint.clone();
        }
        if self.no_speech {
            config.speech.enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let args = Args::parse_from(["gaze-words", "--endpoint", "http://localhost:8080/x", "--no-speech"]);
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.completion.endpoint, "http://localhost:8080/x");
        assert!(!config.speech.enabled);
    }

    #[test]
    fn test_source_cmd_is_one_command_line() {
        let args = Args::parse_from(["gaze-words", "-vv", "--source-cmd", "python3 mesh.py --camera 0"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.source_command().unwrap(), vec!["python3", "mesh.py", "--camera", "0"]);
    }

    #[test]
    fn test_source_and_replay_conflict() {
        assert!(Args::try_parse_from(["gaze-words", "--replay", "f.jsonl", "--source-cmd", "x"]).is_err());
    }
}
