use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

use tracing::debug;

/// Speaks text aloud. Best effort: implementations never report failure.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str);
}

/// Hands the text to the platform's text-to-speech command (`say` on macOS,
/// `espeak` elsewhere) and returns without waiting for playback.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
}

impl Default for CommandSpeech {
    fn default() -> Self {
        let program = if cfg!(target_os = "macos") { "say" } else { "espeak" };
        Self::new(program)
    }
}

impl CommandSpeech {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Parses `"espeak-ng -s 140"` style command lines.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SpeechOutput for CommandSpeech {
    fn speak(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            // Reap in the background so playback never blocks the caller.
            Ok(mut child) => {
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            // Unsupported environment: skip silently.
            Err(e) => debug!("speech unavailable ({}): {}", self.program, e),
        }
    }
}

/// Used when speech is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeech;

impl SpeechOutput for NoSpeech {
    fn speak(&self, _text: &str) {}
}

/// Keeps everything it was asked to say.
#[derive(Debug, Clone, Default)]
pub struct RecordingSpeech {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl RecordingSpeech {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl SpeechOutput for RecordingSpeech {
    fn speak(&self, text: &str) {
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(text.to_string());
        }
    }
}

impl<T: SpeechOutput + ?Sized> SpeechOutput for Box<T> {
    fn speak(&self, text: &str) {
        (**self).speak(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_parsing() {
        let s = CommandSpeech::from_command_line("espeak-ng -s 140").unwrap();
        assert_eq!(s.program(), "espeak-ng");
        assert_eq!(s.args, vec!["-s", "140"]);
        assert!(CommandSpeech::from_command_line("   ").is_none());
    }

    #[test]
    fn test_missing_program_is_silent() {
        let s = CommandSpeech::new("definitely-not-a-tts-binary-on-this-host");
        s.speak("hello");
    }

    #[cfg(unix)]
    fn writing_to(path: &std::path::Path) -> CommandSpeech {
        CommandSpeech {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), format!("printf %s \"$0\" > '{}'", path.display())],
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_text_is_passed_as_last_argument() {
        let path = std::env::temp_dir().join(format!("gaze-words-speech-{}.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);

        writing_to(&path).speak("I want water, now!");

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let mut heard = String::new();
        while std::time::Instant::now() < deadline {
            heard = std::fs::read_to_string(&path).unwrap_or_default();
            if heard == "I want water, now!" {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert_eq!(heard, "I want water, now!");
        let _ = std::fs::remove_file(path);
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_text_spawns_nothing() {
        let path = std::env::temp_dir().join(format!("gaze-words-silent-{}.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);

        writing_to(&path).speak("");

        std::thread::sleep(std::time::Duration::from_millis(300));
        assert!(!path.exists());
    }

    #[test]
    fn test_recording_speech() {
        let rec = RecordingSpeech::default();
        let boxed: Box<dyn SpeechOutput> = Box::new(rec.clone());
        boxed.speak("one");
        boxed.speak("two");
        assert_eq!(rec.spoken(), vec!["one", "two"]);
    }
}
