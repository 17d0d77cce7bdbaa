use crate::config::ConfigError;
use crate::effect::EffectUpdate;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, channel};

pub enum FeedSource {
    Stdin,
    File(PathBuf),
}

impl FeedSource {
    /// `-` means stdin, anything else is a file path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            FeedSource::Stdin
        } else {
            FeedSource::File(PathBuf::from(arg))
        }
    }
}

/// Parse one feed line. Blank lines yield `None`.
pub fn parse_update(line: &str) -> Result<Option<EffectUpdate>, ConfigError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// Latest update in a file's contents: its last non-empty line.
fn last_update(contents: &str) -> Result<Option<EffectUpdate>, ConfigError> {
    match contents.lines().rfind(|l| !l.trim().is_empty()) {
        Some(line) => parse_update(line),
        None => Ok(None),
    }
}

/// Forward a parsed line. Returns false once the receiver is gone.
fn forward(tx: &Sender<EffectUpdate>, parsed: Result<Option<EffectUpdate>, ConfigError>) -> bool {
    match parsed {
        Ok(Some(update)) => tx.send(update).is_ok(),
        Ok(None) => true,
        Err(e) => {
            log::warn!("ignoring feed update: {e}");
            true
        }
    }
}

fn read_file(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(e) => {
            log::debug!("feed file {}: {e}", path.display());
            None
        }
    }
}

pub fn spawn_reader(source: FeedSource) -> Receiver<EffectUpdate> {
    let (tx, rx) = channel::<EffectUpdate>();

    match source {
        FeedSource::Stdin => {
            std::thread::spawn(move || {
                use std::io::BufRead;
                let stdin = std::io::BufReader::new(std::io::stdin());
                for line in stdin.lines() {
                    let Ok(line) = line else { break };
                    if !forward(&tx, parse_update(&line)) {
                        break;
                    }
                }
            });
        }
        FeedSource::File(path) => {
            std::thread::spawn(move || {
                // Pick up whatever is already there
                if let Some(contents) = read_file(&path)
                    && !forward(&tx, last_update(&contents))
                {
                    return;
                }

                let (file_tx, file_rx) = channel();
                let watcher = notify::recommended_watcher(move |res| {
                    let _ = file_tx.send(res);
                });
                let mut watcher = match watcher {
                    Ok(w) => w,
                    Err(e) => {
                        log::warn!("cannot watch {}: {e}", path.display());
                        return;
                    }
                };
                if let Err(e) =
                    notify::Watcher::watch(&mut watcher, &path, notify::RecursiveMode::NonRecursive)
                {
                    log::warn!("cannot watch {}: {e}", path.display());
                    return;
                }
                log::info!("watching {} for effect updates", path.display());
                while let Ok(Ok(_event)) = file_rx.recv() {
                    if let Some(contents) = read_file(&path)
                        && !forward(&tx, last_update(&contents))
                    {
                        break;
                    }
                }
            });
        }
    }

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectType;

    #[test]
    fn test_parse_partial_update() {
        let update = parse_update(r#"{"speed":2.5,"effectType":"fireworks"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(update.speed, Some(2.5));
        assert_eq!(update.effect_type, Some(EffectType::Fireworks));
        assert!(update.color.is_none());
    }

    #[test]
    fn test_blank_and_bad_lines() {
        assert!(parse_update("   ").unwrap().is_none());
        assert!(matches!(parse_update("{nope"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_last_line_wins() {
        let contents = "{\"color\":\"#111\"}\n{\"color\":\"#222\"}\n\n";
        let update = last_update(contents).unwrap().unwrap();
        assert_eq!(update.color.as_deref(), Some("#222"));
    }

    #[test]
    fn test_forward_skips_errors() {
        let (tx, rx) = channel();
        assert!(forward(&tx, parse_update("garbage")));
        assert!(forward(&tx, parse_update(r#"{"size":2}"#)));
        assert_eq!(rx.try_recv().unwrap().size, Some(2.0));
        drop(rx);
        assert!(!forward(&tx, parse_update(r#"{"size":3}"#)));
    }

    #[test]
    fn test_file_feed_reads_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.json");
        std::fs::write(&path, "{\"effectType\":\"galaxy\"}\n").unwrap();
        let rx = spawn_reader(FeedSource::File(path));
        let update = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();
        assert_eq!(update.effect_type, Some(EffectType::Galaxy));
    }
}
