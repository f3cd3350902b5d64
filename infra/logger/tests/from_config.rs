use rollout_domain::config::{LogRotation, LoggingConfig};
use rollout_logger::Logger;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn config_section_enables_json_file_output() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let log_dir = tmp.path().join("logs");

    let config = LoggingConfig {
        name: "integration-from-config".to_owned(),
        level: "debug".to_owned(),
        console: false,
        path: Some(log_dir.clone()),
        json: true,
        rotation: LogRotation::Never,
        max_files: 2,
        env_filter: Some("debug".to_owned()),
    };

    let logger = Logger::from_config(&config)?;
    assert!(logger.guard().is_some(), "file output must hold a writer guard");

    tracing::info!(feature = "chat", "written as json");
    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(file)?;
    let line = contents.lines().find(|l| l.contains("written as json")).expect("event logged");
    assert!(line.starts_with('{'), "json output expected, got: {line}");
    assert!(line.contains("\"feature\":\"chat\""));

    Ok(())
}
