// vidcheck-core/tests/common/mod.rs
//
// Shared helpers for the integration tests: an event recorder, fixture files
// and (unix only) executable stand-in decoders.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use vidcheck_core::events::{Event, EventHandler};

/// Records every event it receives.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress_values(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Progress { checked, .. } => Some(checked),
                _ => None,
            })
            .collect()
    }

    pub fn failure_names(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::FailureDetected { failure } => Some(failure.file_name()),
                _ => None,
            })
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, Event::Completed { .. }))
            .count()
    }
}

impl EventHandler for Recorder {
    fn handle(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Creates a small dummy file and returns its path.
pub fn create_dummy_file(dir: &Path, filename: &str) -> PathBuf {
    let file_path = dir.join(filename);
    let mut file = File::create(&file_path).expect("Failed to create dummy file");
    file.write_all(b"dummy content")
        .expect("Failed to write dummy content");
    file_path
}

/// Writes an executable shell script standing in for ffmpeg.
///
/// The script sees the same arguments ffmpeg would; `$INPUT` holds the value
/// following `-i`.
#[cfg(unix)]
pub fn write_fake_decoder(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\n\
         INPUT=\"\"\n\
         while [ $# -gt 0 ]; do\n\
           if [ \"$1\" = \"-i\" ]; then shift; INPUT=\"$1\"; fi\n\
           shift\n\
         done\n\
         {}\n",
        body
    );
    {
        let mut file = File::create(&path).expect("Failed to create fake decoder");
        file.write_all(script.as_bytes())
            .expect("Failed to write fake decoder");
        file.sync_all().expect("Failed to sync fake decoder");
    }
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// True if a process with `pid` still exists.
#[cfg(unix)]
pub fn process_exists(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(std::process::Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
